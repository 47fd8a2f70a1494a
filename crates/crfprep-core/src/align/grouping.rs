use serde::{Deserialize, Serialize};

/// A maximal run of adjacent tokens sharing one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Tokens of the run joined with single spaces.
    pub text: String,
    pub label: String,
    /// Index of the first token.
    pub start_token: usize,
    /// One past the index of the last token.
    pub end_token: usize,
}

/// Turns an aligned `(token, label)` sequence into spans.
pub trait LabelGrouper {
    fn group(&self, pairs: &[(String, String)]) -> Vec<Span>;
}

/// Merges adjacent tokens with identical labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContiguousGrouper;

impl LabelGrouper for ContiguousGrouper {
    fn group(&self, pairs: &[(String, String)]) -> Vec<Span> {
        let mut spans: Vec<Span> = Vec::new();

        for (i, (token, label)) in pairs.iter().enumerate() {
            if let Some(span) = spans.last_mut() {
                if span.label == *label {
                    span.text.push(' ');
                    span.text.push_str(token);
                    span.end_token = i + 1;
                    continue;
                }
            }
            spans.push(Span {
                text: token.clone(),
                label: label.clone(),
                start_token: i,
                end_token: i + 1,
            });
        }

        spans
    }
}
