use crate::error::{CrfPrepError, Result};

/// Pulls the predicted label out of every non-blank tagger output line.
///
/// The label is the last whitespace-delimited field. Blank lines separate
/// sequences and are skipped.
///
/// # Errors
///
/// Returns `CrfPrepError::Alignment` if the number of labels differs from
/// `expected`, the number of rows that were sent to the tagger.
///
/// # Examples
/// ```
/// use crfprep_core::align::extract_labels;
///
/// let labels = extract_labels("the DT O\ndog NN B-ANIMAL\n\n", 2).unwrap();
/// assert_eq!(labels, ["O", "B-ANIMAL"]);
/// ```
pub fn extract_labels(output: &str, expected: usize) -> Result<Vec<String>> {
    let labels: Vec<String> = output
        .lines()
        .filter_map(|line| line.split_whitespace().last())
        .map(str::to_string)
        .collect();

    if labels.len() != expected {
        return Err(CrfPrepError::Alignment {
            expected,
            actual: labels.len(),
        });
    }
    Ok(labels)
}

/// Pairs each token with its predicted label.
///
/// # Errors
///
/// Returns `CrfPrepError::Alignment` on a length mismatch; the shorter side
/// is never padded or truncated.
pub fn align<T, L>(tokens: &[T], labels: &[L]) -> Result<Vec<(String, String)>>
where
    T: AsRef<str>,
    L: AsRef<str>,
{
    if tokens.len() != labels.len() {
        return Err(CrfPrepError::Alignment {
            expected: tokens.len(),
            actual: labels.len(),
        });
    }
    Ok(tokens
        .iter()
        .zip(labels)
        .map(|(t, l)| (t.as_ref().to_string(), l.as_ref().to_string()))
        .collect())
}
