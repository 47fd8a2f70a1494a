//! # Macro Template Compiler
//!
//! Rewrites feature names inside positional macros such as `%x[-1,tag]`
//! into the column indices the trainer expects (`%x[-1,1]`). Comment lines
//! and all text outside macros are copied through unchanged.

use regex::{Captures, Regex};

use crate::error::{CrfPrepError, Result};
use crate::types::CompiledTemplate;
use crate::vocab::Vocabulary;

/// Marker that starts a template comment line.
pub const COMMENT_MARKER: char = '#';

/// Macro scanner: sigil, signed offset, column token, then `,` or `]`.
const MACRO_PATTERN: &str = r"(?P<macro>%[xXtTmM])\[\s*(?P<offset>-?[0-9]+)\s*,\s*(?P<column>[^\],\s]+)\s*(?P<rest>[\],])";

/// Compiles name-based templates into column-based ones.
pub struct TemplateCompiler {
    re_macro: Regex,
}

impl TemplateCompiler {
    /// Constructs a compiler with its macro pattern pre-compiled.
    ///
    /// # Errors
    ///
    /// Returns `CrfPrepError::RegexError` if the pattern fails to compile
    /// (should never happen with the static pattern defined here).
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_macro: Regex::new(MACRO_PATTERN)?,
        })
    }

    /// Resolves every feature-name column in `template` against `vocab`.
    ///
    /// Lines are split on `\n` and rejoined with `\n`, so line structure,
    /// trailing newlines and `\r` characters are preserved.
    ///
    /// # Errors
    ///
    /// Returns `CrfPrepError::UnknownFeature` with the 1-based line number
    /// if a non-comment line references a name missing from `vocab`.
    ///
    /// # Examples
    /// ```
    /// use crfprep_core::template::TemplateCompiler;
    /// use crfprep_core::vocab::Vocabulary;
    ///
    /// let vocab = Vocabulary::new(["token", "tag"]);
    /// let compiler = TemplateCompiler::new().unwrap();
    /// let compiled = compiler.compile("*:Pos-1 L=%x[-1, tag]", &vocab).unwrap();
    /// assert_eq!(compiled.as_str(), "*:Pos-1 L=%x[-1,1]");
    /// ```
    pub fn compile(&self, template: &str, vocab: &Vocabulary) -> Result<CompiledTemplate> {
        let lines = template
            .split('\n')
            .enumerate()
            .map(|(i, line)| {
                if is_comment(line) {
                    Ok(line.to_string())
                } else {
                    self.compile_line(line, i + 1, vocab)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CompiledTemplate::new(lines.join("\n"), vocab.version()))
    }

    fn compile_line(&self, line: &str, line_no: usize, vocab: &Vocabulary) -> Result<String> {
        let mut out = String::with_capacity(line.len());
        let mut last = 0;

        for caps in self.re_macro.captures_iter(line) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&line[last..whole.start()]);
            out.push_str(&rewrite_macro(&caps, line_no, vocab)?);
            last = whole.end();
        }

        out.push_str(&line[last..]);
        Ok(out)
    }
}

fn rewrite_macro(caps: &Captures<'_>, line_no: usize, vocab: &Vocabulary) -> Result<String> {
    let column = &caps["column"];
    let resolved = if column.bytes().all(|b| b.is_ascii_digit()) {
        column.to_string()
    } else {
        vocab
            .get(column)
            .ok_or_else(|| CrfPrepError::UnknownFeature {
                name: column.to_string(),
                line: Some(line_no),
            })?
            .to_string()
    };

    Ok(format!(
        "{}[{},{}{}",
        &caps["macro"], &caps["offset"], resolved, &caps["rest"]
    ))
}

/// A line is a comment if its first non-whitespace character is `#`.
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with(COMMENT_MARKER)
}

/// One-shot convenience wrapper around [`TemplateCompiler::compile`].
pub fn prepare_template(template: &str, vocab: &Vocabulary) -> Result<String> {
    let compiler = TemplateCompiler::new()?;
    Ok(compiler.compile(template, vocab)?.into_string())
}
