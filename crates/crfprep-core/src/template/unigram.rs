use crate::types::CompiledTemplate;
use crate::vocab::Vocabulary;

/// Default scope prefix for generated unigram features.
pub const DEFAULT_UNIGRAM_SCOPE: &str = "u";

/// Builds a template block with one current-position unigram macro per
/// vocabulary column, in column order.
///
/// ```
/// use crfprep_core::template::unigram_template;
/// use crfprep_core::vocab::Vocabulary;
///
/// let vocab = Vocabulary::new(["token", "tag"]);
/// let block = unigram_template(&vocab, "u");
/// assert_eq!(
///     block.as_str(),
///     "\n# Unigrams for all custom features\nufeat:token=%x[0,0]\nufeat:tag=%x[0,1]\n"
/// );
/// ```
pub fn unigram_template(vocab: &Vocabulary, scope: &str) -> CompiledTemplate {
    let mut lines = vec![String::from("\n# Unigrams for all custom features")];
    lines.extend(
        vocab
            .names()
            .iter()
            .enumerate()
            .map(|(col, name)| format!("{scope}feat:{name}=%x[0,{col}]")),
    );
    CompiledTemplate::new(lines.join("\n") + "\n", vocab.version())
}
