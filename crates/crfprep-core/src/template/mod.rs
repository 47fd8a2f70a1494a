pub mod compiler;
pub mod unigram;

pub use compiler::{is_comment, prepare_template, TemplateCompiler, COMMENT_MARKER};
pub use unigram::{unigram_template, DEFAULT_UNIGRAM_SCOPE};
