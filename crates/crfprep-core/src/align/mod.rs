pub mod grouping;
pub mod labels;

pub use grouping::{ContiguousGrouper, LabelGrouper, Span};
pub use labels::{align, extract_labels};
