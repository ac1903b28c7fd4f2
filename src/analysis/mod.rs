pub mod classifier;
pub mod pipeline;

pub use classifier::{AffiliationClassifier, AuthorClassification, Classification, Signal};
pub use pipeline::{PaperPipeline, Progress, RunReport};
