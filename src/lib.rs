pub mod analysis;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod pubmed;
pub mod taxonomy;

pub use analysis::{AffiliationClassifier, PaperPipeline, RunReport};
pub use config::{ClientConfig, Config};
pub use error::{Error, Result};
pub use pubmed::{LiteratureSource, PubMedClient};
