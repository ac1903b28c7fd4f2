pub mod client;
pub mod paginator;
pub mod parser;
pub mod rate_limiter;
pub mod retry;
pub mod source;

pub use client::{PubMedClient, SearchPage};
pub use paginator::Paginator;
pub use parser::{parse_articles, ParseWarning, ParsedBatch};
pub use rate_limiter::RateLimiter;
pub use retry::{Failure, FailureKind, RetryPolicy};
pub use source::LiteratureSource;
