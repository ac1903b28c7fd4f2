pub mod author;
pub mod date;
pub mod paper;

pub use author::*;
pub use date::*;
pub use paper::*;
