//! Configuration and dependency initialization.

mod corpus;
mod dependencies;

pub use corpus::{Corpus, CorpusConfig};
pub use dependencies::{Dependencies, ProvisionerConfig};
