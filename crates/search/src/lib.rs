//! # Catalog Search
//!
//! The keyword-ranked item search engine. A free-text query is normalized
//! into tokens, matched exactly against the keyword vocabulary, and the
//! candidate items are ordered by a composite key: distinct matched terms,
//! then exact title substring, then total keyword links, then title. The
//! whole candidate set is ranked before any truncation.
//!
//! [`SearchEngine`] is the reference implementation; [`TextIndex`] is an
//! alternate weighted full-text backend behind the same [`ItemSearcher`]
//! trait for callers that want score-ranked matching instead.

mod engine;
mod error;
mod text_index;
mod tokenizer;
mod types;

pub use engine::SearchEngine;
pub use error::{Result, SearchError};
pub use text_index::TextIndex;
pub use tokenizer::tokenize;
pub use types::{ItemSearcher, SearchRequest, SearchResponse, DEFAULT_LIMIT};
