//! # Sourcing Text Cluster
//!
//! Groups short free-text item descriptions by lexical similarity.
//!
//! ## Architecture
//!
//! ```text
//! descriptions[]
//!     │
//!     ├──> Tokenizer (lower-case, stop words, letter/digit split)
//!     │
//!     ├──> TF-IDF (vocabulary capped at 500 terms)
//!     │      └─> L2-normalized document vectors
//!     │
//!     └──> DBSCAN (cosine distance, eps 0.5, min_samples 2)
//!            └─> ClusterLabel per description
//! ```
//!
//! ## Example
//!
//! ```rust
//! use sourcing_text_cluster::{ClusterLabel, TextClusterer};
//!
//! let labels = TextClusterer::default()
//!     .cluster(&["laptop 15-inch", "laptop 15in", "stapler"])
//!     .unwrap();
//!
//! assert_eq!(labels[0], labels[1]);
//! assert_eq!(labels[2], ClusterLabel::Noise);
//! ```

mod dbscan;
mod error;
mod tfidf;
mod tokenizer;

pub use dbscan::{
    cosine_distance, cosine_similarity, ClusterLabel, Dbscan, DEFAULT_EPS, DEFAULT_MIN_SAMPLES,
};
pub use error::{Result, TextClusterError};
pub use tfidf::{TfidfMatrix, TfidfVectorizer, DEFAULT_MAX_FEATURES};
pub use tokenizer::{is_stop_word, tokenize};

/// TF-IDF vectorization followed by DBSCAN
#[derive(Debug, Clone, Default)]
pub struct TextClusterer {
    vectorizer: TfidfVectorizer,
    dbscan: Dbscan,
}

impl TextClusterer {
    pub fn new(vectorizer: TfidfVectorizer, dbscan: Dbscan) -> Self {
        Self { vectorizer, dbscan }
    }

    /// One label per document, in input order
    pub fn cluster<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<ClusterLabel>> {
        let matrix = self.vectorizer.fit_transform(documents)?;
        Ok(self.dbscan.fit_predict(&matrix.weights))
    }
}
