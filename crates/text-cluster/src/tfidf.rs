use crate::error::{Result, TextClusterError};
use crate::tokenizer::tokenize;
use ndarray::Array2;
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_MAX_FEATURES: usize = 500;

/// TF-IDF vectorizer with a frequency-capped vocabulary
///
/// Weights are raw term counts times the smoothed inverse document frequency
/// `ln((1 + n) / (1 + df)) + 1`; every row is L2-normalized.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
}

/// Document-term matrix produced by [`TfidfVectorizer::fit_transform`]
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    /// Vocabulary in column order (alphabetical)
    pub vocabulary: Vec<String>,
    /// One L2-normalized row per document
    pub weights: Array2<f64>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self { max_features }
    }

    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<TfidfMatrix> {
        if self.max_features == 0 {
            return Err(TextClusterError::invalid_parameter(
                "max_features must be > 0",
            ));
        }

        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| tokenize(doc.as_ref()))
            .collect();

        let vocabulary = self.build_vocabulary(&tokenized);
        if vocabulary.is_empty() {
            return Err(TextClusterError::EmptyVocabulary);
        }
        let column_of: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.as_str(), idx))
            .collect();

        let mut counts = Array2::<f64>::zeros((tokenized.len(), vocabulary.len()));
        for (row, tokens) in tokenized.iter().enumerate() {
            for token in tokens {
                if let Some(&col) = column_of.get(token.as_str()) {
                    counts[[row, col]] += 1.0;
                }
            }
        }

        let n_docs = tokenized.len() as f64;
        for (col, mut column) in counts.columns_mut().into_iter().enumerate() {
            let df = column.iter().filter(|&&count| count > 0.0).count() as f64;
            let idf = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;
            column.mapv_inplace(|count| count * idf);
            log::trace!("idf[{}]={idf:.4}", vocabulary[col]);
        }

        for mut row in counts.rows_mut() {
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|weight| weight / norm);
            }
        }

        log::debug!(
            "TF-IDF: {} documents, {} terms",
            counts.nrows(),
            vocabulary.len()
        );

        Ok(TfidfMatrix {
            vocabulary,
            weights: counts,
        })
    }

    /// Keep the `max_features` terms with the highest corpus frequency,
    /// ties broken alphabetically, returned in alphabetical order.
    fn build_vocabulary(&self, tokenized: &[Vec<String>]) -> Vec<String> {
        let mut frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in tokenized {
            for token in tokens {
                *frequency.entry(token.as_str()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);

        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(term, _)| term.to_string()).collect();
        vocabulary.sort_unstable();
        vocabulary
    }
}
