use crate::error::{Result, TextClusterError};
use ndarray::{Array2, ArrayView1};

pub const DEFAULT_EPS: f64 = 0.5;
pub const DEFAULT_MIN_SAMPLES: usize = 2;

/// Cluster assignment for one point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterLabel {
    Cluster(usize),
    Noise,
}

impl ClusterLabel {
    #[must_use]
    pub const fn is_noise(self) -> bool {
        matches!(self, ClusterLabel::Noise)
    }
}

/// Cosine similarity between two vectors; zero vectors are similar to nothing.
#[must_use]
pub fn cosine_similarity(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    a.dot(&b) / (norm_a * norm_b)
}

/// Cosine distance clipped to `[0, 2]`
#[must_use]
pub fn cosine_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    (1.0 - cosine_similarity(a, b)).clamp(0.0, 2.0)
}

/// Density-based clustering over cosine distance
///
/// A point is a core point when at least `min_samples` points (itself
/// included) lie within `eps`. Clusters grow from core points in row order,
/// so label numbering is deterministic for a given input.
#[derive(Debug, Clone)]
pub struct Dbscan {
    eps: f64,
    min_samples: usize,
}

impl Default for Dbscan {
    fn default() -> Self {
        Self {
            eps: DEFAULT_EPS,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

impl Dbscan {
    pub fn new(eps: f64, min_samples: usize) -> Result<Self> {
        if !(eps.is_finite() && eps > 0.0) {
            return Err(TextClusterError::invalid_parameter(format!(
                "eps must be a positive finite number, got {eps}"
            )));
        }
        if min_samples == 0 {
            return Err(TextClusterError::invalid_parameter(
                "min_samples must be > 0",
            ));
        }
        Ok(Self { eps, min_samples })
    }

    pub fn fit_predict(&self, points: &Array2<f64>) -> Vec<ClusterLabel> {
        let neighborhoods = self.neighborhoods(points);
        let is_core: Vec<bool> = neighborhoods
            .iter()
            .map(|neighbors| neighbors.len() >= self.min_samples)
            .collect();

        let mut labels = vec![ClusterLabel::Noise; points.nrows()];
        let mut next_label = 0usize;

        for seed in 0..points.nrows() {
            if !labels[seed].is_noise() || !is_core[seed] {
                continue;
            }

            let mut stack = vec![seed];
            while let Some(point) = stack.pop() {
                if !labels[point].is_noise() {
                    continue;
                }
                labels[point] = ClusterLabel::Cluster(next_label);
                if is_core[point] {
                    stack.extend(
                        neighborhoods[point]
                            .iter()
                            .copied()
                            .filter(|&neighbor| labels[neighbor].is_noise()),
                    );
                }
            }
            next_label += 1;
        }

        let noise = labels.iter().filter(|label| label.is_noise()).count();
        log::debug!(
            "DBSCAN: {} points, {} clusters, {} noise",
            points.nrows(),
            next_label,
            noise
        );

        labels
    }

    fn neighborhoods(&self, points: &Array2<f64>) -> Vec<Vec<usize>> {
        let n = points.nrows();
        let mut neighborhoods = vec![Vec::new(); n];
        for i in 0..n {
            // a point is always its own neighbour, even a zero vector
            neighborhoods[i].push(i);
            for j in (i + 1)..n {
                if cosine_distance(points.row(i), points.row(j)) <= self.eps {
                    neighborhoods[i].push(j);
                    neighborhoods[j].push(i);
                }
            }
        }
        neighborhoods
    }
}
