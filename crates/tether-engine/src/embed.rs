use tether_core::traits::Embedder;

/// A batch of embedded texts with precomputed L2 norms.
///
/// Built once per call over every passage, then queried per answer span.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    vectors: Vec<Vec<f32>>,
    norms: Vec<f64>,
}

impl EmbeddingIndex {
    pub fn build(embedder: &dyn Embedder, texts: &[&str]) -> Self {
        let vectors = embedder.encode(texts);
        let norms = vectors.iter().map(|vector| l2_norm(vector)).collect();
        Self { vectors, norms }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Top `k` entries by cosine similarity, ties broken by ascending index.
    ///
    /// Zero-norm vectors (query or entry) never match.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<(usize, f64)> {
        if k == 0 {
            return Vec::new();
        }
        let query_norm = l2_norm(query);
        if query_norm == 0.0 {
            return Vec::new();
        }

        let mut scores: Vec<(usize, f64)> = Vec::with_capacity(self.vectors.len());
        for (index, (vector, &norm)) in self.vectors.iter().zip(&self.norms).enumerate() {
            if norm == 0.0 {
                continue;
            }
            scores.push((index, dot(query, vector) / (query_norm * norm)));
        }

        scores.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scores.truncate(k);
        scores
    }
}

fn dot(left: &[f32], right: &[f32]) -> f64 {
    left.iter()
        .zip(right)
        .map(|(&a, &b)| f64::from(a) * f64::from(b))
        .sum()
}

fn l2_norm(vector: &[f32]) -> f64 {
    dot(vector, vector).sqrt()
}
