use serde::{Deserialize, Serialize};

use crate::error::CitationError;
use crate::topk::Backend;

/// Linear combination weights for the composed citation score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CitationWeights {
    /// Weight of the normalized alignment score.
    pub alignment: f64,
    /// Weight of the fraction of answer tokens covered by the alignment.
    pub answer_coverage: f64,
    /// Weight of the fraction of passage tokens covered by the alignment.
    pub evidence_coverage: f64,
    /// Weight of the distinct-token overlap ratio.
    pub lexical: f64,
    /// Weight of the embedding cosine similarity.
    pub embedding: f64,
}

impl Default for CitationWeights {
    fn default() -> Self {
        Self {
            alignment: 1.0,
            answer_coverage: 1.0,
            evidence_coverage: 0.0,
            lexical: 0.5,
            embedding: 0.5,
        }
    }
}

/// Configuration for `align_citations`.
///
/// `multi_span_evidence` turns on non-contiguous evidence via
/// `Citation.evidence_spans`; the enclosing `char_start/char_end/evidence`
/// fields always remain a single contiguous span covering them all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationConfig {
    /// Maximum citations emitted per answer span.
    pub top_k: usize,
    /// Drop candidates whose composed score is lower.
    pub min_final_score: f64,
    /// Drop candidates whose integer alignment score is lower, unless they
    /// are admitted embedding-only.
    pub min_alignment_score: i32,
    /// Drop candidates whose answer coverage is lower, unless embedding-only.
    pub min_answer_coverage: f64,
    /// Answer coverage at which a span's status becomes supported.
    pub supported_answer_coverage: f64,
    /// Admit candidates on embedding similarity alone.
    pub allow_embedding_only: bool,
    /// Minimum cosine similarity for embedding-only admission.
    pub min_embedding_similarity: f64,
    /// Cosine similarity at which an embedding-only span counts as supported.
    pub supported_embedding_similarity: f64,

    /// Passage window size, in source segments.
    pub window_size_sentences: usize,
    /// Passage window stride, in source segments.
    pub window_stride_sentences: usize,

    /// Cap on the lexical prefilter output.
    pub max_candidates_lexical: usize,
    /// Cap on the embedding prefilter output.
    pub max_candidates_embedding: usize,
    /// Cap on the merged candidate list.
    pub max_candidates_total: usize,

    /// Per-source citation cap, applied before `top_k`.
    pub max_citations_per_source: usize,

    /// Signal weights for the composed score.
    pub weights: CitationWeights,

    /// Aligner reward for a token match.
    pub match_score: i32,
    /// Aligner penalty for a token mismatch (usually negative).
    pub mismatch_score: i32,
    /// Aligner penalty for a gap (usually negative).
    pub gap_score: i32,

    /// Break effective score ties toward earlier sources.
    pub prefer_source_order: bool,

    /// Emit disjoint evidence spans from the aligner's match blocks.
    pub multi_span_evidence: bool,
    /// Merge adjacent evidence spans whose byte gap is at most this.
    pub multi_span_merge_gap_chars: usize,
    /// Above this many spans, fall back to the single enclosing span.
    pub multi_span_max_spans: usize,

    /// Which aligner implementation to run.
    pub backend: Backend,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_final_score: 0.0,
            min_alignment_score: 0,
            min_answer_coverage: 0.2,
            supported_answer_coverage: 0.6,
            allow_embedding_only: false,
            min_embedding_similarity: 0.3,
            supported_embedding_similarity: 0.6,
            window_size_sentences: 1,
            window_stride_sentences: 1,
            max_candidates_lexical: 200,
            max_candidates_embedding: 200,
            max_candidates_total: 400,
            max_citations_per_source: 2,
            weights: CitationWeights::default(),
            match_score: 2,
            mismatch_score: -1,
            gap_score: -1,
            prefer_source_order: true,
            multi_span_evidence: false,
            multi_span_merge_gap_chars: 16,
            multi_span_max_spans: 5,
            backend: Backend::Auto,
        }
    }
}

impl CitationConfig {
    /// High thresholds, few citations. For precision-sensitive callers.
    pub fn strict() -> Self {
        Self {
            top_k: 2,
            min_alignment_score: 1,
            min_answer_coverage: 0.5,
            supported_answer_coverage: 0.8,
            ..Self::default()
        }
    }

    /// Low thresholds, embedding-only admission on. For recall-sensitive callers.
    pub fn permissive() -> Self {
        Self {
            top_k: 5,
            min_answer_coverage: 0.1,
            supported_answer_coverage: 0.5,
            allow_embedding_only: true,
            ..Self::default()
        }
    }

    /// Reduced candidate limits for latency-sensitive callers.
    pub fn fast() -> Self {
        Self {
            top_k: 1,
            max_candidates_lexical: 50,
            max_candidates_embedding: 0,
            max_candidates_total: 50,
            ..Self::default()
        }
    }

    /// The default trade-off, spelled out.
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Reject malformed configurations before any work happens.
    pub fn validate(&self) -> Result<(), CitationError> {
        if self.window_size_sentences == 0 {
            return Err(CitationError::InvalidConfig(
                "window_size_sentences must be at least 1".to_string(),
            ));
        }
        if self.window_stride_sentences == 0 {
            return Err(CitationError::InvalidConfig(
                "window_stride_sentences must be at least 1".to_string(),
            ));
        }
        if self.match_score < 1 {
            return Err(CitationError::InvalidConfig(
                "match_score must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("weights.alignment", self.weights.alignment),
            ("weights.answer_coverage", self.weights.answer_coverage),
            ("weights.evidence_coverage", self.weights.evidence_coverage),
            ("weights.lexical", self.weights.lexical),
            ("weights.embedding", self.weights.embedding),
        ] {
            if !value.is_finite() {
                return Err(CitationError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("min_final_score", self.min_final_score),
            ("min_answer_coverage", self.min_answer_coverage),
            ("supported_answer_coverage", self.supported_answer_coverage),
            ("min_embedding_similarity", self.min_embedding_similarity),
            (
                "supported_embedding_similarity",
                self.supported_embedding_similarity,
            ),
        ] {
            if value.is_nan() {
                return Err(CitationError::InvalidConfig(format!(
                    "{name} must not be NaN"
                )));
            }
        }
        Ok(())
    }
}
