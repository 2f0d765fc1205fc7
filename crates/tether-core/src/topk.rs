use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::alignment::SmithWatermanAligner;
use crate::error::CitationError;
use crate::packed::PackedAligner;
use crate::traits::TokenAligner;
use crate::types::Alignment;

/// Which aligner implementation to run.
///
/// `Auto` prefers the accelerated backend. Whichever is selected, results
/// are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Auto,
    Reference,
    Accelerated,
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Auto
    }
}

impl Backend {
    /// Build the selected aligner with the given scoring parameters.
    pub fn build(self, match_score: i32, mismatch_score: i32, gap_score: i32) -> Box<dyn TokenAligner> {
        match self {
            Backend::Reference => Box::new(SmithWatermanAligner::new(
                match_score,
                mismatch_score,
                gap_score,
            )),
            Backend::Auto | Backend::Accelerated => {
                Box::new(PackedAligner::new(match_score, mismatch_score, gap_score))
            }
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = CitationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "auto" => Ok(Backend::Auto),
            "reference" => Ok(Backend::Reference),
            "accelerated" => Ok(Backend::Accelerated),
            other => Err(CitationError::UnknownBackend(other.to_string())),
        }
    }
}

/// An alignment paired with the index of the candidate that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredAlignment {
    pub index: usize,
    pub alignment: Alignment,
}

impl ScoredAlignment {
    /// Ordering key: score descending, then earliest and longest candidate
    /// span, earliest query start, lowest candidate index.
    fn key(&self) -> (i32, usize, i64, usize, usize, usize, usize) {
        let a = &self.alignment;
        let span_len = (a.token_end - a.token_start) as i64;
        (
            -a.score,
            a.token_start,
            -span_len,
            a.query_start,
            self.index,
            a.token_end,
            a.query_end,
        )
    }
}

/// Align `query` against every candidate and return at most `k` results in
/// the deterministic order above. Zero-score alignments are excluded.
///
/// Alignment fans out across worker threads; the ordering is fixed by the
/// sort afterwards, so parallelism never changes the result.
pub fn align_topk<C>(
    aligner: &dyn TokenAligner,
    query: &[u32],
    candidates: &[C],
    k: usize,
) -> Vec<ScoredAlignment>
where
    C: AsRef<[u32]> + Sync,
{
    if k == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<ScoredAlignment> = candidates
        .par_iter()
        .enumerate()
        .map(|(index, candidate)| ScoredAlignment {
            index,
            alignment: aligner.align(query, candidate.as_ref()),
        })
        .filter(|scored| scored.alignment.score > 0)
        .collect();

    results.sort_by_key(ScoredAlignment::key);
    results.truncate(k);
    results
}

/// The single best candidate alignment, if any scored above zero.
pub fn align_best<C>(
    aligner: &dyn TokenAligner,
    query: &[u32],
    candidates: &[C],
) -> Option<ScoredAlignment>
where
    C: AsRef<[u32]> + Sync,
{
    align_topk(aligner, query, candidates, 1).into_iter().next()
}
