use std::collections::BTreeMap;

use tether_core::config::CitationWeights;
use tether_core::types::Alignment;

pub(crate) const ALIGNMENT_SCORE: &str = "alignment_score";
pub(crate) const NORMALIZED_ALIGNMENT: &str = "normalized_alignment";
pub(crate) const ANSWER_COVERAGE: &str = "answer_coverage";
pub(crate) const EVIDENCE_COVERAGE: &str = "evidence_coverage";
pub(crate) const LEXICAL_SCORE: &str = "lexical_score";
pub(crate) const EMBEDDING_SCORE: &str = "embedding_score";
pub(crate) const NUM_EVIDENCE_SPANS: &str = "num_evidence_spans";
pub(crate) const EMBEDDING_ONLY: &str = "embedding_only";

/// The composed score for one candidate, with its signal breakdown.
#[derive(Debug, Clone)]
pub(crate) struct ComposedScore {
    pub final_score: f64,
    pub answer_coverage: f64,
    pub components: BTreeMap<String, f64>,
}

/// Combine the alignment, coverage, lexical, and embedding signals.
///
/// All signals except the raw alignment score live in `[0, 1]`.
pub(crate) fn compose_score(
    alignment: &Alignment,
    answer_token_count: usize,
    passage_token_count: usize,
    lexical_overlap: usize,
    answer_distinct_tokens: usize,
    embedding_score: f64,
    weights: &CitationWeights,
    match_score: i32,
) -> ComposedScore {
    let alignment_score = f64::from(alignment.score);

    let normalized_alignment = clamp_unit(ratio(
        alignment_score,
        f64::from(match_score) * answer_token_count as f64,
    ));
    let answer_coverage = clamp_unit(ratio(
        (alignment.query_end - alignment.query_start) as f64,
        answer_token_count as f64,
    ));
    let evidence_coverage = clamp_unit(ratio(
        (alignment.token_end - alignment.token_start) as f64,
        passage_token_count as f64,
    ));
    let lexical_score = clamp_unit(ratio(
        lexical_overlap as f64,
        answer_distinct_tokens as f64,
    ));

    let final_score = weights.alignment * normalized_alignment
        + weights.answer_coverage * answer_coverage
        + weights.evidence_coverage * evidence_coverage
        + weights.lexical * lexical_score
        + weights.embedding * embedding_score;

    let mut components = BTreeMap::new();
    components.insert(ALIGNMENT_SCORE.to_string(), alignment_score);
    components.insert(NORMALIZED_ALIGNMENT.to_string(), normalized_alignment);
    components.insert(ANSWER_COVERAGE.to_string(), answer_coverage);
    components.insert(EVIDENCE_COVERAGE.to_string(), evidence_coverage);
    components.insert(LEXICAL_SCORE.to_string(), lexical_score);
    components.insert(EMBEDDING_SCORE.to_string(), embedding_score);

    ComposedScore {
        final_score,
        answer_coverage,
        components,
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
