use std::collections::{HashMap, HashSet};

use tether_core::config::CitationConfig;

use crate::embed::EmbeddingIndex;

/// One candidate passage for an answer span, identified by its position in
/// the flat passage list.
#[derive(Debug, Clone)]
pub(crate) struct CandidateRef {
    pub flat_index: usize,
    pub lexical_overlap: usize,
    pub embedding_score: Option<f64>,
}

/// Produce the ordered, deduplicated candidate list for one answer span.
///
/// Lexical prefilter: rank passages by distinct-token overlap with the
/// answer, ties by flat passage order (which is source order, then passage
/// order). Embedding prefilter: cosine top-k over the passage index. The
/// two lists are merged first-occurrence-first and capped.
pub(crate) fn generate_candidates(
    answer_token_set: &HashSet<u32>,
    passage_token_sets: &[&HashSet<u32>],
    embedding: Option<(&EmbeddingIndex, &[f32])>,
    config: &CitationConfig,
) -> Vec<CandidateRef> {
    let overlaps: Vec<usize> = passage_token_sets
        .iter()
        .map(|passage_set| passage_set.intersection(answer_token_set).count())
        .collect();

    let mut lexical: Vec<usize> = (0..passage_token_sets.len())
        .filter(|&flat_index| overlaps[flat_index] > 0)
        .collect();
    lexical.sort_by_key(|&flat_index| (std::cmp::Reverse(overlaps[flat_index]), flat_index));
    lexical.truncate(config.max_candidates_lexical);

    let semantic: Vec<(usize, f64)> = match embedding {
        Some((index, query_vector)) => index.top_k(query_vector, config.max_candidates_embedding),
        None => Vec::new(),
    };

    let mut candidates: Vec<CandidateRef> = Vec::new();
    let mut positions: HashMap<usize, usize> = HashMap::new();

    for flat_index in lexical {
        positions.insert(flat_index, candidates.len());
        candidates.push(CandidateRef {
            flat_index,
            lexical_overlap: overlaps[flat_index],
            embedding_score: None,
        });
    }

    for (flat_index, similarity) in semantic {
        match positions.get(&flat_index) {
            Some(&position) => candidates[position].embedding_score = Some(similarity),
            None => {
                positions.insert(flat_index, candidates.len());
                candidates.push(CandidateRef {
                    flat_index,
                    lexical_overlap: overlaps[flat_index],
                    embedding_score: Some(similarity),
                });
            }
        }
    }

    candidates.truncate(config.max_candidates_total);
    candidates
}
