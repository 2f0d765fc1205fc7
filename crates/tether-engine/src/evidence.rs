use tether_core::config::CitationConfig;
use tether_core::types::{Alignment, EvidenceSpan, TokenizedText};
use tether_text::Passage;

use crate::source::SourceEntry;

/// Evidence for one citation: the enclosing range plus optional sub-spans.
///
/// `spans` is empty in single-span mode; `num_spans` is what
/// `components.num_evidence_spans` reports (1 in single-span mode and on
/// multi-span fallback).
#[derive(Debug, Clone)]
pub(crate) struct ResolvedEvidence {
    pub char_start: usize,
    pub char_end: usize,
    pub evidence: String,
    pub spans: Vec<EvidenceSpan>,
    pub num_spans: usize,
}

/// Map token indices on a passage back to absolute byte offsets and text in
/// the containing document.
pub(crate) fn resolve_evidence(
    entry: &SourceEntry,
    passage: &Passage,
    passage_tokens: &TokenizedText,
    alignment: &Alignment,
    config: &CitationConfig,
) -> ResolvedEvidence {
    let token_spans = &passage_tokens.token_spans;
    let base = entry.base_offset + passage.doc_char_start;
    let char_start = base + token_spans[alignment.token_start].0;
    let char_end = base + token_spans[alignment.token_end - 1].1;
    let evidence = entry.substring(char_start, char_end);

    if !config.multi_span_evidence || alignment.match_blocks.is_empty() {
        return ResolvedEvidence {
            char_start,
            char_end,
            evidence,
            spans: Vec::new(),
            num_spans: 1,
        };
    }

    let mut merged: Vec<(usize, usize)> = Vec::new();
    for &(block_start, block_end) in &alignment.match_blocks {
        let range = (
            base + token_spans[block_start].0,
            base + token_spans[block_end - 1].1,
        );
        match merged.last_mut() {
            Some(last) if range.0 - last.1 <= config.multi_span_merge_gap_chars => {
                last.1 = range.1;
            }
            _ => merged.push(range),
        }
    }

    if merged.len() > config.multi_span_max_spans {
        // Too fragmented; fall back to the single enclosing span.
        let span = EvidenceSpan {
            char_start,
            char_end,
            evidence: evidence.clone(),
        };
        return ResolvedEvidence {
            char_start,
            char_end,
            evidence,
            spans: vec![span],
            num_spans: 1,
        };
    }

    let spans: Vec<EvidenceSpan> = merged
        .into_iter()
        .map(|(start, end)| EvidenceSpan {
            char_start: start,
            char_end: end,
            evidence: entry.substring(start, end),
        })
        .collect();
    let num_spans = spans.len();

    ResolvedEvidence {
        char_start,
        char_end,
        evidence,
        spans,
        num_spans,
    }
}

/// Evidence covering a whole passage, used for embedding-only citations.
pub(crate) fn passage_evidence(entry: &SourceEntry, passage: &Passage) -> ResolvedEvidence {
    let char_start = entry.base_offset + passage.doc_char_start;
    let char_end = entry.base_offset + passage.doc_char_end;
    let evidence = entry.substring(char_start, char_end);
    let span = EvidenceSpan {
        char_start,
        char_end,
        evidence: evidence.clone(),
    };
    ResolvedEvidence {
        char_start,
        char_end,
        evidence,
        spans: vec![span],
        num_spans: 1,
    }
}
