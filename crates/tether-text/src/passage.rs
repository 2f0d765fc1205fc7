use serde::{Deserialize, Serialize};

use tether_core::traits::Segmenter;
use tether_core::types::Segment;

/// A contiguous window of source segments, the unit of citation scoring.
///
/// `text` is the exact source substring between the first segment's start
/// and the last segment's end, so inter-sentence whitespace and punctuation
/// are preserved. `segment_start..segment_end` are the window's indices
/// into the segment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub doc_char_start: usize,
    pub doc_char_end: usize,
    pub segment_start: usize,
    pub segment_end: usize,
}

/// Slide a window over pre-computed segments.
///
/// Iteration stops once a window reaches the final segment; no partial
/// window is emitted after the last full one. Empty segment lists yield no
/// passages.
pub fn windows_from_segments(
    text: &str,
    segments: &[Segment],
    window_size_sentences: usize,
    window_stride_sentences: usize,
) -> Vec<Passage> {
    if segments.is_empty() {
        return Vec::new();
    }

    let window = window_size_sentences.max(1);
    let stride = window_stride_sentences.max(1);

    let mut passages = Vec::new();
    let mut idx = 0;

    while idx < segments.len() {
        let end_idx = (idx + window).min(segments.len());
        let start = segments[idx].doc_char_start;
        let end = segments[end_idx - 1].doc_char_end;
        passages.push(Passage {
            text: text[start..end].to_string(),
            doc_char_start: start,
            doc_char_end: end,
            segment_start: idx,
            segment_end: end_idx,
        });
        if end_idx == segments.len() {
            break;
        }
        idx += stride;
    }

    passages
}

/// Segment a source text and build its sentence-window passages.
pub fn build_passages(
    text: &str,
    segmenter: &dyn Segmenter,
    window_size_sentences: usize,
    window_stride_sentences: usize,
) -> Vec<Passage> {
    let segments = segmenter.segment(text);
    windows_from_segments(
        text,
        &segments,
        window_size_sentences,
        window_stride_sentences,
    )
}
