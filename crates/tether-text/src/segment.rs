use tether_core::traits::Segmenter;
use tether_core::types::Segment;

/// Rule-based sentence segmenter.
///
/// Splits on `.`, `?`, `!` followed by whitespace or end of text, on `;`
/// unconditionally, and (optionally) on newlines. Runs of terminal
/// punctuation like `?!` or `...` stay with the sentence they close.
/// Segments are whitespace-trimmed and carry byte offsets into the input.
#[derive(Debug, Clone)]
pub struct SentenceSegmenter {
    pub split_on_newlines: bool,
}

impl Default for SentenceSegmenter {
    fn default() -> Self {
        Self {
            split_on_newlines: true,
        }
    }
}

impl SentenceSegmenter {
    pub fn new(split_on_newlines: bool) -> Self {
        Self { split_on_newlines }
    }
}

impl Segmenter for SentenceSegmenter {
    fn segment(&self, text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        // Byte scan: every boundary character is ASCII, so slice positions
        // derived from it are always on character boundaries.
        let bytes = text.as_bytes();
        let len = bytes.len();
        let mut start = 0;
        let mut idx = 0;

        while idx < len {
            let byte = bytes[idx];

            if byte == b'\n' && self.split_on_newlines {
                push_segment(text, start, idx, &mut segments);
                start = idx + 1;
                idx += 1;
                continue;
            }

            if matches!(byte, b'.' | b'?' | b'!') && is_sentence_boundary(text, idx) {
                let mut end = idx + 1;
                while end < len && matches!(bytes[end], b'.' | b'?' | b'!') {
                    end += 1;
                }
                push_segment(text, start, end, &mut segments);
                start = end;
                idx = end;
                continue;
            }

            if byte == b';' {
                push_segment(text, start, idx + 1, &mut segments);
                start = idx + 1;
                idx += 1;
                continue;
            }

            idx += 1;
        }

        push_segment(text, start, len, &mut segments);
        segments
    }
}

fn is_sentence_boundary(text: &str, idx: usize) -> bool {
    match text[idx + 1..].chars().next() {
        Some(next) => next.is_whitespace(),
        None => true,
    }
}

fn push_segment(text: &str, start: usize, end: usize, segments: &mut Vec<Segment>) {
    if start >= end {
        return;
    }
    let snippet = &text[start..end];
    let trimmed_start = start + (snippet.len() - snippet.trim_start().len());
    let trimmed_end = end - (snippet.len() - snippet.trim_end().len());
    if trimmed_start >= trimmed_end {
        return;
    }
    segments.push(Segment {
        text: text[trimmed_start..trimmed_end].to_string(),
        doc_char_start: trimmed_start,
        doc_char_end: trimmed_end,
    });
}
