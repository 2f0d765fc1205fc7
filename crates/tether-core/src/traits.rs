use crate::types::{Alignment, AnswerSpan, Segment, TokenizedText};

/// Splits a source text into sentence-like segments with byte offsets.
pub trait Segmenter {
    fn segment(&self, text: &str) -> Vec<Segment>;
}

/// Splits an answer into sentence-like spans with byte offsets.
pub trait AnswerSegmenter {
    fn segment(&self, text: &str) -> Vec<AnswerSpan>;
}

/// Maps a text to token ids plus per-token byte spans.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> TokenizedText;
}

/// Produces fixed-size float vectors for semantic similarity.
///
/// Implementations may load models at construction time; `encode` itself
/// must be a re-entrant pure function.
pub trait Embedder {
    fn encode(&self, texts: &[&str]) -> Vec<Vec<f32>>;
}

/// Local alignment over integer token sequences.
///
/// Implementations must be interchangeable: any two backends produce
/// identical output on the same inputs, including tie-breaks and match
/// blocks. `Send + Sync` so candidate fan-out can run on worker threads.
pub trait TokenAligner: Send + Sync {
    /// Best local alignment of `query` against `candidate`.
    fn align(&self, query: &[u32], candidate: &[u32]) -> Alignment;

    /// Same as `align`, additionally populating `match_blocks`.
    fn align_with_blocks(&self, query: &[u32], candidate: &[u32]) -> Alignment;
}
