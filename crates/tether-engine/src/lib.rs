pub mod annotate;
mod candidates;
pub mod embed;
mod evidence;
pub mod pipeline;
mod scoring;
mod source;

pub use annotate::{annotate_answer, citation_summary, format_with_citations, MarkerStyle};
pub use embed::EmbeddingIndex;
pub use pipeline::{align_citations, CitationEngine};

// The full public surface in one place, as callers see it.
pub use tether_core::{
    align_best, align_topk, Alignment, AnswerSegmenter, AnswerSpan, Backend, Citation,
    CitationConfig, CitationError, CitationWeights, Embedder, EvidenceSpan, PackedAligner,
    ScoredAlignment, Segment, Segmenter, SmithWatermanAligner, SourceChunk, SourceDocument,
    SourceItem, SpanCitations, SpanKind, SupportStatus, TokenAligner, TokenizedText, Tokenizer,
};
pub use tether_text::{
    build_passages, windows_from_segments, ParagraphAnswerSegmenter, Passage, SentenceSegmenter,
    TokenizerOptions, WordTokenizer,
};
