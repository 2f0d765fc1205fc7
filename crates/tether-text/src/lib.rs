pub mod answer;
pub mod passage;
pub mod segment;
pub mod tokenize;

pub use answer::ParagraphAnswerSegmenter;
pub use passage::{build_passages, windows_from_segments, Passage};
pub use segment::SentenceSegmenter;
pub use tokenize::{TokenizerOptions, WordTokenizer};
