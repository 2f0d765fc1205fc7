pub mod alignment;
pub mod config;
pub mod error;
pub mod packed;
pub mod topk;
pub mod traits;
pub mod types;

pub use alignment::SmithWatermanAligner;
pub use config::{CitationConfig, CitationWeights};
pub use error::CitationError;
pub use packed::PackedAligner;
pub use topk::{align_best, align_topk, Backend, ScoredAlignment};
pub use traits::{AnswerSegmenter, Embedder, Segmenter, TokenAligner, Tokenizer};
pub use types::*;
