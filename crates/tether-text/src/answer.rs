use regex::Regex;
use tether_core::traits::{AnswerSegmenter, Segmenter};
use tether_core::types::{AnswerSpan, SpanKind};

use crate::segment::SentenceSegmenter;

const PARAGRAPH_BREAK: &str = r"\n[ \t]*\n+";

/// Paragraph-aware answer segmenter.
///
/// Paragraphs are separated by one or more blank lines; each paragraph is
/// split into sentences. Spans carry paragraph and running sentence indices
/// plus byte offsets into the whole answer.
#[derive(Debug, Clone)]
pub struct ParagraphAnswerSegmenter {
    sentences: SentenceSegmenter,
    paragraph_break: Regex,
}

impl Default for ParagraphAnswerSegmenter {
    fn default() -> Self {
        Self {
            sentences: SentenceSegmenter::new(false),
            paragraph_break: Regex::new(PARAGRAPH_BREAK).expect("paragraph break pattern is valid"),
        }
    }
}

impl ParagraphAnswerSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn paragraph_spans(&self, text: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut start = 0;
        for found in self.paragraph_break.find_iter(text) {
            if let Some(span) = trim_span(text, start, found.start()) {
                spans.push(span);
            }
            start = found.end();
        }
        if let Some(span) = trim_span(text, start, text.len()) {
            spans.push(span);
        }
        spans
    }
}

impl AnswerSegmenter for ParagraphAnswerSegmenter {
    fn segment(&self, text: &str) -> Vec<AnswerSpan> {
        let mut spans = Vec::new();
        let mut sentence_index = 0;

        for (paragraph_index, (para_start, para_end)) in
            self.paragraph_spans(text).into_iter().enumerate()
        {
            let paragraph = &text[para_start..para_end];
            for sentence in self.sentences.segment(paragraph) {
                spans.push(AnswerSpan {
                    text: sentence.text,
                    char_start: para_start + sentence.doc_char_start,
                    char_end: para_start + sentence.doc_char_end,
                    kind: SpanKind::Sentence,
                    paragraph_index: Some(paragraph_index),
                    sentence_index: Some(sentence_index),
                });
                sentence_index += 1;
            }
        }

        spans
    }
}

fn trim_span(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    if start >= end {
        return None;
    }
    let snippet = &text[start..end];
    let trimmed_start = start + (snippet.len() - snippet.trim_start().len());
    let trimmed_end = end - (snippet.len() - snippet.trim_end().len());
    if trimmed_start >= trimmed_end {
        return None;
    }
    Some((trimmed_start, trimmed_end))
}
