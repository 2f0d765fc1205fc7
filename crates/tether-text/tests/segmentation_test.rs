//! End-to-end checks over the text layer: segmentation, windowing, and
//! tokenization agree on offsets for realistic documents.

use tether_core::traits::{AnswerSegmenter, Segmenter, Tokenizer};
use tether_text::{
    build_passages, ParagraphAnswerSegmenter, SentenceSegmenter, WordTokenizer,
};

const REPORT: &str = "Quarterly results exceeded expectations. Revenue reached 5.2 billion \
dollars, up 14% year over year. Margins, however, contracted; analysts blamed input costs.\n\
Management guided for 8% growth. A buyback of $2,000,000,000 was announced!";

#[test]
fn test_report_segments_reproduce_offsets() {
    let segmenter = SentenceSegmenter::default();
    let segments = segmenter.segment(REPORT);

    assert!(segments.len() >= 5);
    for segment in &segments {
        assert_eq!(
            &REPORT[segment.doc_char_start..segment.doc_char_end],
            segment.text
        );
        assert!(!segment.text.trim().is_empty());
    }

    // Ordered and non-overlapping.
    for pair in segments.windows(2) {
        assert!(pair[0].doc_char_end <= pair[1].doc_char_start);
    }
}

#[test]
fn test_report_passages_cover_between_segment_text() {
    let segmenter = SentenceSegmenter::default();
    let passages = build_passages(REPORT, &segmenter, 2, 1);

    for passage in &passages {
        assert_eq!(
            &REPORT[passage.doc_char_start..passage.doc_char_end],
            passage.text
        );
        assert!(passage.segment_start < passage.segment_end);
    }

    // A two-segment window keeps the separator text between sentences.
    let first = &passages[0];
    assert!(first.text.contains("expectations. Revenue"));
}

#[test]
fn test_report_tokens_lie_inside_their_passage() {
    let segmenter = SentenceSegmenter::default();
    let tokenizer = WordTokenizer::default();

    for passage in build_passages(REPORT, &segmenter, 1, 1) {
        let tokens = tokenizer.tokenize(&passage.text);
        assert!(tokens.validate().is_ok());
        assert!(!tokens.is_empty());
        for &(start, end) in &tokens.token_spans {
            assert!(end <= passage.text.len());
            assert!(!passage.text[start..end].trim().is_empty());
        }
    }
}

#[test]
fn test_report_numbers_and_symbols_tokenize_as_expected() {
    let tokenizer = WordTokenizer::default();
    let tokens = tokenizer.tokenize(REPORT);
    let texts: Vec<&str> = tokens
        .token_spans
        .iter()
        .map(|&(start, end)| &REPORT[start..end])
        .collect();

    assert!(texts.contains(&"5.2"));
    assert!(texts.contains(&"14"));
    assert!(texts.contains(&"%"));
    assert!(texts.contains(&"$"));
    assert!(texts.contains(&"2,000,000,000"));

    // The grouped number matches its plain form after normalisation.
    let grouped = tokenizer.tokenize("2,000,000,000");
    let plain = tokenizer.tokenize("2000000000");
    assert_eq!(grouped.token_ids, plain.token_ids);
}

#[test]
fn test_answer_segmenter_on_multi_paragraph_report() {
    let answer = "Revenue grew strongly. Margins contracted.\n\nGuidance implies 8% growth; \
                  buybacks continue.";
    let segmenter = ParagraphAnswerSegmenter::new();
    let spans = segmenter.segment(answer);

    assert_eq!(spans.len(), 4);
    assert_eq!(spans[0].text, "Revenue grew strongly.");
    assert_eq!(spans[1].text, "Margins contracted.");
    assert_eq!(spans[2].text, "Guidance implies 8% growth;");
    assert_eq!(spans[3].text, "buybacks continue.");

    assert_eq!(spans[1].paragraph_index, Some(0));
    assert_eq!(spans[2].paragraph_index, Some(1));
    assert_eq!(
        spans.iter().map(|s| s.sentence_index).collect::<Vec<_>>(),
        vec![Some(0), Some(1), Some(2), Some(3)]
    );

    for span in &spans {
        assert_eq!(&answer[span.char_start..span.char_end], span.text);
    }
}

#[test]
fn test_shared_tokenizer_gives_equal_ids_across_texts() {
    let tokenizer = WordTokenizer::default();
    let answer = tokenizer.tokenize("Revenue reached 5.2 billion dollars.");
    let source = tokenizer.tokenize("Filings show revenue reached 5.2 billion dollars in total.");

    // Every answer token id appears among the source ids.
    for id in &answer.token_ids {
        assert!(source.token_ids.contains(id));
    }
}

#[test]
fn test_segmenter_handles_crlf_like_documents() {
    let text = "First line.\nSecond line.\nThird line without period";
    let segmenter = SentenceSegmenter::default();
    let segments = segmenter.segment(text);
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[2].text, "Third line without period");
    for segment in &segments {
        assert_eq!(&text[segment.doc_char_start..segment.doc_char_end], segment.text);
    }
}
