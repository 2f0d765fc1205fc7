use std::collections::HashMap;

use tether_core::types::{SpanCitations, SupportStatus};

/// How citation markers are rendered into the answer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// `[1]`
    Markdown,
    /// `^1`
    Superscript,
    /// `[^1]`
    Footnote,
}

impl MarkerStyle {
    fn render(self, number: usize) -> String {
        match self {
            MarkerStyle::Markdown => format!("[{number}]"),
            MarkerStyle::Superscript => format!("^{number}"),
            MarkerStyle::Footnote => format!("[^{number}]"),
        }
    }
}

/// Insert citation markers after each answer span.
///
/// Sources are numbered by first use across the results. Spans without
/// citations get a `[?]` marker when `include_unsupported` is set. The
/// results must come from aligning this exact answer; span offsets are
/// trusted.
pub fn annotate_answer(
    answer: &str,
    results: &[SpanCitations],
    style: MarkerStyle,
    include_unsupported: bool,
) -> String {
    let numbers = source_numbers(results);

    let mut out = String::with_capacity(answer.len() + results.len() * 4);
    let mut cursor = 0;

    for item in results {
        let span = &item.answer_span;
        if span.char_end < cursor || span.char_end > answer.len() {
            continue;
        }
        out.push_str(&answer[cursor..span.char_end]);
        cursor = span.char_end;

        if item.citations.is_empty() {
            if include_unsupported {
                out.push_str("[?]");
            }
            continue;
        }

        let mut seen: Vec<usize> = Vec::new();
        for citation in &item.citations {
            if let Some(&number) = numbers.get(&citation.source_index) {
                if !seen.contains(&number) {
                    seen.push(number);
                }
            }
        }
        for number in seen {
            out.push_str(&style.render(number));
        }
    }

    out.push_str(&answer[cursor..]);
    out
}

/// `annotate_answer` with markdown markers and unsupported spans unmarked.
pub fn format_with_citations(answer: &str, results: &[SpanCitations]) -> String {
    annotate_answer(answer, results, MarkerStyle::Markdown, false)
}

/// A plain-text report of span statuses and cited sources.
pub fn citation_summary(results: &[SpanCitations]) -> String {
    if results.is_empty() {
        return "Citation Summary: No spans were aligned.".to_string();
    }

    let supported = results
        .iter()
        .filter(|r| r.status == SupportStatus::Supported)
        .count();
    let partial = results
        .iter()
        .filter(|r| r.status == SupportStatus::Partial)
        .count();
    let unsupported = results
        .iter()
        .filter(|r| r.status == SupportStatus::Unsupported)
        .count();

    let mut out = format!(
        "Citation Summary: {} spans ({supported} supported, {partial} partial, {unsupported} unsupported)\n",
        results.len(),
    );

    let numbers = source_numbers(results);
    let mut by_number: Vec<(usize, &str, usize)> = Vec::new();
    for item in results {
        for citation in &item.citations {
            let Some(&number) = numbers.get(&citation.source_index) else {
                continue;
            };
            match by_number.iter_mut().find(|(n, _, _)| *n == number) {
                Some((_, _, count)) => *count += 1,
                None => by_number.push((number, citation.source_id.as_str(), 1)),
            }
        }
    }
    by_number.sort_by_key(|&(number, _, _)| number);
    for (number, source_id, count) in by_number {
        let plural = if count == 1 { "" } else { "s" };
        out.push_str(&format!(
            "  [{number}] {source_id}: {count} citation{plural}\n"
        ));
    }

    out
}

/// Number sources by first appearance in citation order.
fn source_numbers(results: &[SpanCitations]) -> HashMap<usize, usize> {
    let mut numbers = HashMap::new();
    let mut next = 1;
    for item in results {
        for citation in &item.citations {
            if !numbers.contains_key(&citation.source_index) {
                numbers.insert(citation.source_index, next);
                next += 1;
            }
        }
    }
    numbers
}
