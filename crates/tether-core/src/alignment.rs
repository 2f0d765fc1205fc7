use crate::traits::TokenAligner;
use crate::types::Alignment;

pub(crate) const DIR_STOP: u8 = 0;
pub(crate) const DIR_DIAG: u8 = 1;
pub(crate) const DIR_UP: u8 = 2;
pub(crate) const DIR_LEFT: u8 = 3;

/// Reference Smith-Waterman local aligner over token ids.
///
/// Linear gap model. Traceback direction priority on score ties is
/// DIAG > UP > LEFT, and among cells attaining the maximum score the
/// winning endpoint is the one whose traceback yields the smallest
/// `(token_start, -span_len, query_start, token_end, query_end)` tuple.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SmithWatermanAligner {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_score: i32,
}

impl Default for SmithWatermanAligner {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_score: -1,
            gap_score: -1,
        }
    }
}

impl SmithWatermanAligner {
    pub fn new(match_score: i32, mismatch_score: i32, gap_score: i32) -> Self {
        Self {
            match_score,
            mismatch_score,
            gap_score,
        }
    }

    fn align_impl(&self, query: &[u32], candidate: &[u32], track_blocks: bool) -> Alignment {
        let m = query.len();
        let n = candidate.len();
        if m == 0 || n == 0 {
            return Alignment::none();
        }

        let rows = m + 1;
        let cols = n + 1;

        // Full matrices, flat-indexed. Row 0 and column 0 stay zero.
        let mut scores = vec![0i32; rows * cols];
        let mut dirs = vec![DIR_STOP; rows * cols];
        let idx = |i: usize, j: usize| -> usize { i * cols + j };

        let mut max_score = 0i32;
        let mut endpoints: Vec<(usize, usize)> = Vec::new();

        for i in 1..rows {
            for j in 1..cols {
                let substitution = if query[i - 1] == candidate[j - 1] {
                    self.match_score
                } else {
                    self.mismatch_score
                };
                let diag = scores[idx(i - 1, j - 1)] + substitution;
                let up = scores[idx(i - 1, j)] + self.gap_score;
                let left = scores[idx(i, j - 1)] + self.gap_score;

                let best = diag.max(up).max(left).max(0);
                if best > 0 {
                    scores[idx(i, j)] = best;
                    dirs[idx(i, j)] = choose_direction(best, diag, up);
                }

                if best > max_score {
                    max_score = best;
                    endpoints.clear();
                    endpoints.push((i, j));
                } else if best == max_score && best > 0 {
                    endpoints.push((i, j));
                }
            }
        }

        if max_score == 0 {
            return Alignment::none();
        }

        resolve_best(
            max_score,
            &endpoints,
            |i, j| dirs[idx(i, j)],
            query,
            candidate,
            track_blocks,
        )
    }
}

impl TokenAligner for SmithWatermanAligner {
    fn align(&self, query: &[u32], candidate: &[u32]) -> Alignment {
        self.align_impl(query, candidate, false)
    }

    fn align_with_blocks(&self, query: &[u32], candidate: &[u32]) -> Alignment {
        self.align_impl(query, candidate, true)
    }
}

/// Direction for a positive cell, DIAG > UP > LEFT on ties.
pub(crate) fn choose_direction(best: i32, diag: i32, up: i32) -> u8 {
    if best == diag {
        DIR_DIAG
    } else if best == up {
        DIR_UP
    } else {
        DIR_LEFT
    }
}

/// Walk back from every maximum-score endpoint and keep the tie-broken best.
///
/// Shared by the reference and accelerated backends so both produce
/// identical output; `dir_at` abstracts over the direction-matrix storage.
pub(crate) fn resolve_best<D>(
    score: i32,
    endpoints: &[(usize, usize)],
    dir_at: D,
    query: &[u32],
    candidate: &[u32],
    track_blocks: bool,
) -> Alignment
where
    D: Fn(usize, usize) -> u8,
{
    let mut best_key: Option<(usize, i64, usize, usize, usize)> = None;
    let mut best = Alignment::none();
    let mut best_matched: Vec<usize> = Vec::new();

    for &(i_end, j_end) in endpoints {
        let mut i = i_end;
        let mut j = j_end;
        let mut matches = 0usize;
        let mut matched: Vec<usize> = Vec::new();

        loop {
            let dir = if i > 0 && j > 0 { dir_at(i, j) } else { DIR_STOP };
            match dir {
                DIR_DIAG => {
                    if query[i - 1] == candidate[j - 1] {
                        matches += 1;
                        if track_blocks {
                            matched.push(j - 1);
                        }
                    }
                    i -= 1;
                    j -= 1;
                }
                DIR_UP => i -= 1,
                DIR_LEFT => j -= 1,
                _ => break,
            }
        }

        let span_len = (j_end - j) as i64;
        let key = (j, -span_len, i, j_end, i_end);
        if best_key.map_or(true, |current| key < current) {
            best_key = Some(key);
            best = Alignment {
                score,
                token_start: j,
                token_end: j_end,
                query_start: i,
                query_end: i_end,
                matches,
                match_blocks: Vec::new(),
            };
            best_matched = matched;
        }
    }

    if track_blocks {
        best.match_blocks = group_match_blocks(best_matched);
    }
    best
}

/// Group candidate token indices into maximal half-open runs.
fn group_match_blocks(mut indices: Vec<usize>) -> Vec<(usize, usize)> {
    indices.sort_unstable();
    let mut blocks: Vec<(usize, usize)> = Vec::new();
    for index in indices {
        match blocks.last_mut() {
            Some((_, end)) if *end == index => *end += 1,
            _ => blocks.push((index, index + 1)),
        }
    }
    blocks
}
