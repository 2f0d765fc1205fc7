use crate::alignment::{choose_direction, resolve_best, DIR_STOP};
use crate::traits::TokenAligner;
use crate::types::Alignment;

/// Accelerated Smith-Waterman backend.
///
/// Scores live in two rolling rows; only the traceback directions are kept
/// for the whole matrix, packed to 2 bits per cell. Output is byte-identical
/// to `SmithWatermanAligner`, including tie-breaks and match blocks.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PackedAligner {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_score: i32,
}

impl Default for PackedAligner {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_score: -1,
            gap_score: -1,
        }
    }
}

impl PackedAligner {
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

        let mut dirs = DirectionMatrix::new(rows, cols);
        let mut prev_row = vec![0i32; cols];
        let mut row = vec![0i32; cols];

        let mut max_score = 0i32;
        let mut endpoints: Vec<(usize, usize)> = Vec::new();

        for i in 1..rows {
            row[0] = 0;
            for j in 1..cols {
                let substitution = if query[i - 1] == candidate[j - 1] {
                    self.match_score
                } else {
                    self.mismatch_score
                };
                let diag = prev_row[j - 1] + substitution;
                let up = prev_row[j] + self.gap_score;
                let left = row[j - 1] + self.gap_score;

                let best = diag.max(up).max(left).max(0);
                row[j] = best;
                if best > 0 {
                    dirs.set(i, j, choose_direction(best, diag, up));
                }

                if best > max_score {
                    max_score = best;
                    endpoints.clear();
                    endpoints.push((i, j));
                } else if best == max_score && best > 0 {
                    endpoints.push((i, j));
                }
            }
            std::mem::swap(&mut prev_row, &mut row);
        }

        if max_score == 0 {
            return Alignment::none();
        }

        resolve_best(
            max_score,
            &endpoints,
            |i, j| dirs.get(i, j),
            query,
            candidate,
            track_blocks,
        )
    }
}

impl TokenAligner for PackedAligner {
    fn align(&self, query: &[u32], candidate: &[u32]) -> Alignment {
        self.align_impl(query, candidate, false)
    }

    fn align_with_blocks(&self, query: &[u32], candidate: &[u32]) -> Alignment {
        self.align_impl(query, candidate, true)
    }
}

/// Traceback directions packed four cells to a byte.
struct DirectionMatrix {
    cells: Vec<u8>,
    cols: usize,
}

impl DirectionMatrix {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![DIR_STOP; (rows * cols).div_ceil(4)],
            cols,
        }
    }

    fn set(&mut self, i: usize, j: usize, dir: u8) {
        let cell = i * self.cols + j;
        self.cells[cell >> 2] |= dir << ((cell & 3) * 2);
    }

    fn get(&self, i: usize, j: usize) -> u8 {
        let cell = i * self.cols + j;
        (self.cells[cell >> 2] >> ((cell & 3) * 2)) & 3
    }
}
