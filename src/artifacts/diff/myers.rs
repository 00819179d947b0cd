//! Myers' O(ND) shortest edit script
//!
//! The forward pass records the furthest-reaching `x` on every diagonal `k`
//! for each edit distance `d`; the backward pass walks that trace from the end
//! of both sequences to recover the path. Edits refer to positions in the
//! input slices rather than copying values, so callers can recover line
//! numbers on either side.

use derive_new::new;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Delete { old: usize },
    Insert { new: usize },
    Equal { old: usize, new: usize },
}

impl Edit {
    pub fn is_change(&self) -> bool {
        !matches!(self, Edit::Equal { .. })
    }
}

pub trait DiffAlgorithm {
    fn diff(&self) -> Vec<Edit>;

    /// Length of the longest common subsequence found by the edit script
    fn lcs_len(&self) -> usize {
        self.diff().iter().filter(|edit| !edit.is_change()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct MyersDiff<'d, T> {
    a: &'d [T],
    b: &'d [T],
}

/// Edit distance past which the search gives up and replaces the whole sequence
///
/// The trace keeps one window of `2d + 3` diagonals per step, so memory stays
/// quadratic in this bound rather than growing with the input length.
pub const MAX_EDIT_DISTANCE: usize = 2048;

impl<T: Eq> MyersDiff<'_, T> {
    // Diagonal k lives at index `k + offset`; one spare slot on each side
    fn offset(&self) -> isize {
        (self.a.len() + self.b.len()) as isize + 1
    }

    /// Per-step snapshots of diagonals `-d-1..=d+1`, or `None` past [`MAX_EDIT_DISTANCE`]
    fn compute_shortest_edit(&self) -> Option<Vec<Vec<isize>>> {
        let (n, m) = (self.a.len() as isize, self.b.len() as isize);
        let offset = self.offset();
        let max_d = (n + m).min(MAX_EDIT_DISTANCE as isize);

        let mut v = vec![0; 2 * offset as usize + 1];
        let mut trace = Vec::new();

        for d in 0..=max_d {
            trace.push(v[(offset - d - 1) as usize..=(offset + d + 1) as usize].to_vec());

            for k in (-d..=d).step_by(2) {
                let idx = (offset + k) as usize;

                let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                    // came down from diagonal k+1: an insertion
                    v[idx + 1]
                } else {
                    // came across from diagonal k-1: a deletion
                    v[idx - 1] + 1
                };

                let mut y = x - k;
                while x < n && y < m && self.a[x as usize] == self.b[y as usize] {
                    x += 1;
                    y += 1;
                }

                v[idx] = x;

                if x >= n && y >= m {
                    return Some(trace);
                }
            }
        }

        tracing::debug!(
            old_len = n,
            new_len = m,
            max = MAX_EDIT_DISTANCE,
            "edit distance limit reached, replacing whole sequence"
        );
        None
    }

    fn backtrack(&self, trace: &[Vec<isize>]) -> Vec<(isize, isize, isize, isize)> {
        let (mut x, mut y) = (self.a.len() as isize, self.b.len() as isize);
        let mut path = Vec::new();

        for (d, v) in trace.iter().enumerate().rev() {
            let d = d as isize;
            let k = x - y;
            // snapshot index of diagonal k at step d
            let at = |k: isize| v[(k + d + 1) as usize];

            let came_down = k == -d || (k != d && at(k - 1) < at(k + 1));
            let prev_k = if came_down {
                k + 1
            } else {
                k - 1
            };

            let prev_x = at(prev_k);
            let prev_y = prev_x - prev_k;

            while x > prev_x && y > prev_y {
                path.push((x - 1, y - 1, x, y));
                x -= 1;
                y -= 1;
            }

            if d > 0 {
                path.push((prev_x, prev_y, x, y));
            }

            (x, y) = (prev_x, prev_y);
        }

        path
    }

    fn replace_all(&self) -> Vec<Edit> {
        (0..self.a.len())
            .map(|old| Edit::Delete { old })
            .chain((0..self.b.len()).map(|new| Edit::Insert { new }))
            .collect()
    }
}

impl<T: Eq> DiffAlgorithm for MyersDiff<'_, T> {
    fn diff(&self) -> Vec<Edit> {
        if self.a.is_empty() && self.b.is_empty() {
            return Vec::new();
        }
        let Some(trace) = self.compute_shortest_edit() else {
            return self.replace_all();
        };

        let mut edits = self
            .backtrack(&trace)
            .into_iter()
            .map(|(prev_x, prev_y, x, y)| {
                if x == prev_x {
                    Edit::Insert {
                        new: prev_y as usize,
                    }
                } else if y == prev_y {
                    Edit::Delete {
                        old: prev_x as usize,
                    }
                } else {
                    Edit::Equal {
                        old: prev_x as usize,
                        new: prev_y as usize,
                    }
                }
            })
            .collect::<Vec<_>>();

        edits.reverse();
        edits
    }
}
