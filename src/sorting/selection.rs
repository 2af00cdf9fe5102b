use super::{Highlight, SortArray, SortEngine, SortStats};

mod line {
    pub const OUTER: usize = 2;
    pub const INIT_MIN: usize = 3;
    pub const SCAN: usize = 4;
    pub const COMPARE: usize = 5;
    pub const NEW_MIN: usize = 6;
    pub const SWAP: usize = 9;
    pub const END: usize = 11;
}

/// Selection sort in two phases per outer iteration: scan for the minimum one
/// comparison at a time, then swap it into place in a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSort {
    i: usize,
    j: usize,
    min_idx: usize,
    finding_min: bool,
    sorted: bool,
    active: bool,
    current_line: usize,
    stats: SortStats,
}

impl Default for SelectionSort {
    fn default() -> Self {
        Self {
            i: 0,
            j: 1,
            min_idx: 0,
            finding_min: true,
            sorted: false,
            active: false,
            current_line: 0,
            stats: SortStats::default(),
        }
    }
}

impl SelectionSort {
    fn finish(&mut self, arr: &SortArray) {
        self.sorted = true;
        self.current_line = line::END;
        arr.highlight(&(0..arr.len()).collect::<Vec<_>>(), Highlight::Sorted);
        tracing::debug!(
            "[selection] sorted after {} comparisons",
            self.stats.comparisons
        );
    }
}

impl SortEngine for SelectionSort {
    fn reset(&mut self, _values: &[i32]) {
        *self = SelectionSort {
            active: true,
            ..Default::default()
        };
    }

    fn step(&mut self, arr: &mut SortArray) {
        if !self.active {
            return;
        }
        if self.sorted {
            self.current_line = line::END;
            return;
        }
        let n = arr.len();
        if n < 2 {
            self.finish(arr);
            return;
        }

        self.current_line = line::OUTER;
        if self.finding_min {
            self.current_line = line::SCAN;
            if self.j < n {
                arr.highlight(&[self.j, self.min_idx], Highlight::Compare);
                self.current_line = line::COMPARE;
                self.stats.comparisons += 1;
                self.stats.array_accesses += 2;
                if arr.get(self.j) < arr.get(self.min_idx) {
                    self.current_line = line::NEW_MIN;
                    self.min_idx = self.j;
                }
                self.j += 1;
            } else {
                self.finding_min = false;
            }
            return;
        }

        self.current_line = line::SWAP;
        self.stats.array_accesses += 4;
        arr.swap(self.min_idx, self.i);
        arr.highlight(&[self.i], Highlight::Sorted);
        self.i += 1;

        if self.i >= n - 1 {
            self.finish(arr);
            return;
        }

        self.min_idx = self.i;
        self.j = self.i + 1;
        self.finding_min = true;
        self.current_line = line::INIT_MIN;
    }

    fn is_sorted(&self) -> bool {
        self.sorted
    }

    fn stats(&self) -> SortStats {
        self.stats
    }

    fn current_line(&self) -> usize {
        self.current_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorting::run_to_completion;

    #[test]
    fn test_small_array_counts() {
        let mut arr = SortArray::new(vec![3, 1, 2], None);
        let mut selection = SelectionSort::default();
        selection.reset(arr.values());
        // i=0: 2 comparisons, end-of-scan step, swap. i=1: 1 comparison,
        // end-of-scan step, swap.
        assert_eq!(run_to_completion(&mut selection, &mut arr, 100), Some(7));
        assert_eq!(arr.values(), &[1, 2, 3]);
        assert_eq!(
            selection.stats(),
            SortStats {
                comparisons: 3,
                array_accesses: 14
            }
        );
    }

    #[test]
    fn test_swap_happens_even_when_minimum_is_in_place() {
        let mut arr = SortArray::new(vec![1, 2], None);
        let mut selection = SelectionSort::default();
        selection.reset(arr.values());
        run_to_completion(&mut selection, &mut arr, 100);
        assert_eq!(selection.stats().array_accesses, 2 + 4);
    }

    #[test]
    fn test_not_armed_before_reset() {
        let mut arr = SortArray::new(vec![2, 1], None);
        let mut selection = SelectionSort::default();
        selection.step(&mut arr);
        assert_eq!(selection.stats(), SortStats::default());
        assert_eq!(arr.values(), &[2, 1]);
    }
}
