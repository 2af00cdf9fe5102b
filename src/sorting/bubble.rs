use super::{Highlight, SortArray, SortEngine, SortStats};

mod line {
    pub const REPEAT: usize = 2;
    pub const CLEAR_SWAPPED: usize = 3;
    pub const FOR: usize = 4;
    pub const COMPARE: usize = 5;
    pub const SWAP: usize = 6;
    pub const SET_SWAPPED: usize = 7;
    pub const SHRINK: usize = 10;
    pub const END: usize = 12;
}

/// Bubble sort with the early exit on a pass that swaps nothing.
///
/// `i` counts the passes already completed (the sorted suffix length) and `j`
/// is the left element of the next pair to compare.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct BubbleSort {
    i: usize,
    j: usize,
    swapped: bool,
    sorted: bool,
    active: bool,
    current_line: usize,
    stats: SortStats,
}

impl BubbleSort {
    fn finish(&mut self, arr: &SortArray) {
        self.sorted = true;
        self.current_line = line::END;
        arr.highlight(&(0..arr.len()).collect::<Vec<_>>(), Highlight::Sorted);
        tracing::debug!(
            "[bubble] sorted after {} comparisons",
            self.stats.comparisons
        );
    }
}

impl SortEngine for BubbleSort {
    fn reset(&mut self, _values: &[i32]) {
        *self = BubbleSort {
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

        self.current_line = line::REPEAT;
        if self.j >= n - self.i - 1 {
            self.current_line = line::SHRINK;
            arr.highlight(&[n - 1 - self.i], Highlight::Sorted);
            if !self.swapped {
                self.finish(arr);
                return;
            }
            self.swapped = false;
            self.i += 1;
            self.j = 0;
            self.current_line = line::CLEAR_SWAPPED;
        }

        if self.i >= n - 1 {
            self.finish(arr);
            return;
        }

        self.current_line = line::FOR;
        arr.highlight(&[self.j, self.j + 1], Highlight::Compare);

        self.current_line = line::COMPARE;
        self.stats.comparisons += 1;
        self.stats.array_accesses += 2;
        if arr.get(self.j) > arr.get(self.j + 1) {
            self.current_line = line::SWAP;
            // Two reads and two writes
            self.stats.array_accesses += 4;
            arr.swap(self.j, self.j + 1);
            arr.highlight(&[self.j, self.j + 1], Highlight::Swap);
            self.swapped = true;
            self.current_line = line::SET_SWAPPED;
        }
        self.j += 1;
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
        let mut bubble = BubbleSort::default();
        bubble.reset(arr.values());
        // Pass 1 swaps twice, pass 2 compares once and swaps nothing, then the
        // empty pass is detected on the fourth step.
        assert_eq!(run_to_completion(&mut bubble, &mut arr, 100), Some(4));
        assert_eq!(arr.values(), &[1, 2, 3]);
        assert_eq!(
            bubble.stats(),
            SortStats {
                comparisons: 3,
                array_accesses: 14
            }
        );
    }

    #[test]
    fn test_sorted_input_exits_after_one_pass() {
        let values = (0..10).collect::<Vec<_>>();
        let mut arr = SortArray::new(values.clone(), None);
        let mut bubble = BubbleSort::default();
        bubble.reset(&values);
        assert_eq!(run_to_completion(&mut bubble, &mut arr, 100), Some(10));
        assert_eq!(bubble.stats().comparisons, 9);
        assert_eq!(bubble.stats().array_accesses, 18);
        assert_eq!(bubble.current_line(), line::END);
    }

    #[test]
    fn test_one_comparison_per_step() {
        let mut arr = SortArray::new(vec![2, 1, 3], None);
        let mut bubble = BubbleSort::default();
        bubble.reset(arr.values());
        bubble.step(&mut arr);
        assert_eq!(bubble.stats().comparisons, 1);
        assert_eq!(arr.values(), &[1, 2, 3]);
        assert!(!bubble.is_sorted());
    }

    #[test]
    fn test_trivial_inputs() {
        for values in [vec![], vec![42]] {
            let mut arr = SortArray::new(values.clone(), None);
            let mut bubble = BubbleSort::default();
            bubble.reset(&values);
            bubble.step(&mut arr);
            assert!(bubble.is_sorted());
            assert_eq!(bubble.stats(), SortStats::default());
        }
    }

    #[test]
    fn test_reset_after_run() {
        let mut arr = SortArray::new(vec![2, 1], None);
        let mut bubble = BubbleSort::default();
        bubble.reset(arr.values());
        run_to_completion(&mut bubble, &mut arr, 100);
        bubble.reset(arr.values());
        let mut fresh = BubbleSort::default();
        fresh.reset(arr.values());
        assert_eq!(bubble, fresh);
        assert!(!bubble.is_sorted());
    }
}
