use super::{Highlight, SortArray, SortEngine, SortStats};

mod line {
    pub const OUTER: usize = 1;
    pub const PICK_KEY: usize = 2;
    pub const INIT_J: usize = 3;
    pub const WHILE: usize = 4;
    pub const SHIFT: usize = 5;
    pub const DECREMENT: usize = 6;
    pub const INSERT: usize = 8;
    pub const END: usize = 10;
}

/// Insertion sort. Each step either shifts one element of the sorted prefix to
/// the right or drops the held key into its slot; picking up a new key happens
/// at the start of the step that first compares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionSort {
    i: usize,
    /// Scan position in the sorted prefix, -1 once it runs off the front.
    j: isize,
    key: i32,
    key_picked_up: bool,
    sorted: bool,
    active: bool,
    current_line: usize,
    stats: SortStats,
}

impl Default for InsertionSort {
    fn default() -> Self {
        Self {
            i: 1,
            j: 0,
            key: 0,
            key_picked_up: false,
            sorted: false,
            active: false,
            current_line: 0,
            stats: SortStats::default(),
        }
    }
}

impl InsertionSort {
    fn finish(&mut self, arr: &SortArray) {
        self.sorted = true;
        self.current_line = line::END;
        arr.highlight(&(0..arr.len()).collect::<Vec<_>>(), Highlight::Sorted);
        tracing::debug!(
            "[insertion] sorted after {} comparisons",
            self.stats.comparisons
        );
    }
}

impl SortEngine for InsertionSort {
    fn reset(&mut self, _values: &[i32]) {
        *self = InsertionSort {
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
        if !self.key_picked_up {
            self.current_line = line::PICK_KEY;
            self.key = arr.get(self.i);
            self.stats.array_accesses += 1;

            self.current_line = line::INIT_J;
            self.j = self.i as isize - 1;
            self.key_picked_up = true;
        }

        match usize::try_from(self.j) {
            Ok(j) => arr.highlight(&[self.i, j], Highlight::Compare),
            Err(_) => arr.highlight(&[self.i], Highlight::Compare),
        }

        self.current_line = line::WHILE;
        let mut shift_from = None;
        if let Ok(j) = usize::try_from(self.j) {
            self.stats.comparisons += 1;
            self.stats.array_accesses += 1;
            if arr.get(j) > self.key {
                shift_from = Some(j);
            }
        }

        match shift_from {
            Some(j) => {
                self.current_line = line::SHIFT;
                arr.set(j + 1, arr.get(j));
                self.stats.array_accesses += 2;
                arr.highlight(&[j + 1], Highlight::Swap);

                self.current_line = line::DECREMENT;
                self.j -= 1;
            }
            None => {
                self.current_line = line::INSERT;
                let slot = (self.j + 1) as usize;
                arr.set(slot, self.key);
                self.stats.array_accesses += 1;
                arr.highlight(&[slot], Highlight::Sorted);

                self.i += 1;
                if self.i >= n {
                    self.finish(arr);
                    return;
                }
                self.key_picked_up = false;
            }
        }
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
        let mut insertion = InsertionSort::default();
        insertion.reset(arr.values());
        // key 1: shift 3, insert at 0. key 2: shift 3, stop at 1, insert.
        assert_eq!(run_to_completion(&mut insertion, &mut arr, 100), Some(4));
        assert_eq!(arr.values(), &[1, 2, 3]);
        assert_eq!(
            insertion.stats(),
            SortStats {
                comparisons: 3,
                array_accesses: 11
            }
        );
    }

    #[test]
    fn test_sorted_input_has_no_shifts() {
        let values = vec![1, 2, 3, 4];
        let mut arr = SortArray::new(values.clone(), None);
        let mut insertion = InsertionSort::default();
        insertion.reset(&values);
        assert_eq!(run_to_completion(&mut insertion, &mut arr, 100), Some(3));
        // Per key: one read, one comparison read, one write
        assert_eq!(insertion.stats().comparisons, 3);
        assert_eq!(insertion.stats().array_accesses, 9);
    }

    #[test]
    fn test_duplicates_stay_in_place() {
        let mut arr = SortArray::new(vec![2, 2, 1], None);
        let mut insertion = InsertionSort::default();
        insertion.reset(arr.values());
        run_to_completion(&mut insertion, &mut arr, 100);
        assert_eq!(arr.values(), &[1, 2, 2]);
    }
}
