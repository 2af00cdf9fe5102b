use super::{Highlight, SortArray, SortEngine, SortStats};

mod line {
    pub const CHECK_RANGE: usize = 1;
    pub const PARTITION: usize = 2;
    pub const RECURSE_LEFT: usize = 3;
    pub const RECURSE_RIGHT: usize = 4;
    pub const PIVOT: usize = 8;
    pub const SCAN: usize = 10;
    pub const COMPARE: usize = 11;
    pub const ADVANCE_WALL: usize = 12;
    pub const SWAP: usize = 13;
    pub const END: usize = 15;
    pub const PLACE_PIVOT: usize = 16;
}

/// A sub-range `low..=high` waiting to be partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickSortJob {
    pub low: usize,
    pub high: usize,
}

/// Quick sort with Lomuto partitioning and an explicit job stack.
///
/// Only ranges of two or more elements are ever pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickSort {
    jobs: Vec<QuickSortJob>,
    needs_partition: bool,
    pivot: i32,
    /// Wall: last index known to hold a value below the pivot, `low - 1` initially.
    i: isize,
    j: usize,
    low: usize,
    high: usize,
    sorted: bool,
    active: bool,
    current_line: usize,
    stats: SortStats,
}

impl Default for QuickSort {
    fn default() -> Self {
        Self {
            jobs: Vec::new(),
            needs_partition: true,
            pivot: 0,
            i: 0,
            j: 0,
            low: 0,
            high: 0,
            sorted: false,
            active: false,
            current_line: 0,
            stats: SortStats::default(),
        }
    }
}

impl QuickSort {
    pub fn jobs(&self) -> &[QuickSortJob] {
        &self.jobs
    }

    fn finish(&mut self, arr: &SortArray) {
        self.sorted = true;
        self.current_line = line::END;
        arr.highlight(&(0..arr.len()).collect::<Vec<_>>(), Highlight::Sorted);
        tracing::debug!("[quick] sorted after {} comparisons", self.stats.comparisons);
    }

    fn place_pivot(&mut self, arr: &mut SortArray) {
        let p = (self.i + 1) as usize;
        self.stats.array_accesses += 4;
        arr.swap(p, self.high);
        self.current_line = line::PLACE_PIVOT;
        arr.highlight(&[p], Highlight::Sorted);

        self.current_line = line::RECURSE_LEFT;
        if self.low + 1 < p {
            self.jobs.push(QuickSortJob {
                low: self.low,
                high: p - 1,
            });
        } else if self.low + 1 == p {
            arr.highlight(&[self.low], Highlight::Sorted);
        }

        self.current_line = line::RECURSE_RIGHT;
        if p + 1 < self.high {
            self.jobs.push(QuickSortJob {
                low: p + 1,
                high: self.high,
            });
        } else if p + 1 == self.high {
            arr.highlight(&[self.high], Highlight::Sorted);
        }

        tracing::trace!(
            "[quick] partitioned {}..={} around index {}",
            self.low,
            self.high,
            p
        );
        self.needs_partition = true;
    }
}

impl SortEngine for QuickSort {
    fn reset(&mut self, values: &[i32]) {
        let n = values.len();
        self.jobs.clear();
        self.needs_partition = true;
        self.pivot = 0;
        self.i = 0;
        self.j = 0;
        self.low = 0;
        self.high = n.saturating_sub(1);
        self.active = true;
        self.current_line = 0;
        self.stats = SortStats::default();
        self.sorted = n <= 1;
        if !self.sorted {
            self.jobs.push(QuickSortJob { low: 0, high: n - 1 });
        }
    }

    fn step(&mut self, arr: &mut SortArray) {
        if !self.active {
            return;
        }
        if self.sorted {
            self.current_line = line::END;
            return;
        }

        self.current_line = line::CHECK_RANGE;
        if self.needs_partition {
            let Some(job) = self.jobs.pop() else {
                self.finish(arr);
                return;
            };
            self.current_line = line::PARTITION;
            self.low = job.low;
            self.high = job.high;
            self.pivot = arr.get(self.high);
            self.stats.array_accesses += 1;
            self.i = self.low as isize - 1;
            self.j = self.low;
            self.needs_partition = false;
            self.current_line = line::PIVOT;
        }

        let mut marks = vec![self.high];
        if self.i >= self.low as isize {
            marks.push(self.i as usize);
        }
        if self.j < self.high {
            marks.push(self.j);
        }
        arr.highlight(&marks, Highlight::Compare);

        self.current_line = line::SCAN;
        if self.j >= self.high {
            self.place_pivot(arr);
            return;
        }

        self.current_line = line::COMPARE;
        self.stats.comparisons += 1;
        self.stats.array_accesses += 1;
        if arr.get(self.j) < self.pivot {
            self.i += 1;
            self.current_line = line::ADVANCE_WALL;
            self.stats.array_accesses += 4;
            arr.swap(self.i as usize, self.j);
            arr.highlight(&[self.i as usize, self.j], Highlight::Swap);
            self.current_line = line::SWAP;
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
