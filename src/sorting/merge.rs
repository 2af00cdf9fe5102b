use super::{Highlight, SortArray, SortEngine, SortStats};

mod line {
    pub const SIZE_LOOP: usize = 2;
    pub const LEFT_LOOP: usize = 3;
    pub const MERGE: usize = 6;
    pub const END: usize = 7;
}

/// One pending merge of `left..=mid` with `mid+1..=right`, standing in for one
/// call of the recursive algorithm. `i`, `j` scan the two halves of the
/// snapshot and `k` is the next write position in the array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeJob {
    pub left: usize,
    pub mid: usize,
    pub right: usize,
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl MergeJob {
    fn new(left: usize, mid: usize, right: usize) -> Self {
        MergeJob {
            left,
            mid,
            right,
            i: left,
            j: mid + 1,
            k: left,
        }
    }
}

/// Bottom-up merge sort driven by a precomputed job stack.
///
/// `reset` generates every merge of the bottom-up pass structure (widths 1, 2,
/// 4, ...) and stacks them so the first generated job is on top. Each `step`
/// writes one element of the top job from `temp` into the array; when both
/// halves are exhausted the merged range is copied back into `temp` so the next
/// level reads merged data, and the job is popped.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct MergeSort {
    jobs: Vec<MergeJob>,
    temp: Vec<i32>,
    sorted: bool,
    active: bool,
    current_line: usize,
    stats: SortStats,
}

impl MergeSort {
    /// Jobs still to run, the next one last.
    pub fn jobs(&self) -> &[MergeJob] {
        &self.jobs
    }

    fn plan(n: usize) -> Vec<MergeJob> {
        let mut jobs = Vec::new();
        let mut width = 1;
        while width < n {
            let mut left = 0;
            while left < n - 1 {
                let mid = (left + width - 1).min(n - 1);
                let right = (left + 2 * width - 1).min(n - 1);
                jobs.push(MergeJob::new(left, mid, right));
                left += 2 * width;
            }
            width *= 2;
        }
        jobs
    }

    fn finish(&mut self, arr: &SortArray) {
        self.sorted = true;
        self.current_line = line::END;
        arr.highlight(&(0..arr.len()).collect::<Vec<_>>(), Highlight::Sorted);
        tracing::debug!("[merge] sorted after {} comparisons", self.stats.comparisons);
    }
}

impl SortEngine for MergeSort {
    fn reset(&mut self, values: &[i32]) {
        let mut jobs = MergeSort::plan(values.len());
        jobs.reverse();
        // Keep the allocations of the previous run
        self.jobs.clear();
        self.jobs.extend(jobs);
        self.temp.clear();
        self.temp.extend_from_slice(values);
        self.sorted = self.jobs.is_empty();
        self.active = true;
        self.current_line = 0;
        self.stats = SortStats::default();
    }

    fn step(&mut self, arr: &mut SortArray) {
        if !self.active {
            return;
        }
        if self.sorted {
            self.current_line = line::END;
            return;
        }

        self.current_line = line::SIZE_LOOP;
        let Some(job) = self.jobs.last_mut() else {
            self.finish(arr);
            return;
        };

        self.current_line = line::LEFT_LOOP;
        arr.highlight(&(job.left..=job.right).collect::<Vec<_>>(), Highlight::Compare);

        self.current_line = line::MERGE;
        let temp = &mut self.temp;
        let stats = &mut self.stats;
        if job.i <= job.mid && job.j <= job.right {
            stats.comparisons += 1;
            stats.array_accesses += 2;
            let take_left = temp[job.i] <= temp[job.j];
            let from = if take_left { job.i } else { job.j };
            arr.set(job.k, temp[from]);
            stats.array_accesses += 2;
            if take_left {
                job.i += 1;
            } else {
                job.j += 1;
            }
            job.k += 1;
        } else if job.i <= job.mid {
            arr.set(job.k, temp[job.i]);
            stats.array_accesses += 2;
            job.i += 1;
            job.k += 1;
        } else if job.j <= job.right {
            arr.set(job.k, temp[job.j]);
            stats.array_accesses += 2;
            job.j += 1;
            job.k += 1;
        } else {
            for idx in job.left..=job.right {
                temp[idx] = arr.get(idx);
                stats.array_accesses += 2;
            }
            arr.highlight(&(job.left..=job.right).collect::<Vec<_>>(), Highlight::Sorted);
            tracing::trace!("[merge] merged {}..={}", job.left, job.right);
            self.jobs.pop();
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
    fn test_jobs_run_smallest_first() {
        let mut merge = MergeSort::default();
        merge.reset(&[5, 4, 3, 2, 1]);
        let order = merge
            .jobs()
            .iter()
            .rev()
            .map(|job| (job.left, job.mid, job.right))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![(0, 0, 1), (2, 2, 3), (0, 1, 3), (0, 3, 4)]
        );
    }

    #[test]
    fn test_small_array_counts() {
        let mut arr = SortArray::new(vec![3, 1, 2], None);
        let mut merge = MergeSort::default();
        merge.reset(arr.values());
        // Job (0,0,1): 2 writes + copy back. Job (0,1,2): 3 writes + copy back.
        // One more step sees the empty stack.
        assert_eq!(run_to_completion(&mut merge, &mut arr, 100), Some(8));
        assert_eq!(arr.values(), &[1, 2, 3]);
        assert_eq!(
            merge.stats(),
            SortStats {
                comparisons: 3,
                array_accesses: 26
            }
        );
    }

    #[test]
    fn test_trivial_input_is_sorted_at_reset() {
        let mut merge = MergeSort::default();
        merge.reset(&[7]);
        assert!(merge.is_sorted());
        assert!(merge.jobs().is_empty());
    }

    #[test]
    fn test_stable_on_equal_keys() {
        let mut arr = SortArray::new(vec![2, 1, 2, 1], None);
        let mut merge = MergeSort::default();
        merge.reset(arr.values());
        run_to_completion(&mut merge, &mut arr, 1000);
        assert_eq!(arr.values(), &[1, 1, 2, 2]);
    }
}
