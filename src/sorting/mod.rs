mod bubble;
mod insertion;
mod merge;
mod quick;
mod selection;

use std::sync::mpsc::Sender;

pub use bubble::BubbleSort;
pub use insertion::InsertionSort;
pub use merge::{MergeJob, MergeSort};
pub use quick::{QuickSort, QuickSortJob};
pub use selection::SelectionSort;

/// What a highlighted bar is taking part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Compare,
    Swap,
    Sorted,
}

/// Change notifications for whoever draws the bars.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayEvent {
    Initial { values: Vec<i32> },
    Write { index: usize, old: i32, new: i32 },
    Swap { a: usize, b: usize },
    Highlight { indices: Vec<usize>, kind: Highlight },
}

/// The array being sorted, with an optional channel reporting every mutation.
///
/// Reads and writes through this type are not counted; each engine counts its
/// own array accesses.
pub struct SortArray {
    values: Vec<i32>,
    sender: Option<Sender<ArrayEvent>>,
}

impl SortArray {
    pub fn new(values: Vec<i32>, sender: Option<Sender<ArrayEvent>>) -> Self {
        if let Some(s) = &sender {
            let _ = s.send(ArrayEvent::Initial {
                values: values.clone(),
            });
        }
        SortArray { values, sender }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn get(&self, index: usize) -> i32 {
        self.values[index]
    }

    pub fn set(&mut self, index: usize, value: i32) {
        let old = std::mem::replace(&mut self.values[index], value);
        self.send(ArrayEvent::Write {
            index,
            old,
            new: value,
        });
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        self.values.swap(a, b);
        self.send(ArrayEvent::Swap { a, b });
    }

    pub fn highlight(&self, indices: &[usize], kind: Highlight) {
        if self.sender.is_some() {
            self.send(ArrayEvent::Highlight {
                indices: indices.to_vec(),
                kind,
            });
        }
    }

    /// Replaces the contents, announcing them as a fresh initial state.
    pub fn replace(&mut self, values: Vec<i32>) {
        self.values = values;
        if self.sender.is_some() {
            self.send(ArrayEvent::Initial {
                values: self.values.clone(),
            });
        }
    }

    fn send(&self, event: ArrayEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}

/// Counters exposed by every sorting engine.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortStats {
    pub comparisons: u64,
    pub array_accesses: u64,
}

/// A sorting algorithm that advances one primitive operation per `step`.
///
/// Callers own the array and the engine exclusively while a run is in progress;
/// nothing here is synchronized.
pub trait SortEngine {
    /// Returns the engine to its initial state for sorting `values`.
    fn reset(&mut self, values: &[i32]);
    /// Performs one comparison, swap or write. Does nothing once sorted or
    /// before the first `reset`.
    fn step(&mut self, arr: &mut SortArray);
    fn is_sorted(&self) -> bool;
    fn stats(&self) -> SortStats;
    /// Index of the pseudocode line being executed.
    fn current_line(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sorter {
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
}

impl Sorter {
    pub const ALL: [Sorter; 5] = [
        Sorter::Bubble,
        Sorter::Selection,
        Sorter::Insertion,
        Sorter::Merge,
        Sorter::Quick,
    ];
}

impl std::fmt::Display for Sorter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sorter::Bubble => write!(f, "Bubble Sort"),
            Sorter::Selection => write!(f, "Selection Sort"),
            Sorter::Insertion => write!(f, "Insertion Sort"),
            Sorter::Merge => write!(f, "Merge Sort"),
            Sorter::Quick => write!(f, "Quick Sort"),
        }
    }
}

/// One state record per sorting algorithm, created once and reset per run.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct SortEngines {
    pub bubble: BubbleSort,
    pub selection: SelectionSort,
    pub insertion: InsertionSort,
    pub merge: MergeSort,
    pub quick: QuickSort,
}

impl SortEngines {
    pub fn get(&self, sorter: Sorter) -> &dyn SortEngine {
        match sorter {
            Sorter::Bubble => &self.bubble,
            Sorter::Selection => &self.selection,
            Sorter::Insertion => &self.insertion,
            Sorter::Merge => &self.merge,
            Sorter::Quick => &self.quick,
        }
    }

    pub fn get_mut(&mut self, sorter: Sorter) -> &mut dyn SortEngine {
        match sorter {
            Sorter::Bubble => &mut self.bubble,
            Sorter::Selection => &mut self.selection,
            Sorter::Insertion => &mut self.insertion,
            Sorter::Merge => &mut self.merge,
            Sorter::Quick => &mut self.quick,
        }
    }

    pub fn reset_all(&mut self, values: &[i32]) {
        for sorter in Sorter::ALL {
            self.get_mut(sorter).reset(values);
        }
    }
}

/// Runs `engine` on `arr` until it reports sorted, returning the number of steps.
/// `max_steps` guards against an engine that never finishes.
pub fn run_to_completion(
    engine: &mut dyn SortEngine,
    arr: &mut SortArray,
    max_steps: usize,
) -> Option<usize> {
    (1..=max_steps).find(|_| {
        engine.step(arr);
        engine.is_sorted()
    })
}
