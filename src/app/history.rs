use std::collections::VecDeque;

/// Bounded log of recent events that can be browsed while paused.
pub struct EventHistory<E> {
    /// History of events, with the most recent event at the front.
    event_history: VecDeque<E>,
    /// Current index in the history for browsing. Should always be between 0 and event_history.len() - 1
    /// 0 represents the most recent event.
    history_index: usize,
    /// Maximum number of events to keep in history. If 0, no history is kept.
    max_num_events: usize,
}

impl<E> EventHistory<E> {
    pub fn new(max_num_events: usize) -> Self {
        EventHistory {
            event_history: VecDeque::with_capacity(max_num_events),
            history_index: 0,
            max_num_events,
        }
    }

    pub fn history_forward(&mut self) -> Option<&E> {
        match self.history_index {
            0 => None, // Already at the most recent event
            _ => {
                self.history_index -= 1;
                self.event_history.get(self.history_index)
            }
        }
    }

    pub fn history_backward(&mut self) -> Option<&E> {
        if self.history_index + 1 >= self.event_history.len() {
            None
        } else {
            self.history_index += 1;
            self.event_history.get(self.history_index)
        }
    }

    pub fn add_event(&mut self, current_event: E) {
        match self.max_num_events {
            0 => {} // No history to maintain
            _ => {
                // Remove oldest events if we exceed max history size
                self.event_history.truncate(self.max_num_events - 1);
                self.event_history.push_front(current_event);
                // Back to the most recent event
                self.history_index = 0;
            }
        }
    }

    pub fn current_event(&self) -> Option<&E> {
        self.event_history.get(self.history_index)
    }

    /// Whether the cursor has been moved back from the most recent event.
    pub fn is_browsing(&self) -> bool {
        self.history_index > 0
    }

    /// Up to `count` events starting at the cursor, newest first.
    pub fn window(&self, count: usize) -> impl Iterator<Item = &E> {
        self.event_history
            .iter()
            .skip(self.history_index)
            .take(count)
    }

    pub fn len(&self) -> usize {
        self.event_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_history.is_empty()
    }
}
