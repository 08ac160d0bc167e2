//! Deadline-ordered assignment queue.
//!
//! A binary min-heap keyed on `(deadline, insertion sequence)` so equal
//! deadlines come out in the order they were added. The queue carries no
//! risk rules; completed assignments are kept and returned like any other.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use chrono::{Days, NaiveDate};

use crate::model::Assignment;

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    assignment: Assignment,
}

impl Entry {
    fn key(&self) -> (NaiveDate, u64) {
        (self.assignment.deadline, self.seq)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Assignments retrievable in ascending deadline order.
#[derive(Debug, Clone, Default)]
pub struct DeadlineQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl DeadlineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue from a student's assignment list, preserving list order
    /// for ties.
    pub fn from_assignments<'a>(assignments: impl IntoIterator<Item = &'a Assignment>) -> Self {
        let mut queue = Self::new();
        for a in assignments {
            queue.add(a.clone());
        }
        queue
    }

    pub fn add(&mut self, assignment: Assignment) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry { seq, assignment }));
    }

    pub fn peek_earliest(&self) -> Option<&Assignment> {
        self.heap.peek().map(|Reverse(e)| &e.assignment)
    }

    pub fn pop_earliest(&mut self) -> Option<Assignment> {
        self.heap.pop().map(|Reverse(e)| e.assignment)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Every assignment in ascending deadline order, without consuming the queue.
    pub fn all_sorted(&self) -> Vec<Assignment> {
        self.sorted_entries()
            .into_iter()
            .map(|e| e.assignment.clone())
            .collect()
    }

    /// Assignments with `deadline <= reference + days`, ascending.
    ///
    /// Overdue and completed assignments are included.
    pub fn due_within(&self, days: u64, reference: NaiveDate) -> Vec<Assignment> {
        let cutoff = reference
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDate::MAX);
        self.sorted_entries()
            .into_iter()
            .take_while(|e| e.assignment.deadline <= cutoff)
            .map(|e| e.assignment.clone())
            .collect()
    }

    fn sorted_entries(&self) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self.heap.iter().map(|Reverse(e)| e).collect();
        entries.sort();
        entries
    }
}
