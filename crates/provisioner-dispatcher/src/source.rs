//! Lazy identifier source.

use provisioner_core::{RangeError, Task};

/// Produces every identifier in `[start, end]` once, in ascending order.
///
/// The sequence is lazy and non-restartable: it is consumed by the
/// dispatcher's feeder, which hands each task to exactly one worker through
/// the shared queue.
#[derive(Debug)]
pub struct TaskSource {
    next: Option<u64>,
    end: u64,
}

impl TaskSource {
    /// Create a source over `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError`] if `start > end`. Nothing is produced in that case.
    pub fn new(start: u64, end: u64) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError { start, end });
        }
        Ok(Self {
            next: Some(start),
            end,
        })
    }

    /// Identifiers not yet produced.
    pub fn remaining(&self) -> u64 {
        match self.next {
            Some(next) => (self.end - next).saturating_add(1),
            None => 0,
        }
    }
}

impl Iterator for TaskSource {
    type Item = Task;

    fn next(&mut self) -> Option<Task> {
        let current = self.next?;
        // checked_add also stops cleanly at u64::MAX
        self.next = if current < self.end {
            current.checked_add(1)
        } else {
            None
        };
        Some(Task::new(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl std::iter::FusedIterator for TaskSource {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(source: TaskSource) -> Vec<u64> {
        source.map(|t| t.identifier()).collect()
    }

    #[test]
    fn test_ascending_inclusive() {
        let source = TaskSource::new(3, 7).unwrap();
        assert_eq!(source.remaining(), 5);
        assert_eq!(ids(source), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_single_identifier() {
        let source = TaskSource::new(10, 10).unwrap();
        assert_eq!(ids(source), vec![10]);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = TaskSource::new(5, 1).unwrap_err();
        assert_eq!(err, RangeError { start: 5, end: 1 });
    }

    #[test]
    fn test_stops_at_u64_max() {
        let source = TaskSource::new(u64::MAX - 2, u64::MAX).unwrap();
        assert_eq!(ids(source), vec![u64::MAX - 2, u64::MAX - 1, u64::MAX]);
    }

    #[test]
    fn test_exhausted_source_stays_exhausted() {
        let mut source = TaskSource::new(1, 1).unwrap();
        assert_eq!(source.next(), Some(Task::new(1)));
        assert_eq!(source.next(), None);
        assert_eq!(source.next(), None);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_size_hint_is_exact() {
        let mut source = TaskSource::new(1, 4).unwrap();
        assert_eq!(source.size_hint(), (4, Some(4)));
        source.next();
        assert_eq!(source.size_hint(), (3, Some(3)));
    }
}
