use crate::error::{HistoryError, HistoryResult};

/// Fixed-capacity log of the most recent values, addressed by logical index.
///
/// Every push gets the next logical index. Once more than `capacity` values
/// have been pushed, the oldest ones are overwritten and their indices can no
/// longer be read. Storage slot for logical index `i` is `i % capacity`.
///
/// ```text
///   capacity = 3, pushed 0..=4
///   slots    = [3, 4, 2]
///   window   = 2..=4   (start_index = 2, len = 5)
/// ```
///
/// `Clone` produces an independent buffer: pushes or sets on the copy never
/// show up in the original.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    capacity: usize,
    slots: Vec<T>,
    /// Total number of pushes ever made. Never decreases.
    len: usize,
}

impl<T> HistoryBuffer<T> {
    /// Create a buffer and push each initial value in order.
    pub fn new(capacity: usize, initial: Vec<T>) -> HistoryResult<Self> {
        if capacity == 0 {
            return Err(HistoryError::InvalidCapacity);
        }
        if initial.len() > capacity {
            return Err(HistoryError::TooManyInitialValues {
                given: initial.len(),
                capacity,
            });
        }

        let mut buffer = Self {
            capacity,
            slots: Vec::with_capacity(capacity),
            len: 0,
        };
        for value in initial {
            buffer.push(value);
        }
        Ok(buffer)
    }

    /// Buffer holding a single value. A zero capacity is raised to one.
    pub(crate) fn seeded(capacity: usize, value: T) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.push(value);
        Self { capacity, slots, len: 1 }
    }

    /// Create an empty buffer
    pub fn with_capacity(capacity: usize) -> HistoryResult<Self> {
        Self::new(capacity, Vec::new())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Logical length: the number of values ever pushed
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Lowest readable logical index, or `None` when nothing was pushed yet
    pub fn start_index(&self) -> Option<usize> {
        if self.len == 0 {
            None
        } else {
            Some(self.len.saturating_sub(self.capacity))
        }
    }

    /// Highest readable logical index
    pub fn last_index(&self) -> Option<usize> {
        self.len.checked_sub(1)
    }

    /// Append a value, overwriting the oldest one when full
    pub fn push(&mut self, value: T) {
        let slot = self.len % self.capacity;
        if slot < self.slots.len() {
            self.slots[slot] = value;
        } else {
            self.slots.push(value);
        }
        self.len += 1;
    }

    /// Overwrite the value at `index`, or append when `index == len()`.
    ///
    /// Writing past the end would leave a gap and is rejected. Writing an
    /// index that has already been evicted is rejected too, since its slot
    /// now belongs to a newer entry.
    pub fn set(&mut self, index: usize, value: T) -> HistoryResult<()> {
        if index == self.len {
            self.push(value);
            return Ok(());
        }
        if index > self.len {
            return Err(HistoryError::GapInHistory {
                index,
                len: self.len,
            });
        }

        let slot = self.slot(index)?;
        self.slots[slot] = value;
        Ok(())
    }

    /// Read the value at a logical index inside the retained window
    pub fn get(&self, index: usize) -> HistoryResult<&T> {
        let slot = self.slot(index)?;
        Ok(&self.slots[slot])
    }

    /// Iterate retained values from oldest to newest, with their logical index
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        let start = self.start_index().unwrap_or(0);
        (start..self.len).map(move |index| (index, &self.slots[index % self.capacity]))
    }

    fn slot(&self, index: usize) -> HistoryResult<usize> {
        match self.start_index() {
            Some(start) if index >= start && index < self.len => Ok(index % self.capacity),
            start => Err(HistoryError::OutOfRange {
                index,
                start,
                len: self.len,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_capacity() {
        assert_eq!(
            HistoryBuffer::<i32>::with_capacity(0).unwrap_err(),
            HistoryError::InvalidCapacity
        );
    }

    #[test]
    fn test_rejects_too_many_initial_values() {
        let err = HistoryBuffer::new(2, vec![1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            HistoryError::TooManyInitialValues { given: 3, capacity: 2 }
        );
    }

    #[test]
    fn test_initial_values_are_pushed_in_order() {
        let buffer = HistoryBuffer::new(3, vec!['a', 'b']).unwrap();
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.start_index(), Some(0));
        assert_eq!(*buffer.get(0).unwrap(), 'a');
        assert_eq!(*buffer.get(1).unwrap(), 'b');
    }

    #[test]
    fn test_empty_buffer_has_no_start() {
        let buffer = HistoryBuffer::<u8>::with_capacity(4).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.start_index(), None);
        assert_eq!(buffer.last_index(), None);
        assert!(matches!(
            buffer.get(0),
            Err(HistoryError::OutOfRange { index: 0, start: None, len: 0 })
        ));
    }

    #[test]
    fn test_wraps_and_evicts_oldest() {
        let mut buffer = HistoryBuffer::with_capacity(2).unwrap();
        buffer.push(1);
        buffer.push(2);
        buffer.push(3);

        assert_eq!(buffer.start_index(), Some(1));
        assert!(matches!(buffer.get(0), Err(HistoryError::OutOfRange { .. })));
        assert_eq!(*buffer.get(1).unwrap(), 2);
        assert_eq!(*buffer.get(2).unwrap(), 3);
        assert!(buffer.get(3).is_err());
    }

    #[test]
    fn test_set_at_len_appends() {
        let mut buffer = HistoryBuffer::new(3, vec![10]).unwrap();
        buffer.set(1, 20).unwrap();
        assert_eq!(buffer.len(), 2);
        assert_eq!(*buffer.get(1).unwrap(), 20);
    }

    #[test]
    fn test_set_past_end_fails() {
        let mut buffer = HistoryBuffer::new(3, vec![10]).unwrap();
        assert_eq!(
            buffer.set(2, 30),
            Err(HistoryError::GapInHistory { index: 2, len: 1 })
        );
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut buffer = HistoryBuffer::new(3, vec![1, 2, 3]).unwrap();
        buffer.set(1, 20).unwrap();
        assert_eq!(buffer.len(), 3);
        assert_eq!(*buffer.get(0).unwrap(), 1);
        assert_eq!(*buffer.get(1).unwrap(), 20);
        assert_eq!(*buffer.get(2).unwrap(), 3);
    }

    #[test]
    fn test_set_evicted_index_fails() {
        let mut buffer = HistoryBuffer::new(2, vec![1, 2]).unwrap();
        buffer.push(3);
        assert!(matches!(
            buffer.set(0, 9),
            Err(HistoryError::OutOfRange { index: 0, start: Some(1), len: 3 })
        ));
        assert_eq!(*buffer.get(2).unwrap(), 3);
    }

    #[test]
    fn test_iter_yields_retained_window() {
        let mut buffer = HistoryBuffer::with_capacity(3).unwrap();
        for value in 0..5 {
            buffer.push(value * 10);
        }
        let retained: Vec<(usize, i32)> = buffer.iter().map(|(i, v)| (i, *v)).collect();
        assert_eq!(retained, vec![(2, 20), (3, 30), (4, 40)]);
    }
}
