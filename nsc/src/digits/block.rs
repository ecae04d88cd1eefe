use crate::digits::{BlockId, StoreError};

/// A fixed-capacity run of digits within a `DigitSequence`.
///
/// The used digits occupy `start..end` of the backing storage. Blocks linked
/// at the tail fill left-to-right from index 0; blocks linked at the head fill
/// right-to-left from the end, so both ends of a sequence grow in O(1).
#[derive(Debug, Clone)]
pub struct Block {
    storage: Box<[u8]>,
    start: usize,
    end: usize,
    pub(crate) prev: Option<BlockId>,
    pub(crate) next: Option<BlockId>,
}

impl Block {
    /// Allocate a zeroed block. `at_front` selects right-to-left filling.
    pub(crate) fn allocate(capacity: usize, at_front: bool) -> Result<Self, StoreError> {
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| StoreError::OutOfMemory { capacity })?;
        storage.resize(capacity, 0);
        let cursor = if at_front { capacity } else { 0 };
        Ok(Block {
            storage: storage.into_boxed_slice(),
            start: cursor,
            end: cursor,
            prev: None,
            next: None,
        })
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Used digits, most-significant first.
    pub fn digits(&self) -> &[u8] {
        &self.storage[self.start..self.end]
    }

    pub fn digits_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.start..self.end]
    }

    pub fn prev(&self) -> Option<BlockId> {
        self.prev
    }

    pub fn next(&self) -> Option<BlockId> {
        self.next
    }

    /// Append after the last used digit. Returns false when there is no room on the right.
    pub(crate) fn push_back(&mut self, digit: u8) -> bool {
        if self.end == self.storage.len() {
            return false;
        }
        self.storage[self.end] = digit;
        self.end += 1;
        true
    }

    /// Prepend before the first used digit. Returns false when there is no room on the left.
    pub(crate) fn push_front(&mut self, digit: u8) -> bool {
        if self.start == 0 {
            return false;
        }
        self.start -= 1;
        self.storage[self.start] = digit;
        true
    }

    pub(crate) fn pop_front(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let digit = self.storage[self.start];
        self.start += 1;
        Some(digit)
    }
}
