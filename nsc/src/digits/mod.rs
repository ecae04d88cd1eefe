pub mod block;

use log::trace;
use serde::Deserialize;
use thiserror::Error;

use crate::symbol;

pub use block::Block;

/// Index of a block in its sequence's arena.
pub type BlockId = usize;

/// Digits per block unless configured otherwise.
pub const DEFAULT_BLOCK_CAPACITY: usize = 1024;

/// Layout of a digit sequence. Sequences derived from another one inherit its config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Digits per block (at least 1).
    pub block_capacity: usize,
    /// Upper bound on live blocks in one sequence; `None` means unbounded.
    pub max_blocks: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            block_capacity: DEFAULT_BLOCK_CAPACITY,
            max_blocks: None,
        }
    }
}

impl StoreConfig {
    pub fn with_block_capacity(block_capacity: usize) -> Self {
        StoreConfig {
            block_capacity,
            ..StoreConfig::default()
        }
    }
}

/// Allocation failures of the digit store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("cannot allocate a block of {capacity} digits")]
    OutOfMemory { capacity: usize },

    #[error("block limit of {limit} reached")]
    BlockLimit { limit: usize },
}

#[derive(Debug, Clone)]
enum Slot {
    Used(Block),
    Free { next_free: Option<BlockId> },
}

/// An arbitrarily long number stored as a doubly-linked chain of digit blocks,
/// most-significant digit first from head to tail.
///
/// Blocks live in an arena; `prev`/`next` links are arena indices and removed
/// slots are recycled through a free list.
#[derive(Debug, Clone)]
pub struct DigitSequence {
    slots: Vec<Slot>,
    free_head: Option<BlockId>,
    head: Option<BlockId>,
    tail: Option<BlockId>,
    config: StoreConfig,
    len: usize,
    live_blocks: usize,
    peak_blocks: usize,
}

impl Default for DigitSequence {
    fn default() -> Self {
        DigitSequence::new()
    }
}

impl DigitSequence {
    pub fn new() -> Self {
        DigitSequence::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        DigitSequence {
            slots: Vec::new(),
            free_head: None,
            head: None,
            tail: None,
            config: StoreConfig {
                block_capacity: config.block_capacity.max(1),
                ..config
            },
            len: 0,
            live_blocks: 0,
            peak_blocks: 0,
        }
    }

    /// Build a sequence from digit values, most-significant first.
    pub fn from_digits(config: StoreConfig, digits: &[u8]) -> Result<Self, StoreError> {
        let mut sequence = DigitSequence::with_config(config);
        for &digit in digits {
            sequence.push_back(digit)?;
        }
        Ok(sequence)
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Number of stored digits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn head(&self) -> Option<BlockId> {
        self.head
    }

    pub fn tail(&self) -> Option<BlockId> {
        self.tail
    }

    pub fn live_blocks(&self) -> usize {
        self.live_blocks
    }

    /// Highest number of simultaneously live blocks since creation or the last `reset_peak`.
    pub fn peak_blocks(&self) -> usize {
        self.peak_blocks
    }

    pub fn reset_peak(&mut self) {
        self.peak_blocks = self.live_blocks;
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        match self.slots.get(id) {
            Some(Slot::Used(block)) => Some(block),
            _ => None,
        }
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        match self.slots.get_mut(id) {
            Some(Slot::Used(block)) => Some(block),
            _ => None,
        }
    }

    /// Allocate an empty block and link it at the head (`at_front`) or the tail.
    pub fn new_block(&mut self, at_front: bool) -> Result<BlockId, StoreError> {
        if let Some(limit) = self.config.max_blocks {
            if self.live_blocks >= limit {
                return Err(StoreError::BlockLimit { limit });
            }
        }

        let mut block = Block::allocate(self.config.block_capacity, at_front)?;

        let id = match self.free_head {
            Some(id) => {
                if let Slot::Free { next_free } = self.slots[id] {
                    self.free_head = next_free;
                }
                id
            }
            None => {
                self.slots
                    .try_reserve(1)
                    .map_err(|_| StoreError::OutOfMemory {
                        capacity: self.config.block_capacity,
                    })?;
                self.slots.push(Slot::Free { next_free: None });
                self.slots.len() - 1
            }
        };

        if at_front {
            block.next = self.head;
            match self.head.and_then(|old| self.block_mut(old)) {
                Some(old) => old.prev = Some(id),
                None => self.tail = Some(id),
            }
            self.head = Some(id);
        } else {
            block.prev = self.tail;
            match self.tail.and_then(|old| self.block_mut(old)) {
                Some(old) => old.next = Some(id),
                None => self.head = Some(id),
            }
            self.tail = Some(id);
        }

        self.slots[id] = Slot::Used(block);
        self.live_blocks += 1;
        self.peak_blocks = self.peak_blocks.max(self.live_blocks);
        trace!(
            "linked block {} at {} ({} live)",
            id,
            if at_front { "head" } else { "tail" },
            self.live_blocks
        );
        Ok(id)
    }

    /// Unlink a block, repairing neighbour links and head/tail.
    ///
    /// The detached block is handed back to the caller; dropping it releases its storage.
    /// Returns `None` if `id` is not a live block of this sequence.
    pub fn remove_block(&mut self, id: BlockId) -> Option<Block> {
        let next_free = self.free_head;
        let slot = self.slots.get_mut(id)?;
        if !matches!(slot, Slot::Used(_)) {
            return None;
        }
        let Slot::Used(mut block) = std::mem::replace(slot, Slot::Free { next_free }) else {
            return None;
        };
        self.free_head = Some(id);

        match block.prev.and_then(|prev| self.block_mut(prev)) {
            Some(prev) => prev.next = block.next,
            None => self.head = block.next,
        }
        match block.next.and_then(|next| self.block_mut(next)) {
            Some(next) => next.prev = block.prev,
            None => self.tail = block.prev,
        }

        block.prev = None;
        block.next = None;
        self.live_blocks -= 1;
        self.len -= block.len();
        Some(block)
    }

    /// Detach the head block.
    pub fn pop_front_block(&mut self) -> Option<Block> {
        let head = self.head?;
        self.remove_block(head)
    }

    /// Release every block. Safe to call on an empty sequence.
    pub fn destroy(&mut self) {
        if self.live_blocks > 0 {
            trace!("destroying sequence of {} blocks", self.live_blocks);
        }
        self.slots.clear();
        self.free_head = None;
        self.head = None;
        self.tail = None;
        self.len = 0;
        self.live_blocks = 0;
    }

    /// Append a least-significant digit.
    pub fn push_back(&mut self, digit: u8) -> Result<(), StoreError> {
        let pushed = match self.tail.and_then(|tail| self.block_mut(tail)) {
            Some(block) => block.push_back(digit),
            None => false,
        };
        if !pushed {
            let id = self.new_block(false)?;
            if let Some(block) = self.block_mut(id) {
                block.push_back(digit);
            }
        }
        self.len += 1;
        Ok(())
    }

    /// Prepend a most-significant digit.
    pub fn push_front(&mut self, digit: u8) -> Result<(), StoreError> {
        let pushed = match self.head.and_then(|head| self.block_mut(head)) {
            Some(block) => block.push_front(digit),
            None => false,
        };
        if !pushed {
            let id = self.new_block(true)?;
            if let Some(block) = self.block_mut(id) {
                block.push_front(digit);
            }
        }
        self.len += 1;
        Ok(())
    }

    /// Bring the sequence into canonical form: no leading zeros, and zero as a single `0`.
    pub fn strip_leading_zeros(&mut self) -> Result<(), StoreError> {
        while let Some(head) = self.head {
            let remaining = self.len;
            let Some(block) = self.block_mut(head) else {
                break;
            };
            match block.digits().first().copied() {
                None => {
                    self.remove_block(head);
                }
                Some(0) if remaining > 1 => {
                    block.pop_front();
                    self.len -= 1;
                }
                Some(_) => break,
            }
        }
        if self.len == 0 {
            self.destroy();
            self.push_back(0)?;
        }
        Ok(())
    }

    /// Blocks from head to tail.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks {
            sequence: self,
            cursor: self.head,
            forward: true,
        }
    }

    /// Blocks from tail to head.
    pub fn blocks_rev(&self) -> Blocks<'_> {
        Blocks {
            sequence: self,
            cursor: self.tail,
            forward: false,
        }
    }

    /// Digit values, most-significant first.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.blocks().flat_map(|block| block.digits().iter().copied())
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.iter().collect()
    }

    /// The digits rendered as wire symbols.
    pub fn to_symbols(&self) -> String {
        self.iter().map(|digit| symbol::symbol_of(digit) as char).collect()
    }
}

/// Iterator over the blocks of a `DigitSequence` in either direction.
pub struct Blocks<'a> {
    sequence: &'a DigitSequence,
    cursor: Option<BlockId>,
    forward: bool,
}

impl<'a> Iterator for Blocks<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<&'a Block> {
        let block = self.sequence.block(self.cursor?)?;
        self.cursor = if self.forward {
            block.next()
        } else {
            block.prev()
        };
        Some(block)
    }
}
