//! Multi-block grid aggregate.

use super::block::Block;
use crate::error::{LbmError, Result};
use crate::types::BlockIndex;

/// All blocks of a case, each owning its own field set.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    blocks: Vec<Block>,
}

impl Grid {
    /// Grid from blocks; block `i` must carry index `i`.
    pub fn new(blocks: Vec<Block>) -> Result<Self> {
        if let Some((i, b)) = blocks
            .iter()
            .enumerate()
            .find(|(i, b)| b.index().get() != *i)
        {
            return Err(LbmError::invalid_config(format!(
                "block at position {i} carries index {}",
                b.index()
            )));
        }
        Ok(Self { blocks })
    }

    /// Number of blocks.
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Block by index.
    pub fn block(&self, index: BlockIndex) -> Result<&Block> {
        self.blocks
            .get(index.get())
            .ok_or(LbmError::UnknownBlock(index))
    }

    /// Mutable block by index.
    pub fn block_mut(&mut self, index: BlockIndex) -> Result<&mut Block> {
        self.blocks
            .get_mut(index.get())
            .ok_or(LbmError::UnknownBlock(index))
    }

    /// All blocks.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// All blocks, mutable.
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// Sum of all distributions over every block.
    pub fn total_mass(&self) -> f64 {
        self.blocks.iter().map(Block::total_mass).sum()
    }
}
