use std::fmt::Display;

use log::debug;

use crate::config::Config;
use crate::structs::{Superblock, INODE_HEADER_SIZE, POINTER_SIZE, SUPERBLOCK_SIZE};
use crate::Error;

/// Contiguous, block aligned segment of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Superblock,
    InodeTable,
    DataTable,
}

impl Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Superblock => write!(f, "super block"),
            Self::InodeTable => write!(f, "inode table"),
            Self::DataTable => write!(f, "data table"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSpan {
    pub region: Region,
    /// Byte offset from the start of image
    pub offset: u64,
    /// Padded size in bytes
    pub size: u64,
}

/// Concrete geometry of an image derived from its [`Config`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub block_size: u64,
    pub inode_count: u64,
    pub pointers_per_inode: u64,
    pub inode_size: u64,
    pub inode_table_raw: u64,
    pub inode_table_padded: u64,
    pub data_block_count: u64,
    pub data_block_size: u64,
    pub data_table_raw: u64,
    pub data_table_padded: u64,
    pub superblock_region_size: u64,
    pub inode_table_offset: u64,
    pub data_table_offset: u64,
    pub total_size: u64,
}

/// Round `value` up to the next multiple of `multiple`.
/// Aligned values are returned unchanged.
pub fn round_up(value: u64, multiple: u64) -> Option<u64> {
    if multiple == 0 {
        return None;
    }
    match value % multiple {
        0 => Some(value),
        rest => value.checked_add(multiple - rest),
    }
}

/// Serialized size of one inode record holding `pointers_per_inode` pointers
pub fn inode_size(pointers_per_inode: u64) -> Option<u64> {
    pointers_per_inode
        .checked_mul(POINTER_SIZE)?
        .checked_add(INODE_HEADER_SIZE)
}

impl Layout {
    pub fn compute(config: &Config) -> Result<Self, Error> {
        let block_size = config.block_size;
        if block_size == 0 {
            return Err(Error::ZeroBlockSize);
        }
        if SUPERBLOCK_SIZE > block_size {
            return Err(Error::SuperblockTooLarge {
                size: SUPERBLOCK_SIZE,
                block_size,
            });
        }
        let overflow = |region| move || Error::Overflow(region);

        let inode_size =
            inode_size(config.pointers_per_inode).ok_or_else(overflow(Region::InodeTable))?;
        let inode_table_raw = config
            .inode_count
            .checked_mul(inode_size)
            .ok_or_else(overflow(Region::InodeTable))?;
        let inode_table_padded =
            round_up(inode_table_raw, block_size).ok_or_else(overflow(Region::InodeTable))?;

        let data_table_raw = config
            .data_block_count
            .checked_mul(config.data_block_size)
            .ok_or_else(overflow(Region::DataTable))?;
        let data_table_padded =
            round_up(data_table_raw, block_size).ok_or_else(overflow(Region::DataTable))?;

        let superblock_region_size = block_size;
        let inode_table_offset = superblock_region_size;
        let data_table_offset = inode_table_offset
            .checked_add(inode_table_padded)
            .ok_or_else(overflow(Region::InodeTable))?;
        let total_size = data_table_offset
            .checked_add(data_table_padded)
            .ok_or_else(overflow(Region::DataTable))?;

        let layout = Self {
            block_size,
            inode_count: config.inode_count,
            pointers_per_inode: config.pointers_per_inode,
            inode_size,
            inode_table_raw,
            inode_table_padded,
            data_block_count: config.data_block_count,
            data_block_size: config.data_block_size,
            data_table_raw,
            data_table_padded,
            superblock_region_size,
            inode_table_offset,
            data_table_offset,
            total_size,
        };
        debug!("Computed layout {layout:?}");
        Ok(layout)
    }

    /// Rebuild layout of an existing image from its superblock
    pub fn from_superblock(superblock: &Superblock) -> Result<Self, Error> {
        if superblock.superblock_size != SUPERBLOCK_SIZE {
            return Err(Error::InvalidSuperblock);
        }
        let layout = Self::compute(&Config::from(superblock))?;
        if layout.inode_size != superblock.inode_size {
            return Err(Error::InvalidSuperblock);
        }
        Ok(layout)
    }

    pub fn region(&self, region: Region) -> RegionSpan {
        let (offset, size) = match region {
            Region::Superblock => (0, self.superblock_region_size),
            Region::InodeTable => (self.inode_table_offset, self.inode_table_padded),
            Region::DataTable => (self.data_table_offset, self.data_table_padded),
        };
        RegionSpan {
            region,
            offset,
            size,
        }
    }

    /// Region spans in the order they are written
    pub fn regions(&self) -> [RegionSpan; 3] {
        [
            self.region(Region::Superblock),
            self.region(Region::InodeTable),
            self.region(Region::DataTable),
        ]
    }

    /// Byte offset of inode with index
    pub fn inode_position(&self, index: u64) -> Result<u64, Error> {
        if index >= self.inode_count {
            return Err(Error::OutOfBounds);
        }
        Ok(self.inode_table_offset + index * self.inode_size)
    }

    /// Byte offset of data block with index
    pub fn block_position(&self, index: u64) -> Result<u64, Error> {
        if index >= self.data_block_count {
            return Err(Error::OutOfBounds);
        }
        Ok(self.data_table_offset + index * self.data_block_size)
    }
}

impl Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for span in self.regions() {
            writeln!(
                f,
                "{:<12} offset {:>8} size {:>8}",
                span.region.to_string(),
                span.offset,
                span.size
            )?;
        }
        write!(f, "total size {}", self.total_size)
    }
}
