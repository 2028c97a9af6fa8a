use crate::structs::Superblock;

pub const DEFAULT_INODE_COUNT: u64 = 4;
pub const DEFAULT_DATA_BLOCK_COUNT: u64 = 8;
pub const DEFAULT_POINTERS_PER_INODE: u64 = 2;
pub const DEFAULT_BLOCK_SIZE: u64 = 512;
pub const DEFAULT_DATA_BLOCK_SIZE: u64 = 128;
pub const DEFAULT_MAX_NAME_LENGTH: u64 = 16;

/// Parameters describing geometry of a myfs image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of inode slots in the inode table
    pub inode_count: u64,
    /// Number of data block slots in the data table
    pub data_block_count: u64,
    /// Direct data block references held by each inode
    pub pointers_per_inode: u64,
    /// Alignment unit for every region
    pub block_size: u64,
    /// Size of a single data block slot in bytes
    pub data_block_size: u64,
    /// Maximum length of a directory entry name
    pub max_name_length: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inode_count: DEFAULT_INODE_COUNT,
            data_block_count: DEFAULT_DATA_BLOCK_COUNT,
            pointers_per_inode: DEFAULT_POINTERS_PER_INODE,
            block_size: DEFAULT_BLOCK_SIZE,
            data_block_size: DEFAULT_DATA_BLOCK_SIZE,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }
}

impl From<&Superblock> for Config {
    fn from(superblock: &Superblock) -> Self {
        Self {
            inode_count: superblock.inode_count,
            data_block_count: superblock.data_block_count,
            pointers_per_inode: superblock.pointers_per_inode,
            block_size: superblock.block_size,
            data_block_size: superblock.data_block_size,
            max_name_length: superblock.max_name_length,
        }
    }
}
