mod block;
mod inode;
mod superblock;

use std::fmt::Debug;
use std::io::{Read, Seek, SeekFrom};

use bytemuck::{Pod, Zeroable};

use crate::Error;

pub const MAGIC_SIGNATURE: u64 = 0xBEEF;
pub const SUPERBLOCK_SIZE: u64 = std::mem::size_of::<Superblock>() as u64;
pub const INODE_HEADER_SIZE: u64 = std::mem::size_of::<InodeHeader>() as u64;
pub const POINTER_SIZE: u64 = std::mem::size_of::<u64>() as u64;

/// Readable image holding a formatted filesystem
pub trait BlockDevice: Read + Seek + Debug {}

impl BlockDevice for std::fs::File {}

impl<T: AsRef<[u8]> + Debug> BlockDevice for std::io::Cursor<T> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Superblock {
    /// Magic signature
    pub magic: u64,
    /// Size of serialized superblock in bytes
    pub superblock_size: u64,
    /// Total count of inodes in the filesystem
    pub inode_count: u64,
    /// Total count of data blocks in the filesystem
    pub data_block_count: u64,
    /// Direct data block references per inode
    pub pointers_per_inode: u64,
    /// Block size in bytes
    pub block_size: u64,
    /// Size of inode record including its pointers
    pub inode_size: u64,
    /// Data block size in bytes
    pub data_block_size: u64,
    /// Maximum length of directory entry name
    pub max_name_length: u64,
}

/// Fixed part of an inode record, followed on disk by its pointers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct InodeHeader {
    pub(crate) r#type: u64,
    pub(crate) size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InodeType {
    #[default]
    RegularFile,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    /// Inode's index
    pub index: u64,
    /// File type
    pub r#type: InodeType,
    /// File size in bytes
    pub size: u64,
    /// Data block references
    pub pointers: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct Block {
    /// Block's index
    pub index: u64,
    /// Raw data as bytes
    pub data: Vec<u8>,
}

/// Decode a little endian `u64` from the start of `bytes`
pub(crate) fn u64_from_bytes(bytes: &[u8]) -> u64 {
    let mut raw = [0; POINTER_SIZE as usize];
    raw.copy_from_slice(&bytes[..POINTER_SIZE as usize]);
    u64::from_le_bytes(raw)
}

/// Read `size` bytes at `position`, refusing ranges past the end of device
pub(crate) fn read_at<D: BlockDevice + ?Sized>(
    device: &mut D,
    position: u64,
    size: u64,
) -> Result<Vec<u8>, Error> {
    let end = position.checked_add(size).ok_or(Error::OutOfBounds)?;
    if end > device.seek(SeekFrom::End(0))? {
        return Err(Error::OutOfBounds);
    }
    let length = usize::try_from(size).map_err(|_| Error::OutOfBounds)?;
    device.seek(SeekFrom::Start(position))?;
    let mut raw = vec![0u8; length];
    device.read_exact(&mut raw)?;
    Ok(raw)
}
