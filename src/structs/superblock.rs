use std::fmt::Display;
use std::io::SeekFrom;

use log::debug;

use super::*;
use crate::{config::Config, Error};

impl Superblock {
    /// Superblock describing an image built from `config`
    pub fn new(config: &Config, inode_size: u64) -> Self {
        Self {
            magic: MAGIC_SIGNATURE,
            superblock_size: SUPERBLOCK_SIZE,
            inode_count: config.inode_count,
            data_block_count: config.data_block_count,
            pointers_per_inode: config.pointers_per_inode,
            block_size: config.block_size,
            inode_size,
            data_block_size: config.data_block_size,
            max_name_length: config.max_name_length,
        }
    }

    /// Serialize fields in on-disk (little endian) order
    pub fn to_bytes(&self) -> Vec<u8> {
        bytemuck::bytes_of(&self.map(u64::to_le)).to_vec()
    }

    /// Deserialize from at least [`SUPERBLOCK_SIZE`] bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < SUPERBLOCK_SIZE as usize {
            return Err(Error::InvalidSuperblock);
        }
        let raw: Self = bytemuck::pod_read_unaligned(&bytes[..SUPERBLOCK_SIZE as usize]);
        let superblock = raw.map(u64::from_le);
        if superblock.magic != MAGIC_SIGNATURE {
            return Err(Error::InvalidMagic(superblock.magic));
        }
        Ok(superblock)
    }

    /// Load superblock from the start of block device
    pub fn load<D: BlockDevice + ?Sized>(device: &mut D) -> Result<Self, Error> {
        device.seek(SeekFrom::Start(0))?;
        let mut raw = [0u8; SUPERBLOCK_SIZE as usize];
        device.read_exact(&mut raw)?;
        let superblock = Self::from_bytes(&raw)?;
        debug!("Loaded superblock {superblock:?}");
        Ok(superblock)
    }

    fn map(&self, f: fn(u64) -> u64) -> Self {
        Self {
            magic: f(self.magic),
            superblock_size: f(self.superblock_size),
            inode_count: f(self.inode_count),
            data_block_count: f(self.data_block_count),
            pointers_per_inode: f(self.pointers_per_inode),
            block_size: f(self.block_size),
            inode_size: f(self.inode_size),
            data_block_size: f(self.data_block_size),
            max_name_length: f(self.max_name_length),
        }
    }
}

impl Display for Superblock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "magic:              {:#x}", self.magic)?;
        writeln!(f, "superblock size:    {}", self.superblock_size)?;
        writeln!(f, "inodes:             {}", self.inode_count)?;
        writeln!(f, "data blocks:        {}", self.data_block_count)?;
        writeln!(f, "pointers per inode: {}", self.pointers_per_inode)?;
        writeln!(f, "block size:         {}", self.block_size)?;
        writeln!(f, "inode size:         {}", self.inode_size)?;
        writeln!(f, "data block size:    {}", self.data_block_size)?;
        write!(f, "max name length:    {}", self.max_name_length)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn serialized_size_matches_header() {
        let superblock = Superblock::new(&Config::default(), 32);
        assert_eq!(SUPERBLOCK_SIZE, 72);
        assert_eq!(superblock.superblock_size, SUPERBLOCK_SIZE);
        assert_eq!(superblock.to_bytes().len(), SUPERBLOCK_SIZE as usize);
    }

    #[test]
    fn fields_are_little_endian_in_order() {
        let superblock = Superblock::new(&Config::default(), 32);
        let raw = superblock.to_bytes();
        let fields: Vec<u64> = raw.chunks(8).map(u64_from_bytes).collect();
        assert_eq!(fields, vec![0xBEEF, 72, 4, 8, 2, 512, 32, 128, 16]);
        assert_eq!(raw[..2], [0xEFu8, 0xBE]);
    }

    #[test]
    fn load_from_device() {
        let superblock = Superblock::new(&Config::default(), 32);
        let mut raw = superblock.to_bytes();
        raw.resize(512, 0);
        let mut dev = Cursor::new(raw);
        assert_eq!(Superblock::load(&mut dev).unwrap(), superblock);
    }

    #[test]
    fn reject_bad_magic() {
        let mut raw = Superblock::new(&Config::default(), 32).to_bytes();
        raw[0] = 0xAD;
        assert!(matches!(
            Superblock::from_bytes(&raw),
            Err(Error::InvalidMagic(0xBEAD))
        ));
        assert!(matches!(
            Superblock::from_bytes(&raw[..10]),
            Err(Error::InvalidSuperblock)
        ));
    }
}
