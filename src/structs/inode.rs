use std::fmt::Display;

use super::*;
use crate::layout::{inode_size, Layout, Region};

impl InodeType {
    /// Integer code stored in the on-disk `type` field
    pub fn code(self) -> u64 {
        match self {
            Self::RegularFile => 0,
            Self::Directory => 1,
        }
    }
}

impl TryFrom<u64> for InodeType {
    type Error = Error;

    fn try_from(code: u64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::RegularFile),
            1 => Ok(Self::Directory),
            other => Err(Error::InvalidInodeType(other)),
        }
    }
}

impl Inode {
    /// Empty regular file with all pointers cleared
    pub fn new(index: u64, pointers_per_inode: u64) -> Result<Self, Error> {
        let size = inode_size(pointers_per_inode).ok_or(Error::Overflow(Region::InodeTable))?;
        let allocation = || Error::Allocation {
            region: Region::InodeTable,
            size,
        };
        let count = usize::try_from(pointers_per_inode).map_err(|_| allocation())?;
        let mut pointers = Vec::new();
        pointers.try_reserve_exact(count).map_err(|_| allocation())?;
        pointers.resize(count, 0);
        Ok(Self {
            index,
            r#type: InodeType::RegularFile,
            size: 0,
            pointers,
        })
    }

    /// Serialize header and pointers in on-disk (little endian) order
    pub fn to_bytes(&self) -> Vec<u8> {
        let header = InodeHeader {
            r#type: self.r#type.code().to_le(),
            size: self.size.to_le(),
        };
        let mut raw = Vec::with_capacity(
            INODE_HEADER_SIZE as usize + self.pointers.len() * POINTER_SIZE as usize,
        );
        raw.extend_from_slice(bytemuck::bytes_of(&header));
        for pointer in &self.pointers {
            raw.extend_from_slice(&pointer.to_le_bytes());
        }
        raw
    }

    /// Deserialize a record holding `pointers_per_inode` pointers
    pub fn from_bytes(index: u64, bytes: &[u8], pointers_per_inode: u64) -> Result<Self, Error> {
        let record_size = inode_size(pointers_per_inode)
            .and_then(|size| usize::try_from(size).ok())
            .ok_or(Error::OutOfBounds)?;
        if bytes.len() < record_size {
            return Err(Error::OutOfBounds);
        }
        let header: InodeHeader =
            bytemuck::pod_read_unaligned(&bytes[..INODE_HEADER_SIZE as usize]);
        let pointers = bytes[INODE_HEADER_SIZE as usize..record_size]
            .chunks(POINTER_SIZE as usize)
            .map(u64_from_bytes)
            .collect();
        Ok(Self {
            index,
            r#type: InodeType::try_from(u64::from_le(header.r#type))?,
            size: u64::from_le(header.size),
            pointers,
        })
    }

    /// Load inode with index from its slot in the inode table
    pub fn load<D: BlockDevice + ?Sized>(
        device: &mut D,
        layout: &Layout,
        index: u64,
    ) -> Result<Self, Error> {
        let position = layout.inode_position(index)?;
        let raw = read_at(device, position, layout.inode_size)?;
        Self::from_bytes(index, &raw, layout.pointers_per_inode)
    }
}

impl Display for Inode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "inode {}: {:?}, {} bytes, pointers {:?}",
            self.index, self.r#type, self.size, self.pointers
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn record_size_follows_pointer_count() {
        assert_eq!(INODE_HEADER_SIZE, 16);
        assert_eq!(Inode::new(0, 2).unwrap().to_bytes().len(), 32);
        assert_eq!(Inode::new(0, 0).unwrap().to_bytes().len(), 16);
    }

    #[test]
    fn zeroed_record_is_empty_regular_file() {
        let inode = Inode::from_bytes(3, &[0u8; 32], 2).unwrap();
        assert_eq!(inode, Inode::new(3, 2).unwrap());
    }

    #[test]
    fn directory_with_pointers() {
        let inode = Inode {
            index: 1,
            r#type: InodeType::Directory,
            size: 200,
            pointers: vec![5, 7],
        };
        let raw = inode.to_bytes();
        assert_eq!(u64_from_bytes(&raw[0..8]), 1);
        assert_eq!(u64_from_bytes(&raw[8..16]), 200);
        assert_eq!(u64_from_bytes(&raw[24..32]), 7);
        assert_eq!(Inode::from_bytes(1, &raw, 2).unwrap(), inode);
    }

    #[test]
    fn reject_unknown_type() {
        let mut raw = [0u8; 16];
        raw[0] = 9;
        assert!(matches!(
            Inode::from_bytes(0, &raw, 0),
            Err(Error::InvalidInodeType(9))
        ));
        assert!(matches!(
            Inode::from_bytes(0, &raw, 1),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn huge_pointer_count_is_rejected() {
        assert!(matches!(
            Inode::from_bytes(0, &[0u8; 32], u64::MAX / 4),
            Err(Error::OutOfBounds)
        ));
        assert!(matches!(
            Inode::new(0, u64::MAX / 4),
            Err(Error::Overflow(Region::InodeTable))
        ));
        assert!(matches!(
            Inode::new(0, u64::MAX / 16),
            Err(Error::Allocation { .. })
        ));
    }

    #[test]
    fn oversized_inode_is_rejected() {
        let config = Config {
            inode_count: 1,
            pointers_per_inode: 1 << 58,
            ..Config::default()
        };
        let layout = Layout::compute(&config).unwrap();
        let mut raw = Superblock::new(&config, layout.inode_size).to_bytes();
        raw.resize(4096, 0);
        let mut dev = std::io::Cursor::new(raw);
        let layout = Layout::from_superblock(&Superblock::load(&mut dev).unwrap()).unwrap();
        assert!(matches!(
            Inode::load(&mut dev, &layout, 0),
            Err(Error::OutOfBounds)
        ));
    }
}
