use std::fmt::Display;

use super::*;
use crate::{layout::Layout, Error};

const HEXDUMP_WIDTH: usize = 16;

impl Block {
    /// Load data block with index from its slot in the data table
    pub fn load<D: BlockDevice + ?Sized>(
        device: &mut D,
        layout: &Layout,
        index: u64,
    ) -> Result<Self, Error> {
        let position = layout.block_position(index)?;
        let data = read_at(device, position, layout.data_block_size)?;
        Ok(Self { index, data })
    }

    pub fn is_zeroed(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "block {} ({} bytes)", self.index, self.data.len())?;
        for (row, chunk) in self.data.chunks(HEXDUMP_WIDTH).enumerate() {
            write!(f, "\n{:08x} ", row * HEXDUMP_WIDTH)?;
            for byte in chunk {
                write!(f, " {byte:02x}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::config::Config;

    #[test]
    fn oversized_block_is_rejected() {
        let config = Config {
            data_block_count: 1,
            data_block_size: 1 << 62,
            ..Config::default()
        };
        let layout = Layout::compute(&config).unwrap();
        let mut raw = Superblock::new(&config, layout.inode_size).to_bytes();
        raw.resize(2048, 0);
        let mut dev = Cursor::new(raw);
        let superblock = Superblock::load(&mut dev).unwrap();
        let layout = Layout::from_superblock(&superblock).unwrap();
        assert!(matches!(
            Block::load(&mut dev, &layout, 0),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn load_zeroed_block() {
        let config = Config::default();
        let mut image = Vec::new();
        crate::image::format(&mut image, &config).unwrap();
        let mut dev = Cursor::new(image);
        let layout = Layout::compute(&config).unwrap();
        let block = Block::load(&mut dev, &layout, 7).unwrap();
        assert_eq!(block.data.len(), 128);
        assert!(block.is_zeroed());
    }

    #[test]
    fn hexdump_rows() {
        let block = Block {
            index: 2,
            data: vec![0xAB; 20],
        };
        let dump = block.to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "block 2 (20 bytes)");
        assert!(lines[2].starts_with("00000010  ab ab ab ab"));
        assert!(!block.is_zeroed());
    }
}
