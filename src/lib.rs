//! Formatter for myfs, a minimal educational filesystem.
//!
//! An image is a superblock, an inode table and a data table laid out back
//! to back, each padded to a multiple of the block size. All on-disk integers
//! are little endian `u64`.

pub mod config;
pub mod error;
pub mod image;
pub mod layout;
pub mod structs;

pub use config::Config;
pub use error::Error;
pub use image::{create_image, format, verify, ImageWriter, Stage};
pub use layout::{round_up, Layout, Region, RegionSpan};
