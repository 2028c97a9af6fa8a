use std::fmt::Display;
use std::path::PathBuf;

use crate::image::Stage;
use crate::layout::Region;

/// Exit codes from `sysexits.h`
pub const EX_USAGE: i32 = 64;
pub const EX_DATAERR: i32 = 65;
pub const EX_SOFTWARE: i32 = 70;
pub const EX_OSERR: i32 = 71;
pub const EX_CONFIG: i32 = 78;

#[derive(Debug)]
pub enum Error {
    /// Block size of zero makes every region alignment undefined
    ZeroBlockSize,
    /// Serialized superblock does not fit into its single block
    SuperblockTooLarge { size: u64, block_size: u64 },
    /// Region size arithmetic exceeds `u64`
    Overflow(Region),
    /// Image file could not be created
    Open { path: PathBuf, source: std::io::Error },
    /// Finished image could not be moved into place
    Persist { path: PathBuf, source: std::io::Error },
    /// Sink accepted fewer bytes than requested
    ShortWrite {
        region: Region,
        requested: u64,
        written: usize,
    },
    /// Sink returned an error while writing a region
    Write {
        region: Region,
        requested: u64,
        source: std::io::Error,
    },
    /// Sink could not be flushed after its last region
    Flush {
        region: Region,
        requested: u64,
        source: std::io::Error,
    },
    /// Region write attempted after the writer finished or failed
    InvalidStage(Stage),
    /// Scratch buffer for a region could not be allocated
    Allocation { region: Region, size: u64 },
    InvalidMagic(u64),
    InvalidSuperblock,
    InvalidInodeType(u64),
    SizeMismatch { expected: u64, actual: u64 },
    NotPristine { offset: u64 },
    OutOfBounds,
    Io(std::io::Error),
}

impl Error {
    /// Whether the error stems from an invalid parameter set
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ZeroBlockSize | Self::SuperblockTooLarge { .. } | Self::Overflow(_)
        )
    }

    /// Process exit code following `sysexits.h`
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ZeroBlockSize | Self::SuperblockTooLarge { .. } | Self::Overflow(_) => {
                EX_CONFIG
            }
            Self::Allocation { .. } | Self::InvalidStage(_) => EX_SOFTWARE,
            Self::InvalidMagic(_)
            | Self::InvalidSuperblock
            | Self::InvalidInodeType(_)
            | Self::SizeMismatch { .. }
            | Self::NotPristine { .. } => EX_DATAERR,
            Self::OutOfBounds => EX_USAGE,
            Self::Open { .. }
            | Self::Persist { .. }
            | Self::ShortWrite { .. }
            | Self::Write { .. }
            | Self::Flush { .. }
            | Self::Io(_) => EX_OSERR,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroBlockSize => write!(f, "block size must be greater than zero"),
            Self::SuperblockTooLarge { size, block_size } => write!(
                f,
                "superblock of {size} bytes does not fit into block of {block_size} bytes"
            ),
            Self::Overflow(region) => write!(f, "size of {region} overflows"),
            Self::Open { path, source } => write!(f, "open {}: {source}", path.display()),
            Self::Persist { path, source } => {
                write!(f, "persist {}: {source}", path.display())
            }
            Self::ShortWrite {
                region,
                requested,
                written,
            } => write!(
                f,
                "write failure while writing {region}: {written} of {requested} bytes written"
            ),
            Self::Write {
                region,
                requested,
                source,
            } => write!(
                f,
                "write failure while writing {region} of {requested} bytes: {source}"
            ),
            Self::Flush {
                region,
                requested,
                source,
            } => write!(
                f,
                "flush failure after writing {region}, image of {requested} bytes: {source}"
            ),
            Self::InvalidStage(stage) => write!(f, "cannot write region in stage {stage:?}"),
            Self::Allocation { region, size } => write!(
                f,
                "allocation failure while writing {region} of {size} bytes"
            ),
            Self::InvalidMagic(magic) => write!(f, "invalid magic signature {magic:#x}"),
            Self::InvalidSuperblock => write!(f, "superblock geometry is inconsistent"),
            Self::InvalidInodeType(code) => write!(f, "invalid inode type {code}"),
            Self::SizeMismatch { expected, actual } => {
                write!(f, "image is {actual} bytes, expected {expected}")
            }
            Self::NotPristine { offset } => write!(f, "non-zero byte at offset {offset:#x}"),
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. }
            | Self::Persist { source, .. }
            | Self::Write { source, .. }
            | Self::Flush { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Region;

    #[test]
    fn config_errors_are_classified() {
        assert!(Error::ZeroBlockSize.is_config());
        assert!(Error::Overflow(Region::InodeTable).is_config());
        assert!(!Error::OutOfBounds.is_config());
        assert_eq!(Error::ZeroBlockSize.exit_code(), EX_CONFIG);
        assert_eq!(
            Error::Allocation {
                region: Region::DataTable,
                size: 1
            }
            .exit_code(),
            EX_SOFTWARE
        );
    }

    #[test]
    fn write_failure_names_region() {
        let err = Error::ShortWrite {
            region: Region::DataTable,
            requested: 1024,
            written: 512,
        };
        assert_eq!(
            err.to_string(),
            "write failure while writing data table: 512 of 1024 bytes written"
        );
        assert_eq!(err.exit_code(), EX_OSERR);

        let err = Error::Write {
            region: Region::InodeTable,
            requested: 512,
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(
            err.to_string(),
            "write failure while writing inode table of 512 bytes: disk full"
        );
    }

    #[test]
    fn sysexits_values() {
        assert_eq!(EX_USAGE, 64);
        assert_eq!(EX_DATAERR, 65);
        assert_eq!(EX_SOFTWARE, 70);
        assert_eq!(EX_OSERR, 71);
        assert_eq!(EX_CONFIG, 78);
        assert_eq!(Error::InvalidMagic(0).exit_code(), EX_DATAERR);
        assert_eq!(Error::OutOfBounds.exit_code(), EX_USAGE);
    }
}
