use std::io::{SeekFrom, Write};
use std::path::Path;

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::config::Config;
use crate::layout::{Layout, Region};
use crate::structs::{BlockDevice, Superblock, SUPERBLOCK_SIZE};
use crate::Error;

const VERIFY_CHUNK: usize = 4096;

#[cfg(unix)]
const IMAGE_MODE: u32 = 0o644;

/// Progress of an [`ImageWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    WritingSuperblock,
    WritingInodeTable,
    WritingDataTable,
    Done,
    Failed,
}

impl Stage {
    /// Region written in this stage
    pub fn region(self) -> Option<Region> {
        match self {
            Self::WritingSuperblock => Some(Region::Superblock),
            Self::WritingInodeTable => Some(Region::InodeTable),
            Self::WritingDataTable => Some(Region::DataTable),
            Self::Done | Self::Failed => None,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::WritingSuperblock => Self::WritingInodeTable,
            Self::WritingInodeTable => Self::WritingDataTable,
            Self::WritingDataTable | Self::Done => Self::Done,
            Self::Failed => Self::Failed,
        }
    }
}

/// Sequentially appends image regions to a sink.
///
/// Regions are written strictly in order, superblock first. After any failure
/// the writer is stuck in [`Stage::Failed`] and the sink holds a partial image
/// which must be discarded by the caller.
#[derive(Debug)]
pub struct ImageWriter<W: Write> {
    sink: W,
    stage: Stage,
}

impl<W: Write> ImageWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            stage: Stage::WritingSuperblock,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Append next region of `size` bytes, starting with `header` and zero filled
    pub fn write_region(&mut self, size: u64, header: Option<&[u8]>) -> Result<(), Error> {
        let region = self.stage.region().ok_or(Error::InvalidStage(self.stage))?;
        match write_region(&mut self.sink, region, size, header) {
            Ok(()) => {
                self.stage = self.stage.next();
                Ok(())
            }
            Err(e) => {
                self.stage = Stage::Failed;
                Err(e)
            }
        }
    }

    /// Write all three regions of `layout` and flush the sink
    pub fn write_layout(&mut self, layout: &Layout, superblock: &Superblock) -> Result<(), Error> {
        let header = superblock.to_bytes();
        for span in layout.regions() {
            let header = (span.region == Region::Superblock).then_some(header.as_slice());
            self.write_region(span.size, header)?;
        }
        if let Err(source) = self.sink.flush() {
            self.stage = Stage::Failed;
            return Err(Error::Flush {
                region: Region::DataTable,
                requested: layout.total_size,
                source,
            });
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

fn write_region<W: Write + ?Sized>(
    sink: &mut W,
    region: Region,
    size: u64,
    header: Option<&[u8]>,
) -> Result<(), Error> {
    info!("Writing {region} of size {size} bytes");
    let allocation = || Error::Allocation { region, size };
    let length = usize::try_from(size).map_err(|_| allocation())?;
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(length).map_err(|_| allocation())?;
    buffer.resize(length, 0u8);
    if let Some(header) = header {
        buffer
            .get_mut(..header.len())
            .ok_or(Error::SuperblockTooLarge {
                size: header.len() as u64,
                block_size: size,
            })?
            .copy_from_slice(header);
    }
    let written = sink
        .write(&buffer)
        .map_err(|source| Error::Write {
            region,
            requested: size,
            source,
        })?;
    if written != length {
        return Err(Error::ShortWrite {
            region,
            requested: size,
            written,
        });
    }
    debug!("Wrote {written} bytes of {region}");
    Ok(())
}

/// Format an empty image described by `config` into `sink`.
///
/// Configuration is validated before the sink is touched. A failed write
/// leaves the sink in an unusable state, see [`create_image`] for an atomic
/// alternative.
pub fn format<W: Write>(sink: W, config: &Config) -> Result<Layout, Error> {
    let layout = Layout::compute(config)?;
    write_image(sink, config, &layout)?;
    Ok(layout)
}

fn write_image<W: Write>(sink: W, config: &Config, layout: &Layout) -> Result<(), Error> {
    let superblock = Superblock::new(config, layout.inode_size);
    ImageWriter::new(sink).write_layout(layout, &superblock)
}

/// Create image file at `path`, replacing any existing file only on success
pub fn create_image<P: AsRef<Path>>(path: P, config: &Config) -> Result<Layout, Error> {
    let path = path.as_ref();
    let layout = Layout::compute(config)?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let open_error = |source| Error::Open {
        path: path.to_path_buf(),
        source,
    };
    let persist_error = |source| Error::Persist {
        path: path.to_path_buf(),
        source,
    };

    let mut file = NamedTempFile::new_in(directory).map_err(open_error)?;
    debug!("Staging image in {}", file.path().display());
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(IMAGE_MODE))
            .map_err(open_error)?;
    }
    write_image(&mut file, config, &layout)?;
    file.as_file().sync_all().map_err(persist_error)?;
    file.persist(path).map_err(|e| persist_error(e.error))?;
    info!(
        "Created image {} of {} bytes",
        path.display(),
        layout.total_size
    );
    Ok(layout)
}

/// Check that `device` holds a freshly formatted, structurally valid image
pub fn verify<D: BlockDevice + ?Sized>(device: &mut D) -> Result<Layout, Error> {
    let superblock = Superblock::load(device)?;
    let layout = Layout::from_superblock(&superblock)?;
    let actual = device.seek(SeekFrom::End(0))?;
    if actual != layout.total_size {
        return Err(Error::SizeMismatch {
            expected: layout.total_size,
            actual,
        });
    }
    device.seek(SeekFrom::Start(SUPERBLOCK_SIZE))?;
    let mut offset = SUPERBLOCK_SIZE;
    let mut chunk = [0u8; VERIFY_CHUNK];
    loop {
        let n = device.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        if let Some(position) = chunk[..n].iter().position(|&b| b != 0) {
            return Err(Error::NotPristine {
                offset: offset + position as u64,
            });
        }
        offset += n as u64;
    }
    debug!("Verified {offset} bytes");
    Ok(layout)
}
