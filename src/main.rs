use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use myfs::config::*;
use myfs::{create_image, Config};

/// Format an empty myfs filesystem image
#[derive(Parser, Debug)]
#[command(name = "mkmyfs")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path of the image file
    #[arg(value_name = "OUTPUT", default_value = "myfs")]
    output: PathBuf,

    /// Number of inodes
    #[arg(short, long, default_value_t = DEFAULT_INODE_COUNT)]
    inodes: u64,

    /// Number of data blocks
    #[arg(short, long, default_value_t = DEFAULT_DATA_BLOCK_COUNT)]
    data_blocks: u64,

    /// Data block pointers per inode
    #[arg(short, long, default_value_t = DEFAULT_POINTERS_PER_INODE)]
    pointers_per_inode: u64,

    /// Block size used to align every region
    #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: u64,

    /// Size of a single data block
    #[arg(short = 's', long, default_value_t = DEFAULT_DATA_BLOCK_SIZE)]
    data_block_size: u64,

    /// Maximum length of a directory entry name
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_NAME_LENGTH)]
    max_name_length: u64,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Self {
            inode_count: cli.inodes,
            data_block_count: cli.data_blocks,
            pointers_per_inode: cli.pointers_per_inode,
            block_size: cli.block_size,
            data_block_size: cli.data_block_size,
            max_name_length: cli.max_name_length,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = Config::from(&cli);
    match create_image(&cli.output, &config) {
        Ok(layout) => info!("{layout}"),
        Err(e) => {
            error!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_use_defaults() {
        let cli = Cli::parse_from(["mkmyfs"]);
        assert_eq!(cli.output, PathBuf::from("myfs"));
        assert_eq!(Config::from(&cli), Config::default());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from(["mkmyfs", "-i", "16", "--block-size", "4096", "disk.img"]);
        let config = Config::from(&cli);
        assert_eq!(cli.output, PathBuf::from("disk.img"));
        assert_eq!(config.inode_count, 16);
        assert_eq!(config.block_size, 4096);
        assert_eq!(config.data_block_count, DEFAULT_DATA_BLOCK_COUNT);
    }
}
