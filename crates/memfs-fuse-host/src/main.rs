//! memfs FUSE Host — Linux/macOS filesystem adapter
//!
//! This binary mounts an in-memory filesystem through libfuse (Linux) or
//! macFUSE (macOS), translating kernel calls into memfs core operations.

#[cfg(feature = "fuse")]
mod adapter;

#[cfg(feature = "fuse")]
use adapter::MemFsFuse;
use anyhow::Result;
use clap::Parser;
use memfs_core::FsConfig;
use std::fs;
use std::path::PathBuf;
#[cfg(not(feature = "fuse"))]
use tracing::warn;
use tracing::info;

#[derive(Parser)]
struct Args {
    /// Mount point for the filesystem
    mount_point: PathBuf,

    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Allow other users to access the filesystem
    #[arg(long)]
    allow_other: bool,

    /// Allow root to access the filesystem
    #[arg(long)]
    allow_root: bool,

    /// Auto unmount on process exit
    #[arg(long)]
    auto_unmount: bool,
}

fn load_config(config_path: Option<PathBuf>) -> Result<FsConfig> {
    match config_path {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: FsConfig = serde_json::from_str(&content)?;
            Ok(config)
        }
        None => Ok(FsConfig::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    info!("Starting memfs FUSE host");
    info!("Mount point: {}", args.mount_point.display());

    let config = load_config(args.config)?;
    info!("Configuration loaded: {:?}", config);

    #[cfg(feature = "fuse")]
    {
        let filesystem = MemFsFuse::new(config);

        let mut mount_options = vec![
            fuser::MountOption::FSName("memfs".to_string()),
            fuser::MountOption::Subtype("memfs".to_string()),
        ];

        if args.allow_other {
            mount_options.push(fuser::MountOption::AllowOther);
        }

        if args.allow_root {
            mount_options.push(fuser::MountOption::AllowRoot);
        }

        if args.auto_unmount {
            mount_options.push(fuser::MountOption::AutoUnmount);
        }

        info!("Mounting filesystem...");
        fuser::mount2(filesystem, &args.mount_point, &mount_options)?;
    }

    #[cfg(not(feature = "fuse"))]
    {
        warn!("FUSE support not compiled in. This binary is for testing only.");
        info!("memfs core initialized with config: {:?}", config);
        info!("To enable FUSE support, compile with: cargo build --features fuse");
    }

    Ok(())
}
