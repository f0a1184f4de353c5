//! Device identity assets
//!
//! The engine needs a device identity/calibration blob at init. The host
//! platform decides where those blobs live; this module only asks for one
//! by path.

use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::joycon::error::{JoyconError, Result};

/// An opaque blob plus the path it was requested under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAsset {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl DeviceAsset {
    pub fn new(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self { path: path.into(), bytes }
    }
}

/// Host asset store
pub trait AssetSource {
    fn open(&self, path: &Path) -> Result<DeviceAsset>;
}

/// Assets read from a directory on disk
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsAssetSource {
    fn open(&self, path: &Path) -> Result<DeviceAsset> {
        let full = self.root.join(path);
        let bytes = fs::read(&full).map_err(|source| JoyconError::Asset {
            path: full.clone(),
            source,
        })?;
        info!("Loaded device asset {} ({} bytes)", full.display(), bytes.len());
        Ok(DeviceAsset::new(path, bytes))
    }
}

/// In-memory assets, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    assets: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.assets.insert(path.into(), bytes);
    }
}

impl AssetSource for MemoryAssetSource {
    fn open(&self, path: &Path) -> Result<DeviceAsset> {
        match self.assets.get(path) {
            Some(bytes) => {
                debug!("Serving in-memory asset {}", path.display());
                Ok(DeviceAsset::new(path, bytes.clone()))
            }
            None => Err(JoyconError::Asset {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such in-memory asset"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("right.bin"), [0x57, 0x4A, 0x01]).unwrap();

        let source = FsAssetSource::new(dir.path());
        let asset = source.open(Path::new("right.bin")).unwrap();
        assert_eq!(asset.path, PathBuf::from("right.bin"));
        assert_eq!(asset.bytes, vec![0x57, 0x4A, 0x01]);
    }

    #[test]
    fn test_fs_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsAssetSource::new(dir.path());
        let err = source.open(Path::new("missing.bin")).unwrap_err();
        match err {
            JoyconError::Asset { path, source } => {
                assert!(path.ends_with("missing.bin"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_memory_source() {
        let mut source = MemoryAssetSource::new();
        source.insert("left.bin", vec![1, 2]);
        assert_eq!(source.open(Path::new("left.bin")).unwrap().bytes, vec![1, 2]);
        assert!(source.open(Path::new("right.bin")).is_err());
    }
}
