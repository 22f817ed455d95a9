// Disk usage of the root volume (`/` or the Windows system drive)

use super::{ReadError, Reader};
use crate::models::ResourceUsage;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use sysinfo::Disks;

/// One mounted volume as enumerated by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub mount_point: PathBuf,
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl Volume {
    /// A volume reporting no capacity (unmounted media, pseudo filesystems) is not ready.
    pub fn is_ready(&self) -> bool {
        self.total_bytes > 0
    }
}

/// Picks the ready volume mounted at `root`. When several entries share the mount point
/// (bind mounts, overlays) the largest wins, ties broken by free space, so the choice
/// does not depend on enumeration order.
pub fn select_root_volume<'a>(volumes: &'a [Volume], root: &Path) -> Option<&'a Volume> {
    volumes
        .iter()
        .filter(|v| v.is_ready() && v.mount_point == root)
        .max_by_key(|v| (v.total_bytes, v.free_bytes))
}

pub fn usage_of(volumes: &[Volume], root: &Path) -> Result<ResourceUsage, ReadError> {
    let volume =
        select_root_volume(volumes, root).ok_or_else(|| ReadError::NoRootVolume(root.into()))?;
    Ok(ResourceUsage::from_bytes(
        volume.total_bytes,
        volume.free_bytes.min(volume.total_bytes),
    ))
}

pub struct VolumeDiskReader {
    root: PathBuf,
    disks: Mutex<Disks>,
}

impl VolumeDiskReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn volumes(&self) -> Result<Vec<Volume>, ReadError> {
        let mut disks = self.disks.lock().map_err(|_| ReadError::Poisoned)?;
        disks.refresh(true);
        Ok(disks
            .list()
            .iter()
            .map(|d| Volume {
                mount_point: d.mount_point().to_path_buf(),
                total_bytes: d.total_space(),
                free_bytes: d.available_space(),
            })
            .collect())
    }
}

impl Reader for VolumeDiskReader {
    type Output = ResourceUsage;

    fn name(&self) -> &'static str {
        "disk"
    }

    fn read(&self) -> Result<ResourceUsage, ReadError> {
        usage_of(&self.volumes()?, &self.root)
    }
}
