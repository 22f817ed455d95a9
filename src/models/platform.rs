// Host platform classification, resolved once at startup

use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Other,
}

impl Platform {
    /// Platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    /// Mount point of the volume reported by the disk reader.
    /// Windows uses the system drive (`%SystemDrive%`, default `C:`) root.
    pub fn root_mount(&self) -> PathBuf {
        match self {
            Platform::Windows => {
                let drive = std::env::var("SystemDrive")
                    .ok()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| "C:".into());
                PathBuf::from(format!("{}\\", drive.trim_end_matches('\\')))
            }
            Platform::Linux | Platform::MacOs | Platform::Other => PathBuf::from("/"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Other => "other",
        }
    }
}
