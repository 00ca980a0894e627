//! Build drives from configuration

use anyhow::{bail, Context, Result};
use arbor_core::{ArborConfig, BackendConfig, Drive, DriveConfig, PathTool};
use arbor_fs::DirectoryStore;
use arbor_memstore::DictionaryStore;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Mount every configured drive, in declaration order. Drive names must be unique.
pub fn mount(config: &ArborConfig) -> Result<Vec<Drive>> {
    let paths = PathTool::from_config(&config.path);
    let mut seen = HashSet::new();
    let mut drives = Vec::with_capacity(config.drives.len());
    for drive in &config.drives {
        if !seen.insert(drive.name.as_str()) {
            bail!("drive '{}' is configured more than once", drive.name);
        }
        let mounted = mount_drive(drive, paths)
            .with_context(|| format!("mounting drive '{}'", drive.name))?;
        drives.push(mounted);
    }
    Ok(drives)
}

/// Strict load: unlike [`ArborConfig::load`], a broken file is an error.
pub fn mount_file(path: &Path) -> Result<Vec<Drive>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config = ArborConfig::from_toml_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    mount(&config)
}

fn mount_drive(drive: &DriveConfig, paths: PathTool) -> Result<Drive> {
    let mounted = match &drive.backend {
        BackendConfig::Memory { seed } => {
            DictionaryStore::from_seed(seed.clone())?.drive_with(&drive.name, paths)?
        }
        BackendConfig::Directory { root } => {
            DirectoryStore::new(root).drive_with(&drive.name, paths)?
        }
    };
    info!(drive = %drive.name, "mounted");
    Ok(mounted)
}
