//! Identifier source resolution for the batch subcommands.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use procurement_fetch::{read_entity_identifiers, read_identifier_list, FetchConfig};

/// Where a batch command takes its UEIs from.
#[derive(Debug, Default, Clone)]
pub struct IdentifierSource {
    pub ueis: Vec<String>,
    pub list_file: Option<PathBuf>,
    pub sam_file: Option<PathBuf>,
}

impl IdentifierSource {
    /// Collect identifiers: explicit `--uei` values, then the list file, then
    /// the SAM snapshot. With no source given, fall back to the snapshot saved
    /// by `entities`.
    pub fn resolve(&self, config: &FetchConfig) -> Result<Vec<String>> {
        let mut ids = self.ueis.clone();

        if let Some(path) = &self.list_file {
            ids.extend(
                read_identifier_list(path)
                    .with_context(|| format!("reading identifier list {}", path.display()))?,
            );
        }

        let sam_file = match (&self.sam_file, ids.is_empty()) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(config.entity_snapshot_path()),
            (None, false) => None,
        };
        if let Some(path) = sam_file {
            ids.extend(read_snapshot(&path)?);
        }

        if ids.is_empty() {
            bail!("no identifiers given (use --uei, --list-file or --sam-file)");
        }
        Ok(ids)
    }
}

fn read_snapshot(path: &Path) -> Result<Vec<String>> {
    read_entity_identifiers(path)
        .with_context(|| format!("reading SAM snapshot {}", path.display()))
}
