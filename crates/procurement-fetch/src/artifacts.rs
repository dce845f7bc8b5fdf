//! Artifact naming and persistence.
//!
//! Files are written to a sibling `.part` file and renamed into place, so a
//! reader (or the resumability scan) never observes a truncated artifact.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::types::FetchResult;

/// Substring shared by every award batch artifact name.
pub const AWARD_ARTIFACT_PREFIX: &str = "awards_to_8a";

const UNSUCCESSFUL_ARTIFACT_PREFIX: &str = "unsuccessful_award_fetch";

pub const PDF_EXTENSION: &str = "pdf";

pub fn award_artifact_name(year: i32) -> String {
    format!("{AWARD_ARTIFACT_PREFIX}_{year}.json")
}

pub fn unsuccessful_artifact_name(year: i32) -> String {
    format!("{UNSUCCESSFUL_ARTIFACT_PREFIX}_{year}.json")
}

pub fn pdf_artifact_name(identifier: &str) -> String {
    format!("{identifier}.{PDF_EXTENSION}")
}

/// Extract the year from `<prefix>_<year>.<ext>`.
///
/// Takes the text after the last `_`, up to the first `.`.
pub fn parse_artifact_year(file_name: &str) -> Option<i32> {
    let tail = file_name.rsplit('_').next()?;
    let stem = tail.split('.').next()?;
    stem.parse().ok()
}

/// Write `bytes` to `path`, creating parent directories as needed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> FetchResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = part_path(path);
    let result = (|| -> FetchResult<()> {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

/// Serialize `value` as JSON and write it atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> FetchResult<()> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    write_atomic(path, &bytes)
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}
