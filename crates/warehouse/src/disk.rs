//! Disk space precondition for bulk exports
//!
//! A bulk export stages every record to disk before the load job runs.
//! Rather than fail halfway through a multi-gigabyte write, the loader
//! checks up front that the staging filesystem has room for the
//! estimated file plus the same amount of headroom.

use std::path::Path;

use hearth_config::ESTIMATED_BYTES_PER_RECORD;
use sysinfo::Disks;

use crate::error::{Result, WarehouseError};

#[cfg(test)]
#[path = "disk_test.rs"]
mod tests;

/// Headroom multiplier over the estimated staging file size
const HEADROOM_FACTOR: u64 = 2;

/// Bytes required on disk to stage `record_count` records.
pub fn required_bytes(record_count: u64) -> u64 {
    record_count
        .saturating_mul(ESTIMATED_BYTES_PER_RECORD)
        .saturating_mul(HEADROOM_FACTOR)
}

/// Free bytes on the filesystem holding `path`.
///
/// Matches the disk with the longest mount point that prefixes `path`.
/// Returns `None` when no disk claims the path, which happens on some
/// containerized filesystems; callers treat that as "unknown, proceed".
pub fn available_bytes(path: &Path) -> Option<u64> {
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| disk.available_space())
}

/// Fail unless the filesystem holding `path` can stage `record_count`
/// records with headroom.
pub fn check_disk_space(path: &Path, record_count: u64) -> Result<()> {
    let needed = required_bytes(record_count);
    let Some(available) = available_bytes(path) else {
        tracing::debug!(path = %path.display(), "no disk matched staging path, skipping space check");
        return Ok(());
    };

    if available < needed {
        return Err(WarehouseError::DiskSpace { needed, available });
    }
    Ok(())
}
