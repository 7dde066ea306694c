//! Atomic file writes shared by the checkpoint manager and the idempotency
//! tracker: write a `.tmp` sibling, fsync it, back up the previous live file
//! to `.bak`, then rename the `.tmp` over the live path.
//!
//! This is the one place in the workspace that touches a checkpoint-style
//! file directly; every caller goes through [`write_atomic`] / [`read_if_exists`]
//! so the write sequence is never duplicated ad hoc.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Write `contents` to `path` atomically, keeping the previous contents (if
/// any) at `path` with a `.bak` suffix.
///
/// Sequence: write `<path>.tmp` → `fsync` → rename existing `path` to
/// `<path>.bak` (if it exists) → rename `<path>.tmp` to `path`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp_path = sibling_with_suffix(path, "tmp");
    {
        let mut f = File::create(&tmp_path)?;
        f.write_all(contents)?;
        f.sync_all()?;
    }

    if path.exists() {
        let bak_path = sibling_with_suffix(path, "bak");
        fs::rename(path, &bak_path)?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read `path` if it exists, returning `None` if it does not.
pub fn read_if_exists(path: &Path) -> std::io::Result<Option<Vec<u8>>> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read(path).map(Some)
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> std::path::PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".");
    os.push(suffix);
    std::path::PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn write_then_read_roundtrip() {
        let dir = std::env::temp_dir().join(format!("qtrade-atomic-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("state.json");

        write_atomic(&path, b"{\"a\":1}").unwrap();
        let read = read_if_exists(&path).unwrap().unwrap();
        assert_eq!(read, b"{\"a\":1}");
        assert!(!sibling_with_suffix(&path, "bak").exists());

        write_atomic(&path, b"{\"a\":2}").unwrap();
        let read = read_if_exists(&path).unwrap().unwrap();
        assert_eq!(read, b"{\"a\":2}");

        let mut bak = String::new();
        File::open(sibling_with_suffix(&path, "bak"))
            .unwrap()
            .read_to_string(&mut bak)
            .unwrap();
        assert_eq!(bak, "{\"a\":1}");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn read_missing_file_returns_none() {
        let path = std::env::temp_dir().join("qtrade-atomic-test-missing.json");
        fs::remove_file(&path).ok();
        assert_eq!(read_if_exists(&path).unwrap(), None);
    }
}
