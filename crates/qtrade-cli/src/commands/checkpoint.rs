//! `checkpoint inspect <dir>` — prints whatever snapshots a checkpoint
//! directory currently holds, without starting a session.

use std::path::Path;

use anyhow::{Context, Result};

const SNAPSHOT_NAMES: &[&str] = &["portfolio", "risk_state", "capital_ledger"];

pub fn inspect(dir: &Path) -> Result<()> {
    if !dir.exists() {
        anyhow::bail!("checkpoint dir {} does not exist", dir.display());
    }

    for name in SNAPSHOT_NAMES {
        let path = dir.join(format!("{name}.json"));
        match qtrade_core::read_if_exists(&path).with_context(|| format!("read {}", path.display()))? {
            Some(bytes) => {
                let value: serde_json::Value = serde_json::from_slice(&bytes)
                    .with_context(|| format!("{} is not valid JSON", path.display()))?;
                println!("{name}:");
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            None => println!("{name}: (absent)"),
        }
    }

    let qtable_path = dir.join("qtable.json");
    match qtable_path.exists() {
        true => println!("qtable: present ({})", qtable_path.display()),
        false => println!("qtable: (absent)"),
    }

    Ok(())
}
