use std::path::PathBuf;

use anyhow::{Context, Result};

pub fn cache_dir_path() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("unable to resolve cache directory")?;
    Ok(base.join("ytcards"))
}
