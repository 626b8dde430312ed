pub mod identity;
pub mod kubectl;
pub mod mounts;
pub mod output;
pub mod pods;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// Read captured command output from a file, or stdin for `-`.
pub fn read_capture(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read captured output from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
