//! Home directory resolution.
//!
//! When the installer runs under sudo (the system groups need it), `~`
//! must still mean the invoking user's home, not root's. Mirrors what
//! the upstream install scripts do with `SUDO_USER`.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// The home directory all catalog targets expand against.
///
/// Prefers the `SUDO_USER` entry from `/etc/passwd` when present so a
/// sudo invocation themes the invoking user rather than root.
pub fn real_home() -> Result<PathBuf> {
    if let Ok(sudo_user) = std::env::var("SUDO_USER") {
        if !sudo_user.is_empty() {
            if let Ok(passwd) = fs::read_to_string("/etc/passwd") {
                if let Some(home) = home_from_passwd(&passwd, &sudo_user) {
                    return Ok(home);
                }
            }
        }
    }

    dirs::home_dir().context("Could not determine home directory")
}

/// Expand a leading `~` against the given home directory.
pub fn expand(path: &str, home: &Path) -> PathBuf {
    let expanded = shellexpand::tilde_with_context(path, || Some(home.to_string_lossy().into_owned()));
    PathBuf::from(expanded.as_ref())
}

fn home_from_passwd(passwd: &str, user: &str) -> Option<PathBuf> {
    passwd.lines().find_map(|line| {
        let fields: Vec<&str> = line.split(':').collect();
        match fields.as_slice() {
            [name, _, _, _, _, home, ..] if *name == user && !home.is_empty() => {
                Some(PathBuf::from(home))
            }
            _ => None,
        }
    })
}
