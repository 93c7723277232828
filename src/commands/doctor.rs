//! Environment checks. Reports only; never mutates anything.

use crate::Context;
use crate::config::Config;
use crate::{paths, ui};
use anyhow::Result;
use regex::Regex;
use std::fs;
use std::process::Command;

pub fn run(ctx: &Context) -> Result<()> {
    ui::header("Environment Check");

    let os = fs::read_to_string("/etc/os-release")
        .ok()
        .and_then(|content| describe_os(&content))
        .unwrap_or_else(|| "Unknown".to_string());
    ui::kv("OS", &os);

    match plasma_major_version() {
        Some(major) if major >= 6 => {
            ui::success(&format!("KDE Plasma {major} detected"));
        }
        Some(major) => {
            ui::warn(&format!(
                "KDE Plasma {major} detected; this installer targets Plasma 6"
            ));
        }
        None => {
            ui::warn("Could not detect KDE Plasma (plasmashell --version failed)");
        }
    }

    if command_available("flatpak") {
        ui::success("flatpak is available");
    } else {
        ui::warn("flatpak not found; app and override groups will fail");
    }

    let home = paths::real_home()?;
    let config = Config::load(&home)?;
    if ctx.verbose > 0 {
        ui::kv(
            "Repository",
            &format!("{}/{}", config.repo.owner, config.repo.name),
        );
        ui::kv("Archive", &config.archive);
    }
    let cache_root = config.cache_root(&home);
    if cache_root.is_dir() {
        let tags: Vec<String> = fs::read_dir(&cache_root)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().is_dir())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .filter(|name| !name.starts_with('.'))
                    .collect()
            })
            .unwrap_or_default();
        ui::kv("Cache", &cache_root.display().to_string());
        if tags.is_empty() {
            ui::dim("no cached releases yet");
        } else {
            ui::dim(&format!("cached releases: {}", tags.join(", ")));
        }
    } else {
        ui::kv("Cache", "empty (nothing downloaded yet)");
    }

    Ok(())
}

/// Human-readable OS description from /etc/os-release contents.
fn describe_os(content: &str) -> Option<String> {
    let mut pretty = None;
    let mut name = None;
    let mut codename = None;

    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').to_string();
        match key {
            "PRETTY_NAME" => pretty = Some(value),
            "NAME" => name = Some(value),
            "VERSION_CODENAME" => codename = Some(value),
            _ => {}
        }
    }

    let base = pretty.or(name)?;
    Some(match codename {
        Some(code) if !code.is_empty() => format!("{base} ({code})"),
        _ => base,
    })
}

/// Major version parsed from `plasmashell --version` output.
fn plasma_major_version() -> Option<u32> {
    let output = Command::new("plasmashell").arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    parse_plasma_version(&String::from_utf8_lossy(&output.stdout))
}

fn parse_plasma_version(output: &str) -> Option<u32> {
    let re = Regex::new(r"(\d+)\.\d+").ok()?;
    re.captures(output)?.get(1)?.as_str().parse().ok()
}

fn command_available(name: &str) -> bool {
    Command::new(name)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_os_prefers_pretty_name() {
        let content = "NAME=\"Debian GNU/Linux\"\nPRETTY_NAME=\"Debian GNU/Linux 13 (trixie)\"\nVERSION_CODENAME=trixie\n";
        assert_eq!(
            describe_os(content),
            Some("Debian GNU/Linux 13 (trixie) (trixie)".to_string())
        );
    }

    #[test]
    fn test_describe_os_falls_back_to_name() {
        let content = "NAME=\"Arch Linux\"\n";
        assert_eq!(describe_os(content), Some("Arch Linux".to_string()));
    }

    #[test]
    fn test_describe_os_empty() {
        assert_eq!(describe_os(""), None);
    }

    #[test]
    fn test_parse_plasma_version() {
        assert_eq!(parse_plasma_version("plasmashell 6.3.4"), Some(6));
        assert_eq!(parse_plasma_version("plasmashell 5.27.11"), Some(5));
        assert_eq!(parse_plasma_version("no version here"), None);
    }
}
