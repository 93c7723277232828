//! Prefetch the latest bundle into the cache without applying anything.

use crate::Context;
use crate::config::Config;
use crate::{paths, ui};
use anyhow::{Context as _, Result};
use releasekit::{AssetCache, Resolver};

pub fn run(_ctx: &Context) -> Result<()> {
    let home = paths::real_home()?;
    let config = Config::load(&home)?;
    let cache_root = config.cache_root(&home);

    let resolver = Resolver::new();
    ui::info(&format!(
        "Resolving latest {}/{} release...",
        config.repo.owner, config.repo.name
    ));
    let release = resolver
        .latest(&config.repo.owner, &config.repo.name)
        .context("Failed to resolve the latest release")?;
    ui::success(&format!("Latest release: {}", release.tag));

    let cache = AssetCache::new(&cache_root);
    if cache.is_cached(&release.tag) {
        ui::info(&format!(
            "Already cached at {}",
            cache.entry_path(&release.tag).display()
        ));
        return Ok(());
    }

    if let Some(asset) = release.asset(&config.archive) {
        ui::info(&format!("Downloading {} ({})", asset.name, asset.human_size()));
    }
    let bundle = cache
        .ensure(resolver.backend(), &release, &config.archive)
        .context("Failed to populate the asset cache")?;

    ui::success(&format!("Bundle cached at {}", bundle.display()));
    Ok(())
}
