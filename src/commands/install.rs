//! The install flow: resolve, cache, select, apply, report.

use crate::Context;
use crate::cli::InstallArgs;
use crate::config::Config;
use crate::{catalog, paths, ui};
use anyhow::{Context as _, Result, bail};
use applykit::{Catalog, MutationStatus, Pipeline, RunReport, SystemRunner};
use colored::Colorize;
use dialoguer::{Confirm, MultiSelect};
use indicatif::{ProgressBar, ProgressStyle};
use releasekit::{AssetCache, Resolver};
use std::time::Duration;

pub fn run(ctx: &Context, args: InstallArgs) -> Result<()> {
    let home = paths::real_home()?;
    let config = Config::load(&home)?;
    let cache_root = config.cache_root(&home);

    let catalog = catalog::build(&home, &cache_root);
    if let Err(msg) = catalog.validate() {
        bail!("invalid catalog: {msg}");
    }

    let selected = select_groups(&catalog, &args)?;
    if selected.is_empty() {
        ui::info("Nothing selected, nothing to do.");
        return Ok(());
    }

    // Acquisition failures are fatal: without the bundle there is
    // nothing to apply.
    let resolver = Resolver::new();
    if !ctx.quiet {
        ui::info(&format!(
            "Resolving latest {}/{} release...",
            config.repo.owner, config.repo.name
        ));
    }
    let release = resolver
        .latest(&config.repo.owner, &config.repo.name)
        .context("Failed to resolve the latest release")?;
    if !ctx.quiet {
        ui::success(&format!("Latest release: {}", release.tag));
    }

    let cache = AssetCache::new(&cache_root);
    let bundle = if cache.is_cached(&release.tag) {
        if !ctx.quiet {
            ui::info(&format!("Using cached bundle for {}", release.tag));
        }
        cache.entry_path(&release.tag)
    } else {
        let spinner = spinner(&format!("Downloading and extracting {}...", release.tag));
        let result = cache.ensure(resolver.backend(), &release, &config.archive);
        spinner.finish_and_clear();
        result.context("Failed to populate the asset cache")?
    };

    if !args.yes {
        let proceed = Confirm::new()
            .with_prompt(format!(
                "Apply {} group(s)? Existing files are backed up first",
                selected.len()
            ))
            .default(true)
            .interact()?;
        if !proceed {
            ui::info("Aborted, no changes made.");
            return Ok(());
        }
    }

    let runner = SystemRunner;
    let apply_ctx = applykit::Context {
        bundle_dir: &bundle,
        staging_dir: cache.root(),
        runner: &runner,
    };
    let report = Pipeline::run(&catalog, &selected, &apply_ctx);

    print_report(&catalog, &selected, &report);

    if !report.is_success() {
        bail!(
            "{} of {} mutations failed; rerun after fixing the reported errors",
            report.failed(),
            report.results.len()
        );
    }

    println!();
    ui::success("Done! Log out and back in to see all changes.");
    Ok(())
}

/// Resolve the group selection from flags, or fall back to the menu.
fn select_groups(catalog: &Catalog, args: &InstallArgs) -> Result<Vec<String>> {
    if args.all {
        return Ok(catalog.ids().iter().map(|s| s.to_string()).collect());
    }

    if !args.groups.is_empty() {
        for id in &args.groups {
            if catalog.group(id).is_none() {
                bail!(
                    "unknown group '{}' (available: {})",
                    id,
                    catalog.ids().join(", ")
                );
            }
        }
        return Ok(args.groups.clone());
    }

    let labels: Vec<String> = catalog
        .groups
        .iter()
        .map(|g| {
            let tag = if g.system { "[SYSTEM] " } else { "" };
            format!("{}{} - {}", tag, g.title, g.summary)
        })
        .collect();

    let picked = MultiSelect::new()
        .with_prompt("What do you want to install? (space to toggle, enter to confirm)")
        .items(&labels)
        .interact()?;

    Ok(picked
        .into_iter()
        .map(|i| catalog.groups[i].id.clone())
        .collect())
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Final summary: every mutation of every selected group, with detail.
fn print_report(catalog: &Catalog, selected: &[String], report: &RunReport) {
    ui::header("Results");

    for group in &catalog.groups {
        if !selected.contains(&group.id) {
            continue;
        }
        ui::section(&group.title);
        for result in report.for_group(&group.id) {
            match &result.status {
                MutationStatus::Success => {
                    println!(
                        "  {} {}  {}",
                        "✓".green(),
                        result.id,
                        result.detail.as_str().dimmed()
                    );
                }
                MutationStatus::Skipped { reason } => {
                    println!(
                        "  {} {}  {}",
                        "↷".yellow(),
                        result.id,
                        format!("skipped: {reason}").dimmed()
                    );
                }
                MutationStatus::Failed { error } => {
                    println!("  {} {}  {}", "✗".red(), result.id, error.as_str().red());
                }
            }
        }
    }

    println!();
    println!(
        "  {} succeeded, {} skipped, {} failed",
        report.succeeded().to_string().green(),
        report.skipped().to_string().yellow(),
        report.failed().to_string().red(),
    );
}
