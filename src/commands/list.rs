//! List catalog groups and their mutations.

use crate::Context;
use crate::config::Config;
use crate::{catalog, paths, ui};
use anyhow::Result;
use colored::Colorize;

pub fn run(_ctx: &Context) -> Result<()> {
    let home = paths::real_home()?;
    let config = Config::load(&home)?;
    let catalog = catalog::build(&home, &config.cache_root(&home));

    ui::header("Available groups");

    for group in &catalog.groups {
        let tag = if group.system {
            " [SYSTEM]".yellow().to_string()
        } else {
            String::new()
        };
        println!("  {}{}  {}", group.id.as_str().bold(), tag, group.title);
        ui::dim(&format!("  {}", group.summary));
        for mutation in &group.mutations {
            println!("      {} {}", "·".dimmed(), mutation.id.as_str().dimmed());
        }
    }

    println!();
    ui::dim("Apply with: nyarchup install --group <ID> (or --all)");
    Ok(())
}
