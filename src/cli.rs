use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "nyarchup")]
#[command(version)]
#[command(about = "Nyarch desktop customization installer", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Download the latest asset bundle and apply selected groups
    Install(InstallArgs),

    /// List available groups and their mutations
    List,

    /// Download and cache the latest asset bundle without applying anything
    Fetch,

    /// Check the environment without making changes
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct InstallArgs {
    /// Group to apply (repeatable); without this an interactive menu is shown
    #[arg(long = "group", value_name = "ID")]
    pub groups: Vec<String>,

    /// Apply every group in the catalog
    #[arg(long, conflicts_with = "groups")]
    pub all: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_install_groups_repeatable() {
        let cli = Cli::try_parse_from([
            "nyarchup",
            "install",
            "--group",
            "user-bundle",
            "--group",
            "kitty",
            "-y",
        ])
        .unwrap();

        match cli.command {
            Command::Install(args) => {
                assert_eq!(args.groups, vec!["user-bundle", "kitty"]);
                assert!(args.yes);
                assert!(!args.all);
            }
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn test_all_conflicts_with_group() {
        let result = Cli::try_parse_from([
            "nyarchup",
            "install",
            "--all",
            "--group",
            "kitty",
        ]);
        assert!(result.is_err());
    }
}
