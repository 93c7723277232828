//! Sequential execution of selected mutation groups.
//!
//! Groups run in catalog order, mutations strictly in declared order. A
//! mutation failure aborts the remainder of its own group (later steps
//! may assume earlier ones succeeded) but never other groups; failures
//! are collected into the report instead of terminating the run.

use crate::backup::BackupManager;
use crate::catalog::{Catalog, Group};
use crate::error::{Error, Result};
use crate::fs_util::copy_tree;
use crate::runner::ToolRunner;
use crate::types::{
    Mutation, MutationKind, MutationResult, MutationStatus, Precheck, RunReport, Source,
};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Everything a mutation needs at apply time.
pub struct Context<'a> {
    /// Extracted bundle directory (the cache entry for the resolved tag).
    pub bundle_dir: &'a Path,
    /// Directory where installer assets are staged before invocation.
    pub staging_dir: &'a Path,
    /// External tool runner.
    pub runner: &'a dyn ToolRunner,
}

enum Outcome {
    Done(String),
    AlreadyApplied(String),
}

/// Executes selected catalog groups against the filesystem.
pub struct Pipeline;

impl Pipeline {
    /// Run every selected group, in catalog order, and collect the
    /// per-mutation outcomes.
    ///
    /// Unknown ids in `selected` are ignored; callers are expected to
    /// validate selections against the catalog up front.
    pub fn run(catalog: &Catalog, selected: &[String], ctx: &Context<'_>) -> RunReport {
        let mut report = RunReport::default();

        for group in &catalog.groups {
            if !selected.iter().any(|id| id == &group.id) {
                continue;
            }
            Self::run_group(group, ctx, &mut report);
        }

        report
    }

    fn run_group(group: &Group, ctx: &Context<'_>, report: &mut RunReport) {
        log::info!("applying group {}", group.id);
        let mut group_failed = false;

        for mutation in &group.mutations {
            if group_failed {
                report.push(MutationResult {
                    group: group.id.clone(),
                    id: mutation.id.clone(),
                    status: MutationStatus::Skipped {
                        reason: "earlier step in group failed".to_string(),
                    },
                    detail: String::new(),
                });
                continue;
            }

            if precheck_satisfied(&mutation.precheck) {
                log::debug!("{} already applied, skipping", mutation.id);
                report.push(MutationResult {
                    group: group.id.clone(),
                    id: mutation.id.clone(),
                    status: MutationStatus::Skipped {
                        reason: "already applied".to_string(),
                    },
                    detail: String::new(),
                });
                continue;
            }

            match apply(mutation, ctx) {
                Ok(Outcome::Done(detail)) => {
                    log::info!("{}: {}", mutation.id, detail);
                    report.push(MutationResult {
                        group: group.id.clone(),
                        id: mutation.id.clone(),
                        status: MutationStatus::Success,
                        detail,
                    });
                }
                Ok(Outcome::AlreadyApplied(reason)) => {
                    log::debug!("{}: {}", mutation.id, reason);
                    report.push(MutationResult {
                        group: group.id.clone(),
                        id: mutation.id.clone(),
                        status: MutationStatus::Skipped { reason },
                        detail: String::new(),
                    });
                }
                Err(e) => {
                    log::warn!("{} failed: {}", mutation.id, e);
                    group_failed = true;
                    report.push(MutationResult {
                        group: group.id.clone(),
                        id: mutation.id.clone(),
                        status: MutationStatus::Failed {
                            error: e.to_string(),
                        },
                        detail: String::new(),
                    });
                }
            }
        }
    }
}

fn precheck_satisfied(precheck: &Precheck) -> bool {
    match precheck {
        Precheck::None => false,
        Precheck::PathExists(path) => path.exists(),
        Precheck::MarkerPresent { file, marker } => fs::read_to_string(file)
            .map(|content| content.contains(marker))
            .unwrap_or(false),
    }
}

fn apply(mutation: &Mutation, ctx: &Context<'_>) -> Result<Outcome> {
    match &mutation.kind {
        MutationKind::CopyTree {
            source,
            target,
            backup,
        } => {
            let src = resolve_dir(source, ctx.bundle_dir)?;
            BackupManager::backup(target, *backup)?;
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            let copied = copy_tree(&src, target)?;
            Ok(Outcome::Done(format!(
                "copied {} files to {}",
                copied,
                target.display()
            )))
        }

        MutationKind::WriteFile {
            source,
            target,
            executable,
        } => {
            let bytes = resolve_bytes(source, ctx.bundle_dir)?;
            BackupManager::backup(target, crate::types::BackupStyle::Rename)?;
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            fs::write(target, &bytes).map_err(|e| Error::io(target, e))?;

            #[cfg(unix)]
            if *executable {
                use std::os::unix::fs::PermissionsExt;
                let mut perms = fs::metadata(target)
                    .map_err(|e| Error::io(target, e))?
                    .permissions();
                perms.set_mode(0o755);
                fs::set_permissions(target, perms).map_err(|e| Error::io(target, e))?;
            }
            #[cfg(not(unix))]
            let _ = executable;

            Ok(Outcome::Done(format!("wrote {}", target.display())))
        }

        MutationKind::AppendSnippet {
            target,
            marker,
            body,
        } => {
            let existing = fs::read_to_string(target).unwrap_or_default();
            if existing.contains(marker.as_str()) {
                return Ok(Outcome::AlreadyApplied("snippet already present".to_string()));
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(target)
                .map_err(|e| Error::io(target, e))?;

            let mut snippet = String::new();
            if !existing.is_empty() && !existing.ends_with('\n') {
                snippet.push('\n');
            }
            snippet.push_str(marker.trim_end());
            snippet.push('\n');
            snippet.push_str(body.trim_end());
            snippet.push('\n');

            file.write_all(snippet.as_bytes())
                .map_err(|e| Error::io(target, e))?;

            Ok(Outcome::Done(format!("appended snippet to {}", target.display())))
        }

        MutationKind::RunInstaller {
            program,
            args,
            stage,
        } => {
            let args = match stage {
                Some(staged) => {
                    let bytes = resolve_bytes(&staged.source, ctx.bundle_dir)?;
                    let staged_path = ctx.staging_dir.join(&staged.file_name);
                    fs::create_dir_all(ctx.staging_dir)
                        .map_err(|e| Error::io(ctx.staging_dir, e))?;
                    fs::write(&staged_path, &bytes).map_err(|e| Error::io(&staged_path, e))?;

                    let staged_str = staged_path.to_string_lossy().into_owned();
                    args.iter()
                        .map(|a| a.replace("{asset}", &staged_str))
                        .collect::<Vec<_>>()
                }
                None => args.clone(),
            };

            let output = ctx.runner.run(program, &args)?;
            if !output.success {
                let detail = match output.code {
                    Some(code) => format!("exited with status {}", code),
                    None => "terminated by signal".to_string(),
                };
                return Err(Error::tool(program, detail));
            }

            Ok(Outcome::Done(format!("{} {}", program, args.join(" "))))
        }
    }
}

fn resolve_dir(source: &Source, bundle_dir: &Path) -> Result<PathBuf> {
    match source {
        Source::Cache(rel) => {
            let path = bundle_dir.join(rel);
            if path.is_dir() {
                Ok(path)
            } else {
                Err(Error::MissingAsset {
                    path: PathBuf::from(rel),
                })
            }
        }
        Source::Literal(_) => Err(Error::MissingAsset {
            path: PathBuf::from("<literal content is not a directory>"),
        }),
    }
}

fn resolve_bytes(source: &Source, bundle_dir: &Path) -> Result<Vec<u8>> {
    match source {
        Source::Cache(rel) => {
            let path = bundle_dir.join(rel);
            if !path.is_file() {
                return Err(Error::MissingAsset {
                    path: PathBuf::from(rel),
                });
            }
            fs::read(&path).map_err(|e| Error::io(&path, e))
        }
        Source::Literal(bytes) => Ok(bytes.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::backup_path;
    use crate::catalog::Group;
    use crate::runner::MockRunner;
    use crate::types::BackupStyle;
    use std::path::Path;
    use tempfile::TempDir;

    struct Fixture {
        bundle: TempDir,
        staging: TempDir,
        home: TempDir,
        runner: MockRunner,
    }

    impl Fixture {
        fn new() -> Self {
            let bundle = tempfile::tempdir().unwrap();
            fs::create_dir_all(bundle.path().join("skel/backgrounds")).unwrap();
            fs::write(bundle.path().join("skel/backgrounds/cat.png"), b"png").unwrap();
            fs::create_dir_all(bundle.path().join("skel/kitty")).unwrap();
            fs::write(bundle.path().join("skel/kitty/kitty.conf"), "font_size 12\n").unwrap();

            Self {
                bundle,
                staging: tempfile::tempdir().unwrap(),
                home: tempfile::tempdir().unwrap(),
                runner: MockRunner::new(),
            }
        }

        fn ctx(&self) -> Context<'_> {
            Context {
                bundle_dir: self.bundle.path(),
                staging_dir: self.staging.path(),
                runner: &self.runner,
            }
        }

        fn target(&self, rel: &str) -> PathBuf {
            self.home.path().join(rel)
        }
    }

    fn selected(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn statuses<'a>(report: &'a RunReport, group: &'a str) -> Vec<&'a MutationStatus> {
        report.for_group(group).map(|r| &r.status).collect()
    }

    #[test]
    fn test_backup_before_overwrite() {
        let fx = Fixture::new();
        let wallpapers = fx.target("wallpapers/nyarch");
        fs::create_dir_all(&wallpapers).unwrap();
        fs::write(wallpapers.join("mine.png"), b"precious").unwrap();

        let catalog = Catalog::new(vec![Group::new(
            "wallpapers",
            "Wallpapers",
            "",
            vec![Mutation::copy_tree(
                "wallpapers-copy",
                Source::Cache("skel/backgrounds".into()),
                &wallpapers,
            )],
        )]);

        let report = Pipeline::run(&catalog, &selected(&["wallpapers"]), &fx.ctx());

        assert!(report.is_success());
        // Original content is recoverable at the backup path.
        let backed = backup_path(&wallpapers);
        assert_eq!(fs::read(backed.join("mine.png")).unwrap(), b"precious");
        // Target holds the new content.
        assert!(wallpapers.join("cat.png").is_file());
        assert!(!wallpapers.join("mine.png").exists());
    }

    #[test]
    fn test_group_isolation_on_failure() {
        let fx = Fixture::new();
        let mut runner = MockRunner::new();
        runner.fail_program("pipx", 1);

        let ctx = Context {
            bundle_dir: fx.bundle.path(),
            staging_dir: fx.staging.path(),
            runner: &runner,
        };

        let catalog = Catalog::new(vec![
            Group::new(
                "color-backend",
                "Color backend",
                "",
                vec![
                    Mutation::run_installer("apt-deps", "apt-get", ["install", "-y", "pipx"]),
                    Mutation::run_installer("pipx-install", "pipx", ["install", "kde-material-you-colors"]),
                    Mutation::run_installer("pipx-path", "pipx", ["ensurepath"]),
                    Mutation::write_file(
                        "backend-marker",
                        Source::literal("installed"),
                        fx.target("state/backend"),
                    ),
                    Mutation::run_installer("plasmoid", "kpackagetool6", ["--install", "pkg"]),
                ],
            ),
            Group::new(
                "kitty",
                "Kitty",
                "",
                vec![Mutation::write_file(
                    "kitty-conf",
                    Source::Cache("skel/kitty/kitty.conf".into()),
                    fx.target(".config/kitty/kitty.conf"),
                )],
            ),
        ]);

        let report = Pipeline::run(&catalog, &selected(&["color-backend", "kitty"]), &ctx);

        let backend = statuses(&report, "color-backend");
        assert_eq!(backend.len(), 5);
        assert!(matches!(backend[0], MutationStatus::Success));
        assert!(matches!(backend[1], MutationStatus::Failed { .. }));
        for status in &backend[2..] {
            assert!(matches!(status, MutationStatus::Skipped { .. }));
        }

        // Steps after the failure really did not run.
        assert!(!fx.target("state/backend").exists());
        assert!(!runner
            .invocations()
            .iter()
            .any(|(p, _)| p == "kpackagetool6"));

        // The independently-selected group still ran to completion.
        let kitty = statuses(&report, "kitty");
        assert!(matches!(kitty[0], MutationStatus::Success));
        assert_eq!(
            fs::read_to_string(fx.target(".config/kitty/kitty.conf")).unwrap(),
            "font_size 12\n"
        );

        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let fx = Fixture::new();
        let bashrc = fx.target(".bashrc");
        fs::write(&bashrc, "export EDITOR=nano\n").unwrap();

        let catalog = Catalog::new(vec![Group::new(
            "user-bundle",
            "User theming",
            "",
            vec![
                Mutation::copy_tree(
                    "wallpapers-copy",
                    Source::Cache("skel/backgrounds".into()),
                    fx.target("wallpapers/nyarch"),
                ),
                Mutation::append_snippet(
                    "pywal-hook",
                    &bashrc,
                    "# nyarchup: pywal color sequences",
                    "if [ -f \"$HOME/.cache/wal/sequences\" ]; then\n    cat \"$HOME/.cache/wal/sequences\"\nfi",
                ),
            ],
        )]);

        let first = Pipeline::run(&catalog, &selected(&["user-bundle"]), &fx.ctx());
        assert!(first.is_success());
        assert_eq!(first.succeeded(), 2);
        let after_first = fs::read_to_string(&bashrc).unwrap();

        let second = Pipeline::run(&catalog, &selected(&["user-bundle"]), &fx.ctx());
        assert!(second.is_success());
        let after_second = fs::read_to_string(&bashrc).unwrap();

        // Identical end state: the snippet is not duplicated, the copy
        // overwrote itself with the same content.
        assert_eq!(after_first, after_second);
        assert_eq!(after_first.matches("pywal color sequences").count(), 1);
        let second_append = second
            .for_group("user-bundle")
            .find(|r| r.id == "pywal-hook")
            .unwrap();
        assert!(matches!(
            second_append.status,
            MutationStatus::Skipped { .. }
        ));
    }

    #[test]
    fn test_append_creates_missing_file() {
        let fx = Fixture::new();
        let profile = fx.target(".profile");

        let catalog = Catalog::new(vec![Group::new(
            "path-setup",
            "PATH setup",
            "",
            vec![Mutation::append_snippet(
                "local-bin-path",
                &profile,
                "# nyarchup: ensure ~/.local/bin is on PATH",
                "export PATH=\"$HOME/.local/bin:$PATH\"",
            )],
        )]);

        let report = Pipeline::run(&catalog, &selected(&["path-setup"]), &fx.ctx());
        assert!(report.is_success());

        let content = fs::read_to_string(&profile).unwrap();
        assert!(content.contains("ensure ~/.local/bin is on PATH"));
        assert!(content.contains("export PATH="));
    }

    #[test]
    fn test_missing_asset_fails_mutation() {
        let fx = Fixture::new();

        let catalog = Catalog::new(vec![Group::new(
            "icons",
            "Icons",
            "",
            vec![Mutation::copy_tree(
                "icons-copy",
                Source::Cache("skel/icons/Tela-circle-MaterialYou".into()),
                fx.target("icons"),
            )],
        )]);

        let report = Pipeline::run(&catalog, &selected(&["icons"]), &fx.ctx());

        assert_eq!(report.failed(), 1);
        match &report.results[0].status {
            MutationStatus::Failed { error } => assert!(error.contains("asset missing")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_installer_receives_staged_asset_path() {
        let fx = Fixture::new();

        let catalog = Catalog::new(vec![Group::new(
            "apps",
            "Apps",
            "",
            vec![Mutation::run_installer(
                "assistant",
                "flatpak",
                ["install", "-y", "{asset}"],
            )
            .staging(Source::literal("flatpak bundle bytes"), "assistant.flatpak")],
        )]);

        let report = Pipeline::run(&catalog, &selected(&["apps"]), &fx.ctx());
        assert!(report.is_success());

        let invocations = fx.runner.invocations();
        assert_eq!(invocations.len(), 1);
        let (program, args) = &invocations[0];
        assert_eq!(program, "flatpak");
        assert_eq!(args[0], "install");
        assert_eq!(args[1], "-y");
        let staged = Path::new(&args[2]);
        assert!(staged.ends_with("assistant.flatpak"));
        assert_eq!(fs::read(staged).unwrap(), b"flatpak bundle bytes");
    }

    #[test]
    fn test_precheck_path_exists_skips() {
        let fx = Fixture::new();
        let plasmoid_dir = fx.target("plasmoids/kde-material-you-colors");
        fs::create_dir_all(&plasmoid_dir).unwrap();

        let catalog = Catalog::new(vec![Group::new(
            "color-backend",
            "Color backend",
            "",
            vec![Mutation::run_installer("plasmoid", "kpackagetool6", ["--install", "pkg"])
                .precheck(Precheck::PathExists(plasmoid_dir))],
        )]);

        let report = Pipeline::run(&catalog, &selected(&["color-backend"]), &fx.ctx());

        assert_eq!(report.skipped(), 1);
        assert!(fx.runner.invocations().is_empty());
    }

    #[test]
    fn test_unselected_group_untouched() {
        let fx = Fixture::new();

        let catalog = Catalog::new(vec![
            Group::new(
                "kitty",
                "Kitty",
                "",
                vec![Mutation::write_file(
                    "kitty-conf",
                    Source::Cache("skel/kitty/kitty.conf".into()),
                    fx.target(".config/kitty/kitty.conf"),
                )],
            ),
            Group::new(
                "apps",
                "Apps",
                "",
                vec![Mutation::run_installer("flathub", "flatpak", ["remote-add"])],
            ),
        ]);

        let report = Pipeline::run(&catalog, &selected(&["kitty"]), &fx.ctx());

        assert_eq!(report.results.len(), 1);
        assert!(fx.runner.invocations().is_empty());
        assert!(!fx.target(".config/kitty").join("missing").exists());
    }

    #[test]
    fn test_write_file_executable_mode() {
        let fx = Fixture::new();
        let target = fx.target("bin/nekofetch");

        let catalog = Catalog::new(vec![Group::new(
            "fetch-tools",
            "Fetch tools",
            "",
            vec![Mutation::write_file(
                "nekofetch",
                Source::literal("#!/bin/sh\necho nya\n"),
                &target,
            )
            .executable()],
        )]);

        let report = Pipeline::run(&catalog, &selected(&["fetch-tools"]), &fx.ctx());
        assert!(report.is_success());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&target).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_archive_backup_style_used() {
        let fx = Fixture::new();
        let fastfetch = fx.target(".config/fastfetch");
        fs::create_dir_all(&fastfetch).unwrap();
        fs::write(fastfetch.join("config.jsonc"), "{}").unwrap();

        fs::create_dir_all(fx.bundle.path().join("skel/fastfetch")).unwrap();
        fs::write(fx.bundle.path().join("skel/fastfetch/config.jsonc"), "{\"nyarch\":true}").unwrap();

        let catalog = Catalog::new(vec![Group::new(
            "fetch-tools",
            "Fetch tools",
            "",
            vec![Mutation::copy_tree(
                "fastfetch-config",
                Source::Cache("skel/fastfetch".into()),
                &fastfetch,
            )
            .archive_backup()],
        )]);

        let report = Pipeline::run(&catalog, &selected(&["fetch-tools"]), &fx.ctx());
        assert!(report.is_success());

        // Old config archived, new config in place.
        let backups: Vec<_> = fs::read_dir(backup_path(&fastfetch))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(backups.len(), 1);
        assert!(backups[0].starts_with("fastfetch-") && backups[0].ends_with(".tar.gz"));
        assert_eq!(
            fs::read_to_string(fastfetch.join("config.jsonc")).unwrap(),
            "{\"nyarch\":true}"
        );
    }

    #[test]
    fn test_mutation_order_within_group() {
        let fx = Fixture::new();
        let catalog = Catalog::new(vec![Group::new(
            "ordered",
            "Ordered",
            "",
            vec![
                Mutation::run_installer("first", "apt-get", ["update"]),
                Mutation::run_installer("second", "apt-get", ["install", "-y", "kitty"]),
            ],
        )]);

        Pipeline::run(&catalog, &selected(&["ordered"]), &fx.ctx());

        let invocations = fx.runner.invocations();
        assert_eq!(invocations[0].1, vec!["update"]);
        assert_eq!(invocations[1].1, vec!["install", "-y", "kitty"]);
    }
}
