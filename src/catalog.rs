//! The static mutation catalog.
//!
//! Target paths under the home directory and `/usr/local/bin` are part
//! of the external contract; changing them means versioning the catalog.

use applykit::{Catalog, Group, Mutation, Precheck, Source};
use std::path::Path;

/// Root of the user-facing skeleton inside the extracted bundle.
const SKEL: &str = "Gnome/etc/skel";

/// Upstream repository for the KDE Material You Colors plasmoid.
const PLASMOID_REPO: &str = "https://github.com/luisbocanegra/kde-material-you-colors.git";
const PLASMOID_ID: &str = "luisbocanegra.kde-material-you-colors";

/// Build the full catalog against a concrete home directory and cache
/// root. Declared in menu order; mutation order within a group is
/// execution order.
pub fn build(home: &Path, cache_root: &Path) -> Catalog {
    let skel = |rel: &str| Source::Cache(format!("{}/{}", SKEL, rel));
    let plasmoid_clone = cache_root.join("kde-material-you-colors");
    let plasmoid_clone_str = plasmoid_clone.display().to_string();
    let plasmoid_package_str = plasmoid_clone.join("src/plasmoid/package").display().to_string();
    let plasmoid_installed = home
        .join(".local/share/plasma/plasmoids")
        .join(PLASMOID_ID);

    Catalog::new(vec![
        Group::new(
            "user-bundle",
            "Full user theming",
            "Wallpapers, icons, GTK themes, Pywal hook, Flatpak GTK overrides",
            vec![
                Mutation::copy_tree(
                    "wallpapers",
                    skel(".local/share/backgrounds"),
                    home.join(".local/share/wallpapers/nyarch"),
                ),
                Mutation::copy_tree(
                    "icon-theme",
                    skel(".local/share/icons/Tela-circle-MaterialYou"),
                    home.join(".local/share/icons/Tela-circle-MaterialYou"),
                ),
                Mutation::copy_tree(
                    "gtk-themes",
                    skel(".local/share/themes"),
                    home.join(".local/share/themes"),
                ),
                Mutation::copy_tree("gtk3-config", skel(".config/gtk-3.0"), home.join(".config/gtk-3.0")),
                Mutation::copy_tree("gtk4-config", skel(".config/gtk-4.0"), home.join(".config/gtk-4.0")),
                Mutation::append_snippet(
                    "pywal-hook",
                    home.join(".bashrc"),
                    "# nyarchup: pywal color sequences",
                    "if [ -f \"$HOME/.cache/wal/sequences\" ]; then\n    cat \"$HOME/.cache/wal/sequences\"\nfi",
                ),
                Mutation::run_installer(
                    "flatpak-gtk3-override",
                    "flatpak",
                    ["override", "--filesystem=xdg-config/gtk-3.0"],
                ),
                Mutation::run_installer(
                    "flatpak-gtk4-override",
                    "flatpak",
                    ["override", "--filesystem=xdg-config/gtk-4.0"],
                ),
            ],
        ),
        Group::new(
            "fetch-tools",
            "Nekofetch and Nyaofetch",
            "Install the fetch tools system-wide and apply the fastfetch theme",
            vec![
                Mutation::write_file(
                    "nekofetch",
                    Source::Cache("Gnome/usr/local/bin/nekofetch".into()),
                    "/usr/local/bin/nekofetch",
                )
                .executable(),
                Mutation::write_file(
                    "nyaofetch",
                    Source::Cache("Gnome/usr/local/bin/nyaofetch".into()),
                    "/usr/local/bin/nyaofetch",
                )
                .executable(),
                // User edits accumulate here, so keep every generation.
                Mutation::copy_tree(
                    "fastfetch-config",
                    skel(".config/fastfetch"),
                    home.join(".config/fastfetch"),
                )
                .archive_backup(),
            ],
        )
        .system(),
        Group::new(
            "kitty",
            "Kitty terminal theme",
            "Apply the themed kitty.conf",
            vec![Mutation::write_file(
                "kitty-conf",
                skel(".config/kitty/kitty.conf"),
                home.join(".config/kitty/kitty.conf"),
            )],
        ),
        Group::new(
            "path-setup",
            "PATH setup for ~/.local/bin",
            "Make pipx-installed tools reachable from login shells",
            vec![Mutation::append_snippet(
                "local-bin-path",
                home.join(".profile"),
                "# nyarchup: ensure ~/.local/bin is on PATH",
                "export PATH=\"$HOME/.local/bin:$PATH\"",
            )],
        ),
        Group::new(
            "color-backend",
            "Material You color backend",
            "pipx backend plus the Plasma widget",
            vec![
                Mutation::run_installer("backend-apt-update", "apt-get", ["update", "-qq"]),
                Mutation::run_installer(
                    "backend-apt-deps",
                    "apt-get",
                    ["install", "-y", "git", "pipx", "kpackagetool6"],
                ),
                Mutation::run_installer(
                    "backend-pipx-install",
                    "pipx",
                    ["install", "kde-material-you-colors"],
                ),
                Mutation::run_installer("backend-pipx-path", "pipx", ["ensurepath"]),
                Mutation::run_installer(
                    "plasmoid-clone",
                    "git",
                    ["clone", "--depth", "1", PLASMOID_REPO, plasmoid_clone_str.as_str()],
                )
                .precheck(Precheck::PathExists(plasmoid_clone.clone())),
                Mutation::run_installer(
                    "plasmoid-install",
                    "kpackagetool6",
                    [
                        "--type",
                        "Plasma/Applet",
                        "--install",
                        plasmoid_package_str.as_str(),
                    ],
                )
                .precheck(Precheck::PathExists(plasmoid_installed)),
            ],
        )
        .system(),
        Group::new(
            "suggested-apps",
            "Suggested applications",
            "Flathub remote plus the suggested Flatpak set",
            vec![
                Mutation::run_installer(
                    "flathub-remote",
                    "flatpak",
                    [
                        "remote-add",
                        "--if-not-exists",
                        "flathub",
                        "https://flathub.org/repo/flathub.flatpakrepo",
                    ],
                ),
                Mutation::run_installer(
                    "suggested-flatpaks",
                    "flatpak",
                    [
                        "install",
                        "-y",
                        "flathub",
                        "org.gtk.Gtk3theme.adw-gtk3",
                        "org.gtk.Gtk3theme.adw-gtk3-dark",
                        "info.febvre.Komikku",
                        "com.github.tchx84.Flatseal",
                        "de.haeckerfelix.Shortwave",
                        "org.gnome.Lollypop",
                        "de.haeckerfelix.Fragments",
                        "com.mattjakeman.ExtensionManager",
                        "it.mijorus.gearlever",
                    ],
                ),
            ],
        )
        .system(),
    ])
}
