// SPDX-License-Identifier: MIT
//
// Command line: `n-mark [path]` plus a few informational flags.

use std::path::PathBuf;

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the editor, on a file if one was named.
    Run(Option<PathBuf>),
    Version,
    VersionShort,
    Help,
    UnknownFlag(String),
}

/// Parse arguments, program name excluded.
///
/// The first informational or unknown flag wins. Later plain arguments are
/// ignored once a path has been seen.
pub fn parse<I>(args: I) -> Command
where
    I: IntoIterator<Item = String>,
{
    let mut path = None;
    for arg in args {
        match arg.as_str() {
            "-v" | "--version" => return Command::Version,
            "--version-short" => return Command::VersionShort,
            "-h" | "--help" => return Command::Help,
            flag if flag.starts_with('-') && flag != "-" => {
                return Command::UnknownFlag(arg);
            }
            _ => {
                if path.is_none() {
                    path = Some(PathBuf::from(arg));
                }
            }
        }
    }
    Command::Run(path)
}

/// `n-mark 0.1.0 (linux x86_64)`
#[must_use]
pub fn version() -> String {
    format!(
        "{} {} ({} {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
    )
}

#[must_use]
pub fn version_short() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

#[must_use]
pub fn help() -> String {
    format!(
        "\
{name} {version}
{description}

USAGE:
    {name} [FILE]

OPTIONS:
    -h, --help           Print this help
    -v, --version        Print version and platform
        --version-short  Print the bare version

KEYS (normal mode):
    h j k l, arrows      Move
    w b e                Word motions
    0 $ gg G             Line start, line end, first line, last line
    i a A o O            Enter insert mode
    x dd                 Delete char, delete line

KEYS (insert mode):
    Esc                  Back to normal mode
    Ctrl+V, Ctrl+P       Paste from the system clipboard

KEYS (anywhere):
    Tab, Shift+Tab       Switch between editor and preview
    Ctrl+S               Save
    Ctrl+Q, Ctrl+C       Quit without saving

KEYS (preview):
    j k, arrows          Scroll
    g G                  Top, bottom

CONFIG:
    $XDG_CONFIG_HOME/n-mark/config.toml, or the file named by N_MARK_CONFIG
",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        description = env!("CARGO_PKG_DESCRIPTION"),
    )
}
