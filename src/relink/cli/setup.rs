use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use relink::error::{RelinkError, Result};
use relink::version::VersionKind;
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "relink", bin_name = "relink", version = get_version())]
#[command(
    about = "Relink file paths in compositing scripts, with history and restorable snapshots",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// More output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// History database file (default: $RELINK_HOME/relink.db)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Config file (default: $RELINK_HOME/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory to redirect from, overriding the config file
    #[arg(long, global = true, value_name = "DIR")]
    pub old_dir: Option<String>,

    /// Directory to redirect to, overriding the config file
    #[arg(long, global = true, value_name = "DIR")]
    pub new_dir: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum VersionTypeArg {
    Timestamp,
    UserInput,
    AutoIncrement,
}

impl VersionTypeArg {
    /// Pair the strategy with the label given on the command line. Only
    /// user-input takes a label, and it requires one.
    pub fn into_kind(self, label: Option<String>) -> Result<VersionKind> {
        match (self, label) {
            (VersionTypeArg::UserInput, Some(label)) => Ok(VersionKind::UserInput(label)),
            (VersionTypeArg::UserInput, None) => Err(RelinkError::Api(
                "A label is required with --version-type user-input".to_string(),
            )),
            (other, Some(label)) => Err(RelinkError::Api(format!(
                "Label {} cannot be used with --version-type {}",
                label,
                other.flag_value()
            ))),
            (VersionTypeArg::Timestamp, None) => Ok(VersionKind::Timestamp),
            (VersionTypeArg::AutoIncrement, None) => Ok(VersionKind::AutoIncrement),
        }
    }

    fn flag_value(self) -> &'static str {
        match self {
            VersionTypeArg::Timestamp => "timestamp",
            VersionTypeArg::UserInput => "user-input",
            VersionTypeArg::AutoIncrement => "auto-increment",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List nodes that carry a file path
    #[command(alias = "ls", display_order = 1)]
    Nodes {
        /// Script to read
        script: PathBuf,

        /// Only nodes whose path matches this pattern
        #[arg(short = 'm', long = "match", value_name = "PATTERN")]
        pattern: Option<String>,

        /// Treat the pattern as a regular expression
        #[arg(long)]
        regex: bool,

        /// Only selected nodes
        #[arg(long)]
        selected: bool,
    },

    /// Show what a relink or redirect would change, without writing
    #[command(display_order = 2)]
    Preview {
        script: PathBuf,

        /// Path pattern to replace (omit to preview the configured redirect)
        #[arg(long, requires = "new")]
        old: Option<String>,

        /// Replacement root
        #[arg(long, requires = "old")]
        new: Option<String>,

        #[arg(long)]
        regex: bool,

        /// Only selected nodes (configured redirect only)
        #[arg(long)]
        selected: bool,
    },

    /// Replace a path pattern on every matching node
    #[command(display_order = 3)]
    Relink {
        script: PathBuf,

        /// Path pattern to replace
        #[arg(long)]
        old: String,

        /// Replacement root; `$1` refers to a capture group with --regex
        #[arg(long)]
        new: String,

        /// Treat --old as a regular expression
        #[arg(long)]
        regex: bool,

        /// Print the changes without writing or recording anything
        #[arg(long)]
        dry_run: bool,

        /// Write the result here instead of over the script
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Point nodes at the configured new directory
    #[command(display_order = 4)]
    Redirect {
        script: PathBuf,

        /// Only selected nodes
        #[arg(long)]
        selected: bool,

        /// Write the result here instead of over the script
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Save the current node paths as a named state
    #[command(display_order = 10)]
    Save {
        script: PathBuf,

        /// Version label (implies --version-type user-input)
        label: Option<String>,

        /// How to name the state
        #[arg(long, value_enum)]
        version_type: Option<VersionTypeArg>,

        /// Node to include (repeatable; default: all path nodes)
        #[arg(long = "node", value_name = "NAME")]
        nodes: Vec<String>,

        /// Only selected nodes
        #[arg(long, conflicts_with = "nodes")]
        selected: bool,

        /// Replace an existing state with the same label
        #[arg(long)]
        force: bool,
    },

    /// Write the paths of a saved state back to the script
    #[command(display_order = 11)]
    Restore {
        script: PathBuf,

        version: String,

        /// Write the result here instead of over the script
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the paths stored in a saved state
    #[command(display_order = 12)]
    Show { version: String },

    /// List saved states
    #[command(display_order = 13)]
    States,

    /// List past relinks
    #[command(display_order = 20)]
    History,

    /// Show the effective configuration
    #[command(display_order = 30)]
    Config {
        /// Store --old-dir/--new-dir in the config file
        #[arg(long)]
        save: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).unwrap()
    }

    #[test]
    fn parses_relink() {
        let cli = parse(&[
            "relink", "-vv", "relink", "a.nk", "--old", "/old", "--new", "/new", "--regex",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Relink {
                old, new, regex, dry_run, output, ..
            } => {
                assert_eq!(old, "/old");
                assert_eq!(new, "/new");
                assert!(regex);
                assert!(!dry_run);
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn relink_requires_both_paths() {
        assert!(Cli::try_parse_from(["relink", "relink", "a.nk", "--old", "/old"]).is_err());
    }

    #[test]
    fn parses_save_with_nodes() {
        let cli = parse(&[
            "relink",
            "save",
            "a.nk",
            "--version-type",
            "auto-increment",
            "--node",
            "Read1",
            "--node",
            "Group1.Read2",
        ]);
        match cli.command {
            Commands::Save {
                label,
                version_type,
                nodes,
                ..
            } => {
                assert!(label.is_none());
                assert_eq!(version_type, Some(VersionTypeArg::AutoIncrement));
                assert_eq!(nodes, vec!["Read1", "Group1.Read2"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_overrides_after_subcommand() {
        let cli = parse(&["relink", "states", "--db", "/tmp/x.db", "--new-dir", "/n"]);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(cli.new_dir.as_deref(), Some("/n"));
    }

    #[test]
    fn user_input_needs_label() {
        let err = VersionTypeArg::UserInput.into_kind(None).unwrap_err();
        assert!(err.to_string().contains("A label is required"));
        assert_eq!(
            VersionTypeArg::UserInput.into_kind(Some("v1".into())).unwrap(),
            VersionKind::UserInput("v1".into())
        );
    }

    #[test]
    fn generated_kinds_reject_label() {
        let err = VersionTypeArg::AutoIncrement
            .into_kind(Some("LABEL".into()))
            .unwrap_err();
        assert!(matches!(err, RelinkError::Api(_)));
        assert!(err.to_string().contains("--version-type auto-increment"));
        assert!(VersionTypeArg::Timestamp.into_kind(Some("v1".into())).is_err());

        assert_eq!(
            VersionTypeArg::Timestamp.into_kind(None).unwrap(),
            VersionKind::Timestamp
        );
        assert_eq!(
            VersionTypeArg::AutoIncrement.into_kind(None).unwrap(),
            VersionKind::AutoIncrement
        );
    }
}
