use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// How command results are printed.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        self == OutputFormat::Json
    }
}

/// Command-line interface for the `skillbridge` application.
#[derive(Debug, Parser)]
#[command(
    name = "skillbridge",
    version,
    about = "Compare and sync skill directories and MCP server settings"
)]
pub struct Cli {
    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: Commands,
}

/// Available `skillbridge` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compares, imports and removes skills in a target directory.
    #[command(subcommand)]
    Skills(SkillsCommand),
    /// Compares, imports and removes MCP servers in a target settings file.
    #[command(subcommand)]
    Mcp(McpCommand),
    /// Downloads skills from a GitHub tree URL into a target directory.
    Install {
        /// `https://github.com/<owner>/<repo>/tree/<branch>/<path>`.
        url: String,
        /// Directory that receives `<owner>/<skill>`.
        #[arg(long, value_name = "DIR")]
        target: PathBuf,
        /// Only print where the skill would be installed.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Shows or changes the configured source locations.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Lists recently used targets.
    History {
        #[command(subcommand)]
        action: Option<HistoryCommand>,
        /// Drops entries whose path no longer exists before listing.
        #[arg(long, default_value_t = false)]
        clear_missing: bool,
    },
}

/// Source and target of a skill comparison.
#[derive(Debug, Clone, Args)]
pub struct SkillPaths {
    /// Flat target directory holding one subdirectory per skill.
    #[arg(long, value_name = "DIR")]
    pub target: PathBuf,
    /// Source skills root (defaults to the configured `skills_dir`).
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,
}

/// Source and target of an MCP comparison.
#[derive(Debug, Clone, Args)]
pub struct McpPaths {
    /// Target settings file.
    #[arg(long, value_name = "FILE")]
    pub target: PathBuf,
    /// Source settings file (defaults to the configured `mcp_settings_file`).
    #[arg(long, value_name = "FILE")]
    pub source: Option<PathBuf>,
}

/// Which rows an import applies to.
#[derive(Debug, Clone, Default, Args)]
pub struct Selection {
    /// Imports every row that is new in the target.
    #[arg(long, default_value_t = false)]
    pub all_new: bool,
    /// Imports every row.
    #[arg(long, default_value_t = false, conflicts_with = "all_new")]
    pub all: bool,
}

#[derive(Debug, Subcommand)]
pub enum SkillsCommand {
    /// Shows each source skill as new, identical or divergent.
    Status {
        #[command(flatten)]
        paths: SkillPaths,
    },
    /// Copies skills into the target, replacing existing copies.
    Import {
        #[command(flatten)]
        paths: SkillPaths,
        /// Skill names or relative paths.
        names: Vec<String>,
        #[command(flatten)]
        selection: Selection,
    },
    /// Removes skill directories from the target.
    Delete {
        /// Target directory.
        #[arg(long, value_name = "DIR")]
        target: PathBuf,
        /// Skill directory names.
        #[arg(required = true)]
        names: Vec<String>,
        /// Skips the confirmation prompt.
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
    /// Lists differing files of one skill, or diffs a single file.
    Diff {
        #[command(flatten)]
        paths: SkillPaths,
        /// Skill name or relative path.
        name: String,
        /// Relative file path to show as a unified diff.
        #[arg(long, value_name = "REL")]
        file: Option<String>,
    },
    /// Prints the description from a skill's `SKILL.md`.
    Describe {
        /// Skill name or relative path.
        name: String,
        /// Source skills root (defaults to the configured `skills_dir`).
        #[arg(long, value_name = "DIR")]
        source: Option<PathBuf>,
        /// Reads the skill from this target directory instead.
        #[arg(long, value_name = "DIR", conflicts_with = "source")]
        target: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum McpCommand {
    /// Shows each source server as new, identical or divergent.
    Status {
        #[command(flatten)]
        paths: McpPaths,
    },
    /// Copies server entries into the target file.
    Import {
        #[command(flatten)]
        paths: McpPaths,
        /// Server keys.
        keys: Vec<String>,
        #[command(flatten)]
        selection: Selection,
    },
    /// Removes server entries from the target file.
    Delete {
        /// Target settings file.
        #[arg(long, value_name = "FILE")]
        target: PathBuf,
        /// Server keys.
        #[arg(required = true)]
        keys: Vec<String>,
        /// Skips the confirmation prompt.
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
    /// Diffs one server entry between source and target.
    Diff {
        #[command(flatten)]
        paths: McpPaths,
        /// Server key.
        key: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Prints the effective configuration.
    Show,
    /// Updates the stored configuration.
    Set {
        /// New source skills root.
        #[arg(long, value_name = "DIR")]
        skills_dir: Option<PathBuf>,
        /// New source MCP settings file.
        #[arg(long, value_name = "FILE")]
        mcp_file: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// Forgets a path in both lists.
    Remove {
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_skills_import_with_selection() {
        let cli = Cli::try_parse_from([
            "skillbridge",
            "--format",
            "json",
            "skills",
            "import",
            "--target",
            "/t",
            "--all-new",
        ])
        .unwrap();
        assert!(cli.format.is_json());
        match cli.command {
            Commands::Skills(SkillsCommand::Import {
                paths,
                names,
                selection,
            }) => {
                assert_eq!(paths.target, PathBuf::from("/t"));
                assert!(paths.source.is_none());
                assert!(names.is_empty());
                assert!(selection.all_new);
                assert!(!selection.all);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn all_and_all_new_conflict() {
        let err = Cli::try_parse_from([
            "skillbridge",
            "mcp",
            "import",
            "--target",
            "/t.json",
            "--all",
            "--all-new",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn delete_requires_names() {
        assert!(Cli::try_parse_from(["skillbridge", "skills", "delete", "--target", "/t"]).is_err());
    }

    #[test]
    fn history_defaults_to_listing() {
        let cli = Cli::try_parse_from(["skillbridge", "history"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::History {
                action: None,
                clear_missing: false
            }
        ));
    }
}
