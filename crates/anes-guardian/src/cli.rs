use clap::{Parser, Subcommand};
use input_sanitizer::SanitizeMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "anes-guardian",
    version,
    about = "Request-boundary input guard for AnesGuardian"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "anes-guardian.yaml", global = true)]
    pub config: PathBuf,

    /// Maximum payload nesting depth (overrides config file setting)
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// What to do with payloads carrying injection patterns (overrides config
    /// file setting)
    #[arg(long, value_enum, global = true)]
    pub mode: Option<ModeArg>,

    /// Audit log path (overrides config file setting)
    #[arg(long, global = true)]
    pub audit_log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Depth-check and sanitize a JSON payload, printing the cleaned JSON
    Sanitize {
        /// JSON file to read (stdin when omitted)
        file: Option<PathBuf>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Filter rich-text HTML through the tag allow-list
    Html {
        /// HTML file to read (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Strip SQL comments and chained destructive statements
    Sql { text: String },
    /// Print the storable form of a filename
    Filename { name: String },
    /// Check an upload's type and size and print its storable filename
    Upload {
        #[arg(long)]
        name: String,
        #[arg(long)]
        mime: String,
        #[arg(long)]
        size: u64,
    },
    /// Check an email address format
    Email { address: String },
    /// Check a mainland-China mobile number
    Phone { number: String },
    /// Report a JSON payload's nesting depth against the limit
    Depth {
        /// JSON file to read (stdin when omitted)
        file: Option<PathBuf>,
    },
}

impl Command {
    /// Whether the command records outcomes in the audit log.  Pure
    /// transforms and format checks never touch it.
    pub fn writes_audit(&self) -> bool {
        matches!(self, Command::Sanitize { .. } | Command::Upload { .. })
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    Strip,
    Reject,
}

impl From<ModeArg> for SanitizeMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Strip => SanitizeMode::Strip,
            ModeArg::Reject => SanitizeMode::Reject,
        }
    }
}
