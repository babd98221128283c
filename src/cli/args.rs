//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Rolling hire passwords: per-service linear recurrence with undo, restore and history
#[derive(Parser, Debug)]
#[command(name = "hirepass")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directory holding the state files (default: ~/.hirepass)
    #[arg(short = 'd', long, global = true, env = "HIREPASS_DATA_DIR", value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the active service and its current password
    Show,

    /// Generate the next password for the active service
    #[command(visible_alias = "next")]
    Generate,

    /// Revert the last generation
    Undo,

    /// List recent history of the active service
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// Rewind to a history entry (newer entries are discarded)
    Restore {
        /// Index of the entry
        index: u64,
        /// Password of the entry
        #[arg(allow_negative_numbers = true)]
        password: i64,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Force index and password of the active service
    Set {
        /// New index
        index: u64,
        /// New password
        #[arg(allow_negative_numbers = true)]
        password: i64,
    },

    /// Clear history of the active service
    ResetHistory {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage services
    Service {
        #[command(subcommand)]
        command: ServiceCommands,
    },

    /// Google Form and info sheet integration
    Integration {
        #[command(subcommand)]
        command: IntegrationCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ServiceCommands {
    /// List services (active one marked)
    List,

    /// Show a service (default: active)
    Show {
        /// Service id or name
        service: Option<String>,
    },

    /// Create a service and make it active
    Add {
        /// Display name
        name: String,
        /// Initial password
        #[arg(long, allow_negative_numbers = true)]
        seed: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        multiplier: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        addend: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        modulus: Option<i64>,
    },

    /// Make a service active
    Select {
        /// Service id or name
        service: String,
    },

    /// Delete a service (the last one cannot be deleted)
    Delete {
        /// Service id or name
        service: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Change service settings
    Update {
        /// Service id or name
        service: String,
        #[arg(long)]
        name: Option<String>,
        /// Current password
        #[arg(long, allow_negative_numbers = true)]
        password: Option<i64>,
        /// Current index
        #[arg(long)]
        index: Option<u64>,
        #[arg(long, allow_negative_numbers = true)]
        multiplier: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        addend: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        modulus: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum IntegrationCommands {
    /// Show integration settings
    Show,

    /// Show the submission log
    Log,

    /// Set the form action URL (…/formResponse)
    FormUrl {
        #[arg(value_hint = ValueHint::Url)]
        url: String,
    },

    /// Configure the form from a pre-filled link
    FormLink {
        #[arg(value_hint = ValueHint::Url)]
        link: String,
    },

    /// Map a record field to a form entry id
    Map {
        /// hire-type, price, description, date-of-hire, time-of-hire, number-of-days, phone
        field: String,
        /// Form parameter, e.g. entry.123456
        entry: String,
    },

    /// Set the info sheet URL
    SheetUrl {
        #[arg(value_hint = ValueHint::Url)]
        url: String,
    },

    /// Show the info sheet links
    Sheet,

    /// Submit a hire record to the Google Form
    Submit {
        #[arg(long)]
        hire_type: String,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Date of hire
        #[arg(long)]
        date: Option<String>,
        /// Time of hire
        #[arg(long)]
        time: Option<String>,
        /// Number of days
        #[arg(long)]
        days: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file location
    Path,
    /// Print a config template
    Template,
}
