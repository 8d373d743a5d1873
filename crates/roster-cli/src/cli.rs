use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use roster_core::VERSION;

use crate::config::SaltMode;

/// Roster - encrypted records for students, teachers and parents
#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the record store
    #[arg(short, long, global = true, env = "ROSTER_STORE")]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the configuration file and create an empty record store
    Init(InitArgs),

    /// Encrypt a new record and add it to the store
    Add(AddArgs),

    /// List stored records (descriptions only, nothing is decrypted)
    List(ListArgs),

    /// Decrypt and show a record
    Show(ShowArgs),

    /// Change fields of a record and re-encrypt it
    Update(UpdateArgs),

    /// Delete a record
    Delete(DeleteArgs),

    /// Show record counts by type
    Stats(StatsArgs),

    /// Decrypt a ciphertext envelope given on the command line
    DecryptText(DecryptTextArgs),

    /// Encrypt a whole file
    Seal(FileArgs),

    /// Decrypt a file produced by `seal`
    Unseal(FileArgs),

    /// Copy the record store file to another location
    Export(ExportArgs),

    /// Messenger utilities
    #[command(subcommand)]
    Messenger(MessengerCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Where the record store will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Enable the messenger and send codes to this recipient
    #[arg(long)]
    pub recipient: Option<String>,

    /// Deliver messages by appending them to this file
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<String>,

    /// Key-derivation salt mode
    #[arg(long, value_enum, default_value_t = SaltMode::Embedded)]
    pub salt: SaltMode,

    /// Continue without confirmation when a code cannot be delivered
    #[arg(long)]
    pub proceed_on_failure: bool,

    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Record type: student, teacher or parent
    #[arg(value_name = "TYPE")]
    pub record_type: String,

    /// Field to store, as key=value (repeatable)
    #[arg(short, long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// Read fields from a JSON object file (command-line fields win)
    #[arg(long, value_name = "PATH")]
    pub from_file: Option<String>,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Only show records of this type
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub record_type: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Record ID
    #[arg(value_name = "ID")]
    pub id: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `update` command
#[derive(Args)]
pub struct UpdateArgs {
    /// Record ID
    #[arg(value_name = "ID")]
    pub id: u64,

    /// Field to set, as key=value; an empty value removes the field
    #[arg(short, long = "field", value_name = "KEY=VALUE", required = true)]
    pub fields: Vec<String>,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Record ID
    #[arg(value_name = "ID")]
    pub id: u64,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `stats` command
#[derive(Args)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `decrypt-text` command
#[derive(Args)]
pub struct DecryptTextArgs {
    /// Base64 ciphertext envelope
    #[arg(value_name = "CIPHERTEXT")]
    pub ciphertext: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `seal` and `unseal`
#[derive(Args)]
pub struct FileArgs {
    /// Input file
    #[arg(value_name = "IN")]
    pub input: String,

    /// Output file (replaced atomically)
    #[arg(value_name = "OUT")]
    pub output: String,
}

/// Arguments for the `export` command
#[derive(Args)]
pub struct ExportArgs {
    /// Destination path
    #[arg(value_name = "DEST")]
    pub destination: String,
}

#[derive(Subcommand)]
pub enum MessengerCommands {
    /// Send a test message through the configured messenger
    Test,
}
