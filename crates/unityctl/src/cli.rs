//! Clap definitions for the `unityctl` CLI.
//!
//! Global flags, per-command argument structs, and the static command
//! definitions the dispatch table is assembled from. Kept free of crate
//! dependencies so `build.rs` can include it for man page generation.

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unityctl -- command-line client for EMC Unity storage arrays
#[derive(Debug, Parser)]
#[command(
    name = "unityctl",
    version,
    about = "Manage EMC Unity storage arrays from the command line",
    long_about = "A CLI for the EMC Unity REST management API.\n\n\
        Lists hosts, LUNs, pools and snapshots, queries any resource type,\n\
        and provisions or removes LUNs.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct GlobalOpts {
    /// Array management host or URL (overrides profile)
    #[arg(long, short = 'e', env = "UNITY_HOST", global = true)]
    pub host: Option<String>,

    /// Management username (overrides profile)
    #[arg(long = "user", short = 'u', env = "UNITY_USERNAME", global = true)]
    pub user: Option<String>,

    /// Prompt for the password (otherwise UNITY_PASSWORD, then the keyring)
    #[arg(long = "password", short = 'p')]
    pub prompt_password: bool,

    /// Profile to use
    #[arg(long, env = "UNITY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "UNITY_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "UNITY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds [default: from profile, else 30]
    #[arg(long, env = "UNITY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Per-command arguments ────────────────────────────────────────────

/// Selection flags shared by every listing command.
#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    /// Array-side filter, passed through verbatim (e.g. 'name lk "ldom-%"')
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Fetch one instance by id (takes precedence over --filter and --name)
    #[arg(long, short = 'i')]
    pub id: Option<String>,

    /// Keep only instances whose name matches exactly
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Fields to request, comma-separated (replaces the default set)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
}

#[derive(Debug, Args)]
pub struct QueryTypeArgs {
    /// Array resource type (e.g. fcPort, ethernetPort, alert)
    pub resource_type: String,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Debug, Args)]
pub struct CreateLunArgs {
    /// Name of the new LUN
    pub name: String,

    /// Pool id [default: profile default_pool, else pool_1]
    #[arg(long, short = 'p')]
    pub pool: Option<String>,

    /// Size in bytes or with units (500GiB, 2TiB) [default: 1TiB]
    #[arg(long, short = 's')]
    pub size: Option<String>,

    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Hosts to grant access, comma-separated HOST_ID[:MASK]
    /// [default: profile host_access]
    #[arg(long = "hosts", short = 'a', value_delimiter = ',')]
    pub hosts: Vec<String>,

    /// Fully provision instead of thin
    #[arg(long)]
    pub thick: bool,

    /// Disable compression
    #[arg(long)]
    pub no_compression: bool,
}

#[derive(Debug, Args)]
pub struct DeleteLunArgs {
    /// Id of the LUN to delete (e.g. sv_16)
    pub lun_id: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive profile setup
    Init,

    /// Show the current configuration
    Show,

    /// Set a profile value
    Set {
        /// Key: host, username, insecure, timeout, ca_cert, default_pool, host_access
        key: String,
        /// Value
        value: String,
    },

    /// List profiles
    Profiles,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },

    /// Store the profile's password in the system keyring
    SetPassword,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

fn no_args(cmd: clap::Command) -> clap::Command {
    cmd
}

// ── Command definitions ──────────────────────────────────────────────

/// Name, help text, and argument definition of one subcommand.
#[derive(Debug)]
pub struct CommandDef {
    pub name: &'static str,
    pub about: &'static str,
    pub aliases: &'static [&'static str],
    pub args: fn(clap::Command) -> clap::Command,
}

impl CommandDef {
    pub fn to_command(&self) -> clap::Command {
        (self.args)(
            clap::Command::new(self.name)
                .about(self.about)
                .visible_aliases(self.aliases.iter().copied()),
        )
    }
}

pub static HOSTS: CommandDef = CommandDef {
    name: "hosts",
    about: "List hosts registered with the array",
    aliases: &[],
    args: <QueryArgs as Args>::augment_args,
};

pub static LUNS: CommandDef = CommandDef {
    name: "luns",
    about: "List LUNs",
    aliases: &[],
    args: <QueryArgs as Args>::augment_args,
};

pub static POOLS: CommandDef = CommandDef {
    name: "pools",
    about: "List storage pools",
    aliases: &[],
    args: <QueryArgs as Args>::augment_args,
};

pub static SNAPSHOTS: CommandDef = CommandDef {
    name: "snapshots",
    about: "List snapshots",
    aliases: &["snaps"],
    args: <QueryArgs as Args>::augment_args,
};

pub static QUERY: CommandDef = CommandDef {
    name: "query",
    about: "Query any resource type",
    aliases: &[],
    args: <QueryTypeArgs as Args>::augment_args,
};

pub static CREATE_LUN: CommandDef = CommandDef {
    name: "create_lun",
    about: "Create a LUN and read it back",
    aliases: &["create-lun"],
    args: <CreateLunArgs as Args>::augment_args,
};

pub static DELETE_LUN: CommandDef = CommandDef {
    name: "delete_lun",
    about: "Delete a LUN (succeeds if it is already gone)",
    aliases: &["delete-lun"],
    args: <DeleteLunArgs as Args>::augment_args,
};

pub static STATUS: CommandDef = CommandDef {
    name: "status",
    about: "Show array identity, version, and health",
    aliases: &[],
    args: no_args,
};

pub static CONFIG: CommandDef = CommandDef {
    name: "config",
    about: "Manage CLI configuration and profiles",
    aliases: &[],
    args: <ConfigArgs as Args>::augment_args,
};

pub static COMPLETIONS: CommandDef = CommandDef {
    name: "completions",
    about: "Generate shell completions",
    aliases: &[],
    args: <CompletionsArgs as Args>::augment_args,
};

/// Every subcommand, in help order.
#[allow(dead_code)]
pub static ALL: &[&CommandDef] = &[
    &HOSTS,
    &LUNS,
    &POOLS,
    &SNAPSHOTS,
    &QUERY,
    &CREATE_LUN,
    &DELETE_LUN,
    &STATUS,
    &CONFIG,
    &COMPLETIONS,
];

/// Root command with the given subcommands attached.
pub fn build<'a>(defs: impl IntoIterator<Item = &'a CommandDef>) -> clap::Command {
    Cli::command().subcommands(defs.into_iter().map(CommandDef::to_command))
}
