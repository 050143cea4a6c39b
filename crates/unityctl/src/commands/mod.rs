//! Command dispatch: an explicit table from subcommand name to handler.
//!
//! The table is assembled once in `main` and owns nothing global. The same
//! entries build the clap tree, so a command cannot be parsed without also
//! being dispatchable.

pub mod completions;
pub mod config_cmd;
pub mod create_lun;
pub mod delete_lun;
pub mod query;
pub mod status;
pub mod util;

use clap::ArgMatches;
use futures::future::LocalBoxFuture;

use unityctl_core::Session;

use crate::cli::{self, CommandDef};
use crate::config::Context;
use crate::error::CliError;

/// What a session handler returns.
pub type SessionFuture<'a> = LocalBoxFuture<'a, Result<(), CliError>>;

/// How a command runs.
#[derive(Clone, Copy)]
pub enum Handler {
    /// Needs a logged-in session, which the caller opens and closes.
    Session(for<'a> fn(&'a ArgMatches, &'a mut Session, &'a Context) -> SessionFuture<'a>),
    /// Runs without contacting the array. Gets the root command for
    /// completions.
    Local(fn(&ArgMatches, &Context, &clap::Command) -> Result<(), CliError>),
}

/// One dispatchable subcommand.
#[derive(Clone, Copy)]
pub struct Entry {
    pub def: &'static CommandDef,
    pub handler: Handler,
}

/// Subcommand name to handler.
pub struct CommandTable {
    entries: Vec<Entry>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a command. A later entry with the same name replaces the earlier.
    pub fn register(&mut self, def: &'static CommandDef, handler: Handler) -> &mut Self {
        self.entries.retain(|e| e.def.name != def.name);
        self.entries.push(Entry { def, handler });
        self
    }

    /// The built-in command set.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table
            .register(&cli::HOSTS, Handler::Session(query::hosts))
            .register(&cli::LUNS, Handler::Session(query::luns))
            .register(&cli::POOLS, Handler::Session(query::pools))
            .register(&cli::SNAPSHOTS, Handler::Session(query::snapshots))
            .register(&cli::QUERY, Handler::Session(query::any_type))
            .register(&cli::CREATE_LUN, Handler::Session(create_lun::handle))
            .register(&cli::DELETE_LUN, Handler::Session(delete_lun::handle))
            .register(&cli::STATUS, Handler::Session(status::handle))
            .register(&cli::CONFIG, Handler::Local(config_cmd::handle))
            .register(&cli::COMPLETIONS, Handler::Local(completions::handle));
        table
    }

    /// Root clap command with every registered subcommand.
    pub fn cli(&self) -> clap::Command {
        cli::build(self.entries.iter().map(|e| e.def))
    }

    /// Look up a handler by canonical name (clap resolves aliases).
    pub fn get(&self, name: &str) -> Option<Handler> {
        self.entries
            .iter()
            .find(|e| e.def.name == name)
            .map(|e| e.handler)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.def.name)
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}
