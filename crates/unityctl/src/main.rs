mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::error::ErrorKind;
use clap::{ArgMatches, FromArgMatches};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use unityctl_core::Session;

use crate::cli::GlobalOpts;
use crate::commands::{CommandTable, Handler, SessionFuture};
use crate::config::{Connection, Context};
use crate::error::CliError;

type SessionHandler = for<'a> fn(&'a ArgMatches, &'a mut Session, &'a Context) -> SessionFuture<'a>;

#[tokio::main]
async fn main() {
    let table = CommandTable::standard();
    let root = table.cli();

    // Help, version, and usage errors print and exit here (0 or 2).
    let matches = root.clone().get_matches();

    let result = match GlobalOpts::from_arg_matches(&matches) {
        Ok(global) => {
            init_tracing(global.verbose);
            run(&table, &root, &matches, global).await
        }
        Err(e) => Err(CliError::from(e)),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(
    table: &CommandTable,
    root: &clap::Command,
    matches: &ArgMatches,
    global: GlobalOpts,
) -> Result<(), CliError> {
    let Some((name, sub)) = matches.subcommand() else {
        return Err(root
            .clone()
            .error(ErrorKind::MissingSubcommand, "a subcommand is required")
            .into());
    };
    let handler = table.get(name).ok_or_else(|| {
        root.clone()
            .error(ErrorKind::InvalidSubcommand, format!("unknown command '{name}'"))
    })?;

    let ctx = Context::load(global)?;
    debug!(command = name, profile = %ctx.profile_name, "dispatching command");

    match handler {
        Handler::Local(handle) => handle(sub, &ctx, root),
        Handler::Session(handle) => with_session(handle, sub, &ctx).await,
    }
}

/// Log in, run the handler, log out.
///
/// Ctrl-C cancels the in-flight request through the session's token; the
/// handler then fails with `Interrupted` and no logout is attempted. The
/// watcher stays up through logout so a second Ctrl-C aborts it too.
async fn with_session(
    handle: SessionHandler,
    sub: &ArgMatches,
    ctx: &Context,
) -> Result<(), CliError> {
    let conn = Connection::resolve(ctx)?;
    let mut session = Session::new(conn.url.clone(), &conn.transport)?;

    let token = session.cancellation_token();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling");
            token.cancel();
        }
    });

    let result = match session.open(&conn.username, &conn.password).await {
        Ok(()) => handle(sub, &mut session, ctx).await,
        Err(e) => Err(CliError::from(e).with_profile(&ctx.profile_name)),
    };
    let closed = logout(&mut session).await;
    watcher.abort();
    closed.and(result)
}

/// End the session unless it was interrupted.
///
/// A logout failure is logged and otherwise ignored.
async fn logout(session: &mut Session) -> Result<(), CliError> {
    if session.cancellation_token().is_cancelled() {
        return Err(CliError::Interrupted);
    }
    if let Err(e) = session.close().await {
        if e.is_cancelled() {
            return Err(CliError::Interrupted);
        }
        debug!(error = %e, "logout failed");
    }
    Ok(())
}
