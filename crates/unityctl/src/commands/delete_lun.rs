//! `delete_lun`: remove a LUN by id after confirmation.

use clap::ArgMatches;
use serde::Serialize;

use unityctl_core::{Deleted, Session, delete_lun};

use crate::cli::DeleteLunArgs;
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::{SessionFuture, util};

#[derive(Serialize)]
struct Outcome<'a> {
    id: &'a str,
    result: Deleted,
}

pub fn handle<'a>(
    m: &'a ArgMatches,
    session: &'a mut Session,
    ctx: &'a Context,
) -> SessionFuture<'a> {
    Box::pin(async move {
        let args: DeleteLunArgs = util::parse_args(m)?;
        let id = args.lun_id.as_str();

        if !util::confirm(
            &format!("Delete LUN {id}? Data on it will be lost."),
            "delete_lun",
            ctx.global.yes,
        )? {
            return Ok(());
        }

        let result = delete_lun(session, id).await?;
        let outcome = Outcome { id, result };
        let out = output::render_single(
            ctx.output,
            &outcome,
            |o| format!("LUN {}: {}", o.id, o.result),
            |o| o.id.to_owned(),
        )?;
        output::print_output(&out, ctx.quiet());
        Ok(())
    })
}
