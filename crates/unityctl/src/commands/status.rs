use clap::ArgMatches;

use unityctl_core::{ArrayStatus, Health, Session, array_status};

use crate::config::Context;
use crate::output::{self, MISSING, detail_block, health_cell};

use super::SessionFuture;

pub fn handle<'a>(
    _m: &'a ArgMatches,
    session: &'a mut Session,
    ctx: &'a Context,
) -> SessionFuture<'a> {
    Box::pin(async move {
        let status = array_status(session).await?;
        let out = output::render_single(
            ctx.output,
            &status,
            |s| status_detail(s, ctx.color),
            |s| s.id.clone(),
        )?;
        output::print_output(&out, ctx.quiet());
        Ok(())
    })
}

fn status_detail(status: &ArrayStatus, color: bool) -> String {
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| MISSING.into());
    let health = status.health.clone().ok_or_else(|| {
        unityctl_core::CoreError::FieldMissing {
            resource_type: "system".into(),
            id: status.id.clone(),
            field: "health".into(),
        }
    });
    let mut pairs = vec![
        ("ID", status.id.clone()),
        ("Name", text(&status.name)),
        ("Model", text(&status.model)),
        ("Serial", text(&status.serial_number)),
        ("Software", text(&status.software_version)),
        ("API", text(&status.api_version)),
        ("Health", health_cell(health, color)),
    ];
    if let Some(summary) = status.health.as_ref().and_then(Health::summary) {
        pairs.push(("Detail", summary.to_owned()));
    }
    detail_block(&pairs)
}
