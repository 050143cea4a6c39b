//! `create_lun`: provision a LUN and show it once the array has it.

use clap::ArgMatches;
use tracing::warn;

use unityctl_core::{
    CreateLunRequest, Lun, LunCreated, ResourceView, Session, VerificationError, create_lun,
};

use crate::cli::CreateLunArgs;
use crate::config::Context;
use crate::error::CliError;
use crate::output::{self, bytes_cell, cell, detail_block, health_cell};

use super::{SessionFuture, util};

pub fn handle<'a>(
    m: &'a ArgMatches,
    session: &'a mut Session,
    ctx: &'a Context,
) -> SessionFuture<'a> {
    Box::pin(async move {
        let args: CreateLunArgs = util::parse_args(m)?;
        let request = build_request(&args, ctx)?;

        let created = create_lun(session, &request).await?;
        match &created {
            LunCreated::Verified(lun) => {
                let out = output::render_single(
                    ctx.output,
                    lun,
                    |l| lun_detail(l, ctx.color),
                    |l| l.id().to_owned(),
                )?;
                output::print_output(&out, ctx.quiet());
                Ok(())
            }
            LunCreated::Unverified { id, error } => unverified(ctx, id, error),
        }
    })
}

/// Fill gaps in the flags from the active profile.
fn build_request(args: &CreateLunArgs, ctx: &Context) -> Result<CreateLunRequest, CliError> {
    let pool = args
        .pool
        .clone()
        .unwrap_or_else(|| ctx.profile.pool_or_default().to_owned());
    let size = match args.size.as_deref() {
        Some(raw) => util::parse_size(raw)?,
        None => util::DEFAULT_LUN_SIZE,
    };
    let host_access = if args.hosts.is_empty() {
        ctx.profile.host_access_entries()?
    } else {
        util::parse_host_access(&args.hosts)?
    };

    let mut request = CreateLunRequest::new(args.name.clone(), pool, size)
        .with_host_access(host_access)
        .thin(!args.thick)
        .compression(!args.no_compression);
    if let Some(ref description) = args.description {
        request = request.with_description(description.clone());
    }
    Ok(request)
}

/// The LUN exists; say so even though it could not be read back.
fn unverified(ctx: &Context, id: &str, error: &VerificationError) -> Result<(), CliError> {
    if matches!(error, VerificationError::Lookup { source, .. } if source.is_cancelled()) {
        return Err(CliError::Interrupted);
    }
    warn!(%id, %error, "created LUN could not be read back");
    if !ctx.quiet() {
        eprintln!("warning: LUN {id} was created but could not be read back: {error}");
    }
    let out = output::render_single(
        ctx.output,
        &serde_json::json!({ "id": id, "verified": false }),
        |_| format!("Created LUN {id} (unverified)"),
        |_| id.to_owned(),
    )?;
    output::print_output(&out, ctx.quiet());
    Ok(())
}

fn lun_detail(lun: &Lun, color: bool) -> String {
    let hosts = lun.host_access().map(|entries| {
        entries
            .iter()
            .map(|e| format!("{}:{}", e.host_id(), e.access_mask))
            .collect::<Vec<_>>()
            .join(", ")
    });
    detail_block(&[
        ("ID", lun.id().to_owned()),
        ("Name", cell(lun.name())),
        ("Description", cell(lun.description())),
        ("Pool", cell(lun.pool_id())),
        ("Size", bytes_cell(lun.size_total())),
        ("Allocated", bytes_cell(lun.size_allocated())),
        ("Thin", cell(lun.is_thin())),
        ("WWN", cell(lun.wwn())),
        ("Hosts", cell(hosts)),
        ("Health", health_cell(lun.health(), color)),
    ])
}
