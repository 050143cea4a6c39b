//! Listing handlers: `hosts`, `luns`, `pools`, `snapshots`, `query <type>`.

use clap::ArgMatches;
use tabled::Tabled;

use unityctl_core::{
    Host, Lun, Pool, Resource, ResourceKind, ResourceRecord, ResourceView, Session, Snapshot,
    fetch,
};

use crate::cli::{QueryArgs, QueryTypeArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output::{self, bytes_cell, cell, health_cell};

use super::{SessionFuture, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct LunRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Allocated")]
    allocated: String,
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Thin")]
    thin: String,
    #[tabled(rename = "Hosts")]
    hosts: String,
    #[tabled(rename = "Health")]
    health: String,
}

impl LunRow {
    fn new(lun: &Lun, color: bool) -> Self {
        Self {
            id: lun.id().to_owned(),
            name: cell(lun.name()),
            size: bytes_cell(lun.size_total()),
            allocated: bytes_cell(lun.size_allocated()),
            pool: cell(lun.pool_id()),
            thin: cell(lun.is_thin()),
            hosts: cell(lun.host_access().map(|hosts| hosts.len())),
            health: health_cell(lun.health(), color),
        }
    }
}

#[derive(Tabled)]
struct PoolRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Free")]
    free: String,
    #[tabled(rename = "Used %")]
    used: String,
    #[tabled(rename = "Health")]
    health: String,
}

impl PoolRow {
    fn new(pool: &Pool, color: bool) -> Self {
        Self {
            id: pool.id().to_owned(),
            name: cell(pool.name()),
            total: bytes_cell(pool.size_total()),
            free: bytes_cell(pool.size_free()),
            used: cell(pool.percent_used().map(|p| format!("{p:.1}"))),
            health: health_cell(pool.health(), color),
        }
    }
}

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "OS")]
    os: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Health")]
    health: String,
}

impl HostRow {
    fn new(host: &Host, color: bool) -> Self {
        Self {
            id: host.id().to_owned(),
            name: cell(host.name()),
            os: cell(host.os_type()),
            description: cell(host.description()),
            health: health_cell(host.health(), color),
        }
    }
}

#[derive(Tabled)]
struct SnapshotRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl SnapshotRow {
    fn new(snap: &Snapshot) -> Self {
        let stamp = |t: chrono::DateTime<chrono::Utc>| t.format("%Y-%m-%d %H:%M").to_string();
        Self {
            id: snap.id().to_owned(),
            name: cell(snap.name()),
            source: cell(snap.storage_resource().map(|r| r.id)),
            created: cell(snap.created().map(stamp)),
            expires: cell(snap.expires().map(stamp)),
        }
    }
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Fields")]
    fields: String,
}

impl From<&ResourceRecord> for RecordRow {
    fn from(r: &ResourceRecord) -> Self {
        let fields = r
            .fields()
            .keys()
            .filter(|k| !matches!(k.as_str(), "id" | "name"))
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: r.id().to_owned(),
            name: cell(r.name()),
            fields,
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn hosts<'a>(
    m: &'a ArgMatches,
    session: &'a mut Session,
    ctx: &'a Context,
) -> SessionFuture<'a> {
    Box::pin(async move {
        let args: QueryArgs = util::parse_args(m)?;
        list(session, ctx, ResourceKind::Host.to_string(), &args).await
    })
}

pub fn luns<'a>(
    m: &'a ArgMatches,
    session: &'a mut Session,
    ctx: &'a Context,
) -> SessionFuture<'a> {
    Box::pin(async move {
        let args: QueryArgs = util::parse_args(m)?;
        list(session, ctx, ResourceKind::Lun.to_string(), &args).await
    })
}

pub fn pools<'a>(
    m: &'a ArgMatches,
    session: &'a mut Session,
    ctx: &'a Context,
) -> SessionFuture<'a> {
    Box::pin(async move {
        let args: QueryArgs = util::parse_args(m)?;
        list(session, ctx, ResourceKind::Pool.to_string(), &args).await
    })
}

pub fn snapshots<'a>(
    m: &'a ArgMatches,
    session: &'a mut Session,
    ctx: &'a Context,
) -> SessionFuture<'a> {
    Box::pin(async move {
        let args: QueryArgs = util::parse_args(m)?;
        list(session, ctx, ResourceKind::Snapshot.to_string(), &args).await
    })
}

pub fn any_type<'a>(
    m: &'a ArgMatches,
    session: &'a mut Session,
    ctx: &'a Context,
) -> SessionFuture<'a> {
    Box::pin(async move {
        let args: QueryTypeArgs = util::parse_args(m)?;
        list(session, ctx, args.resource_type, &args.query).await
    })
}

async fn list(
    session: &mut Session,
    ctx: &Context,
    resource_type: String,
    args: &QueryArgs,
) -> Result<(), CliError> {
    let query = util::build_query(&resource_type, args);
    let found: Vec<Resource> = fetch(session, &query).await?.collect();

    if let Some(id) = args.id.as_ref().filter(|_| found.is_empty()) {
        return Err(CliError::NotFound {
            resource_type,
            identifier: id.clone(),
            list_command: list_command(query_kind(&query)),
        });
    }

    let out = render(ctx, query_kind(&query), found)?;
    output::print_output(&out, ctx.quiet());
    Ok(())
}

fn query_kind(query: &unityctl_core::ResourceQuery) -> Option<ResourceKind> {
    query.resource_type().parse().ok()
}

fn list_command(kind: Option<ResourceKind>) -> String {
    match kind {
        Some(ResourceKind::Lun) => "luns".into(),
        Some(ResourceKind::Pool) => "pools".into(),
        Some(ResourceKind::Host) => "hosts".into(),
        Some(ResourceKind::Snapshot) => "snapshots".into(),
        Some(other) => format!("query {other}"),
        None => "query <type>".into(),
    }
}

/// Pick the row shape by resource type; JSON/YAML always carry the raw fields.
fn render(
    ctx: &Context,
    kind: Option<ResourceKind>,
    found: Vec<Resource>,
) -> Result<String, CliError> {
    let color = ctx.color;
    let fmt = ctx.output;
    let records: Vec<ResourceRecord> = found.into_iter().map(Resource::into_record).collect();
    let id = |r: &ResourceRecord| r.id().to_owned();

    match kind {
        Some(ResourceKind::Lun) => output::render_list(
            fmt,
            &records,
            |r| LunRow::new(&Lun::from(r.clone()), color),
            id,
        ),
        Some(ResourceKind::Pool) => output::render_list(
            fmt,
            &records,
            |r| PoolRow::new(&Pool::from(r.clone()), color),
            id,
        ),
        Some(ResourceKind::Host) => output::render_list(
            fmt,
            &records,
            |r| HostRow::new(&Host::from(r.clone()), color),
            id,
        ),
        Some(ResourceKind::Snapshot) => output::render_list(
            fmt,
            &records,
            |r| SnapshotRow::new(&Snapshot::from(r.clone())),
            id,
        ),
        _ => output::render_list(fmt, &records, |r| RecordRow::from(r), id),
    }
}
