//! Shared helpers for command handlers.

use std::io::IsTerminal;

use bytesize::ByteSize;
use clap::{ArgMatches, FromArgMatches};

use unityctl_core::{HostAccessEntry, ResourceKind, ResourceQuery};

use crate::cli::QueryArgs;
use crate::error::CliError;

/// Default size of a new LUN: 1 TiB.
pub const DEFAULT_LUN_SIZE: u64 = 1_099_511_627_776;

/// Decode a subcommand's typed arguments.
pub fn parse_args<T: FromArgMatches>(matches: &ArgMatches) -> Result<T, CliError> {
    Ok(T::from_arg_matches(matches)?)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the operation is refused.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Turn selection flags into a query for `resource_type`.
///
/// Known types start from their default field list; `--fields` replaces it.
pub fn build_query(resource_type: &str, args: &QueryArgs) -> ResourceQuery {
    let mut query = match resource_type.parse::<ResourceKind>() {
        Ok(kind) => ResourceQuery::for_kind(kind),
        Err(_) => ResourceQuery::new(resource_type),
    };
    if !args.fields.is_empty() {
        query = query.with_fields(args.fields.iter().map(String::as_str));
    }
    if let Some(ref id) = args.id {
        query = query.with_id(id.as_str());
    }
    if let Some(ref name) = args.name {
        query = query.with_name(name.as_str());
    }
    if let Some(ref filter) = args.filter {
        query = query.with_filter(filter.as_str());
    }
    query
}

/// Parse a size given as plain bytes or with units (`500GiB`, `2 TiB`).
pub fn parse_size(raw: &str) -> Result<u64, CliError> {
    let raw = raw.trim();
    let bytes = match raw.parse::<u64>() {
        Ok(bytes) => bytes,
        Err(_) => raw
            .parse::<ByteSize>()
            .map_err(|e| CliError::Validation {
                field: "size".into(),
                reason: format!("'{raw}' is not a size: {e}"),
            })?
            .as_u64(),
    };
    if bytes == 0 {
        return Err(CliError::Validation {
            field: "size".into(),
            reason: "size must be greater than zero".into(),
        });
    }
    Ok(bytes)
}

/// Parse `HOST_ID[:MASK]` entries from `-a`.
pub fn parse_host_access(raw: &[String]) -> Result<Vec<HostAccessEntry>, CliError> {
    raw.iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse().map_err(|reason| CliError::Validation {
                field: "hosts".into(),
                reason,
            })
        })
        .collect()
}
