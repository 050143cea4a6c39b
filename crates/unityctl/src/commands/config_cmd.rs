//! Config subcommand handlers.

use clap::ArgMatches;
use dialoguer::{Confirm, Input};
use secrecy::SecretString;

use unityctl_config::{FALLBACK_POOL, store_password};
use unityctl_core::HostAccessEntry;

use crate::cli::{ConfigArgs, ConfigCommand};
use crate::config::{self, Config, Context, Profile};
use crate::error::CliError;
use crate::output;

use super::util;

/// Keys accepted by `config set`.
const SETTABLE_KEYS: &str = "host, username, insecure, timeout, ca_cert, default_pool, host_access";

// ── Helpers ─────────────────────────────────────────────────────────

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn profile_not_found(name: &str, cfg: &Config) -> CliError {
    let available: Vec<_> = cfg.profiles.keys().cloned().collect();
    CliError::ProfileNotFound {
        name: name.to_owned(),
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Apply one `config set` assignment to a profile.
fn apply_setting(profile: &mut Profile, key: &str, value: &str) -> Result<(), CliError> {
    match key.replace('-', "_").as_str() {
        "host" => {
            unityctl_core::Session::endpoint_url(value).map_err(|e| invalid("host", e.to_string()))?;
            profile.host = value.to_owned();
        }
        "username" => profile.username = Some(value.to_owned()),
        "insecure" => {
            profile.insecure = Some(
                value
                    .parse()
                    .map_err(|_| invalid("insecure", "must be 'true' or 'false'"))?,
            );
        }
        "timeout" => {
            profile.timeout = Some(
                value
                    .parse()
                    .map_err(|_| invalid("timeout", "must be a number (seconds)"))?,
            );
        }
        "ca_cert" => profile.ca_cert = Some(value.into()),
        "default_pool" => profile.default_pool = Some(value.to_owned()),
        "host_access" => {
            let entries: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
            util::parse_host_access(&entries)?;
            profile.host_access = entries;
        }
        "password" => {
            return Err(invalid(
                "password",
                "passwords are not stored in the config file; use `unityctl config set-password`",
            ));
        }
        other => {
            return Err(invalid(
                other,
                format!("unknown config key '{other}'. Valid keys: {SETTABLE_KEYS}"),
            ));
        }
    }
    Ok(())
}

/// Profile names, the default one marked with `*`.
fn profile_lines(cfg: &Config) -> Vec<String> {
    let default = cfg.default_profile.as_deref().unwrap_or("default");
    cfg.profiles
        .keys()
        .map(|name| {
            if name == default {
                format!("{name} *")
            } else {
                name.clone()
            }
        })
        .collect()
}

fn prompt_new_password(profile_name: &str) -> Result<SecretString, CliError> {
    let password =
        rpassword::prompt_password(format!("Password for profile '{profile_name}': "))?;
    if password.is_empty() {
        return Err(invalid("password", "password cannot be empty"));
    }
    Ok(SecretString::from(password))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(m: &ArgMatches, ctx: &Context, _root: &clap::Command) -> Result<(), CliError> {
    let args: ConfigArgs = util::parse_args(m)?;
    match args.command {
        ConfigCommand::Init => init(ctx),

        ConfigCommand::Show => {
            let out = output::render_single(
                ctx.output,
                &ctx.config,
                |cfg| toml::to_string_pretty(cfg).unwrap_or_default(),
                |_| config::config_path().display().to_string(),
            )?;
            output::print_output(&out, ctx.quiet());
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = ctx.config.clone();
            let profile = cfg.profiles.entry(ctx.profile_name.clone()).or_default();
            apply_setting(profile, &key, &value)?;
            save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{}'", ctx.profile_name);
            Ok(())
        }

        ConfigCommand::Profiles => {
            if ctx.config.profiles.is_empty() {
                eprintln!("No profiles configured. Run: unityctl config init");
            } else {
                output::print_output(&profile_lines(&ctx.config).join("\n"), ctx.quiet());
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            if !ctx.config.profiles.contains_key(&name) {
                return Err(profile_not_found(&name, &ctx.config));
            }
            let mut cfg = ctx.config.clone();
            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetPassword => {
            if !ctx.has_profile() {
                return Err(profile_not_found(&ctx.profile_name, &ctx.config));
            }
            let password = prompt_new_password(&ctx.profile_name)?;
            store_password(&ctx.profile_name, &password)?;
            eprintln!(
                "✓ Password stored in system keyring for profile '{}'",
                ctx.profile_name
            );
            Ok(())
        }
    }
}

/// Interactive wizard: writes one profile and optionally its keyring password.
fn init(ctx: &Context) -> Result<(), CliError> {
    let path = config::config_path();
    eprintln!("unityctl configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(ctx.profile_name.clone())
        .interact_text()
        .map_err(prompt_err)?;

    let host: String = Input::new()
        .with_prompt("Array management host")
        .validate_with(|h: &String| {
            unityctl_core::Session::endpoint_url(h)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(prompt_err)?;
    if username.trim().is_empty() {
        return Err(invalid("username", "username cannot be empty"));
    }

    let insecure = Confirm::new()
        .with_prompt("Accept self-signed certificates?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;

    let default_pool: String = Input::new()
        .with_prompt("Default pool for new LUNs")
        .default(FALLBACK_POOL.into())
        .interact_text()
        .map_err(prompt_err)?;

    let host_access: String = Input::new()
        .with_prompt("Hosts granted access to new LUNs (HOST_ID[:MASK], comma-separated)")
        .allow_empty(true)
        .validate_with(|v: &String| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .try_for_each(|s| s.parse::<HostAccessEntry>().map(|_| ()))
        })
        .interact_text()
        .map_err(prompt_err)?;

    let mut profile = Profile {
        host,
        username: Some(username),
        insecure: insecure.then_some(true),
        default_pool: Some(default_pool),
        ..Profile::default()
    };
    apply_setting(&mut profile, "host_access", &host_access)?;

    let mut cfg = ctx.config.clone();
    cfg.profiles.insert(profile_name.clone(), profile);
    if cfg.default_profile.is_none() || cfg.profiles.len() == 1 {
        cfg.default_profile = Some(profile_name.clone());
    }
    save_config(&cfg)?;
    eprintln!("\n✓ Configuration written to {}", path.display());

    let store = Confirm::new()
        .with_prompt("Store the password in the system keyring now?")
        .default(true)
        .interact()
        .map_err(prompt_err)?;
    if store {
        let password = prompt_new_password(&profile_name)?;
        store_password(&profile_name, &password)?;
        eprintln!("   ✓ Password stored in system keyring");
    } else {
        eprintln!("   Set UNITY_PASSWORD, pass -p to be prompted, or run `unityctl config set-password`");
    }

    eprintln!("\n  Test it: unityctl --profile {profile_name} status");
    Ok(())
}
