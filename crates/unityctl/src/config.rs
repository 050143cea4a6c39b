//! CLI configuration: thin layer over `unityctl_config`.
//!
//! Merges `GlobalOpts` flag overrides onto the active profile and resolves
//! the session credential, prompting when `-p` was passed.

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;
use tracing::debug;
use url::Url;

use unityctl_core::{Session, TransportConfig};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Re-exports from shared crate ────────────────────────────────────

pub use unityctl_config::{Config, Profile, config_path, load_config, save_config};

/// Everything a handler needs besides the session.
#[derive(Debug)]
pub struct Context {
    pub global: GlobalOpts,
    pub config: Config,
    pub profile_name: String,
    /// The active profile, or an empty one when none is configured.
    pub profile: Profile,
    pub output: OutputFormat,
    pub color: bool,
}

impl Context {
    /// Load config and apply flag overrides.
    ///
    /// A missing config file is not an error; a broken one is.
    pub fn load(global: GlobalOpts) -> Result<Self, CliError> {
        let config = load_config()?;
        Ok(Self::from_config(global, config))
    }

    pub fn from_config(global: GlobalOpts, config: Config) -> Self {
        let profile_name = active_profile_name(&global, &config);
        let profile = config.profile(&profile_name).cloned().unwrap_or_default();

        let output = global
            .output
            .or_else(|| OutputFormat::from_str(&config.defaults.output, true).ok())
            .unwrap_or(OutputFormat::Table);
        let color_mode = global
            .color
            .or_else(|| ColorMode::from_str(&config.defaults.color, true).ok())
            .unwrap_or(ColorMode::Auto);

        Self {
            color: output == OutputFormat::Table && output::should_color(color_mode),
            global,
            config,
            profile_name,
            profile,
            output,
        }
    }

    /// Whether the named profile exists in the config file.
    pub fn has_profile(&self) -> bool {
        self.config.profile(&self.profile_name).is_some()
    }

    pub fn quiet(&self) -> bool {
        self.global.quiet
    }

    pub fn timeout(&self) -> Duration {
        match self.global.timeout {
            Some(secs) => Duration::from_secs(secs),
            None => self.profile.timeout_or(self.config.defaults.timeout),
        }
    }

    fn insecure(&self) -> bool {
        self.global.insecure || self.config.defaults.insecure
    }
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

// ── Session setup ────────────────────────────────────────────────────

/// Where and as whom to log in.
pub struct Connection {
    pub url: Url,
    pub transport: TransportConfig,
    pub username: String,
    pub password: SecretString,
}

impl Connection {
    /// Resolve host, username, and password. Flags override the profile.
    ///
    /// The password comes from the prompt (`-p`), `UNITY_PASSWORD`, or the
    /// keyring, in that order. Nothing else is consulted.
    pub fn resolve(ctx: &Context) -> Result<Self, CliError> {
        let host = ctx
            .global
            .host
            .as_deref()
            .or(Some(ctx.profile.host.as_str()))
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| CliError::NoHost {
                profile: ctx.profile_name.clone(),
                path: config_path().display().to_string(),
            })?;
        let url = Session::endpoint_url(host).map_err(|e| CliError::Validation {
            field: "host".into(),
            reason: e.to_string(),
        })?;

        let username = match ctx.global.user.clone() {
            Some(user) => user,
            None => unityctl_config::resolve_username(&ctx.profile, &ctx.profile_name)?,
        };

        let password = if ctx.global.prompt_password {
            prompt_password(&username, &url)?
        } else {
            unityctl_config::resolve_password(&ctx.profile_name)?
        };

        let tls = ctx.profile.tls_mode(ctx.insecure());
        let transport = TransportConfig::new(tls, ctx.timeout());
        debug!(host = %url, %username, profile = %ctx.profile_name, "resolved connection");

        Ok(Self {
            url,
            transport,
            username,
            password,
        })
    }
}

fn prompt_password(username: &str, url: &Url) -> Result<SecretString, CliError> {
    let host = url.host_str().unwrap_or("array");
    let password = rpassword::prompt_password(format!("Password for {username}@{host}: "))?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::{CommandFactory, FromArgMatches};

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["unityctl"];
        argv.extend_from_slice(args);
        let matches = Cli::command()
            .subcommand_required(false)
            .arg_required_else_help(false)
            .try_get_matches_from(argv)
            .unwrap();
        GlobalOpts::from_arg_matches(&matches).unwrap()
    }

    fn config_with_lab() -> Config {
        let mut config = Config::default();
        config.defaults.output = "yaml".into();
        config.profiles.insert(
            "lab".into(),
            Profile {
                host: "unity01.lab".into(),
                username: Some("restapi".into()),
                timeout: Some(90),
                ..Profile::default()
            },
        );
        config.default_profile = Some("lab".into());
        config
    }

    #[test]
    fn profile_and_defaults_apply_without_flags() {
        let ctx = Context::from_config(global(&[]), config_with_lab());
        assert_eq!(ctx.profile_name, "lab");
        assert!(ctx.has_profile());
        assert_eq!(ctx.output, OutputFormat::Yaml);
        assert_eq!(ctx.timeout(), Duration::from_secs(90));
    }

    #[test]
    fn flags_override_profile() {
        let ctx = Context::from_config(
            global(&["-o", "json", "--timeout", "5", "--profile", "other"]),
            config_with_lab(),
        );
        assert_eq!(ctx.profile_name, "other");
        assert!(!ctx.has_profile());
        assert_eq!(ctx.output, OutputFormat::Json);
        assert_eq!(ctx.timeout(), Duration::from_secs(5));
        assert!(!ctx.color);
    }

    #[test]
    fn missing_host_fails_before_any_credential_lookup() {
        let ctx = Context::from_config(global(&["--profile", "nowhere"]), Config::default());
        assert!(matches!(
            Connection::resolve(&ctx),
            Err(CliError::NoHost { .. })
        ));
    }
}
