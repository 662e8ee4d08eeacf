//! Open the store for one command invocation and sign the operator in.

use crate::output::{CliError, OutputMode, fail};
use anyhow::Context;
use siren_core::Store;
use siren_core::config::{self, SirenConfig};
use siren_core::error::ErrorCode;
use siren_core::storage::{FileStorage, LoadSource};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const USER_ENV: &str = "SIREN_USER";
pub const PASSWORD_ENV: &str = "SIREN_PASSWORD";

/// Shown when sign-in fails.
pub const LOGIN_FAILED: &str = "Credenciales incorrectas. Use admin/admin123";

/// Global flags every store-backed command needs.
#[derive(Debug, Clone, Default)]
pub struct SessionArgs {
    pub data_dir: Option<PathBuf>,
    pub username: Option<String>,
    pub password: Option<String>,
}

fn flag_or_env(flag: Option<&str>, var: &str) -> String {
    flag.map(str::to_string)
        .or_else(|| env::var(var).ok())
        .unwrap_or_default()
}

/// Build a store over the file backend described by `config`.
pub fn open_store(data_dir: &Path, config: &SirenConfig) -> anyhow::Result<Store> {
    let storage = FileStorage::new(data_dir)
        .with_lock_timeout(Duration::from_millis(config.storage.lock_timeout_ms));
    let store = Store::builder(storage)
        .key(config.storage.key.clone())
        .load_policy(config.storage.on_corrupt)
        .map(config.map)
        .open()
        .with_context(|| format!("Failed to load incidents from {}", data_dir.display()))?;

    if store.load_source() == LoadSource::RecoveredFromCorrupt {
        warn!(dir = %data_dir.display(), "stored incidents were unreadable; showing seed data");
    }
    Ok(store)
}

/// Resolve configuration, open the store, and log in.
pub fn start(args: &SessionArgs, output: OutputMode) -> anyhow::Result<Store> {
    let data_dir = config::resolve_data_dir(args.data_dir.as_deref())?;
    let config = config::load_config(&data_dir).map_err(|err| {
        if config::is_parse_error(&err) {
            fail(
                output,
                CliError::with_code(format!("{err:#}"), ErrorCode::ConfigParseError),
            )
        } else {
            err
        }
    })?;
    debug!(dir = %data_dir.display(), key = %config.storage.key, "session starting");

    let mut store = open_store(&data_dir, &config)?;

    let username = flag_or_env(args.username.as_deref(), USER_ENV);
    let password = flag_or_env(args.password.as_deref(), PASSWORD_ENV);
    if !store.login(&username, &password) {
        return Err(fail(
            output,
            CliError::with_code(LOGIN_FAILED, ErrorCode::AuthenticationFailed),
        ));
    }
    Ok(store)
}

/// Flush any write the store could not complete on its own.
pub fn finish(store: &mut Store) -> anyhow::Result<()> {
    if store.is_dirty() {
        store.save().context("Failed to save incidents")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_takes_precedence_over_env() {
        assert_eq!(flag_or_env(Some("admin"), "SIREN_TEST_UNSET_VAR"), "admin");
        assert_eq!(flag_or_env(None, "SIREN_TEST_UNSET_VAR"), "");
    }

    #[test]
    fn open_store_uses_configured_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SirenConfig::default();
        config.storage.key = "incidents-alt".to_string();

        let mut store = open_store(dir.path(), &config).unwrap();
        assert_eq!(store.load_source(), LoadSource::Seed);
        store.save().unwrap();
        assert!(dir.path().join("incidents-alt.json").exists());
    }
}
