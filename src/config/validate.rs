// src/config/validate.rs

use crate::config::duration::parse_duration;
use crate::config::model::{BudgetSection, ConfigFile, RawBudgetSection, RawConfigFile};
use crate::errors::{Result, TimeboxError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TimeboxError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let budget = validate_budget(&raw.budget)?;
        validate_env(&raw)?;
        validate_discovery(&raw)?;
        Ok(ConfigFile::new_unchecked(budget, raw.env, raw.discovery))
    }
}

fn validate_budget(raw: &RawBudgetSection) -> Result<BudgetSection> {
    let timeout = match raw.timeout.as_deref() {
        Some(s) => {
            let dur = parse_duration(s).map_err(|e| {
                TimeboxError::ConfigError(format!("[budget].timeout: {e}"))
            })?;
            if dur.is_zero() {
                return Err(TimeboxError::ConfigError(
                    "[budget].timeout must be greater than zero".to_string(),
                ));
            }
            Some(dur)
        }
        None => None,
    };

    if raw.max_entries == Some(0) {
        return Err(TimeboxError::ConfigError(
            "[budget].max_entries must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(BudgetSection {
        timeout,
        max_entries: raw.max_entries,
    })
}

fn validate_env(cfg: &RawConfigFile) -> Result<()> {
    for key in cfg.env.keys() {
        if key.is_empty() {
            return Err(TimeboxError::ConfigError(
                "[env] contains an empty variable name".to_string(),
            ));
        }
        if key.contains('=') || key.contains('\0') {
            return Err(TimeboxError::ConfigError(format!(
                "[env] variable name '{}' must not contain '=' or NUL",
                key
            )));
        }
    }
    Ok(())
}

fn validate_discovery(cfg: &RawConfigFile) -> Result<()> {
    if cfg.discovery.extensions.is_empty() {
        return Err(TimeboxError::ConfigError(
            "[discovery].extensions must list at least one extension".to_string(),
        ));
    }
    for ext in cfg.discovery.extensions.iter() {
        if ext.trim_start_matches('.').is_empty() {
            return Err(TimeboxError::ConfigError(
                "[discovery].extensions contains an empty extension".to_string(),
            ));
        }
    }
    Ok(())
}
