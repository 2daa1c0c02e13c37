//! Environment variable substitution for cluster credentials
//!
//! Usernames and passwords in the cluster configuration may reference
//! environment variables with the `${VAR_NAME}` syntax so secrets stay
//! out of the YAML file.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::env;

use crate::config::ConfigError;

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid env var pattern"));

/// Substitute `${VAR_NAME}` references in `input`.
///
/// Every reference is checked before anything is returned, so the error
/// names all missing variables at once.
///
/// ```ignore
/// use cluster_vfs::env::substitute_env_vars;
///
/// std::env::set_var("HDFS_USER", "etl");
/// assert_eq!(substitute_env_vars("${HDFS_USER}").unwrap(), "etl");
/// ```
pub fn substitute_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut missing_vars: Vec<&str> = Vec::new();
    for caps in ENV_VAR_PATTERN.captures_iter(input) {
        if let Some(name) = caps.get(1).map(|m| m.as_str()) {
            if env::var(name).is_err() && !missing_vars.contains(&name) {
                missing_vars.push(name);
            }
        }
    }

    if !missing_vars.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "Missing environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    // Single pass so substituted values are never expanded again
    let result = ENV_VAR_PATTERN.replace_all(input, |caps: &Captures<'_>| {
        env::var(&caps[1]).unwrap_or_default()
    });
    Ok(result.into_owned())
}
