use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, returning a structured error if it's missing.
///
/// An empty or whitespace-only value counts as missing.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(MissingEnvVarError(name.to_string())),
    }
}

/// Like [`get_env_var`] but `None` when unset.
pub fn env_override(name: &str) -> Option<String> {
    get_env_var(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_names_itself() {
        let err = get_env_var("SHARED_UTILS_SURELY_UNSET_VARIABLE").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing environment variable: SHARED_UTILS_SURELY_UNSET_VARIABLE"
        );
        assert_eq!(env_override("SHARED_UTILS_SURELY_UNSET_VARIABLE"), None);
    }

    #[test]
    fn present_variable_is_returned() {
        // PATH is set in every test environment we run under.
        assert!(get_env_var("PATH").is_ok());
    }
}
