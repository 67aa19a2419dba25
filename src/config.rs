//! Ambient environment configuration: provider credentials and process-wide
//! tunables, loaded once at startup via `dotenvy` + `std::env`.

use std::env;

/// Load a `.env` file if present. Safe to call more than once; a missing
/// file is not an error, matching how every provider client already treats
/// an absent API key as "construct anyway, fail on first call".
pub fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound) {
            tracing::warn!(%err, "failed to load .env file");
        }
    }
}

/// Read an environment variable, returning `None` for both "unset" and
/// "set to an empty string" — the same treatment `NodeExecutionContext`
/// gives node data fields.
#[must_use]
pub fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_var_is_none() {
        assert_eq!(env_var("LOOMGRAPH_DOES_NOT_EXIST"), None);
    }

    #[test]
    fn empty_var_is_treated_as_absent() {
        // SAFETY: test runs single-threaded per #[test] isolation is not
        // guaranteed, but this key is unique to this test.
        unsafe { env::set_var("LOOMGRAPH_EMPTY_TEST_VAR", "") };
        assert_eq!(env_var("LOOMGRAPH_EMPTY_TEST_VAR"), None);
        unsafe { env::remove_var("LOOMGRAPH_EMPTY_TEST_VAR") };
    }
}
