//! Runtime environment adaptation for the Lambda sandbox
//!
//! Inside Lambda only `/tmp` is writable, while the model loader and its
//! plotting/font helpers default to caches under `$HOME`. This module points
//! those locations at the scratch root once, at process start, before any
//! worker thread exists.

use std::collections::HashMap;

/// Variable carrying the execution environment identity
pub const SANDBOX_MARKER_VAR: &str = "AWS_EXECUTION_ENV";

/// Prefix of [`SANDBOX_MARKER_VAR`] that identifies the Lambda sandbox
pub const SANDBOX_PREFIX: &str = "AWS_Lambda";

/// The only writable location in the sandbox
pub const SCRATCH_ROOT: &str = "/tmp";

/// Cache and config roots redirected when sandboxed, only if not already set
pub const REDIRECTED_DIRS: [(&str, &str); 7] = [
    ("XDG_CACHE_HOME", "/tmp/.cache"),
    ("XDG_CONFIG_HOME", "/tmp/.config"),
    ("HF_HOME", "/tmp/.cache/huggingface"),
    ("HF_HUB_CACHE", "/tmp/.cache/huggingface"),
    ("MPLCONFIGDIR", "/tmp/.config/matplotlib"),
    ("ULTRALYTICS_CONFIG_DIR", "/tmp/Ultralytics"),
    ("ULTRALYTICS_CACHE_DIR", "/tmp/Ultralytics"),
];

/// Key/value store the adapter reads and writes
pub trait EnvStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str);

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// The real process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    fn contains(&self, key: &str) -> bool {
        std::env::var_os(key).is_some()
    }
}

impl EnvStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.insert(key.to_string(), value.to_string());
    }
}

/// What the adapter did at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeEnvironment {
    /// Whether the sandbox marker was recognized
    pub sandboxed: bool,
    /// Variables written by the adapter, in the order they were written
    pub applied: Vec<&'static str>,
}

/// Redirect cache/config directories of the current process when running
/// inside Lambda.
///
/// Must run before the async runtime starts its worker threads, since it
/// mutates the process environment.
pub fn configure_runtime_environment() -> RuntimeEnvironment {
    configure_environment(&mut ProcessEnv)
}

/// Apply the sandbox redirection to an arbitrary [`EnvStore`].
///
/// Does nothing unless the marker starts with [`SANDBOX_PREFIX`]. `HOME` is
/// always overwritten; every other variable keeps an operator-supplied value.
/// Repeated calls only rewrite `HOME`, to the same value.
pub fn configure_environment<E: EnvStore>(env: &mut E) -> RuntimeEnvironment {
    let marker = env.get(SANDBOX_MARKER_VAR).unwrap_or_default();
    if !marker.starts_with(SANDBOX_PREFIX) {
        return RuntimeEnvironment::default();
    }

    let mut applied = vec!["HOME"];
    env.set("HOME", SCRATCH_ROOT);

    for (key, default) in REDIRECTED_DIRS {
        if !env.contains(key) {
            env.set(key, default);
            applied.push(key);
        }
    }

    RuntimeEnvironment {
        sandboxed: true,
        applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_marker_leaves_env_untouched() {
        let mut env = store(&[("HOME", "/home/user")]);
        let before = env.clone();

        let report = configure_environment(&mut env);

        assert!(!report.sandboxed);
        assert!(report.applied.is_empty());
        assert_eq!(env, before);
    }

    #[test]
    fn test_other_execution_env_is_ignored() {
        let mut env = store(&[(SANDBOX_MARKER_VAR, "AWS_ECS_FARGATE")]);
        let before = env.clone();

        let report = configure_environment(&mut env);

        assert!(!report.sandboxed);
        assert_eq!(env, before);
    }

    #[test]
    fn test_sandbox_sets_all_defaults() {
        let mut env = store(&[
            (SANDBOX_MARKER_VAR, "AWS_Lambda_python3.12"),
            ("HOME", "/home/sbx_user1051"),
        ]);

        let report = configure_environment(&mut env);

        assert!(report.sandboxed);
        assert_eq!(report.applied.len(), 1 + REDIRECTED_DIRS.len());
        assert_eq!(env["HOME"], "/tmp");
        for (key, default) in REDIRECTED_DIRS {
            assert_eq!(env[key], default, "{key}");
        }
    }

    #[test]
    fn test_sandbox_preserves_operator_overrides() {
        let mut env = store(&[
            (SANDBOX_MARKER_VAR, "AWS_Lambda_provided.al2023"),
            ("HF_HOME", "/mnt/efs/huggingface"),
            ("MPLCONFIGDIR", "/opt/mpl"),
        ]);

        let report = configure_environment(&mut env);

        assert_eq!(env["HF_HOME"], "/mnt/efs/huggingface");
        assert_eq!(env["MPLCONFIGDIR"], "/opt/mpl");
        assert_eq!(env["HF_HUB_CACHE"], "/tmp/.cache/huggingface");
        assert!(!report.applied.contains(&"HF_HOME"));
        assert!(!report.applied.contains(&"MPLCONFIGDIR"));
    }

    #[test]
    fn test_configure_is_idempotent() {
        let mut env = store(&[(SANDBOX_MARKER_VAR, "AWS_Lambda_rust")]);

        configure_environment(&mut env);
        let first = env.clone();
        let second_report = configure_environment(&mut env);

        assert_eq!(env, first);
        assert_eq!(second_report.applied, vec!["HOME"]);
    }
}
