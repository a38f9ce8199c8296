//! Handler configuration and per-request option resolution
//!
//! Every conversion option is resolved independently, per request, from three
//! tiers: the event, the environment defaults captured at startup, and the
//! hard-coded defaults below.

use crate::handler::RequestOptions;
use serde_json::Value;
use std::path::PathBuf;

/// Model used when neither the event nor `COMMONFORMS_MODEL` names one
pub const DEFAULT_MODEL: &str = "FFDNET-L";
/// Text default for `COMMONFORMS_FAST`
pub const DEFAULT_FAST: &str = "true";
pub const DEFAULT_DEVICE: &str = "cpu";
pub const DEFAULT_CONFIDENCE: f64 = 0.6;
pub const DEFAULT_KEEP_EXISTING_FIELDS: bool = true;

pub const MODEL_VAR: &str = "COMMONFORMS_MODEL";
pub const FAST_VAR: &str = "COMMONFORMS_FAST";
pub const DEVICE_VAR: &str = "COMMONFORMS_DEVICE";
pub const WORK_DIR_VAR: &str = "COMMONFORMS_WORK_DIR";

/// Parse a boolean flag from text. Only `1`, `true`, `yes` and `y` are true,
/// ignoring ASCII case; anything else, including the empty string, is false.
pub fn parse_truthy(text: &str) -> bool {
    matches!(
        text.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

/// Truthiness of a boolean-like event value. Any non-empty string is true;
/// token parsing applies to the environment text only.
fn value_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Raw environment defaults captured once at startup.
///
/// Values are kept as text so the environment tier is applied per request with
/// the same rules as before the defaults were captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDefaults {
    pub model: Option<String>,
    pub fast: Option<String>,
    pub device: Option<String>,
}

impl EnvDefaults {
    /// Capture defaults from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Capture defaults through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            model: lookup(MODEL_VAR),
            fast: lookup(FAST_VAR),
            device: lookup(DEVICE_VAR),
        }
    }
}

/// Configuration for the request handler
#[derive(Debug, Clone, Default)]
pub struct HandlerConfig {
    /// Environment tier of option resolution
    pub env: EnvDefaults,
    /// Parent directory for per-invocation work directories.
    /// `None` uses the system temp directory.
    pub work_root: Option<PathBuf>,
}

impl HandlerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            env: EnvDefaults::from_lookup(&lookup),
            work_root: lookup(WORK_DIR_VAR)
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Fully resolved options handed to the conversion routine
#[derive(Debug, Clone, PartialEq)]
pub struct FormOptions {
    pub model_or_path: String,
    pub fast: bool,
    pub device: String,
    pub keep_existing_fields: bool,
    pub confidence: f64,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            model_or_path: DEFAULT_MODEL.to_string(),
            fast: parse_truthy(DEFAULT_FAST),
            device: DEFAULT_DEVICE.to_string(),
            keep_existing_fields: DEFAULT_KEEP_EXISTING_FIELDS,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl FormOptions {
    /// Merge event values over environment defaults over built-in defaults.
    ///
    /// An empty model name in the event or environment falls through to the
    /// next tier. `device` has no event override, and `keep_existing_fields`
    /// and `confidence` have no environment tier.
    pub fn resolve(event: &RequestOptions, env: &EnvDefaults) -> Self {
        let model_or_path = [event.model_or_path.as_deref(), env.model.as_deref()]
            .into_iter()
            .flatten()
            .find(|model| !model.is_empty())
            .unwrap_or(DEFAULT_MODEL)
            .to_string();

        let fast = match &event.fast {
            Some(value) => value_truthy(value),
            None => parse_truthy(env.fast.as_deref().unwrap_or(DEFAULT_FAST)),
        };

        let device = env
            .device
            .clone()
            .unwrap_or_else(|| DEFAULT_DEVICE.to_string());

        Self {
            model_or_path,
            fast,
            device,
            keep_existing_fields: event
                .keep_existing_fields
                .unwrap_or(DEFAULT_KEEP_EXISTING_FIELDS),
            confidence: event.confidence.unwrap_or(DEFAULT_CONFIDENCE),
        }
    }
}
