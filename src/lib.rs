//! commonforms Lambda Library
//!
//! AWS Lambda handler that turns a base64-encoded PDF into a fillable form:
//! - `environment`: redirects cache/config directories inside the Lambda sandbox
//! - `handler`: per-invocation lifecycle and response envelopes
//! - `config`: option resolution (event, then environment, then defaults)
//! - `form`: the conversion routine seam and its command-line implementation
//! - `source`: payload decoding and the per-invocation work directory

pub mod config;
pub mod environment;
pub mod error;
pub mod form;
pub mod handler;
pub mod source;

pub use config::{EnvDefaults, FormOptions, HandlerConfig};
pub use environment::{configure_runtime_environment, RuntimeEnvironment};
pub use error::{Error, Result};
pub use form::{preparer_fn, CommandPreparer, FormPreparer};
pub use handler::{FormHandler, InvocationContext, ResponseBody, ResponseEnvelope};
