//! Lambda request handler
//!
//! One invocation: create a work directory, validate and decode the payload,
//! resolve options, run the conversion, encode the result, remove the work
//! directory. Every stage returns [`crate::error::Result`]; the error variant
//! decides between a 400 and a 500 envelope.

use crate::config::{FormOptions, HandlerConfig};
use crate::error::{Error, Result};
use crate::form::FormPreparer;
use crate::source::{encode_base64, resolve_base64, WorkDir};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message returned with every successful conversion
pub const SUCCESS_MESSAGE: &str = "PDF conversion successful";

// ============================================================================
// Event and response types
// ============================================================================

/// Optional conversion settings carried in the event. `pdf_base64` is
/// validated separately so a missing payload is reported even when these
/// fields are malformed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestOptions {
    /// Model identifier or path to model weights
    #[serde(default)]
    pub model_or_path: Option<String>,
    /// Boolean-like speed/quality switch
    #[serde(default)]
    pub fast: Option<Value>,
    /// Preserve form fields already present in the PDF (default: true).
    /// `null` counts as absent, like every option here.
    #[serde(default)]
    pub keep_existing_fields: Option<bool>,
    /// Detection confidence threshold (default: 0.6)
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Response envelope returned to the Lambda runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Success { pdf_base64: String, message: String },
    Failure { error: String },
}

impl ResponseEnvelope {
    pub fn success(pdf_base64: String) -> Self {
        Self {
            status_code: 200,
            body: ResponseBody::Success {
                pdf_base64,
                message: SUCCESS_MESSAGE.to_string(),
            },
        }
    }

    pub fn failure(error: &Error) -> Self {
        Self {
            status_code: error.status_code(),
            body: ResponseBody::Failure {
                error: error.client_message(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.body, ResponseBody::Success { .. })
    }
}

/// Platform metadata for one invocation. Only used to tag log output.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    pub request_id: String,
}

// ============================================================================
// Handler
// ============================================================================

/// Converts PDFs carried in Lambda events into fillable forms
pub struct FormHandler<P> {
    config: HandlerConfig,
    preparer: P,
}

impl<P: FormPreparer> FormHandler<P> {
    pub fn new(config: HandlerConfig, preparer: P) -> Self {
        Self { config, preparer }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Handle one event. Never fails; errors become failure envelopes.
    ///
    /// Blocks for the duration of the conversion.
    pub fn handle(&self, event: &Value, context: &InvocationContext) -> ResponseEnvelope {
        let span = tracing::info_span!("invocation", request_id = %context.request_id);
        let _enter = span.enter();

        let result = WorkDir::create(self.config.work_root.as_deref()).and_then(|work_dir| {
            let result = self.process(event, &work_dir);
            work_dir.release();
            result
        });

        match result {
            Ok(pdf_base64) => {
                tracing::info!(encoded_len = pdf_base64.len(), "Conversion succeeded");
                ResponseEnvelope::success(pdf_base64)
            }
            Err(e) => {
                log_failure(&e);
                ResponseEnvelope::failure(&e)
            }
        }
    }

    fn process(&self, event: &Value, work_dir: &WorkDir) -> Result<String> {
        let payload = require_payload(event)?;

        let pdf = resolve_base64(payload)?;
        work_dir.write_input(&pdf)?;

        let options = parse_options(event)?;
        let options = FormOptions::resolve(&options, &self.config.env);
        tracing::info!(
            input_bytes = pdf.len(),
            model = %options.model_or_path,
            fast = options.fast,
            device = %options.device,
            keep_existing_fields = options.keep_existing_fields,
            confidence = options.confidence,
            "Preparing form"
        );

        self.preparer
            .prepare_form(work_dir.input_path(), work_dir.output_path(), &options)?;

        let output = work_dir.read_output()?;
        Ok(encode_base64(&output))
    }
}

/// Extract the required `pdf_base64` field.
///
/// Absent, `null` and empty values are caller errors; a non-object event or a
/// non-string payload is an internal error.
fn require_payload(event: &Value) -> Result<&str> {
    let object = event.as_object().ok_or_else(|| Error::InvalidEvent {
        reason: "event must be a JSON object".to_string(),
    })?;

    match object.get("pdf_base64") {
        None | Some(Value::Null) => Err(Error::MissingInput),
        Some(Value::String(s)) if s.is_empty() => Err(Error::MissingInput),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(Error::InvalidEvent {
            reason: "pdf_base64 must be a string".to_string(),
        }),
    }
}

fn parse_options(event: &Value) -> Result<RequestOptions> {
    RequestOptions::deserialize(event).map_err(|e| Error::InvalidEvent {
        reason: e.to_string(),
    })
}

/// Caller errors are routine; internal errors get the full source chain.
fn log_failure(error: &Error) {
    if error.status_code() < 500 {
        tracing::warn!(error = %error, "Rejected request");
        return;
    }

    let mut chain = Vec::new();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = std::error::Error::source(cause);
    }
    tracing::error!(error = %error, detail = ?error, ?chain, "Conversion failed");
}
