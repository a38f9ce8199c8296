//! Form preparation layer
//!
//! The field detection model is not part of this crate. It is reached through
//! [`FormPreparer`]; production uses the `commonforms` command line via
//! [`CommandPreparer`].

mod command;

pub use command::{CommandPreparer, COMMAND_VAR, DEFAULT_COMMAND};

use crate::config::FormOptions;
use crate::error::Result;
use std::path::Path;

/// Detects form fields in `input` and writes a fillable PDF to `output`.
///
/// Implementations block until the output is written or the routine fails.
pub trait FormPreparer: Send + Sync {
    fn prepare_form(&self, input: &Path, output: &Path, options: &FormOptions) -> Result<()>;
}

/// [`FormPreparer`] backed by a closure, for in-process routines
pub struct FnPreparer<F>(F);

/// Wrap a closure as a [`FormPreparer`]
pub fn preparer_fn<F>(f: F) -> FnPreparer<F>
where
    F: Fn(&Path, &Path, &FormOptions) -> Result<()> + Send + Sync,
{
    FnPreparer(f)
}

impl<F> FormPreparer for FnPreparer<F>
where
    F: Fn(&Path, &Path, &FormOptions) -> Result<()> + Send + Sync,
{
    fn prepare_form(&self, input: &Path, output: &Path, options: &FormOptions) -> Result<()> {
        (self.0)(input, output, options)
    }
}
