//! Request payload decoding and transient file management

pub mod resolver;
pub mod workdir;

pub use resolver::{encode_base64, resolve_base64};
pub use workdir::{WorkDir, INPUT_FILE_NAME, OUTPUT_FILE_NAME, WORK_DIR_PREFIX};
