//! Streaming redaction engine for diagnostic support bundles.
//!
//! Files collected into a support bundle (logs, manifests, configuration
//! dumps, JSON/YAML blobs) routinely embed credentials. This crate rewrites
//! them on the way into the bundle: an ordered chain of redactors streams
//! the file, each stage replacing matching content with the `***HIDDEN***`
//! mask token and recording what it changed in a process-wide ledger.
//!
//! # Key Features
//!
//! - **Chainable streaming stages**: each redactor consumes the previous
//!   stage's output through a bounded pipe, so arbitrarily large files are
//!   processed with back-pressure and without buffering more than a window
//!   of lines (YAML-path stages excepted).
//! - **Three matcher families**: single-line regexes, two-line
//!   selector/redactor pairs for key/value secrets split across adjacent
//!   lines, and wildcard-aware dotted paths over YAML documents.
//! - **Capture-group replacement language**: groups named `mask` are
//!   replaced with the mask token, groups named `drop` are deleted, all
//!   other groups are preserved.
//! - **Auditable**: every changed line lands in the [`RedactionLedger`],
//!   indexed by redactor name and by file path.
//!
//! # Example
//!
//! ```no_run
//! use std::io::Read;
//!
//! let input = std::fs::File::open("bundle/logs/app.log").unwrap();
//! let mut redacted = ds_redact::redact(input, "logs/app.log", &[]).unwrap();
//!
//! let mut out = String::new();
//! redacted.read_to_string(&mut out).unwrap();
//! assert!(!out.contains("hunter2"));
//!
//! let report = ds_redact::redaction_list();
//! println!("{} redactions", report.len());
//! ```

pub mod builtin;
pub mod chain;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod line_reader;
pub mod multi_line;
pub mod redaction;
pub mod single_line;
pub mod spec;
pub mod template;
pub mod yaml_path;

mod pipe;

pub use chain::build_redactors;
pub use engine::{redact, Redactor, MASK_TEXT};
pub use error::{RedactError, Result};
pub use ledger::RedactionLedger;
pub use line_reader::LineReader;
pub use multi_line::MultiLineRedactor;
pub use redaction::{Redaction, RedactionList};
pub use single_line::SingleLineRedactor;
pub use spec::{FileSelector, RedactSpec, RegexRemoval, Removals};
pub use yaml_path::YamlRedactor;

/// Drain-and-copy snapshot of everything redacted since the last reset.
pub fn redaction_list() -> RedactionList {
    ledger::global().snapshot()
}

/// Clear the process-wide ledger.
///
/// Callers must ensure no redaction streams are still being consumed.
pub fn reset_redaction_list() {
    ledger::global().reset()
}
