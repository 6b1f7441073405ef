//! Redaction records and the indexed list they are collected into.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single recorded redaction.
///
/// Emitted by a redactor whenever a rewrite changed a line, and only then.
/// `characters_removed` is the byte-length difference between the original
/// and the rewritten line; it is negative when the mask is longer than the
/// text it replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redaction {
    pub redactor_name: String,
    pub characters_removed: i64,
    /// 1-based physical line number in the stage's input, `0` when the
    /// stage cannot attribute a line (YAML-path rewrites).
    pub line: usize,
    pub file: String,
    pub is_default_redactor: bool,
}

/// Redactions indexed both by the file affected and by the redactor name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionList {
    pub by_redactor: BTreeMap<String, Vec<Redaction>>,
    pub by_file: BTreeMap<String, Vec<Redaction>>,
}

impl RedactionList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of recorded redactions.
    pub fn len(&self) -> usize {
        self.by_redactor.values().map(Vec::len).sum()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.by_redactor.is_empty()
    }
}
