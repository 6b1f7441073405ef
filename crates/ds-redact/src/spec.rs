//! Redaction specs supplied by collaborators.
//!
//! A [`RedactSpec`] names a set of removals (literal substrings, regexes,
//! YAML paths) and the bundle files they apply to. Specs arrive as JSON or
//! YAML with camelCase keys.

use globset::{Glob, GlobBuilder};
use serde::{Deserialize, Serialize};

/// One externally supplied redaction spec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedactSpec {
    /// Optional name used as the prefix of emitted redactor names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub file_selector: FileSelector,
    pub removals: Removals,
}

/// Which bundle files a spec applies to.
///
/// Globs are shell style with `/` as the path separator (a `*` does not
/// cross directories; `**` does). An empty selector matches every path;
/// otherwise any single matching glob admits the spec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

/// The removals a spec asks for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Removals {
    /// Literal substrings, masked case-sensitively wherever they appear.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    /// Regex removals; with a selector they become two-line redactors.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regex: Vec<RegexRemoval>,

    /// Dotted YAML paths, `*` wildcards allowed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub yaml_path: Vec<String>,
}

/// A single regex removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegexRemoval {
    /// When present, the pattern matched against line *N* to decide
    /// whether `redactor` rewrites line *N+1*.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub selector: Option<String>,

    pub redactor: String,
}

impl FileSelector {
    /// Whether this selector admits `path`.
    pub fn matches(&self, path: &str) -> Result<bool, globset::Error> {
        if self.file.is_none() && self.files.is_empty() {
            return Ok(true);
        }
        for pattern in self.file.iter().chain(self.files.iter()) {
            if compile_glob(pattern)?.compile_matcher().is_match(path) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Shell-style glob with `/` as a literal separator.
pub(crate) fn compile_glob(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern).literal_separator(true).build()
}
