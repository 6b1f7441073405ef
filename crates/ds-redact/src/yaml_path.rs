//! Structured-path redaction over YAML documents.

use crate::engine::{Redactor, MASK_TEXT};
use crate::ledger;
use crate::pipe::{pipe, PipeWriter};
use crate::redaction::Redaction;
use globset::GlobMatcher;
use serde::Deserialize;
use serde_yaml::Value;
use std::io::{self, Read, Write};
use std::thread;

/// Rewrites scalar values at a wildcard-aware dotted path.
///
/// The input is parsed as one or more YAML documents; each path segment is
/// either a literal mapping key or `*`, which matches every key at that
/// level including sequence indices. Every scalar reached at the end of
/// the path is replaced with the mask token, then the documents are
/// re-serialized. Unmatched paths are a no-op.
///
/// A redactor constructed with a file glob only applies when the glob
/// matches the stream's path; otherwise the input passes through untouched.
#[derive(Debug, Clone)]
pub struct YamlRedactor {
    mask_path: Vec<String>,
    file_glob: Option<GlobMatcher>,
    file_path: String,
    redact_name: String,
    is_default: bool,
}

impl YamlRedactor {
    /// Build from a dotted path such as `*.spec.kubernetes.bootstrapToken`.
    pub fn new(
        yaml_path: &str,
        file_glob: Option<GlobMatcher>,
        path: impl Into<String>,
        name: impl Into<String>,
        is_default: bool,
    ) -> Self {
        Self::from_segments(
            yaml_path.split('.').map(str::to_string).collect(),
            file_glob,
            path,
            name,
            is_default,
        )
    }

    /// Build from explicit segments, for keys that themselves contain dots.
    pub fn from_segments(
        mask_path: Vec<String>,
        file_glob: Option<GlobMatcher>,
        path: impl Into<String>,
        name: impl Into<String>,
        is_default: bool,
    ) -> Self {
        Self {
            mask_path,
            file_glob,
            file_path: path.into(),
            redact_name: name.into(),
            is_default,
        }
    }

    fn run(&self, mut input: Box<dyn Read + Send>, writer: &mut PipeWriter) -> io::Result<()> {
        let mut buf = Vec::new();
        input.read_to_end(&mut buf)?;
        if buf.is_empty() {
            return Ok(());
        }

        let mut documents = Vec::new();
        for de in serde_yaml::Deserializer::from_slice(&buf) {
            let value = Value::deserialize(de)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            documents.push(value);
        }

        let mut rewritten = 0usize;
        for doc in &mut documents {
            rewritten += mask_scalars(doc, &self.mask_path);
        }

        for (i, doc) in documents.iter().enumerate() {
            if i > 0 {
                writer.write_all(b"---\n")?;
            }
            let text = serde_yaml::to_string(doc)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writer.write_all(text.as_bytes())?;
        }

        // one entry per rewritten leaf; document positions are lost after
        // parsing, so the line number is recorded as 0
        for _ in 0..rewritten {
            ledger::global().record(Redaction {
                redactor_name: self.redact_name.clone(),
                characters_removed: 0,
                line: 0,
                file: self.file_path.clone(),
                is_default_redactor: self.is_default,
            });
        }
        Ok(())
    }
}

impl Redactor for YamlRedactor {
    fn redact(&self, input: Box<dyn Read + Send>) -> Box<dyn Read + Send> {
        if let Some(glob) = &self.file_glob {
            if !glob.is_match(self.file_path.as_str()) {
                return input;
            }
        }
        let (reader, mut writer) = pipe();
        let stage = self.clone();
        thread::spawn(move || {
            let result = stage.run(input, &mut writer);
            writer.close(result.err());
        });
        Box::new(reader)
    }
}

fn mask_scalars(node: &mut Value, path: &[String]) -> usize {
    match path.split_first() {
        None => match node {
            Value::String(s) if s == MASK_TEXT => 0,
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                *node = Value::String(MASK_TEXT.to_string());
                1
            }
            _ => 0,
        },
        Some((segment, rest)) => {
            if segment == "*" {
                match node {
                    Value::Mapping(map) => {
                        map.values_mut().map(|v| mask_scalars(v, rest)).sum()
                    }
                    Value::Sequence(seq) => {
                        seq.iter_mut().map(|v| mask_scalars(v, rest)).sum()
                    }
                    _ => 0,
                }
            } else {
                match node {
                    Value::Mapping(map) => map
                        .get_mut(segment.as_str())
                        .map_or(0, |v| mask_scalars(v, rest)),
                    _ => 0,
                }
            }
        }
    }
}
