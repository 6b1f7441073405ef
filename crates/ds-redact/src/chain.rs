//! Assembles the ordered redactor chain for one bundle file.

use crate::builtin;
use crate::engine::{Redactor, MASK_TEXT};
use crate::error::{RedactError, Result};
use crate::multi_line::MultiLineRedactor;
use crate::single_line::SingleLineRedactor;
use crate::spec::RedactSpec;
use crate::yaml_path::YamlRedactor;
use regex::bytes::Regex;

/// Build the redactors to run against `path`, in order: the built-in
/// catalogue first, then each spec in `additional` whose file selector
/// admits the path (its literal removals, then regex removals, then YAML
/// paths). The order is deterministic for identical inputs.
pub fn build_redactors(
    path: &str,
    additional: &[RedactSpec],
) -> Result<Vec<Box<dyn Redactor>>> {
    let mut redactors = builtin::default_redactors(path);

    for (i, spec) in additional.iter().enumerate() {
        let admitted = spec
            .file_selector
            .matches(path)
            .map_err(|source| RedactError::FileGlob {
                spec: i,
                glob: source.glob().unwrap_or_default().to_string(),
                source,
            })?;
        if !admitted {
            continue;
        }
        let spec_name = spec.name.as_deref();

        for (j, literal) in spec.removals.values.iter().enumerate() {
            let pattern = format!("(?P<mask>{})", regex::escape(literal));
            let re = Regex::new(&pattern).map_err(|source| RedactError::Pattern {
                spec: i,
                field: "values",
                pattern: literal.clone(),
                source,
            })?;
            redactors.push(Box::new(SingleLineRedactor::new(
                re,
                MASK_TEXT,
                path,
                redactor_name(i, j, spec_name, "literal"),
                false,
            )));
        }

        for (j, removal) in spec.removals.regex.iter().enumerate() {
            match &removal.selector {
                Some(selector) => {
                    let re1 = Regex::new(selector).map_err(|source| RedactError::Pattern {
                        spec: i,
                        field: "selector",
                        pattern: selector.clone(),
                        source,
                    })?;
                    let re2 =
                        Regex::new(&removal.redactor).map_err(|source| RedactError::Pattern {
                            spec: i,
                            field: "redactor",
                            pattern: removal.redactor.clone(),
                            source,
                        })?;
                    redactors.push(Box::new(MultiLineRedactor::new(
                        re1,
                        re2,
                        MASK_TEXT,
                        path,
                        redactor_name(i, j, spec_name, "multiLine"),
                        false,
                    )));
                }
                None => {
                    let pattern = format!("(?i){}", removal.redactor);
                    let re = Regex::new(&pattern).map_err(|source| RedactError::Pattern {
                        spec: i,
                        field: "redactor",
                        pattern: removal.redactor.clone(),
                        source,
                    })?;
                    redactors.push(Box::new(SingleLineRedactor::new(
                        re,
                        MASK_TEXT,
                        path,
                        redactor_name(i, j, spec_name, "regex"),
                        false,
                    )));
                }
            }
        }

        for (j, yaml_path) in spec.removals.yaml_path.iter().enumerate() {
            redactors.push(Box::new(YamlRedactor::new(
                yaml_path,
                None,
                path,
                redactor_name(i, j, spec_name, "yaml"),
                false,
            )));
        }
    }

    Ok(redactors)
}

fn redactor_name(
    spec_idx: usize,
    removal_idx: usize,
    spec_name: Option<&str>,
    kind: &str,
) -> String {
    match spec_name {
        Some(name) if !name.is_empty() => format!("{}.{}.{}", name, kind, removal_idx),
        _ => format!("unnamed-{}.{}.{}", spec_idx, kind, removal_idx),
    }
}
