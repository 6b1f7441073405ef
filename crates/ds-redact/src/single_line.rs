//! Line-by-line regex redaction.

use crate::engine::Redactor;
use crate::ledger;
use crate::line_reader::LineReader;
use crate::pipe::{pipe, PipeWriter};
use crate::redaction::Redaction;
use crate::template::replacement_pattern;
use regex::bytes::Regex;
use std::io::{Read, Write};
use std::thread;

/// Replaces every non-overlapping match of one regex, line by line.
///
/// Every input line produces exactly one output line terminated by `\n`;
/// lines without a match pass through byte-identical.
#[derive(Debug, Clone)]
pub struct SingleLineRedactor {
    re: Regex,
    mask_text: String,
    file_path: String,
    redact_name: String,
    is_default: bool,
}

impl SingleLineRedactor {
    pub fn new(
        re: Regex,
        mask_text: impl Into<String>,
        path: impl Into<String>,
        name: impl Into<String>,
        is_default: bool,
    ) -> Self {
        Self {
            re,
            mask_text: mask_text.into(),
            file_path: path.into(),
            redact_name: name.into(),
            is_default,
        }
    }

    fn run(&self, input: Box<dyn Read + Send>, writer: &mut PipeWriter) -> std::io::Result<()> {
        let subst = replacement_pattern(&self.re, &self.mask_text);
        let mut lines = LineReader::new(input);
        let mut line_num = 0usize;

        while let Some(line) = lines.read_line()? {
            line_num += 1;

            if !self.re.is_match(&line) {
                writer.write_all(&line)?;
                writer.write_all(b"\n")?;
                continue;
            }

            let clean = self.re.replace_all(&line, subst.as_slice());
            writer.write_all(&clean)?;
            writer.write_all(b"\n")?;

            if clean.as_ref() != line.as_slice() {
                ledger::global().record(Redaction {
                    redactor_name: self.redact_name.clone(),
                    characters_removed: line.len() as i64 - clean.len() as i64,
                    line: line_num,
                    file: self.file_path.clone(),
                    is_default_redactor: self.is_default,
                });
            }
        }
        Ok(())
    }
}

impl Redactor for SingleLineRedactor {
    fn redact(&self, input: Box<dyn Read + Send>) -> Box<dyn Read + Send> {
        let (reader, mut writer) = pipe();
        let stage = self.clone();
        thread::spawn(move || {
            let result = stage.run(input, &mut writer);
            writer.close(result.err());
        });
        Box::new(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MASK_TEXT;
    use std::io::Cursor;

    fn apply(redactor: &SingleLineRedactor, input: &str) -> String {
        let mut out = String::new();
        redactor
            .redact(Box::new(Cursor::new(input.to_string())))
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    fn redactor(pattern: &str, path: &str) -> SingleLineRedactor {
        SingleLineRedactor::new(
            Regex::new(pattern).unwrap(),
            MASK_TEXT,
            path,
            "single line test",
            false,
        )
    }

    #[test]
    fn test_masks_matching_lines() {
        let r = redactor(r#"(password=)(?P<mask>\w+)"#, "single-mask.log");
        assert_eq!(
            apply(&r, "password=hunter2\nno secrets here\n"),
            "password=***HIDDEN***\nno secrets here\n"
        );
    }

    #[test]
    fn test_preserves_line_count_and_non_matches() {
        let r = redactor(r#"(token=)(?P<mask>\w+)"#, "single-count.log");
        let out = apply(&r, "a\nb\nc");
        assert_eq!(out, "a\nb\nc\n");
    }

    #[test]
    fn test_ledger_entry_per_changed_line() {
        let r = redactor(r#"(key=)(?P<mask>\w+)"#, "single-ledger.log");
        apply(&r, "key=abcdef\nplain\nkey=xy\n");

        let snap = ledger::global().snapshot();
        let entries = &snap.by_file["single-ledger.log"];
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].line, 1);
        assert_eq!(entries[0].characters_removed, 6 - 12);
        assert_eq!(entries[1].line, 3);
        assert_eq!(entries[1].redactor_name, "single line test");
        assert!(!entries[1].is_default_redactor);
    }

    #[test]
    fn test_match_that_rewrites_identically_records_nothing() {
        // the pattern matches but the rewrite reproduces the line
        let r = redactor(r#"(?P<keep>value=\w+)"#, "single-noop.log");
        assert_eq!(apply(&r, "value=abc\n"), "value=abc\n");
        let snap = ledger::global().snapshot();
        assert!(!snap.by_file.contains_key("single-noop.log"));
    }

    #[test]
    fn test_replaces_every_match_on_the_line() {
        let r = redactor(r#"(id=)(?P<mask>\w+)"#, "single-multi.log");
        assert_eq!(
            apply(&r, "id=a id=b id=c\n"),
            "id=***HIDDEN*** id=***HIDDEN*** id=***HIDDEN***\n"
        );
    }
}
