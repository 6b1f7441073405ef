//! Two-line windowed redaction.
//!
//! Secrets frequently appear as key/value pairs split across adjacent
//! lines (the multi-line JSON rendering of environment variables, Ceph
//! auth listings). The selector regex identifies the key line; when it
//! matches, the following value line is rewritten by the redactor regex.
//! The pair is consumed atomically so the redactor regex can never match a
//! subsequent key line.

use crate::engine::Redactor;
use crate::ledger;
use crate::line_reader::LineReader;
use crate::pipe::{pipe, PipeWriter};
use crate::redaction::Redaction;
use crate::template::replacement_pattern;
use regex::bytes::Regex;
use std::io::{Read, Write};
use std::thread;

/// Rewrites line *N+1* whenever line *N* matches a selector regex.
#[derive(Debug, Clone)]
pub struct MultiLineRedactor {
    selector: Regex,
    redactor: Regex,
    mask_text: String,
    file_path: String,
    redact_name: String,
    is_default: bool,
}

impl MultiLineRedactor {
    pub fn new(
        selector: Regex,
        redactor: Regex,
        mask_text: impl Into<String>,
        path: impl Into<String>,
        name: impl Into<String>,
        is_default: bool,
    ) -> Self {
        Self {
            selector,
            redactor,
            mask_text: mask_text.into(),
            file_path: path.into(),
            redact_name: name.into(),
            is_default,
        }
    }

    fn run(&self, input: Box<dyn Read + Send>, writer: &mut PipeWriter) -> std::io::Result<()> {
        let subst = replacement_pattern(&self.redactor, &self.mask_text);
        let mut lines = LineReader::new(input);

        let first = lines.read_line()?;
        let second = match first {
            Some(_) => lines.read_line()?,
            None => None,
        };
        let (mut line1, mut line2) = match (first, second) {
            (Some(l1), Some(l2)) => (l1, l2),
            (l1, l2) => {
                // The initial window could not be filled. Emit whatever was
                // read, which prints two blank lines for empty input.
                writer.write_all(&l1.unwrap_or_default())?;
                writer.write_all(b"\n")?;
                writer.write_all(&l2.unwrap_or_default())?;
                writer.write_all(b"\n")?;
                return Ok(());
            }
        };

        // line1 sits at this physical line number; line2 at line_num + 1
        let mut line_num = 1usize;
        let mut flush_last = false;

        loop {
            if !self.selector.is_match(&line1) {
                writer.write_all(&line1)?;
                writer.write_all(b"\n")?;
                flush_last = true;
                match lines.read_line()? {
                    Some(next) => {
                        line1 = std::mem::replace(&mut line2, next);
                        line_num += 1;
                        continue;
                    }
                    None => {
                        line1 = line2;
                        break;
                    }
                }
            }
            flush_last = false;

            let clean = self.redactor.replace_all(&line2, subst.as_slice());
            writer.write_all(&line1)?;
            writer.write_all(b"\n")?;
            writer.write_all(&clean)?;
            writer.write_all(b"\n")?;

            if clean.as_ref() != line2.as_slice() {
                ledger::global().record(Redaction {
                    redactor_name: self.redact_name.clone(),
                    characters_removed: line2.len() as i64 - clean.len() as i64,
                    line: line_num + 1,
                    file: self.file_path.clone(),
                    is_default_redactor: self.is_default,
                });
            }

            // the selector/value pair is consumed together
            match lines.read_line()? {
                Some(l1) => match lines.read_line()? {
                    Some(l2) => {
                        line1 = l1;
                        line2 = l2;
                        line_num += 2;
                    }
                    None => break,
                },
                None => break,
            }
        }

        if flush_last {
            writer.write_all(&line1)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl Redactor for MultiLineRedactor {
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
