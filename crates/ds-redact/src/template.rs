//! Replacement template compilation.
//!
//! A redaction regex marks the text to hide with specially named capture
//! groups: a group named `mask` has its contents replaced by the mask
//! token, a group named `drop` has its contents deleted, every other group
//! is passed through by reference. The compiler walks the groups once and
//! emits a substitution template in the replacement syntax of the `regex`
//! crate, so `replace_all` with the template realizes the whole rewrite.
//!
//! The engine rejects duplicate group names, so patterns that need several
//! masked or dropped positions number them: `mask`, `mask2`, `mask3`, …
//! and `drop`, `drop2`, … are all reserved.

use regex::bytes::Regex;

/// Compile the substitution template for `re`.
///
/// Group 0 (the full match) is never referenced; text matched outside any
/// capture group is not carried into the replacement. References are
/// always braced (`${3}`, `${name}`) so adjacent literal text cannot
/// extend them.
pub fn replacement_pattern(re: &Regex, mask_text: &str) -> Vec<u8> {
    let mut subst = Vec::new();
    for (i, name) in re.capture_names().enumerate() {
        if i == 0 {
            continue;
        }
        match name {
            None => subst.extend_from_slice(format!("${{{}}}", i).as_bytes()),
            Some(name) if is_reserved(name, "mask") => {
                // `$` in the mask token must not start a group reference
                subst.extend_from_slice(mask_text.replace('$', "$$").as_bytes());
            }
            Some(name) if is_reserved(name, "drop") => {}
            Some(name) => subst.extend_from_slice(format!("${{{}}}", name).as_bytes()),
        }
    }
    subst
}

/// `mask`/`drop` with an optional decimal suffix.
fn is_reserved(name: &str, base: &str) -> bool {
    match name.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASK: &str = "***HIDDEN***";

    fn rewrite(pattern: &str, input: &str) -> String {
        let re = Regex::new(pattern).unwrap();
        let subst = replacement_pattern(&re, MASK);
        String::from_utf8(re.replace_all(input.as_bytes(), subst.as_slice()).into_owned())
            .unwrap()
    }

    #[test]
    fn test_unnamed_groups_become_positional_references() {
        let re = Regex::new(r"(a)(b)").unwrap();
        assert_eq!(replacement_pattern(&re, MASK), b"${1}${2}");
    }

    #[test]
    fn test_mask_group_emits_mask_text() {
        let re = Regex::new(r"(pw=)(?P<mask>\w+)").unwrap();
        assert_eq!(replacement_pattern(&re, MASK), b"${1}***HIDDEN***");
        assert_eq!(rewrite(r"(pw=)(?P<mask>\w+)", "pw=hunter2"), "pw=***HIDDEN***");
    }

    #[test]
    fn test_drop_group_deletes_contents() {
        assert_eq!(rewrite(r"(keep)(?P<drop>-gone)", "keep-gone"), "keep");
    }

    #[test]
    fn test_named_group_passes_through_by_reference() {
        assert_eq!(
            rewrite(r"(?P<mask>\w+)(?P<host>@\S+)", "alice@db.internal"),
            "***HIDDEN***@db.internal"
        );
    }

    #[test]
    fn test_numbered_reserved_names() {
        assert_eq!(
            rewrite(r"(?P<mask>\w+):(?P<mask2>\w+)(?P<drop2>!)", "user:pass!"),
            "***HIDDEN***:***HIDDEN***"
        );
    }

    #[test]
    fn test_mask_prefixed_names_are_not_reserved() {
        let re = Regex::new(r"(?P<mask_value>x)").unwrap();
        assert_eq!(replacement_pattern(&re, MASK), b"${mask_value}");
    }

    #[test]
    fn test_dollar_in_mask_text_is_literal() {
        let re = Regex::new(r"(?P<mask>\w+)(!)").unwrap();
        let subst = replacement_pattern(&re, "$1cash");
        assert_eq!(
            re.replace_all(b"secret!", subst.as_slice()).into_owned(),
            b"$1cash!".to_vec()
        );
    }

    #[test]
    fn test_unmatched_optional_group_expands_empty() {
        assert_eq!(rewrite(r"(host)(?P<port>:\d+)?(/)", "host/"), "host/");
        assert_eq!(rewrite(r"(host)(?P<port>:\d+)?(/)", "host:8080/"), "host:8080/");
    }

    #[test]
    fn test_replaces_every_non_overlapping_match() {
        assert_eq!(
            rewrite(r"(k=)(?P<mask>\w+)", "k=a k=b"),
            "k=***HIDDEN*** k=***HIDDEN***"
        );
    }
}
