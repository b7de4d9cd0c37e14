//! Doc id grammar: `work_abbrev "_" locator ["_" | "^" | ":" annotations]`.
//!
//! Ids produced by resizing or merging segments carry extra locators and
//! annotations after the first one, e.g. `PDhS_175,1_175,4` spans two
//! original locators. Only the work and the first original locator matter
//! for identifying where a document comes from.

use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LOCATOR: Regex = Regex::new(r"[^_^:]+").expect("valid regex");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocId<'a> {
    pub work_abbrev: &'a str,
    /// First original locator within the work.
    pub locator: &'a str,
}

/// Split a doc id into its work abbreviation and first original locator.
///
/// The work is everything before the first `_`; the locator is the first run
/// of characters after it that contains none of `_`, `^`, `:`.
pub fn parse_doc_id(doc_id: &str) -> Result<ParsedDocId<'_>> {
    let (work_abbrev, rest) = doc_id
        .split_once('_')
        .ok_or_else(|| Error::MalformedDocId(format!("{doc_id}: missing '_' separator")))?;
    let locator = LOCATOR
        .find(rest)
        .ok_or_else(|| Error::MalformedDocId(format!("{doc_id}: missing locator")))?
        .as_str();
    Ok(ParsedDocId { work_abbrev, locator })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_merged_span() {
        let p = parse_doc_id("PDhS_175,1_175,4").unwrap();
        assert_eq!(p.work_abbrev, "PDhS");
        assert_eq!(p.locator, "175,1");
    }

    #[test]
    fn stops_at_annotations() {
        assert_eq!(parse_doc_id("NBh_0408,i^2").unwrap().locator, "0408,i");
        assert_eq!(parse_doc_id("PV_3.12:resized").unwrap().locator, "3.12");
        assert_eq!(parse_doc_id("NS_2.1.1").unwrap().locator, "2.1.1");
    }

    #[test]
    fn keeps_unicode_work_names() {
        let p = parse_doc_id("ŚV_pratyakṣa.4").unwrap();
        assert_eq!(p.work_abbrev, "ŚV");
        assert_eq!(p.locator, "pratyakṣa.4");
    }

    #[test]
    fn missing_separator_is_malformed() {
        assert!(matches!(parse_doc_id("PDhS175"), Err(Error::MalformedDocId(_))));
    }

    #[test]
    fn missing_locator_is_malformed() {
        assert!(matches!(parse_doc_id("PDhS_^:"), Err(Error::MalformedDocId(_))));
        assert!(matches!(parse_doc_id("PDhS_"), Err(Error::MalformedDocId(_))));
    }
}
