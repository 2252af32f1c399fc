//! Date/time converter
//!
//! Typed records carry `chrono::DateTime<Utc>`, which serde renders as
//! RFC 3339. This converter stores those values in a configured `strftime`
//! pattern instead and restores RFC 3339 before typed binding.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use super::converter::Converter;
use super::errors::{CodecError, CodecResult};
use crate::document::Document;

const NAME: &str = "datetime";

/// Converts timestamps between RFC 3339 and a configured pattern.
///
/// Patterns without an offset specifier are read as UTC. A date-only
/// pattern is read as midnight UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeConverter {
    pattern: String,
}

impl DateTimeConverter {
    /// Accepts any pattern; an invalid one fails on first use.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Rejects patterns chrono cannot render.
    pub fn try_new(pattern: impl Into<String>) -> CodecResult<Self> {
        let pattern = pattern.into();
        if pattern.trim().is_empty()
            || StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error))
        {
            return Err(CodecError::conversion(NAME, pattern, "not a valid strftime pattern"));
        }
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn format(&self, at: &DateTime<Utc>) -> CodecResult<String> {
        let mut out = String::new();
        write!(out, "{}", at.format(&self.pattern)).map_err(|_| {
            CodecError::conversion(NAME, at.to_rfc3339(), format!("invalid pattern '{}'", self.pattern))
        })?;
        Ok(out)
    }

    pub fn parse(&self, text: &str) -> CodecResult<DateTime<Utc>> {
        if let Ok(at) = DateTime::parse_from_str(text, &self.pattern) {
            return Ok(at.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, &self.pattern) {
            return Ok(naive.and_utc());
        }
        if let Some(naive) = NaiveDate::parse_from_str(text, &self.pattern)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(naive.and_utc());
        }
        // Values written before the pattern was configured
        DateTime::parse_from_rfc3339(text)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|_| {
                CodecError::conversion(NAME, text, format!("does not match pattern '{}'", self.pattern))
            })
    }
}

impl Converter for DateTimeConverter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn encode(&self, node: &mut Document) -> CodecResult<()> {
        if let Document::String(text) = node {
            let at = DateTime::parse_from_rfc3339(text)
                .map_err(|e| CodecError::conversion(NAME, text.clone(), e.to_string()))?;
            *text = self.format(&at.with_timezone(&Utc))?;
        }
        Ok(())
    }

    fn decode(&self, node: &mut Document) -> CodecResult<()> {
        if let Document::String(text) = node {
            let at = self.parse(text)?;
            *text = at.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_encode_uses_pattern() {
        let conv = DateTimeConverter::new("%Y-%m-%d %H:%M:%S");
        let mut node = Document::from("2024-03-01T10:20:30Z");
        conv.encode(&mut node).unwrap();
        assert_eq!(node.as_str(), Some("2024-03-01 10:20:30"));
    }

    #[test]
    fn test_decode_restores_rfc3339() {
        let conv = DateTimeConverter::new("%Y-%m-%d %H:%M:%S");
        let mut node = Document::from("2024-03-01 10:20:30");
        conv.decode(&mut node).unwrap();
        assert_eq!(node.as_str(), Some("2024-03-01T10:20:30Z"));
    }

    #[test]
    fn test_decode_accepts_legacy_rfc3339() {
        let conv = DateTimeConverter::new("%d/%m/%Y %H:%M");
        let mut node = Document::from("2024-03-01T10:20:00+00:00");
        conv.decode(&mut node).unwrap();
        assert_eq!(node.as_str(), Some("2024-03-01T10:20:00Z"));
    }

    #[test]
    fn test_date_only_pattern() {
        let conv = DateTimeConverter::new("%Y-%m-%d");
        let parsed = conv.parse("2023-12-25").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_offset_pattern() {
        let conv = DateTimeConverter::new("%Y-%m-%d %H:%M:%S %z");
        let parsed = conv.parse("2024-01-01 12:00:00 +0200").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_garbage_rejected() {
        let conv = DateTimeConverter::new("%Y-%m-%d");
        let mut node = Document::from("next tuesday");
        assert!(matches!(
            conv.decode(&mut node),
            Err(CodecError::Conversion { converter: "datetime", .. })
        ));
    }

    #[test]
    fn test_invalid_pattern_fails_encode() {
        let conv = DateTimeConverter::new("%Y-%Q");
        let mut node = Document::from("2024-03-01T10:20:30Z");
        assert!(matches!(
            conv.encode(&mut node),
            Err(CodecError::Conversion { converter: "datetime", .. })
        ));
        assert_eq!(node.as_str(), Some("2024-03-01T10:20:30Z"));
    }

    #[test]
    fn test_try_new_validates_pattern() {
        assert!(DateTimeConverter::try_new("%d.%m.%Y").is_ok());
        assert!(DateTimeConverter::try_new("%Q").is_err());
        assert!(DateTimeConverter::try_new("  ").is_err());
    }

    #[test]
    fn test_non_strings_ignored() {
        let conv = DateTimeConverter::new("%Y");
        let mut node = Document::Null;
        conv.encode(&mut node).unwrap();
        conv.decode(&mut node).unwrap();
        assert!(node.is_null());
    }
}
