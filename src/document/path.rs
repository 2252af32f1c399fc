//! Field paths relative to a single record document
//!
//! Syntax:
//! - `""` or `$` addresses the record itself
//! - `a.b` descends through mapping fields
//! - `tags[]` descends into every element of the `tags` sequence
//! - a bare `[]` segment descends into every element of the current node

use std::fmt;

use super::errors::{DocumentError, DocumentResult};
use super::value::Document;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Each,
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPath {
    raw: String,
    segments: Vec<Segment>,
}

impl DocumentPath {
    /// The path addressing the record root.
    pub fn root() -> Self {
        Self {
            raw: String::new(),
            segments: Vec::new(),
        }
    }

    pub fn parse(raw: &str) -> DocumentResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "$" {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for part in trimmed.split('.') {
            let mut name = part;
            let mut each = 0;
            while let Some(stripped) = name.strip_suffix("[]") {
                name = stripped;
                each += 1;
            }
            if name.contains('[') || name.contains(']') {
                return Err(DocumentError::invalid_path(raw, "brackets must be written as '[]'"));
            }
            if name.is_empty() && each == 0 {
                return Err(DocumentError::invalid_path(raw, "empty segment"));
            }
            if !name.is_empty() {
                segments.push(Segment::Field(name.to_string()));
            }
            segments.extend(std::iter::repeat(Segment::Each).take(each));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Applies `f` to every node this path resolves to.
    ///
    /// Absent fields and shape mismatches along the way are skipped; a path
    /// that matches nothing is not an error.
    pub fn visit_mut<E, F>(&self, doc: &mut Document, f: &mut F) -> Result<(), E>
    where
        F: FnMut(&mut Document) -> Result<(), E>,
    {
        visit(&self.segments, doc, f)
    }
}

fn visit<E, F>(segments: &[Segment], doc: &mut Document, f: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Document) -> Result<(), E>,
{
    let Some((head, rest)) = segments.split_first() else {
        return f(doc);
    };

    match head {
        Segment::Field(name) => match doc.as_mapping_mut().and_then(|m| m.get_mut(name)) {
            Some(child) => visit(rest, child, f),
            None => Ok(()),
        },
        Segment::Each => match doc.as_sequence_mut() {
            Some(items) => {
                for item in items.iter_mut() {
                    visit(rest, item, f)?;
                }
                Ok(())
            }
            None => Ok(()),
        },
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "$")
        } else {
            write!(f, "{}", self.raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::convert::Infallible;

    fn collect_strings(path: &str, doc: &mut Document) -> Vec<String> {
        let path = DocumentPath::parse(path).unwrap();
        let mut seen = Vec::new();
        path.visit_mut(doc, &mut |node: &mut Document| -> Result<(), Infallible> {
            if let Some(s) = node.as_str() {
                seen.push(s.to_string());
            }
            Ok(())
        })
        .unwrap();
        seen
    }

    #[test]
    fn test_root_path() {
        assert!(DocumentPath::parse("").unwrap().is_root());
        assert!(DocumentPath::parse("$").unwrap().is_root());
        assert_eq!(DocumentPath::root().to_string(), "$");
    }

    #[test]
    fn test_nested_field() {
        let mut doc = Document::from(json!({"owner": {"name": "ada"}}));
        assert_eq!(collect_strings("owner.name", &mut doc), vec!["ada"]);
    }

    #[test]
    fn test_each_element() {
        let mut doc = Document::from(json!({"tags": ["a", "b", 3]}));
        assert_eq!(collect_strings("tags[]", &mut doc), vec!["a", "b"]);
    }

    #[test]
    fn test_each_then_field() {
        let mut doc = Document::from(json!({"events": [{"at": "x"}, {"at": "y"}, {}]}));
        assert_eq!(collect_strings("events[].at", &mut doc), vec!["x", "y"]);
    }

    #[test]
    fn test_absent_path_is_skipped() {
        let mut doc = Document::from(json!({"a": 1}));
        assert!(collect_strings("b.c", &mut doc).is_empty());
    }

    #[test]
    fn test_invalid_paths() {
        assert!(DocumentPath::parse("a..b").is_err());
        assert!(DocumentPath::parse("a[0]").is_err());
    }
}
