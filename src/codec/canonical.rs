//! String canonicalization converter

use super::converter::Converter;
use super::errors::CodecResult;
use crate::document::Document;

/// Rewrites string scalars to a canonical spelling in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringCanonicalizer {
    trim: bool,
    lowercase: bool,
}

impl StringCanonicalizer {
    pub fn new(trim: bool, lowercase: bool) -> Self {
        Self { trim, lowercase }
    }

    pub fn trimming() -> Self {
        Self::new(true, false)
    }

    pub fn canonical(&self, text: &str) -> String {
        let text = if self.trim { text.trim() } else { text };
        if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        }
    }

    fn rewrite(&self, node: &mut Document) {
        if let Document::String(text) = node {
            let canonical = self.canonical(text);
            if canonical != *text {
                *text = canonical;
            }
        }
    }
}

impl Converter for StringCanonicalizer {
    fn name(&self) -> &'static str {
        "canonical-string"
    }

    fn encode(&self, node: &mut Document) -> CodecResult<()> {
        self.rewrite(node);
        Ok(())
    }

    fn decode(&self, node: &mut Document) -> CodecResult<()> {
        self.rewrite(node);
        Ok(())
    }
}
