//! Producers that turn raw input into a [`Document`].

use apimark_ast::Document;
use apimark_telemetry::events;

use crate::config::ParseConfig;
use crate::error::ParseError;

/// Builds a document from raw input.
///
/// Extractors run on a blocking background thread and may be abandoned when
/// a parse run is cancelled, so they must not hold resources that need
/// explicit release.
pub trait Extractor: Send + Sync {
    fn extract(&self, input: &str, config: &ParseConfig) -> Result<Document, ParseError>;
}

/// Extractor for Markdown API documentation.
///
/// Markdown extraction is not implemented yet: every input yields an empty
/// document, which validation then reports as having no endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownExtractor;

impl Extractor for MarkdownExtractor {
    fn extract(&self, input: &str, _config: &ParseConfig) -> Result<Document, ParseError> {
        tracing::debug!(
            event = events::MARKDOWN_EXTRACTED,
            bytes = input.len(),
            "markdown extraction yields an empty document"
        );
        Ok(Document::new())
    }
}

/// Extractor for a document previously serialized as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor;

impl Extractor for JsonExtractor {
    fn extract(&self, input: &str, _config: &ParseConfig) -> Result<Document, ParseError> {
        Ok(serde_json::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_yields_empty_document() {
        let doc = MarkdownExtractor
            .extract("# Users API\n\n## GET /users\n", &ParseConfig::default())
            .unwrap();
        assert!(doc.frontmatter.is_none());
        assert!(doc.endpoints.is_empty());
        assert!(doc.components.is_empty());
    }

    #[test]
    fn json_round_trips_document() {
        let json = r#"{
            "frontmatter": { "title": "Pets", "version": "1.0.0" },
            "endpoints": [{ "method": "GET", "path": "/pets", "line": 7 }]
        }"#;
        let doc = JsonExtractor.extract(json, &ParseConfig::default()).unwrap();
        assert_eq!(doc.frontmatter.as_ref().unwrap().title, "Pets");
        assert_eq!(doc.endpoints[0].line, 7);
    }

    #[test]
    fn json_rejects_garbage() {
        let err = JsonExtractor
            .extract("not json", &ParseConfig::default())
            .unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
        assert!(err.to_string().starts_with("E3004"));
    }
}
