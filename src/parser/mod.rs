//! Annotation parser for JSDoc-style documentation comments.
//!
//! This module turns raw source text into [`AnnotationBlock`]s. Every `/** ... */` comment in
//! the text becomes one block; each line of the comment that starts with `@` opens a new
//! [`AnnotationTag`].
//!
//! # Example
//!
//! ```
//! use openapi_from_annotations::parser::AnnotationParser;
//!
//! let blocks = AnnotationParser::parse(
//!     "/**\n * @typedef Todo\n * @property {string} id - A unique identifier\n */",
//! );
//! assert_eq!(blocks.len(), 1);
//! assert_eq!(blocks[0].tags[1].name.as_deref(), Some("id"));
//! ```

mod tag;
pub mod type_expr;

pub use type_expr::{parse_type_expression, TypeExpression};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Parser for documentation comments.
pub struct AnnotationParser;

/// One documentation tag, e.g. `@param {string} query.q - Search text`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationTag {
    /// Tag kind without the `@` (`event`, `param`, `typedef`, ...)
    pub title: String,
    /// Free text following the type and name
    #[serde(default)]
    pub description: String,
    /// Identifier, possibly dotted (`query.limit`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Type between braces, if the tag declared one
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_expr: Option<TypeExpression>,
    /// Parse errors; a non-empty list makes the tag malformed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// One documentation comment: its leading free text and its tags in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBlock {
    #[serde(default)]
    pub description: String,
    pub tags: Vec<AnnotationTag>,
}

impl AnnotationTag {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_type(mut self, type_expr: TypeExpression) -> Self {
        self.type_expr = Some(type_expr);
        self
    }
}

impl AnnotationBlock {
    pub fn new(tags: Vec<AnnotationTag>) -> Self {
        Self {
            description: String::new(),
            tags,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether any tag (well-formed or not) has the given title.
    pub fn has_tag(&self, title: &str) -> bool {
        self.tags.iter().any(|t| t.title == title)
    }

    /// Short human readable identification of the block for error messages.
    pub fn summary(&self) -> String {
        if let Some(line) = self.description.lines().next() {
            return format!("block '{}'", line);
        }

        let tags: Vec<String> = self
            .tags
            .iter()
            .map(|t| match &t.name {
                Some(name) => format!("@{} {}", t.title, name),
                None => format!("@{}", t.title),
            })
            .collect();
        format!("block [{}]", tags.join(", "))
    }
}

impl AnnotationParser {
    /// Parses every documentation comment in `text`, in document order.
    ///
    /// Text outside `/** ... */` comments is ignored, as are plain `/* ... */` comments and
    /// the empty comment `/**/`. An unterminated documentation comment is skipped with a
    /// warning.
    pub fn parse(text: &str) -> Vec<AnnotationBlock> {
        let blocks: Vec<AnnotationBlock> = extract_doc_comments(text)
            .into_iter()
            .map(parse_block)
            .collect();

        debug!("Parsed {} documentation comments", blocks.len());
        blocks
    }
}

fn extract_doc_comments(text: &str) -> Vec<&str> {
    let mut comments = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("/**") {
        let after = &rest[start + 3..];

        if let Some(remainder) = after.strip_prefix('/') {
            rest = remainder;
            continue;
        }

        match after.find("*/") {
            Some(end) => {
                comments.push(&after[..end]);
                rest = &after[end + 2..];
            }
            None => {
                warn!("Ignoring unterminated documentation comment");
                break;
            }
        }
    }

    comments
}

/// Removes the comment decoration (` * `) from each line.
fn unwrap_lines(body: &str) -> impl Iterator<Item = &str> {
    body.lines().map(|line| {
        let line = line.trim_start();
        let line = line.strip_prefix('*').unwrap_or(line);
        line.strip_prefix(' ').unwrap_or(line)
    })
}

fn parse_block(body: &str) -> AnnotationBlock {
    let mut description_lines: Vec<&str> = Vec::new();
    let mut raw_tags: Vec<String> = Vec::new();

    for line in unwrap_lines(body) {
        let trimmed = line.trim_start();
        if trimmed.starts_with('@') {
            raw_tags.push(trimmed.to_string());
        } else if let Some(current) = raw_tags.last_mut() {
            current.push('\n');
            current.push_str(line);
        } else {
            description_lines.push(line);
        }
    }

    AnnotationBlock {
        description: description_lines.join("\n").trim().to_string(),
        tags: raw_tags.iter().map(|raw| tag::parse_tag(raw)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTES: &str = r#"
/**
 * Get an array of Todos.
 * @event GET: /todos - getTodos
 * @returns {Todo[]} 200 - An array of todos
 * @returns {Error} 500 - Server Error
 */
const getTodos = (_, res) => res.json([]);
"#;

    #[test]
    fn test_parse_route_comment() {
        let blocks = AnnotationParser::parse(ROUTES);

        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.description, "Get an array of Todos.");

        let titles: Vec<&str> = block.tags.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["event", "returns", "returns"]);
        assert_eq!(block.tags[0].description, "GET: /todos - getTodos");
        assert_eq!(block.tags[2].description, "500 - Server Error");
    }

    #[test]
    fn test_parse_multiple_comments_in_order() {
        let text = "/** @typedef A */\nconst a = 1;\n/**\n * @typedef B\n */";
        let blocks = AnnotationParser::parse(text);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].tags[0].name.as_deref(), Some("A"));
        assert_eq!(blocks[1].tags[0].name.as_deref(), Some("B"));
    }

    #[test]
    fn test_plain_and_empty_comments_ignored() {
        let text = "/* @typedef Nope */ /**/ // @typedef Nope\nconst x = 1;";
        assert!(AnnotationParser::parse(text).is_empty());
    }

    #[test]
    fn test_unterminated_comment_ignored() {
        let text = "/** @typedef A */\n/**\n * @typedef B\n";
        let blocks = AnnotationParser::parse(text);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_multiline_tag_description() {
        let text = "/**\n * @property {string} note - First line\n *   second line\n */";
        let blocks = AnnotationParser::parse(text);
        assert_eq!(blocks[0].tags[0].description, "First line\n  second line");
    }

    #[test]
    fn test_block_summary() {
        let block = AnnotationBlock::new(vec![
            AnnotationTag::new("typedef", ""),
            AnnotationTag::new("property", "").with_name("id"),
        ]);
        assert_eq!(block.summary(), "block [@typedef, @property id]");

        let described = block.with_description("A todo\nmore");
        assert_eq!(described.summary(), "block 'A todo'");
    }

    #[test]
    fn test_blocks_deserialize_from_json_ast() {
        let json = serde_json::json!({
            "tags": [
                { "title": "param", "name": "query.q", "type": { "type": "NameExpression", "name": "string" } },
                { "title": "event", "description": "GET: /a - a", "errors": ["bad"] }
            ]
        });
        let block: AnnotationBlock = serde_json::from_value(json).unwrap();

        assert_eq!(block.tags[0].type_expr, Some(TypeExpression::named("string")));
        assert_eq!(block.tags[0].description, "");
        assert_eq!(block.tags[1].errors, vec!["bad".to_string()]);
    }
}
