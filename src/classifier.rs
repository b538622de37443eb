//! Tag validation and classification.
//!
//! A single pass over a block's tags keeps the well-formed ones and sorts them into a fixed
//! record with one list per recognized tag title. Tags with other titles, and recognized tags
//! that do not have the fields their title needs, are left out without error.

use crate::error::{Error, Result};
use crate::parser::{AnnotationTag, TypeExpression};
use log::debug;

/// Classifier for the tags of one annotation block
pub struct TagClassifier;

/// A tag with a name and a type (`@param`, `@property`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypedTag<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub type_expr: &'a TypeExpression,
}

/// A `@returns` tag; the description holds `<statusCode> - <text>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnsTag<'a> {
    pub description: &'a str,
    pub type_expr: &'a TypeExpression,
}

/// A `@typedef` tag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypedefTag<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

/// Valid tags of one block, grouped by title in source order
#[derive(Debug, Default)]
pub struct ClassifiedTags<'a> {
    /// Descriptions of `@event` tags containing both `:` and `-`
    pub event: Vec<&'a str>,
    /// Non-empty descriptions of `@tags` tags
    pub tags: Vec<&'a str>,
    pub param: Vec<TypedTag<'a>>,
    pub returns: Vec<ReturnsTag<'a>>,
    pub typedef: Vec<TypedefTag<'a>>,
    pub property: Vec<TypedTag<'a>>,
    /// Names of `@property` tags declared without a `{type}`
    pub untyped_property: Vec<&'a str>,
}

impl TagClassifier {
    /// Classifies the tags of one block.
    ///
    /// Validity rules per title:
    /// - `event`: description contains both `:` and `-`
    /// - `tags`: non-empty description
    /// - `param`: has a type and a dotted name (`query.limit`)
    /// - `returns`: has a type and a description
    /// - `typedef`: has a name
    /// - `property`: has a name and a type; named but untyped ones are collected apart
    ///
    /// # Errors
    ///
    /// Returns [`Error::TagErrors`] as soon as a tag carrying parse errors is found; the whole
    /// block is rejected.
    pub fn classify(tags: &[AnnotationTag]) -> Result<ClassifiedTags<'_>> {
        let mut classified = ClassifiedTags::default();

        for tag in tags {
            if !tag.errors.is_empty() {
                return Err(Error::TagErrors {
                    title: tag.title.clone(),
                    messages: tag.errors.clone(),
                });
            }

            let description = tag.description.as_str();
            let name = tag.name.as_deref().filter(|n| !n.is_empty());

            match (tag.title.as_str(), name, tag.type_expr.as_ref()) {
                ("event", _, _) if description.contains(':') && description.contains('-') => {
                    classified.event.push(description);
                }
                ("tags", _, _) if !description.is_empty() => classified.tags.push(description),
                ("param", Some(name), Some(type_expr)) if name.contains('.') => {
                    classified.param.push(TypedTag {
                        name,
                        description,
                        type_expr,
                    });
                }
                ("returns", _, Some(type_expr)) if !description.is_empty() => {
                    classified.returns.push(ReturnsTag {
                        description,
                        type_expr,
                    });
                }
                ("typedef", Some(name), _) => {
                    classified.typedef.push(TypedefTag { name, description });
                }
                ("property", Some(name), Some(type_expr)) => {
                    classified.property.push(TypedTag {
                        name,
                        description,
                        type_expr,
                    });
                }
                ("property", Some(name), None) => classified.untyped_property.push(name),
                (title, _, _) => debug!("Skipping @{} tag", title),
            }
        }

        Ok(classified)
    }
}
