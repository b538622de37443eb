//! Grouping of parsed blocks into paths and component schemas.

use crate::error::Result;
use crate::openapi_builder::PathItem;
use crate::parser::AnnotationBlock;
use crate::route_compiler::{RouteCompiler, RouteDescriptor};
use crate::schema_generator::{ObjectSchema, SchemaGenerator};
use indexmap::IndexMap;
use log::{debug, warn};

/// Compiled paths and schemas of a whole annotation source, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocsContainer {
    pub paths: IndexMap<String, PathItem>,
    pub schemas: IndexMap<String, ObjectSchema>,
}

/// What a block contributes to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Has an `@event` tag
    Route,
    /// Has a `@typedef` tag and no `@event` tag
    Schema,
    /// Neither; dropped
    Inert,
}

impl BlockKind {
    /// Classifies on raw tag titles, so a block with a malformed `@event` is still a route
    /// and fails when compiled.
    pub fn of(block: &AnnotationBlock) -> Self {
        if block.has_tag("event") {
            BlockKind::Route
        } else if block.has_tag("typedef") {
            BlockKind::Schema
        } else {
            BlockKind::Inert
        }
    }
}

impl DocsContainer {
    /// Adds a route; an existing operation on the same path and method is replaced.
    pub fn add_route(&mut self, route: RouteDescriptor) {
        let RouteDescriptor {
            method,
            path,
            operation,
        } = route;

        let item = self.paths.entry(path.clone()).or_default();
        if let Some(previous) = item.set_operation(method, operation) {
            warn!(
                "Operation {} {} ({}) redefined; keeping the later one",
                method, path, previous.operation_id
            );
        }
    }

    /// Adds a schema; an existing schema with the same name is replaced.
    pub fn add_schema(&mut self, name: String, schema: ObjectSchema) {
        if self.schemas.insert(name.clone(), schema).is_some() {
            warn!("Schema {} redefined; keeping the later one", name);
        }
    }
}

/// Compiles every route block, then every schema block, into one container.
///
/// Inert blocks are skipped. The first compile error aborts the grouping.
pub fn group_by_doc_type(blocks: &[AnnotationBlock]) -> Result<DocsContainer> {
    let mut docs = DocsContainer::default();

    let (routes, schemas): (Vec<&AnnotationBlock>, Vec<&AnnotationBlock>) = blocks
        .iter()
        .filter(|block| BlockKind::of(block) != BlockKind::Inert)
        .partition(|block| BlockKind::of(block) == BlockKind::Route);

    debug!(
        "Grouping {} route blocks and {} schema blocks ({} inert)",
        routes.len(),
        schemas.len(),
        blocks.len() - routes.len() - schemas.len()
    );

    for block in routes {
        docs.add_route(RouteCompiler::compile_block(block)?);
    }

    for block in schemas {
        let (name, schema) = SchemaGenerator::compile_block(block)?;
        docs.add_schema(name, schema);
    }

    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::AnnotationParser;
    use crate::route_compiler::HttpMethod;

    fn group(text: &str) -> Result<DocsContainer> {
        group_by_doc_type(&AnnotationParser::parse(text))
    }

    #[test]
    fn test_block_kinds() {
        let blocks = AnnotationParser::parse(
            r#"
/** @event GET: /a - a */
/** @typedef A */
/** @event nonsense
 * @typedef B */
/** Just a comment
 * @author someone */
"#,
        );
        let kinds: Vec<BlockKind> = blocks.iter().map(BlockKind::of).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Route, BlockKind::Schema, BlockKind::Route, BlockKind::Inert]
        );
    }

    #[test]
    fn test_same_path_different_methods() {
        let docs = group(
            r#"
/** @event GET: /todos - getTodos */
/** @event POST: /todos - createTodo */
"#,
        )
        .unwrap();

        assert_eq!(docs.paths.len(), 1);
        let item = &docs.paths["/todos"];
        assert_eq!(item.operation(HttpMethod::Get).unwrap().operation_id, "getTodos");
        assert_eq!(item.operation(HttpMethod::Post).unwrap().operation_id, "createTodo");
    }

    #[test]
    fn test_same_path_and_method_later_wins() {
        let docs = group(
            r#"
/** @event GET: /todos - first */
/** @event GET: /todos - second */
"#,
        )
        .unwrap();

        let item = &docs.paths["/todos"];
        assert_eq!(item.operation(HttpMethod::Get).unwrap().operation_id, "second");
        assert_eq!(item.operations().count(), 1);
    }

    #[test]
    fn test_schema_name_later_wins() {
        let docs = group(
            r#"
/** @typedef Todo
 * @property {string} id */
/** @typedef Todo
 * @property {integer} id
 * @property {string} title */
"#,
        )
        .unwrap();

        assert_eq!(docs.schemas.len(), 1);
        assert_eq!(docs.schemas["Todo"].properties.len(), 2);
    }

    #[test]
    fn test_paths_keep_first_seen_order() {
        let docs = group(
            r#"
/** @event GET: /b - b */
/** @event GET: /a - a */
/** @event PUT: /b - putB */
"#,
        )
        .unwrap();

        let paths: Vec<&str> = docs.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["/b", "/a"]);
    }

    #[test]
    fn test_malformed_event_fails_even_with_typedef() {
        let result = group("/** @event GET /todos\n * @typedef Todo */");
        assert!(matches!(result, Err(Error::MalformedEvent { .. })));
    }

    #[test]
    fn test_inert_blocks_are_dropped() {
        let docs = group("/** Helper. @private */\n/** @author me */").unwrap();
        assert_eq!(docs, DocsContainer::default());
    }
}
