//! Route block compilation.
//!
//! A route block is recognized by its `@event` tag:
//!
//! ```text
//! /**
//!  * Get an array of Todos.
//!  * @event GET: /todos - getTodos
//!  * @tags todos, public
//!  * @param {integer} [query.limit] - Max number of items
//!  * @param {Todo} body.todo - The todo to store
//!  * @returns {Todo[]} 200 - An array of todos
//!  */
//! ```
//!
//! The event description is split on `:` and then `-` into method, path and operationId.
//! `@param` names are `<location>.<name>`; a name starting with `body` becomes the request
//! body instead. `@returns` descriptions are `<statusCode> - <description>`.

use crate::classifier::{TagClassifier, TypedTag};
use crate::error::{Error, Result};
use crate::openapi_builder::{ContentObject, Operation, Parameter};
use crate::parser::AnnotationBlock;
use crate::type_resolver::TypeResolver;
use indexmap::IndexMap;
use log::debug;
use std::fmt;

/// Compiler for route blocks
pub struct RouteCompiler;

/// HTTP methods an OpenAPI path item can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

/// One compiled route: where it lives and the operation served there
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescriptor {
    pub method: HttpMethod,
    pub path: String,
    pub operation: Operation,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// Case-insensitive lookup (`GET`, `get` and `Get` are all [`HttpMethod::Get`]).
    pub fn parse(method: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(method))
    }

    /// Lowercase name, as used for path item keys
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl RouteCompiler {
    /// Compiles one route block into a [`RouteDescriptor`].
    ///
    /// Referenced schema names are not checked here; unknown references are reported by
    /// the validator once the whole document is assembled.
    ///
    /// # Errors
    ///
    /// - [`Error::TagErrors`] if any tag of the block carries parse errors
    /// - [`Error::MalformedEvent`] if there is no valid `@event` tag or it does not split
    ///   into exactly method, path and operationId
    /// - [`Error::UnsupportedType`] from type resolution
    pub fn compile_block(block: &AnnotationBlock) -> Result<RouteDescriptor> {
        let tags = TagClassifier::classify(&block.tags)?;

        let event = tags.event.first().copied().ok_or_else(|| Error::MalformedEvent {
            description: block
                .tags
                .iter()
                .find(|t| t.title == "event")
                .map(|t| t.description.clone())
                .unwrap_or_default(),
            reason: "expected `<METHOD>: <path> - <operationId>`".to_string(),
        })?;

        let (method, path, operation_id) = parse_event(event)?;
        debug!("Compiling route {} {} ({})", method, path, operation_id);

        let mut operation = Operation::new(operation_id);

        if !block.description.is_empty() {
            operation.description = Some(block.description.clone());
        }

        if let Some(list) = tags.tags.first() {
            operation.tags = Some(list.split(',').map(|t| t.trim().to_string()).collect());
        }

        let (body, located): (Vec<&TypedTag>, Vec<&TypedTag>) =
            tags.param.iter().partition(|p| p.name.starts_with("body"));

        if let Some(body) = body.first() {
            let schema = TypeResolver::resolve(body.type_expr)?;
            operation.request_body = Some(ContentObject::json(body.description, schema));
        }

        if !located.is_empty() {
            let parameters = located
                .into_iter()
                .map(build_parameter)
                .collect::<Result<Vec<_>>>()?;
            operation.parameters = Some(parameters);
        }

        if !tags.returns.is_empty() {
            let mut responses = IndexMap::new();
            for returns in &tags.returns {
                let (status, description) = split_status(returns.description);
                let schema = TypeResolver::resolve(returns.type_expr)?;
                responses.insert(status.to_string(), ContentObject::json(description, schema));
            }
            operation.responses = Some(responses);
        }

        Ok(RouteDescriptor {
            method,
            path: path.to_string(),
            operation,
        })
    }
}

/// Splits `"<METHOD>: <path> - <operationId>"` into its three trimmed parts.
///
/// The description is split on every `:` and then every `-`, so paths containing either
/// character do not split into exactly three parts and are rejected.
pub fn parse_event(description: &str) -> Result<(HttpMethod, &str, &str)> {
    let tokens: Vec<&str> = description
        .split(':')
        .flat_map(|segment| segment.split('-'))
        .map(str::trim)
        .collect();

    let &[method, path, operation_id] = tokens.as_slice() else {
        return Err(Error::MalformedEvent {
            description: description.to_string(),
            reason: format!("expected 3 segments, found {}", tokens.len()),
        });
    };

    let method = HttpMethod::parse(method).ok_or_else(|| Error::MalformedEvent {
        description: description.to_string(),
        reason: format!("unknown HTTP method '{}'", method),
    })?;

    Ok((method, path, operation_id))
}

/// `"200 - An array of todos"` -> `("200", "An array of todos")`; text after a second `-`
/// is dropped.
fn split_status(description: &str) -> (&str, &str) {
    let mut parts = description.split('-').map(str::trim);
    let status = parts.next().unwrap_or_default();
    let text = parts.next().unwrap_or_default();
    (status, text)
}

fn build_parameter(param: &TypedTag) -> Result<Parameter> {
    let mut segments = param.name.split('.');
    let location = segments.next().unwrap_or_default();
    let name = segments.next().unwrap_or_default();

    Ok(Parameter {
        required: !param.type_expr.is_optional(),
        description: param.description.to_string(),
        location: location.to_string(),
        name: name.to_string(),
        schema: TypeResolver::resolve(param.type_expr)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{AnnotationTag, TypeExpression};
    use serde_json::json;

    fn event(description: &str) -> AnnotationTag {
        AnnotationTag::new("event", description)
    }

    fn compile(tags: Vec<AnnotationTag>) -> Result<RouteDescriptor> {
        RouteCompiler::compile_block(&AnnotationBlock::new(tags))
    }

    #[test]
    fn test_parse_event() {
        let (method, path, operation_id) = parse_event("GET: /todos - getTodos").unwrap();
        assert_eq!(method, HttpMethod::Get);
        assert_eq!(path, "/todos");
        assert_eq!(operation_id, "getTodos");

        let (method, _, operation_id) = parse_event("  delete :/todos/{id}-  deleteTodo ").unwrap();
        assert_eq!(method, HttpMethod::Delete);
        assert_eq!(operation_id, "deleteTodo");
    }

    #[test]
    fn test_parse_event_wrong_segment_count() {
        for description in ["GET: /todos/:id - getTodo", "GET: /to-dos - list", "GET: /todos"] {
            assert!(
                matches!(parse_event(description), Err(Error::MalformedEvent { .. })),
                "{} should be rejected",
                description
            );
        }
    }

    #[test]
    fn test_parse_event_unknown_method() {
        match parse_event("FETCH: /todos - getTodos") {
            Err(Error::MalformedEvent { reason, .. }) => assert!(reason.contains("FETCH")),
            other => panic!("expected MalformedEvent, got {:?}", other),
        }
    }

    #[test]
    fn test_minimal_route() {
        let route = compile(vec![event("POST: /todos - createTodo")]).unwrap();

        assert_eq!(route.method, HttpMethod::Post);
        assert_eq!(route.path, "/todos");
        assert_eq!(route.operation, Operation::new("createTodo"));
    }

    #[test]
    fn test_block_description_becomes_operation_description() {
        let block = AnnotationBlock::new(vec![event("GET: /todos - getTodos")])
            .with_description("Get an array of Todos.");
        let route = RouteCompiler::compile_block(&block).unwrap();
        assert_eq!(
            route.operation.description.as_deref(),
            Some("Get an array of Todos.")
        );
    }

    #[test]
    fn test_tags_list_uses_first_tags_entry() {
        let route = compile(vec![
            event("GET: /todos - getTodos"),
            AnnotationTag::new("tags", "todos , public"),
            AnnotationTag::new("tags", "ignored"),
        ])
        .unwrap();

        assert_eq!(
            route.operation.tags,
            Some(vec!["todos".to_string(), "public".to_string()])
        );
    }

    #[test]
    fn test_optional_query_parameter() {
        let route = compile(vec![
            event("GET: /todos - getTodos"),
            AnnotationTag::new("param", "Max number of items")
                .with_name("query.limit")
                .with_type(TypeExpression::optional(TypeExpression::named("integer"))),
        ])
        .unwrap();

        let value = serde_json::to_value(&route.operation.parameters).unwrap();
        assert_eq!(
            value,
            json!([{
                "required": false,
                "description": "Max number of items",
                "in": "query",
                "name": "limit",
                "schema": { "type": "integer" }
            }])
        );
    }

    #[test]
    fn test_path_parameter_is_required() {
        let route = compile(vec![
            event("GET: /todos/{id} - getTodo"),
            AnnotationTag::new("param", "")
                .with_name("path.id")
                .with_type(TypeExpression::named("string")),
        ])
        .unwrap();

        let parameters = route.operation.parameters.unwrap();
        assert_eq!(parameters.len(), 1);
        assert!(parameters[0].required);
        assert_eq!(parameters[0].location, "path");
        assert_eq!(parameters[0].name, "id");
    }

    #[test]
    fn test_first_body_param_becomes_request_body() {
        let route = compile(vec![
            event("PUT: /todos - replaceTodos"),
            AnnotationTag::new("param", "The todos to store")
                .with_name("body.todos")
                .with_type(TypeExpression::array_of(TypeExpression::named("Todo"))),
            AnnotationTag::new("param", "ignored")
                .with_name("body.other")
                .with_type(TypeExpression::named("string")),
        ])
        .unwrap();

        assert!(route.operation.parameters.is_none());
        let value = serde_json::to_value(&route.operation.request_body).unwrap();
        assert_eq!(
            value,
            json!({
                "description": "The todos to store",
                "content": {
                    "application/json": {
                        "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Todo" } }
                    }
                }
            })
        );
    }

    #[test]
    fn test_responses_keyed_by_status() {
        let route = compile(vec![
            event("GET: /todos - getTodos"),
            AnnotationTag::new("returns", "200 - An array of todos")
                .with_type(TypeExpression::array_of(TypeExpression::named("Todo"))),
            AnnotationTag::new("returns", "500 - Server Error - retry later")
                .with_type(TypeExpression::named("Error")),
        ])
        .unwrap();

        let responses = route.operation.responses.unwrap();
        let codes: Vec<&str> = responses.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["200", "500"]);
        assert_eq!(responses["200"].description, "An array of todos");
        assert_eq!(responses["500"].description, "Server Error");
        assert_eq!(
            serde_json::to_value(responses["200"].json_schema()).unwrap(),
            json!({ "type": "array", "items": { "$ref": "#/components/schemas/Todo" } })
        );
    }

    #[test]
    fn test_status_without_description() {
        let route = compile(vec![
            event("DELETE: /todos - clearTodos"),
            AnnotationTag::new("returns", "204").with_type(TypeExpression::named("string")),
        ])
        .unwrap();

        let responses = route.operation.responses.unwrap();
        assert_eq!(responses["204"].description, "");
    }

    #[test]
    fn test_malformed_event_fails() {
        let result = compile(vec![event("GET /todos getTodos")]);
        match result {
            Err(Error::MalformedEvent { description, .. }) => {
                assert_eq!(description, "GET /todos getTodos");
            }
            other => panic!("expected MalformedEvent, got {:?}", other),
        }
    }

    #[test]
    fn test_type_errors_bubble_up() {
        let result = compile(vec![
            event("GET: /todos - getTodos"),
            AnnotationTag::new("returns", "200 - anything").with_type(TypeExpression::AllLiteral),
        ]);
        assert!(matches!(result, Err(Error::UnsupportedType(TypeExpression::AllLiteral))));
    }

    #[test]
    fn test_http_method_parse_and_display() {
        assert_eq!(HttpMethod::parse("PATCH"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("trace"), Some(HttpMethod::Trace));
        assert_eq!(HttpMethod::parse("CONNECT"), None);
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Get.as_str(), "get");
    }
}
