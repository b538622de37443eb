use crate::error::{Error, Result};
use crate::openapi_builder::{OpenApiDocument, Parameter};
use crate::type_resolver::Schema;
use log::debug;
use openapiv3::OpenAPI;
use std::collections::HashSet;

/// Parameter locations OpenAPI 3.0 knows about
pub const PARAMETER_LOCATIONS: [&str; 4] = ["query", "header", "path", "cookie"];

/// Structural validator for assembled documents
pub struct SpecValidator;

impl SpecValidator {
    /// Checks the assembled document and hands it back unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] describing the first problem found.
    pub fn validate(doc: OpenApiDocument) -> Result<OpenApiDocument> {
        debug!("Validating OpenAPI document");

        if !doc.openapi.starts_with("3.0.") {
            return Err(invalid(format!("unsupported openapi version '{}'", doc.openapi)));
        }

        check_paths(&doc)?;
        check_references(&doc)?;

        let value = serde_json::to_value(&doc)?;
        serde_json::from_value::<OpenAPI>(value)
            .map_err(|e| invalid(format!("not a valid OpenAPI 3.0 document: {}", e)))?;

        Ok(doc)
    }
}

fn check_paths(doc: &OpenApiDocument) -> Result<()> {
    let mut operation_ids = HashSet::new();

    for (path, item) in &doc.paths {
        if !path.starts_with('/') {
            return Err(invalid(format!("path '{}' must start with '/'", path)));
        }

        for (method, operation) in item.operations() {
            let at = format!("{} {}", method, path);

            if !operation_ids.insert(operation.operation_id.as_str()) {
                return Err(invalid(format!(
                    "duplicate operationId '{}' at {}",
                    operation.operation_id, at
                )));
            }

            let responses = operation.responses.as_ref().filter(|r| !r.is_empty());
            let Some(responses) = responses else {
                return Err(invalid(format!("{} has no responses", at)));
            };
            if let Some(status) = responses.keys().find(|s| !is_status_code(s)) {
                return Err(invalid(format!(
                    "{} has invalid response status '{}'",
                    at, status
                )));
            }

            for parameter in operation.parameters.iter().flatten() {
                check_parameter(parameter, &at)?;
            }
        }
    }

    Ok(())
}

/// Every `$ref` reachable from an operation or a component schema must name a component
/// schema.
fn check_references(doc: &OpenApiDocument) -> Result<()> {
    let mut references: Vec<(String, &str)> = Vec::new();

    for (path, item) in &doc.paths {
        for (method, operation) in item.operations() {
            let at = format!("{} {}", method, path);

            let parameters = operation.parameters.iter().flatten().map(|p| &p.schema);
            let contents = operation
                .request_body
                .iter()
                .chain(operation.responses.iter().flat_map(|r| r.values()))
                .flat_map(|c| c.content.values())
                .map(|m| &m.schema);

            for schema in parameters.chain(contents) {
                collect(&mut references, &at, schema);
            }
        }
    }

    for (name, schema) in &doc.components.schemas {
        for target in schema.referenced_names() {
            references.push((format!("schema {}", name), target));
        }
    }

    match references
        .iter()
        .find(|(_, target)| !doc.components.schemas.contains_key(*target))
    {
        Some((at, target)) => Err(invalid(format!(
            "{} references unknown schema '{}'",
            at, target
        ))),
        None => Ok(()),
    }
}

/// `default`, a three digit code, or a range such as `2XX`
fn is_status_code(status: &str) -> bool {
    if status == "default" {
        return true;
    }
    let bytes = status.as_bytes();
    bytes.len() == 3
        && (b'1'..=b'5').contains(&bytes[0])
        && (bytes[1..].iter().all(u8::is_ascii_digit) || &bytes[1..] == b"XX")
}

fn invalid(message: String) -> Error {
    Error::Validation(message)
}

fn check_parameter(parameter: &Parameter, at: &str) -> Result<()> {
    if !PARAMETER_LOCATIONS.contains(&parameter.location.as_str()) {
        return Err(invalid(format!(
            "parameter '{}' of {} has unknown location '{}'",
            parameter.name, at, parameter.location
        )));
    }
    if parameter.location == "path" && !parameter.required {
        return Err(invalid(format!(
            "path parameter '{}' of {} must be required",
            parameter.name, at
        )));
    }
    Ok(())
}

fn collect<'a>(references: &mut Vec<(String, &'a str)>, at: &str, schema: &'a Schema) {
    for target in schema.referenced_names() {
        references.push((at.to_string(), target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Options, Server};
    use crate::generator::build_spec_from_str;

    const TODOS: &str = r#"
/**
 * @event GET: /todos/{id} - getTodo
 * @param {string} path.id - Todo id
 * @returns {Todo} 200 - The todo
 */

/**
 * @typedef Todo
 * @property {string} id
 */
"#;

    fn config() -> Config {
        Config {
            servers: Some(vec![Server {
                url: "http://localhost".to_string(),
                description: None,
            }]),
            ..Default::default()
        }
    }

    fn assemble(text: &str) -> OpenApiDocument {
        use crate::grouping::group_by_doc_type;
        use crate::openapi_builder::OpenApiBuilder;
        use crate::parser::AnnotationParser;

        let builder = OpenApiBuilder::new(&config(), &Options::default()).unwrap();
        builder.build(group_by_doc_type(&AnnotationParser::parse(text)).unwrap())
    }

    fn validation_message(doc: OpenApiDocument) -> String {
        match SpecValidator::validate(doc) {
            Err(Error::Validation(message)) => message,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_document_is_returned_unchanged() {
        let doc = assemble(TODOS);
        let validated = SpecValidator::validate(doc.clone()).unwrap();
        assert_eq!(validated, doc);
    }

    #[test]
    fn test_end_to_end_passes_validation() {
        assert!(build_spec_from_str(TODOS, &config(), &Options::default()).is_ok());
    }

    #[test]
    fn test_unknown_reference() {
        let doc = assemble(
            "/** @event GET: /todos - getTodos\n * @returns {Missing[]} 200 - nope */",
        );
        let message = validation_message(doc);
        assert!(message.contains("'Missing'"), "{}", message);
    }

    #[test]
    fn test_unknown_reference_from_schema() {
        let doc = assemble(
            "/** @typedef Todo\n * @property {User} owner */\n/** @event GET: /todos - getTodos\n * @returns {Todo} 200 - ok */",
        );
        let message = validation_message(doc);
        assert!(message.contains("schema Todo"), "{}", message);
    }

    #[test]
    fn test_operation_without_responses() {
        let doc = assemble("/** @event GET: /todos - getTodos */");
        assert!(validation_message(doc).contains("no responses"));
    }

    #[test]
    fn test_duplicate_operation_id() {
        let doc = assemble(
            r#"
/** @event GET: /a - same
 * @returns {string} 200 - ok */
/** @event GET: /b - same
 * @returns {string} 200 - ok */
"#,
        );
        assert!(validation_message(doc).contains("duplicate operationId 'same'"));
    }

    #[test]
    fn test_path_must_start_with_slash() {
        let doc = assemble("/** @event GET: todos - getTodos\n * @returns {string} 200 - ok */");
        assert!(validation_message(doc).contains("must start with '/'"));
    }

    #[test]
    fn test_parameter_location_and_required() {
        let doc = assemble(
            "/** @event GET: /a - a\n * @param {string} cookies.sid\n * @returns {string} 200 - ok */",
        );
        assert!(validation_message(doc).contains("unknown location 'cookies'"));

        let doc = assemble(
            "/** @event GET: /a/{id} - a\n * @param {string} [path.id]\n * @returns {string} 200 - ok */",
        );
        assert!(validation_message(doc).contains("must be required"));
    }

    #[test]
    fn test_invalid_status_code() {
        let doc = assemble("/** @event GET: /a - a\n * @returns {string} ok - fine */");
        assert!(validation_message(doc).contains("invalid response status 'ok'"));

        let doc = assemble("/** @event GET: /a - a\n * @returns {string} 2XX - fine */");
        assert!(SpecValidator::validate(doc).is_ok());
    }

    #[test]
    fn test_version_must_be_3_0() {
        let mut doc = assemble("");
        doc.openapi = "3.1.0".to_string();
        assert!(validation_message(doc).contains("unsupported openapi version"));
    }
}
