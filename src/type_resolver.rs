use crate::error::{Error, Result};
use crate::parser::TypeExpression;
use log::debug;
use serde::{Deserialize, Serialize};

/// Type names emitted as `{ "type": name }` instead of a schema reference
pub const PRIMITIVE_TYPES: [&str; 4] = ["integer", "number", "string", "boolean"];

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Type resolver - maps annotation type expressions to JSON Schema fragments
pub struct TypeResolver;

/// JSON Schema fragment produced for a single type expression
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Description (set on object properties)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The type of the schema (string, integer, array, ...)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Reference to a named schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Alternatives of a union type
    #[serde(rename = "oneOf", skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Schema>>,
    /// Element schema of a container type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

impl Schema {
    pub fn of_type(name: impl Into<String>) -> Self {
        Self {
            schema_type: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn schema_ref(name: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", SCHEMA_REF_PREFIX, name)),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Names of all component schemas referenced by this fragment, nested ones included.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        if let Some(reference) = &self.reference {
            names.push(reference.strip_prefix(SCHEMA_REF_PREFIX).unwrap_or(reference.as_str()));
        }
        for schema in self.one_of.iter().flatten() {
            schema.collect_references(names);
        }
        if let Some(items) = &self.items {
            items.collect_references(names);
        }
    }
}

impl TypeResolver {
    /// Resolves a type expression into a schema fragment.
    ///
    /// - `NameExpression`: primitives become `{ type }`, anything else a `$ref`
    /// - `OptionalType`: `{ type: <wrapped name> }`, one level deep only
    /// - `UnionType`: `{ oneOf }` over the element names
    /// - `TypeApplication`: lowercased container `type` with the first argument as `items`
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] for any other shape, and for union elements or
    /// application arguments that are not plain names.
    pub fn resolve(expr: &TypeExpression) -> Result<Schema> {
        debug!("Resolving type expression: {}", expr);

        match expr {
            TypeExpression::NameExpression { name } => Ok(Self::named_schema(name)),
            // Nested optional/union/application forms are not unwrapped further; a
            // wrapped expression without a name yields a fragment without `type`.
            TypeExpression::OptionalType { expression } => Ok(Schema {
                schema_type: expression.name().map(str::to_string),
                ..Default::default()
            }),
            TypeExpression::UnionType { elements } => {
                let one_of = elements
                    .iter()
                    .map(Self::element_schema)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Schema {
                    one_of: Some(one_of),
                    ..Default::default()
                })
            }
            TypeExpression::TypeApplication {
                expression,
                applications,
            } => {
                let container = expression
                    .name()
                    .ok_or_else(|| Error::UnsupportedType(expr.clone()))?;
                // Only the first argument is used; `Map<string, Todo>` keeps `string`.
                let element = applications
                    .first()
                    .ok_or_else(|| Error::UnsupportedType(expr.clone()))?;
                Ok(Schema {
                    schema_type: Some(container.to_lowercase()),
                    items: Some(Box::new(Self::element_schema(element)?)),
                    ..Default::default()
                })
            }
            other => Err(Error::UnsupportedType(other.clone())),
        }
    }

    pub fn is_primitive(name: &str) -> bool {
        PRIMITIVE_TYPES.contains(&name)
    }

    fn named_schema(name: &str) -> Schema {
        if Self::is_primitive(name) {
            Schema::of_type(name)
        } else {
            Schema::schema_ref(name)
        }
    }

    fn element_schema(element: &TypeExpression) -> Result<Schema> {
        element
            .name()
            .map(Self::named_schema)
            .ok_or_else(|| Error::UnsupportedType(element.clone()))
    }
}
