use crate::classifier::TagClassifier;
use crate::error::{Error, Result};
use crate::parser::AnnotationBlock;
use crate::type_resolver::{Schema, TypeResolver};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// Schema generator - compiles `@typedef` blocks into component schemas
pub struct SchemaGenerator;

/// Object schema stored under `components.schemas`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSchema {
    /// Always `object`
    #[serde(rename = "type")]
    pub schema_type: String,
    pub description: String,
    /// Names of the properties whose type is not optional, in declaration order
    pub required: Vec<String>,
    pub properties: IndexMap<String, Schema>,
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self {
            schema_type: "object".to_string(),
            description: String::new(),
            required: Vec::new(),
            properties: IndexMap::new(),
        }
    }
}

impl ObjectSchema {
    /// All schema names referenced from the properties
    pub fn referenced_names(&self) -> Vec<&str> {
        self.properties
            .values()
            .flat_map(Schema::referenced_names)
            .collect()
    }
}

impl SchemaGenerator {
    /// Compiles one schema block into its name and object schema.
    ///
    /// The description is taken from the `@typedef` tag, or from the block text when the
    /// tag has none. Each `@property` becomes `{ description, ...resolved type }`; only
    /// properties declared `[name]` or `{T=}` are left out of `required`. A `@property`
    /// without a type fails the block with [`Error::UntypedProperty`].
    pub fn compile_block(block: &AnnotationBlock) -> Result<(String, ObjectSchema)> {
        let tags = TagClassifier::classify(&block.tags)?;

        let typedef = match tags.typedef.as_slice() {
            [] => {
                return Err(Error::MissingTypedef {
                    block: block.summary(),
                })
            }
            [typedef] => typedef,
            many => {
                return Err(Error::DuplicateTypedef {
                    names: many.iter().map(|t| t.name.to_string()).collect(),
                })
            }
        };

        if let Some(property) = tags.untyped_property.first() {
            return Err(Error::UntypedProperty {
                schema: typedef.name.to_string(),
                property: property.to_string(),
            });
        }

        debug!("Generating object schema for: {}", typedef.name);

        let description = if typedef.description.is_empty() {
            block.description.clone()
        } else {
            typedef.description.to_string()
        };

        let mut schema = ObjectSchema {
            description,
            ..Default::default()
        };

        for property in &tags.property {
            let resolved = TypeResolver::resolve(property.type_expr)?
                .with_description(property.description);

            if !property.type_expr.is_optional() {
                schema.required.push(property.name.to_string());
            }
            schema.properties.insert(property.name.to_string(), resolved);
        }

        Ok((typedef.name.to_string(), schema))
    }
}
