use crate::config::{Config, Container, Options, Server, ServerOverride};
use crate::error::{Error, Result};
use crate::grouping::DocsContainer;
use crate::route_compiler::HttpMethod;
use crate::schema_generator::ObjectSchema;
use crate::type_resolver::Schema;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// OpenAPI version written to every document
pub const OPENAPI_VERSION: &str = "3.0.2";

/// Media type used for request bodies and responses
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Document-level servers
    servers: Vec<Server>,
    /// Path-scoped server overrides, in priority order
    overrides: Vec<ServerOverride>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    pub description: String,
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Container>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<Container>,
}

/// OpenAPI PathItem object - all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    /// Servers replacing the document-level ones for this path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
}

/// OpenAPI Operation object compiled from one route block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Free text of the annotation block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<ContentObject>,
    /// Responses keyed by status code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<IndexMap<String, ContentObject>>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub required: bool,
    pub description: String,
    /// Parameter location (query, path, header, cookie)
    #[serde(rename = "in")]
    pub location: String,
    pub name: String,
    pub schema: Schema,
}

/// Request body or response: a description plus content keyed by media type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentObject {
    pub description: String,
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub schemas: IndexMap<String, ObjectSchema>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    pub servers: Vec<Server>,
    pub paths: IndexMap<String, PathItem>,
    pub components: Components,
}

impl Operation {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            description: None,
            operation_id: operation_id.into(),
            tags: None,
            parameters: None,
            request_body: None,
            responses: None,
        }
    }
}

impl ContentObject {
    /// Wraps a schema as `application/json` content.
    pub fn json(description: impl Into<String>, schema: Schema) -> Self {
        let mut content = IndexMap::new();
        content.insert(JSON_MEDIA_TYPE.to_string(), MediaType { schema });
        Self {
            description: description.into(),
            content,
        }
    }

    /// Schema of the `application/json` content, if any
    pub fn json_schema(&self) -> Option<&Schema> {
        self.content.get(JSON_MEDIA_TYPE).map(|m| &m.schema)
    }
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    /// Stores the operation for `method`, returning the one it replaced.
    pub fn set_operation(&mut self, method: HttpMethod, operation: Operation) -> Option<Operation> {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Trace => &mut self.trace,
        };
        slot.replace(operation)
    }

    /// All declared operations in method order
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> + '_ {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |method| self.operation(method).map(|op| (method, op)))
    }
}

impl OpenApiBuilder {
    /// Create a builder from the caller's metadata.
    ///
    /// `title`, `version` and `description` default to empty strings; `termsOfService`,
    /// `contact` and `license` are only written when the options carry them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingServers`] unless `config.servers` or `options.servers` holds at
    /// least one entry.
    pub fn new(config: &Config, options: &Options) -> Result<Self> {
        debug!("Initializing OpenApiBuilder");

        let has_servers = config.servers.as_ref().is_some_and(|s| !s.is_empty());
        let has_overrides = options.servers.as_ref().is_some_and(|s| !s.is_empty());
        if !has_servers && !has_overrides {
            return Err(Error::MissingServers);
        }

        let info = Info {
            title: config.title.clone().unwrap_or_default(),
            version: config.version.clone().unwrap_or_default(),
            description: config.description.clone().unwrap_or_default(),
            terms_of_service: options.terms_of_service.clone(),
            contact: options.contact.clone(),
            license: options.license.clone(),
        };

        Ok(Self {
            info,
            servers: config.servers.clone().unwrap_or_default(),
            overrides: options.servers.clone().unwrap_or_default(),
        })
    }

    /// Build the final OpenAPI document from the grouped paths and schemas
    pub fn build(self, docs: DocsContainer) -> OpenApiDocument {
        debug!(
            "Building final OpenAPI document ({} paths, {} schemas)",
            docs.paths.len(),
            docs.schemas.len()
        );

        let paths = apply_server_overrides(docs.paths, &self.overrides);

        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            servers: self.servers,
            paths,
            components: Components {
                schemas: docs.schemas,
            },
        }
    }
}

/// Sets `servers` on every path matched by an override.
///
/// Overrides are tried in list order and the first whose `root` is a prefix of the path wins,
/// even when a later root is longer. Unmatched paths are left without `servers`.
pub fn apply_server_overrides(
    mut paths: IndexMap<String, PathItem>,
    overrides: &[ServerOverride],
) -> IndexMap<String, PathItem> {
    for (path, item) in paths.iter_mut() {
        if let Some(server) = overrides.iter().find(|s| path.starts_with(&s.root)) {
            debug!("Path {} served by {}", path, server.url);
            item.servers = Some(vec![Server {
                url: server.url.clone(),
                description: Some(server.description.clone().unwrap_or_default()),
            }]);
        }
    }
    paths
}
