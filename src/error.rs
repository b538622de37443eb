use crate::parser::TypeExpression;
use std::path::PathBuf;

/// Result type alias for the annotation compiler
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the annotation compiler.
///
/// Every variant is fatal to the build that produced it: the pipeline stops at the first
/// error and never returns a partial document.
#[derive(Debug)]
pub enum Error {
    /// An annotation source could not be read
    ReadError { file: PathBuf, source: std::io::Error },
    /// One or more annotation sources do not exist (all of them are listed)
    MissingFiles(Vec<PathBuf>),
    /// A tag carried parse errors from the annotation parser
    TagErrors { title: String, messages: Vec<String> },
    /// An `@event` tag does not follow `<METHOD>: <path> - <operationId>`
    MalformedEvent { description: String, reason: String },
    /// A schema block has no usable `@typedef` tag
    MissingTypedef { block: String },
    /// A schema block declares more than one `@typedef`
    DuplicateTypedef { names: Vec<String> },
    /// A `@property` tag in a schema block has no `{type}`
    UntypedProperty { schema: String, property: String },
    /// A type expression shape the resolver cannot map to a schema
    UnsupportedType(TypeExpression),
    /// Neither the config nor the options supplied a server
    MissingServers,
    /// The assembled document failed structural validation
    Validation(String),
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::ReadError { file, source } => {
                write!(f, "Unable to read file {}: {}", file.display(), source)
            }
            Error::MissingFiles(files) => {
                write!(f, "Not found:")?;
                for file in files {
                    write!(f, "\n{}", file.display())?;
                }
                Ok(())
            }
            Error::TagErrors { title, messages } => {
                write!(f, "Invalid @{} tag: {}", title, messages.join(","))
            }
            Error::MalformedEvent { description, reason } => {
                write!(f, "Malformed @event '{}': {}", description, reason)
            }
            Error::MissingTypedef { block } => write!(f, "No typedef assigned for {}", block),
            Error::DuplicateTypedef { names } => {
                write!(f, "Multiple typedefs in one block: {}", names.join(", "))
            }
            Error::UntypedProperty { schema, property } => {
                write!(f, "Property '{}' of {} has no type", property, schema)
            }
            Error::UnsupportedType(expr) => write!(f, "Unable to parse type: {}", expr),
            Error::MissingServers => write!(f, "Server(s) not specified for all paths!"),
            Error::Validation(msg) => write!(f, "Invalid OpenAPI document: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReadError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON serialization error: {}", err))
    }
}
