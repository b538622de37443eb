//! OpenAPI from annotations - compile JSDoc-style API annotations into OpenAPI 3.0 documents.
//!
//! Route handlers and data models are documented with doc comments:
//!
//! ```text
//! /**
//!  * Get an array of Todos.
//!  * @event GET: /todos - getTodos
//!  * @param {integer} [query.limit] - Max number of items
//!  * @returns {Todo[]} 200 - An array of todos
//!  */
//!
//! /**
//!  * @typedef Todo
//!  * @property {string} id - Unique identifier
//!  */
//! ```
//!
//! # Architecture
//!
//! 1. [`reader`] / [`scanner`] - Collect and read annotated source files
//! 2. [`parser`] - Turns doc comments into annotation blocks and tags
//! 3. [`classifier`] - Sorts the well-formed tags of a block by title
//! 4. [`type_resolver`] - Maps type expressions to schema fragments
//! 5. [`route_compiler`] / [`schema_generator`] - Compile route and model blocks
//! 6. [`grouping`] - Merges compiled blocks into paths and component schemas
//! 7. [`openapi_builder`] - Assembles the document with info and servers
//! 8. [`validator`] - Structural checks on the finished document
//! 9. [`serializer`] - YAML or JSON output
//!
//! # Example Usage
//!
//! ```
//! use openapi_from_annotations::config::{Config, Options, Server};
//! use openapi_from_annotations::build_spec_from_str;
//!
//! let config = Config {
//!     title: Some("Todo API".to_string()),
//!     servers: Some(vec![Server { url: "http://localhost:3000".to_string(), description: None }]),
//!     ..Default::default()
//! };
//! let text = "/**\n * @event GET: /ping - ping\n * @returns {string} 200 - pong\n */";
//!
//! let doc = build_spec_from_str(text, &config, &Options::default()).unwrap();
//! assert_eq!(doc.paths["/ping"].get.as_ref().unwrap().operation_id, "ping");
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod grouping;
pub mod openapi_builder;
pub mod parser;
pub mod reader;
pub mod route_compiler;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod type_resolver;
pub mod validator;

pub use error::{Error, Result};
pub use generator::{build_spec, build_spec_from_files, build_spec_from_str, DocSource};
