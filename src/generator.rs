//! Build entry points tying the pipeline together.
//!
//! `text -> parse -> group -> assemble -> validate`, with file inputs checked and read first.

use crate::config::{Config, Options};
use crate::error::Result;
use crate::grouping::group_by_doc_type;
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::parser::AnnotationParser;
use crate::reader::{check_files, read_files};
use crate::validator::SpecValidator;
use log::{debug, info};
use std::path::PathBuf;

/// Where annotations come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocSource {
    /// Annotated source text
    Text(String),
    /// Files read in order and joined with newlines
    Files(Vec<PathBuf>),
}

/// Builds a document from either source kind.
pub fn build_spec(source: &DocSource, config: &Config, options: &Options) -> Result<OpenApiDocument> {
    match source {
        DocSource::Text(text) => build_spec_from_str(text, config, options),
        DocSource::Files(paths) => build_spec_from_files(paths, config, options),
    }
}

/// Builds a document from annotated source text.
///
/// The server check runs before anything is parsed, so a missing server is reported even
/// for text with broken annotations.
pub fn build_spec_from_str(text: &str, config: &Config, options: &Options) -> Result<OpenApiDocument> {
    let builder = OpenApiBuilder::new(config, options)?;

    let blocks = AnnotationParser::parse(text);
    let docs = group_by_doc_type(&blocks)?;
    info!(
        "Compiled {} paths and {} schemas",
        docs.paths.len(),
        docs.schemas.len()
    );

    let document = builder.build(docs);
    SpecValidator::validate(document)
}

/// Builds a document from annotated files.
///
/// Every path is checked before any is read; all missing paths are reported together.
pub fn build_spec_from_files(
    paths: &[PathBuf],
    config: &Config,
    options: &Options,
) -> Result<OpenApiDocument> {
    debug!("Building from {} files", paths.len());
    check_files(paths)?;
    let text = read_files(paths)?;
    build_spec_from_str(&text, config, options)
}
