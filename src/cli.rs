use crate::config::{Server, Settings};
use crate::generator::{build_spec, DocSource};
use crate::scanner::FileScanner;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::io::Read;
use std::path::PathBuf;

/// OpenAPI from annotations - compile JSDoc-style route and model annotations into an OpenAPI 3.0 document
#[derive(Parser, Debug)]
#[command(name = "openapi-from-annotations")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Annotated source files or directories (reads stdin when none are given)
    #[arg(value_name = "INPUTS")]
    pub inputs: Vec<PathBuf>,

    /// Settings file holding `config` and `options` (JSON, or YAML for .yaml/.yml)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// API title (overrides the settings file)
    #[arg(long = "title")]
    pub title: Option<String>,

    /// API version (overrides the settings file)
    #[arg(long = "api-version", value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Server URL added to the document servers (repeatable)
    #[arg(long = "server", value_name = "URL")]
    pub servers: Vec<String>,

    /// File extension scanned in directories (repeatable; defaults to js, jsx, ts, tsx, mjs, cjs)
    #[arg(short = 'e', long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if let Some(ref config_path) = args.config_path {
        if !config_path.is_file() {
            anyhow::bail!("Settings file does not exist: {}", config_path.display());
        }
        info!("Settings file: {}", config_path.display());
    }

    if args.inputs.is_empty() {
        info!("Input: stdin");
    } else {
        for input in &args.inputs {
            info!("Input: {}", input.display());
        }
    }
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Settings file contents with the command line overrides applied
pub fn load_settings(args: &CliArgs) -> Result<Settings> {
    let mut settings = match &args.config_path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if let Some(title) = &args.title {
        settings.config.title = Some(title.clone());
    }
    if let Some(version) = &args.api_version {
        settings.config.version = Some(version.clone());
    }
    if !args.servers.is_empty() {
        settings
            .config
            .servers
            .get_or_insert_with(Vec::new)
            .extend(args.servers.iter().map(|url| Server {
                url: url.clone(),
                description: None,
            }));
    }

    Ok(settings)
}

/// Expands directories into their matching files; other inputs are kept as given.
pub fn collect_inputs(args: &CliArgs) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in &args.inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let mut scanner = FileScanner::new(input.clone());
        if !args.extensions.is_empty() {
            scanner = scanner.with_extensions(&args.extensions);
        }
        let scan_result = scanner.scan()?;
        info!(
            "Found {} source files in {}",
            scan_result.source_files.len(),
            input.display()
        );
        for warning in &scan_result.warnings {
            warn!("{}", warning);
        }
        files.extend(scan_result.source_files);
    }

    Ok(files)
}

/// Compile the inputs into a serialized document
pub fn generate(args: &CliArgs) -> Result<String> {
    let settings = load_settings(args)?;

    let source = if args.inputs.is_empty() {
        info!("Reading annotations from stdin...");
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read annotations from stdin")?;
        DocSource::Text(text)
    } else {
        let files = collect_inputs(args)?;
        if files.is_empty() {
            anyhow::bail!("No annotated source files found in the given inputs");
        }
        DocSource::Files(files)
    };

    info!("Building OpenAPI document...");
    let document = build_spec(&source, &settings.config, &settings.options)?;
    info!(
        "OpenAPI document built successfully ({} paths, {} schemas)",
        document.paths.len(),
        document.components.schemas.len()
    );

    info!("Serializing to {:?} format...", args.output_format);
    match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document),
        OutputFormat::Json => serialize_json(&document),
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    let content = generate(&args)?;

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}
