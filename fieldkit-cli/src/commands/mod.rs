//! Command implementations
//!
//! Each command returns an [`Outcome`]: what to print and which exit code to
//! use. Failures are plain `anyhow` errors with context naming the file or
//! document involved.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use fieldkit_config::EngineConfig;
use fieldkit_fields::{FieldsContext, FileMetaStore, FileStore, ValidationResult};
use serde_json::Value;

use crate::cli::{Commands, OutputFormat};
use crate::exit_codes::{EXIT_SUCCESS, EXIT_WARNING};

pub mod resolve;
pub mod schema;
pub mod values;

/// What a command produced
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Value(Value),
    Text(String),
}

/// Result of running a command
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub output: Option<Output>,
    pub exit_code: i32,
}

impl Outcome {
    pub fn value(value: Value) -> Self {
        Self {
            output: Some(Output::Value(value)),
            exit_code: EXIT_SUCCESS,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            output: Some(Output::Text(text.into())),
            exit_code: EXIT_SUCCESS,
        }
    }

    pub fn done() -> Self {
        Self {
            output: None,
            exit_code: EXIT_SUCCESS,
        }
    }

    /// Print the validation result; exit with a warning when it was rejected.
    pub fn validation(result: &ValidationResult) -> Result<Self> {
        let exit_code = if result.valid { EXIT_SUCCESS } else { EXIT_WARNING };
        Ok(Self {
            output: Some(Output::Value(serde_json::to_value(result)?)),
            exit_code,
        })
    }

    /// Render the output for stdout, if there is any.
    pub fn render(&self, format: OutputFormat) -> Result<Option<String>> {
        let Some(output) = &self.output else {
            return Ok(None);
        };
        let rendered = match output {
            Output::Text(text) if text.ends_with('\n') => text.clone(),
            Output::Text(text) => format!("{text}\n"),
            Output::Value(value) => match format {
                OutputFormat::Yaml => serde_yaml_ng::to_string(value)?,
                OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(value)?),
            },
        };
        Ok(Some(rendered))
    }
}

/// Settings every command runs with
#[derive(Debug, Clone)]
pub struct CommandEnv {
    pub config: EngineConfig,
}

impl CommandEnv {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Open the file-backed engine at the configured store root, creating it if needed.
    pub fn open_context(&self) -> Result<FieldsContext<FileStore, FileMetaStore>> {
        let root = &self.config.store.root;
        let context = FieldsContext::open(root)
            .with_context(|| format!("opening store at {}", root.display()))?
            .with_keys(self.config.store.keys())
            .with_policy(self.config.policy.context_policy())
            .build();
        Ok(context)
    }
}

/// Dispatch a parsed command
pub fn run(command: &Commands, env: &CommandEnv) -> Result<Outcome> {
    match command {
        Commands::Normalize { schema } => schema::normalize(schema),
        Commands::Validate { schema, context } => {
            schema::validate(env, schema, context.as_deref())
        }
        Commands::Sanitize {
            schema,
            data,
            trusted,
        } => values::sanitize(schema, data, *trusted),
        Commands::SaveSchema {
            schema,
            scope,
            context,
        } => schema::save(env, scope, schema, context.as_deref()),
        Commands::ShowSchema { scope, source } => schema::show(env, scope, *source),
        Commands::Bind { document, template } => values::bind(env, document, template),
        Commands::SaveDocument {
            document,
            data,
            shared,
            trusted,
        } => values::save_document(env, document, data, shared, *trusted),
        Commands::SaveValues {
            data,
            group,
            global: _,
            trusted,
        } => values::save_layer(env, group.as_deref(), data, *trusted),
        Commands::EnableGlobal { template, disable } => {
            values::enable_global(env, template, !*disable)
        }
        Commands::Resolve {
            field,
            document,
            group,
            default,
        } => resolve::resolve(env, field, document.as_deref(), group.as_deref(), *default),
        Commands::ResolveAll { document } => resolve::resolve_all(env, document),
    }
}

pub(crate) fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Read a values file. YAML is a superset of JSON, so both are accepted.
pub(crate) fn read_values(path: &Path) -> Result<Value> {
    let source = read_source(path)?;
    serde_yaml_ng::from_str(&source).with_context(|| format!("parsing {}", path.display()))
}
