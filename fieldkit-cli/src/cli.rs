//! Command-line definitions for the fieldkit CLI

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use fieldkit_fields::SchemaScope;

/// Output format for command results
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "fieldkit")]
#[command(version)]
#[command(about = "Schema-driven structured content engine")]
#[command(long_about = "
fieldkit validates field schemas, cleans submitted values against them and
resolves field values through document, group and site-global layers.

Schemas are YAML documents with a top-level `fields` list. Schemas and values
are persisted under the configured store root (default: .fieldkit/data).

Example usage:
  fieldkit validate schema.yaml --context page.php
  fieldkit save-schema schema.yaml --scope template:page.php
  fieldkit bind 42 page.php
  fieldkit save-document 42 values.yaml --shared price
  fieldkit resolve title --document 42
")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format for results
    #[arg(long, value_enum, default_value_t, global = true)]
    pub format: OutputFormat,

    /// Load this configuration file on top of the discovered ones
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Store root directory, overriding the configured one
    #[arg(long, global = true, value_name = "DIR")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a schema with shorthand entries expanded
    Normalize {
        /// Schema source file
        schema: PathBuf,
    },

    /// Check a schema without saving it
    ///
    /// Exits with 1 when the schema is rejected.
    Validate {
        /// Schema source file
        schema: PathBuf,

        /// Template the schema is meant for, e.g. page.php
        #[arg(long)]
        context: Option<String>,
    },

    /// Clean a values file against a schema and print the result
    Sanitize {
        /// Schema source file
        #[arg(long)]
        schema: PathBuf,

        /// Submitted values file (YAML or JSON)
        #[arg(long)]
        data: PathBuf,

        /// Treat the author as trusted with code fields
        #[arg(long)]
        trusted: bool,
    },

    /// Validate and store a schema
    #[command(name = "save-schema")]
    SaveSchema {
        /// Schema source file
        schema: PathBuf,

        /// Where the schema applies: template:<id>, group:<id> or global
        #[arg(long)]
        scope: SchemaScope,

        /// Context for policy checks, defaulting to the scope's template
        #[arg(long)]
        context: Option<String>,
    },

    /// Print a stored schema
    #[command(name = "show-schema")]
    ShowSchema {
        #[arg(long)]
        scope: SchemaScope,

        /// Print the source as it was saved instead of the canonical tree
        #[arg(long)]
        source: bool,
    },

    /// Bind a document to a template
    Bind {
        document: String,
        template: String,
    },

    /// Clean and store a document's values
    #[command(name = "save-document")]
    SaveDocument {
        document: String,

        /// Submitted values file (YAML or JSON)
        data: PathBuf,

        /// Field that takes its value from the template's group data
        #[arg(long = "shared", value_name = "FIELD")]
        shared: Vec<String>,

        #[arg(long)]
        trusted: bool,
    },

    /// Clean and store group or site-global values
    #[command(name = "save-values")]
    #[command(group(ArgGroup::new("layer").required(true).args(["group", "global"])))]
    SaveValues {
        /// Submitted values file (YAML or JSON)
        data: PathBuf,

        /// Template whose group values are saved
        #[arg(long)]
        group: Option<String>,

        /// Save the site-global values
        #[arg(long)]
        global: bool,

        #[arg(long)]
        trusted: bool,
    },

    /// Turn site-global values on for a template
    #[command(name = "enable-global")]
    EnableGlobal {
        template: String,

        /// Turn them off instead
        #[arg(long)]
        disable: bool,
    },

    /// Resolve one field for a document or a group
    #[command(group(ArgGroup::new("target").required(true).args(["document", "group"])))]
    Resolve {
        /// Field name
        field: String,

        #[arg(long)]
        document: Option<String>,

        /// Template whose group values are read
        #[arg(long)]
        group: Option<String>,

        /// Fall back to the schema default when nothing resolves
        #[arg(long)]
        default: bool,
    },

    /// Resolve every schema field of a document
    #[command(name = "resolve-all")]
    ResolveAll { document: String },
}
