//! Schema commands: normalize, validate, save-schema, show-schema

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use fieldkit_common::Pretty;
use fieldkit_fields::{normalize as normalize_tree, SchemaDecoder, SchemaScope, SchemaValidator, YamlDecoder};
use tracing::debug;

use super::{read_source, CommandEnv, Outcome};

pub fn normalize(path: &Path) -> Result<Outcome> {
    let source = read_source(path)?;
    let tree = YamlDecoder
        .decode(&source)
        .map_err(|message| anyhow!(message))
        .with_context(|| format!("decoding {}", path.display()))?;
    Ok(Outcome::value(normalize_tree(&tree)))
}

pub fn validate(env: &CommandEnv, path: &Path, context: Option<&str>) -> Result<Outcome> {
    let source = read_source(path)?;
    let validator = SchemaValidator::new(env.config.policy.context_policy());
    let result = validator.validate(&source, context);
    debug!(valid = result.valid, schema = %path.display(), "schema validated");
    Outcome::validation(&result)
}

pub fn save(
    env: &CommandEnv,
    scope: &SchemaScope,
    path: &Path,
    context: Option<&str>,
) -> Result<Outcome> {
    let source = read_source(path)?;
    let mut fields = env.open_context()?;
    let result = fields
        .save_schema(scope, &source, context)
        .with_context(|| format!("saving schema for {scope}"))?;
    Outcome::validation(&result)
}

pub fn show(env: &CommandEnv, scope: &SchemaScope, source: bool) -> Result<Outcome> {
    let fields = env.open_context()?;
    if source {
        return Ok(match fields.schema_source(scope)? {
            Some(text) => Outcome::text(text),
            None => Outcome::done(),
        });
    }
    let schema = fields
        .load_schema(scope)
        .with_context(|| format!("loading schema for {scope}"))?;
    let tree = schema.to_tree()?;
    debug!(%scope, schema = %Pretty(&tree), "schema loaded");
    Ok(Outcome::value(tree))
}
