//! Value commands: sanitize, bind, save-document, save-values, enable-global

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use fieldkit_common::Pretty;
use fieldkit_fields::{normalize, sanitize as clean, Schema, SchemaDecoder, YamlDecoder};
use tracing::{debug, info};

use super::{read_source, read_values, CommandEnv, Outcome};

/// Clean a values file against a schema file without touching the store.
pub fn sanitize(schema_path: &Path, data_path: &Path, trusted: bool) -> Result<Outcome> {
    let source = read_source(schema_path)?;
    let tree = YamlDecoder
        .decode(&source)
        .map_err(|message| anyhow!(message))
        .with_context(|| format!("decoding {}", schema_path.display()))?;
    let schema = Schema::from_tree(&normalize(&tree))
        .with_context(|| format!("reading schema {}", schema_path.display()))?;
    let raw = read_values(data_path)?;

    let cleaned = clean(&raw, &schema, trusted);
    debug!(values = %Pretty(&cleaned), "values sanitized");
    Ok(Outcome::value(cleaned))
}

pub fn bind(env: &CommandEnv, document: &str, template: &str) -> Result<Outcome> {
    let mut fields = env.open_context()?;
    fields
        .bind_document(document, template)
        .with_context(|| format!("binding document {document}"))?;
    info!(%document, %template, "document bound");
    Ok(Outcome::done())
}

pub fn save_document(
    env: &CommandEnv,
    document: &str,
    data: &Path,
    shared: &[String],
    trusted: bool,
) -> Result<Outcome> {
    let raw = read_values(data)?;
    let mut fields = env.open_context()?;
    let cleaned = fields
        .save_document(document, &raw, shared, trusted)
        .with_context(|| format!("saving document {document}"))?;
    Ok(Outcome::value(cleaned))
}

/// Save group values when `group` names a template, site-global values otherwise.
pub fn save_layer(
    env: &CommandEnv,
    group: Option<&str>,
    data: &Path,
    trusted: bool,
) -> Result<Outcome> {
    let raw = read_values(data)?;
    let mut fields = env.open_context()?;
    let cleaned = match group {
        Some(template) => fields
            .save_group_values(template, &raw, trusted)
            .with_context(|| format!("saving group values for {template}"))?,
        None => fields
            .save_global_values(&raw, trusted)
            .context("saving global values")?,
    };
    Ok(Outcome::value(cleaned))
}

pub fn enable_global(env: &CommandEnv, template: &str, enabled: bool) -> Result<Outcome> {
    let mut fields = env.open_context()?;
    fields
        .set_global_enabled(template, enabled)
        .with_context(|| format!("updating site-global flag for {template}"))?;
    info!(%template, enabled, "site-global values toggled");
    Ok(Outcome::done())
}
