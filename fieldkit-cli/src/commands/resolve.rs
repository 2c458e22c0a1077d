//! Resolution commands

use anyhow::{bail, Context, Result};
use fieldkit_fields::ResolutionContext;
use serde_json::Value;

use super::{CommandEnv, Outcome};

/// Resolve a field for a document or a group. Prints null when nothing resolves.
pub fn resolve(
    env: &CommandEnv,
    field: &str,
    document: Option<&str>,
    group: Option<&str>,
    with_default: bool,
) -> Result<Outcome> {
    let ctx = match (document, group) {
        (Some(id), None) => ResolutionContext::document(id),
        (None, Some(template)) => ResolutionContext::group(template),
        _ => bail!("resolve needs exactly one of --document or --group"),
    };
    let fields = env.open_context()?;
    let resolved = if with_default {
        fields.resolve_or_default(field, &ctx)
    } else {
        fields.resolve(field, &ctx)
    };
    let value = resolved.with_context(|| format!("resolving '{field}'"))?;
    Ok(Outcome::value(value.unwrap_or(Value::Null)))
}

pub fn resolve_all(env: &CommandEnv, document: &str) -> Result<Outcome> {
    let fields = env.open_context()?;
    let values = fields
        .resolve_all(document)
        .with_context(|| format!("resolving document {document}"))?;
    Ok(Outcome::value(Value::Object(values)))
}
