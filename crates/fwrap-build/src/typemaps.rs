//! Typemap rule files.
//!
//! A rule file holds extra [`TypemapRule`]s, either as TOML with one
//! `[[typemap]]` table per rule or as a JSON array of rule objects.

use crate::error::{BuildError, Result};
use fwrap_gen::TypemapRule;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(rename = "typemap", default)]
    rules: Vec<TypemapRule>,
}

/// Parse the TOML form of a rule file.
pub fn parse_toml_rules(text: &str) -> Result<Vec<TypemapRule>> {
    let file: RuleFile = toml::from_str(text)?;
    Ok(file.rules)
}

/// Parse the JSON form of a rule file.
pub fn parse_json_rules(text: &str) -> Result<Vec<TypemapRule>> {
    Ok(serde_json::from_str(text)?)
}

/// Load a rule file, choosing the format from its extension.
pub fn load_rules(path: &Path) -> Result<Vec<TypemapRule>> {
    let text = std::fs::read_to_string(path).map_err(|source| BuildError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => parse_toml_rules(&text)?,
        Some("json") => parse_json_rules(&text)?,
        _ => return Err(BuildError::UnsupportedFormat(path.to_path_buf())),
    };
    tracing::debug!(path = %path.display(), rules = rules.len(), "loaded typemap rules");
    Ok(rules)
}
