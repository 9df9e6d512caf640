//! Bulk loading of term specs into a manager.
//!
//! A term file is a JSON array of specs:
//!
//! ```json
//! [
//!   {"resource": "http://ex.org/Person"},
//!   {"blank": "b0"},
//!   {"literal": "42", "datatype": "http://www.w3.org/2001/XMLSchema#integer"},
//!   {"literal": "chat", "language": "fr"}
//! ]
//! ```
//!
//! Loading stops at the first rejected entry and reports its position.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::manager::TermManager;
use crate::term::TermId;

/// Description of one term to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermSpec {
    Resource {
        resource: String,
    },
    Blank {
        blank: String,
    },
    Literal {
        literal: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

/// Parse a JSON array of term specs.
pub fn parse_specs(json: &str) -> Result<Vec<TermSpec>, LoadError> {
    parse_named(json, "<inline>")
}

/// Read and parse a term file.
pub fn read_specs(path: &Path) -> Result<Vec<TermSpec>, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_named(&content, &path.display().to_string())
}

fn parse_named(json: &str, path: &str) -> Result<Vec<TermSpec>, LoadError> {
    serde_json::from_str(json).map_err(|e| LoadError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Resolve every spec in order, returning one handle per spec.
pub fn load_specs(manager: &mut TermManager, specs: &[TermSpec]) -> Result<Vec<TermId>, LoadError> {
    let mut ids = Vec::with_capacity(specs.len());
    for (index, spec) in specs.iter().enumerate() {
        let resolved = match spec {
            TermSpec::Resource { resource } => manager.resolve_resource(resource),
            TermSpec::Blank { blank } => manager.resolve_blank_node(blank),
            TermSpec::Literal {
                literal,
                datatype,
                language,
            } => manager.resolve_literal(literal, datatype.as_deref(), language.as_deref()),
        };
        let id = resolved.map_err(|source| {
            tracing::warn!(index, error = %source, "term load step rejected");
            LoadError::Entry { index, source }
        })?;
        ids.push(id);
    }
    tracing::debug!(
        specs = specs.len(),
        terms = manager.term_count(),
        "loaded term specs"
    );
    Ok(ids)
}
