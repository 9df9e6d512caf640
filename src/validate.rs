//! Syntactic contract checked before a term is interned.
//!
//! Only content that is about to be inserted is validated; lookups of
//! already-interned content skip these checks. Blank node labels are the
//! exception, since a graph label must never reach a fresh node.

use crate::config::{IriPolicy, TermManagerConfig};
use crate::error::{TermError, TermResult};
use crate::term::TermKind;

/// Label prefix reserved for blank nodes minted by `TermManager::new_blank_node`.
pub(crate) const FRESH_BLANK_PREFIX: &str = "_fresh";

/// Characters never allowed in an IRI (RFC 3987 excludes them unescaped).
const FORBIDDEN_IRI_CHARS: &[char] = &['<', '>', '"', '{', '}', '|', '^', '`', '\\'];

fn invalid(kind: TermKind, content: &str, reason: impl Into<String>) -> TermError {
    TermError::InvalidTerm {
        kind,
        content: content.to_string(),
        reason: reason.into(),
    }
}

fn check_length(kind: TermKind, content: &str, config: &TermManagerConfig) -> TermResult<()> {
    if content.len() > config.max_term_bytes {
        return Err(invalid(
            kind,
            content,
            format!(
                "{} bytes exceeds the limit of {}",
                content.len(),
                config.max_term_bytes
            ),
        ));
    }
    Ok(())
}

/// Validate a resource IRI.
pub(crate) fn resource(iri: &str, config: &TermManagerConfig) -> TermResult<()> {
    iri_with_kind(TermKind::Resource, iri, config)
}

fn iri_with_kind(kind: TermKind, iri: &str, config: &TermManagerConfig) -> TermResult<()> {
    if iri.is_empty() {
        return Err(invalid(kind, iri, "IRI is empty"));
    }
    check_length(kind, iri, config)?;
    if let Some(c) = iri
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_IRI_CHARS.contains(c))
    {
        return Err(invalid(kind, iri, format!("IRI contains forbidden character {c:?}")));
    }
    if config.iri_policy == IriPolicy::Strict {
        oxigraph::model::NamedNode::new(iri)
            .map_err(|e| invalid(kind, iri, format!("not an absolute IRI: {e}")))?;
    }
    Ok(())
}

/// Validate a blank node label.
pub(crate) fn blank_node(label: &str, config: &TermManagerConfig) -> TermResult<()> {
    let kind = TermKind::BlankNode;
    if label.is_empty() {
        return Err(invalid(kind, label, "label is empty"));
    }
    check_length(kind, label, config)?;
    if let Some(c) = label
        .chars()
        .find(|&c| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(invalid(kind, label, format!("label contains forbidden character {c:?}")));
    }
    if label.starts_with(FRESH_BLANK_PREFIX) {
        return Err(invalid(
            kind,
            label,
            format!("prefix {FRESH_BLANK_PREFIX:?} is reserved for fresh blank nodes"),
        ));
    }
    Ok(())
}

/// Validate the parts of a literal.
pub(crate) fn literal(
    value: &str,
    datatype: Option<&str>,
    language: Option<&str>,
    config: &TermManagerConfig,
) -> TermResult<()> {
    let kind = TermKind::Literal;
    check_length(kind, value, config)?;
    if let Some(datatype) = datatype {
        iri_with_kind(kind, datatype, config)
            .map_err(|e| relabel(e, "datatype"))?;
    }
    if let Some(tag) = language {
        language_tag(tag, config)?;
    }
    Ok(())
}

/// Prefix the reason of an `InvalidTerm` with the part of the literal that failed.
fn relabel(err: TermError, part: &str) -> TermError {
    match err {
        TermError::InvalidTerm {
            kind,
            content,
            reason,
        } => TermError::InvalidTerm {
            kind,
            content,
            reason: format!("{part}: {reason}"),
        },
        other => other,
    }
}

/// `[A-Za-z]{1,8}(-[A-Za-z0-9]{1,8})*`, plus full BCP 47 under the strict policy.
fn language_tag(tag: &str, config: &TermManagerConfig) -> TermResult<()> {
    let kind = TermKind::Literal;
    let reject = |reason: String| invalid(kind, tag, format!("language tag: {reason}"));

    check_length(kind, tag, config)?;
    let mut subtags = tag.split('-');
    let primary = subtags.next().unwrap_or_default();
    if primary.is_empty() || primary.len() > 8 || !primary.chars().all(|c| c.is_ascii_alphabetic())
    {
        return Err(reject("primary subtag must be 1-8 ASCII letters".into()));
    }
    for subtag in subtags {
        if subtag.is_empty()
            || subtag.len() > 8
            || !subtag.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(reject(format!(
                "subtag {subtag:?} must be 1-8 ASCII letters or digits"
            )));
        }
    }
    if config.iri_policy == IriPolicy::Strict {
        oxigraph::model::Literal::new_language_tagged_literal("", tag)
            .map_err(|e| reject(e.to_string()))?;
    }
    Ok(())
}
