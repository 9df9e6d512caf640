//! Core term and handle types.
//!
//! A [`Term`] is an immutable RDF term whose identity is its content. A
//! [`TermId`] is the opaque handle a term manager hands out in its place:
//! the id of the issuing table plus an index into it. Handles compare and
//! hash as two integers and never depend on memory addresses.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{TermError, TermResult};
use crate::vocab;

/// Identity of one term table.
///
/// Uses `NonZeroU32` so that `Option<TermId>` is the same size as `TermId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TableId(NonZeroU32);

static NEXT_TABLE_ID: AtomicU32 = AtomicU32::new(1);

impl TableId {
    /// Allocate a table id never handed out before in this process.
    ///
    /// Returns an error once the 32-bit id space is exhausted.
    pub(crate) fn allocate() -> TermResult<Self> {
        let raw = NEXT_TABLE_ID
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .map_err(|_| TermError::CapacityExhausted)?;
        NonZeroU32::new(raw)
            .map(TableId)
            .ok_or(TermError::CapacityExhausted)
    }

    /// Get the underlying `u32` value.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Opaque, copyable handle to an interned term.
///
/// Two handles issued by the same manager are equal iff the underlying term
/// contents are equal. A handle is only meaningful relative to the manager
/// (or meta manager) that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermId {
    table: TableId,
    index: u32,
}

impl TermId {
    pub(crate) fn new(table: TableId, index: u32) -> Self {
        Self { table, index }
    }

    /// The table that issued this handle.
    pub fn table(self) -> TableId {
        self.table
    }

    /// Position of the term in its table (insertion order).
    pub fn index(self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "term:{}.{}", self.table.get(), self.index)
    }
}

/// Classification of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    Resource,
    BlankNode,
    Literal,
}

impl std::fmt::Display for TermKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TermKind::Resource => write!(f, "resource"),
            TermKind::BlankNode => write!(f, "blank node"),
            TermKind::Literal => write!(f, "literal"),
        }
    }
}

/// A literal value with optional datatype IRI and language tag.
///
/// Identity is the full `(value, datatype, language)` tuple: literals that
/// differ in any of the three are distinct terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    value: Arc<str>,
    datatype: Option<Arc<str>>,
    language: Option<Arc<str>>,
}

impl Literal {
    pub fn new(value: &str, datatype: Option<&str>, language: Option<&str>) -> Self {
        Self {
            value: Arc::from(value),
            datatype: datatype.map(Arc::from),
            language: language.map(Arc::from),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

/// An immutable RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    /// A named resource.
    Resource(Arc<str>),
    /// An anonymous node, identified by a label local to one graph.
    BlankNode(Arc<str>),
    /// A data value.
    Literal(Literal),
}

impl Term {
    pub fn resource(iri: &str) -> Self {
        Term::Resource(Arc::from(iri))
    }

    pub fn blank_node(label: &str) -> Self {
        Term::BlankNode(Arc::from(label))
    }

    pub fn literal(value: &str, datatype: Option<&str>, language: Option<&str>) -> Self {
        Term::Literal(Literal::new(value, datatype, language))
    }

    pub fn kind(&self) -> TermKind {
        match self {
            Term::Resource(_) => TermKind::Resource,
            Term::BlankNode(_) => TermKind::BlankNode,
            Term::Literal(_) => TermKind::Literal,
        }
    }

    /// The IRI if this is a resource.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Resource(iri) => Some(&**iri),
            _ => None,
        }
    }

    /// Convert an oxigraph term produced by a graph loader.
    ///
    /// Simple literals carry `xsd:string` explicitly; language-tagged
    /// literals carry no datatype, only their tag.
    pub fn from_oxigraph(term: oxigraph::model::TermRef<'_>) -> TermResult<Self> {
        use oxigraph::model::TermRef;

        match term {
            TermRef::NamedNode(node) => Ok(Term::resource(node.as_str())),
            TermRef::BlankNode(node) => Ok(Term::blank_node(node.as_str())),
            TermRef::Literal(lit) => Ok(match lit.language() {
                Some(lang) => Term::literal(lit.value(), None, Some(lang)),
                None => Term::literal(lit.value(), Some(lit.datatype().as_str()), None),
            }),
            #[allow(unreachable_patterns)]
            other => Err(TermError::InvalidTerm {
                kind: TermKind::Resource,
                content: other.to_string(),
                reason: "quoted triples cannot be interned".into(),
            }),
        }
    }

    /// Convert to an oxigraph term, for exporting a table to RDF tooling.
    pub fn to_oxigraph(&self) -> TermResult<oxigraph::model::Term> {
        use oxigraph::model::{BlankNode, Literal as OxLiteral, NamedNode};

        let invalid = |reason: String| TermError::InvalidTerm {
            kind: self.kind(),
            content: self.to_string(),
            reason,
        };

        match self {
            Term::Resource(iri) => NamedNode::new(&**iri)
                .map(Into::into)
                .map_err(|e| invalid(e.to_string())),
            Term::BlankNode(label) => BlankNode::new(&**label)
                .map(Into::into)
                .map_err(|e| invalid(e.to_string())),
            Term::Literal(lit) => {
                let literal = match (lit.datatype(), lit.language()) {
                    (None, None) => OxLiteral::new_simple_literal(lit.value()),
                    (None, Some(lang)) | (Some(vocab::rdf::LANG_STRING), Some(lang)) => {
                        OxLiteral::new_language_tagged_literal(lit.value(), lang)
                            .map_err(|e| invalid(e.to_string()))?
                    }
                    (Some(datatype), None) => {
                        let datatype =
                            NamedNode::new(datatype).map_err(|e| invalid(e.to_string()))?;
                        OxLiteral::new_typed_literal(lit.value(), datatype)
                    }
                    (Some(_), Some(_)) => {
                        return Err(invalid(
                            "RDF only allows rdf:langString on language-tagged literals".into(),
                        ));
                    }
                };
                Ok(literal.into())
            }
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Resource(iri) => write!(f, "<{iri}>"),
            Term::BlankNode(label) => write!(f, "_:{label}"),
            Term::Literal(lit) => {
                f.write_str("\"")?;
                for c in lit.value().chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")?;
                if let Some(lang) = lit.language() {
                    write!(f, "@{lang}")?;
                }
                if let Some(datatype) = lit.datatype() {
                    write!(f, "^^<{datatype}>")?;
                }
                Ok(())
            }
        }
    }
}
