//! Term table: bidirectional content ↔ handle mapping.
//!
//! The [`TermTable`] stores every term once in insertion order and keeps
//! reverse maps per term kind, so lookups by IRI or blank node label borrow
//! the caller's `&str` without allocating. Term strings are shared between
//! the forward vector and the reverse maps through `Arc<str>`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{TermError, TermResult};
use crate::term::{Literal, TableId, Term, TermId};

/// Canonicalizing store: at most one handle per distinct term content.
pub struct TermTable {
    id: TableId,
    /// Forward map: index → term (source of truth).
    terms: Vec<Term>,
    /// Reverse map for resources: IRI → index.
    resources: HashMap<Arc<str>, u32>,
    /// Reverse map for blank nodes: label → index.
    blank_nodes: HashMap<Arc<str>, u32>,
    /// Reverse map for literals: full tuple → index.
    literals: HashMap<Literal, u32>,
}

impl TermTable {
    /// Create an empty table with a process-unique id.
    pub fn with_capacity(capacity: usize) -> TermResult<Self> {
        Ok(Self {
            id: TableId::allocate()?,
            terms: Vec::with_capacity(capacity),
            resources: HashMap::with_capacity(capacity),
            blank_nodes: HashMap::new(),
            literals: HashMap::new(),
        })
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    /// Whether this table issued `id`.
    pub fn owns(&self, id: TermId) -> bool {
        id.table() == self.id && (id.index() as usize) < self.terms.len()
    }

    /// Look up a term by handle. `None` for handles of other tables.
    pub fn get(&self, id: TermId) -> Option<&Term> {
        if id.table() != self.id {
            return None;
        }
        self.terms.get(id.index() as usize)
    }

    pub fn lookup_resource(&self, iri: &str) -> Option<TermId> {
        self.resources.get(iri).map(|&i| self.handle(i))
    }

    pub fn lookup_blank_node(&self, label: &str) -> Option<TermId> {
        self.blank_nodes.get(label).map(|&i| self.handle(i))
    }

    pub fn lookup_literal(&self, literal: &Literal) -> Option<TermId> {
        self.literals.get(literal).map(|&i| self.handle(i))
    }

    /// Look up any term by content.
    pub fn lookup(&self, term: &Term) -> Option<TermId> {
        match term {
            Term::Resource(iri) => self.lookup_resource(iri),
            Term::BlankNode(label) => self.lookup_blank_node(label),
            Term::Literal(lit) => self.lookup_literal(lit),
        }
    }

    /// Return the handle for `term`, inserting it if unseen.
    ///
    /// Content is not validated here; the manager does that before calling.
    pub fn intern(&mut self, term: Term) -> TermResult<TermId> {
        if let Some(id) = self.lookup(&term) {
            return Ok(id);
        }

        let index = u32::try_from(self.terms.len()).map_err(|_| TermError::CapacityExhausted)?;
        match &term {
            Term::Resource(iri) => {
                self.resources.insert(Arc::clone(iri), index);
            }
            Term::BlankNode(label) => {
                self.blank_nodes.insert(Arc::clone(label), index);
            }
            Term::Literal(lit) => {
                self.literals.insert(lit.clone(), index);
            }
        }
        tracing::trace!(table = self.id.get(), index, term = %term, "interned term");
        self.terms.push(term);
        Ok(self.handle(index))
    }

    /// Iterate over `(handle, term)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, &Term)> + '_ {
        self.terms
            .iter()
            .enumerate()
            .map(|(i, term)| (self.handle(i as u32), term))
    }

    /// Number of interned terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn handle(&self, index: u32) -> TermId {
        TermId::new(self.id, index)
    }
}

impl std::fmt::Debug for TermTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermTable")
            .field("id", &self.id.get())
            .field("count", &self.len())
            .finish()
    }
}
