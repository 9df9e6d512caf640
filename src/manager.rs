//! Term manager: the sole creator of terms and handles for one session.
//!
//! The manager moves through two phases. While a graph loads, the loader owns
//! it and resolves terms through `&mut self`. [`TermManager::freeze`] then
//! moves it behind an `Arc`, after which only `&self` lookups remain reachable
//! and any number of evaluation workers may read it without locking.
//!
//! A session manager may be layered over a frozen *meta* manager holding the
//! rule compiler's resources: lookups consult the meta first, so terms it
//! already knows keep the meta's handles, and only new terms land in the
//! session's own table.

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::TermManagerConfig;
use crate::error::{TermError, TermResult, TermsResult};
use crate::table::TermTable;
use crate::term::{Literal, TableId, Term, TermId, TermKind};
use crate::validate;
use crate::vocab::xsd;

/// A `(handle, term)` pair, the unit of a diagnostics dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    pub id: TermId,
    pub term: Term,
}

/// Term counts by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStats {
    pub resources: usize,
    pub blank_nodes: usize,
    pub literals: usize,
    /// Terms visible through the meta manager, if any.
    pub meta_terms: usize,
}

impl std::fmt::Display for TermStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Resources:   {}", self.resources)?;
        writeln!(f, "Blank nodes: {}", self.blank_nodes)?;
        writeln!(f, "Literals:    {}", self.literals)?;
        write!(f, "Meta terms:  {}", self.meta_terms)
    }
}

/// Canonical term store for one graph-load session.
pub struct TermManager {
    config: TermManagerConfig,
    table: TermTable,
    meta: Option<Arc<TermManager>>,
    next_blank: u64,
}

impl TermManager {
    /// Create an empty manager.
    pub fn new(config: TermManagerConfig) -> TermsResult<Self> {
        config.validate()?;
        let table = TermTable::with_capacity(config.capacity_hint)?;
        tracing::debug!(table = table.id().get(), "created term manager");
        Ok(Self {
            config,
            table,
            meta: None,
            next_blank: 0,
        })
    }

    /// Create a session manager layered over a frozen meta manager.
    pub fn with_meta(meta: Arc<TermManager>, config: TermManagerConfig) -> TermsResult<Self> {
        let mut manager = Self::new(config)?;
        tracing::debug!(
            table = manager.table.id().get(),
            meta_table = meta.table.id().get(),
            meta_terms = meta.term_count(),
            "layered term manager over meta"
        );
        manager.meta = Some(meta);
        Ok(manager)
    }

    pub fn config(&self) -> &TermManagerConfig {
        &self.config
    }

    /// Id of this manager's own table.
    pub fn table_id(&self) -> TableId {
        self.table.id()
    }

    pub fn meta(&self) -> Option<&Arc<TermManager>> {
        self.meta.as_ref()
    }

    // -----------------------------------------------------------------------
    // Load phase: resolving (creating) operations
    // -----------------------------------------------------------------------

    /// Return the canonical handle for a resource IRI, creating it if unseen.
    pub fn resolve_resource(&mut self, iri: &str) -> TermResult<TermId> {
        if let Some(id) = self.try_resolve(iri) {
            return Ok(id);
        }
        validate::resource(iri, &self.config)?;
        self.table.intern(Term::resource(iri))
    }

    /// Return the canonical handle for a literal, creating it if unseen.
    ///
    /// Canonicalizes by the full `(value, datatype, language)` tuple.
    pub fn resolve_literal(
        &mut self,
        value: &str,
        datatype: Option<&str>,
        language: Option<&str>,
    ) -> TermResult<TermId> {
        let literal = Literal::new(value, datatype, language);
        if let Some(id) = self.lookup_literal(&literal) {
            return Ok(id);
        }
        validate::literal(value, datatype, language, &self.config)?;
        self.table.intern(Term::Literal(literal))
    }

    /// Return the canonical handle for a labelled blank node, creating it if unseen.
    ///
    /// Labels are validated even on a hit so that the reserved fresh-node
    /// prefix is unreachable.
    pub fn resolve_blank_node(&mut self, label: &str) -> TermResult<TermId> {
        validate::blank_node(label, &self.config)?;
        if let Some(id) = self.lookup_blank_node(label) {
            return Ok(id);
        }
        self.table.intern(Term::blank_node(label))
    }

    /// Create a blank node distinct from every other term, now or later.
    ///
    /// Labels live under a prefix that `resolve_blank_node` rejects, so graph
    /// labels can never merge with a fresh node. Labels minted by a meta
    /// manager are skipped.
    pub fn new_blank_node(&mut self) -> TermResult<TermId> {
        loop {
            let label = format!("{}{}", validate::FRESH_BLANK_PREFIX, self.next_blank);
            self.next_blank += 1;
            if self.lookup_blank_node(&label).is_none() {
                return self.table.intern(Term::blank_node(&label));
            }
        }
    }

    /// Resolve any term, validating it first if unseen.
    pub fn resolve_term(&mut self, term: Term) -> TermResult<TermId> {
        match term {
            Term::Resource(iri) => self.resolve_resource(&iri),
            Term::BlankNode(label) => self.resolve_blank_node(&label),
            Term::Literal(lit) => {
                self.resolve_literal(lit.value(), lit.datatype(), lit.language())
            }
        }
    }

    /// Resolve a term produced by an oxigraph-based loader.
    pub fn resolve_oxigraph(&mut self, term: oxigraph::model::TermRef<'_>) -> TermResult<TermId> {
        self.resolve_term(Term::from_oxigraph(term)?)
    }

    /// `xsd:string` literal.
    pub fn resolve_text(&mut self, value: &str) -> TermResult<TermId> {
        self.resolve_literal(value, Some(xsd::STRING), None)
    }

    /// `xsd:integer` literal in canonical lexical form.
    pub fn resolve_integer(&mut self, value: i64) -> TermResult<TermId> {
        self.resolve_literal(&value.to_string(), Some(xsd::INTEGER), None)
    }

    /// `xsd:double` literal in canonical lexical form (`1.5E2`, `INF`, `NaN`).
    pub fn resolve_double(&mut self, value: f64) -> TermResult<TermId> {
        self.resolve_literal(&canonical_double(value), Some(xsd::DOUBLE), None)
    }

    /// `xsd:boolean` literal.
    pub fn resolve_boolean(&mut self, value: bool) -> TermResult<TermId> {
        self.resolve_literal(if value { "true" } else { "false" }, Some(xsd::BOOLEAN), None)
    }

    /// End the load phase. The returned `Arc` only exposes read operations.
    pub fn freeze(self) -> Arc<TermManager> {
        tracing::info!(
            table = self.table.id().get(),
            terms = self.term_count(),
            "term manager frozen for evaluation"
        );
        Arc::new(self)
    }

    // -----------------------------------------------------------------------
    // Read-only operations (safe for concurrent use once frozen)
    // -----------------------------------------------------------------------

    /// Look up a resource without creating it.
    pub fn try_resolve(&self, iri: &str) -> Option<TermId> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.try_resolve(iri))
            .or_else(|| self.table.lookup_resource(iri))
    }

    /// Look up a literal without creating it.
    pub fn try_resolve_literal(
        &self,
        value: &str,
        datatype: Option<&str>,
        language: Option<&str>,
    ) -> Option<TermId> {
        self.lookup_literal(&Literal::new(value, datatype, language))
    }

    /// Look up any term without creating it.
    pub fn try_resolve_term(&self, term: &Term) -> Option<TermId> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.try_resolve_term(term))
            .or_else(|| self.table.lookup(term))
    }

    /// Look up many resources in parallel.
    pub fn try_resolve_many(&self, iris: &[&str]) -> Vec<Option<TermId>> {
        iris.par_iter().map(|iri| self.try_resolve(iri)).collect()
    }

    /// Whether `id` was issued by this manager or its meta manager.
    pub fn owns(&self, id: TermId) -> bool {
        self.table.owns(id) || self.meta.as_ref().is_some_and(|meta| meta.owns(id))
    }

    /// Return the term behind a handle.
    ///
    /// Handles issued by any other manager are rejected, never dereferenced.
    pub fn term(&self, id: TermId) -> TermResult<&Term> {
        if id.table() == self.table.id() {
            return self.table.get(id).ok_or_else(|| foreign(id));
        }
        match &self.meta {
            Some(meta) => meta.term(id),
            None => Err(foreign(id)),
        }
    }

    /// Number of terms visible through this manager, meta terms included.
    pub fn term_count(&self) -> usize {
        self.table.len() + self.meta.as_ref().map_or(0, |meta| meta.term_count())
    }

    /// Term counts by kind for this manager's own table.
    pub fn stats(&self) -> TermStats {
        let mut stats = TermStats {
            meta_terms: self.meta.as_ref().map_or(0, |meta| meta.term_count()),
            ..Default::default()
        };
        for (_, term) in self.table.iter() {
            match term.kind() {
                TermKind::Resource => stats.resources += 1,
                TermKind::BlankNode => stats.blank_nodes += 1,
                TermKind::Literal => stats.literals += 1,
            }
        }
        stats
    }

    /// Iterate over this manager's own terms in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, &Term)> + '_ {
        self.table.iter()
    }

    /// Owned copy of this manager's own terms, for diagnostics export.
    pub fn snapshot(&self) -> Vec<TermEntry> {
        self.table
            .iter()
            .map(|(id, term)| TermEntry {
                id,
                term: term.clone(),
            })
            .collect()
    }

    fn lookup_literal(&self, literal: &Literal) -> Option<TermId> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.lookup_literal(literal))
            .or_else(|| self.table.lookup_literal(literal))
    }

    fn lookup_blank_node(&self, label: &str) -> Option<TermId> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.lookup_blank_node(label))
            .or_else(|| self.table.lookup_blank_node(label))
    }
}

impl std::fmt::Debug for TermManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermManager")
            .field("table", &self.table)
            .field("meta", &self.meta.as_ref().map(|meta| meta.table_id().get()))
            .finish()
    }
}

fn foreign(id: TermId) -> TermError {
    TermError::ForeignHandle {
        handle: id.to_string(),
    }
}

/// XSD canonical lexical form of a double: mantissa with one leading digit
/// and at least one fractional digit, then `E` and the exponent.
fn canonical_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF".into() } else { "-INF".into() };
    }
    let formatted = format!("{value:E}");
    match formatted.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{mantissa}.0E{exponent}")
        }
        _ => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IriPolicy;
    use crate::error::TermsError;

    fn manager() -> TermManager {
        TermManager::new(TermManagerConfig::default()).unwrap()
    }

    #[test]
    fn resolve_resource_is_idempotent() {
        let mut m = manager();
        let a = m.resolve_resource("http://ex.org/Person").unwrap();
        assert_eq!(m.resolve_resource("http://ex.org/Person").unwrap(), a);
        let b = m.resolve_resource("http://ex.org/Animal").unwrap();
        assert_ne!(a, b);
        assert_eq!(m.term_count(), 2);
    }

    #[test]
    fn resolve_resource_rejects_empty_iri() {
        let mut m = manager();
        let err = m.resolve_resource("").unwrap_err();
        assert!(matches!(
            err,
            TermError::InvalidTerm {
                kind: TermKind::Resource,
                ..
            }
        ));
        assert_eq!(m.term_count(), 0);
    }

    #[test]
    fn literal_tuples_canonicalize() {
        let mut m = manager();
        let plain = m.resolve_literal("chat", None, None).unwrap();
        let typed = m.resolve_literal("chat", Some(xsd::STRING), None).unwrap();
        let en = m.resolve_literal("chat", None, Some("en")).unwrap();
        let fr = m.resolve_literal("chat", None, Some("fr")).unwrap();

        assert_eq!(m.resolve_literal("chat", None, Some("fr")).unwrap(), fr);
        assert_ne!(plain, typed);
        assert_ne!(plain, en);
        assert_ne!(en, fr);
        assert_eq!(m.term_count(), 4);
    }

    #[test]
    fn literal_and_resource_with_same_text_are_distinct() {
        let mut m = manager();
        let r = m.resolve_resource("jets:key").unwrap();
        let l = m.resolve_literal("jets:key", None, None).unwrap();
        assert_ne!(r, l);
    }

    #[test]
    fn try_resolve_does_not_create() {
        let mut m = manager();
        assert_eq!(m.try_resolve("http://ex.org/Person"), None);
        assert_eq!(m.term_count(), 0);

        let a = m.resolve_resource("http://ex.org/Person").unwrap();
        assert_eq!(m.try_resolve("http://ex.org/Person"), Some(a));
    }

    #[test]
    fn try_resolve_ignores_literals_with_same_text() {
        let mut m = manager();
        m.resolve_literal("http://ex.org/Person", None, None).unwrap();
        assert_eq!(m.try_resolve("http://ex.org/Person"), None);
    }

    #[test]
    fn term_reverse_lookup() {
        let mut m = manager();
        let id = m.resolve_literal("42", Some(xsd::INTEGER), None).unwrap();
        let term = m.term(id).unwrap();
        assert_eq!(term, &Term::literal("42", Some(xsd::INTEGER), None));
    }

    #[test]
    fn foreign_handles_are_rejected() {
        let mut m1 = manager();
        let mut m2 = manager();
        let a = m1.resolve_resource("http://ex.org/a").unwrap();
        m2.resolve_resource("http://ex.org/a").unwrap();

        assert!(!m2.owns(a));
        assert!(matches!(m2.term(a), Err(TermError::ForeignHandle { .. })));
    }

    #[test]
    fn blank_nodes() {
        let mut m = manager();
        let b0 = m.resolve_blank_node("b0").unwrap();
        assert_eq!(m.resolve_blank_node("b0").unwrap(), b0);

        // Fresh nodes never reuse a graph label.
        let fresh = m.new_blank_node().unwrap();
        assert_ne!(fresh, b0);
        let fresh2 = m.new_blank_node().unwrap();
        assert_ne!(fresh, fresh2);
        assert_eq!(m.stats().blank_nodes, 3);
    }

    #[test]
    fn fresh_blank_nodes_never_merge_with_graph_labels() {
        let mut m = manager();
        let fresh = m.new_blank_node().unwrap();
        let fresh_label = m.term(fresh).unwrap().to_string();

        // Graph labels resolved afterwards stay distinct.
        let b0 = m.resolve_blank_node("b0").unwrap();
        assert_ne!(fresh, b0);
        let b1 = m.resolve_term(Term::blank_node("b1")).unwrap();
        assert_ne!(fresh, b1);

        // The fresh label itself cannot be reached from graph input.
        let label = fresh_label.trim_start_matches("_:");
        assert!(matches!(
            m.resolve_blank_node(label),
            Err(TermError::InvalidTerm {
                kind: TermKind::BlankNode,
                ..
            })
        ));
        assert!(m.resolve_term(Term::blank_node(label)).is_err());
        assert_eq!(m.stats().blank_nodes, 3);
    }

    #[test]
    fn session_fresh_blank_nodes_skip_meta_labels() {
        let mut meta = manager();
        let meta_fresh = meta.new_blank_node().unwrap();
        let mut session =
            TermManager::with_meta(meta.freeze(), TermManagerConfig::default()).unwrap();

        let fresh = session.new_blank_node().unwrap();
        assert_ne!(fresh, meta_fresh);
        assert_eq!(fresh.table(), session.table_id());
    }

    #[test]
    fn try_resolve_literal_is_none_until_resolved() {
        let mut m = manager();
        assert_eq!(m.try_resolve_literal("42", Some(xsd::INTEGER), None), None);
        assert_eq!(m.term_count(), 0);

        let id = m.resolve_literal("42", Some(xsd::INTEGER), None).unwrap();
        assert_eq!(m.try_resolve_literal("42", Some(xsd::INTEGER), None), Some(id));
        assert_eq!(
            m.try_resolve_term(&Term::literal("42", Some(xsd::INTEGER), None)),
            Some(id)
        );

        // Same value, one differing field.
        assert_eq!(m.try_resolve_literal("42", None, None), None);
        assert_eq!(m.try_resolve_literal("42", Some(xsd::STRING), None), None);
        assert_eq!(m.try_resolve_literal("42", Some(xsd::INTEGER), Some("en")), None);

        let en = m.resolve_literal("chat", None, Some("en")).unwrap();
        assert_eq!(m.try_resolve_literal("chat", None, Some("en")), Some(en));
        assert_eq!(m.try_resolve_literal("chat", None, Some("fr")), None);
        assert_eq!(m.try_resolve_literal("chat", None, None), None);
        assert_eq!(m.term_count(), 2);
    }

    #[test]
    fn try_resolve_term_covers_every_kind() {
        let mut m = manager();
        let r = m.resolve_resource("http://ex.org/a").unwrap();
        let b = m.resolve_blank_node("b0").unwrap();

        assert_eq!(m.try_resolve_term(&Term::resource("http://ex.org/a")), Some(r));
        assert_eq!(m.try_resolve_term(&Term::blank_node("b0")), Some(b));
        assert_eq!(m.try_resolve_term(&Term::blank_node("b1")), None);
        assert_eq!(m.try_resolve_term(&Term::resource("http://ex.org/b")), None);
        assert_eq!(
            m.try_resolve_term(&Term::literal("http://ex.org/a", None, None)),
            None
        );
    }

    #[test]
    fn try_resolve_literal_through_meta() {
        let mut meta = manager();
        let count = meta.resolve_integer(3).unwrap();
        let meta = meta.freeze();

        let mut session =
            TermManager::with_meta(Arc::clone(&meta), TermManagerConfig::default()).unwrap();
        assert_eq!(session.try_resolve_literal("3", Some(xsd::INTEGER), None), Some(count));
        assert_eq!(
            session.try_resolve_term(&Term::literal("3", Some(xsd::INTEGER), None)),
            Some(count)
        );
        assert_eq!(session.try_resolve_literal("3", None, None), None);

        let local = session.resolve_literal("3", None, None).unwrap();
        assert_eq!(session.try_resolve_literal("3", None, None), Some(local));
        assert_eq!(meta.try_resolve_literal("3", None, None), None);
    }

    #[test]
    fn typed_literal_helpers_use_canonical_forms() {
        let mut m = manager();
        let i = m.resolve_integer(-7).unwrap();
        assert_eq!(m.resolve_literal("-7", Some(xsd::INTEGER), None).unwrap(), i);

        let d = m.resolve_double(150.0).unwrap();
        assert_eq!(m.resolve_literal("1.5E2", Some(xsd::DOUBLE), None).unwrap(), d);
        let one = m.resolve_double(1.0).unwrap();
        assert_eq!(m.resolve_literal("1.0E0", Some(xsd::DOUBLE), None).unwrap(), one);

        let t = m.resolve_boolean(true).unwrap();
        assert_eq!(m.resolve_literal("true", Some(xsd::BOOLEAN), None).unwrap(), t);

        let s = m.resolve_text("hello").unwrap();
        assert_eq!(m.resolve_literal("hello", Some(xsd::STRING), None).unwrap(), s);
    }

    #[test]
    fn canonical_double_forms() {
        assert_eq!(canonical_double(1.5), "1.5E0");
        assert_eq!(canonical_double(0.001), "1.0E-3");
        assert_eq!(canonical_double(f64::NAN), "NaN");
        assert_eq!(canonical_double(f64::NEG_INFINITY), "-INF");
    }

    #[test]
    fn meta_layering_shares_meta_handles() {
        let mut meta = manager();
        let rdf_type = meta.resolve_resource("rdf:type").unwrap();
        let meta = meta.freeze();

        let mut session = TermManager::with_meta(Arc::clone(&meta), TermManagerConfig::default())
            .unwrap();
        assert_eq!(session.resolve_resource("rdf:type").unwrap(), rdf_type);
        assert_eq!(session.try_resolve("rdf:type"), Some(rdf_type));

        let claim = session.resolve_resource("acme:Claim").unwrap();
        assert_eq!(claim.table(), session.table_id());
        assert_eq!(meta.try_resolve("acme:Claim"), None);

        assert!(session.owns(rdf_type));
        assert_eq!(session.term(rdf_type).unwrap(), &Term::resource("rdf:type"));
        assert_eq!(session.term_count(), 2);
        assert_eq!(session.stats().meta_terms, 1);
    }

    #[test]
    fn strict_policy_applies_to_new_terms() {
        let config = TermManagerConfig {
            iri_policy: IriPolicy::Strict,
            ..Default::default()
        };
        let mut m = TermManager::new(config).unwrap();
        assert!(m.resolve_resource("is_good").is_err());
        assert!(m.resolve_resource("http://ex.org/good").is_ok());
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = TermManagerConfig {
            max_term_bytes: 0,
            ..Default::default()
        };
        assert!(matches!(
            TermManager::new(config),
            Err(TermsError::Config(_))
        ));
    }

    #[test]
    fn try_resolve_many_matches_sequential_lookup() {
        let mut m = manager();
        let iris: Vec<String> = (0..64).map(|i| format!("http://ex.org/r{i}")).collect();
        for iri in iris.iter().step_by(2) {
            m.resolve_resource(iri).unwrap();
        }
        let frozen = m.freeze();

        let refs: Vec<&str> = iris.iter().map(String::as_str).collect();
        let parallel = frozen.try_resolve_many(&refs);
        let sequential: Vec<Option<TermId>> = refs.iter().map(|i| frozen.try_resolve(i)).collect();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.iter().filter(|r| r.is_some()).count(), 32);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut m = manager();
        m.resolve_resource("http://ex.org/a").unwrap();
        m.resolve_literal("1", Some(xsd::INTEGER), None).unwrap();

        let snapshot = m.snapshot();
        assert_eq!(snapshot.len(), 2);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("http://ex.org/a"));
    }

    #[test]
    fn manager_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TermManager>();
        assert_send_sync::<Arc<TermManager>>();
    }
}
