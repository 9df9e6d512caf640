//! Cache of the schema handles the rule engine's built-ins need.
//!
//! The three slots are resolved together and committed as one value, so a
//! [`WellKnownResources`] is either fully populated or empty. Hot-path rule
//! logic fetches [`WellKnownSlots`] once and compares handles from there.

use crate::error::{TermError, TermResult};
use crate::manager::TermManager;
use crate::term::TermId;
use crate::vocab::{ENTITY_PROPERTY_IRI, KEY_IRI, VALUE_PROPERTY_IRI};

/// One of the built-in schema predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnown {
    EntityProperty,
    ValueProperty,
    Key,
}

impl WellKnown {
    pub const ALL: [WellKnown; 3] = [
        WellKnown::EntityProperty,
        WellKnown::ValueProperty,
        WellKnown::Key,
    ];

    /// The schema IRI shared with the rule compiler.
    pub fn iri(self) -> &'static str {
        match self {
            WellKnown::EntityProperty => ENTITY_PROPERTY_IRI,
            WellKnown::ValueProperty => VALUE_PROPERTY_IRI,
            WellKnown::Key => KEY_IRI,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WellKnown::EntityProperty => "entity_property",
            WellKnown::ValueProperty => "value_property",
            WellKnown::Key => "key",
        }
    }
}

impl std::fmt::Display for WellKnown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The resolved handles, always all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WellKnownSlots {
    pub entity_property: TermId,
    pub value_property: TermId,
    pub key: TermId,
}

impl WellKnownSlots {
    /// Resolve (creating if needed) all three schema IRIs.
    ///
    /// The built-in joins need these terms even when the loaded graph never
    /// mentions them, so this uses the creating variant of resolution.
    ///
    /// Resolution is sequential and not rolled back: if a later IRI is
    /// rejected, the ones before it are already interned in `manager`.
    pub fn resolve(manager: &mut TermManager) -> TermResult<Self> {
        let entity_property = manager.resolve_resource(ENTITY_PROPERTY_IRI)?;
        let value_property = manager.resolve_resource(VALUE_PROPERTY_IRI)?;
        let key = manager.resolve_resource(KEY_IRI)?;
        Ok(Self {
            entity_property,
            value_property,
            key,
        })
    }

    pub fn get(&self, which: WellKnown) -> TermId {
        match which {
            WellKnown::EntityProperty => self.entity_property,
            WellKnown::ValueProperty => self.value_property,
            WellKnown::Key => self.key,
        }
    }

    /// Which built-in predicate `id` is, if any.
    pub fn classify(&self, id: TermId) -> Option<WellKnown> {
        WellKnown::ALL.into_iter().find(|&w| self.get(w) == id)
    }
}

/// Well-known resource cache, empty until [`initialize`](Self::initialize) succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WellKnownResources {
    slots: Option<WellKnownSlots>,
}

impl WellKnownResources {
    /// An uninitialized cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an initialized cache directly.
    pub fn resolve(manager: &mut TermManager) -> TermResult<Self> {
        let mut cache = Self::new();
        cache.initialize(Some(manager))?;
        Ok(cache)
    }

    /// Resolve the three schema IRIs and commit them together.
    ///
    /// `None` means the rule engine was set up without a term manager and is
    /// rejected with `InvalidArgument`. On any error the cache keeps its
    /// previous state, but the manager may not: schema IRIs resolved before
    /// the rejected one stay interned, so the term count can grow even though
    /// nothing was committed here. Re-initializing against the same manager
    /// yields the same handles.
    pub fn initialize(&mut self, manager: Option<&mut TermManager>) -> TermResult<()> {
        let manager = manager.ok_or_else(|| TermError::InvalidArgument {
            message: "well-known resources need a term manager, got none".into(),
        })?;

        let slots = WellKnownSlots::resolve(manager)?;
        self.slots = Some(slots);
        tracing::info!(
            entity_property = %slots.entity_property,
            value_property = %slots.value_property,
            key = %slots.key,
            "well-known resources initialized"
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.slots.is_some()
    }

    /// All three handles, or `UseBeforeInit`.
    pub fn slots(&self) -> TermResult<&WellKnownSlots> {
        self.slots.as_ref().ok_or(TermError::UseBeforeInit { slot: "all" })
    }

    pub fn get(&self, which: WellKnown) -> TermResult<TermId> {
        self.slots
            .map(|slots| slots.get(which))
            .ok_or(TermError::UseBeforeInit { slot: which.name() })
    }

    pub fn entity_property(&self) -> TermResult<TermId> {
        self.get(WellKnown::EntityProperty)
    }

    pub fn value_property(&self) -> TermResult<TermId> {
        self.get(WellKnown::ValueProperty)
    }

    pub fn key(&self) -> TermResult<TermId> {
        self.get(WellKnown::Key)
    }
}
