//! Fixed IRIs shared with the rule compiler and the datatype IRIs used by
//! the typed literal constructors.

/// Predicate linking an entity row to its entity-property descriptors.
pub const ENTITY_PROPERTY_IRI: &str = "jets:entity_property";

/// Predicate linking an entity-property descriptor to its value.
pub const VALUE_PROPERTY_IRI: &str = "jets:value_property";

/// Predicate carrying the row key of every input entity.
pub const KEY_IRI: &str = "jets:key";

/// XML Schema datatypes.
pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
}

/// RDF core vocabulary.
pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}
