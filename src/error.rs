//! Rich diagnostic error types for rete-terms.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so operators can see
//! exactly which term or file was rejected and why.

use miette::Diagnostic;
use thiserror::Error;

use crate::term::TermKind;

/// Top-level error type for rete-terms.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum TermsError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Term(#[from] TermError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),
}

// ---------------------------------------------------------------------------
// Term errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TermError {
    #[error("invalid {kind} {content:?}: {reason}")]
    #[diagnostic(
        code(rete::term::invalid),
        help(
            "The term content violates the syntactic contract of the term table. \
             Resources must be non-empty and free of whitespace and the characters \
             <>\"{{}}|^`\\; language tags must look like `en` or `en-US`. \
             Fix the input data and reload."
        )
    )]
    InvalidTerm {
        kind: TermKind,
        content: String,
        reason: String,
    },

    #[error("invalid argument: {message}")]
    #[diagnostic(
        code(rete::term::invalid_argument),
        help("Pass the session's term manager to the well-known resource cache.")
    )]
    InvalidArgument { message: String },

    #[error("well-known resource `{slot}` read before initialization")]
    #[diagnostic(
        code(rete::term::use_before_init),
        help(
            "Call `WellKnownResources::initialize` with the session's term manager \
             during the load phase, before rule evaluation starts."
        )
    )]
    UseBeforeInit { slot: &'static str },

    #[error("handle {handle} was not issued by this term manager")]
    #[diagnostic(
        code(rete::term::foreign_handle),
        help(
            "Handles are only meaningful relative to the manager that issued them \
             (or its meta manager). Resolve the term again through this manager."
        )
    )]
    ForeignHandle { handle: String },

    #[error("term table exhausted: cannot hold more than u32::MAX terms")]
    #[diagnostic(
        code(rete::term::exhausted),
        help(
            "A single term table indexes terms with 32-bit handles. \
             Split the graph across sessions or check for a runaway loader."
        )
    )]
    CapacityExhausted,
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(
        code(rete::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(rete::config::parse),
        help(
            "The file must be TOML with optional keys `capacity_hint`, \
             `iri_policy` (\"lenient\" or \"strict\") and `max_term_bytes`."
        )
    )]
    Parse { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(rete::config::invalid),
        help("Check the TermManagerConfig fields. {message}")
    )]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("failed to read term file: {path}")]
    #[diagnostic(
        code(rete::load::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse term file {path}: {message}")]
    #[diagnostic(
        code(rete::load::parse),
        help(
            "The file must be a JSON array of term specs such as \
             {{\"resource\": \"http://ex.org/Person\"}}, {{\"blank\": \"b0\"}} or \
             {{\"literal\": \"42\", \"datatype\": \"http://www.w3.org/2001/XMLSchema#integer\"}}."
        )
    )]
    Parse { path: String, message: String },

    #[error("term #{index} rejected: {source}")]
    #[diagnostic(
        code(rete::load::entry),
        help("The load step was aborted at this entry. Fix the entry and reload.")
    )]
    Entry {
        index: usize,
        #[source]
        source: TermError,
    },
}

/// Result alias for term table, manager and cache operations.
pub type TermResult<T> = std::result::Result<T, TermError>;

/// Result alias for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Convenience alias for functions returning rete-terms results.
pub type TermsResult<T> = std::result::Result<T, TermsError>;
