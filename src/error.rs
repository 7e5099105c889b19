//! Error taxonomy (C9).
//!
//! Two public error enums split along the boundary drawn in §7 of the
//! design: [`GraphError`] for the triple-store surface, [`CodecError`] for
//! the streaming layer. `InvariantViolation`s are not represented here —
//! they abort via [`invariant`], since §7 treats them as non-recoverable
//! defects rather than caller-facing conditions.

use thiserror::Error;

/// Errors surfaced by [`crate::rdf::store::RdfStore`] and
/// [`crate::rdf::roaring_store::RoaringStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// C6 query against an index that does not exist yet in `Manual` mode.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// A C6 bitmap-intersection iterator observed the backing indexed set
    /// change shape mid-iteration.
    #[error("concurrent modification detected during iteration")]
    ConcurrentModification,

    /// A `triple`/`quad` streaming event arrived outside a `start..finish`
    /// window, or `finish` was called without a matching `start`.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

/// Errors surfaced by the streaming codec (C8).
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("unexpected end of stream")]
    UnexpectedEndOfStream,

    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("value out of range: {0}")]
    ValueOutOfRange(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] Box<bincode::ErrorKind>),

    #[error(transparent)]
    Node(#[from] crate::rdf::node::NodeError),
}

/// Panics with a descriptive message — the only path for `InvariantViolation`
/// per §7: these indicate a defect in this layer (e.g. classic-store mirror
/// maps disagreeing) and are never recoverable as a `Result`.
macro_rules! invariant {
    ($cond:expr, $($msg:tt)+) => {
        if !($cond) {
            panic!($($msg)+);
        }
    };
}

pub(crate) use invariant;
