//! Host-facing error types.
//!
//! Three disjoint classes, matching the three ways a host can misuse the
//! engine:
//!
//! - [`GrammarError`]: invalid token or limit declarations, raised at
//!   compile time and never mid-scan.
//! - [`LimitError`]: limit-stack mismanagement; the failed operation is a
//!   no-op, so the host can correct the call and continue.
//! - [`SessionError`]: stepping outside a valid state; a host programming
//!   error with no retry semantics.
//!
//! All errors are synchronous return values at the point of misuse. There
//! is no transient failure mode -- scanning is deterministic over fixed
//! input -- so nothing is retried and nothing is swallowed.

use munch_core::{ConfigError, TokenId};
use thiserror::Error;

use crate::grammar::MAX_LIMIT_NAME_LEN;

/// Error raised while compiling a [`Grammar`](crate::Grammar).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum GrammarError {
    /// The token definitions themselves were invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A limit name exceeds the 255-byte cap shared with token literals.
    #[error("limit name `{name}` is {len} bytes long, max is {}", MAX_LIMIT_NAME_LEN)]
    LimitNameTooLong { name: String, len: usize },

    /// Two limit declarations carry the same name.
    #[error("limit `{name}` is declared more than once")]
    DuplicateLimitName { name: String },

    /// A limit permits a token ID the table does not define.
    #[error("limit `{limit}` permits unknown token id {token}")]
    UnknownTokenInLimit { limit: String, token: TokenId },
}

/// Error raised by limit-stack operations.
///
/// The stack is left unchanged by a failed operation.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LimitError {
    /// The name was never declared in the grammar.
    #[error("unknown limit `{name}`")]
    UnknownLimit { name: String },

    /// More levels requested than the stack holds.
    #[error("cannot exit {requested} limit level(s), stack depth is {depth}")]
    Underflow { requested: usize, depth: usize },
}

/// Error raised when a session is driven outside a valid state.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SessionError {
    /// The session already yielded `Stopped`; no further stepping is
    /// permitted until new input is set.
    #[error("session is already stopped")]
    AlreadyStopped,

    /// `step()` was called before any input was set.
    #[error("no input set; call set_input before stepping")]
    NoInputSet,

    /// `reject_token()` was called while not suspended at a
    /// before-token checkpoint.
    #[error("no resolved token to reject; session is not suspended before a token")]
    NotAtToken,
}
