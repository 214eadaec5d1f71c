//! Checkpoint results returned to the host.
//!
//! Each `step()` call runs until a checkpoint and returns one of these
//! tagged values. Only the fields relevant to a checkpoint exist on its
//! variant; internal bookkeeping outcomes are folded into the step loop
//! and never surfaced.

use std::fmt;

use munch_core::{Span, TokenId};

/// Payload for the token checkpoints.
///
/// Spans index the session's input; slice them via
/// [`Session::input_slice`](crate::Session::input_slice) or the host's own
/// copy of the text.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct TokenEvent {
    /// The matched token.
    pub token: TokenId,
    /// The matched span.
    pub span: Span,
    /// Unmatched text accumulated since the previous committed token (or
    /// input start), ending where the match begins.
    pub leading: Span,
    /// Limit-stack depth at the time the match resolved.
    pub limit_depth: u32,
}

impl fmt::Debug for TokenEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} @ {} (leading {}, depth {})",
            self.token, self.span, self.leading, self.limit_depth
        )
    }
}

/// A suspension point of the execution loop.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Checkpoint {
    /// Fired exactly once per session, before any input is consumed.
    Start,
    /// A token span has been resolved but not yet committed. The host may
    /// adjust the limit stack or
    /// [`reject_token()`](crate::Session::reject_token) before resuming.
    BeforeToken(TokenEvent),
    /// A token was committed. Informational; the matched span is final.
    TokenProcessed(TokenEvent),
    /// Input is exhausted. Carries any trailing unmatched text.
    End { trailing: Span, limit_depth: u32 },
    /// Terminal result; stepping past it is an error.
    Stopped,
}

impl Checkpoint {
    /// Returns `true` for the terminal checkpoint.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Checkpoint::Stopped)
    }

    /// The token event carried by this checkpoint, if any.
    pub fn token_event(&self) -> Option<&TokenEvent> {
        match self {
            Checkpoint::BeforeToken(event) | Checkpoint::TokenProcessed(event) => Some(event),
            _ => None,
        }
    }
}
