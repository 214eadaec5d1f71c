//! Munch: an event-driven literal-token scanning engine.
//!
//! Given a set of literal token definitions, a [`Session`] scans an input
//! buffer, identifies token occurrences with greedy longest-match
//! precedence among prefix-sharing definitions, and drives the host
//! through a sequence of checkpoints -- before a token is accepted, after
//! it is committed, at start and end of input -- so the host can observe
//! or alter scanning without owning the matching logic.
//!
//! The protocol is pull-based: the engine never calls into host code. Each
//! [`Session::step`] runs until the next [`Checkpoint`] and returns it;
//! the host reacts (adjust the [limit stack](Session::enter_limit),
//! [reject](Session::reject_token) the pending token, or nothing) and
//! steps again. [`Session::run_to_completion`] wraps the loop for hosts
//! with no per-checkpoint logic.
//!
//! ```
//! use munch::{Checkpoint, Grammar, Session};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let grammar = Grammar::from_literals(["the", "they", "theyare"])?;
//! let mut session = Session::new(&grammar);
//! session.set_input("they are");
//!
//! for checkpoint in session.run_to_completion()? {
//!     if let Checkpoint::TokenProcessed(event) = checkpoint {
//!         // "they" at 0..4
//!         println!("{} at {}", grammar.table().literal(event.token), event.span);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! "Limits" are named scopes declared in the [`Grammar`]; while entered,
//! only the intersection of every active limit's permitted tokens can
//! match, which lets a host disable token subsets inside nested lexical
//! regions (comments, strings) without re-specifying the grammar.
//!
//! The low-level pieces (sentinel-terminated buffer, cursor, compiled
//! token table) live in [`munch_core`] and are re-exported here.

mod error;
mod event;
mod grammar;
mod limits;
mod resolver;
mod session;

pub use error::{GrammarError, LimitError, SessionError};
pub use event::{Checkpoint, TokenEvent};
pub use grammar::{Grammar, LimitDef, MAX_LIMIT_NAME_LEN};
pub use limits::LimitStack;
pub use resolver::{Completed, Resolver};
pub use session::Session;

pub use munch_core::{
    ConfigError, Span, TokenDef, TokenId, TokenTable, MAX_LITERAL_LEN,
};
