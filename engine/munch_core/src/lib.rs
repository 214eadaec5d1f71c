//! Low-level literal-token matching core for Munch.
//!
//! This crate is standalone (zero `munch_*` dependencies) and holds the
//! pieces a scan session builds on:
//!
//! - [`SourceBuffer`] / [`Cursor`]: sentinel-terminated input with a
//!   zero-bounds-check `Copy` cursor.
//! - [`TokenTable`]: literal token definitions compiled into a read-only,
//!   shareable table with a per-first-byte candidate index and per-unit
//!   [`advance`](TokenTable::advance) stepping.
//! - [`ByteSet`]: byte membership sets with memchr-accelerated skipping.
//! - [`Span`]: compact byte spans over the input.
//!
//! The session machinery (limit stack, checkpoint protocol, host
//! directives) lives in the `munch` crate; hosts that only need table
//! compilation and raw matching can depend on this crate alone.

mod byte_set;
mod cursor;
mod source_buffer;
mod span;
mod token_table;

pub use byte_set::ByteSet;
pub use cursor::Cursor;
pub use source_buffer::SourceBuffer;
pub use span::Span;
pub use token_table::{
    ConfigError, MatchStep, TokenDef, TokenId, TokenTable, MAX_LITERAL_LEN,
};
