//! Compiled, read-only table of literal token definitions.
//!
//! The table is built once from an ordered list of definitions and never
//! mutated afterward; sessions share it by reference. Matching works on
//! the UTF-8 bytes of each literal: [`candidates_starting_with`] seeds
//! candidate matches from a per-first-byte bucket index, and [`advance`]
//! moves a single candidate forward by one input byte.
//!
//! Buckets store longer literals first, so a resolver walking a bucket in
//! order considers maximal-munch winners before their prefixes.
//!
//! [`candidates_starting_with`]: TokenTable::candidates_starting_with
//! [`advance`]: TokenTable::advance

use std::collections::HashMap;
use std::fmt;

use crate::ByteSet;

/// Maximum literal length in bytes. Longer definitions are a
/// configuration error, never a runtime fault.
pub const MAX_LITERAL_LEN: usize = 255;

/// Identifier of a compiled token.
///
/// IDs are dense: definition `i` gets ID `i`, enabling array-indexed
/// lookup everywhere a token is referenced.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TokenId(u16);

impl TokenId {
    /// Create a token ID from its dense index.
    #[inline]
    pub const fn new(index: u16) -> Self {
        TokenId(index)
    }

    /// The dense index of this token.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single token definition: a stable ID paired with the literal the
/// engine recognizes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenDef {
    pub id: TokenId,
    pub literal: String,
}

impl TokenDef {
    pub fn new(id: u16, literal: impl Into<String>) -> Self {
        TokenDef {
            id: TokenId::new(id),
            literal: literal.into(),
        }
    }
}

/// Outcome of advancing one candidate match by one input byte.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MatchStep {
    /// The byte matched and more literal bytes remain.
    StillMatching,
    /// The byte matched the final literal byte -- the candidate is complete.
    Matched,
    /// The byte deviated from the literal -- the candidate is dead.
    Failed,
}

/// Error raised while compiling token definitions.
///
/// Always fatal to construction and never raised mid-scan; the definition
/// set must be fixed before a table can exist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// A literal exceeds [`MAX_LITERAL_LEN`] bytes.
    LiteralTooLong { id: TokenId, len: usize },
    /// A literal is empty (it would match at every position).
    EmptyLiteral { id: TokenId },
    /// Two definitions carry the same ID.
    DuplicateTokenId { id: TokenId },
    /// IDs are not dense in definition order.
    SparseTokenId { id: TokenId, expected: u16 },
    /// Two definitions carry byte-identical literals, which would make
    /// same-position matches ambiguous.
    DuplicateLiteral { first: TokenId, second: TokenId },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LiteralTooLong { id, len } => write!(
                f,
                "literal of token {id} is {len} bytes long, max is {MAX_LITERAL_LEN}"
            ),
            ConfigError::EmptyLiteral { id } => {
                write!(f, "literal of token {id} is empty")
            }
            ConfigError::DuplicateTokenId { id } => {
                write!(f, "token id {id} is defined more than once")
            }
            ConfigError::SparseTokenId { id, expected } => write!(
                f,
                "token id {id} breaks dense definition order (expected {expected})"
            ),
            ConfigError::DuplicateLiteral { first, second } => write!(
                f,
                "tokens {first} and {second} define the same literal"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Compiled, read-only representation of all token definitions.
///
/// Immutable after [`compile`](Self::compile); safely shared by reference
/// across any number of concurrent sessions.
#[derive(Clone, Debug)]
pub struct TokenTable {
    /// Literal per token, indexed by dense ID.
    literals: Box<[Box<str>]>,
    /// Token IDs grouped by first literal byte, longest literal first
    /// within each group.
    by_first_byte: Box<[TokenId]>,
    /// Half-open ranges into `by_first_byte`, one per byte value.
    buckets: [(u32, u32); 256],
    /// Set of bytes that can start any token.
    start_bytes: ByteSet,
}

impl TokenTable {
    /// Compile a table from an ordered list of definitions.
    ///
    /// IDs must be dense (`defs[i].id == i`); literals must be non-empty,
    /// at most [`MAX_LITERAL_LEN`] bytes, and pairwise distinct. An empty
    /// definition list compiles to a table that matches nothing (every
    /// input byte becomes leading text).
    #[allow(
        clippy::cast_possible_truncation,
        reason = "bucket offsets are bounded by the u16 token count"
    )]
    pub fn compile(defs: Vec<TokenDef>) -> Result<Self, ConfigError> {
        let mut seen_literals: HashMap<&[u8], TokenId> = HashMap::with_capacity(defs.len());
        for (index, def) in defs.iter().enumerate() {
            let expected = u16::try_from(index).unwrap_or(u16::MAX);
            if def.id.index() != index {
                if defs[..index].iter().any(|d| d.id == def.id) {
                    return Err(ConfigError::DuplicateTokenId { id: def.id });
                }
                return Err(ConfigError::SparseTokenId {
                    id: def.id,
                    expected,
                });
            }
            if def.literal.is_empty() {
                return Err(ConfigError::EmptyLiteral { id: def.id });
            }
            if def.literal.len() > MAX_LITERAL_LEN {
                return Err(ConfigError::LiteralTooLong {
                    id: def.id,
                    len: def.literal.len(),
                });
            }
            if let Some(&first) = seen_literals.get(def.literal.as_bytes()) {
                return Err(ConfigError::DuplicateLiteral {
                    first,
                    second: def.id,
                });
            }
            seen_literals.insert(def.literal.as_bytes(), def.id);
        }

        // Group IDs by first literal byte, longest literal first within a
        // group so bucket order equals resolution preference.
        let mut grouped: Vec<TokenId> = defs.iter().map(|d| d.id).collect();
        grouped.sort_by_key(|id| {
            let lit = defs[id.index()].literal.as_bytes();
            (lit[0], std::cmp::Reverse(lit.len()))
        });

        let mut buckets = [(0u32, 0u32); 256];
        let mut start_bytes = ByteSet::new();
        let mut cursor = 0usize;
        while cursor < grouped.len() {
            let byte = defs[grouped[cursor].index()].literal.as_bytes()[0];
            let start = cursor;
            while cursor < grouped.len()
                && defs[grouped[cursor].index()].literal.as_bytes()[0] == byte
            {
                cursor += 1;
            }
            // Group sizes are bounded by the u16 token count; u32 ranges
            // never overflow.
            buckets[byte as usize] = (start as u32, cursor as u32);
            start_bytes.insert(byte);
        }

        let literals = defs
            .into_iter()
            .map(|d| d.literal.into_boxed_str())
            .collect();

        Ok(TokenTable {
            literals,
            by_first_byte: grouped.into_boxed_slice(),
            buckets,
            start_bytes,
        })
    }

    /// Compile a table from bare literals, assigning dense IDs in order.
    pub fn from_literals<I, S>(literals: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let defs = literals
            .into_iter()
            .enumerate()
            .map(|(i, lit)| TokenDef {
                id: TokenId::new(u16::try_from(i).unwrap_or(u16::MAX)),
                literal: lit.into(),
            })
            .collect();
        Self::compile(defs)
    }

    /// Number of compiled tokens.
    pub fn token_count(&self) -> usize {
        self.literals.len()
    }

    /// The literal of a token.
    pub fn literal(&self, id: TokenId) -> &str {
        &self.literals[id.index()]
    }

    /// Byte length of a token's literal.
    #[inline]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "literal lengths are capped at MAX_LITERAL_LEN"
    )]
    pub fn literal_len(&self, id: TokenId) -> u32 {
        self.literals[id.index()].len() as u32
    }

    /// Token IDs whose literal starts with `byte`, longest literal first.
    ///
    /// Seeds new candidate matches at a position whose input byte is
    /// `byte`; callers filter the slice by the active limit set.
    #[inline]
    pub fn candidates_starting_with(&self, byte: u8) -> &[TokenId] {
        let (start, end) = self.buckets[byte as usize];
        &self.by_first_byte[start as usize..end as usize]
    }

    /// Advance a candidate that has already matched `matched` literal
    /// bytes by one more input byte.
    ///
    /// # Contract
    ///
    /// `matched < literal_len(id)`: a completed candidate is never
    /// advanced again.
    #[inline]
    pub fn advance(&self, id: TokenId, matched: u32, byte: u8) -> MatchStep {
        let literal = self.literals[id.index()].as_bytes();
        debug_assert!(
            (matched as usize) < literal.len(),
            "advance called on a completed candidate"
        );
        if literal[matched as usize] != byte {
            return MatchStep::Failed;
        }
        if matched as usize + 1 == literal.len() {
            MatchStep::Matched
        } else {
            MatchStep::StillMatching
        }
    }

    /// Set of bytes that can start any token in the table.
    ///
    /// Sessions intersect this with the active limit set's first bytes to
    /// skip leading-text runs.
    pub fn start_bytes(&self) -> &ByteSet {
        &self.start_bytes
    }
}
