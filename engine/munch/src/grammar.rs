//! Compiled grammar: token table plus limit declarations.
//!
//! A [`Grammar`] is the immutable configuration a session scans with. It
//! owns the compiled [`TokenTable`] and a registry mapping each declared
//! limit name to the set of token IDs that limit permits. Compiled once,
//! then shared by reference across any number of sessions (and threads --
//! nothing here is interior-mutable).

use fixedbitset::FixedBitSet;
use rustc_hash::FxHashMap;
use tracing::debug;

use munch_core::{TokenDef, TokenId, TokenTable};

use crate::error::GrammarError;

/// Maximum limit-name length in bytes, shared with the token literal cap.
pub const MAX_LIMIT_NAME_LEN: usize = 255;

/// A limit declaration: a scope name plus the tokens it permits while
/// active.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LimitDef {
    pub name: String,
    pub tokens: Vec<TokenId>,
}

impl LimitDef {
    pub fn new(name: impl Into<String>, tokens: impl IntoIterator<Item = u16>) -> Self {
        LimitDef {
            name: name.into(),
            tokens: tokens.into_iter().map(TokenId::new).collect(),
        }
    }
}

/// Immutable scanning configuration: compiled token table + limit
/// registry.
#[derive(Clone, Debug)]
pub struct Grammar {
    table: TokenTable,
    limits: FxHashMap<Box<str>, FixedBitSet>,
}

impl Grammar {
    /// Compile token definitions and limit declarations into a grammar.
    ///
    /// Token definitions are validated by
    /// [`TokenTable::compile`]; limit declarations must carry unique
    /// names of at most [`MAX_LIMIT_NAME_LEN`] bytes and may only permit
    /// token IDs the table defines.
    pub fn compile(
        token_defs: Vec<TokenDef>,
        limit_defs: Vec<LimitDef>,
    ) -> Result<Self, GrammarError> {
        let table = TokenTable::compile(token_defs)?;

        let mut limits: FxHashMap<Box<str>, FixedBitSet> = FxHashMap::default();
        limits.reserve(limit_defs.len());
        for def in limit_defs {
            if def.name.len() > MAX_LIMIT_NAME_LEN {
                let len = def.name.len();
                return Err(GrammarError::LimitNameTooLong {
                    name: def.name,
                    len,
                });
            }
            if limits.contains_key(def.name.as_str()) {
                return Err(GrammarError::DuplicateLimitName { name: def.name });
            }
            let mut set = FixedBitSet::with_capacity(table.token_count());
            for id in def.tokens {
                if id.index() >= table.token_count() {
                    return Err(GrammarError::UnknownTokenInLimit {
                        limit: def.name,
                        token: id,
                    });
                }
                set.insert(id.index());
            }
            limits.insert(def.name.into_boxed_str(), set);
        }

        debug!(
            tokens = table.token_count(),
            limits = limits.len(),
            "compiled grammar"
        );
        Ok(Grammar { table, limits })
    }

    /// Compile a grammar from bare literals with no limits, assigning
    /// dense token IDs in order.
    pub fn from_literals<I, S>(literals: I) -> Result<Self, GrammarError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Grammar {
            table: TokenTable::from_literals(literals)?,
            limits: FxHashMap::default(),
        })
    }

    /// The compiled token table.
    pub fn table(&self) -> &TokenTable {
        &self.table
    }

    /// The permitted-token set of a declared limit.
    pub fn limit_set(&self, name: &str) -> Option<&FixedBitSet> {
        self.limits.get(name)
    }

    /// A declared limit's interned name and permitted-token set.
    ///
    /// The returned name borrows from the grammar, letting stack frames
    /// reference it for as long as the grammar lives.
    pub(crate) fn limit_entry(&self, name: &str) -> Option<(&str, &FixedBitSet)> {
        self.limits.get_key_value(name).map(|(k, v)| (&**k, v))
    }

    /// Number of declared limits.
    pub fn limit_count(&self) -> usize {
        self.limits.len()
    }
}
