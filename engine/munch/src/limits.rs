//! Host-controlled stack of named scopes restricting token eligibility.
//!
//! Entering a limit narrows the set of tokens eligible for matching to
//! the intersection of every active limit's permitted set; exiting
//! restores the enclosing scope. Nested lexical regions therefore compose
//! with plain push/pop -- a region can only see tokens every enclosing
//! region also permits.
//!
//! Failed operations leave the stack untouched, so a host can correct a
//! bad call and continue.

use fixedbitset::FixedBitSet;
use smallvec::SmallVec;

use munch_core::TokenId;

use crate::error::LimitError;
use crate::grammar::Grammar;

/// One active limit scope.
#[derive(Copy, Clone, Debug)]
struct Frame<'g> {
    /// Limit name, borrowed from the grammar registry.
    name: &'g str,
    /// The limit's own permitted set (not the intersection).
    set: &'g FixedBitSet,
}

/// Stack of active limits plus the cached intersection of their sets.
#[derive(Clone, Debug)]
pub struct LimitStack<'g> {
    grammar: &'g Grammar,
    frames: SmallVec<[Frame<'g>; 4]>,
    /// Intersection of all active frames' sets. `None` while the stack is
    /// empty, meaning every token is eligible.
    active: Option<FixedBitSet>,
}

impl<'g> LimitStack<'g> {
    /// Create an empty stack over a grammar's limit registry.
    pub fn new(grammar: &'g Grammar) -> Self {
        LimitStack {
            grammar,
            frames: SmallVec::new(),
            active: None,
        }
    }

    /// Push a named limit, narrowing the active set.
    ///
    /// Fails with [`LimitError::UnknownLimit`] (and no state change) if
    /// the grammar never declared `name`.
    pub fn enter(&mut self, name: &str) -> Result<(), LimitError> {
        let Some((name, set)) = self.grammar.limit_entry(name) else {
            return Err(LimitError::UnknownLimit { name: name.into() });
        };
        self.frames.push(Frame { name, set });
        match self.active.as_mut() {
            Some(active) => active.intersect_with(set),
            None => self.active = Some(set.clone()),
        }
        Ok(())
    }

    /// Pop `levels` limits, restoring the enclosing scopes.
    ///
    /// `levels == 0` is a no-op. Fails with [`LimitError::Underflow`]
    /// (and no state change) if `levels` exceeds the current depth.
    pub fn exit(&mut self, levels: usize) -> Result<(), LimitError> {
        if levels > self.frames.len() {
            return Err(LimitError::Underflow {
                requested: levels,
                depth: self.frames.len(),
            });
        }
        self.frames.truncate(self.frames.len() - levels);
        self.recompute();
        Ok(())
    }

    /// Pop every active limit.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.active = None;
    }

    /// Number of active limits.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The name of the innermost active limit.
    pub fn top_name(&self) -> Option<&'g str> {
        self.frames.last().map(|f| f.name)
    }

    /// The set of token IDs eligible for matching right now.
    ///
    /// `None` means the stack is empty and all tokens are eligible.
    pub fn active(&self) -> Option<&FixedBitSet> {
        self.active.as_ref()
    }

    /// Returns `true` if `id` is eligible under the active limits.
    pub fn permits(&self, id: TokenId) -> bool {
        self.active
            .as_ref()
            .is_none_or(|set| set.contains(id.index()))
    }

    /// Rebuild the cached intersection from the remaining frames.
    fn recompute(&mut self) {
        self.active = None;
        for frame in &self.frames {
            match self.active.as_mut() {
                Some(active) => active.intersect_with(frame.set),
                None => self.active = Some(frame.set.clone()),
            }
        }
    }
}
