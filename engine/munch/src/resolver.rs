//! Candidate tracking and greedy longest-match resolution.
//!
//! The resolver is fed one input byte at a time. It advances every live
//! candidate through the token table, seeds new candidates at each
//! position (filtered by the active limit set), and holds the best
//! completed match until no live candidate could still beat it.
//!
//! # Resolution rule
//!
//! The winner at any point in the input is the leftmost-longest match
//! (maximal munch). A completed match `held` can only be beaten by a
//! candidate that started at or before `held`'s start -- such a candidate,
//! if it completes, covers `held` entirely and is strictly longer.
//! Candidates starting later can never displace it. So:
//!
//! - a newly completed match displaces `held` iff it starts at or before
//!   `held.span.start`;
//! - `held` resolves the moment no live candidate starts at or before
//!   `held.span.start`.
//!
//! After resolution the session resumes scanning at the resolved span's
//! end; bytes consumed while speculating on a longer candidate are fed
//! again, so tokens beginning inside the speculated tail are still found.

use fixedbitset::FixedBitSet;
use smallvec::SmallVec;

use munch_core::{MatchStep, Span, TokenId, TokenTable};

/// An in-progress candidate match.
///
/// A candidate seeded at `start` has, by construction, matched every
/// input byte from `start` up to the current feed position, so the number
/// of literal bytes matched is always `pos - start`.
#[derive(Copy, Clone, Debug)]
struct Candidate {
    token: TokenId,
    start: u32,
}

/// A completed, not-yet-committed match.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Completed {
    pub token: TokenId,
    pub span: Span,
}

/// Live candidate set plus the held best completed match.
#[derive(Debug, Default)]
pub struct Resolver {
    live: SmallVec<[Candidate; 8]>,
    held: Option<Completed>,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver::default()
    }

    /// Drop all candidates and any held match.
    pub fn reset(&mut self) {
        self.live.clear();
        self.held = None;
    }

    /// Returns `true` while any candidate is live or a match is held.
    ///
    /// While this is `false` the session may skip ahead over bytes that
    /// cannot start a token.
    pub fn has_work(&self) -> bool {
        !self.live.is_empty() || self.held.is_some()
    }

    /// Feed the input byte at `pos`.
    ///
    /// Advances all live candidates, seeds new ones whose literal starts
    /// with `byte` (restricted to `eligible` when a limit is active), and
    /// returns a resolved match once the held match can no longer be
    /// beaten. On resolution the live set is cleared; the caller resumes
    /// feeding from the resolved span's end.
    pub fn feed(
        &mut self,
        table: &TokenTable,
        pos: u32,
        byte: u8,
        eligible: Option<&FixedBitSet>,
    ) -> Option<Completed> {
        // (a) Advance every live candidate by one unit, completing or
        // dropping as the table dictates.
        let mut completed: SmallVec<[Completed; 2]> = SmallVec::new();
        self.live.retain(|c| {
            match table.advance(c.token, pos - c.start, byte) {
                MatchStep::StillMatching => true,
                MatchStep::Matched => {
                    completed.push(Completed {
                        token: c.token,
                        span: Span::new(c.start, pos + 1),
                    });
                    false
                }
                MatchStep::Failed => false,
            }
        });
        for done in completed {
            self.hold_if_better(done);
        }

        // (b) Seed candidates starting at this position. Buckets list
        // longer literals first; a one-byte literal completes on the spot.
        for &id in table.candidates_starting_with(byte) {
            if let Some(set) = eligible {
                if !set.contains(id.index()) {
                    continue;
                }
            }
            if table.literal_len(id) == 1 {
                self.hold_if_better(Completed {
                    token: id,
                    span: Span::new(pos, pos + 1),
                });
            } else {
                self.live.push(Candidate { token: id, start: pos });
            }
        }

        // (c) Resolve once nothing live can still beat the held match.
        self.try_resolve()
    }

    /// End-of-input: every live candidate dies incomplete; the held
    /// match, if any, resolves.
    pub fn flush(&mut self) -> Option<Completed> {
        self.live.clear();
        self.held.take()
    }

    /// Number of live candidates (diagnostics and tests).
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Hold `done` unless an already-held match beats it.
    ///
    /// `done` completes no earlier than anything held before it, so it
    /// wins exactly when it starts at or before the held match -- then it
    /// covers the held span and is strictly longer.
    fn hold_if_better(&mut self, done: Completed) {
        match self.held {
            Some(held) if done.span.start > held.span.start => {}
            _ => self.held = Some(done),
        }
    }

    fn try_resolve(&mut self) -> Option<Completed> {
        let held = self.held?;
        if self
            .live
            .iter()
            .any(|c| c.start <= held.span.start)
        {
            return None;
        }
        // Nothing live covers the held match; it wins. The live rest
        // started inside or after the winning span and will be re-seeded
        // when the session rescans from the span's end.
        self.live.clear();
        self.held = None;
        Some(held)
    }
}
