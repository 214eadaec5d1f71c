//! The execution loop: a pull-based state machine over one input buffer.
//!
//! A session scans internally until it reaches a checkpoint that needs
//! host attention, then suspends and returns a [`Checkpoint`]. The host
//! inspects the result, optionally adjusts the limit stack or rejects the
//! pending token, and resumes by calling [`step`](Session::step) again.
//! The engine never calls back into host code.
//!
//! # Suspension invariant
//!
//! Every suspension point has an empty candidate set: a token resolves
//! only after the live set is cleared, and Start/End trivially have no
//! candidates in flight. Limit mutations between steps therefore never
//! affect an in-progress match, only future seeding.

use tracing::{debug, trace};

use munch_core::{ByteSet, SourceBuffer, Span, TokenId};

use crate::error::{LimitError, SessionError};
use crate::event::{Checkpoint, TokenEvent};
use crate::grammar::Grammar;
use crate::limits::LimitStack;
use crate::resolver::{Completed, Resolver};

/// Where the session currently is between steps.
#[derive(Copy, Clone, Debug)]
enum State {
    /// Input set, `Start` not yet emitted.
    NotStarted,
    /// Between checkpoints, mid-scan.
    Scanning,
    /// Suspended at `BeforeToken`; the match is resolved but uncommitted.
    AtToken { event: TokenEvent, rejected: bool },
    /// `End` emitted; the next step yields `Stopped`.
    Ended,
    /// Terminal.
    Stopped,
}

/// One scanning session over one input buffer.
///
/// Borrows its immutable [`Grammar`]; any number of sessions may share
/// one grammar, each owning its scan state and limit stack exclusively.
pub struct Session<'g> {
    grammar: &'g Grammar,
    limits: LimitStack<'g>,
    state: State,
    input: Option<SourceBuffer>,
    /// Next byte to feed.
    pos: u32,
    /// End of the last committed token; pending leading text starts here.
    committed_end: u32,
    resolver: Resolver,
    /// First bytes of tokens eligible under the active limits, used to
    /// skip leading-text runs. Refreshed on every limit-stack change.
    active_start_bytes: ByteSet,
    last_token: Option<TokenEvent>,
    previous_token: Option<TokenEvent>,
}

impl<'g> Session<'g> {
    /// Create a session with no input set.
    pub fn new(grammar: &'g Grammar) -> Self {
        Session {
            grammar,
            limits: LimitStack::new(grammar),
            state: State::NotStarted,
            input: None,
            pos: 0,
            committed_end: 0,
            resolver: Resolver::new(),
            active_start_bytes: grammar.table().start_bytes().clone(),
            last_token: None,
            previous_token: None,
        }
    }

    /// Set (or replace) the input text, resetting all scan state and the
    /// limit stack. The session transitions to its not-started state; the
    /// grammar is reused without recompiling.
    pub fn set_input(&mut self, text: &str) {
        debug!(len = text.len(), "setting session input");
        self.input = Some(SourceBuffer::new(text));
        self.pos = 0;
        self.committed_end = 0;
        self.resolver.reset();
        self.limits.clear();
        self.active_start_bytes = self.grammar.table().start_bytes().clone();
        self.last_token = None;
        self.previous_token = None;
        self.state = State::NotStarted;
    }

    /// Run until the next checkpoint and return it.
    ///
    /// Fails with [`SessionError::AlreadyStopped`] after the terminal
    /// checkpoint and [`SessionError::NoInputSet`] before any input is
    /// set.
    pub fn step(&mut self) -> Result<Checkpoint, SessionError> {
        let checkpoint = match self.state {
            State::Stopped => return Err(SessionError::AlreadyStopped),
            _ if self.input.is_none() => return Err(SessionError::NoInputSet),
            State::NotStarted => {
                self.state = State::Scanning;
                Checkpoint::Start
            }
            State::Ended => {
                self.state = State::Stopped;
                Checkpoint::Stopped
            }
            State::AtToken { event, rejected } => {
                // Either way scanning resumes at the span's end; a
                // rejected span simply stays part of the leading text.
                self.pos = event.span.end;
                self.resolver.reset();
                self.state = State::Scanning;
                if rejected {
                    trace!(event = ?event, "token rejected, span folded into leading text");
                    self.advance_to_checkpoint()
                } else {
                    self.committed_end = event.span.end;
                    self.previous_token = self.last_token;
                    self.last_token = Some(event);
                    Checkpoint::TokenProcessed(event)
                }
            }
            State::Scanning => self.advance_to_checkpoint(),
        };

        trace!(checkpoint = ?checkpoint, "suspending");
        Ok(checkpoint)
    }

    /// Loop `step()` until the terminal checkpoint, collecting the whole
    /// checkpoint sequence. For hosts with no per-checkpoint logic.
    pub fn run_to_completion(&mut self) -> Result<Vec<Checkpoint>, SessionError> {
        let mut checkpoints = Vec::new();
        loop {
            let checkpoint = self.step()?;
            let done = checkpoint.is_terminal();
            checkpoints.push(checkpoint);
            if done {
                return Ok(checkpoints);
            }
        }
    }

    /// Force the terminal state, releasing the scan state and input
    /// buffer. A new session starts with `set_input`.
    pub fn stop(&mut self) {
        debug!("session stopped by host");
        self.state = State::Stopped;
        self.input = None;
        self.resolver.reset();
    }

    /// At a `BeforeToken` suspension: treat the resolved span as leading
    /// text instead of committing it. Scanning resumes after the span on
    /// the next step.
    pub fn reject_token(&mut self) -> Result<(), SessionError> {
        match &mut self.state {
            State::Stopped => Err(SessionError::AlreadyStopped),
            State::AtToken { rejected, .. } => {
                *rejected = true;
                Ok(())
            }
            _ => Err(SessionError::NotAtToken),
        }
    }

    /// Push a named limit; tokens outside its set stop matching from the
    /// next position onward.
    pub fn enter_limit(&mut self, name: &str) -> Result<(), LimitError> {
        self.limits.enter(name)?;
        self.refresh_start_bytes();
        Ok(())
    }

    /// Pop `levels` limits.
    pub fn exit_limit(&mut self, levels: usize) -> Result<(), LimitError> {
        self.limits.exit(levels)?;
        self.refresh_start_bytes();
        Ok(())
    }

    /// Current limit-stack depth.
    pub fn limit_depth(&self) -> usize {
        self.limits.depth()
    }

    /// The most recently committed token event.
    pub fn last_token(&self) -> Option<&TokenEvent> {
        self.last_token.as_ref()
    }

    /// The committed token event before [`last_token`](Self::last_token).
    pub fn previous_token(&self) -> Option<&TokenEvent> {
        self.previous_token.as_ref()
    }

    /// Slice the current input by a span from a checkpoint payload.
    ///
    /// Returns `None` when no input is set (e.g. after `stop()`).
    pub fn input_slice(&self, span: Span) -> Option<&str> {
        self.input
            .as_ref()
            .map(|buf| buf.cursor().slice(span.start, span.end))
    }

    /// Scan forward until a token resolves or input runs out.
    fn advance_to_checkpoint(&mut self) -> Checkpoint {
        // Checked by step() before dispatching here.
        let Some(buf) = self.input.as_ref() else {
            unreachable!("advance_to_checkpoint requires input");
        };
        let table = self.grammar.table();
        let mut cursor = buf.cursor_at(self.pos);

        loop {
            if cursor.is_eof() {
                if let Some(done) = self.resolver.flush() {
                    // A held match resolves at end of input; rescan its
                    // tail like any other resolution.
                    return self.suspend_at_token(done);
                }
                let trailing = Span::new(self.committed_end, buf.len());
                self.pos = buf.len();
                self.state = State::Ended;
                return Checkpoint::End {
                    trailing,
                    limit_depth: self.depth_u32(),
                };
            }

            // With nothing in flight, skip straight to the next byte that
            // could start an eligible token.
            if !self.resolver.has_work() {
                cursor.skip_to_byte_in(&self.active_start_bytes);
                if cursor.is_eof() {
                    continue;
                }
            }

            let pos = cursor.pos();
            if let Some(done) =
                self.resolver
                    .feed(table, pos, cursor.current(), self.limits.active())
            {
                return self.suspend_at_token(done);
            }
            cursor.advance();
        }
    }

    /// Suspend at `BeforeToken` for a resolved match.
    fn suspend_at_token(&mut self, done: Completed) -> Checkpoint {
        // Resume at the span's end; bytes consumed while speculating past
        // it get rescanned.
        self.pos = done.span.end;
        let event = TokenEvent {
            token: done.token,
            span: done.span,
            leading: Span::new(self.committed_end, done.span.start),
            limit_depth: self.depth_u32(),
        };
        self.state = State::AtToken {
            event,
            rejected: false,
        };
        Checkpoint::BeforeToken(event)
    }

    /// Rebuild the leading-text skip set from the active limits.
    fn refresh_start_bytes(&mut self) {
        let table = self.grammar.table();
        self.active_start_bytes = match self.limits.active() {
            None => table.start_bytes().clone(),
            Some(set) => ByteSet::from_bytes(set.ones().map(|i| {
                let id = TokenId::new(u16::try_from(i).unwrap_or(u16::MAX));
                table.literal(id).as_bytes()[0]
            })),
        };
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "limit depth is bounded by host push count, far below u32::MAX"
    )]
    fn depth_u32(&self) -> u32 {
        self.limits.depth() as u32
    }
}

#[cfg(test)]
mod tests;
