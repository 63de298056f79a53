//! Parse lifecycle listeners
//!
//! Listeners observe a parse at five points: before the parse, before each
//! rule match, after each success or failure, and after the parse. They are
//! registered on a [`ParseRunner`](super::runner::ParseRunner) and called
//! synchronously in registration order.
//!
//! A hook returning an error never aborts the parse. The error goes to the
//! runner's error handler, or to the log when none is set.

use super::buffer::InputBuffer;
use super::context::MatchContext;
use super::error::ListenerError;
use super::runner::ParseResult;

/// Observer of parse lifecycle events
///
/// Every hook defaults to doing nothing.
pub trait ParseListener<V> {
    /// Called once before the root rule runs
    fn before_parse(&mut self, _buffer: &InputBuffer) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called before a rule is matched
    fn before_match(&mut self, _ctx: &MatchContext<'_, '_, V>) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called after a rule matched; the context shows the end index
    fn match_success(&mut self, _ctx: &MatchContext<'_, '_, V>) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called after a rule failed to match
    fn match_failure(&mut self, _ctx: &MatchContext<'_, '_, V>) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called once with the finished result
    fn after_parse(&mut self, _result: &ParseResult<V>) -> Result<(), ListenerError> {
        Ok(())
    }
}

/// Handle returned by [`ParseRunner::add_listener`](super::runner::ParseRunner::add_listener)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Receiver for errors raised by listener hooks
pub type ErrorHandler = Box<dyn FnMut(ListenerError)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchEvent {
    Before,
    Success,
    Failure,
}

/// Registered listeners plus the error handler
pub(crate) struct ListenerSet<V> {
    entries: Vec<(ListenerId, Box<dyn ParseListener<V>>)>,
    handler: Option<ErrorHandler>,
    next_id: u64,
}

impl<V> Default for ListenerSet<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            handler: None,
            next_id: 0,
        }
    }
}

impl<V> ListenerSet<V> {
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn add(&mut self, listener: Box<dyn ParseListener<V>>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> Option<Box<dyn ParseListener<V>>> {
        let pos = self.entries.iter().position(|(entry, _)| *entry == id)?;
        Some(self.entries.remove(pos).1)
    }

    pub(crate) fn set_handler(&mut self, handler: ErrorHandler) {
        self.handler = Some(handler);
    }

    pub(crate) fn before_parse(&mut self, buffer: &InputBuffer) {
        for i in 0..self.entries.len() {
            let outcome = self.entries[i].1.before_parse(buffer);
            self.report(outcome);
        }
    }

    pub(crate) fn dispatch_match(&mut self, event: MatchEvent, ctx: &MatchContext<'_, '_, V>) {
        for i in 0..self.entries.len() {
            let listener = &mut self.entries[i].1;
            let outcome = match event {
                MatchEvent::Before => listener.before_match(ctx),
                MatchEvent::Success => listener.match_success(ctx),
                MatchEvent::Failure => listener.match_failure(ctx),
            };
            self.report(outcome);
        }
    }

    pub(crate) fn after_parse(&mut self, result: &ParseResult<V>) {
        for i in 0..self.entries.len() {
            let outcome = self.entries[i].1.after_parse(result);
            self.report(outcome);
        }
    }

    fn report(&mut self, outcome: Result<(), ListenerError>) {
        if let Err(err) = outcome {
            match self.handler.as_mut() {
                Some(handler) => handler(err),
                None => log_warn!("listener error: {}", err),
            }
        }
    }
}
