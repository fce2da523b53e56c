//! Per-operation channel between an engine worker and the connection owner.
//!
//! A [`Connection`] is owned by whoever started an engine operation. The engine
//! calls [`Connection::begin`] to register its cancellation target and receives an
//! [`Emitter`], which it moves onto the worker. Events sent through the emitter
//! queue up until the owner pumps them with [`Connection::dispatch`] or
//! [`Connection::wait`]; only then are the [`ConnectionHandler`] callbacks invoked,
//! always on the owner's thread.
//!
//! The owner observes zero or more `on_data_ready` / `on_progress` calls followed
//! by exactly one of `on_finished` / `on_aborted`, and nothing afterwards.
//!
//! A stop only affects what the worker sends after it. Events already queued
//! when [`Connection::stop`] is called are still delivered, and an operation
//! whose terminal event was already queued keeps that outcome.

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        mpsc::{self, Receiver, RecvError, Sender, TryRecvError},
    },
};

use ks_query::LocationList;
use tracing::debug;

use crate::{Controlled, EngineError};

/// Callbacks invoked while an engine operation runs.
pub trait ConnectionHandler {
    /// A batch of results is available.
    fn on_data_ready(&mut self, batch: LocationList);

    /// The operation reports progress. `total` is 0 when unknown.
    fn on_progress(&mut self, text: &str, current: usize, total: usize);

    /// The operation completed normally.
    fn on_finished(&mut self);

    /// The operation was stopped or terminated abnormally.
    fn on_aborted(&mut self);
}

/// How an operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `on_finished` was delivered.
    Finished,
    /// `on_aborted` was delivered.
    Aborted,
}

/// Lifecycle of the operation carried by a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No operation was started yet.
    Idle,
    /// An operation is in flight.
    Running,
    /// The last operation delivered its terminal callback.
    Done(Outcome),
}

/// Messages sent from the worker to the owner.
#[derive(Debug)]
enum Event {
    /// A result batch.
    Data(LocationList),
    /// A progress report.
    Progress {
        /// Description of the current step.
        text: String,
        /// Units completed.
        current: usize,
        /// Units expected (0 if unknown).
        total: usize,
    },
    /// Normal completion.
    Finished,
    /// Abnormal completion.
    Aborted,
}

impl Event {
    /// Whether this event ends the operation.
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Aborted)
    }
}

/// The owner's half of an engine operation.
///
/// A connection carries at most one operation at a time. Once the terminal
/// callback has been delivered it may be reused for another operation.
pub struct Connection {
    /// Cancellation target registered by the engine.
    ctrl: Option<Arc<dyn Controlled>>,
    /// Receiving end of the event channel for the current operation.
    events: Option<Receiver<Event>>,
    /// Events the worker sent before the stop request.
    backlog: VecDeque<Event>,
    /// Where the current operation stands.
    state: ConnectionState,
    /// Whether the owner asked the current operation to stop.
    stop_requested: bool,
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    /// Creates an idle connection.
    pub fn new() -> Self {
        Self {
            ctrl: None,
            events: None,
            backlog: VecDeque::new(),
            state: ConnectionState::Idle,
            stop_requested: false,
        }
    }

    /// Returns the lifecycle state of the carried operation.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether an operation is in flight.
    pub fn is_running(&self) -> bool {
        self.state == ConnectionState::Running
    }

    /// Whether the owner requested a stop for the current operation.
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Starts an operation: registers the engine's cancellation target and opens
    /// the event channel.
    ///
    /// Called by engines before any callback can fire. Returns the worker's half
    /// of the channel, or [`EngineError::Busy`] if an operation is already in
    /// flight on this connection.
    pub fn begin(&mut self, ctrl: Arc<dyn Controlled>) -> Result<Emitter, EngineError> {
        if self.is_running() {
            return Err(EngineError::Busy);
        }

        let (tx, rx) = mpsc::channel();
        self.ctrl = Some(Arc::clone(&ctrl));
        self.events = Some(rx);
        self.backlog.clear();
        self.state = ConnectionState::Running;
        self.stop_requested = false;

        Ok(Emitter {
            tx,
            ctrl,
            terminated: false,
        })
    }

    /// Rolls back a [`begin`](Self::begin) whose operation could not be started.
    ///
    /// Anything the discarded emitter may have sent is dropped unseen and the
    /// connection returns to [`ConnectionState::Idle`].
    pub fn abandon(&mut self) {
        if self.is_running() {
            self.ctrl = None;
            self.events = None;
            self.backlog.clear();
            self.state = ConnectionState::Idle;
            self.stop_requested = false;
        }
    }

    /// Asks the current operation to stop.
    ///
    /// Safe to call at any time: with no operation in flight, or before the
    /// engine registered a target, it does nothing. Events queued before the
    /// call are still delivered. If the worker already sent its terminal event
    /// the stop has no effect; otherwise later data and progress are discarded
    /// and the terminal callback is `on_aborted`.
    pub fn stop(&mut self) {
        if !self.is_running() {
            debug!(state = ?self.state, "stop requested with no operation in flight");
            return;
        }
        if self.stop_requested {
            return;
        }

        if let Some(rx) = &self.events {
            self.backlog.extend(rx.try_iter());
        }
        if self.backlog.iter().any(Event::is_terminal) {
            debug!("stop requested after the operation ended");
            return;
        }

        self.stop_requested = true;
        match &self.ctrl {
            Some(ctrl) => ctrl.stop(),
            None => debug!("stop requested before a cancellation target was registered"),
        }
    }

    /// Delivers every event already queued, without blocking.
    ///
    /// Returns the outcome once the terminal callback has been delivered (now or
    /// earlier), `None` while the operation is still running or none was started.
    pub fn dispatch<H: ConnectionHandler + ?Sized>(&mut self, handler: &mut H) -> Option<Outcome> {
        if let Some(outcome) = self.drain_backlog(handler) {
            return Some(outcome);
        }
        loop {
            let received = match &self.events {
                Some(rx) => rx.try_recv(),
                None => return self.outcome(),
            };

            match received {
                Ok(event) => {
                    if let Some(outcome) = self.deliver(event, self.stop_requested, handler) {
                        return Some(outcome);
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    return Some(self.terminate(Outcome::Aborted, handler));
                }
            }
        }
    }

    /// Blocks, delivering events as they arrive, until the operation ends.
    ///
    /// Returns `None` only if no operation was ever started on this connection.
    pub fn wait<H: ConnectionHandler + ?Sized>(&mut self, handler: &mut H) -> Option<Outcome> {
        if let Some(outcome) = self.drain_backlog(handler) {
            return Some(outcome);
        }
        loop {
            let received = match &self.events {
                Some(rx) => rx.recv(),
                None => return self.outcome(),
            };

            match received {
                Ok(event) => {
                    if let Some(outcome) = self.deliver(event, self.stop_requested, handler) {
                        return Some(outcome);
                    }
                }
                Err(RecvError) => return Some(self.terminate(Outcome::Aborted, handler)),
            }
        }
    }

    /// Outcome of the last operation, if it has ended.
    fn outcome(&self) -> Option<Outcome> {
        match self.state {
            ConnectionState::Done(outcome) => Some(outcome),
            ConnectionState::Idle | ConnectionState::Running => None,
        }
    }

    /// Delivers the events that were queued before the stop request.
    fn drain_backlog<H: ConnectionHandler + ?Sized>(&mut self, handler: &mut H) -> Option<Outcome> {
        while let Some(event) = self.backlog.pop_front() {
            if let Some(outcome) = self.deliver(event, false, handler) {
                return Some(outcome);
            }
        }
        None
    }

    /// Hands one event to the handler. Returns the outcome for terminal events.
    ///
    /// `after_stop` marks events the worker sent after the stop request: their
    /// data and progress are dropped and `Finished` becomes `Aborted`.
    fn deliver<H: ConnectionHandler + ?Sized>(
        &mut self,
        event: Event,
        after_stop: bool,
        handler: &mut H,
    ) -> Option<Outcome> {
        match event {
            Event::Data(batch) => {
                if !after_stop {
                    handler.on_data_ready(batch);
                }
                None
            }
            Event::Progress {
                text,
                current,
                total,
            } => {
                if !after_stop {
                    handler.on_progress(&text, current, total);
                }
                None
            }
            Event::Finished if after_stop => Some(self.terminate(Outcome::Aborted, handler)),
            Event::Finished => Some(self.terminate(Outcome::Finished, handler)),
            Event::Aborted => Some(self.terminate(Outcome::Aborted, handler)),
        }
    }

    /// Closes the channel and delivers the terminal callback.
    fn terminate<H: ConnectionHandler + ?Sized>(
        &mut self,
        outcome: Outcome,
        handler: &mut H,
    ) -> Outcome {
        self.events = None;
        self.backlog.clear();
        self.ctrl = None;
        self.state = ConnectionState::Done(outcome);

        match outcome {
            Outcome::Finished => handler.on_finished(),
            Outcome::Aborted => handler.on_aborted(),
        }
        outcome
    }
}

/// The worker's half of an engine operation.
///
/// Terminal methods consume the emitter, so nothing can be sent after them.
/// Dropping an emitter without calling either delivers `on_aborted`.
pub struct Emitter {
    /// Sending end of the event channel.
    tx: Sender<Event>,
    /// The cancellation target registered for this operation.
    ctrl: Arc<dyn Controlled>,
    /// Whether a terminal event was sent.
    terminated: bool,
}

impl Emitter {
    /// Whether a stop was requested for this operation.
    pub fn is_stopped(&self) -> bool {
        self.ctrl.is_stopped()
    }

    /// Sends a batch of results.
    ///
    /// Returns `false` once the operation was stopped or the owner went away;
    /// the batch is not delivered in that case and the worker should wind down.
    /// Empty batches are skipped.
    pub fn data(&self, batch: LocationList) -> bool {
        if self.is_stopped() {
            return false;
        }
        if batch.is_empty() {
            return true;
        }
        self.tx.send(Event::Data(batch)).is_ok()
    }

    /// Sends a progress report. Returns `false` under the same conditions as
    /// [`data`](Self::data).
    pub fn progress(&self, text: impl Into<String>, current: usize, total: usize) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.tx
            .send(Event::Progress {
                text: text.into(),
                current,
                total,
            })
            .is_ok()
    }

    /// Ends the operation normally.
    ///
    /// If a stop was requested in the meantime the operation is reported as
    /// aborted instead.
    pub fn finish(mut self) {
        let event = if self.is_stopped() {
            Event::Aborted
        } else {
            Event::Finished
        };
        self.send_terminal(event);
    }

    /// Ends the operation as aborted.
    pub fn abort(mut self) {
        self.send_terminal(Event::Aborted);
    }

    /// Sends the terminal event exactly once.
    fn send_terminal(&mut self, event: Event) {
        self.terminated = true;
        if self.tx.send(event).is_err() {
            debug!("connection owner went away before the operation ended");
        }
    }
}

impl Drop for Emitter {
    fn drop(&mut self) {
        if !self.terminated {
            self.send_terminal(Event::Aborted);
        }
    }
}
