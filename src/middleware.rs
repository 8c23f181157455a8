// Middleware layers for handlers
//
// Each layer wraps a handler, keeps its target, and adds a cross-cutting
// concern around every interpreted operation. Layers stack:
// `Trace::new(Recording::new(StateHandler::new()))` is itself a handler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use crate::handler::{self, Handler};
use crate::monad::Of;
use crate::program::{Program, Signature};

/// Tracing middleware that logs every interpreted operation.
#[derive(Debug, Clone)]
pub struct Trace<H> {
    inner: H,
    prefix: String,
}

impl<H> Trace<H> {
    /// Wrap `inner` with the default prefix.
    pub fn new(inner: H) -> Self {
        Self::with_prefix(inner, "effects")
    }

    /// Wrap `inner`, tagging every event with `prefix`.
    pub fn with_prefix(inner: H, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    /// The wrapped handler.
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<F: Signature, H: Handler<F>> Handler<F> for Trace<H> {
    type Target = H::Target;

    fn handle_op<K: 'static>(&self, op: F::Op<K>) -> Of<H::Target, K> {
        trace!(
            prefix = %self.prefix,
            effect = F::effect_name(&op),
            op = F::op_name(&op),
            "handle"
        );
        self.inner.handle_op(op)
    }

    fn handle<A: 'static>(&self, program: Program<F, A>) -> Of<H::Target, A> {
        debug!(prefix = %self.prefix, signature = F::NAME, "interpret: start");
        let interpreted = handler::drive(self, program);
        // Deferred targets such as `Stateful` run their operations later,
        // when the caller supplies the state.
        debug!(prefix = %self.prefix, signature = F::NAME, "interpret: built");
        interpreted
    }
}

/// Counting middleware. Clones share their counters.
#[derive(Debug, Clone)]
pub struct Metrics<H> {
    inner: H,
    op_count: Arc<AtomicU64>,
    program_count: Arc<AtomicU64>,
}

impl<H> Metrics<H> {
    /// Wrap `inner` with fresh counters.
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            op_count: Arc::new(AtomicU64::new(0)),
            program_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Operations handled so far.
    pub fn op_count(&self) -> u64 {
        self.op_count.load(Ordering::Relaxed)
    }

    /// Programs passed to [`Handler::handle`] so far.
    pub fn program_count(&self) -> u64 {
        self.program_count.load(Ordering::Relaxed)
    }
}

impl<F: Signature, H: Handler<F>> Handler<F> for Metrics<H> {
    type Target = H::Target;

    fn handle_op<K: 'static>(&self, op: F::Op<K>) -> Of<H::Target, K> {
        self.op_count.fetch_add(1, Ordering::Relaxed);
        self.inner.handle_op(op)
    }

    fn handle<A: 'static>(&self, program: Program<F, A>) -> Of<H::Target, A> {
        self.program_count.fetch_add(1, Ordering::Relaxed);
        handler::drive(self, program)
    }
}

/// One operation seen by a [`Recording`] handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordedEvent {
    /// Name of the effect the operation belongs to.
    pub effect: &'static str,
    /// Name of the operation.
    pub op: &'static str,
}

/// Shared, append-only event log.
pub type EventLog = Arc<Mutex<Vec<RecordedEvent>>>;

/// Recording middleware: appends every handled operation to a log, in
/// handling order. Clones, and handlers built with [`Recording::with_log`],
/// share the log.
#[derive(Debug, Clone)]
pub struct Recording<H> {
    inner: H,
    events: EventLog,
}

impl<H> Recording<H> {
    /// Wrap `inner` with a fresh log.
    pub fn new(inner: H) -> Self {
        Self::with_log(inner, EventLog::default())
    }

    /// Wrap `inner`, appending to an existing log.
    pub fn with_log(inner: H, events: EventLog) -> Self {
        Self { inner, events }
    }

    /// The log this handler appends to.
    pub fn log(&self) -> EventLog {
        Arc::clone(&self.events)
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget all recorded events.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<F: Signature, H: Handler<F>> Handler<F> for Recording<H> {
    type Target = H::Target;

    fn handle_op<K: 'static>(&self, op: F::Op<K>) -> Of<H::Target, K> {
        let event = RecordedEvent {
            effect: F::effect_name(&op),
            op: F::op_name(&op),
        };
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        self.inner.handle_op(op)
    }
}
