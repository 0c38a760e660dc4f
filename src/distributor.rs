//! Fan-out sink that multiplexes to an ordered list of children (spec §4.B).
//!
//! Parameterised by a lock discipline, mirroring the source's `Mutex`
//! template parameter (`dist_sink<Mutex>` / `dist_sink<null_mutex>`): one
//! generic implementation, two concrete aliases — `DistributorSink` (real,
//! thread-safe mutex) and `DistributorSinkLocal` (no-op lock for
//! single-threaded use, where the caller guarantees no concurrent access).

use std::cell::UnsafeCell;
use std::sync::Arc;

use parking_lot::Mutex as RealMutex;

use crate::error::SinkError;
use crate::error_handler::{default_error_handler, ErrorHandler};
use crate::level::Level;
use crate::message::LogMessage;
use crate::sink::{Formatter, Sink, SinkBase};

/// Locking discipline for a distributor's child list.
///
/// # Safety
///
/// Implementations must ensure `with_children` never hands out two live
/// `&mut Vec<_>` borrows at once. [`NullLock`] upholds this only because its
/// documented contract requires the caller to avoid concurrent access
/// entirely; it performs no real synchronization.
pub unsafe trait ChildLock: Send + Sync {
    fn with_children<R>(&self, f: impl FnOnce(&mut Vec<Arc<dyn Sink>>) -> R) -> R;
}

/// Real mutex: safe to share a `DistributorSink` across threads.
pub struct RealLock(RealMutex<Vec<Arc<dyn Sink>>>);

impl RealLock {
    fn new() -> Self {
        RealLock(RealMutex::new(Vec::new()))
    }
}

unsafe impl ChildLock for RealLock {
    fn with_children<R>(&self, f: impl FnOnce(&mut Vec<Arc<dyn Sink>>) -> R) -> R {
        f(&mut self.0.lock())
    }
}

/// No-op lock: zero synchronization overhead, for single-threaded use only.
///
/// # Safety
///
/// `NullLock` is `unsafe impl Sync` on the strength of the caller's promise
/// (documented on [`DistributorSinkLocal`]) never to touch it from more than
/// one thread, or to otherwise externally serialise access. It is the direct
/// analogue of spdlog's `null_mutex`.
pub struct NullLock(UnsafeCell<Vec<Arc<dyn Sink>>>);

impl NullLock {
    fn new() -> Self {
        NullLock(UnsafeCell::new(Vec::new()))
    }
}

// SAFETY: see the `NullLock` doc comment — single-threaded use is a caller
// contract, not something this type enforces.
unsafe impl Sync for NullLock {}

unsafe impl ChildLock for NullLock {
    fn with_children<R>(&self, f: impl FnOnce(&mut Vec<Arc<dyn Sink>>) -> R) -> R {
        // SAFETY: caller contract (see `NullLock` docs) guarantees no
        // concurrent access, so this is the only live borrow.
        f(unsafe { &mut *self.0.get() })
    }
}

/// A sink that owns an ordered list of child sinks and forwards every
/// message and flush to each of them in registration order.
pub struct DistributorSinkImpl<L: ChildLock> {
    children: L,
    base: SinkBase,
    error_handler: ErrorHandler,
}

/// Thread-safe distributor: children may be added, removed, or fanned out to
/// concurrently from any thread. This is what `AsyncSink` embeds.
pub type DistributorSink = DistributorSinkImpl<RealLock>;

/// Single-threaded distributor: the caller guarantees `add_sink`,
/// `remove_sink`, and `sink_it` are never invoked concurrently.
pub type DistributorSinkLocal = DistributorSinkImpl<NullLock>;

impl DistributorSink {
    pub fn new() -> Self {
        DistributorSinkImpl::with_lock(RealLock::new())
    }
}

impl Default for DistributorSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DistributorSinkLocal {
    pub fn new() -> Self {
        DistributorSinkImpl::with_lock(NullLock::new())
    }
}

impl Default for DistributorSinkLocal {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ChildLock> DistributorSinkImpl<L> {
    fn with_lock(children: L) -> Self {
        DistributorSinkImpl {
            children,
            base: SinkBase::default(),
            error_handler: default_error_handler(),
        }
    }

    /// Overrides the error handler used when a child sink fails. Primarily
    /// for tests that want to observe failures instead of printing them.
    pub fn set_error_handler(&mut self, handler: ErrorHandler) {
        self.error_handler = handler;
    }

    /// Appends `child` to the end of the registration order.
    pub fn add_sink(&self, child: Arc<dyn Sink>) {
        self.children.with_children(|children| children.push(child));
    }

    /// Removes the first child matching `target` by pointer identity.
    pub fn remove_sink(&self, target: &Arc<dyn Sink>) {
        self.children.with_children(|children| {
            if let Some(pos) = children
                .iter()
                .position(|child| Arc::ptr_eq(child, target))
            {
                children.remove(pos);
            }
        });
    }

    pub fn sink_count(&self) -> usize {
        self.children.with_children(|children| children.len())
    }

    /// Forwards `msg` to every child in registration order. A child that
    /// returns an error does not stop the fan-out: the error is routed to
    /// the error handler and the next child still receives the message.
    pub fn sink_it_(&self, msg: &LogMessage) {
        self.children.with_children(|children| {
            for child in children.iter() {
                if let Err(err) = child.sink_it(msg) {
                    (self.error_handler)(&err.to_string());
                }
            }
        });
    }

    /// Flushes every child in registration order, same error handling as
    /// `sink_it_`.
    pub fn flush_(&self) {
        self.children.with_children(|children| {
            for child in children.iter() {
                if let Err(err) = child.flush() {
                    (self.error_handler)(&err.to_string());
                }
            }
        });
    }

    /// Broadcasts a pattern string to every child.
    fn set_pattern_(&self, pattern: &str) {
        self.children.with_children(|children| {
            for child in children.iter() {
                if let Err(err) = child.set_pattern(pattern) {
                    (self.error_handler)(&err.to_string());
                }
            }
        });
    }

    /// Broadcasts a formatter to every child, calling `make_formatter` once
    /// per child so no two children share a formatter instance.
    pub fn set_formatter_with<F>(&self, make_formatter: F)
    where
        F: Fn() -> Box<dyn Formatter>,
    {
        self.children.with_children(|children| {
            for child in children.iter() {
                child.set_formatter(make_formatter());
            }
        });
    }
}

impl<L: ChildLock> Sink for DistributorSinkImpl<L> {
    fn sink_it(&self, msg: &LogMessage) -> Result<(), SinkError> {
        self.sink_it_(msg);
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.flush_();
        Ok(())
    }

    fn set_pattern(&self, pattern: &str) -> Result<(), SinkError> {
        self.set_pattern_(pattern);
        Ok(())
    }

    fn set_formatter(&self, _formatter: Box<dyn Formatter>) {
        // A distributor has no formatter of its own to swap in place: use
        // `set_formatter_with` to broadcast a factory to every child.
    }

    fn set_level(&self, level: Level) {
        self.base.set_level(level);
    }

    fn level(&self) -> Level {
        self.base.level()
    }
}
