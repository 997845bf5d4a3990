//! Event loop integration and the cross-thread bridge.
//!
//! The platform context lives on the event thread and is not `Send`.
//! Other threads (assistive technology bridges, mostly) reach it through a
//! [`BridgeHandle`]: each request is a job sent over a channel, run by
//! [`EventLoop::dispatch_pending`] on the event thread, with the answer sent
//! back on a per-request reply channel.
//!
//! Callers never block indefinitely. A request fails fast when it is issued
//! from the event thread itself, when another request is already waiting,
//! or when the event loop is suspended, and it gives up after the
//! configured timeout otherwise.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread::{self, ThreadId};
use std::time::Duration;

use crate::core::context::Context;
use crate::core::errors::BridgeError;
use crate::util::logging::BRIDGE;

/// Work to run against the context on the event thread
pub type Job = Box<dyn FnOnce(&mut Context) + Send>;

struct Shared {
    event_thread: ThreadId,
    suspended: AtomicBool,
    /// Jobs sent but not yet run or dropped
    queued: AtomicUsize,
    /// Held by the thread currently waiting on a reply
    in_flight: Mutex<()>,
    timeout: Duration,
}

// ============================================================================
// Bridge Handle
// ============================================================================

/// Cloneable, `Send` handle for calling into the event thread.
#[derive(Clone)]
pub struct BridgeHandle {
    jobs: Sender<Job>,
    shared: Arc<Shared>,
}

impl BridgeHandle {
    /// Run `request` on the event thread and wait for its result.
    pub fn call<R, F>(&self, request: F) -> Result<R, BridgeError>
    where
        R: Send + 'static,
        F: FnOnce(&mut Context) -> R + Send + 'static,
    {
        let result = self.call_inner(request);
        if let Err(e) = &result {
            tracing::warn!("[{}] Bridge request failed: {}", BRIDGE, e);
        }
        result
    }

    fn call_inner<R, F>(&self, request: F) -> Result<R, BridgeError>
    where
        R: Send + 'static,
        F: FnOnce(&mut Context) -> R + Send + 'static,
    {
        if thread::current().id() == self.shared.event_thread {
            return Err(BridgeError::Reentrant);
        }
        if self.is_suspended() {
            return Err(BridgeError::Suspended);
        }
        let _guard = match self.shared.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(BridgeError::Busy),
            // A caller panicking while waiting leaves nothing inconsistent.
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        let (reply, answer) = mpsc::channel();
        let job: Job = Box::new(move |context| {
            // The caller may have timed out already.
            let _ = reply.send(request(context));
        });
        self.send(job)?;

        match answer.recv_timeout(self.shared.timeout) {
            Ok(value) => Ok(value),
            Err(RecvTimeoutError::Timeout) => Err(BridgeError::Timeout(self.shared.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::Abandoned),
        }
    }

    /// Queue `job` without waiting for it.
    pub fn post<F>(&self, job: F) -> Result<(), BridgeError>
    where
        F: FnOnce(&mut Context) + Send + 'static,
    {
        if self.is_suspended() {
            return Err(BridgeError::Suspended);
        }
        self.send(Box::new(job))
    }

    fn send(&self, job: Job) -> Result<(), BridgeError> {
        self.shared.queued.fetch_add(1, Ordering::AcqRel);
        self.jobs.send(job).map_err(|_| {
            self.shared.queued.fetch_sub(1, Ordering::AcqRel);
            BridgeError::Abandoned
        })
    }

    pub fn is_suspended(&self) -> bool {
        self.shared.suspended.load(Ordering::Acquire)
    }

    pub fn timeout(&self) -> Duration {
        self.shared.timeout
    }
}

impl std::fmt::Debug for BridgeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeHandle")
            .field("suspended", &self.is_suspended())
            .field("timeout", &self.shared.timeout)
            .finish()
    }
}

// ============================================================================
// Event Loop
// ============================================================================

/// Event-thread side of the bridge.
///
/// Must be created on the thread that owns the [`Context`]. Platform
/// adapters call [`EventLoop::dispatch_pending`] from their run loop.
pub struct EventLoop {
    jobs: Receiver<Job>,
    handle: BridgeHandle,
}

impl EventLoop {
    pub fn new(timeout: Duration) -> Self {
        let (sender, jobs) = mpsc::channel();
        let shared = Arc::new(Shared {
            event_thread: thread::current().id(),
            suspended: AtomicBool::new(false),
            queued: AtomicUsize::new(0),
            in_flight: Mutex::new(()),
            timeout,
        });
        Self {
            jobs,
            handle: BridgeHandle { jobs: sender, shared },
        }
    }

    pub fn handle(&self) -> BridgeHandle {
        self.handle.clone()
    }

    /// Run every queued job. Returns how many ran.
    pub fn dispatch_pending(&self, context: &mut Context) -> usize {
        if self.handle.is_suspended() {
            return 0;
        }
        let mut count = 0;
        while let Ok(job) = self.jobs.try_recv() {
            self.run(job, context);
            count += 1;
        }
        if count > 0 {
            crate::slog!(BRIDGE, "Dispatched {} bridge job(s)", count);
        }
        count
    }

    /// Wait up to `timeout` for one job, then run it and anything queued
    /// behind it.
    pub fn dispatch_timeout(&self, context: &mut Context, timeout: Duration) -> usize {
        if self.handle.is_suspended() {
            return 0;
        }
        match self.jobs.recv_timeout(timeout) {
            Ok(job) => {
                self.run(job, context);
                1 + self.dispatch_pending(context)
            }
            Err(_) => 0,
        }
    }

    /// Stop serving requests. Queued jobs are dropped and their callers get
    /// [`BridgeError::Abandoned`]; new requests get [`BridgeError::Suspended`].
    /// Returns how many queued jobs were dropped.
    pub fn suspend(&self) -> usize {
        self.handle.shared.suspended.store(true, Ordering::Release);
        let dropped = self.jobs.try_iter().count();
        self.handle.shared.queued.fetch_sub(dropped, Ordering::AcqRel);
        tracing::info!("[{}] Event loop suspended ({} queued request(s) dropped)", BRIDGE, dropped);
        dropped
    }

    pub fn resume(&self) {
        self.handle.shared.suspended.store(false, Ordering::Release);
        tracing::info!("[{}] Event loop resumed", BRIDGE);
    }

    pub fn is_suspended(&self) -> bool {
        self.handle.is_suspended()
    }

    /// Jobs waiting to be dispatched.
    pub fn pending(&self) -> usize {
        self.handle.shared.queued.load(Ordering::Acquire)
    }

    fn run(&self, job: Job, context: &mut Context) {
        self.handle.shared.queued.fetch_sub(1, Ordering::AcqRel);
        job(context);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn spawn_call(handle: &BridgeHandle) -> thread::JoinHandle<Result<usize, BridgeError>> {
        let handle = handle.clone();
        thread::spawn(move || handle.call(|context| context.accessibility().len() + 7))
    }

    /// Pump the loop until `worker` finishes.
    fn pump<T>(event_loop: &EventLoop, context: &mut Context, worker: thread::JoinHandle<T>) -> T {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !worker.is_finished() && Instant::now() < deadline {
            event_loop.dispatch_timeout(context, Duration::from_millis(5));
        }
        worker.join().unwrap()
    }

    #[test]
    fn test_call_runs_on_event_thread() {
        let event_loop = EventLoop::new(Duration::from_secs(5));
        let mut context = Context::default();

        let worker = spawn_call(&event_loop.handle());
        assert_eq!(pump(&event_loop, &mut context, worker), Ok(7));
    }

    #[test]
    fn test_call_from_event_thread_is_rejected() {
        let event_loop = EventLoop::new(Duration::from_secs(5));
        let result = event_loop.handle().call(|_| ());
        assert_eq!(result, Err(BridgeError::Reentrant));
    }

    #[test]
    fn test_call_times_out() {
        let event_loop = EventLoop::new(Duration::from_millis(20));
        let handle = event_loop.handle();

        let worker = thread::spawn(move || handle.call(|_| ()));
        assert_eq!(worker.join().unwrap(), Err(BridgeError::Timeout(Duration::from_millis(20))));

        // The late job still runs, its answer goes nowhere
        let mut context = Context::default();
        assert_eq!(event_loop.dispatch_pending(&mut context), 1);
    }

    #[test]
    fn test_suspended_loop_rejects_and_abandons() {
        let event_loop = EventLoop::new(Duration::from_secs(5));
        let handle = event_loop.handle();

        // Queued before suspension: dropped, the caller is told so
        let worker = spawn_call(&handle);
        while event_loop.pending() == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        while event_loop.suspend() == 0 {
            thread::yield_now();
        }
        assert_eq!(worker.join().unwrap(), Err(BridgeError::Abandoned));

        let worker = spawn_call(&handle);
        assert_eq!(worker.join().unwrap(), Err(BridgeError::Suspended));
        assert_eq!(handle.post(|_| ()), Err(BridgeError::Suspended));

        event_loop.resume();
        let mut context = Context::default();
        let worker = spawn_call(&handle);
        assert_eq!(pump(&event_loop, &mut context, worker), Ok(7));
    }

    #[test]
    fn test_concurrent_call_is_busy() {
        let event_loop = EventLoop::new(Duration::from_secs(5));
        let handle = event_loop.handle();

        // Hold the in-flight slot as if another caller were waiting
        let guard = handle.shared.in_flight.lock().unwrap();
        let worker = spawn_call(&handle);
        assert_eq!(worker.join().unwrap(), Err(BridgeError::Busy));
        drop(guard);
    }

    #[test]
    fn test_dropped_loop_abandons() {
        let event_loop = EventLoop::new(Duration::from_secs(5));
        let handle = event_loop.handle();
        drop(event_loop);

        let worker = thread::spawn(move || handle.call(|_| ()));
        assert_eq!(worker.join().unwrap(), Err(BridgeError::Abandoned));
    }
}
