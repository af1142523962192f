//! A single pipeline stage: one worker thread bound to one queue and one
//! transformation function, with an optional forward link to the next
//! stage.

use crate::queue::BoundedQueue;
use crate::record::{is_sentinel, Record};
use crate::StageError;
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::JoinHandle;

/// `Record -> Option<Record>`. Returning `None` drops the record; it is not
/// an error. Must never be called with the sentinel — the worker loop
/// intercepts that before it would reach `transform`.
pub type Transform = Box<dyn Fn(Record) -> Option<Record> + Send>;

/// The forward link installed by [`Stage::attach`]. Delegates to the next
/// stage's `place_work`, so it carries the same copy-on-ingress semantics.
pub type ForwardFn = Box<dyn Fn(&Record) -> Result<(), StageError> + Send + Sync>;

/// spec §4.3's *Uninit* state has no variant here: `Stage::init` is the
/// only way to construct a `Stage`, and it doesn't hand out a handle until
/// the queue and worker both exist, so there is no observable point at
/// which a live `Stage` is uninitialized. The remaining three states are
/// exactly spec §4.3's *Running* → *Draining* → *Terminated*.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Draining,
    Terminated,
}

/// One stage of a [`crate::pipeline::Pipeline`].
pub struct Stage {
    name: String,
    queue: Arc<BoundedQueue>,
    transform: Mutex<Option<Transform>>,
    next_place_work: OnceLock<ForwardFn>,
    worker: Mutex<Option<JoinHandle<()>>>,
    state: Mutex<State>,
}

impl Stage {
    /// Constructs the stage's queue and spawns its worker thread. No record
    /// may be placed until this returns successfully, which it always does
    /// synchronously before the worker has a chance to touch anything the
    /// caller doesn't already own.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::QueueError`]s from sizing the queue, and
    /// [`StageError::ThreadSpawnFailure`] if the OS cannot start the worker
    /// thread.
    pub fn init(
        name: impl Into<String>,
        transform: Transform,
        queue_size: usize,
    ) -> Result<Arc<Self>, StageError> {
        let name = name.into();
        let queue = Arc::new(BoundedQueue::new(queue_size)?);

        let stage = Arc::new(Self {
            name,
            queue,
            transform: Mutex::new(Some(transform)),
            next_place_work: OnceLock::new(),
            worker: Mutex::new(None),
            state: Mutex::new(State::Running),
        });

        let handle = std::thread::Builder::new()
            .name(stage.name.clone())
            .spawn({
                let stage = Arc::clone(&stage);
                move || stage.run()
            })?;

        *stage.worker.lock().unwrap_or_else(|p| p.into_inner()) = Some(handle);
        Ok(stage)
    }

    /// Installs the forward link to the next stage's `place_work`. Must be
    /// called before the first `place_work`, and at most once; the tail
    /// stage of a pipeline never calls this.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidArgument`] if a link is already
    /// installed.
    pub fn attach(&self, next: ForwardFn) -> Result<(), StageError> {
        self.next_place_work
            .set(next)
            .map_err(|_| StageError::InvalidArgument("attach called more than once"))
    }

    /// Enqueues a copy of `record` on this stage's queue.
    ///
    /// # Errors
    ///
    /// Returns the queue's error verbatim.
    pub fn place_work(&self, record: &Record) -> Result<(), StageError> {
        self.queue.put(record).map_err(StageError::from)
    }

    /// Blocks until this stage has seen and forwarded the sentinel.
    pub fn wait_finished(&self) {
        self.queue.wait_finished();
    }

    /// Joins the worker thread. Idempotent after the first successful call.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::NotInitialized`] if the worker already
    /// terminated and was joined by a previous call.
    pub fn fini(&self) -> Result<(), StageError> {
        let handle = self.worker.lock().unwrap_or_else(|p| p.into_inner()).take();
        match handle {
            Some(h) => {
                // A panicking worker still counts as "joined" for shutdown
                // purposes; the pipeline has no recovery path for it anyway.
                let _ = h.join();
                *self.state.lock().unwrap_or_else(|p| p.into_inner()) = State::Terminated;
                Ok(())
            }
            None => Err(StageError::NotInitialized),
        }
    }

    /// This stage's immutable display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` once this stage's worker has been joined by [`Stage::fini`].
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(|p| p.into_inner()),
            State::Terminated
        )
    }

    fn forward(&self, record: &Record) {
        if let Some(next) = self.next_place_work.get() {
            // QueueFinished from a downstream stage mid-shutdown is expected
            // and silently dropped (spec §7).
            let _ = next(record);
        }
    }

    fn run(self: Arc<Self>) {
        let transform = self
            .transform
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
            .expect("transform installed exactly once at construction");

        loop {
            let Some(item) = self.queue.get() else {
                break;
            };

            if is_sentinel(&item) {
                self.forward(&Record::sentinel());
                self.queue.signal_finished();
                *self.state.lock().unwrap_or_else(|p| p.into_inner()) = State::Draining;
                break;
            }

            if let Some(out) = transform(item) {
                self.forward(&out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn collector() -> (Arc<StdMutex<Vec<Record>>>, ForwardFn) {
        let sink = Arc::new(StdMutex::new(Vec::new()));
        let fwd_sink = Arc::clone(&sink);
        let fwd: ForwardFn = Box::new(move |r: &Record| {
            fwd_sink.lock().unwrap().push(r.clone());
            Ok(())
        });
        (sink, fwd)
    }

    #[test]
    fn identity_stage_forwards_records_and_sentinel() {
        let stage = Stage::init("passthrough", Box::new(Some), 4).unwrap();
        let (sink, fwd) = collector();
        stage.attach(fwd).unwrap();

        stage.place_work(&Record::from("a")).unwrap();
        stage.place_work(&Record::from("b")).unwrap();
        stage.place_work(&Record::sentinel()).unwrap();
        stage.wait_finished();
        stage.fini().unwrap();

        assert_eq!(
            *sink.lock().unwrap(),
            vec![Record::from("a"), Record::from("b"), Record::sentinel()]
        );
        assert!(stage.is_terminated());
    }

    #[test]
    fn dropped_records_are_not_forwarded() {
        let stage = Stage::init("dropper", Box::new(|_| None), 4).unwrap();
        let (sink, fwd) = collector();
        stage.attach(fwd).unwrap();

        stage.place_work(&Record::from("a")).unwrap();
        stage.place_work(&Record::sentinel()).unwrap();
        stage.wait_finished();
        stage.fini().unwrap();

        assert_eq!(*sink.lock().unwrap(), vec![Record::sentinel()]);
    }

    #[test]
    fn tail_stage_with_no_forward_link_still_drains() {
        let stage = Stage::init("tail", Box::new(Some), 4).unwrap();
        stage.place_work(&Record::from("a")).unwrap();
        stage.place_work(&Record::sentinel()).unwrap();
        stage.wait_finished();
        stage.fini().unwrap();
    }

    #[test]
    fn attach_twice_is_rejected() {
        let stage = Stage::init("s", Box::new(Some), 4).unwrap();
        let (_sink, fwd1) = collector();
        let (_sink2, fwd2) = collector();
        stage.attach(fwd1).unwrap();
        assert!(matches!(
            stage.attach(fwd2),
            Err(StageError::InvalidArgument(_))
        ));
        stage.place_work(&Record::sentinel()).unwrap();
        stage.wait_finished();
        stage.fini().unwrap();
    }

    #[test]
    fn fini_twice_is_not_initialized_on_second_call() {
        let stage = Stage::init("s", Box::new(Some), 4).unwrap();
        stage.place_work(&Record::sentinel()).unwrap();
        stage.wait_finished();
        stage.fini().unwrap();
        assert!(matches!(stage.fini(), Err(StageError::NotInitialized)));
    }
}
