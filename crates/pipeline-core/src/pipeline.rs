//! The ordered chain of stages, wired head-to-tail.

use crate::record::Record;
use crate::stage::{ForwardFn, Stage, Transform};
use crate::StageError;
use std::sync::Arc;

/// One entry in a [`Pipeline`]'s construction list: a stage name and its
/// transformation function, paired with the queue size shared by every
/// stage in the pipeline (spec §6: `<program> <queue_size> <stage_name>...`
/// — one size for all stages).
pub struct StageSpec {
    pub name: String,
    pub transform: Transform,
}

/// An ordered, immutable-after-construction chain of [`Stage`]s.
///
/// The host injects records at the head via [`Pipeline::place_work`]; the
/// sentinel, once placed, flows through every stage in order and triggers
/// [`Pipeline::shutdown`]'s teardown.
pub struct Pipeline {
    stages: Vec<Arc<Stage>>,
}

impl Pipeline {
    /// Builds every stage in order and attaches each to the next's
    /// `place_work`. `specs` must contain at least one entry.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidArgument`] if `specs` is empty, or
    /// whatever error a stage's `init`/`attach` produced otherwise. On
    /// failure, every already-initialized stage is torn down (`fini`, in
    /// reverse construction order) before the error is returned, so no
    /// caller observes a half-built pipeline.
    pub fn new(specs: Vec<StageSpec>, queue_size: usize) -> Result<Self, StageError> {
        if specs.is_empty() {
            return Err(StageError::InvalidArgument(
                "a pipeline needs at least one stage",
            ));
        }

        let mut stages: Vec<Arc<Stage>> = Vec::with_capacity(specs.len());
        for spec in specs {
            match Stage::init(spec.name, spec.transform, queue_size) {
                Ok(stage) => stages.push(stage),
                Err(e) => {
                    for s in stages.iter().rev() {
                        let _ = s.fini();
                    }
                    return Err(e);
                }
            }
        }

        for i in 0..stages.len() - 1 {
            let next = Arc::clone(&stages[i + 1]);
            let forward: ForwardFn = Box::new(move |record: &Record| next.place_work(record));
            if let Err(e) = stages[i].attach(forward) {
                for s in stages.iter().rev() {
                    let _ = s.fini();
                }
                return Err(e);
            }
        }

        Ok(Self { stages })
    }

    /// The stage names, in pipeline order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Enqueues a record at the head of the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the head stage's queue error verbatim.
    pub fn place_work(&self, record: &Record) -> Result<(), StageError> {
        self.stages[0].place_work(record)
    }

    /// Places the sentinel, then waits for every stage (head-first) to
    /// forward it, then joins every stage (head-first).
    ///
    /// Teardown is head-first because the sentinel propagates head-first:
    /// by the time the head stage's queue is finished, the tail may still
    /// be working through the sentinel itself.
    pub fn shutdown(&self) -> Result<(), StageError> {
        self.place_work(&Record::sentinel())?;
        for stage in &self.stages {
            stage.wait_finished();
        }
        for stage in &self.stages {
            stage.fini()?;
        }
        Ok(())
    }
}
