//! Progress events for batch runs.
//!
//! Events go to an optional callback. With no callback installed, reporting is
//! a no-op, so library code reports unconditionally.

/// How one structure file of a batch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Analyzed {
        atoms: usize,
        bonds: usize,
        rings: usize,
        groups: usize,
    },
    /// The rendered error.
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Analyzed { .. })
    }
}

/// Events emitted while a batch of structure files is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    BatchStarted { jobs: usize },
    /// Job `index` (its position in the batch) finished. Parallel batches
    /// finish jobs out of order.
    StructureFinished { index: usize, outcome: Outcome },
    BatchFinished { succeeded: usize, failed: usize },
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// Whether events are dropped. Lets callers skip building costly events.
    pub fn is_silent(&self) -> bool {
        self.callback.is_none()
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
