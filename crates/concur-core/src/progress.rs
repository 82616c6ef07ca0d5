use concur_model::Job;

/// Observer notified as jobs are collected.
///
/// Called from the collector loop, so implementations must not block. An observer never
/// influences dispatch or collection.
pub trait Progress: Send + Sync {
    fn on_start(&self, _total: usize) {}

    /// `done` jobs out of `total` collected so far; `job` is the latest.
    fn on_complete(&self, done: usize, total: usize, job: &Job);

    fn on_finish(&self, _done: usize, _total: usize) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn on_complete(&self, _done: usize, _total: usize, _job: &Job) {}
}
