//! Job builder: template + targets -> shuffled jobs.
use concur_model::{Job, JobId};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::trace;

/// Build one job per target and shuffle them.
///
/// Ids follow input order. The shuffle keeps stop-at-first policies from favouring
/// targets near the start of the list.
pub fn build_jobs<S: AsRef<str>>(template: &str, targets: &[S], token: &str) -> Vec<Job> {
    build_jobs_with(template, targets, token, &mut rand::thread_rng())
}

/// [`build_jobs`] with a caller-supplied random source.
pub fn build_jobs_with<S, R>(template: &str, targets: &[S], token: &str, rng: &mut R) -> Vec<Job>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let mut jobs: Vec<Job> = targets
        .iter()
        .enumerate()
        .map(|(i, target)| {
            let target = target.as_ref();
            Job::new(
                JobId(i as u64),
                template,
                target,
                substitute(template, token, target),
            )
        })
        .collect();

    jobs.shuffle(rng);
    trace!(target: "concur.core.builder", jobs = jobs.len(), "jobs built");
    jobs
}

/// Replace every occurrence of `token` in `template` with `target`.
pub fn substitute(template: &str, token: &str, target: &str) -> String {
    if token.is_empty() {
        return template.to_string();
    }
    template.replace(token, target)
}
