use std::{io, num::NonZeroUsize, thread::available_parallelism};

/// A fixed number of workers, spawned afresh for every job.
pub(crate) struct Threads {
    n_threads: NonZeroUsize,
}

impl Threads {
    pub(crate) fn new(n_threads: NonZeroUsize) -> Threads {
        Threads { n_threads }
    }
    pub(crate) fn with_max_threads() -> io::Result<Threads> {
        let n_threads = available_parallelism()?;
        Ok(Threads::new(n_threads))
    }
    pub(crate) fn len(&self) -> usize {
        self.n_threads.get()
    }
    /// Runs `f` on every worker, the current thread being one of them, and
    /// returns once all of them are done.
    pub(crate) fn in_parallel(&self, f: &(dyn Fn() + Sync)) {
        std::thread::scope(|s| {
            for _ in 1..self.len() {
                s.spawn(f);
            }
            f()
        })
    }
}
