//! Explicit execution context for parallel preprocessing.
//!
//! Work runs on a dedicated rayon pool sized by [`ExecutionContext`], never
//! on an implicitly configured global pool. One worker means the closure
//! runs on the calling thread.
use crate::preprocess::errors::PreprocessResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionContext {
    workers: usize,
}

impl ExecutionContext {
    /// Context with `workers` threads; `0` is treated as `1`.
    pub fn new(workers: usize) -> Self {
        ExecutionContext { workers: workers.max(1) }
    }

    pub fn sequential() -> Self {
        ExecutionContext { workers: 1 }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `op` inside this context's pool.
    ///
    /// Errors
    /// ------
    /// - `ThreadPool` when the pool cannot be built.
    pub fn install<R, OP>(&self, op: OP) -> PreprocessResult<R>
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 1 {
            return Ok(op());
        }
        let pool = rayon::ThreadPoolBuilder::new().num_threads(self.workers).build()?;
        Ok(pool.install(op))
    }
}

impl Default for ExecutionContext {
    /// One worker per available CPU.
    fn default() -> Self {
        ExecutionContext::new(std::thread::available_parallelism().map_or(1, |n| n.get()))
    }
}
