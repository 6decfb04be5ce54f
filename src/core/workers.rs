//! Fixed-size worker pool over a shared queue
//!
//! Workers are scoped OS threads. Each one pops a single item under the
//! queue lock, releases it, and only then processes the item.

use std::collections::VecDeque;
use std::thread;

use parking_lot::Mutex;

/// Default worker count: the machine's logical CPU count
pub fn default_workers() -> usize {
    num_cpus::get()
}

/// Number of threads to start for `items` units of work
pub fn effective_workers(requested: usize, items: usize) -> usize {
    requested.max(1).min(items.max(1))
}

/// Process every item on up to `workers` threads, returning once all have
/// finished
pub fn drain<T, F>(items: Vec<T>, workers: usize, process: F)
where
    T: Send,
    F: Fn(T) + Sync,
{
    if items.is_empty() {
        return;
    }

    let threads = effective_workers(workers, items.len());
    let queue = Mutex::new(VecDeque::from(items));
    let queue = &queue;
    let process = &process;

    thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(move || loop {
                let next = queue.lock().pop_front();
                let Some(item) = next else {
                    break;
                };
                process(item);
            });
        }
    });
}
