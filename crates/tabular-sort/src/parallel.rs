#![forbid(unsafe_code)]

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use rayon::ThreadPool;
#[cfg(feature = "parallel")]
use std::sync::OnceLock;

/// Best-effort crate-local Rayon pool for the sort phases.
///
/// Rayon normally uses a **global** thread pool. Under extreme resource
/// constraints (e.g. many test binaries running concurrently on one host),
/// global pool initialization can fail and Rayon will panic on first use.
/// A crate-local pool lets us bound thread creation and fall back to
/// sequential execution instead.
#[cfg(feature = "parallel")]
static SORT_POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();

#[cfg(feature = "parallel")]
fn build_sort_pool() -> Option<ThreadPool> {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    let requested = std::env::var("RAYON_NUM_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0);

    let mut threads = match requested {
        Some(n) => n.min(available).max(1),
        None => available.min(8).max(1),
    };

    loop {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => return Some(pool),
            Err(_) if threads > 1 => {
                threads /= 2;
            }
            Err(_) => return None,
        }
    }
}

#[cfg(feature = "parallel")]
fn sort_pool() -> Option<&'static ThreadPool> {
    SORT_POOL.get_or_init(build_sort_pool).as_ref()
}

/// Number of workers the histogram/scatter phases may chunk across.
pub(crate) fn pool_threads() -> usize {
    #[cfg(feature = "parallel")]
    {
        if let Some(pool) = sort_pool() {
            return pool.current_num_threads().max(1);
        }
    }
    1
}

/// Runs `task(chunk_index)` for every chunk and collects the results in
/// chunk order. Chunks must be independent: a panic inside one chunk is
/// captured by the pool and resurfaces on the calling thread only after the
/// join.
pub(crate) fn map_chunks<T, F>(n_chunks: usize, task: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if n_chunks > 1 {
            if let Some(pool) = sort_pool() {
                return pool.install(|| (0..n_chunks).into_par_iter().map(&task).collect());
            }
        }
    }
    (0..n_chunks).map(task).collect()
}

/// Runs `task` once per work item, consuming the items. Same independence
/// contract as [`map_chunks`].
pub(crate) fn for_each_chunk<T, F>(items: Vec<T>, task: F)
where
    T: Send,
    F: Fn(T) + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if items.len() > 1 {
            if let Some(pool) = sort_pool() {
                pool.install(|| items.into_par_iter().for_each(&task));
                return;
            }
        }
    }
    for item in items {
        task(item);
    }
}

/// Fills disjoint chunks of `data` in parallel; `task` receives the chunk's
/// starting offset and its slice.
pub(crate) fn fill_chunks<T, F>(data: &mut [T], chunk_len: usize, task: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    debug_assert!(chunk_len > 0, "chunk_len must be positive");

    #[cfg(feature = "parallel")]
    {
        if data.len() > chunk_len {
            if let Some(pool) = sort_pool() {
                pool.install(|| {
                    data.par_chunks_mut(chunk_len)
                        .enumerate()
                        .for_each(|(c, chunk)| task(c * chunk_len, chunk));
                });
                return;
            }
        }
    }
    for (c, chunk) in data.chunks_mut(chunk_len).enumerate() {
        task(c * chunk_len, chunk);
    }
}
