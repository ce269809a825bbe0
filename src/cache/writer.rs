//! Background Cache Writer
//!
//! Accepts cachable items and writes them to the cache directory on a
//! single background worker. Writes execute one at a time, in submission
//! order, and each result is reported through a completion callback.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::destination::Destination;
use super::errors::{CacheError, Result};
use super::item::Cachable;

/// Completion callback invoked once per persisted item
type Completion = Box<dyn FnOnce(Result<PathBuf>) + Send + 'static>;

/// A queued write
struct WriteJob {
    /// Item to serialize
    item: Box<dyn Cachable + Send>,
    /// Resolved target path, or the reason it could not be resolved
    target: Result<PathBuf>,
    /// Caller's completion callback
    on_complete: Completion,
}

/// Writes cachable items to a cache directory in the background
pub struct Cacher {
    /// Directory all items are written into
    destination: PathBuf,
    /// FIFO queue feeding the worker
    queue: mpsc::UnboundedSender<WriteJob>,
    /// Worker draining the queue
    worker: JoinHandle<()>,
}

impl Cacher {
    /// Create a cacher for the given destination kind
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(destination: Destination) -> Result<Self> {
        Self::with_dir(destination.resolve()?)
    }

    /// Create a cacher that writes into an explicit directory
    ///
    /// The directory and any missing parents are created. Existing
    /// contents are left untouched.
    pub fn with_dir(destination: impl Into<PathBuf>) -> Result<Self> {
        let destination = destination.into();
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

        fs::create_dir_all(&destination).map_err(|source| CacheError::DirectoryCreation {
            path: destination.clone(),
            source,
        })?;

        let (queue, jobs) = mpsc::unbounded_channel();
        let worker = runtime.spawn(run_worker(jobs));

        info!(
            cache_dir = %destination.display(),
            "Cacher initialized"
        );

        Ok(Self {
            destination,
            queue,
            worker,
        })
    }

    /// Directory items are written into
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Queue `item` for writing and return immediately
    ///
    /// `on_complete` is called exactly once, from a background thread, with
    /// the path of the written file or the reason the write failed.
    pub fn persist<I, F>(&self, item: I, on_complete: F)
    where
        I: Cachable + Send + 'static,
        F: FnOnce(Result<PathBuf>) + Send + 'static,
    {
        let file_name = item.file_name();
        let target = self.target_path(&file_name);

        debug!(file_name = %file_name, "Queued cache write");

        let job = WriteJob {
            item: Box::new(item),
            target,
            on_complete: Box::new(on_complete),
        };

        if let Err(mpsc::error::SendError(job)) = self.queue.send(job) {
            warn!(file_name = %file_name, "Cache worker stopped, dropping write");
            (job.on_complete)(Err(CacheError::WorkerStopped));
        }
    }

    /// Queue `item` for writing and return a handle to await the result
    pub fn enqueue<I>(&self, item: I) -> PendingWrite
    where
        I: Cachable + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.persist(item, move |result| {
            // Receiver may have been dropped; nobody is waiting then
            let _ = tx.send(result);
        });
        PendingWrite { rx }
    }

    /// Stop accepting writes and wait for every queued write to finish
    pub async fn shutdown(self) -> Result<()> {
        let Self {
            destination,
            queue,
            worker,
        } = self;

        drop(queue);
        worker
            .await
            .map_err(|e| CacheError::TaskPanicked(e.to_string()))?;

        info!(cache_dir = %destination.display(), "Cacher shut down");
        Ok(())
    }

    /// Map a file name to a path inside the destination
    ///
    /// Only a single plain path component is accepted.
    fn target_path(&self, file_name: &str) -> Result<PathBuf> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if !file_name.contains(['/', '\\']) => {
                Ok(self.destination.join(name))
            }
            _ => Err(CacheError::InvalidFileName(file_name.to_string())),
        }
    }
}

/// Awaitable result of [`Cacher::enqueue`]
#[derive(Debug)]
pub struct PendingWrite {
    rx: oneshot::Receiver<Result<PathBuf>>,
}

impl PendingWrite {
    /// Wait for the write to finish
    pub async fn wait(self) -> Result<PathBuf> {
        self.rx.await.unwrap_or(Err(CacheError::WorkerStopped))
    }
}

/// Drain the queue one job at a time
async fn run_worker(mut jobs: mpsc::UnboundedReceiver<WriteJob>) {
    while let Some(job) = jobs.recv().await {
        let WriteJob {
            item,
            target,
            on_complete,
        } = job;

        let result = match target {
            Ok(target) => execute(item, target).await,
            Err(e) => {
                warn!(error = %e, "Rejected cache write");
                Err(e)
            }
        };

        // Callbacks run on the blocking pool so a panicking one cannot take
        // the worker down with it
        if let Err(e) = tokio::task::spawn_blocking(move || on_complete(result)).await {
            warn!(error = %e, "Cache completion callback panicked");
        }
    }

    debug!("Cache worker stopped");
}

/// Serialize `item` and write it to `target`
async fn execute(item: Box<dyn Cachable + Send>, target: PathBuf) -> Result<PathBuf> {
    let path = target.clone();
    let written = tokio::task::spawn_blocking(move || {
        let data = item.transform();
        write_atomic(&target, &data).map(|()| target)
    })
    .await;

    match written {
        Ok(Ok(target)) => Ok(target),
        Ok(Err(e)) => {
            error!(path = %path.display(), error = %e, "Failed to write cache file");
            Err(e)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Cache write task panicked");
            Err(CacheError::TaskPanicked(format!("{}: {}", path.display(), e)))
        }
    }
}

/// Write `data` to `target` through a temp file in the same directory
///
/// The temp file is renamed over `target`, replacing any existing file, so
/// readers never observe a partial write.
fn write_atomic(target: &Path, data: &[u8]) -> Result<()> {
    let write_error = |source: io::Error| CacheError::Write {
        path: target.to_path_buf(),
        source,
    };

    let parent = target.parent().unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_error)?;

    tmp.write_all(data).map_err(write_error)?;

    tmp.persist(target).map_err(|e| write_error(e.error))?;

    debug!(
        path = %target.display(),
        size = data.len(),
        "Stored item in cache"
    );

    Ok(())
}
