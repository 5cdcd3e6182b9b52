use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use log::{debug, error, info};

use crate::artwork::{Artwork, ArtworkSource, Strategy};
use crate::data::AlbumQuery;
use crate::error::{ArtworkError, Result};
use crate::helpers::retry::RetryHandler;

/// Receives the outcome of a background retrieval
///
/// Callbacks run on the worker thread.
pub trait ArtworkListener: Send + Sync {
    fn artwork_found(&self, query: &AlbumQuery, path: &Path);

    fn artwork_not_found(&self, query: &AlbumQuery, error: &ArtworkError);
}

/// How a worker runs its retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerOptions {
    pub strategy: Strategy,
    /// Retries after an `ImageNotFound` from a random strategy
    pub max_retries: usize,
    pub retry_delay: Duration,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            max_retries: 0,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Runs one retrieval on a separate thread
///
/// The result becomes available once `join` (or `wait`) has returned.
#[derive(Debug)]
pub struct ArtworkWorker {
    query: AlbumQuery,
    handle: Option<JoinHandle<Result<PathBuf>>>,
    outcome: Option<Result<PathBuf>>,
}

impl ArtworkWorker {
    /// Start a retrieval in the background
    pub fn start<S>(artwork: Arc<Artwork<S>>, query: AlbumQuery, strategy: Strategy) -> Self
    where
        S: ArtworkSource + 'static,
    {
        let options = WorkerOptions {
            strategy,
            ..WorkerOptions::default()
        };
        Self::start_with(artwork, query, options, Vec::new())
    }

    /// Start a retrieval with retry options and listeners
    pub fn start_with<S>(
        artwork: Arc<Artwork<S>>,
        query: AlbumQuery,
        options: WorkerOptions,
        listeners: Vec<Arc<dyn ArtworkListener>>,
    ) -> Self
    where
        S: ArtworkSource + 'static,
    {
        let thread_query = query.clone();
        let spawned = thread::Builder::new()
            .name("artwork".to_string())
            .spawn(move || run(&artwork, &thread_query, &options, &listeners));

        match spawned {
            Ok(handle) => {
                debug!("Started artwork worker for {}", query);
                Self {
                    query,
                    handle: Some(handle),
                    outcome: None,
                }
            }
            Err(e) => {
                let message = format!("failed to start artwork worker: {}", e);
                error!("{}", message);
                Self {
                    query,
                    handle: None,
                    outcome: Some(Err(ArtworkError::Resource(message))),
                }
            }
        }
    }

    pub fn query(&self) -> &AlbumQuery {
        &self.query
    }

    /// Whether the retrieval has completed (without blocking)
    pub fn is_finished(&self) -> bool {
        match &self.handle {
            Some(handle) => handle.is_finished(),
            None => true,
        }
    }

    /// Block until the retrieval has completed and return its outcome
    pub fn join(&mut self) -> &Result<PathBuf> {
        let handle = self.handle.take();
        let query = &self.query;
        self.outcome.get_or_insert_with(|| match handle {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                let message = format!("artwork worker for {} panicked", query);
                error!("{}", message);
                Err(ArtworkError::Resource(message))
            }),
            None => Err(ArtworkError::Resource("artwork worker has no result".to_string())),
        })
    }

    /// Outcome of the retrieval, available after `join`
    pub fn result(&self) -> Option<&Result<PathBuf>> {
        self.outcome.as_ref()
    }

    /// Block until completion and take the outcome
    pub fn wait(mut self) -> Result<PathBuf> {
        self.join();
        self.outcome
            .take()
            .unwrap_or_else(|| Err(ArtworkError::Resource("artwork worker has no result".to_string())))
    }
}

fn run<S: ArtworkSource>(
    artwork: &Artwork<S>,
    query: &AlbumQuery,
    options: &WorkerOptions,
    listeners: &[Arc<dyn ArtworkListener>],
) -> Result<PathBuf> {
    let mut retry = if options.strategy.is_random() {
        RetryHandler::new(options.max_retries, options.retry_delay)
    } else {
        RetryHandler::none()
    };

    let outcome = retry.execute_with_retry(
        || artwork.retrieve(options.strategy, query),
        |e| matches!(e, ArtworkError::ImageNotFound(_)),
        "artwork retrieval",
    );

    match &outcome {
        Ok(path) => {
            info!("Artwork for {} available at {}", query, path.display());
            for listener in listeners {
                listener.artwork_found(query, path);
            }
        }
        Err(e) => {
            debug!("Artwork for {} not found: {}", query, e);
            for listener in listeners {
                listener.artwork_not_found(query, e);
            }
        }
    }

    outcome
}
