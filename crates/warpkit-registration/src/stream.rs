//! Ordered execution streams for queued device work.
//!
//! A [`Stream`] owns one named worker thread fed by an unbounded queue.
//! Jobs on one stream run in the order they were enqueued; separate streams
//! run independently. Enqueuing never blocks.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, error};
use crate::error::{RegistrationError, Result};
use crate::settings::StreamConfig;

type StreamJob = Box<dyn FnOnce() + Send + 'static>;

enum StreamMessage {
    Run(StreamJob),
    Shutdown,
}

/// Handle to a job submitted to a [`Stream`].
#[derive(Debug)]
pub struct Completion {
    receiver: Receiver<Result<()>>,
}

impl Completion {
    /// Block until the job has run and return its outcome.
    pub fn wait(self) -> Result<()> {
        self.receiver.recv().unwrap_or_else(|_| {
            Err(RegistrationError::stream_disconnected(
                "stream worker exited before completing the job",
            ))
        })
    }

    /// Whether the job has finished. Does not block.
    pub fn is_complete(&self) -> bool {
        !self.receiver.is_empty()
    }

    fn failed(err: RegistrationError) -> Self {
        let (sender, receiver) = unbounded();
        let _ = sender.send(Err(err));
        Self { receiver }
    }
}

/// In-order job queue served by one worker thread.
///
/// Dropping a stream lets the worker drain every queued job before it
/// exits, then joins it.
///
/// # Examples
/// ```rust
/// use warpkit_registration::stream::Stream;
///
/// let stream = Stream::new().unwrap();
/// let done = stream.enqueue(|| Ok(()));
/// done.wait().unwrap();
/// stream.synchronize().unwrap();
/// ```
pub struct Stream {
    name: String,
    sender: Sender<StreamMessage>,
    handle: Option<thread::JoinHandle<()>>,
    failure: Arc<Mutex<Option<RegistrationError>>>,
}

impl Stream {
    /// Start a stream with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(StreamConfig::default())
    }

    /// Start a stream with an explicit configuration.
    pub fn with_config(config: StreamConfig) -> Result<Self> {
        config.validate()?;
        let name = config.name;
        let (sender, receiver) = unbounded::<StreamMessage>();

        let worker_name = name.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || worker_loop(&worker_name, receiver))
            .map_err(|err| {
                RegistrationError::stream_disconnected(format!("failed to spawn stream worker: {err}"))
            })?;

        Ok(Self {
            name,
            sender,
            handle: Some(handle),
            failure: Arc::new(Mutex::new(None)),
        })
    }

    /// Name of the worker thread.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Submit a job. Returns immediately.
    ///
    /// A job that returns an error or panics does not stop the stream; the
    /// failure is reported through the returned [`Completion`] and through
    /// the next [`Stream::synchronize`].
    pub fn enqueue<F>(&self, job: F) -> Completion
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let (result_tx, result_rx) = unbounded::<Result<()>>();
        let stream = self.name.clone();
        let failure = Arc::clone(&self.failure);

        let task: StreamJob = Box::new(move || {
            let outcome = match panic::catch_unwind(AssertUnwindSafe(job)) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(stream = %stream, %message, "stream job panicked");
                    Err(RegistrationError::job_panicked(stream.as_str(), message))
                }
            };
            if let Err(err) = &outcome {
                let mut slot = failure.lock().unwrap_or_else(PoisonError::into_inner);
                if slot.is_none() {
                    *slot = Some(err.clone());
                }
            }
            let _ = result_tx.send(outcome);
        });

        match self.sender.send(StreamMessage::Run(task)) {
            Ok(()) => Completion { receiver: result_rx },
            Err(_) => Completion::failed(RegistrationError::stream_disconnected(format!(
                "stream '{}' no longer accepts jobs",
                self.name
            ))),
        }
    }

    /// Wait for every job enqueued so far.
    ///
    /// Returns the first failure recorded since the previous call, and
    /// clears it.
    pub fn synchronize(&self) -> Result<()> {
        self.enqueue(|| Ok(())).wait().ok();
        let mut slot = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("name", &self.name)
            .field("pending", &self.sender.len())
            .finish()
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        let _ = self.sender.send(StreamMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(name: &str, receiver: Receiver<StreamMessage>) {
    debug!(stream = %name, "stream worker started");
    while let Ok(message) = receiver.recv() {
        match message {
            StreamMessage::Run(task) => task(),
            StreamMessage::Shutdown => break,
        }
    }
    debug!(stream = %name, "stream worker stopped");
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
