//! Pipeline worker and queue handle

use std::{future, sync::Arc, time::Duration};

use sqlx::SqliteConnection;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{Instant, sleep_until, timeout},
};
use tracing::{error, info};

use crate::{
    database::Db,
    pipeline::{EnqueueError, Intent, PipelineConfig, PipelineObserver, flush::BatchWriter},
};

/// Cloneable sending side of the pipeline queue.
#[derive(Debug, Clone)]
pub struct PipelineHandle {
    sender: mpsc::Sender<Intent>,
    enqueue_timeout: Duration,
    observer: Arc<dyn PipelineObserver>,
}

impl PipelineHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<Intent>,
        enqueue_timeout: Duration,
        observer: Arc<dyn PipelineObserver>,
    ) -> Self {
        Self {
            sender,
            enqueue_timeout,
            observer,
        }
    }

    /// Queue every intent of one call, or none of them.
    ///
    /// Waits up to the enqueue timeout for enough free slots.
    ///
    /// # Errors
    ///
    /// Returns [`EnqueueError::Overloaded`] when the space never frees up and
    /// [`EnqueueError::Closed`] once the worker has stopped.
    pub async fn enqueue_all(&self, intents: Vec<Intent>) -> Result<(), EnqueueError> {
        let count = intents.len();

        if count == 0 {
            return Ok(());
        }

        if count > self.sender.max_capacity() {
            return Err(EnqueueError::Overloaded);
        }

        let permits = timeout(self.enqueue_timeout, self.sender.reserve_many(count))
            .await
            .map_err(|_elapsed| EnqueueError::Overloaded)?
            .map_err(|_closed| EnqueueError::Closed)?;

        for (permit, intent) in permits.zip(intents) {
            permit.send(intent);
        }

        self.observer.intents_enqueued(count);

        Ok(())
    }

    /// Queue a single intent.
    ///
    /// # Errors
    ///
    /// See [`PipelineHandle::enqueue_all`].
    pub async fn enqueue(&self, intent: impl Into<Intent>) -> Result<(), EnqueueError> {
        self.enqueue_all(vec![intent.into()]).await
    }
}

/// Owner of the background worker.
#[derive(Debug)]
pub struct Pipeline {
    handle: PipelineHandle,
    shutdown: oneshot::Sender<()>,
    worker: JoinHandle<()>,
}

impl Pipeline {
    /// Open the writer connection and start the worker.
    ///
    /// # Errors
    ///
    /// Returns an error when the writer connection cannot be opened.
    pub async fn spawn(
        db: &Db,
        config: PipelineConfig,
        observer: Arc<dyn PipelineObserver>,
    ) -> Result<Self, sqlx::Error> {
        let conn = db.open_writer().await?;

        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let (shutdown, shutdown_signal) = oneshot::channel();

        let worker = Worker {
            conn,
            receiver,
            shutdown: shutdown_signal,
            flush_interval: config.flush_interval,
            observer: observer.clone(),
            writer: BatchWriter::new(),
        };

        info!(
            flush_interval_ms = config.flush_interval.as_millis(),
            queue_capacity = config.queue_capacity,
            "starting write pipeline"
        );

        Ok(Self {
            handle: PipelineHandle::new(sender, config.enqueue_timeout, observer),
            shutdown,
            worker: tokio::spawn(worker.run()),
        })
    }

    #[must_use]
    pub fn handle(&self) -> PipelineHandle {
        self.handle.clone()
    }

    /// Stop accepting intents, write whatever is queued and wait for the
    /// worker to exit.
    pub async fn shutdown(self) {
        let Self {
            handle,
            shutdown,
            worker,
        } = self;

        drop(handle);

        // The worker also stops when this signal is dropped unsent.
        let _ignored = shutdown.send(());

        if let Err(join_error) = worker.await {
            error!("write pipeline worker failed: {join_error}");
        }
    }
}

#[derive(Debug)]
struct Worker {
    conn: SqliteConnection,
    receiver: mpsc::Receiver<Intent>,
    shutdown: oneshot::Receiver<()>,
    flush_interval: Duration,
    observer: Arc<dyn PipelineObserver>,
    writer: BatchWriter,
}

impl Worker {
    async fn run(self) {
        let Self {
            mut conn,
            mut receiver,
            mut shutdown,
            flush_interval,
            observer,
            writer,
        } = self;

        let mut pending: Vec<Intent> = Vec::new();
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                received = receiver.recv() => {
                    let Some(intent) = received else {
                        break;
                    };

                    if pending.is_empty() {
                        deadline = Some(Instant::now() + flush_interval);
                    }

                    pending.push(intent);
                }
                () = wait_for(deadline) => {
                    writer.flush(&mut conn, &mut pending, observer.as_ref()).await;
                    deadline = None;
                }
            }
        }

        receiver.close();

        while let Some(intent) = receiver.recv().await {
            pending.push(intent);
        }

        info!(pending = pending.len(), "write pipeline draining");

        writer.flush(&mut conn, &mut pending, observer.as_ref()).await;

        info!("write pipeline stopped");
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}
