//! Debounced write-through of planner snapshots to storage.
//!
//! A single background task owns the only pending deadline. Every scheduled
//! snapshot replaces the pending one and pushes the deadline out again, so
//! only the latest state reaches storage.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::backup::Backup;
use crate::storage::{Storage, StorageError, POOL_KEY, WEEKS_KEY};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    Failed,
}

#[derive(Debug)]
enum SaveCommand {
    Schedule(Box<Backup>),
    Flush(oneshot::Sender<()>),
}

/// Cheap handle used by the planner to hand over snapshots.
#[derive(Debug, Clone)]
pub struct SaveHandle {
    tx: UnboundedSender<SaveCommand>,
    status: watch::Receiver<SaveStatus>,
}

impl SaveHandle {
    /// Queue `snapshot` for writing once the debounce window passes quietly.
    pub fn schedule(&self, snapshot: Backup) {
        if self.tx.send(SaveCommand::Schedule(Box::new(snapshot))).is_err() {
            error!("persistence task has stopped, change will not be saved");
        }
    }

    /// Write any pending snapshot now and wait for it to land.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(SaveCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    pub fn status(&self) -> SaveStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }
}

/// Spawn the persistence task on the current tokio runtime.
pub fn spawn_scheduler(
    storage: Arc<dyn Storage>,
    debounce: Duration,
) -> (SaveHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(SaveStatus::Idle);
    let task = tokio::spawn(run_scheduler(storage, debounce, rx, status_tx));
    (
        SaveHandle {
            tx,
            status: status_rx,
        },
        task,
    )
}

async fn run_scheduler(
    storage: Arc<dyn Storage>,
    debounce: Duration,
    mut rx: UnboundedReceiver<SaveCommand>,
    status: watch::Sender<SaveStatus>,
) {
    let mut pending: Option<Box<Backup>> = None;
    let timer = tokio::time::sleep(debounce);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(SaveCommand::Schedule(snapshot)) => {
                    pending = Some(snapshot);
                    status.send_replace(SaveStatus::Saving);
                    timer.as_mut().reset(Instant::now() + debounce);
                }
                Some(SaveCommand::Flush(done)) => {
                    if let Some(snapshot) = pending.take() {
                        persist(&storage, *snapshot, &status).await;
                    }
                    let _ = done.send(());
                }
                None => {
                    if let Some(snapshot) = pending.take() {
                        persist(&storage, *snapshot, &status).await;
                    }
                    debug!("persistence task shutting down");
                    break;
                }
            },
            () = &mut timer, if pending.is_some() => {
                if let Some(snapshot) = pending.take() {
                    persist(&storage, *snapshot, &status).await;
                }
            }
        }
    }
}

async fn persist(storage: &Arc<dyn Storage>, snapshot: Backup, status: &watch::Sender<SaveStatus>) {
    let storage = Arc::clone(storage);
    let result = tokio::task::spawn_blocking(move || write_snapshot(storage.as_ref(), &snapshot)).await;

    match result {
        Ok(Ok(())) => {
            info!("Planner state saved");
            status.send_replace(SaveStatus::Saved);
        }
        Ok(Err(err)) => {
            error!(error = %err, "Failed to save planner state");
            status.send_replace(SaveStatus::Failed);
        }
        Err(err) => {
            error!(error = %err, "Save task panicked");
            status.send_replace(SaveStatus::Failed);
        }
    }
}

/// Write both halves of the snapshot. Encoding happens up front so a
/// serialization failure writes nothing.
pub fn write_snapshot(storage: &dyn Storage, snapshot: &Backup) -> Result<(), StorageError> {
    let weeks = serde_json::to_string(&snapshot.all_weeks).map_err(|source| StorageError::Encode {
        key: WEEKS_KEY.to_string(),
        source,
    })?;
    let pool = serde_json::to_string(&snapshot.todo_pool).map_err(|source| StorageError::Encode {
        key: POOL_KEY.to_string(),
        source,
    })?;
    storage.set(WEEKS_KEY, &weeks)?;
    storage.set(POOL_KEY, &pool)?;
    Ok(())
}
