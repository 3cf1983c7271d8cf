//! Marker descriptor generation off the request path.
//!
//! Target uploads enqueue a [`MarkerJob`] and return immediately with the
//! target in `pending`. A single worker drains the queue, runs the external
//! tool and records `ready` or `failed` on the target. Every state change is
//! guarded by the image path the job was created for, so a job for a replaced
//! image never overwrites the newer state.

use std::sync::Arc;

use arstudio_core::markers::{self, MarkerToolConfig};
use arstudio_core::storage::MediaStorage;
use arstudio_core::types::DbId;
use arstudio_db::repositories::TargetRepo;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerJob {
    pub target_id: DbId,
    /// Image path (relative to the media root) the job was issued for.
    pub image_path: String,
}

/// Cloneable handle for submitting jobs to the worker.
#[derive(Debug, Clone)]
pub struct MarkerQueue {
    tx: mpsc::UnboundedSender<MarkerJob>,
}

impl MarkerQueue {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MarkerJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Submit a job. If the worker is gone the target stays `pending` and is
    /// picked up again on the next startup.
    pub fn enqueue(&self, target_id: DbId, image_path: impl Into<String>) {
        let job = MarkerJob {
            target_id,
            image_path: image_path.into(),
        };
        if self.tx.send(job).is_err() {
            tracing::warn!(target_id, "Marker worker not running, job left pending");
        }
    }
}

/// Re-queue targets whose generation never finished. Returns the job count.
pub async fn requeue_unfinished(pool: &PgPool, queue: &MarkerQueue) -> Result<usize, sqlx::Error> {
    let targets = TargetRepo::list_unfinished(pool).await?;
    for target in &targets {
        queue.enqueue(target.id, target.image_path.clone());
    }
    Ok(targets.len())
}

/// Run the marker worker until `cancel` fires or every sender is dropped.
///
/// Cancelling mid-job drops the in-flight generation, which kills the child
/// process. The target then stays `processing` and is re-queued on startup.
pub async fn run(
    pool: PgPool,
    storage: MediaStorage,
    tool: Arc<MarkerToolConfig>,
    mut jobs: mpsc::UnboundedReceiver<MarkerJob>,
    cancel: CancellationToken,
) {
    tracing::info!(program = %tool.program, variant = ?tool.variant, "Marker worker started");

    loop {
        let job = tokio::select! {
            _ = cancel.cancelled() => break,
            job = jobs.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::warn!(target_id = job.target_id, "Marker job interrupted by shutdown");
                break;
            }
            () = process(&pool, &storage, &tool, &job) => {}
        }
    }

    tracing::info!("Marker worker stopping");
}

async fn process(pool: &PgPool, storage: &MediaStorage, tool: &MarkerToolConfig, job: &MarkerJob) {
    let target_id = job.target_id;

    match TargetRepo::mark_processing(pool, target_id, &job.image_path).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(target_id, "Target gone or image replaced, skipping marker job");
            return;
        }
        Err(e) => {
            tracing::error!(target_id, error = %e, "Failed to claim marker job");
            return;
        }
    }

    let outcome = match storage.absolute(&job.image_path) {
        Ok(image) => match markers::generate(tool, &image).await {
            Ok(descriptor) => storage
                .relative(&descriptor.descriptor_path)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        },
        Err(e) => Err(e.to_string()),
    };

    let recorded = match &outcome {
        Ok(marker_path) => {
            tracing::info!(target_id, marker_path = %marker_path, "Marker ready");
            TargetRepo::mark_ready(pool, target_id, &job.image_path, marker_path).await
        }
        Err(message) => {
            tracing::warn!(target_id, error = %message, "Marker generation failed");
            TargetRepo::mark_failed(pool, target_id, &job.image_path, message).await
        }
    };

    match recorded {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(target_id, "Image replaced during generation, result dropped");
            if outcome.is_ok() {
                discard_outputs(storage, tool, &job.image_path).await;
            }
        }
        Err(e) => tracing::error!(target_id, error = %e, "Failed to record marker result"),
    }
}

/// Remove descriptor files generated for an image that is no longer current.
async fn discard_outputs(storage: &MediaStorage, tool: &MarkerToolConfig, image_path: &str) {
    let Ok(image) = storage.absolute(image_path) else {
        return;
    };
    if let Err(e) = markers::remove_outputs(&image, tool.variant).await {
        tracing::warn!(image = %image_path, error = %e, "Failed to remove stale marker files");
    }
}
