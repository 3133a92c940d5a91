use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

use convertig_core::{ArtifactFailure, ContentHandle, ConversionJob, FailureCause, Msg};
use convertig_logging::{cv_info, cv_warn};

use crate::service::{ConversionService, ConvertedFile};
use crate::vault::ArtifactVault;
use crate::{FailureKind, FetchError};

/// Everything one job's IO needs, cloned into the job's future.
#[derive(Clone)]
pub struct JobContext {
    pub service: Arc<dyn ConversionService>,
    pub vault: Arc<ArtifactVault>,
    pub deadline: Duration,
    /// When the submission gives up; fixed when the job was submitted.
    pub expires_at: Instant,
    pub events: UnboundedSender<Msg>,
}

impl JobContext {
    pub fn new(
        service: Arc<dyn ConversionService>,
        vault: Arc<ArtifactVault>,
        deadline: Duration,
        events: UnboundedSender<Msg>,
    ) -> Self {
        Self {
            service,
            vault,
            deadline,
            expires_at: Instant::now() + deadline,
            events,
        }
    }

    fn send(&self, msg: Msg) {
        let _ = self.events.send(msg);
    }
}

pub fn timeout_message(deadline: Duration) -> String {
    format!(
        "Conversion timed out after {} seconds. Try smaller files or check server status.",
        deadline.as_secs()
    )
}

fn submission_cause(err: &FetchError) -> FailureCause {
    match err.kind {
        FailureKind::HttpStatus(_) | FailureKind::InvalidResponse | FailureKind::Unauthorized => {
            FailureCause::Rejected
        }
        FailureKind::Timeout => FailureCause::Timeout,
        _ => FailureCause::Network,
    }
}

/// Submit `job` under the deadline, then fetch each positional result.
///
/// Reports through `ctx.events`: one `JobFailed` when the submission fails,
/// otherwise one `ArtifactFetched` per entry followed by `JobSettled`.
pub async fn run_job(ctx: JobContext, job: ConversionJob) {
    let job_id = job.id;
    let submitted = tokio::time::timeout_at(ctx.expires_at, ctx.service.submit(&job)).await;
    let files = match submitted {
        Err(_) => {
            cv_warn!("job {} exceeded its {:?} deadline", job_id, ctx.deadline);
            ctx.send(Msg::JobFailed {
                job_id,
                failure: ArtifactFailure::new(FailureCause::Timeout, timeout_message(ctx.deadline)),
            });
            return;
        }
        Ok(Err(err)) => {
            cv_warn!("job {} was not converted: {}", job_id, err);
            let cause = submission_cause(&err);
            let message = match cause {
                FailureCause::Timeout => timeout_message(ctx.deadline),
                _ => err.message,
            };
            ctx.send(Msg::JobFailed {
                job_id,
                failure: ArtifactFailure::new(cause, message),
            });
            return;
        }
        Ok(Ok(files)) => files,
    };

    cv_info!(
        "job {} converted: {} result(s) for {} file(s)",
        job_id,
        files.len(),
        job.len()
    );
    if files.len() > job.len() {
        cv_warn!("job {} returned {} extra result(s)", job_id, files.len() - job.len());
    }

    let mut files = files.into_iter();
    let mut fetches = FuturesUnordered::new();
    for entry in &job.entries {
        let id = entry.item_id;
        let Some(file) = files.next() else {
            ctx.send(Msg::ArtifactFetched {
                job_id,
                id,
                name: entry.name.clone(),
                result: Err(ArtifactFailure::new(
                    FailureCause::Missing,
                    format!("No converted file was returned for {}.", entry.name),
                )),
            });
            continue;
        };
        let ctx = ctx.clone();
        fetches.push(async move {
            let result = fetch_artifact(&ctx, &file).await;
            (id, file.name, result)
        });
    }

    while let Some((id, name, result)) = fetches.next().await {
        ctx.send(Msg::ArtifactFetched {
            job_id,
            id,
            name,
            result,
        });
    }
    ctx.send(Msg::JobSettled { job_id });
}

async fn fetch_artifact(
    ctx: &JobContext,
    file: &ConvertedFile,
) -> Result<ContentHandle, ArtifactFailure> {
    let output = ctx.service.retrieve(&file.path).await.map_err(|err| {
        let message = match err.kind {
            FailureKind::HttpStatus(code) => {
                format!("Failed to fetch converted file: {}, status: {code}", file.name)
            }
            _ => format!("Failed to fetch converted file: {}, {}", file.name, err.message),
        };
        cv_warn!("{}", message);
        ArtifactFailure::new(FailureCause::Fetch, message)
    })?;

    ctx.vault
        .store(&output.bytes, output.content_type)
        .map_err(|err| {
            ArtifactFailure::new(
                FailureCause::Fetch,
                format!("Failed to store converted file {}: {err}", file.name),
            )
        })
}
