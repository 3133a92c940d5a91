use std::path::PathBuf;
use std::sync::Arc;

use convertig_logging::{cv_debug, cv_info, cv_warn};

use crate::error::ValidationError;
use crate::ingest::{self, IngestReport};
use crate::job::ConversionJob;
use crate::model::{
    ArtifactFailure, ArtifactState, ContentHandle, ConvertedArtifact, FailureCause, ItemId, JobId,
};
use crate::state::{AppState, JobKind};
use crate::store::ArtifactMap;
use crate::{Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesIngested(report) => apply_ingest(&mut state, report),
        Msg::ItemRemoved(id) => match state.store_mut().remove(id) {
            Some((item, artifact)) => {
                cv_info!("removed {} ({})", item.name(), id);
                state.mark_dirty();
                state.set_diagnostic(None);
                release(artifact)
            }
            None => Vec::new(),
        },
        Msg::MenuToggled(id) => {
            if state.store_mut().toggle_menu(id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SubcategorySelected { id, subcategory } => {
            if state.store_mut().set_subcategory(id, &subcategory) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FormatSelected {
            id,
            subcategory,
            format,
        } => {
            if state.store_mut().set_format(id, &subcategory, &format) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ConvertClicked => start_batch(&mut state).unwrap_or_else(|err| refuse(&mut state, err)),
        Msg::RetryClicked(id) => {
            start_retry(&mut state, id).unwrap_or_else(|err| refuse(&mut state, err))
        }
        Msg::DownloadClicked(id) => {
            start_download(&mut state, id).unwrap_or_else(|err| refuse(&mut state, err))
        }
        Msg::JobFailed { job_id, failure } => {
            fail_job(&mut state, job_id, failure);
            Vec::new()
        }
        Msg::ArtifactFetched {
            job_id,
            id,
            name,
            result,
        } => apply_fetch(&mut state, job_id, id, name, result),
        Msg::JobSettled { job_id } => {
            settle_job(&mut state, job_id);
            Vec::new()
        }
        Msg::DownloadFinished { id, result } => {
            finish_download(&mut state, id, result);
            Vec::new()
        }
        Msg::DiagnosticDismissed => {
            state.set_diagnostic(None);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn refuse(state: &mut AppState, err: ValidationError) -> Vec<Effect> {
    cv_warn!("refused: {}", err);
    state.set_diagnostic(Some(err.to_string()));
    vec![Effect::Rejected(err)]
}

fn release(records: impl IntoIterator<Item = Arc<ConvertedArtifact>>) -> Vec<Effect> {
    records
        .into_iter()
        .filter_map(|artifact| artifact.handle.clone())
        .map(Effect::ReleaseContent)
        .collect()
}

fn apply_ingest(state: &mut AppState, report: IngestReport) -> Vec<Effect> {
    let mut diagnostic = report.summary();
    let origin = report.origin;
    let mut effects = Vec::new();

    if !report.accepted.is_empty() {
        // Re-checked here because two adapter calls may interleave.
        match ingest::check_capacity(state.store().len(), report.accepted.len()) {
            Ok(()) => {
                let ids = state.store_mut().add(report.accepted);
                cv_info!("ingested {} file(s) from {}: {:?}", ids.len(), origin.label(), ids);
                // The previous batch no longer describes the tracked collection.
                let cleared = state.store_mut().replace_artifacts(ArtifactMap::new());
                effects.extend(release(cleared));
                state.mark_dirty();
            }
            Err(rejection) => {
                cv_warn!("ingestion from {} refused: {}", origin.label(), rejection);
                diagnostic = Some(rejection.to_string());
            }
        }
    }

    state.set_diagnostic(diagnostic);
    effects
}

fn start_batch(state: &mut AppState) -> Result<Vec<Effect>, ValidationError> {
    if state.is_converting() {
        return Err(ValidationError::BatchInFlight);
    }
    let job = ConversionJob::batch(state.upcoming_job_id(), state.store().list())?;
    let job_id = state.start_job(JobKind::Batch);

    let fresh: ArtifactMap = job
        .entries
        .iter()
        .map(|entry| {
            let record =
                ConvertedArtifact::converting(entry.name.clone(), entry.selection.clone(), job_id);
            (entry.item_id, Arc::new(record))
        })
        .collect();
    let mut effects = release(state.store_mut().replace_artifacts(fresh));
    state.set_diagnostic(None);
    state.mark_dirty();

    cv_info!("submitting job {} with {} file(s)", job_id, job.len());
    effects.push(Effect::SubmitJob(job));
    Ok(effects)
}

fn start_retry(state: &mut AppState, id: ItemId) -> Result<Vec<Effect>, ValidationError> {
    let item = state
        .store()
        .get(id)
        .ok_or(ValidationError::UnknownItem(id))?;
    let Some(current) = item.selection() else {
        return Err(ValidationError::MissingSelection {
            names: vec![item.name().to_string()],
        });
    };
    let previous = state.store().artifact(id).cloned();
    if previous.as_ref().is_some_and(|artifact| artifact.state.is_transient()) {
        return Err(ValidationError::ItemBusy {
            name: item.name().to_string(),
        });
    }

    // Retry repeats the job that was submitted, not the current picker state.
    let selection = previous
        .as_ref()
        .map(|artifact| artifact.submitted.clone())
        .unwrap_or_else(|| current.clone());
    let name = previous
        .as_ref()
        .map(|artifact| artifact.name.clone())
        .unwrap_or_else(|| item.name().to_string());
    let job = ConversionJob::single(state.upcoming_job_id(), item, selection.clone());
    let job_id = state.start_job(JobKind::Retry(id));

    let replaced = state
        .store_mut()
        .put_artifact(id, ConvertedArtifact::converting(name, selection, job_id));
    state.mark_dirty();

    cv_info!("retrying {} as job {}", id, job_id);
    let mut effects = release(replaced);
    effects.push(Effect::SubmitJob(job));
    Ok(effects)
}

fn start_download(state: &mut AppState, id: ItemId) -> Result<Vec<Effect>, ValidationError> {
    let artifact = state
        .store()
        .artifact(id)
        .cloned()
        .ok_or(ValidationError::UnknownItem(id))?;
    let handle = match (artifact.state, artifact.handle.as_ref()) {
        (ArtifactState::Ready, Some(handle)) => handle.clone(),
        _ => {
            return Err(ValidationError::NotReady {
                name: artifact.name.clone(),
            })
        }
    };
    state
        .store_mut()
        .update_artifact(id, |record| record.state = ArtifactState::Downloading);
    state.mark_dirty();
    Ok(vec![Effect::SaveArtifact {
        id,
        handle,
        suggested_name: artifact.name.clone(),
    }])
}

fn records_of(state: &AppState, job_id: JobId) -> Vec<(ItemId, Arc<ConvertedArtifact>)> {
    state
        .store()
        .artifacts()
        .iter()
        .filter(|(_, artifact)| artifact.job_id == job_id)
        .map(|(id, artifact)| (*id, Arc::clone(artifact)))
        .collect()
}

fn item_name(state: &AppState, id: ItemId) -> String {
    state
        .store()
        .get(id)
        .map(|item| item.name().to_string())
        .or_else(|| state.store().artifact(id).map(|a| a.name.clone()))
        .unwrap_or_else(|| id.to_string())
}

fn fail_job(state: &mut AppState, job_id: JobId, failure: ArtifactFailure) {
    let Some(kind) = state.finish_job(job_id) else {
        cv_debug!("ignoring failure of finished job {}", job_id);
        return;
    };
    cv_warn!("job {} failed: {}", job_id, failure.message);

    for (id, artifact) in records_of(state, job_id) {
        if artifact.state != ArtifactState::Converting {
            continue;
        }
        state.store_mut().update_artifact(id, |record| {
            record.state = ArtifactState::Failed;
            record.handle = None;
            record.failure = Some(failure.clone());
        });
    }
    state.mark_dirty();

    let banner = match kind {
        JobKind::Retry(id) => format!("Retry failed for {}: {}", item_name(state, id), failure.message),
        JobKind::Batch if failure.cause == FailureCause::Timeout => failure.message.clone(),
        JobKind::Batch => format!("Conversion failed: {}", failure.message),
    };
    state.set_diagnostic(Some(banner));
}

fn apply_fetch(
    state: &mut AppState,
    job_id: JobId,
    id: ItemId,
    name: String,
    result: Result<ContentHandle, ArtifactFailure>,
) -> Vec<Effect> {
    let current = state.store().artifact(id);
    let live = current.is_some_and(|artifact| {
        artifact.job_id == job_id && artifact.state == ArtifactState::Converting
    });
    if !live {
        cv_debug!("dropping stale result of job {} for {}", job_id, id);
        return match result {
            Ok(handle) => vec![Effect::ReleaseContent(handle)],
            Err(_) => Vec::new(),
        };
    }

    match result {
        Ok(handle) => {
            cv_info!("{} ready as {} ({} bytes)", id, name, handle.byte_len);
            state.store_mut().update_artifact(id, |record| {
                record.name = name;
                record.state = ArtifactState::Ready;
                record.handle = Some(handle);
                record.failure = None;
            });
        }
        Err(failure) => {
            cv_warn!("{} failed: {}", id, failure.message);
            state.store_mut().update_artifact(id, |record| {
                record.name = name;
                record.state = ArtifactState::Failed;
                record.handle = None;
                record.failure = Some(failure);
            });
        }
    }
    state.mark_dirty();
    Vec::new()
}

fn settle_job(state: &mut AppState, job_id: JobId) {
    let Some(kind) = state.finish_job(job_id) else {
        return;
    };
    let records = records_of(state, job_id);
    if records.is_empty() {
        // Every record was superseded or removed meanwhile.
        return;
    }

    cv_info!("job {} settled", job_id);
    match kind {
        JobKind::Batch => {
            let failed: Vec<&str> = records
                .iter()
                .filter(|(_, artifact)| artifact.is_failed())
                .map(|(_, artifact)| artifact.name.as_str())
                .collect();
            let banner = if !failed.is_empty() {
                Some(format!(
                    "Some files failed to convert or download: {}. Click Retry to try again.",
                    failed.join(", ")
                ))
            } else if records.iter().all(|(_, artifact)| artifact.handle.is_none()) {
                Some("No files were converted successfully. Check file formats and try again.".into())
            } else {
                None
            };
            state.set_diagnostic(banner);
        }
        // A successful retry leaves the banner alone; other jobs may still own it.
        JobKind::Retry(id) => {
            if let Some(failure) = records.iter().find_map(|(_, artifact)| artifact.failure.as_ref()) {
                let banner = format!("Retry failed for {}: {}", item_name(state, id), failure.message);
                state.set_diagnostic(Some(banner));
            }
        }
    }
}

fn finish_download(state: &mut AppState, id: ItemId, result: Result<PathBuf, String>) {
    let name = state
        .store()
        .artifact(id)
        .map(|artifact| artifact.name.clone())
        .unwrap_or_else(|| item_name(state, id));
    if state.store_mut().update_artifact(id, |record| {
        if record.state == ArtifactState::Downloading {
            record.state = ArtifactState::Ready;
        }
    }) {
        state.mark_dirty();
    }
    match result {
        Ok(path) => cv_info!("saved {} to {:?}", name, path),
        Err(message) => {
            cv_warn!("saving {} failed: {}", name, message);
            state.set_diagnostic(Some(format!("Failed to download {name}. Please try again.")));
        }
    }
}
