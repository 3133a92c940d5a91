#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use convertig_core::{
    update, AppState, ContentHandle, Effect, IngestReport, IngestedFile, ItemId, JobId, Msg,
    Origin,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(convertig_logging::initialize_for_tests);
}

pub fn local(name: &str) -> IngestedFile {
    IngestedFile::new(name, "application/octet-stream", &b"payload"[..], Origin::Local, None)
}

pub fn ingest(state: AppState, names: &[&str]) -> (AppState, Vec<Effect>) {
    let mut report = IngestReport::new(Origin::Local, names.len());
    for name in names {
        report.admit(local(name));
    }
    update(state, Msg::FilesIngested(report))
}

pub fn ids(state: &AppState) -> Vec<ItemId> {
    state.store().list().iter().map(|item| item.id()).collect()
}

pub fn choose(state: AppState, id: ItemId, subcategory: &str, format: &str) -> AppState {
    update(
        state,
        Msg::FormatSelected {
            id,
            subcategory: subcategory.to_string(),
            format: format.to_string(),
        },
    )
    .0
}

/// Returns the job id of the single `SubmitJob` effect.
pub fn submitted_job(effects: &[Effect]) -> JobId {
    let jobs: Vec<JobId> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::SubmitJob(job) => Some(job.id),
            _ => None,
        })
        .collect();
    assert_eq!(jobs.len(), 1, "expected exactly one submission in {effects:?}");
    jobs[0]
}

pub fn handle(name: &str) -> ContentHandle {
    ContentHandle {
        path: PathBuf::from(format!("/tmp/convertig-test/{name}")),
        byte_len: 7,
        content_type: Some("application/octet-stream".to_string()),
    }
}

pub fn fetched(state: AppState, job_id: JobId, id: ItemId, name: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::ArtifactFetched {
            job_id,
            id,
            name: name.to_string(),
            result: Ok(handle(name)),
        },
    )
}
