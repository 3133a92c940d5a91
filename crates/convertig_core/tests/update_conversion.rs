mod common;

use std::path::PathBuf;
use std::sync::Arc;

use convertig_core::{
    update, AppState, ArtifactAction, ArtifactFailure, ArtifactState, Effect, FailureCause, ItemId,
    Msg, ValidationError,
};
use pretty_assertions::assert_eq;

use common::{choose, fetched, handle, ids, ingest, init_logging, submitted_job};

fn three_images() -> AppState {
    let (state, _) = ingest(AppState::new(), &["a.png", "b.png", "c.png"]);
    let ids = ids(&state);
    let state = choose(state, ids[0], "image", "GIF");
    let state = choose(state, ids[1], "image", "BMP");
    choose(state, ids[2], "image", "ICO")
}

#[test]
fn missing_selection_names_every_file_and_submits_nothing() {
    init_logging();
    let (state, _) = ingest(AppState::new(), &["a.png", "b.png", "c.png"]);
    let first = ids(&state)[0];
    let state = choose(state, first, "image", "GIF");

    let (state, effects) = update(state, Msg::ConvertClicked);
    let expected = ValidationError::MissingSelection {
        names: vec!["b.png".to_string(), "c.png".to_string()],
    };
    assert_eq!(effects, vec![Effect::Rejected(expected)]);
    assert_eq!(
        state.diagnostic(),
        Some("Please select a format for all files: b.png, c.png.")
    );
    assert!(!state.is_converting());
    assert!(state.store().artifacts().is_empty());
}

#[test]
fn convert_with_no_files_is_refused() {
    init_logging();
    let (_, effects) = update(AppState::new(), Msg::ConvertClicked);
    assert_eq!(effects, vec![Effect::Rejected(ValidationError::NoItems)]);
}

#[test]
fn submission_marks_every_item_converting_immediately() {
    init_logging();
    let (state, effects) = update(three_images(), Msg::ConvertClicked);

    let job = match effects.as_slice() {
        [Effect::SubmitJob(job)] => job.clone(),
        other => panic!("unexpected effects {other:?}"),
    };
    assert_eq!(job.item_ids(), ids(&state));
    let targets: Vec<String> = job.entries.iter().map(|entry| entry.target()).collect();
    assert_eq!(targets, vec!["gif", "bmp", "ico"]);

    let view = state.view();
    assert!(view.converting);
    assert!(!view.can_convert);
    assert!(view.items.iter().all(|row| {
        row.artifact
            .as_ref()
            .is_some_and(|artifact| artifact.state == ArtifactState::Converting && artifact.action.is_none())
    }));

    let (_, effects) = update(state, Msg::ConvertClicked);
    assert_eq!(effects, vec![Effect::Rejected(ValidationError::BatchInFlight)]);
}

#[test]
fn html_to_pdf_is_submitted_through_the_document_path() {
    init_logging();
    let (state, _) = ingest(AppState::new(), &["page.html"]);
    let id = ids(&state)[0];
    let state = choose(state, id, "document", "PDF");

    let (_, effects) = update(state, Msg::ConvertClicked);
    let job = match effects.as_slice() {
        [Effect::SubmitJob(job)] => job.clone(),
        other => panic!("unexpected effects {other:?}"),
    };
    let request = &job.format_requests()[0];
    assert_eq!(request.target, "pdf");
    assert_eq!(request.sub_section, "document");
    assert_eq!(
        serde_json::to_value(request).unwrap(),
        serde_json::json!({
            "name": "page.html",
            "target": "pdf",
            "type": "document",
            "subSection": "document",
            "id": "1",
        })
    );
    assert_eq!(id, ItemId(1));
}

#[test]
fn fetched_results_land_on_their_own_items() {
    init_logging();
    let (state, effects) = update(three_images(), Msg::ConvertClicked);
    let job_id = submitted_job(&effects);
    let ids = ids(&state);

    let (state, _) = fetched(state, job_id, ids[2], "z.ico");
    let (state, _) = fetched(state, job_id, ids[0], "x.gif");
    let (state, _) = fetched(state, job_id, ids[1], "y.bmp");
    let (state, effects) = update(state, Msg::JobSettled { job_id });

    assert!(effects.is_empty());
    assert!(!state.is_converting());
    assert_eq!(state.diagnostic(), None);
    let names: Vec<String> = state
        .view()
        .items
        .iter()
        .map(|row| row.artifact.as_ref().unwrap().name.clone())
        .collect();
    assert_eq!(names, vec!["x.gif", "y.bmp", "z.ico"]);
    let artifact = state.store().artifact(ids[1]).unwrap();
    assert_eq!(artifact.handle, Some(handle("y.bmp")));
    assert_eq!(ArtifactAction::for_state(artifact.state), Some(ArtifactAction::Download));
}

#[test]
fn job_failure_text_is_shown_verbatim() {
    init_logging();
    let (state, effects) = update(three_images(), Msg::ConvertClicked);
    let job_id = submitted_job(&effects);

    let (state, _) = update(
        state,
        Msg::JobFailed {
            job_id,
            failure: ArtifactFailure::new(FailureCause::Rejected, "Unsupported codec"),
        },
    );

    assert!(!state.is_converting());
    assert_eq!(state.diagnostic(), Some("Conversion failed: Unsupported codec"));
    for row in state.view().items {
        let artifact = row.artifact.unwrap();
        assert_eq!(artifact.state, ArtifactState::Failed);
        assert_eq!(artifact.error.as_deref(), Some("Unsupported codec"));
        assert_eq!(artifact.action, Some(ArtifactAction::Retry));
    }
}

#[test]
fn timeout_reports_the_deadline_message() {
    init_logging();
    let (state, effects) = update(three_images(), Msg::ConvertClicked);
    let job_id = submitted_job(&effects);
    let message = "Conversion timed out after 120 seconds. Try smaller files or check server status.";

    let (state, _) = update(
        state,
        Msg::JobFailed {
            job_id,
            failure: ArtifactFailure::new(FailureCause::Timeout, message),
        },
    );
    assert_eq!(state.diagnostic(), Some(message));
}

#[test]
fn partial_failure_lists_the_failed_names() {
    init_logging();
    let (state, effects) = update(three_images(), Msg::ConvertClicked);
    let job_id = submitted_job(&effects);
    let ids = ids(&state);

    let (state, _) = fetched(state, job_id, ids[0], "x.gif");
    let (state, _) = update(
        state,
        Msg::ArtifactFetched {
            job_id,
            id: ids[1],
            name: "y.bmp".to_string(),
            result: Err(ArtifactFailure::new(FailureCause::Fetch, "HTTP 404")),
        },
    );
    let (state, _) = fetched(state, job_id, ids[2], "z.ico");
    let (state, _) = update(state, Msg::JobSettled { job_id });

    assert_eq!(
        state.diagnostic(),
        Some("Some files failed to convert or download: y.bmp. Click Retry to try again.")
    );
    assert!(state.store().artifact(ids[0]).unwrap().is_ready());
    assert!(state.store().artifact(ids[1]).unwrap().is_failed());
    assert!(state.store().artifact(ids[2]).unwrap().is_ready());
}

#[test]
fn retry_replaces_only_its_own_record() {
    init_logging();
    let (state, effects) = update(three_images(), Msg::ConvertClicked);
    let job_id = submitted_job(&effects);
    let ids = ids(&state);
    let (state, _) = fetched(state, job_id, ids[0], "x.gif");
    let (state, _) = update(
        state,
        Msg::ArtifactFetched {
            job_id,
            id: ids[1],
            name: "b.png".to_string(),
            result: Err(ArtifactFailure::new(FailureCause::Missing, "No result returned")),
        },
    );
    let (state, _) = fetched(state, job_id, ids[2], "z.ico");
    let (state, _) = update(state, Msg::JobSettled { job_id });

    let before = state.store().artifacts();
    // Changing the picker after the batch must not change what retry submits.
    let state = choose(state, ids[1], "image", "PNG");
    let (state, effects) = update(state, Msg::RetryClicked(ids[1]));

    let job = match effects.as_slice() {
        [Effect::SubmitJob(job)] => job.clone(),
        other => panic!("unexpected effects {other:?}"),
    };
    assert_eq!(job.item_ids(), vec![ids[1]]);
    assert_eq!(job.entries[0].target(), "bmp");
    assert!(!state.is_converting());

    let after = state.store().artifacts();
    assert!(Arc::ptr_eq(&before[&ids[0]], &after[&ids[0]]));
    assert!(Arc::ptr_eq(&before[&ids[2]], &after[&ids[2]]));
    assert!(!Arc::ptr_eq(&before[&ids[1]], &after[&ids[1]]));
    assert_eq!(after[&ids[1]].state, ArtifactState::Converting);

    let (state, _) = update(state, Msg::RetryClicked(ids[1]));
    assert_eq!(
        state.diagnostic(),
        Some("b.png is still being processed.")
    );

    let retry_job = job.id;
    let (state, _) = fetched(state, retry_job, ids[1], "y.bmp");
    let (state, _) = update(state, Msg::JobSettled { job_id: retry_job });
    assert!(Arc::ptr_eq(&before[&ids[0]], &state.store().artifacts()[&ids[0]]));
    assert!(state.store().artifact(ids[1]).unwrap().is_ready());
}

#[test]
fn failed_retry_names_the_file() {
    init_logging();
    let (state, effects) = update(three_images(), Msg::ConvertClicked);
    let job_id = submitted_job(&effects);
    let (state, _) = update(
        state,
        Msg::JobFailed {
            job_id,
            failure: ArtifactFailure::new(FailureCause::Network, "connection refused"),
        },
    );
    let id = ids(&state)[0];
    let (state, effects) = update(state, Msg::RetryClicked(id));
    let retry_job = submitted_job(&effects);

    let (state, _) = update(
        state,
        Msg::JobFailed {
            job_id: retry_job,
            failure: ArtifactFailure::new(FailureCause::Rejected, "Server busy"),
        },
    );
    assert_eq!(state.diagnostic(), Some("Retry failed for a.png: Server busy"));
}

#[test]
fn results_of_a_superseded_job_are_released() {
    init_logging();
    let (state, effects) = update(three_images(), Msg::ConvertClicked);
    let job_id = submitted_job(&effects);
    let (state, _) = ingest(state, &["d.png"]);
    assert!(state.store().artifacts().is_empty());

    let first = ids(&state)[0];
    let (state, effects) = fetched(state, job_id, first, "x.gif");
    assert_eq!(effects, vec![Effect::ReleaseContent(handle("x.gif"))]);
    assert!(state.store().artifact(first).is_none());

    let (state, _) = update(state, Msg::JobSettled { job_id });
    assert!(!state.is_converting());
    assert_eq!(state.diagnostic(), None);
}

#[test]
fn new_ingestion_clears_previous_artifacts() {
    init_logging();
    let (state, effects) = update(three_images(), Msg::ConvertClicked);
    let job_id = submitted_job(&effects);
    let ids = ids(&state);
    let (state, _) = fetched(state, job_id, ids[0], "x.gif");
    let (state, _) = fetched(state, job_id, ids[1], "y.bmp");
    let (state, _) = fetched(state, job_id, ids[2], "z.ico");
    let (state, _) = update(state, Msg::JobSettled { job_id });

    let (state, effects) = ingest(state, &["song.mp3"]);
    assert_eq!(
        effects,
        vec![
            Effect::ReleaseContent(handle("x.gif")),
            Effect::ReleaseContent(handle("y.bmp")),
            Effect::ReleaseContent(handle("z.ico")),
        ]
    );
    assert_eq!(state.store().len(), 4);
    assert!(state.view().items.iter().all(|row| row.artifact.is_none()));
}

#[test]
fn download_moves_through_downloading_and_back() {
    init_logging();
    let (state, effects) = update(three_images(), Msg::ConvertClicked);
    let job_id = submitted_job(&effects);
    let id = ids(&state)[0];

    let (state, effects) = update(state, Msg::DownloadClicked(id));
    assert_eq!(
        effects,
        vec![Effect::Rejected(ValidationError::NotReady {
            name: "a.png".to_string()
        })]
    );

    let (state, _) = fetched(state, job_id, id, "x.gif");
    let (state, effects) = update(state, Msg::DownloadClicked(id));
    assert_eq!(
        effects,
        vec![Effect::SaveArtifact {
            id,
            handle: handle("x.gif"),
            suggested_name: "x.gif".to_string(),
        }]
    );
    assert_eq!(
        state.store().artifact(id).unwrap().state,
        ArtifactState::Downloading
    );

    let (state, _) = update(
        state,
        Msg::DownloadFinished {
            id,
            result: Err("disk full".to_string()),
        },
    );
    assert_eq!(state.store().artifact(id).unwrap().state, ArtifactState::Ready);
    assert_eq!(
        state.diagnostic(),
        Some("Failed to download x.gif. Please try again.")
    );

    let (state, _) = update(state, Msg::DownloadClicked(id));
    let (state, _) = update(
        state,
        Msg::DownloadFinished {
            id,
            result: Ok(PathBuf::from("/tmp/x.gif")),
        },
    );
    assert!(state.store().artifact(id).unwrap().is_ready());
}
