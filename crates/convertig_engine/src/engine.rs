use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use futures_util::FutureExt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use convertig_core::{
    update, AppState, AppViewModel, Effect, IngestReport, ItemId, Msg, ValidationError,
};
use convertig_logging::{cv_debug, cv_warn};

use crate::config::{base_str, EngineConfig};
use crate::orchestrator::{run_job, JobContext};
use crate::save::{DirectorySaveTarget, SaveTarget};
use crate::service::{ConversionService, HttpConversionService};
use crate::sources::{self, DriveDocument, LocalFile, SharedLink};
use crate::vault::ArtifactVault;
use crate::{EngineError, Fetcher, ReqwestFetcher};

enum Step {
    Msg(Msg),
    Done,
}

/// Drives the pure core against real IO on a single task.
///
/// User operations apply synchronously; the IO they start runs as futures
/// polled by [`Session::settle`] and by the awaiting ingestion calls, whose
/// results are applied one at a time.
pub struct Session {
    state: AppState,
    config: EngineConfig,
    service: Arc<dyn ConversionService>,
    fetcher: Arc<dyn Fetcher>,
    vault: Arc<ArtifactVault>,
    save_target: Arc<dyn SaveTarget>,
    events_tx: UnboundedSender<Msg>,
    events_rx: UnboundedReceiver<Msg>,
    in_flight: FuturesUnordered<BoxFuture<'static, ()>>,
}

impl Session {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let service = HttpConversionService::new(config.service_url.clone(), config.fetch.clone())?;
        let fetcher = ReqwestFetcher::new(config.fetch.clone())?;
        let vault = match &config.vault_dir {
            Some(dir) => ArtifactVault::in_dir(dir)?,
            None => ArtifactVault::temporary()?,
        };
        let save_target = DirectorySaveTarget::new(config.save_dir.clone());
        Ok(Self::with_parts(
            config,
            Arc::new(service),
            Arc::new(fetcher),
            Arc::new(vault),
            Arc::new(save_target),
        ))
    }

    pub fn with_parts(
        config: EngineConfig,
        service: Arc<dyn ConversionService>,
        fetcher: Arc<dyn Fetcher>,
        vault: Arc<ArtifactVault>,
        save_target: Arc<dyn SaveTarget>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(),
            config,
            service,
            fetcher,
            vault,
            save_target,
            events_tx,
            events_rx,
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn vault(&self) -> &ArtifactVault {
        &self.vault
    }

    /// Whether any submission, fetch or save is still running.
    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Apply `msg` and start its effects. Refusals come back as the error.
    pub fn dispatch(&mut self, msg: Msg) -> Result<(), ValidationError> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        let mut refusal = None;
        for effect in effects {
            if let Some(err) = self.execute(effect) {
                refusal.get_or_insert(err);
            }
        }
        refusal.map_or(Ok(()), Err)
    }

    fn execute(&mut self, effect: Effect) -> Option<ValidationError> {
        match effect {
            Effect::SubmitJob(job) => {
                let ctx = JobContext::new(
                    Arc::clone(&self.service),
                    Arc::clone(&self.vault),
                    self.config.conversion_deadline,
                    self.events_tx.clone(),
                );
                self.in_flight.push(run_job(ctx, job).boxed());
            }
            Effect::SaveArtifact {
                id,
                handle,
                suggested_name,
            } => {
                let vault = Arc::clone(&self.vault);
                let target = Arc::clone(&self.save_target);
                let events = self.events_tx.clone();
                self.in_flight.push(
                    async move {
                        let result = vault
                            .read(&handle)
                            .and_then(|content| target.save(&suggested_name, &content))
                            .map_err(|err| err.to_string());
                        let _ = events.send(Msg::DownloadFinished { id, result });
                    }
                    .boxed(),
                );
            }
            Effect::ReleaseContent(handle) => self.vault.release(&handle),
            Effect::Rejected(err) => return Some(err),
        }
        None
    }

    /// Run in-flight IO to completion, applying every message it produces.
    pub async fn settle(&mut self) {
        loop {
            while let Ok(msg) = self.events_rx.try_recv() {
                self.apply(msg);
            }
            if self.in_flight.is_empty() {
                break;
            }
            let step = tokio::select! {
                Some(msg) = self.events_rx.recv() => Step::Msg(msg),
                Some(()) = self.in_flight.next() => Step::Done,
                else => Step::Done,
            };
            if let Step::Msg(msg) = step {
                self.apply(msg);
            }
        }
    }

    /// Await `work` while in-flight IO keeps running and its results keep applying.
    async fn drive_until<T>(&mut self, work: impl Future<Output = T>) -> T {
        tokio::pin!(work);
        loop {
            while let Ok(msg) = self.events_rx.try_recv() {
                self.apply(msg);
            }
            let step = tokio::select! {
                out = &mut work => return out,
                Some(msg) = self.events_rx.recv() => Step::Msg(msg),
                Some(()) = self.in_flight.next() => Step::Done,
            };
            if let Step::Msg(msg) = step {
                self.apply(msg);
            }
        }
    }

    fn apply(&mut self, msg: Msg) {
        if let Err(err) = self.dispatch(msg) {
            cv_warn!("unexpected refusal while applying results: {}", err);
        }
    }

    pub fn ingest_local(&mut self, files: Vec<LocalFile>) {
        let report = sources::ingest_local(self.state.store().len(), files);
        self.ingest(report);
    }

    /// Retrieve picked drive documents and track them. Other IO keeps running meanwhile.
    pub async fn ingest_cloud_drive(&mut self, token: Option<&str>, documents: &[DriveDocument]) {
        let fetcher = Arc::clone(&self.fetcher);
        let drive_api = base_str(&self.config.drive_api_url).to_string();
        let tracked = self.state.store().len();
        let retrieval =
            sources::ingest_cloud_drive(fetcher.as_ref(), &drive_api, token, tracked, documents);
        let report = self.drive_until(retrieval).await;
        self.ingest(report);
    }

    /// Retrieve shared links and track them. Other IO keeps running meanwhile.
    pub async fn ingest_file_share(&mut self, links: &[SharedLink]) {
        let fetcher = Arc::clone(&self.fetcher);
        let tracked = self.state.store().len();
        let retrieval = sources::ingest_file_share(fetcher.as_ref(), tracked, links);
        let report = self.drive_until(retrieval).await;
        self.ingest(report);
    }

    fn ingest(&mut self, report: IngestReport) {
        cv_debug!(
            "{} ingestion: {} of {} accepted",
            report.origin.label(),
            report.accepted.len(),
            report.requested
        );
        // Ingestion reports never produce refusals.
        let _ = self.dispatch(Msg::FilesIngested(report));
    }

    pub fn toggle_menu(&mut self, id: ItemId) {
        let _ = self.dispatch(Msg::MenuToggled(id));
    }

    pub fn select_subcategory(&mut self, id: ItemId, subcategory: &str) {
        let _ = self.dispatch(Msg::SubcategorySelected {
            id,
            subcategory: subcategory.to_string(),
        });
    }

    pub fn select_format(&mut self, id: ItemId, subcategory: &str, format: &str) {
        let _ = self.dispatch(Msg::FormatSelected {
            id,
            subcategory: subcategory.to_string(),
            format: format.to_string(),
        });
    }

    pub fn remove(&mut self, id: ItemId) {
        let _ = self.dispatch(Msg::ItemRemoved(id));
    }

    pub fn dismiss_diagnostic(&mut self) {
        let _ = self.dispatch(Msg::DiagnosticDismissed);
    }

    /// Validate and submit every tracked item as one job.
    pub fn submit_batch(&mut self) -> Result<(), ValidationError> {
        self.dispatch(Msg::ConvertClicked)
    }

    pub fn retry(&mut self, id: ItemId) -> Result<(), ValidationError> {
        self.dispatch(Msg::RetryClicked(id))
    }

    pub fn download(&mut self, id: ItemId) -> Result<(), ValidationError> {
        self.dispatch(Msg::DownloadClicked(id))
    }
}
