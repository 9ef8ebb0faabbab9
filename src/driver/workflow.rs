//! Workflow Orchestration
//!
//! ワークフローのオーケストレーション

use anyhow::{Context, Result};
use log::{info, warn};

use std::sync::Arc;

use crate::adapter::config::Config;
use crate::adapter::http::client::ProfilingApiClient;
use crate::adapter::repositories::dry_run_batch_service::DryRunBatchService;
use crate::adapter::repositories::fs_staging_area::FsStagingArea;
use crate::adapter::repositories::http_batch_service::HttpBatchService;
use crate::application::use_cases::batch_session::{BatchSessionController, UploadSummary};
use crate::application::use_cases::lookup_batch::LookupBatchUseCase;
use crate::application::use_cases::stage_files::StageFilesUseCase;
use crate::domain::repositories::batch_service::BatchService;

use super::cli::Args;

/// Profiling Workflow
pub struct ProfilingWorkflow {
    config: Config,
    staging_area: Arc<FsStagingArea>,
}

impl ProfilingWorkflow {
    /// Create a new workflow instance with dependency injection
    pub fn new(config: Config) -> Self {
        Self {
            config,
            staging_area: Arc::new(FsStagingArea::new()),
        }
    }

    /// Execute the workflow against the real server, or locally in dry-run mode
    pub async fn execute(&self, args: Args) -> Result<()> {
        info!("Starting contigsync...");
        info!("Dry run: {}", args.dry_run);

        if args.dry_run {
            println!("✓ Dry-run mode (no requests are sent)");
            return self.run(Arc::new(DryRunBatchService::new()), args).await;
        }

        println!("✓ Using server: {}", self.config.base_url);
        let client = ProfilingApiClient::new(self.config.clone())?;
        self.run(Arc::new(HttpBatchService::new(client)), args).await
    }

    async fn run<S: BatchService + 'static>(&self, service: Arc<S>, args: Args) -> Result<()> {
        if let Some(batch_id) = &args.lookup {
            return Self::lookup(service, batch_id).await;
        }

        let controller = BatchSessionController::new(service, self.config.session_config());

        match controller.initialize_session().await {
            Ok(batch) => println!("✓ Acquired batch {}", batch.id()),
            Err(e) => println!("⚠ {}", e),
        }

        let report = StageFilesUseCase::new(self.staging_area.clone())
            .execute(&controller, &args.paths)
            .await?;
        println!("✓ Staged {} files", report.staged.len());
        for (input, reason) in &report.rejected {
            println!("  ⚠ {}: {}", input, reason);
        }

        if let Some(database) = &args.database {
            controller.set_database_selection(database.clone()).await;
        }

        let dispatch = controller.request_upload().await?;
        println!(
            "✓ Dispatched {} uploads to batch {}",
            dispatch.len(),
            dispatch.batch_id()
        );

        // --wait: resolve every transfer before profiling starts
        let pending = if args.wait {
            Self::report_uploads(&dispatch.wait().await);
            None
        } else {
            Some(dispatch)
        };

        let ticket = match &args.occurrence {
            Some(occurrence) => controller.submit_profiling_with(occurrence.clone()).await?,
            None => controller.submit_profiling().await?,
        };
        let request = ticket.request().clone();
        println!(
            "✓ Profiling submitted: batch {} / database {} / occurrence {}",
            request.id, request.database, request.occurrence
        );

        // Transfers run on the runtime; let them finish before the process exits
        if let Some(dispatch) = pending {
            Self::report_uploads(&dispatch.wait().await);
        }

        if let Err(e) = ticket.outcome().await {
            warn!("Profiling request was not accepted: {:#}", e);
            println!("⚠ Profiling request was not accepted: {:#}", e);
        }

        println!("✓ Done! Query your results later with --lookup {}", request.id);
        Ok(())
    }

    async fn lookup<S: BatchService>(service: Arc<S>, batch_id: &str) -> Result<()> {
        let record = LookupBatchUseCase::new(service).execute(batch_id).await?;
        let json =
            serde_json::to_string_pretty(&record).context("Failed to format batch record")?;
        println!("{}", json);
        Ok(())
    }

    fn report_uploads(summary: &UploadSummary) {
        println!(
            "✓ Uploaded {} files ({} failed)",
            summary.succeeded, summary.failed
        );
        for result in summary.results.iter().filter(|r| !r.succeeded) {
            println!("  ✗ {}", result.name);
        }
    }
}
