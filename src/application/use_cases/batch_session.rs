//! # Batch Session Use Case
//!
//! バッチ取得 → ステージ → アップロード → プロファイリング起動 のセッション制御
//!
//! `Session` は `tokio::sync::Mutex` の内側にあり、変更は全てこのコントローラーを通る。
//! アップロードはファイルごとに `tokio::spawn` され、セマフォで同時数が制限される。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use log::{debug, info, warn};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;

use crate::application::dto::session_config::SessionConfig;
use crate::domain::entities::batch::{Batch, BatchId};
use crate::domain::entities::profiling_request::ProfilingRequest;
use crate::domain::entities::session::{Session, SessionPhase, UploadResult};
use crate::domain::entities::staged_file::StagedFile;
use crate::domain::errors::SessionError;
use crate::domain::repositories::batch_service::BatchService;
use crate::domain::services::readiness::ReadinessService;

/// アップロード結果のサマリー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    /// ファイルに付与したバッチID
    pub batch_id: BatchId,
    /// ファイルごとの結果（完了順）
    pub results: Vec<UploadResult>,
    /// 成功したファイルの数
    pub succeeded: usize,
    /// 失敗したファイルの数
    pub failed: usize,
}

impl UploadSummary {
    fn from_results(batch_id: BatchId, results: Vec<UploadResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.succeeded).count();
        let failed = results.len() - succeeded;
        Self {
            batch_id,
            results,
            succeeded,
            failed,
        }
    }

    /// 全ファイルが成功したかどうか
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

enum DispatchState {
    Pending(Vec<(String, JoinHandle<UploadResult>)>),
    Resolved(UploadSummary),
}

/// 送出済みアップロードのハンドル
///
/// 破棄しても転送は中断されない。`wait` で全ファイルの結果を待てる。
pub struct UploadDispatch {
    batch_id: BatchId,
    state: DispatchState,
}

impl UploadDispatch {
    pub fn batch_id(&self) -> &BatchId {
        &self.batch_id
    }

    /// 送出したファイル数
    pub fn len(&self) -> usize {
        match &self.state {
            DispatchState::Pending(handles) => handles.len(),
            DispatchState::Resolved(summary) => summary.results.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 全ファイルの結果を待ってサマリーを返す
    pub async fn wait(self) -> UploadSummary {
        match self.state {
            DispatchState::Resolved(summary) => summary,
            DispatchState::Pending(handles) => {
                let mut results = Vec::with_capacity(handles.len());
                for (name, handle) in handles {
                    match handle.await {
                        Ok(result) => results.push(result),
                        Err(e) => {
                            warn!("Upload task for {} did not complete: {}", name, e);
                            results.push(UploadResult::failure(name));
                        }
                    }
                }
                UploadSummary::from_results(self.batch_id, results)
            }
        }
    }
}

/// 送出済みプロファイリングリクエストのチケット
///
/// 破棄すればfire-and-forget。`outcome` でサーバーの受理結果を待てる。
pub struct SubmissionTicket {
    request: ProfilingRequest,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl SubmissionTicket {
    pub fn request(&self) -> &ProfilingRequest {
        &self.request
    }

    pub async fn outcome(self) -> anyhow::Result<()> {
        self.handle
            .await
            .map_err(|e| anyhow!("profiling submission task failed: {}", e))?
    }
}

/// バッチセッションコントローラー
///
/// `Session` を排他的に所有し、BatchServiceへの全呼び出しを仲介する
pub struct BatchSessionController<S: BatchService + 'static> {
    service: Arc<S>,
    config: SessionConfig,
    session: Arc<Mutex<Session>>,
    upload_slots: Arc<Semaphore>,
}

impl<S: BatchService + 'static> BatchSessionController<S> {
    /// 新しいコントローラーを作成
    ///
    /// バッチはまだ取得しない。`initialize_session` を呼ぶこと。
    pub fn new(service: Arc<S>, config: SessionConfig) -> Self {
        let upload_slots = Arc::new(Semaphore::new(config.max_concurrent_uploads));
        Self {
            service,
            config,
            session: Arc::new(Mutex::new(Session::new())),
            upload_slots,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// バッチIDを取得してセッションを開始する
    ///
    /// 成功・失敗にかかわらずフェーズは `AwaitingReadiness` になる。失敗時はバッチが
    /// 未設定のままなので、後続のアップロードは `NoActiveBatch` で拒否される。
    ///
    /// 新しいバッチへの切り替えは `remove_all` を通す。
    ///
    /// # Errors
    ///
    /// 取得に失敗した場合は `BatchAcquisitionFailed`、有効なバッチが既にある場合は
    /// `BatchAlreadyActive`
    pub async fn initialize_session(&self) -> Result<Batch, SessionError> {
        let generation = {
            let session = self.session.lock().await;
            Self::ensure_acquirable(&session)?;
            session.generation
        };

        let acquired = self.service.acquire_batch().await;

        let mut session = self.session.lock().await;
        if session.generation != generation {
            // 取得中にリセットされた。新しい世代の取得結果を優先する
            debug!("Discarding batch acquired for stale session generation {}", generation);
            return Err(SessionError::BatchAcquisitionFailed(
                "session was reset while acquiring".to_string(),
            ));
        }
        // 同時に走った別の取得が先に反映された
        Self::ensure_acquirable(&session)?;

        session.phase = SessionPhase::AwaitingReadiness;
        match acquired {
            Ok(batch) => {
                info!("Acquired batch {}", batch.id());
                session.batch = Some(batch.clone());
                Ok(batch)
            }
            Err(e) => {
                warn!("Failed to acquire batch: {:#}", e);
                session.batch = None;
                Err(SessionError::BatchAcquisitionFailed(format!("{:#}", e)))
            }
        }
    }

    /// 自動取得は `Init` のとき、または前回の取得が失敗してバッチがないときのみ
    fn ensure_acquirable(session: &Session) -> Result<(), SessionError> {
        match &session.batch {
            Some(batch) if session.phase != SessionPhase::Init => {
                Err(SessionError::BatchAlreadyActive(batch.id().to_string()))
            }
            _ => Ok(()),
        }
    }

    /// ファイルをステージする
    pub async fn stage_file(&self, file: StagedFile) -> Result<(), SessionError> {
        let mut session = self.session.lock().await;
        debug!("Staging {}", file.name);
        session.file_set.stage(file)
    }

    /// パスを検証してステージする
    ///
    /// # Errors
    ///
    /// 拡張子が受け付けられない場合は `UnsupportedFileType`（ステージ時に拒否）
    pub async fn stage_path(&self, path: impl Into<PathBuf>) -> Result<(), SessionError> {
        let file = StagedFile::from_path(path)?;
        self.stage_file(file).await
    }

    /// ステージからファイルを取り除く。存在しなかった場合は `false`
    pub async fn unstage_file(&self, name: &str) -> bool {
        self.session.lock().await.file_set.unstage(name)
    }

    pub async fn set_database_selection(&self, name: impl Into<String>) {
        let name = name.into();
        debug!("Database selection: {:?}", name);
        self.session.lock().await.selection.name = name;
    }

    /// 検証してアップロードを開始する
    ///
    /// 既定では全リクエストの送出が完了した時点で `Uploaded` に遷移する（各転送の完了は
    /// 待たない）。`confirm_on_resolution` が有効な場合は全結果を待ち、全て成功した
    /// ときのみ `Uploaded` に遷移する。
    ///
    /// 送出済み（`Uploading` 以降）のセッションでは再送しない。確定モードで失敗した
    /// 場合は `AwaitingReadiness` に戻るので、失敗したファイルだけを再送できる。
    ///
    /// # Errors
    ///
    /// `UploadAlreadyRequested`, `InsufficientFiles`, `NoDatabaseSelected`, `NoActiveBatch`、
    /// および確定モードでの `UploadIncomplete`
    pub async fn request_upload(&self) -> Result<UploadDispatch, SessionError> {
        let (batch_id, files, generation) = {
            let mut session = self.session.lock().await;
            if session.phase >= SessionPhase::Uploading {
                return Err(SessionError::UploadAlreadyRequested(session.phase));
            }
            let batch_id = ReadinessService::validate(&session, self.config.min_files)?;

            // 成功済みのファイルは再送しない
            let files: Vec<StagedFile> = session
                .file_set
                .files()
                .iter()
                .filter(|f| {
                    !session
                        .upload_results
                        .iter()
                        .any(|r| r.succeeded && r.name == f.name)
                })
                .cloned()
                .collect();
            session.upload_results.retain(|r| r.succeeded);
            session.phase = SessionPhase::Uploading;
            (batch_id, files, session.generation)
        };

        info!(
            "Uploading {} files to batch {} (max {} concurrent)",
            files.len(),
            batch_id,
            self.config.max_concurrent_uploads
        );

        let handles: Vec<(String, JoinHandle<UploadResult>)> = files
            .into_iter()
            .map(|file| {
                let name = file.name.clone();
                let handle = self.spawn_upload(file, batch_id.clone(), generation);
                (name, handle)
            })
            .collect();

        let dispatch = UploadDispatch {
            batch_id,
            state: DispatchState::Pending(handles),
        };

        if !self.config.confirm_on_resolution {
            let mut session = self.session.lock().await;
            if session.generation == generation && session.phase == SessionPhase::Uploading {
                session.phase = SessionPhase::Uploaded;
            }
            return Ok(dispatch);
        }

        let summary = dispatch.wait().await;
        let mut session = self.session.lock().await;
        if session.generation != generation {
            return Ok(UploadDispatch {
                batch_id: summary.batch_id.clone(),
                state: DispatchState::Resolved(summary),
            });
        }

        if summary.is_success() {
            session.phase = SessionPhase::Uploaded;
            Ok(UploadDispatch {
                batch_id: summary.batch_id.clone(),
                state: DispatchState::Resolved(summary),
            })
        } else {
            session.phase = SessionPhase::AwaitingReadiness;
            Err(SessionError::UploadIncomplete {
                failed: summary.failed,
                total: summary.results.len(),
            })
        }
    }

    fn spawn_upload(
        &self,
        file: StagedFile,
        batch_id: BatchId,
        generation: u64,
    ) -> JoinHandle<UploadResult> {
        let service = Arc::clone(&self.service);
        let session = Arc::clone(&self.session);
        let slots = Arc::clone(&self.upload_slots);

        tokio::spawn(async move {
            let succeeded = match slots.acquire_owned().await {
                Ok(_permit) => match service.upload_file(&file, &batch_id).await {
                    Ok(()) => {
                        debug!("Uploaded {} to batch {}", file.name, batch_id);
                        true
                    }
                    Err(e) => {
                        warn!("Failed to upload {}: {:#}", file.name, e);
                        false
                    }
                },
                Err(e) => {
                    warn!("Upload slot unavailable for {}: {}", file.name, e);
                    false
                }
            };

            let result = if succeeded {
                UploadResult::success(&file.name)
            } else {
                UploadResult::failure(&file.name)
            };

            if !session.lock().await.record_result(generation, result.clone()) {
                debug!(
                    "Ignoring late result for {} from discarded batch {}",
                    file.name, batch_id
                );
            }
            result
        })
    }

    /// 全ファイルと結果を破棄し、新しいバッチIDを取得し直す
    ///
    /// 送出中のアップロードは中断しないが、その結果は新しいセッションに反映されない。
    /// 古いバッチはサーバー側で削除されない。
    pub async fn remove_all(&self) -> Result<Batch, SessionError> {
        {
            let mut session = self.session.lock().await;
            if let Some(batch) = &session.batch {
                info!("Abandoning batch {}", batch.id());
            }
            session.reset();
        }
        self.initialize_session().await
    }

    /// 既定の出現率しきい値でプロファイリングを起動する
    pub async fn submit_profiling(&self) -> Result<SubmissionTicket, SessionError> {
        let occurrence = self.config.default_occurrence.clone();
        self.submit_profiling_with(occurrence).await
    }

    /// プロファイリングを起動する
    ///
    /// リクエストはバックグラウンドで送信され、サーバーの受理を待たずに戻る。
    ///
    /// # Errors
    ///
    /// アップロードが確定していない場合は `UploadNotConfirmed`
    pub async fn submit_profiling_with(
        &self,
        occurrence: impl Into<String>,
    ) -> Result<SubmissionTicket, SessionError> {
        let request = {
            let mut session = self.session.lock().await;
            if !session.phase.is_upload_confirmed() {
                return Err(SessionError::UploadNotConfirmed);
            }
            if !session.selection.is_chosen() {
                return Err(SessionError::NoDatabaseSelected);
            }
            let batch_id = session
                .batch
                .as_ref()
                .map(|b| b.id().clone())
                .ok_or(SessionError::NoActiveBatch)?;

            session.phase = SessionPhase::Submitted;
            ProfilingRequest::new(occurrence, session.selection.name.clone(), batch_id)
        };

        info!(
            "Submitting profiling for batch {} against {} (occurrence {})",
            request.id, request.database, request.occurrence
        );

        let service = Arc::clone(&self.service);
        let sent = request.clone();
        let handle = tokio::spawn(async move {
            let result = service.submit_profiling(&sent).await;
            if let Err(e) = &result {
                warn!("Profiling submission for batch {} failed: {:#}", sent.id, e);
            }
            result
        });

        Ok(SubmissionTicket { request, handle })
    }

    pub async fn phase(&self) -> SessionPhase {
        self.session.lock().await.phase
    }

    pub async fn batch(&self) -> Option<Batch> {
        self.session.lock().await.batch.clone()
    }

    pub async fn staged_files(&self) -> Vec<String> {
        self.session.lock().await.file_set.names()
    }

    pub async fn upload_results(&self) -> Vec<UploadResult> {
        self.session.lock().await.upload_results.clone()
    }

    /// セッションの複製を返す
    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::batch_service::{BatchRecord, MockBatchService};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    /// 連番のバッチIDを払い出し、呼び出しを記録するサービス
    struct FakeBatchService {
        next_id: AtomicUsize,
        fail_acquire: bool,
        failing_uploads: Vec<String>,
        uploads: StdMutex<Vec<(String, BatchId)>>,
        submissions: StdMutex<Vec<ProfilingRequest>>,
        gate: Option<Arc<Notify>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeBatchService {
        fn new() -> Self {
            Self {
                next_id: AtomicUsize::new(1),
                fail_acquire: false,
                failing_uploads: vec![],
                uploads: StdMutex::new(vec![]),
                submissions: StdMutex::new(vec![]),
                gate: None,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn uploads(&self) -> Vec<(String, BatchId)> {
            self.uploads.lock().unwrap().clone()
        }

        fn submissions(&self) -> Vec<ProfilingRequest> {
            self.submissions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BatchService for FakeBatchService {
        async fn acquire_batch(&self) -> Result<Batch> {
            if self.fail_acquire {
                anyhow::bail!("connection refused");
            }
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            Ok(Batch::acquired_now(BatchId::new(format!("batch-{n:03}"))))
        }

        async fn upload_file(&self, file: &StagedFile, batch_id: &BatchId) -> Result<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(gate) = &self.gate {
                gate.notified().await;
            } else {
                tokio::task::yield_now().await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.uploads
                .lock()
                .unwrap()
                .push((file.name.clone(), batch_id.clone()));

            if self.failing_uploads.contains(&file.name) {
                anyhow::bail!("500 Internal Server Error");
            }
            Ok(())
        }

        async fn submit_profiling(&self, request: &ProfilingRequest) -> Result<()> {
            self.submissions.lock().unwrap().push(request.clone());
            Ok(())
        }

        async fn lookup_batch(&self, batch_id: &BatchId) -> Result<BatchRecord> {
            Ok(BatchRecord {
                id: batch_id.clone(),
                details: Default::default(),
            })
        }
    }

    async fn stage_n<S: BatchService>(controller: &BatchSessionController<S>, n: usize) {
        for i in 0..n {
            controller
                .stage_path(format!("/data/isolate_{i:02}.fasta"))
                .await
                .unwrap();
        }
    }

    async fn ready_controller(
        service: FakeBatchService,
        config: SessionConfig,
    ) -> (Arc<FakeBatchService>, BatchSessionController<FakeBatchService>) {
        let service = Arc::new(service);
        let controller = BatchSessionController::new(service.clone(), config);
        controller.initialize_session().await.unwrap();
        stage_n(&controller, 5).await;
        controller.set_database_selection("db1").await;
        (service, controller)
    }

    #[tokio::test]
    async fn test_initialize_session_success() {
        let controller =
            BatchSessionController::new(Arc::new(FakeBatchService::new()), SessionConfig::default());
        assert_eq!(controller.phase().await, SessionPhase::Init);

        let batch = controller.initialize_session().await.unwrap();

        assert_eq!(batch.id().as_str(), "batch-001");
        assert_eq!(controller.phase().await, SessionPhase::AwaitingReadiness);
        assert_eq!(controller.batch().await, Some(batch));
    }

    #[tokio::test]
    async fn test_initialize_session_failure_blocks_upload() {
        let mut service = FakeBatchService::new();
        service.fail_acquire = true;
        let service = Arc::new(service);
        let controller = BatchSessionController::new(service.clone(), SessionConfig::default());

        let err = controller.initialize_session().await.unwrap_err();
        assert!(matches!(err, SessionError::BatchAcquisitionFailed(_)));
        assert_eq!(controller.phase().await, SessionPhase::AwaitingReadiness);
        assert!(controller.batch().await.is_none());

        stage_n(&controller, 5).await;
        controller.set_database_selection("db1").await;

        let err = controller.request_upload().await.err().unwrap();
        assert_eq!(err, SessionError::NoActiveBatch);
        assert!(service.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_acquisition_error_with_mock_service() {
        let mut mock = MockBatchService::new();
        mock.expect_acquire_batch()
            .times(1)
            .returning(|| Err(anyhow::anyhow!("503 Service Unavailable")));
        mock.expect_upload_file().never();

        let controller = BatchSessionController::new(Arc::new(mock), SessionConfig::default());
        let err = controller.initialize_session().await.unwrap_err();

        assert_eq!(
            err,
            SessionError::BatchAcquisitionFailed("503 Service Unavailable".to_string())
        );
    }

    #[tokio::test]
    async fn test_initialize_session_twice_keeps_batch() {
        let controller =
            BatchSessionController::new(Arc::new(FakeBatchService::new()), SessionConfig::default());
        let first = controller.initialize_session().await.unwrap();

        let err = controller.initialize_session().await.unwrap_err();

        assert_eq!(err, SessionError::BatchAlreadyActive("batch-001".to_string()));
        assert_eq!(controller.batch().await, Some(first));
        assert_eq!(controller.phase().await, SessionPhase::AwaitingReadiness);
    }

    #[tokio::test]
    async fn test_initialize_session_retries_after_failed_acquisition() {
        let mut mock = MockBatchService::new();
        let mut calls = 0;
        mock.expect_acquire_batch().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Err(anyhow::anyhow!("connection refused"))
            } else {
                Ok(Batch::acquired_now(BatchId::from("b-2")))
            }
        });

        let controller = BatchSessionController::new(Arc::new(mock), SessionConfig::default());
        controller.initialize_session().await.unwrap_err();
        let batch = controller.initialize_session().await.unwrap();

        assert_eq!(batch.id().as_str(), "b-2");
        assert_eq!(controller.batch().await, Some(batch));
    }

    #[tokio::test]
    async fn test_initialize_session_mid_upload_keeps_original_batch() {
        let gate = Arc::new(Notify::new());
        let mut service = FakeBatchService::new();
        service.gate = Some(gate.clone());
        let (service, controller) = ready_controller(service, SessionConfig::default()).await;

        let dispatch = controller.request_upload().await.unwrap();
        let err = controller.initialize_session().await.unwrap_err();
        assert_eq!(err, SessionError::BatchAlreadyActive("batch-001".to_string()));

        while service.in_flight.load(Ordering::SeqCst) < 5 {
            tokio::task::yield_now().await;
        }
        gate.notify_waiters();
        let summary = dispatch.wait().await;

        assert_eq!(summary.succeeded, 5);
        assert!(service
            .uploads()
            .iter()
            .all(|(_, id)| id.as_str() == "batch-001"));
        assert_eq!(controller.upload_results().await.len(), 5);
        assert_eq!(
            controller.batch().await.map(|b| b.id().clone()),
            Some(BatchId::from("batch-001"))
        );
        assert_eq!(controller.phase().await, SessionPhase::Uploaded);
    }

    #[tokio::test]
    async fn test_stage_rejects_unsupported_type() {
        let controller =
            BatchSessionController::new(Arc::new(FakeBatchService::new()), SessionConfig::default());

        let err = controller.stage_path("/data/reads.fastq").await.unwrap_err();

        assert_eq!(err, SessionError::UnsupportedFileType("reads.fastq".to_string()));
        assert!(controller.staged_files().await.is_empty());
    }

    #[tokio::test]
    async fn test_unstage_file() {
        let controller =
            BatchSessionController::new(Arc::new(FakeBatchService::new()), SessionConfig::default());
        stage_n(&controller, 2).await;

        assert!(controller.unstage_file("isolate_00.fasta").await);
        assert!(!controller.unstage_file("missing.fasta").await);
        assert_eq!(controller.staged_files().await, vec!["isolate_01.fasta"]);
    }

    #[tokio::test]
    async fn test_request_upload_insufficient_files() {
        let service = Arc::new(FakeBatchService::new());
        let controller = BatchSessionController::new(service.clone(), SessionConfig::default());
        controller.initialize_session().await.unwrap();
        controller.set_database_selection("db1").await;
        stage_n(&controller, 4).await;

        let err = controller.request_upload().await.err().unwrap();

        assert_eq!(
            err,
            SessionError::InsufficientFiles {
                staged: 4,
                required: 5
            }
        );
        assert_eq!(controller.phase().await, SessionPhase::AwaitingReadiness);
        assert!(service.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_request_upload_no_database() {
        let controller =
            BatchSessionController::new(Arc::new(FakeBatchService::new()), SessionConfig::default());
        controller.initialize_session().await.unwrap();
        stage_n(&controller, 5).await;

        let err = controller.request_upload().await.err().unwrap();

        assert_eq!(err, SessionError::NoDatabaseSelected);
        assert_eq!(controller.phase().await, SessionPhase::AwaitingReadiness);
    }

    #[tokio::test]
    async fn test_full_session_submits_once() {
        let (service, controller) =
            ready_controller(FakeBatchService::new(), SessionConfig::default()).await;

        let dispatch = controller.request_upload().await.unwrap();
        assert_eq!(controller.phase().await, SessionPhase::Uploaded);
        assert_eq!(dispatch.len(), 5);

        let summary = dispatch.wait().await;
        assert!(summary.is_success());
        assert_eq!(summary.succeeded, 5);
        assert!(service
            .uploads()
            .iter()
            .all(|(_, id)| id.as_str() == "batch-001"));

        let ticket = controller.submit_profiling().await.unwrap();
        assert_eq!(
            ticket.request(),
            &ProfilingRequest::new("95", "db1", BatchId::from("batch-001"))
        );
        ticket.outcome().await.unwrap();

        assert_eq!(controller.phase().await, SessionPhase::Submitted);
        assert_eq!(
            service.submissions(),
            vec![ProfilingRequest::new("95", "db1", BatchId::from("batch-001"))]
        );
    }

    #[tokio::test]
    async fn test_submit_before_upload_not_confirmed() {
        let (service, controller) =
            ready_controller(FakeBatchService::new(), SessionConfig::default()).await;

        let err = controller.submit_profiling().await.err().unwrap();

        assert_eq!(err, SessionError::UploadNotConfirmed);
        assert_eq!(controller.phase().await, SessionPhase::AwaitingReadiness);
        assert!(service.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_submit_with_custom_occurrence() {
        let (service, controller) =
            ready_controller(FakeBatchService::new(), SessionConfig::default()).await;
        controller.request_upload().await.unwrap().wait().await;

        controller
            .submit_profiling_with("80")
            .await
            .unwrap()
            .outcome()
            .await
            .unwrap();

        assert_eq!(service.submissions()[0].occurrence, "80");
    }

    #[tokio::test]
    async fn test_failed_uploads_do_not_block_confirmation() {
        let mut service = FakeBatchService::new();
        service.failing_uploads = vec!["isolate_03.fasta".to_string()];
        let (_service, controller) = ready_controller(service, SessionConfig::default()).await;

        let summary = controller.request_upload().await.unwrap().wait().await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 4);
        assert_eq!(controller.phase().await, SessionPhase::Uploaded);
        assert_eq!(controller.snapshot().await.failed_uploads(), 1);
    }

    #[tokio::test]
    async fn test_confirm_on_resolution_rejects_partial_failure() {
        let mut service = FakeBatchService::new();
        service.failing_uploads = vec!["isolate_01.fasta".to_string()];
        let config = SessionConfig::new(5, 200, "95".to_string(), true);
        let (_service, controller) = ready_controller(service, config).await;

        let err = controller.request_upload().await.err().unwrap();

        assert_eq!(err, SessionError::UploadIncomplete { failed: 1, total: 5 });
        assert_eq!(controller.phase().await, SessionPhase::AwaitingReadiness);
        assert_eq!(
            controller.submit_profiling().await.err().unwrap(),
            SessionError::UploadNotConfirmed
        );
    }

    #[tokio::test]
    async fn test_confirm_on_resolution_success() {
        let config = SessionConfig::new(5, 2, "95".to_string(), true);
        let (_service, controller) = ready_controller(FakeBatchService::new(), config).await;

        let dispatch = controller.request_upload().await.unwrap();

        assert_eq!(controller.phase().await, SessionPhase::Uploaded);
        assert_eq!(controller.upload_results().await.len(), 5);
        assert!(dispatch.wait().await.is_success());
    }

    #[tokio::test]
    async fn test_retry_uploads_only_failed_files() {
        let mut service = FakeBatchService::new();
        service.failing_uploads = vec!["isolate_02.fasta".to_string()];
        let config = SessionConfig::new(5, 200, "95".to_string(), true);
        let (service, controller) = ready_controller(service, config).await;

        controller.request_upload().await.err().unwrap();
        let second = controller.request_upload().await.err().unwrap();

        assert_eq!(second, SessionError::UploadIncomplete { failed: 1, total: 1 });
        assert_eq!(service.uploads().len(), 6);
    }

    #[tokio::test]
    async fn test_request_upload_twice_dispatches_once() {
        let (service, controller) =
            ready_controller(FakeBatchService::new(), SessionConfig::default()).await;

        let dispatch = controller.request_upload().await.unwrap();
        let err = controller.request_upload().await.err().unwrap();
        dispatch.wait().await;

        assert_eq!(
            err,
            SessionError::UploadAlreadyRequested(SessionPhase::Uploaded)
        );
        assert_eq!(service.uploads().len(), 5);
        assert_eq!(controller.upload_results().await.len(), 5);
    }

    #[tokio::test]
    async fn test_request_upload_while_uploading_is_rejected() {
        let gate = Arc::new(Notify::new());
        let mut service = FakeBatchService::new();
        service.gate = Some(gate.clone());
        let config = SessionConfig::new(5, 200, "95".to_string(), true);
        let (service, controller) = ready_controller(service, config).await;

        let (first, second) = tokio::join!(controller.request_upload(), async {
            while service.in_flight.load(Ordering::SeqCst) < 5 {
                tokio::task::yield_now().await;
            }
            let second = controller.request_upload().await;
            gate.notify_waiters();
            second
        });

        assert!(first.unwrap().wait().await.is_success());
        assert_eq!(
            second.err().unwrap(),
            SessionError::UploadAlreadyRequested(SessionPhase::Uploading)
        );
        assert_eq!(service.uploads().len(), 5);
        assert_eq!(controller.phase().await, SessionPhase::Uploaded);
    }

    #[tokio::test]
    async fn test_request_upload_after_submit_keeps_phase() {
        let (service, controller) =
            ready_controller(FakeBatchService::new(), SessionConfig::default()).await;
        controller.request_upload().await.unwrap().wait().await;
        controller
            .submit_profiling()
            .await
            .unwrap()
            .outcome()
            .await
            .unwrap();

        let err = controller.request_upload().await.err().unwrap();

        assert_eq!(
            err,
            SessionError::UploadAlreadyRequested(SessionPhase::Submitted)
        );
        assert_eq!(controller.phase().await, SessionPhase::Submitted);
        assert_eq!(service.uploads().len(), 5);
        assert_eq!(service.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_cap_is_enforced() {
        let config = SessionConfig::new(5, 2, "95".to_string(), false);
        let (service, controller) = ready_controller(FakeBatchService::new(), config).await;
        stage_n_extra(&controller).await;

        let summary = controller.request_upload().await.unwrap().wait().await;

        assert_eq!(summary.succeeded, 10);
        assert!(service.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    async fn stage_n_extra<S: BatchService>(controller: &BatchSessionController<S>) {
        for i in 5..10 {
            controller
                .stage_path(format!("/data/extra_{i:02}.fna"))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_remove_all_acquires_fresh_batch() {
        let (_service, controller) =
            ready_controller(FakeBatchService::new(), SessionConfig::default()).await;
        let first = controller.batch().await.unwrap();

        let second = controller.remove_all().await.unwrap();

        assert_ne!(first.id(), second.id());
        assert!(controller.staged_files().await.is_empty());
        assert!(controller.upload_results().await.is_empty());
        assert_eq!(controller.phase().await, SessionPhase::AwaitingReadiness);
    }

    #[tokio::test]
    async fn test_remove_all_after_submit_resets_phase() {
        let (_service, controller) =
            ready_controller(FakeBatchService::new(), SessionConfig::default()).await;
        controller.request_upload().await.unwrap().wait().await;
        controller.submit_profiling().await.unwrap();

        controller.remove_all().await.unwrap();

        assert_eq!(controller.phase().await, SessionPhase::AwaitingReadiness);
        assert_eq!(
            controller.submit_profiling().await.err().unwrap(),
            SessionError::UploadNotConfirmed
        );
    }

    #[tokio::test]
    async fn test_remove_all_mid_upload_ignores_late_results() {
        let gate = Arc::new(Notify::new());
        let mut service = FakeBatchService::new();
        service.gate = Some(gate.clone());
        let (service, controller) = ready_controller(service, SessionConfig::default()).await;

        let dispatch = controller.request_upload().await.unwrap();
        assert_eq!(controller.phase().await, SessionPhase::Uploaded);

        let fresh = controller.remove_all().await.unwrap();
        assert_eq!(fresh.id().as_str(), "batch-002");

        // 旧バッチの転送を完了させる
        while service.in_flight.load(Ordering::SeqCst) < 5 {
            tokio::task::yield_now().await;
        }
        gate.notify_waiters();
        let summary = dispatch.wait().await;

        assert_eq!(summary.batch_id.as_str(), "batch-001");
        assert_eq!(summary.succeeded, 5);
        assert!(controller.upload_results().await.is_empty());
        assert_eq!(controller.phase().await, SessionPhase::AwaitingReadiness);
    }
}
