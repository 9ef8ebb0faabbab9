//! Wire models for the profiling HTTP API

use serde::Deserialize;

use crate::domain::entities::batch::BatchId;

/// Response body of the batch-creation endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AcquireBatchResponse {
    pub id: BatchId,
}
