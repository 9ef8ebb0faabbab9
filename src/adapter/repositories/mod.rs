//! Repository Implementations
//!
//! Domain層のtraitの実装

pub mod dry_run_batch_service;
pub mod fs_staging_area;
pub mod http_batch_service;
