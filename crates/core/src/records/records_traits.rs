use async_trait::async_trait;

use crate::errors::Result;
use crate::records::records_model::{AssetPerformance, ClientLot, ClientProfile, TargetWeight};

/// Trait for the output-table load operations.
///
/// Each call replaces the full contents of one table (delete then bulk
/// insert) inside a single transaction, so a failed load leaves that
/// table's previous rows intact. Implemented by the storage crate; the
/// cleaning pipeline stays testable without a live database.
#[async_trait]
pub trait LoadRepositoryTrait: Send + Sync {
    async fn replace_client_profiles(&self, rows: Vec<ClientProfile>) -> Result<usize>;
    async fn replace_asset_performance(&self, rows: Vec<AssetPerformance>) -> Result<usize>;
    async fn replace_client_lots(&self, rows: Vec<ClientLot>) -> Result<usize>;
    async fn replace_target_weights(&self, rows: Vec<TargetWeight>) -> Result<usize>;
}
