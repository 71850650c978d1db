//! Output-table records - typed rows, constructors, and storage traits.

mod records_model;
mod records_traits;

pub use records_model::{AssetPerformance, ClientLot, ClientProfile, TargetWeight};
pub use records_traits::LoadRepositoryTrait;
