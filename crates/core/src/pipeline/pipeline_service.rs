//! Orchestration of one full ingest run.

use std::sync::Arc;

use log::{error, info, warn};

use crate::cleaning::{normalize_holdings, normalize_target_allocation};
use crate::errors::Result;
use crate::ingest::parse_csv;
use crate::pipeline::pipeline_model::{LoadReport, PipelineConfig, TableLoadOutcome};
use crate::records::{
    AssetPerformance, ClientLot, ClientProfile, LoadRepositoryTrait, TargetWeight,
};
use crate::table::Frame;

/// Runs the parse → clean → load pipeline against a load repository.
pub struct PipelineService {
    repository: Arc<dyn LoadRepositoryTrait>,
    config: PipelineConfig,
}

impl PipelineService {
    pub fn new(repository: Arc<dyn LoadRepositoryTrait>, config: PipelineConfig) -> Self {
        Self { repository, config }
    }

    /// Run the full pipeline over the raw CSV bytes of the holdings and
    /// allocation exports.
    ///
    /// Cleaning failures abort the run (nothing has been written yet);
    /// per-table load failures are recorded in the report and the run
    /// continues with the next table.
    pub async fn run(&self, holdings_csv: &[u8], allocations_csv: &[u8]) -> Result<LoadReport> {
        let holdings = self.parse_sheet("holdings", holdings_csv)?;
        let allocations = self.parse_sheet("allocations", allocations_csv)?;

        let holdings_output = normalize_holdings(holdings, &self.config.holdings)?;
        let allocation_output = normalize_target_allocation(allocations, &self.config.allocation)?;

        let (profiles, profiles_skipped) = collect_rows(
            &allocation_output.client_profiles,
            ClientProfile::from_frame_row,
        );
        let (assets, assets_skipped) = collect_rows(
            &holdings_output.asset_performance,
            AssetPerformance::from_frame_row,
        );
        let (lots, lots_skipped) =
            collect_rows(&holdings_output.client_lots, ClientLot::from_frame_row);
        let (weights, weights_skipped) = collect_rows(
            &allocation_output.target_weights,
            TargetWeight::from_frame_row,
        );

        // Same table order as the original loader; each replace is its own
        // transaction.
        let mut report = LoadReport::default();
        report.tables.push(
            self.load_table("client_profile", profiles_skipped, {
                self.repository.replace_client_profiles(profiles).await
            }),
        );
        report.tables.push(
            self.load_table("asset_performance", assets_skipped, {
                self.repository.replace_asset_performance(assets).await
            }),
        );
        report.tables.push(self.load_table("client_allocation", lots_skipped, {
            self.repository.replace_client_lots(lots).await
        }));
        report.tables.push(
            self.load_table("target_allocation", weights_skipped, {
                self.repository.replace_target_weights(weights).await
            }),
        );

        Ok(report)
    }

    fn parse_sheet(&self, label: &str, content: &[u8]) -> Result<Frame> {
        let sheet = parse_csv(content)?;
        for issue in &sheet.issues {
            warn!("{} sheet: {}", label, issue.message);
        }
        info!(
            "{} sheet parsed: {} rows, {} columns",
            label,
            sheet.frame.len(),
            sheet.frame.columns().len()
        );
        Ok(sheet.frame)
    }

    fn load_table(
        &self,
        table: &str,
        skipped: usize,
        result: Result<usize>,
    ) -> TableLoadOutcome {
        match result {
            Ok(inserted) => {
                info!("{}: {} rows loaded ({} skipped)", table, inserted, skipped);
                TableLoadOutcome {
                    table: table.to_string(),
                    inserted,
                    skipped,
                    error: None,
                }
            }
            Err(e) => {
                error!("{}: load failed, table rolled back: {}", table, e);
                TableLoadOutcome {
                    table: table.to_string(),
                    inserted: 0,
                    skipped,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Build typed records from every frame row, logging and skipping rows the
/// constructor rejects.
fn collect_rows<T, F>(frame: &Frame, ctor: F) -> (Vec<T>, usize)
where
    F: Fn(&Frame, usize) -> Result<T>,
{
    let mut rows = Vec::with_capacity(frame.len());
    let mut skipped = 0usize;
    for row in 0..frame.len() {
        match ctor(frame, row) {
            Ok(record) => rows.push(record),
            Err(e) => {
                warn!("row {} skipped: {}", row, e);
                skipped += 1;
            }
        }
    }
    (rows, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRepository {
        pub profiles: Mutex<Vec<ClientProfile>>,
        pub assets: Mutex<Vec<AssetPerformance>>,
        pub lots: Mutex<Vec<ClientLot>>,
        pub weights: Mutex<Vec<TargetWeight>>,
        pub fail_lots: bool,
    }

    #[async_trait]
    impl LoadRepositoryTrait for FakeRepository {
        async fn replace_client_profiles(&self, rows: Vec<ClientProfile>) -> Result<usize> {
            let n = rows.len();
            *self.profiles.lock().unwrap() = rows;
            Ok(n)
        }

        async fn replace_asset_performance(&self, rows: Vec<AssetPerformance>) -> Result<usize> {
            let n = rows.len();
            *self.assets.lock().unwrap() = rows;
            Ok(n)
        }

        async fn replace_client_lots(&self, rows: Vec<ClientLot>) -> Result<usize> {
            if self.fail_lots {
                return Err(crate::errors::DatabaseError::QueryFailed(
                    "disk I/O error".to_string(),
                )
                .into());
            }
            let n = rows.len();
            *self.lots.lock().unwrap() = rows;
            Ok(n)
        }

        async fn replace_target_weights(&self, rows: Vec<TargetWeight>) -> Result<usize> {
            let n = rows.len();
            *self.weights.lock().unwrap() = rows;
            Ok(n)
        }
    }

    const HOLDINGS_CSV: &str = "\
Client,Symbol,Name,Sector,Quantity,Buy Price,Current Price,Market Value,Purchase Date,Dividend Yield,P/E Ratio,52-Week High,52-Week Low,Analyst Rating,Target Price,Risk Level
Clients23!!,AAPL,Apple Inc.,Technology,,140.00,10.00,250.00,03/15/23,0.55,28.4,199.62,124.17,Buy,210.00,Low
Client_7,MSFT,Microsoft,Technology,4,300.00,310.00,1240.00,05/20/23,0.80,35.1,430.82,309.45,Hold,420.00,Low
Client_7,MSFT,Microsoft,Technology,4,300.00,310.00,1240.00,05/20/23,0.80,35.1,430.82,309.45,Hold,420.00,Low
";

    fn allocations_csv() -> String {
        let mut csv = String::from("Client,Target Portfolio,Target Allocation (%)\n");
        csv.push_str("Client_1,Balanced,30\n");
        csv.push_str("Client_1,Balanced,25\n");
        csv.push_str("Client_1,Balanced,\n");
        csv.push_str("Client_1,Balanced,20\n");
        csv
    }

    fn test_config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.allocation.expected_clients = 1;
        config
    }

    #[tokio::test]
    async fn test_full_run_loads_all_tables() {
        let repo = Arc::new(FakeRepository::default());
        let service = PipelineService::new(repo.clone(), test_config());

        let report = service
            .run(HOLDINGS_CSV.as_bytes(), allocations_csv().as_bytes())
            .await
            .unwrap();

        assert!(report.all_ok());
        assert_eq!(report.tables.len(), 4);

        let lots = repo.lots.lock().unwrap();
        assert_eq!(lots.len(), 2); // duplicate Client_7/MSFT dropped
        assert_eq!(lots[0].client, "Client_23");
        assert_eq!(lots[0].quantity, Decimal::from(25)); // 250.00 / 10.00

        let weights = repo.weights.lock().unwrap();
        assert_eq!(weights.len(), 4);
        let sum: Decimal = weights.iter().map(|w| w.target_allocation_percent).sum();
        assert_eq!(sum, Decimal::from(100));
        assert_eq!(weights[2].target_allocation_percent, Decimal::from(25));

        let profiles = repo.profiles.lock().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].target_portfolio, "Balanced");

        let assets = repo.assets.lock().unwrap();
        assert_eq!(assets.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_table_does_not_abort_run() {
        let repo = Arc::new(FakeRepository {
            fail_lots: true,
            ..Default::default()
        });
        let service = PipelineService::new(repo.clone(), test_config());

        let report = service
            .run(HOLDINGS_CSV.as_bytes(), allocations_csv().as_bytes())
            .await
            .unwrap();

        assert!(!report.all_ok());
        let lot_outcome = report
            .tables
            .iter()
            .find(|t| t.table == "client_allocation")
            .unwrap();
        assert!(lot_outcome.error.is_some());
        assert_eq!(lot_outcome.inserted, 0);

        // Later tables still loaded.
        assert_eq!(repo.weights.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_cleaning_failure_aborts_before_load() {
        let repo = Arc::new(FakeRepository::default());
        let service = PipelineService::new(repo.clone(), test_config());

        // Two missing weights in the single client block.
        let bad_allocations =
            "Client,Target Portfolio,Target Allocation (%)\nClient_1,Balanced,30\nClient_1,Balanced,\nClient_1,Balanced,\nClient_1,Balanced,20\n";
        let result = service
            .run(HOLDINGS_CSV.as_bytes(), bad_allocations.as_bytes())
            .await;

        assert!(result.is_err());
        assert!(repo.profiles.lock().unwrap().is_empty());
    }
}
