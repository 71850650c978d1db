use async_trait::async_trait;
use diesel::prelude::*;
use log::debug;

use super::model::{AssetPerformanceDB, ClientAllocationDB, ClientProfileDB, TargetAllocationDB};
use crate::db::WriteHandle;
use crate::errors::IntoCore;
use advisorgpt_core::errors::Result;
use advisorgpt_core::records::{
    AssetPerformance, ClientLot, ClientProfile, LoadRepositoryTrait, TargetWeight,
};

/// Repository that replaces the contents of the four output tables.
///
/// Each replace runs on the writer actor as a single transaction: the table
/// is emptied and the new rows inserted, so a failed load leaves the
/// previous contents intact.
pub struct LoadRepository {
    writer: WriteHandle,
}

impl LoadRepository {
    pub fn new(writer: WriteHandle) -> Self {
        LoadRepository { writer }
    }
}

// SQLite caps the number of bound variables per statement; chunked inserts
// stay under it at any row width.
const INSERT_CHUNK: usize = 50;

#[async_trait]
impl LoadRepositoryTrait for LoadRepository {
    async fn replace_client_profiles(&self, records: Vec<ClientProfile>) -> Result<usize> {
        use crate::schema::client_profile::dsl::*;

        let rows: Vec<ClientProfileDB> = records.into_iter().map(Into::into).collect();
        self.writer
            .exec(move |conn| {
                diesel::delete(client_profile)
                    .execute(conn)
                    .into_core()?;
                let mut inserted = 0;
                for chunk in rows.chunks(INSERT_CHUNK) {
                    inserted += diesel::insert_into(client_profile)
                        .values(chunk)
                        .execute(conn)
                        .into_core()?;
                }
                debug!("client_profile replaced with {} rows", inserted);
                Ok(inserted)
            })
            .await
    }

    async fn replace_asset_performance(&self, records: Vec<AssetPerformance>) -> Result<usize> {
        use crate::schema::asset_performance::dsl::*;

        let rows: Vec<AssetPerformanceDB> = records.into_iter().map(Into::into).collect();
        self.writer
            .exec(move |conn| {
                diesel::delete(asset_performance)
                    .execute(conn)
                    .into_core()?;
                let mut inserted = 0;
                for chunk in rows.chunks(INSERT_CHUNK) {
                    inserted += diesel::insert_into(asset_performance)
                        .values(chunk)
                        .execute(conn)
                        .into_core()?;
                }
                debug!("asset_performance replaced with {} rows", inserted);
                Ok(inserted)
            })
            .await
    }

    async fn replace_client_lots(&self, records: Vec<ClientLot>) -> Result<usize> {
        use crate::schema::client_allocation::dsl::*;

        let rows: Vec<ClientAllocationDB> = records.into_iter().map(Into::into).collect();
        self.writer
            .exec(move |conn| {
                diesel::delete(client_allocation)
                    .execute(conn)
                    .into_core()?;
                let mut inserted = 0;
                for chunk in rows.chunks(INSERT_CHUNK) {
                    inserted += diesel::insert_into(client_allocation)
                        .values(chunk)
                        .execute(conn)
                        .into_core()?;
                }
                debug!("client_allocation replaced with {} rows", inserted);
                Ok(inserted)
            })
            .await
    }

    async fn replace_target_weights(&self, records: Vec<TargetWeight>) -> Result<usize> {
        use crate::schema::target_allocation::dsl::*;

        let rows: Vec<TargetAllocationDB> = records.into_iter().map(Into::into).collect();
        self.writer
            .exec(move |conn| {
                diesel::delete(target_allocation)
                    .execute(conn)
                    .into_core()?;
                let mut inserted = 0;
                for chunk in rows.chunks(INSERT_CHUNK) {
                    inserted += diesel::insert_into(target_allocation)
                        .values(chunk)
                        .execute(conn)
                        .into_core()?;
                }
                debug!("target_allocation replaced with {} rows", inserted);
                Ok(inserted)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, get_connection, init, run_migrations, spawn_writer, DbPool};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn profile(client: &str, portfolio: &str) -> ClientProfile {
        ClientProfile {
            client: client.to_string(),
            target_portfolio: portfolio.to_string(),
        }
    }

    async fn setup() -> (TempDir, Arc<DbPool>, LoadRepository) {
        let dir = TempDir::new().unwrap();
        let db_path = init(dir.path().to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer(pool.clone());
        let repository = LoadRepository::new(writer);
        (dir, pool, repository)
    }

    #[tokio::test]
    async fn test_replace_profiles_overwrites_previous_load() {
        let (_dir, pool, repository) = setup().await;

        let first = vec![profile("Client_1", "Growth"), profile("Client_2", "Income")];
        assert_eq!(repository.replace_client_profiles(first).await.unwrap(), 2);

        let second = vec![profile("Client_3", "Balanced")];
        assert_eq!(repository.replace_client_profiles(second).await.unwrap(), 1);

        use crate::schema::client_profile::dsl::*;
        let mut conn = get_connection(&pool).unwrap();
        let clients: Vec<String> = client_profile.select(client).load(&mut conn).unwrap();
        assert_eq!(clients, vec!["Client_3"]);
    }

    #[tokio::test]
    async fn test_replace_lots_round_trip() {
        let (_dir, pool, repository) = setup().await;

        let lots = vec![ClientLot {
            client: "Client_7".to_string(),
            symbol: "AAPL".to_string(),
            quantity: dec!(25),
            buy_price: Some(dec!(150.50)),
            purchase_date: chrono::NaiveDate::from_ymd_opt(2023, 4, 15),
        }];
        assert_eq!(repository.replace_client_lots(lots).await.unwrap(), 1);

        use crate::schema::client_allocation::dsl::*;
        let mut conn = get_connection(&pool).unwrap();
        let rows: Vec<ClientAllocationDB> = client_allocation.load(&mut conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, "25");
        assert_eq!(rows[0].purchase_date.as_deref(), Some("2023-04-15"));
    }

    #[tokio::test]
    async fn test_duplicate_key_rolls_back_whole_load() {
        let (_dir, pool, repository) = setup().await;

        let good = vec![profile("Client_1", "Growth")];
        repository.replace_client_profiles(good).await.unwrap();

        let bad = vec![profile("Client_2", "Income"), profile("Client_2", "Growth")];
        assert!(repository.replace_client_profiles(bad).await.is_err());

        // The failed load must not have emptied the table.
        use crate::schema::client_profile::dsl::*;
        let mut conn = get_connection(&pool).unwrap();
        let clients: Vec<String> = client_profile.select(client).load(&mut conn).unwrap();
        assert_eq!(clients, vec!["Client_1"]);
    }

    #[tokio::test]
    async fn test_replace_weights_stores_percent_text() {
        let (_dir, pool, repository) = setup().await;

        let weights = vec![TargetWeight {
            client: "Client_1".to_string(),
            asset_class: "Stocks".to_string(),
            target_allocation_percent: dec!(42.5),
        }];
        repository.replace_target_weights(weights).await.unwrap();

        use crate::schema::target_allocation::dsl::*;
        let mut conn = get_connection(&pool).unwrap();
        let stored: Vec<String> = target_allocation
            .select(target_allocation_percent)
            .load(&mut conn)
            .unwrap();
        assert_eq!(stored, vec!["42.5"]);
    }
}
