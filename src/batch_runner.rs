use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{
    application::{bulk_upload::BulkUploader, player_service::PlayerService},
    config::{AppConfig, DatabaseType},
    domain::{
        error::RosterError,
        models::BulkUploadReport,
        ports::{PlayerStore, UploadSource},
        positions::verify_position_table,
    },
    infrastructure::{
        local_file::LocalFileSource, memory::player_store::InMemoryPlayerStore,
        mongodb::player_store::MongoPlayerStore,
    },
};

/// Result of uploading one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub location: String,
    pub result: Result<BulkUploadReport, RosterError>,
}

/// Wires the configured store and uploads CSV files one after another.
pub struct BatchRunner {
    uploader: BulkUploader,
    source: Arc<dyn UploadSource>,
}

impl BatchRunner {
    pub async fn new(config: &AppConfig) -> Result<Self, RosterError> {
        debug!("Initializing batch runner");
        verify_position_table()?;

        info!("Using database type: {:?}", config.database_type);
        let store: Arc<dyn PlayerStore> = match config.database_type {
            DatabaseType::Memory => Arc::new(InMemoryPlayerStore::new()),
            DatabaseType::Mongodb => {
                info!(
                    "MongoDB URI: {}, Database: {}, Collection: {}",
                    config.mongodb_uri, config.mongodb_database, config.players_collection
                );
                Arc::new(
                    MongoPlayerStore::connect(
                        &config.mongodb_uri,
                        &config.mongodb_database,
                        &config.players_collection,
                    )
                    .await?,
                )
            }
        };

        Ok(Self::with_store(store, Arc::new(LocalFileSource), config.bulk_upload_max_rows))
    }

    pub fn with_store(
        store: Arc<dyn PlayerStore>,
        source: Arc<dyn UploadSource>,
        max_rows: Option<usize>,
    ) -> Self {
        let players = Arc::new(PlayerService::with_defaults(store));
        Self {
            uploader: BulkUploader::new(players, max_rows),
            source,
        }
    }

    /// Uploads every location in order. A failing file is logged and the
    /// runner moves on.
    pub async fn run(&self, locations: &[String]) -> Vec<FileOutcome> {
        info!("Processing {} upload(s)", locations.len());
        let mut outcomes = Vec::with_capacity(locations.len());

        for (i, location) in locations.iter().enumerate() {
            debug!("Processing upload {} of {}: {}", i + 1, locations.len(), location);
            let result = self.uploader.upload_from(self.source.as_ref(), location).await;

            match &result {
                Ok(report) => info!(
                    "Processed {}: {} created, {} failed",
                    location,
                    report.successfully_created.len(),
                    report.failed_to_create.len()
                ),
                Err(e) => error!("Failed to process {}: {}", location, e),
            }

            outcomes.push(FileOutcome {
                location: location.clone(),
                result,
            });
        }

        outcomes
    }
}
