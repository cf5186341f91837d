use async_trait::async_trait;
use tracing::{debug, error};

use crate::domain::{error::RosterError, ports::UploadSource};

/// Reads uploads from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSource;

#[async_trait]
impl UploadSource for LocalFileSource {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, RosterError> {
        debug!("Reading upload from {}", location);
        let bytes = tokio::fs::read(location).await.map_err(|e| {
            error!("Failed to read {}: {}", location, e);
            RosterError::Stream(format!("{}: {}", location, e))
        })?;
        debug!("Read {} bytes from {}", bytes.len(), location);
        Ok(bytes)
    }
}
