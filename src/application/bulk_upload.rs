use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::application::player_service::PlayerService;
use crate::domain::{
    error::{RosterError, RowError},
    models::{BulkUploadReport, PlayerDraft, PlayerId},
    ports::UploadSource,
    validation::Violation,
};
use crate::infrastructure::parsers::csv_parser::{CsvRow, PlayerCsvReader};

/// Why a single upload row was not created.
#[derive(Debug, Error)]
pub enum RowFailure {
    #[error("parse error: {0}")]
    Parse(#[from] RowError),

    #[error("invalid row: {}", join_violations(.0))]
    Invalid(Vec<Violation>),

    #[error("row rejected: {0}")]
    Rejected(RosterError),

    #[error("row limit of {0} reached")]
    OverLimit(usize),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Pass/fail result of checking a parsed row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowVerdict {
    Valid,
    Invalid(Vec<Violation>),
}

/// Drives a CSV upload row by row: parse, validate, duplicate-checked create.
/// Row problems are classified by line number; only stream problems abort.
pub struct BulkUploader {
    players: Arc<PlayerService>,
    max_rows: Option<usize>,
}

impl BulkUploader {
    pub fn new(players: Arc<PlayerService>, max_rows: Option<usize>) -> Self {
        Self { players, max_rows }
    }

    pub async fn upload_from(
        &self,
        source: &dyn UploadSource,
        location: &str,
    ) -> Result<BulkUploadReport, RosterError> {
        info!("Starting bulk upload from {}", location);
        let bytes = source.fetch(location).await?;
        self.upload(&bytes).await
    }

    pub async fn upload(&self, bytes: &[u8]) -> Result<BulkUploadReport, RosterError> {
        if bytes.is_empty() {
            error!("Rejected bulk upload: file is empty");
            return Err(RosterError::EmptyUpload);
        }
        debug!("Bulk upload of {} bytes", bytes.len());

        let reader = PlayerCsvReader::new(bytes)?;
        let mut report = BulkUploadReport::default();
        let mut processed = 0usize;

        for row in reader {
            let row = row?;
            let line = row.line;

            let outcome = match self.max_rows {
                Some(limit) if processed >= limit => Err(RowFailure::OverLimit(limit)),
                _ => {
                    processed += 1;
                    self.process_row(row).await
                }
            };

            match outcome {
                Ok(id) => {
                    debug!("Line {} created player {}", line, id);
                    report.record_success(line);
                }
                Err(failure) => {
                    warn!("Failed to process line {}: {}", line, failure);
                    report.record_failure(line);
                }
            }
        }

        info!(
            "Bulk upload finished: {} created, {} failed",
            report.successfully_created.len(),
            report.failed_to_create.len()
        );
        Ok(report)
    }

    /// Same invariants as single-record creation, as a verdict.
    pub fn validate_row(&self, draft: &PlayerDraft) -> RowVerdict {
        let violations = self.players.check(draft);
        if violations.is_empty() {
            RowVerdict::Valid
        } else {
            RowVerdict::Invalid(violations)
        }
    }

    async fn process_row(&self, row: CsvRow) -> Result<PlayerId, RowFailure> {
        let draft = row.draft?;

        if let RowVerdict::Invalid(violations) = self.validate_row(&draft) {
            return Err(RowFailure::Invalid(violations));
        }

        let created = self.players.create_player(draft).await.map_err(RowFailure::Rejected)?;
        created.id.ok_or_else(|| {
            RowFailure::Rejected(RosterError::Internal("store returned no id".to_string()))
        })
    }
}
