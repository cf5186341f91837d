use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{error::RosterError, positions::PositionCode};

/// Store-assigned player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player as held by the service. `id` and the timestamps stay `None`
/// until the store has persisted the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Option<PlayerId>,
    pub first_name: String,
    pub last_name: String,
    pub nationalities: BTreeSet<String>,
    pub positions: BTreeSet<PositionCode>,
    pub date_of_birth: NaiveDate,
    /// Meters.
    pub height: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl Player {
    /// Builds an unsaved player from a draft that already passed validation.
    pub fn from_draft(draft: PlayerDraft) -> Result<Self, RosterError> {
        let date_of_birth = draft.date_of_birth.ok_or_else(|| {
            RosterError::Validation("Date of birth must be in the past".to_string())
        })?;
        let height = draft
            .height
            .ok_or_else(|| RosterError::Validation("Height must be provided".to_string()))?;
        let positions = draft
            .positions
            .iter()
            .map(|code| code.parse::<PositionCode>())
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self {
            id: None,
            first_name: draft.first_name,
            last_name: draft.last_name,
            nationalities: draft.nationalities,
            positions,
            date_of_birth,
            height,
            created_at: None,
            last_modified_at: None,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Completed years on `today`.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        today.years_since(self.date_of_birth).unwrap_or(0)
    }

    pub fn to_draft(&self) -> PlayerDraft {
        PlayerDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            nationalities: self.nationalities.clone(),
            positions: self.positions.iter().map(|code| code.as_str().to_string()).collect(),
            date_of_birth: Some(self.date_of_birth),
            height: Some(self.height),
        }
    }

    /// New draft carrying this player's values with `update` applied on top.
    pub fn with_changes(&self, update: &PlayerUpdate) -> PlayerDraft {
        let current = self.to_draft();
        PlayerDraft {
            first_name: update
                .first_name
                .as_deref()
                .map(|name| name.trim().to_string())
                .unwrap_or(current.first_name),
            last_name: update
                .last_name
                .as_deref()
                .map(|name| name.trim().to_string())
                .unwrap_or(current.last_name),
            nationalities: update.nationalities.clone().unwrap_or(current.nationalities),
            positions: update
                .positions
                .as_ref()
                .map(|codes| codes.iter().map(|code| code.trim().to_uppercase()).collect())
                .unwrap_or(current.positions),
            date_of_birth: update.date_of_birth.or(current.date_of_birth),
            height: update.height.or(current.height),
        }
    }

    /// Identity tuple comparison, names case-insensitive.
    pub fn has_identity(
        &self,
        first_name: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> bool {
        self.date_of_birth == date_of_birth
            && self.first_name.to_lowercase() == first_name.to_lowercase()
            && self.last_name.to_lowercase() == last_name.to_lowercase()
    }
}

/// Candidate player as submitted by a caller or parsed from an upload row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDraft {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub nationalities: BTreeSet<String>,
    #[serde(default)]
    pub positions: BTreeSet<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub height: Option<f64>,
}

impl PlayerDraft {
    pub fn trimmed(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self
    }
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nationalities: Option<BTreeSet<String>>,
    pub positions: Option<BTreeSet<String>>,
    pub date_of_birth: Option<NaiveDate>,
    pub height: Option<f64>,
}

/// Outcome of one bulk upload, keyed by 1-based line numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUploadReport {
    pub successfully_created: Vec<u64>,
    pub failed_to_create: Vec<u64>,
}

impl BulkUploadReport {
    pub fn record_success(&mut self, line: u64) {
        self.successfully_created.push(line);
    }

    pub fn record_failure(&mut self, line: u64) {
        self.failed_to_create.push(line);
    }

    pub fn rows_seen(&self) -> usize {
        self.successfully_created.len() + self.failed_to_create.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messi() -> Player {
        Player::from_draft(PlayerDraft {
            first_name: "Lionel".into(),
            last_name: "Messi".into(),
            nationalities: BTreeSet::from(["Argentina".to_string()]),
            positions: BTreeSet::from(["st".to_string(), "CAM".to_string()]),
            date_of_birth: NaiveDate::from_ymd_opt(1987, 6, 24),
            height: Some(1.70),
        })
        .unwrap()
    }

    #[test]
    fn draft_positions_resolve_case_insensitively() {
        let player = messi();
        assert!(player.positions.contains(&PositionCode::St));
        assert!(player.positions.contains(&PositionCode::Cam));
        assert_eq!(player.id, None);
        assert_eq!(player.full_name(), "Lionel Messi");
    }

    #[test]
    fn age_accounts_for_birthday_not_yet_reached() {
        let player = messi();
        assert_eq!(player.age_on(NaiveDate::from_ymd_opt(2024, 6, 23).unwrap()), 36);
        assert_eq!(player.age_on(NaiveDate::from_ymd_opt(2024, 6, 24).unwrap()), 37);
    }

    #[test]
    fn with_changes_builds_a_new_value() {
        let player = messi();
        let update = PlayerUpdate {
            first_name: Some("  Leo ".into()),
            positions: Some(BTreeSet::from(["rw".to_string()])),
            ..Default::default()
        };

        let draft = player.with_changes(&update);

        assert_eq!(draft.first_name, "Leo");
        assert_eq!(draft.last_name, "Messi");
        assert_eq!(draft.positions, BTreeSet::from(["RW".to_string()]));
        assert_eq!(draft.nationalities, player.nationalities);
        assert_eq!(player.first_name, "Lionel");
    }

    #[test]
    fn identity_ignores_name_case() {
        let player = messi();
        let dob = NaiveDate::from_ymd_opt(1987, 6, 24).unwrap();
        assert!(player.has_identity("LIONEL", "messi", dob));
        assert!(!player.has_identity("Lionel", "Messi", dob.succ_opt().unwrap()));
    }

    #[test]
    fn report_serializes_with_bucket_names() {
        let mut report = BulkUploadReport::default();
        report.record_success(2);
        report.record_failure(3);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({"successfully_created": [2], "failed_to_create": [3]}));
        assert_eq!(report.rows_seen(), 2);
    }
}
