use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    error::RosterError,
    models::{Player, PlayerId},
    query::{PageRequest, PlayerPredicate, SortOrder},
};

/// Durable player storage. Implementations assign identifiers, stamp
/// timestamps and enforce the (first name, last name, date of birth)
/// uniqueness constraint, reporting a violation as `RosterError::Conflict`.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Inserts when `player.id` is `None`, otherwise replaces the stored
    /// record with that id while keeping its creation time.
    async fn save(&self, player: Player) -> Result<Player, RosterError>;

    async fn find_by_id(&self, id: PlayerId) -> Result<Option<Player>, RosterError>;

    /// Names are compared case-insensitively.
    async fn exists_by_name_and_dob(
        &self,
        first_name: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> Result<bool, RosterError>;

    /// Returns whether a record was removed.
    async fn delete_by_id(&self, id: PlayerId) -> Result<bool, RosterError>;

    async fn delete_all(&self) -> Result<u64, RosterError>;

    async fn find_all(&self) -> Result<Vec<Player>, RosterError>;

    /// One page of matching players plus the total number of matches.
    async fn query(
        &self,
        predicate: &PlayerPredicate,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<(Vec<Player>, u64), RosterError>;
}

#[async_trait]
pub trait UploadSource: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, RosterError>;
}

/// Source of "today" for age filters and birth date checks.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
