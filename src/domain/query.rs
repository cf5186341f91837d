//! Listing query model: filter criteria, the predicate built from them,
//! sort resolution and paging types.
//!
//! The predicate is a plain list of clauses joined by logical AND. Store
//! adapters either evaluate it in-process through [`PlayerPredicate::matches`]
//! or translate each [`Clause`] into their own filter syntax.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{error::RosterError, models::Player};

/// Optional listing filters; every `None` matches all players.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerFilter {
    pub name: Option<String>,
    pub nationalities: Option<Vec<String>>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub positions: Option<Vec<String>>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Lower-cased needle matched against lower-cased "first last".
    NameContains(String),
    HasNationality(String),
    /// Upper-cased position code.
    HasPosition(String),
    BornOnOrBefore(NaiveDate),
    BornOnOrAfter(NaiveDate),
    HeightAtLeast(f64),
    HeightAtMost(f64),
}

impl Clause {
    pub fn matches(&self, player: &Player) -> bool {
        match self {
            Clause::NameContains(needle) => {
                player.full_name().to_lowercase().contains(needle.as_str())
            }
            Clause::HasNationality(code) => player.nationalities.contains(code),
            Clause::HasPosition(code) => player.positions.iter().any(|p| p.as_str() == code),
            Clause::BornOnOrBefore(date) => player.date_of_birth <= *date,
            Clause::BornOnOrAfter(date) => player.date_of_birth >= *date,
            Clause::HeightAtLeast(min) => player.height >= *min,
            Clause::HeightAtMost(max) => player.height <= *max,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerPredicate {
    pub clauses: Vec<Clause>,
}

impl PlayerPredicate {
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, player: &Player) -> bool {
        self.clauses.iter().all(|clause| clause.matches(player))
    }
}

/// Latest birth date for someone who is at least `years` old on `today`.
fn latest_birth_date(today: NaiveDate, years: u32) -> NaiveDate {
    years
        .checked_mul(12)
        .and_then(|months| today.checked_sub_months(Months::new(months)))
        .unwrap_or(NaiveDate::MIN)
}

/// Earliest birth date for someone who is at most `years` old on `today`:
/// turning `years + 1` tomorrow still counts.
fn earliest_birth_date(today: NaiveDate, years: u32) -> NaiveDate {
    years
        .checked_add(1)
        .map(|next| latest_birth_date(today, next))
        .and_then(|date| date.checked_add_days(Days::new(1)))
        .unwrap_or(NaiveDate::MIN)
}

/// Turns listing filters into a conjunction of clauses evaluated on `today`.
pub fn build_predicate(filter: &PlayerFilter, today: NaiveDate) -> PlayerPredicate {
    let mut predicate = PlayerPredicate::match_all();

    // Blank means no filter; otherwise the needle is matched as given.
    if let Some(name) = filter.name.as_deref().filter(|n| !n.trim().is_empty()) {
        predicate = predicate.and(Clause::NameContains(name.to_lowercase()));
    }

    // Intersection: one clause per requested nationality.
    for nationality in filter.nationalities.iter().flatten() {
        let nationality = nationality.trim();
        if !nationality.is_empty() {
            predicate = predicate.and(Clause::HasNationality(nationality.to_string()));
        }
    }

    if let Some(min_age) = filter.min_age {
        predicate = predicate.and(Clause::BornOnOrBefore(latest_birth_date(today, min_age)));
    }
    if let Some(max_age) = filter.max_age {
        predicate = predicate.and(Clause::BornOnOrAfter(earliest_birth_date(today, max_age)));
    }

    for position in filter.positions.iter().flatten() {
        let position = position.trim();
        if !position.is_empty() {
            predicate = predicate.and(Clause::HasPosition(position.to_uppercase()));
        }
    }

    if let Some(min_height) = filter.min_height {
        predicate = predicate.and(Clause::HeightAtLeast(min_height));
    }
    if let Some(max_height) = filter.max_height {
        predicate = predicate.and(Clause::HeightAtMost(max_height));
    }

    predicate
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortKey {
    Name,
    Nationality,
    Age,
    Positions,
    Height,
}

impl FromStr for SortKey {
    type Err = RosterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "NAME" => Ok(SortKey::Name),
            "NATIONALITY" => Ok(SortKey::Nationality),
            "AGE" => Ok(SortKey::Age),
            "POSITIONS" => Ok(SortKey::Positions),
            "HEIGHT" => Ok(SortKey::Height),
            other => Err(RosterError::Validation(format!("Unknown sort key: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// "desc" in any case is descending, anything else ascending.
    pub fn parse_lenient(order: Option<&str>) -> Self {
        match order {
            Some(order) if order.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Concrete stored field a listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Id,
    FirstName,
    Nationalities,
    Positions,
    Height,
    DateOfBirth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Maps a sort key and direction to a stored field ordering. Age sorts on
/// date of birth with the direction flipped: younger means born later.
pub fn resolve_sort(key: Option<SortKey>, direction: SortDirection) -> SortOrder {
    let (field, direction) = match key {
        Some(SortKey::Name) => (SortField::FirstName, direction),
        Some(SortKey::Nationality) => (SortField::Nationalities, direction),
        Some(SortKey::Positions) => (SortField::Positions, direction),
        Some(SortKey::Height) => (SortField::Height, direction),
        Some(SortKey::Age) => (SortField::DateOfBirth, direction.reversed()),
        None => (SortField::Id, direction),
    };
    SortOrder { field, direction }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> Result<Self, RosterError> {
        if size == 0 {
            return Err(RosterError::Validation("Page size must be at least 1".to_string()));
        }
        Ok(Self { page, size })
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub page: u64,
    pub size: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size)
    }

    pub fn is_last(&self) -> bool {
        self.page.saturating_add(1) >= self.total_pages()
    }
}
