#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use player_roster::{
    application::player_service::PlayerService,
    domain::{models::PlayerDraft, ports::Clock, validation::ConstraintValidator},
    infrastructure::memory::player_store::InMemoryPlayerStore,
};

pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn today() -> NaiveDate {
    date(2024, 5, 10)
}

pub fn service() -> PlayerService {
    PlayerService::new(
        Arc::new(InMemoryPlayerStore::new()),
        Arc::new(ConstraintValidator),
        Arc::new(FixedClock(today())),
    )
}

pub fn draft(
    first: &str,
    last: &str,
    dob: NaiveDate,
    height: f64,
    nationalities: &[&str],
    positions: &[&str],
) -> PlayerDraft {
    PlayerDraft {
        first_name: first.to_string(),
        last_name: last.to_string(),
        nationalities: nationalities.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        positions: positions.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        date_of_birth: Some(dob),
        height: Some(height),
    }
}

pub fn messi() -> PlayerDraft {
    draft("Lionel", "Messi", date(1987, 6, 24), 1.70, &["Argentina"], &["ST", "CAM"])
}
