use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::domain::{
    error::RosterError,
    models::{Player, PlayerId},
    ports::PlayerStore,
    query::{PageRequest, PlayerPredicate, SortDirection, SortField, SortOrder},
};

#[derive(Default)]
struct State {
    next_id: i64,
    players: BTreeMap<PlayerId, Player>,
}

/// Process-local store. Evaluates predicates in memory and enforces the
/// identity uniqueness constraint on every write.
#[derive(Default)]
pub struct InMemoryPlayerStore {
    state: Mutex<State>,
}

impl InMemoryPlayerStore {
    pub fn new() -> Self {
        debug!("Initializing in-memory player store");
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, RosterError> {
        self.state
            .lock()
            .map_err(|_| RosterError::Internal("player store lock poisoned".to_string()))
    }
}

/// Array fields order by their smallest element ascending and by their
/// largest element descending.
fn set_key<'a, I>(values: I, direction: SortDirection) -> Option<&'a str>
where
    I: Iterator<Item = &'a str>,
{
    match direction {
        SortDirection::Asc => values.min(),
        SortDirection::Desc => values.max(),
    }
}

fn compare(a: &Player, b: &Player, order: SortOrder) -> Ordering {
    let dir = order.direction;
    let by_field = match order.field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::FirstName => a.first_name.cmp(&b.first_name),
        SortField::Height => a.height.total_cmp(&b.height),
        SortField::DateOfBirth => a.date_of_birth.cmp(&b.date_of_birth),
        SortField::Nationalities => {
            let a_key = set_key(a.nationalities.iter().map(String::as_str), dir);
            a_key.cmp(&set_key(b.nationalities.iter().map(String::as_str), dir))
        }
        SortField::Positions => {
            let a_key = set_key(a.positions.iter().map(|p| p.as_str()), dir);
            a_key.cmp(&set_key(b.positions.iter().map(|p| p.as_str()), dir))
        }
    };
    dir.apply(by_field).then_with(|| a.id.cmp(&b.id))
}

fn identity_taken(state: &State, candidate: &Player) -> bool {
    state.players.values().any(|existing| {
        existing.id != candidate.id
            && existing.has_identity(
                &candidate.first_name,
                &candidate.last_name,
                candidate.date_of_birth,
            )
    })
}

#[async_trait]
impl PlayerStore for InMemoryPlayerStore {
    async fn save(&self, player: Player) -> Result<Player, RosterError> {
        let mut state = self.lock()?;

        if identity_taken(&state, &player) {
            warn!("Unique identity violated by {} ({})", player.full_name(), player.date_of_birth);
            return Err(RosterError::Conflict(format!(
                "{} ({})",
                player.full_name(),
                player.date_of_birth
            )));
        }

        let now = Utc::now();
        let saved = match player.id {
            None => {
                state.next_id += 1;
                let id = PlayerId(state.next_id);
                Player {
                    id: Some(id),
                    created_at: Some(now),
                    last_modified_at: Some(now),
                    ..player
                }
            }
            Some(id) => {
                let existing = state.players.get(&id).ok_or(RosterError::NotFound(id))?;
                Player {
                    created_at: existing.created_at,
                    last_modified_at: Some(now),
                    ..player
                }
            }
        };

        if let Some(id) = saved.id {
            state.players.insert(id, saved.clone());
            debug!("Stored player {} in memory", id);
        }
        Ok(saved)
    }

    async fn find_by_id(&self, id: PlayerId) -> Result<Option<Player>, RosterError> {
        Ok(self.lock()?.players.get(&id).cloned())
    }

    async fn exists_by_name_and_dob(
        &self,
        first_name: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> Result<bool, RosterError> {
        Ok(self
            .lock()?
            .players
            .values()
            .any(|p| p.has_identity(first_name, last_name, date_of_birth)))
    }

    async fn delete_by_id(&self, id: PlayerId) -> Result<bool, RosterError> {
        Ok(self.lock()?.players.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<u64, RosterError> {
        let mut state = self.lock()?;
        let removed = state.players.len() as u64;
        state.players.clear();
        info!("Removed {} players from memory", removed);
        Ok(removed)
    }

    async fn find_all(&self) -> Result<Vec<Player>, RosterError> {
        Ok(self.lock()?.players.values().cloned().collect())
    }

    async fn query(
        &self,
        predicate: &PlayerPredicate,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<(Vec<Player>, u64), RosterError> {
        let state = self.lock()?;
        let mut matches: Vec<&Player> = state
            .players
            .values()
            .filter(|p| predicate.matches(p))
            .collect();
        matches.sort_by(|a, b| compare(a, b, order));

        let total = matches.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(page.size).unwrap_or(usize::MAX);
        let content = matches.into_iter().skip(offset).take(size).cloned().collect();

        debug!("In-memory query matched {} players", total);
        Ok((content, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::PlayerDraft;
    use crate::domain::query::{Clause, SortDirection};
    use std::collections::BTreeSet;

    fn player(first: &str, dob: (i32, u32, u32), height: f64, positions: &[&str]) -> Player {
        Player::from_draft(PlayerDraft {
            first_name: first.into(),
            last_name: "Test".into(),
            nationalities: BTreeSet::from(["ES".to_string()]),
            positions: positions.iter().map(|s| s.to_string()).collect(),
            date_of_birth: NaiveDate::from_ymd_opt(dob.0, dob.1, dob.2),
            height: Some(height),
        })
        .unwrap()
    }

    fn order(field: SortField, direction: SortDirection) -> SortOrder {
        SortOrder { field, direction }
    }

    #[tokio::test]
    async fn save_assigns_ids_and_timestamps() {
        let store = InMemoryPlayerStore::new();
        let first = store.save(player("Ana", (1990, 1, 1), 1.7, &["CB"])).await.unwrap();
        let second = store.save(player("Bea", (1991, 1, 1), 1.8, &["ST"])).await.unwrap();

        assert_eq!(first.id, Some(PlayerId(1)));
        assert_eq!(second.id, Some(PlayerId(2)));
        assert!(first.created_at.is_some());
        assert_eq!(first.created_at, first.last_modified_at);
    }

    #[tokio::test]
    async fn update_keeps_creation_time() {
        let store = InMemoryPlayerStore::new();
        let saved = store.save(player("Ana", (1990, 1, 1), 1.7, &["CB"])).await.unwrap();

        let forged = Player {
            height: 1.75,
            created_at: Some(Utc::now() + chrono::Duration::days(30)),
            ..saved.clone()
        };
        let updated = store.save(forged).await.unwrap();

        assert_eq!(updated.created_at, saved.created_at);
        assert!(updated.last_modified_at >= saved.last_modified_at);
        assert_eq!(updated.height, 1.75);
    }

    #[tokio::test]
    async fn rejects_duplicate_identity_regardless_of_case() {
        let store = InMemoryPlayerStore::new();
        store.save(player("Ana", (1990, 1, 1), 1.7, &["CB"])).await.unwrap();

        let mut twin = player("ANA", (1990, 1, 1), 1.9, &["ST"]);
        twin.last_name = "test".into();
        let err = store.save(twin).await.unwrap_err();
        assert!(matches!(err, RosterError::Conflict(_)));
    }

    #[tokio::test]
    async fn saving_unknown_id_is_not_found() {
        let store = InMemoryPlayerStore::new();
        let mut ghost = player("Ana", (1990, 1, 1), 1.7, &["CB"]);
        ghost.id = Some(PlayerId(99));
        assert!(matches!(store.save(ghost).await, Err(RosterError::NotFound(PlayerId(99)))));
    }

    #[tokio::test]
    async fn query_pages_and_counts() {
        let store = InMemoryPlayerStore::new();
        for (i, name) in ["Ana", "Bea", "Cai", "Dan", "Eli"].iter().enumerate() {
            store.save(player(name, (1990 + i as i32, 1, 1), 1.7, &["CB"])).await.unwrap();
        }

        let by_name = order(SortField::FirstName, SortDirection::Desc);
        let (page, total) = store
            .query(&PlayerPredicate::match_all(), by_name, PageRequest::new(1, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(total, 5);
        let names: Vec<&str> = page.iter().map(|p| p.first_name.as_str()).collect();
        assert_eq!(names, vec!["Cai", "Bea"]);

        let (beyond, total) = store
            .query(&PlayerPredicate::match_all(), by_name, PageRequest::new(9, 2).unwrap())
            .await
            .unwrap();
        assert!(beyond.is_empty());
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn query_applies_predicate_before_counting() {
        let store = InMemoryPlayerStore::new();
        store.save(player("Ana", (1990, 1, 1), 1.6, &["CB"])).await.unwrap();
        store.save(player("Bea", (1991, 1, 1), 1.9, &["ST", "CAM"])).await.unwrap();
        store.save(player("Cai", (1992, 1, 1), 1.8, &["ST"])).await.unwrap();

        let predicate = PlayerPredicate::match_all()
            .and(Clause::HasPosition("ST".into()))
            .and(Clause::HeightAtLeast(1.85));
        let (page, total) = store
            .query(&predicate, order(SortField::Id, SortDirection::Asc), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].first_name, "Bea");
    }

    #[tokio::test]
    async fn position_sort_uses_array_bounds() {
        let store = InMemoryPlayerStore::new();
        store.save(player("Ana", (1990, 1, 1), 1.7, &["CB", "ST"])).await.unwrap();
        store.save(player("Bea", (1991, 1, 1), 1.7, &["CM"])).await.unwrap();

        let all = PlayerPredicate::match_all();
        let by_positions = order(SortField::Positions, SortDirection::Asc);
        let (asc, _) = store
            .query(&all, by_positions, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(asc[0].first_name, "Ana");

        let by_positions = order(SortField::Positions, SortDirection::Desc);
        let (desc, _) = store
            .query(&all, by_positions, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(desc[0].first_name, "Ana");
        assert_eq!(desc[1].first_name, "Bea");
    }

    #[tokio::test]
    async fn delete_reports_removal() {
        let store = InMemoryPlayerStore::new();
        let saved = store.save(player("Ana", (1990, 1, 1), 1.7, &["CB"])).await.unwrap();
        let id = saved.id.unwrap();

        assert!(store.delete_by_id(id).await.unwrap());
        assert!(!store.delete_by_id(id).await.unwrap());
        assert_eq!(store.delete_all().await.unwrap(), 0);
    }
}
