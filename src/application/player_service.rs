use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::pagination::fetch_page;
use crate::domain::{
    error::RosterError,
    models::{Player, PlayerDraft, PlayerId, PlayerUpdate},
    ports::{Clock, PlayerStore, SystemClock},
    query::{build_predicate, resolve_sort, Page, PageRequest, PlayerFilter, SortDirection, SortKey},
    validation::{self, ConstraintValidator, PlayerValidator, Violation},
};

/// Owns the player lifecycle on top of a [`PlayerStore`].
pub struct PlayerService {
    store: Arc<dyn PlayerStore>,
    validator: Arc<dyn PlayerValidator>,
    clock: Arc<dyn Clock>,
}

impl PlayerService {
    pub fn new(
        store: Arc<dyn PlayerStore>,
        validator: Arc<dyn PlayerValidator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            validator,
            clock,
        }
    }

    /// Service with the standard field constraints and the system date.
    pub fn with_defaults(store: Arc<dyn PlayerStore>) -> Self {
        Self::new(store, Arc::new(ConstraintValidator), Arc::new(SystemClock))
    }

    /// Field-level violations for a candidate, evaluated against today.
    pub fn check(&self, draft: &PlayerDraft) -> Vec<Violation> {
        self.validator.validate(draft, self.clock.today())
    }

    pub async fn create_player(&self, draft: PlayerDraft) -> Result<Player, RosterError> {
        let draft = draft.trimmed();
        info!("Attempting to create player: {} {}", draft.first_name, draft.last_name);

        if let Some(err) = validation::into_error(&self.check(&draft)) {
            warn!("Rejected player {} {}: {}", draft.first_name, draft.last_name, err);
            return Err(err);
        }
        let player = Player::from_draft(draft)?;

        let exists = self
            .store
            .exists_by_name_and_dob(&player.first_name, &player.last_name, player.date_of_birth)
            .await?;
        if exists {
            warn!(
                "Duplicate player detected: {} ({})",
                player.full_name(),
                player.date_of_birth
            );
            return Err(RosterError::Conflict(format!(
                "{} ({})",
                player.full_name(),
                player.date_of_birth
            )));
        }

        let saved = self.store.save(player).await?;
        if let Some(id) = saved.id {
            info!("Player created with ID: {}", id);
        }
        Ok(saved)
    }

    pub async fn update_player(
        &self,
        id: PlayerId,
        update: PlayerUpdate,
    ) -> Result<Player, RosterError> {
        info!("Updating player with ID: {}", id);

        let existing = self.store.find_by_id(id).await?.ok_or_else(|| {
            warn!("Player not found for update: {}", id);
            RosterError::NotFound(id)
        })?;

        let draft = existing.with_changes(&update);
        if let Some(err) = validation::into_error(&self.check(&draft)) {
            warn!("Player {} is not valid after changes: {}", id, err);
            return Err(err);
        }

        let candidate = Player {
            id: existing.id,
            created_at: existing.created_at,
            last_modified_at: existing.last_modified_at,
            ..Player::from_draft(draft)?
        };

        let identity_changed = !existing.has_identity(
            &candidate.first_name,
            &candidate.last_name,
            candidate.date_of_birth,
        );
        if identity_changed {
            let taken = self
                .store
                .exists_by_name_and_dob(
                    &candidate.first_name,
                    &candidate.last_name,
                    candidate.date_of_birth,
                )
                .await?;
            if taken {
                warn!("Update of {} collides with an existing player", id);
                return Err(RosterError::Conflict(format!(
                    "{} ({})",
                    candidate.full_name(),
                    candidate.date_of_birth
                )));
            }
        }

        debug!("Saving updated player {}", id);
        self.store.save(candidate).await
    }

    pub async fn delete_player(&self, id: PlayerId) -> Result<(), RosterError> {
        info!("Deleting player with ID: {}", id);
        if self.store.delete_by_id(id).await? {
            Ok(())
        } else {
            warn!("Player not found for delete: {}", id);
            Err(RosterError::NotFound(id))
        }
    }

    pub async fn get_player(&self, id: PlayerId) -> Result<Player, RosterError> {
        info!("Fetching player by ID: {}", id);
        self.store.find_by_id(id).await?.ok_or_else(|| {
            warn!("Player not found: {}", id);
            RosterError::NotFound(id)
        })
    }

    /// Filtered, sorted and paginated listing.
    pub async fn list_players(
        &self,
        filter: &PlayerFilter,
        sort: Option<SortKey>,
        direction: SortDirection,
        page: PageRequest,
    ) -> Result<Page<Player>, RosterError> {
        if page.size == 0 {
            return Err(RosterError::Validation("Page size must be at least 1".to_string()));
        }

        let predicate = build_predicate(filter, self.clock.today());
        let order = resolve_sort(sort, direction);
        let result = fetch_page(self.store.as_ref(), &predicate, order, page).await?;

        info!(
            "Listed {} of {} matching players (page {} of {}, last: {})",
            result.content.len(),
            result.total_elements,
            result.page,
            result.total_pages(),
            result.is_last()
        );
        Ok(result)
    }

    pub async fn get_all(&self) -> Result<Vec<Player>, RosterError> {
        info!("Fetching all players");
        self.store.find_all().await
    }

    pub async fn delete_all(&self) -> Result<u64, RosterError> {
        warn!("Deleting all players");
        self.store.delete_all().await
    }
}
