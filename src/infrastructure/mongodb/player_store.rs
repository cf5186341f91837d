use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{self, doc, Document},
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::domain::{
    error::RosterError,
    models::{Player, PlayerId},
    ports::PlayerStore,
    positions::PositionCode,
    query::{Clause, PageRequest, PlayerPredicate, SortDirection, SortField, SortOrder},
};

const COUNTERS_COLLECTION: &str = "counters";
const IDENTITY_INDEX: &str = "player_identity";
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlayerDocument {
    #[serde(rename = "_id")]
    id: i64,
    first_name: String,
    last_name: String,
    first_name_key: String,
    last_name_key: String,
    nationalities: Vec<String>,
    positions: Vec<PositionCode>,
    date_of_birth: NaiveDate,
    height: f64,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
}

impl PlayerDocument {
    fn from_player(
        id: PlayerId,
        player: &Player,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.0,
            first_name: player.first_name.clone(),
            last_name: player.last_name.clone(),
            first_name_key: player.first_name.to_lowercase(),
            last_name_key: player.last_name.to_lowercase(),
            nationalities: player.nationalities.iter().cloned().collect(),
            positions: player.positions.iter().copied().collect(),
            date_of_birth: player.date_of_birth,
            height: player.height,
            created_at,
            last_modified_at: now,
        }
    }

    fn into_player(self) -> Player {
        Player {
            id: Some(PlayerId(self.id)),
            first_name: self.first_name,
            last_name: self.last_name,
            nationalities: self.nationalities.into_iter().collect(),
            positions: self.positions.into_iter().collect(),
            date_of_birth: self.date_of_birth,
            height: self.height,
            created_at: Some(self.created_at),
            last_modified_at: Some(self.last_modified_at),
        }
    }
}

/// Native filter for a single clause. Dates are stored as ISO strings, so
/// range comparisons on them are lexicographic.
pub fn clause_filter(clause: &Clause) -> Document {
    match clause {
        Clause::NameContains(needle) => doc! {
            "$expr": {
                "$regexMatch": {
                    "input": { "$concat": ["$first_name", " ", "$last_name"] },
                    "regex": regex::escape(needle),
                    "options": "i"
                }
            }
        },
        Clause::HasNationality(code) => doc! { "nationalities": code.as_str() },
        Clause::HasPosition(code) => doc! { "positions": code.as_str() },
        Clause::BornOnOrBefore(date) => doc! { "date_of_birth": { "$lte": date.to_string() } },
        Clause::BornOnOrAfter(date) => doc! { "date_of_birth": { "$gte": date.to_string() } },
        Clause::HeightAtLeast(min) => doc! { "height": { "$gte": *min } },
        Clause::HeightAtMost(max) => doc! { "height": { "$lte": *max } },
    }
}

pub fn predicate_filter(predicate: &PlayerPredicate) -> Document {
    if predicate.is_empty() {
        return doc! {};
    }
    let clauses: Vec<Document> = predicate.clauses.iter().map(clause_filter).collect();
    doc! { "$and": clauses }
}

pub fn sort_document(order: SortOrder) -> Document {
    let field = match order.field {
        SortField::Id => "_id",
        SortField::FirstName => "first_name",
        SortField::Nationalities => "nationalities",
        SortField::Positions => "positions",
        SortField::Height => "height",
        SortField::DateOfBirth => "date_of_birth",
    };
    let value = match order.direction {
        SortDirection::Asc => 1,
        SortDirection::Desc => -1,
    };

    let mut sort = Document::new();
    sort.insert(field, value);
    if field != "_id" {
        sort.insert("_id", 1);
    }
    sort
}

fn identity_filter(first_name: &str, last_name: &str, date_of_birth: NaiveDate) -> Document {
    doc! {
        "first_name_key": first_name.to_lowercase(),
        "last_name_key": last_name.to_lowercase(),
        "date_of_birth": date_of_birth.to_string()
    }
}

/// Unique index violations surface either as a write error (inserts) or as
/// a command error (find-and-modify style writes).
fn is_duplicate_key(kind: &ErrorKind) -> bool {
    match kind {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn write_error(player: &Player, err: mongodb::error::Error) -> RosterError {
    if is_duplicate_key(err.kind.as_ref()) {
        warn!("Unique identity index rejected {} ({})", player.full_name(), player.date_of_birth);
        RosterError::Conflict(format!("{} ({})", player.full_name(), player.date_of_birth))
    } else {
        error!("Failed to write player {}: {}", player.full_name(), err);
        RosterError::Database(err.to_string())
    }
}

pub struct MongoPlayerStore {
    players: Collection<PlayerDocument>,
    counters: Collection<Document>,
    collection_name: String,
}

impl MongoPlayerStore {
    pub fn new(client: &Client, database: &str, collection: &str) -> Self {
        debug!("Initializing MongoDB player store for {}.{}", database, collection);
        let db = client.database(database);
        Self {
            players: db.collection(collection),
            counters: db.collection(COUNTERS_COLLECTION),
            collection_name: collection.to_string(),
        }
    }

    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, RosterError> {
        debug!("Connecting to MongoDB");
        let client = Client::with_uri_str(uri).await.map_err(|e| {
            error!("Failed to connect to MongoDB: {}", e);
            RosterError::Database(e.to_string())
        })?;
        let store = Self::new(&client, database, collection);
        store.ensure_indexes().await?;
        Ok(store)
    }

    /// Creates the unique index backing the identity constraint.
    pub async fn ensure_indexes(&self) -> Result<(), RosterError> {
        let index = IndexModel::builder()
            .keys(doc! { "first_name_key": 1, "last_name_key": 1, "date_of_birth": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(IDENTITY_INDEX.to_string())
                    .build(),
            )
            .build();
        self.players.create_index(index, None).await?;
        info!("Ensured index {} on {}", IDENTITY_INDEX, self.collection_name);
        Ok(())
    }

    async fn next_id(&self) -> Result<PlayerId, RosterError> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let counter = self
            .counters
            .find_one_and_update(
                doc! { "_id": self.collection_name.as_str() },
                doc! { "$inc": { "seq": 1_i64 } },
                options,
            )
            .await?
            .ok_or_else(|| RosterError::Database("id counter was not returned".to_string()))?;

        counter
            .get_i64("seq")
            .map(PlayerId)
            .map_err(|e| RosterError::Database(e.to_string()))
    }

    async fn insert(&self, player: Player) -> Result<Player, RosterError> {
        let id = self.next_id().await?;
        let now = Utc::now();
        let document = PlayerDocument::from_player(id, &player, now, now);

        self.players
            .insert_one(&document, None)
            .await
            .map_err(|e| write_error(&player, e))?;

        info!("Inserted player {} into {}", id, self.collection_name);
        Ok(document.into_player())
    }

    async fn update(&self, id: PlayerId, player: Player) -> Result<Player, RosterError> {
        let now = Utc::now();
        let mut fields = bson::to_document(&PlayerDocument::from_player(id, &player, now, now))
            .map_err(|e| RosterError::Internal(e.to_string()))?;
        fields.remove("_id");
        fields.remove("created_at");

        let result = self
            .players
            .update_one(doc! { "_id": id.0 }, doc! { "$set": fields }, None)
            .await
            .map_err(|e| write_error(&player, e))?;
        if result.matched_count == 0 {
            return Err(RosterError::NotFound(id));
        }

        debug!("Updated player {} in {}", id, self.collection_name);
        self.find_by_id(id).await?.ok_or(RosterError::NotFound(id))
    }
}

#[async_trait]
impl PlayerStore for MongoPlayerStore {
    async fn save(&self, player: Player) -> Result<Player, RosterError> {
        match player.id {
            None => self.insert(player).await,
            Some(id) => self.update(id, player).await,
        }
    }

    async fn find_by_id(&self, id: PlayerId) -> Result<Option<Player>, RosterError> {
        let found = self.players.find_one(doc! { "_id": id.0 }, None).await?;
        Ok(found.map(PlayerDocument::into_player))
    }

    async fn exists_by_name_and_dob(
        &self,
        first_name: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> Result<bool, RosterError> {
        let count = self
            .players
            .count_documents(identity_filter(first_name, last_name, date_of_birth), None)
            .await?;
        Ok(count > 0)
    }

    async fn delete_by_id(&self, id: PlayerId) -> Result<bool, RosterError> {
        let result = self.players.delete_one(doc! { "_id": id.0 }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_all(&self) -> Result<u64, RosterError> {
        let result = self.players.delete_many(doc! {}, None).await?;
        info!("Removed {} players from {}", result.deleted_count, self.collection_name);
        Ok(result.deleted_count)
    }

    async fn find_all(&self) -> Result<Vec<Player>, RosterError> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let documents: Vec<PlayerDocument> = self
            .players
            .find(doc! {}, options)
            .await?
            .try_collect()
            .await?;
        Ok(documents.into_iter().map(PlayerDocument::into_player).collect())
    }

    async fn query(
        &self,
        predicate: &PlayerPredicate,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<(Vec<Player>, u64), RosterError> {
        let filter = predicate_filter(predicate);
        debug!("Querying {} with filter {}", self.collection_name, filter);

        let total = self.players.count_documents(filter.clone(), None).await?;

        let options = FindOptions::builder()
            .sort(sort_document(order))
            .skip(page.offset())
            .limit(i64::try_from(page.size).unwrap_or(i64::MAX))
            .build();
        let documents: Vec<PlayerDocument> =
            self.players.find(filter, options).await?.try_collect().await?;

        debug!("Query returned {} of {} matching players", documents.len(), total);
        Ok((documents.into_iter().map(PlayerDocument::into_player).collect(), total))
    }
}
