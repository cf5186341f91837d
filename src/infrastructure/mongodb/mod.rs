pub mod player_store;
