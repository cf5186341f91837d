pub mod bulk_upload;
pub mod pagination;
pub mod player_service;
