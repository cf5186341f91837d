pub mod local_file;
pub mod memory;
pub mod mongodb;
pub mod parsers;
