pub mod file_store;
pub mod json_store;
pub mod kv;

pub use file_store::{FileStore, store_path};
pub use kv::{KeyValueStore, MemoryStore};
