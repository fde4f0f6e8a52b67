pub mod storage;
pub use storage::{Collection, Storage, StorageError};
pub mod memory_storage;
pub use memory_storage::MemoryStorage;
pub mod file_storage;
pub use file_storage::FileStorage;
pub mod pg_storage;
pub use pg_storage::PgStorage;

pub mod record;
pub use record::{Patchable, Record};
pub mod record_store;
pub use record_store::{ImportError, RecordStore};
pub mod populate;
pub use populate::Populate;
