pub mod backup;
pub mod feedback;
pub mod persistence;
pub mod planner;
pub mod pool;
pub mod storage;
pub mod store;
pub mod types;
pub mod week_key;

pub use backup::{backup_file_name, Backup, BackupError};
pub use feedback::{Feedback, SilentFeedback, TerminalBell};
pub use persistence::{spawn_scheduler, SaveHandle, SaveStatus, DEFAULT_DEBOUNCE};
pub use planner::*;
pub use pool::TodoPool;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::WeekStore;
pub use types::*;
pub use week_key::WeekInfo;
