mod sqlite;

pub use sqlite::{MirrorRecord, SqliteStorage};
