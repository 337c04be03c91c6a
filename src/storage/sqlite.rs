use crate::filter::PublishMap;
use crate::model::StorageError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

/// Last publish map written for one mirror location.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorRecord {
    pub name: String,
    pub entries: PublishMap,
    pub updated_at: DateTime<Utc>,
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database and creates the mirror table if needed.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS publish_mirror (
                name TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(Self { conn })
    }

    /// Replaces whatever was stored under `name` with `entries`.
    pub fn replace_mirror(
        &self,
        name: &str,
        entries: &PublishMap,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let payload = serde_json::to_string(entries)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO publish_mirror (name, payload, updated_at)
             VALUES (?1, ?2, ?3)",
            params![name, payload, updated_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn load_mirror(&self, name: &str) -> Result<Option<MirrorRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, payload, updated_at FROM publish_mirror WHERE name = ?1",
        )?;

        let mut rows = stmt.query(params![name])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::map_record(row)?)),
            None => Ok(None),
        }
    }

    /// All mirrors, ordered by name.
    pub fn all_mirrors(&self) -> Result<Vec<MirrorRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, payload, updated_at FROM publish_mirror ORDER BY name ASC",
        )?;

        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(Self::map_record(row)?);
        }

        Ok(records)
    }

    fn map_record(row: &Row) -> Result<MirrorRecord, StorageError> {
        let payload: String = row.get(1)?;
        let updated_at_str: String = row.get(2)?;

        Ok(MirrorRecord {
            name: row.get(0)?,
            entries: serde_json::from_str(&payload)?,
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)?.with_timezone(&Utc),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn map(entries: &[(&str, &str)]) -> PublishMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_mirror_is_none() {
        let storage = SqliteStorage::new(":memory:").unwrap();
        assert!(storage.load_mirror("free_games").unwrap().is_none());
    }

    #[test]
    fn replace_overwrites_wholesale() {
        let storage = SqliteStorage::new(":memory:").unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 5, 16, 15, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 5, 23, 15, 0, 0).unwrap();

        storage
            .replace_mirror("free_games", &map(&[("Old Game", "/p/old"), ("Other", "/p/other")]), t1)
            .unwrap();
        storage
            .replace_mirror("free_games", &map(&[("New Game", "/p/new")]), t2)
            .unwrap();

        let record = storage.load_mirror("free_games").unwrap().unwrap();
        assert_eq!(record.entries, map(&[("New Game", "/p/new")]));
        assert_eq!(record.updated_at, t2);
    }

    #[test]
    fn mirrors_are_kept_per_name() {
        let storage = SqliteStorage::new(":memory:").unwrap();
        let t = Utc.with_ymd_and_hms(2024, 5, 16, 15, 0, 0).unwrap();
        storage.replace_mirror("us", &map(&[("A", "/p/a")]), t).unwrap();
        storage.replace_mirror("cn", &map(&[("B", "/p/b")]), t).unwrap();

        let names: Vec<_> = storage
            .all_mirrors()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["cn", "us"]);
    }
}
