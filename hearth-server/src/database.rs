use anyhow::Result;
use std::path::Path;

/// Ordered schema migrations for one database file.
pub type Migrations = &'static [&'static str];

#[derive(Clone, Debug)]
pub struct Database {
    pub pool: r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>,
}

impl Database {
    /// Open (or create) the database file and bring it up to the latest schema.
    pub async fn connect(path: impl AsRef<Path>, migrations: Migrations) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let manager = r2d2_sqlite::SqliteConnectionManager::file(path)
            // Cascading deletes depend on this, and it is per connection
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = r2d2::Pool::new(manager)?;
        let me = Self { pool };
        me.run(move |conn| Self::migrate(conn, migrations)).await?;
        Ok(me)
    }

    /// Migrate the database to the latest version.
    fn migrate(conn: &mut rusqlite::Connection, migrations: Migrations) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL);",
        )?;
        // Find the current migration version. If it fails, we need to run all the migrations.
        let current_version: String = conn
            .query_row(
                "SELECT value FROM metadata WHERE key = 'schema_version'",
                rusqlite::params![],
                |row| row.get(0),
            )
            .unwrap_or("0".to_string());
        let current_version = current_version.parse::<usize>().unwrap_or(0);
        tracing::info!("Current schema version: {}", current_version);
        for (version, migration) in migrations.iter().enumerate().skip(current_version) {
            tracing::warn!("Applying migration {}", version + 1);
            let tx = conn.transaction()?;
            tx.execute_batch(migration)?;
            tx.execute(
                "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)",
                rusqlite::params![(version + 1).to_string()],
            )?;
            tx.commit()?;
        }
        Ok(())
    }

    /// Run blocking database work on a pooled connection, off the async executor.
    pub async fn run<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            work(&mut conn)
        })
        .await?
    }
}

/// Convenience method to collect rows from a query into a Vec.
pub fn collect_rows<T: FromRow, P: rusqlite::Params>(
    conn: &rusqlite::Connection,
    sql: &str,
    parameters: P,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query(parameters)?;
    rows.mapped(T::from_row)
        .map(|r| r.map_err(Into::into))
        .collect::<Result<_>>()
}

pub trait FromRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self>
    where
        Self: Sized;
}

/// Whether an error (anywhere in its chain) is a SQLite constraint violation.
pub fn is_constraint_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<rusqlite::Error>(),
            Some(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MIGRATIONS: Migrations = &[
        "CREATE TABLE Thing (thing_id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);",
        "ALTER TABLE Thing ADD COLUMN colour TEXT;",
    ];

    struct Thing {
        name: String,
    }

    impl FromRow for Thing {
        fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
            Ok(Self {
                name: row.get("name")?,
            })
        }
    }

    #[tokio::test]
    async fn migrations_run_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("things.db");
        let db = Database::connect(&path, TEST_MIGRATIONS).await.unwrap();
        db.run(|conn| {
            conn.execute("INSERT INTO Thing (name, colour) VALUES ('a', 'red')", [])?;
            Ok(())
        })
        .await
        .unwrap();
        drop(db);

        // Reopening must not re-apply the migrations (the ALTER would fail)
        let db = Database::connect(&path, TEST_MIGRATIONS).await.unwrap();
        let version: String = db
            .run(|conn| {
                Ok(conn.query_row(
                    "SELECT value FROM metadata WHERE key = 'schema_version'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(version, "2");
        let things: Vec<Thing> = db
            .run(|conn| collect_rows(conn, "SELECT * FROM Thing", []))
            .await
            .unwrap();
        assert_eq!(things.len(), 1);
        assert_eq!(things[0].name, "a");
    }

    #[tokio::test]
    async fn detects_constraint_violations() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::connect(dir.path().join("things.db"), TEST_MIGRATIONS)
            .await
            .unwrap();
        let err = db
            .run(|conn| {
                conn.execute("INSERT INTO Thing (name) VALUES ('a')", [])?;
                conn.execute("INSERT INTO Thing (name) VALUES ('a')", [])?;
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(is_constraint_violation(&err));
        assert!(!is_constraint_violation(&anyhow::anyhow!("unrelated")));
    }
}
