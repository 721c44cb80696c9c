//! SQLite storage implementation

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use tracing::{debug, info};

use super::schema;
use crate::link::{BarSport, BarStreaming, Link, UserBar};
use crate::model::{self, Bar, BarDetails, NewBar, NewUser, Sport, StreamingService, User};
use crate::Result;

const USER_COLUMNS: &str = "u.id, u.username, u.email, u.password_hash, u.created_at";
const BAR_COLUMNS: &str = "b.id, b.name, b.address, b.latitude, b.longitude, b.created_at";

/// SQLite-backed catalogue store.
///
/// Owns one connection. Construct it once and pass it to whatever needs
/// the database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open a database file (creates the file if it doesn't exist).
    /// The schema is not touched; call [`Database::init_db`] for that.
    pub fn open(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "opening database");
        Self::configure(Connection::open(path)?)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.execute_batch(schema::CONNECTION_PRAGMAS)?;
        Ok(Self { conn })
    }

    /// Create any missing table or index. Safe to call on an initialized
    /// store. Returns the tables that did not exist before the call.
    pub fn init_db(&self) -> Result<Vec<&'static str>> {
        let existing = self.table_names()?;

        let tx = self.conn.unchecked_transaction()?;
        for stmt in schema::all_schema_statements() {
            tx.execute(stmt, [])?;
        }
        tx.commit()?;

        let created: Vec<&'static str> = schema::all_tables()
            .filter(|table| !existing.iter().any(|name| name == table))
            .collect();
        info!(created = ?created, "Database initialized");
        Ok(created)
    }

    /// True when every declared table is present
    pub fn is_initialized(&self) -> Result<bool> {
        let existing = self.table_names()?;
        Ok(schema::all_tables().all(|table| existing.iter().any(|name| name == table)))
    }

    // ========== Introspection ==========

    /// Names of all user tables, sorted
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Column layout of a table, in declaration order
    pub fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT name, type, "notnull", pk FROM pragma_table_info(?1) ORDER BY cid"#,
        )?;
        let columns = stmt
            .query_map([table], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    decl_type: row.get(1)?,
                    not_null: row.get(2)?,
                    pk_position: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    /// Foreign keys declared on a table
    pub fn table_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT "from", "table", "to", on_delete FROM pragma_foreign_key_list(?1) ORDER BY "from""#,
        )?;
        let keys = stmt
            .query_map([table], |row| {
                Ok(ForeignKeyInfo {
                    column: row.get(0)?,
                    references_table: row.get(1)?,
                    references_column: row.get(2)?,
                    on_delete: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(keys)
    }

    // ========== User Operations ==========

    /// Insert a user. Duplicate usernames or emails fail with a
    /// uniqueness violation.
    pub fn insert_user(&self, user: &NewUser) -> Result<User> {
        user.validate()?;
        let created_at = Utc::now().naive_utc();

        self.conn.execute(
            "INSERT INTO user (username, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user.username, user.email, user.password_hash, created_at],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, username = %user.username, "inserted user");

        Ok(User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: Some(created_at),
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM user u WHERE u.id = ?1"),
                [id],
                row_to_user,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM user u WHERE u.username = ?1"),
                [username],
                row_to_user,
            )
            .optional()
            .map_err(Into::into)
    }

    // ========== Bar Operations ==========

    pub fn insert_bar(&self, bar: &NewBar) -> Result<Bar> {
        bar.validate()?;
        let created_at = Utc::now().naive_utc();

        self.conn.execute(
            r#"
            INSERT INTO bar (name, address, latitude, longitude, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![bar.name, bar.address, bar.latitude, bar.longitude, created_at],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name = %bar.name, "inserted bar");

        Ok(Bar {
            id,
            name: bar.name.clone(),
            address: bar.address.clone(),
            latitude: bar.latitude,
            longitude: bar.longitude,
            created_at: Some(created_at),
        })
    }

    pub fn get_bar(&self, id: i64) -> Result<Option<Bar>> {
        self.conn
            .query_row(
                &format!("SELECT {BAR_COLUMNS} FROM bar b WHERE b.id = ?1"),
                [id],
                row_to_bar,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn list_bars(&self) -> Result<Vec<Bar>> {
        self.query_bars(&format!("SELECT {BAR_COLUMNS} FROM bar b ORDER BY b.id"), None)
    }

    /// A bar with its sports and streaming services, or `None` if the bar
    /// doesn't exist. Unlinked bars come back with empty sets.
    pub fn bar_details(&self, id: i64) -> Result<Option<BarDetails>> {
        let Some(bar) = self.get_bar(id)? else {
            return Ok(None);
        };
        Ok(Some(BarDetails {
            sports: self.sports_for_bar(bar.id)?,
            streaming_services: self.streaming_services_for_bar(bar.id)?,
            bar,
        }))
    }

    // ========== Sport / Streaming Service Operations ==========

    pub fn insert_sport(&self, name: &str) -> Result<Sport> {
        let id = self.insert_named("sport", name)?;
        Ok(Sport { id, name: name.to_string() })
    }

    pub fn get_sport(&self, id: i64) -> Result<Option<Sport>> {
        self.conn
            .query_row("SELECT id, name FROM sport WHERE id = ?1", [id], row_to_sport)
            .optional()
            .map_err(Into::into)
    }

    pub fn find_sport_by_name(&self, name: &str) -> Result<Option<Sport>> {
        self.conn
            .query_row("SELECT id, name FROM sport WHERE name = ?1", [name], row_to_sport)
            .optional()
            .map_err(Into::into)
    }

    pub fn list_sports(&self) -> Result<Vec<Sport>> {
        self.query_sports("SELECT id, name FROM sport ORDER BY name", None)
    }

    pub fn insert_streaming_service(&self, name: &str) -> Result<StreamingService> {
        let id = self.insert_named("streaming_service", name)?;
        Ok(StreamingService { id, name: name.to_string() })
    }

    pub fn get_streaming_service(&self, id: i64) -> Result<Option<StreamingService>> {
        self.conn
            .query_row(
                "SELECT id, name FROM streaming_service WHERE id = ?1",
                [id],
                row_to_streaming_service,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn find_streaming_service_by_name(&self, name: &str) -> Result<Option<StreamingService>> {
        self.conn
            .query_row(
                "SELECT id, name FROM streaming_service WHERE name = ?1",
                [name],
                row_to_streaming_service,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn list_streaming_services(&self) -> Result<Vec<StreamingService>> {
        self.query_streaming_services("SELECT id, name FROM streaming_service ORDER BY name", None)
    }

    /// `table` is always one of the two lookup tables
    fn insert_named(&self, table: &str, name: &str) -> Result<i64> {
        model::validate_lookup_name(name)?;
        self.conn
            .execute(&format!("INSERT INTO {table} (name) VALUES (?1)"), [name])?;
        let id = self.conn.last_insert_rowid();
        debug!(table, id, name, "inserted lookup entry");
        Ok(id)
    }

    // ========== Link Operations ==========

    /// Insert an association row. Unknown ids fail with a foreign key
    /// violation, repeated pairs with a primary key violation.
    pub fn insert_link<L: Link>(&self, link: &L) -> Result<()> {
        let kind = L::KIND;
        let (left, right) = kind.columns();
        let (left_id, right_id) = link.keys();

        self.conn.execute(
            &format!("INSERT INTO {} ({left}, {right}) VALUES (?1, ?2)", kind.table()),
            params![left_id, right_id],
        )?;
        debug!(%kind, left_id, right_id, "linked");
        Ok(())
    }

    pub fn follow_bar(&self, user_id: i64, bar_id: i64) -> Result<()> {
        self.insert_link(&UserBar { user_id, bar_id })
    }

    pub fn add_bar_sport(&self, bar_id: i64, sport_id: i64) -> Result<()> {
        self.insert_link(&BarSport { bar_id, sport_id })
    }

    pub fn add_bar_streaming(&self, bar_id: i64, streaming_service_id: i64) -> Result<()> {
        self.insert_link(&BarStreaming { bar_id, streaming_service_id })
    }

    /// Bars a user follows
    pub fn bars_followed_by(&self, user_id: i64) -> Result<Vec<Bar>> {
        self.query_bars(
            &format!(
                "SELECT {BAR_COLUMNS} FROM bar b JOIN user_bars ub ON ub.bar_id = b.id \
                 WHERE ub.user_id = ?1 ORDER BY b.id"
            ),
            Some(user_id),
        )
    }

    /// Users following a bar (reverse of `bars_followed_by`)
    pub fn followers_of(&self, bar_id: i64) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM user u JOIN user_bars ub ON ub.user_id = u.id \
             WHERE ub.bar_id = ?1 ORDER BY u.id"
        ))?;
        let users = stmt
            .query_map([bar_id], row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    pub fn sports_for_bar(&self, bar_id: i64) -> Result<Vec<Sport>> {
        self.query_sports(
            "SELECT s.id, s.name FROM sport s JOIN bar_sports bs ON bs.sport_id = s.id \
             WHERE bs.bar_id = ?1 ORDER BY s.name",
            Some(bar_id),
        )
    }

    /// Bars showing a sport (reverse of `sports_for_bar`)
    pub fn bars_for_sport(&self, sport_id: i64) -> Result<Vec<Bar>> {
        self.query_bars(
            &format!(
                "SELECT {BAR_COLUMNS} FROM bar b JOIN bar_sports bs ON bs.bar_id = b.id \
                 WHERE bs.sport_id = ?1 ORDER BY b.id"
            ),
            Some(sport_id),
        )
    }

    pub fn streaming_services_for_bar(&self, bar_id: i64) -> Result<Vec<StreamingService>> {
        self.query_streaming_services(
            "SELECT s.id, s.name FROM streaming_service s \
             JOIN bar_streaming bs ON bs.streaming_service_id = s.id \
             WHERE bs.bar_id = ?1 ORDER BY s.name",
            Some(bar_id),
        )
    }

    /// Bars carrying a streaming service (reverse of `streaming_services_for_bar`)
    pub fn bars_for_streaming_service(&self, streaming_service_id: i64) -> Result<Vec<Bar>> {
        self.query_bars(
            &format!(
                "SELECT {BAR_COLUMNS} FROM bar b JOIN bar_streaming bs ON bs.bar_id = b.id \
                 WHERE bs.streaming_service_id = ?1 ORDER BY b.id"
            ),
            Some(streaming_service_id),
        )
    }

    // ========== Query helpers ==========

    fn query_bars(&self, sql: &str, key: Option<i64>) -> Result<Vec<Bar>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = match key {
            Some(id) => stmt.query_map([id], row_to_bar)?.collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt.query_map([], row_to_bar)?.collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
    }

    fn query_sports(&self, sql: &str, key: Option<i64>) -> Result<Vec<Sport>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = match key {
            Some(id) => stmt.query_map([id], row_to_sport)?.collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt.query_map([], row_to_sport)?.collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
    }

    fn query_streaming_services(&self, sql: &str, key: Option<i64>) -> Result<Vec<StreamingService>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = match key {
            Some(id) => stmt
                .query_map([id], row_to_streaming_service)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt
                .query_map([], row_to_streaming_service)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
    }

    // ========== Statistics ==========

    fn count(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Row counts for every table
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            users: self.count("user")?,
            bars: self.count("bar")?,
            sports: self.count("sport")?,
            streaming_services: self.count("streaming_service")?,
            follows: self.count("user_bars")?,
            bar_sports: self.count("bar_sports")?,
            bar_streaming: self.count("bar_streaming")?,
        })
    }
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn row_to_bar(row: &Row) -> rusqlite::Result<Bar> {
    Ok(Bar {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn row_to_sport(row: &Row) -> rusqlite::Result<Sport> {
    Ok(Sport { id: row.get(0)?, name: row.get(1)? })
}

fn row_to_streaming_service(row: &Row) -> rusqlite::Result<StreamingService> {
    Ok(StreamingService { id: row.get(0)?, name: row.get(1)? })
}

/// One column as reported by `pragma_table_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: String,
    pub not_null: bool,
    /// 1-based position within the primary key, 0 if not part of it
    pub pk_position: i64,
}

/// One foreign key as reported by `pragma_foreign_key_list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyInfo {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
    pub on_delete: String,
}

/// Database statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DbStats {
    pub users: usize,
    pub bars: usize,
    pub sports: usize,
    pub streaming_services: usize,
    pub follows: usize,
    pub bar_sports: usize,
    pub bar_streaming: usize,
}

impl DbStats {
    /// (table, row count) pairs in schema order
    pub fn rows(&self) -> [(&'static str, usize); 7] {
        [
            ("user", self.users),
            ("bar", self.bars),
            ("sport", self.sports),
            ("streaming_service", self.streaming_services),
            ("user_bars", self.follows),
            ("bar_sports", self.bar_sports),
            ("bar_streaming", self.bar_streaming),
        ]
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        for (table, count) in self.rows() {
            writeln!(f, "  {table}: {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstraintKind, Error};

    fn fresh() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init_db().unwrap();
        db
    }

    fn sample_user(db: &Database, name: &str) -> User {
        db.insert_user(&NewUser::new(name, format!("{name}@example.com"), "hash"))
            .unwrap()
    }

    fn sample_bar(db: &Database, name: &str) -> Bar {
        db.insert_bar(&NewBar::new(name, "12 Harbour Rd", 51.5072, -0.1276))
            .unwrap()
    }

    fn schema_snapshot(db: &Database) -> Vec<(String, String, Option<String>)> {
        let mut stmt = db
            .conn
            .prepare("SELECT type, name, sql FROM sqlite_master ORDER BY type, name")
            .unwrap();
        stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_init_creates_exactly_the_declared_tables() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.table_names().unwrap().is_empty());
        assert!(!db.is_initialized().unwrap());

        let created = db.init_db().unwrap();
        assert_eq!(created.len(), 7);

        let mut expected: Vec<String> = schema::all_tables().map(String::from).collect();
        expected.sort();
        assert_eq!(db.table_names().unwrap(), expected);
        assert!(db.is_initialized().unwrap());
    }

    #[test]
    fn test_declared_columns_and_keys() {
        let db = fresh();

        let user: Vec<_> = db.table_columns("user").unwrap();
        let names: Vec<_> = user.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "username", "email", "password_hash", "created_at"]);
        assert_eq!(user[0].pk_position, 1);
        assert!(user[1].not_null && user[2].not_null && user[3].not_null);
        assert_eq!(user[1].decl_type, "VARCHAR(80)");

        let bar = db.table_columns("bar").unwrap();
        assert_eq!(bar.iter().filter(|c| c.not_null).count(), 4);
        assert_eq!(bar[3].decl_type, "FLOAT");

        let streaming = db.table_columns("bar_streaming").unwrap();
        let pk: Vec<_> = streaming.iter().map(|c| (c.name.as_str(), c.pk_position)).collect();
        assert_eq!(pk, [("bar_id", 1), ("streaming_service_id", 2)]);

        let fks = db.table_foreign_keys("bar_streaming").unwrap();
        assert_eq!(fks.len(), 2);
        assert_eq!(fks[0].column, "bar_id");
        assert_eq!(fks[0].references_table, "bar");
        assert_eq!(fks[1].references_table, "streaming_service");
        assert!(fks.iter().all(|fk| fk.on_delete == "CASCADE"));
    }

    #[test]
    fn test_init_twice_leaves_schema_unchanged() {
        let db = fresh();
        let before = schema_snapshot(&db);

        let created = db.init_db().unwrap();
        assert!(created.is_empty());
        assert_eq!(schema_snapshot(&db), before);
    }

    #[test]
    fn test_init_on_existing_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.sqlite");

        {
            let db = Database::open(&path).unwrap();
            db.init_db().unwrap();
            sample_user(&db, "ana");
        }

        let db = Database::open(&path).unwrap();
        assert!(db.init_db().unwrap().is_empty());
        assert_eq!(db.stats().unwrap().users, 1);
        assert!(db.find_user_by_username("ana").unwrap().is_some());
    }

    #[test]
    fn test_user_roundtrip() {
        let db = fresh();
        let user = sample_user(&db, "ana");

        assert_eq!(db.get_user(user.id).unwrap(), Some(user.clone()));
        assert_eq!(db.find_user_by_username("ana").unwrap(), Some(user));
        assert!(db.get_user(999).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_is_unique_violation() {
        let db = fresh();
        sample_user(&db, "ana");

        let err = db
            .insert_user(&NewUser::new("ana", "other@example.com", "hash"))
            .unwrap_err();
        assert_eq!(err.constraint(), Some(ConstraintKind::Unique));
    }

    #[test]
    fn test_duplicate_email_is_unique_violation() {
        let db = fresh();
        sample_user(&db, "ana");

        let err = db
            .insert_user(&NewUser::new("ana2", "ana@example.com", "hash"))
            .unwrap_err();
        assert_eq!(err.constraint(), Some(ConstraintKind::Unique));
        assert_eq!(db.stats().unwrap().users, 1);
    }

    #[test]
    fn test_duplicate_lookup_names_are_unique_violations() {
        let db = fresh();
        db.insert_sport("Football").unwrap();
        db.insert_streaming_service("ESPN+").unwrap();

        let err = db.insert_sport("Football").unwrap_err();
        assert_eq!(err.constraint(), Some(ConstraintKind::Unique));
        let err = db.insert_streaming_service("ESPN+").unwrap_err();
        assert_eq!(err.constraint(), Some(ConstraintKind::Unique));
    }

    #[test]
    fn test_link_to_missing_row_is_foreign_key_violation() {
        let db = fresh();
        let bar = sample_bar(&db, "The Local");
        let sport = db.insert_sport("Rugby").unwrap();

        let err = db.add_bar_sport(bar.id, sport.id + 100).unwrap_err();
        assert_eq!(err.constraint(), Some(ConstraintKind::ForeignKey));

        let err = db.add_bar_sport(bar.id + 100, sport.id).unwrap_err();
        assert_eq!(err.constraint(), Some(ConstraintKind::ForeignKey));

        let err = db.follow_bar(42, bar.id).unwrap_err();
        assert_eq!(err.constraint(), Some(ConstraintKind::ForeignKey));

        let service = db.insert_streaming_service("Fubo").unwrap();
        let err = db.add_bar_streaming(bar.id, service.id + 100).unwrap_err();
        assert_eq!(err.constraint(), Some(ConstraintKind::ForeignKey));
        let err = db.add_bar_streaming(bar.id + 100, service.id).unwrap_err();
        assert_eq!(err.constraint(), Some(ConstraintKind::ForeignKey));

        let stats = db.stats().unwrap();
        assert_eq!((stats.follows, stats.bar_sports, stats.bar_streaming), (0, 0, 0));
    }

    #[test]
    fn test_duplicate_follow_is_primary_key_violation() {
        let db = fresh();
        let user = sample_user(&db, "ana");
        let bar = sample_bar(&db, "The Local");

        db.follow_bar(user.id, bar.id).unwrap();
        let err = db.follow_bar(user.id, bar.id).unwrap_err();
        assert_eq!(err.constraint(), Some(ConstraintKind::PrimaryKey));
        assert_eq!(db.stats().unwrap().follows, 1);
    }

    #[test]
    fn test_duplicate_bar_links_are_primary_key_violations() {
        let db = fresh();
        let bar = sample_bar(&db, "The Local");
        let sport = db.insert_sport("Hockey").unwrap();
        let service = db.insert_streaming_service("NHL.tv").unwrap();

        db.add_bar_sport(bar.id, sport.id).unwrap();
        let err = db.add_bar_sport(bar.id, sport.id).unwrap_err();
        assert_eq!(err.constraint(), Some(ConstraintKind::PrimaryKey));

        db.add_bar_streaming(bar.id, service.id).unwrap();
        let err = db.add_bar_streaming(bar.id, service.id).unwrap_err();
        assert_eq!(err.constraint(), Some(ConstraintKind::PrimaryKey));

        let stats = db.stats().unwrap();
        assert_eq!((stats.bar_sports, stats.bar_streaming), (1, 1));
    }

    #[test]
    fn test_rows_without_created_at_still_read() {
        let db = fresh();
        let stamped = sample_bar(&db, "Stamped");
        db.conn
            .execute(
                "INSERT INTO bar (name, address, latitude, longitude, created_at) \
                 VALUES ('Legacy', '1 Old Rd', 10.0, 20.0, NULL)",
                [],
            )
            .unwrap();
        let legacy_id = db.conn.last_insert_rowid();
        db.conn
            .execute(
                "INSERT INTO user (username, email, password_hash, created_at) \
                 VALUES ('old', 'old@example.com', 'hash', NULL)",
                [],
            )
            .unwrap();
        let old_user = db.conn.last_insert_rowid();
        db.follow_bar(old_user, legacy_id).unwrap();

        let bars = db.list_bars().unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0], stamped);
        assert!(bars[0].created_at.is_some());
        assert_eq!(bars[1].name, "Legacy");
        assert!(bars[1].created_at.is_none());

        let followers = db.followers_of(legacy_id).unwrap();
        assert_eq!(followers.len(), 1);
        assert!(followers[0].created_at.is_none());
        assert_eq!(db.bars_followed_by(old_user).unwrap().len(), 1);
    }

    #[test]
    fn test_omitted_created_at_takes_the_column_default() {
        let db = fresh();
        db.conn
            .execute(
                "INSERT INTO bar (name, address, latitude, longitude) VALUES ('Defaulted', 'Main St', 1.0, 2.0)",
                [],
            )
            .unwrap();

        let bar = db.get_bar(db.conn.last_insert_rowid()).unwrap().unwrap();
        assert!(bar.created_at.is_some());
    }

    #[test]
    fn test_unlinked_bar_has_empty_sets() {
        let db = fresh();
        let bar = sample_bar(&db, "Quiet Corner");

        let details = db.bar_details(bar.id).unwrap().unwrap();
        assert_eq!(details.bar, bar);
        assert!(details.sports.is_empty());
        assert!(details.streaming_services.is_empty());
        assert!(db.followers_of(bar.id).unwrap().is_empty());

        assert!(db.bar_details(bar.id + 1).unwrap().is_none());
    }

    #[test]
    fn test_relationships_both_directions() {
        let db = fresh();
        let ana = sample_user(&db, "ana");
        let ben = sample_user(&db, "ben");
        let local = sample_bar(&db, "The Local");
        let dock = sample_bar(&db, "Dockside");
        let rugby = db.insert_sport("Rugby").unwrap();
        let cricket = db.insert_sport("Cricket").unwrap();
        let sky = db.insert_streaming_service("Sky Sports").unwrap();

        db.follow_bar(ana.id, local.id).unwrap();
        db.follow_bar(ana.id, dock.id).unwrap();
        db.follow_bar(ben.id, dock.id).unwrap();
        db.add_bar_sport(local.id, rugby.id).unwrap();
        db.add_bar_sport(local.id, cricket.id).unwrap();
        db.add_bar_sport(dock.id, rugby.id).unwrap();
        db.add_bar_streaming(dock.id, sky.id).unwrap();

        assert_eq!(db.bars_followed_by(ana.id).unwrap(), vec![local.clone(), dock.clone()]);
        assert_eq!(db.followers_of(dock.id).unwrap(), vec![ana.clone(), ben]);

        let details = db.bar_details(local.id).unwrap().unwrap();
        assert_eq!(details.sports, vec![cricket, rugby.clone()]);
        assert!(details.streaming_services.is_empty());

        assert_eq!(db.bars_for_sport(rugby.id).unwrap(), vec![local, dock.clone()]);
        assert_eq!(db.bars_for_streaming_service(sky.id).unwrap(), vec![dock]);
    }

    #[test]
    fn test_deleting_a_bar_cascades_to_links() {
        let db = fresh();
        let user = sample_user(&db, "ana");
        let bar = sample_bar(&db, "Closing Time");
        let sport = db.insert_sport("Darts").unwrap();
        let service = db.insert_streaming_service("DAZN").unwrap();
        db.follow_bar(user.id, bar.id).unwrap();
        db.add_bar_sport(bar.id, sport.id).unwrap();
        db.add_bar_streaming(bar.id, service.id).unwrap();

        db.conn.execute("DELETE FROM bar WHERE id = ?1", [bar.id]).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!((stats.follows, stats.bar_sports, stats.bar_streaming), (0, 0, 0));
        assert_eq!((stats.users, stats.sports, stats.streaming_services), (1, 1, 1));
    }

    #[test]
    fn test_invalid_input_never_reaches_the_store() {
        let db = fresh();

        let err = db.insert_bar(&NewBar::new("", "1 Main St", 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, Error::InvalidField { field: "name", .. }));
        assert_eq!(err.constraint(), None);

        let err = db.insert_sport(&"x".repeat(51)).unwrap_err();
        assert!(matches!(err, Error::InvalidField { .. }));

        assert_eq!(db.stats().unwrap(), DbStats::default());
    }

    #[test]
    fn test_lookup_listing_and_search() {
        let db = fresh();
        db.insert_sport("Tennis").unwrap();
        let golf = db.insert_sport("Golf").unwrap();
        db.insert_streaming_service("Peacock").unwrap();

        let names: Vec<_> = db.list_sports().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["Golf", "Tennis"]);
        assert_eq!(db.find_sport_by_name("Golf").unwrap(), Some(golf.clone()));
        assert_eq!(db.get_sport(golf.id).unwrap(), Some(golf));
        assert!(db.find_streaming_service_by_name("Netflix").unwrap().is_none());
        assert_eq!(db.list_streaming_services().unwrap().len(), 1);
    }

    #[test]
    fn test_stats_display() {
        let db = fresh();
        sample_bar(&db, "The Local");
        sample_bar(&db, "Dockside");

        let stats = db.stats().unwrap();
        assert_eq!(stats.bars, 2);
        assert_eq!(db.list_bars().unwrap().len(), 2);
        assert!(stats.to_string().contains("bar: 2"));
    }
}
