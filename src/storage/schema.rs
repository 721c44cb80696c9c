//! Database schema definitions

/// Entity tables, in creation order
pub const ENTITY_TABLES: &[&str] = &["user", "bar", "sport", "streaming_service"];

/// Association tables, in creation order
pub const ASSOCIATION_TABLES: &[&str] = &["user_bars", "bar_sports", "bar_streaming"];

/// Connection-level settings applied on every open.
/// SQLite ships with foreign key enforcement off.
pub const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// SQL to create the user table
pub const CREATE_USER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    id INTEGER PRIMARY KEY,
    username VARCHAR(80) NOT NULL UNIQUE,
    email VARCHAR(120) NOT NULL UNIQUE,
    password_hash VARCHAR(200) NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the bar table
pub const CREATE_BAR_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS bar (
    id INTEGER PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    address VARCHAR(200) NOT NULL,
    latitude FLOAT NOT NULL,
    longitude FLOAT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the sport lookup table
pub const CREATE_SPORT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sport (
    id INTEGER PRIMARY KEY,
    name VARCHAR(50) NOT NULL UNIQUE
)
"#;

/// SQL to create the streaming_service lookup table
pub const CREATE_STREAMING_SERVICE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS streaming_service (
    id INTEGER PRIMARY KEY,
    name VARCHAR(50) NOT NULL UNIQUE
)
"#;

/// SQL to create the user_bars table (a user follows many bars)
pub const CREATE_USER_BARS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS user_bars (
    user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
    bar_id INTEGER NOT NULL REFERENCES bar(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, bar_id)
)
"#;

/// SQL to create the bar_sports table
pub const CREATE_BAR_SPORTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS bar_sports (
    bar_id INTEGER NOT NULL REFERENCES bar(id) ON DELETE CASCADE,
    sport_id INTEGER NOT NULL REFERENCES sport(id) ON DELETE CASCADE,
    PRIMARY KEY (bar_id, sport_id)
)
"#;

/// SQL to create the bar_streaming table
pub const CREATE_BAR_STREAMING_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS bar_streaming (
    bar_id INTEGER NOT NULL REFERENCES bar(id) ON DELETE CASCADE,
    streaming_service_id INTEGER NOT NULL REFERENCES streaming_service(id) ON DELETE CASCADE,
    PRIMARY KEY (bar_id, streaming_service_id)
)
"#;

/// Reverse-lookup indexes. The composite primary keys already cover
/// lookups by their leading column.
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_user_bars_bar ON user_bars(bar_id)",
    "CREATE INDEX IF NOT EXISTS idx_bar_sports_sport ON bar_sports(sport_id)",
    "CREATE INDEX IF NOT EXISTS idx_bar_streaming_service ON bar_streaming(streaming_service_id)",
];

/// All schema creation statements. Entity tables come first so the
/// association tables' references resolve.
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_USER_TABLE,
        CREATE_BAR_TABLE,
        CREATE_SPORT_TABLE,
        CREATE_STREAMING_SERVICE_TABLE,
        CREATE_USER_BARS_TABLE,
        CREATE_BAR_SPORTS_TABLE,
        CREATE_BAR_STREAMING_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Every table the schema declares
pub fn all_tables() -> impl Iterator<Item = &'static str> {
    ENTITY_TABLES.iter().chain(ASSOCIATION_TABLES.iter()).copied()
}
