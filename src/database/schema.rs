use sqlx::SqlitePool;

const SQL_CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  username TEXT NOT NULL UNIQUE,
  email TEXT NOT NULL,
  password_hash TEXT NOT NULL,
  profile_image_url TEXT,
  description TEXT,
  status TEXT,
  connected_to_facebook INTEGER NOT NULL DEFAULT 0,
  interests TEXT NOT NULL DEFAULT '[]',
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
)
"#;

const SQL_CREATE_SESSIONS: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
  token TEXT PRIMARY KEY,
  user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
  created_at TEXT NOT NULL
)
"#;

const SQL_CREATE_LOCATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS locations (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  four_square_id TEXT NOT NULL UNIQUE,
  name TEXT NOT NULL,
  street TEXT,
  city TEXT,
  country TEXT,
  price INTEGER NOT NULL DEFAULT 0,
  latitude REAL,
  longitude REAL,
  tags TEXT NOT NULL DEFAULT '[]',
  created_at TEXT NOT NULL
)
"#;

const SQL_CREATE_EVENTS: &str = r#"
CREATE TABLE IF NOT EXISTS events (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  host_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
  location_id INTEGER NOT NULL REFERENCES locations(id),
  planned_time TEXT NOT NULL,
  capacity INTEGER NOT NULL CHECK (capacity >= 1),
  current_size INTEGER NOT NULL CHECK (current_size >= 0),
  current_activity TEXT NOT NULL DEFAULT '',
  completed_status INTEGER NOT NULL DEFAULT 0,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
)
"#;

const SQL_CREATE_EVENT_MEMBERS: &str = r#"
CREATE TABLE IF NOT EXISTS event_members (
  event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
  user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
  approved INTEGER NOT NULL DEFAULT 0,
  status TEXT NOT NULL DEFAULT '',
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  PRIMARY KEY (event_id, user_id)
)
"#;

const SQL_CREATE_REVIEWS: &str = r#"
CREATE TABLE IF NOT EXISTS reviews (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
  author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
  event_id INTEGER REFERENCES events(id) ON DELETE SET NULL,
  star_rating INTEGER NOT NULL CHECK (star_rating BETWEEN 0 AND 5),
  text TEXT NOT NULL DEFAULT '',
  created_at TEXT NOT NULL
)
"#;

const SQL_CREATE_INDEXES: [&str; 4] = [
    "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_locations_geo ON locations(latitude, longitude)",
    "CREATE INDEX IF NOT EXISTS idx_event_members_user ON event_members(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_reviews_user ON reviews(user_id)",
];

/// Creates any missing table or index. Safe to run on every startup.
pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    let tables = [
        SQL_CREATE_USERS,
        SQL_CREATE_SESSIONS,
        SQL_CREATE_LOCATIONS,
        SQL_CREATE_EVENTS,
        SQL_CREATE_EVENT_MEMBERS,
        SQL_CREATE_REVIEWS,
    ];

    for sql in tables.iter().chain(SQL_CREATE_INDEXES.iter()) {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}
