// Database initialization and schema management
use diesel::sqlite::SqliteConnection;
use diesel::prelude::*;
use diesel::sql_query;
use std::sync::{Arc, Mutex};

pub type DbPool = Arc<Mutex<SqliteConnection>>;

pub const SUBMISSIONS_TABLE: &str = "submissions";

const CREATE_SUBMISSIONS: &str = "CREATE TABLE IF NOT EXISTS submissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,

    public_ip TEXT,
    public_ipv4 TEXT,
    public_ipv6 TEXT,

    country TEXT,
    region TEXT,
    city TEXT,
    postal TEXT,

    isp TEXT,
    org TEXT,
    asn TEXT,

    ip_lat REAL,
    ip_lon REAL,

    gps_lat REAL,
    gps_lon REAL,
    gps_accuracy_m REAL,

    is_vpn INTEGER,
    is_proxy INTEGER,
    is_tor INTEGER,

    device_name TEXT,
    platform TEXT,
    language TEXT,
    timezone TEXT,
    screen TEXT,
    viewport TEXT,
    device_pixel_ratio REAL,
    touch_points INTEGER,
    user_agent TEXT,

    referrer TEXT,
    page_url TEXT
)";

/// Columns introduced after the first release, in the order they shipped.
/// Each step only ever adds a nullable column.
pub const ADDITIVE_COLUMNS: &[(&str, &str)] = &[
    ("public_ipv4", "TEXT"),
    ("public_ipv6", "TEXT"),
    ("postal", "TEXT"),
    ("isp", "TEXT"),
    ("org", "TEXT"),
    ("asn", "TEXT"),
    ("ip_lat", "REAL"),
    ("ip_lon", "REAL"),
    ("gps_lat", "REAL"),
    ("gps_lon", "REAL"),
    ("gps_accuracy_m", "REAL"),
    ("is_vpn", "INTEGER"),
    ("is_proxy", "INTEGER"),
    ("is_tor", "INTEGER"),
    ("referrer", "TEXT"),
    ("page_url", "TEXT"),
];

#[derive(QueryableByName)]
struct ColumnName {
    #[diesel(sql_type = diesel::sql_types::Text)]
    name: String,
}

/// Open the SQLite database, creating the file if it doesn't exist
pub fn init_db(database_url: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    Ok(Arc::new(Mutex::new(SqliteConnection::establish(database_url)?)))
}

/// Column names of `table`, in table order
pub fn table_columns(conn: &mut SqliteConnection, table: &str) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let rows = sql_query(format!("SELECT name FROM pragma_table_info('{}')", table))
        .load::<ColumnName>(conn)?;

    Ok(rows.into_iter().map(|c| c.name).collect())
}

/// Add `column` to `table` unless it is already there. Returns true when the
/// column was added by this call.
fn ensure_column(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    sql_type: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    if table_columns(conn, table)?.iter().any(|c| c == column) {
        return Ok(false);
    }

    let alter = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, sql_type);
    match sql_query(alter).execute(conn) {
        Ok(_) => Ok(true),
        // another process added it between the check and the ALTER
        Err(e) if e.to_string().contains("duplicate column name") => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Create the submissions table and apply additive column migrations.
/// Safe to run on every startup; returns how many columns were added.
pub fn run_migrations(db: &DbPool) -> Result<usize, Box<dyn std::error::Error>> {
    let mut conn = db.lock().map_err(|_| "database lock poisoned")?;

    sql_query(CREATE_SUBMISSIONS).execute(&mut *conn)?;
    tracing::debug!("✅ Table {} created/verified", SUBMISSIONS_TABLE);

    let mut added = 0;
    for (column, sql_type) in ADDITIVE_COLUMNS {
        if ensure_column(&mut conn, SUBMISSIONS_TABLE, column, sql_type)? {
            tracing::info!("Added column {}.{} ({})", SUBMISSIONS_TABLE, column, sql_type);
            added += 1;
        }
    }

    Ok(added)
}
