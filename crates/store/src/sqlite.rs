//! SQLite-backed store.
//!
//! Each operation opens its own connection and drops it before returning,
//! so the file handle is released on every path including errors. Readers
//! open the file read-only; only [`MarketingStore::replace_all`] writes.

use campaign_core::types::{Channel, PerformanceRecord};
use campaign_core::{InsightsError, InsightsResult};
use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use rusqlite::{params, Batch, Connection, OpenFlags, Statement};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::table::{CellValue, QueryTable};

pub const TABLE_NAME: &str = "marketing_performance";

const CREATE_TABLE: &str = "CREATE TABLE marketing_performance (
    date TEXT NOT NULL,
    campaign_id TEXT NOT NULL,
    campaign_name TEXT NOT NULL,
    channel TEXT NOT NULL,
    impressions INTEGER NOT NULL,
    clicks INTEGER NOT NULL,
    spend REAL NOT NULL,
    conversions INTEGER NOT NULL,
    revenue REAL NOT NULL
)";

const INSERT_RECORD: &str = "INSERT INTO marketing_performance (
    date, campaign_id, campaign_name, channel,
    impressions, clicks, spend, conversions, revenue
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

const SELECT_ALL: &str = "SELECT date, campaign_id, campaign_name, channel,
    impressions, clicks, spend, conversions, revenue
FROM marketing_performance";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw column values of one stored row, before validation.
type RawRow = (String, String, String, String, i64, i64, f64, i64, f64);

/// Handle to the store file. Holds no open connection.
#[derive(Debug, Clone)]
pub struct MarketingStore {
    path: PathBuf,
}

impl MarketingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop and recreate the table with `records` in one transaction.
    /// On any failure the transaction rolls back and the previous contents
    /// stay in place.
    pub fn replace_all(&self, records: &[PerformanceRecord]) -> InsightsResult<usize> {
        let mut conn = self.open(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let tx = conn.transaction().map_err(storage_error)?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {TABLE_NAME}"))
            .map_err(storage_error)?;
        tx.execute_batch(CREATE_TABLE).map_err(storage_error)?;
        {
            let mut stmt = tx.prepare(INSERT_RECORD).map_err(storage_error)?;
            for r in records {
                stmt.execute(params![
                    r.date.format(DATE_FORMAT).to_string(),
                    r.campaign_id,
                    r.campaign_name,
                    r.channel.as_str(),
                    to_sql_int(r.impressions)?,
                    to_sql_int(r.clicks)?,
                    r.spend,
                    to_sql_int(r.conversions)?,
                    r.revenue,
                ])
                .map_err(storage_error)?;
            }
        }
        tx.commit().map_err(storage_error)?;

        info!(
            rows = records.len(),
            path = %self.path.display(),
            "Replaced marketing_performance"
        );
        Ok(records.len())
    }

    /// Full scan of the table, in storage order.
    pub fn load_all(&self) -> InsightsResult<Vec<PerformanceRecord>> {
        let conn = self.open_read_only()?;
        let mut stmt = conn
            .prepare(SELECT_ALL)
            .map_err(|e| self.connection_error(e))?;

        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                ))
            })
            .map_err(|e| InsightsError::Decode(e.to_string()))?
            .collect::<Result<Vec<RawRow>, _>>()
            .map_err(|e| InsightsError::Decode(e.to_string()))?;

        let records = raw
            .into_iter()
            .map(decode_row)
            .collect::<InsightsResult<Vec<_>>>()?;
        debug!(rows = records.len(), "Loaded marketing_performance");
        Ok(records)
    }

    /// Execute a single read-only statement and return whatever it selects.
    /// Statements the store rejects come back as
    /// [`InsightsError::MalformedQuery`] carrying SQLite's message. Input
    /// holding no statement, or more than one, is rejected before anything
    /// runs.
    pub fn run_query(&self, sql: &str) -> InsightsResult<QueryTable> {
        let conn = self.open_read_only()?;
        let table = single_statement(&conn, sql).map_err(|e| {
            warn!(error = %e, "Ad-hoc query rejected");
            e
        })?;
        debug!(rows = table.row_count(), columns = table.columns.len(), "Ad-hoc query");
        Ok(table)
    }

    /// `PRAGMA table_info` for the performance table.
    pub fn table_schema(&self) -> InsightsResult<QueryTable> {
        let conn = self.open_read_only()?;
        execute(&conn, &format!("PRAGMA table_info({TABLE_NAME})"))
            .map_err(|e| InsightsError::MalformedQuery(e.to_string()))
    }

    pub fn row_count(&self) -> InsightsResult<u64> {
        let conn = self.open_read_only()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {TABLE_NAME}"), [], |row| {
                row.get(0)
            })
            .map_err(|e| self.connection_error(e))?;
        u64::try_from(count).map_err(|e| InsightsError::Decode(e.to_string()))
    }

    fn open_read_only(&self) -> InsightsResult<Connection> {
        self.open(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
    }

    fn open(&self, flags: OpenFlags) -> InsightsResult<Connection> {
        Connection::open_with_flags(&self.path, flags).map_err(|e| self.connection_error(e))
    }

    fn connection_error(&self, err: rusqlite::Error) -> InsightsError {
        InsightsError::StoreConnection {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }
}

fn single_statement(conn: &Connection, sql: &str) -> InsightsResult<QueryTable> {
    let malformed = |e: rusqlite::Error| InsightsError::MalformedQuery(e.to_string());
    let mut batch = Batch::new(conn, sql);
    let stmt = batch
        .next()
        .map_err(malformed)?
        .ok_or_else(|| InsightsError::MalformedQuery("empty query".to_string()))?;
    if batch.next().map_err(malformed)?.is_some() {
        return Err(InsightsError::MalformedQuery(
            "You can only execute one statement at a time.".to_string(),
        ));
    }
    read_rows(stmt).map_err(malformed)
}

fn execute(conn: &Connection, sql: &str) -> rusqlite::Result<QueryTable> {
    read_rows(conn.prepare(sql)?)
}

fn read_rows(mut stmt: Statement<'_>) -> rusqlite::Result<QueryTable> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([])?;
    while let Some(row) = cursor.next()? {
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            cells.push(cell(row.get_ref(idx)?));
        }
        rows.push(cells);
    }

    Ok(QueryTable { columns, rows })
}

fn cell(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(v) => CellValue::Integer(v),
        ValueRef::Real(v) => CellValue::Real(v),
        ValueRef::Text(v) => CellValue::Text(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => CellValue::Blob(v.to_vec()),
    }
}

fn decode_row(raw: RawRow) -> InsightsResult<PerformanceRecord> {
    let (date, campaign_id, campaign_name, channel, impressions, clicks, spend, conversions, revenue) =
        raw;
    Ok(PerformanceRecord {
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .map_err(|e| InsightsError::Decode(format!("date '{date}': {e}")))?,
        campaign_id,
        campaign_name,
        channel: channel.parse::<Channel>()?,
        impressions: from_sql_int(impressions, "impressions")?,
        clicks: from_sql_int(clicks, "clicks")?,
        spend,
        conversions: from_sql_int(conversions, "conversions")?,
        revenue,
    })
}

fn to_sql_int(value: u64) -> InsightsResult<i64> {
    i64::try_from(value).map_err(|e| InsightsError::Storage(e.to_string()))
}

fn from_sql_int(value: i64, column: &str) -> InsightsResult<u64> {
    u64::try_from(value).map_err(|_| InsightsError::Decode(format!("negative {column}: {value}")))
}

fn storage_error(err: rusqlite::Error) -> InsightsError {
    InsightsError::Storage(err.to_string())
}
