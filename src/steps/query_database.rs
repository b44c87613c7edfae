//! Run a SQL query against the configured SQLite database.

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};

const MAX_ROWS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite file path, optionally prefixed with `sqlite://`.
    pub database_url: Option<String>,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").ok(),
        }
    }

    fn path(&self) -> Result<String> {
        let url = self
            .database_url
            .as_deref()
            .ok_or_else(|| Error::MissingConfig("DATABASE_URL is not configured".into()))?;
        Ok(url.strip_prefix("sqlite://").unwrap_or(url).to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryDatabaseParams {
    pub query: String,
    /// Positional parameters bound to `?` placeholders.
    #[serde(default)]
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub rows: Vec<Value>,
    pub row_count: usize,
    pub fields: Vec<String>,
    /// True when the result was clipped at the row cap.
    pub truncated: bool,
}

/// Execute the query and return rows as column-keyed JSON objects.
///
/// A busy or locked database surfaces as retryable; syntax and
/// constraint errors are unrecoverable.
pub async fn query_database(
    config: &DatabaseConfig,
    params: QueryDatabaseParams,
) -> Result<QueryResult> {
    let path = config.path()?;

    if params.query.trim().is_empty() {
        return Err(Error::InvalidInput("query is required".into()));
    }

    debug!("executing database query");

    let result = tokio::task::spawn_blocking(move || run_query(&path, &params))
        .await
        .map_err(|e| Error::Config(format!("query task failed: {}", e)))??;

    Ok(result)
}

fn run_query(path: &str, params: &QueryDatabaseParams) -> Result<QueryResult> {
    let conn = Connection::open(path)?;
    let mut statement = conn.prepare(&params.query)?;

    let fields: Vec<String> = statement
        .column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    for (index, value) in params.params.iter().enumerate() {
        bind_param(&mut statement, index + 1, value)?;
    }

    let mut rows = Vec::new();
    let mut truncated = false;
    let mut raw_rows = statement.raw_query();
    while let Some(row) = raw_rows.next()? {
        if rows.len() >= MAX_ROWS {
            truncated = true;
            warn!(cap = MAX_ROWS, "query result clipped at row cap");
            break;
        }
        let mut object = Map::new();
        for (index, field) in fields.iter().enumerate() {
            object.insert(field.clone(), column_to_json(row.get_ref(index)?));
        }
        rows.push(Value::Object(object));
    }

    Ok(QueryResult {
        row_count: rows.len(),
        rows,
        fields,
        truncated,
    })
}

fn bind_param(statement: &mut rusqlite::Statement<'_>, index: usize, value: &Value) -> Result<()> {
    match value {
        Value::Null => statement.raw_bind_parameter(index, rusqlite::types::Null)?,
        Value::Bool(b) => statement.raw_bind_parameter(index, *b)?,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                statement.raw_bind_parameter(index, i)?;
            } else {
                statement.raw_bind_parameter(index, n.as_f64().unwrap_or_default())?;
            }
        }
        Value::String(s) => statement.raw_bind_parameter(index, s.as_str())?,
        other => statement.raw_bind_parameter(index, other.to_string())?,
    }
    Ok(())
}

fn column_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
    }
}
