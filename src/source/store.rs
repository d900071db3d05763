use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};

use crate::error::{FlightDeskError, Result};
use crate::models::{FlightQuery, FlightRecord};
use crate::source::FlightSource;

const COLUMNS: &str = "FlightNumber, Origin, Destination, DepartureDate, DepartureTime, \
     ArrivalDate, ArrivalTime, Price, Airline, Duration, Duration_min";

/// Flight source backed by a local SQLite table of pre-generated flights.
///
/// A fresh connection is opened per query and released before returning; no
/// pooling or reuse across calls.
pub struct StaticStore {
    db_path: String,
}

impl StaticStore {
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    /// Run an arbitrary multi-dimension query. Dimensions absent from the
    /// query are left out of the WHERE clause entirely.
    pub async fn query(&self, query: FlightQuery) -> Result<Vec<FlightRecord>> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || run_query(&db_path, &query))
            .await
            .map_err(|e| FlightDeskError::Internal(format!("store query task failed: {e}")))?
    }
}

#[async_trait]
impl FlightSource for StaticStore {
    async fn fetch(
        &self,
        origin: &str,
        destination: &str,
        departure_date: NaiveDate,
    ) -> Result<Vec<FlightRecord>> {
        let query = FlightQuery {
            origins: vec![origin.to_string()],
            destinations: vec![destination.to_string()],
            departure_dates: vec![departure_date.format("%Y-%m-%d").to_string()],
            ..FlightQuery::default()
        };
        self.query(query).await
    }
}

fn run_query(db_path: &str, query: &FlightQuery) -> Result<Vec<FlightRecord>> {
    let conn = Connection::open(db_path)?;
    let (sql, values) = build_sql(query);
    tracing::debug!(%sql, "querying static flight store");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), |row| {
        Ok(FlightRecord {
            flight_number: row.get(0)?,
            origin: row.get(1)?,
            destination: row.get(2)?,
            departure_date: row.get(3)?,
            departure_time: row.get(4)?,
            arrival_date: row.get(5)?,
            arrival_time: row.get(6)?,
            price: row.get(7)?,
            airline: row.get(8)?,
            duration: row.get(9)?,
            duration_min: row.get(10)?,
        })
    })?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

/// Compose the parameterized SELECT from only the supplied dimensions.
fn build_sql(query: &FlightQuery) -> (String, Vec<Value>) {
    let mut sql = format!("SELECT {COLUMNS} FROM FlightData WHERE 1=1");
    let mut values: Vec<Value> = Vec::new();

    let mut in_clause = |sql: &mut String, column: &str, items: &[String]| {
        if !items.is_empty() {
            let placeholders = vec!["?"; items.len()].join(", ");
            sql.push_str(&format!(" AND {column} IN ({placeholders})"));
            values.extend(items.iter().map(|v| Value::Text(v.clone())));
        }
    };

    in_clause(&mut sql, "Origin", &query.origins);
    in_clause(&mut sql, "Destination", &query.destinations);
    in_clause(&mut sql, "DepartureDate", &query.departure_dates);
    in_clause(&mut sql, "ArrivalDate", &query.arrival_dates);
    in_clause(&mut sql, "Airline", &query.airlines);

    if let Some((low, high)) = query.price {
        sql.push_str(" AND Price BETWEEN ? AND ?");
        values.push(Value::Real(low));
        values.push(Value::Real(high));
    }
    if let Some((low, high)) = query.duration_min {
        sql.push_str(" AND Duration_min BETWEEN ? AND ?");
        values.push(Value::Integer(low));
        values.push(Value::Integer(high));
    }

    (sql, values)
}

/// Create the FlightData table if it does not exist. Used by the seed binary.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS FlightData(
            FlightNumber TEXT NOT NULL,
            Origin TEXT NOT NULL,
            Destination TEXT NOT NULL,
            DepartureDate TEXT NOT NULL,
            DepartureTime TEXT NOT NULL,
            ArrivalDate TEXT NOT NULL,
            ArrivalTime TEXT NOT NULL,
            Price REAL NOT NULL,
            Airline TEXT NOT NULL,
            Duration TEXT NOT NULL,
            Duration_min INTEGER NOT NULL
        );",
    )?;
    Ok(())
}
