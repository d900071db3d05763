//! Populate the static flight store with randomized but realistic flights.
//!
//! Usage: `seed_flights [count]` (default 100 rows). The database path comes
//! from FLIGHTDESK_DB_PATH, defaulting to FlightData.db.

use anyhow::Result;
use chrono::Duration;
use rand::Rng;
use rusqlite::{Connection, params};

use flightdesk::extract::{AIRLINES, CITIES};
use flightdesk::source::store::ensure_schema;

const MINUTES_IN_2025: i64 = 365 * 24 * 60;

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let db_path =
        std::env::var("FLIGHTDESK_DB_PATH").unwrap_or_else(|_| "FlightData.db".to_string());
    let count: usize = std::env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(100);

    let conn = Connection::open(&db_path)?;
    ensure_schema(&conn)?;

    let year_start = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
        .expect("valid date")
        .and_hms_opt(0, 0, 0)
        .expect("valid time");

    let mut rng = rand::thread_rng();
    for _ in 0..count {
        let origin = CITIES[rng.gen_range(0..CITIES.len())];
        let destination = loop {
            let d = CITIES[rng.gen_range(0..CITIES.len())];
            if d != origin {
                break d;
            }
        };

        let departure = year_start + Duration::minutes(rng.gen_range(0..MINUTES_IN_2025));
        let duration_min: i64 = rng.gen_range(60..=240);
        let arrival = departure + Duration::minutes(duration_min);
        let price = rng.gen_range(3000..=10000) as f64;
        let airline = AIRLINES[rng.gen_range(0..AIRLINES.len())];
        let flight_number = format!(
            "{}{}{:03}",
            rng.gen_range(b'A'..=b'Z') as char,
            rng.gen_range(b'A'..=b'Z') as char,
            rng.gen_range(0..1000),
        );

        conn.execute(
            "INSERT INTO FlightData VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                flight_number,
                origin,
                destination,
                departure.format("%Y-%m-%d").to_string(),
                departure.format("%H:%M:%S").to_string(),
                arrival.format("%Y-%m-%d").to_string(),
                arrival.format("%H:%M:%S").to_string(),
                price,
                airline,
                format!("{}h {}m", duration_min / 60, duration_min % 60),
                duration_min,
            ],
        )?;
    }

    tracing::info!(db_path, count, "seeded flight data");
    Ok(())
}
