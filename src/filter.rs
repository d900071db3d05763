use crate::models::{FilterSpec, FlightRecord};

/// Apply the spec's predicates in order (airline set, price ceiling, time
/// bucket), then stable-sort ascending by departure time. The sort on the
/// zero-padded `HH:MM...` string is equivalent to a chronological sort.
pub fn apply(records: Vec<FlightRecord>, spec: &FilterSpec) -> Vec<FlightRecord> {
    let mut kept: Vec<FlightRecord> = records
        .into_iter()
        .filter(|r| spec.airlines.is_empty() || spec.airlines.contains(&r.airline))
        .filter(|r| spec.max_price.is_none_or(|max| r.price <= max))
        .filter(|r| match spec.time_bucket {
            Some(bucket) => departure_hour(r).is_some_and(|h| bucket.contains_hour(h)),
            None => true,
        })
        .collect();
    kept.sort_by(|a, b| a.departure_time.cmp(&b.departure_time));
    kept
}

fn departure_hour(record: &FlightRecord) -> Option<u32> {
    let hour: u32 = record.departure_time.get(..2)?.parse().ok()?;
    (hour < 24).then_some(hour)
}

/// Render the filtered set as a fixed-column markdown table with a trailing
/// summary line, or a "no flights found" sentence when nothing survived.
pub fn render_table(records: &[FlightRecord], spec: &FilterSpec) -> String {
    if records.is_empty() {
        return no_flights_sentence(spec);
    }

    let mut out = String::new();
    out.push_str("| Airline | Flight | Departure Time | Duration | Price |\n");
    out.push_str("| :--- | :--- | :--- | :--- | ---: |\n");
    for r in records {
        out.push_str(&format!(
            "| {} | {} | {} | {} | ₹{} |\n",
            r.airline,
            r.flight_number,
            short_time(&r.departure_time),
            r.duration,
            format_amount(r.price),
        ));
    }
    out.push('\n');
    out.push_str(&summary_line(records.len(), spec));
    out
}

/// `HH:MM:SS` or `HH:MM` to `HH:MM`.
fn short_time(time: &str) -> &str {
    time.get(..5).unwrap_or(time)
}

/// Thousands-separated integer rupee amount, decimals dropped.
fn format_amount(price: f64) -> String {
    let whole = price.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if whole < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn summary_line(count: usize, spec: &FilterSpec) -> String {
    let noun = if count == 1 { "flight" } else { "flights" };
    let mut line = format!("Showing {count} {noun}");
    let clauses = filter_clauses(spec);
    if !clauses.is_empty() {
        line.push(' ');
        line.push_str(&clauses.join(" and "));
    }
    line.push('.');
    line
}

/// Human-readable descriptions of the active filters, in application order.
fn filter_clauses(spec: &FilterSpec) -> Vec<String> {
    let mut clauses = Vec::new();
    if !spec.airlines.is_empty() {
        clauses.push(format!("on {}", spec.airlines.join(", ")));
    }
    if let Some(max) = spec.max_price {
        clauses.push(format!("under ₹{}", format_amount(max)));
    }
    if let Some(bucket) = spec.time_bucket {
        clauses.push(format!("departing in the {}", bucket.label()));
    }
    clauses
}

fn no_flights_sentence(spec: &FilterSpec) -> String {
    match spec.max_price {
        Some(max) => format!(
            "Sorry, no flights found under ₹{} for this route and date.",
            format_amount(max)
        ),
        None => "Sorry, no flights found for this route and date.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeBucket;
    use chrono::NaiveDate;

    fn record(flight: &str, airline: &str, time: &str, price: f64) -> FlightRecord {
        FlightRecord {
            flight_number: flight.to_string(),
            origin: "Delhi".to_string(),
            destination: "Mumbai".to_string(),
            departure_date: "2025-06-01".to_string(),
            departure_time: time.to_string(),
            arrival_date: "2025-06-01".to_string(),
            arrival_time: "23:59:00".to_string(),
            price,
            airline: airline.to_string(),
            duration: "2h 10m".to_string(),
            duration_min: 130,
        }
    }

    fn spec() -> FilterSpec {
        FilterSpec {
            origin: Some("Delhi".to_string()),
            destination: Some("Mumbai".to_string()),
            departure_date: NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"),
            max_price: None,
            time_bucket: None,
            airlines: vec![],
        }
    }

    #[test]
    fn test_price_ceiling_is_inclusive_and_sound() {
        let records = vec![
            record("AI1", "Air India", "10:00:00", 4000.0),
            record("SG2", "SpiceJet", "08:00:00", 6000.0),
            record("6E3", "IndiGo", "09:00:00", 5000.0),
        ];
        let mut s = spec();
        s.max_price = Some(5000.0);
        let kept = apply(records, &s);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.price <= 5000.0));
    }

    #[test]
    fn test_time_bucket_keeps_only_matching_hours() {
        let records = vec![
            record("A", "IndiGo", "06:15:00", 4000.0),
            record("B", "IndiGo", "12:00:00", 4000.0),
            record("C", "IndiGo", "16:59:00", 4000.0),
            record("D", "IndiGo", "17:00:00", 4000.0),
            record("E", "IndiGo", "23:30:00", 4000.0),
        ];
        let mut s = spec();
        s.time_bucket = Some(TimeBucket::Afternoon);
        let kept = apply(records.clone(), &s);
        assert_eq!(
            kept.iter().map(|r| r.flight_number.as_str()).collect::<Vec<_>>(),
            vec!["B", "C"]
        );

        s.time_bucket = Some(TimeBucket::Night);
        let kept = apply(records, &s);
        assert_eq!(
            kept.iter().map(|r| r.flight_number.as_str()).collect::<Vec<_>>(),
            vec!["D", "E"]
        );
    }

    #[test]
    fn test_airline_set_filter() {
        let records = vec![
            record("A", "IndiGo", "06:15:00", 4000.0),
            record("B", "Vistara", "09:00:00", 4000.0),
        ];
        let mut s = spec();
        s.airlines = vec!["Vistara".to_string()];
        let kept = apply(records, &s);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].airline, "Vistara");
    }

    #[test]
    fn test_sort_is_ascending_and_idempotent() {
        let records = vec![
            record("C", "IndiGo", "18:30:00", 4000.0),
            record("A", "IndiGo", "06:15:00", 4000.0),
            record("B", "IndiGo", "12:00:00", 4000.0),
        ];
        let once = apply(records, &spec());
        let times: Vec<_> = once.iter().map(|r| r.departure_time.clone()).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);

        let twice = apply(once.clone(), &spec());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_scenario_a_summary_line() {
        let records = vec![
            record("AI1", "Air India", "10:00:00", 4000.0),
            record("SG2", "SpiceJet", "08:00:00", 6000.0),
            record("6E3", "IndiGo", "09:00:00", 4500.0),
        ];
        let mut s = spec();
        s.max_price = Some(5000.0);
        let kept = apply(records, &s);
        assert_eq!(kept.len(), 2);
        // Sorted by departure time: the 4500 (09:00) before the 4000 (10:00)
        assert_eq!(kept[0].flight_number, "6E3");
        assert_eq!(kept[1].flight_number, "AI1");

        let table = render_table(&kept, &s);
        assert!(table.contains("| Airline | Flight | Departure Time | Duration | Price |"));
        assert!(table.contains("₹4,500"));
        assert!(table.ends_with("Showing 2 flights under ₹5,000."));
    }

    #[test]
    fn test_empty_result_renders_sentence_not_table() {
        let mut s = spec();
        s.max_price = Some(3000.0);
        let body = render_table(&[], &s);
        assert_eq!(
            body,
            "Sorry, no flights found under ₹3,000 for this route and date."
        );
        assert!(!body.contains('|'));
    }

    #[test]
    fn test_summary_joins_clauses_with_and() {
        let mut s = spec();
        s.max_price = Some(5000.0);
        s.time_bucket = Some(TimeBucket::Morning);
        s.airlines = vec!["IndiGo".to_string()];
        let records = vec![record("6E3", "IndiGo", "09:00:00", 4500.0)];
        let table = render_table(&records, &s);
        assert!(table.ends_with(
            "Showing 1 flight on IndiGo and under ₹5,000 and departing in the morning."
        ));
    }

    #[test]
    fn test_amount_formatting() {
        assert_eq!(format_amount(500.0), "500");
        assert_eq!(format_amount(5000.0), "5,000");
        assert_eq!(format_amount(123456.0), "123,456");
        assert_eq!(format_amount(4999.6), "5,000");
    }

    /// Re-parse rendered rows and recover the displayed tuple for each record.
    fn parse_rows(table: &str) -> Vec<(String, String, String, String, String)> {
        table
            .lines()
            .skip(2)
            .take_while(|l| l.starts_with('|'))
            .map(|line| {
                let cells: Vec<&str> = line
                    .trim_matches('|')
                    .split('|')
                    .map(str::trim)
                    .collect();
                (
                    cells[0].to_string(),
                    cells[1].to_string(),
                    cells[2].to_string(),
                    cells[3].to_string(),
                    cells[4].to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_table_round_trip() {
        let records = vec![
            record("6E3", "IndiGo", "09:00:00", 4500.0),
            record("AI1", "Air India", "10:00:00", 12000.0),
        ];
        let table = render_table(&records, &spec());
        let rows = parse_rows(&table);
        assert_eq!(rows.len(), 2);
        for (row, rec) in rows.iter().zip(&records) {
            assert_eq!(row.0, rec.airline);
            assert_eq!(row.1, rec.flight_number);
            assert_eq!(row.2, short_time(&rec.departure_time));
            assert_eq!(row.3, rec.duration);
            let reparsed: f64 = row
                .4
                .trim_start_matches('₹')
                .replace(',', "")
                .parse()
                .expect("price cell parses back");
            assert_eq!(reparsed, rec.price);
        }
    }
}
