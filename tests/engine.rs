//! End-to-end tests for the query engine: the prepared-statement surface,
//! filtering, aggregation, mutation semantics and file persistence.

use flatdb::{Connection, Error, Value};

fn seeded_registrations() -> Connection {
    let conn = Connection::in_memory();
    let insert = conn
        .prepare(
            "INSERT INTO tournament_registrations \
             (name, email, payment_status, amount_paid, tournament_id) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .unwrap();
    insert
        .run(&[
            Value::from("Anya"),
            Value::from("anya@example.com"),
            Value::from("completed"),
            Value::from(25.0),
            Value::from(1),
        ])
        .unwrap();
    insert
        .run(&[
            Value::from("Boris"),
            Value::from("boris@example.com"),
            Value::from("pending"),
            Value::from(25.0),
            Value::from(1),
        ])
        .unwrap();
    insert
        .run(&[
            Value::from("Chitra"),
            Value::from("chitra@example.com"),
            Value::from("completed"),
            Value::from(40.0),
            Value::from(2),
        ])
        .unwrap();
    conn
}

#[test]
fn insert_read_round_trip() {
    let conn = seeded_registrations();
    let row = conn
        .prepare("SELECT * FROM tournament_registrations WHERE email = ?")
        .unwrap()
        .get(&[Value::from("anya@example.com")])
        .unwrap()
        .expect("inserted row should be found");

    assert_eq!(row.get("name"), Some(&Value::from("Anya")));
    assert_eq!(row.get("payment_status"), Some(&Value::from("completed")));
    assert_eq!(row.get("id"), Some(&Value::Integer(1)));
    assert!(matches!(row.get("created_at"), Some(Value::Text(_))));
}

#[test]
fn ids_are_max_plus_one() {
    let conn = seeded_registrations();
    let summary = conn
        .execute(
            "INSERT INTO tournament_registrations (name) VALUES (?)",
            &[Value::from("Dana")],
        )
        .unwrap();
    assert_eq!(summary.last_insert_rowid, Some(4));

    // Empty table starts at 1
    let first = conn
        .execute(
            "INSERT INTO demo_requests (name) VALUES (?)",
            &[Value::from("Ely")],
        )
        .unwrap();
    assert_eq!(first.last_insert_rowid, Some(1));
}

#[test]
fn equality_filter_excludes_non_matching_rows() {
    let conn = seeded_registrations();
    let rows = conn
        .prepare("SELECT * FROM tournament_registrations WHERE payment_status = ?")
        .unwrap()
        .all(&[Value::from("completed")])
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert!(rows
        .iter()
        .all(|r| r.get("payment_status") == Some(&Value::from("completed"))));
}

#[test]
fn arbitrary_field_filters_work() {
    // The original shim whitelisted a handful of field names and silently
    // ignored the rest; the parser-based engine filters on any field.
    let conn = seeded_registrations();
    let rows = conn
        .prepare("SELECT * FROM tournament_registrations WHERE email = ?")
        .unwrap()
        .all(&[Value::from("boris@example.com")])
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&Value::from("Boris")));
}

#[test]
fn boolean_composition_in_where() {
    let conn = seeded_registrations();
    let rows = conn
        .prepare(
            "SELECT name FROM tournament_registrations \
             WHERE payment_status = ? OR tournament_id = ? \
             ORDER BY id",
        )
        .unwrap()
        .all(&[Value::from("pending"), Value::from(2)])
        .unwrap();

    let names: Vec<_> = rows.iter().filter_map(|r| r.get("name")).collect();
    assert_eq!(names, vec![&Value::from("Boris"), &Value::from("Chitra")]);
}

#[test]
fn like_filters_substrings() {
    let conn = seeded_registrations();
    let rows = conn
        .prepare("SELECT * FROM tournament_registrations WHERE email LIKE ?")
        .unwrap()
        .all(&[Value::from("%chitra%")])
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&Value::from("Chitra")));
}

#[test]
fn update_without_where_applies_to_all_rows() {
    let conn = seeded_registrations();
    let summary = conn
        .execute(
            "UPDATE tournament_registrations SET payment_status = ?",
            &[Value::from("refunded")],
        )
        .unwrap();
    assert_eq!(summary.changes, 3);

    let rows = conn
        .prepare("SELECT * FROM tournament_registrations")
        .unwrap()
        .all(&[])
        .unwrap();
    assert!(rows
        .iter()
        .all(|r| r.get("payment_status") == Some(&Value::from("refunded"))));
    assert!(rows
        .iter()
        .all(|r| matches!(r.get("updated_at"), Some(Value::Text(_)))));
}

#[test]
fn update_with_where_targets_matching_rows() {
    let conn = seeded_registrations();
    let summary = conn
        .execute(
            "UPDATE tournament_registrations SET payment_status = ? WHERE payment_status = ?",
            &[Value::from("completed"), Value::from("pending")],
        )
        .unwrap();
    assert_eq!(summary.changes, 1);

    let pending = conn
        .prepare("SELECT * FROM tournament_registrations WHERE payment_status = ?")
        .unwrap()
        .all(&[Value::from("pending")])
        .unwrap();
    assert!(pending.is_empty());
}

#[test]
fn aggregates_over_filtered_subset() {
    let conn = seeded_registrations();
    let row = conn
        .prepare(
            "SELECT COUNT(*) AS count, SUM(amount_paid) AS total_revenue \
             FROM tournament_registrations WHERE payment_status = ?",
        )
        .unwrap()
        .get(&[Value::from("completed")])
        .unwrap()
        .expect("aggregate always yields one row");

    assert_eq!(row.get("count"), Some(&Value::Integer(2)));
    assert_eq!(row.get("total_revenue"), Some(&Value::Integer(65)));
}

#[test]
fn sum_treats_non_numeric_and_missing_as_zero() {
    let conn = Connection::in_memory();
    conn.execute(
        "INSERT INTO registrations (name, amount_paid) VALUES (?, ?)",
        &[Value::from("a"), Value::from(10.5)],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO registrations (name, amount_paid) VALUES (?, ?)",
        &[Value::from("b"), Value::from("not a number")],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO registrations (name) VALUES (?)",
        &[Value::from("c")],
    )
    .unwrap();

    let row = conn
        .prepare("SELECT COUNT(*) AS count, SUM(amount_paid) AS total FROM registrations")
        .unwrap()
        .get(&[])
        .unwrap()
        .unwrap();

    assert_eq!(row.get("count"), Some(&Value::Integer(3)));
    assert_eq!(row.get("total"), Some(&Value::Float(10.5)));
}

#[test]
fn aggregate_default_output_names() {
    let conn = seeded_registrations();
    let row = conn
        .prepare("SELECT COUNT(*) FROM tournament_registrations")
        .unwrap()
        .get(&[])
        .unwrap()
        .unwrap();
    assert_eq!(row.get("count"), Some(&Value::Integer(3)));
}

#[test]
fn order_by_created_at_and_id() {
    let conn = seeded_registrations();
    let rows = conn
        .prepare("SELECT id FROM tournament_registrations ORDER BY id DESC LIMIT 2")
        .unwrap()
        .all(&[])
        .unwrap();

    let ids: Vec<_> = rows.iter().filter_map(|r| r.get("id")).collect();
    assert_eq!(ids, vec![&Value::Integer(3), &Value::Integer(2)]);
}

#[test]
fn upcoming_rows_via_datetime_now() {
    let conn = Connection::in_memory();
    let insert = conn
        .prepare("INSERT INTO tournaments (name, start_date) VALUES (?, ?)")
        .unwrap();
    insert
        .run(&[Value::from("Spring Open"), Value::from("2000-04-01")])
        .unwrap();
    insert
        .run(&[Value::from("Future Masters"), Value::from("2999-04-01")])
        .unwrap();

    let rows = conn
        .prepare("SELECT name FROM tournaments WHERE start_date > datetime('now')")
        .unwrap()
        .all(&[])
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&Value::from("Future Masters")));
}

#[test]
fn delete_by_id_removes_exactly_one_row() {
    let conn = seeded_registrations();
    let summary = conn
        .execute(
            "DELETE FROM tournament_registrations WHERE id = ?",
            &[Value::from(2)],
        )
        .unwrap();
    assert_eq!(summary.changes, 1);

    let rows = conn
        .prepare("SELECT * FROM tournament_registrations")
        .unwrap()
        .all(&[])
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.get("id") != Some(&Value::Integer(2))));
}

#[test]
fn delete_without_match_reports_zero_changes() {
    let conn = seeded_registrations();
    let summary = conn
        .execute(
            "DELETE FROM tournament_registrations WHERE id = ?",
            &[Value::from(99)],
        )
        .unwrap();
    assert_eq!(summary.changes, 0);

    let rows = conn
        .prepare("SELECT * FROM tournament_registrations")
        .unwrap()
        .all(&[])
        .unwrap();
    assert_eq!(rows.len(), 3);
}

#[test]
fn unknown_table_reads_empty() {
    let conn = Connection::in_memory();
    let rows = conn
        .prepare("SELECT * FROM tornaments") // typo'd table name
        .unwrap()
        .all(&[])
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn parse_failure_is_a_typed_error_not_an_empty_result() {
    let conn = Connection::in_memory();
    assert!(matches!(
        conn.prepare("SELEC * FROM blogs"),
        Err(Error::Parse(_))
    ));
    assert!(matches!(
        conn.prepare("SELECT * FROM blogs; DELETE FROM blogs"),
        Err(Error::Parse(_))
    ));
}

#[test]
fn persistence_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("academy.json");

    {
        let conn = Connection::open(&path).unwrap();
        conn.execute(
            "INSERT INTO blogs (title, status) VALUES (?, ?)",
            &[Value::from("Zugzwang explained"), Value::from("published")],
        )
        .unwrap();
    }

    // Simulated process restart: a fresh connection over the same file
    let conn = Connection::open(&path).unwrap();
    let row = conn
        .prepare("SELECT * FROM blogs WHERE id = ?")
        .unwrap()
        .get(&[Value::from(1)])
        .unwrap()
        .expect("row should survive reload");
    assert_eq!(row.get("title"), Some(&Value::from("Zugzwang explained")));
    assert_eq!(row.get("status"), Some(&Value::from("published")));
}

#[test]
fn backing_file_is_pretty_json_table_map() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("academy.json");

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO gallery_images (caption) VALUES (?)",
        &[Value::from("Simul 2026")],
    )
    .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("  \"gallery_images\""), "2-space indentation");

    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(doc.get("gallery_images").unwrap().is_array());
}

#[test]
fn corrupt_backing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("academy.json");
    std::fs::write(&path, b"{\"blogs\": [oops").unwrap();

    assert!(matches!(
        Connection::open(&path),
        Err(Error::Corrupted(_, _))
    ));
}
