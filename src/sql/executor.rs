/// Statement executor - runs parsed statements against the table store
use super::ast::*;
use super::evaluator::{now_text, ExprEvaluator};
use crate::error::{Error, Result};
use crate::store::TableStore;
use crate::types::{Record, Value};
use std::cmp::Ordering;

/// Mutation summary, the `run` result shape: how many rows changed and, for
/// inserts, the id the new row received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub changes: usize,
    pub last_insert_rowid: Option<i64>,
}

impl RunSummary {
    fn none() -> Self {
        Self {
            changes: 0,
            last_insert_rowid: None,
        }
    }
}

/// Execute a SELECT against the store, producing projected rows.
///
/// Pipeline: filter -> order -> offset/limit -> project or aggregate.
pub fn select_rows(
    store: &TableStore,
    stmt: &SelectStmt,
    params: &[Value],
) -> Result<Vec<Record>> {
    let eval = ExprEvaluator::new(params);

    let mut rows: Vec<&Record> = Vec::new();
    for record in store.table(&stmt.table) {
        let keep = match &stmt.where_clause {
            Some(expr) => eval.matches(expr, record)?,
            None => true,
        };
        if keep {
            rows.push(record);
        }
    }

    // Aggregates collapse the filtered set to one synthetic row and ignore
    // ordering and limits.
    if stmt.columns.iter().any(SelectColumn::is_aggregate) {
        if !stmt.columns.iter().all(SelectColumn::is_aggregate) {
            return Err(Error::Type(
                "cannot mix aggregate and plain columns in one select list".to_string(),
            ));
        }
        return Ok(vec![aggregate_row(&stmt.columns, &rows)]);
    }

    if !stmt.order_by.is_empty() {
        sort_rows(&mut rows, &stmt.order_by);
    }

    let offset = stmt.offset.unwrap_or(0);
    let rows = rows
        .into_iter()
        .skip(offset)
        .take(stmt.limit.unwrap_or(usize::MAX));

    Ok(rows.map(|record| project(record, &stmt.columns)).collect())
}

/// Stable multi-key sort with loose cross-type comparison. Null and missing
/// values order before everything else under ASC.
fn sort_rows(rows: &mut [&Record], keys: &[OrderByKey]) {
    rows.sort_by(|a, b| {
        for key in keys {
            let left = a.get(&key.column).unwrap_or(&Value::Null);
            let right = b.get(&key.column).unwrap_or(&Value::Null);
            let ordering = match (left.is_null(), right.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => left.loosely_cmp(right).unwrap_or(Ordering::Equal),
            };
            let ordering = if key.asc { ordering } else { ordering.reverse() };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn project(record: &Record, columns: &[SelectColumn]) -> Record {
    let mut out = Record::new();
    for column in columns {
        match column {
            SelectColumn::Star => out.extend(record.clone()),
            SelectColumn::Column { name, alias } => {
                let value = record.get(name).cloned().unwrap_or(Value::Null);
                out.insert(alias.clone().unwrap_or_else(|| name.clone()), value);
            }
            SelectColumn::Aggregate { .. } => unreachable!("aggregates take the aggregate path"),
        }
    }
    out
}

fn aggregate_row(columns: &[SelectColumn], rows: &[&Record]) -> Record {
    let mut out = Record::new();
    for column in columns {
        let SelectColumn::Aggregate { func, alias } = column else {
            unreachable!("select list was checked to be all-aggregate");
        };
        let name = alias
            .clone()
            .unwrap_or_else(|| func.default_name().to_string());
        let value = match func {
            AggregateFunc::CountStar => Value::Integer(rows.len() as i64),
            AggregateFunc::Sum(field) => {
                // Non-numeric and missing values count as zero
                let total: f64 = rows
                    .iter()
                    .map(|record| {
                        record
                            .get(field)
                            .map(Value::numeric_or_zero)
                            .unwrap_or(0.0)
                    })
                    .sum();
                if total.fract() == 0.0 {
                    Value::Integer(total as i64)
                } else {
                    Value::Float(total)
                }
            }
        };
        out.insert(name, value);
    }
    out
}

/// Executes mutations; owns the write side of the store for one call.
pub struct QueryExecutor<'a> {
    store: &'a mut TableStore,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(store: &'a mut TableStore) -> Self {
        Self { store }
    }

    /// Execute any statement in `run` mode. A SELECT executes and reports
    /// zero changes, matching embedded-SQL driver behavior.
    pub fn run(&mut self, stmt: &Statement, params: &[Value]) -> Result<RunSummary> {
        match stmt {
            Statement::Select(select) => {
                select_rows(self.store, select, params)?;
                Ok(RunSummary::none())
            }
            Statement::Insert(insert) => self.insert(insert, params),
            Statement::Update(update) => self.update(update, params),
            Statement::Delete(delete) => self.delete(delete, params),
        }
    }

    fn insert(&mut self, stmt: &InsertStmt, params: &[Value]) -> Result<RunSummary> {
        let eval = ExprEvaluator::new(params);
        let empty = Record::new();

        let mut record = Record::new();
        if let Some(columns) = &stmt.columns {
            for (column, expr) in columns.iter().zip(&stmt.values) {
                record.insert(column.clone(), eval.eval(expr, &empty)?);
            }
        }

        // id is always engine-assigned; a caller-supplied id would break the
        // per-table uniqueness invariant.
        let id = self.store.next_id(&stmt.table);
        record.insert("id".to_string(), Value::Integer(id));

        let now = now_text();
        record
            .entry("created_at".to_string())
            .or_insert_with(|| Value::Text(now.clone()));
        record
            .entry("updated_at".to_string())
            .or_insert_with(|| Value::Text(now.clone()));

        self.store.table_mut(&stmt.table).push(record);
        self.store.save()?;

        Ok(RunSummary {
            changes: 1,
            last_insert_rowid: Some(id),
        })
    }

    fn update(&mut self, stmt: &UpdateStmt, params: &[Value]) -> Result<RunSummary> {
        let eval = ExprEvaluator::new(params);
        let now = now_text();
        let mut changes = 0;

        {
            let table = self.store.table_mut(&stmt.table);

            // Evaluate every decision first so an error on a later row
            // cannot leave the table half-updated. Assignments also read the
            // pre-update row this way, the usual SQL SET semantics.
            let mut pending: Vec<Option<Vec<(String, Value)>>> =
                Vec::with_capacity(table.len());
            for record in table.iter() {
                let matched = match &stmt.where_clause {
                    Some(expr) => eval.matches(expr, record)?,
                    // No WHERE clause broadcasts to every row
                    None => true,
                };
                if !matched {
                    pending.push(None);
                    continue;
                }

                let mut values = Vec::with_capacity(stmt.assignments.len());
                for (column, expr) in &stmt.assignments {
                    values.push((column.clone(), eval.eval(expr, record)?));
                }
                pending.push(Some(values));
            }

            for (record, update) in table.iter_mut().zip(pending) {
                let Some(values) = update else {
                    continue;
                };
                for (column, value) in values {
                    record.insert(column, value);
                }
                record.insert("updated_at".to_string(), Value::Text(now.clone()));
                changes += 1;
            }
        }

        if changes > 0 {
            self.store.save()?;
        }
        Ok(RunSummary {
            changes,
            last_insert_rowid: None,
        })
    }

    fn delete(&mut self, stmt: &DeleteStmt, params: &[Value]) -> Result<RunSummary> {
        let eval = ExprEvaluator::new(params);
        let changes;

        {
            let table = self.store.table_mut(&stmt.table);
            let before = table.len();
            match &stmt.where_clause {
                Some(expr) => {
                    // Decide first so an evaluation error cannot leave the
                    // table half-deleted.
                    let doomed: Vec<bool> = table
                        .iter()
                        .map(|record| eval.matches(expr, record))
                        .collect::<Result<_>>()?;
                    let mut index = 0;
                    table.retain(|_| {
                        let keep = !doomed[index];
                        index += 1;
                        keep
                    });
                }
                None => table.clear(),
            }
            changes = before - table.len();
        }

        if changes > 0 {
            self.store.save()?;
        }
        Ok(RunSummary {
            changes,
            last_insert_rowid: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::lexer::Lexer;
    use crate::sql::parser::Parser;

    fn parse(sql: &str) -> Statement {
        let tokens = Lexer::new(sql).tokenize().unwrap();
        let mut parser = Parser::new(tokens);
        let stmt = parser.parse().unwrap();
        parser.finish().unwrap();
        stmt
    }

    fn run(store: &mut TableStore, sql: &str, params: &[Value]) -> RunSummary {
        QueryExecutor::new(store).run(&parse(sql), params).unwrap()
    }

    fn select(store: &TableStore, sql: &str, params: &[Value]) -> Vec<Record> {
        match parse(sql) {
            Statement::Select(s) => select_rows(store, &s, params).unwrap(),
            _ => panic!("Expected SELECT"),
        }
    }

    #[test]
    fn test_insert_assigns_id_and_timestamps() {
        let mut store = TableStore::in_memory();
        let summary = run(
            &mut store,
            "INSERT INTO blogs (title, status) VALUES (?, ?)",
            &[Value::from("Endgames"), Value::from("draft")],
        );
        assert_eq!(summary.changes, 1);
        assert_eq!(summary.last_insert_rowid, Some(1));

        let rows = select(&store, "SELECT * FROM blogs", &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id"), Some(&Value::Integer(1)));
        assert_eq!(rows[0].get("title"), Some(&Value::from("Endgames")));
        assert!(matches!(rows[0].get("created_at"), Some(Value::Text(_))));
        assert!(matches!(rows[0].get("updated_at"), Some(Value::Text(_))));
    }

    #[test]
    fn test_insert_without_column_list_gets_only_auto_columns() {
        let mut store = TableStore::in_memory();
        run(&mut store, "INSERT INTO blogs VALUES (?)", &[Value::from("ignored")]);

        let rows = select(&store, "SELECT * FROM blogs", &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id"), Some(&Value::Integer(1)));
        assert_eq!(rows[0].len(), 3); // id, created_at, updated_at
    }

    #[test]
    fn test_id_reuses_gap_after_delete() {
        let mut store = TableStore::in_memory();
        for _ in 0..3 {
            run(&mut store, "INSERT INTO blogs (title) VALUES (?)", &[Value::from("t")]);
        }
        run(&mut store, "DELETE FROM blogs WHERE id = ?", &[Value::from(3)]);

        let summary = run(&mut store, "INSERT INTO blogs (title) VALUES (?)", &[Value::from("t")]);
        assert_eq!(summary.last_insert_rowid, Some(3));
    }

    #[test]
    fn test_order_limit_offset() {
        let mut store = TableStore::in_memory();
        for title in ["a", "b", "c", "d"] {
            run(&mut store, "INSERT INTO blogs (title) VALUES (?)", &[Value::from(title)]);
        }

        let rows = select(
            &store,
            "SELECT title FROM blogs ORDER BY id DESC LIMIT 2 OFFSET 1",
            &[],
        );
        assert_eq!(
            rows.iter().map(|r| r.get("title").cloned()).collect::<Vec<_>>(),
            vec![Some(Value::from("c")), Some(Value::from("b"))]
        );
    }

    #[test]
    fn test_projection_with_alias_and_missing_column() {
        let mut store = TableStore::in_memory();
        run(&mut store, "INSERT INTO blogs (title) VALUES (?)", &[Value::from("x")]);

        let rows = select(&store, "SELECT title AS heading, views FROM blogs", &[]);
        assert_eq!(rows[0].get("heading"), Some(&Value::from("x")));
        assert_eq!(rows[0].get("views"), Some(&Value::Null));
    }

    #[test]
    fn test_mixed_aggregate_and_column_rejected() {
        let store = TableStore::in_memory();
        let Statement::Select(s) = parse("SELECT COUNT(*), title FROM blogs") else {
            panic!("Expected SELECT");
        };
        assert!(matches!(select_rows(&store, &s, &[]), Err(Error::Type(_))));
    }

    #[test]
    fn test_update_broadcasts_without_where() {
        let mut store = TableStore::in_memory();
        for _ in 0..3 {
            run(
                &mut store,
                "INSERT INTO admin_settings (is_active) VALUES (?)",
                &[Value::from(1)],
            );
        }

        let summary = run(&mut store, "UPDATE admin_settings SET is_active = 0", &[]);
        assert_eq!(summary.changes, 3);

        let rows = select(&store, "SELECT * FROM admin_settings WHERE is_active = 1", &[]);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_failed_update_leaves_no_row_changed() {
        let mut store = TableStore::in_memory();
        run(
            &mut store,
            "INSERT INTO registrations (name, amount_paid) VALUES (?, ?)",
            &[Value::from("a"), Value::from(5)],
        );
        run(
            &mut store,
            "INSERT INTO registrations (name, amount_paid) VALUES (?, ?)",
            &[Value::from("b"), Value::from(0)],
        );

        // Second row divides by zero; the first row, already evaluated by
        // then, must not keep a half-applied assignment.
        let stmt = parse("UPDATE registrations SET share = 10 / amount_paid");
        let err = QueryExecutor::new(&mut store).run(&stmt, &[]).unwrap_err();
        assert!(matches!(err, Error::DivisionByZero));

        let rows = select(&store, "SELECT * FROM registrations", &[]);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| !r.contains_key("share")));
    }

    #[test]
    fn test_delete_without_match_changes_nothing() {
        let mut store = TableStore::in_memory();
        run(&mut store, "INSERT INTO blogs (title) VALUES (?)", &[Value::from("keep")]);

        let summary = run(&mut store, "DELETE FROM blogs WHERE id = ?", &[Value::from(99)]);
        assert_eq!(summary.changes, 0);
        assert_eq!(select(&store, "SELECT * FROM blogs", &[]).len(), 1);
    }

    #[test]
    fn test_run_on_select_reports_zero_changes() {
        let mut store = TableStore::in_memory();
        let summary = run(&mut store, "SELECT * FROM blogs", &[]);
        assert_eq!(summary, RunSummary::none());
    }
}
