//! Implements a SQLite backed transaction store.
use std::sync::{Arc, Mutex};

use rusqlite::{
    Connection, Row, params_from_iter,
    types::{Type, Value},
};

use crate::{
    Error,
    database_id::{OwnerId, TransactionId},
    db::{CreateTable, MapRow},
    stores::{
        TransactionStore,
        transaction::{SortKey, SortOrder, StoreQuery, TransactionFilter},
    },
    transaction::{Transaction, TransactionBuilder, TransactionKind, TransactionPatch},
};

/// The column list every read and RETURNING clause uses, in the order
/// [SQLiteTransactionStore::map_row] expects.
const COLUMNS: &str = "id, owner_id, kind, amount, date, description, category";

/// Stores transactions in a SQLite database.
///
/// Amounts are stored as decimal text rather than SQLite's binary floats so
/// that currency values round-trip exactly; ordering by amount casts to a
/// numeric value inside the query.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

/// Render `filter` as a WHERE clause, appending its values to `parameters`.
///
/// The owner predicate is always present, so no query can cross the
/// ownership boundary at the store layer.
fn where_clause(filter: &TransactionFilter, parameters: &mut Vec<Value>) -> String {
    let mut parts = vec![format!("owner_id = ?{}", parameters.len() + 1)];
    parameters.push(Value::Integer(filter.owner.as_i64()));

    if let Some(kind) = filter.kind {
        parts.push(format!("kind = ?{}", parameters.len() + 1));
        parameters.push(Value::Text(kind.as_str().to_owned()));
    }

    if let Some(date_range) = &filter.date_range {
        parts.push(format!(
            "date BETWEEN ?{} AND ?{}",
            parameters.len() + 1,
            parameters.len() + 2,
        ));
        parameters.push(Value::Text(date_range.start().to_string()));
        parameters.push(Value::Text(date_range.end().to_string()));
    }

    if let Some(search) = &filter.search {
        parts.push(format!(
            "instr(lower(description), lower(?{})) > 0",
            parameters.len() + 1
        ));
        parameters.push(Value::Text(search.clone()));
    }

    format!("WHERE {}", parts.join(" AND "))
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an
    /// unexpected SQL error.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO \"transaction\" (owner_id, kind, amount, date, description, category)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {COLUMNS}",
            ))?
            .query_row(
                (
                    builder.owner_id.as_i64(),
                    builder.kind.as_str(),
                    builder.amount.to_string(),
                    builder.date,
                    builder.description,
                    builder.category,
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM \"transaction\" WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(transaction)
    }

    /// Query for transactions in the database.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn get_query(&self, query: StoreQuery) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts = vec![format!("SELECT {COLUMNS} FROM \"transaction\"")];
        let mut query_parameters = vec![];

        query_string_parts.push(where_clause(&query.filter, &mut query_parameters));

        let sort_column = match query.sort_key {
            SortKey::Date => "date",
            // Amounts are stored as decimal text, which would sort
            // lexicographically.
            SortKey::Amount => "CAST(amount AS REAL)",
        };
        let direction = match query.sort_order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        // Sort by the requested key, and then ID to keep transaction order
        // stable across pages when values tie.
        query_string_parts.push(format!("ORDER BY {sort_column} {direction}, id ASC"));

        match query.limit {
            Some(limit) => query_string_parts.push(format!("LIMIT {limit} OFFSET {}", query.offset)),
            None if query.offset > 0 => {
                query_string_parts.push(format!("LIMIT -1 OFFSET {}", query.offset))
            }
            None => {}
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    /// Get the number of transactions matching `filter`.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is some SQL
    /// error.
    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error> {
        let mut query_parameters = vec![];
        let query_string = format!(
            "SELECT COUNT(id) FROM \"transaction\" {}",
            where_clause(filter, &mut query_parameters)
        );

        self.connection
            .lock()
            .unwrap()
            .query_row(
                &query_string,
                params_from_iter(query_parameters.iter()),
                |row| row.get::<_, i64>(0).map(|count| count as u64),
            )
            .map_err(|error| error.into())
    }

    /// Overwrite the fields provided in `patch`, keeping the rest.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, id: TransactionId, patch: &TransactionPatch) -> Result<Transaction, Error> {
        if patch.is_empty() {
            return self.get(id);
        }

        let mut assignments = vec![];
        let mut parameters: Vec<Value> = vec![];

        if let Some(kind) = patch.kind {
            assignments.push(format!("kind = ?{}", parameters.len() + 1));
            parameters.push(Value::Text(kind.as_str().to_owned()));
        }

        if let Some(amount) = patch.amount {
            assignments.push(format!("amount = ?{}", parameters.len() + 1));
            parameters.push(Value::Text(amount.to_string()));
        }

        if let Some(description) = &patch.description {
            assignments.push(format!("description = ?{}", parameters.len() + 1));
            parameters.push(Value::Text(description.clone()));
        }

        if let Some(category) = &patch.category {
            assignments.push(format!("category = ?{}", parameters.len() + 1));
            parameters.push(match category {
                Some(label) => Value::Text(label.clone()),
                None => Value::Null,
            });
        }

        if let Some(date) = patch.date {
            assignments.push(format!("date = ?{}", parameters.len() + 1));
            parameters.push(Value::Text(date.to_string()));
        }

        let query_string = format!(
            "UPDATE \"transaction\" SET {} WHERE id = ?{} RETURNING {COLUMNS}",
            assignments.join(", "),
            parameters.len() + 1,
        );
        parameters.push(Value::Integer(id));

        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_row(params_from_iter(parameters.iter()), Self::map_row)?;

        Ok(transaction)
    }

    /// Remove a transaction from the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: TransactionId) -> Result<(), Error> {
        let rows_deleted = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    owner_id INTEGER NOT NULL,
                    kind TEXT NOT NULL,
                    amount TEXT NOT NULL,
                    date TEXT NOT NULL,
                    description TEXT NOT NULL,
                    category TEXT
                    )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_transaction_owner_date
                 ON \"transaction\" (owner_id, date)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let owner_id = OwnerId::new(row.get(offset + 1)?);
        let kind = parse_kind(row, offset + 2)?;
        let amount = parse_amount(row, offset + 3)?;
        let date = row.get(offset + 4)?;
        let description = row.get(offset + 5)?;
        let category = row.get(offset + 6)?;

        Ok(Transaction {
            id,
            owner_id,
            kind,
            amount,
            description,
            category,
            date,
        })
    }
}

fn parse_kind(row: &Row, index: usize) -> Result<TransactionKind, rusqlite::Error> {
    let raw: String = row.get(index)?;

    match raw.as_str() {
        "Income" => Ok(TransactionKind::Income),
        "Expense" => Ok(TransactionKind::Expense),
        _ => Err(rusqlite::Error::FromSqlConversionFailure(
            index,
            Type::Text,
            format!("unknown transaction kind \"{raw}\"").into(),
        )),
    }
}

fn parse_amount(row: &Row, index: usize) -> Result<rust_decimal::Decimal, rusqlite::Error> {
    let raw: String = row.get(index)?;

    raw.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}

#[cfg(test)]
mod sqlite_transaction_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        database_id::OwnerId,
        db::initialize,
        stores::transaction::{SortKey, SortOrder, StoreQuery, TransactionFilter},
        transaction::{Transaction, TransactionBuilder, TransactionKind, TransactionPatch},
    };

    use super::{Error, SQLiteTransactionStore, TransactionStore};

    fn get_test_store() -> SQLiteTransactionStore {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)))
    }

    fn amount(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    fn expense(owner: i64, amount_text: &str, day: time::Date) -> TransactionBuilder {
        Transaction::build(
            OwnerId::new(owner),
            TransactionKind::Expense,
            amount(amount_text),
        )
        .description("test expense")
        .date(day)
    }

    #[test]
    fn create_assigns_distinct_ids() {
        let mut store = get_test_store();

        let first = store
            .create(expense(1, "12.30", date!(2025 - 01 - 05)))
            .unwrap();
        let second = store
            .create(expense(1, "45.60", date!(2025 - 01 - 06)))
            .unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn create_then_get_round_trips_amount_exactly() {
        let mut store = get_test_store();
        let want = store
            .create(expense(1, "0.10", date!(2025 - 01 - 05)))
            .unwrap();

        let got = store.get(want.id).unwrap();

        assert_eq!(want, got);
        assert_eq!(got.amount, amount("0.10"));
    }

    #[test]
    fn get_fails_on_invalid_id() {
        let mut store = get_test_store();
        let transaction = store
            .create(expense(1, "12.30", date!(2025 - 01 - 05)))
            .unwrap();

        let maybe_transaction = store.get(transaction.id + 654);

        assert_eq!(maybe_transaction, Err(Error::NotFound));
    }

    #[test]
    fn get_query_only_returns_owners_transactions() {
        let mut store = get_test_store();
        let want = store
            .create(expense(1, "12.30", date!(2025 - 01 - 05)))
            .unwrap();
        store
            .create(expense(2, "99.99", date!(2025 - 01 - 05)))
            .unwrap();

        let got = store
            .get_query(StoreQuery::new(TransactionFilter::new(OwnerId::new(1))))
            .unwrap();

        assert_eq!(got, vec![want]);
    }

    #[test]
    fn get_query_filters_by_kind() {
        let mut store = get_test_store();
        store
            .create(
                Transaction::build(OwnerId::new(1), TransactionKind::Income, amount("1000.00"))
                    .description("salary")
                    .date(date!(2025 - 01 - 05)),
            )
            .unwrap();
        let want = store
            .create(expense(1, "12.30", date!(2025 - 01 - 06)))
            .unwrap();

        let got = store
            .get_query(StoreQuery::new(TransactionFilter {
                kind: Some(TransactionKind::Expense),
                ..TransactionFilter::new(OwnerId::new(1))
            }))
            .unwrap();

        assert_eq!(got, vec![want]);
    }

    #[test]
    fn get_query_date_range_is_inclusive() {
        let mut store = get_test_store();
        let start_date = date!(2025 - 01 - 10);
        let end_date = date!(2025 - 01 - 20);

        let want = [
            store.create(expense(1, "1.00", start_date)).unwrap(),
            store
                .create(expense(1, "2.00", date!(2025 - 01 - 15)))
                .unwrap(),
            store.create(expense(1, "3.00", end_date)).unwrap(),
        ];

        // The below transactions should NOT be returned by the query.
        store
            .create(expense(1, "999.99", date!(2025 - 01 - 09)))
            .unwrap();
        store
            .create(expense(1, "999.99", date!(2025 - 01 - 21)))
            .unwrap();

        let got = store
            .get_query(StoreQuery::new(TransactionFilter {
                date_range: Some(start_date..=end_date),
                ..TransactionFilter::new(OwnerId::new(1))
            }))
            .unwrap();

        assert_eq!(got, want, "got transactions {got:?}, want {want:?}");
    }

    #[test]
    fn get_query_search_is_case_insensitive() {
        let mut store = get_test_store();
        let want = store
            .create(
                Transaction::build(OwnerId::new(1), TransactionKind::Expense, amount("4.50"))
                    .description("Coffee at WORK")
                    .date(date!(2025 - 01 - 05)),
            )
            .unwrap();
        store
            .create(expense(1, "12.30", date!(2025 - 01 - 05)))
            .unwrap();

        let got = store
            .get_query(StoreQuery::new(TransactionFilter {
                search: Some("coffee".to_owned()),
                ..TransactionFilter::new(OwnerId::new(1))
            }))
            .unwrap();

        assert_eq!(got, vec![want]);
    }

    #[test]
    fn get_query_sorts_amounts_numerically() {
        let mut store = get_test_store();
        for amount_text in ["100.00", "9.50", "20.00"] {
            store
                .create(expense(1, amount_text, date!(2025 - 01 - 05)))
                .unwrap();
        }

        let got = store
            .get_query(StoreQuery {
                sort_key: SortKey::Amount,
                ..StoreQuery::new(TransactionFilter::new(OwnerId::new(1)))
            })
            .unwrap();

        // A lexicographic sort of the stored text would put "100.00" first.
        let got_amounts: Vec<Decimal> = got.iter().map(|transaction| transaction.amount).collect();
        assert_eq!(
            got_amounts,
            vec![amount("9.50"), amount("20.00"), amount("100.00")]
        );
    }

    #[test]
    fn get_query_breaks_ties_by_id_ascending() {
        let mut store = get_test_store();
        let mut want_ids = vec![];
        for _ in 0..3 {
            let transaction = store
                .create(expense(1, "10.00", date!(2025 - 01 - 05)))
                .unwrap();
            want_ids.push(transaction.id);
        }

        let got = store
            .get_query(StoreQuery {
                sort_key: SortKey::Amount,
                sort_order: SortOrder::Descending,
                ..StoreQuery::new(TransactionFilter::new(OwnerId::new(1)))
            })
            .unwrap();

        let got_ids: Vec<_> = got.iter().map(|transaction| transaction.id).collect();
        assert_eq!(
            got_ids, want_ids,
            "tied transactions should keep ascending ID order"
        );
    }

    #[test]
    fn get_query_applies_limit_and_offset() {
        let mut store = get_test_store();
        let offset = 10;
        let limit = 5;
        let mut want = Vec::new();
        for i in 1..20 {
            let transaction = store
                .create(expense(1, &format!("{i}.00"), date!(2025 - 01 - 05)))
                .unwrap();

            if i > offset && i <= offset + limit {
                want.push(transaction);
            }
        }

        let got = store
            .get_query(StoreQuery {
                sort_key: SortKey::Amount,
                offset: offset as u64,
                limit: Some(limit as u64),
                ..StoreQuery::new(TransactionFilter::new(OwnerId::new(1)))
            })
            .unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn count_ignores_other_owners() {
        let mut store = get_test_store();
        let want_count: u64 = 20;
        for i in 1..=want_count {
            store
                .create(expense(1, &format!("{i}.00"), date!(2025 - 01 - 05)))
                .unwrap();
        }
        store
            .create(expense(2, "1.00", date!(2025 - 01 - 05)))
            .unwrap();

        let got_count = store.count(&TransactionFilter::new(OwnerId::new(1))).unwrap();

        assert_eq!(want_count, got_count);
    }

    #[test]
    fn update_patches_only_provided_fields() {
        let mut store = get_test_store();
        let original = store
            .create(
                Transaction::build(OwnerId::new(1), TransactionKind::Expense, amount("12.30"))
                    .description("groceries")
                    .category(Some("Food".to_owned()))
                    .date(date!(2025 - 01 - 05)),
            )
            .unwrap();

        let got = store
            .update(
                original.id,
                &TransactionPatch {
                    amount: Some(amount("45.60")),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(got.amount, amount("45.60"));
        assert_eq!(got.description, original.description);
        assert_eq!(got.category, original.category);
        assert_eq!(got.date, original.date);
        assert_eq!(got.kind, original.kind);
    }

    #[test]
    fn update_clears_category_with_explicit_null() {
        let mut store = get_test_store();
        let original = store
            .create(
                Transaction::build(OwnerId::new(1), TransactionKind::Expense, amount("12.30"))
                    .description("groceries")
                    .category(Some("Food".to_owned()))
                    .date(date!(2025 - 01 - 05)),
            )
            .unwrap();

        let got = store
            .update(
                original.id,
                &TransactionPatch {
                    category: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(got.category, None);
    }

    #[test]
    fn update_with_empty_patch_returns_current_record() {
        let mut store = get_test_store();
        let want = store
            .create(expense(1, "12.30", date!(2025 - 01 - 05)))
            .unwrap();

        let got = store.update(want.id, &TransactionPatch::default()).unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn update_fails_on_invalid_id() {
        let mut store = get_test_store();

        let maybe_transaction = store.update(
            42,
            &TransactionPatch {
                description: Some("missing".to_owned()),
                ..Default::default()
            },
        );

        assert_eq!(maybe_transaction, Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_the_transaction() {
        let mut store = get_test_store();
        let transaction = store
            .create(expense(1, "12.30", date!(2025 - 01 - 05)))
            .unwrap();

        store.delete(transaction.id).unwrap();

        assert_eq!(store.get(transaction.id), Err(Error::NotFound));
    }

    #[test]
    fn delete_fails_the_second_time() {
        let mut store = get_test_store();
        let transaction = store
            .create(expense(1, "12.30", date!(2025 - 01 - 05)))
            .unwrap();

        store.delete(transaction.id).unwrap();
        let second_delete = store.delete(transaction.id);

        assert_eq!(second_delete, Err(Error::NotFound));
    }
}
