//! Accepted example repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Pool, Postgres, Row};
use uuid::Uuid;

use nkowa_core::{new_v7, Error, Example, ExampleRepository, ExampleSuggestion, Result};

const EXAMPLE_COLUMNS: &str =
    "id, igbo, english, associated_words, created_at_utc, updated_at_utc";

/// PostgreSQL implementation of ExampleRepository.
#[derive(Clone)]
pub struct PgExampleRepository {
    pool: Pool<Postgres>,
}

impl PgExampleRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_example_row(row: &PgRow) -> Result<Example> {
    Ok(Example {
        id: row.try_get("id")?,
        igbo: row.try_get("igbo")?,
        english: row.try_get("english")?,
        associated_words: row.try_get("associated_words")?,
        created_at: row.try_get("created_at_utc")?,
        updated_at: row.try_get("updated_at_utc")?,
    })
}

pub(crate) async fn fetch_example(conn: &mut PgConnection, id: Uuid) -> Result<Option<Example>> {
    let sql = format!("SELECT {} FROM example WHERE id = $1", EXAMPLE_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?;
    row.as_ref().map(map_example_row).transpose()
}

/// Write a suggestion's content into the example it edits, or a new example.
///
/// Returns the id of the written example.
pub(crate) async fn write_example_from_suggestion(
    conn: &mut PgConnection,
    suggestion: &ExampleSuggestion,
    now: DateTime<Utc>,
) -> Result<Uuid> {
    match suggestion.original_example_id {
        Some(example_id) => {
            let result = sqlx::query(
                "UPDATE example SET igbo = $2, english = $3, associated_words = $4, \
                 updated_at_utc = GREATEST($5, updated_at_utc + interval '1 microsecond')
                 WHERE id = $1",
            )
            .bind(example_id)
            .bind(&suggestion.igbo)
            .bind(&suggestion.english)
            .bind(&suggestion.associated_words)
            .bind(now)
            .execute(&mut *conn)
            .await?;
            if result.rows_affected() == 0 {
                return Err(Error::NotFound(format!("Example {} not found", example_id)));
            }
            Ok(example_id)
        }
        None => {
            let example_id = new_v7();
            sqlx::query(
                "INSERT INTO example (id, igbo, english, associated_words, created_at_utc, \
                 updated_at_utc) VALUES ($1, $2, $3, $4, $5, $5)",
            )
            .bind(example_id)
            .bind(&suggestion.igbo)
            .bind(&suggestion.english)
            .bind(&suggestion.associated_words)
            .bind(now)
            .execute(&mut *conn)
            .await?;
            Ok(example_id)
        }
    }
}

#[async_trait]
impl ExampleRepository for PgExampleRepository {
    async fn fetch(&self, id: Uuid) -> Result<Example> {
        let mut conn = self.pool.acquire().await?;
        fetch_example(&mut conn, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Example {} not found", id)))
    }
}
