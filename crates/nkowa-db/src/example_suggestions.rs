//! Example suggestion repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use nkowa_core::{
    new_v7, CreateExampleSuggestionRequest, Error, Example, ExampleSuggestion,
    ExampleSuggestionFields, ExampleSuggestionRepository, ExampleSuggestionSortField,
    ListExampleSuggestionsRequest, ListResponse, Result, ReviewDecision, SortSpec,
};

use crate::examples::{fetch_example, write_example_from_suggestion};
use crate::filter::{bind_params, QueryParam, WhereClause};
use crate::word_suggestions::{review_statement, BUMP_UPDATED_AT};

pub(crate) const EXAMPLE_SUGGESTION_COLUMNS: &str = "id, word_suggestion_id, original_example_id, \
     igbo, english, associated_words, author_id, user_comments, approvals, denials, merged, \
     merged_by, created_at_utc, updated_at_utc";

/// PostgreSQL implementation of ExampleSuggestionRepository.
#[derive(Clone)]
pub struct PgExampleSuggestionRepository {
    pool: Pool<Postgres>,
}

impl PgExampleSuggestionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

// =============================================================================
// ROW MAPPING & SHARED STATEMENTS
// =============================================================================

pub(crate) fn map_example_suggestion_row(row: &PgRow) -> Result<ExampleSuggestion> {
    let word_suggestion_id: Option<Uuid> = row.try_get("word_suggestion_id")?;
    Ok(ExampleSuggestion {
        id: row.try_get("id")?,
        original_example_id: row.try_get("original_example_id")?,
        igbo: row.try_get("igbo")?,
        english: row.try_get("english")?,
        associated_words: row.try_get("associated_words")?,
        example_for_suggestion: word_suggestion_id.is_some(),
        word_suggestion_id,
        author_id: row.try_get("author_id")?,
        user_comments: row.try_get("user_comments")?,
        approvals: row.try_get("approvals")?,
        denials: row.try_get("denials")?,
        merged: row.try_get("merged")?,
        merged_by: row.try_get("merged_by")?,
        created_at: row.try_get("created_at_utc")?,
        updated_at: row.try_get("updated_at_utc")?,
    })
}

/// Insert an example suggestion, nested when `word_suggestion_id` is set.
pub(crate) async fn insert_example_suggestion(
    conn: &mut PgConnection,
    word_suggestion_id: Option<Uuid>,
    author_id: &str,
    fields: &ExampleSuggestionFields,
    now: DateTime<Utc>,
) -> Result<Uuid> {
    let id = new_v7();
    sqlx::query(
        "INSERT INTO example_suggestion (id, word_suggestion_id, original_example_id, igbo, \
         english, associated_words, author_id, user_comments, created_at_utc, updated_at_utc)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)",
    )
    .bind(id)
    .bind(word_suggestion_id)
    .bind(fields.original_example_id)
    .bind(&fields.igbo)
    .bind(&fields.english)
    .bind(&fields.associated_words)
    .bind(author_id)
    .bind(&fields.user_comments)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

/// Overwrite editable content. Returns false when no row matched.
pub(crate) async fn update_example_suggestion_fields(
    conn: &mut PgConnection,
    id: Uuid,
    fields: &ExampleSuggestionFields,
    now: DateTime<Utc>,
) -> Result<bool> {
    let sql = format!(
        "UPDATE example_suggestion SET original_example_id = $2, igbo = $3, english = $4, \
         associated_words = $5, user_comments = $6, {}
         WHERE id = $1",
        BUMP_UPDATED_AT.replace("{}", "$7")
    );
    let result = sqlx::query(&sql)
        .bind(id)
        .bind(fields.original_example_id)
        .bind(&fields.igbo)
        .bind(&fields.english)
        .bind(&fields.associated_words)
        .bind(&fields.user_comments)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn fetch_example_suggestion(
    conn: &mut PgConnection,
    id: Uuid,
    for_update: bool,
) -> Result<Option<ExampleSuggestion>> {
    let sql = format!(
        "SELECT {} FROM example_suggestion WHERE id = $1{}",
        EXAMPLE_SUGGESTION_COLUMNS,
        if for_update { " FOR UPDATE" } else { "" }
    );
    let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?;
    row.as_ref().map(map_example_suggestion_row).transpose()
}

/// Load nested examples for a batch of word suggestions, oldest first.
pub(crate) async fn fetch_nested_examples(
    conn: &mut PgConnection,
    word_suggestion_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<ExampleSuggestion>>> {
    let mut grouped: HashMap<Uuid, Vec<ExampleSuggestion>> = HashMap::new();
    if word_suggestion_ids.is_empty() {
        return Ok(grouped);
    }

    let sql = format!(
        "SELECT {} FROM example_suggestion WHERE word_suggestion_id = ANY($1)
         ORDER BY created_at_utc ASC, id ASC",
        EXAMPLE_SUGGESTION_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(word_suggestion_ids)
        .fetch_all(&mut *conn)
        .await?;

    for row in &rows {
        let example = map_example_suggestion_row(row)?;
        if let Some(parent) = example.word_suggestion_id {
            grouped.entry(parent).or_default().push(example);
        }
    }
    Ok(grouped)
}

fn sort_column(field: ExampleSuggestionSortField) -> &'static str {
    match field {
        ExampleSuggestionSortField::Igbo => "igbo",
        ExampleSuggestionSortField::English => "english",
        ExampleSuggestionSortField::Approvals => "cardinality(approvals)",
        ExampleSuggestionSortField::Denials => "cardinality(denials)",
        ExampleSuggestionSortField::CreatedAt => "created_at_utc",
        ExampleSuggestionSortField::UpdatedAt => "updated_at_utc",
    }
}

fn build_order_clause(sort: Option<&SortSpec<ExampleSuggestionSortField>>) -> String {
    match sort {
        Some(spec) => format!(
            "{} {}, id ASC",
            sort_column(spec.field),
            spec.direction.as_sql()
        ),
        None => "cardinality(approvals) DESC, created_at_utc DESC, id DESC".to_string(),
    }
}

fn build_where_clause(req: &ListExampleSuggestionsRequest) -> WhereClause {
    let mut clause = WhereClause::new();
    clause.push_raw("word_suggestion_id IS NULL");

    if let Some(keyword) = req.keyword.as_deref() {
        clause.push_contains(
            "(LOWER(igbo) LIKE {} ESCAPE '\\' OR LOWER(english) LIKE {} ESCAPE '\\')",
            keyword,
        );
    }
    if let Some(igbo) = req.filter.igbo.as_deref() {
        clause.push_contains("LOWER(igbo) LIKE {} ESCAPE '\\'", igbo);
    }
    if let Some(english) = req.filter.english.as_deref() {
        clause.push_contains("LOWER(english) LIKE {} ESCAPE '\\'", english);
    }
    if let Some(author_id) = &req.filter.author_id {
        clause.push("author_id = {}", QueryParam::String(author_id.clone()));
    }
    clause
}

#[async_trait]
impl ExampleSuggestionRepository for PgExampleSuggestionRepository {
    async fn insert(&self, req: CreateExampleSuggestionRequest) -> Result<ExampleSuggestion> {
        let mut tx = self.pool.begin().await?;
        let id = insert_example_suggestion(&mut tx, None, &req.author_id, &req.fields, Utc::now())
            .await?;
        let created = fetch_example_suggestion(&mut tx, id, false)
            .await?
            .ok_or(Error::ExampleSuggestionNotFound(id))?;
        tx.commit().await?;

        info!(
            subsystem = "db",
            component = "example_suggestions",
            op = "insert",
            example_suggestion_id = %id,
            user_id = %req.author_id,
            "Created example suggestion"
        );
        Ok(created)
    }

    async fn fetch(&self, id: Uuid) -> Result<ExampleSuggestion> {
        let mut conn = self.pool.acquire().await?;
        fetch_example_suggestion(&mut conn, id, false)
            .await?
            .ok_or(Error::ExampleSuggestionNotFound(id))
    }

    async fn list(
        &self,
        req: ListExampleSuggestionsRequest,
    ) -> Result<ListResponse<ExampleSuggestion>> {
        let clause = build_where_clause(&req);
        let where_sql = clause.sql();

        let count_sql = format!("SELECT COUNT(*) FROM example_suggestion {}", where_sql);
        let total: i64 = bind_params!(sqlx::query_scalar(&count_sql), clause.params())
            .fetch_one(&self.pool)
            .await?;

        let limit_index = clause.next_index();
        let select_sql = format!(
            "SELECT {} FROM example_suggestion {} ORDER BY {} LIMIT ${} OFFSET ${}",
            EXAMPLE_SUGGESTION_COLUMNS,
            where_sql,
            build_order_clause(req.sort.as_ref()),
            limit_index,
            limit_index + 1
        );
        let rows = bind_params!(sqlx::query(&select_sql), clause.params())
            .bind(req.window.limit)
            .bind(req.window.skip)
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .iter()
            .map(map_example_suggestion_row)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            subsystem = "db",
            component = "example_suggestions",
            op = "list",
            result_count = items.len(),
            total_count = total,
            "Listed example suggestions"
        );
        Ok(ListResponse { items, total })
    }

    async fn update(&self, id: Uuid, fields: ExampleSuggestionFields) -> Result<ExampleSuggestion> {
        let mut tx = self.pool.begin().await?;
        if !update_example_suggestion_fields(&mut tx, id, &fields, Utc::now()).await? {
            return Err(Error::ExampleSuggestionNotFound(id));
        }
        let updated = fetch_example_suggestion(&mut tx, id, false)
            .await?
            .ok_or(Error::ExampleSuggestionNotFound(id))?;
        tx.commit().await?;

        info!(
            subsystem = "db",
            component = "example_suggestions",
            op = "update",
            example_suggestion_id = %id,
            "Updated example suggestion"
        );
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM example_suggestion WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::ExampleSuggestionNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "example_suggestions",
            op = "delete",
            example_suggestion_id = %id,
            "Deleted example suggestion"
        );
        Ok(())
    }

    async fn review(
        &self,
        id: Uuid,
        reviewer_uid: &str,
        decision: ReviewDecision,
    ) -> Result<ExampleSuggestion> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&review_statement("example_suggestion"))
            .bind(id)
            .bind(decision == ReviewDecision::Approve)
            .bind(reviewer_uid)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::ExampleSuggestionNotFound(id));
        }
        let reviewed = fetch_example_suggestion(&mut tx, id, false)
            .await?
            .ok_or(Error::ExampleSuggestionNotFound(id))?;
        tx.commit().await?;

        info!(
            subsystem = "db",
            component = "example_suggestions",
            op = decision.as_str(),
            example_suggestion_id = %id,
            user_id = %reviewer_uid,
            "Reviewed example suggestion"
        );
        Ok(reviewed)
    }

    async fn merge(&self, id: Uuid, merged_by: &str) -> Result<Example> {
        let mut tx = self.pool.begin().await?;
        let suggestion = fetch_example_suggestion(&mut tx, id, true)
            .await?
            .ok_or(Error::ExampleSuggestionNotFound(id))?;
        if suggestion.merged.is_some() {
            return Err(Error::InvalidInput(format!(
                "Example suggestion {} has already been merged",
                id
            )));
        }

        let now = Utc::now();
        let example_id = write_example_from_suggestion(&mut tx, &suggestion, now).await?;

        let sql = format!(
            "UPDATE example_suggestion SET merged = $2, merged_by = $3, {} WHERE id = $1",
            BUMP_UPDATED_AT.replace("{}", "$4")
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(example_id)
            .bind(merged_by)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let example = fetch_example(&mut tx, example_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Example {} not found", example_id)))?;
        tx.commit().await?;

        info!(
            subsystem = "db",
            component = "example_suggestions",
            op = "merge",
            example_suggestion_id = %id,
            example_id = %example_id,
            user_id = %merged_by,
            "Merged example suggestion"
        );
        Ok(example)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nkowa_core::{ExampleSuggestionFilter, SortDirection, Window};

    fn request() -> ListExampleSuggestionsRequest {
        ListExampleSuggestionsRequest {
            keyword: None,
            filter: ExampleSuggestionFilter::default(),
            window: Window::default(),
            sort: None,
        }
    }

    #[test]
    fn test_default_order_is_approvals_desc() {
        assert_eq!(
            build_order_clause(None),
            "cardinality(approvals) DESC, created_at_utc DESC, id DESC"
        );
    }

    #[test]
    fn test_explicit_sort_breaks_ties_on_id() {
        let spec = SortSpec {
            field: ExampleSuggestionSortField::English,
            direction: SortDirection::Asc,
        };
        assert_eq!(build_order_clause(Some(&spec)), "english ASC, id ASC");
    }

    #[test]
    fn test_list_excludes_nested_examples() {
        let clause = build_where_clause(&request());
        assert_eq!(clause.sql(), "WHERE word_suggestion_id IS NULL");
    }

    #[test]
    fn test_keyword_and_filters_are_parameterized() {
        let mut req = request();
        req.keyword = Some("ọ".into());
        req.filter.author_id = Some("author".into());
        let clause = build_where_clause(&req);
        let sql = clause.sql();
        assert!(sql.contains("LOWER(igbo) LIKE $1"));
        assert!(sql.contains("LOWER(english) LIKE $1"));
        assert!(sql.contains("author_id = $2"));
        assert_eq!(clause.next_index(), 3);
    }
}
