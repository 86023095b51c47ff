//! Word suggestion repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use nkowa_core::{
    new_v7, plan_example_sync, CreateWordSuggestionRequest, Dialect, Error, ListResponse,
    ListWordSuggestionsRequest, Result, ReviewDecision, SortSpec, UpdateWordSuggestionRequest,
    WordClass, WordSuggestion, WordSuggestionFields, WordSuggestionRepository,
    WordSuggestionSortField,
};

use crate::example_suggestions::{
    fetch_nested_examples, insert_example_suggestion, update_example_suggestion_fields,
};
use crate::filter::{bind_params, QueryParam, WhereClause};

const WORD_SUGGESTION_COLUMNS: &str = "id, original_word_id, word, word_class, definitions, \
     variations, dialects, pronunciation, is_standard_igbo, author_id, author_email, \
     user_comments, approvals, denials, created_at_utc, updated_at_utc";

/// Assignment that moves `updated_at_utc` to `{}` while keeping it strictly increasing.
pub(crate) const BUMP_UPDATED_AT: &str =
    "updated_at_utc = GREATEST({}, updated_at_utc + interval '1 microsecond')";

/// Approve/deny statement for `table`.
///
/// Binds: `$1` id, `$2` true for approve, `$3` reviewer uid, `$4` timestamp.
pub(crate) fn review_statement(table: &str) -> String {
    format!(
        "UPDATE {table} SET
            approvals = CASE
                WHEN $2 THEN CASE WHEN $3 = ANY(approvals) THEN approvals
                                  ELSE array_append(approvals, $3) END
                ELSE array_remove(approvals, $3) END,
            denials = CASE
                WHEN $2 THEN array_remove(denials, $3)
                ELSE CASE WHEN $3 = ANY(denials) THEN denials
                          ELSE array_append(denials, $3) END END,
            {bump}
         WHERE id = $1",
        table = table,
        bump = BUMP_UPDATED_AT.replace("{}", "$4")
    )
}

/// PostgreSQL implementation of WordSuggestionRepository.
#[derive(Clone)]
pub struct PgWordSuggestionRepository {
    pool: Pool<Postgres>,
}

impl PgWordSuggestionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

// =============================================================================
// ROW MAPPING
// =============================================================================

fn map_word_suggestion_row(row: &PgRow) -> Result<WordSuggestion> {
    let word_class: String = row.try_get("word_class")?;
    let word_class = word_class.parse::<WordClass>().map_err(Error::Internal)?;
    let dialects: serde_json::Value = row.try_get("dialects")?;
    let dialects: Vec<Dialect> = serde_json::from_value(dialects)?;

    Ok(WordSuggestion {
        id: row.try_get("id")?,
        original_word_id: row.try_get("original_word_id")?,
        word: row.try_get("word")?,
        word_class,
        definitions: row.try_get("definitions")?,
        variations: row.try_get("variations")?,
        dialects: Some(dialects),
        pronunciation: row.try_get("pronunciation")?,
        is_standard_igbo: row.try_get("is_standard_igbo")?,
        author_id: row.try_get("author_id")?,
        author_email: row.try_get("author_email")?,
        user_comments: row.try_get("user_comments")?,
        approvals: row.try_get("approvals")?,
        denials: row.try_get("denials")?,
        examples: None,
        created_at: row.try_get("created_at_utc")?,
        updated_at: row.try_get("updated_at_utc")?,
    })
}

async fn fetch_word_suggestion(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<WordSuggestion>> {
    let sql = format!(
        "SELECT {} FROM word_suggestion WHERE id = $1",
        WORD_SUGGESTION_COLUMNS
    );
    let Some(row) = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await? else {
        return Ok(None);
    };
    let mut suggestion = map_word_suggestion_row(&row)?;
    let mut nested = fetch_nested_examples(conn, &[id]).await?;
    suggestion.examples = Some(nested.remove(&id).unwrap_or_default());
    Ok(Some(suggestion))
}

/// Nested examples created in one write get distinct, ordered timestamps.
fn nth_timestamp(now: DateTime<Utc>, n: usize) -> DateTime<Utc> {
    now + Duration::microseconds(n as i64)
}

// =============================================================================
// LIST QUERY BUILDING
// =============================================================================

fn sort_column(field: WordSuggestionSortField) -> &'static str {
    match field {
        WordSuggestionSortField::Word => "word",
        WordSuggestionSortField::WordClass => "word_class",
        WordSuggestionSortField::Definitions => "definitions",
        WordSuggestionSortField::Approvals => "cardinality(approvals)",
        WordSuggestionSortField::Denials => "cardinality(denials)",
        WordSuggestionSortField::CreatedAt => "created_at_utc",
        WordSuggestionSortField::UpdatedAt => "updated_at_utc",
    }
}

fn build_order_clause(sort: Option<&SortSpec<WordSuggestionSortField>>) -> String {
    match sort {
        Some(spec) => format!(
            "{} {}, id ASC",
            sort_column(spec.field),
            spec.direction.as_sql()
        ),
        None => "cardinality(approvals) DESC, created_at_utc DESC, id DESC".to_string(),
    }
}

fn build_where_clause(req: &ListWordSuggestionsRequest) -> WhereClause {
    let mut clause = WhereClause::new();

    if let Some(keyword) = req.keyword.as_deref() {
        clause.push_contains(
            "(LOWER(word) LIKE {} ESCAPE '\\' OR EXISTS (SELECT 1 FROM unnest(variations) v \
             WHERE LOWER(v) LIKE {} ESCAPE '\\'))",
            keyword,
        );
    }
    if let Some(word) = req.filter.word.as_deref() {
        clause.push_contains("LOWER(word) LIKE {} ESCAPE '\\'", word);
    }
    if let Some(word_class) = req.filter.word_class {
        clause.push(
            "word_class = {}",
            QueryParam::String(word_class.code().to_string()),
        );
    }
    if let Some(author_id) = &req.filter.author_id {
        clause.push("author_id = {}", QueryParam::String(author_id.clone()));
    }
    if let Some(is_standard_igbo) = req.filter.is_standard_igbo {
        clause.push("is_standard_igbo = {}", QueryParam::Bool(is_standard_igbo));
    }
    clause
}

// =============================================================================
// REPOSITORY IMPLEMENTATION
// =============================================================================

#[async_trait]
impl WordSuggestionRepository for PgWordSuggestionRepository {
    async fn insert(&self, req: CreateWordSuggestionRequest) -> Result<WordSuggestion> {
        let start = Instant::now();
        let now = Utc::now();
        let id = new_v7();
        let fields = &req.fields;
        let dialects = serde_json::to_value(fields.dialects.as_deref().unwrap_or_default())?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO word_suggestion (id, original_word_id, word, word_class, definitions, \
             variations, dialects, pronunciation, is_standard_igbo, author_id, author_email, \
             user_comments, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)",
        )
        .bind(id)
        .bind(fields.original_word_id)
        .bind(&fields.word)
        .bind(fields.word_class.code())
        .bind(&fields.definitions)
        .bind(&fields.variations)
        .bind(&dialects)
        .bind(&fields.pronunciation)
        .bind(fields.is_standard_igbo)
        .bind(&req.author_id)
        .bind(&req.author_email)
        .bind(&fields.user_comments)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for (n, example) in req.examples.iter().enumerate() {
            insert_example_suggestion(
                &mut tx,
                Some(id),
                &req.author_id,
                example,
                nth_timestamp(now, n),
            )
            .await?;
        }

        let created = fetch_word_suggestion(&mut tx, id)
            .await?
            .ok_or(Error::WordSuggestionNotFound(id))?;
        tx.commit().await?;

        info!(
            subsystem = "db",
            component = "word_suggestions",
            op = "insert",
            word_suggestion_id = %id,
            user_id = %req.author_id,
            sync_created = req.examples.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Created word suggestion"
        );
        Ok(created)
    }

    async fn fetch(&self, id: Uuid) -> Result<WordSuggestion> {
        let mut conn = self.pool.acquire().await?;
        fetch_word_suggestion(&mut conn, id)
            .await?
            .ok_or(Error::WordSuggestionNotFound(id))
    }

    async fn list(&self, req: ListWordSuggestionsRequest) -> Result<ListResponse<WordSuggestion>> {
        let start = Instant::now();
        let clause = build_where_clause(&req);
        let where_sql = clause.sql();

        let count_sql = format!("SELECT COUNT(*) FROM word_suggestion {}", where_sql);
        let total: i64 = bind_params!(sqlx::query_scalar(&count_sql), clause.params())
            .fetch_one(&self.pool)
            .await?;

        let limit_index = clause.next_index();
        let select_sql = format!(
            "SELECT {} FROM word_suggestion {} ORDER BY {} LIMIT ${} OFFSET ${}",
            WORD_SUGGESTION_COLUMNS,
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

        let mut items = rows
            .iter()
            .map(map_word_suggestion_row)
            .collect::<Result<Vec<_>>>()?;

        if req.include_examples && !items.is_empty() {
            let ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
            let mut conn = self.pool.acquire().await?;
            let mut nested = fetch_nested_examples(&mut conn, &ids).await?;
            for item in &mut items {
                item.examples = Some(nested.remove(&item.id).unwrap_or_default());
            }
        }
        if !req.include_dialects {
            for item in &mut items {
                item.dialects = None;
            }
        }

        debug!(
            subsystem = "db",
            component = "word_suggestions",
            op = "list",
            result_count = items.len(),
            total_count = total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed word suggestions"
        );
        Ok(ListResponse { items, total })
    }

    async fn update(&self, id: Uuid, req: UpdateWordSuggestionRequest) -> Result<WordSuggestion> {
        let start = Instant::now();
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let author_id: Option<String> =
            sqlx::query_scalar("SELECT author_id FROM word_suggestion WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let author_id = author_id.ok_or(Error::WordSuggestionNotFound(id))?;

        let (mut created, mut updated, mut deleted) = (0, 0, 0);
        if let Some(drafts) = req.examples {
            let existing: Vec<Uuid> = sqlx::query_scalar(
                "SELECT id FROM example_suggestion WHERE word_suggestion_id = $1
                 ORDER BY created_at_utc ASC, id ASC FOR UPDATE",
            )
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

            let plan = plan_example_sync(&existing, drafts)?;
            if !plan.delete.is_empty() {
                sqlx::query("DELETE FROM example_suggestion WHERE id = ANY($1)")
                    .bind(&plan.delete)
                    .execute(&mut *tx)
                    .await?;
            }
            for (example_id, fields) in &plan.update {
                if !update_example_suggestion_fields(&mut tx, *example_id, fields, now).await? {
                    return Err(Error::ExampleSuggestionNotFound(*example_id));
                }
            }
            for (n, fields) in plan.create.iter().enumerate() {
                insert_example_suggestion(&mut tx, Some(id), &author_id, fields, nth_timestamp(now, n))
                    .await?;
            }
            (created, updated, deleted) = (plan.create.len(), plan.update.len(), plan.delete.len());
        }

        update_word_fields(&mut tx, id, &req.fields, now).await?;

        let result = fetch_word_suggestion(&mut tx, id)
            .await?
            .ok_or(Error::WordSuggestionNotFound(id))?;
        tx.commit().await?;

        info!(
            subsystem = "db",
            component = "word_suggestions",
            op = "update",
            word_suggestion_id = %id,
            sync_created = created,
            sync_updated = updated,
            sync_deleted = deleted,
            duration_ms = start.elapsed().as_millis() as u64,
            "Updated word suggestion"
        );
        Ok(result)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM word_suggestion WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::WordSuggestionNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "word_suggestions",
            op = "delete",
            word_suggestion_id = %id,
            "Deleted word suggestion"
        );
        Ok(())
    }

    async fn review(
        &self,
        id: Uuid,
        reviewer_uid: &str,
        decision: ReviewDecision,
    ) -> Result<WordSuggestion> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&review_statement("word_suggestion"))
            .bind(id)
            .bind(decision == ReviewDecision::Approve)
            .bind(reviewer_uid)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::WordSuggestionNotFound(id));
        }
        let reviewed = fetch_word_suggestion(&mut tx, id)
            .await?
            .ok_or(Error::WordSuggestionNotFound(id))?;
        tx.commit().await?;

        info!(
            subsystem = "db",
            component = "word_suggestions",
            op = decision.as_str(),
            word_suggestion_id = %id,
            user_id = %reviewer_uid,
            "Reviewed word suggestion"
        );
        Ok(reviewed)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM word_suggestion WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

async fn update_word_fields(
    conn: &mut PgConnection,
    id: Uuid,
    fields: &WordSuggestionFields,
    now: DateTime<Utc>,
) -> Result<()> {
    let dialects = fields
        .dialects
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?;
    let sql = format!(
        "UPDATE word_suggestion SET original_word_id = $2, word = $3, word_class = $4, \
         definitions = $5, variations = $6, dialects = COALESCE($7, dialects), pronunciation = $8, \
         is_standard_igbo = $9, user_comments = $10, {}
         WHERE id = $1",
        BUMP_UPDATED_AT.replace("{}", "$11")
    );
    let result = sqlx::query(&sql)
        .bind(id)
        .bind(fields.original_word_id)
        .bind(&fields.word)
        .bind(fields.word_class.code())
        .bind(&fields.definitions)
        .bind(&fields.variations)
        .bind(&dialects)
        .bind(&fields.pronunciation)
        .bind(fields.is_standard_igbo)
        .bind(&fields.user_comments)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::WordSuggestionNotFound(id));
    }
    Ok(())
}
