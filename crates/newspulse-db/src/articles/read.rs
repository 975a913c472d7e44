//! Parameterized article reads over a composed predicate.

use newspulse_core::Article;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

use super::filter::{compose, ArticleFilter, BindValue, OrderBy, Predicate};
use super::types::ArticleRow;

const ARTICLE_PROJECTION: &str = "id, title, description, url, publication_date, source_name, \
     categories, relevance_score, \
     ST_Y(location::geometry) AS latitude, \
     ST_X(location::geometry) AS longitude";

/// Pagination window for article reads.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 5,
            offset: 0,
        }
    }
}

/// Find articles matching the filter, paginated and ordered per the
/// predicate's ordering selection.
///
/// # Errors
///
/// Returns [`DbError::InvalidFilter`] for a malformed spatial filter and
/// [`DbError::Sqlx`] if the query fails.
pub async fn find_articles(
    pool: &PgPool,
    filter: &ArticleFilter,
    page: Page,
) -> Result<Vec<Article>, DbError> {
    let predicate = compose(filter)?;
    let (sql, params) = select_sql(&predicate, page);

    let mut query = sqlx::query_as::<_, ArticleRow>(&sql);
    for param in &params {
        query = match param {
            BindValue::Text(s) => query.bind(s.clone()),
            BindValue::Float(f) => query.bind(*f),
            BindValue::Int(i) => query.bind(*i),
        };
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows.into_iter().map(Article::from).collect())
}

/// Count articles matching the filter: same predicate, no pagination.
///
/// # Errors
///
/// Returns [`DbError::InvalidFilter`] for a malformed spatial filter and
/// [`DbError::Sqlx`] if the query fails.
pub async fn count_articles(pool: &PgPool, filter: &ArticleFilter) -> Result<i64, DbError> {
    let predicate = compose(filter)?;
    let sql = count_sql(&predicate);

    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for param in &predicate.params {
        query = match param {
            BindValue::Text(s) => query.bind(s.clone()),
            BindValue::Float(f) => query.bind(*f),
            BindValue::Int(i) => query.bind(*i),
        };
    }

    Ok(query.fetch_one(pool).await?)
}

/// Fetch a batch of articles by id for the trending join.
///
/// Result order is unspecified; callers re-order by their own ranking. Ids
/// with no surviving row are simply absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_articles_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Article>, DbError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!("SELECT {ARTICLE_PROJECTION} FROM articles WHERE id = ANY($1)");
    let rows = sqlx::query_as::<_, ArticleRow>(&sql)
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Article::from).collect())
}

/// List article ids, newest first. Used by the synthetic event seeder.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_article_ids(pool: &PgPool, limit: i64) -> Result<Vec<Uuid>, DbError> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM articles ORDER BY publication_date DESC NULLS LAST LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Render the paginated SELECT for a predicate.
///
/// Ordering expressions are fixed templates referencing projected columns;
/// the text-relevance and distance orderings append their own projection
/// column whose placeholders continue after the predicate's parameters.
/// LIMIT and OFFSET are bound, never interpolated.
fn select_sql(predicate: &Predicate, page: Page) -> (String, Vec<BindValue>) {
    let mut params = predicate.params.clone();
    let mut projection = ARTICLE_PROJECTION.to_string();

    let order_expr = match &predicate.order {
        OrderBy::TextRelevance { query } => {
            params.push(BindValue::Text(query.clone()));
            projection.push_str(&format!(
                ", ts_rank(search_vector, plainto_tsquery('english', ${})) AS search_rank",
                params.len()
            ));
            "search_rank DESC, relevance_score DESC"
        }
        OrderBy::RelevanceScore => "relevance_score DESC",
        OrderBy::Distance { lat, lon } => {
            params.push(BindValue::Float(*lon));
            params.push(BindValue::Float(*lat));
            projection.push_str(&format!(
                ", ST_Distance(location, ST_SetSRID(ST_MakePoint(${}, ${}), 4326)::geography) \
                 AS distance_meters",
                params.len() - 1,
                params.len()
            ));
            "distance_meters ASC"
        }
        OrderBy::PublicationDate => "publication_date DESC NULLS LAST",
    };

    params.push(BindValue::Int(page.limit));
    let limit_placeholder = params.len();
    params.push(BindValue::Int(page.offset));
    let offset_placeholder = params.len();

    let mut sql = format!("SELECT {projection} FROM articles");
    if !predicate.conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicate.conditions.join(" AND "));
    }
    sql.push_str(&format!(
        " ORDER BY {order_expr} LIMIT ${limit_placeholder} OFFSET ${offset_placeholder}"
    ));

    (sql, params)
}

fn count_sql(predicate: &Predicate) -> String {
    let mut sql = "SELECT COUNT(*) FROM articles".to_string();
    if !predicate.conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicate.conditions.join(" AND "));
    }
    sql
}
