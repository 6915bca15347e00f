use crate::entities::{ListingId, SellerId};
use crate::framework::DatabaseProcessor;
use crate::query::{FeedPredicate, FeedSort, SortDirection};
use compact_str::CompactString;
use itertools::Itertools;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use swapit_feed_sdk::objects::{ListingSnapshot, from_unix_millis};
use time::OffsetDateTime;

const SUMMARY_COLUMNS: &str =
    "id, title, price_amount, price_currency, tags, created_at, last_updated_at, seller_id";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Price {
    #[sqlx(rename = "price_amount")]
    pub amount: Decimal,
    #[sqlx(rename = "price_currency")]
    pub currency: CompactString,
}

/// Denormalized projection of an active listing, one row per listing.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ListingSummary {
    pub id: ListingId,
    pub title: String,
    #[sqlx(flatten)]
    pub price: Price,
    pub tags: Vec<String>,
    /// Set by the listing service; an upsert never changes it.
    pub created_at: OffsetDateTime,
    /// When this row was last written by the synchronizer.
    pub last_updated_at: OffsetDateTime,
    pub seller_id: SellerId,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("created_at {0} is not a representable timestamp")]
    CreatedAtOutOfRange(i64),
    #[error("price {0} is negative")]
    NegativePrice(Decimal),
}

impl ListingSummary {
    /// Project a snapshot into a summary stamped with `synced_at`.
    ///
    /// Tags are trimmed, empty ones dropped and duplicates collapsed keeping
    /// the first occurrence.
    pub fn from_snapshot(
        snapshot: ListingSnapshot,
        synced_at: OffsetDateTime,
    ) -> Result<Self, SnapshotError> {
        let created_at = from_unix_millis(snapshot.created_at)
            .map_err(|_| SnapshotError::CreatedAtOutOfRange(snapshot.created_at))?;
        if snapshot.price.amount < Decimal::ZERO {
            return Err(SnapshotError::NegativePrice(snapshot.price.amount));
        }

        let tags = snapshot
            .tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .unique()
            .map(str::to_owned)
            .collect();

        Ok(Self {
            id: snapshot.id,
            title: snapshot.title,
            price: Price {
                amount: snapshot.price.amount,
                currency: snapshot.price.currency,
            },
            tags,
            created_at,
            last_updated_at: synced_at,
            seller_id: snapshot.seller_id,
        })
    }

    /// Position in newest-first order: later `created_at` first, then larger id.
    pub fn sort_key(&self) -> (OffsetDateTime, ListingId) {
        (self.created_at, self.id)
    }
}

/// One window of a query plus the number of rows matching the predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingSummaryPage {
    pub items: Vec<ListingSummary>,
    pub total: u64,
}

#[derive(Debug, Clone)]
/// Insert a summary, or replace every field except `created_at` if the id exists.
pub struct UpsertListingSummary {
    pub summary: ListingSummary,
}

impl Processor<UpsertListingSummary> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpsertListingSummary")]
    async fn process(&self, cmd: UpsertListingSummary) -> Result<(), sqlx::Error> {
        let summary = cmd.summary;
        sqlx::query(
            r#"
            INSERT INTO feed_listing_summaries
                (id, title, price_amount, price_currency, tags, created_at, last_updated_at, seller_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                price_amount = EXCLUDED.price_amount,
                price_currency = EXCLUDED.price_currency,
                tags = EXCLUDED.tags,
                last_updated_at = EXCLUDED.last_updated_at,
                seller_id = EXCLUDED.seller_id
            "#,
        )
        .bind(summary.id)
        .bind(summary.title)
        .bind(summary.price.amount)
        .bind(summary.price.currency.as_str())
        .bind(summary.tags)
        .bind(summary.created_at)
        .bind(summary.last_updated_at)
        .bind(summary.seller_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Delete a summary. Returns whether a row existed.
pub struct DeleteListingSummary {
    pub id: ListingId,
}

impl Processor<DeleteListingSummary> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteListingSummary")]
    async fn process(&self, cmd: DeleteListingSummary) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM feed_listing_summaries WHERE id = $1")
            .bind(cmd.id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone)]
pub struct ListingSummaryExists {
    pub id: ListingId,
}

impl Processor<ListingSummaryExists> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListingSummaryExists")]
    async fn process(&self, query: ListingSummaryExists) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM feed_listing_summaries WHERE id = $1)")
                .bind(query.id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[derive(Debug, Clone)]
/// Filtered, sorted window over the summaries.
///
/// The count and the window are two statements outside a transaction, so a
/// concurrent write can make them disagree by a row; the feed tolerates that.
pub struct QueryListingSummaries {
    pub predicate: FeedPredicate,
    pub sort: FeedSort,
    pub skip: u64,
    pub limit: u64,
}

impl QueryListingSummaries {
    fn count_query(&self) -> sqlx::QueryBuilder<'static, sqlx::Postgres> {
        let mut count = sqlx::QueryBuilder::new(
            "SELECT COUNT(*) FROM feed_listing_summaries WHERE TRUE",
        );
        push_predicate(&mut count, &self.predicate);
        count
    }

    fn select_query(&self) -> sqlx::QueryBuilder<'static, sqlx::Postgres> {
        let mut select = sqlx::QueryBuilder::new(format!(
            "SELECT {SUMMARY_COLUMNS} FROM feed_listing_summaries WHERE TRUE"
        ));
        push_predicate(&mut select, &self.predicate);
        select.push(match self.sort.direction {
            SortDirection::Descending => " ORDER BY created_at DESC, id DESC",
            SortDirection::Ascending => " ORDER BY created_at ASC, id ASC",
        });
        select
            .push(" OFFSET ")
            .push_bind(i64::try_from(self.skip).unwrap_or(i64::MAX))
            .push(" LIMIT ")
            .push_bind(i64::try_from(self.limit).unwrap_or(i64::MAX));
        select
    }
}

impl Processor<QueryListingSummaries> for DatabaseProcessor {
    type Output = ListingSummaryPage;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:QueryListingSummaries")]
    async fn process(&self, query: QueryListingSummaries) -> Result<ListingSummaryPage, sqlx::Error> {
        let total = query
            .count_query()
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let items = query
            .select_query()
            .build_query_as::<ListingSummary>()
            .fetch_all(&self.pool)
            .await?;

        Ok(ListingSummaryPage {
            items,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }
}

/// Append `AND ...` clauses for every supplied predicate.
///
/// Tag membership uses `@>` so the GIN index on `tags` applies.
fn push_predicate(builder: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>, predicate: &FeedPredicate) {
    if let Some(tag) = &predicate.tag {
        builder
            .push(" AND tags @> ARRAY[")
            .push_bind(tag.clone())
            .push("]::text[]");
    }
    if let Some(min) = predicate.min_price {
        builder.push(" AND price_amount >= ").push_bind(min);
    }
    if let Some(max) = predicate.max_price {
        builder.push(" AND price_amount <= ").push_bind(max);
    }
}
