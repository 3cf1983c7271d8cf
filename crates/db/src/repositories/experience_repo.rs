//! Repository for the `experiences` table and its `experience_targets` links.

use std::collections::HashSet;

use arstudio_core::experience_config::{ExperienceConfig, MarkerType};
use arstudio_core::slug::{generate_slug, next_available_slug};
use arstudio_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::experience::{CreateExperience, Experience, UpdateExperience};
use crate::unique_violation;

/// Column list shared across queries. Expects the table aliased as `e`.
const COLUMNS: &str = "e.id, e.name, e.slug, e.config, e.is_published, e.published_at, e.views, \
    COALESCE(
        (SELECT array_agg(et.target_id ORDER BY et.target_id)
         FROM experience_targets et WHERE et.experience_id = e.id),
        ARRAY[]::BIGINT[]
    ) AS target_ids, \
    e.created_at, e.updated_at";

/// Unique constraint guarding `experiences.slug`.
pub const SLUG_CONSTRAINT: &str = "uq_experiences_slug";

/// How many times creation re-picks a slug after losing a race.
const MAX_SLUG_ATTEMPTS: u32 = 5;

/// Provides CRUD, configuration, publish and view-count operations.
pub struct ExperienceRepo;

impl ExperienceRepo {
    /// Insert a new experience with a unique slug derived from its name.
    ///
    /// The slug is the base slug or the base plus the smallest free `-N`
    /// suffix. If a concurrent insert claims the same slug first, the
    /// unique constraint fires and a new slug is chosen.
    pub async fn create(pool: &PgPool, input: &CreateExperience) -> Result<Experience, sqlx::Error> {
        let base = generate_slug(&input.name);
        let mut attempt = 1;
        loop {
            let taken = Self::slugs_with_base(pool, &base).await?;
            let slug = next_available_slug(&base, &taken);
            match Self::insert_with_slug(pool, input, &slug).await {
                Ok(experience) => return Ok(experience),
                Err(e)
                    if attempt < MAX_SLUG_ATTEMPTS
                        && unique_violation(&e) == Some(SLUG_CONSTRAINT) =>
                {
                    tracing::warn!(slug = %slug, attempt, "Slug claimed concurrently, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn insert_with_slug(
        pool: &PgPool,
        input: &CreateExperience,
        slug: &str,
    ) -> Result<Experience, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO experiences (name, slug, config) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&input.name)
        .bind(slug)
        .bind(Json(ExperienceConfig::default()))
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_targets(&mut tx, id, &input.targets).await?;
        let experience = Self::fetch_in_tx(&mut tx, id).await?;

        tx.commit().await?;
        Ok(experience)
    }

    /// Slugs equal to `base` or of the form `base-*`.
    async fn slugs_with_base(pool: &PgPool, base: &str) -> Result<HashSet<String>, sqlx::Error> {
        let pattern = format!("{}-%", escape_like(base));
        let slugs: Vec<String> =
            sqlx::query_scalar("SELECT slug FROM experiences WHERE slug = $1 OR slug LIKE $2")
                .bind(base)
                .bind(pattern)
                .fetch_all(pool)
                .await?;
        Ok(slugs.into_iter().collect())
    }

    async fn replace_targets(
        tx: &mut Transaction<'_, Postgres>,
        experience_id: DbId,
        target_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM experience_targets WHERE experience_id = $1")
            .bind(experience_id)
            .execute(&mut **tx)
            .await?;

        if !target_ids.is_empty() {
            sqlx::query(
                "INSERT INTO experience_targets (experience_id, target_id)
                 SELECT $1, UNNEST($2::BIGINT[])
                 ON CONFLICT DO NOTHING",
            )
            .bind(experience_id)
            .bind(target_ids)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn fetch_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Experience, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM experiences e WHERE e.id = $1");
        sqlx::query_as::<_, Experience>(&query)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find an experience by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Experience>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM experiences e WHERE e.id = $1");
        sqlx::query_as::<_, Experience>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all experiences, newest id first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Experience>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM experiences e ORDER BY e.id DESC");
        sqlx::query_as::<_, Experience>(&query).fetch_all(pool).await
    }

    /// Update an experience. The slug is never changed.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateExperience,
    ) -> Result<Option<Experience>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let found: Option<DbId> = sqlx::query_scalar(
            "UPDATE experiences SET name = COALESCE($2, name) WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(&input.name)
        .fetch_optional(&mut *tx)
        .await?;

        if found.is_none() {
            return Ok(None);
        }

        if let Some(targets) = &input.targets {
            Self::replace_targets(&mut tx, id, targets).await?;
        }
        let experience = Self::fetch_in_tx(&mut tx, id).await?;

        tx.commit().await?;
        Ok(Some(experience))
    }

    /// Delete an experience. Bindings, links and metrics cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM experiences WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the stored configuration.
    pub async fn save_config(
        pool: &PgPool,
        id: DbId,
        config: &ExperienceConfig,
    ) -> Result<Option<Experience>, sqlx::Error> {
        let query = format!(
            "UPDATE experiences AS e SET config = $2
             WHERE e.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Experience>(&query)
            .bind(id)
            .bind(Json(config))
            .fetch_optional(pool)
            .await
    }

    /// Sum of `size_bytes` over every asset bound to the experience.
    ///
    /// An asset bound twice is counted twice.
    pub async fn total_bound_asset_bytes(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(a.size_bytes), 0)::BIGINT
             FROM experience_assets ea
             JOIN assets a ON a.id = ea.asset_id
             WHERE ea.experience_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Flip the published flag and record the marker type in one statement.
    ///
    /// The update only matches an unpublished row, so of two concurrent
    /// publishes exactly one succeeds. Returns `None` if the experience does
    /// not exist or is already published.
    pub async fn publish(
        pool: &PgPool,
        id: DbId,
        marker_type: MarkerType,
    ) -> Result<Option<Experience>, sqlx::Error> {
        let query = format!(
            "UPDATE experiences AS e SET
                is_published = TRUE,
                published_at = NOW(),
                config = jsonb_set(e.config, '{{marker_type}}', to_jsonb($2::TEXT), TRUE)
             WHERE e.id = $1 AND e.is_published = FALSE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Experience>(&query)
            .bind(id)
            .bind(marker_type.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Atomically increment the view counter of a published experience.
    ///
    /// Returns `None` if the experience does not exist or is unpublished.
    pub async fn record_view(pool: &PgPool, id: DbId) -> Result<Option<Experience>, sqlx::Error> {
        let query = format!(
            "UPDATE experiences AS e SET views = e.views + 1
             WHERE e.id = $1 AND e.is_published = TRUE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Experience>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Escape `LIKE` metacharacters (`\`, `%`, `_`).
fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
