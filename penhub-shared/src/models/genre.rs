/// Genre reference data
///
/// Genres are seeded by the initial migration and only read by the service.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{like_prefix_pattern, DbId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Genre {
    pub id: DbId,
    pub name: String,
    pub active: bool,
}

impl Genre {
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Genre>(
            "SELECT id, name, active FROM genres WHERE active ORDER BY id ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_active(pool: &PgPool, id: DbId) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Genre>("SELECT id, name, active FROM genres WHERE id = $1 AND active")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn search_by_name(
        pool: &PgPool,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Genre>(
            r#"
            SELECT id, name, active
            FROM genres
            WHERE name LIKE $1 ESCAPE '\' AND active
            ORDER BY id ASC
            LIMIT $2
            "#,
        )
        .bind(like_prefix_pattern(prefix))
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
