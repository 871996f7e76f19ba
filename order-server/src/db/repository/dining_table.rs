//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, DiningTableCreate};
use sqlx::{SqliteExecutor, SqlitePool};

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(
        "SELECT id, number, created_at, updated_at FROM dining_table ORDER BY number",
    )
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: &str,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(
        "SELECT id, number, created_at, updated_at FROM dining_table WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(table)
}

pub async fn create(pool: &SqlitePool, data: DiningTableCreate) -> RepoResult<DiningTable> {
    if data.number <= 0 {
        return Err(RepoError::Validation(format!(
            "Table number must be positive: {}",
            data.number
        )));
    }

    let id = shared::util::new_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO dining_table (id, number, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
    )
    .bind(&id)
    .bind(data.number)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create dining table".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_create_and_find() {
        let db = DbService::in_memory().await.unwrap();
        let t2 = create(&db.pool, DiningTableCreate { number: 2 }).await.unwrap();
        let t1 = create(&db.pool, DiningTableCreate { number: 1 }).await.unwrap();

        assert_eq!(find_by_id(&db.pool, &t2.id).await.unwrap(), Some(t2.clone()));
        let all = find_all(&db.pool).await.unwrap();
        assert_eq!(all, vec![t1, t2]);
        assert!(find_by_id(&db.pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_non_positive_number() {
        let db = DbService::in_memory().await.unwrap();
        let err = create(&db.pool, DiningTableCreate { number: 0 }).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
