//! SQLite profile directory implementation.

use chrono::Utc;
use recomendify_core::repository::ProfileDirectory;
use recomendify_types::error::StoreError;
use recomendify_types::peer::Profile;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, query_error};

const SELECT_COLUMNS: &str = "SELECT id, email, display_name, avatar_url FROM profiles";

/// SQLite-backed implementation of `ProfileDirectory`.
pub struct SqliteProfileDirectory {
    pool: DatabasePool,
}

impl SqliteProfileDirectory {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ProfileRow {
    id: String,
    email: Option<String>,
    display_name: Option<String>,
    avatar_url: Option<String>,
}

impl ProfileRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            display_name: row.try_get("display_name")?,
            avatar_url: row.try_get("avatar_url")?,
        })
    }

    fn into_profile(self) -> Profile {
        Profile {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            avatar_url: self.avatar_url,
        }
    }
}

impl SqliteProfileDirectory {
    async fn fetch_one_where(&self, clause: &str, value: &str) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE {clause} = ?"))
            .bind(value)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|r| ProfileRow::from_row(&r).map(ProfileRow::into_profile))
            .transpose()
            .map_err(query_error)
    }
}

impl ProfileDirectory for SqliteProfileDirectory {
    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY COALESCE(display_name, email, id) COLLATE NOCASE ASC"
        ))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|r| ProfileRow::from_row(r).map(ProfileRow::into_profile))
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)
    }

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>, StoreError> {
        self.fetch_one_where("id", id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        self.fetch_one_where("email", email).await
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, StoreError> {
        let now = format_datetime(&Utc::now());
        sqlx::query(
            r#"INSERT INTO profiles (id, email, display_name, avatar_url, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT (id) DO UPDATE SET
                   email = COALESCE(excluded.email, profiles.email),
                   display_name = excluded.display_name,
                   avatar_url = excluded.avatar_url,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&profile.id)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(&profile.avatar_url)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Conflict(
                format!("email '{}' is already registered", profile.email.as_deref().unwrap_or("")),
            ),
            other => query_error(other),
        })?;

        self.get_profile(&profile.id)
            .await?
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_pool;

    #[tokio::test]
    async fn upsert_and_lookup() {
        let dir = SqliteProfileDirectory::new(test_pool().await);
        let profile = Profile::for_new_user("u-1", "maria@example.com");

        let stored = dir.upsert_profile(&profile).await.unwrap();
        assert_eq!(stored, profile);
        assert_eq!(dir.get_profile("u-1").await.unwrap(), Some(profile.clone()));
        assert_eq!(
            dir.find_by_email("maria@example.com").await.unwrap(),
            Some(profile)
        );
        assert!(dir.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_updates_display_name_and_keeps_email() {
        let dir = SqliteProfileDirectory::new(test_pool().await);
        dir.upsert_profile(&Profile::for_new_user("u-1", "maria@example.com"))
            .await
            .unwrap();

        let updated = dir
            .upsert_profile(&Profile {
                id: "u-1".into(),
                email: None,
                display_name: Some("Maria Clara".into()),
                avatar_url: None,
            })
            .await
            .unwrap();

        assert_eq!(updated.display_name.as_deref(), Some("Maria Clara"));
        assert_eq!(updated.email.as_deref(), Some("maria@example.com"));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let dir = SqliteProfileDirectory::new(test_pool().await);
        dir.upsert_profile(&Profile::for_new_user("u-1", "same@example.com"))
            .await
            .unwrap();
        let err = dir
            .upsert_profile(&Profile::for_new_user("u-2", "same@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_orders_by_label() {
        let dir = SqliteProfileDirectory::new(test_pool().await);
        for (id, email) in [("u-1", "zeca@x.com"), ("u-2", "ana@x.com"), ("u-3", "Bia@x.com")] {
            dir.upsert_profile(&Profile::for_new_user(id, email)).await.unwrap();
        }

        let labels: Vec<String> = dir
            .list_profiles()
            .await
            .unwrap()
            .iter()
            .map(|p| p.label().to_string())
            .collect();
        assert_eq!(labels, ["ana", "Bia", "zeca"]);
    }
}
