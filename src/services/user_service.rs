use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{Any, AnyPool, QueryBuilder};

use crate::models::{
    format_timestamp, CreateUserRequest, GetUsersQuery, UpdateUserRequest, User, UserChange,
    UserList, UserRow,
};
use crate::services::{ServiceError, ServiceResult};

const SELECT_USER: &str =
    "SELECT id, created_at, updated_at, deleted_at, name, email, age, phone";

/// Rows carrying a soft-delete marker are invisible to every query below
const ACTIVE_SCOPE: &str = "deleted_at IS NULL";

#[derive(Clone)]
pub struct UserService {
    db: AnyPool,
}

impl UserService {
    pub fn new(db: AnyPool) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> ServiceResult<User> {
        let now = now();
        let stamp = format_timestamp(now);

        // the id lookup must run on the connection that did the insert
        let mut conn = self.db.acquire().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (created_at, updated_at, name, email, age, phone)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(stamp.as_str())
        .bind(stamp.as_str())
        .bind(request.name.as_str())
        .bind(request.email.as_str())
        .bind(request.age)
        .bind(request.phone.as_str())
        .execute(&mut *conn)
        .await?;

        let id = match result.last_insert_id() {
            Some(id) => id,
            // the SQLite bridge of the Any driver never reports it
            None => sqlx::query_as::<_, (i64,)>("SELECT last_insert_rowid()")
                .fetch_optional(&mut *conn)
                .await?
                .map(|(id,)| id)
                .filter(|id| *id > 0)
                .ok_or(ServiceError::MissingInsertId)?,
        };
        tracing::debug!(user_id = id, "Created user");

        Ok(User {
            id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            name: request.name.clone(),
            email: request.email.clone(),
            age: request.age,
            phone: request.phone.clone(),
        })
    }

    pub async fn get_user(&self, id: i64) -> ServiceResult<User> {
        let mut query = active_users(SELECT_USER);
        query.push(" AND id = ").push_bind(id);

        let row = query
            .build_query_as::<UserRow>()
            .fetch_optional(&self.db)
            .await?
            .ok_or(ServiceError::NotFound)?;

        Ok(User::try_from(row)?)
    }

    /// List active users matching the query filters.
    ///
    /// `total` counts every match regardless of pagination.
    pub async fn get_users(&self, query: &GetUsersQuery) -> ServiceResult<UserList> {
        let mut count = active_users("SELECT COUNT(*)");
        push_filters(&mut count, query);
        let (total,) = count.build_query_as::<(i64,)>().fetch_one(&self.db).await?;

        let page = query.page();
        let page_size = query.page_size();

        let mut select = active_users(SELECT_USER);
        push_filters(&mut select, query);
        select
            .push(" ORDER BY id LIMIT ")
            .push_bind(page_size)
            .push(" OFFSET ")
            .push_bind(query.offset());

        let users = select
            .build_query_as::<UserRow>()
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UserList {
            users,
            total,
            page,
            page_size,
        })
    }

    /// Apply only the fields present in `request`.
    ///
    /// The returned user is the row read before the update with the changes
    /// applied in memory.
    pub async fn update_user(&self, id: i64, request: &UpdateUserRequest) -> ServiceResult<User> {
        let mut user = self.get_user(id).await?;

        let changes = request.changes();
        if changes.is_empty() {
            return Ok(user);
        }

        let now = now();
        let mut update = QueryBuilder::<Any>::new("UPDATE users SET ");
        {
            let mut assignments = update.separated(", ");
            for change in &changes {
                assignments.push(format!("{} = ", change.column()));
                match change {
                    UserChange::Name(value) | UserChange::Email(value) | UserChange::Phone(value) => {
                        assignments.push_bind_unseparated(value.clone())
                    }
                    UserChange::Age(value) => assignments.push_bind_unseparated(*value),
                };
            }
            assignments
                .push("updated_at = ")
                .push_bind_unseparated(format_timestamp(now));
        }
        update
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND ")
            .push(ACTIVE_SCOPE);

        update.build().execute(&self.db).await?;

        for change in &changes {
            change.apply(&mut user);
        }
        user.updated_at = now;

        tracing::debug!(user_id = id, fields = changes.len(), "Updated user");
        Ok(user)
    }

    /// Soft-delete a user. Missing or already deleted rows are not an error.
    pub async fn delete_user(&self, id: i64) -> ServiceResult<()> {
        let mut delete = QueryBuilder::<Any>::new("UPDATE users SET deleted_at = ");
        delete
            .push_bind(format_timestamp(now()))
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND ")
            .push(ACTIVE_SCOPE);

        let result = delete.build().execute(&self.db).await?;

        tracing::debug!(
            user_id = id,
            rows_affected = result.rows_affected(),
            "Soft-deleted user"
        );
        Ok(())
    }

    /// Number of active users
    pub async fn count_users(&self) -> ServiceResult<i64> {
        let mut count = active_users("SELECT COUNT(*)");
        let (total,) = count.build_query_as::<(i64,)>().fetch_one(&self.db).await?;
        Ok(total)
    }
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn active_users(select: &str) -> QueryBuilder<'static, Any> {
    let mut builder = QueryBuilder::new(select);
    builder.push(" FROM users WHERE ").push(ACTIVE_SCOPE);
    builder
}

/// Case-insensitive substring filters on name and email
fn push_filters(builder: &mut QueryBuilder<'static, Any>, query: &GetUsersQuery) {
    if let Some(name) = query.name_filter() {
        builder
            .push(" AND LOWER(name) LIKE ")
            .push_bind(like_pattern(name));
    }
    if let Some(email) = query.email_filter() {
        builder
            .push(" AND LOWER(email) LIKE ")
            .push_bind(like_pattern(email));
    }
}

fn like_pattern(term: &str) -> String {
    format!("%{}%", term.to_lowercase())
}
