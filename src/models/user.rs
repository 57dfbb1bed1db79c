use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Persisted user. `deleted_at` is the soft-delete marker and is never
/// exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub phone: String,
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Raw `users` row as stored; timestamps are RFC 3339 text
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub phone: String,
}

impl TryFrom<UserRow> for User {
    type Error = chrono::ParseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: row.deleted_at.as_deref().map(parse_timestamp).transpose()?,
            name: row.name,
            email: row.email,
            age: row.age,
            phone: row.phone,
        })
    }
}

/// Fixed-width UTC form with microseconds, so stored values sort in time order
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|ts| ts.with_timezone(&Utc))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 150, message = "age must be between 1 and 150"))]
    pub age: i64,
    #[serde(default)]
    pub phone: String,
}

/// Partial update. `None` leaves the column untouched, `Some` overwrites
/// it, even with an empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 150, message = "age must be between 1 and 150"))]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl UpdateUserRequest {
    /// Sparse change set holding only the fields the client supplied
    pub fn changes(&self) -> Vec<UserChange> {
        let mut changes = Vec::new();

        if let Some(name) = &self.name {
            changes.push(UserChange::Name(name.clone()));
        }
        if let Some(email) = &self.email {
            changes.push(UserChange::Email(email.clone()));
        }
        if let Some(age) = self.age {
            changes.push(UserChange::Age(age));
        }
        if let Some(phone) = &self.phone {
            changes.push(UserChange::Phone(phone.clone()));
        }

        changes
    }
}

/// A single column assignment of a partial update
#[derive(Debug, Clone, PartialEq)]
pub enum UserChange {
    Name(String),
    Email(String),
    Age(i64),
    Phone(String),
}

impl UserChange {
    pub fn column(&self) -> &'static str {
        match self {
            UserChange::Name(_) => "name",
            UserChange::Email(_) => "email",
            UserChange::Age(_) => "age",
            UserChange::Phone(_) => "phone",
        }
    }

    pub fn apply(&self, user: &mut User) {
        match self {
            UserChange::Name(name) => user.name = name.clone(),
            UserChange::Email(email) => user.email = email.clone(),
            UserChange::Age(age) => user.age = *age,
            UserChange::Phone(phone) => user.phone = phone.clone(),
        }
    }
}

/// Filter and pagination parameters of the user list
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct GetUsersQuery {
    #[serde(
        default,
        deserialize_with = "zero_as_absent",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
    #[serde(
        default,
        deserialize_with = "zero_as_absent",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl GetUsersQuery {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_PAGE_SIZE: i64 = 10;

    /// Effective page; absent or non-positive values mean the first page
    pub fn page(&self) -> i64 {
        self.page.filter(|page| *page > 0).unwrap_or(Self::DEFAULT_PAGE)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
            .filter(|size| *size > 0)
            .unwrap_or(Self::DEFAULT_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.page_size())
    }

    pub fn name_filter(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn email_filter(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageParam {
    Number(i64),
    Text(String),
}

/// Empty and zero pagination values count as absent, so they fall back to
/// the defaults instead of failing validation. Negative values are kept.
fn zero_as_absent<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<PageParam>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(PageParam::Number(value)) => value,
        Some(PageParam::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<i64>()
                .map_err(|e| de::Error::custom(format!("invalid integer {text:?}: {e}")))?
        }
    };

    Ok(Some(value).filter(|value| *value != 0))
}

/// One page of users plus the total number of matches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}
