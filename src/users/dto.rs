use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::Role,
    listing::{Pagination, SortDirection},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserSortKey {
    Name,
    Email,
    Role,
    #[serde(alias = "joined_at", alias = "created_at")]
    Joined,
    #[serde(alias = "orders")]
    OrderCount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleFilter {
    #[default]
    #[serde(alias = "All")]
    All,
    #[serde(alias = "Customer")]
    Customer,
    #[serde(alias = "Admin")]
    Admin,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub role: RoleFilter,
    #[serde(default)]
    pub sort: Option<UserSortKey>,
    #[serde(default)]
    pub direction: SortDirection,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl UserQuery {
    pub fn page(&self) -> Pagination {
        let mut page = Pagination::default();
        if let Some(limit) = self.limit {
            page.limit = limit;
        }
        if let Some(offset) = self.offset {
            page.offset = offset;
        }
        page
    }
}

/// Customer or admin as shown in the admin user list.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub joined: OffsetDateTime,
    pub order_count: i64,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub total: usize,
    pub customers: usize,
    pub admins: usize,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserView>,
    pub total: usize,
    pub summary: UserSummary,
}
