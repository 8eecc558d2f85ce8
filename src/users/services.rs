use std::collections::HashMap;

use uuid::Uuid;

use super::dto::{RoleFilter, UserListResponse, UserQuery, UserSortKey, UserSummary, UserView};
use crate::{
    auth::{
        repo_types::{Admin, User},
        Role,
    },
    listing::{contains_ci, sort_by_key},
};

/// Customers then admins, newest first within each group.
pub fn merge_accounts(
    customers: Vec<User>,
    admins: Vec<Admin>,
    order_counts: &HashMap<Uuid, i64>,
) -> Vec<UserView> {
    let customers = customers.into_iter().map(|u| UserView {
        order_count: order_counts.get(&u.id).copied().unwrap_or(0),
        id: u.id,
        name: u.full_name,
        email: u.email,
        role: Role::Customer,
        joined: u.created_at,
    });
    let admins = admins.into_iter().map(|a| UserView {
        name: a.display_name(),
        id: a.id,
        email: a.email,
        role: Role::Admin,
        joined: a.created_at,
        order_count: 0,
    });
    customers.chain(admins).collect()
}

fn role_key(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin",
        Role::Customer => "customer",
    }
}

pub fn user_listing(users: Vec<UserView>, query: &UserQuery) -> UserListResponse {
    let summary = UserSummary {
        total: users.len(),
        customers: users.iter().filter(|u| u.role == Role::Customer).count(),
        admins: users.iter().filter(|u| u.role == Role::Admin).count(),
    };

    let q = query.q.trim();
    let mut matched: Vec<UserView> = users
        .into_iter()
        .filter(|u| contains_ci(&u.name, q) || contains_ci(&u.email, q))
        .filter(|u| match query.role {
            RoleFilter::All => true,
            RoleFilter::Customer => u.role == Role::Customer,
            RoleFilter::Admin => u.role == Role::Admin,
        })
        .collect();

    match query.sort {
        Some(UserSortKey::Name) => sort_by_key(&mut matched, query.direction, |u| u.name.to_lowercase()),
        Some(UserSortKey::Email) => sort_by_key(&mut matched, query.direction, |u| u.email.clone()),
        Some(UserSortKey::Role) => sort_by_key(&mut matched, query.direction, |u| role_key(u.role)),
        Some(UserSortKey::Joined) => sort_by_key(&mut matched, query.direction, |u| u.joined),
        Some(UserSortKey::OrderCount) => {
            sort_by_key(&mut matched, query.direction, |u| u.order_count)
        }
        None => {}
    }

    let total = matched.len();
    UserListResponse {
        users: query.page().apply(matched),
        total,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::SortDirection;
    use time::{Duration, OffsetDateTime};

    fn customer(name: &str, days_ago: i64) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "x".into(),
            created_at: OffsetDateTime::now_utc() - Duration::days(days_ago),
        }
    }

    fn admin(email: &str, full_name: Option<&str>) -> Admin {
        Admin {
            id: Uuid::new_v4(),
            email: email.into(),
            full_name: full_name.map(str::to_string),
            password_hash: "x".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn accounts() -> Vec<UserView> {
        let ana = customer("Ana", 3);
        let ben = customer("Ben", 1);
        let counts = HashMap::from([(ana.id, 4), (ben.id, 1)]);
        merge_accounts(
            vec![ana, ben],
            vec![admin("owner@zelin.cafe", None), admin("mia@zelin.cafe", Some("Mia Chen"))],
            &counts,
        )
    }

    #[test]
    fn merge_sets_roles_names_and_counts() {
        let users = accounts();
        assert_eq!(users.len(), 4);
        assert_eq!(users[0].order_count, 4);
        assert_eq!(users[2].name, "owner");
        assert_eq!(users[2].role, Role::Admin);
        assert_eq!(users[3].name, "Mia Chen");
    }

    #[test]
    fn role_filter_and_summary() {
        let out = user_listing(
            accounts(),
            &UserQuery {
                role: RoleFilter::Admin,
                ..Default::default()
            },
        );
        assert_eq!(out.total, 2);
        assert_eq!(
            out.summary,
            UserSummary {
                total: 4,
                customers: 2,
                admins: 2
            }
        );
    }

    #[test]
    fn search_and_sort_by_order_count() {
        let out = user_listing(
            accounts(),
            &UserQuery {
                q: "EXAMPLE.com".into(),
                sort: Some(UserSortKey::OrderCount),
                direction: SortDirection::Asc,
                ..Default::default()
            },
        );
        let names: Vec<_> = out.users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Ben", "Ana"]);
    }

    #[test]
    fn sort_by_joined_desc() {
        let out = user_listing(
            accounts(),
            &UserQuery {
                role: RoleFilter::Customer,
                sort: Some(UserSortKey::Joined),
                direction: SortDirection::Desc,
                ..Default::default()
            },
        );
        assert_eq!(out.users[0].name, "Ben");
    }
}
