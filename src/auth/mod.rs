use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod session;

pub use claims::Role;
pub use dto::JwtKeys;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::customer_routes())
        .merge(handlers::admin_routes())
}
