use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Menu item joined with its category name.
#[derive(Debug, Clone, FromRow)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category_id: Uuid,
    pub category: String,
    pub image: Option<String>,
    pub available: bool,
    pub featured: bool,
    pub stock: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
