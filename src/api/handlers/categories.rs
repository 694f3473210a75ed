use axum::Json;

use crate::domain::{category_tree, CategoryNode};

pub async fn tree() -> Json<CategoryNode> {
    Json(category_tree())
}
