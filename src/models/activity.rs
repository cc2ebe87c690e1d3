// src/models/activity.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// Nó da árvore de atividades. `parent_id = None` => raiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Activity {
    pub id: i32,
    #[schema(example = "Еда")]
    pub name: String,
    pub parent_id: Option<i32>,
}

// Aresta da relação de adjacência (filho -> pai), sem o nome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct ActivityEdge {
    pub id: i32,
    pub parent_id: Option<i32>,
}
