// src/db/activity_repo.rs

use std::collections::BTreeSet;

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::activity::{Activity, ActivityEdge},
    services::activity_tree::descendant_closure,
};

// Responsável pela tabela 'activities' (árvore auto-referenciada)
#[derive(Clone, Default)]
pub struct ActivityRepository;

impl ActivityRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Leitura
    // ---

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Activity>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let activities = sqlx::query_as::<_, Activity>("SELECT * FROM activities ORDER BY id")
            .fetch_all(executor)
            .await?;
        Ok(activities)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Activity>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let activity = sqlx::query_as::<_, Activity>("SELECT * FROM activities WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(activity)
    }

    /// Só encontra se o nó com esse id for raiz (`parent_id IS NULL`).
    pub async fn find_root_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Activity>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let activity = sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE id = $1 AND parent_id IS NULL",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(activity)
    }

    /// Mesmo filtro de raiz, mas pelo nome exato.
    pub async fn find_root_by_name<'e, E>(
        &self,
        executor: E,
        name: &str,
    ) -> Result<Option<Activity>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let activity = sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE name = $1 AND parent_id IS NULL",
        )
        .bind(name)
        .fetch_optional(executor)
        .await?;
        Ok(activity)
    }

    /// A relação de adjacência inteira (id, parent_id).
    pub async fn list_edges<'e, E>(&self, executor: E) -> Result<Vec<ActivityEdge>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let edges = sqlx::query_as::<_, ActivityEdge>("SELECT id, parent_id FROM activities")
            .fetch_all(executor)
            .await?;
        Ok(edges)
    }

    /// Id da raiz mais os ids de todos os descendentes.
    pub async fn fetch_descendant_ids<'e, E>(
        &self,
        executor: E,
        root_id: i32,
    ) -> Result<BTreeSet<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let edges = self.list_edges(executor).await?;
        Ok(descendant_closure(root_id, &edges))
    }

    // ---
    // Escrita
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        parent_id: Option<i32>,
    ) -> Result<Activity, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (name, parent_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(parent_id)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, |constraint| activity_conflict(constraint, name, parent_id)))
    }

    /// `name = None` mantém o nome; `parent_id` é sempre sobrescrito (None => vira raiz).
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        name: Option<&str>,
        parent_id: Option<i32>,
    ) -> Result<Option<Activity>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Activity>(
            r#"
            UPDATE activities SET
                name      = COALESCE($2, name),
                parent_id = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(parent_id)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            AppError::from_db(e, |constraint| activity_conflict(constraint, name.unwrap_or_default(), parent_id))
        })
    }

    /// Os filhos viram raiz (ON DELETE SET NULL); os vínculos com organizações somem.
    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<Option<Activity>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let activity = sqlx::query_as::<_, Activity>("DELETE FROM activities WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(activity)
    }
}

fn activity_conflict(constraint: &str, name: &str, parent_id: Option<i32>) -> String {
    if constraint.contains("parent_id") {
        let parent = parent_id.map(|id| id.to_string()).unwrap_or_default();
        format!("A atividade pai {} não existe.", parent)
    } else {
        format!("Já existe uma atividade com o nome '{}'.", name)
    }
}
