// src/db/building_repo.rs

use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::building::Building};

// Responsável por todas as interações com a tabela 'buildings'
#[derive(Clone, Default)]
pub struct BuildingRepository;

impl BuildingRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Building>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let buildings = sqlx::query_as::<_, Building>("SELECT * FROM buildings ORDER BY id")
            .fetch_all(executor)
            .await?;
        Ok(buildings)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Building>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let building = sqlx::query_as::<_, Building>("SELECT * FROM buildings WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(building)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        address: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Building, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let building = sqlx::query_as::<_, Building>(
            r#"
            INSERT INTO buildings (address, latitude, longitude)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(address)
        .bind(latitude)
        .bind(longitude)
        .fetch_one(executor)
        .await?;
        Ok(building)
    }

    /// Atualização parcial: campos `None` mantêm o valor atual.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        address: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Option<Building>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let building = sqlx::query_as::<_, Building>(
            r#"
            UPDATE buildings SET
                address   = COALESCE($2, address),
                latitude  = COALESCE($3, latitude),
                longitude = COALESCE($4, longitude)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(address)
        .bind(latitude)
        .bind(longitude)
        .fetch_optional(executor)
        .await?;
        Ok(building)
    }

    /// Falha com `ConstraintViolation` enquanto houver organizações no prédio (ON DELETE RESTRICT).
    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<Option<Building>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Building>("DELETE FROM buildings WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(|e| {
                AppError::from_db(e, |_| {
                    format!("O prédio {} ainda possui organizações e não pode ser removido.", id)
                })
            })
    }
}
