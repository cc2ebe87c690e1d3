// src/db/organization_repo.rs

use std::collections::HashMap;

use sqlx::{Connection, Executor, PgConnection, Postgres};

use crate::{
    common::error::AppError,
    models::organization::{OrganizationPhone, OrganizationRow, OrganizationView},
    services::geo::BoundingBox,
};

// Organização + prédio numa linha só. LEFT JOIN para tolerar prédio ausente.
const ORGANIZATION_SELECT: &str = r#"
    SELECT o.id,
           o.name,
           b.id        AS building_id,
           b.address   AS building_address,
           b.latitude  AS building_latitude,
           b.longitude AS building_longitude
    FROM organizations o
    LEFT JOIN buildings b ON b.id = o.building_id
"#;

// Responsável por 'organizations', 'organization_phones' e 'org_activity'
#[derive(Clone, Default)]
pub struct OrganizationRepository;

impl OrganizationRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Leitura (todas devolvem a visão completa: prédio, telefones, atividades)
    // ---

    pub async fn find_all(&self, conn: &mut PgConnection) -> Result<Vec<OrganizationView>, AppError> {
        let sql = format!("{} ORDER BY o.id", ORGANIZATION_SELECT);
        let rows = sqlx::query_as::<_, OrganizationRow>(&sql)
            .fetch_all(&mut *conn)
            .await?;
        self.hydrate(&mut *conn, rows).await
    }

    pub async fn find_by_id(&self, conn: &mut PgConnection, id: i32) -> Result<Option<OrganizationView>, AppError> {
        let sql = format!("{} WHERE o.id = $1", ORGANIZATION_SELECT);
        let rows = sqlx::query_as::<_, OrganizationRow>(&sql)
            .bind(id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(self.hydrate(&mut *conn, rows).await?.into_iter().next())
    }

    /// Busca por trecho do nome, sem diferenciar maiúsculas.
    pub async fn search_by_name(&self, conn: &mut PgConnection, name: &str) -> Result<Vec<OrganizationView>, AppError> {
        let sql = format!(
            "{} WHERE o.name ILIKE '%' || $1 || '%' ORDER BY o.id",
            ORGANIZATION_SELECT
        );
        let rows = sqlx::query_as::<_, OrganizationRow>(&sql)
            .bind(name)
            .fetch_all(&mut *conn)
            .await?;
        self.hydrate(&mut *conn, rows).await
    }

    pub async fn find_by_building(
        &self,
        conn: &mut PgConnection,
        building_id: i32,
    ) -> Result<Vec<OrganizationView>, AppError> {
        let sql = format!("{} WHERE o.building_id = $1 ORDER BY o.id", ORGANIZATION_SELECT);
        let rows = sqlx::query_as::<_, OrganizationRow>(&sql)
            .bind(building_id)
            .fetch_all(&mut *conn)
            .await?;
        self.hydrate(&mut *conn, rows).await
    }

    /// Organizações com ao menos um vínculo em `activity_ids`, sem duplicatas.
    pub async fn find_by_activity_ids(
        &self,
        conn: &mut PgConnection,
        activity_ids: &[i32],
    ) -> Result<Vec<OrganizationView>, AppError> {
        if activity_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"{} WHERE o.id IN (
                   SELECT oa.organization_id FROM org_activity oa
                   WHERE oa.activity_id = ANY($1)
               )
               ORDER BY o.id"#,
            ORGANIZATION_SELECT
        );
        let rows = sqlx::query_as::<_, OrganizationRow>(&sql)
            .bind(activity_ids)
            .fetch_all(&mut *conn)
            .await?;
        self.hydrate(&mut *conn, rows).await
    }

    /// Prédio dentro do retângulo (limites inclusivos).
    pub async fn find_in_box(
        &self,
        conn: &mut PgConnection,
        bbox: &BoundingBox,
    ) -> Result<Vec<OrganizationView>, AppError> {
        let sql = format!(
            r#"{} WHERE b.latitude  BETWEEN $1 AND $2
                 AND b.longitude BETWEEN $3 AND $4
               ORDER BY o.id"#,
            ORGANIZATION_SELECT
        );
        let rows = sqlx::query_as::<_, OrganizationRow>(&sql)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .fetch_all(&mut *conn)
            .await?;
        self.hydrate(&mut *conn, rows).await
    }

    // Duas consultas extras (telefones e nomes de atividades) para o lote inteiro.
    async fn hydrate(
        &self,
        conn: &mut PgConnection,
        rows: Vec<OrganizationRow>,
    ) -> Result<Vec<OrganizationView>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();

        let phones = sqlx::query_as::<_, (i32, String)>(
            r#"
            SELECT organization_id, phone
            FROM organization_phones
            WHERE organization_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids.as_slice())
        .fetch_all(&mut *conn)
        .await?;

        let activities = sqlx::query_as::<_, (i32, String)>(
            r#"
            SELECT oa.organization_id, a.name
            FROM org_activity oa
            JOIN activities a ON a.id = oa.activity_id
            WHERE oa.organization_id = ANY($1)
            ORDER BY a.id
            "#,
        )
        .bind(ids.as_slice())
        .fetch_all(&mut *conn)
        .await?;

        let mut phones_by_org = group_by_org(phones);
        let mut activities_by_org = group_by_org(activities);

        Ok(rows
            .into_iter()
            .map(|row| {
                let phones = phones_by_org.remove(&row.id).unwrap_or_default();
                let activities = activities_by_org.remove(&row.id).unwrap_or_default();
                OrganizationView::from_row(row, phones, activities)
            })
            .collect())
    }

    // ---
    // Escrita
    // ---

    /// Cria a organização com telefones e vínculos numa única transação.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        name: &str,
        building_id: i32,
        phones: &[String],
        activity_ids: &[i32],
    ) -> Result<OrganizationView, AppError> {
        let mut tx = conn.begin().await?;

        let id: i32 = sqlx::query_scalar(
            "INSERT INTO organizations (name, building_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(building_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, |constraint| organization_conflict(constraint, name, building_id)))?;

        if !phones.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO organization_phones (organization_id, phone)
                SELECT $1, UNNEST($2::text[])
                "#,
            )
            .bind(id)
            .bind(phones)
            .execute(&mut *tx)
            .await?;
        }

        if !activity_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO org_activity (organization_id, activity_id)
                SELECT $1, UNNEST($2::int4[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(activity_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::from_db(e, |_| "Uma ou mais atividades informadas não existem.".to_string())
            })?;
        }

        let created = self
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Organização"))?;

        tx.commit().await?;
        Ok(created)
    }

    /// Atualização parcial de nome e/ou prédio.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i32,
        name: Option<&str>,
        building_id: Option<i32>,
    ) -> Result<Option<OrganizationView>, AppError> {
        let updated: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE organizations SET
                name        = COALESCE($2, name),
                building_id = COALESCE($3, building_id)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(building_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            AppError::from_db(e, |constraint| {
                organization_conflict(constraint, name.unwrap_or_default(), building_id.unwrap_or_default())
            })
        })?;

        match updated {
            Some(id) => self.find_by_id(&mut *conn, id).await,
            None => Ok(None),
        }
    }

    /// Telefones e vínculos caem junto (ON DELETE CASCADE).
    /// Leitura e remoção na mesma transação: só devolve a visão da linha que de fato apagou.
    pub async fn delete(&self, conn: &mut PgConnection, id: i32) -> Result<Option<OrganizationView>, AppError> {
        let mut tx = conn.begin().await?;

        let Some(existing) = self.find_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };

        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(existing))
    }

    // ---
    // Telefones
    // ---

    pub async fn list_phones<'e, E>(&self, executor: E, organization_id: i32) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let phones = sqlx::query_scalar::<_, String>(
            "SELECT phone FROM organization_phones WHERE organization_id = $1 ORDER BY id",
        )
        .bind(organization_id)
        .fetch_all(executor)
        .await?;
        Ok(phones)
    }

    pub async fn add_phone<'e, E>(
        &self,
        executor: E,
        organization_id: i32,
        phone: &str,
    ) -> Result<OrganizationPhone, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, OrganizationPhone>(
            r#"
            INSERT INTO organization_phones (organization_id, phone)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(phone)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("Organização");
                }
            }
            e.into()
        })
    }

    /// Só remove se o telefone pertencer à organização informada.
    pub async fn delete_phone<'e, E>(
        &self,
        executor: E,
        organization_id: i32,
        phone_id: i32,
    ) -> Result<Option<OrganizationPhone>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let phone = sqlx::query_as::<_, OrganizationPhone>(
            r#"
            DELETE FROM organization_phones
            WHERE id = $1 AND organization_id = $2
            RETURNING *
            "#,
        )
        .bind(phone_id)
        .bind(organization_id)
        .fetch_optional(executor)
        .await?;
        Ok(phone)
    }

    // ---
    // Vínculos Organização <-> Atividade
    // ---

    /// Idempotente: vincular duas vezes não gera erro.
    pub async fn link_activity<'e, E>(
        &self,
        executor: E,
        organization_id: i32,
        activity_id: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO org_activity (organization_id, activity_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(organization_id)
        .bind(activity_id)
        .execute(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    if db_err.constraint().unwrap_or_default().contains("activity_id") {
                        return AppError::NotFound("Atividade");
                    }
                    return AppError::NotFound("Organização");
                }
            }
            e.into()
        })?;
        Ok(())
    }

    /// Devolve `false` se o vínculo não existia.
    pub async fn unlink_activity<'e, E>(
        &self,
        executor: E,
        organization_id: i32,
        activity_id: i32,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM org_activity WHERE organization_id = $1 AND activity_id = $2")
            .bind(organization_id)
            .bind(activity_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn group_by_org(pairs: Vec<(i32, String)>) -> HashMap<i32, Vec<String>> {
    let mut grouped: HashMap<i32, Vec<String>> = HashMap::new();
    for (organization_id, value) in pairs {
        grouped.entry(organization_id).or_default().push(value);
    }
    grouped
}

fn organization_conflict(constraint: &str, name: &str, building_id: i32) -> String {
    if constraint == "uix_name_building" {
        format!("Já existe a organização '{}' no prédio {}.", name, building_id)
    } else {
        format!("O prédio {} não existe.", building_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed::seed_demo_data;
    use sqlx::PgPool;

    #[test]
    fn group_by_org_keeps_order_per_organization() {
        let grouped = group_by_org(vec![
            (1, "8-923-666-13-13".into()),
            (2, "8-800-333-55-22".into()),
            (1, "8-495-555-55-55".into()),
        ]);

        assert_eq!(grouped[&1], vec!["8-923-666-13-13", "8-495-555-55-55"]);
        assert_eq!(grouped[&2], vec!["8-800-333-55-22"]);
        assert!(!grouped.contains_key(&3));
    }

    #[test]
    fn conflict_message_distinguishes_unique_from_fk() {
        assert!(organization_conflict("uix_name_building", "ООО", 1).contains("Já existe"));
        assert!(organization_conflict("organizations_building_id_fkey", "ООО", 9).contains("não existe"));
    }

    // --- Com banco (sqlx::test cria um banco novo por teste) ---

    async fn id_of(pool: &PgPool, table: &str, name: &str) -> i32 {
        sqlx::query_scalar(&format!("SELECT id FROM {} WHERE name = $1", table))
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn activity_filter_returns_each_organization_once(pool: PgPool) {
        seed_demo_data(&pool).await.unwrap();
        let repo = OrganizationRepository::new();
        let mut conn = pool.acquire().await.unwrap();

        let meat = id_of(&pool, "activities", "Мясная продукция").await;
        let milk = id_of(&pool, "activities", "Молочная продукция").await;

        // O mesmo id repetido também não pode duplicar o resultado
        let found = repo.find_by_activity_ids(&mut *conn, &[meat, milk, meat]).await.unwrap();
        let names: Vec<&str> = found.iter().map(|o| o.name.as_str()).collect();

        assert_eq!(
            names,
            vec!["ООО Рога и Копыта", "ИП Молочные продукты", "Мясокомбинат Мытищинский"]
        );
        let mytishchi = &found[2];
        assert_eq!(mytishchi.activities, vec!["Мясная продукция", "Молочная продукция"]);
        assert_eq!(mytishchi.phones, vec!["8-495-555-55-55"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn empty_activity_filter_returns_nothing(pool: PgPool) {
        seed_demo_data(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let found = OrganizationRepository::new().find_by_activity_ids(&mut *conn, &[]).await.unwrap();
        assert!(found.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn delete_cascades_and_second_delete_is_none(pool: PgPool) {
        seed_demo_data(&pool).await.unwrap();
        let repo = OrganizationRepository::new();
        let mut conn = pool.acquire().await.unwrap();

        let id = id_of(&pool, "organizations", "Автоцентр Казань").await;

        let deleted = repo.delete(&mut *conn, id).await.unwrap();
        assert_eq!(deleted.map(|o| o.id), Some(id));
        assert!(repo.delete(&mut *conn, id).await.unwrap().is_none());
        assert!(repo.list_phones(&mut *conn, id).await.unwrap().is_empty());

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM org_activity WHERE organization_id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(links, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn create_rolls_back_when_activity_is_missing(pool: PgPool) {
        seed_demo_data(&pool).await.unwrap();
        let repo = OrganizationRepository::new();
        let mut conn = pool.acquire().await.unwrap();

        let building = id_of_building(&pool).await;
        let err = repo
            .create(&mut *conn, "ООО Новая", building, &["8-000".to_string()], &[-1])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));

        let found = repo.search_by_name(&mut *conn, "Новая").await.unwrap();
        assert!(found.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn same_name_in_same_building_is_a_conflict(pool: PgPool) {
        seed_demo_data(&pool).await.unwrap();
        let repo = OrganizationRepository::new();
        let mut conn = pool.acquire().await.unwrap();

        let existing = repo.search_by_name(&mut *conn, "Рога и Копыта").await.unwrap();
        let building = existing[0].building.as_ref().unwrap().id;

        let err = repo
            .create(&mut *conn, "ООО Рога и Копыта", building, &[], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
    }

    async fn id_of_building(pool: &PgPool) -> i32 {
        sqlx::query_scalar("SELECT id FROM buildings ORDER BY id LIMIT 1")
            .fetch_one(pool)
            .await
            .unwrap()
    }
}
