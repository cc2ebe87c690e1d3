// src/services/organization_service.rs

use sqlx::PgConnection;

use crate::{
    common::error::AppError,
    db::{ActivityRepository, OrganizationRepository},
    models::{activity::Activity, organization::OrganizationView},
    services::geo::{within_radius, BoundingBox, SearchArea},
};

#[derive(Clone)]
pub struct OrganizationService {
    activity_repo: ActivityRepository,
    organization_repo: OrganizationRepository,
}

impl OrganizationService {
    pub fn new(activity_repo: ActivityRepository, organization_repo: OrganizationRepository) -> Self {
        Self {
            activity_repo,
            organization_repo,
        }
    }

    // ---
    // Árvore de atividades
    // ---

    /// O id precisa ser de uma raiz; id de nó filho ou inexistente => lista vazia.
    pub async fn by_activity_id(
        &self,
        conn: &mut PgConnection,
        activity_id: i32,
    ) -> Result<Vec<OrganizationView>, AppError> {
        let root = self.activity_repo.find_root_by_id(&mut *conn, activity_id).await?;
        self.organizations_of_tree(conn, root).await
    }

    /// Mesma regra, buscando a raiz pelo nome exato.
    pub async fn by_activity_tree(
        &self,
        conn: &mut PgConnection,
        activity_name: &str,
    ) -> Result<Vec<OrganizationView>, AppError> {
        let root = self.activity_repo.find_root_by_name(&mut *conn, activity_name).await?;
        self.organizations_of_tree(conn, root).await
    }

    async fn organizations_of_tree(
        &self,
        conn: &mut PgConnection,
        root: Option<Activity>,
    ) -> Result<Vec<OrganizationView>, AppError> {
        let Some(root) = root else {
            tracing::debug!("Nenhuma atividade raiz encontrada");
            return Ok(Vec::new());
        };

        let closure = self.activity_repo.fetch_descendant_ids(&mut *conn, root.id).await?;
        let activity_ids: Vec<i32> = closure.into_iter().collect();

        tracing::debug!(
            root_id = root.id,
            tree_size = activity_ids.len(),
            "Árvore de atividades resolvida"
        );

        self.organization_repo
            .find_by_activity_ids(&mut *conn, &activity_ids)
            .await
    }

    // ---
    // Busca geográfica
    // ---

    pub async fn nearby(
        &self,
        conn: &mut PgConnection,
        area: SearchArea,
    ) -> Result<Vec<OrganizationView>, AppError> {
        match area {
            SearchArea::Box(bbox) => self.organization_repo.find_in_box(&mut *conn, &bbox).await,
            SearchArea::Radius { center, radius_km } => {
                // 1. Pré-filtro grosso no banco
                let bbox = BoundingBox::around(center, radius_km);
                let candidates = self.organization_repo.find_in_box(&mut *conn, &bbox).await?;
                let candidate_count = candidates.len();

                // 2. Filtro exato por haversine
                let organizations = within_radius(center, radius_km, candidates);

                tracing::debug!(
                    candidates = candidate_count,
                    kept = organizations.len(),
                    radius_km,
                    "Filtro por raio aplicado"
                );
                Ok(organizations)
            }
            SearchArea::Everywhere => self.organization_repo.find_all(&mut *conn).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::seed::seed_demo_data, services::geo::GeoPoint};
    use sqlx::PgPool;

    fn service() -> OrganizationService {
        OrganizationService::new(ActivityRepository::new(), OrganizationRepository::new())
    }

    fn names(organizations: &[OrganizationView]) -> Vec<&str> {
        organizations.iter().map(|o| o.name.as_str()).collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn food_tree_returns_every_food_organization_once(pool: PgPool) {
        seed_demo_data(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let found = service().by_activity_tree(&mut *conn, "Еда").await.unwrap();
        assert_eq!(
            names(&found),
            vec!["ООО Рога и Копыта", "ИП Молочные продукты", "Мясокомбинат Мытищинский"]
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn car_tree_excludes_food_organizations(pool: PgPool) {
        seed_demo_data(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let found = service().by_activity_tree(&mut *conn, "Автомобили").await.unwrap();
        assert_eq!(names(&found), vec!["Автоцентр Казань"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn child_activity_resolves_to_nothing(pool: PgPool) {
        seed_demo_data(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let meat: i32 = sqlx::query_scalar("SELECT id FROM activities WHERE name = 'Мясная продукция'")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert!(service().by_activity_id(&mut *conn, meat).await.unwrap().is_empty());
        assert!(service().by_activity_tree(&mut *conn, "Мясная продукция").await.unwrap().is_empty());
        assert!(service().by_activity_tree(&mut *conn, "Нет такой").await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn root_id_matches_root_name(pool: PgPool) {
        seed_demo_data(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let food: i32 = sqlx::query_scalar("SELECT id FROM activities WHERE name = 'Еда'")
            .fetch_one(&pool)
            .await
            .unwrap();

        let by_id = service().by_activity_id(&mut *conn, food).await.unwrap();
        let by_name = service().by_activity_tree(&mut *conn, "Еда").await.unwrap();
        assert_eq!(by_id, by_name);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn nearby_modes_against_seeded_buildings(pool: PgPool) {
        seed_demo_data(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let center = GeoPoint::new(55.7558, 37.6173);

        let radius = SearchArea::select(center, Some(5.0), None, None, None, None);
        let found = service().nearby(&mut *conn, radius).await.unwrap();
        assert_eq!(names(&found), vec!["ООО Рога и Копыта"]);

        let moscow_region = SearchArea::select(center, Some(5.0), Some(55.0), Some(56.5), Some(37.0), Some(38.0));
        let found = service().nearby(&mut *conn, moscow_region).await.unwrap();
        assert_eq!(found.len(), 3);

        let everywhere = SearchArea::select(center, None, None, None, None, None);
        let found = service().nearby(&mut *conn, everywhere).await.unwrap();
        assert_eq!(found.len(), 4);
    }
}
