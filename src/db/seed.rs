// src/db/seed.rs

use sqlx::{Acquire, Postgres};

use crate::{
    common::error::AppError,
    db::{ActivityRepository, BuildingRepository, OrganizationRepository},
};

// Prédios com coordenadas para testar a busca por raio
const BUILDINGS: [(&str, f64, f64); 4] = [
    ("г. Москва, ул. Ленина 1", 55.7558, 37.6173),        // centro de Moscou
    ("г. Москва, пр-т Вернадского 78", 55.6761, 37.5066), // sudoeste de Moscou
    ("г. Мытищи, ул. Сукромка 5", 55.9117, 37.7302),      // fora de Moscou
    ("г. Казань, ул. Баумана 10", 55.7963, 49.1088),      // outra cidade
];

/// Apaga tudo e insere o conjunto de demonstração, numa transação só.
pub async fn seed_demo_data<'e, A>(executor: A) -> Result<(), AppError>
where
    A: Acquire<'e, Database = Postgres>,
{
    let buildings = BuildingRepository::new();
    let activities = ActivityRepository::new();
    let organizations = OrganizationRepository::new();

    let mut tx = executor.begin().await?;

    for table in ["organization_phones", "org_activity", "organizations", "activities", "buildings"] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?;
    }

    let mut building_ids = Vec::with_capacity(BUILDINGS.len());
    for (address, latitude, longitude) in BUILDINGS {
        let building = buildings.create(&mut *tx, address, latitude, longitude).await?;
        building_ids.push(building.id);
    }

    // --- Atividades ---
    let food = activities.create(&mut *tx, "Еда", None).await?;
    let meat = activities.create(&mut *tx, "Мясная продукция", Some(food.id)).await?;
    let milk = activities.create(&mut *tx, "Молочная продукция", Some(food.id)).await?;

    let auto = activities.create(&mut *tx, "Автомобили", None).await?;
    let cars = activities.create(&mut *tx, "Легковые", Some(auto.id)).await?;
    activities.create(&mut *tx, "Грузовые", Some(auto.id)).await?;

    // --- Organizações ---
    let seeds: [(&str, usize, &str, Vec<i32>); 4] = [
        ("ООО Рога и Копыта", 0, "8-923-666-13-13", vec![meat.id]),
        ("ИП Молочные продукты", 1, "8-800-333-55-22", vec![milk.id]),
        ("Мясокомбинат Мытищинский", 2, "8-495-555-55-55", vec![meat.id, milk.id]),
        ("Автоцентр Казань", 3, "8-843-100-00-00", vec![cars.id]),
    ];

    for (name, building_idx, phone, activity_ids) in seeds {
        organizations
            .create(
                &mut *tx,
                name,
                building_ids[building_idx],
                &[phone.to_string()],
                &activity_ids,
            )
            .await?;
    }

    tx.commit().await?;

    tracing::info!("✅ Dados de demonstração inseridos com sucesso.");
    Ok(())
}
