pub mod activity_repo;
pub use activity_repo::ActivityRepository;
pub mod building_repo;
pub use building_repo::BuildingRepository;
pub mod organization_repo;
pub use organization_repo::OrganizationRepository;
pub mod seed;
