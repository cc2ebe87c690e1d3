pub mod activity;
pub mod building;
pub mod organization;
