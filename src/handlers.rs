pub mod activities;
pub mod buildings;
pub mod organizations;
