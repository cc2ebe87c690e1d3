pub mod activity_tree;
pub mod geo;
pub mod organization_service;
