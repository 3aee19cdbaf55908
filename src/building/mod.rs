pub mod construction;
pub mod core;
pub mod model;
pub mod occupancy;
pub mod placement;
pub mod plugin;
pub mod registry;
pub mod validator;

pub use plugin::BuildingStackPlugin;
