pub mod components;
pub mod plugin;
pub mod progress;
pub mod systems;

pub use plugin::ConstructionPlugin;
