pub mod curve;
pub mod line;
pub mod mode;
pub mod plugin;
pub mod preview;
pub mod rotation;
pub mod session;
pub mod settings;
pub mod single;
pub mod systems;

pub use plugin::PlacementPlugin;
