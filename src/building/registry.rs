// src/building/registry.rs
//! Data-driven building templates + loader.

use bevy::asset::{io::Reader, AssetLoader, LoadContext};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------- Public plugin to register asset+loader ----------

pub struct BuildingRegistryAssetPlugin;

impl Plugin for BuildingRegistryAssetPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<BuildingRegistry>()
            .register_asset_loader(BuildingRegistryLoader)
            .init_resource::<BuildingRegistrySettings>()
            .init_resource::<BuildingRegistryHandle>()
            .add_systems(Startup, load_registry)
            .add_systems(Update, monitor_registry_ready);
    }
}

/// Index of a template in the registry (stable during a session).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub u32);

// ---------- Model refs (data form) ----------

/// One procedural box of a block model. `offset` is the center of its base,
/// relative to the building origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockDef {
    pub offset: Vec3,
    pub size: Vec3,
    #[serde(default = "default_block_color")]
    pub color: (f32, f32, f32),
    #[serde(default = "default_true")]
    pub collider: bool,
}

impl BlockDef {
    /// Lowest point of the block relative to the building base.
    #[inline]
    pub fn base_height(&self) -> f32 {
        self.offset.y
    }
}

fn default_block_color() -> (f32, f32, f32) {
    (0.7, 0.65, 0.55)
}
fn default_true() -> bool {
    true
}

/// Visual representation of a template at one phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ModelRef {
    /// glTF scene; parts are discovered from its mesh descendants.
    Scene { path: String },
    /// Procedural stack of boxes, one part per block.
    Blocks { parts: Vec<BlockDef> },
}

// ---------- Template definition (data form) ----------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildingTemplate {
    /// Unique human-readable name (used for lookup and the toolbar).
    pub name: String,

    #[serde(default)]
    pub icon: Option<String>,

    /// Model shown while the building rises (and used for its preview).
    #[serde(default)]
    pub construction_model: Option<ModelRef>,

    /// Model swapped in once construction completes, if distinct.
    #[serde(default)]
    pub final_model: Option<ModelRef>,

    /// Seconds from start to completion. 0 completes on the first update.
    #[serde(default)]
    pub construction_time: f32,

    /// Width (local X) x depth (local Z), meters.
    pub footprint: Vec2,

    /// Terrain samples per footprint axis.
    #[serde(default = "default_grid_density")]
    pub grid_density: i32,

    /// Max allowed height difference across the terrain samples.
    #[serde(default = "default_max_height_delta")]
    pub max_height_delta: f32,
}

fn default_grid_density() -> i32 {
    3
}
fn default_max_height_delta() -> f32 {
    1.0
}

/// Unrecoverable template problems found at mode entry.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TemplateError {
    #[error("template '{0}' has no construction model")]
    MissingModel(String),
}

impl BuildingTemplate {
    /// Validate for placement. Recoverable issues are logged and coerced by the
    /// accessors below; a template without any model cannot be placed.
    pub fn check(&self) -> Result<(), TemplateError> {
        if self.construction_model.is_none() {
            return Err(TemplateError::MissingModel(self.name.clone()));
        }
        if self.footprint.x <= 0.0 || self.footprint.y <= 0.0 {
            warn!(
                "Template '{}': non-positive footprint {:?}; sampling a single point",
                self.name, self.footprint
            );
        }
        if self.grid_density < 1 {
            warn!(
                "Template '{}': grid_density {} coerced to 1",
                self.name, self.grid_density
            );
        }
        if self.construction_time < 0.0 {
            warn!(
                "Template '{}': negative construction_time {}; builds instantly",
                self.name, self.construction_time
            );
        }
        Ok(())
    }

    /// Footprint with negative axes clamped to zero.
    #[inline]
    pub fn footprint_size(&self) -> Vec2 {
        self.footprint.max(Vec2::ZERO)
    }

    #[inline]
    pub fn sample_density(&self) -> u32 {
        self.grid_density.max(1) as u32
    }

    /// The final model, only when it differs from the construction model.
    pub fn distinct_final_model(&self) -> Option<&ModelRef> {
        self.final_model
            .as_ref()
            .filter(|m| Some(*m) != self.construction_model.as_ref())
    }
}

// ---------- Runtime registry asset ----------

#[derive(Asset, TypePath, Clone, Debug)]
pub struct BuildingRegistry {
    /// Ordered list; index in this vector is the `TemplateId.0`.
    pub templates: Vec<BuildingTemplate>,
}

impl BuildingRegistry {
    pub fn from_templates(
        templates: Vec<BuildingTemplate>,
    ) -> Result<Self, BuildingRegistryLoadError> {
        let mut name_to_index = HashMap::with_capacity(templates.len());
        for (i, def) in templates.iter().enumerate() {
            if let Some(prev) = name_to_index.insert(def.name.clone(), i as u32) {
                return Err(BuildingRegistryLoadError::DuplicateName {
                    name: def.name.clone(),
                    first: prev,
                    second: i as u32,
                });
            }
        }
        Ok(Self { templates })
    }

    pub fn get(&self, id: TemplateId) -> Option<&BuildingTemplate> {
        self.templates.get(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TemplateId, &BuildingTemplate)> {
        self.templates
            .iter()
            .enumerate()
            .map(|(i, t)| (TemplateId(i as u32), t))
    }
}

/// Where the registry manifest lives.
#[derive(Resource, Clone)]
pub struct BuildingRegistrySettings {
    pub registry_path: String,
}

impl Default for BuildingRegistrySettings {
    fn default() -> Self {
        Self { registry_path: "buildings/templates.buildings.ron".to_string() }
    }
}

/// Handle to the loaded BuildingRegistry asset.
#[derive(Resource, Default)]
pub struct BuildingRegistryHandle(pub Handle<BuildingRegistry>);

/// Read-only template access for systems; empty until the asset is loaded.
#[derive(SystemParam)]
pub struct Templates<'w> {
    handle: Res<'w, BuildingRegistryHandle>,
    registries: Res<'w, Assets<BuildingRegistry>>,
}

impl Templates<'_> {
    pub fn registry(&self) -> Option<&BuildingRegistry> {
        self.registries.get(&self.handle.0)
    }

    pub fn get(&self, id: TemplateId) -> Option<&BuildingTemplate> {
        self.registry()?.get(id)
    }
}

/// Startup: request loading the registry manifest, store handle.
pub fn load_registry(
    mut handle_res: ResMut<BuildingRegistryHandle>,
    settings: Res<BuildingRegistrySettings>,
    assets: Res<AssetServer>,
) {
    if handle_res.0.is_strong() {
        return;
    }
    handle_res.0 = assets.load(settings.registry_path.as_str());
    info!("Buildings: loading registry from '{}'", settings.registry_path);
}

/// Update: log once when the registry becomes available.
pub fn monitor_registry_ready(templates: Templates, mut logged: Local<bool>) {
    if *logged {
        return;
    }
    if let Some(registry) = templates.registry() {
        *logged = true;
        info!("Buildings: registry ready with {} templates", registry.templates.len());
    }
}

// ---------- Asset loader for `.buildings.ron` ----------

#[derive(Default)]
pub struct BuildingRegistryLoader;

impl AssetLoader for BuildingRegistryLoader {
    type Asset = BuildingRegistry;
    type Settings = ();
    type Error = BuildingRegistryLoadError;

    fn extensions(&self) -> &[&str] {
        &["buildings.ron"]
    }

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let defs: Vec<BuildingTemplate> = ron::de::from_bytes(&bytes)
            .map_err(|e| BuildingRegistryLoadError::Ron(e.to_string()))?;
        BuildingRegistry::from_templates(defs)
    }
}

// ---------- Loader errors ----------

#[derive(thiserror::Error, Debug)]
pub enum BuildingRegistryLoadError {
    #[error("I/O while reading registry: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(String),
    #[error("Duplicate template name '{name}' (first idx {first}, second idx {second})")]
    DuplicateName { name: String, first: u32, second: u32 },
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Plain block template for tests elsewhere in the crate.
    pub(crate) fn block_template(name: &str, footprint: Vec2, construction_time: f32) -> BuildingTemplate {
        BuildingTemplate {
            name: name.to_string(),
            icon: None,
            construction_model: Some(ModelRef::Blocks {
                parts: vec![BlockDef {
                    offset: Vec3::ZERO,
                    size: Vec3::new(footprint.x, 2.0, footprint.y),
                    color: default_block_color(),
                    collider: true,
                }],
            }),
            final_model: None,
            construction_time,
            footprint,
            grid_density: 3,
            max_height_delta: 1.0,
        }
    }

    const SAMPLE: &str = r#"
    [
        (
            name: "Hut",
            construction_model: Some(Blocks(parts: [
                (offset: (0.0, 0.0, 0.0), size: (4.0, 0.5, 4.0)),
                (offset: (0.0, 0.5, 0.0), size: (3.5, 2.0, 3.5), color: (0.6, 0.4, 0.3)),
            ])),
            construction_time: 5.0,
            footprint: (4.0, 4.0),
        ),
        (
            name: "Tower",
            construction_model: Some(Scene(path: "models/tower_scaffold.glb")),
            final_model: Some(Scene(path: "models/tower.glb")),
            footprint: (3.0, 3.0),
            grid_density: 0,
            max_height_delta: 0.5,
        ),
    ]
    "#;

    #[test]
    fn parses_templates_with_defaults() {
        let defs: Vec<BuildingTemplate> = ron::de::from_str(SAMPLE).unwrap();
        let reg = BuildingRegistry::from_templates(defs).unwrap();

        let hut = reg.get(TemplateId(0)).unwrap();
        assert_eq!(hut.name, "Hut");
        assert_eq!(hut.grid_density, 3);
        assert_eq!(hut.max_height_delta, 1.0);
        assert!(hut.distinct_final_model().is_none());
        match hut.construction_model.as_ref().unwrap() {
            ModelRef::Blocks { parts } => {
                assert_eq!(parts.len(), 2);
                assert!(parts[0].collider);
                assert_eq!(parts[1].base_height(), 0.5);
            }
            other => panic!("unexpected model {other:?}"),
        }

        let tower = reg.get(TemplateId(1)).unwrap();
        assert_eq!(tower.sample_density(), 1);
        assert!(tower.distinct_final_model().is_some());
        assert_eq!(tower.construction_time, 0.0);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let a = block_template("Same", Vec2::ONE, 1.0);
        let b = block_template("Same", Vec2::ONE, 2.0);
        let err = BuildingRegistry::from_templates(vec![a, b]).unwrap_err();
        assert!(matches!(
            err,
            BuildingRegistryLoadError::DuplicateName { first: 0, second: 1, .. }
        ));
    }

    #[test]
    fn missing_model_is_unrecoverable() {
        let mut t = block_template("Empty", Vec2::ONE, 1.0);
        t.construction_model = None;
        assert_eq!(t.check(), Err(TemplateError::MissingModel("Empty".into())));
    }

    #[test]
    fn identical_final_model_is_not_a_swap() {
        let mut t = block_template("Same", Vec2::ONE, 1.0);
        t.final_model = t.construction_model.clone();
        assert!(t.distinct_final_model().is_none());
    }
}
