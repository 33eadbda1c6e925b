//! Registry of models and the drawables rendering them.

mod settings;

pub use settings::Settings;

use slotmap::SlotMap;
use tracing::{debug, info};

use crate::attributes::PropertyTag;
use crate::compile::{
    ColoringMethod, CompileOptions, Drawable, DrawableIntent, PrimitiveKind, BORDERS, LOCKS,
};
use crate::error::{Result, SceneError};
use crate::model::{names, EntityKind, Model};

slotmap::new_key_type! {
    /// Unique identifier for a model in the scene.
    pub struct ModelId;
}

slotmap::new_key_type! {
    /// Unique identifier for a drawable of a model.
    pub struct DrawableId;
}

/// Name of the drawable showing the vertices of a model.
pub const VERTICES: &str = "vertices";
/// Name of the drawable showing the edges of a graph or mesh.
pub const EDGES: &str = "edges";
/// Name of the drawable showing the faces of a mesh.
pub const FACES: &str = "faces";

#[derive(Debug)]
struct Entry {
    model: Model,
    drawables: SlotMap<DrawableId, Drawable>,
}

/// Owns models and their drawables, and keeps the drawables compiled.
#[derive(Debug, Default)]
pub struct Scene {
    models: SlotMap<ModelId, Entry>,
    settings: Settings,
    options: CompileOptions,
}

impl Scene {
    /// Creates an empty scene with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    fn entry(&self, id: ModelId) -> Result<&Entry> {
        Ok(self
            .models
            .get(id)
            .ok_or_else(|| SceneError::EntityNotFound("model".into()))?)
    }

    fn entry_mut(&mut self, id: ModelId) -> Result<&mut Entry> {
        Ok(self
            .models
            .get_mut(id)
            .ok_or_else(|| SceneError::EntityNotFound("model".into()))?)
    }

    // --- Model operations ---

    /// Adds `model`, creates its default drawables and compiles them.
    ///
    /// Drawables that fail to compile are kept without a buffer.
    pub fn add_model(&mut self, model: impl Into<Model>) -> ModelId {
        let mut entry = Entry {
            model: model.into(),
            drawables: SlotMap::with_key(),
        };
        for drawable in default_drawables(&entry.model, &self.settings) {
            entry.drawables.insert(drawable);
        }
        for drawable in entry.drawables.values_mut() {
            // failures are logged by the drawable
            let _ = drawable.update(&mut entry.model, &self.options);
        }
        info!(
            "added {} '{}' with {} drawables",
            entry.model.variant_name(),
            entry.model.name(),
            entry.drawables.len()
        );
        self.models.insert(entry)
    }

    /// Removes a model and its drawables, returning the model.
    pub fn remove_model(&mut self, id: ModelId) -> Option<Model> {
        self.models.remove(id).map(|e| e.model)
    }

    /// Returns the model.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not in the scene.
    pub fn model(&self, id: ModelId) -> Result<&Model> {
        self.entry(id).map(|e| &e.model)
    }

    /// Returns the model for editing. Call [`update`](Self::update)
    /// afterwards to refresh its drawables.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not in the scene.
    pub fn model_mut(&mut self, id: ModelId) -> Result<&mut Model> {
        self.entry_mut(id).map(|e| &mut e.model)
    }

    /// Iterates over the models in the scene.
    pub fn models(&self) -> impl Iterator<Item = (ModelId, &Model)> {
        self.models.iter().map(|(id, e)| (id, &e.model))
    }

    /// Number of models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Recompiles every drawable of a model and returns how many failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not in the scene.
    pub fn update(&mut self, id: ModelId) -> Result<usize> {
        let options = self.options;
        let entry = self.entry_mut(id)?;
        let mut failed = 0;
        for drawable in entry.drawables.values_mut() {
            if drawable.update(&mut entry.model, &options).is_err() {
                failed += 1;
            }
        }
        debug!("updated '{}', {failed} drawables failed", entry.model.name());
        Ok(failed)
    }

    // --- Drawable operations ---

    /// Adds and compiles a drawable for a model.
    ///
    /// A drawable that fails to compile is kept without a buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not in the scene.
    pub fn add_drawable(&mut self, id: ModelId, mut drawable: Drawable) -> Result<DrawableId> {
        let options = self.options;
        let entry = self.entry_mut(id)?;
        let _ = drawable.update(&mut entry.model, &options);
        Ok(entry.drawables.insert(drawable))
    }

    /// Returns a drawable.
    ///
    /// # Errors
    ///
    /// Returns an error if the model or the drawable is not in the scene.
    pub fn drawable(&self, id: ModelId, drawable: DrawableId) -> Result<&Drawable> {
        Ok(self
            .entry(id)?
            .drawables
            .get(drawable)
            .ok_or_else(|| SceneError::EntityNotFound("drawable".into()))?)
    }

    /// Returns a drawable for editing.
    ///
    /// # Errors
    ///
    /// Returns an error if the model or the drawable is not in the scene.
    pub fn drawable_mut(&mut self, id: ModelId, drawable: DrawableId) -> Result<&mut Drawable> {
        Ok(self
            .entry_mut(id)?
            .drawables
            .get_mut(drawable)
            .ok_or_else(|| SceneError::EntityNotFound("drawable".into()))?)
    }

    /// Finds a drawable of a model by name.
    #[must_use]
    pub fn find_drawable(&self, id: ModelId, name: &str) -> Option<DrawableId> {
        self.models
            .get(id)?
            .drawables
            .iter()
            .find(|(_, d)| d.name() == name)
            .map(|(key, _)| key)
    }

    /// Iterates over the drawables of a model; empty for unknown models.
    pub fn drawables(&self, id: ModelId) -> impl Iterator<Item = (DrawableId, &Drawable)> {
        self.models
            .get(id)
            .into_iter()
            .flat_map(|e| e.drawables.iter())
    }

    /// Recompiles one drawable.
    ///
    /// # Errors
    ///
    /// Returns an error if the model or drawable is not in the scene, or the
    /// compile fails (the previous buffer is kept).
    pub fn update_drawable(&mut self, id: ModelId, drawable: DrawableId) -> Result<()> {
        let options = self.options;
        let entry = self.entry_mut(id)?;
        let d = entry
            .drawables
            .get_mut(drawable)
            .ok_or_else(|| SceneError::EntityNotFound("drawable".into()))?;
        d.update(&mut entry.model, &options)
    }
}

fn has_tag(model: &Model, kind: EntityKind, name: &str, tag: PropertyTag) -> bool {
    model
        .attributes(kind)
        .and_then(|s| s.tag(name))
        .is_some_and(|t| t == tag)
}

fn has_scalar(model: &Model, kind: EntityKind, name: &str) -> bool {
    model
        .attributes(kind)
        .and_then(|s| s.tag(name))
        .is_some_and(PropertyTag::is_scalar_field)
}

/// Picks the coloring of a default drawable from the properties present
/// on the model. The first match wins.
fn default_intent(model: &Model, kind: PrimitiveKind, settings: &Settings) -> DrawableIntent {
    let intent = DrawableIntent::new(kind);
    let candidates: &[(ColoringMethod, EntityKind, &str)] = match (model, kind) {
        (Model::PointSet(_), PrimitiveKind::Points) => &[
            (ColoringMethod::ColorProperty, EntityKind::Vertex, "v:color"),
            (ColoringMethod::Textured, EntityKind::Vertex, "v:texcoord"),
            (ColoringMethod::ScalarField, EntityKind::Vertex, "v:primitive_index"),
        ],
        (Model::PolygonMesh(_), PrimitiveKind::Triangles) => &[
            (ColoringMethod::ColorProperty, EntityKind::Face, "f:color"),
            (ColoringMethod::ColorProperty, EntityKind::Vertex, "v:color"),
            (ColoringMethod::Textured, EntityKind::Halfedge, "h:texcoord"),
            (ColoringMethod::Textured, EntityKind::Vertex, "v:texcoord"),
            (ColoringMethod::ScalarField, EntityKind::Face, "f:chart"),
        ],
        _ => &[],
    };

    let found = candidates
        .iter()
        .find(|(coloring, location, name)| match coloring {
            ColoringMethod::ColorProperty => has_tag(model, *location, name, PropertyTag::Vec3),
            ColoringMethod::Textured => has_tag(model, *location, name, PropertyTag::Vec2),
            ColoringMethod::ScalarField => has_scalar(model, *location, name),
            ColoringMethod::Uniform => false,
        });
    match found {
        Some(&(coloring, location, name)) => intent
            .with_coloring(coloring, location, name)
            .with_clamp(settings.clamp_lower, settings.clamp_upper),
        None => intent,
    }
}

/// The drawables every model of a variant starts with.
fn default_drawables(model: &Model, settings: &Settings) -> Vec<Drawable> {
    let make = |name: &str, kind: PrimitiveKind| {
        Drawable::new(name, default_intent(model, kind, settings))
    };
    match model {
        Model::PointSet(_) => vec![make(VERTICES, PrimitiveKind::Points)
            .with_uniform_color(settings.point_cloud_vertices_color)
            .with_visible(settings.point_cloud_vertices_visible)],
        Model::Graph(_) => vec![
            make(VERTICES, PrimitiveKind::Points)
                .with_uniform_color(settings.graph_vertices_color)
                .with_visible(settings.graph_vertices_visible),
            make(EDGES, PrimitiveKind::Lines)
                .with_uniform_color(settings.graph_edges_color)
                .with_visible(settings.graph_edges_visible),
        ],
        Model::PolygonMesh(mesh) => {
            let mut drawables = vec![
                make(FACES, PrimitiveKind::Triangles)
                    .with_uniform_color(settings.surface_mesh_faces_color)
                    .with_visible(settings.surface_mesh_faces_visible),
                make(EDGES, PrimitiveKind::Lines)
                    .with_uniform_color(settings.surface_mesh_edges_color)
                    .with_visible(settings.surface_mesh_edges_visible),
                make(VERTICES, PrimitiveKind::Points)
                    .with_uniform_color(settings.surface_mesh_vertices_color)
                    .with_visible(settings.surface_mesh_vertices_visible),
                make(BORDERS, PrimitiveKind::Lines)
                    .with_uniform_color(settings.surface_mesh_borders_color)
                    .with_visible(settings.surface_mesh_borders_visible),
            ];
            if mesh.attributes(EntityKind::Vertex).contains(names::LOCKED) {
                drawables.push(
                    make(LOCKS, PrimitiveKind::Points)
                        .with_uniform_color(settings.surface_mesh_locks_color)
                        .with_visible(settings.surface_mesh_locks_visible),
                );
            }
            drawables
        }
    }
}
