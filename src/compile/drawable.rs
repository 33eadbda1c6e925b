use tracing::warn;

use crate::error::Result;
use crate::math::Vec4;
use crate::model::{EntityKind, Model};

use super::special::{compile_borders, compile_locks, compile_vector_field};
use super::{compile_with, CompileOptions, CompiledBuffer, DrawableIntent, PrimitiveKind};

/// Name of the drawable showing the boundary edges of a mesh.
pub const BORDERS: &str = "borders";
/// Name of the drawable showing the locked vertices of a model.
pub const LOCKS: &str = "locks";

/// A `vec3` property drawn as line segments.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    pub field: String,
    pub location: EntityKind,
    pub scale: f32,
}

/// A renderable view of part of a model.
///
/// The compiled buffer is owned by the drawable. A failed update keeps the
/// previous buffer.
#[derive(Debug, Clone)]
pub struct Drawable {
    name: String,
    intent: DrawableIntent,
    uniform_color: Vec4,
    visible: bool,
    vector_field: Option<VectorField>,
    buffer: Option<CompiledBuffer>,
}

impl Drawable {
    /// Creates a visible, not yet compiled drawable.
    #[must_use]
    pub fn new(name: impl Into<String>, intent: DrawableIntent) -> Self {
        Self {
            name: name.into(),
            intent,
            uniform_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            visible: true,
            vector_field: None,
            buffer: None,
        }
    }

    /// A drawable showing `field` as line segments.
    #[must_use]
    pub fn vector_field(name: impl Into<String>, field: VectorField) -> Self {
        let mut drawable = Self::new(name, DrawableIntent::new(PrimitiveKind::Lines));
        drawable.vector_field = Some(field);
        drawable
    }

    #[must_use]
    pub fn with_uniform_color(mut self, color: Vec4) -> Self {
        self.uniform_color = color;
        self
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn intent(&self) -> &DrawableIntent {
        &self.intent
    }

    /// Replaces the intent. Takes effect on the next update.
    pub fn set_intent(&mut self, intent: DrawableIntent) {
        self.intent = intent;
    }

    #[must_use]
    pub fn uniform_color(&self) -> Vec4 {
        self.uniform_color
    }

    pub fn set_uniform_color(&mut self, color: Vec4) {
        self.uniform_color = color;
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// The last successfully compiled buffer.
    #[must_use]
    pub fn buffer(&self) -> Option<&CompiledBuffer> {
        self.buffer.as_ref()
    }

    /// Recompiles the buffer from `model`.
    ///
    /// # Errors
    ///
    /// Returns the compile error after logging it; the previous buffer is
    /// left in place.
    pub fn update(&mut self, model: &mut Model, options: &CompileOptions) -> Result<()> {
        let kind = self.intent.primitive_kind;
        let result = if let Some(vf) = &self.vector_field {
            compile_vector_field(model, &vf.field, vf.location, vf.scale)
        } else if self.name == BORDERS
            && kind == PrimitiveKind::Lines
            && matches!(model, Model::PolygonMesh(_))
        {
            compile_borders(model)
        } else if self.name == LOCKS && kind == PrimitiveKind::Points {
            compile_locks(model)
        } else {
            compile_with(model, &self.intent, options)
        };

        match result {
            Ok(buffer) => {
                self.buffer = Some(buffer);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "drawable '{}' of model '{}' not updated: {e}",
                    self.name,
                    model.name()
                );
                Err(e)
            }
        }
    }
}
