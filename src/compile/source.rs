use std::borrow::Cow;

use crate::attributes::ScalarArray;
use crate::error::{PropertyError, Result};
use crate::math::{Vec2, Vec3};
use crate::model::Model;
use crate::scalar_range::ScalarRange;

use super::{ColoringMethod, CompiledBuffer, DrawableIntent};

/// Per-entity coloring data, resolved once before the buffers are built.
#[derive(Debug)]
pub(super) enum Source<'a> {
    Uniform,
    Color(&'a [Vec3]),
    Texcoord(Cow<'a, [Vec2]>),
}

/// Resolves the coloring property of `intent` on `model`.
///
/// Scalar fields are normalized here, so the result is always either
/// colors or texture coordinates indexed by raw entity index.
pub(super) fn resolve<'a>(model: &'a Model, intent: &DrawableIntent) -> Result<Source<'a>> {
    if intent.coloring == ColoringMethod::Uniform {
        return Ok(Source::Uniform);
    }

    let location = intent.location;
    let name = intent.property_name.as_str();
    let store = model
        .attributes(location)
        .ok_or_else(|| super::unsupported(model.variant_name(), intent))?;
    let array = store
        .array(name)
        .ok_or_else(|| PropertyError::MissingProperty {
            name: name.to_owned(),
            location,
        })?;
    let mismatch = |expected: &str| PropertyError::PropertyTypeMismatch {
        name: name.to_owned(),
        expected: expected.to_owned(),
        found: array.tag(),
    };

    match intent.coloring {
        ColoringMethod::Uniform => Ok(Source::Uniform),
        ColoringMethod::ColorProperty => store
            .get::<Vec3>(name)
            .map(Source::Color)
            .ok_or_else(|| mismatch("vec3").into()),
        ColoringMethod::Textured => store
            .get::<Vec2>(name)
            .map(|t| Source::Texcoord(Cow::Borrowed(t)))
            .ok_or_else(|| mismatch("vec2").into()),
        ColoringMethod::ScalarField => {
            let scalars = array.as_scalars().ok_or_else(|| mismatch("scalar"))?;
            let values = scalars.to_f64();
            // flags always span [0, 1], even when every entity agrees
            let range = if matches!(scalars, ScalarArray::Bool(_)) {
                ScalarRange {
                    min_value: 0.0,
                    max_value: 1.0,
                }
            } else {
                let live: Vec<f64> = model.iterate(location).map(|i| values[i]).collect();
                ScalarRange::compute(&live, intent.clamp_lower, intent.clamp_upper)?
            };
            let coords = values
                .iter()
                .map(|&v| range.normalize(v).map(|t| Vec2::new(t, 0.5)))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(Source::Texcoord(Cow::Owned(coords)))
        }
    }
}

impl Source<'_> {
    /// Number of payload floats per entity.
    pub(super) fn width(&self) -> usize {
        match self {
            Self::Uniform => 0,
            Self::Color(_) => 3,
            Self::Texcoord(_) => 2,
        }
    }

    /// An empty buffer with the attribute arrays this source fills.
    pub(super) fn buffer(&self, with_normals: bool) -> CompiledBuffer {
        CompiledBuffer {
            normals: with_normals.then(Vec::new),
            colors: matches!(self, Self::Color(_)).then(Vec::new),
            texcoords: matches!(self, Self::Texcoord(_)).then(Vec::new),
            ..CompiledBuffer::default()
        }
    }

    /// Appends the attribute of entity `index` to `buffer`.
    pub(super) fn push(&self, index: usize, buffer: &mut CompiledBuffer) {
        match self {
            Self::Uniform => {}
            Self::Color(c) => {
                if let Some(colors) = buffer.colors.as_mut() {
                    colors.push(c[index]);
                }
            }
            Self::Texcoord(t) => {
                if let Some(texcoords) = buffer.texcoords.as_mut() {
                    texcoords.push(t[index]);
                }
            }
        }
    }

    /// Appends the attribute of entity `index` to a tessellator payload.
    pub(super) fn extend_payload(&self, index: usize, data: &mut Vec<f32>) {
        match self {
            Self::Uniform => {}
            Self::Color(c) => data.extend_from_slice(c[index].as_slice()),
            Self::Texcoord(t) => data.extend_from_slice(t[index].as_slice()),
        }
    }

    /// Appends an attribute decoded from a tessellator payload.
    pub(super) fn push_payload(&self, data: &[f32], buffer: &mut CompiledBuffer) {
        match (self, data) {
            (Self::Color(_), &[r, g, b, ..]) => {
                if let Some(colors) = buffer.colors.as_mut() {
                    colors.push(Vec3::new(r, g, b));
                }
            }
            (Self::Texcoord(_), &[u, v, ..]) => {
                if let Some(texcoords) = buffer.texcoords.as_mut() {
                    texcoords.push(Vec2::new(u, v));
                }
            }
            _ => {}
        }
    }

    pub(super) fn is_uniform(&self) -> bool {
        matches!(self, Self::Uniform)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::compile::PrimitiveKind;
    use crate::error::{CompileError, MeshDrawError};
    use crate::model::{EntityKind, PointSet};

    fn cloud_with_quality() -> Model {
        let mut cloud = PointSet::new();
        for i in 0..4u8 {
            cloud.add_vertex(Vec3::new(f32::from(i), 0.0, 0.0));
        }
        let q = cloud.vertex_attributes_mut().add("v:quality", 0i32).unwrap();
        q.copy_from_slice(&[0, 10, 20, 40]);
        cloud.into()
    }

    #[test]
    fn scalar_field_becomes_texcoords() {
        let model = cloud_with_quality();
        let intent = DrawableIntent::new(PrimitiveKind::Points).with_coloring(
            ColoringMethod::ScalarField,
            EntityKind::Vertex,
            "v:quality",
        );
        let Source::Texcoord(t) = resolve(&model, &intent).unwrap() else {
            panic!("expected texcoords");
        };
        let u: Vec<f32> = t.iter().map(|c| c.x).collect();
        assert_eq!(u, vec![0.0, 0.25, 0.5, 1.0]);
        assert!(t.iter().all(|c| (c.y - 0.5).abs() < f32::EPSILON));
    }

    #[test]
    fn bool_field_maps_to_unit_range() {
        let mut cloud = PointSet::new();
        for i in 0..3u8 {
            cloud.add_vertex(Vec3::new(f32::from(i), 0.0, 0.0));
        }
        let flags = cloud.vertex_attributes_mut().add("v:select", false).unwrap();
        flags[1] = true;
        let mut model: Model = cloud.into();
        let intent = DrawableIntent::new(PrimitiveKind::Points).with_coloring(
            ColoringMethod::ScalarField,
            EntityKind::Vertex,
            "v:select",
        );
        let Source::Texcoord(t) = resolve(&model, &intent).unwrap() else {
            panic!("expected texcoords");
        };
        let u: Vec<f32> = t.iter().map(|c| c.x).collect();
        assert_eq!(u, vec![0.0, 1.0, 0.0]);

        // a constant flag field still compiles
        let Model::PointSet(cloud) = &mut model else {
            unreachable!()
        };
        cloud.vertex_attributes_mut().get_mut::<bool>("v:select").unwrap()[1] = false;
        let Source::Texcoord(t) = resolve(&model, &intent).unwrap() else {
            panic!("expected texcoords");
        };
        assert!(t.iter().all(|c| c.x.abs() < f32::EPSILON));
    }

    #[test]
    fn color_property_must_be_vec3() {
        let model = cloud_with_quality();
        let intent = DrawableIntent::new(PrimitiveKind::Points).with_coloring(
            ColoringMethod::ColorProperty,
            EntityKind::Vertex,
            "v:quality",
        );
        assert!(matches!(
            resolve(&model, &intent),
            Err(MeshDrawError::Property(
                PropertyError::PropertyTypeMismatch { .. }
            ))
        ));
    }

    #[test]
    fn missing_property_is_reported() {
        let model = cloud_with_quality();
        let intent = DrawableIntent::new(PrimitiveKind::Points).with_coloring(
            ColoringMethod::Textured,
            EntityKind::Vertex,
            "v:texcoord",
        );
        assert!(matches!(
            resolve(&model, &intent),
            Err(MeshDrawError::Property(PropertyError::MissingProperty { .. }))
        ));
    }

    #[test]
    fn faces_of_point_set_are_unsupported() {
        let model = cloud_with_quality();
        let intent = DrawableIntent::new(PrimitiveKind::Points).with_coloring(
            ColoringMethod::ColorProperty,
            EntityKind::Face,
            "f:color",
        );
        assert!(matches!(
            resolve(&model, &intent),
            Err(MeshDrawError::Compile(CompileError::UnsupportedCombination(_)))
        ));
    }
}
