//! Light components.
//!
//! Directional and point lights live on scene models so their direction and
//! position follow the model's [`Transform`](crate::Transform). The ambient
//! light has no placement and is stored on the scene directly.

use glam::Vec3;

use crate::shader::UniformValue;

/// Light shining along the owning model's forward axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
}

impl DirectionalLight {
    pub fn new(color: Vec3) -> Self {
        Self { color }
    }

    /// The `d_light` struct value for a light pointing along `direction`.
    pub(crate) fn uniform(&self, direction: Vec3) -> UniformValue {
        UniformValue::fields([
            ("direction", UniformValue::Vec3(direction)),
            ("color", UniformValue::Vec3(self.color)),
        ])
    }
}

/// Light radiating from the owning model's world position.
///
/// Intensity falls off as `1 / (1 + attenuation * d²)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: Vec3,
    pub attenuation: f32,
}

impl PointLight {
    pub fn new(color: Vec3, attenuation: f32) -> Self {
        Self { color, attenuation }
    }

    pub(crate) fn uniform(&self, position: Vec3) -> UniformValue {
        UniformValue::fields([
            ("position", UniformValue::Vec3(position)),
            ("color", UniformValue::Vec3(self.color)),
            ("attenuation", UniformValue::Float(self.attenuation)),
        ])
    }
}

/// Uniform light applied to every lit surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub attenuation: f32,
}

impl AmbientLight {
    pub fn new(color: Vec3, attenuation: f32) -> Self {
        Self { color, attenuation }
    }

    pub(crate) fn uniform(&self) -> UniformValue {
        UniformValue::fields([
            ("color", UniformValue::Vec3(self.color)),
            ("attenuation", UniformValue::Float(self.attenuation)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_light_uniform_has_every_field() {
        let value = PointLight::new(Vec3::ONE, 0.5).uniform(Vec3::Y);
        let UniformValue::Struct(fields) = value else {
            panic!("expected a struct value");
        };
        assert_eq!(fields.len(), 3);
        assert_eq!(fields["attenuation"], UniformValue::Float(0.5));
        assert_eq!(fields["position"], UniformValue::Vec3(Vec3::Y));
    }

    #[test]
    fn ambient_light_uniform() {
        let UniformValue::Struct(fields) = AmbientLight::new(Vec3::X, 0.2).uniform() else {
            panic!("expected a struct value");
        };
        assert_eq!(fields["color"], UniformValue::Vec3(Vec3::X));
    }
}
