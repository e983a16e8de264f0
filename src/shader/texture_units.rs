//! Texture unit allocation by logical texture name.

use std::collections::HashMap;

use image::RgbaImage;
use log::{debug, warn};

use crate::gl::{GraphicsContext, TextureFilter, TextureId, TextureParameter, TextureWrap};

/// Maps logical texture names to the texture unit holding their image.
///
/// Units are handed out in order starting at 0 and never reused while the
/// table lives. Owned by the renderer and shared by every program it builds.
#[derive(Debug, Default)]
pub struct TextureUnits {
    units: HashMap<String, (u32, TextureId)>,
    next_unit: u32,
}

impl TextureUnits {
    pub fn new() -> Self {
        Self::default()
    }

    /// The unit already assigned to `name`, if any.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.units.get(name).map(|(unit, _)| *unit)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Returns the unit for `name`, uploading `image` to a new unit first if
    /// the name has not been seen.
    ///
    /// New textures use clamp-to-edge wrapping, nearest filtering, RGBA8
    /// storage and a generated mip chain.
    pub fn unit_for(&mut self, gl: &mut dyn GraphicsContext, name: &str, image: &RgbaImage) -> u32 {
        if let Some(unit) = self.get(name) {
            return unit;
        }

        let unit = self.next_unit;
        let texture = gl.create_texture();
        gl.active_texture(unit);
        gl.bind_texture(Some(texture));
        gl.tex_parameter(TextureParameter::WrapS(TextureWrap::ClampToEdge));
        gl.tex_parameter(TextureParameter::WrapT(TextureWrap::ClampToEdge));
        gl.tex_parameter(TextureParameter::MinFilter(TextureFilter::Nearest));
        gl.tex_parameter(TextureParameter::MagFilter(TextureFilter::Nearest));

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            warn!("texture '{name}' has no pixels; unit {unit} left empty");
        } else {
            gl.tex_image_2d(width, height, image.as_raw());
            gl.generate_mipmap();
        }

        debug!("texture '{name}' ({width}x{height}) bound to unit {unit}");
        self.units.insert(name.to_string(), (unit, texture));
        self.next_unit += 1;
        unit
    }

    /// Deletes every texture and resets allocation to unit 0.
    pub fn release(&mut self, gl: &mut dyn GraphicsContext) {
        for (_, (_, texture)) in self.units.drain() {
            gl.delete_texture(texture);
        }
        self.next_unit = 0;
    }
}
