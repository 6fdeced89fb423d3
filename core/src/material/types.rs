//! Material types.

/// Alpha rendering mode.
///
/// Affects pipeline state (blend configuration), not shader bindings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlphaMode {
    /// Fully opaque (alpha ignored).
    #[default]
    Opaque,
    /// Alpha masking with cutoff threshold.
    Mask {
        /// Cutoff value (0.0–1.0). Fragments with alpha below this are discarded.
        cutoff: f32,
    },
    /// Full alpha blending.
    Blend,
}

impl AlphaMode {
    /// Parse the document's `alphaMode` string; unknown values are opaque.
    pub fn from_document(mode: &str, cutoff: f32) -> Self {
        match mode {
            "MASK" => Self::Mask { cutoff },
            "BLEND" => Self::Blend,
            "OPAQUE" => Self::Opaque,
            other => {
                log::warn!("Unknown alpha mode {other:?}, using OPAQUE");
                Self::Opaque
            }
        }
    }

    /// Shader-side code: 0 = mask, 1 = opaque or blend.
    pub fn shader_code(&self) -> i32 {
        match self {
            Self::Mask { .. } => 0,
            Self::Opaque | Self::Blend => 1,
        }
    }

    /// Cutoff for masked materials, 0 otherwise.
    pub fn cutoff(&self) -> f32 {
        match self {
            Self::Mask { cutoff } => *cutoff,
            _ => 0.0,
        }
    }
}

/// A material as consumed by the frame resources.
///
/// Texture slots hold indices into the asset's texture list.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub alpha_mode: AlphaMode,
    pub double_sided: bool,
    /// Base color factor (linear RGBA).
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<usize>,
    pub normal_texture: Option<usize>,
    pub emissive_texture: Option<usize>,
}

impl Material {
    /// Creates an opaque, single-sided, white material with no textures.
    pub fn new() -> Self {
        Self {
            name: None,
            alpha_mode: AlphaMode::Opaque,
            double_sided: false,
            base_color_factor: [1.0; 4],
            base_color_texture: None,
            normal_texture: None,
            emissive_texture: None,
        }
    }

    /// Set the material name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the alpha mode.
    #[must_use]
    pub fn with_alpha_mode(mut self, alpha_mode: AlphaMode) -> Self {
        self.alpha_mode = alpha_mode;
        self
    }

    /// Set whether the material is double-sided.
    #[must_use]
    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    /// Set the base color texture index.
    #[must_use]
    pub fn with_base_color_texture(mut self, texture: usize) -> Self {
        self.base_color_texture = Some(texture);
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}

/// An embedded image, left encoded. Decoding belongs to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Texture {
    pub name: Option<String>,
    /// MIME type declared by the image, if any.
    pub mime_type: Option<String>,
    /// Encoded image bytes. Empty when the image is not embedded.
    pub data: Vec<u8>,
}

impl Texture {
    pub fn is_embedded(&self) -> bool {
        !self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_default() {
        let mat = Material::new();
        assert!(mat.name.is_none());
        assert_eq!(mat.alpha_mode, AlphaMode::Opaque);
        assert!(!mat.double_sided);
        assert_eq!(mat.base_color_factor, [1.0; 4]);
        assert!(mat.base_color_texture.is_none());
    }

    #[test]
    fn alpha_mode_parsing() {
        assert_eq!(
            AlphaMode::from_document("MASK", 0.3),
            AlphaMode::Mask { cutoff: 0.3 }
        );
        assert_eq!(AlphaMode::from_document("BLEND", 0.5), AlphaMode::Blend);
        assert_eq!(AlphaMode::from_document("weird", 0.5), AlphaMode::Opaque);
    }

    #[test]
    fn alpha_mode_shader_code() {
        assert_eq!(AlphaMode::Mask { cutoff: 0.5 }.shader_code(), 0);
        assert_eq!(AlphaMode::Opaque.shader_code(), 1);
        assert_eq!(AlphaMode::Blend.shader_code(), 1);
        assert_eq!(AlphaMode::Blend.cutoff(), 0.0);
    }

    #[test]
    fn material_builder() {
        let mat = Material::new()
            .with_name("skin")
            .with_alpha_mode(AlphaMode::Blend)
            .with_double_sided(true)
            .with_base_color_texture(3);
        assert_eq!(mat.name.as_deref(), Some("skin"));
        assert!(mat.double_sided);
        assert_eq!(mat.base_color_texture, Some(3));
    }
}
