//! Error types for shader building, scene editing, and rendering.

use crate::geometry::GeometryId;
use crate::gl::ShaderStage;
use crate::scene::ModelId;

/// Errors raised while building or driving a shader program.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    /// A stage failed to compile. `log` is the compiler's info log.
    #[error("shader '{shader}': {stage} stage failed to compile: {log}")]
    Compile {
        shader: String,
        stage: ShaderStage,
        log: String,
    },

    /// Both stages compiled but the program failed to link.
    #[error("shader '{shader}': program failed to link: {log}")]
    Link { shader: String, log: String },

    /// A uniform was declared with a type that is neither built in nor a
    /// registered struct.
    #[error("shader '{shader}': uniform '{uniform}' has unknown type '{ty}'")]
    UnknownType {
        shader: String,
        uniform: String,
        ty: String,
    },

    /// A previous build failed; the descriptor has no program until it is deleted.
    #[error("shader '{0}' has no usable program after a failed build")]
    Unusable(String),

    /// The program declares no uniform with this name.
    #[error("shader '{shader}' declares no uniform '{uniform}'")]
    UnknownUniform { shader: String, uniform: String },

    /// The value's shape does not match the uniform's declared type.
    #[error("uniform '{uniform}' expects {expected}, got {found}")]
    TypeMismatch {
        uniform: String,
        expected: String,
        found: &'static str,
    },

    /// A material handler looked for a parameter the material does not carry.
    #[error("material for shader '{shader}' is missing parameter '{param}'")]
    MissingParameter { shader: String, param: String },
}

/// Errors raised by scene graph edits and lookups.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("model {0:?} does not exist in this scene")]
    UnknownModel(ModelId),

    #[error("geometry {0:?} does not exist in this scene")]
    UnknownGeometry(GeometryId),

    /// A model still draws the geometry.
    #[error("geometry {0:?} is still drawn by a model")]
    GeometryInUse(GeometryId),

    /// The model has no geometry/material pair and cannot be drawn.
    #[error("model {0:?} has no geometry or material")]
    NotRenderable(ModelId),

    #[error("model {0:?} is not a camera")]
    NotACamera(ModelId),

    /// Assigning this parent would make the model its own ancestor.
    #[error("parenting {child:?} under {parent:?} would create a cycle")]
    ParentCycle {
        child: ModelId,
        parent: ModelId,
    },
}

/// Errors raised while rendering a frame.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("scene has no active camera")]
    NoCamera,

    /// The camera's world matrix cannot be inverted into a view matrix.
    #[error("camera world matrix is singular")]
    SingularCamera,

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Shader(#[from] ShaderError),
}
