//! Name-keyed shader registry with build-once program caching.

use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, warn};

use crate::error::ShaderError;
use crate::gl::GraphicsContext;
use crate::shader::descriptor::ShaderDescriptor;
use crate::shader::program::ShaderProgram;

enum ProgramState {
    /// Not built yet, or deleted since.
    Pending,
    Ready(Rc<ShaderProgram>),
    /// The last build failed. Cleared by [`ShaderRegistry::delete`].
    Failed,
}

struct Entry {
    descriptor: ShaderDescriptor,
    state: ProgramState,
}

/// Shader descriptors by name, each with its lazily built program.
///
/// A program is built the first time it is requested and cached until
/// [`delete`](Self::delete). Deleting keeps the descriptor so the next request
/// rebuilds it.
#[derive(Default)]
pub struct ShaderRegistry {
    entries: HashMap<String, Entry>,
    /// Programs orphaned by re-registration, deleted on the next context access.
    retired: Vec<Rc<ShaderProgram>>,
}

impl ShaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor under its name, replacing any previous one.
    ///
    /// A program already built for the replaced descriptor is deleted the
    /// next time the registry is given a context.
    pub fn register(&mut self, descriptor: ShaderDescriptor) {
        let name = descriptor.name().to_string();
        let entry = Entry {
            descriptor,
            state: ProgramState::Pending,
        };
        if let Some(old) = self.entries.insert(name, entry) {
            if let ProgramState::Ready(program) = old.state {
                self.retired.push(program);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn descriptor(&self, name: &str) -> Option<&ShaderDescriptor> {
        self.entries.get(name).map(|e| &e.descriptor)
    }

    /// Whether a built program is cached for `name`.
    pub fn is_built(&self, name: &str) -> bool {
        matches!(
            self.entries.get(name),
            Some(Entry {
                state: ProgramState::Ready(_),
                ..
            })
        )
    }

    /// Names of every registered descriptor, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the program for `name`, building it on first use.
    ///
    /// `Ok(None)` means no descriptor is registered under `name`. A build
    /// error is returned once; later requests report
    /// [`ShaderError::Unusable`] until the entry is deleted.
    pub fn program(
        &mut self,
        gl: &mut dyn GraphicsContext,
        name: &str,
    ) -> Result<Option<Rc<ShaderProgram>>, ShaderError> {
        self.flush_retired(gl);

        let Some(entry) = self.entries.get_mut(name) else {
            debug!("no shader registered as '{name}'");
            return Ok(None);
        };

        match &entry.state {
            ProgramState::Ready(program) => return Ok(Some(Rc::clone(program))),
            ProgramState::Failed => return Err(ShaderError::Unusable(name.to_string())),
            ProgramState::Pending => {}
        }

        match ShaderProgram::build(gl, &entry.descriptor) {
            Ok(program) => {
                let program = Rc::new(program);
                entry.state = ProgramState::Ready(Rc::clone(&program));
                Ok(Some(program))
            }
            Err(err) => {
                entry.state = ProgramState::Failed;
                Err(err)
            }
        }
    }

    /// Deletes the built program for `name`, keeping its descriptor.
    ///
    /// Returns `false` when nothing is registered under `name`.
    pub fn delete(&mut self, gl: &mut dyn GraphicsContext, name: &str) -> bool {
        self.flush_retired(gl);
        let Some(entry) = self.entries.get_mut(name) else {
            return false;
        };
        if let ProgramState::Ready(program) = &entry.state {
            gl.delete_program(program.id());
            debug!("deleted shader program '{name}'");
        }
        entry.state = ProgramState::Pending;
        true
    }

    /// Deletes every built program.
    pub fn delete_all(&mut self, gl: &mut dyn GraphicsContext) {
        let names: Vec<String> = self.entries.keys().cloned().collect();
        for name in names {
            self.delete(gl, &name);
        }
    }

    fn flush_retired(&mut self, gl: &mut dyn GraphicsContext) {
        for program in self.retired.drain(..) {
            warn!("shader '{}' was re-registered; deleting its old program", program.name());
            gl.delete_program(program.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlCall, RecordingContext, ShaderStage};
    use crate::shader::UniformDecl;

    fn flat(name: &str) -> ShaderDescriptor {
        ShaderDescriptor::new(name)
            .defaults()
            .fragment()
            .add_uniform(UniformDecl::new("u_color", "vec3"))
    }

    fn links(gl: &RecordingContext) -> usize {
        gl.count(|c| matches!(c, GlCall::LinkProgram(_)))
    }

    #[test]
    fn program_is_built_once() {
        let mut gl = RecordingContext::new();
        let mut registry = ShaderRegistry::new();
        registry.register(flat("basic"));

        let a = registry.program(&mut gl, "basic").unwrap().unwrap();
        let b = registry.program(&mut gl, "basic").unwrap().unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(links(&gl), 1);
        assert!(registry.is_built("basic"));
    }

    #[test]
    fn unknown_name_is_none() {
        let mut gl = RecordingContext::new();
        let mut registry = ShaderRegistry::new();
        assert!(registry.program(&mut gl, "missing").unwrap().is_none());
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn delete_keeps_descriptor_for_rebuild() {
        let mut gl = RecordingContext::new();
        let mut registry = ShaderRegistry::new();
        registry.register(flat("basic"));
        let first = registry.program(&mut gl, "basic").unwrap().unwrap().id();

        assert!(registry.delete(&mut gl, "basic"));
        assert!(registry.contains("basic"));
        assert!(!registry.is_built("basic"));
        assert_eq!(gl.live_programs(), 0);

        let second = registry.program(&mut gl, "basic").unwrap().unwrap().id();
        assert_ne!(first, second);
        assert_eq!(links(&gl), 2);
    }

    #[test]
    fn failed_build_is_unusable_until_deleted() {
        let mut gl = RecordingContext::new();
        let mut registry = ShaderRegistry::new();
        registry.register(flat("basic"));

        gl.fail_compile(ShaderStage::Vertex, "bad");
        assert!(matches!(
            registry.program(&mut gl, "basic"),
            Err(ShaderError::Compile { stage: ShaderStage::Vertex, .. })
        ));
        assert!(matches!(
            registry.program(&mut gl, "basic"),
            Err(ShaderError::Unusable(ref name)) if name == "basic"
        ));

        gl.clear_failures();
        registry.delete(&mut gl, "basic");
        assert!(registry.program(&mut gl, "basic").unwrap().is_some());
    }

    #[test]
    fn re_registering_retires_the_old_program() {
        let mut gl = RecordingContext::new();
        let mut registry = ShaderRegistry::new();
        registry.register(flat("basic"));
        registry.program(&mut gl, "basic").unwrap();

        registry.register(flat("basic"));
        assert!(!registry.is_built("basic"));
        registry.program(&mut gl, "basic").unwrap();
        assert_eq!(gl.live_programs(), 1);
    }

    #[test]
    fn delete_all_clears_every_program() {
        let mut gl = RecordingContext::new();
        let mut registry = ShaderRegistry::new();
        registry.register(flat("a"));
        registry.register(flat("b"));
        registry.program(&mut gl, "a").unwrap();
        registry.program(&mut gl, "b").unwrap();

        registry.delete_all(&mut gl);
        assert_eq!(gl.live_programs(), 0);
        assert_eq!(registry.names(), ["a", "b"]);
    }
}
