//! Shader source text and compiled program handles.

use std::borrow::Cow;
use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{EmberError, Result};
use crate::render::device::{RenderDevice, ShaderId};

/// Vertex and fragment stages of a shader program.
///
/// Source files carry both stages in one text, split by the two-section
/// convention: a line reading `#[vertex]` starts the vertex stage, a line
/// reading `#[fragment]` starts the fragment stage. Sections may appear in
/// either order; both must be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    /// Splits a combined source text into its two stages.
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        #[derive(Clone, Copy, PartialEq)]
        enum Section {
            None,
            Vertex,
            Fragment,
        }

        let mut section = Section::None;
        let mut vertex = String::new();
        let mut fragment = String::new();

        for line in text.lines() {
            match line.trim() {
                "#[vertex]" => section = Section::Vertex,
                "#[fragment]" => section = Section::Fragment,
                _ => match section {
                    Section::Vertex => {
                        vertex.push_str(line);
                        vertex.push('\n');
                    }
                    Section::Fragment => {
                        fragment.push_str(line);
                        fragment.push('\n');
                    }
                    Section::None => {}
                },
            }
        }

        if vertex.trim().is_empty() {
            return Err(EmberError::ShaderParse {
                name: name.to_string(),
                message: "missing #[vertex] section".to_string(),
            });
        }
        if fragment.trim().is_empty() {
            return Err(EmberError::ShaderParse {
                name: name.to_string(),
                message: "missing #[fragment] section".to_string(),
            });
        }

        Ok(Self { vertex, fragment })
    }

    /// Builds a source from already separated stage texts, as when the
    /// stages come from a pair of files.
    #[must_use]
    pub fn from_parts(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// A compiled shader program on the render device.
#[derive(Debug)]
pub struct Shader {
    pub uuid: Uuid,
    pub name: Cow<'static, str>,
    pub(crate) id: ShaderId,
}

impl Shader {
    /// Compiles `source` on the device. A failed compile returns the
    /// device's diagnostic; the caller must not bind the program in that
    /// case.
    pub fn compile(
        device: &mut dyn RenderDevice,
        name: impl Into<Cow<'static, str>>,
        source: &ShaderSource,
    ) -> Result<Arc<Self>> {
        let name = name.into();
        let id = device.create_shader(&name, source)?;
        Ok(Arc::new(Self {
            uuid: Uuid::new_v4(),
            name,
            id,
        }))
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ShaderId {
        self.id
    }
}
