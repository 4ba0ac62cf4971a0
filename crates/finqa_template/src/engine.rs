use std::path::Path;

use handlebars::{Handlebars, no_escape};
use include_dir::{Dir, include_dir};
use serde::Serialize;
use tracing::debug;

use crate::{Error, Result};

static TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

const EXTENSION: &str = "hbs";

/// Renders the prompts used during an evaluation.
///
/// Built explicitly and passed to whoever needs it: the bundled templates are
/// always registered, and [`TemplateEngine::with_overrides`] replaces any of
/// them with same-named `.hbs` files from a directory.
#[derive(Clone, Debug)]
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(no_escape);

        let mut engine = Self { handlebars };
        for file in TEMPLATES.files() {
            let path = file.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let (Some(name), Some(source)) =
                (path.file_stem().and_then(|stem| stem.to_str()), file.contents_utf8())
            {
                engine.register(name, source)?;
            }
        }
        Ok(engine)
    }

    /// The bundled templates, with any `<name>.hbs` in `dir` taking precedence.
    pub fn with_overrides(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut engine = Self::new()?;

        let io_error = |source| Error::Io { path: dir.to_path_buf(), source };
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let source = std::fs::read_to_string(&path)
                .map_err(|source| Error::Io { path: path.clone(), source })?;
            debug!(template = name, path = %path.display(), "Overriding template");
            engine.register(name, &source)?;
        }
        Ok(engine)
    }

    pub fn register(&mut self, name: &str, source: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, source)
            .map_err(|source| Error::Invalid { name: name.to_string(), source: Box::new(source) })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    pub fn render<V: Serialize>(&self, name: &str, data: &V) -> Result<String> {
        if !self.has_template(name) {
            return Err(Error::NotFound(name.to_string()));
        }
        self.handlebars
            .render(name, data)
            .map(|rendered| rendered.trim_end().to_string())
            .map_err(|source| Error::Render { name: name.to_string(), source: Box::new(source) })
    }
}
