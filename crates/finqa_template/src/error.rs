use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Template '{0}' is not registered")]
    NotFound(String),

    #[error("Template '{name}' is invalid: {source}")]
    Invalid {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("Failed to render template '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    #[error("Failed to read templates from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
