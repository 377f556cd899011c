//! Error types for the post pipeline and the site around it

use thiserror::Error;

use crate::assets::AssetError;

/// Errors surfaced by the content pipeline and the site services
#[derive(Error, Debug)]
pub enum Error {
    /// The slug or asset does not resolve to anything in the store
    #[error("slug \"{0}\" does not exist")]
    NotFound(String),

    /// A frontmatter block is present but is not a decodable YAML mapping
    #[error("failed to parse frontmatter: {0}")]
    FrontmatterParse(#[source] serde_yaml::Error),

    /// The markdown converter failed while writing HTML
    #[error("failed to render markdown: {0}")]
    Render(String),

    /// data.yaml exists but does not decode
    #[error("failed to parse data.yaml: {0}")]
    Data(#[source] serde_yaml::Error),

    #[error(transparent)]
    Asset(AssetError),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means "nothing there" rather than "something broke"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::Asset(AssetError::NotFound(_))
        )
    }
}

impl From<AssetError> for Error {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::NotFound(path) => Error::NotFound(path),
            other => Error::Asset(other),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
