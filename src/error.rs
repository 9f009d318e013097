//! Error types for the world-map tiler.

use thiserror::Error;

/// Result type alias using MapError.
pub type Result<T> = std::result::Result<T, MapError>;

/// Main error type for map rendering and export operations.
#[derive(Error, Debug)]
pub enum MapError {
    /// Failed to read or parse a ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read, decode or encode an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A tile-shape source mask is missing. Rendering cannot start without all of them.
    #[error("Missing tile shape: {0}")]
    MissingTileShape(String),

    /// A tile-shape source mask has the wrong dimensions or count.
    #[error("Invalid tile shape: {0}")]
    InvalidTileShape(String),

    /// A definition id was not present in the loaded tables.
    #[error("{kind} definition not found: {id}")]
    DefinitionNotFound { kind: &'static str, id: i32 },

    /// A decoded region does not have the expected layout.
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// The map dump layout is malformed.
    #[error("Invalid map data: {0}")]
    InvalidMapData(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to encode or write an export unit.
    #[error("Export error: {0}")]
    Export(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_not_found_message() {
        let err = MapError::DefinitionNotFound { kind: "overlay", id: 42 };
        assert_eq!(err.to_string(), "overlay definition not found: 42");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MapError = io.into();
        assert!(matches!(err, MapError::Io(_)));
    }
}
