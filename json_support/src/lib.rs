//! JSON image format support.
//!
//! A JSON image is a single document holding the image type, geometry,
//! metadata and the pixel buffer, either as a base64 data URI or as a plain
//! array of numbers.

#[macro_use]
extern crate log;

use imageio_core::{models::io::{ImageReader, ImageWriter}, plugins::{FormatRegistry, ImageFormatSupportPlugin, RegistryError}};

use reader::JSONReader;
use writer::JSONWriter;

pub mod common;
pub mod reader;
pub mod writer;

pub const FORMAT_NAME: &str = "JSON";
pub const DESCRIPTION: &str = "JSON ImageIO Factory, allows the loading of JSON images";
pub const SOURCE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct JSONFormatSupportPlugin {
}

impl JSONFormatSupportPlugin {

    pub fn new() -> Self {
        JSONFormatSupportPlugin {}
    }
}

impl Default for JSONFormatSupportPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFormatSupportPlugin for JSONFormatSupportPlugin {

    fn format_name(&self) -> String {
        FORMAT_NAME.to_string()
    }

    fn description(&self) -> String {
        DESCRIPTION.to_string()
    }

    fn source_version(&self) -> String {
        SOURCE_VERSION.to_string()
    }

    fn file_extensions(&self) -> Vec<String> {
        vec!["json".to_string()]
    }

    fn reader(&self) -> Box<dyn ImageReader> {
        Box::new(JSONReader::new())
    }

    fn writer(&self) -> Box<dyn ImageWriter> {
        Box::new(JSONWriter::new())
    }
}

pub fn create_factory() -> Box<dyn ImageFormatSupportPlugin> {
    Box::new(JSONFormatSupportPlugin::new())
}

/// Registers one JSON format factory.
pub fn register_one_factory(registry: &mut FormatRegistry) -> Result<(), RegistryError> {
    registry.register(create_factory())?;
    info!("registered {} image format support", FORMAT_NAME);
    Ok(())
}

#[cfg(feature = "dynamic")]
#[no_mangle]
pub fn _plugin_init() -> Box<dyn ImageFormatSupportPlugin> {
    create_factory()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use imageio_core::models::image::Image;

    use super::*;

    #[test]
    fn test_register_one_factory() {
        let mut registry = FormatRegistry::new();
        register_one_factory(&mut registry).expect("Failed to register json support");

        let plugin = registry.resolve("json").expect("Expected json support to be registered");
        assert_eq!(plugin.format_name(), "JSON");
        assert_eq!(plugin.description(), DESCRIPTION);
        assert_eq!(plugin.source_version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_register_twice_fails() {
        let mut registry = FormatRegistry::new();
        register_one_factory(&mut registry).unwrap();
        assert!(matches!(register_one_factory(&mut registry), Err(RegistryError::DuplicateFormat { .. })));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registration_in_initialization_list() {
        let registry = FormatRegistry::from_registrations(&[create_factory]).unwrap();

        let data = br#"{"imageType": {"dimension": 1, "componentType": "uint8", "pixelType": "Scalar", "components": 1}, "size": [1], "data": [5]}"#;
        let plugin = registry.resolve_for_reading(Path::new("volume.json"), data)
            .expect("Expected json support to handle .json files");
        assert_eq!(plugin.format_name(), "JSON");

        assert!(registry.resolve_for_reading(Path::new("volume.ppm"), data).is_none());
        assert!(registry.resolve_for_writing(Path::new("out.JSON"), &Image::test_image().image_type).is_some());
    }
}
