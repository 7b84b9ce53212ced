use imageio_core::{models::io::{ImageReader, ImageWriter}, plugins::{FormatRegistry, ImageFormatSupportPlugin, RegistryError}};

use log::*;
use reader::PPMReader;
use writer::PPMWriter;

pub mod reader;
pub mod writer;

pub const FORMAT_NAME: &str = "PPM";

pub struct PPMFormatSupportPlugin {
}

impl PPMFormatSupportPlugin {

    pub fn new() -> Self {
        PPMFormatSupportPlugin {}
    }
}

impl Default for PPMFormatSupportPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFormatSupportPlugin for PPMFormatSupportPlugin {

    fn format_name(&self) -> String {
        FORMAT_NAME.to_string()
    }

    fn description(&self) -> String {
        "Portable pixmap (P3 and P6) image support".to_string()
    }

    fn source_version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn file_extensions(&self) -> Vec<String> {
        vec!["ppm".to_string()]
    }

    fn reader(&self) -> Box<dyn ImageReader> {
        Box::new(PPMReader::new())
    }

    fn writer(&self) -> Box<dyn ImageWriter> {
        Box::new(PPMWriter::new())
    }
}

pub fn create_factory() -> Box<dyn ImageFormatSupportPlugin> {
    Box::new(PPMFormatSupportPlugin::new())
}

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

    use super::*;

    #[test]
    fn test_register_one_factory() {
        let mut registry = FormatRegistry::new();
        register_one_factory(&mut registry).unwrap();

        let plugin = registry.resolve("ppm").expect("Expected ppm support to be registered");
        assert!(plugin.can_read_file(Path::new("photo.PPM")));
        assert!(!plugin.can_write_file(Path::new("photo.json")));
    }
}
