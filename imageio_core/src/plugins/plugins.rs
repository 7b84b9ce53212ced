use std::fs;
use std::path::Path;

use custom_error::custom_error;
use libloading::{Library, Symbol};
use log::*;

use crate::models::io::{ImageReader, ImageWriter};

custom_error! {pub RegistryError
    FailedToLoadLibrary{description: String} = "Failed to load library: {description}",
    InvalidPlugin{description: String} = "Invalid plugin: {description}",
    IOError{description: String} = "IOError: {description}",
    DuplicateFormat{format: String} = "Format {format} is already registered",
    UnknownFormat{format: String} = "Format {format} is not registered",
}

/// Support for one image format: the unit the registry stores and dispatches to.
pub trait ImageFormatSupportPlugin {

    fn format_name(&self) -> String;

    fn description(&self) -> String;

    fn source_version(&self) -> String;

    /// Lowercase, without the leading dot.
    fn file_extensions(&self) -> Vec<String>;

    fn can_read_file(&self, path: &Path) -> bool {
        has_extension(path, &self.file_extensions())
    }

    fn can_write_file(&self, path: &Path) -> bool {
        has_extension(path, &self.file_extensions())
    }

    fn reader(&self) -> Box<dyn ImageReader>;
    fn writer(&self) -> Box<dyn ImageWriter>;
}

pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension() {
        Some(extension) => {
            let extension = extension.to_string_lossy();
            extensions.iter().any(|v| v.eq_ignore_ascii_case(&extension))
        },
        None => false,
    }
}

pub type PluginInit = unsafe fn () -> Box<dyn ImageFormatSupportPlugin>;

pub struct PluginManager {
    loaded_libraries: Vec<Library>,
}

impl PluginManager {

    pub fn new() -> Self {
        PluginManager {
            loaded_libraries: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn loaded_libraries(&self) -> usize {
        self.loaded_libraries.len()
    }

    pub fn load_plugins(&mut self, plugins_directory: &Path) -> Result<Vec<Box<dyn ImageFormatSupportPlugin>>, RegistryError> {
        info!("loading plugins from {}...", plugins_directory.to_string_lossy());

        let plugins: Vec<Box<dyn ImageFormatSupportPlugin>> = fs::read_dir(plugins_directory)
            .map_err(|err| RegistryError::IOError { description: err.to_string() })?
            .filter_map(|v| v.ok())
            .map(|v| v.file_name().into_string())
            .filter_map(|v| v.ok())
            .filter(|v| is_library_file_name(v))
            .map(|v| plugins_directory.join(v))
            .map(|v| (v.clone(), self.load_plugin(&v)))
            .filter_map(|(path, v)| match v {
                Ok(v) => {
                    info!("loaded plugin: support for {}", v.format_name());
                    Some(v)
                },
                Err(err) => {
                    error!("failed to load plugin ({}): {}", path.to_string_lossy(), err);
                    None
                }
            })
            .collect();

        info!("loaded {} plugins", plugins.len());

        Ok(plugins)
    }

    pub fn load_plugin(&mut self, library_path: &Path) -> Result<Box<dyn ImageFormatSupportPlugin>, RegistryError> {
        unsafe {
            let lib = Library::new(library_path)
                .map_err(|err| RegistryError::FailedToLoadLibrary { description: err.to_string() })?;

            // it is important to prevent library from being deleted from memory
            self.loaded_libraries.push(lib);
            let lib = match self.loaded_libraries.last() {
                Some(v) => v,
                None => return Err(
                    RegistryError::FailedToLoadLibrary { description: "failed to get library from loaded libraries vec".to_string() }
                )
            };

            let init: Symbol<PluginInit> = lib.get(b"_plugin_init")
                .map_err(|err| RegistryError::InvalidPlugin { description: format!("failed to find _plugin_init: {}", err) })?;

            Ok(init())
        }
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

fn is_library_file_name(file_name: &str) -> bool {
    let file_name = file_name.to_lowercase();
    file_name.ends_with(".so") || file_name.ends_with(".dll") || file_name.ends_with(".dylib")
}
