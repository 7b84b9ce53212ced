use std::path::Path;

use log::*;

use crate::models::image::ImageType;

use super::plugins::{ImageFormatSupportPlugin, PluginManager, RegistryError};

/// Builds one format plugin. Static registries are populated from a list of these.
pub type FormatRegistration = fn() -> Box<dyn ImageFormatSupportPlugin>;

/// Format plugins keyed by format name (case-insensitive), kept in registration order.
/// Resolution by file name walks that order, so earlier registrations take priority.
pub struct FormatRegistry {
    // DO NOT change order of fields here. Plugins need to be freed earlier than underlying libraries.
    plugins: Vec<Box<dyn ImageFormatSupportPlugin>>,
    manager: PluginManager,
}

impl FormatRegistry {

    pub fn new() -> Self {
        FormatRegistry {
            plugins: Vec::new(),
            manager: PluginManager::new(),
        }
    }

    pub fn from_registrations(registrations: &[FormatRegistration]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for registration in registrations {
            registry.register(registration())?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, plugin: Box<dyn ImageFormatSupportPlugin>) -> Result<(), RegistryError> {
        let format = plugin.format_name();
        if self.resolve(&format).is_some() {
            return Err(RegistryError::DuplicateFormat { format });
        }

        debug!("registered format {} ({})", format, plugin.description());
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn unregister(&mut self, format: &str) -> Result<Box<dyn ImageFormatSupportPlugin>, RegistryError> {
        match self.position(format) {
            Some(index) => Ok(self.plugins.remove(index)),
            None => Err(RegistryError::UnknownFormat { format: format.to_string() }),
        }
    }

    pub fn resolve(&self, format: &str) -> Option<&dyn ImageFormatSupportPlugin> {
        self.position(format).map(|index| self.plugins[index].as_ref())
    }

    pub fn formats(&self) -> impl Iterator<Item = &dyn ImageFormatSupportPlugin> {
        self.plugins.iter().map(|v| v.as_ref() as &dyn ImageFormatSupportPlugin)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn resolve_for_reading(&self, path: &Path, data: &[u8]) -> Option<&dyn ImageFormatSupportPlugin> {
        self.formats()
            .find(|v| v.can_read_file(path) && v.reader().can_read(data))
    }

    pub fn resolve_for_writing(&self, path: &Path, image_type: &ImageType) -> Option<&dyn ImageFormatSupportPlugin> {
        self.formats()
            .find(|v| v.can_write_file(path) && v.writer().can_write(image_type))
    }

    /// Loads every plugin library in `plugins_dir`. Plugins whose format is already
    /// registered are skipped. Returns how many plugins were added.
    pub fn load_plugins(&mut self, plugins_dir: &Path) -> Result<usize, RegistryError> {
        let loaded = self.manager.load_plugins(plugins_dir)?;
        Ok(self.register_loaded(loaded))
    }

    fn register_loaded(&mut self, loaded: Vec<Box<dyn ImageFormatSupportPlugin>>) -> usize {
        let mut added = 0;
        for plugin in loaded {
            let format = plugin.format_name();
            match self.register(plugin) {
                Ok(()) => added += 1,
                Err(err) => warn!("skipping plugin for {}: {}", format, err),
            }
        }

        added
    }

    fn position(&self, format: &str) -> Option<usize> {
        self.plugins.iter()
            .position(|v| v.format_name().eq_ignore_ascii_case(format))
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
