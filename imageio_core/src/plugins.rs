pub mod plugins;
pub mod registry;

pub use plugins::{ImageFormatSupportPlugin, PluginInit, PluginManager, RegistryError};
pub use registry::{FormatRegistration, FormatRegistry};
