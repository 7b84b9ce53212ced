use std::fs;
use std::path::{Path, PathBuf};

use custom_error::custom_error;
use imageio_core::{models::io::{ImageIOError, ImageWriterOptions}, plugins::{FormatRegistration, FormatRegistry, RegistryError}};

custom_error! {pub CliError
    MissingArgument{name: String} = "missing argument --{name}",
    InvalidArgument{description: String} = "invalid argument: {description}",
    FileAccess{path: String, description: String} = "failed to access {path}: {description}",
    NoReader{path: String} = "no registered format can read {path}",
    UnknownFormat{format: String} = "format {format} is not registered",
    Image{source: ImageIOError} = "{source}",
    Registry{source: RegistryError} = "{source}",
}

/// Formats available without loading any plugin library.
pub const BUILTIN_FORMATS: &[FormatRegistration] = &[
    json_support::create_factory,
    ppm_support::create_factory,
];

#[derive(Debug)]
pub enum Command {
    ListFormats,
    Convert(ConvertRequest),
}

#[derive(Debug)]
pub struct ConvertRequest {
    pub source: PathBuf,
    pub goal_format: String,
    pub output: Option<PathBuf>,
    pub options: ImageWriterOptions,
}

pub fn parse_command(args: &[String]) -> Result<Command, CliError> {
    if args.len() > 1 && args[1] == "formats" {
        return Ok(Command::ListFormats);
    }

    let source = argument_value(args, "source")
        .ok_or_else(|| CliError::MissingArgument { name: "source".to_string() })?;
    let goal_format = argument_value(args, "goal-format")
        .ok_or_else(|| CliError::MissingArgument { name: "goal-format".to_string() })?;

    let mut options = ImageWriterOptions::default();
    for option in argument_values(args, "option") {
        let separator = option.find(':').ok_or_else(|| CliError::InvalidArgument {
            description: format!("expected --option=<key>:<value>, got --option={}", option),
        })?;
        options = options.with_option(&option[..separator], &option[separator + 1..]);
    }

    Ok(Command::Convert(ConvertRequest {
        source: PathBuf::from(source),
        goal_format,
        output: argument_value(args, "output").map(PathBuf::from),
        options,
    }))
}

pub fn plugins_dir(args: &[String], default: &str) -> PathBuf {
    argument_value(args, "plugins-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

pub fn build_registry(plugins_dir: &Path) -> Result<FormatRegistry, CliError> {
    let mut registry = FormatRegistry::from_registrations(BUILTIN_FORMATS)?;

    if plugins_dir.is_dir() {
        let added = registry.load_plugins(plugins_dir)?;
        debug!("{} formats added from {}", added, plugins_dir.to_string_lossy());
    } else {
        debug!("plugins directory {} does not exist, using built-in formats only", plugins_dir.to_string_lossy());
    }

    Ok(registry)
}

pub fn describe_formats(registry: &FormatRegistry) -> Vec<String> {
    registry.formats()
        .map(|v| format!("{} (.{}) {}: {}", v.format_name(), v.file_extensions().join(", ."), v.source_version(), v.description()))
        .collect()
}

/// Converts every image stored in the source file. Returns the paths written.
pub fn convert_file(registry: &FormatRegistry, request: &ConvertRequest) -> Result<Vec<PathBuf>, CliError> {
    info!("Converting file {} to {}", request.source.to_string_lossy(), request.goal_format);

    let file = fs::read(&request.source).map_err(|err| CliError::FileAccess {
        path: request.source.to_string_lossy().to_string(),
        description: err.to_string(),
    })?;

    let source_plugin = registry.resolve_for_reading(&request.source, &file)
        .ok_or_else(|| CliError::NoReader { path: request.source.to_string_lossy().to_string() })?;
    let target_plugin = registry.resolve(&request.goal_format)
        .ok_or_else(|| CliError::UnknownFormat { format: request.goal_format.clone() })?;

    info!("source format is {}", source_plugin.format_name());
    let images = source_plugin.reader().read(&file)?;
    info!("done reading {} image{}", images.len(), if images.len() > 1 { "s" } else { "" });

    let extension = target_plugin.file_extensions().into_iter().next()
        .unwrap_or_else(|| target_plugin.format_name().to_lowercase());
    let writer = target_plugin.writer();

    let mut written = Vec::new();
    for (counter, image) in images.iter().enumerate() {
        if !writer.can_write(&image.image_type) {
            return Err(CliError::Image { source: ImageIOError::UnsupportedImage {
                description: format!("{} cannot store image #{} of type {:?}", target_plugin.format_name(), counter, image.image_type),
            }});
        }

        info!("Converting image #{} to {}", counter, target_plugin.format_name());
        let converted = writer.write(image, &request.options)?;

        let save_to = output_path(request.output.as_deref(), counter, images.len(), &extension);
        fs::write(&save_to, &converted).map_err(|err| CliError::FileAccess {
            path: save_to.to_string_lossy().to_string(),
            description: err.to_string(),
        })?;
        info!("Result saved to {}", save_to.to_string_lossy());

        written.push(save_to);
    }

    Ok(written)
}

fn output_path(output: Option<&Path>, counter: usize, total: usize, extension: &str) -> PathBuf {
    match output {
        Some(path) if total == 1 => path.to_path_buf(),
        Some(path) => {
            let stem = path.file_stem().map(|v| v.to_string_lossy().to_string()).unwrap_or_default();
            let file_name = match path.extension() {
                Some(v) => format!("{}_{}.{}", stem, counter, v.to_string_lossy()),
                None => format!("{}_{}", stem, counter),
            };
            path.with_file_name(file_name)
        },
        None => PathBuf::from(format!("./result_{}.{}", counter, extension)),
    }
}

fn argument_value(args: &[String], argument_name: &str) -> Option<String> {
    argument_values(args, argument_name).into_iter().next()
}

fn argument_values(args: &[String], argument_name: &str) -> Vec<String> {
    let prefix = format!("--{}=", argument_name);
    args.iter()
        .filter(|s| s.starts_with(&prefix))
        .map(|s| s[prefix.len()..].to_string())
        .collect()
}
