use imageio_core::models::{image::{ComponentType, Image, ImageType}, io::{ImageIOError, ImageWriter, ImageWriterOptions}};

pub const OPTION_BINARY: &str = "binary";

pub struct PPMWriter {
}

impl PPMWriter {

    pub const fn new() -> Self {
        PPMWriter {}
    }
}

impl ImageWriter for PPMWriter {

    fn can_write(&self, image_type: &ImageType) -> bool {
        image_type.dimension == 2
            && image_type.component_type == ComponentType::UInt8
            && (image_type.components == 1 || image_type.components == 3)
    }

    fn write(&self, image: &Image, options: &ImageWriterOptions) -> Result<Vec<u8>, ImageIOError> {
        if !self.can_write(&image.image_type) {
            return Err(ImageIOError::UnsupportedImage {
                description: format!(
                    "ppm stores 2-D uint8 images with 1 or 3 components, got {}-D {} with {} components",
                    image.image_type.dimension,
                    image.image_type.component_type.name(),
                    image.image_type.components,
                ),
            });
        }
        image.validate()?;
        let binary = options.get_bool(OPTION_BINARY, true)?;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(if binary { b"P6" } else { b"P3" });
        // 10 - LF
        bytes.push(10);
        bytes.extend_from_slice(format!("{} {}", image.width(), image.height()).as_bytes());
        bytes.push(10);
        bytes.extend_from_slice(b"255");
        bytes.push(10);

        let width = image.width();
        for (index, rgb) in rgb_pixels(image).enumerate() {
            if binary {
                bytes.extend_from_slice(&rgb);
                continue;
            }

            bytes.extend_from_slice(format!("{} {} {}", rgb[0], rgb[1], rgb[2]).as_bytes());
            bytes.push(if (index + 1) % width == 0 { 10 } else { b' ' });
        }

        Ok(bytes)
    }
}

fn rgb_pixels<'a>(image: &'a Image) -> Box<dyn Iterator<Item = [u8; 3]> + 'a> {
    if image.image_type.components == 1 {
        Box::new(image.data.iter().map(|v| [*v, *v, *v]))
    } else {
        Box::new(image.data.chunks_exact(3).map(|v| [v[0], v[1], v[2]]))
    }
}
