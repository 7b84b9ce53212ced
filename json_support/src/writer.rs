use imageio_core::models::{image::{Image, ImageType, MAX_DIMENSION}, io::{ImageIOError, ImageWriter, ImageWriterOptions}};

use crate::common::{DataEncoding, JSONImage};

pub const OPTION_DATA_ENCODING: &str = "data_encoding";
pub const OPTION_PRETTY: &str = "pretty";

pub struct JSONWriter {
}

impl JSONWriter {

    pub const fn new() -> Self {
        JSONWriter {}
    }
}

impl ImageWriter for JSONWriter {

    fn can_write(&self, image_type: &ImageType) -> bool {
        image_type.dimension > 0 && image_type.dimension <= MAX_DIMENSION && image_type.components > 0
    }

    fn write(&self, image: &Image, options: &ImageWriterOptions) -> Result<Vec<u8>, ImageIOError> {
        if !self.can_write(&image.image_type) {
            return Err(ImageIOError::UnsupportedImage {
                description: format!("json images need at least one dimension and one component, got {:?}", image.image_type),
            });
        }
        image.validate()?;

        let encoding_name = options.get_string(OPTION_DATA_ENCODING, "base64");
        let encoding = match DataEncoding::from_name(&encoding_name) {
            Some(v) => v,
            None => return Err(ImageIOError::InvalidOptions {
                description: format!("unknown {}: {}, expected base64 or array", OPTION_DATA_ENCODING, encoding_name),
            }),
        };
        let pretty = options.get_bool(OPTION_PRETTY, false)?;

        let document = JSONImage::from_image(image, encoding);
        let serialized = if pretty {
            serde_json::to_vec_pretty(&document)
        } else {
            serde_json::to_vec(&document)
        };

        serialized.map_err(|err| ImageIOError::FailedToWrite { description: err.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use imageio_core::models::{image::{ComponentType, PixelType}, io::ImageReader};
    use serde_json::Value;

    use crate::reader::JSONReader;

    use super::*;

    #[test]
    fn test_write_base64_by_default() {
        let written = JSONWriter::new().write(&Image::test_image(), &ImageWriterOptions::default()).unwrap();
        let document: Value = serde_json::from_slice(&written).unwrap();

        assert_eq!(document["imageType"]["componentType"], "uint8");
        assert_eq!(document["imageType"]["pixelType"], "RGB");
        assert_eq!(document["size"], serde_json::json!([4, 4]));
        assert!(document["data"].as_str().unwrap().starts_with("data:application/vnd.itk.base64,////"));
    }

    #[test]
    fn test_written_image_reads_back() {
        let mut image = Image::new(ImageType::new(3, ComponentType::Float64, PixelType::Vector, 2), vec![2, 1, 1]);
        image.name = "field".to_string();
        image.spacing = vec![0.5, 0.5, 3.0];
        image.metadata.insert("units".to_string(), Value::from("mm"));
        image.data = [1.5f64, -2.0, 0.0, 1e10].iter().flat_map(|v| v.to_le_bytes().to_vec()).collect();

        for encoding in &["base64", "array"] {
            let options = ImageWriterOptions::default().with_option(OPTION_DATA_ENCODING, encoding);
            let written = JSONWriter::new().write(&image, &options).unwrap();
            let read = JSONReader::new().read(&written).unwrap();
            assert_eq!(read[0], image, "mismatch for {} encoding", encoding);
        }
    }

    #[test]
    fn test_array_encoding() {
        let options = ImageWriterOptions::default().with_option(OPTION_DATA_ENCODING, "array");
        let mut image = Image::new(ImageType::new(1, ComponentType::Int16, PixelType::Scalar, 1), vec![2]);
        image.data = vec![0xff, 0xff, 0x2c, 0x01];

        let written = JSONWriter::new().write(&image, &options).unwrap();
        let document: Value = serde_json::from_slice(&written).unwrap();
        assert_eq!(document["data"], serde_json::json!([-1, 300]));
    }

    #[test]
    fn test_pretty_option() {
        let options = ImageWriterOptions::default().with_option_bool(OPTION_PRETTY, true);
        let written = JSONWriter::new().write(&Image::test_image(), &options).unwrap();
        assert!(written.contains(&b'\n'));

        let compact = JSONWriter::new().write(&Image::test_image(), &ImageWriterOptions::default()).unwrap();
        assert!(!compact.contains(&b'\n'));
    }

    #[test]
    fn test_unknown_encoding_is_rejected() {
        let options = ImageWriterOptions::default().with_option(OPTION_DATA_ENCODING, "hex");
        let result = JSONWriter::new().write(&Image::test_image(), &options);
        assert!(matches!(result, Err(ImageIOError::InvalidOptions { .. })));
    }

    #[test]
    fn test_invalid_image_is_rejected() {
        let mut image = Image::test_image();
        image.data.truncate(10);
        let result = JSONWriter::new().write(&image, &ImageWriterOptions::default());
        assert!(matches!(result, Err(ImageIOError::InvalidImage { .. })));
    }
}
