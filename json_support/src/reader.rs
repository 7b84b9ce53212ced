use imageio_core::models::{image::Image, io::{ImageIOError, ImageReader}};
use log::*;

use crate::common::JSONImage;

pub struct JSONReader {
}

impl JSONReader {

    pub const fn new() -> Self {
        JSONReader {}
    }
}

impl ImageReader for JSONReader {

    fn can_read(&self, data: &[u8]) -> bool {
        data.iter().find(|v| !v.is_ascii_whitespace()) == Some(&b'{')
    }

    fn read(&self, data: &[u8]) -> Result<Vec<Image>, ImageIOError> {
        let document: JSONImage = serde_json::from_slice(data)
            .map_err(|err| ImageIOError::FailedToRead { description: format!("malformed json image: {}", err) })?;

        let image = document.into_image()?;
        image.validate()
            .map_err(|err| ImageIOError::FailedToRead { description: err.to_string() })?;

        debug!("read json image \"{}\" of size {:?} ({} bytes of pixel data)", image.name, image.size, image.data.len());

        Ok(vec![image])
    }
}

#[cfg(test)]
mod tests {
    use std::fs::read;

    use imageio_core::models::image::{ComponentType, PixelType};

    use super::*;

    #[test]
    fn simple_test() {
        let simple_json = read("assets/simple.json")
            .expect("Failed to load assets/simple.json");
        let reader = JSONReader::new();
        assert!(reader.can_read(&simple_json));

        let images = reader.read(&simple_json).expect("Failed to read the image");
        assert_eq!(images.len(), 1);

        let image = &images[0];
        assert_eq!(image.name, "gradient");
        assert_eq!(image.image_type.component_type, ComponentType::UInt8);
        assert_eq!(image.image_type.pixel_type, PixelType::Scalar);
        assert_eq!(image.size, vec![2, 2]);
        assert_eq!(image.origin, vec![10.0, -5.5]);
        assert_eq!(image.spacing, vec![0.5, 2.0]);
        assert_eq!(image.metadata["modality"], "CT");
        assert_eq!(image.data, vec![0, 64, 128, 255]);
    }

    #[test]
    fn test_array_and_base64_agree() {
        let reader = JSONReader::new();
        let from_array = reader.read(&read("assets/int16_array.json").unwrap()).unwrap();
        let from_base64 = reader.read(&read("assets/int16_base64.json").unwrap()).unwrap();

        assert_eq!(from_array[0].data, from_base64[0].data);
        assert_eq!(from_array[0].data.len(), 8);
        assert_eq!(from_array[0].name, "image");
        assert_eq!(from_array[0].direction, vec![1.0]);
    }

    #[test]
    fn test_can_read() {
        let reader = JSONReader::new();
        assert!(reader.can_read(b"  \n {\"imageType\": {}}"));
        assert!(!reader.can_read(b"P3\n4 4\n255\n"));
        assert!(!reader.can_read(b"[1, 2, 3]"));
        assert!(!reader.can_read(b""));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let reader = JSONReader::new();
        let result = reader.read(b"{\"imageType\": ");
        assert!(matches!(result, Err(ImageIOError::FailedToRead { .. })));
    }

    #[test]
    fn test_rejects_unknown_component_type() {
        let reader = JSONReader::new();
        let data = br#"{
            "imageType": {"dimension": 1, "componentType": "uint128", "pixelType": "Scalar", "components": 1},
            "size": [1],
            "data": [1]
        }"#;
        assert!(reader.read(data).is_err());
    }

    #[test]
    fn test_rejects_buffer_size_mismatch() {
        let reader = JSONReader::new();
        let data = br#"{
            "imageType": {"dimension": 2, "componentType": "uint8", "pixelType": "Scalar", "components": 1},
            "size": [2, 2],
            "data": [1, 2, 3]
        }"#;
        let result = reader.read(data);
        assert!(matches!(result, Err(ImageIOError::FailedToRead { .. })));
    }

    #[test]
    fn test_rejects_huge_dimension() {
        let reader = JSONReader::new();
        let data = br#"{
            "imageType": {"dimension": 1000000000000000000, "componentType": "uint8", "pixelType": "Scalar", "components": 1},
            "size": [1],
            "data": [1]
        }"#;
        assert!(matches!(reader.read(data), Err(ImageIOError::FailedToRead { .. })));

        let data = br#"{
            "imageType": {"dimension": 4294967296, "componentType": "uint8", "pixelType": "Scalar", "components": 1},
            "origin": [0.0],
            "spacing": [1.0],
            "size": [1],
            "data": [1]
        }"#;
        assert!(matches!(reader.read(data), Err(ImageIOError::FailedToRead { .. })));
    }

    #[test]
    fn test_rejects_dimension_size_mismatch() {
        let reader = JSONReader::new();
        let data = br#"{
            "imageType": {"dimension": 3, "componentType": "uint8", "pixelType": "Scalar", "components": 1},
            "size": [2, 2],
            "data": [1, 2, 3, 4]
        }"#;
        assert!(matches!(reader.read(data), Err(ImageIOError::FailedToRead { .. })));
    }

    #[test]
    fn test_rejects_out_of_range_component() {
        let reader = JSONReader::new();
        let data = br#"{
            "imageType": {"dimension": 1, "componentType": "int8", "pixelType": "Scalar", "components": 1},
            "size": [1],
            "data": [200]
        }"#;
        assert!(reader.read(data).is_err());
    }
}
