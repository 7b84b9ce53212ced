use base64::{engine::general_purpose::STANDARD, Engine as _};
use byteorder::{ByteOrder, LittleEndian};
use imageio_core::models::{image::{identity_direction, ComponentType, Image, ImageType, MAX_DIMENSION}, io::ImageIOError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub const BASE64_DATA_PREFIX: &str = "data:application/vnd.itk.base64,";

/// On-disk layout of a JSON image document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JSONImage {
    pub image_type: ImageType,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Vec<f64>>,
    pub size: Vec<usize>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub data: PixelData,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PixelData {
    Encoded(String),
    Components(Vec<Number>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DataEncoding {
    Base64,
    Array,
}

impl DataEncoding {

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "base64" => Some(DataEncoding::Base64),
            "array" => Some(DataEncoding::Array),
            _ => None,
        }
    }
}

fn default_name() -> String {
    "image".to_string()
}

impl JSONImage {

    pub fn from_image(image: &Image, encoding: DataEncoding) -> Self {
        let data = match encoding {
            DataEncoding::Base64 => PixelData::Encoded(format!("{}{}", BASE64_DATA_PREFIX, STANDARD.encode(&image.data))),
            DataEncoding::Array => PixelData::Components(bytes_to_components(image.image_type.component_type, &image.data)),
        };

        JSONImage {
            image_type: image.image_type,
            name: image.name.clone(),
            origin: Some(image.origin.clone()),
            spacing: Some(image.spacing.clone()),
            direction: Some(image.direction.clone()),
            size: image.size.clone(),
            metadata: image.metadata.clone(),
            data,
        }
    }

    pub fn into_image(self) -> Result<Image, ImageIOError> {
        let dimension = self.image_type.dimension;
        // geometry defaults are sized by dimension, so it has to be trusted first
        if dimension == 0 || dimension > MAX_DIMENSION {
            return Err(failed_to_read(format!("dimension must be between 1 and {}, got {}", MAX_DIMENSION, dimension)));
        }
        if dimension != self.size.len() {
            return Err(failed_to_read(format!("dimension is {} but size has {} entries", dimension, self.size.len())));
        }

        let data = match self.data {
            PixelData::Encoded(encoded) => decode_base64(&encoded)?,
            PixelData::Components(components) => components_to_bytes(self.image_type.component_type, &components)?,
        };

        Ok(Image {
            image_type: self.image_type,
            name: self.name,
            origin: self.origin.unwrap_or_else(|| vec![0.0; dimension]),
            spacing: self.spacing.unwrap_or_else(|| vec![1.0; dimension]),
            direction: self.direction.unwrap_or_else(|| identity_direction(dimension).unwrap_or_default()),
            size: self.size,
            metadata: self.metadata,
            data,
        })
    }
}

fn decode_base64(encoded: &str) -> Result<Vec<u8>, ImageIOError> {
    let payload = match encoded.strip_prefix(BASE64_DATA_PREFIX) {
        Some(v) => v,
        None => return Err(failed_to_read(format!(
            "unsupported pixel data reference, expected it to start with {}", BASE64_DATA_PREFIX
        ))),
    };

    STANDARD.decode(payload.trim())
        .map_err(|err| failed_to_read(format!("failed to decode base64 pixel data: {}", err)))
}

pub fn bytes_to_components(component_type: ComponentType, data: &[u8]) -> Vec<Number> {
    data.chunks_exact(component_type.size_in_bytes())
        .map(|v| match component_type {
            ComponentType::Int8 => Number::from(v[0] as i8),
            ComponentType::UInt8 => Number::from(v[0]),
            ComponentType::Int16 => Number::from(LittleEndian::read_i16(v)),
            ComponentType::UInt16 => Number::from(LittleEndian::read_u16(v)),
            ComponentType::Int32 => Number::from(LittleEndian::read_i32(v)),
            ComponentType::UInt32 => Number::from(LittleEndian::read_u32(v)),
            ComponentType::Int64 => Number::from(LittleEndian::read_i64(v)),
            ComponentType::UInt64 => Number::from(LittleEndian::read_u64(v)),
            // NaN and infinities have no JSON representation
            ComponentType::Float32 => Number::from_f64(LittleEndian::read_f32(v) as f64).unwrap_or_else(|| Number::from(0)),
            ComponentType::Float64 => Number::from_f64(LittleEndian::read_f64(v)).unwrap_or_else(|| Number::from(0)),
        })
        .collect()
}

pub fn components_to_bytes(component_type: ComponentType, components: &[Number]) -> Result<Vec<u8>, ImageIOError> {
    let size = component_type.size_in_bytes();
    let mut data = vec![0 as u8; components.len() * size];

    for (component, chunk) in components.iter().zip(data.chunks_exact_mut(size)) {
        match component_type {
            ComponentType::Int8 => chunk[0] = signed(component, i8::MIN as i64, i8::MAX as i64)? as i8 as u8,
            ComponentType::UInt8 => chunk[0] = unsigned(component, u8::MAX as u64)? as u8,
            ComponentType::Int16 => LittleEndian::write_i16(chunk, signed(component, i16::MIN as i64, i16::MAX as i64)? as i16),
            ComponentType::UInt16 => LittleEndian::write_u16(chunk, unsigned(component, u16::MAX as u64)? as u16),
            ComponentType::Int32 => LittleEndian::write_i32(chunk, signed(component, i32::MIN as i64, i32::MAX as i64)? as i32),
            ComponentType::UInt32 => LittleEndian::write_u32(chunk, unsigned(component, u32::MAX as u64)? as u32),
            ComponentType::Int64 => LittleEndian::write_i64(chunk, signed(component, i64::MIN, i64::MAX)?),
            ComponentType::UInt64 => LittleEndian::write_u64(chunk, unsigned(component, u64::MAX)?),
            ComponentType::Float32 => LittleEndian::write_f32(chunk, float(component)? as f32),
            ComponentType::Float64 => LittleEndian::write_f64(chunk, float(component)?),
        }
    }

    Ok(data)
}

fn signed(component: &Number, min: i64, max: i64) -> Result<i64, ImageIOError> {
    match component.as_i64() {
        Some(v) if v >= min && v <= max => Ok(v),
        _ => Err(out_of_range(component, min.to_string(), max.to_string())),
    }
}

fn unsigned(component: &Number, max: u64) -> Result<u64, ImageIOError> {
    match component.as_u64() {
        Some(v) if v <= max => Ok(v),
        _ => Err(out_of_range(component, "0".to_string(), max.to_string())),
    }
}

fn float(component: &Number) -> Result<f64, ImageIOError> {
    component.as_f64()
        .ok_or_else(|| failed_to_read(format!("pixel component {} is not a number", component)))
}

fn out_of_range(component: &Number, min: String, max: String) -> ImageIOError {
    failed_to_read(format!("pixel component {} is not an integer in [{}, {}]", component, min, max))
}

fn failed_to_read(description: String) -> ImageIOError {
    ImageIOError::FailedToRead { description }
}
