use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::io::ImageIOError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl ComponentType {

    pub fn size_in_bytes(&self) -> usize {
        match self {
            ComponentType::Int8 | ComponentType::UInt8 => 1,
            ComponentType::Int16 | ComponentType::UInt16 => 2,
            ComponentType::Int32 | ComponentType::UInt32 | ComponentType::Float32 => 4,
            ComponentType::Int64 | ComponentType::UInt64 | ComponentType::Float64 => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ComponentType::Int8 => "int8",
            ComponentType::UInt8 => "uint8",
            ComponentType::Int16 => "int16",
            ComponentType::UInt16 => "uint16",
            ComponentType::Int32 => "int32",
            ComponentType::UInt32 => "uint32",
            ComponentType::Int64 => "int64",
            ComponentType::UInt64 => "uint64",
            ComponentType::Float32 => "float32",
            ComponentType::Float64 => "float64",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelType {
    Unknown,
    Scalar,
    RGB,
    RGBA,
    Offset,
    Vector,
    Point,
    CovariantVector,
    SymmetricSecondRankTensor,
    DiffusionTensor3D,
    Complex,
    FixedArray,
    Array,
    Matrix,
    VariableLengthVector,
    VariableSizeMatrix,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageType {
    pub dimension: usize,
    pub component_type: ComponentType,
    pub pixel_type: PixelType,
    pub components: usize,
}

impl ImageType {

    pub fn new(dimension: usize, component_type: ComponentType, pixel_type: PixelType, components: usize) -> Self {
        ImageType {
            dimension,
            component_type,
            pixel_type,
            components,
        }
    }

    pub fn rgb8() -> Self {
        Self::new(2, ComponentType::UInt8, PixelType::RGB, 3)
    }

    pub fn pixel_size_in_bytes(&self) -> usize {
        self.component_type.size_in_bytes() * self.components
    }
}

/// Largest supported number of axes.
pub const MAX_DIMENSION: usize = 32;

/// An n-dimensional image with physical geometry.
///
/// `data` holds every component of every pixel as little-endian values,
/// components of one pixel next to each other, first axis varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub image_type: ImageType,
    pub name: String,
    pub origin: Vec<f64>,
    pub spacing: Vec<f64>,
    pub direction: Vec<f64>, // row-major, dimension x dimension
    pub size: Vec<usize>,
    pub metadata: Map<String, Value>,
    pub data: Vec<u8>,
}

impl Image {

    pub fn new(image_type: ImageType, size: Vec<usize>) -> Self {
        let mut image = Self::from_data(image_type, size, Vec::new());
        image.data = vec![0; image.expected_buffer_len()];
        image
    }

    /// Default geometry around an existing pixel buffer. The buffer is not checked, see `validate`.
    pub fn from_data(image_type: ImageType, size: Vec<usize>, data: Vec<u8>) -> Self {
        let dimension = image_type.dimension;
        Image {
            image_type,
            name: "image".to_string(),
            origin: vec![0.0; dimension],
            spacing: vec![1.0; dimension],
            direction: identity_direction(dimension).unwrap_or_default(),
            size,
            metadata: Map::new(),
            data,
        }
    }

    pub fn test_image() -> Self {
        let mut image = Self::new(ImageType::rgb8(), vec![4, 4]);

        let white = [255, 255, 255];
        let blue = [3, 155, 229];
        let red = [221, 47, 47];

        for y in 0..4 {
            for x in 0..4 {
                image.set_rgb8(x, y, white);
            }
        }
        image.set_rgb8(1, 1, blue);
        image.set_rgb8(2, 1, blue);
        image.set_rgb8(1, 2, blue);
        image.set_rgb8(2, 2, red);

        image
    }

    pub fn number_of_pixels(&self) -> usize {
        self.size.iter().fold(1usize, |acc, v| acc.saturating_mul(*v))
    }

    pub fn expected_buffer_len(&self) -> usize {
        self.number_of_pixels().saturating_mul(self.image_type.pixel_size_in_bytes())
    }

    pub fn width(&self) -> usize {
        self.size.get(0).copied().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.size.get(1).copied().unwrap_or(1)
    }

    /// Only meaningful for 2-D uint8 images with three components.
    pub fn set_rgb8(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let offset = (y * self.width() + x) * 3;
        self.data[offset..offset + 3].copy_from_slice(&rgb);
    }

    pub fn get_rgb8(&self, x: usize, y: usize) -> [u8; 3] {
        let offset = (y * self.width() + x) * 3;
        [self.data[offset], self.data[offset + 1], self.data[offset + 2]]
    }

    pub fn validate(&self) -> Result<(), ImageIOError> {
        let dimension = self.image_type.dimension;
        if dimension == 0 || dimension > MAX_DIMENSION {
            return Err(invalid(format!("dimension must be between 1 and {}, got {}", MAX_DIMENSION, dimension)));
        }
        if self.image_type.components == 0 {
            return Err(invalid("number of components must be at least 1".to_string()));
        }

        check_len("size", self.size.len(), dimension)?;
        check_len("origin", self.origin.len(), dimension)?;
        check_len("spacing", self.spacing.len(), dimension)?;
        check_len("direction", self.direction.len(), dimension * dimension)?;

        if self.data.len() != self.expected_buffer_len() {
            return Err(invalid(format!(
                "pixel buffer has {} bytes, expected {} for size {:?} and {} x {}",
                self.data.len(),
                self.expected_buffer_len(),
                self.size,
                self.image_type.components,
                self.image_type.component_type.name(),
            )));
        }

        Ok(())
    }
}

/// `None` when `dimension x dimension` does not fit in `usize`.
pub fn identity_direction(dimension: usize) -> Option<Vec<f64>> {
    let mut direction = vec![0.0; dimension.checked_mul(dimension)?];
    for i in 0..dimension {
        direction[i * dimension + i] = 1.0;
    }
    Some(direction)
}

fn check_len(field: &str, actual: usize, expected: usize) -> Result<(), ImageIOError> {
    if actual != expected {
        return Err(invalid(format!("{} has {} entries, expected {}", field, actual, expected)));
    }
    Ok(())
}

fn invalid(description: String) -> ImageIOError {
    ImageIOError::InvalidImage { description }
}
