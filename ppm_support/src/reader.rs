use std::str::from_utf8;

use byteorder::{BigEndian, ByteOrder};
use imageio_core::models::{image::{Image, ImageType}, io::{ImageIOError, ImageReader}};
use log::*;

#[derive(Debug)]
struct Header {
    magic_number: String,
    width: usize,
    height: usize,
    max_color_value: usize,
}

trait RasterReader {
    fn read_raster(&self, header: &Header, data: &[u8]) -> Result<Vec<u8>, ImageIOError>;
}

pub struct P3RasterReader {
}

impl RasterReader for P3RasterReader {
    fn read_raster(&self, header: &Header, mut data: &[u8]) -> Result<Vec<u8>, ImageIOError> {
        let samples = header.width * header.height * 3;
        let mut pixels = Vec::with_capacity(samples.min(data.len()));
        for _ in 0..samples {
            data = skip_whitespaces_and_comments(data);
            let (sample, rest) = read_number(data)?;
            data = rest;
            pixels.push(normalize(sample, header.max_color_value)?);
        }
        Ok(pixels)
    }
}

pub struct P6RasterReader {
}

impl RasterReader for P6RasterReader {
    fn read_raster(&self, header: &Header, data: &[u8]) -> Result<Vec<u8>, ImageIOError> {
        let bytes_per_sample = if header.max_color_value > 255 { 2 } else { 1 };
        let samples = header.width * header.height * 3;
        if data.len() < samples * bytes_per_sample {
            return Err(failed_to_read(format!(
                "raster is truncated: expected {} bytes, got {}", samples * bytes_per_sample, data.len()
            )));
        }

        data[..samples * bytes_per_sample]
            .chunks_exact(bytes_per_sample)
            .map(|v| {
                let sample = if bytes_per_sample == 2 {
                    BigEndian::read_u16(v) as usize
                } else {
                    v[0] as usize
                };
                normalize(sample, header.max_color_value)
            })
            .collect()
    }
}

fn get_raster_reader(magic_number: &str) -> Result<Box<dyn RasterReader>, ImageIOError> {
    match magic_number {
        "P3" => Ok(Box::new(P3RasterReader {})),
        "P6" => Ok(Box::new(P6RasterReader {})),
        other => Err(failed_to_read(format!("unsupported magic number: {}", other))),
    }
}

fn normalize(sample: usize, max_value: usize) -> Result<u8, ImageIOError> {
    if sample > max_value {
        return Err(failed_to_read(format!("sample {} is larger than max color value {}", sample, max_value)));
    }
    Ok((255 * sample / max_value) as u8)
}

fn is_whitespace(char: u8) -> bool {
    // 9 - TAB; 10 - LF; 11 - VT; 12 - FF; 13 - CR; 32 - SPACE;
    char == 9 || char == 10 || char == 11 || char == 12 || char == 13 || char == 32
}

fn read_number(data: &[u8]) -> Result<(usize, &[u8]), ImageIOError> {
    let mut i = 0;
    while data.len() > i && data[i].is_ascii_digit() {
        i += 1;
    }
    if i == 0 {
        return Err(failed_to_read("expected a number".to_string()));
    }

    let number = from_utf8(&data[0..i])
        .map_err(|err| failed_to_read(err.to_string()))?
        .parse::<usize>()
        .map_err(|err| failed_to_read(format!("failed to parse number: {}", err)))?;

    Ok((number, &data[i..]))
}

fn skip_whitespaces_and_comments(mut data: &[u8]) -> &[u8] {
    loop {
        match data.first() {
            Some(v) if is_whitespace(*v) => data = &data[1..],
            // 35 - #
            Some(35) => {
                data = match data.iter().position(|v| *v == 10) {
                    Some(end) => &data[end + 1..],
                    None => &[],
                };
            },
            _ => return data,
        }
    }
}

fn read_header(data: &[u8]) -> Result<(Header, &[u8]), ImageIOError> {
    if data.len() < 2 {
        return Err(failed_to_read("file is too short to contain a header".to_string()));
    }
    let magic_number = from_utf8(&data[0..2])
        .map_err(|_| failed_to_read("bad data for magic number in PPM header".to_string()))?;

    // 35 - #
    match data.get(2) {
        Some(v) if is_whitespace(*v) || *v == 35 => {},
        _ => return Err(failed_to_read(format!("expected whitespace after magic number {}", magic_number))),
    }

    let data = skip_whitespaces_and_comments(&data[2..]);
    let (width, data) = read_number(data)?;
    let data = skip_whitespaces_and_comments(data);
    let (height, data) = read_number(data)?;
    let data = skip_whitespaces_and_comments(data);
    let (max_color_value, data) = read_number(data)?;

    if width.checked_mul(height).and_then(|v| v.checked_mul(6)).is_none() {
        return Err(failed_to_read(format!("image size {}x{} is too large", width, height)));
    }
    if max_color_value == 0 || max_color_value > 65535 {
        return Err(failed_to_read(format!("max color value {} is out of range", max_color_value)));
    }

    // exactly one whitespace separates the header from the raster
    let data = match data.first() {
        Some(v) if is_whitespace(*v) => &data[1..],
        _ => return Err(failed_to_read("expected whitespace after header".to_string())),
    };

    Ok((Header {
        magic_number: magic_number.to_owned(),
        width,
        height,
        max_color_value,
    }, data))
}

fn failed_to_read(description: String) -> ImageIOError {
    ImageIOError::FailedToRead { description }
}

pub struct PPMReader {
}

impl PPMReader {
    pub const fn new() -> Self {
        PPMReader {}
    }
}

impl ImageReader for PPMReader {

    fn can_read(&self, data: &[u8]) -> bool {
        data.starts_with(b"P3") || data.starts_with(b"P6")
    }

    fn read(&self, data: &[u8]) -> Result<Vec<Image>, ImageIOError> {
        let (header, data) = read_header(data)?;
        let raster_reader = get_raster_reader(header.magic_number.as_str())?;

        let pixels = raster_reader.read_raster(&header, data)?;
        debug!("read {} image of size {}x{}, max color value {}", header.magic_number, header.width, header.height, header.max_color_value);

        Ok(vec![Image::from_data(ImageType::rgb8(), vec![header.width, header.height], pixels)])
    }
}

#[cfg(test)]
mod tests {
    use std::fs::read;
    use super::*;

    #[test]
    fn simple_test() {
        let simple_ppm = read("assets/simple.ppm")
            .expect("Failed to load assets/simple.ppm");
        let reader = PPMReader::new();
        let images = reader.read(&simple_ppm).expect("Failed to read the image");
        let image = &images[0];

        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 4);
        assert_eq!(image.data.len(), 48);
        assert_eq!(*image, Image::test_image());
    }

    #[test]
    fn test2() {
        let simple_ppm = read("assets/example1.ppm")
            .expect("Failed to load assets/example1.ppm");
        let reader = PPMReader::new();
        let images = reader.read(&simple_ppm).expect("Failed to read the image");
        let image = &images[0];

        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 4);
        assert_eq!(image.get_rgb8(1, 1), [0, 255, 119]);
        assert_eq!(image.get_rgb8(3, 0), [255, 0, 255]);
    }

    #[test]
    fn test_binary_raster() {
        let mut data = b"P6\n# binary\n2 1\n255\n".to_vec();
        data.extend_from_slice(&[1, 2, 3, 250, 251, 252]);

        let images = PPMReader::new().read(&data).unwrap();
        assert_eq!(images[0].data, vec![1, 2, 3, 250, 251, 252]);
    }

    #[test]
    fn test_binary_raster_with_wide_samples() {
        let mut data = b"P6 1 1 65535\n".to_vec();
        data.extend_from_slice(&[0xff, 0xff, 0x00, 0x00, 0x80, 0x00]);

        let images = PPMReader::new().read(&data).unwrap();
        assert_eq!(images[0].data, vec![255, 0, 127]);
    }

    #[test]
    fn test_truncated_raster() {
        let mut data = b"P6 2 2 255\n".to_vec();
        data.extend_from_slice(&[1, 2, 3]);
        assert!(matches!(PPMReader::new().read(&data), Err(ImageIOError::FailedToRead { .. })));

        assert!(PPMReader::new().read(b"P3 2 1 255\n1 2 3 4").is_err());
    }

    #[test]
    fn test_bad_headers() {
        let reader = PPMReader::new();
        assert!(reader.read(b"P").is_err());
        assert!(reader.read(b"P5 1 1 255\n\x00").is_err());
        assert!(reader.read(b"P3 x 1 255\n").is_err());
        assert!(reader.read(b"P3 1 1 0\n0 0 0").is_err());
        assert!(reader.read(b"P3 1 1 15\n16 0 0").is_err());
        assert!(reader.read(b"P31 1 255\n0 0 0").is_err());
        assert!(reader.read(b"P3").is_err());
    }

    #[test]
    fn test_comment_right_after_magic_number() {
        let images = PPMReader::new().read(b"P3# tiny\n1 1 255\n1 2 3\n").unwrap();
        assert_eq!(images[0].data, vec![1, 2, 3]);
    }

    #[test]
    fn test_can_read() {
        let reader = PPMReader::new();
        assert!(reader.can_read(b"P3\n"));
        assert!(reader.can_read(b"P6\n"));
        assert!(!reader.can_read(b"{}"));
    }
}
