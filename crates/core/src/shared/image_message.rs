use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::shared::frame::{Frame, FRAME_CHANNELS};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("unsupported image encoding '{0}'")]
    UnsupportedEncoding(String),
    #[error("row step {step} is shorter than one row of pixels ({row_bytes} bytes)")]
    StepTooShort { step: usize, row_bytes: usize },
    #[error("image data holds {actual} bytes, expected at least {expected}")]
    DataTooShort { expected: usize, actual: usize },
    #[error("image dimensions {width}x{height} overflow the address space")]
    TooLarge { width: u32, height: u32 },
}

/// Source pixel layouts accepted on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelEncoding {
    Rgb8,
    Bgr8,
    Rgba8,
    Bgra8,
    Mono8,
}

impl PixelEncoding {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "rgb8" => Some(Self::Rgb8),
            "bgr8" => Some(Self::Bgr8),
            "rgba8" => Some(Self::Rgba8),
            "bgra8" => Some(Self::Bgra8),
            "mono8" => Some(Self::Mono8),
            _ => None,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 | Self::Bgr8 => 3,
            Self::Rgba8 | Self::Bgra8 => 4,
            Self::Mono8 => 1,
        }
    }

    fn write_rgb(self, px: &[u8], out: &mut Vec<u8>) {
        match self {
            Self::Rgb8 | Self::Rgba8 => out.extend_from_slice(&px[..3]),
            Self::Bgr8 | Self::Bgra8 => out.extend_from_slice(&[px[2], px[1], px[0]]),
            Self::Mono8 => out.extend_from_slice(&[px[0], px[0], px[0]]),
        }
    }
}

/// Raw image as carried inside a head-detection message.
///
/// Rows are `step` bytes apart; any padding past `width * bpp` is ignored.
/// Fields this crate does not interpret (header, endianness flag, …) are
/// kept in `extra` and serialized back unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageMessage {
    pub width: u32,
    pub height: u32,
    pub encoding: String,
    pub step: u32,
    #[serde(default)]
    pub data: Vec<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageMessage {
    /// Builds a tightly packed message (no row padding).
    pub fn new(width: u32, height: u32, encoding: PixelEncoding, data: Vec<u8>) -> Self {
        let name = match encoding {
            PixelEncoding::Rgb8 => "rgb8",
            PixelEncoding::Bgr8 => "bgr8",
            PixelEncoding::Rgba8 => "rgba8",
            PixelEncoding::Bgra8 => "bgra8",
            PixelEncoding::Mono8 => "mono8",
        };
        Self {
            width,
            height,
            encoding: name.to_string(),
            step: width * encoding.bytes_per_pixel() as u32,
            data,
            extra: Map::new(),
        }
    }

    /// Decodes into the detector's RGB8 frame format.
    pub fn to_frame(&self) -> Result<Frame, ConvertError> {
        let encoding = PixelEncoding::parse(&self.encoding)
            .ok_or_else(|| ConvertError::UnsupportedEncoding(self.encoding.clone()))?;
        let bpp = encoding.bytes_per_pixel();
        let width = self.width as usize;
        let height = self.height as usize;
        let step = self.step as usize;

        let too_large = ConvertError::TooLarge {
            width: self.width,
            height: self.height,
        };
        let row_bytes = width.checked_mul(bpp).ok_or_else(|| too_large.clone())?;
        if height > 0 && step < row_bytes {
            return Err(ConvertError::StepTooShort { step, row_bytes });
        }
        let expected = step.checked_mul(height).ok_or(too_large)?;
        if self.data.len() < expected {
            return Err(ConvertError::DataTooShort {
                expected,
                actual: self.data.len(),
            });
        }

        let mut pixels = Vec::with_capacity(width * height * FRAME_CHANNELS);
        for row in 0..height {
            let start = row * step;
            for px in self.data[start..start + row_bytes].chunks_exact(bpp) {
                encoding.write_rgb(px, &mut pixels);
            }
        }
        Ok(Frame::new(pixels, self.width, self.height))
    }
}
