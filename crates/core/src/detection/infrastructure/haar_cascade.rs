//! Boosted Haar-feature cascade (Viola–Jones) and its multi-scale scan.
//!
//! Cascade data is a JSON document:
//!
//! ```json
//! {
//!   "window_width": 20, "window_height": 20,
//!   "stages": [{
//!     "threshold": 0.82,
//!     "classifiers": [{
//!       "feature": [{"x": 3, "y": 7, "width": 14, "height": 4, "weight": -1.0},
//!                   {"x": 3, "y": 9, "width": 14, "height": 2, "weight": 2.0}],
//!       "threshold": 0.0040, "left_value": 0.0337, "right_value": 0.8378
//!     }]
//!   }]
//! }
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use image::GrayImage;
use ndarray::Array2;
use serde::Deserialize;
use thiserror::Error;

use crate::shared::rectangle::Rectangle;

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("failed to read cascade {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse cascade {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid cascade: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct WeightedRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub weight: f64,
}

/// Decision stump over one Haar feature.
#[derive(Clone, Debug, Deserialize)]
pub struct StumpClassifier {
    pub feature: Vec<WeightedRect>,
    pub threshold: f64,
    pub left_value: f64,
    pub right_value: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CascadeStage {
    pub threshold: f64,
    pub classifiers: Vec<StumpClassifier>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HaarCascade {
    pub window_width: u32,
    pub window_height: u32,
    pub stages: Vec<CascadeStage>,
}

/// Window-scan settings taken from the detector configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanParams {
    pub scale_factor: f64,
    pub min_width: u32,
    pub min_height: u32,
}

impl HaarCascade {
    pub fn load(path: &Path) -> Result<Self, CascadeError> {
        let json = fs::read_to_string(path).map_err(|source| CascadeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cascade: HaarCascade =
            serde_json::from_str(&json).map_err(|source| CascadeError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        cascade.validate()?;
        Ok(cascade)
    }

    fn validate(&self) -> Result<(), CascadeError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(CascadeError::Invalid("window size must be non-zero".into()));
        }
        if self.stages.is_empty() {
            return Err(CascadeError::Invalid("cascade has no stages".into()));
        }
        for (s, stage) in self.stages.iter().enumerate() {
            for rect in stage.classifiers.iter().flat_map(|c| &c.feature) {
                if rect.x + rect.width > self.window_width
                    || rect.y + rect.height > self.window_height
                {
                    return Err(CascadeError::Invalid(format!(
                        "stage {s}: feature rectangle exceeds the {}x{} window",
                        self.window_width, self.window_height
                    )));
                }
            }
        }
        Ok(())
    }

    /// Runs the cascade over every window position and scale and returns the
    /// raw (ungrouped) hits.
    ///
    /// The window starts at the cascade's native size and grows by
    /// `scale_factor` until it no longer fits the image; scales below the
    /// minimum window are skipped. Windows step by `max(2, scale)` pixels.
    pub fn scan(&self, gray: &GrayImage, params: &ScanParams) -> Vec<Rectangle> {
        let (img_w, img_h) = gray.dimensions();
        let mut hits = Vec::new();
        if img_w == 0 || img_h == 0 || !(params.scale_factor > 1.0) {
            return hits;
        }
        let integral = IntegralImages::new(gray);

        let mut scale = 1.0f64;
        loop {
            let win_w = (self.window_width as f64 * scale).round() as u32;
            let win_h = (self.window_height as f64 * scale).round() as u32;
            if win_w > img_w || win_h > img_h {
                break;
            }
            if win_w >= params.min_width && win_h >= params.min_height {
                let scaled = ScaledCascade::new(self, scale, win_w, win_h);
                let step = scale.max(2.0).round() as usize;
                for y in (0..=img_h - win_h).step_by(step) {
                    for x in (0..=img_w - win_w).step_by(step) {
                        if scaled.accepts(&integral, x, y) {
                            hits.push(Rectangle::new(
                                x as i32,
                                y as i32,
                                win_w as i32,
                                win_h as i32,
                            ));
                        }
                    }
                }
            }
            scale *= params.scale_factor;
        }
        hits
    }
}

/// Summed-area tables of pixel values and squared pixel values, one row and
/// column larger than the image.
struct IntegralImages {
    sum: Array2<u64>,
    sq_sum: Array2<u64>,
}

impl IntegralImages {
    fn new(gray: &GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let (w, h) = (w as usize, h as usize);
        let mut sum = Array2::<u64>::zeros((h + 1, w + 1));
        let mut sq_sum = Array2::<u64>::zeros((h + 1, w + 1));
        let raw = gray.as_raw();
        for y in 0..h {
            let mut row = 0u64;
            let mut row_sq = 0u64;
            for x in 0..w {
                let v = raw[y * w + x] as u64;
                row += v;
                row_sq += v * v;
                sum[[y + 1, x + 1]] = sum[[y, x + 1]] + row;
                sq_sum[[y + 1, x + 1]] = sq_sum[[y, x + 1]] + row_sq;
            }
        }
        Self { sum, sq_sum }
    }

    fn rect(table: &Array2<u64>, x: u32, y: u32, w: u32, h: u32) -> u64 {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        (table[[y1, x1]] + table[[y0, x0]]) - (table[[y0, x1]] + table[[y1, x0]])
    }
}

struct ScaledRect {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    weight: f64,
}

struct ScaledStump {
    rects: Vec<ScaledRect>,
    threshold: f64,
    left_value: f64,
    right_value: f64,
}

/// The cascade with feature geometry fixed for one window size. Weights are
/// pre-divided by the window area so feature values are mean-normalised.
struct ScaledCascade<'a> {
    cascade: &'a HaarCascade,
    stumps: Vec<Vec<ScaledStump>>,
    win_w: u32,
    win_h: u32,
}

impl<'a> ScaledCascade<'a> {
    fn new(cascade: &'a HaarCascade, scale: f64, win_w: u32, win_h: u32) -> Self {
        let inv_area = 1.0 / (win_w as f64 * win_h as f64);
        let scale_dim = |v: u32| (v as f64 * scale).round() as u32;
        let stumps = cascade
            .stages
            .iter()
            .map(|stage| {
                stage
                    .classifiers
                    .iter()
                    .map(|c| ScaledStump {
                        rects: c
                            .feature
                            .iter()
                            .map(|r| {
                                let x = scale_dim(r.x).min(win_w);
                                let y = scale_dim(r.y).min(win_h);
                                ScaledRect {
                                    x,
                                    y,
                                    width: scale_dim(r.width).min(win_w - x),
                                    height: scale_dim(r.height).min(win_h - y),
                                    weight: r.weight * inv_area,
                                }
                            })
                            .collect(),
                        threshold: c.threshold,
                        left_value: c.left_value,
                        right_value: c.right_value,
                    })
                    .collect()
            })
            .collect();
        Self {
            cascade,
            stumps,
            win_w,
            win_h,
        }
    }

    fn accepts(&self, ii: &IntegralImages, x: u32, y: u32) -> bool {
        let area = self.win_w as f64 * self.win_h as f64;
        let sum = IntegralImages::rect(&ii.sum, x, y, self.win_w, self.win_h) as f64;
        let sq_sum = IntegralImages::rect(&ii.sq_sum, x, y, self.win_w, self.win_h) as f64;
        let mean = sum / area;
        let variance = sq_sum / area - mean * mean;
        let std_dev = if variance > 0.0 { variance.sqrt() } else { 1.0 };

        for (stage, stumps) in self.cascade.stages.iter().zip(&self.stumps) {
            let stage_sum: f64 = stumps
                .iter()
                .map(|stump| {
                    let value: f64 = stump
                        .rects
                        .iter()
                        .map(|r| {
                            IntegralImages::rect(&ii.sum, x + r.x, y + r.y, r.width, r.height)
                                as f64
                                * r.weight
                        })
                        .sum();
                    if value < stump.threshold * std_dev {
                        stump.left_value
                    } else {
                        stump.right_value
                    }
                })
                .sum();
            if stage_sum < stage.threshold {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{edge_cascade, edge_cascade_json, face_patch_image};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn params(min: u32) -> ScanParams {
        ScanParams {
            scale_factor: 1.1,
            min_width: min,
            min_height: min,
        }
    }

    fn gray(w: u32, h: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(w, h, image::Luma([value]))
    }

    #[test]
    fn test_integral_rect_sum() {
        let mut img = gray(4, 3, 1);
        img.put_pixel(2, 1, image::Luma([10]));
        let ii = IntegralImages::new(&img);
        assert_eq!(IntegralImages::rect(&ii.sum, 0, 0, 4, 3), 21);
        assert_eq!(IntegralImages::rect(&ii.sum, 2, 1, 1, 1), 10);
        assert_eq!(IntegralImages::rect(&ii.sq_sum, 2, 1, 2, 2), 100 + 3);
    }

    #[test]
    fn test_uniform_image_has_no_hits() {
        let hits = edge_cascade().scan(&gray(48, 48, 128), &params(8));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_pattern_is_found_at_several_scales() {
        let frame = face_patch_image(48, 48, 12, 12, 16);
        let rgb = frame.to_rgb_image().unwrap();
        let gray = image::imageops::grayscale(&rgb);
        let patch = Rectangle::new(12, 12, 16, 16);

        let hits = edge_cascade().scan(&gray, &params(8));

        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.iou(&patch) > 0.0));
        let sizes: std::collections::HashSet<i32> = hits.iter().map(|h| h.width).collect();
        assert!(sizes.len() > 1);
    }

    #[test]
    fn test_min_window_skips_small_scales() {
        let frame = face_patch_image(48, 48, 12, 12, 16);
        let gray = image::imageops::grayscale(&frame.to_rgb_image().unwrap());
        let hits = edge_cascade().scan(&gray, &params(14));
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.width >= 14 && h.height >= 14));
    }

    #[test]
    fn test_image_smaller_than_window() {
        let hits = edge_cascade().scan(&gray(5, 5, 0), &params(1));
        assert!(hits.is_empty());
        assert!(edge_cascade().scan(&gray(0, 0, 0), &params(1)).is_empty());
    }

    #[test]
    fn test_load_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(edge_cascade_json().as_bytes()).unwrap();
        let cascade = HaarCascade::load(file.path()).unwrap();
        assert_eq!(cascade.window_width, 8);
        assert_eq!(cascade.stages.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = HaarCascade::load(Path::new("/nonexistent/cascade.json")).unwrap_err();
        assert!(matches!(err, CascadeError::Read { .. }));
    }

    #[test]
    fn test_load_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"window_width\": 8,").unwrap();
        let err = HaarCascade::load(file.path()).unwrap_err();
        assert!(matches!(err, CascadeError::Parse { .. }));
    }

    #[test]
    fn test_load_rejects_feature_outside_window() {
        let json = edge_cascade_json().replace("\"y\": 4", "\"y\": 6");
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        let err = HaarCascade::load(file.path()).unwrap_err();
        assert!(matches!(err, CascadeError::Invalid(_)));
    }
}
