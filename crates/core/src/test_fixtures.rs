//! Synthetic classifier data and images shared by unit tests.
use crate::detection::infrastructure::haar_cascade::HaarCascade;
use crate::shared::frame::Frame;

/// One-stage 8x8 cascade that fires on a dark upper half over a bright
/// lower half: the feature value is (bottom - top) / area, accepted when it
/// exceeds 0.3 standard deviations of the window.
pub(crate) fn edge_cascade_json() -> String {
    r#"{
  "window_width": 8,
  "window_height": 8,
  "stages": [
    {
      "threshold": 0.0,
      "classifiers": [
        {
          "feature": [
            {"x": 0, "y": 0, "width": 8, "height": 8, "weight": -1.0},
            {"x": 0, "y": 4, "width": 8, "height": 4, "weight": 2.0}
          ],
          "threshold": 0.3,
          "left_value": -1.0,
          "right_value": 1.0
        }
      ]
    }
  ]
}"#
    .to_string()
}

pub(crate) fn edge_cascade() -> HaarCascade {
    serde_json::from_str(&edge_cascade_json()).expect("fixture cascade parses")
}

/// Mid-grey RGB image with a `size`-square "face" at (`x`, `y`): black upper
/// half, white lower half.
pub(crate) fn face_patch_image(width: u32, height: u32, x: u32, y: u32, size: u32) -> Frame {
    let mut data = vec![128u8; (width * height * 3) as usize];
    for row in y..(y + size).min(height) {
        let value = if row < y + size / 2 { 0 } else { 255 };
        for col in x..(x + size).min(width) {
            let idx = ((row * width + col) * 3) as usize;
            data[idx..idx + 3].fill(value);
        }
    }
    Frame::new(data, width, height)
}

pub(crate) fn blank_image(width: u32, height: u32) -> Frame {
    Frame::new(vec![128u8; (width * height * 3) as usize], width, height)
}
