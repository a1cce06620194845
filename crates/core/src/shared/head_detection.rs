use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::shared::image_message::ImageMessage;
use crate::shared::rectangle::Rectangle;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    #[serde(default)]
    pub secs: u32,
    #[serde(default)]
    pub nsecs: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub seq: u32,
    #[serde(default)]
    pub stamp: Stamp,
    #[serde(default)]
    pub frame_id: String,
}

/// One head region from the upstream head detector.
///
/// `face_detections` is the only field this crate writes; everything else,
/// including fields it does not model (head rectangle, depth crop, …), is
/// forwarded as received.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeadDetection {
    pub color_image: ImageMessage,
    #[serde(default)]
    pub face_detections: Vec<Rectangle>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HeadDetection {
    pub fn new(color_image: ImageMessage) -> Self {
        Self {
            color_image,
            face_detections: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// All head regions of one camera frame. Positions are significant: the
/// i-th entry of the outbound batch describes the i-th inbound head.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadDetectionArray {
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub head_detections: Vec<HeadDetection>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HeadDetectionArray {
    pub fn new(header: Header, head_detections: Vec<HeadDetection>) -> Self {
        Self {
            header,
            head_detections,
            extra: Map::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.head_detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head_detections.is_empty()
    }

    /// Total number of faces across all heads.
    pub fn face_count(&self) -> usize {
        self.head_detections
            .iter()
            .map(|h| h.face_detections.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_message_with_passthrough_fields() {
        let raw = json!({
            "header": {"seq": 7, "stamp": {"secs": 1, "nsecs": 2}, "frame_id": "head_cam"},
            "head_detections": [{
                "head_detection": {"x": 5, "y": 6, "width": 40, "height": 50},
                "color_image": {"width": 1, "height": 1, "encoding": "bgr8", "step": 3, "data": [1, 2, 3]},
                "depth_image": {"width": 0, "height": 0, "encoding": "32FC3", "step": 0, "data": []}
            }]
        });

        let batch: HeadDetectionArray = serde_json::from_value(raw).unwrap();

        assert_eq!(batch.header.seq, 7);
        assert_eq!(batch.header.frame_id, "head_cam");
        assert_eq!(batch.len(), 1);
        let head = &batch.head_detections[0];
        assert!(head.face_detections.is_empty());
        assert_eq!(head.extra["head_detection"]["width"], 40);
        assert_eq!(head.extra["depth_image"]["encoding"], "32FC3");
    }

    #[test]
    fn test_serialized_output_keeps_unmodelled_fields() {
        let raw = json!({
            "robot": "cob4",
            "head_detections": [{
                "head_detection": {"x": 1, "y": 1, "width": 2, "height": 2},
                "color_image": {"width": 0, "height": 0, "encoding": "rgb8", "step": 0, "data": []},
                "face_detections": [{"x": 0, "y": 0, "width": 1, "height": 1}]
            }]
        });

        let batch: HeadDetectionArray = serde_json::from_value(raw).unwrap();
        let out = serde_json::to_value(&batch).unwrap();

        assert_eq!(out["robot"], "cob4");
        assert_eq!(out["head_detections"][0]["head_detection"]["x"], 1);
        assert_eq!(out["head_detections"][0]["face_detections"][0]["width"], 1);
        assert_eq!(batch.face_count(), 1);
    }

    #[test]
    fn test_missing_header_defaults() {
        let batch: HeadDetectionArray = serde_json::from_str(r#"{"head_detections": []}"#).unwrap();
        assert_eq!(batch.header, Header::default());
        assert!(batch.is_empty());
    }
}
