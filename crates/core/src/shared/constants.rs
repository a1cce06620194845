/// File looked up inside the configured resource directory.
pub const CASCADE_FILE_NAME: &str = "haarcascade_frontalface.json";

/// Directory name used under the platform data directory and next to the
/// executable for packaged classifier data.
pub const RESOURCE_SUBDIR: &str = "cascades";

pub const APP_DIR_NAME: &str = "HeadFace";

pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;
pub const DEFAULT_MIN_NEIGHBOR_GROUPS: u32 = 68;
pub const DEFAULT_MIN_WINDOW_WIDTH: u32 = 20;
pub const DEFAULT_MIN_WINDOW_HEIGHT: u32 = 20;

/// Rectangle similarity tolerance used when grouping raw cascade hits.
pub const GROUP_EPS: f64 = 0.2;
