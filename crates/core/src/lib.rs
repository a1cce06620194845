pub mod detection {
    pub mod domain {
        pub mod detector_adapter;
        pub mod detector_config;
        pub mod face_detector;
        pub mod neighbor_grouping;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod batch_logger;
    pub mod detect_faces_use_case;
    pub mod frame_coordinator;
    pub mod infrastructure;
}

pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod head_detection;
    pub mod image_message;
    pub mod rectangle;
}

pub mod transport {
    pub mod domain {
        pub mod batch_sink;
        pub mod batch_source;
    }
    pub mod infrastructure;
}

#[cfg(test)]
pub(crate) mod test_fixtures;
