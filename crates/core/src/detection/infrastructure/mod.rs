pub mod cascade_face_detector;
pub mod detector_factory;
pub mod haar_cascade;
pub mod resource_resolver;
pub mod serialized_face_detector;
