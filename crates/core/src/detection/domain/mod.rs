pub mod classifier_kind;
pub mod detection_params;
pub mod face_detector;
pub mod min_face_size;
