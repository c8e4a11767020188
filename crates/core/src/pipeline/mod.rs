pub mod annotate_image_use_case;
pub mod detect_faces_use_case;
pub mod frame_grabber;
