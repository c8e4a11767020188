#[cfg(feature = "opencv")]
pub mod cascade_detector;
pub mod classifier_resolver;
