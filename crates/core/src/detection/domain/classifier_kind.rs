use std::path::{Path, PathBuf};

use crate::shared::constants::{
    HAAR_CASCADE_NAME, HAAR_CASCADE_URL, LBP_CASCADE_NAME, LBP_CASCADE_URL,
};

/// Which trained cascade the detector runs.
///
/// The two built-in frontal-face cascades are resolved by file name (and
/// downloaded when missing); a custom cascade is always a user-supplied path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClassifierKind {
    Haar,
    Lbp,
    Custom(PathBuf),
}

impl ClassifierKind {
    pub fn label(&self) -> String {
        match self {
            ClassifierKind::Haar => "Haar Classifier".to_string(),
            ClassifierKind::Lbp => "LBP Classifier".to_string(),
            ClassifierKind::Custom(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }

    /// Cascade file name for the built-in classifiers.
    pub fn file_name(&self) -> Option<&'static str> {
        match self {
            ClassifierKind::Haar => Some(HAAR_CASCADE_NAME),
            ClassifierKind::Lbp => Some(LBP_CASCADE_NAME),
            ClassifierKind::Custom(_) => None,
        }
    }

    /// Download location for the built-in classifiers.
    pub fn url(&self) -> Option<&'static str> {
        match self {
            ClassifierKind::Haar => Some(HAAR_CASCADE_URL),
            ClassifierKind::Lbp => Some(LBP_CASCADE_URL),
            ClassifierKind::Custom(_) => None,
        }
    }

    pub fn custom_path(&self) -> Option<&Path> {
        match self {
            ClassifierKind::Custom(path) => Some(path),
            _ => None,
        }
    }

    /// Parses `haar`, `lbp`, or anything else as a path to a cascade file.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "haar" => ClassifierKind::Haar,
            "lbp" => ClassifierKind::Lbp,
            _ => ClassifierKind::Custom(PathBuf::from(value)),
        }
    }
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
