use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use facecam_core::detection::domain::classifier_kind::ClassifierKind;
use facecam_core::detection::domain::detection_params::DetectionParams;
use facecam_core::shared::constants::{
    DEFAULT_CAMERA_INDEX, DEFAULT_MIN_FACE_RATIO, DEFAULT_MIN_NEIGHBORS, DEFAULT_SCALE_FACTOR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    System,
    Dark,
    Light,
}

impl Appearance {
    pub const ALL: &[Appearance] = &[Appearance::System, Appearance::Dark, Appearance::Light];
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Appearance::System => write!(f, "System"),
            Appearance::Dark => write!(f, "Dark"),
            Appearance::Light => write!(f, "Light"),
        }
    }
}

/// Persisted form of the last loaded classifier, e.g.
/// `{"kind": "custom", "path": "/data/profile.xml"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SavedClassifier {
    Haar,
    Lbp,
    Custom { path: PathBuf },
}

impl From<&ClassifierKind> for SavedClassifier {
    fn from(kind: &ClassifierKind) -> Self {
        match kind {
            ClassifierKind::Haar => SavedClassifier::Haar,
            ClassifierKind::Lbp => SavedClassifier::Lbp,
            ClassifierKind::Custom(path) => SavedClassifier::Custom { path: path.clone() },
        }
    }
}

impl From<SavedClassifier> for ClassifierKind {
    fn from(saved: SavedClassifier) -> Self {
        match saved {
            SavedClassifier::Haar => ClassifierKind::Haar,
            SavedClassifier::Lbp => ClassifierKind::Lbp,
            SavedClassifier::Custom { path } => ClassifierKind::Custom(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub camera_index: u32,
    #[serde(default)]
    pub classifier: Option<SavedClassifier>,
    pub scale_factor: f64,
    pub min_neighbors: u32,
    /// Minimum face size as a percentage of the frame height.
    pub min_face_percent: u32,
    pub appearance: Appearance,
    pub high_contrast: bool,
    pub font_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_index: DEFAULT_CAMERA_INDEX as u32,
            classifier: None,
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS as u32,
            min_face_percent: (DEFAULT_MIN_FACE_RATIO * 100.0).round() as u32,
            appearance: Appearance::System,
            high_contrast: false,
            font_scale: 1.0,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceCam").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            self.save_to(&path);
        }
    }

    /// Reads settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    log::warn!("Failed to save settings to {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("Failed to serialize settings: {e}"),
        }
    }

    pub fn detection_params(&self) -> DetectionParams {
        DetectionParams {
            scale_factor: self.scale_factor,
            min_neighbors: self.min_neighbors as i32,
            min_face_ratio: self.min_face_percent as f32 / 100.0,
            max_face_size: None,
        }
    }

    pub fn restore_detection_defaults(&mut self) {
        let defaults = Settings::default();
        self.camera_index = defaults.camera_index;
        self.scale_factor = defaults.scale_factor;
        self.min_neighbors = defaults.min_neighbors;
        self.min_face_percent = defaults.min_face_percent;
    }

    pub fn classifier_kind(&self) -> Option<ClassifierKind> {
        self.classifier.clone().map(ClassifierKind::from)
    }

    /// Remembers `kind` for the next launch. JSON cannot hold a non-UTF-8
    /// path, so such a custom cascade is not remembered.
    pub fn set_classifier_kind(&mut self, kind: &ClassifierKind) {
        if let ClassifierKind::Custom(path) = kind {
            if path.to_str().is_none() {
                log::warn!(
                    "Not remembering custom cascade {}: path is not valid UTF-8",
                    path.display()
                );
                self.classifier = None;
                return;
            }
        }
        self.classifier = Some(SavedClassifier::from(kind));
    }
}
