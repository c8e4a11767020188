use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use iced::widget::{button, column, container, image, row, scrollable, text};
use iced::{Element, Length, Subscription, Task, Theme};

use facecam_core::capture::domain::frame_source::FrameSource;
use facecam_core::capture::infrastructure::opencv_camera::OpenCvCamera;
use facecam_core::detection::domain::classifier_kind::ClassifierKind;
use facecam_core::detection::domain::detection_params::DetectionParams;
use facecam_core::detection::domain::face_detector::FaceDetector;
use facecam_core::detection::infrastructure::cascade_detector::CascadeFaceDetector;
use facecam_core::session::camera_session::CameraSession;
use facecam_core::shared::constants::FRAME_INTERVAL;
use facecam_core::shared::pixel_format::frame_to_rgba;

use crate::settings::{Appearance, Settings};
use crate::tabs;
use crate::tabs::camera_tab::CameraView;
use crate::theme;
use crate::workers::classifier_loader::{self, LoaderMessage};

const CASCADE_DOCS_URL: &str = "https://docs.opencv.org/4.x/db/d28/tutorial_cascade_classifier.html";

// ---------------------------------------------------------------------------
// Tab enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Camera,
    Settings,
    Appearance,
    About,
}

impl Tab {
    const ALL: &[Tab] = &[Tab::Camera, Tab::Settings, Tab::Appearance, Tab::About];

    fn label(self) -> &'static str {
        match self {
            Tab::Camera => "Camera",
            Tab::Settings => "Settings",
            Tab::Appearance => "Appearance",
            Tab::About => "About",
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    ToggleCamera,
    HaarToggled(bool),
    LbpToggled(bool),
    PickCustomCascade,
    CustomCascadePicked(Option<PathBuf>),
    Tick,
    CameraIndexChanged(u32),
    ScaleFactorChanged(f64),
    MinNeighborsChanged(u32),
    MinFacePercentChanged(u32),
    RestoreDefaults,
    AppearanceChanged(Appearance),
    HighContrastChanged(bool),
    FontScaleChanged(f32),
    PollSystemTheme,
    OpenDocs,
    ToggleHovered(bool),
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// A cascade being resolved on the loader thread.
pub struct PendingLoad {
    pub kind: ClassifierKind,
    rx: Receiver<LoaderMessage>,
    pub progress: Option<(u64, u64)>,
}

pub struct App {
    active_tab: Tab,
    pub settings: Settings,
    session: CameraSession,
    camera_index: Arc<AtomicU32>,
    pending: Option<PendingLoad>,
    frame: Option<image::Handle>,
    frame_sequence: Option<usize>,
    face_count: usize,
    status: Option<String>,
    toggle_hovered: bool,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let camera_index = Arc::new(AtomicU32::new(settings.camera_index));
        let session = build_session(camera_index.clone(), startup_params(&settings));

        let mut app = Self {
            active_tab: Tab::Camera,
            session,
            camera_index,
            pending: None,
            frame: None,
            frame_sequence: None,
            face_count: 0,
            status: None,
            toggle_hovered: false,
            settings,
        };
        if let Some(kind) = app.settings.classifier_kind() {
            app.load_classifier(kind);
        }
        (app, Task::none())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
            }
            Message::ToggleCamera => {
                match self.session.toggle() {
                    Ok(()) => self.status = None,
                    Err(e) => self.status = Some(e.to_string()),
                }
                if !self.session.is_running() {
                    self.clear_frame();
                    self.apply_params();
                }
            }
            Message::HaarToggled(checked) => {
                // Unchecking the active box does nothing; the other box is the way out.
                if checked {
                    self.load_classifier(ClassifierKind::Haar);
                }
            }
            Message::LbpToggled(checked) => {
                if checked {
                    self.load_classifier(ClassifierKind::Lbp);
                }
            }
            Message::PickCustomCascade => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Select cascade classifier")
                            .add_filter("Cascade Files", &["xml"])
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::CustomCascadePicked,
                );
            }
            Message::CustomCascadePicked(Some(path)) => {
                self.load_classifier(ClassifierKind::Custom(path));
            }
            Message::CustomCascadePicked(None) => {}
            Message::Tick => {
                self.poll_loader();
                self.poll_frame();
            }
            Message::CameraIndexChanged(index) => {
                self.settings.camera_index = index;
                self.camera_index.store(index, Ordering::Relaxed);
                self.settings.save();
            }
            Message::ScaleFactorChanged(val) => {
                self.settings.scale_factor = val;
                self.settings.save();
                self.apply_params();
            }
            Message::MinNeighborsChanged(val) => {
                self.settings.min_neighbors = val;
                self.settings.save();
                self.apply_params();
            }
            Message::MinFacePercentChanged(val) => {
                self.settings.min_face_percent = val;
                self.settings.save();
                self.apply_params();
            }
            Message::RestoreDefaults => {
                self.settings.restore_detection_defaults();
                self.camera_index
                    .store(self.settings.camera_index, Ordering::Relaxed);
                self.settings.save();
                self.apply_params();
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::HighContrastChanged(enabled) => {
                self.settings.high_contrast = enabled;
                self.settings.save();
            }
            Message::FontScaleChanged(scale) => {
                self.settings.font_scale = scale;
                self.settings.save();
            }
            Message::PollSystemTheme => {
                // Theme is resolved fresh in theme() on every render.
            }
            Message::OpenDocs => {
                if let Err(e) = open::that(CASCADE_DOCS_URL) {
                    log::warn!("Failed to open {CASCADE_DOCS_URL}: {e}");
                }
            }
            Message::ToggleHovered(hovered) => {
                self.toggle_hovered = hovered;
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let fs = self.settings.font_scale;

        let tab_bar = row(Tab::ALL
            .iter()
            .map(|&tab| {
                let label = text(tab.label()).size(scaled(13.0, fs));
                let btn = button(label)
                    .on_press(Message::TabSelected(tab))
                    .padding([6, 14]);
                if tab == self.active_tab {
                    btn.style(button::primary).into()
                } else {
                    btn.style(button::text).into()
                }
            })
            .collect::<Vec<_>>())
        .spacing(2);

        let content: Element<'_, Message> = match self.active_tab {
            Tab::Camera => tabs::camera_tab::view(CameraView {
                fs,
                frame: self.frame.as_ref(),
                face_count: self.face_count,
                running: self.session.is_running(),
                can_start: self.session.can_start(),
                can_change_classifier: self.session.can_change_classifier()
                    && self.pending.is_none(),
                selected: self.session.selected(),
                pending: self.pending.as_ref(),
                status: self.status.as_deref(),
                toggle_hovered: self.toggle_hovered,
            }),
            Tab::Settings => tabs::settings_tab::view(&self.settings, self.session.is_running()),
            Tab::Appearance => tabs::appearance_tab::view(&self.settings),
            Tab::About => tabs::about_tab::view(fs),
        };

        let tab_content = container(scrollable(content).height(Length::Fill))
            .padding(16)
            .height(Length::Fill);

        column![tab_bar, tab_content]
            .spacing(0)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance, self.settings.high_contrast)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let ticks = if self.session.is_running() || self.pending.is_some() {
            iced::time::every(FRAME_INTERVAL).map(|_| Message::Tick)
        } else {
            Subscription::none()
        };
        let theme_poll = if self.settings.appearance == Appearance::System {
            iced::time::every(Duration::from_secs(2)).map(|_| Message::PollSystemTheme)
        } else {
            Subscription::none()
        };
        Subscription::batch([ticks, theme_poll])
    }

    fn load_classifier(&mut self, kind: ClassifierKind) {
        if !self.session.can_change_classifier() {
            return;
        }
        if self.pending.as_ref().is_some_and(|p| p.kind == kind) {
            return;
        }
        self.status = Some(format!("Loading {kind}\u{2026}"));
        self.pending = Some(PendingLoad {
            rx: classifier_loader::spawn(kind.clone()),
            kind,
            progress: None,
        });
    }

    fn poll_loader(&mut self) {
        let Some(pending) = &mut self.pending else {
            return;
        };

        let mut outcome = None;
        for msg in pending.rx.try_iter() {
            match msg {
                LoaderMessage::DownloadProgress(downloaded, total) => {
                    pending.progress = Some((downloaded, total));
                }
                LoaderMessage::Resolved(path) => outcome = Some(Ok(path)),
                LoaderMessage::Error(e) => outcome = Some(Err(e)),
            }
        }

        let Some(outcome) = outcome else {
            return;
        };
        let Some(PendingLoad { kind, .. }) = self.pending.take() else {
            return;
        };

        self.status = match outcome {
            Ok(path) => match self.session.select_classifier(kind.clone(), &path) {
                Ok(()) => {
                    self.settings.set_classifier_kind(&kind);
                    self.settings.save();
                    None
                }
                Err(e) => Some(e.to_string()),
            },
            Err(e) => Some(format!("Could not load {kind}: {e}")),
        };
    }

    fn poll_frame(&mut self) {
        if !self.session.is_running() {
            return;
        }
        match self.session.poll() {
            Some(result) => {
                let sequence = result.frame.sequence();
                if self.frame_sequence != Some(sequence) {
                    let frame = &result.frame;
                    self.frame = frame_to_rgba(frame).map(|rgba| {
                        image::Handle::from_rgba(frame.width(), frame.height(), rgba)
                    });
                    self.frame_sequence = Some(sequence);
                    self.face_count = result.faces.len();
                }
            }
            None => self.clear_frame(),
        }
    }

    fn clear_frame(&mut self) {
        self.frame = None;
        self.frame_sequence = None;
        self.face_count = 0;
    }

    /// Pushes the detection settings into the session. Applied when the
    /// camera is idle; otherwise picked up the next time it stops.
    fn apply_params(&mut self) {
        if self.session.is_running() {
            return;
        }
        if let Err(e) = self.session.set_params(self.settings.detection_params()) {
            self.status = Some(e.to_string());
        }
    }
}

fn startup_params(settings: &Settings) -> DetectionParams {
    let params = settings.detection_params();
    match params.validate() {
        Ok(()) => params,
        Err(e) => {
            log::warn!("Ignoring saved detection settings: {e}");
            DetectionParams::default()
        }
    }
}

fn build_session(camera_index: Arc<AtomicU32>, params: DetectionParams) -> CameraSession {
    CameraSession::new(
        Box::new(move || {
            let index = camera_index.load(Ordering::Relaxed) as i32;
            Box::new(OpenCvCamera::new(index)) as Box<dyn FrameSource>
        }),
        Box::new(|path, params| {
            CascadeFaceDetector::load(path, *params)
                .map(|detector| Box::new(detector) as Box<dyn FaceDetector>)
                .map_err(Into::into)
        }),
    )
    .with_params(params)
}

/// Scale a base font size by the user's font_scale setting.
pub fn scaled(base: f32, font_scale: f32) -> f32 {
    (base * font_scale).round()
}
