use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::capture::domain::frame_source::FrameSource;
use crate::detection::domain::classifier_kind::ClassifierKind;
use crate::detection::domain::detection_params::{DetectionParams, ParamsError};
use crate::detection::domain::face_detector::FaceDetector;
use crate::overlay::infrastructure::box_annotator::BoxAnnotator;
use crate::pipeline::detect_faces_use_case::{DetectFacesUseCase, DetectionResult};
use crate::pipeline::frame_grabber::{FrameGrabber, GrabberMessage, SharedUseCase};
use crate::shared::constants::{CAMERA_RELEASE_TIMEOUT, FRAME_INTERVAL};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no classifier selected")]
    NoClassifier,
    #[error("cannot change the classifier while the camera is running")]
    Busy,
    #[error("failed to load classifier {path}: {message}")]
    ClassifierLoad { path: PathBuf, message: String },
    #[error("Failed to open the camera connection: {0}")]
    CameraUnavailable(String),
    #[error("the previous camera connection is still closing")]
    CameraClosing,
    #[error(transparent)]
    Params(#[from] ParamsError),
}

/// Builds a fresh, unopened frame source each time the camera starts.
pub type SourceFactory = Box<dyn FnMut() -> Box<dyn FrameSource> + Send>;

/// Loads a cascade file into a detector.
pub type DetectorLoader = Box<
    dyn FnMut(&Path, &DetectionParams) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>>
        + Send,
>;

/// Start/stop controller behind the camera view.
///
/// Holds at most one selected classifier. The camera can only start once a
/// classifier has loaded, and the classifier cannot change while the camera
/// runs. All transitions happen on the caller's thread; only frame grabbing
/// runs in the background.
///
/// A grabber that did not stop in time is kept in `closing` until its thread
/// has released the camera; the next start waits for that before opening a
/// new connection.
pub struct CameraSession {
    open_source: SourceFactory,
    load_detector: DetectorLoader,
    params: DetectionParams,
    interval: Duration,
    release_timeout: Duration,
    selected: Option<ClassifierKind>,
    cascade_path: Option<PathBuf>,
    use_case: Option<SharedUseCase>,
    grabber: Option<FrameGrabber>,
    closing: Option<FrameGrabber>,
    last_frame: Option<DetectionResult>,
}

impl CameraSession {
    pub fn new(open_source: SourceFactory, load_detector: DetectorLoader) -> Self {
        Self {
            open_source,
            load_detector,
            params: DetectionParams::default(),
            interval: FRAME_INTERVAL,
            release_timeout: CAMERA_RELEASE_TIMEOUT,
            selected: None,
            cascade_path: None,
            use_case: None,
            grabber: None,
            closing: None,
            last_frame: None,
        }
    }

    pub fn with_params(mut self, params: DetectionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// How long a start waits for a previous connection to close.
    pub fn with_release_timeout(mut self, timeout: Duration) -> Self {
        self.release_timeout = timeout;
        self
    }

    /// Loads `path` as the active classifier, replacing any previous one.
    ///
    /// On failure nothing stays selected and the camera cannot start.
    pub fn select_classifier(&mut self, kind: ClassifierKind, path: &Path) -> Result<(), SessionError> {
        if self.is_running() {
            return Err(SessionError::Busy);
        }

        self.selected = None;
        self.cascade_path = None;
        self.use_case = None;

        let detector = (self.load_detector)(path, &self.params).map_err(|e| {
            log::error!("Failed to load classifier {}: {e}", path.display());
            SessionError::ClassifierLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        log::info!("Selected {kind} ({})", path.display());
        self.use_case = Some(Arc::new(Mutex::new(DetectFacesUseCase::new(
            detector,
            Box::new(BoxAnnotator::default()),
        ))));
        self.selected = Some(kind);
        self.cascade_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Reloads the selected classifier, picking up the current parameters.
    pub fn reload(&mut self) -> Result<(), SessionError> {
        let kind = self.selected.clone().ok_or(SessionError::NoClassifier)?;
        let path = self.cascade_path.clone().ok_or(SessionError::NoClassifier)?;
        self.select_classifier(kind, &path)
    }

    /// Replaces the detection parameters and hands them to the loaded
    /// detector. Unchanged parameters are a no-op.
    pub fn set_params(&mut self, params: DetectionParams) -> Result<(), SessionError> {
        params.validate()?;
        if params == self.params {
            return Ok(());
        }
        if self.is_running() {
            return Err(SessionError::Busy);
        }
        self.params = params;

        let Some(use_case) = self.use_case.clone() else {
            return Ok(());
        };
        let applied = match use_case.lock() {
            Ok(mut pipeline) => {
                pipeline.set_params(&self.params);
                true
            }
            Err(_) => false,
        };
        if !applied {
            log::warn!("Detection pipeline lock poisoned; reloading the classifier");
            self.reload()?;
        }
        Ok(())
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }

    /// Opens the camera and starts grabbing. A no-op when already running.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.is_running() {
            return Ok(());
        }
        let use_case = self.use_case.clone().ok_or(SessionError::NoClassifier)?;
        self.finish_closing()?;

        let mut source = (self.open_source)();
        if let Err(e) = source.open() {
            log::error!("Failed to open the camera connection: {e}");
            return Err(SessionError::CameraUnavailable(e.to_string()));
        }

        self.grabber = Some(FrameGrabber::spawn(source, use_case, self.interval));
        log::info!("Camera started");
        Ok(())
    }

    /// Stops grabbing and clears the displayed frame.
    pub fn stop(&mut self) {
        if let Some(mut grabber) = self.grabber.take() {
            if !grabber.stop() {
                self.closing = Some(grabber);
            }
            log::info!("Camera stopped");
        }
        self.last_frame = None;
    }

    /// Waits for a grabber that outlived its stop to release the camera.
    fn finish_closing(&mut self) -> Result<(), SessionError> {
        let Some(mut grabber) = self.closing.take() else {
            return Ok(());
        };
        if grabber.wait(self.release_timeout) {
            return Ok(());
        }
        log::warn!(
            "Previous camera connection still open after {:?}",
            self.release_timeout
        );
        self.closing = Some(grabber);
        Err(SessionError::CameraClosing)
    }

    pub fn toggle(&mut self) -> Result<(), SessionError> {
        if self.is_running() {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }

    /// Takes the newest published result, if any, and returns what should
    /// be on screen.
    pub fn poll(&mut self) -> Option<&DetectionResult> {
        if let Some(grabber) = &self.grabber {
            match grabber.latest() {
                Some(GrabberMessage::Frame(result)) => self.last_frame = Some(result),
                Some(GrabberMessage::Empty) => self.last_frame = None,
                None => {}
            }
        }
        self.last_frame.as_ref()
    }

    pub fn last_frame(&self) -> Option<&DetectionResult> {
        self.last_frame.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.grabber.is_some()
    }

    pub fn can_start(&self) -> bool {
        self.use_case.is_some()
    }

    pub fn can_change_classifier(&self) -> bool {
        !self.is_running()
    }

    pub fn selected(&self) -> Option<&ClassifierKind> {
        self.selected.as_ref()
    }

    pub fn cascade_path(&self) -> Option<&Path> {
        self.cascade_path.as_deref()
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
        if let Some(mut grabber) = self.closing.take() {
            grabber.wait(self.release_timeout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::face_rect::FaceRect;
    use crate::shared::frame::Frame;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const TEST_INTERVAL: Duration = Duration::from_millis(5);

    // --- Stubs ---

    struct StubCamera {
        opens: bool,
        opened: bool,
        counters: Counters,
    }

    impl FrameSource for StubCamera {
        fn open(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            if !self.opens {
                return Err("no such device".into());
            }
            self.opened = true;
            let open_now = self.counters.open_now.fetch_add(1, Ordering::SeqCst) + 1;
            self.counters.max_open.fetch_max(open_now, Ordering::SeqCst);
            Ok(())
        }

        fn is_opened(&self) -> bool {
            self.opened
        }

        fn grab(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
            Ok(Some(Frame::new(vec![0; 20 * 20 * 3], 20, 20, 3, 0)))
        }

        fn release(&mut self) {
            if self.opened {
                self.counters.open_now.fetch_sub(1, Ordering::SeqCst);
            }
            self.opened = false;
            self.counters.released.store(true, Ordering::SeqCst);
        }
    }

    struct StubDetector {
        delay: Duration,
        applied: Arc<Mutex<Vec<DetectionParams>>>,
    }

    impl FaceDetector for StubDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<FaceRect>, Box<dyn std::error::Error>> {
            std::thread::sleep(self.delay);
            Ok(vec![FaceRect::new(2, 2, 5, 5)])
        }

        fn set_params(&mut self, params: &DetectionParams) {
            self.applied.lock().unwrap().push(*params);
        }
    }

    // --- Helpers ---

    #[derive(Clone, Default)]
    struct Counters {
        loads: Arc<AtomicUsize>,
        released: Arc<AtomicBool>,
        open_now: Arc<AtomicUsize>,
        max_open: Arc<AtomicUsize>,
        applied: Arc<Mutex<Vec<DetectionParams>>>,
    }

    fn session(camera_opens: bool) -> (CameraSession, Counters) {
        session_with(camera_opens, Duration::ZERO)
    }

    /// Session whose loader rejects any path containing "broken" and whose
    /// detector takes `detect_delay` per frame.
    fn session_with(camera_opens: bool, detect_delay: Duration) -> (CameraSession, Counters) {
        let counters = Counters::default();

        let for_factory = counters.clone();
        let open_source: SourceFactory = Box::new(move || {
            Box::new(StubCamera {
                opens: camera_opens,
                opened: false,
                counters: for_factory.clone(),
            }) as Box<dyn FrameSource>
        });

        let for_loader = counters.clone();
        let load_detector: DetectorLoader = Box::new(move |path, _params| {
            for_loader.loads.fetch_add(1, Ordering::SeqCst);
            if path.to_string_lossy().contains("broken") {
                Err("not a cascade".into())
            } else {
                Ok(Box::new(StubDetector {
                    delay: detect_delay,
                    applied: for_loader.applied.clone(),
                }) as Box<dyn FaceDetector>)
            }
        });

        let session = CameraSession::new(open_source, load_detector).with_interval(TEST_INTERVAL);
        (session, counters)
    }

    fn poll_until_frame(session: &mut CameraSession) -> DetectionResult {
        for _ in 0..400 {
            if let Some(result) = session.poll() {
                return result.clone();
            }
            std::thread::sleep(TEST_INTERVAL);
        }
        panic!("no frame published");
    }

    // --- Tests ---

    #[test]
    fn test_initial_state() {
        let (session, _) = session(true);
        assert!(!session.is_running());
        assert!(!session.can_start());
        assert!(session.can_change_classifier());
        assert!(session.selected().is_none());
        assert!(session.last_frame().is_none());
    }

    #[test]
    fn test_start_without_classifier_is_refused() {
        let (mut session, _) = session(true);
        assert!(matches!(session.start(), Err(SessionError::NoClassifier)));
        assert!(!session.is_running());
    }

    #[test]
    fn test_selecting_classifier_enables_start() {
        let (mut session, counters) = session(true);
        session
            .select_classifier(ClassifierKind::Haar, Path::new("haar.xml"))
            .unwrap();

        assert!(session.can_start());
        assert_eq!(session.selected(), Some(&ClassifierKind::Haar));
        assert_eq!(session.cascade_path(), Some(Path::new("haar.xml")));
        assert_eq!(counters.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_selection_is_exclusive() {
        let (mut session, _) = session(true);
        session
            .select_classifier(ClassifierKind::Haar, Path::new("haar.xml"))
            .unwrap();
        session
            .select_classifier(ClassifierKind::Lbp, Path::new("lbp.xml"))
            .unwrap();
        assert_eq!(session.selected(), Some(&ClassifierKind::Lbp));
    }

    #[test]
    fn test_failed_load_leaves_start_disabled() {
        let (mut session, _) = session(true);
        session
            .select_classifier(ClassifierKind::Haar, Path::new("haar.xml"))
            .unwrap();

        let err = session
            .select_classifier(ClassifierKind::Lbp, Path::new("broken.xml"))
            .unwrap_err();

        assert!(matches!(err, SessionError::ClassifierLoad { .. }));
        assert!(!session.can_start());
        assert!(session.selected().is_none());
    }

    #[test]
    fn test_start_poll_stop() {
        let (mut session, counters) = session(true);
        session
            .select_classifier(ClassifierKind::Haar, Path::new("haar.xml"))
            .unwrap();

        session.start().unwrap();
        assert!(session.is_running());
        assert!(!session.can_change_classifier());

        let result = poll_until_frame(&mut session);
        assert_eq!(result.faces, vec![FaceRect::new(2, 2, 5, 5)]);

        session.stop();
        assert!(!session.is_running());
        assert!(session.last_frame().is_none());
        assert!(counters.released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_classifier_cannot_change_while_running() {
        let (mut session, counters) = session(true);
        session
            .select_classifier(ClassifierKind::Haar, Path::new("haar.xml"))
            .unwrap();
        session.start().unwrap();

        let err = session
            .select_classifier(ClassifierKind::Lbp, Path::new("lbp.xml"))
            .unwrap_err();

        assert!(matches!(err, SessionError::Busy));
        assert_eq!(session.selected(), Some(&ClassifierKind::Haar));
        assert_eq!(counters.loads.load(Ordering::SeqCst), 1);
        session.stop();
    }

    #[test]
    fn test_camera_open_failure_stays_idle() {
        let (mut session, _) = session(false);
        session
            .select_classifier(ClassifierKind::Haar, Path::new("haar.xml"))
            .unwrap();

        let err = session.start().unwrap_err();
        assert!(matches!(err, SessionError::CameraUnavailable(_)));
        assert!(!session.is_running());
        assert!(session.can_start());
    }

    #[test]
    fn test_toggle_alternates() {
        let (mut session, _) = session(true);
        session
            .select_classifier(ClassifierKind::Haar, Path::new("haar.xml"))
            .unwrap();

        session.toggle().unwrap();
        assert!(session.is_running());
        session.toggle().unwrap();
        assert!(!session.is_running());
        session.toggle().unwrap();
        assert!(session.is_running());
    }

    #[test]
    fn test_start_twice_keeps_single_grabber() {
        let (mut session, _) = session(true);
        session
            .select_classifier(ClassifierKind::Haar, Path::new("haar.xml"))
            .unwrap();
        session.start().unwrap();
        session.start().unwrap();
        assert!(session.is_running());
        session.stop();
        assert!(!session.is_running());
    }

    #[test]
    fn test_set_params_retunes_loaded_detector_without_reloading() {
        let (mut session, counters) = session(true);
        session
            .select_classifier(ClassifierKind::Lbp, Path::new("lbp.xml"))
            .unwrap();

        let params = DetectionParams {
            min_neighbors: 5,
            ..Default::default()
        };
        session.set_params(params).unwrap();

        assert_eq!(session.params().min_neighbors, 5);
        assert_eq!(counters.loads.load(Ordering::SeqCst), 1);
        assert_eq!(*counters.applied.lock().unwrap(), vec![params]);
        assert_eq!(session.selected(), Some(&ClassifierKind::Lbp));
    }

    #[test]
    fn test_unchanged_params_are_a_noop() {
        let (mut session, counters) = session(true);
        session
            .select_classifier(ClassifierKind::Haar, Path::new("haar.xml"))
            .unwrap();

        session.set_params(DetectionParams::default()).unwrap();
        session.set_params(DetectionParams::default()).unwrap();

        assert_eq!(counters.loads.load(Ordering::SeqCst), 1);
        assert!(counters.applied.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unchanged_params_accepted_while_running() {
        let (mut session, _) = session(true);
        session
            .select_classifier(ClassifierKind::Haar, Path::new("haar.xml"))
            .unwrap();
        session.start().unwrap();

        assert!(session.set_params(DetectionParams::default()).is_ok());
        let changed = DetectionParams {
            min_neighbors: 9,
            ..Default::default()
        };
        assert!(matches!(session.set_params(changed), Err(SessionError::Busy)));
        session.stop();
    }

    #[test]
    fn test_params_without_classifier_are_stored_for_next_load() {
        let (mut session, counters) = session(true);
        let params = DetectionParams {
            scale_factor: 1.3,
            ..Default::default()
        };
        session.set_params(params).unwrap();
        assert_eq!(*session.params(), params);
        assert_eq!(counters.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_restart_waits_for_previous_camera_to_close() {
        let (mut session, counters) = session_with(true, Duration::from_millis(80));
        session
            .select_classifier(ClassifierKind::Haar, Path::new("haar.xml"))
            .unwrap();

        session.start().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        session.stop();
        assert!(!session.is_running());

        session.start().unwrap();
        assert!(session.is_running());
        assert_eq!(counters.max_open.load(Ordering::SeqCst), 1);
        session.stop();
    }

    #[test]
    fn test_restart_refused_while_previous_camera_is_closing() {
        let (session, counters) = session_with(true, Duration::from_millis(300));
        let mut session = session.with_release_timeout(Duration::from_millis(20));
        session
            .select_classifier(ClassifierKind::Haar, Path::new("haar.xml"))
            .unwrap();

        session.start().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        session.stop();

        assert!(matches!(session.start(), Err(SessionError::CameraClosing)));
        assert!(!session.is_running());
        assert_eq!(counters.open_now.load(Ordering::SeqCst), 1);

        std::thread::sleep(Duration::from_millis(400));
        session.start().unwrap();
        assert_eq!(counters.max_open.load(Ordering::SeqCst), 1);
        session.stop();
    }

    #[test]
    fn test_set_params_rejects_invalid() {
        let (mut session, _) = session(true);
        let params = DetectionParams {
            scale_factor: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            session.set_params(params),
            Err(SessionError::Params(ParamsError::ScaleFactor(_)))
        ));
        assert_eq!(*session.params(), DetectionParams::default());
    }

    #[test]
    fn test_reload_without_selection() {
        let (mut session, _) = session(true);
        assert!(matches!(session.reload(), Err(SessionError::NoClassifier)));
    }
}
