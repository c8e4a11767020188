use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;

use facecam_core::capture::domain::frame_source::FrameSource;
use facecam_core::capture::domain::image_writer::ImageWriter;
use facecam_core::capture::infrastructure::image_file_source::ImageFileSource;
use facecam_core::capture::infrastructure::image_file_writer::ImageFileWriter;
use facecam_core::capture::infrastructure::opencv_camera::OpenCvCamera;
use facecam_core::detection::domain::classifier_kind::ClassifierKind;
use facecam_core::detection::domain::detection_params::DetectionParams;
use facecam_core::detection::infrastructure::cascade_detector::CascadeFaceDetector;
use facecam_core::detection::infrastructure::classifier_resolver;
use facecam_core::overlay::infrastructure::box_annotator::BoxAnnotator;
use facecam_core::pipeline::annotate_image_use_case::AnnotateImageUseCase;
use facecam_core::pipeline::detect_faces_use_case::{DetectFacesUseCase, DetectionResult};
use facecam_core::pipeline::frame_grabber::{FrameGrabber, GrabberMessage};
use facecam_core::shared::constants::{
    DEFAULT_MIN_FACE_RATIO, DEFAULT_MIN_NEIGHBORS, DEFAULT_SCALE_FACTOR, FRAME_INTERVAL,
    IMAGE_EXTENSIONS,
};

/// How long camera mode waits for a frame before giving up.
const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Cascade face detection for camera streams and still images.
#[derive(Parser, Debug)]
#[command(name = "facecam")]
struct Cli {
    /// Input image (image mode).
    input: Option<PathBuf>,

    /// Annotated output image (image mode).
    output: Option<PathBuf>,

    /// Classifier: haar, lbp, or a path to a cascade XML file.
    #[arg(long, default_value = "haar")]
    classifier: String,

    /// Search window growth between scales (> 1.0).
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
    scale_factor: f64,

    /// Overlapping candidates required to keep a detection.
    #[arg(long, default_value_t = DEFAULT_MIN_NEIGHBORS)]
    min_neighbors: i32,

    /// Smallest face as a fraction of the frame height (0.0-1.0].
    #[arg(long, default_value_t = DEFAULT_MIN_FACE_RATIO)]
    min_face_ratio: f32,

    /// Camera device index (camera mode).
    #[arg(long)]
    camera: Option<i32>,

    /// Frames to process in camera mode.
    #[arg(long, default_value = "30")]
    frames: usize,
}

impl Cli {
    fn detection_params(&self) -> DetectionParams {
        DetectionParams {
            scale_factor: self.scale_factor,
            min_neighbors: self.min_neighbors,
            min_face_ratio: self.min_face_ratio,
            max_face_size: None,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let use_case = build_use_case(&cli)?;

    match (cli.camera, cli.input.as_deref(), cli.output.as_deref()) {
        (Some(index), _, _) => run_camera(index, cli.frames, use_case),
        (None, Some(input), Some(output)) => run_image(input, output, use_case),
        _ => Err("Either INPUT and OUTPUT or --camera is required".into()),
    }
}

fn run_image(
    input: &Path,
    output: &Path,
    detect: DetectFacesUseCase,
) -> Result<(), Box<dyn std::error::Error>> {
    let source: Box<dyn FrameSource> = Box::new(ImageFileSource::new(input));
    let image_writer: Box<dyn ImageWriter> = Box::new(ImageFileWriter::new());

    let mut use_case = AnnotateImageUseCase::new(source, image_writer, detect);
    let result = use_case.execute(output)?;
    print_faces(&result);
    log::info!("Output written to {}", output.display());
    Ok(())
}

fn run_camera(
    index: i32,
    frames: usize,
    detect: DetectFacesUseCase,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut camera = OpenCvCamera::new(index);
    if let Err(e) = camera.open() {
        log::error!("Failed to open the camera connection: {e}");
        return Err(e);
    }

    let mut grabber = FrameGrabber::spawn(
        Box::new(camera),
        Arc::new(Mutex::new(detect)),
        FRAME_INTERVAL,
    );

    let mut processed = 0;
    let mut empty = 0;
    while processed < frames {
        match grabber.next_timeout(FRAME_TIMEOUT) {
            Some(GrabberMessage::Frame(result)) => {
                print_faces(&result);
                processed += 1;
            }
            Some(GrabberMessage::Empty) => empty += 1,
            None => {
                grabber.stop();
                return Err(
                    format!("No frame from camera #{index} within {FRAME_TIMEOUT:?}").into(),
                );
            }
        }
    }
    grabber.stop();

    log::info!("Processed {processed} frames from camera #{index} ({empty} empty reads)");
    Ok(())
}

fn build_use_case(cli: &Cli) -> Result<DetectFacesUseCase, Box<dyn std::error::Error>> {
    let kind = ClassifierKind::parse(&cli.classifier);
    log::info!("Resolving classifier: {kind}");
    let cascade_path = classifier_resolver::resolve(&kind, Some(Box::new(download_progress)))?;

    let detector = CascadeFaceDetector::load(&cascade_path, cli.detection_params())?;
    Ok(DetectFacesUseCase::new(
        Box::new(detector),
        Box::new(BoxAnnotator::default()),
    ))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    cli.detection_params().validate()?;

    if cli.camera.is_some() {
        if cli.input.is_some() {
            return Err("--camera cannot be combined with INPUT/OUTPUT".into());
        }
        if cli.frames == 0 {
            return Err("--frames must be at least 1".into());
        }
        return Ok(());
    }

    let (Some(input), Some(output)) = (&cli.input, &cli.output) else {
        return Err("Either INPUT and OUTPUT or --camera is required".into());
    };
    if !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    if !is_image(output) {
        return Err(format!(
            "Output must be an image file ({}), got {}",
            IMAGE_EXTENSIONS.join(", "),
            output.display()
        )
        .into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn print_faces(result: &DetectionResult) {
    let faces: Vec<String> = result.faces.iter().map(ToString::to_string).collect();
    println!(
        "frame {}: {} face(s) {}",
        result.frame.sequence(),
        result.faces.len(),
        faces.join(" ")
    );
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading cascade classifier... {pct}%");
    } else {
        eprint!("\rDownloading cascade classifier... {downloaded} bytes");
    }
}
