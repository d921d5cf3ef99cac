mod mjpeg;
mod routes;

use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use clap::Parser;

use facecam_core::capture::infrastructure::ffmpeg_camera::{CameraOptions, FfmpegCameraOpener};
use facecam_core::detection::infrastructure::blob_params::BlobParams;
use facecam_core::detection::infrastructure::onnx_ssd_detector::OnnxSsdDetector;
use facecam_core::identity::domain::gallery::Gallery;
use facecam_core::identity::domain::identity_matcher::{IdentityMatcher, MatchPolicy};
use facecam_core::identity::infrastructure::average_hasher::AverageHasher;
use facecam_core::identity::infrastructure::gallery_manifest::GalleryManifest;
use facecam_core::pipeline::build_gallery_use_case::BuildGalleryUseCase;
use facecam_core::pipeline::face_locator::FaceLocator;
use facecam_core::pipeline::frame_pipeline::FramePipeline;
use facecam_core::session::capture_session::SessionServices;
use facecam_core::session::session_registry::SessionRegistry;
use facecam_core::shared::constants::DEFAULT_JPEG_QUALITY;
use facecam_core::video::domain::frame_encoder::FrameEncoder;
use facecam_core::video::infrastructure::image_file_reader::ImageFileReader;
use facecam_core::video::infrastructure::jpeg_encoder::JpegFrameEncoder;

use crate::routes::AppState;

/// How long shutdown waits for each still-capturing device to close.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Streams webcams over HTTP as MJPEG, boxing faces and naming the ones it knows.
#[derive(Parser)]
#[command(name = "facecam")]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(long, default_value = "8080")]
    port: u16,

    /// SSD face detector in ONNX format (N x 7 detection output).
    #[arg(long)]
    model: PathBuf,

    /// JSON file with the detector's input size, scale, mean and channel order.
    #[arg(long)]
    model_config: Option<PathBuf>,

    /// JSON object mapping names to reference photos.
    #[arg(long)]
    gallery: Option<PathBuf>,

    /// Which known face wins when several match: first or best.
    #[arg(long, default_value = "first")]
    match_policy: String,

    /// JPEG quality of streamed frames (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    jpeg_quality: u8,

    /// libavdevice input format (v4l2, avfoundation, dshow). Defaults per platform.
    #[arg(long)]
    camera_format: Option<String>,

    /// Requested camera frame rate.
    #[arg(long)]
    framerate: Option<u32>,

    /// Requested camera resolution, e.g. 640x480.
    #[arg(long)]
    video_size: Option<String>,

    /// HTTP worker threads (defaults to the number of CPUs).
    #[arg(long)]
    workers: Option<usize>,
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

    let params = BlobParams::resolve(&cli.model, cli.model_config.as_deref())?;
    let detector = OnnxSsdDetector::new(&cli.model, params)?;
    let mut locator = FaceLocator::new(Box::new(detector));

    let gallery = build_gallery(&cli, &mut locator)?;
    let matcher = IdentityMatcher::new(
        gallery,
        Box::new(AverageHasher::new()),
        parse_match_policy(&cli.match_policy),
    );
    let pipeline = FramePipeline::new(locator, matcher);

    let encoder = JpegFrameEncoder::new(cli.jpeg_quality);
    let part_content_type = encoder.content_type();
    let opener = FfmpegCameraOpener::new(CameraOptions {
        format: cli.camera_format.clone(),
        framerate: cli.framerate,
        video_size: cli.video_size.clone(),
    });

    let state = web::Data::new(AppState {
        registry: SessionRegistry::new(SessionServices {
            opener: Arc::new(opener),
            processor: Arc::new(Mutex::new(pipeline)),
            encoder: Arc::new(encoder),
        }),
        part_content_type,
    });

    let shutdown_state = state.clone();
    log::info!("Listening on {}:{}", cli.bind, cli.port);
    actix_web::rt::System::new().block_on(async move {
        let mut server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .configure(routes::configure)
        });
        if let Some(workers) = cli.workers {
            server = server.workers(workers);
        }
        server.bind((cli.bind.as_str(), cli.port))?.run().await
    })?;
    close_devices(&shutdown_state.registry);
    log::info!("Server stopped");
    Ok(())
}

fn close_devices(registry: &SessionRegistry) {
    let active = registry.active_devices();
    if active.is_empty() {
        return;
    }
    log::info!("Waiting for devices {active:?} to close");
    for device_id in active {
        if !registry.session(device_id).wait_until_idle(SHUTDOWN_GRACE) {
            log::warn!("Device {device_id} still capturing at shutdown");
        }
    }
}

fn build_gallery(
    cli: &Cli,
    locator: &mut FaceLocator,
) -> Result<Gallery, Box<dyn std::error::Error>> {
    let Some(path) = &cli.gallery else {
        log::warn!("No gallery given; faces will be boxed but never named");
        return Ok(Gallery::default());
    };
    let manifest = GalleryManifest::load(path)?;
    let use_case = BuildGalleryUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(AverageHasher::new()),
    );
    Ok(use_case.execute(&manifest, locator))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.model.exists() {
        return Err(format!("Model file not found: {}", cli.model.display()).into());
    }
    if cli.match_policy != "first" && cli.match_policy != "best" {
        return Err(format!(
            "Match policy must be 'first' or 'best', got '{}'",
            cli.match_policy
        )
        .into());
    }
    if !(1..=100).contains(&cli.jpeg_quality) {
        return Err(format!(
            "JPEG quality must be between 1 and 100, got {}",
            cli.jpeg_quality
        )
        .into());
    }
    if let Some(size) = &cli.video_size {
        if !is_video_size(size) {
            return Err(format!("Video size must look like 640x480, got '{size}'").into());
        }
    }
    if cli.workers == Some(0) {
        return Err("Workers must be at least 1".into());
    }
    Ok(())
}

fn parse_match_policy(policy: &str) -> MatchPolicy {
    if policy == "best" {
        MatchPolicy::BestSimilarity
    } else {
        MatchPolicy::FirstAboveThreshold
    }
}

fn is_video_size(size: &str) -> bool {
    let positive = |v: &str| v.parse::<u32>().is_ok_and(|v| v > 0);
    size.split_once('x')
        .is_some_and(|(w, h)| positive(w) && positive(h))
}
