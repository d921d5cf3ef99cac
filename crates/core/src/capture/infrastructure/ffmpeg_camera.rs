use crate::capture::domain::capture_device::{CaptureDevice, CaptureError, DeviceOpener};
use crate::shared::frame::Frame;

/// Platform camera input format used when none is configured.
pub fn default_format() -> &'static str {
    if cfg!(target_os = "macos") {
        "avfoundation"
    } else if cfg!(target_os = "windows") {
        "dshow"
    } else {
        "v4l2"
    }
}

/// The url libavdevice expects for camera `device_id` under `format`.
pub fn device_path(format: &str, device_id: u32) -> String {
    match format {
        "v4l2" | "video4linux2" => format!("/dev/video{device_id}"),
        "dshow" => format!("video={device_id}"),
        _ => device_id.to_string(),
    }
}

/// Capture options passed through to libavdevice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CameraOptions {
    /// Input format name; `None` picks [`default_format`].
    pub format: Option<String>,
    pub framerate: Option<u32>,
    /// `WIDTHxHEIGHT`, e.g. `640x480`.
    pub video_size: Option<String>,
}

/// Opens local cameras through libavdevice and decodes them to RGB24.
pub struct FfmpegCameraOpener {
    options: CameraOptions,
}

impl FfmpegCameraOpener {
    pub fn new(options: CameraOptions) -> Self {
        Self { options }
    }

    fn format_name(&self) -> &str {
        self.options.format.as_deref().unwrap_or_else(default_format)
    }
}

impl DeviceOpener for FfmpegCameraOpener {
    fn open(&self, device_id: u32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        let format_name = self.format_name();
        let device = device_path(format_name, device_id);
        let open_err = |e: ffmpeg_next::Error| CaptureError::Open {
            device: device.clone(),
            reason: e.to_string(),
        };

        ffmpeg_next::init().map_err(open_err)?;

        let format = ffmpeg_next::device::input::video()
            .find(|f| f.name() == format_name)
            .ok_or_else(|| CaptureError::UnsupportedFormat(format_name.to_string()))?;

        let mut options = ffmpeg_next::Dictionary::new();
        if let Some(fps) = self.options.framerate {
            options.set("framerate", &fps.to_string());
        }
        if let Some(size) = &self.options.video_size {
            options.set("video_size", size);
        }

        let input = ffmpeg_next::format::open_with(&device, &format, options)
            .map_err(open_err)?
            .input();

        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| CaptureError::NoVideoStream {
                device: device.clone(),
            })?;
        let stream_index = stream.index();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(open_err)?;
        let decoder = codec_ctx.decoder().video().map_err(open_err)?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(open_err)?;

        log::info!("Opened {device} ({format_name}) at {width}x{height}");

        Ok(Box::new(FfmpegCamera {
            device,
            stream: Some(OpenStream {
                input,
                decoder,
                scaler,
                stream_index,
                width,
                height,
            }),
            frame_index: 0,
        }))
    }
}

struct OpenStream {
    input: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

/// A camera opened by [`FfmpegCameraOpener`].
pub struct FfmpegCamera {
    device: String,
    stream: Option<OpenStream>,
    frame_index: usize,
}

// Safety: FfmpegCamera is owned by a single capture loop at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegCamera {}

impl FfmpegCamera {
    fn receive(&mut self) -> Result<Option<Frame>, CaptureError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(CaptureError::Closed);
        };
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if stream.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        stream
            .scaler
            .run(&decoded, &mut rgb_frame)
            .map_err(|e| CaptureError::Read(e.to_string()))?;

        let pixels = extract_rgb_pixels(&rgb_frame, stream.width, stream.height);
        let frame = Frame::new(pixels, stream.width, stream.height, 3, self.frame_index);
        self.frame_index += 1;
        Ok(Some(frame))
    }
}

impl CaptureDevice for FfmpegCamera {
    fn read_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if let Some(frame) = self.receive()? {
            return Ok(Some(frame));
        }

        let Some(stream) = self.stream.as_mut() else {
            return Err(CaptureError::Closed);
        };
        let mut packet = ffmpeg_next::Packet::empty();
        match packet.read(&mut stream.input) {
            Ok(()) => {}
            Err(ffmpeg_next::Error::Other {
                errno: ffmpeg_next::util::error::EAGAIN,
            }) => return Ok(None),
            Err(ffmpeg_next::Error::Eof) => {
                return Err(CaptureError::Read(format!("{} stopped producing frames", self.device)));
            }
            Err(e) => return Err(CaptureError::Read(e.to_string())),
        }

        if packet.stream() != stream.stream_index {
            return Ok(None);
        }
        if let Err(e) = stream.decoder.send_packet(&packet) {
            log::debug!("Dropping undecodable packet from {}: {e}", self.device);
            return Ok(None);
        }
        self.receive()
    }

    fn close(&mut self) {
        if self.stream.take().is_some() {
            log::info!("Closed {}", self.device);
        }
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer,
/// dropping per-row stride padding.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("v4l2", 0, "/dev/video0")]
    #[case("video4linux2", 2, "/dev/video2")]
    #[case("avfoundation", 1, "1")]
    #[case("dshow", 3, "video=3")]
    fn test_device_path(#[case] format: &str, #[case] id: u32, #[case] expected: &str) {
        assert_eq!(device_path(format, id), expected);
    }

    #[test]
    fn test_default_format_known() {
        assert!(["v4l2", "avfoundation", "dshow"].contains(&default_format()));
    }

    #[test]
    fn test_configured_format_overrides_default() {
        let opener = FfmpegCameraOpener::new(CameraOptions {
            format: Some("dshow".to_string()),
            ..Default::default()
        });
        assert_eq!(opener.format_name(), "dshow");
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let opener = FfmpegCameraOpener::new(CameraOptions {
            format: Some("not-a-camera-format".to_string()),
            ..Default::default()
        });
        let err = opener.open(0).err().unwrap();
        assert!(matches!(
            err,
            CaptureError::UnsupportedFormat(ref f) if f == "not-a-camera-format"
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_missing_device_fails_to_open() {
        let opener = FfmpegCameraOpener::new(CameraOptions::default());
        let result = opener.open(250);
        assert!(result.is_err());
    }
}
