use actix_web::http::header;
use actix_web::web::{self, Bytes};
use actix_web::HttpResponse;
use async_stream::stream;

use facecam_core::session::capture_session::SessionError;
use facecam_core::session::session_registry::SessionRegistry;

use crate::mjpeg;

/// Shared state behind every request.
pub struct AppState {
    pub registry: SessionRegistry,
    /// MIME type of each streamed part.
    pub part_content_type: &'static str,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/{device_id}", web::get().to(stream_handler));
}

/// Non-numeric ids fall back to device 0.
pub fn parse_device_id(raw: &str) -> u32 {
    raw.parse().unwrap_or_else(|_| {
        log::warn!("Invalid device id {raw:?}, using device 0");
        0
    })
}

/// Streams the annotated feed of one camera until the client disconnects.
async fn stream_handler(path: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    let device_id = parse_device_id(&path);

    let registry_state = state.clone();
    let acquired = web::block(move || registry_state.registry.acquire(device_id)).await;
    let mut handle = match acquired {
        Ok(Ok(handle)) => handle,
        Ok(Err(SessionError::Open { source, .. })) => {
            log::error!("Device {device_id}: open video capture fail: {source}");
            return HttpResponse::Forbidden().body(format!("open video capture fail: {source}\n"));
        }
        Ok(Err(e)) => {
            log::error!("{e}");
            return HttpResponse::InternalServerError().body(format!("{e}\n"));
        }
        Err(e) => {
            log::error!("Device {device_id}: acquire did not complete: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };
    log::info!(
        "Viewer joined device {device_id} (generation {})",
        handle.generation()
    );

    let part_content_type = state.part_content_type;
    let body = stream! {
        while let Some(frame) = handle.next_frame().await {
            let part = mjpeg::part(part_content_type, &frame.data);
            yield Ok::<Bytes, actix_web::Error>(Bytes::from(part));
        }
        log::info!("Device {} stream ended", handle.device_id());
    };

    HttpResponse::Ok()
        .append_header((header::CACHE_CONTROL, "no-cache"))
        .content_type(mjpeg::content_type())
        .streaming(body)
}
