//! Input conversion for SSD face models.
//!
//! Models exported from Caffe and from TensorFlow expect different
//! normalization. The parameters come from a small JSON model-config file,
//! or are inferred from the model file name when no config is given.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use ndarray::Array4;
use serde::Deserialize;
use thiserror::Error;

use crate::shared::constants::DETECTOR_INPUT_SIZE;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum BlobConfigError {
    #[error("failed to read model config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid model config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("model config {}: input_size must be positive", path.display())]
    ZeroInputSize { path: PathBuf },
}

/// Channel order the model was trained on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// How a frame is turned into the model's NCHW input blob:
/// `(pixel - mean[c]) * scale`, resized to `input_size` × `input_size`.
///
/// `mean` is given in the model's channel order.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BlobParams {
    #[serde(default = "default_input_size")]
    pub input_size: u32,
    pub scale: f32,
    pub mean: [f32; 3],
    pub channel_order: ChannelOrder,
}

fn default_input_size() -> u32 {
    DETECTOR_INPUT_SIZE
}

impl BlobParams {
    /// Caffe-trained SSD (e.g. res10_300x300): BGR, ImageNet-style mean, no scaling.
    pub fn caffe() -> Self {
        Self {
            input_size: DETECTOR_INPUT_SIZE,
            scale: 1.0,
            mean: [104.0, 177.0, 123.0],
            channel_order: ChannelOrder::Bgr,
        }
    }

    /// TensorFlow-trained SSD: RGB mapped to `[-1, 1]`.
    pub fn tensorflow() -> Self {
        Self {
            input_size: DETECTOR_INPUT_SIZE,
            scale: 1.0 / 127.5,
            mean: [127.5, 127.5, 127.5],
            channel_order: ChannelOrder::Rgb,
        }
    }

    /// Guesses the convention from the model file name.
    pub fn for_model(model_path: &Path) -> Self {
        let name = model_path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.starts_with("res10") || name.contains("caffe") {
            Self::caffe()
        } else {
            Self::tensorflow()
        }
    }

    pub fn load(path: &Path) -> Result<Self, BlobConfigError> {
        let text = fs::read_to_string(path).map_err(|source| BlobConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let params: BlobParams =
            serde_json::from_str(&text).map_err(|source| BlobConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if params.input_size == 0 {
            return Err(BlobConfigError::ZeroInputSize {
                path: path.to_path_buf(),
            });
        }
        Ok(params)
    }

    /// Explicit config wins; otherwise fall back to [`BlobParams::for_model`].
    pub fn resolve(model_path: &Path, config_path: Option<&Path>) -> Result<Self, BlobConfigError> {
        match config_path {
            Some(path) => Self::load(path),
            None => Ok(Self::for_model(model_path)),
        }
    }
}

/// Converts an RGB frame to a `[1, 3, S, S]` float blob.
///
/// Resizes bilinearly without preserving aspect ratio, matching how the SSD
/// face models were trained. Non-RGB or empty frames give an all-zero blob.
pub fn blob_from_frame(frame: &Frame, params: &BlobParams) -> Array4<f32> {
    let size = params.input_size as usize;
    let mut blob = Array4::<f32>::zeros((1, 3, size, size));

    let Some(image) = frame.to_rgb_image() else {
        return blob;
    };
    if image.width() == 0 || image.height() == 0 {
        return blob;
    }
    let resized = imageops::resize(
        &image,
        params.input_size,
        params.input_size,
        FilterType::Triangle,
    );
    let resized = Frame::from_rgb_image(resized, frame.index());
    let src = resized.as_ndarray(); // [S, S, C] u8

    for y in 0..size {
        for x in 0..size {
            for c in 0..3 {
                let src_c = match params.channel_order {
                    ChannelOrder::Rgb => c,
                    ChannelOrder::Bgr => 2 - c,
                };
                let value = src[[y, x, src_c]] as f32;
                blob[[0, c, y, x]] = (value - params.mean[c]) * params.scale;
            }
        }
    }
    blob
}
