//! 64-bit average hash ("aHash").
//!
//! The image is reduced to 8x8 grayscale; each bit records whether a cell is
//! brighter than the mean of all cells.
use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::identity::domain::perceptual_hasher::{ImageHash, PerceptualHasher};
use crate::shared::frame::Frame;

const HASH_SIDE: u32 = 8;

#[derive(Clone, Copy, Debug, Default)]
pub struct AverageHasher;

impl AverageHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PerceptualHasher for AverageHasher {
    fn compute(&self, image: &Frame) -> ImageHash {
        let Some(gray) = to_gray(image) else {
            return ImageHash(0);
        };
        let small = imageops::resize(&gray, HASH_SIDE, HASH_SIDE, FilterType::Triangle);

        let cells: Vec<u8> = small.into_raw();
        let mean = cells.iter().map(|&v| v as f64).sum::<f64>() / cells.len() as f64;

        let bits = cells
            .iter()
            .fold(0u64, |acc, &v| (acc << 1) | u64::from(v as f64 > mean));
        ImageHash(bits)
    }

    fn distance(&self, a: &ImageHash, b: &ImageHash) -> u32 {
        (a.0 ^ b.0).count_ones()
    }
}

fn to_gray(frame: &Frame) -> Option<GrayImage> {
    if frame.width() == 0 || frame.height() == 0 {
        return None;
    }
    match frame.channels() {
        1 => GrayImage::from_raw(frame.width(), frame.height(), frame.data().to_vec()),
        3 => frame.to_rgb_image().map(|rgb| imageops::grayscale(&rgb)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Left half `left`, right half `right`, all channels equal.
    fn split_frame(size: u32, left: u8, right: u8) -> Frame {
        let mut data = Vec::with_capacity((size * size * 3) as usize);
        for _y in 0..size {
            for x in 0..size {
                let v = if x < size / 2 { left } else { right };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        Frame::new(data, size, size, 3, 0)
    }

    #[test]
    fn test_identical_images_have_zero_distance() {
        let hasher = AverageHasher::new();
        let a = hasher.compute(&split_frame(64, 255, 0));
        let b = hasher.compute(&split_frame(64, 255, 0));
        assert_eq!(hasher.distance(&a, &b), 0);
    }

    #[test]
    fn test_inverted_image_has_max_distance() {
        let hasher = AverageHasher::new();
        let a = hasher.compute(&split_frame(64, 255, 0));
        let b = hasher.compute(&split_frame(64, 0, 255));
        assert_eq!(hasher.distance(&a, &b), hasher.max_distance());
    }

    #[test]
    fn test_half_bright_image_sets_half_the_bits() {
        let hasher = AverageHasher::new();
        let hash = hasher.compute(&split_frame(64, 255, 0));
        assert_eq!(hash.0.count_ones(), 32);
    }

    #[test]
    fn test_uniform_brightness_shift_does_not_change_hash() {
        let hasher = AverageHasher::new();
        let a = hasher.compute(&split_frame(64, 200, 40));
        let b = hasher.compute(&split_frame(64, 220, 60));
        assert_eq!(hasher.distance(&a, &b), 0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let hasher = AverageHasher::new();
        let a = ImageHash(0b1011);
        let b = ImageHash(0b0110);
        assert_eq!(hasher.distance(&a, &b), 3);
        assert_eq!(hasher.distance(&b, &a), 3);
    }

    #[test]
    fn test_max_distance_is_64() {
        assert_eq!(AverageHasher::new().max_distance(), 64);
    }

    #[test]
    fn test_uniform_image_hashes_to_zero() {
        let hasher = AverageHasher::new();
        assert_eq!(hasher.compute(&split_frame(16, 90, 90)), ImageHash(0));
    }

    #[test]
    fn test_grayscale_frame_supported() {
        let hasher = AverageHasher::new();
        let mut data = vec![0u8; 16 * 16];
        for (i, v) in data.iter_mut().enumerate() {
            if i % 16 < 8 {
                *v = 255;
            }
        }
        let gray = Frame::new(data, 16, 16, 1, 0);
        let rgb = split_frame(16, 255, 0);
        assert_eq!(
            hasher.distance(&hasher.compute(&gray), &hasher.compute(&rgb)),
            0
        );
    }
}
