use crate::shared::frame::Frame;

/// Fixed-width perceptual fingerprint of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageHash(pub u64);

/// Domain interface for the perceptual-hash engine.
///
/// `distance` must be symmetric, zero for identical hashes, and never exceed
/// `max_distance`.
pub trait PerceptualHasher: Send + Sync {
    fn compute(&self, image: &Frame) -> ImageHash;

    fn distance(&self, a: &ImageHash, b: &ImageHash) -> u32;

    fn max_distance(&self) -> u32 {
        u64::BITS
    }
}
