use crate::identity::domain::gallery::{Gallery, GalleryEntry};
use crate::identity::domain::perceptual_hasher::PerceptualHasher;
use crate::identity::infrastructure::gallery_manifest::GalleryManifest;
use crate::pipeline::face_locator::FaceLocator;
use crate::video::domain::image_reader::ImageReader;

/// Builds the known-faces gallery from reference photos.
///
/// Each photo is reduced to its most confident face crop before hashing, so
/// gallery hashes are comparable with the live crops the pipeline produces.
/// Photos that cannot be read or contain no face are logged and skipped.
pub struct BuildGalleryUseCase {
    reader: Box<dyn ImageReader>,
    hasher: Box<dyn PerceptualHasher>,
}

impl BuildGalleryUseCase {
    pub fn new(reader: Box<dyn ImageReader>, hasher: Box<dyn PerceptualHasher>) -> Self {
        Self { reader, hasher }
    }

    pub fn execute(&self, manifest: &GalleryManifest, locator: &mut FaceLocator) -> Gallery {
        let mut entries = Vec::with_capacity(manifest.len());

        for (name, path) in manifest.entries() {
            let image = match self.reader.read(path) {
                Ok(image) => image,
                Err(e) => {
                    log::error!(
                        "Skipping gallery entry {name}: cannot read {}: {e}",
                        path.display()
                    );
                    continue;
                }
            };
            let face = match locator.extract_face(&image) {
                Ok(face) => face,
                Err(e) => {
                    log::error!("Skipping gallery entry {name} ({}): {e}", path.display());
                    continue;
                }
            };
            entries.push(GalleryEntry {
                name: name.to_string(),
                hash: self.hasher.compute(&face),
            });
        }

        log::info!("Gallery ready: {} of {} entries", entries.len(), manifest.len());
        Gallery::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detection_tensor::DetectionTensor;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::identity::domain::perceptual_hasher::ImageHash;
    use crate::shared::frame::Frame;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    // --- Stubs ---

    struct StubReader {
        images: HashMap<PathBuf, Frame>,
    }

    impl ImageReader for StubReader {
        fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
            self.images
                .get(path)
                .cloned()
                .ok_or_else(|| format!("no such file: {}", path.display()).into())
        }
    }

    /// Reports a face covering the left half of frames whose first byte is
    /// non-zero; blank frames have no face.
    struct StubDetector;

    impl FaceDetector for StubDetector {
        fn infer(&mut self, frame: &Frame) -> Result<DetectionTensor, Box<dyn std::error::Error>> {
            if frame.data().first().copied().unwrap_or(0) == 0 {
                return Ok(DetectionTensor::default());
            }
            Ok(DetectionTensor::new(vec![0.0, 1.0, 0.9, 0.0, 0.0, 0.5, 1.0]))
        }
    }

    /// Hash = crop width, so tests can see what was hashed.
    struct WidthHasher;

    impl PerceptualHasher for WidthHasher {
        fn compute(&self, image: &Frame) -> ImageHash {
            ImageHash(u64::from(image.width()))
        }

        fn distance(&self, a: &ImageHash, b: &ImageHash) -> u32 {
            (a.0 ^ b.0).count_ones()
        }
    }

    // --- Helpers ---

    fn filled(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(
            vec![value; (width * height * 3) as usize],
            width,
            height,
            3,
            0,
        )
    }

    fn use_case(images: Vec<(&str, Frame)>) -> BuildGalleryUseCase {
        let images = images
            .into_iter()
            .map(|(path, frame)| (PathBuf::from(path), frame))
            .collect();
        BuildGalleryUseCase::new(Box::new(StubReader { images }), Box::new(WidthHasher))
    }

    fn manifest(entries: &[(&str, &str)]) -> GalleryManifest {
        GalleryManifest::new(
            entries
                .iter()
                .map(|(name, path)| (name.to_string(), PathBuf::from(path))),
        )
    }

    fn locator() -> FaceLocator {
        FaceLocator::new(Box::new(StubDetector))
    }

    // --- Tests ---

    #[test]
    fn test_hashes_face_crop_not_whole_image() {
        let uc = use_case(vec![("/g/renjie.jpg", filled(80, 40, 200))]);
        let gallery = uc.execute(&manifest(&[("renjie", "/g/renjie.jpg")]), &mut locator());

        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.entries()[0].name, "renjie");
        assert_eq!(gallery.entries()[0].hash, ImageHash(40));
    }

    #[test]
    fn test_unreadable_image_skipped() {
        let uc = use_case(vec![("/g/a.jpg", filled(20, 20, 200))]);
        let gallery = uc.execute(
            &manifest(&[("alice", "/g/a.jpg"), ("bob", "/g/missing.jpg")]),
            &mut locator(),
        );

        let names: Vec<&str> = gallery.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alice"]);
    }

    #[test]
    fn test_faceless_image_skipped() {
        let uc = use_case(vec![
            ("/g/a.jpg", filled(20, 20, 200)),
            ("/g/wall.jpg", filled(20, 20, 0)),
        ]);
        let gallery = uc.execute(
            &manifest(&[("alice", "/g/a.jpg"), ("wall", "/g/wall.jpg")]),
            &mut locator(),
        );

        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.entries()[0].name, "alice");
    }

    #[test]
    fn test_entries_sorted_by_name() {
        let uc = use_case(vec![
            ("/g/z.jpg", filled(20, 20, 1)),
            ("/g/a.jpg", filled(40, 20, 1)),
        ]);
        let gallery = uc.execute(
            &manifest(&[("zoe", "/g/z.jpg"), ("alice", "/g/a.jpg")]),
            &mut locator(),
        );

        let names: Vec<&str> = gallery.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "zoe"]);
    }

    #[test]
    fn test_empty_manifest_gives_empty_gallery() {
        let uc = use_case(vec![]);
        assert!(uc.execute(&GalleryManifest::default(), &mut locator()).is_empty());
    }
}
