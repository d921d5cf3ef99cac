use crate::identity::domain::gallery::Gallery;
use crate::identity::domain::perceptual_hasher::PerceptualHasher;
use crate::shared::constants::MATCH_SIMILARITY_THRESHOLD;
use crate::shared::frame::Frame;

/// Which gallery entry wins when several clear the threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// First qualifying entry in gallery (name) order.
    #[default]
    FirstAboveThreshold,
    /// Qualifying entry with the highest similarity; gallery order breaks ties.
    BestSimilarity,
}

/// Names a face crop by perceptual-hash similarity against the gallery.
///
/// Built once at startup; never mutated afterwards.
pub struct IdentityMatcher {
    gallery: Gallery,
    hasher: Box<dyn PerceptualHasher>,
    threshold: f64,
    policy: MatchPolicy,
}

impl IdentityMatcher {
    pub fn new(gallery: Gallery, hasher: Box<dyn PerceptualHasher>, policy: MatchPolicy) -> Self {
        Self {
            gallery,
            hasher,
            threshold: MATCH_SIMILARITY_THRESHOLD,
            policy,
        }
    }

    /// Returns the matched name, or `None` when no entry is similar enough.
    pub fn match_name(&self, region: &Frame) -> Option<&str> {
        if self.gallery.is_empty() {
            return None;
        }
        let hash = self.hasher.compute(region);
        let max = self.hasher.max_distance();

        let mut qualifying = self.gallery.entries().iter().filter_map(|entry| {
            let score = similarity(self.hasher.distance(&hash, &entry.hash), max);
            (score > self.threshold).then_some((entry, score))
        });

        let winner = match self.policy {
            MatchPolicy::FirstAboveThreshold => qualifying.next(),
            MatchPolicy::BestSimilarity => qualifying.fold(None, |best, candidate| match best {
                Some((_, best_score)) if best_score >= candidate.1 => best,
                _ => Some(candidate),
            }),
        };
        winner.map(|(entry, _)| entry.name.as_str())
    }
}

/// `1 - distance / max_distance`; 1.0 for identical hashes.
pub fn similarity(distance: u32, max_distance: u32) -> f64 {
    if max_distance == 0 {
        return 0.0;
    }
    1.0 - distance as f64 / max_distance as f64
}
