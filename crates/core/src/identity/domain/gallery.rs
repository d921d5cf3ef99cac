use crate::identity::domain::perceptual_hasher::ImageHash;

/// A known face: display name plus the hash of its reference crop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GalleryEntry {
    pub name: String,
    pub hash: ImageHash,
}

/// Immutable set of known faces, ordered by name.
///
/// The ordering makes first-match lookups deterministic across runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Gallery {
    entries: Vec<GalleryEntry>,
}

impl Gallery {
    pub fn new(mut entries: Vec<GalleryEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self { entries }
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, hash: u64) -> GalleryEntry {
        GalleryEntry {
            name: name.to_string(),
            hash: ImageHash(hash),
        }
    }

    #[test]
    fn test_entries_sorted_by_name() {
        let gallery = Gallery::new(vec![entry("zoe", 1), entry("alice", 2), entry("mia", 3)]);
        let names: Vec<&str> = gallery.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "mia", "zoe"]);
    }

    #[test]
    fn test_default_is_empty() {
        let gallery = Gallery::default();
        assert!(gallery.is_empty());
        assert_eq!(gallery.len(), 0);
    }
}
