use serde::{Deserialize, Serialize};

/// Rewrites source paths into the metadata store's namespace.
///
/// A path starting with `source_root` has that prefix replaced by
/// `target_root`; any other path is returned unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathMapping {
    pub source_root: String,
    pub target_root: String,
}

impl PathMapping {
    pub fn new(source_root: impl Into<String>, target_root: impl Into<String>) -> Self {
        Self {
            source_root: source_root.into(),
            target_root: target_root.into(),
        }
    }

    /// Translate one source path.
    pub fn translate(&self, source: &str) -> String {
        translate(source, self)
    }

    pub fn is_identity(&self) -> bool {
        self.source_root == self.target_root
    }
}

impl Default for PathMapping {
    /// Every source path is placed below `/H5test`.
    fn default() -> Self {
        Self::new("", "/H5test")
    }
}

/// Replace a leading `mapping.source_root` with `mapping.target_root`.
pub fn translate(source: &str, mapping: &PathMapping) -> String {
    match source.strip_prefix(mapping.source_root.as_str()) {
        Some(rest) => format!("{}{}", mapping.target_root, rest),
        None => source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn replaces_leading_root() {
        let mapping = PathMapping::new("/BIGDATA/bench/ExtractMetadata", "/H5test");
        assert_eq!(
            mapping.translate("/BIGDATA/bench/ExtractMetadata/run1/a.h5"),
            "/H5test/run1/a.h5"
        );
    }

    #[test]
    fn non_matching_paths_unchanged() {
        let mapping = PathMapping::new("/BIGDATA", "/H5test");
        assert_eq!(mapping.translate("/scratch/a.h5"), "/scratch/a.h5");
        // Only a leading occurrence is replaced.
        assert_eq!(mapping.translate("/x/BIGDATA/a.h5"), "/x/BIGDATA/a.h5");
    }

    #[test]
    fn default_prefixes_everything() {
        assert_eq!(PathMapping::default().translate("/data/a.h5"), "/H5test/data/a.h5");
    }

    proptest! {
        #[test]
        fn identity_mapping_is_noop(root in "(/[a-z]{1,6}){0,3}", path in "(/[a-z0-9._]{1,8}){1,5}") {
            let mapping = PathMapping::new(root.clone(), root);
            prop_assert!(mapping.is_identity());
            let once = mapping.translate(&path);
            prop_assert_eq!(&once, &path);
            prop_assert_eq!(mapping.translate(&once), once);
        }

        #[test]
        fn unmatched_paths_untouched(path in "/[a-z]{1,8}(/[a-z0-9]{1,8}){0,4}") {
            let mapping = PathMapping::new("/ZZ", "/H5test");
            prop_assert_eq!(mapping.translate(&path), path);
        }

        #[test]
        fn matched_paths_keep_suffix(suffix in "(/[a-z0-9]{1,8}){0,4}") {
            let mapping = PathMapping::new("/src/root", "/dst");
            let translated = mapping.translate(&format!("/src/root{suffix}"));
            prop_assert_eq!(translated, format!("/dst{suffix}"));
        }
    }
}
