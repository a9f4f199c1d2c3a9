use serde::{Deserialize, Serialize};

/// Shape of a dataset or attribute payload.
///
/// Rank is the number of extents. Rank 0 is a scalar holding exactly one
/// element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dataspace {
    pub extents: Vec<u64>,
}

impl Dataspace {
    /// A rank-0 dataspace.
    pub fn scalar() -> Self {
        Self::default()
    }

    /// A simple dataspace with the given extents.
    pub fn simple(extents: impl Into<Vec<u64>>) -> Self {
        Self {
            extents: extents.into(),
        }
    }

    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.extents.is_empty()
    }

    /// Number of elements: the product of the extents (1 for a scalar).
    ///
    /// `None` when the product does not fit in a `u64`.
    pub fn element_count(&self) -> Option<u64> {
        self.extents
            .iter()
            .try_fold(1u64, |count, &extent| count.checked_mul(extent))
    }
}

impl std::fmt::Display for Dataspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_scalar() {
            return f.write_str("scalar");
        }
        let dims: Vec<String> = self.extents.iter().map(u64::to_string).collect();
        write!(f, "[{}]", dims.join(" x "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_has_one_element() {
        let space = Dataspace::scalar();
        assert_eq!(space.rank(), 0);
        assert_eq!(space.element_count(), Some(1));
        assert_eq!(space.to_string(), "scalar");
    }

    #[test]
    fn simple_counts_product() {
        let space = Dataspace::simple([5, 6]);
        assert_eq!(space.rank(), 2);
        assert_eq!(space.element_count(), Some(30));
        assert_eq!(space.to_string(), "[5 x 6]");
    }

    #[test]
    fn zero_extent_is_empty() {
        assert_eq!(Dataspace::simple([4, 0]).element_count(), Some(0));
    }

    #[test]
    fn overflowing_extents_have_no_count() {
        assert_eq!(Dataspace::simple([1 << 40, 1 << 40]).element_count(), None);
        assert_eq!(Dataspace::simple([u64::MAX, 1]).element_count(), Some(u64::MAX));
        assert_eq!(Dataspace::simple([1 << 40, 1 << 40, 0]).element_count(), None);
    }
}
