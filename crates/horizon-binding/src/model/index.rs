//! Model index for addressing items in list models.
//!
//! The `ModelIndex` type is the way views, mappers and change notifications
//! refer to a cell of an `ItemModel`. Binding models are flat, so an index is
//! just a row, a column and a validity bit.

/// Represents a position within an `ItemModel`.
///
/// # Index Validity
///
/// An invalid index stands for the model root (as the `parent` argument of
/// `row_count` and `index`) or for a position that does not exist. Models
/// hand out valid indices only for cells that are in bounds.
///
/// # Example
///
/// ```
/// use horizon_binding::model::ModelIndex;
///
/// let index = ModelIndex::new(2, 0);
/// assert!(index.is_valid());
/// assert_eq!(index.row(), 2);
/// assert!(!ModelIndex::invalid().is_valid());
/// ```
#[derive(Clone, Copy, Hash)]
pub struct ModelIndex {
    row: usize,
    column: usize,
    valid: bool,
}

impl Default for ModelIndex {
    fn default() -> Self {
        Self::invalid()
    }
}

impl ModelIndex {
    /// Creates an invalid (null) model index.
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            row: 0,
            column: 0,
            valid: false,
        }
    }

    /// Creates a new valid model index.
    ///
    /// This is normally called by model implementations rather than
    /// directly; it does not check the position against any model.
    #[inline]
    pub const fn new(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            valid: true,
        }
    }

    /// Returns `true` if this is a valid index.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns the row of this index. Returns 0 for invalid indices.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the column of this index. Returns 0 for invalid indices.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns `true` if this index lies in the rectangle spanned by
    /// `top_left` and `bottom_right` (inclusive), as carried by
    /// `data_changed` notifications.
    pub fn is_within(&self, top_left: &ModelIndex, bottom_right: &ModelIndex) -> bool {
        self.valid
            && top_left.valid
            && bottom_right.valid
            && (top_left.row..=bottom_right.row).contains(&self.row)
            && (top_left.column..=bottom_right.column).contains(&self.column)
    }
}

impl std::fmt::Debug for ModelIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            f.debug_struct("ModelIndex")
                .field("row", &self.row)
                .field("column", &self.column)
                .finish()
        } else {
            write!(f, "ModelIndex(invalid)")
        }
    }
}

impl PartialEq for ModelIndex {
    fn eq(&self, other: &Self) -> bool {
        match (self.valid, other.valid) {
            (false, false) => true,
            (true, true) => self.row == other.row && self.column == other.column,
            _ => false,
        }
    }
}

impl Eq for ModelIndex {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_index() {
        let index = ModelIndex::invalid();
        assert!(!index.is_valid());
        assert_eq!(index.row(), 0);
        assert_eq!(index.column(), 0);
    }

    #[test]
    fn test_valid_index() {
        let index = ModelIndex::new(5, 3);
        assert!(index.is_valid());
        assert_eq!(index.row(), 5);
        assert_eq!(index.column(), 3);
    }

    #[test]
    fn test_equality() {
        assert_eq!(ModelIndex::invalid(), ModelIndex::invalid());
        assert_eq!(ModelIndex::new(1, 0), ModelIndex::new(1, 0));
        assert_ne!(ModelIndex::new(1, 0), ModelIndex::invalid());
    }

    #[test]
    fn test_is_within() {
        let top_left = ModelIndex::new(1, 0);
        let bottom_right = ModelIndex::new(3, 0);

        assert!(ModelIndex::new(1, 0).is_within(&top_left, &bottom_right));
        assert!(ModelIndex::new(3, 0).is_within(&top_left, &bottom_right));
        assert!(!ModelIndex::new(4, 0).is_within(&top_left, &bottom_right));
        assert!(!ModelIndex::new(2, 1).is_within(&top_left, &bottom_right));
        assert!(!ModelIndex::invalid().is_within(&top_left, &bottom_right));
    }
}
