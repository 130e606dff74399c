//! Core traits for the Model/View architecture.
//!
//! This module defines the interface that models expose to views, mappers
//! and other observers.

use horizon_binding_core::Signal;

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};

/// Flags indicating what operations are allowed on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    /// Item can be selected.
    pub selectable: bool,
    /// Item can be edited.
    pub editable: bool,
    /// Item has a checkbox.
    pub checkable: bool,
    /// Item is enabled (can interact).
    pub enabled: bool,
}

impl ItemFlags {
    /// Creates flags with all defaults (selectable and enabled only).
    pub fn new() -> Self {
        Self {
            selectable: true,
            enabled: true,
            ..Default::default()
        }
    }

    /// Creates flags with no capabilities at all.
    ///
    /// Models return this for indices that do not address an item.
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates flags for an editable item (enabled, selectable, editable).
    pub fn editable() -> Self {
        Self {
            selectable: true,
            editable: true,
            enabled: true,
            ..Default::default()
        }
    }

    /// Returns `true` if no capability is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }

    /// Sets the selectable flag.
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Header orientation for `header_data`, also used by mappers to decide
/// whether a section addresses a row or a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Sections are columns of the current row.
    Horizontal,
    /// Sections are rows of the current column (list models).
    #[default]
    Vertical,
}

/// The core trait for item models.
///
/// `ItemModel` is the interface views and mappers use to query and edit
/// data without knowing how it is stored. Binding models are flat: the
/// only valid parent is the invalid (root) index.
///
/// # Implementation Requirements
///
/// At minimum, you must implement:
/// - [`row_count`](ItemModel::row_count)
/// - [`column_count`](ItemModel::column_count)
/// - [`data`](ItemModel::data)
/// - [`index`](ItemModel::index)
/// - [`signals`](ItemModel::signals)
///
/// Editable models also implement [`set_data`](ItemModel::set_data) and
/// [`flags`](ItemModel::flags), and emit `data_changed` after every write.
pub trait ItemModel: Send + Sync {
    /// Returns the number of rows under the given parent.
    fn row_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the number of columns for children of the given parent.
    fn column_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the data stored under the given role for the item at index.
    ///
    /// Returns `ItemData::None` if the index is invalid or the role is not
    /// supported.
    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData;

    /// Creates a model index for the given row and column under parent.
    ///
    /// Returns `ModelIndex::invalid()` if the position is out of bounds.
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex;

    /// Returns the signals for this model.
    fn signals(&self) -> &ModelSignals;

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Sets the data for the given index and role.
    ///
    /// Returns `true` if the data was successfully set.
    /// The default implementation returns `false` (read-only).
    fn set_data(&self, _index: &ModelIndex, _value: ItemData, _role: ItemRole) -> bool {
        false
    }

    /// Returns the flags for the item at the given index.
    ///
    /// The default returns selectable and enabled flags.
    fn flags(&self, _index: &ModelIndex) -> ItemFlags {
        ItemFlags::new()
    }

    /// Returns header data for the given section.
    ///
    /// The default returns `ItemData::None`.
    fn header_data(&self, _section: usize, _orientation: Orientation, _role: ItemRole) -> ItemData {
        ItemData::None
    }

    // -------------------------------------------------------------------------
    // Convenience methods
    // -------------------------------------------------------------------------

    /// Returns the display text for an item.
    fn display_text(&self, index: &ModelIndex) -> Option<String> {
        let data = self.data(index, ItemRole::Display);
        data.is_some().then(|| data.to_string())
    }
}

/// Signals emitted by item models.
///
/// Views and mappers connect to these signals to stay synchronized with
/// the model.
pub struct ModelSignals {
    /// Emitted when data in existing items changes.
    /// Args: (top-left index, bottom-right index, changed roles)
    pub data_changed: Signal<(ModelIndex, ModelIndex, Vec<ItemRole>)>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModelSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSignals")
            .field("data_changed", &self.data_changed)
            .finish()
    }
}

impl ModelSignals {
    /// Creates a new set of model signals.
    pub fn new() -> Self {
        Self {
            data_changed: Signal::new(),
        }
    }

    /// Emits the data_changed signal for a single item.
    pub fn emit_data_changed_single(&self, index: ModelIndex, roles: Vec<ItemRole>) {
        self.data_changed.emit((index, index, roles));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_item_flags() {
        let flags = ItemFlags::new();
        assert!(flags.selectable);
        assert!(flags.enabled);
        assert!(!flags.editable);
        assert!(!flags.checkable);

        let editable = ItemFlags::editable();
        assert!(editable.editable);
        assert!(editable.selectable);
        assert!(editable.enabled);

        assert!(ItemFlags::none().is_empty());
        assert!(!editable.is_empty());
        assert!(ItemFlags::new().with_enabled(false).with_selectable(false).is_empty());
    }

    #[test]
    fn test_model_signals_creation() {
        let signals = ModelSignals::new();
        assert_eq!(signals.data_changed.connection_count(), 0);
    }

    #[test]
    fn test_emit_data_changed_single() {
        let signals = ModelSignals::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let recv = received.clone();
        signals.data_changed.connect(move |(top_left, bottom_right, roles)| {
            recv.lock()
                .push((top_left.row(), bottom_right.row(), roles.clone()));
        });

        signals.emit_data_changed_single(ModelIndex::new(3, 0), vec![ItemRole::Display]);

        let events = received.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], (3, 3, vec![ItemRole::Display]));
    }
}
