//! Mapping between model sections and editors.
//!
//! [`DataWidgetMapper`] binds editors to the sections of an [`ItemModel`]. It
//! keeps one "current" row (or column) and, for every mapping, shows the cell
//! at `(section, current)` in the mapped editor. Editors push values back with
//! [`commit`](DataWidgetMapper::commit), which writes immediately under
//! [`SubmitPolicy::AutoSubmit`] and queues the write until
//! [`submit`](DataWidgetMapper::submit) under [`SubmitPolicy::ManualSubmit`].
//!
//! The mapper listens to the model's `data_changed` signal, so a value written
//! by application code shows up in every editor mapped to it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use horizon_binding::model::{DataWidgetMapper, ItemData, MappedEditor};
//! # use std::sync::LazyLock;
//! # use horizon_binding::model::{DescriptorBase, DescriptorModel, DescriptorType, Field, SchemaBuilder};
//! # static K: LazyLock<Field<f64>> = LazyLock::new(|| Field::with_default("k", 0.01));
//! # struct Controls;
//! # impl DescriptorType for Controls {
//! #     type Parent = DescriptorBase;
//! #     fn declare(fields: &mut SchemaBuilder) { fields.field(&K); }
//! # }
//!
//! #[derive(Default)]
//! struct SpinBox(Mutex<ItemData>);
//!
//! impl MappedEditor for SpinBox {
//!     fn set_editor_data(&self, value: &ItemData) {
//!         *self.0.lock() = value.clone();
//!     }
//!     fn editor_data(&self) -> ItemData {
//!         self.0.lock().clone()
//!     }
//! }
//!
//! let model = Arc::new(DescriptorModel::new::<Controls>().unwrap());
//! let spin = Arc::new(SpinBox::default());
//!
//! let mapper = DataWidgetMapper::new();
//! mapper.set_model(model.clone());
//! let id = mapper.add_mapping(spin.clone(), K.section_in::<Controls>().unwrap());
//! assert_eq!(spin.editor_data(), ItemData::Float(0.01));
//!
//! // Editor to model
//! spin.set_editor_data(&ItemData::Float(0.5));
//! mapper.commit(id).unwrap();
//! assert_eq!(K.value(&*model).unwrap(), 0.5);
//!
//! // Model to editor
//! K.set(&*model, 0.25).unwrap();
//! assert_eq!(spin.editor_data(), ItemData::Float(0.25));
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use horizon_binding_core::logging::{span_names, targets};
use horizon_binding_core::{ConnectionId, PerfSpan, Signal};
use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};
use super::traits::{ItemModel, Orientation};
use crate::error::{BindingError, Result};

new_key_type! {
    /// Identifies one editor mapping within a [`DataWidgetMapper`].
    pub struct MappingId;
}

/// An editor that can be bound to a model section.
///
/// Implementations use interior mutability; the mapper calls them from
/// whichever thread changes the model.
pub trait MappedEditor: Send + Sync {
    /// Shows `value` in the editor.
    fn set_editor_data(&self, value: &ItemData);

    /// The value currently held by the editor.
    fn editor_data(&self) -> ItemData;
}

/// When editor values are written back to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum SubmitPolicy {
    /// Every commit is written to the model right away.
    #[default]
    #[serde(rename = "auto")]
    AutoSubmit,
    /// Commits are queued until [`DataWidgetMapper::submit`].
    #[serde(rename = "manual")]
    ManualSubmit,
}

struct Mapping {
    editor: Arc<dyn MappedEditor>,
    section: usize,
}

#[derive(Default)]
struct MapperState {
    model: Option<Arc<dyn ItemModel>>,
    connection: Option<ConnectionId>,
    orientation: Orientation,
    submit_policy: SubmitPolicy,
    current: usize,
    mappings: SlotMap<MappingId, Mapping>,
    pending: Vec<MappingId>,
}

impl MapperState {
    /// The model cell a section addresses at the current index.
    fn cell(&self, section: usize) -> (usize, usize) {
        match self.orientation {
            Orientation::Vertical => (section, self.current),
            Orientation::Horizontal => (self.current, section),
        }
    }

    /// Number of positions the current index can take.
    fn index_count(&self, model: &dyn ItemModel) -> usize {
        let root = ModelIndex::invalid();
        match self.orientation {
            Orientation::Vertical => model.column_count(&root),
            Orientation::Horizontal => model.row_count(&root),
        }
    }

    fn model_index(&self, model: &dyn ItemModel, section: usize) -> ModelIndex {
        let (row, column) = self.cell(section);
        model.index(row, column, &ModelIndex::invalid())
    }

    /// Editors and the indices they show, for the given mappings.
    fn cells(
        &self,
        model: &dyn ItemModel,
        ids: impl IntoIterator<Item = MappingId>,
    ) -> Vec<(Arc<dyn MappedEditor>, ModelIndex)> {
        ids.into_iter()
            .filter_map(|id| self.mappings.get(id))
            .map(|mapping| {
                (
                    mapping.editor.clone(),
                    self.model_index(model, mapping.section),
                )
            })
            .collect()
    }
}

/// Binds editors to sections of an [`ItemModel`].
///
/// Model and editor calls are made with the mapper's internal lock released,
/// so editors and observers may call back into the mapper.
pub struct DataWidgetMapper {
    state: Arc<Mutex<MapperState>>,
    /// Emitted with the new current index after it changes.
    pub current_index_changed: Signal<usize>,
}

impl Default for DataWidgetMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl DataWidgetMapper {
    /// Creates a mapper with no model and no mappings.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MapperState::default())),
            current_index_changed: Signal::new(),
        }
    }

    /// Sets the model to map, replacing any previous one.
    ///
    /// The previous model's change subscription is disconnected, pending
    /// commits are dropped, the current index goes back to 0 and every
    /// editor is refreshed from the new model.
    pub fn set_model(&self, model: Arc<dyn ItemModel>) {
        let previous = {
            let mut state = self.state.lock();
            state.pending.clear();
            state.current = 0;
            let previous = state.model.take().zip(state.connection.take());
            state.model = Some(model.clone());
            previous
        };
        if let Some((old_model, connection)) = previous {
            old_model.signals().data_changed.disconnect(connection);
        }

        let weak = Arc::downgrade(&self.state);
        let connection = model
            .signals()
            .data_changed
            .connect(move |(top_left, bottom_right, _roles)| {
                refresh_changed(&weak, top_left, bottom_right);
            });
        self.state.lock().connection = Some(connection);

        tracing::debug!(target: targets::MAPPER, "mapper model set");
        self.populate();
    }

    /// Detaches the current model, if any.
    pub fn clear_model(&self) {
        let previous = {
            let mut state = self.state.lock();
            state.pending.clear();
            state.current = 0;
            state.model.take().zip(state.connection.take())
        };
        if let Some((model, connection)) = previous {
            model.signals().data_changed.disconnect(connection);
        }
    }

    /// The mapped model.
    pub fn model(&self) -> Option<Arc<dyn ItemModel>> {
        self.state.lock().model.clone()
    }

    /// Sets whether sections address rows (vertical) or columns
    /// (horizontal), then refreshes every editor.
    pub fn set_orientation(&self, orientation: Orientation) {
        {
            let mut state = self.state.lock();
            if state.orientation == orientation {
                return;
            }
            state.orientation = orientation;
            state.current = 0;
            state.pending.clear();
        }
        self.populate();
    }

    /// The current orientation.
    pub fn orientation(&self) -> Orientation {
        self.state.lock().orientation
    }

    /// Sets when commits reach the model.
    pub fn set_submit_policy(&self, policy: SubmitPolicy) {
        self.state.lock().submit_policy = policy;
    }

    /// The current submit policy.
    pub fn submit_policy(&self) -> SubmitPolicy {
        self.state.lock().submit_policy
    }

    /// Maps `editor` to `section` and shows the section's current value in
    /// it.
    pub fn add_mapping(&self, editor: Arc<dyn MappedEditor>, section: usize) -> MappingId {
        let (id, target) = {
            let mut state = self.state.lock();
            let id = state.mappings.insert(Mapping { editor, section });
            let target = state
                .model
                .clone()
                .map(|model| (model.clone(), state.cells(&*model, [id])));
            (id, target)
        };
        if let Some((model, cells)) = target {
            show(&*model, cells);
        }
        tracing::trace!(target: targets::MAPPER, section, "mapping added");
        id
    }

    /// Removes a mapping. Returns `false` if `id` was not mapped.
    pub fn remove_mapping(&self, id: MappingId) -> bool {
        let mut state = self.state.lock();
        state.pending.retain(|pending| *pending != id);
        state.mappings.remove(id).is_some()
    }

    /// Removes every mapping.
    pub fn clear_mappings(&self) {
        let mut state = self.state.lock();
        state.pending.clear();
        state.mappings.clear();
    }

    /// The section a mapping is bound to.
    pub fn mapped_section(&self, id: MappingId) -> Option<usize> {
        self.state.lock().mappings.get(id).map(|mapping| mapping.section)
    }

    /// Number of mappings.
    pub fn mapping_count(&self) -> usize {
        self.state.lock().mappings.len()
    }

    /// The current row (vertical) or column (horizontal) index.
    pub fn current_index(&self) -> usize {
        self.state.lock().current
    }

    /// Moves to `index` and refreshes every editor.
    ///
    /// Uncommitted changes queued under manual submission are discarded.
    ///
    /// # Errors
    ///
    /// - [`BindingError::NoModel`] without a model.
    /// - [`BindingError::IndexOutOfRange`] if the model has no such row
    ///   (horizontal) or column (vertical).
    pub fn set_current_index(&self, index: usize) -> Result<()> {
        let changed = {
            let mut state = self.state.lock();
            let model = state.model.clone().ok_or(BindingError::NoModel)?;
            let count = state.index_count(&*model);
            if index >= count {
                return Err(BindingError::out_of_range(index, count));
            }
            state.pending.clear();
            let changed = state.current != index;
            state.current = index;
            changed
        };
        self.populate();
        if changed {
            self.current_index_changed.emit(index);
        }
        Ok(())
    }

    /// Moves to the first index.
    pub fn to_first(&self) -> Result<()> {
        self.set_current_index(0)
    }

    /// Moves to the last index.
    pub fn to_last(&self) -> Result<()> {
        let count = {
            let state = self.state.lock();
            let model = state.model.clone().ok_or(BindingError::NoModel)?;
            state.index_count(&*model)
        };
        if count == 0 {
            return Err(BindingError::out_of_range(0, 0));
        }
        self.set_current_index(count - 1)
    }

    /// Moves to the next index.
    pub fn to_next(&self) -> Result<()> {
        self.set_current_index(self.current_index() + 1)
    }

    /// Moves to the previous index. Does nothing at the first index.
    pub fn to_previous(&self) -> Result<()> {
        match self.current_index().checked_sub(1) {
            Some(index) => self.set_current_index(index),
            None => self.model().map(|_| ()).ok_or(BindingError::NoModel),
        }
    }

    /// Writes the value of the editor behind `id` to the model, or queues
    /// it under [`SubmitPolicy::ManualSubmit`].
    ///
    /// Editors call this when their value changes, for example on a toggle
    /// or a slider move.
    pub fn commit(&self, id: MappingId) -> Result<()> {
        let write = {
            let mut state = self.state.lock();
            if !state.mappings.contains_key(id) {
                return Err(BindingError::UnknownMapping);
            }
            let model = state.model.clone().ok_or(BindingError::NoModel)?;
            match state.submit_policy {
                SubmitPolicy::AutoSubmit => Some((model.clone(), state.cells(&*model, [id]))),
                SubmitPolicy::ManualSubmit => {
                    if !state.pending.contains(&id) {
                        state.pending.push(id);
                    }
                    None
                }
            }
        };
        if let Some((model, cells)) = write {
            write_back(&*model, cells);
        }
        Ok(())
    }

    /// Writes every mapped editor's value to the model.
    ///
    /// Returns `Ok(false)` if the model rejected any of the writes.
    pub fn submit(&self) -> Result<bool> {
        let (model, cells) = {
            let mut state = self.state.lock();
            let model = state.model.clone().ok_or(BindingError::NoModel)?;
            state.pending.clear();
            let ids: Vec<_> = state.mappings.keys().collect();
            let cells = state.cells(&*model, ids);
            (model, cells)
        };
        Ok(write_back(&*model, cells))
    }

    /// Returns `true` if commits are waiting for [`submit`](Self::submit).
    pub fn has_pending_changes(&self) -> bool {
        !self.state.lock().pending.is_empty()
    }

    /// Drops queued commits and refreshes every editor from the model.
    pub fn revert(&self) {
        self.state.lock().pending.clear();
        self.populate();
    }

    /// Refreshes every editor from the model.
    fn populate(&self) {
        let _span = PerfSpan::new(span_names::MAPPER_POPULATE);
        let target = {
            let state = self.state.lock();
            state.model.clone().map(|model| {
                let ids: Vec<_> = state.mappings.keys().collect();
                let cells = state.cells(&*model, ids);
                (model, cells)
            })
        };
        if let Some((model, cells)) = target {
            show(&*model, cells);
        }
    }
}

impl Drop for DataWidgetMapper {
    fn drop(&mut self) {
        self.clear_model();
    }
}

impl fmt::Debug for DataWidgetMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DataWidgetMapper")
            .field("has_model", &state.model.is_some())
            .field("orientation", &state.orientation)
            .field("submit_policy", &state.submit_policy)
            .field("current", &state.current)
            .field("mappings", &state.mappings.len())
            .field("pending", &state.pending.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(DataWidgetMapper: Send, Sync);

/// Pushes model values into editors. Invalid cells clear the editor.
fn show(model: &dyn ItemModel, cells: Vec<(Arc<dyn MappedEditor>, ModelIndex)>) {
    for (editor, index) in cells {
        editor.set_editor_data(&model.data(&index, ItemRole::Edit));
    }
}

/// Pushes editor values into the model. Returns `false` if any write was
/// rejected.
fn write_back(model: &dyn ItemModel, cells: Vec<(Arc<dyn MappedEditor>, ModelIndex)>) -> bool {
    let mut accepted = true;
    for (editor, index) in cells {
        if !model.set_data(&index, editor.editor_data(), ItemRole::Edit) {
            tracing::warn!(target: targets::MAPPER, ?index, "model rejected editor value");
            accepted = false;
        }
    }
    accepted
}

/// Slot for the model's `data_changed`: refreshes the editors showing a
/// changed cell.
fn refresh_changed(state: &Weak<Mutex<MapperState>>, top_left: &ModelIndex, bottom_right: &ModelIndex) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let target = {
        let state = state.lock();
        state.model.clone().map(|model| {
            let ids: Vec<_> = state
                .mappings
                .iter()
                .filter(|(_, mapping)| {
                    state
                        .model_index(&*model, mapping.section)
                        .is_within(top_left, bottom_right)
                })
                .map(|(id, _)| id)
                .collect();
            let cells = state.cells(&*model, ids);
            (model, cells)
        })
    };
    if let Some((model, cells)) = target {
        tracing::trace!(target: targets::MAPPER, editors = cells.len(), "refreshing editors");
        show(&*model, cells);
    }
}
