//! The attribute-indexed list model.
//!
//! [`DescriptorModel`] holds one slot per field of a [`DescriptorType`] and
//! exposes the slots as the rows of a single-column [`ItemModel`]. Writes go
//! through [`set_value`](DescriptorModel::set_value) (or the typed
//! [`Field::set`](super::Field::set)), which stores the value and then emits a
//! single `data_changed` notification for the affected row.
//!
//! Consumer types embed a `DescriptorModel` and implement
//! [`HasDescriptorModel`]; they then get the `ItemModel` implementation for
//! free and can be shared with views and mappers as `Arc<dyn ItemModel>`.

use std::fmt::Write as _;
use std::sync::Arc;

use horizon_binding_core::logging::targets;
use parking_lot::RwLock;

use super::descriptor::FieldDescriptor;
use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};
use super::schema::{DescriptorType, Schema};
use super::traits::{ItemFlags, ItemModel, ModelSignals, Orientation};
use crate::error::{BindingError, Result};

/// Roles reported by every change notification.
const CHANGED_ROLES: [ItemRole; 2] = [ItemRole::Display, ItemRole::Edit];

/// Per-instance storage for the fields of one descriptor type.
pub struct DescriptorModel {
    schema: Arc<Schema>,
    slots: RwLock<Vec<ItemData>>,
    signals: ModelSignals,
}

impl DescriptorModel {
    /// Constructs the storage for a `T` instance.
    ///
    /// The first construction for a type resolves its schema and assigns
    /// field indices; later constructions reuse the cached schema. Every
    /// slot starts out holding its descriptor's initial value.
    ///
    /// # Errors
    ///
    /// Fails if the type's schema cannot be resolved (see
    /// [`resolve`](super::resolve)).
    pub fn new<T: DescriptorType>() -> Result<Self> {
        Ok(Self::from_schema(T::schema()?))
    }

    /// Constructs storage for an already-resolved schema.
    pub fn from_schema(schema: Arc<Schema>) -> Self {
        let slots = schema
            .iter()
            .map(|(_, descriptor)| descriptor.initial_value().clone())
            .collect();
        Self {
            schema,
            slots: RwLock::new(slots),
            signals: ModelSignals::new(),
        }
    }

    /// The schema this model was built from.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Number of fields (rows).
    pub fn len(&self) -> usize {
        self.schema.len()
    }

    /// Returns `true` if the type has no fields.
    pub fn is_empty(&self) -> bool {
        self.schema.is_empty()
    }

    /// Returns the current value of `descriptor`.
    ///
    /// # Errors
    ///
    /// [`BindingError::IndexUnassigned`] if the descriptor is not part of this
    /// model's schema.
    pub fn value(&self, descriptor: &FieldDescriptor) -> Result<ItemData> {
        let row = self.schema.section_for(descriptor)?;
        Ok(self.slots.read()[row].clone())
    }

    /// Stores `value` for `descriptor` and notifies observers.
    ///
    /// Exactly one `data_changed` is emitted, after the value is stored and
    /// before this returns.
    pub fn set_value(&self, descriptor: &FieldDescriptor, value: ItemData) -> Result<()> {
        let row = self.schema.section_for(descriptor)?;
        self.store(row, value);
        Ok(())
    }

    /// Returns the current value of the field called `name`.
    pub fn value_by_name(&self, name: &str) -> Result<ItemData> {
        let row = self.row_of(name)?;
        Ok(self.slots.read()[row].clone())
    }

    /// Stores `value` for the field called `name` and notifies observers.
    pub fn set_value_by_name(&self, name: &str, value: ItemData) -> Result<()> {
        let row = self.row_of(name)?;
        self.store(row, value);
        Ok(())
    }

    /// Checked form of [`ItemModel::data`].
    ///
    /// Returns the slot value at `row` for the `Display` and `Edit` roles and
    /// `ItemData::None` for any other role.
    ///
    /// # Errors
    ///
    /// [`BindingError::IndexOutOfRange`] if `row` is not below [`len`](Self::len).
    pub fn data_at(&self, row: usize, role: ItemRole) -> Result<ItemData> {
        let slots = self.slots.read();
        let value = slots
            .get(row)
            .ok_or_else(|| BindingError::out_of_range(row, slots.len()))?;
        Ok(if role.is_value_role() {
            value.clone()
        } else {
            ItemData::None
        })
    }

    /// Checked form of [`ItemModel::set_data`]. Returns `Ok(true)` once the
    /// value is stored and observers have been notified.
    pub fn set_data_at(&self, row: usize, value: ItemData) -> Result<bool> {
        if row >= self.len() {
            return Err(BindingError::out_of_range(row, self.len()));
        }
        self.store(row, value);
        Ok(true)
    }

    /// Field values in index order, as `"name = value"` lines.
    pub fn summary(&self) -> String {
        let slots = self.slots.read();
        let mut out = String::new();
        for (name, value) in self.schema.names().zip(slots.iter()) {
            let _ = writeln!(out, "{name} = {value}");
        }
        out
    }

    /// A snapshot of `(name, value)` pairs in index order.
    pub fn values(&self) -> Vec<(&'static str, ItemData)> {
        let slots = self.slots.read();
        self.schema.names().zip(slots.iter().cloned()).collect()
    }

    /// The model's signals.
    pub fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn row_of(&self, name: &str) -> Result<usize> {
        self.schema
            .section_of(name)
            .ok_or_else(|| BindingError::unknown_field(name, self.schema.type_name()))
    }

    /// Writes a slot, releases the lock, then notifies.
    fn store(&self, row: usize, value: ItemData) {
        tracing::trace!(
            target: targets::MODEL,
            type_name = self.schema.type_name(),
            row,
            kind = value.kind(),
            "field set"
        );
        {
            let mut slots = self.slots.write();
            slots[row] = value;
        }
        self.signals
            .emit_data_changed_single(ModelIndex::new(row, 0), CHANGED_ROLES.to_vec());
    }
}

impl std::fmt::Debug for DescriptorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorModel")
            .field("type_name", &self.schema.type_name())
            .field("values", &self.values())
            .finish()
    }
}

static_assertions::assert_impl_all!(DescriptorModel: Send, Sync);

/// Types backed by a [`DescriptorModel`].
///
/// Implementing this is all a consumer type needs to become an
/// [`ItemModel`] and to be usable with [`Field`](super::Field) accessors.
pub trait HasDescriptorModel {
    /// The embedded model storage.
    fn descriptor_model(&self) -> &DescriptorModel;
}

impl HasDescriptorModel for DescriptorModel {
    fn descriptor_model(&self) -> &DescriptorModel {
        self
    }
}

impl<T: HasDescriptorModel + Send + Sync> ItemModel for T {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() {
            0
        } else {
            self.descriptor_model().len()
        }
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        1
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        if !index.is_valid() || index.column() != 0 {
            return ItemData::None;
        }
        self.descriptor_model()
            .data_at(index.row(), role)
            .unwrap_or_default()
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if parent.is_valid() || column != 0 || row >= self.descriptor_model().len() {
            return ModelIndex::invalid();
        }
        ModelIndex::new(row, column)
    }

    fn signals(&self) -> &ModelSignals {
        self.descriptor_model().signals()
    }

    fn set_data(&self, index: &ModelIndex, value: ItemData, _role: ItemRole) -> bool {
        let model = self.descriptor_model();
        if !index.is_valid() || index.column() != 0 {
            tracing::warn!(target: targets::MODEL, ?index, "set_data on an invalid index");
            return false;
        }
        match model.set_data_at(index.row(), value) {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(target: targets::MODEL, %err, "set_data rejected");
                false
            }
        }
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        if index.is_valid() && index.column() == 0 && index.row() < self.descriptor_model().len() {
            ItemFlags::editable()
        } else {
            ItemFlags::none()
        }
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        if orientation != Orientation::Vertical || role != ItemRole::Display {
            return ItemData::None;
        }
        self.descriptor_model()
            .schema()
            .name_at(section)
            .map(ItemData::from)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use parking_lot::Mutex;

    use super::*;
    use crate::model::{DescriptorBase, Field, SchemaBuilder};

    static LABEL: LazyLock<Field<String>> = LazyLock::new(|| Field::with_default("label", "hi".to_string()));
    static SCALE: LazyLock<Field<f64>> = LazyLock::new(|| Field::with_default("scale", 1.0));
    static STRAY: LazyLock<Field<i64>> = LazyLock::new(|| Field::declare("stray"));

    struct Gauge;
    impl DescriptorType for Gauge {
        type Parent = DescriptorBase;
        fn declare(fields: &mut SchemaBuilder) {
            fields.field(&LABEL).field(&SCALE);
        }
    }

    fn gauge() -> DescriptorModel {
        DescriptorModel::new::<Gauge>().unwrap()
    }

    #[test]
    fn test_slots_start_at_initial_values() {
        let model = gauge();
        assert_eq!(model.len(), 2);
        assert_eq!(model.value(&LABEL).unwrap(), ItemData::from("hi"));
        assert_eq!(SCALE.get(&model).unwrap(), Some(1.0));
    }

    #[test]
    fn test_instances_do_not_share_values() {
        let first = gauge();
        let second = gauge();
        SCALE.set(&first, 2.5).unwrap();
        assert_eq!(SCALE.value(&first).unwrap(), 2.5);
        assert_eq!(SCALE.value(&second).unwrap(), 1.0);
    }

    #[test]
    fn test_foreign_descriptor_is_unassigned() {
        let model = gauge();
        assert!(matches!(
            model.value(&STRAY),
            Err(BindingError::IndexUnassigned { .. })
        ));
        assert!(matches!(
            STRAY.set(&model, 1),
            Err(BindingError::IndexUnassigned { .. })
        ));
    }

    #[test]
    fn test_by_name_access() {
        let model = gauge();
        model.set_value_by_name("label", "lo".into()).unwrap();
        assert_eq!(model.value_by_name("label").unwrap(), ItemData::from("lo"));
        assert!(matches!(
            model.value_by_name("nope"),
            Err(BindingError::UnknownField { name, .. }) if name == "nope"
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let model = gauge();
        model.set_value(&SCALE, ItemData::from("wide")).unwrap();
        assert!(matches!(
            SCALE.get(&model),
            Err(BindingError::TypeMismatch { expected: "float", found: "string", .. })
        ));
        SCALE.clear(&model).unwrap();
        assert_eq!(SCALE.get(&model).unwrap(), None);
        assert!(SCALE.value(&model).is_err());
    }

    #[test]
    fn test_item_model_contract() {
        let model = gauge();
        let root = ModelIndex::invalid();
        assert_eq!(model.row_count(&root), 2);
        assert_eq!(model.row_count(&ModelIndex::new(0, 0)), 0);
        assert_eq!(model.column_count(&root), 1);

        assert!(model.index(1, 0, &root).is_valid());
        assert!(!model.index(2, 0, &root).is_valid());
        assert!(!model.index(0, 1, &root).is_valid());

        let first = model.index(0, 0, &root);
        assert_eq!(model.flags(&first), ItemFlags::editable());
        assert!(model.flags(&ModelIndex::new(9, 0)).is_empty());

        assert_eq!(model.data(&first, ItemRole::Display), ItemData::from("hi"));
        assert_eq!(model.data(&first, ItemRole::ToolTip), ItemData::None);
        assert_eq!(model.display_text(&first).as_deref(), Some("hi"));

        assert_eq!(
            model.header_data(1, Orientation::Vertical, ItemRole::Display),
            ItemData::from("scale")
        );
        assert_eq!(
            model.header_data(1, Orientation::Horizontal, ItemRole::Display),
            ItemData::None
        );
    }

    #[test]
    fn test_set_data_reports_invalid_index() {
        let model = gauge();
        assert!(!model.set_data(&ModelIndex::invalid(), ItemData::Int(1), ItemRole::Edit));
        assert!(!model.set_data(&ModelIndex::new(2, 0), ItemData::Int(1), ItemRole::Edit));
        assert!(matches!(
            model.set_data_at(2, ItemData::Int(1)),
            Err(BindingError::IndexOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_observer_sees_stored_value() {
        let model = Arc::new(gauge());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let weak = Arc::downgrade(&model);
        let seen_clone = seen.clone();
        model.signals().data_changed.connect(move |(top_left, _, _)| {
            if let Some(model) = weak.upgrade() {
                seen_clone.lock().push(model.data(top_left, ItemRole::Display));
            }
        });

        SCALE.set(&*model, 3.0).unwrap();
        assert_eq!(*seen.lock(), vec![ItemData::Float(3.0)]);
    }

    #[test]
    fn test_summary() {
        let model = gauge();
        SCALE.set(&model, 0.5).unwrap();
        assert_eq!(model.summary(), "label = hi\nscale = 0.5\n");
    }
}
