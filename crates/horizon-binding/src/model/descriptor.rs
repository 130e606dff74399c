//! Field descriptors.
//!
//! A [`FieldDescriptor`] is a named slot declared once, at type-definition
//! time, for a [`DescriptorType`](super::DescriptorType). Every model
//! instance of that type gets its own backing slot for the descriptor, seeded
//! with the descriptor's initial value. [`Field<T>`] is the typed handle
//! consumers usually declare.
//!
//! # Example
//!
//! ```
//! use std::sync::LazyLock;
//! use horizon_binding::model::{
//!     DescriptorBase, DescriptorModel, DescriptorType, Field, HasDescriptorModel, SchemaBuilder,
//! };
//!
//! static COUNT: LazyLock<Field<i64>> = LazyLock::new(|| Field::with_default("count", 3));
//!
//! struct Counter {
//!     model: DescriptorModel,
//! }
//!
//! impl DescriptorType for Counter {
//!     type Parent = DescriptorBase;
//!
//!     fn declare(fields: &mut SchemaBuilder) {
//!         fields.field(&COUNT);
//!     }
//! }
//!
//! impl HasDescriptorModel for Counter {
//!     fn descriptor_model(&self) -> &DescriptorModel {
//!         &self.model
//!     }
//! }
//!
//! let counter = Counter { model: DescriptorModel::new::<Counter>().unwrap() };
//! assert_eq!(COUNT.get(&counter).unwrap(), Some(3));
//! COUNT.set(&counter, 4).unwrap();
//! assert_eq!(COUNT.value(&counter).unwrap(), 4);
//! assert_eq!(COUNT.section().unwrap(), 0);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::OnceLock;

use super::descriptor_model::HasDescriptorModel;
use super::role::{CheckState, ItemData};
use super::schema::DescriptorType;
use crate::error::{BindingError, Result};

/// Prefix that turns a public field name into its backing slot name.
///
/// Public names are Rust identifiers chosen by the declaring type, and the
/// schema rejects duplicate public names, so prefixed names cannot collide
/// with any public name of the same type.
pub const BACKING_PREFIX: char = '_';

/// A named, dynamically typed slot declared on a descriptor type.
///
/// The descriptor itself is class-level state: it is shared by every model
/// instance of its owning type, while each instance stores its own value.
pub struct FieldDescriptor {
    name: &'static str,
    backing_name: String,
    initial: ItemData,
    owner: OnceLock<&'static str>,
    section: OnceLock<usize>,
}

impl FieldDescriptor {
    /// Declares a field named `name` whose slots start out as `initial`.
    ///
    /// Pass `ItemData::None` for a field without an initial value.
    pub fn new(name: &'static str, initial: impl Into<ItemData>) -> Self {
        Self {
            name,
            backing_name: format!("{BACKING_PREFIX}{name}"),
            initial: initial.into(),
            owner: OnceLock::new(),
            section: OnceLock::new(),
        }
    }

    /// The public name of the field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The private name of the backing slot (`"_" + name`).
    pub fn backing_name(&self) -> &str {
        &self.backing_name
    }

    /// The value every new instance starts with.
    pub fn initial_value(&self) -> &ItemData {
        &self.initial
    }

    /// The type that declared this field, once a schema containing it has
    /// been resolved.
    pub fn owner(&self) -> Option<&'static str> {
        self.owner.get().copied()
    }

    /// Returns `true` once the field has been assigned an index.
    pub fn is_assigned(&self) -> bool {
        self.section.get().is_some()
    }

    /// The index assigned to this field within its declaring type's schema.
    ///
    /// This is the class-level index used to configure mappings before or
    /// after instances exist. Subtypes place inherited fields at other
    /// indices, so bind an inherited field through
    /// [`section_in`](Self::section_in) with the concrete type instead.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::IndexUnassigned`] until the first model of the
    /// declaring type (or of a subtype) has been constructed.
    pub fn section(&self) -> Result<usize> {
        self.section
            .get()
            .copied()
            .ok_or_else(|| BindingError::unassigned(self.name))
    }

    /// The row of this field in models of type `T`.
    ///
    /// Resolves the schema of `T` if needed. Unlike [`section`](Self::section),
    /// this accounts for `T` placing its own fields ahead of inherited ones.
    ///
    /// # Errors
    ///
    /// [`BindingError::IndexUnassigned`] if `T` does not have this field, or
    /// any error from resolving `T`.
    pub fn section_in<T: DescriptorType>(&self) -> Result<usize> {
        T::schema()?.section_for(self)
    }

    /// Records the declaring type. Called by schema resolution only, with
    /// the registry's write lock held.
    pub(crate) fn claim(&self, owner: &'static str, section: usize) {
        let claimed = *self.owner.get_or_init(|| owner);
        debug_assert_eq!(claimed, owner, "'{}' claimed by two types", self.name);
        let assigned = *self.section.get_or_init(|| section);
        debug_assert_eq!(assigned, section, "declaration order of '{owner}' changed");
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("backing_name", &self.backing_name)
            .field("initial", &self.initial)
            .field("owner", &self.owner.get())
            .field("section", &self.section.get())
            .finish()
    }
}

/// Conversion between Rust values and [`ItemData`] for typed fields.
pub trait FieldValue: Sized {
    /// Variant name reported in type mismatch errors.
    const KIND: &'static str;

    /// Converts the value into item data.
    fn into_data(self) -> ItemData;

    /// Converts item data back, or `None` if the variant does not fit.
    fn from_data(data: &ItemData) -> Option<Self>;
}

impl FieldValue for i64 {
    const KIND: &'static str = "int";

    fn into_data(self) -> ItemData {
        ItemData::Int(self)
    }

    fn from_data(data: &ItemData) -> Option<Self> {
        data.as_int()
    }
}

macro_rules! narrow_int_field_value {
    ($($ty:ty),*) => {$(
        impl FieldValue for $ty {
            const KIND: &'static str = "int";

            fn into_data(self) -> ItemData {
                ItemData::Int(i64::from(self))
            }

            fn from_data(data: &ItemData) -> Option<Self> {
                data.as_int().and_then(|n| <$ty>::try_from(n).ok())
            }
        }
    )*};
}

// Only types that widen losslessly into `i64`.
narrow_int_field_value!(i32, u32);

impl FieldValue for f64 {
    const KIND: &'static str = "float";

    fn into_data(self) -> ItemData {
        ItemData::Float(self)
    }

    fn from_data(data: &ItemData) -> Option<Self> {
        data.as_float()
    }
}

impl FieldValue for f32 {
    const KIND: &'static str = "float";

    fn into_data(self) -> ItemData {
        ItemData::Float(self as f64)
    }

    fn from_data(data: &ItemData) -> Option<Self> {
        data.as_float().map(|n| n as f32)
    }
}

impl FieldValue for bool {
    const KIND: &'static str = "bool";

    fn into_data(self) -> ItemData {
        ItemData::Bool(self)
    }

    fn from_data(data: &ItemData) -> Option<Self> {
        data.as_bool()
    }
}

impl FieldValue for String {
    const KIND: &'static str = "string";

    fn into_data(self) -> ItemData {
        ItemData::String(self)
    }

    fn from_data(data: &ItemData) -> Option<Self> {
        data.as_string().map(str::to_owned)
    }
}

impl FieldValue for CheckState {
    const KIND: &'static str = "check state";

    fn into_data(self) -> ItemData {
        ItemData::CheckState(self)
    }

    fn from_data(data: &ItemData) -> Option<Self> {
        data.as_check_state()
    }
}

/// A typed handle over a [`FieldDescriptor`].
///
/// Declare fields in `static`s (usually through `LazyLock`) and register
/// them from [`DescriptorType::declare`](super::DescriptorType::declare).
/// `Field<T>` dereferences to its descriptor, so `FIELD.section()` and
/// `FIELD.name()` work directly.
pub struct Field<T> {
    descriptor: FieldDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FieldValue> Field<T> {
    /// Declares a field without an initial value (its slots start absent).
    pub fn declare(name: &'static str) -> Self {
        Self {
            descriptor: FieldDescriptor::new(name, ItemData::None),
            _marker: PhantomData,
        }
    }

    /// Declares a field whose slots start out as `initial`.
    pub fn with_default(name: &'static str, initial: T) -> Self {
        Self {
            descriptor: FieldDescriptor::new(name, initial.into_data()),
            _marker: PhantomData,
        }
    }

    /// The untyped descriptor.
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// Reads the field from `model`.
    ///
    /// Returns `Ok(None)` while the slot is absent.
    ///
    /// # Errors
    ///
    /// - [`BindingError::IndexUnassigned`] if the model's type does not have
    ///   this field.
    /// - [`BindingError::TypeMismatch`] if the slot holds another variant.
    pub fn get<M: HasDescriptorModel + ?Sized>(&self, model: &M) -> Result<Option<T>> {
        let data = model.descriptor_model().value(&self.descriptor)?;
        if data.is_none() {
            return Ok(None);
        }
        T::from_data(&data)
            .map(Some)
            .ok_or_else(|| self.mismatch(&data))
    }

    /// Reads the field from `model`, treating an absent slot as a type
    /// mismatch.
    pub fn value<M: HasDescriptorModel + ?Sized>(&self, model: &M) -> Result<T> {
        self.get(model)?
            .ok_or_else(|| self.mismatch(&ItemData::None))
    }

    /// Writes the field on `model` and notifies observers of its row.
    pub fn set<M: HasDescriptorModel + ?Sized>(&self, model: &M, value: T) -> Result<()> {
        model
            .descriptor_model()
            .set_value(&self.descriptor, value.into_data())
    }

    /// Resets the field on `model` to the absent value.
    pub fn clear<M: HasDescriptorModel + ?Sized>(&self, model: &M) -> Result<()> {
        model
            .descriptor_model()
            .set_value(&self.descriptor, ItemData::None)
    }

    fn mismatch(&self, found: &ItemData) -> BindingError {
        BindingError::TypeMismatch {
            name: self.descriptor.name.to_string(),
            expected: T::KIND,
            found: found.kind(),
        }
    }
}

impl<T> Deref for Field<T> {
    type Target = FieldDescriptor;

    fn deref(&self) -> &FieldDescriptor {
        &self.descriptor
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.descriptor, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backing_name() {
        let descriptor = FieldDescriptor::new("k_pow", 1.5);
        assert_eq!(descriptor.name(), "k_pow");
        assert_eq!(descriptor.backing_name(), "_k_pow");
        assert_ne!(descriptor.backing_name(), descriptor.name());
        assert_eq!(descriptor.initial_value(), &ItemData::Float(1.5));
    }

    #[test]
    fn test_unassigned_until_claimed() {
        let descriptor = FieldDescriptor::new("x", ItemData::None);
        assert!(!descriptor.is_assigned());
        assert!(descriptor.owner().is_none());
        assert!(matches!(
            descriptor.section(),
            Err(BindingError::IndexUnassigned { name }) if name == "x"
        ));

        descriptor.claim("Star", 1);
        assert_eq!(descriptor.section().unwrap(), 1);
        assert_eq!(descriptor.owner(), Some("Star"));

        // Re-claiming with the same position is a no-op
        descriptor.claim("Star", 1);
        assert_eq!(descriptor.section().unwrap(), 1);
    }

    #[test]
    fn test_field_defaults() {
        let absent: Field<i64> = Field::declare("a");
        assert_eq!(absent.initial_value(), &ItemData::None);

        let rainbow = Field::with_default("rainbow", false);
        assert_eq!(rainbow.initial_value(), &ItemData::Bool(false));
    }

    #[test]
    fn test_narrow_ints_reject_out_of_range() {
        assert_eq!(i32::from_data(&ItemData::Int(7)), Some(7));
        assert_eq!(u32::from_data(&ItemData::Int(-1)), None);
        assert_eq!(u32::from_data(&ItemData::Int(i64::from(u32::MAX) + 1)), None);
        assert_eq!(i32::from_data(&ItemData::Float(7.0)), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "claimed by two types")]
    fn test_claim_by_second_owner_panics() {
        let descriptor = FieldDescriptor::new("y", ItemData::None);
        descriptor.claim("Star", 0);
        descriptor.claim("Planet", 0);
    }

    #[test]
    fn test_narrow_ints_round_trip_through_model() {
        use std::sync::LazyLock;

        use crate::model::{DescriptorBase, DescriptorModel, SchemaBuilder};

        static SEED: LazyLock<Field<u32>> = LazyLock::new(|| Field::with_default("seed", 0));
        static OFFSET: LazyLock<Field<i32>> = LazyLock::new(|| Field::declare("offset"));

        struct Noise;
        impl DescriptorType for Noise {
            type Parent = DescriptorBase;
            fn declare(fields: &mut SchemaBuilder) {
                fields.field(&SEED).field(&OFFSET);
            }
        }

        let model = DescriptorModel::new::<Noise>().unwrap();
        SEED.set(&model, u32::MAX).unwrap();
        OFFSET.set(&model, i32::MIN).unwrap();

        assert_eq!(SEED.value(&model).unwrap(), u32::MAX);
        assert_eq!(OFFSET.value(&model).unwrap(), i32::MIN);
        assert_eq!(model.value(&SEED).unwrap(), ItemData::Int(4_294_967_295));

        // A stored value outside the field's range is reported on read
        model.set_value(&SEED, ItemData::Int(-1)).unwrap();
        assert!(matches!(
            SEED.get(&model),
            Err(BindingError::TypeMismatch { expected: "int", found: "int", .. })
        ));
    }

    #[test]
    fn test_float_accepts_int_data() {
        assert_eq!(f64::from_data(&ItemData::Int(2)), Some(2.0));
        assert_eq!(f32::from_data(&ItemData::Float(0.25)), Some(0.25));
        assert_eq!(bool::from_data(&ItemData::Int(1)), None);
    }
}
