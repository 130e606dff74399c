//! Horizon Binding - descriptor-driven list models for Model/View bindings.
//!
//! Application types declare named fields once, read and write them through
//! ordinary typed accessors, and expose the same values as the rows of a
//! single-column [`ItemModel`](model::ItemModel) that mappers and views can
//! bind to.
//!
//! # Example
//!
//! ```
//! use std::sync::LazyLock;
//! use horizon_binding::prelude::*;
//!
//! static A: LazyLock<Field<i64>> = LazyLock::new(|| Field::with_default("a", 7));
//! static B: LazyLock<Field<bool>> = LazyLock::new(|| Field::with_default("b", false));
//!
//! struct Pair {
//!     model: DescriptorModel,
//! }
//!
//! impl DescriptorType for Pair {
//!     type Parent = DescriptorBase;
//!
//!     fn declare(fields: &mut SchemaBuilder) {
//!         fields.field(&A).field(&B);
//!     }
//! }
//!
//! impl HasDescriptorModel for Pair {
//!     fn descriptor_model(&self) -> &DescriptorModel {
//!         &self.model
//!     }
//! }
//!
//! fn main() -> horizon_binding::Result<()> {
//!     let pair = Pair { model: DescriptorModel::new::<Pair>()? };
//!     let root = ModelIndex::invalid();
//!     assert_eq!(pair.row_count(&root), 2);
//!
//!     let first = pair.index(0, 0, &root);
//!     assert!(pair.set_data(&first, ItemData::Int(42), ItemRole::Edit));
//!     assert_eq!(A.value(&pair)?, 42);
//!     Ok(())
//! }
//! ```

pub use horizon_binding_core::*;

pub mod config;
pub mod error;
pub mod model;
pub mod prelude;

pub use error::{BindingError, Result};
