//! Descriptor-backed models and the Model/View types they plug into.
//!
//! Application types declare named fields once, at type-definition time, and
//! get per-instance storage whose values are also the rows of a
//! single-column list model. Views and mappers bind to that model and stay
//! synchronized through its `data_changed` signal.
//!
//! # Core Types
//!
//! - `Field` / `FieldDescriptor`: a named slot with an initial value
//! - `DescriptorType`: declares a type's fields and its parent type
//! - `Schema`: the resolved index table of a type (index ↔ field name)
//! - `DescriptorModel`: per-instance storage, exposed as an `ItemModel`
//! - `ModelIndex`, `ItemRole`, `ItemData`: how cells are addressed and read
//! - `DataWidgetMapper`, `CellView`: bind editors and displays to cells
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────────┐  set   ┌──────────────────┐  data_changed  ┌──────────────────┐
//! │ Field<T> statics │──────> │ DescriptorModel  │──────────────> │ DataWidgetMapper │
//! │ (DescriptorType) │        │   (ItemModel)    │ <────────────  │    CellView      │
//! └──────────────────┘        └──────────────────┘  data/set_data └──────────────────┘
//!          │                           │
//!          └──────── Schema ───────────┘
//!             (index ↔ field name)
//! ```

mod cell_view;
mod descriptor;
mod descriptor_model;
mod index;
mod mapper;
mod role;
mod schema;
mod traits;

pub use cell_view::CellView;
pub use descriptor::{BACKING_PREFIX, Field, FieldDescriptor, FieldValue};
pub use descriptor_model::{DescriptorModel, HasDescriptorModel};
pub use index::ModelIndex;
pub use mapper::{DataWidgetMapper, MappedEditor, MappingId, SubmitPolicy};
pub use role::{CheckState, ItemData, ItemRole};
pub use schema::{DescriptorBase, DescriptorType, Schema, SchemaBuilder, is_resolved, resolve};
pub use traits::{ItemFlags, ItemModel, ModelSignals, Orientation};
