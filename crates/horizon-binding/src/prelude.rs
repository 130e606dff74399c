//! Prelude module for Horizon Binding.
//!
//! ```ignore
//! use horizon_binding::prelude::*;
//! ```
//!
//! This provides access to:
//! - Field declaration (`Field`, `DescriptorType`, `SchemaBuilder`)
//! - Descriptor models (`DescriptorModel`, `HasDescriptorModel`)
//! - Model/View types (`ItemModel`, `ModelIndex`, `ItemRole`, `ItemData`)
//! - Bindings (`DataWidgetMapper`, `MappedEditor`, `CellView`)

// ============================================================================
// Signal/Slot System
// ============================================================================

pub use crate::{ConnectionId, Signal};

// ============================================================================
// Descriptors and Models
// ============================================================================

pub use crate::model::{
    DescriptorBase, DescriptorModel, DescriptorType, Field, FieldDescriptor, HasDescriptorModel,
    Schema, SchemaBuilder,
};

// ============================================================================
// Model/View
// ============================================================================

pub use crate::model::{
    CheckState, ItemData, ItemFlags, ItemModel, ItemRole, ModelIndex, ModelSignals, Orientation,
};

// ============================================================================
// Bindings
// ============================================================================

pub use crate::config::MapperConfig;
pub use crate::model::{CellView, DataWidgetMapper, MappedEditor, MappingId, SubmitPolicy};

// ============================================================================
// Errors
// ============================================================================

pub use crate::error::{BindingError, Result};
