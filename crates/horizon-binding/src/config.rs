//! Mapper configuration files.
//!
//! A [`MapperConfig`] describes how a [`DataWidgetMapper`] is set up: its
//! orientation, its submit policy and which editor shows which field.
//! Fields are named rather than numbered, so a configuration keeps working
//! when a type's field order changes.
//!
//! ```toml
//! orientation = "vertical"
//! submit_policy = "auto"
//!
//! [[mapping]]
//! editor = "k_slider"
//! field = "k"
//!
//! [[mapping]]
//! editor = "rainbow_toggle"
//! field = "rainbow"
//! ```

use std::path::Path;
use std::sync::Arc;

use horizon_binding_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::error::{BindingError, Result};
use crate::model::{DataWidgetMapper, MappedEditor, MappingId, Orientation, Schema, SubmitPolicy};

/// One `[[mapping]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingConfig {
    /// Name the application registered the editor under.
    pub editor: String,
    /// Field name in the model's schema.
    pub field: String,
}

/// Mapper settings and editor-to-field mappings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapperConfig {
    /// Whether sections are rows (`"vertical"`) or columns (`"horizontal"`).
    #[serde(default)]
    pub orientation: Orientation,
    /// `"auto"` or `"manual"`.
    #[serde(default)]
    pub submit_policy: SubmitPolicy,
    /// Mappings, in the order they are added to the mapper.
    #[serde(default, rename = "mapping")]
    pub mappings: Vec<MappingConfig>,
}

/// A mapping whose field name has been looked up in a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping {
    /// Editor name from the configuration.
    pub editor: String,
    /// Field name as declared.
    pub field: &'static str,
    /// Row of the field in the schema.
    pub section: usize,
}

impl MapperConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|source| BindingError::ConfigParse { source })
    }

    /// Reads and parses a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| BindingError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            target: targets::CONFIG,
            path = %path.display(),
            mappings = config.mappings.len(),
            "loaded mapper configuration"
        );
        Ok(config)
    }

    /// Looks up every mapped field in `schema`.
    ///
    /// # Errors
    ///
    /// [`BindingError::UnknownField`] for the first field the schema does
    /// not have.
    pub fn resolve(&self, schema: &Schema) -> Result<Vec<ResolvedMapping>> {
        self.mappings
            .iter()
            .map(|mapping| {
                let section = schema
                    .section_of(&mapping.field)
                    .ok_or_else(|| BindingError::unknown_field(&mapping.field, schema.type_name()))?;
                Ok(ResolvedMapping {
                    editor: mapping.editor.clone(),
                    field: schema.name_at(section)?,
                    section,
                })
            })
            .collect()
    }

    /// Configures `mapper` and adds every mapping.
    ///
    /// `lookup` returns the editor registered under a name. All fields and
    /// editors are checked before the mapper is touched, so a failed apply
    /// leaves it unchanged. Returns each editor name with its mapping id.
    ///
    /// # Errors
    ///
    /// [`BindingError::UnknownField`] or [`BindingError::UnknownEditor`].
    pub fn apply<F>(
        &self,
        mapper: &DataWidgetMapper,
        schema: &Schema,
        mut lookup: F,
    ) -> Result<Vec<(String, MappingId)>>
    where
        F: FnMut(&str) -> Option<Arc<dyn MappedEditor>>,
    {
        let resolved = self.resolve(schema)?;
        let editors = resolved
            .iter()
            .map(|mapping| {
                lookup(&mapping.editor).ok_or_else(|| BindingError::UnknownEditor {
                    name: mapping.editor.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        mapper.set_orientation(self.orientation);
        mapper.set_submit_policy(self.submit_policy);
        let ids = resolved
            .into_iter()
            .zip(editors)
            .map(|(mapping, editor)| {
                let id = mapper.add_mapping(editor, mapping.section);
                (mapping.editor, id)
            })
            .collect();
        Ok(ids)
    }
}
