//! Integration tests for mappers, cell views and mapper configuration files
//! over descriptor models.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, LazyLock};

use horizon_binding::prelude::*;
use parking_lot::Mutex;

static K: LazyLock<Field<f64>> = LazyLock::new(|| Field::with_default("k", 0.01));
static K_POW: LazyLock<Field<f64>> = LazyLock::new(|| Field::with_default("k_pow", 1.5));
static NUM_PLANETS: LazyLock<Field<i64>> = LazyLock::new(|| Field::with_default("num_planets", 250));
static RAINBOW: LazyLock<Field<bool>> = LazyLock::new(|| Field::with_default("rainbow", false));

struct Controls {
    model: DescriptorModel,
}

impl DescriptorType for Controls {
    type Parent = DescriptorBase;

    fn declare(fields: &mut SchemaBuilder) {
        fields
            .field(&K)
            .field(&K_POW)
            .field(&NUM_PLANETS)
            .field(&RAINBOW);
    }
}

impl HasDescriptorModel for Controls {
    fn descriptor_model(&self) -> &DescriptorModel {
        &self.model
    }
}

fn controls() -> Arc<Controls> {
    Arc::new(Controls {
        model: DescriptorModel::new::<Controls>().unwrap(),
    })
}

/// An editor that records every value the mapper shows in it.
#[derive(Default)]
struct Recorder {
    value: Mutex<ItemData>,
    shown: Mutex<Vec<ItemData>>,
}

impl Recorder {
    fn input(&self, value: ItemData) {
        *self.value.lock() = value;
    }

    fn shown(&self) -> Vec<ItemData> {
        self.shown.lock().clone()
    }
}

impl MappedEditor for Recorder {
    fn set_editor_data(&self, value: &ItemData) {
        *self.value.lock() = value.clone();
        self.shown.lock().push(value.clone());
    }

    fn editor_data(&self) -> ItemData {
        self.value.lock().clone()
    }
}

// ============================================================================
// Mapper
// ============================================================================

#[test]
fn test_mapper_follows_model_changes() {
    let model = controls();
    let mapper = DataWidgetMapper::new();
    mapper.set_model(model.clone());

    let slider = Arc::new(Recorder::default());
    let toggle = Arc::new(Recorder::default());
    mapper.add_mapping(slider.clone(), K.section().unwrap());
    mapper.add_mapping(toggle.clone(), RAINBOW.section().unwrap());

    K.set(&*model, 0.02).unwrap();

    assert_eq!(slider.shown(), vec![ItemData::Float(0.01), ItemData::Float(0.02)]);
    // Only the changed row is refreshed
    assert_eq!(toggle.shown(), vec![ItemData::Bool(false)]);
}

#[test]
fn test_auto_submit_writes_on_commit() {
    let model = controls();
    let mapper = DataWidgetMapper::new();
    mapper.set_model(model.clone());

    let toggle = Arc::new(Recorder::default());
    let id = mapper.add_mapping(toggle.clone(), RAINBOW.section().unwrap());
    assert_eq!(mapper.mapped_section(id), Some(3));

    toggle.input(ItemData::Bool(true));
    mapper.commit(id).unwrap();

    assert!(RAINBOW.value(&*model).unwrap());
    assert!(!mapper.has_pending_changes());
    // The write echoes back through data_changed
    assert_eq!(toggle.shown(), vec![ItemData::Bool(false), ItemData::Bool(true)]);
}

#[test]
fn test_manual_submit_queues_until_submit() {
    let model = controls();
    let mapper = DataWidgetMapper::new();
    mapper.set_model(model.clone());
    mapper.set_submit_policy(SubmitPolicy::ManualSubmit);

    let spin = Arc::new(Recorder::default());
    let id = mapper.add_mapping(spin.clone(), NUM_PLANETS.section().unwrap());

    spin.input(ItemData::Int(500));
    mapper.commit(id).unwrap();
    mapper.commit(id).unwrap();
    assert!(mapper.has_pending_changes());
    assert_eq!(NUM_PLANETS.value(&*model).unwrap(), 250);

    assert!(mapper.submit().unwrap());
    assert!(!mapper.has_pending_changes());
    assert_eq!(NUM_PLANETS.value(&*model).unwrap(), 500);
}

#[test]
fn test_revert_restores_editors() {
    let model = controls();
    let mapper = DataWidgetMapper::new();
    mapper.set_model(model.clone());
    mapper.set_submit_policy(SubmitPolicy::ManualSubmit);

    let dial = Arc::new(Recorder::default());
    let id = mapper.add_mapping(dial.clone(), K_POW.section().unwrap());

    dial.input(ItemData::Float(3.0));
    mapper.commit(id).unwrap();
    mapper.revert();

    assert!(!mapper.has_pending_changes());
    assert_eq!(dial.editor_data(), ItemData::Float(1.5));
    assert_eq!(K_POW.value(&*model).unwrap(), 1.5);
}

#[test]
fn test_switching_models_disconnects_previous() {
    let first = controls();
    let second = controls();
    let mapper = DataWidgetMapper::new();
    let slider = Arc::new(Recorder::default());
    mapper.add_mapping(slider.clone(), K.section().unwrap());

    mapper.set_model(first.clone());
    K.set(&*second, 0.5).unwrap();
    mapper.set_model(second.clone());
    assert_eq!(first.signals().data_changed.connection_count(), 0);
    assert_eq!(second.signals().data_changed.connection_count(), 1);

    K.set(&*first, 0.9).unwrap();
    assert_eq!(slider.shown(), vec![ItemData::Float(0.01), ItemData::Float(0.5)]);
}

#[test]
fn test_list_model_has_single_position() {
    let model = controls();
    let mapper = DataWidgetMapper::new();
    mapper.set_model(model.clone());

    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = changes.clone();
    mapper.current_index_changed.connect(move |index| sink.lock().push(*index));

    mapper.to_last().unwrap();
    assert_eq!(mapper.current_index(), 0);
    assert!(matches!(
        mapper.set_current_index(1),
        Err(BindingError::IndexOutOfRange { index: 1, count: 1 })
    ));
    assert!(changes.lock().is_empty());
}

#[test]
fn test_mapping_inherited_field_uses_subtype_row() {
    static GAIN: LazyLock<Field<f64>> = LazyLock::new(|| Field::with_default("gain", 2.0));

    struct TunedControls {
        model: DescriptorModel,
    }

    impl DescriptorType for TunedControls {
        type Parent = Controls;

        fn declare(fields: &mut SchemaBuilder) {
            fields.field(&GAIN);
        }
    }

    impl HasDescriptorModel for TunedControls {
        fn descriptor_model(&self) -> &DescriptorModel {
            &self.model
        }
    }

    let model = Arc::new(TunedControls {
        model: DescriptorModel::new::<TunedControls>().unwrap(),
    });
    let mapper = DataWidgetMapper::new();
    mapper.set_model(model.clone());

    let spin = Arc::new(Recorder::default());
    let section = NUM_PLANETS.section_in::<TunedControls>().unwrap();
    assert_eq!(section, 3);
    mapper.add_mapping(spin.clone(), section);
    assert_eq!(spin.editor_data(), ItemData::Int(250));

    NUM_PLANETS.set(&*model, 300).unwrap();
    assert_eq!(spin.editor_data(), ItemData::Int(300));
}

// ============================================================================
// Cell view
// ============================================================================

#[test]
fn test_cell_view_tracks_one_row() {
    let model = controls();
    let shown = Arc::new(Mutex::new(Vec::new()));
    let sink = shown.clone();
    let view = CellView::new(move |value: &ItemData| sink.lock().push(value.clone()));

    view.set_model(model.clone(), NUM_PLANETS.section().unwrap(), 0);
    K.set(&*model, 0.3).unwrap();
    NUM_PLANETS.set(&*model, 12).unwrap();

    assert_eq!(*shown.lock(), vec![ItemData::Int(250), ItemData::Int(12)]);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_configures_mapper() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
submit_policy = "manual"

[[mapping]]
editor = "planets"
field = "num_planets"

[[mapping]]
editor = "rainbow"
field = "rainbow"
"#
    )
    .unwrap();

    let config = MapperConfig::from_path(file.path()).unwrap();
    let model = controls();
    let mapper = DataWidgetMapper::new();
    mapper.set_model(model.clone());

    let editors: HashMap<&str, Arc<Recorder>> = ["planets", "rainbow"]
        .into_iter()
        .map(|name| (name, Arc::new(Recorder::default())))
        .collect();
    let ids = config
        .apply(&mapper, model.descriptor_model().schema(), |name| {
            editors
                .get(name)
                .map(|editor| editor.clone() as Arc<dyn MappedEditor>)
        })
        .unwrap();

    assert_eq!(mapper.submit_policy(), SubmitPolicy::ManualSubmit);
    assert_eq!(mapper.mapping_count(), 2);
    assert_eq!(ids[0].0, "planets");
    assert_eq!(mapper.mapped_section(ids[0].1), Some(2));
    assert_eq!(editors["planets"].editor_data(), ItemData::Int(250));
    assert_eq!(editors["rainbow"].editor_data(), ItemData::Bool(false));
}

#[test]
fn test_config_with_unknown_editor_leaves_mapper_untouched() {
    let config = MapperConfig::from_toml_str(
        r#"
orientation = "horizontal"

[[mapping]]
editor = "missing"
field = "k"
"#,
    )
    .unwrap();

    let model = controls();
    let mapper = DataWidgetMapper::new();
    mapper.set_model(model.clone());

    let result = config.apply(&mapper, model.descriptor_model().schema(), |_| None);
    assert!(matches!(
        result,
        Err(BindingError::UnknownEditor { name }) if name == "missing"
    ));
    assert_eq!(mapper.orientation(), Orientation::Vertical);
    assert_eq!(mapper.mapping_count(), 0);
}
