//! Horizon Binding star controls example
//!
//! Declares the control panel and star models of a small N-body demo, binds
//! printing editors to the control fields through a mapper configuration and
//! shows values flowing in both directions.
//!
//! Run with: RUST_LOG=horizon_binding=trace cargo run -p horizon-binding --example star_controls

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use horizon_binding::prelude::*;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Models
// ============================================================================

static X: LazyLock<Field<f64>> = LazyLock::new(|| Field::declare("x"));
static Y: LazyLock<Field<f64>> = LazyLock::new(|| Field::declare("y"));

/// A star position. Both coordinates start absent and are set on
/// construction.
struct StarModel {
    model: DescriptorModel,
}

impl DescriptorType for StarModel {
    type Parent = DescriptorBase;

    fn declare(fields: &mut SchemaBuilder) {
        fields.field(&X).field(&Y);
    }
}

impl HasDescriptorModel for StarModel {
    fn descriptor_model(&self) -> &DescriptorModel {
        &self.model
    }
}

impl StarModel {
    fn new(x: f64, y: f64) -> Result<Self> {
        let star = Self {
            model: DescriptorModel::new::<Self>()?,
        };
        X.set(&star, x)?;
        Y.set(&star, y)?;
        Ok(star)
    }
}

static K: LazyLock<Field<f64>> = LazyLock::new(|| Field::with_default("k", 0.01));
static K_POW: LazyLock<Field<f64>> = LazyLock::new(|| Field::with_default("k_pow", 1.5));
static NUM_PLANETS: LazyLock<Field<i64>> = LazyLock::new(|| Field::with_default("num_planets", 250));
static RAINBOW: LazyLock<Field<bool>> = LazyLock::new(|| Field::with_default("rainbow", false));

/// Simulation controls, all initialized from their declarations.
struct ControlModel {
    model: DescriptorModel,
}

impl DescriptorType for ControlModel {
    type Parent = DescriptorBase;

    fn declare(fields: &mut SchemaBuilder) {
        fields
            .field(&K)
            .field(&K_POW)
            .field(&NUM_PLANETS)
            .field(&RAINBOW);
    }
}

impl HasDescriptorModel for ControlModel {
    fn descriptor_model(&self) -> &DescriptorModel {
        &self.model
    }
}

// ============================================================================
// Editors
// ============================================================================

/// An editor that prints whatever the mapper shows in it.
struct PrintingEditor {
    name: &'static str,
    value: Mutex<ItemData>,
}

impl PrintingEditor {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            value: Mutex::new(ItemData::None),
        })
    }

    /// Simulates the user changing the editor.
    fn user_input(&self, value: impl Into<ItemData>) {
        *self.value.lock() = value.into();
    }
}

impl MappedEditor for PrintingEditor {
    fn set_editor_data(&self, value: &ItemData) {
        println!("  [{}] shows {}", self.name, value);
        *self.value.lock() = value.clone();
    }

    fn editor_data(&self) -> ItemData {
        self.value.lock().clone()
    }
}

const MAPPER_CONFIG: &str = r#"
orientation = "vertical"
submit_policy = "auto"

[[mapping]]
editor = "k_slider"
field = "k"

[[mapping]]
editor = "k_pow_slider"
field = "k_pow"

[[mapping]]
editor = "planet_spin"
field = "num_planets"

[[mapping]]
editor = "rainbow_toggle"
field = "rainbow"
"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let controls = Arc::new(ControlModel {
        model: DescriptorModel::new::<ControlModel>()?,
    });
    println!("Control schema:\n{}", controls.descriptor_model().schema());

    // Class-level indices are available without touching an instance
    println!("rainbow is row {}", RAINBOW.section()?);

    let editors: HashMap<&str, Arc<PrintingEditor>> = [
        "k_slider",
        "k_pow_slider",
        "planet_spin",
        "rainbow_toggle",
    ]
    .into_iter()
    .map(|name| (name, PrintingEditor::new(name)))
    .collect();

    println!("\nBinding editors:");
    let mapper = DataWidgetMapper::new();
    mapper.set_model(controls.clone());
    let config = MapperConfig::from_toml_str(MAPPER_CONFIG)?;
    let ids: HashMap<String, MappingId> = config
        .apply(&mapper, controls.descriptor_model().schema(), |name| {
            editors
                .get(name)
                .map(|editor| editor.clone() as Arc<dyn MappedEditor>)
        })?
        .into_iter()
        .collect();

    let planets = CellView::new(|value: &ItemData| println!("  [planet counter] {value}"))
        .with_integer_display(true);
    planets.set_model(controls.clone(), NUM_PLANETS.section()?, 0);

    println!("\nApplication sets num_planets = 400:");
    NUM_PLANETS.set(&*controls, 400)?;

    println!("\nUser toggles rainbow:");
    editors["rainbow_toggle"].user_input(true);
    if let Some(id) = ids.get("rainbow_toggle") {
        mapper.commit(*id)?;
    }
    println!("  rainbow is now {}", RAINBOW.value(&*controls)?);

    println!("\nSummary:\n{}", controls.descriptor_model().summary());

    let star = StarModel::new(0.25, -1.0)?;
    println!("Star: {}", star.descriptor_model().summary().replace('\n', "  "));
    Ok(())
}
