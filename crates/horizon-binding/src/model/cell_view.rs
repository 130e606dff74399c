//! A read-only view of a single model cell.

use std::fmt;
use std::sync::{Arc, Weak};

use horizon_binding_core::ConnectionId;
use horizon_binding_core::logging::targets;
use parking_lot::Mutex;

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};
use super::traits::ItemModel;

type DisplayFn = Arc<dyn Fn(&ItemData) + Send + Sync>;

#[derive(Default)]
struct CellState {
    model: Option<Arc<dyn ItemModel>>,
    connection: Option<ConnectionId>,
    row: usize,
    column: usize,
    integer_display: bool,
}

/// Shows one cell of an [`ItemModel`] and follows its changes.
///
/// The display callback receives the cell's `Display` data once when the
/// model is set and again after every change that covers the cell. With
/// integer display enabled, floating point values are truncated first, the
/// way a numeric counter shows a whole number.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use parking_lot::Mutex;
/// use horizon_binding::model::{CellView, ItemData};
/// # use std::sync::LazyLock;
/// # use horizon_binding::model::{DescriptorBase, DescriptorModel, DescriptorType, Field, SchemaBuilder};
/// # static PLANETS: LazyLock<Field<i64>> = LazyLock::new(|| Field::with_default("planets", 250));
/// # struct Controls;
/// # impl DescriptorType for Controls {
/// #     type Parent = DescriptorBase;
/// #     fn declare(fields: &mut SchemaBuilder) { fields.field(&PLANETS); }
/// # }
///
/// let shown = Arc::new(Mutex::new(Vec::new()));
/// let sink = shown.clone();
/// let view = CellView::new(move |value: &ItemData| sink.lock().push(value.clone()));
///
/// let model = Arc::new(DescriptorModel::new::<Controls>().unwrap());
/// view.set_model(model.clone(), PLANETS.section().unwrap(), 0);
/// PLANETS.set(&*model, 100).unwrap();
///
/// assert_eq!(*shown.lock(), vec![ItemData::Int(250), ItemData::Int(100)]);
/// ```
pub struct CellView {
    state: Arc<Mutex<CellState>>,
    display: DisplayFn,
}

impl CellView {
    /// Creates a view that shows values through `display`.
    pub fn new<F>(display: F) -> Self
    where
        F: Fn(&ItemData) + Send + Sync + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(CellState::default())),
            display: Arc::new(display),
        }
    }

    /// Truncates floating point values before display.
    pub fn with_integer_display(self, integer_display: bool) -> Self {
        self.state.lock().integer_display = integer_display;
        self
    }

    /// Follows the cell at `(row, column)` of `model`.
    ///
    /// Any previous model is disconnected first. The current value is
    /// displayed immediately.
    pub fn set_model(&self, model: Arc<dyn ItemModel>, row: usize, column: usize) {
        let previous = {
            let mut state = self.state.lock();
            let previous = state.model.take().zip(state.connection.take());
            state.model = Some(model.clone());
            state.row = row;
            state.column = column;
            previous
        };
        if let Some((old_model, connection)) = previous {
            old_model.signals().data_changed.disconnect(connection);
        }

        let weak = Arc::downgrade(&self.state);
        let display = self.display.clone();
        let connection = model
            .signals()
            .data_changed
            .connect(move |(top_left, bottom_right, _roles)| {
                on_data_changed(&weak, &display, top_left, bottom_right);
            });
        self.state.lock().connection = Some(connection);

        tracing::debug!(target: targets::MAPPER, row, column, "cell view model set");
        self.refresh();
    }

    /// Stops following the model.
    pub fn clear_model(&self) {
        let previous = {
            let mut state = self.state.lock();
            state.model.take().zip(state.connection.take())
        };
        if let Some((model, connection)) = previous {
            model.signals().data_changed.disconnect(connection);
        }
    }

    /// The followed `(row, column)`, if a model is set.
    pub fn cell(&self) -> Option<(usize, usize)> {
        let state = self.state.lock();
        state.model.as_ref().map(|_| (state.row, state.column))
    }

    /// Displays the cell's current value again.
    pub fn refresh(&self) {
        if let Some(value) = current_value(&self.state) {
            (self.display)(&value);
        }
    }
}

impl Drop for CellView {
    fn drop(&mut self) {
        self.clear_model();
    }
}

impl fmt::Debug for CellView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CellView")
            .field("has_model", &state.model.is_some())
            .field("row", &state.row)
            .field("column", &state.column)
            .field("integer_display", &state.integer_display)
            .finish()
    }
}

/// Reads the followed cell with the state lock released.
fn current_value(state: &Mutex<CellState>) -> Option<ItemData> {
    let (model, row, column, integer_display) = {
        let state = state.lock();
        (state.model.clone()?, state.row, state.column, state.integer_display)
    };
    let index = model.index(row, column, &ModelIndex::invalid());
    let value = model.data(&index, ItemRole::Display);
    Some(match value {
        ItemData::Float(n) if integer_display => ItemData::Int(n.trunc() as i64),
        other => other,
    })
}

fn on_data_changed(
    state: &Weak<Mutex<CellState>>,
    display: &DisplayFn,
    top_left: &ModelIndex,
    bottom_right: &ModelIndex,
) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let followed = {
        let state = state.lock();
        ModelIndex::new(state.row, state.column)
    };
    if !followed.is_within(top_left, bottom_right) {
        return;
    }
    if let Some(value) = current_value(&state) {
        display(&value);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;
    use crate::model::{DescriptorBase, DescriptorModel, DescriptorType, Field, SchemaBuilder};

    static SPEED: LazyLock<Field<f64>> = LazyLock::new(|| Field::with_default("speed", 1.75));
    static NAME: LazyLock<Field<String>> = LazyLock::new(|| Field::with_default("name", "probe".to_string()));

    struct Probe;
    impl DescriptorType for Probe {
        type Parent = DescriptorBase;
        fn declare(fields: &mut SchemaBuilder) {
            fields.field(&SPEED).field(&NAME);
        }
    }

    fn recording_view() -> (CellView, Arc<Mutex<Vec<ItemData>>>) {
        let shown = Arc::new(Mutex::new(Vec::new()));
        let sink = shown.clone();
        let view = CellView::new(move |value: &ItemData| sink.lock().push(value.clone()));
        (view, shown)
    }

    #[test]
    fn test_ignores_other_cells() {
        let model = Arc::new(DescriptorModel::new::<Probe>().unwrap());
        let (view, shown) = recording_view();
        view.set_model(model.clone(), 0, 0);

        NAME.set(&*model, "other".to_string()).unwrap();
        SPEED.set(&*model, 2.0).unwrap();
        assert_eq!(*shown.lock(), vec![ItemData::Float(1.75), ItemData::Float(2.0)]);
    }

    #[test]
    fn test_integer_display_truncates() {
        let model = Arc::new(DescriptorModel::new::<Probe>().unwrap());
        let (view, shown) = recording_view();
        let view = view.with_integer_display(true);
        view.set_model(model.clone(), 0, 0);

        SPEED.set(&*model, 9.9).unwrap();
        assert_eq!(*shown.lock(), vec![ItemData::Int(1), ItemData::Int(9)]);
    }

    #[test]
    fn test_switching_models_disconnects_previous() {
        let first = Arc::new(DescriptorModel::new::<Probe>().unwrap());
        let second = Arc::new(DescriptorModel::new::<Probe>().unwrap());
        let (view, shown) = recording_view();

        view.set_model(first.clone(), 0, 0);
        view.set_model(second.clone(), 1, 0);
        assert_eq!(first.signals().data_changed.connection_count(), 0);
        assert_eq!(view.cell(), Some((1, 0)));

        SPEED.set(&*first, 5.0).unwrap();
        NAME.set(&*second, "again".to_string()).unwrap();
        assert_eq!(
            *shown.lock(),
            vec![ItemData::Float(1.75), ItemData::from("probe"), ItemData::from("again")]
        );

        drop(view);
        assert_eq!(second.signals().data_changed.connection_count(), 0);
    }
}
