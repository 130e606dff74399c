//! Data roles and item data for models.
//!
//! Roles define what kind of data is being requested from or written to a
//! model item. `ItemData` is the dynamically typed value that travels through
//! the model interface and is stored in descriptor slots.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// What a caller asks a model item for.
///
/// Descriptor models answer `Display` and `Edit` with the field value and
/// return `ItemData::None` for every other role. Numeric values follow the
/// usual toolkit numbering so roles can cross an FFI or wire boundary.
///
/// # Example
///
/// ```
/// use horizon_binding::model::ItemRole;
///
/// assert_eq!(ItemRole::Edit.value(), 2);
/// assert_eq!(ItemRole::from_value(257), Some(ItemRole::User(1)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    /// The value as shown.
    Display,
    /// The value as edited.
    Edit,
    /// Hover text.
    ToolTip,
    /// Application-defined role `n`.
    User(u32),
}

impl ItemRole {
    /// First numeric value reserved for [`ItemRole::User`].
    pub const USER_BASE: u32 = 256;

    /// Returns `true` for the roles that carry an item's value
    /// (`Display` and `Edit`).
    #[inline]
    pub fn is_value_role(&self) -> bool {
        matches!(self, ItemRole::Display | ItemRole::Edit)
    }

    /// The numeric value of this role.
    ///
    /// `User(n)` maps to `USER_BASE + n`, saturating at `u32::MAX` for
    /// `n > u32::MAX - USER_BASE`.
    pub fn value(&self) -> u32 {
        match *self {
            ItemRole::Display => 0,
            ItemRole::Edit => 2,
            ItemRole::ToolTip => 3,
            ItemRole::User(n) => Self::USER_BASE.saturating_add(n),
        }
    }

    /// The role with numeric value `value`, or `None` for values below
    /// [`USER_BASE`](Self::USER_BASE) that name no known role.
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(ItemRole::Display),
            2 => Some(ItemRole::Edit),
            3 => Some(ItemRole::ToolTip),
            n => n.checked_sub(Self::USER_BASE).map(ItemRole::User),
        }
    }
}

/// Check state for checkable items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckState {
    /// Item is unchecked.
    #[default]
    Unchecked,
    /// Item is partially checked (for tri-state checkboxes).
    PartiallyChecked,
    /// Item is checked.
    Checked,
}

/// Dynamically typed value stored in a model item.
///
/// `ItemData::None` is the "absent" value: fields declared without an
/// initial value hold it until they are first set.
///
/// # Example
///
/// ```
/// use horizon_binding::model::ItemData;
///
/// let data = ItemData::from(7);
/// assert_eq!(data.as_int(), Some(7));
/// assert_eq!(data.to_string(), "7");
///
/// let custom = ItemData::new((1u8, 2u8));
/// assert_eq!(custom.downcast::<(u8, u8)>(), Some(&(1, 2)));
/// ```
#[derive(Debug, Clone, Default)]
pub enum ItemData {
    /// No data.
    #[default]
    None,
    /// String data.
    String(String),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// Boolean data.
    Bool(bool),
    /// Check state data.
    CheckState(CheckState),
    /// Custom data (type-erased, shared on clone).
    Custom(Arc<dyn Any + Send + Sync>),
}

impl ItemData {
    /// Creates new custom data from any type.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        ItemData::Custom(Arc::new(value))
    }

    /// Returns `true` if this is `ItemData::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, ItemData::None)
    }

    /// Returns `true` if this contains some data.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// A short name for the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ItemData::None => "none",
            ItemData::String(_) => "string",
            ItemData::Int(_) => "int",
            ItemData::Float(_) => "float",
            ItemData::Bool(_) => "bool",
            ItemData::CheckState(_) => "check state",
            ItemData::Custom(_) => "custom",
        }
    }

    /// Attempts to get the data as a string slice.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ItemData::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ItemData::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a float.
    ///
    /// Integers are widened, since editors such as sliders report whole
    /// numbers for floating point fields.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ItemData::Float(n) => Some(*n),
            ItemData::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Attempts to get the data as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ItemData::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get the data as check state.
    pub fn as_check_state(&self) -> Option<CheckState> {
        match self {
            ItemData::CheckState(s) => Some(*s),
            _ => None,
        }
    }

    /// Attempts to downcast custom data to the specified type.
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        match self {
            ItemData::Custom(data) => data.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for ItemData {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ItemData::None, ItemData::None) => true,
            (ItemData::String(a), ItemData::String(b)) => a == b,
            (ItemData::Int(a), ItemData::Int(b)) => a == b,
            (ItemData::Float(a), ItemData::Float(b)) => a == b,
            (ItemData::Bool(a), ItemData::Bool(b)) => a == b,
            (ItemData::CheckState(a), ItemData::CheckState(b)) => a == b,
            // Custom payloads have no equality; identity is the best we can do.
            (ItemData::Custom(a), ItemData::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for ItemData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemData::None => write!(f, "None"),
            ItemData::String(s) => write!(f, "{s}"),
            ItemData::Int(n) => write!(f, "{n}"),
            ItemData::Float(n) => write!(f, "{n}"),
            ItemData::Bool(b) => write!(f, "{b}"),
            ItemData::CheckState(s) => write!(f, "{s:?}"),
            ItemData::Custom(_) => write!(f, "<custom>"),
        }
    }
}

macro_rules! item_data_from {
    ($($ty:ty => $variant:ident($convert:expr)),* $(,)?) => {$(
        impl From<$ty> for ItemData {
            fn from(value: $ty) -> Self {
                ItemData::$variant($convert(value))
            }
        }
    )*};
}

item_data_from!(
    String => String(std::convert::identity),
    &str => String(str::to_owned),
    i64 => Int(std::convert::identity),
    i32 => Int(i64::from),
    f64 => Float(std::convert::identity),
    f32 => Float(f64::from),
    bool => Bool(std::convert::identity),
    CheckState => CheckState(std::convert::identity),
);

impl<T: Into<ItemData>> From<Option<T>> for ItemData {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(ItemData::None, Into::into)
    }
}
