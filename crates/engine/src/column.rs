//! Column schema.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::{Row, Value};

/// Semantic column type. Drives comparators, paste coercion and the
/// "empty" value used when clearing cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Boolean,
    Date,
    DateTime,
}

impl ColumnType {
    /// Parse a type name; unknown names fall back to `Text`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "number" => ColumnType::Number,
            "boolean" => ColumnType::Boolean,
            "date" => ColumnType::Date,
            "datetime" => ColumnType::DateTime,
            _ => ColumnType::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
        }
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        ColumnType::parse(&s)
    }
}

impl From<ColumnType> for String {
    fn from(t: ColumnType) -> Self {
        t.as_str().to_string()
    }
}

/// Which edge a pinned column sticks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinSide {
    Left,
    Right,
}

/// Host validation hook, consulted on edit commit.
pub type Validator = Arc<dyn Fn(&Value, &Row) -> Result<(), String> + Send + Sync>;

pub const DEFAULT_COLUMN_WIDTH: f64 = 120.0;
pub const DEFAULT_MIN_COLUMN_WIDTH: f64 = 40.0;

/// A column definition. `key` matches row keys; order in the column list is
/// authoritative for display and clipboard alignment.
#[derive(Clone)]
pub struct Column {
    pub key: String,
    pub header: String,
    pub column_type: ColumnType,
    pub width: f64,
    pub min_width: f64,
    pub hidden: bool,
    pub sortable: bool,
    /// ANDed with the grid-wide editable flag.
    pub editable: bool,
    pub pin: Option<PinSide>,
    /// Renderer/editor identifiers resolved by the rendering layer.
    pub renderer: Option<String>,
    pub editor: Option<String>,
    pub validator: Option<Validator>,
}

impl Column {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            column_type: ColumnType::Text,
            width: DEFAULT_COLUMN_WIDTH,
            min_width: DEFAULT_MIN_COLUMN_WIDTH,
            hidden: false,
            sortable: true,
            editable: true,
            pin: None,
            renderer: None,
            editor: None,
            validator: None,
        }
    }

    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width.max(self.min_width);
        self
    }

    pub fn with_min_width(mut self, min_width: f64) -> Self {
        self.min_width = min_width;
        self.width = self.width.max(min_width);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn pinned(mut self, side: PinSide) -> Self {
        self.pin = Some(side);
        self
    }

    pub fn with_renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }

    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = Some(editor.into());
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Value, &Row) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Value a cleared cell takes: `false`, `0` or `""` by type.
    pub fn empty_value(&self) -> Value {
        match self.column_type {
            ColumnType::Boolean => Value::Bool(false),
            ColumnType::Number => Value::Number(0.0),
            _ => Value::Text(String::new()),
        }
    }

    pub fn validate(&self, value: &Value, row: &Row) -> Result<(), String> {
        match &self.validator {
            Some(v) => v(value, row),
            None => Ok(()),
        }
    }

    /// Width clamped to the column minimum.
    pub fn clamp_width(&self, width: f64) -> f64 {
        if width.is_finite() {
            width.max(self.min_width)
        } else {
            self.width
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("column_type", &self.column_type)
            .field("width", &self.width)
            .field("hidden", &self.hidden)
            .field("sortable", &self.sortable)
            .field("editable", &self.editable)
            .field("pin", &self.pin)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Index of the column with `key`.
pub fn position_of(columns: &[Column], key: &str) -> Option<usize> {
    columns.iter().position(|c| c.key == key)
}
