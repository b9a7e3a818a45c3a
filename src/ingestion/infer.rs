//! Column type detection for containers that carry no types (CSV, JSON).

use crate::types::{parse_timestamp, DataType, Value};

/// Accumulates observations about one column and picks the narrowest [`DataType`] that
/// holds every non-null value.
///
/// Text candidates are tried in order: `Int64`, `Float64`, `Bool`, `Timestamp`, `Utf8`.
/// A column with no values at all is `Float64`, the usual type of an all-missing column.
#[derive(Debug, Clone)]
pub(crate) struct TypeInference {
    seen: usize,
    int: bool,
    float: bool,
    boolean: bool,
    timestamp: bool,
    text: bool,
    nested: bool,
}

impl Default for TypeInference {
    fn default() -> Self {
        Self {
            seen: 0,
            int: true,
            float: true,
            boolean: true,
            timestamp: true,
            text: true,
            nested: false,
        }
    }
}

impl TypeInference {
    /// Observe a raw text cell. Blank cells and NA markers are nulls and ignored.
    pub(crate) fn observe_text(&mut self, raw: &str) {
        let s = raw.trim();
        if is_na_token(s) {
            return;
        }
        self.seen += 1;
        if self.int && s.parse::<i64>().is_err() {
            self.int = false;
        }
        if self.float && parse_float_text(s).is_none() {
            self.float = false;
        }
        if self.boolean && parse_bool_text(s).is_none() {
            self.boolean = false;
        }
        if self.timestamp && parse_timestamp(s).is_none() {
            self.timestamp = false;
        }
    }

    /// Observe a JSON value. Nulls are ignored; objects and arrays force `Mixed`.
    pub(crate) fn observe_json(&mut self, v: &serde_json::Value) {
        match v {
            serde_json::Value::Null => {}
            serde_json::Value::Bool(_) => {
                self.seen += 1;
                self.int = false;
                self.float = false;
                self.timestamp = false;
                self.text = false;
            }
            serde_json::Value::Number(n) => {
                self.seen += 1;
                if n.as_i64().is_none() {
                    self.int = false;
                }
                self.boolean = false;
                self.timestamp = false;
                self.text = false;
            }
            serde_json::Value::String(s) => {
                self.seen += 1;
                self.int = false;
                self.float = false;
                self.boolean = false;
                if self.timestamp && parse_timestamp(s).is_none() {
                    self.timestamp = false;
                }
            }
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                self.seen += 1;
                self.nested = true;
            }
        }
    }

    pub(crate) fn finish(&self) -> DataType {
        if self.seen == 0 {
            return DataType::Float64;
        }
        if self.nested {
            return DataType::Mixed;
        }
        if self.int {
            DataType::Int64
        } else if self.float {
            DataType::Float64
        } else if self.boolean {
            DataType::Bool
        } else if self.timestamp {
            DataType::Timestamp
        } else if self.text {
            DataType::Utf8
        } else {
            DataType::Mixed
        }
    }
}

/// Text markers read as missing values: the blank cell plus the usual
/// spreadsheet and dataframe spellings of "not available". Case-sensitive.
pub(crate) fn is_na_token(s: &str) -> bool {
    matches!(
        s,
        "" | "#N/A"
            | "#N/A N/A"
            | "#NA"
            | "-1.#IND"
            | "-1.#QNAN"
            | "-NaN"
            | "-nan"
            | "1.#IND"
            | "1.#QNAN"
            | "<NA>"
            | "N/A"
            | "NA"
            | "NULL"
            | "NaN"
            | "None"
            | "n/a"
            | "nan"
            | "null"
    )
}

/// Strict boolean spelling used for detection (`true`/`false`, any case).
pub(crate) fn parse_bool_text(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Decimal float parsing that also accepts `inf` spellings.
pub(crate) fn parse_float_text(s: &str) -> Option<f64> {
    s.parse::<f64>().ok()
}

/// Best-effort typed value for a single text cell of a `Mixed` column.
pub(crate) fn value_from_text(raw: &str) -> Value {
    let s = raw.trim();
    if is_na_token(s) {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int64(i);
    }
    if let Some(f) = parse_float_text(s) {
        return Value::Float64(f);
    }
    if let Some(b) = parse_bool_text(s) {
        return Value::Bool(b);
    }
    Value::Utf8(s.to_string())
}
