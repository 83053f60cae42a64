//! Typed parameter files.
//!
//! One parameter per line as `key:type:value`, with `type` one of `float`,
//! `integer` or `string`. Blank lines and lines starting with `#` are
//! ignored. Tabs are stripped before the line is split, so values cannot
//! carry tab characters; they cannot carry `:` either. Spaces are kept: a
//! key or string value is stored exactly as written, and the type tag must
//! match without padding.
//!
//! The store is written once per load and read-only afterwards. It assumes a
//! single owner: loading while another caller reads the same store is not
//! supported (and needs `&mut self` anyway).

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::{ParamsError, ParamsResult};

/// Declared type of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamType {
    Float,
    Integer,
    String,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Integer => "integer",
            Self::String => "string",
        }
    }
}

impl FromStr for ParamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float" => Ok(Self::Float),
            "integer" => Ok(Self::Integer),
            "string" => Ok(Self::String),
            other => Err(format!(
                "unknown type '{other}' (expected float, integer or string)"
            )),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed value as held by the store.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Float(f64),
    Integer(i64),
    String(String),
}

impl ParamValue {
    pub fn kind(&self) -> ParamType {
        match self {
            Self::Float(_) => ParamType::Float,
            Self::Integer(_) => ParamType::Integer,
            Self::String(_) => ParamType::String,
        }
    }

    fn parse(kind: ParamType, raw: &str) -> Result<Self, String> {
        match kind {
            ParamType::Float => raw
                .trim()
                .parse::<f64>()
                .map(Self::Float)
                .map_err(|e| format!("'{raw}' is not a float: {e}")),
            ParamType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Self::Integer)
                .map_err(|e| format!("'{raw}' is not an integer: {e}")),
            ParamType::String => Ok(Self::String(raw.to_string())),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

/// Parameters keyed by name, split by declared type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterStore {
    floats: BTreeMap<String, f64>,
    integers: BTreeMap<String, i64>,
    strings: BTreeMap<String, String>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a parameter file into a fresh store.
    pub fn from_file(path: &Path) -> ParamsResult<Self> {
        let text = crate::read_input(path)?;
        Self::parse_str(&text, &path.display().to_string())
    }

    /// Replace the contents of this store with the parameters in `path`.
    ///
    /// On failure the store keeps whatever it held before the call.
    pub fn load(&mut self, path: &Path) -> ParamsResult<()> {
        *self = Self::from_file(path)?;
        Ok(())
    }

    /// Replace the contents of this store with the parameters in `text`.
    pub fn load_str(&mut self, text: &str, origin: &str) -> ParamsResult<()> {
        *self = Self::parse_str(text, origin)?;
        Ok(())
    }

    /// Parse parameter text. `origin` names the source in error messages.
    pub fn parse_str(text: &str, origin: &str) -> ParamsResult<Self> {
        let mut store = Self::new();
        for (idx, line) in text.lines().enumerate() {
            let parsed = parse_line(line).map_err(|message| ParamsError::Parse {
                origin: origin.to_string(),
                line: idx + 1,
                message,
            })?;
            if let Some((key, value)) = parsed {
                if let Some(previous) = store.insert(key.clone(), value) {
                    warn!(%origin, line = idx + 1, %key, %previous, "parameter redeclared");
                }
            }
        }
        debug!(%origin, count = store.len(), "parsed parameter file");
        Ok(store)
    }

    /// Insert a value, removing any earlier declaration of the same key.
    ///
    /// Returns the type of the replaced declaration, if there was one.
    pub fn insert(&mut self, key: String, value: ParamValue) -> Option<ParamType> {
        let previous = self.remove(&key);
        match value {
            ParamValue::Float(v) => {
                self.floats.insert(key, v);
            }
            ParamValue::Integer(v) => {
                self.integers.insert(key, v);
            }
            ParamValue::String(v) => {
                self.strings.insert(key, v);
            }
        }
        previous
    }

    fn remove(&mut self, key: &str) -> Option<ParamType> {
        if self.floats.remove(key).is_some() {
            Some(ParamType::Float)
        } else if self.integers.remove(key).is_some() {
            Some(ParamType::Integer)
        } else if self.strings.remove(key).is_some() {
            Some(ParamType::String)
        } else {
            None
        }
    }

    pub fn get_float(&self, key: &str) -> ParamsResult<f64> {
        self.floats
            .get(key)
            .copied()
            .ok_or_else(|| not_found(key, ParamType::Float))
    }

    pub fn get_integer(&self, key: &str) -> ParamsResult<i64> {
        self.integers
            .get(key)
            .copied()
            .ok_or_else(|| not_found(key, ParamType::Integer))
    }

    pub fn get_string(&self, key: &str) -> ParamsResult<&str> {
        self.strings
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| not_found(key, ParamType::String))
    }

    /// Typed lookup returning the value whatever its declared type.
    pub fn get(&self, key: &str) -> Option<ParamValue> {
        if let Some(v) = self.floats.get(key) {
            Some(ParamValue::Float(*v))
        } else if let Some(v) = self.integers.get(key) {
            Some(ParamValue::Integer(*v))
        } else {
            self.strings.get(key).cloned().map(ParamValue::String)
        }
    }

    pub fn kind_of(&self, key: &str) -> Option<ParamType> {
        self.get(key).map(|v| v.kind())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.kind_of(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.floats.len() + self.integers.len() + self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All parameters sorted by key.
    pub fn entries(&self) -> Vec<(String, ParamValue)> {
        let mut out: Vec<(String, ParamValue)> = self
            .floats
            .iter()
            .map(|(k, v)| (k.clone(), ParamValue::Float(*v)))
            .chain(
                self.integers
                    .iter()
                    .map(|(k, v)| (k.clone(), ParamValue::Integer(*v))),
            )
            .chain(
                self.strings
                    .iter()
                    .map(|(k, v)| (k.clone(), ParamValue::String(v.clone()))),
            )
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Float parameters whose key starts with `prefix`, with the prefix removed.
    pub fn floats_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.floats
            .iter()
            .filter_map(move |(k, v)| k.strip_prefix(prefix).map(|rest| (rest, *v)))
    }

    /// Render the store back into the line format, sorted by key.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.entries() {
            out.push_str(&format!("{}:{}:{}\n", key, value.kind(), value));
        }
        out
    }
}

fn not_found(key: &str, expected: ParamType) -> ParamsError {
    ParamsError::KeyNotFound {
        key: key.to_string(),
        expected,
    }
}

/// Parse one line; `Ok(None)` for comments and blank lines.
///
/// Only tabs are stripped. The key, the type tag and string values are kept
/// exactly as written; numeric values may carry surrounding spaces.
fn parse_line(line: &str) -> Result<Option<(String, ParamValue)>, String> {
    let line = line.replace('\t', "");
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(':').collect();
    let [key, kind, raw] = fields.as_slice() else {
        return Err(format!(
            "expected key:type:value, found {} field(s) in '{}'",
            fields.len(),
            trimmed
        ));
    };

    if key.is_empty() {
        return Err("empty parameter name".to_string());
    }
    let kind: ParamType = kind.parse()?;
    let value = ParamValue::parse(kind, raw)?;
    Ok(Some((key.to_string(), value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# plate geometry
plate_length:float:12.5
\textrude_cells:integer:\t4

case_name:string:baseline
";

    #[test]
    fn typed_lookup_round_trips() {
        let store = ParameterStore::parse_str(SAMPLE, "sample").unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get_float("plate_length").unwrap(), 12.5);
        assert_eq!(store.get_integer("extrude_cells").unwrap(), 4);
        assert_eq!(store.get_string("case_name").unwrap(), "baseline");
    }

    #[test]
    fn wrong_accessor_is_key_not_found() {
        let store = ParameterStore::parse_str(SAMPLE, "sample").unwrap();
        let err = store.get_integer("plate_length").unwrap_err();
        assert!(matches!(
            err,
            ParamsError::KeyNotFound {
                expected: ParamType::Integer,
                ..
            }
        ));
        assert!(store.get_string("extrude_cells").is_err());
        assert!(store.get_float("missing").is_err());
    }

    #[test]
    fn comments_and_blanks_leave_store_empty() {
        let store = ParameterStore::parse_str("# one\n\n   \n\t\n# two\n", "c").unwrap();
        assert!(store.is_empty());
        assert!(store.entries().is_empty());
    }

    #[test]
    fn missing_field_is_parse_error() {
        let err = ParameterStore::parse_str("ok:float:1.0\nfoo:float\n", "bad").unwrap_err();
        match err {
            ParamsError::Parse { line, origin, .. } => {
                assert_eq!(line, 2);
                assert_eq!(origin, "bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_type_and_bad_value_are_parse_errors() {
        assert!(ParameterStore::parse_str("foo:bool:1", "x").is_err());
        assert!(ParameterStore::parse_str("foo:integer:1.5", "x").is_err());
        assert!(ParameterStore::parse_str("foo:float:abc", "x").is_err());
        assert!(ParameterStore::parse_str("a:string:b:c", "x").is_err());
        assert!(ParameterStore::parse_str(":float:1", "x").is_err());
    }

    #[test]
    fn string_values_and_keys_keep_their_spaces() {
        let store =
            ParameterStore::parse_str("label:string: Large Ch \nsp :float: 1.0\n", "x").unwrap();
        assert_eq!(store.get_string("label").unwrap(), " Large Ch ");
        assert_eq!(store.get_float("sp ").unwrap(), 1.0);
        assert!(store.get_float("sp").is_err());

        let again = ParameterStore::parse_str(&store.to_text(), "rendered").unwrap();
        assert_eq!(again.get_string("label").unwrap(), " Large Ch ");
    }

    #[test]
    fn type_tag_must_match_exactly() {
        assert!(ParameterStore::parse_str("foo: float :1.0", "x").is_err());
        assert!(ParameterStore::parse_str("foo:Float:1.0", "x").is_err());
    }

    #[test]
    fn failed_load_keeps_previous_contents() {
        let mut store = ParameterStore::new();
        store.load_str("a:float:1.0", "first").unwrap();
        assert!(store.load_str("b:float:2.0\nbroken", "second").is_err());
        assert_eq!(store.get_float("a").unwrap(), 1.0);
        assert!(!store.contains("b"));
    }

    #[test]
    fn load_replaces_rather_than_merges() {
        let mut store = ParameterStore::new();
        store.load_str("a:float:1.0", "first").unwrap();
        store.load_str("b:integer:2", "second").unwrap();
        assert!(!store.contains("a"));
        assert_eq!(store.get_integer("b").unwrap(), 2);
    }

    #[test]
    fn redeclaration_moves_key_between_types() {
        let store = ParameterStore::parse_str("k:float:1.0\nk:integer:3\n", "x").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.kind_of("k"), Some(ParamType::Integer));
        assert!(store.get_float("k").is_err());
    }

    #[test]
    fn prefix_listing_strips_prefix() {
        let store = ParameterStore::parse_str(
            "monitor.A:float:1.0\nmonitor.B:float:2.0\nother:float:3.0\n",
            "x",
        )
        .unwrap();
        let found: Vec<(&str, f64)> = store.floats_with_prefix("monitor.").collect();
        assert_eq!(found, vec![("A", 1.0), ("B", 2.0)]);
    }

    #[test]
    fn text_rendering_parses_back() {
        let store = ParameterStore::parse_str(SAMPLE, "sample").unwrap();
        let again = ParameterStore::parse_str(&store.to_text(), "rendered").unwrap();
        assert_eq!(store, again);
    }
}
