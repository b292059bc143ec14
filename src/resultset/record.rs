use std::sync::Arc;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::value::Value;

/// Column selector accepted by [`Record::get`]: a position or a column name.
pub trait ColumnIndex: sealed::Sealed {
    #[doc(hidden)]
    fn position(&self, keys: &[String]) -> Option<usize>;
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for usize {}
    impl Sealed for str {}
    impl Sealed for String {}
    impl<T: Sealed + ?Sized> Sealed for &T {}
}

impl ColumnIndex for usize {
    fn position(&self, keys: &[String]) -> Option<usize> {
        (*self < keys.len()).then_some(*self)
    }
}

impl ColumnIndex for str {
    fn position(&self, keys: &[String]) -> Option<usize> {
        keys.iter().position(|key| key == self)
    }
}

impl ColumnIndex for String {
    fn position(&self, keys: &[String]) -> Option<usize> {
        self.as_str().position(keys)
    }
}

impl<T: ColumnIndex + ?Sized> ColumnIndex for &T {
    fn position(&self, keys: &[String]) -> Option<usize> {
        (**self).position(keys)
    }
}

/// One decoded row, aligned with the result header.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    keys: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    pub(crate) fn new(keys: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Self { keys, values }
    }

    /// Value at a position or under a column name; the first matching name wins.
    pub fn get<I: ColumnIndex>(&self, index: I) -> Option<&Value> {
        index
            .position(&self.keys)
            .and_then(|pos| self.values.get(pos))
    }

    /// Text form of a value; `None` for null or a missing column.
    pub fn get_string<I: ColumnIndex>(&self, index: I) -> Option<String> {
        match self.get(index)? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Column names.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Values in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// True if a column called `key` exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a zero-column record.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in self.keys.iter().zip(&self.values) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
