use std::fmt;
use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::{Map, Value};

use thiserror::Error;

use crate::domain::{DashboardId, EmailAddress};

const ID_KEY: &str = "id";
const TITLE_KEY: &str = "title";
const OWNER_KEY: &str = "owner";
const WARNINGS_KEY: &str = "warnings";

#[derive(Debug, Error)]
pub enum DashboardDataError {
    #[error("Dashboard data is not valid JSON")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Dashboard data is not a JSON object")]
    NotAnObject,
}

/// The JSON document stored in a dashboard row.
///
/// Only the `id`, `title`, `owner` and `warnings` keys are interpreted, everything else
/// is carried through untouched and in its original order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DashboardData(Map<String, Value>);

impl DashboardData {
    pub fn parse(raw: &str) -> Result<Self, DashboardDataError> {
        match serde_json::from_str(raw)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(DashboardDataError::NotAnObject),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get(TITLE_KEY).and_then(Value::as_str)
    }

    pub fn owner(&self) -> Option<&str> {
        self.0.get(OWNER_KEY).and_then(Value::as_str)
    }

    /// Record the row ID inside the document, as a string
    pub fn set_id(&mut self, id: DashboardId) {
        self.0.insert(ID_KEY.into(), Value::String(id.to_string()));
    }

    pub fn set_title(&mut self, title: &str) {
        self.0.insert(TITLE_KEY.into(), Value::String(title.into()));
    }

    pub fn set_owner(&mut self, owner: &EmailAddress) {
        self.0
            .insert(OWNER_KEY.into(), Value::String(owner.as_ref().into()));
    }

    /// Attach warnings to the document, an empty list removes the key
    pub fn set_warnings(&mut self, warnings: Vec<String>) {
        if warnings.is_empty() {
            self.clear_warnings();
        } else {
            let warnings = warnings.into_iter().map(Value::String).collect();
            self.0.insert(WARNINGS_KEY.into(), Value::Array(warnings));
        }
    }

    pub fn clear_warnings(&mut self) {
        self.0.shift_remove(WARNINGS_KEY);
    }

    /// Stored text of the document, see [`SpacedFormatter`]
    pub fn to_json_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DashboardData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut buf, SpacedFormatter);
        self.0.serialize(&mut serializer).map_err(|_| fmt::Error)?;
        f.write_str(std::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

/// Single-line JSON with `", "` and `": "` separators and everything outside
/// printable ASCII written as `\uXXXX` escapes.
///
/// This is the layout of `json.dumps` with default settings, so documents already
/// stored that way keep their text byte for byte.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch <= '~' {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
