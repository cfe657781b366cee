//! Record and property type definitions.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// The kinds of records a filter can target.
///
/// The set is closed: table names are derived from the variant, never from
/// caller-supplied text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// Customer accounts.
    Account,
    /// Users of the workspace.
    User,
    /// Contacts attached to accounts.
    Contact,
    /// Sales opportunities.
    Opportunity,
    /// Tasks.
    Task,
    /// Support tickets.
    Ticket,
}

impl RecordType {
    /// Every record type, in declaration order.
    pub const ALL: [RecordType; 6] = [
        Self::Account,
        Self::User,
        Self::Contact,
        Self::Opportunity,
        Self::Task,
        Self::Ticket,
    ];

    /// Get the record type name as used in the UI and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::User => "user",
            Self::Contact => "contact",
            Self::Opportunity => "opportunity",
            Self::Task => "task",
            Self::Ticket => "ticket",
        }
    }

    /// Get the table backing this record type.
    ///
    /// Tables are named after the record type. The name always comes from
    /// this enum, so it is safe to emit as an identifier.
    pub fn table_name(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rt| rt.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SchemaError::UnknownRecordType {
                name: s.to_string(),
            })
    }
}

/// Deserialize an optional record type, treating `""` and `null` as absent.
///
/// The filter UI sends an empty string before a record type is picked.
pub fn deserialize_optional_record_type<'de, D>(
    deserializer: D,
) -> Result<Option<RecordType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => name.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Value types a record property can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// Free text.
    Text,
    /// Integer or decimal number.
    Number,
    /// True/false flag.
    Boolean,
    /// Calendar date or timestamp.
    Date,
}

impl PropertyType {
    /// Get the type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
        }
    }

    /// Parse a type name, falling back to [`PropertyType::Text`] for
    /// anything unrecognised.
    ///
    /// Metadata services occasionally report types the filter UI has no
    /// operators for (`json`, `picklist`, ...). Those are filtered as text.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" | "string" => Self::Text,
            "number" | "integer" | "float" | "decimal" => Self::Number,
            "boolean" | "bool" => Self::Boolean,
            "date" | "datetime" | "timestamp" => Self::Date,
            other => {
                tracing::debug!(property_type = other, "unsupported property type, using text");
                Self::Text
            }
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
