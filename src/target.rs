//! Target language selection for generated model classes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::sql::TypeFamily;

/// Language the code generators emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    #[default]
    Java,
    Kotlin,
}

impl TargetLanguage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Kotlin => "kotlin",
        }
    }

    /// Literal spelling of a type family in this language.
    pub fn spell(self, family: TypeFamily) -> &'static str {
        match (self, family) {
            (Self::Java, TypeFamily::Int32) => "Integer",
            (Self::Kotlin, TypeFamily::Int32) => "Int",
            (_, TypeFamily::Int64) => "Long",
            (_, TypeFamily::Float64) => "Double",
            (_, TypeFamily::Boolean) => "Boolean",
            (_, TypeFamily::Date) => "java.time.LocalDate",
            (_, TypeFamily::Time) => "java.time.LocalTime",
            (_, TypeFamily::DateTime) => "java.time.LocalDateTime",
            (Self::Java, TypeFamily::Bytes) => "byte[]",
            (Self::Kotlin, TypeFamily::Bytes) => "ByteArray",
            (_, TypeFamily::Text) => "String",
        }
    }
}

impl FromStr for TargetLanguage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "java" => Ok(Self::Java),
            "kotlin" | "kt" => Ok(Self::Kotlin),
            _ => Err(Error::UnknownTargetLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
