//! SQL column type to target-language type mapping.

use crate::target::TargetLanguage;

/// Language-neutral family a SQL type token falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    Int32,
    Int64,
    Float64,
    Boolean,
    Date,
    Time,
    DateTime,
    Bytes,
    Text,
}

/// Ordered substring rules. More specific tokens come before the tokens they
/// contain (`BIGINT` before `INT`, `DATETIME` before `DATE` and `TIME`).
const RULES: &[(&[&str], TypeFamily)] = &[
    (&["bigint"], TypeFamily::Int64),
    (&["tinyint", "smallint", "mediumint", "int"], TypeFamily::Int32),
    (&["decimal", "numeric", "float", "double"], TypeFamily::Float64),
    (&["boolean", "bit"], TypeFamily::Boolean),
    (&["datetime", "timestamp"], TypeFamily::DateTime),
    (&["date"], TypeFamily::Date),
    (&["time"], TypeFamily::Time),
    (&["blob", "binary"], TypeFamily::Bytes),
];

/// Classify a raw SQL type token, case-insensitively. Anything unmatched
/// (`VARCHAR`, `CHAR`, `TEXT`, unknown tokens) is text.
pub fn classify(sql_type: &str) -> TypeFamily {
    let lower = sql_type.to_lowercase();
    RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, family)| *family)
        .unwrap_or(TypeFamily::Text)
}

/// Maps SQL column types to the type names of one code generation backend.
pub trait TypeMapper {
    fn map_type(&self, sql_type: &str) -> String;
}

impl TypeMapper for TargetLanguage {
    fn map_type(&self, sql_type: &str) -> String {
        self.spell(classify(sql_type)).to_string()
    }
}

/// Map a SQL type with the given backend.
pub fn map_type(sql_type: &str, language: TargetLanguage) -> String {
    language.map_type(sql_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_families() {
        assert_eq!(classify("INT"), TypeFamily::Int32);
        assert_eq!(classify("TINYINT(1)"), TypeFamily::Int32);
        assert_eq!(classify("smallint"), TypeFamily::Int32);
        assert_eq!(classify("MEDIUMINT"), TypeFamily::Int32);
        assert_eq!(classify("BIGINT"), TypeFamily::Int64);
    }

    #[test]
    fn test_temporal_families() {
        assert_eq!(classify("DATE"), TypeFamily::Date);
        assert_eq!(classify("TIME"), TypeFamily::Time);
        assert_eq!(classify("DATETIME"), TypeFamily::DateTime);
        assert_eq!(classify("TIMESTAMP"), TypeFamily::DateTime);
    }

    #[test]
    fn test_other_families() {
        assert_eq!(classify("DECIMAL(10,2)"), TypeFamily::Float64);
        assert_eq!(classify("DOUBLE"), TypeFamily::Float64);
        assert_eq!(classify("BOOLEAN"), TypeFamily::Boolean);
        assert_eq!(classify("BIT"), TypeFamily::Boolean);
        assert_eq!(classify("LONGBLOB"), TypeFamily::Bytes);
        assert_eq!(classify("VARBINARY(16)"), TypeFamily::Bytes);
        assert_eq!(classify("VARCHAR(255)"), TypeFamily::Text);
        assert_eq!(classify("TEXT"), TypeFamily::Text);
        assert_eq!(classify("GEOGRAPHY"), TypeFamily::Text);
    }

    #[test]
    fn test_java_types() {
        assert_eq!(map_type("INT", TargetLanguage::Java), "Integer");
        assert_eq!(map_type("BIGINT", TargetLanguage::Java), "Long");
        assert_eq!(map_type("DATETIME", TargetLanguage::Java), "java.time.LocalDateTime");
        assert_eq!(map_type("BLOB", TargetLanguage::Java), "byte[]");
        assert_eq!(map_type("VARCHAR(50)", TargetLanguage::Java), "String");
    }

    #[test]
    fn test_kotlin_types() {
        assert_eq!(map_type("INT", TargetLanguage::Kotlin), "Int");
        assert_eq!(map_type("BIGINT", TargetLanguage::Kotlin), "Long");
        assert_eq!(map_type("BINARY(16)", TargetLanguage::Kotlin), "ByteArray");
        assert_eq!(map_type("DATE", TargetLanguage::Kotlin), "java.time.LocalDate");
    }

    #[test]
    fn test_mapping_is_idempotent() {
        for token in ["INT", "VARCHAR(20)", "TIMESTAMP", "decimal(5,1)", "mystery"] {
            assert_eq!(
                map_type(token, TargetLanguage::Java),
                map_type(token, TargetLanguage::Java)
            );
        }
    }
}
