//! Extracts an entity/relationship schema graph from SQL DDL and from
//! explicit or inferred relationship declarations, for consumption by model
//! code generators.

pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod infer;
pub mod mapper;
pub mod naming;
pub mod overrides;
pub mod schema;
pub mod sql;
pub mod target;

use wasm_bindgen::prelude::*;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use entity::{Annotation, Entity, Field, entities_from_schema};
pub use error::{Error, Result};
pub use infer::{InferenceOptions, infer_relationships};
pub use mapper::{analyze_entity_fields, enrich_entities, generate_mapping_file};
pub use overrides::{FetchType, OverrideDocument, RelationKind, RelationshipOverride};
pub use schema::{Column, ForeignKey, JoinTable, Relationship, Schema, Table};
pub use sql::{TypeMapper, parse_ddl, parse_ddl_file};
pub use target::TargetLanguage;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Parse DDL source into the JSON schema graph, with any warnings.
///
/// `junction_max_columns` defaults to the library default when omitted;
/// `0` accepts junction tables of any width.
#[wasm_bindgen(js_name = "ddlToSchema")]
pub fn ddl_to_schema(source: &str, junction_max_columns: Option<u32>) -> std::result::Result<String, String> {
    let options = match junction_max_columns {
        None => InferenceOptions::default(),
        Some(0) => InferenceOptions::any_junction(),
        Some(n) => InferenceOptions::with_junction_max_columns(n as usize),
    };
    let mut diagnostics = Diagnostics::new();
    let schema = parse_ddl(source, &options, &mut diagnostics);

    let output = serde_json::json!({
        "tables": schema.tables,
        "warnings": diagnostics,
    });
    serde_json::to_string_pretty(&output).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ddl_to_schema_json() {
        let json = ddl_to_schema(
            "CREATE TABLE users (id INT PRIMARY KEY);
             CREATE TABLE orders (id INT PRIMARY KEY, user_id INT, FOREIGN KEY (user_id) REFERENCES users(id));
             CREATE TABLE audit (id INT, actor_id INT, FOREIGN KEY (actor_id) REFERENCES actors(id));",
            Some(3),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["tables"].as_array().unwrap().len(), 3);
        assert_eq!(value["tables"][1]["relationships"][0]["type"], "ManyToOne");
        assert_eq!(value["tables"][1]["relationships"][0]["joinColumn"], "user_id");
        assert_eq!(value["tables"][0]["relationships"][0]["type"], "OneToMany");
        assert_eq!(value["warnings"][0]["kind"], "danglingForeignKey");
    }

    #[test]
    fn test_ddl_to_schema_junction_policy() {
        let sql = "CREATE TABLE students (id INT); CREATE TABLE courses (id INT);
                   CREATE TABLE enrollments (student_id INT, course_id INT, grade CHAR(2), note TEXT,
                      FOREIGN KEY (student_id) REFERENCES students(id),
                      FOREIGN KEY (course_id) REFERENCES courses(id));";
        let junction = |limit: Option<u32>| {
            let value: serde_json::Value = serde_json::from_str(&ddl_to_schema(sql, limit).unwrap()).unwrap();
            value["tables"][2]["isJunctionTable"].as_bool().unwrap()
        };

        assert!(!junction(None));
        assert!(!junction(Some(3)));
        assert!(junction(Some(4)));
        assert!(junction(Some(0)));
    }

    #[test]
    fn test_ddl_entities_with_overrides() {
        let mut diagnostics = Diagnostics::new();
        let schema = parse_ddl(
            "CREATE TABLE product (id BIGINT PRIMARY KEY, name VARCHAR(80) NOT NULL);
             CREATE TABLE category (id BIGINT PRIMARY KEY, name VARCHAR(80) NOT NULL);",
            &InferenceOptions::default(),
            &mut diagnostics,
        );
        let mut entities = entities_from_schema(&schema, &TargetLanguage::Java);
        let overrides = OverrideDocument::parse(
            r#"{"Product": [{"target": "Category", "type": "many-to-one", "fieldName": "category"}]}"#,
        )
        .unwrap();
        enrich_entities(&mut entities, &overrides, &mut diagnostics);

        let product = &entities[0];
        assert_eq!(product.fields.len(), 3);
        assert_eq!(product.fields[2].ty, "Category");
        assert_eq!(product.fields[2].join_key_type.as_deref(), Some("Long"));
        assert!(diagnostics.is_empty());
    }
}
