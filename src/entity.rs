//! Field-oriented entity model consumed and produced by the relationship
//! mapper.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{Relationship, Schema, Table};
use crate::sql::TypeMapper;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub annotations: Vec<String>,
    /// Type of the key column behind a singular reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_key_type: Option<String>,
}

/// Mapping annotations attached to generated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Id,
    GeneratedValue,
    NotNullColumn,
    OneToOne,
    ManyToOne,
    OneToMany {
        mapped_by: String,
    },
    ManyToMany,
    JoinColumn {
        name: String,
    },
    JoinTable {
        name: String,
        join_column: String,
        inverse_join_column: String,
    },
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => f.write_str("@Id"),
            Self::GeneratedValue => {
                f.write_str("@GeneratedValue(strategy = GenerationType.IDENTITY)")
            }
            Self::NotNullColumn => f.write_str("@Column(nullable = false)"),
            Self::OneToOne => f.write_str("@OneToOne"),
            Self::ManyToOne => f.write_str("@ManyToOne"),
            Self::OneToMany { mapped_by } => write!(f, "@OneToMany(mappedBy = \"{}\")", mapped_by),
            Self::ManyToMany => f.write_str("@ManyToMany"),
            Self::JoinColumn { name } => write!(f, "@JoinColumn(name = \"{}\")", name),
            Self::JoinTable {
                name,
                join_column,
                inverse_join_column,
            } => write!(
                f,
                "@JoinTable(name = \"{}\", joinColumns = @JoinColumn(name = \"{}\"), inverseJoinColumns = @JoinColumn(name = \"{}\"))",
                name, join_column, inverse_join_column
            ),
        }
    }
}

/// `List<Order>`
pub fn list_type(element: &str) -> String {
    format!("List<{}>", element)
}

/// `List<Order>` -> `Order`
pub fn list_element(ty: &str) -> Option<&str> {
    ty.strip_prefix("List<")?.strip_suffix('>')
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: vec![],
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Build the entity for a DDL table: one field per column, then one per
    /// inferred relationship.
    pub fn from_table(table: &Table, mapper: &impl TypeMapper) -> Self {
        let mut entity = Self::new(&table.class_name);

        for column in &table.columns {
            let annotations = if table.is_primary_key(&column.name) {
                vec![Annotation::Id, Annotation::GeneratedValue]
            } else if !column.nullable {
                vec![Annotation::NotNullColumn]
            } else {
                vec![]
            };
            entity.fields.push(Field::new(
                &column.field_name,
                mapper.map_type(&column.sql_type),
                annotations,
            ));
        }

        for relationship in &table.relationships {
            entity.fields.push(relationship_field(relationship));
        }

        entity
    }
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        ty: impl Into<String>,
        annotations: impl IntoIterator<Item = Annotation>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            annotations: annotations.into_iter().map(|a| a.to_string()).collect(),
            join_key_type: None,
        }
    }

    /// Whether any annotation starts with `prefix`, e.g. `@ManyToOne`.
    pub fn has_annotation(&self, prefix: &str) -> bool {
        self.annotations.iter().any(|a| a.starts_with(prefix))
    }
}

fn relationship_field(relationship: &Relationship) -> Field {
    match relationship {
        Relationship::ManyToOne {
            target_entity,
            field_name,
            join_column,
        } => Field::new(
            field_name,
            target_entity,
            [
                Annotation::ManyToOne,
                Annotation::JoinColumn {
                    name: join_column.clone(),
                },
            ],
        ),
        Relationship::OneToMany {
            target_entity,
            field_name,
            mapped_by,
        } => Field::new(
            field_name,
            list_type(target_entity),
            [Annotation::OneToMany {
                mapped_by: mapped_by.clone(),
            }],
        ),
        Relationship::ManyToMany {
            target_entity,
            field_name,
            join_table,
        } => Field::new(
            field_name,
            list_type(target_entity),
            [
                Annotation::ManyToMany,
                Annotation::JoinTable {
                    name: join_table.name.clone(),
                    join_column: join_table.join_column.clone(),
                    inverse_join_column: join_table.inverse_join_column.clone(),
                },
            ],
        ),
    }
}

/// Entities for every non-junction table of a parsed schema.
pub fn entities_from_schema(schema: &Schema, mapper: &impl TypeMapper) -> Vec<Entity> {
    schema
        .entity_tables()
        .map(|table| Entity::from_table(table, mapper))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::infer::InferenceOptions;
    use crate::sql::parse_ddl;
    use crate::target::TargetLanguage;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_annotation_rendering() {
        assert_eq!(Annotation::Id.to_string(), "@Id");
        assert_eq!(
            Annotation::JoinColumn {
                name: "category_id".to_string()
            }
            .to_string(),
            "@JoinColumn(name = \"category_id\")"
        );
        assert_eq!(
            Annotation::OneToMany {
                mapped_by: "product".to_string()
            }
            .to_string(),
            "@OneToMany(mappedBy = \"product\")"
        );
    }

    #[test]
    fn test_list_element() {
        assert_eq!(list_element("List<Tag>"), Some("Tag"));
        assert_eq!(list_element("Tag"), None);
        assert_eq!(list_type("Tag"), "List<Tag>");
    }

    #[test]
    fn test_entity_json_shape() {
        let json = r#"{"name": "Product", "fields": [{"name": "id", "type": "Long", "annotations": ["@Id"]}, {"name": "name", "type": "String"}]}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.fields.len(), 2);
        assert_eq!(entity.fields[0].ty, "Long");
        assert!(entity.fields[1].annotations.is_empty());
    }

    #[test]
    fn test_from_table() {
        let mut diagnostics = Diagnostics::new();
        let schema = parse_ddl(
            "CREATE TABLE users (id INT PRIMARY KEY, username VARCHAR(50) NOT NULL, bio TEXT);
             CREATE TABLE orders (id BIGINT PRIMARY KEY, user_id INT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id));",
            &InferenceOptions::default(),
            &mut diagnostics,
        );

        let entities = entities_from_schema(&schema, &TargetLanguage::Kotlin);
        assert_eq!(entities.len(), 2);

        let users = &entities[0];
        assert_eq!(users.name, "Users");
        assert_eq!(users.fields[0].ty, "Int");
        assert!(users.fields[0].has_annotation("@Id"));
        assert!(users.fields[1].has_annotation("@Column(nullable = false)"));
        assert!(users.fields[2].annotations.is_empty());

        let orders_field = users.field("orderss").unwrap();
        assert_eq!(orders_field.ty, "List<Orders>");

        let orders = &entities[1];
        assert_eq!(orders.field("id").unwrap().ty, "Long");
        let user = orders.field("users").unwrap();
        assert_eq!(user.ty, "Users");
        assert_eq!(
            user.annotations,
            vec!["@ManyToOne", "@JoinColumn(name = \"user_id\")"]
        );
    }

    #[test]
    fn test_junction_tables_are_not_entities() {
        let mut diagnostics = Diagnostics::new();
        let schema = parse_ddl(
            "CREATE TABLE a (id INT); CREATE TABLE b (id INT);
             CREATE TABLE a_b (a_id INT, b_id INT,
                FOREIGN KEY (a_id) REFERENCES a(id), FOREIGN KEY (b_id) REFERENCES b(id));",
            &InferenceOptions::default(),
            &mut diagnostics,
        );
        let entities = entities_from_schema(&schema, &TargetLanguage::Java);
        let names: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(entities[0].field("bs").unwrap().has_annotation("@ManyToMany"));
    }
}
