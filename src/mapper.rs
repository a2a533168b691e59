//! Relationship mapping over field-oriented entities.
//!
//! Three independent operations: apply an override document to a set of
//! entities, detect relationships from field naming conventions, and emit a
//! template override document for manual editing.

use std::collections::HashSet;

use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::entity::{Annotation, Entity, Field, list_element, list_type};
use crate::naming;
use crate::overrides::{FetchType, OverrideDocument, RelationKind, RelationshipOverride};

/// Key type assumed when a target entity has no `id` field.
const DEFAULT_ID_TYPE: &str = "Long";

/// Append one relationship field per override entry to its source entity.
///
/// Entries naming a target that is not among `entities` are skipped with a
/// warning; the rest of the document still applies.
pub fn enrich_entities(
    entities: &mut [Entity],
    overrides: &OverrideDocument,
    diagnostics: &mut Diagnostics,
) {
    if overrides.is_empty() {
        return;
    }

    let mut additions: Vec<(usize, Field)> = Vec::new();
    for (source, entity) in entities.iter().enumerate() {
        let Some(declared) = overrides.get(&entity.name) else {
            continue;
        };

        for relationship in declared {
            let Some(target) = entities.iter().find(|e| e.name == relationship.target) else {
                diagnostics.warn(
                    DiagnosticKind::DanglingOverrideTarget,
                    format!(
                        "target entity {} not found for relationship in {}",
                        relationship.target, entity.name
                    ),
                );
                continue;
            };
            additions.push((source, override_field(entity, target, relationship)));
        }
    }

    for (name, _) in overrides.iter() {
        if !entities.iter().any(|e| e.name == name) {
            debug!(entity = name, "override for unknown entity ignored");
        }
    }

    for (source, field) in additions {
        entities[source].fields.push(field);
    }
}

fn override_field(source: &Entity, target: &Entity, relationship: &RelationshipOverride) -> Field {
    let field_name = relationship
        .field_name
        .clone()
        .unwrap_or_else(|| naming::lower_first(&target.name));
    let id_type = target
        .field("id")
        .map(|f| f.ty.clone())
        .unwrap_or_else(|| DEFAULT_ID_TYPE.to_string());
    let join_column = Annotation::JoinColumn {
        name: format!("{}_id", naming::column_name(&field_name)),
    };

    match relationship.kind {
        RelationKind::OneToOne | RelationKind::ManyToOne => {
            let kind = if relationship.kind == RelationKind::OneToOne {
                Annotation::OneToOne
            } else {
                Annotation::ManyToOne
            };
            let mut field = Field::new(field_name, &target.name, [kind, join_column]);
            field.join_key_type = Some(id_type);
            field
        }
        RelationKind::OneToMany => Field::new(
            format!("{}List", field_name),
            list_type(&target.name),
            [Annotation::OneToMany {
                mapped_by: naming::lower_first(&source.name),
            }],
        ),
        RelationKind::ManyToMany => {
            let source_column = naming::column_name(&source.name);
            let target_column = naming::column_name(&target.name);
            Field::new(
                format!("{}List", field_name),
                list_type(&target.name),
                [
                    Annotation::ManyToMany,
                    Annotation::JoinTable {
                        name: format!("{}_{}", source_column, target_column),
                        join_column: format!("{}_id", source_column),
                        inverse_join_column: format!("{}_id", target_column),
                    },
                ],
            )
        }
    }
}

/// Detect relationships implied by field types and `...Id` field names.
///
/// Only entities with at least one detection appear in the result.
pub fn analyze_entity_fields(entities: &[Entity]) -> OverrideDocument {
    let names: HashSet<&str> = entities.iter().map(|e| e.name.as_str()).collect();
    let mut detected = OverrideDocument::new();

    for entity in entities {
        for field in &entity.fields {
            if let Some(relationship) = detect(field, &names) {
                debug!(
                    entity = %entity.name,
                    field = %field.name,
                    target = %relationship.target,
                    kind = %relationship.kind,
                    "detected relationship"
                );
                detected.push(&entity.name, relationship);
            }
        }
    }

    detected
}

fn detect(field: &Field, names: &HashSet<&str>) -> Option<RelationshipOverride> {
    if let Some(inner) = list_element(&field.ty) {
        return names.contains(inner).then(|| {
            RelationshipOverride::new(inner, RelationKind::OneToMany)
                .field_name(&field.name)
                .bidirectional(false)
        });
    }

    if names.contains(field.ty.as_str()) {
        return Some(
            RelationshipOverride::new(&field.ty, RelationKind::ManyToOne)
                .field_name(&field.name)
                .bidirectional(false),
        );
    }

    let stem = field.name.strip_suffix("Id").filter(|s| !s.is_empty())?;
    let target = naming::upper_first(stem);
    names.contains(target.as_str()).then(|| {
        RelationshipOverride::new(target, RelationKind::ManyToOne)
            .field_name(stem)
            .bidirectional(false)
    })
}

/// Template document with a `one-to-many` stub for every ordered pair of
/// distinct entities.
pub fn generate_mapping_file(entities: &[Entity]) -> OverrideDocument {
    let mut document = OverrideDocument::new();

    for source in entities {
        let stubs = entities
            .iter()
            .filter(|target| target.name != source.name)
            .map(|target| RelationshipOverride {
                target: target.name.clone(),
                kind: RelationKind::OneToMany,
                field_name: Some(naming::lower_first(&target.name)),
                bidirectional: Some(false),
                cascade: Some(vec!["ALL".to_string()]),
                fetch: Some(FetchType::Lazy),
                optional: Some(true),
            })
            .collect();
        document.insert(&source.name, stubs);
    }

    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(name: &str, ty: &str) -> Field {
        Field::new(name, ty, Vec::<Annotation>::new())
    }

    fn product_and_category() -> Vec<Entity> {
        vec![
            Entity::new("Product")
                .with_field(Field::new("id", "Long", [Annotation::Id]))
                .with_field(field("name", "String")),
            Entity::new("Category")
                .with_field(Field::new("id", "Integer", [Annotation::Id]))
                .with_field(field("name", "String")),
        ]
    }

    #[test]
    fn test_enrich_many_to_one() {
        let mut entities = product_and_category();
        let overrides = OverrideDocument::parse(
            r#"{"Product": [{"target": "Category", "type": "many-to-one", "fieldName": "category"}]}"#,
        )
        .unwrap();
        let mut diagnostics = Diagnostics::new();
        enrich_entities(&mut entities, &overrides, &mut diagnostics);

        let product = &entities[0];
        assert_eq!(product.fields.len(), 3);
        let category = &product.fields[2];
        assert_eq!(category.name, "category");
        assert_eq!(category.ty, "Category");
        assert_eq!(
            category.annotations,
            vec!["@ManyToOne", "@JoinColumn(name = \"category_id\")"]
        );
        assert_eq!(category.join_key_type.as_deref(), Some("Integer"));
        assert_eq!(entities[1].fields.len(), 2);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_enrich_collections() {
        let mut entities = product_and_category();
        let overrides = OverrideDocument::parse(
            r#"{
                "Category": [{"target": "Product", "type": "one-to-many", "fieldName": "products"}],
                "Product": [{"target": "Category", "type": "many-to-many"}]
            }"#,
        )
        .unwrap();
        let mut diagnostics = Diagnostics::new();
        enrich_entities(&mut entities, &overrides, &mut diagnostics);

        let products = entities[1].field("productsList").unwrap();
        assert_eq!(products.ty, "List<Product>");
        assert_eq!(products.annotations, vec!["@OneToMany(mappedBy = \"category\")"]);

        let categories = entities[0].field("categoryList").unwrap();
        assert_eq!(categories.ty, "List<Category>");
        assert!(categories.has_annotation("@ManyToMany"));
        assert_eq!(
            categories.annotations[1],
            "@JoinTable(name = \"product_category\", joinColumns = @JoinColumn(name = \"product_id\"), inverseJoinColumns = @JoinColumn(name = \"category_id\"))"
        );
    }

    #[test]
    fn test_enrich_one_to_one_defaults_id_type() {
        let mut entities = vec![
            Entity::new("User").with_field(field("id", "Long")),
            Entity::new("Profile").with_field(field("bio", "String")),
        ];
        let overrides =
            OverrideDocument::parse(r#"{"User": [{"target": "Profile", "type": "one-to-one"}]}"#).unwrap();
        let mut diagnostics = Diagnostics::new();
        enrich_entities(&mut entities, &overrides, &mut diagnostics);

        let profile = entities[0].field("profile").unwrap();
        assert!(profile.has_annotation("@OneToOne"));
        assert_eq!(profile.join_key_type.as_deref(), Some("Long"));
    }

    #[test]
    fn test_enrich_skips_missing_target() {
        let mut entities = product_and_category();
        let overrides = OverrideDocument::parse(
            r#"{"Product": [
                {"target": "Supplier", "type": "many-to-one"},
                {"target": "Category", "type": "many-to-one"}
            ]}"#,
        )
        .unwrap();
        let mut diagnostics = Diagnostics::new();
        enrich_entities(&mut entities, &overrides, &mut diagnostics);

        assert_eq!(entities[0].fields.len(), 3);
        assert_eq!(entities[0].fields[2].name, "category");
        assert_eq!(diagnostics.count(DiagnosticKind::DanglingOverrideTarget), 1);
    }

    #[test]
    fn test_enrich_without_overrides() {
        let mut entities = product_and_category();
        let before = entities.clone();
        let mut diagnostics = Diagnostics::new();
        enrich_entities(&mut entities, &OverrideDocument::new(), &mut diagnostics);
        assert_eq!(entities, before);
    }

    #[test]
    fn test_analyze_entity_fields() {
        let entities = vec![
            Entity::new("Product")
                .with_field(field("id", "Long"))
                .with_field(field("name", "String"))
                .with_field(field("categoryId", "Long"))
                .with_field(field("tags", "List<Tag>")),
            Entity::new("Category")
                .with_field(field("id", "Long"))
                .with_field(field("name", "String")),
            Entity::new("Tag")
                .with_field(field("id", "Long"))
                .with_field(field("product", "Product"))
                .with_field(field("labels", "List<String>")),
        ];

        let detected = analyze_entity_fields(&entities);
        assert_eq!(detected.len(), 2);
        assert!(!detected.contains("Category"));

        let product = detected.get("Product").unwrap();
        assert_eq!(
            product,
            &[
                RelationshipOverride::new("Category", RelationKind::ManyToOne)
                    .field_name("category")
                    .bidirectional(false),
                RelationshipOverride::new("Tag", RelationKind::OneToMany)
                    .field_name("tags")
                    .bidirectional(false),
            ]
        );

        let tag = detected.get("Tag").unwrap();
        assert_eq!(tag.len(), 1);
        assert_eq!(tag[0].target, "Product");
        assert_eq!(tag[0].kind, RelationKind::ManyToOne);
    }

    #[test]
    fn test_generate_mapping_file() {
        let entities = vec![
            Entity::new("Product"),
            Entity::new("Category"),
            Entity::new("Order"),
        ];
        let document = generate_mapping_file(&entities);

        assert_eq!(document.len(), 3);
        for (_, stubs) in document.iter() {
            assert_eq!(stubs.len(), 2);
            assert!(stubs.iter().all(|s| s.kind == RelationKind::OneToMany));
        }
        let targets: Vec<&str> = document
            .get("Category")
            .unwrap()
            .iter()
            .map(|s| s.target.as_str())
            .collect();
        assert_eq!(targets, vec!["Product", "Order"]);
        assert_eq!(
            document.get("Product").unwrap()[0].field_name.as_deref(),
            Some("category")
        );

        let json: serde_json::Value =
            serde_json::from_str(&document.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["Order"][0]["fetch"], "LAZY");
        assert_eq!(json["Order"][0]["cascade"][0], "ALL");
        assert_eq!(json["Order"][0]["optional"], true);
    }
}
