//! Relationship inference over parsed tables.
//!
//! Foreign keys become `ManyToOne`/`OneToMany` pairs. Tables holding exactly
//! two foreign keys are treated as many-to-many junctions, subject to the
//! column-count policy in [`InferenceOptions`].

use indexmap::IndexMap;
use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::naming;
use crate::schema::{JoinTable, Relationship, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceOptions {
    /// Largest column count a two-foreign-key table may have and still be
    /// treated as a junction. `None` accepts any column count.
    pub junction_max_columns: Option<usize>,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            junction_max_columns: Some(3),
        }
    }
}

impl InferenceOptions {
    /// Treat every table with exactly two foreign keys as a junction.
    pub fn any_junction() -> Self {
        Self {
            junction_max_columns: None,
        }
    }

    pub fn with_junction_max_columns(max: usize) -> Self {
        Self {
            junction_max_columns: Some(max),
        }
    }

    pub fn is_junction_candidate(&self, table: &Table) -> bool {
        table.foreign_keys.len() == 2
            && self
                .junction_max_columns
                .is_none_or(|max| table.columns.len() <= max)
    }
}

/// Attach inferred relationships to `tables` in place.
///
/// Output order depends only on input order, so the same DDL always yields
/// the same relationship lists.
pub fn infer_relationships(
    tables: &mut [Table],
    options: &InferenceOptions,
    diagnostics: &mut Diagnostics,
) {
    let (additions, junctions) = plan(tables, options, diagnostics);

    for (target, relationship) in additions {
        tables[target].relationships.push(relationship);
    }
    for junction in junctions {
        tables[junction].is_junction_table = true;
    }
}

/// Relationships to append (by table position) and the junction tables.
fn plan(
    tables: &[Table],
    options: &InferenceOptions,
    diagnostics: &mut Diagnostics,
) -> (Vec<(usize, Relationship)>, Vec<usize>) {
    let index = index_tables(tables, diagnostics);

    let mut additions: Vec<(usize, Relationship)> = Vec::new();
    for (source, table) in tables.iter().enumerate() {
        for fk in &table.foreign_keys {
            let Some(&target) = index.get(fk.referenced_table.as_str()) else {
                diagnostics.warn(
                    DiagnosticKind::DanglingForeignKey,
                    format!(
                        "{}.{} references unknown table {}",
                        table.name, fk.column, fk.referenced_table
                    ),
                );
                continue;
            };

            if target == source {
                additions.extend(self_reference(table, &fk.column).map(|r| (source, r)));
                continue;
            }

            let referenced = &tables[target];
            let field_name = naming::field_name(&referenced.name);
            additions.push((
                source,
                Relationship::ManyToOne {
                    target_entity: referenced.class_name.clone(),
                    field_name: field_name.clone(),
                    join_column: fk.column.clone(),
                },
            ));
            additions.push((
                target,
                Relationship::OneToMany {
                    target_entity: table.class_name.clone(),
                    field_name: naming::collection_field_name(&table.name),
                    mapped_by: field_name,
                },
            ));
        }
    }

    let mut junctions = Vec::new();
    for (junction, table) in tables.iter().enumerate() {
        if !options.is_junction_candidate(table) {
            continue;
        }
        let (fk1, fk2) = (&table.foreign_keys[0], &table.foreign_keys[1]);
        let (Some(&left), Some(&right)) = (
            index.get(fk1.referenced_table.as_str()),
            index.get(fk2.referenced_table.as_str()),
        ) else {
            continue;
        };

        if left == right {
            diagnostics.warn(
                DiagnosticKind::SelfJunction,
                format!(
                    "{} links {} to itself; no many-to-many inferred",
                    table.name, fk1.referenced_table
                ),
            );
            continue;
        }

        if tables[left].name == table.name || tables[right].name == table.name {
            diagnostics.warn(
                DiagnosticKind::SelfJunction,
                format!(
                    "{} references itself; not treated as a junction table",
                    table.name
                ),
            );
            continue;
        }

        debug!(junction = %table.name, left = %tables[left].name, right = %tables[right].name, "junction table");
        additions.push((
            left,
            many_to_many(&tables[right], &table.name, &fk1.column, &fk2.column),
        ));
        additions.push((
            right,
            many_to_many(&tables[left], &table.name, &fk2.column, &fk1.column),
        ));
        junctions.push(junction);
    }

    (additions, junctions)
}

/// Name -> position. A repeated name resolves to its last definition.
fn index_tables<'a>(tables: &'a [Table], diagnostics: &mut Diagnostics) -> IndexMap<&'a str, usize> {
    let mut index = IndexMap::with_capacity(tables.len());
    for (i, table) in tables.iter().enumerate() {
        if index.insert(table.name.as_str(), i).is_some() {
            diagnostics.warn(
                DiagnosticKind::DuplicateTable,
                format!("table {} is defined more than once", table.name),
            );
        }
    }
    index
}

/// A table referencing itself gets a pair named after the join column, so the
/// parent reference and the child collection never share a field name.
fn self_reference(table: &Table, column: &str) -> [Relationship; 2] {
    let parent = match naming::strip_id_suffix(column) {
        Some(stem) => naming::field_name(stem),
        None => format!("parent{}", naming::class_name(column)),
    };
    let children = format!(
        "{}By{}",
        naming::collection_field_name(&table.name),
        naming::upper_first(&parent)
    );

    [
        Relationship::ManyToOne {
            target_entity: table.class_name.clone(),
            field_name: parent.clone(),
            join_column: column.to_string(),
        },
        Relationship::OneToMany {
            target_entity: table.class_name.clone(),
            field_name: children,
            mapped_by: parent,
        },
    ]
}

fn many_to_many(other: &Table, junction: &str, join_column: &str, inverse: &str) -> Relationship {
    Relationship::ManyToMany {
        target_entity: other.class_name.clone(),
        field_name: naming::collection_field_name(&other.name),
        join_table: JoinTable {
            name: junction.to_string(),
            join_column: join_column.to_string(),
            inverse_join_column: inverse.to_string(),
        },
    }
}
