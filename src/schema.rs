use serde::Serialize;

/// Parsed DDL: tables in source order, with inferred relationships attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    pub class_name: String,
    pub columns: Vec<Column>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub relationships: Vec<Relationship>,
    pub is_junction_table: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub field_name: String,
    pub sql_type: String,
    pub nullable: bool,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Relationship {
    ManyToOne {
        target_entity: String,
        field_name: String,
        join_column: String,
    },
    OneToMany {
        target_entity: String,
        field_name: String,
        mapped_by: String,
    },
    ManyToMany {
        target_entity: String,
        field_name: String,
        join_table: JoinTable,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTable {
    pub name: String,
    pub join_column: String,
    pub inverse_join_column: String,
}

impl Schema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Tables that become entity classes. Junction tables are represented
    /// through `ManyToMany` relationships on their endpoints instead.
    pub fn entity_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter().filter(|t| !t.is_junction_table)
    }
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            class_name: crate::naming::class_name(&name),
            name,
            columns: vec![],
            primary_key: vec![],
            foreign_keys: vec![],
            relationships: vec![],
            is_junction_table: false,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key.iter().any(|pk| pk == column)
    }

    pub fn is_foreign_key(&self, column: &str) -> bool {
        self.foreign_keys.iter().any(|fk| fk.column == column)
    }
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            field_name: crate::naming::field_name(&name),
            name,
            sql_type: sql_type.into().to_uppercase(),
            nullable: true,
            default_value: None,
        }
    }
}

impl Relationship {
    pub fn target_entity(&self) -> &str {
        match self {
            Self::ManyToOne { target_entity, .. }
            | Self::OneToMany { target_entity, .. }
            | Self::ManyToMany { target_entity, .. } => target_entity,
        }
    }

    pub fn field_name(&self) -> &str {
        match self {
            Self::ManyToOne { field_name, .. }
            | Self::OneToMany { field_name, .. }
            | Self::ManyToMany { field_name, .. } => field_name,
        }
    }

    /// Whether the relationship holds a collection of targets.
    pub fn is_collection(&self) -> bool {
        !matches!(self, Self::ManyToOne { .. })
    }
}
