//! Identifier derivation from source names.
//!
//! All functions are pure: the same input always yields the same identifier.

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// `order_items` -> `OrderItems`
pub fn class_name(name: &str) -> String {
    name.to_upper_camel_case()
}

/// `created_at` -> `createdAt`
pub fn field_name(name: &str) -> String {
    name.to_lower_camel_case()
}

/// `OrderItem` -> `order_item`
pub fn column_name(name: &str) -> String {
    name.to_snake_case()
}

/// `order_item` -> `orderItems`
pub fn collection_field_name(name: &str) -> String {
    let mut field = field_name(name);
    field.push('s');
    field
}

/// Lowercase only the first character: `OrderItem` -> `orderItem`.
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uppercase only the first character: `orderItem` -> `OrderItem`.
pub fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strip a trailing `_id` / `Id` from a column name, if something remains.
pub fn strip_id_suffix(name: &str) -> Option<&str> {
    let stem = name
        .strip_suffix("_id")
        .or_else(|| name.strip_suffix("_ID"))
        .or_else(|| name.strip_suffix("Id"))?;
    if stem.is_empty() { None } else { Some(stem) }
}
