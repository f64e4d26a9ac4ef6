//! Display helpers for diagnostics.

use crate::model::{EntityType, Navigation, Property};

/// Format a property list as `{'Id' : int, 'Name' : string}`, or `{'Id', 'Name'}`
/// without types.
pub fn format_properties(properties: &[&Property], include_types: bool) -> String {
    let items: Vec<String> = properties
        .iter()
        .map(|p| {
            if include_types {
                let nullable = if p.is_nullable { "?" } else { "" };
                format!("'{}' : {}{}", p.name, p.type_name, nullable)
            } else {
                format!("'{}'", p.name)
            }
        })
        .collect();
    format!("{{{}}}", items.join(", "))
}

/// `Entity.Navigation`, or just `Entity` when there is no navigation.
pub fn entity_or_navigation(entity: &EntityType, navigation: Option<&Navigation>) -> String {
    match navigation {
        Some(nav) => format!("{}.{}", entity.display_name(), nav.name),
        None => entity.display_name().to_string(),
    }
}
