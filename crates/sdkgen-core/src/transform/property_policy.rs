//! Ordering and override policy applied to properties before generation.
//!
//! Everything here is a lookup into [`PolicyTables`]; no rule inspects more
//! than a property key, a definition key and a referenced type name.

use std::cmp::Ordering;
use std::collections::HashSet;

use indexmap::IndexMap;

use crate::config::PolicyTables;
use crate::model::{Construction, Definition, Document, Property, TypeRef, is_primitive};

const IDENTIFIER: &str = "id";

pub struct PropertyPolicy<'t> {
    tables: &'t PolicyTables,
}

impl<'t> PropertyPolicy<'t> {
    pub fn new(tables: &'t PolicyTables) -> Self {
        Self { tables }
    }

    fn is_timestamp_key(&self, key: &str) -> bool {
        self.tables
            .timestamp_suffixes
            .iter()
            .any(|suffix| key.ends_with(suffix.as_str()))
    }

    /// `id` first, timestamps last, everything else in between.
    fn tier(&self, key: &str) -> u8 {
        if key == IDENTIFIER {
            0
        } else if self.is_timestamp_key(key) {
            2
        } else {
            1
        }
    }

    pub fn compare(&self, a: &Property, b: &Property) -> Ordering {
        self.tier(&a.key)
            .cmp(&self.tier(&b.key))
            .then_with(|| a.key.cmp(&b.key))
    }

    /// Stable sort into identifier, middle and timestamp tiers, each
    /// lexicographic by key.
    pub fn sort(&self, properties: &mut [Property]) {
        properties.sort_by(|a, b| self.compare(a, b));
    }

    /// Apply the first matching type/description override, then backfill an
    /// empty description.
    pub fn apply_overrides(&self, definition_key: &str, property: &mut Property) {
        self.apply_type_override(definition_key, property);
        if property.description.is_empty()
            && let Some(text) = self.tables.description_backfill.get(&property.key)
        {
            property.description = text.clone();
        }
    }

    fn apply_type_override(&self, definition_key: &str, property: &mut Property) {
        let t = self.tables;

        if let Some(pin) = t
            .property_refs
            .iter()
            .find(|p| p.definition == definition_key && p.property == property.key)
        {
            log::debug!("pinning {definition_key}.{} to {}", property.key, pin.target);
            property.ty = TypeRef::Named(pin.target.clone());
            return;
        }

        if self.follow_renames(property) {
            return;
        }

        if let Some(ctx) = t.contextual_descriptions.iter().find(|c| {
            c.property == property.key
                && c.definition_contains
                    .as_deref()
                    .is_none_or(|needle| definition_key.contains(needle))
        }) {
            property.description = ctx.description.clone();
            return;
        }

        if property.key == t.country.source && is_standard(definition_key) {
            property.key = t.country.target.clone();
            property.ty = TypeRef::Named(t.country.type_name.clone());
            property.format = None;
            property.description = t.country.description.clone();
            return;
        }

        if self.is_timestamp_key(&property.key)
            && property.reference().is_none()
            && !t
                .timestamp_exclusions
                .iter()
                .any(|e| definition_key.contains(e.as_str()))
        {
            property.ty = TypeRef::Named(t.timestamp_type.clone());
        }
    }

    /// Point a reference at its renamed or aliased definition. Returns whether
    /// the property was retargeted.
    fn follow_renames(&self, property: &mut Property) -> bool {
        let t = self.tables;
        let Some(target) = property
            .reference()
            .and_then(|r| t.renames.get(r).or_else(|| t.ref_aliases.get(r)))
            .cloned()
        else {
            return false;
        };
        retarget(property, target);
        true
    }

    /// How generated code should build the value of `property`.
    pub fn construction(&self, property: &Property, enums: &HashSet<String>) -> Construction {
        let cast_only = |name: &str| {
            enums.contains(name) || self.tables.non_constructible.iter().any(|n| n == name)
        };
        match &property.ty {
            TypeRef::Named(name) if cast_only(name) => Construction::Cast(name.clone()),
            TypeRef::Named(name) => Construction::Construct(name.clone()),
            TypeRef::Array(Some(name)) if is_primitive(name) => Construction::Plain,
            TypeRef::Array(Some(name)) if cast_only(name) => Construction::Cast(name.clone()),
            TypeRef::Array(Some(name)) => Construction::ConstructEach(name.clone()),
            _ => Construction::Plain,
        }
    }

    /// Rename definitions and attach authored definition descriptions.
    fn apply_definition_tables(&self, definitions: &mut IndexMap<String, Definition>) {
        for (from, to) in &self.tables.renames {
            let Some(mut def) = definitions.shift_remove(from) else {
                continue;
            };
            if definitions.contains_key(to) {
                log::debug!("rename {from} -> {to} dropped, target already defined");
                continue;
            }
            def.key = to.clone();
            definitions.insert(to.clone(), def);
        }
        for (key, description) in &self.tables.definition_descriptions {
            if let Some(def) = definitions.get_mut(key) {
                def.description = description.clone();
            }
        }
    }

    /// Run every property rule over the document in place.
    pub fn apply(&self, document: &mut Document) {
        self.apply_definition_tables(&mut document.definitions);

        let enums: HashSet<String> = document
            .definitions
            .values()
            .filter(|d| d.is_enum())
            .map(|d| d.key.clone())
            .collect();

        let definitions = document
            .definitions
            .values_mut()
            .chain(document.responses.values_mut());
        for def in definitions {
            for property in &mut def.properties {
                self.apply_overrides(&def.key, property);
                property.construction = self.construction(property, &enums);
            }
            self.sort(&mut def.properties);
        }

        for path in document.paths.values_mut() {
            for param in &mut path.parameters {
                self.follow_renames(param);
                param.construction = self.construction(param, &enums);
            }
            self.sort(&mut path.parameters);
        }
    }
}

/// Definitions that are neither request nor response wrappers.
fn is_standard(definition_key: &str) -> bool {
    !definition_key.contains("Request") && !definition_key.contains("Response")
}

/// Point a reference (or an array's element reference) at `target`.
fn retarget(property: &mut Property, target: String) {
    property.ty = match property.ty {
        TypeRef::Array(_) => TypeRef::Array(Some(target)),
        _ => TypeRef::Named(target),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DefinitionKind, HttpVerb, Path};

    fn string_prop(key: &str) -> Property {
        Property::new(key, TypeRef::Primitive("string".into()))
    }

    fn keys(props: &[Property]) -> Vec<&str> {
        props.iter().map(|p| p.key.as_str()).collect()
    }

    #[test]
    fn test_ordering_tiers() {
        let tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&tables);
        let mut props = vec![
            string_prop("zzz_at"),
            string_prop("name"),
            string_prop("age"),
            string_prop("id"),
        ];
        policy.sort(&mut props);
        assert_eq!(keys(&props), vec!["id", "age", "name", "zzz_at"]);
    }

    #[test]
    fn test_ordering_ignores_input_order() {
        let tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&tables);
        let orders = [
            ["id", "zzz_at", "name", "age"],
            ["age", "name", "zzz_at", "id"],
            ["zzz_at", "age", "id", "name"],
        ];
        for order in orders {
            let mut props: Vec<Property> = order.iter().map(|k| string_prop(k)).collect();
            policy.sort(&mut props);
            assert_eq!(keys(&props), vec!["id", "age", "name", "zzz_at"]);
        }
    }

    #[test]
    fn test_timestamps_sort_among_themselves() {
        let tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&tables);
        let mut props = vec![
            string_prop("updated_at"),
            string_prop("created_at"),
            string_prop("email"),
        ];
        policy.sort(&mut props);
        assert_eq!(keys(&props), vec!["email", "created_at", "updated_at"]);
    }

    #[test]
    fn test_timestamp_retyped() {
        let tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&tables);
        let mut prop = string_prop("created_at");
        policy.apply_overrides("Member", &mut prop);
        assert_eq!(prop.ty, TypeRef::Named("ExtendedDate".into()));
    }

    #[test]
    fn test_timestamp_reference_keeps_its_type() {
        let tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&tables);
        let mut prop = Property::new("expires_at", TypeRef::Named("Deadline".into()));
        policy.apply_overrides("Member", &mut prop);
        assert_eq!(prop.ty, TypeRef::Named("Deadline".into()));

        let mut list = Property::new("seen_at", TypeRef::Array(Some("Sighting".into())));
        policy.apply_overrides("Member", &mut list);
        assert_eq!(list.ty, TypeRef::Array(Some("Sighting".into())));
    }

    #[test]
    fn test_timestamp_excluded_definition_stays_plain() {
        let tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&tables);
        let mut prop = string_prop("created_at");
        policy.apply_overrides("ListMembersFilterCreatedAt", &mut prop);
        assert_eq!(prop.ty, TypeRef::Primitive("string".into()));
    }

    #[test]
    fn test_country_code_composed_on_standard_definition() {
        let tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&tables);

        let mut prop = string_prop("country_code");
        policy.apply_overrides("Address", &mut prop);
        assert_eq!(prop.key, "country");
        assert_eq!(prop.ty, TypeRef::Named("Country".into()));
        assert_eq!(prop.description, "The entity's country information.");

        let mut request_prop = string_prop("country_code");
        policy.apply_overrides("CreateAddressRequest", &mut request_prop);
        assert_eq!(request_prop.key, "country_code");
    }

    #[test]
    fn test_rename_follows_reference() {
        let tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&tables);

        let mut role = Property::new("role", TypeRef::Named("Role".into()));
        policy.apply_overrides("Member", &mut role);
        assert_eq!(role.ty, TypeRef::Named("MemberRole".into()));

        let mut fallback = Property::new("image_fallback", TypeRef::Named("ImageFallback".into()));
        policy.apply_overrides("Member", &mut fallback);
        assert_eq!(fallback.ty, TypeRef::Named("Colour".into()));
        assert_eq!(fallback.description, "The image's fallback.");
    }

    #[test]
    fn test_pinned_property_ref() {
        let tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&tables);
        let mut prop = string_prop("value");
        policy.apply_overrides("ListMembersFilterRole", &mut prop);
        assert_eq!(prop.ty, TypeRef::Named("MemberRole".into()));
    }

    #[test]
    fn test_contextual_description_then_backfill() {
        let tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&tables);

        let mut household = Property::new("address", TypeRef::Named("Address".into()));
        policy.apply_overrides("Household", &mut household);
        assert_eq!(household.description, "The household's address.");

        let mut other = Property::new("address", TypeRef::Named("Address".into()));
        policy.apply_overrides("Venue", &mut other);
        assert_eq!(other.description, "The entity's address.");

        let mut authored = Property::new("data", TypeRef::Named("Member".into()));
        authored.description = "The member.".into();
        policy.apply_overrides("MemberGetResponse", &mut authored);
        assert_eq!(authored.description, "The member.");
    }

    #[test]
    fn test_construction_markers() {
        let tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&tables);
        let enums: HashSet<String> = ["Status".to_string()].into();

        let cases = [
            (TypeRef::Primitive("string".into()), Construction::Plain),
            (TypeRef::Named("Status".into()), Construction::Cast("Status".into())),
            (TypeRef::Named("MemberRole".into()), Construction::Cast("MemberRole".into())),
            (TypeRef::Named("Address".into()), Construction::Construct("Address".into())),
            (
                TypeRef::Array(Some("Member".into())),
                Construction::ConstructEach("Member".into()),
            ),
            (TypeRef::Array(Some("string".into())), Construction::Plain),
            (
                TypeRef::Array(Some("Status".into())),
                Construction::Cast("Status".into()),
            ),
        ];
        for (ty, expected) in cases {
            let prop = Property::new("p", ty);
            assert_eq!(policy.construction(&prop, &enums), expected);
        }
    }

    #[test]
    fn test_apply_renames_definitions() {
        let tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&tables);
        let mut doc = Document::default();
        let mut role = Definition::new("Role", DefinitionKind::Enum);
        role.enum_entries = vec!["ADMIN".into()];
        doc.definitions.insert("Role".into(), role);
        let mut member = Definition::new("Member", DefinitionKind::Object);
        member.properties = vec![
            Property::new("role", TypeRef::Named("Role".into())),
            string_prop("id"),
        ];
        doc.definitions.insert("Member".into(), member);

        policy.apply(&mut doc);

        assert!(!doc.definitions.contains_key("Role"));
        let renamed = &doc.definitions["MemberRole"];
        assert_eq!(renamed.key, "MemberRole");
        assert_eq!(renamed.description, "MemberRole represents a member role.");
        let member = &doc.definitions["Member"];
        assert_eq!(keys(&member.properties), vec!["id", "role"]);
        assert_eq!(
            member.properties[1].construction,
            Construction::Cast("MemberRole".into())
        );
    }

    #[test]
    fn test_path_parameters_follow_renames_and_aliases() {
        let tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&tables);
        let mut doc = Document::default();
        doc.paths.insert(
            "/views.update".into(),
            Path {
                key: "/views.update".into(),
                verb: HttpVerb::Post,
                operation: "updateView".into(),
                description: String::new(),
                parameters: vec![
                    Property::new("role", TypeRef::Named("Role".into())),
                    Property::new("fallback", TypeRef::Named("ImageFallback".into())),
                ],
            },
        );

        policy.apply(&mut doc);

        let params = &doc.paths["/views.update"].parameters;
        assert_eq!(keys(params), vec!["fallback", "role"]);
        assert_eq!(params[0].ty, TypeRef::Named("Colour".into()));
        assert_eq!(params[1].ty, TypeRef::Named("MemberRole".into()));
    }
}
