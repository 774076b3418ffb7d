use std::collections::{HashMap, HashSet};

use minijinja::{Environment, context};
use sdkgen_core::model::{Definition, Property};

use super::{HEADER, Imports};
use crate::error::EmitError;
use crate::type_mapper::{accessor, declared_key, init_expr, type_ref_to_ts};

/// Key fragments marking payload-only shapes that are emitted as interfaces.
const INTERFACE_MARKERS: [&str; 2] = ["Request", "DynamicQuery"];
const INTERFACE_SUFFIX: &str = "Data";

/// Generic filter interface shipped in `definitions/base.ts`.
const DYNAMIC_QUERY_FILTER: &str = "DynamicQueryFilter";
const FILTER_SET_SUFFIX: &str = "DynamicQueryFilters";
const FILTER_VALUE: &str = "value";

/// Whether a definition is a plain data shape rather than a constructible class.
pub fn is_interface(definition: &Definition) -> bool {
    INTERFACE_MARKERS
        .iter()
        .any(|marker| definition.key.contains(marker))
        || definition.key.ends_with(INTERFACE_SUFFIX)
}

/// Whether a definition is one `<Query>DynamicQueryFilter<Characteristic>`
/// filter. Every such filter has the shape of the generic base interface,
/// so none is emitted.
pub fn is_single_filter(definition: &Definition) -> bool {
    let key = definition.key.as_str();
    key.match_indices(DYNAMIC_QUERY_FILTER).any(|(at, word)| {
        let (head, rest) = (&key[..at], &key[at + word.len()..]);
        !head.is_empty()
            && head.bytes().all(|b| b.is_ascii_alphabetic())
            && rest.len() >= 2
            && rest.starts_with(|c: char| c.is_ascii_uppercase())
            && rest.bytes().all(|b| b.is_ascii_alphabetic())
    })
}

/// Whether a definition groups the filters of a dynamic query.
pub fn is_filter_set(definition: &Definition) -> bool {
    definition.key.ends_with(FILTER_SET_SUFFIX)
}

/// The property carrying a filter's value: `value` when declared, otherwise
/// the second property.
fn filter_value(filter: &Definition) -> Option<&Property> {
    filter
        .properties
        .iter()
        .find(|p| p.key == FILTER_VALUE)
        .or_else(|| filter.properties.get(1))
}

/// Emit `definitions/models.ts`: one class or interface per object definition.
pub fn emit_models(env: &Environment<'_>, definitions: &[&Definition]) -> Result<String, EmitError> {
    let tmpl = env.get_template("models.ts.j2")?;

    let by_key: HashMap<&str, &Definition> =
        definitions.iter().map(|d| (d.key.as_str(), *d)).collect();
    let emitted: Vec<&Definition> = definitions
        .iter()
        .copied()
        .filter(|d| {
            let single = is_single_filter(d);
            if single {
                log::debug!("filter {} covered by {DYNAMIC_QUERY_FILTER}", d.key);
            }
            !single
        })
        .collect();

    let local: HashSet<&str> = emitted.iter().map(|d| d.key.as_str()).collect();
    let mut imports = Imports::default();
    let mut models: Vec<minijinja::Value> = Vec::with_capacity(emitted.len());
    for def in &emitted {
        log::debug!("saw model {}", def.key);
        if let Some(parent) = &def.extends {
            imports.add(parent);
        }
        let filter_set = is_filter_set(def);
        let mut fields = Vec::with_capacity(def.properties.len());
        for prop in &def.properties {
            let value = filter_set
                .then(|| prop.reference())
                .flatten()
                .and_then(|key| by_key.get(key))
                .and_then(|filter| filter_value(filter));
            match value {
                Some(value) => {
                    imports.add(DYNAMIC_QUERY_FILTER);
                    imports.add_property(value);
                    let ty = format!("{DYNAMIC_QUERY_FILTER}<{}>", type_ref_to_ts(&value.ty));
                    fields.push(typed_field_ctx(prop, ty));
                }
                None => {
                    if filter_set {
                        log::warn!("filter {}.{} has no resolvable value", def.key, prop.key);
                    }
                    imports.add_property(prop);
                    fields.push(field_ctx(prop));
                }
            }
        }
        models.push(context! {
            name => def.key.clone(),
            description => def.description.clone(),
            interface => is_interface(def),
            extends => def.extends.clone(),
            fields => fields,
        });
    }

    Ok(tmpl.render(context! {
        header => HEADER,
        imports => imports.definition_lines(&local),
        models => models,
    })?)
}

/// Template context shared by every property-bearing category.
pub(crate) fn field_ctx(property: &Property) -> minijinja::Value {
    typed_field_ctx(property, type_ref_to_ts(&property.ty))
}

fn typed_field_ctx(property: &Property, ty: String) -> minijinja::Value {
    context! {
        key => declared_key(&property.key),
        accessor => accessor(&property.key),
        type => ty,
        required => property.required,
        description => property.description.clone(),
        init => init_expr(property),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::environment;
    use sdkgen_core::model::{Construction, DefinitionKind, TypeRef};

    fn member() -> Definition {
        let mut def = Definition::new("Member", DefinitionKind::Object);
        def.description = "A member of a group.".into();
        let mut id = Property::new("id", TypeRef::Primitive("string".into()));
        id.required = true;
        let mut joined = Property::new("joined_at", TypeRef::Named("ExtendedDate".into()));
        joined.construction = Construction::Construct("ExtendedDate".into());
        joined.description = "When the member joined.".into();
        let mut groups = Property::new("groups", TypeRef::Array(Some("Group".into())));
        groups.construction = Construction::ConstructEach("Group".into());
        def.properties = vec![id, groups, joined];
        def
    }

    #[test]
    fn test_class_rendering() {
        let env = environment().unwrap();
        let def = member();
        let out = emit_models(&env, &[&def]).unwrap();
        insta::assert_snapshot!(out, @r"
        // Code generated by sdkgen. DO NOT EDIT.
        import { ExtendedDate } from './base';
        import { Group } from '.';

        /** A member of a group. */
        export class Member {
          readonly id: string;
          readonly groups?: Group[];
          /** When the member joined. */
          readonly joined_at?: ExtendedDate;

          constructor(data: any) {
            this.id = data.id;
            this.groups = (data.groups ?? []).map((e: any) => new Group(e));
            this.joined_at = new ExtendedDate(data.joined_at);
          }
        }
        ");
    }

    #[test]
    fn test_interface_shapes() {
        let env = environment().unwrap();
        let mut query = Definition::new("ListMembersDynamicQuery", DefinitionKind::Object);
        query.properties = vec![Property::new("X-Page", TypeRef::Primitive("integer".into()))];
        let data = Definition::new("ProfileData", DefinitionKind::Object);
        assert!(is_interface(&query));
        assert!(is_interface(&data));
        assert!(!is_interface(&member()));

        let out = emit_models(&env, &[&query, &data]).unwrap();
        assert!(out.contains("export interface ListMembersDynamicQuery {"));
        assert!(out.contains("  'X-Page'?: number;"));
        assert!(out.contains("export interface ProfileData {"));
        assert!(!out.contains("constructor"));
    }

    #[test]
    fn test_local_names_not_imported() {
        let env = environment().unwrap();
        let group = Definition::new("Group", DefinitionKind::Object);
        let def = member();
        let out = emit_models(&env, &[&group, &def]).unwrap();
        assert!(!out.contains("import { Group }"));
        assert!(out.contains("export class Group {"));
    }

    #[test]
    fn test_single_filter_detection() {
        let def = |key: &str| Definition::new(key, DefinitionKind::Object);
        assert!(is_single_filter(&def("ListMembersDynamicQueryFilterRole")));
        assert!(!is_single_filter(&def("ListMembersDynamicQueryFilters")));
        assert!(!is_single_filter(&def("DynamicQueryFilterRole")));
        assert!(!is_single_filter(&def("ListMembersDynamicQueryFilterR")));
        assert!(is_filter_set(&def("ListMembersDynamicQueryFilters")));
    }

    #[test]
    fn test_filter_set_uses_generic_filter() {
        let env = environment().unwrap();
        let filter = |key: &str, value: TypeRef| {
            let mut def = Definition::new(key, DefinitionKind::Object);
            def.properties = vec![
                Property::new("enabled", TypeRef::Primitive("boolean".into())),
                Property::new("value", value),
            ];
            def
        };
        let role = filter("ListMembersDynamicQueryFilterRole", TypeRef::Named("MemberRole".into()));
        let name = filter("ListMembersDynamicQueryFilterName", TypeRef::Primitive("string".into()));
        let mut set = Definition::new("ListMembersDynamicQueryFilters", DefinitionKind::Object);
        set.properties = vec![
            Property::new("name", TypeRef::Named(name.key.clone())),
            Property::new("role", TypeRef::Named(role.key.clone())),
        ];

        let out = emit_models(&env, &[&name, &role, &set]).unwrap();
        insta::assert_snapshot!(out, @r"
        // Code generated by sdkgen. DO NOT EDIT.
        import { DynamicQueryFilter } from './base';
        import { MemberRole } from '.';

        export interface ListMembersDynamicQueryFilters {
          name?: DynamicQueryFilter<string>;
          role?: DynamicQueryFilter<MemberRole>;
        }
        ");
    }
}
