//! MDS naming conventions.
//!
//! Cython handle and function names follow fixed patterns built from a
//! type's `name` and `title`, so the catalog only spells out the facts and
//! the names are filled in here.

use weave_core::{Catalog, Result, TaxonomyCategory, TypeDescriptor};

const PRIMITIVE_BASE: &str = "MDSPrimitiveBase";
const ARRAY_BASE: &str = "MDSArrayBase";

/// Fill in every derived attribute the descriptor does not already set.
///
/// Descriptors without a `name` are returned untouched.
pub fn complete(descriptor: TypeDescriptor) -> TypeDescriptor {
    let Some(name) = descriptor.str_attr("name").map(str::to_string) else {
        return descriptor;
    };
    let title = descriptor
        .str_attr("title")
        .map(str::to_string)
        .unwrap_or_else(|| capitalize(&name));

    let derived = [
        ("title", title.clone()),
        ("api", title.clone()),
        ("kind", format!("mds::api::kind::{}", name.to_uppercase())),
        ("managed_value", format!("mv_{}", name)),
        ("primitive", format!("h_m{}_t", name)),
        ("const_primitive", format!("h_const_m{}_t", name)),
        ("record_field", format!("h_rfield_{}_t", name)),
        ("const_record_field", format!("h_const_rfield_{}_t", name)),
        ("array", format!("h_array_{}_t", name)),
        ("const_array", format!("h_const_array_{}_t", name)),
        ("managed_array", format!("h_marray_{}_t", name)),
        ("const_managed_array", format!("h_const_marray_{}_t", name)),
        ("f_to_core_val", format!("to_core_val_{}", name)),
        ("f_bind", format!("bind_{}", name)),
        ("f_lookup", format!("lookup_{}", name)),
        ("f_lookup_array", format!("lookup_{}_array", name)),
        ("f_managed_type_handle", format!("managed_type_handle_{}", name)),
        ("f_const_managed_type_handle", format!("const_managed_type_handle_{}", name)),
        ("f_create_array", format!("create_{}_marray", name)),
        ("f_create_const_array", format!("create_const_{}_marray", name)),
        ("title_array", format!("{}Array", title)),
        ("title_name_binding", format!("{}NameBinding", title)),
        ("title_record_field", format!("{}RecordField", title)),
        ("title_record_field_reference", format!("{}RecordFieldReference", title)),
        ("title_const_record_field_reference", format!("Const{}RecordFieldReference", title)),
        ("title_record_member", format!("{}RecordMember", title)),
        ("title_const_record_member", format!("Const{}RecordMember", title)),
        ("PRIMITIVE", PRIMITIVE_BASE.to_string()),
        ("ARRAY", ARRAY_BASE.to_string()),
    ];

    derived
        .into_iter()
        .fold(descriptor, |d, (key, value)| {
            if d.get(key).is_some() {
                d
            } else {
                d.with(key, value)
            }
        })
}

/// Rebuild a catalog with every descriptor completed.
pub fn complete_catalog(catalog: &Catalog) -> Result<Catalog> {
    let mut completed = Catalog::new();
    for category in catalog.categories() {
        let mut rebuilt = TaxonomyCategory::new(category.name());
        for (label, descriptor) in category.entries() {
            rebuilt.insert(label, complete(descriptor.clone()))?;
        }
        completed.insert(rebuilt)?;
    }
    Ok(completed)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
