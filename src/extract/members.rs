//! Derived-type body: components before `contains`, bindings after.

use super::DeclSite;
use crate::config::DocMarkers;
use crate::model::{MemberInfo, ProcedureRef};
use crate::syntax::stmt::{is_contains, parse_declaration, parse_type_bound, TypeBoundStmt};

/// Split a type body at `contains` and parse each side independently.
pub fn extract_members(
    body: &[DeclSite<'_>],
    markers: &DocMarkers,
) -> (Vec<MemberInfo>, Vec<ProcedureRef>) {
    let boundary = body
        .iter()
        .position(|s| is_contains(s.code))
        .unwrap_or(body.len());
    let (components, bindings) = body.split_at(boundary);
    let bindings = bindings.get(1..).unwrap_or_default();

    (
        components
            .iter()
            .flat_map(|site| members_of(site, markers))
            .collect(),
        bindings.iter().flat_map(procedures_of).collect(),
    )
}

fn members_of(site: &DeclSite<'_>, markers: &DocMarkers) -> Vec<MemberInfo> {
    let Some(decl) = parse_declaration(site.code) else {
        return Vec::new();
    };
    let mut attributes = decl.type_spec.clone();
    for attr in &decl.attributes {
        attributes.push_str(", ");
        attributes.push_str(&attr.to_ascii_lowercase());
    }
    let doc = site.doc(markers);
    decl.entities
        .into_iter()
        .map(|name| MemberInfo {
            name,
            attributes: attributes.clone(),
            doc: doc.clone(),
        })
        .collect()
}

fn procedures_of(site: &DeclSite<'_>) -> Vec<ProcedureRef> {
    match parse_type_bound(site.code) {
        Some(TypeBoundStmt::Specific {
            attributes,
            bindings,
        }) => {
            let mut attrs = String::from("procedure");
            for attr in &attributes {
                attrs.push_str(", ");
                attrs.push_str(&attr.to_ascii_lowercase());
            }
            bindings
                .into_iter()
                .map(|(name, target)| ProcedureRef {
                    name,
                    attributes: attrs.clone(),
                    target,
                })
                .collect()
        }
        Some(kind) => {
            tracing::debug!(line = site.line, ?kind, "unsupported type-bound binding skipped");
            Vec::new()
        }
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites<'a>(codes: &[&'a str]) -> Vec<DeclSite<'a>> {
        codes
            .iter()
            .map(|&code| DeclSite {
                code,
                line: 0,
                leading: Vec::new(),
                trailing: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn splits_at_contains() {
        let body = sites(&[
            "real :: x, y",
            "integer, Dimension(3) :: ids",
            "contains",
            "procedure :: norm",
            "procedure, pass(self) :: scale => point_scale",
        ]);
        let (members, procs) = extract_members(&body, &DocMarkers::default());
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["x", "y", "ids"]);
        assert_eq!(members[2].attributes, "integer, dimension(3)");
        assert_eq!(procs.len(), 2);
        assert_eq!(procs[0].name, "norm");
        assert_eq!(procs[0].attributes, "procedure");
        assert_eq!(procs[1].attributes, "procedure, pass(self)");
        assert_eq!(procs[1].target.as_deref(), Some("point_scale"));
    }

    #[test]
    fn no_contains_means_no_bindings() {
        let body = sites(&["sequence", "integer :: n"]);
        let (members, procs) = extract_members(&body, &DocMarkers::default());
        assert_eq!(members.len(), 1);
        assert!(procs.is_empty());
    }

    #[test]
    fn declaration_after_contains_is_not_a_member() {
        let body = sites(&["contains", "procedure(iface), deferred :: run", "generic :: g => run"]);
        let (members, procs) = extract_members(&body, &DocMarkers::default());
        assert!(members.is_empty());
        assert!(procs.is_empty());
    }

    #[test]
    fn member_docs_from_trailing_comment() {
        let body = vec![DeclSite {
            code: "real :: radius",
            line: 3,
            leading: Vec::new(),
            trailing: vec!["!> Circle radius"],
        }];
        let (members, _) = extract_members(&body, &DocMarkers::default());
        assert_eq!(members[0].doc.as_deref(), Some("Circle radius"));
    }
}
