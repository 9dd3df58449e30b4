//! Argument sub-extractor.

use super::DeclSite;
use crate::config::DocMarkers;
use crate::model::{Argument, ArgumentInfo, NO_DESCRIPTION};
use crate::syntax::stmt::parse_declaration;

/// The variable carrying a function's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSlot {
    pub name: String,
    /// Type from the function prefix, used when the variable is never declared
    pub prefix_type: Option<String>,
}

/// Collect documented arguments from a procedure's declarations.
///
/// A declared name is kept when it is a formal argument declared with
/// `intent(...)`, or when it is the result variable. The result variable is
/// always present in the output, declared or not.
pub fn extract_arguments(
    declarations: &[DeclSite<'_>],
    formal_args: &[String],
    result: Option<&ResultSlot>,
    markers: &DocMarkers,
) -> Vec<Argument> {
    let mut args: Vec<Argument> = Vec::new();

    for site in declarations {
        let Some(decl) = parse_declaration(site.code) else {
            continue;
        };
        let intent = decl.has_intent();
        for entity in &decl.entities {
            let is_result = result.is_some_and(|r| r.name.eq_ignore_ascii_case(entity));
            let is_formal = formal_args.iter().any(|f| f.eq_ignore_ascii_case(entity));
            if !(is_result || (is_formal && intent)) {
                continue;
            }
            if args.iter().any(|a| a.name.eq_ignore_ascii_case(entity)) {
                continue;
            }
            args.push(Argument {
                name: entity.clone(),
                info: ArgumentInfo {
                    description: site
                        .doc(markers)
                        .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                    attributes: decl.attribute_text(),
                },
            });
        }
    }

    if let Some(slot) = result {
        if !args.iter().any(|a| a.name.eq_ignore_ascii_case(&slot.name)) {
            args.push(Argument {
                name: slot.name.clone(),
                info: ArgumentInfo {
                    description: NO_DESCRIPTION.to_string(),
                    attributes: slot.prefix_type.clone().unwrap_or_default(),
                },
            });
        }
    }

    args
}
