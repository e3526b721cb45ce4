use thiserror::Error;
use meetbot_common::models::Contact;

/// The first requested name nobody in the directory answers to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot find '{name}' in your contacts. Known contacts: {}", .candidates.join(", "))]
pub struct UnresolvedName {
    pub name: String,
    /// Display names seen while resolving the first requested name.
    pub candidates: Vec<String>,
}

/// Map display names to addresses, in request order.
///
/// A name resolves on an exact, case-sensitive display-name match against an
/// entry that has an address; the first such entry wins. Resolution stops at
/// the first miss and nothing resolved so far is returned. The candidate list
/// is collected once, during the first name's scan, and only feeds the error.
pub fn resolve_participants(
    names: &[String],
    directory: &[Contact],
) -> Result<Vec<String>, UnresolvedName> {
    let mut resolved = Vec::with_capacity(names.len());
    let mut candidates: Option<Vec<String>> = None;

    for name in names {
        let collecting = candidates.is_none();
        let mut seen = Vec::new();
        let mut address = None;

        for entry in directory {
            if collecting {
                seen.push(entry.display_name.clone());
            }
            if entry.display_name == *name {
                if let Some(addr) = entry.first_address() {
                    address = Some(addr.to_string());
                    break;
                }
            }
        }
        if collecting {
            candidates = Some(seen);
        }

        match address {
            Some(addr) => resolved.push(addr),
            None => {
                return Err(UnresolvedName {
                    name: name.clone(),
                    candidates: candidates.unwrap_or_default(),
                });
            }
        }
    }
    Ok(resolved)
}
