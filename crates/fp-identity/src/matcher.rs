//! Two-stage cross-source matching of a telematics driver against a
//! target identifier from the CRM side.

use fp_protocol::roster::DriverRecord;

use crate::normalize::{normalize_email, normalize_name};

/// What the caller knows about the record it wants to find. Email is the
/// preferred key; name matching is the fallback when no email exists.
#[derive(Debug, Clone, Copy)]
pub enum MatchTarget<'a> {
    Email(&'a str),
    Name(&'a str),
}

/// Find the best single match for `target` in a telematics roster, or
/// none.
///
/// Email targets require exact equality of normalized emails; an empty
/// normalized email never matches. Name targets try case-insensitive
/// equality of normalized names first, then fall back to token
/// containment: every whitespace-split token of the query name must
/// appear as a substring of the candidate's name. No edit-distance
/// tolerance, no minimum token length.
pub fn match_driver<'a>(
    target: MatchTarget<'_>,
    roster: &'a [DriverRecord],
) -> Option<&'a DriverRecord> {
    match target {
        MatchTarget::Email(email) => {
            let wanted = normalize_email(email);
            if wanted.is_empty() {
                return None;
            }
            roster
                .iter()
                .find(|driver| normalize_email(&driver.email) == wanted)
        }
        MatchTarget::Name(name) => {
            let wanted = normalize_name(name).to_lowercase();
            if wanted.is_empty() {
                return None;
            }
            if let Some(exact) = roster
                .iter()
                .find(|driver| normalize_name(&driver.display_name).to_lowercase() == wanted)
            {
                return Some(exact);
            }
            let tokens: Vec<&str> = wanted.split_whitespace().collect();
            roster.iter().find(|driver| {
                let candidate = normalize_name(&driver.display_name).to_lowercase();
                tokens.iter().all(|token| candidate.contains(token))
            })
        }
    }
}
