//! Reduce the current candidates of a search to a single entry

use dirgate_core::types::DirectoryEntry;

use crate::error::{AuthFailure, AuthResult};
use crate::validity::CandidateSet;

/// The one current entry, with its distinguished name.
///
/// Zero candidates means the identifier exists only outside its validity
/// windows; more than one means the directory is ambiguous and nothing is
/// guessed.
pub fn resolve(candidates: CandidateSet) -> AuthResult<(String, DirectoryEntry)> {
    match candidates.len() {
        0 => Err(AuthFailure::NoValidEntry),
        1 => candidates
            .into_iter()
            .next()
            .ok_or(AuthFailure::NoValidEntry),
        count => Err(AuthFailure::TooManyValidEntries { count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(dns: &[&str]) -> CandidateSet {
        dns.iter()
            .map(|dn| (dn.to_string(), DirectoryEntry::new(*dn)))
            .collect()
    }

    #[test]
    fn test_single_candidate() {
        let (dn, entry) = resolve(candidates(&["uid=u100,ou=people"])).unwrap();
        assert_eq!(dn, "uid=u100,ou=people");
        assert_eq!(entry.dn, dn);
    }

    #[test]
    fn test_no_candidates() {
        assert!(matches!(
            resolve(CandidateSet::new()),
            Err(AuthFailure::NoValidEntry)
        ));
    }

    #[test]
    fn test_ambiguous_candidates() {
        let result = resolve(candidates(&["uid=a,ou=x", "uid=a,ou=y", "uid=a,ou=z"]));
        assert!(matches!(
            result,
            Err(AuthFailure::TooManyValidEntries { count: 3 })
        ));
    }
}
