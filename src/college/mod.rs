//! College affiliation derived from email domains.
//!
//! The college identifier is the first dot-delimited label after `@`,
//! lowercased. It is a scoping tag only and is never validated against a
//! registry of real institutions. Note that `user@cs.stanford.edu` yields
//! `cs`, not `stanford`.

/// Extract a college identifier from an email address.
///
/// Returns `None` when the address has no `@` or nothing after it.
pub fn college_id_from_email(email: &str) -> Option<String> {
    let (_, domain) = email.split_once('@')?;
    let label = domain.split('.').next().unwrap_or("");
    if label.is_empty() {
        return None;
    }
    Some(label.to_ascii_lowercase())
}

/// Case-insensitive same-college check. Both sides must carry an
/// affiliation; a missing college id never matches anything.
pub fn same_college(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_label_between_at_and_first_dot() {
        assert_eq!(
            college_id_from_email("bob@stanford.edu"),
            Some("stanford".to_string())
        );
    }

    #[test]
    fn subdomain_wins_over_registrable_domain() {
        assert_eq!(
            college_id_from_email("bob@cs.stanford.edu"),
            Some("cs".to_string())
        );
    }

    #[test]
    fn lowercases_the_identifier() {
        assert_eq!(
            college_id_from_email("bob@MIT.edu"),
            Some("mit".to_string())
        );
    }

    #[test]
    fn no_at_sign_means_no_affiliation() {
        assert_eq!(college_id_from_email("no-at-sign"), None);
        assert_eq!(college_id_from_email(""), None);
    }

    #[test]
    fn empty_domain_means_no_affiliation() {
        assert_eq!(college_id_from_email("bob@"), None);
        assert_eq!(college_id_from_email("bob@.edu"), None);
    }

    #[test]
    fn dotless_domain_still_counts() {
        assert_eq!(
            college_id_from_email("bob@campus"),
            Some("campus".to_string())
        );
    }

    #[test]
    fn same_college_is_case_insensitive() {
        assert!(same_college(Some("mit"), Some("MIT")));
        assert!(!same_college(Some("mit"), Some("stanford")));
    }

    #[test]
    fn missing_affiliation_never_matches() {
        assert!(!same_college(None, Some("mit")));
        assert!(!same_college(Some("mit"), None));
        assert!(!same_college(None, None));
    }
}
