//! Utility functions

use uuid::Uuid;

/// Generate a unique id for one authentication attempt
pub fn generate_attempt_id() -> String {
    Uuid::new_v4().to_string().replace("-", "").to_uppercase()
}

/// True when the value is absent or contains only whitespace
pub fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_ids_are_unique() {
        let a = generate_attempt_id();
        let b = generate_attempt_id();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
        assert!(!a.contains('-'));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("")));
        assert!(is_blank(Some("   ")));
        assert!(!is_blank(Some("2020/01/01")));
    }
}
