//! Regex utilities for stategen
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::Regex;

/// Edge-label annotation patterns (guards and actions embedded in labels)
pub mod labels {
    use super::*;

    pub static GUARD_PREFIX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"guard:\s*([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex pattern")
    });

    pub static GUARD_BRACKET: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\[([A-Za-z_][A-Za-z0-9_]*)\]").expect("Invalid regex pattern")
    });

    pub static GUARD_WHEN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\bwhen\s+([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex pattern")
    });

    pub static ACTION_PREFIX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"action:\s*([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex pattern")
    });

    pub static ACTION_DO: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"do:\s*([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex pattern")
    });

    pub static ACTION_EXECUTE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"execute:\s*([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex pattern")
    });

    /// Extract a guard reference from an edge label.
    /// Patterns are tried in priority order; the first match wins.
    pub fn extract_guard(label: &str) -> Option<String> {
        for pattern in [&*GUARD_PREFIX, &*GUARD_BRACKET, &*GUARD_WHEN] {
            if let Some(caps) = pattern.captures(label) {
                return caps.get(1).map(|m| m.as_str().to_string());
            }
        }
        None
    }

    /// Extract an action reference from an edge label.
    /// Patterns are tried in priority order; the first match wins.
    pub fn extract_action(label: &str) -> Option<String> {
        for pattern in [&*ACTION_PREFIX, &*ACTION_DO, &*ACTION_EXECUTE] {
            if let Some(caps) = pattern.captures(label) {
                return caps.get(1).map(|m| m.as_str().to_string());
            }
        }
        None
    }

    /// Remove guard/action annotations from a label, leaving only the
    /// display text used for event naming.
    pub fn strip_annotations(label: &str) -> String {
        let mut text = label.to_string();
        for pattern in [
            &*GUARD_PREFIX,
            &*GUARD_BRACKET,
            &*GUARD_WHEN,
            &*ACTION_PREFIX,
            &*ACTION_DO,
            &*ACTION_EXECUTE,
        ] {
            text = pattern.replace_all(&text, "").to_string();
        }
        text.trim().to_string()
    }
}

/// Identifier and naming-convention patterns
pub mod identifiers {
    use super::*;

    pub static STATE_ID: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("Invalid regex pattern")
    });

    pub static PASCAL_CASE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[A-Z][a-zA-Z0-9]*$").expect("Invalid regex pattern")
    });

    pub static UPPER_SNAKE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[A-Z][A-Z0-9_]*$").expect("Invalid regex pattern")
    });

    /// Check whether a token is a valid state identifier
    pub fn is_valid_state_id(id: &str) -> bool {
        STATE_ID.is_match(id)
    }

    /// Check whether a state name follows the PascalCase convention
    pub fn is_pascal_case(name: &str) -> bool {
        PASCAL_CASE.is_match(name)
    }

    /// Check whether an event name follows the UPPER_SNAKE_CASE convention
    pub fn is_upper_snake(name: &str) -> bool {
        UPPER_SNAKE.is_match(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_extraction_priority() {
        assert_eq!(labels::extract_guard("guard:isAdult"), Some("isAdult".to_string()));
        assert_eq!(labels::extract_guard("[hasBalance]"), Some("hasBalance".to_string()));
        assert_eq!(labels::extract_guard("when isRegistered"), Some("isRegistered".to_string()));

        // guard: prefix outranks bracket form
        assert_eq!(
            labels::extract_guard("guard:isAdult [hasBalance]"),
            Some("isAdult".to_string())
        );

        assert_eq!(labels::extract_guard("Select option"), None);
    }

    #[test]
    fn test_action_extraction_priority() {
        assert_eq!(labels::extract_action("action:logAccess"), Some("logAccess".to_string()));
        assert_eq!(labels::extract_action("do:logAccess"), Some("logAccess".to_string()));
        assert_eq!(labels::extract_action("execute:sendSms"), Some("sendSms".to_string()));
        assert_eq!(
            labels::extract_action("action:first do:second"),
            Some("first".to_string())
        );
    }

    #[test]
    fn test_combined_annotations() {
        let label = "guard:isAdult do:logAccess";
        assert_eq!(labels::extract_guard(label), Some("isAdult".to_string()));
        assert_eq!(labels::extract_action(label), Some("logAccess".to_string()));
    }

    #[test]
    fn test_strip_annotations() {
        assert_eq!(labels::strip_annotations("Enter PIN do:validatePin"), "Enter PIN");
        assert_eq!(labels::strip_annotations("guard:isAdult do:logAccess"), "");
        assert_eq!(labels::strip_annotations("Confirm transfer"), "Confirm transfer");
    }

    #[test]
    fn test_state_id_validation() {
        assert!(identifiers::is_valid_state_id("Start"));
        assert!(identifiers::is_valid_state_id("enter_pin"));
        assert!(identifiers::is_valid_state_id("Step-2"));
        assert!(!identifiers::is_valid_state_id("1bad"));
        assert!(!identifiers::is_valid_state_id(""));
        assert!(!identifiers::is_valid_state_id("has space"));
    }

    #[test]
    fn test_naming_conventions() {
        assert!(identifiers::is_pascal_case("EnterPin"));
        assert!(!identifiers::is_pascal_case("enterPin"));
        assert!(!identifiers::is_pascal_case("Enter_Pin"));

        assert!(identifiers::is_upper_snake("CONFIRM_TRANSFER"));
        assert!(!identifiers::is_upper_snake("Confirm"));
        assert!(!identifiers::is_upper_snake("confirm_transfer"));
    }
}
