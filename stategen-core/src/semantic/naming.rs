//! Identifier derivation shared by the semantic generator and emitters
//!
//! Every emitter references these rules so cross-file identifiers (a test
//! importing the machine constant, a service wrapping it) stay consistent.

/// Sanitize an arbitrary machine name into a stable identifier.
///
/// The transform is deterministic, total, and idempotent: characters
/// outside `[A-Za-z0-9_]` are stripped, the result is lowercased, a digit
/// start gains a leading underscore, and the `_machine` suffix is appended
/// when absent. Fully-stripped input maps to `unnamed_machine`.
pub fn sanitize_machine_ident(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if ident.is_empty() {
        ident.push_str("unnamed");
    }
    if ident.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if !ident.ends_with("_machine") {
        ident.push_str("_machine");
    }
    ident
}

/// Normalize an edge label into an event name: annotation sub-patterns are
/// stripped, the rest uppercased with non-alphanumeric runs collapsed to
/// single underscores. Returns an empty string for annotation-only labels.
pub fn normalize_event_name(label: &str) -> String {
    let stripped = regex_utils::labels::strip_annotations(label);

    let mut name = String::new();
    let mut boundary = true;
    for ch in stripped.chars() {
        if ch.is_ascii_alphanumeric() {
            name.push(ch.to_ascii_uppercase());
            boundary = false;
        } else if !boundary {
            name.push('_');
            boundary = true;
        }
    }
    name.trim_end_matches('_').to_string()
}

/// Convert a `_`/`-`-separated name to camelCase
pub fn to_camel_case(name: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            capitalize_next = !result.is_empty();
        } else if capitalize_next {
            result.push(ch.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}

/// Convert a `_`/`-`-separated name to PascalCase
pub fn to_pascal_case(name: &str) -> String {
    let camel = to_camel_case(name);
    match camel.chars().next() {
        Some(first) => first.to_ascii_uppercase().to_string() + &camel[first.len_utf8()..],
        None => camel,
    }
}

/// TS constant name for a machine module (`user_registration_machine` →
/// `userRegistrationMachine`)
pub fn machine_const_ident(machine_id: &str) -> String {
    to_camel_case(machine_id)
}

/// Base name for generated TS types (`user_registration_machine` →
/// `UserRegistration`)
pub fn type_base_name(machine_id: &str) -> String {
    to_pascal_case(machine_id.trim_end_matches("_machine"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize_machine_ident("User Registration"), "userregistration_machine");
        assert_eq!(sanitize_machine_ident("user_registration"), "user_registration_machine");
        assert_eq!(sanitize_machine_ident("9lives"), "_9lives_machine");
        assert_eq!(sanitize_machine_ident(""), "unnamed_machine");
        assert_eq!(sanitize_machine_ident("***"), "unnamed_machine");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for input in ["User Registration", "9lives", "", "___", "wallet-top-up", "already_machine"] {
            let once = sanitize_machine_ident(input);
            assert_eq!(sanitize_machine_ident(&once), once, "not a fixpoint for {:?}", input);
        }
    }

    #[test]
    fn test_sanitize_output_shape() {
        for input in ["", "42", "Ünïcøde!", "a b c", "-"] {
            let ident = sanitize_machine_ident(input);
            assert!(!ident.is_empty());
            let first = ident.chars().next().unwrap();
            assert!(first.is_ascii_alphabetic() || first == '_', "bad start in {:?}", ident);
        }
    }

    #[test]
    fn test_normalize_event_name() {
        assert_eq!(normalize_event_name("Select option"), "SELECT_OPTION");
        assert_eq!(normalize_event_name("  done!  "), "DONE");
        assert_eq!(normalize_event_name("Enter PIN do:validatePin"), "ENTER_PIN");
        assert_eq!(normalize_event_name("guard:isAdult"), "");
        assert_eq!(normalize_event_name("a--b__c"), "A_B_C");
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_camel_case("user_registration_machine"), "userRegistrationMachine");
        assert_eq!(to_camel_case("wallet-top-up"), "walletTopUp");
        assert_eq!(to_pascal_case("user_registration"), "UserRegistration");
        assert_eq!(type_base_name("user_registration_machine"), "UserRegistration");
        assert_eq!(machine_const_ident("balance_check_machine"), "balanceCheckMachine");
    }
}
