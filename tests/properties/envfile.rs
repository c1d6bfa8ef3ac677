//! Property tests for the dotenv-style document model.

use proptest::prelude::*;

use lempkit::envfile::{EnvFile, Line};

fn key() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Z_][A-Z0-9_]{0,15}").unwrap()
}

fn value() -> impl Strategy<Value = String> {
    // Printable, no newlines; '=' and ':' are allowed inside values.
    proptest::string::string_regex("[ -~]{0,30}").unwrap()
}

fn raw_line() -> impl Strategy<Value = String> {
    // Comments, blanks, and junk that is not a KEY=VALUE assignment.
    prop_oneof![
        Just(String::new()),
        proptest::string::string_regex("# [ -~]{0,20}").unwrap(),
        proptest::string::string_regex("[a-z ]{1,10}").unwrap(),
    ]
}

fn document_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (key(), value()).prop_map(|(k, v)| format!("{k}={v}")),
        raw_line(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Parsing never panics on arbitrary input.
    #[test]
    fn property_parse_never_panics(content in "(?s).{0,512}") {
        let _ = EnvFile::parse(&content);
    }

    /// PROPERTY: A document of well-formed lines round-trips byte-for-byte.
    #[test]
    fn property_round_trip(lines in proptest::collection::vec(document_line(), 0..=16)) {
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        prop_assert_eq!(EnvFile::parse(&content).to_string(), content);
    }

    /// PROPERTY: After `set`, `get` returns the new value.
    #[test]
    fn property_set_then_get(
        lines in proptest::collection::vec(document_line(), 0..=8),
        k in key(),
        v in value(),
    ) {
        let mut env = EnvFile::parse(&lines.join("\n"));
        env.set(&k, &v);
        prop_assert_eq!(env.get(&k), Some(v.as_str()));
    }

    /// PROPERTY: `set` leaves every other line untouched.
    #[test]
    fn property_set_is_surgical(
        lines in proptest::collection::vec(document_line(), 0..=8),
        k in key(),
        v in value(),
    ) {
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        let before = EnvFile::parse(&content);
        let mut after = before.clone();
        after.set(&k, &v);

        let changed: Vec<(&Line, &Line)> = before
            .lines()
            .iter()
            .zip(after.lines().iter())
            .filter(|(b, a)| b != a)
            .map(|(b, a)| (b, a))
            .collect();

        // At most one existing line changed, and only its value.
        prop_assert!(changed.len() <= 1);
        if let Some((b, a)) = changed.first() {
            match (b, a) {
                (Line::Pair { key: bk, .. }, Line::Pair { key: ak, value: av }) => {
                    prop_assert_eq!(bk, ak);
                    prop_assert_eq!(ak, &k);
                    prop_assert_eq!(av, &v);
                }
                other => prop_assert!(false, "unexpected line change: {:?}", other),
            }
        }
        // If nothing changed in place, the key was appended at the end.
        if changed.is_empty() {
            prop_assert!(after.lines().len() <= before.lines().len() + 1);
        }
    }
}
