//! Property-based tests for scoped_logger using proptest

use proptest::prelude::*;
use scoped_logger::core::render::{pad_column, strip_line_breaks};
use scoped_logger::core::state::render_template;
use scoped_logger::prelude::*;
use scoped_logger::{EntryParts, LineLayout, ProcessIdentity};
use std::sync::Arc;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(LogLevel::ALL.to_vec())
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Parsing ignores case
    #[test]
    fn test_log_level_parse_case_insensitive(level in any_level()) {
        let lower: LogLevel = level.to_str().to_lowercase().parse().unwrap();
        let upper: LogLevel = level.to_str().to_uppercase().parse().unwrap();
        prop_assert_eq!(lower, level);
        prop_assert_eq!(upper, level);
    }

    /// Test that LogLevel ordering follows the ordinal
    #[test]
    fn test_log_level_ordering(a in any_level(), b in any_level()) {
        prop_assert_eq!(a <= b, a.ordinal() <= b.ordinal());
        prop_assert_eq!(LogLevel::from_ordinal(a.ordinal()), a);
    }

    /// A level passes a gate iff neither is None and the ordinal is high enough
    #[test]
    fn test_gate_monotonicity(level in any_level(), default in any_level()) {
        let expected = level != LogLevel::None
            && default != LogLevel::None
            && level.ordinal() >= default.ordinal();
        prop_assert_eq!(LevelGate::new(default).allows(level), expected);
    }

    /// The provider dispatches exactly the records its gate allows
    #[test]
    fn test_provider_gate_matches_dispatch(level in any_level(), default in any_level()) {
        let sink = MemorySink::new();
        let provider = LoggerProvider::builder()
            .min_level(default)
            .workers(1)
            .sink(sink.clone())
            .build();
        let logger = provider.logger("Gate");

        prop_assert_eq!(logger.is_enabled(level), LevelGate::new(default).allows(level));
        logger.log_text(level, "probe");
        provider.shutdown(std::time::Duration::from_secs(5));

        prop_assert_eq!(sink.len(), usize::from(LevelGate::new(default).allows(level)));
    }

    /// Gate JSON round trips through serde
    #[test]
    fn test_gate_json_roundtrip(default in any_level()) {
        let gate = LevelGate::new(default);
        let json = serde_json::to_string(&gate).unwrap();
        prop_assert_eq!(LevelGate::from_json(&json).unwrap(), gate);
    }
}

// ============================================================================
// Rendering Tests
// ============================================================================

proptest! {
    /// Padded columns always have exactly the requested width
    #[test]
    fn test_pad_column_width(value in "\\PC{0,80}", width in 1usize..64) {
        let padded = pad_column(&value, width);
        prop_assert_eq!(padded.chars().count(), width);

        let kept: String = value.chars().take(width).collect();
        prop_assert!(padded.starts_with(&kept));
    }

    /// Line view never contains line breaks
    #[test]
    fn test_line_view_is_single_line(message in "[a-z\\r\\n ]{0,60}") {
        let entry = LogEntry::new("Lines", LogLevel::Information, message.clone());
        prop_assert!(!entry.as_line().contains('\n'));
        prop_assert!(!entry.as_line().contains('\r'));
        prop_assert!(entry.as_line().ends_with(&strip_line_breaks(&message)));
    }

    /// First column of the line view is exactly the configured Id width
    #[test]
    fn test_id_column_padding(width in 1usize..80) {
        let layout = LineLayout { id: width, ..LineLayout::default() };
        let render = Arc::new(RenderConfig::try_new(layout, 12).unwrap());
        let entry = LogEntry::capture(
            EntryParts { state: LogState::text("padded"), ..EntryParts::default() },
            &ProcessIdentity::new("h", "a"),
            render,
        );

        let id = entry.id().to_string();
        let column: String = entry.as_line().chars().take(width).collect();
        let expected: String = id.chars().chain(std::iter::repeat(' ')).take(width).collect();
        prop_assert_eq!(column, expected);
    }

    /// Every view returns identical bytes on repeated reads
    #[test]
    fn test_views_are_idempotent(message in "\\PC{0,40}", category in "[A-Za-z.]{1,20}") {
        let entry = LogEntry::new(category, LogLevel::Warning, message);
        prop_assert_eq!(entry.as_line().to_string(), entry.as_line().to_string());
        prop_assert_eq!(entry.as_list().to_string(), entry.as_list().to_string());
        prop_assert_eq!(entry.as_json().to_string(), entry.as_json().to_string());
    }

    /// JSON view always parses and keeps the message
    #[test]
    fn test_json_view_parses(message in "\\PC{0,40}") {
        let entry = LogEntry::new("Json", LogLevel::Error, message.clone());
        let parsed: serde_json::Value = serde_json::from_str(entry.as_json()).unwrap();
        prop_assert_eq!(parsed["Text"].as_str().unwrap(), message.as_str());
    }
}

// ============================================================================
// Template Tests
// ============================================================================

proptest! {
    /// Text without braces renders verbatim
    #[test]
    fn test_template_without_placeholders(text in "[^{}]{0,60}") {
        prop_assert_eq!(render_template(&text, &Properties::new().with("x", 1)), text);
    }

    /// A placeholder is replaced by its property value
    #[test]
    fn test_template_substitutes(name in "[A-Za-z]{1,12}", value in "[a-z0-9 ]{0,20}") {
        let template = format!("before {{{}}} after", name);
        let properties = Properties::new().with(name.as_str(), value.as_str());
        prop_assert_eq!(
            render_template(&template, &properties),
            format!("before {} after", value)
        );
    }

    /// Placeholders without a property stay as written
    #[test]
    fn test_template_unknown_placeholder(name in "[A-Za-z]{1,12}") {
        let template = format!("value: {{{}}}", name);
        prop_assert_eq!(render_template(&template, &Properties::new()), template.clone());
    }

    /// Property order is preserved in the rendered list
    #[test]
    fn test_properties_keep_insertion_order(keys in prop::collection::vec("[a-z]{1,6}", 1..8)) {
        let mut properties = Properties::new();
        for (index, key) in keys.iter().enumerate() {
            properties.insert(format!("{}{}", key, index), index as i64);
        }
        let rendered: Vec<String> = properties.iter().map(|(k, _)| k.to_string()).collect();
        let expected: Vec<String> = keys
            .iter()
            .enumerate()
            .map(|(index, key)| format!("{}{}", key, index))
            .collect();
        prop_assert_eq!(rendered, expected);
    }
}
