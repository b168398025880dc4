use plist_serde::{
    Dictionary, Error, FormattingOptions, InvalidDataPolicy, Settings, TagVocabulary, Value, load,
    save_to_string,
};

const SIMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Simple</key>
    <string>Plist</string>
    <key>IntValue</key>
    <integer>696969</integer>
</dict>
</plist>
"#;

const SIMPLE_SHORT: &str = r#"<plist version="1.0">
<dict>
    <k>Simple</k>
    <s>Plist</s>
    <k>IntValue</k>
    <i>696969</i>
</dict>
</plist>
"#;

const COMPLICATED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
    <key>SomeInt</key>
    <integer>13371337</integer>
    <key>Person</key>
    <dict>
        <key>FirstName</key>
        <string>John</string>
        <key>LastName</key>
        <string>Public</string>
        <key>Address</key>
        <dict>
            <key>City</key>
            <string>Some Town</string>
        </dict>
        <key>PhoneNumbers</key>
        <array>
            <dict>
                <key>Number</key>
                <string>555-555-5555</string>
            </dict>
            <dict>
                <key>Number</key>
                <string>555-555-0000</string>
            </dict>
        </array>
    </dict>
</dict>
</plist>
"#;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn lenient() -> Settings {
    Settings::builder()
        .invalid_data_policy(InvalidDataPolicy::ReturnDefaultOrOriginal)
        .build()
        .unwrap()
}

fn short_output() -> Settings {
    Settings::new(TagVocabulary::Both, TagVocabulary::Short).unwrap()
}

fn wrap(body: &str) -> String {
    format!("<plist version=\"1.0\"><dict>{body}</dict></plist>")
}

// ── Simple document ────────────────────────────────────────────────────────

#[test]
fn test_simple_load() {
    init();
    let dict = load(SIMPLE.as_bytes(), &Settings::default()).unwrap();
    assert_eq!(dict.get("Simple"), Some(&Value::from("Plist")));
    assert_eq!(dict.get("IntValue"), Some(&Value::Integer(696969)));
    assert_eq!(dict.len(), 2);
}

#[test]
fn test_simple_save_full() {
    let dict = load(SIMPLE.as_bytes(), &Settings::default()).unwrap();
    let text = save_to_string(&dict).unwrap();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(text.contains("<plist version=\"1.0\">"));
    assert!(text.contains("<key>Simple</key>"));
    assert!(text.contains("<string>Plist</string>"));
    assert!(text.contains("<key>IntValue</key>"));
    assert!(text.contains("<integer>696969</integer>"));
}

#[test]
fn test_simple_save_short() {
    let dict = load(SIMPLE.as_bytes(), &short_output()).unwrap();
    let text = save_to_string(&dict).unwrap();
    assert!(text.contains("<k>Simple</k>"));
    assert!(text.contains("<s>Plist</s>"));
    assert!(text.contains("<k>IntValue</k>"));
    assert!(text.contains("<i>696969</i>"));
    // The document-level dict keeps its conventional spelling.
    assert!(text.contains("<dict>"));
    assert!(!text.contains("<key>"));
}

#[test]
fn test_vocabularies_are_equivalent_under_both() {
    let full = load(SIMPLE.as_bytes(), &Settings::default()).unwrap();
    let short = load(SIMPLE_SHORT.as_bytes(), &Settings::default()).unwrap();
    assert_eq!(full, short);
}

#[test]
fn test_short_tags_rejected_by_full_vocabulary() {
    let settings = Settings::new(TagVocabulary::Full, TagVocabulary::Full).unwrap();
    let err = load(SIMPLE_SHORT.as_bytes(), &settings).unwrap_err();
    assert!(matches!(err, Error::CorruptedFormat(_)), "{err:?}");
}

#[test]
fn test_full_tags_rejected_by_short_vocabulary() {
    let settings = Settings::new(TagVocabulary::Short, TagVocabulary::Short).unwrap();
    let err = load(wrap("<k>A</k><integer>1</integer>").as_bytes(), &settings).unwrap_err();
    assert!(matches!(err, Error::CorruptedFormat(_)));
}

// ── Complicated document ───────────────────────────────────────────────────

#[test]
fn test_complicated_load() {
    let dict = load(COMPLICATED.as_bytes(), &Settings::default()).unwrap();
    let person = dict.get("Person").and_then(Value::as_dict).unwrap();
    assert_eq!(person.get("FirstName"), Some(&Value::from("John")));
    assert_eq!(
        dict.get_path(&["Person", "Address", "City"]),
        Some(&Value::from("Some Town"))
    );
    let numbers = person.get("PhoneNumbers").and_then(Value::as_array).unwrap();
    assert_eq!(numbers.len(), 2);
    assert_eq!(
        numbers[0].as_dict().and_then(|d| d.get("Number")),
        Some(&Value::from("555-555-5555"))
    );
}

#[test]
fn test_complicated_save_short() {
    let dict = load(COMPLICATED.as_bytes(), &short_output()).unwrap();
    let text = save_to_string(&dict).unwrap();
    for needle in [
        "<k>FirstName</k>",
        "<s>John</s>",
        "<k>Number</k>",
        "<s>555-555-5555</s>",
        "<k>City</k>",
        "<s>Some Town</s>",
        "<k>SomeInt</k>",
        "<i>13371337</i>",
        "<k>LastName</k>",
        "<s>Public</s>",
        "<a>",
        "<d>",
    ] {
        assert!(text.contains(needle), "missing {needle} in {text}");
    }
}

#[test]
fn test_reload_preserves_tree() {
    for settings in [Settings::default(), short_output()] {
        let dict = load(COMPLICATED.as_bytes(), &settings).unwrap();
        let text = save_to_string(&dict).unwrap();
        assert_eq!(load(text.as_bytes(), &Settings::default()).unwrap(), dict);
    }
}

// ── Encoding ───────────────────────────────────────────────────────────────

fn compact() -> Settings {
    Settings::builder()
        .formatting(FormattingOptions::compact())
        .build()
        .unwrap()
}

#[test]
fn test_absent_entries_are_not_written() {
    let mut dict = Dictionary::with_settings(compact().into());
    dict.insert("Kept", 1);
    dict.insert_entry("Gone", None);
    let text = save_to_string(&dict).unwrap();
    assert_eq!(
        text,
        r#"<plist version="1.0"><dict><key>Kept</key><integer>1</integer></dict></plist>"#
    );
}

#[test]
fn test_scalars_and_empty_containers() {
    let mut dict = Dictionary::with_settings(compact().into());
    dict.insert("Yes", true);
    dict.insert("No", false);
    dict.insert("Ratio", 1.5_f32);
    dict.insert("Empty", "");
    dict.insert("List", Value::Array(vec![]));
    dict.insert("Nested", Dictionary::new());
    let text = save_to_string(&dict).unwrap();
    assert_eq!(
        text,
        concat!(
            r#"<plist version="1.0"><dict>"#,
            "<key>Yes</key><true/>",
            "<key>No</key><false/>",
            "<key>Ratio</key><real>1.5</real>",
            "<key>Empty</key><string/>",
            "<key>List</key><array/>",
            "<key>Nested</key><dict/>",
            "</dict></plist>"
        )
    );
    let reloaded = load(text.as_bytes(), &Settings::default()).unwrap();
    assert_eq!(reloaded, dict);
}

#[test]
fn test_root_attributes() {
    let settings = Settings::builder()
        .formatting(FormattingOptions::compact())
        .root_attributes([("version", "1.0"), ("note", "a<b")])
        .build()
        .unwrap();
    let dict = Dictionary::with_settings(settings.into());
    let text = save_to_string(&dict).unwrap();
    assert_eq!(text, r#"<plist version="1.0" note="a&lt;b"><dict/></plist>"#);
}

#[test]
fn test_entities_round_trip() {
    let dict = load(
        wrap("<key>a&amp;b</key><string>&lt;tag&gt; &quot;q&quot;</string>").as_bytes(),
        &Settings::default(),
    )
    .unwrap();
    assert_eq!(dict.get("a&b"), Some(&Value::from("<tag> \"q\"")));
    let text = save_to_string(&dict).unwrap();
    assert!(text.contains("<key>a&amp;b</key>"));
    assert_eq!(load(text.as_bytes(), &Settings::default()).unwrap(), dict);
}

#[test]
fn test_duplicate_key_overwrites_in_place() {
    let dict = load(
        wrap("<key>A</key><integer>1</integer><key>B</key><integer>2</integer><key>A</key><integer>3</integer>")
            .as_bytes(),
        &Settings::default(),
    )
    .unwrap();
    assert_eq!(dict.keys().collect::<Vec<_>>(), ["A", "B"]);
    assert_eq!(dict.get("A"), Some(&Value::Integer(3)));
}

// ── Invalid data ───────────────────────────────────────────────────────────

#[test]
fn test_missing_root_dict_always_fails() {
    let doc = "<plist version=\"1.0\"><array/></plist>";
    for settings in [Settings::default(), lenient()] {
        let err = load(doc.as_bytes(), &settings).unwrap_err();
        assert!(matches!(err, Error::CorruptedFormat(_)));
    }
}

#[test]
fn test_short_root_dict_is_accepted() {
    let dict = load(
        "<plist><d><k>A</k><i>1</i></d></plist>".as_bytes(),
        &Settings::default(),
    )
    .unwrap();
    assert_eq!(dict.get("A"), Some(&Value::Integer(1)));
}

#[test]
fn test_unknown_tag() {
    let doc = wrap("<key>When</key><date>2024-01-01</date><key>A</key><integer>1</integer>");
    let err = load(doc.as_bytes(), &Settings::default()).unwrap_err();
    assert!(matches!(err, Error::CorruptedFormat(_)));

    let dict = load(doc.as_bytes(), &lenient()).unwrap();
    assert_eq!(dict.get_entry("When"), Some(None));
    assert_eq!(dict.get("A"), Some(&Value::Integer(1)));
}

#[test]
fn test_unknown_array_element_is_dropped_when_lenient() {
    let doc = wrap("<key>L</key><array><integer>1</integer><data>AA==</data><integer>2</integer></array>");
    assert!(load(doc.as_bytes(), &Settings::default()).is_err());
    let dict = load(doc.as_bytes(), &lenient()).unwrap();
    assert_eq!(
        dict.get("L"),
        Some(&Value::Array(vec![Value::Integer(1), Value::Integer(2)]))
    );
}

#[test]
fn test_invalid_numbers() {
    let doc = wrap("<key>I</key><integer>12x</integer><key>R</key><real>1,5</real>");
    let err = load(doc.as_bytes(), &Settings::default()).unwrap_err();
    assert!(matches!(err, Error::CorruptedFormat(_)));

    let dict = load(doc.as_bytes(), &lenient()).unwrap();
    assert_eq!(dict.get_entry("I"), Some(None));
    assert_eq!(dict.get_entry("R"), Some(None));
}

#[test]
fn test_integer_out_of_range() {
    let doc = wrap("<key>I</key><integer>4294967296</integer>");
    assert!(load(doc.as_bytes(), &Settings::default()).is_err());
}

#[test]
fn test_dangling_key() {
    let doc = wrap("<key>A</key><integer>1</integer><key>B</key>");
    let err = load(doc.as_bytes(), &Settings::default()).unwrap_err();
    assert!(matches!(err, Error::CorruptedFormat(_)));

    let dict = load(doc.as_bytes(), &lenient()).unwrap();
    assert_eq!(dict.get("A"), Some(&Value::Integer(1)));
    assert_eq!(dict.get_entry("B"), Some(None));
}

#[test]
fn test_value_in_key_position() {
    let doc = wrap("<string>A</string><integer>1</integer>");
    assert!(load(doc.as_bytes(), &Settings::default()).is_err());
    let dict = load(doc.as_bytes(), &lenient()).unwrap();
    assert_eq!(dict.get("A"), Some(&Value::Integer(1)));
}

#[test]
fn test_malformed_markup() {
    let err = load(b"<plist><dict><key>A</key>", &Settings::default()).unwrap_err();
    assert!(matches!(err, Error::CorruptedFormat(_) | Error::Xml(_)), "{err:?}");
    let err = load(b"", &lenient()).unwrap_err();
    assert!(matches!(err, Error::CorruptedFormat(_)));
}

// ── Settings ───────────────────────────────────────────────────────────────

#[test]
fn test_settings_reject_both_for_output() {
    let err = Settings::new(TagVocabulary::Both, TagVocabulary::Both).unwrap_err();
    assert!(matches!(err, Error::InvalidSettings(_)));
    assert!(err.is_usage_error());
}

#[test]
fn test_settings_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.input_vocabulary(), TagVocabulary::Both);
    assert_eq!(settings.output_vocabulary(), TagVocabulary::Full);
    assert_eq!(settings.invalid_data_policy(), InvalidDataPolicy::ThrowError);
    assert_eq!(
        settings.root_attributes(),
        [("version".to_owned(), "1.0".to_owned())]
    );
}

#[test]
fn test_loaded_dictionary_keeps_settings() {
    let settings = short_output();
    let dict = load(COMPLICATED.as_bytes(), &settings).unwrap();
    assert_eq!(dict.settings(), &settings);
    let person = dict.get("Person").and_then(Value::as_dict).unwrap();
    assert_eq!(person.settings(), &settings);
}
