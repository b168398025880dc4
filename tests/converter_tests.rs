use std::sync::Arc;

use plist_serde::converter::ConverterProperty;
use plist_serde::{
    ConverterDescriptor, ConverterRegistry, ConverterUsage, Dictionary, Error, IntToBoolConverter,
    InvalidDataPolicy, Mapper, PlistConverter, Settings, StringToBoolConverter, Value,
    plist_object,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn settings(policy: InvalidDataPolicy) -> Settings {
    Settings::builder()
        .invalid_data_policy(policy)
        .build()
        .unwrap()
}

/// A mapper with its own converter cache so tests can inspect it.
fn mapper(policy: InvalidDataPolicy) -> (Mapper, Arc<ConverterRegistry>) {
    let registry = Arc::new(ConverterRegistry::new());
    let mapper = Mapper::new(settings(policy)).with_registry(Arc::clone(&registry));
    (mapper, registry)
}

fn strict() -> (Mapper, Arc<ConverterRegistry>) {
    mapper(InvalidDataPolicy::ThrowError)
}

fn lenient() -> (Mapper, Arc<ConverterRegistry>) {
    mapper(InvalidDataPolicy::ReturnDefaultOrOriginal)
}

fn one(key: &str, value: impl Into<Value>) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.insert(key, value);
    dict
}

// ── Built-in converters ────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
struct Flags {
    enabled: bool,
}

plist_object!(Flags {
    enabled: ["Enabled"] => ConverterDescriptor::of::<IntToBoolConverter>(),
});

#[test]
fn test_int_to_bool() {
    init();
    let (mapper, _) = strict();
    for (wire, expected) in [(5, true), (1, true), (0, false), (-3, false)] {
        let flags: Flags = mapper.deserialize(&one("Enabled", wire)).unwrap();
        assert_eq!(flags.enabled, expected, "wire value {wire}");
    }

    let out = mapper.serialize(&Flags { enabled: true }).unwrap();
    assert_eq!(out.get("Enabled"), Some(&Value::Integer(1)));
    let out = mapper.serialize(&Flags { enabled: false }).unwrap();
    assert_eq!(out.get("Enabled"), Some(&Value::Integer(0)));
}

#[derive(Debug, Default, PartialEq)]
struct TextFlags {
    enabled: bool,
}

plist_object!(TextFlags {
    enabled: ["Enabled"] => ConverterDescriptor::of::<StringToBoolConverter>(),
});

#[test]
fn test_string_to_bool() {
    let (mapper, _) = strict();
    let flags: TextFlags = mapper.deserialize(&one("Enabled", "1")).unwrap();
    assert!(flags.enabled);
    let flags: TextFlags = mapper.deserialize(&one("Enabled", "abc")).unwrap();
    assert!(!flags.enabled);

    let out = mapper.serialize(&TextFlags { enabled: true }).unwrap();
    assert_eq!(out.get("Enabled"), Some(&Value::from("1")));
}

// ── Overrides ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
struct Reversed {
    hidden: bool,
    hidden_default: bool,
}

plist_object!(Reversed {
    hidden: ["Visible"] => ConverterDescriptor::of::<IntToBoolConverter>()
        .with_override("reverse_value", Some(Value::Bool(true))),
    hidden_default: ["VisibleDefault"] => ConverterDescriptor::of::<IntToBoolConverter>()
        .with_override("reverse_value", None),
});

#[test]
fn test_override_configures_fresh_instance() {
    let (mapper, registry) = strict();
    let mut tree = one("Visible", 1);
    tree.insert("VisibleDefault", 1);
    let object: Reversed = mapper.deserialize(&tree).unwrap();
    assert!(!object.hidden);
    // An override of `None` falls back to the declared default.
    assert!(object.hidden_default);

    let out = mapper
        .serialize(&Reversed {
            hidden: true,
            hidden_default: true,
        })
        .unwrap();
    assert_eq!(out.get("Visible"), Some(&Value::Integer(0)));
    assert_eq!(out.get("VisibleDefault"), Some(&Value::Integer(1)));

    // Overridden instances are never cached.
    assert!(registry.is_empty());
}

#[test]
fn test_shared_instance_is_cached() {
    let (mapper, registry) = strict();
    let _: Flags = mapper.deserialize(&one("Enabled", 1)).unwrap();
    let _: Flags = mapper.deserialize(&one("Enabled", 0)).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(registry.contains::<IntToBoolConverter>());
    assert!(!registry.contains::<StringToBoolConverter>());
}

#[derive(Debug, Default)]
struct UnknownProperty {
    value: bool,
}

plist_object!(UnknownProperty {
    value => ConverterDescriptor::of::<IntToBoolConverter>()
        .with_override("no_such_property", Some(Value::Bool(true))),
});

#[derive(Debug, Default)]
struct MistypedProperty {
    value: bool,
}

plist_object!(MistypedProperty {
    value => ConverterDescriptor::of::<IntToBoolConverter>()
        .with_override("reverse_value", Some(Value::Integer(1))),
});

#[test]
fn test_contract_violations_are_always_fatal() {
    for (mapper, _) in [strict(), lenient()] {
        let err = mapper
            .deserialize::<UnknownProperty>(&one("value", 1))
            .unwrap_err();
        assert!(matches!(err, Error::ConverterContractViolation { .. }), "{err:?}");
        assert!(err.is_usage_error());

        let err = mapper
            .deserialize::<MistypedProperty>(&one("value", 1))
            .unwrap_err();
        assert!(matches!(err, Error::ConverterContractViolation { .. }), "{err:?}");
    }
}

// ── Type mismatch ──────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
struct WithFallback {
    flag: bool,
}

plist_object!(WithFallback {
    flag => ConverterDescriptor::of::<IntToBoolConverter>().with_default(true),
});

#[test]
fn test_type_mismatch() {
    let tree = one("flag", "yes");

    let (mapper, registry) = strict();
    let err = mapper.deserialize::<Flags>(&one("Enabled", "yes")).unwrap_err();
    match err {
        Error::ConverterTypeMismatch {
            expected, found, ..
        } => {
            assert_eq!(expected, plist_serde::ValueKind::Integer);
            assert_eq!(found, plist_serde::ValueKind::String);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(mapper.deserialize::<WithFallback>(&tree).is_err());
    // The converter is never instantiated for a mismatched value.
    assert!(registry.is_empty());

    let (mapper, _) = lenient();
    let object: WithFallback = mapper.deserialize(&tree).unwrap();
    assert!(object.flag);
}

#[test]
fn test_lenient_mismatch_without_default_keeps_member_default() {
    let (mapper, _) = lenient();
    // Even a value the member could hold is not handed over unconverted.
    let flags: Flags = mapper.deserialize(&one("Enabled", true)).unwrap();
    assert!(!flags.enabled);
    let flags: Flags = mapper.deserialize(&one("Enabled", "yes")).unwrap();
    assert!(!flags.enabled);
}

#[derive(Debug, Default, PartialEq)]
struct RawFlag {
    flag: Option<Value>,
}

plist_object!(RawFlag {
    flag => ConverterDescriptor::of::<IntToBoolConverter>(),
});

#[test]
fn test_encode_mismatch_writes_nothing() {
    let object = RawFlag {
        flag: Some(Value::from("yes")),
    };
    let (mapper, _) = strict();
    let err = mapper.serialize(&object).unwrap_err();
    assert!(matches!(err, Error::ConverterTypeMismatch { .. }), "{err:?}");

    let (mapper, _) = lenient();
    let out = mapper.serialize(&object).unwrap();
    assert_eq!(out.get("flag"), None);

    let out = mapper
        .serialize(&RawFlag {
            flag: Some(Value::Bool(true)),
        })
        .unwrap();
    assert_eq!(out.get("flag"), Some(&Value::Integer(1)));
}

// ── Missing values ─────────────────────────────────────────────────────────

#[test]
fn test_missing_value_with_converter() {
    let (mapper, _) = strict();
    let err = mapper.deserialize::<WithFallback>(&one("other", 1)).unwrap_err();
    assert!(matches!(err, Error::CorruptedFormat(_)));

    let (mapper, _) = lenient();
    let object: WithFallback = mapper.deserialize(&one("other", 1)).unwrap();
    assert!(object.flag);
}

#[derive(Debug, Default, PartialEq)]
struct OptionalFlag {
    flag: Option<bool>,
}

plist_object!(OptionalFlag {
    flag => ConverterDescriptor::of::<IntToBoolConverter>(),
});

#[test]
fn test_absent_optional_member_skips_converter() {
    let (mapper, _) = strict();
    let object: OptionalFlag = mapper.deserialize(&Dictionary::new()).unwrap();
    assert_eq!(object.flag, None);
    let object: OptionalFlag = mapper.deserialize(&one("flag", 2)).unwrap();
    assert_eq!(object.flag, Some(true));

    let out = mapper.serialize(&OptionalFlag { flag: None }).unwrap();
    assert!(out.is_empty());
}

// ── Usage gating ───────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
struct DecodeOnly {
    flag: bool,
}

plist_object!(DecodeOnly {
    flag => ConverterDescriptor::of::<IntToBoolConverter>().with_usage(ConverterUsage::DECODE),
});

#[derive(Debug, Default, PartialEq)]
struct EncodeOnly {
    flag: bool,
}

plist_object!(EncodeOnly {
    flag => ConverterDescriptor::of::<IntToBoolConverter>()
        .with_usage(ConverterUsage::ENCODE)
        .with_default(false),
});

#[derive(Debug, PartialEq)]
struct EncodeOnlyNoDefault {
    flag: bool,
}

impl Default for EncodeOnlyNoDefault {
    fn default() -> Self {
        EncodeOnlyNoDefault { flag: true }
    }
}

plist_object!(EncodeOnlyNoDefault {
    flag => ConverterDescriptor::of::<IntToBoolConverter>().with_usage(ConverterUsage::ENCODE),
});

#[test]
fn test_usage_gating() {
    let (mapper, registry) = strict();

    let object: DecodeOnly = mapper.deserialize(&one("flag", 3)).unwrap();
    assert!(object.flag);

    // Decoding skips the converter and yields the configured default.
    let object: EncodeOnly = mapper.deserialize(&one("flag", 3)).unwrap();
    assert!(!object.flag);
    let out = mapper.serialize(&EncodeOnly { flag: true }).unwrap();
    assert_eq!(out.get("flag"), Some(&Value::Integer(1)));

    assert_eq!(registry.len(), 1);
}

#[test]
fn test_gated_encode_without_default_omits_entry() {
    let mapper = Mapper::new(Settings::default());
    let out = mapper.serialize(&DecodeOnly { flag: true }).unwrap();
    assert_eq!(out.get("flag"), None);
    assert!(out.is_empty());
    let text = plist_serde::save_to_string(&out).unwrap();
    assert!(!text.contains("flag"));
}

#[test]
fn test_gated_decode_without_default_keeps_member_default() {
    let mapper = Mapper::new(Settings::default());
    for wire in [Value::Integer(3), Value::Integer(0), Value::from("text")] {
        let object: EncodeOnlyNoDefault = mapper.deserialize(&one("flag", wire)).unwrap();
        assert_eq!(object, EncodeOnlyNoDefault { flag: true });
    }

    let out = mapper.serialize(&EncodeOnlyNoDefault { flag: false }).unwrap();
    assert_eq!(out.get("flag"), Some(&Value::Integer(0)));
}

// ── Custom converter ───────────────────────────────────────────────────────

static SCALE_PROPERTIES: [ConverterProperty; 1] = [ConverterProperty {
    name: "factor",
    default: Value::Integer(10),
}];

/// Stores values divided by `factor` on the wire.
#[derive(Debug)]
struct Scale {
    factor: i32,
}

impl Default for Scale {
    fn default() -> Self {
        Scale { factor: 10 }
    }
}

impl PlistConverter for Scale {
    type Input = i32;
    type Output = i32;

    fn read_value(&self, value: i32) -> i32 {
        value * self.factor
    }

    fn write_value(&self, value: i32) -> i32 {
        value / self.factor
    }

    fn properties() -> &'static [ConverterProperty] {
        &SCALE_PROPERTIES
    }

    fn set_property(&mut self, name: &str, value: &Value) -> plist_serde::Result<()> {
        match (name, value.as_integer()) {
            ("factor", Some(factor)) if factor != 0 => {
                self.factor = factor;
                Ok(())
            }
            _ => Err(Error::ConverterContractViolation {
                converter: "Scale",
                reason: format!("bad {name}"),
            }),
        }
    }
}

#[derive(Debug, Default, PartialEq)]
struct Measurements {
    tens: i32,
    hundreds: i32,
}

plist_object!(Measurements {
    tens => ConverterDescriptor::of::<Scale>(),
    hundreds => ConverterDescriptor::of::<Scale>().with_override("factor", Some(Value::Integer(100))),
});

#[derive(Debug, Default)]
struct ZeroScale {
    value: i32,
}

plist_object!(ZeroScale {
    value => ConverterDescriptor::of::<Scale>().with_override("factor", Some(Value::Integer(0))),
});

#[test]
fn test_custom_converter_properties() {
    let (mapper, registry) = strict();
    let mut tree = one("tens", 4);
    tree.insert("hundreds", 4);

    let object: Measurements = mapper.deserialize(&tree).unwrap();
    assert_eq!(object, Measurements { tens: 40, hundreds: 400 });
    assert_eq!(mapper.serialize(&object).unwrap(), tree);
    assert_eq!(registry.len(), 1);
    assert!(registry.contains::<Scale>());

    // The converter itself may refuse an override value.
    let err = mapper.deserialize::<ZeroScale>(&one("value", 1)).unwrap_err();
    assert!(matches!(err, Error::ConverterContractViolation { .. }));
}

#[test]
fn test_descriptor_accessors() {
    let descriptor = ConverterDescriptor::of::<IntToBoolConverter>()
        .with_usage(ConverterUsage::ENCODE)
        .with_default(true)
        .with_override("reverse_value", None);
    assert_eq!(descriptor.usage(), ConverterUsage::ENCODE);
    assert_eq!(descriptor.default_value(), Some(&Value::Bool(true)));
    assert_eq!(descriptor.overrides().len(), 1);
    assert_eq!(
        descriptor.expected_kind(plist_serde::Direction::Decode),
        plist_serde::ValueKind::Integer
    );
    assert_eq!(
        descriptor.expected_kind(plist_serde::Direction::Encode),
        plist_serde::ValueKind::Bool
    );
    assert!(ConverterUsage::default().applies_to(plist_serde::Direction::Decode));
    assert!(!ConverterUsage::ENCODE.applies_to(plist_serde::Direction::Decode));
}
