// Parser behavior through the public API

use rosmsg_codegen::msg::{LineKind, classify_lines};
use rosmsg_codegen::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_parse_robot_state() {
    let content = r"# Snapshot of a robot's state.
#
# Published periodically.

uint8 MODE_IDLE=0 # waiting
uint8 MODE_ACTIVE=1

string name # robot name
float64 battery
int32[] joint_ids
Point position
";

    let msg = parse_message_string("test_msgs", "RobotState", content).unwrap();
    assert_eq!(msg.package(), "test_msgs");
    assert_eq!(msg.name(), "RobotState");
    assert_eq!(
        msg.comment(),
        "Snapshot of a robot's state.\n\nPublished periodically."
    );

    let members: Vec<&str> = msg.members().map(|f| f.name.as_str()).collect();
    assert_eq!(members, ["name", "battery", "joint_ids", "position"]);
    assert_eq!(msg.get_field("name").unwrap().comment.as_deref(), Some("robot name"));
    assert_eq!(msg.get_field("battery").unwrap().comment, None);

    let mode = msg.get_enum("Mode").unwrap();
    assert!(!mode.explicit);
    assert_eq!(mode.repr, PrimitiveType::UInt8);
    let values: Vec<(&str, i128)> = mode
        .values
        .iter()
        .map(|v| (v.name.as_str(), v.value))
        .collect();
    assert_eq!(values, [("MODE_IDLE", 0), ("MODE_ACTIVE", 1)]);
    assert_eq!(mode.values[0].comment.as_deref(), Some("waiting"));

    assert_eq!(
        msg.references(),
        [&BaseType::Message {
            pkg_name: None,
            type_name: "Point".to_string(),
        }]
    );
}

#[test]
fn test_type_catalog() {
    for name in PRIMITIVE_TYPES {
        let ty = Type::new(name, None).unwrap();
        assert!(ty.is_primitive_type(), "{name}");
        assert!(!ty.is_array());
    }

    let bounded = Type::new("string<=5[<=3]", None).unwrap();
    assert!(bounded.is_bounded_array());
    assert_eq!(
        bounded.base_type,
        BaseType::Primitive {
            primitive: PrimitiveType::String,
            string_upper_bound: Some(5),
        }
    );

    let fixed = Type::new("geometry_msgs/Point[4]", Some("test_msgs")).unwrap();
    assert_eq!(fixed.array, Some(ArrayKind::Fixed(4)));
    assert!(!fixed.is_dynamic_array());
}

#[test]
fn test_invalid_types() {
    for token in ["int32[-1]", "int32[abc]", "int32[3][]", "Pkg/Msg", "string<=x", "int32[<=0]"] {
        let err = Type::new(token, None).unwrap_err();
        assert!(
            matches!(err, ParseError::TypeResolution { .. }),
            "{token}: {err}"
        );
    }
}

#[test]
fn test_classify_lines() {
    let kinds: Vec<LineKind<'_>> = classify_lines("int32 a 5\nuint8 B=1\n@enum Kind\n")
        .map(|line| line.unwrap().kind)
        .collect();
    assert_eq!(kinds.len(), 3);
    assert!(matches!(
        kinds[0],
        LineKind::Field {
            type_token: "int32",
            name: "a",
            default: Some("5")
        }
    ));
    assert!(matches!(
        kinds[1],
        LineKind::Constant {
            type_token: "uint8",
            name: "B",
            value: "1"
        }
    ));
    assert!(matches!(kinds[2], LineKind::EnumHeader { name: "Kind" }));
}

#[test]
fn test_message_builder() {
    let mut builder = MessageBuilder::new("test_msgs", "Built").unwrap();
    builder
        .set_comment("Built by hand")
        .add_field(Field::new(Type::primitive(PrimitiveType::Int32), "count", None).unwrap())
        .add_field(
            Field::constant(Type::primitive(PrimitiveType::UInt8), "LIMIT", "7").unwrap(),
        );
    let msg = builder.finish();

    assert_eq!(msg.comment(), "Built by hand");
    assert_eq!(msg.members().count(), 1);
    assert_eq!(msg.constants().next().unwrap().integer_value(), Some(7));
}

#[test]
fn test_parse_message_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("Sample.msg");
    fs::write(&path, "int32 a\n").unwrap();

    let msg = parse_message_file("test_msgs", &path).unwrap();
    assert_eq!(msg.name(), "Sample");

    let missing = parse_message_file("test_msgs", temp_dir.path().join("Missing.msg")).unwrap_err();
    assert!(matches!(missing, ParseError::IoError(_)));

    let wrong_ext =
        parse_message_file("test_msgs", temp_dir.path().join("Sample.txt")).unwrap_err();
    assert!(matches!(wrong_ext, ParseError::InvalidResourceName { .. }));
}

#[test]
fn test_error_chain_reaches_root_cause() {
    let err = parse_message_string("test_msgs", "Bad", "int32 ok\nint32 x=oops\n").unwrap_err();
    assert_eq!(err.line(), Some(2));
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.to_string(), err.root_cause().to_string());
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_roundtrip() {
    let msg = parse_message_string(
        "test_msgs",
        "Serialized",
        "# doc\nuint8 KIND_A=0\nuint8 KIND_B=1\nfloat64[3] v [1.0, 2.0, 3.0]\nstring<=4 tag\n",
    )
    .unwrap();

    let json = serde_json::to_string(&msg).unwrap();
    let back: MessageDefinition = serde_json::from_str(&json).unwrap();
    assert_eq!(back, msg);
}
