//! End-to-end scenarios through [`JsonCodec`].

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use time::macros::datetime;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::binder::{Abstract, AbstractTarget, InstanceBuilder, MemberBinder};
use crate::data::{Data, Node};
use crate::de::Decoder;
use crate::info::Type;
use crate::{Error, JsonCodec, NamingConvention, OpenMap, Result, Settings, Value, derive::Contract};

// -----------------------------------------------------------------------------
// Entities

#[derive(Contract, Debug, Clone, Copy, PartialEq, Default)]
enum Gender {
    #[default]
    Male,
    Female,
}

#[derive(Contract, Debug, Clone, PartialEq)]
#[contract(constructor = new(project_id, name))]
struct Project {
    #[contract(readonly)]
    project_id: u32,
    #[contract(readonly)]
    name: String,
}

impl Project {
    fn new(project_id: u32, name: String) -> Self {
        Self { project_id, name }
    }
}

#[derive(Contract, Debug, Clone, PartialEq)]
#[contract(default)]
struct Employee {
    #[contract(required)]
    employee_id: u32,
    name: String,
    #[contract(rename = "Sex")]
    gender: Gender,
    hiredate: PrimitiveDateTime,
    left_at: Option<OffsetDateTime>,
    projects: Vec<Project>,
    #[contract(ignore, required)]
    cached_label: String,
}

impl Default for Employee {
    fn default() -> Self {
        Self {
            employee_id: 0,
            name: String::new(),
            gender: Gender::Male,
            hiredate: crate::temporal::MIN_NAIVE,
            left_at: None,
            projects: Vec::new(),
            cached_label: String::new(),
        }
    }
}

#[derive(Contract, Debug, Clone, PartialEq, Default)]
#[contract(default)]
struct UserProfile {
    user_id: u32,
    name: String,
}

#[derive(Default)]
struct PrincipalBinder;

impl MemberBinder for PrincipalBinder {
    type Container = Department;

    fn member_type(&self, _member: &str, department: &Department) -> Option<Type> {
        match department.principal_kind {
            0 => Some(Type::of::<UserProfile>()),
            1 => Some(Type::of::<Employee>()),
            _ => None,
        }
    }
}

#[derive(Contract, Default, Debug)]
#[contract(default)]
struct Department {
    department_id: u32,
    #[contract(binder = PrincipalBinder)]
    principal: Value,
    principal_kind: i32,
}

fn employee() -> Employee {
    Employee {
        employee_id: 101,
        name: "Ada".into(),
        gender: Gender::Female,
        hiredate: datetime!(2021-06-01 9:15:30),
        left_at: None,
        projects: vec![Project::new(1, "Atlas".into()), Project::new(3, "Borealis".into())],
        cached_label: String::new(),
    }
}

// -----------------------------------------------------------------------------
// Round trips

#[test]
fn round_trip_across_conventions() {
    let original = employee();

    for naming in [NamingConvention::None, NamingConvention::Camel, NamingConvention::Pascal] {
        for indented in [false, true] {
            let settings = Settings::default()
                .with_naming_convention(naming)
                .with_indented(indented);
            let codec = JsonCodec::with_settings(settings);

            let text = codec.to_string(&original).unwrap();
            let back: Employee = codec.from_str(&text).unwrap().unwrap();
            assert_eq!(back, original, "{naming:?} indented={indented}: {text}");
        }
    }
}

#[test]
fn written_shape() {
    let codec = JsonCodec::with_settings(
        Settings::default().with_naming_convention(NamingConvention::Camel),
    );

    let text = codec.to_string(&employee()).unwrap();
    assert_eq!(
        text,
        concat!(
            r#"{"employeeId":101,"name":"Ada","Sex":1,"hiredate":"2021-06-01T09:15:30","#,
            r#""leftAt":null,"projects":[{"projectId":1,"name":"Atlas"},"#,
            r#"{"projectId":3,"name":"Borealis"}]}"#,
        ),
    );
}

#[test]
fn enums_read_names_and_discriminants() {
    let codec = JsonCodec::new();

    let by_name: Employee = codec
        .from_str(r#"{"EmployeeId":1,"Sex":"Female"}"#)
        .unwrap()
        .unwrap();
    assert_eq!(by_name.gender, Gender::Female);

    let by_number: Employee = codec.from_str(r#"{"EmployeeId":1,"Sex":0}"#).unwrap().unwrap();
    assert_eq!(by_number.gender, Gender::Male);

    let err = codec.from_str::<Employee>(r#"{"EmployeeId":1,"Sex":"Other"}"#).unwrap_err();
    match err {
        Error::Conversion { path, .. } => assert_eq!(path, "$.Sex"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn unix_timestamps_round_trip() {
    let codec = JsonCodec::with_settings(Settings::default().with_unix_timestamp(true));
    let original = Employee {
        left_at: Some(datetime!(2024-01-31 18:00 UTC)),
        ..employee()
    };

    let text = codec.to_string(&original).unwrap();
    assert!(text.contains(r#""LeftAt":1706724000000"#), "{text}");

    let back: Employee = codec.from_str(&text).unwrap().unwrap();
    assert_eq!(back.left_at, original.left_at);
}

#[test]
fn text_dates_keep_the_instant() {
    let codec = JsonCodec::new();
    let original = Employee {
        left_at: Some(datetime!(2024-03-01 8:30 +2)),
        ..employee()
    };

    let text = codec.to_string(&original).unwrap();
    let back: Employee = codec.from_str(&text).unwrap().unwrap();
    assert_eq!(back.left_at, original.left_at, "{text}");
}

// The minimum value for a null non-nullable date is a deliberate leniency,
// unlike missing required members.
#[test]
fn null_date_reads_as_minimum() {
    let codec = JsonCodec::new();
    let back: Employee = codec
        .from_str(r#"{"EmployeeId":7,"Hiredate":null,"LeftAt":null}"#)
        .unwrap()
        .unwrap();

    assert_eq!(back.hiredate, crate::temporal::MIN_NAIVE);
    assert_eq!(back.left_at, None);
}

// -----------------------------------------------------------------------------
// Required and ignored members

#[test]
fn required_member_missing() {
    let codec = JsonCodec::new();

    let err = codec.from_str::<Employee>(r#"{"Name":"Ada"}"#).unwrap_err();
    assert!(matches!(err, Error::Materialization { .. }), "{err}");

    // `CachedLabel` is required but ignored, so never required.
    let back: Employee = codec
        .from_str(r#"{"EmployeeId":5,"CachedLabel":"x"}"#)
        .unwrap()
        .unwrap();
    assert_eq!(back.cached_label, "");
    assert!(!codec.to_string(&back).unwrap().contains("CachedLabel"));
}

#[test]
fn constructor_parameters_default_when_absent() {
    let codec = JsonCodec::new();
    let project: Project = codec.from_str(r#"{"ProjectId":4}"#).unwrap().unwrap();
    assert_eq!(project, Project::new(4, String::new()));
}

// -----------------------------------------------------------------------------
// Binders

#[test]
fn discriminator_selects_principal_type() {
    let codec = JsonCodec::new();

    let department = Department {
        department_id: 1,
        principal: Value::Typed(Box::new(employee())),
        principal_kind: 1,
    };
    let text = codec.to_string(&department).unwrap();
    assert!(text.starts_with(r#"{"DepartmentId":1,"PrincipalKind":1,"Principal":{"EmployeeId":101"#));

    let back: Department = codec.from_str(&text).unwrap().unwrap();
    assert_eq!(back.principal_kind, 1);
    assert_eq!(back.principal.downcast_ref::<Employee>(), Some(&employee()));

    // Same payload, other discriminator.
    let text = text.replace(r#""PrincipalKind":1"#, r#""PrincipalKind":0"#);
    let back: Department = codec.from_str(&text).unwrap().unwrap();
    assert_eq!(back.principal_kind, 0);
    let profile = back.principal.downcast_ref::<UserProfile>().unwrap();
    assert_eq!(profile.name, "Ada");
}

#[test]
fn unresolved_binder_leaves_default() {
    let codec = JsonCodec::new();
    let back: Department = codec
        .from_str(r#"{"DepartmentId":2,"PrincipalKind":9,"Principal":{"UserId":1}}"#)
        .unwrap()
        .unwrap();

    assert_eq!(back.department_id, 2);
    assert!(back.principal.is_null());
}

#[derive(Default)]
struct UpperBinder;

impl MemberBinder for UpperBinder {
    type Container = Note;

    fn member_type(&self, _: &str, _: &Note) -> Option<Type> {
        None
    }

    fn coerce_value(&self, _: &str, note: &Note, raw: Value) -> Result<Option<Value>> {
        Ok(match raw {
            Value::String(text) if note.shout => Some(Value::from(text.to_uppercase())),
            Value::Object(map) => Some(Value::from(map.len() as u64)),
            _ => None,
        })
    }
}

#[derive(Contract, Default)]
#[contract(default)]
struct Note {
    shout: bool,
    #[contract(binder = UpperBinder)]
    body: Value,
}

#[test]
fn coerce_sees_open_values() {
    let codec = JsonCodec::new();

    let note: Note = codec.from_str(r#"{"Body":"hi","Shout":true}"#).unwrap().unwrap();
    assert_eq!(note.body.as_str(), Some("HI"));

    let note: Note = codec.from_str(r#"{"Body":"hi","Shout":false}"#).unwrap().unwrap();
    assert!(note.body.is_null());

    let note: Note = codec.from_str(r#"{"Body":{"a":1,"b":2}}"#).unwrap().unwrap();
    assert_eq!(note.body.as_u64(), Some(2));
}

// -----------------------------------------------------------------------------
// Open values and discriminators

#[cfg(feature = "json5")]
#[test]
fn open_map_literal() {
    let codec = JsonCodec::new();
    let value: Value = codec
        .from_str("{AssetId:100001, AssetNo:'A001', Projects:[{ProjectId:1},{ProjectId:3}], Creator:{UserId:100,Name:'Popeye'}}")
        .unwrap()
        .unwrap();

    let map = value.as_object().unwrap();
    let keys: Vec<_> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, ["AssetId", "AssetNo", "Projects", "Creator"]);
    assert_eq!(map["AssetId"], Value::from(100001));
    assert_eq!(map["AssetNo"], Value::from("A001"));

    let projects = map["Projects"].as_array().unwrap();
    assert_eq!(projects.len(), 2);
    assert!(projects.iter().all(|p| p.as_object().is_some()));
    assert_eq!(projects[1].get("ProjectId"), Some(&Value::from(3)));
}

#[test]
fn typed_discriminator_round_trip() {
    #[derive(Contract, Default)]
    #[contract(default)]
    struct Envelope {
        payload: Value,
    }

    let codec = JsonCodec::with_settings(Settings::default().with_typed(true));
    codec.register::<UserProfile>();

    let envelope = Envelope {
        payload: Value::Typed(Box::new(UserProfile {
            user_id: 100,
            name: "Popeye".into(),
        })),
    };

    let text = codec.to_string(&envelope).unwrap();
    assert_eq!(text, r#"{"Payload":{"$type":"UserProfile","UserId":100,"Name":"Popeye"}}"#);

    let back: Envelope = codec.from_str(&text).unwrap().unwrap();
    let profile = back.payload.downcast_ref::<UserProfile>().unwrap();
    assert_eq!(profile.user_id, 100);

    // Without `typed`, the discriminator is an ordinary key.
    let plain = JsonCodec::new();
    plain.register::<UserProfile>();
    let back: Envelope = plain.from_str(&text).unwrap().unwrap();
    assert_eq!(
        back.payload.get("$type").and_then(Value::as_str),
        Some("UserProfile"),
    );
}

// -----------------------------------------------------------------------------
// Abstract members

trait Shape: Send + Sync {}

#[derive(Contract, Default, Debug, PartialEq)]
#[contract(default)]
struct Circle {
    radius: f64,
}

impl Shape for Circle {}

#[derive(Contract, Debug)]
#[contract(constructor = new(shape))]
struct Canvas {
    #[contract(readonly)]
    shape: Abstract<dyn Shape>,
}

impl Canvas {
    fn new(shape: Abstract<dyn Shape>) -> Self {
        Self { shape }
    }
}

struct ShapeBuilder;

impl InstanceBuilder for ShapeBuilder {
    fn build(
        &self,
        target: &AbstractTarget,
        node: &Node,
        de: &mut Decoder<'_>,
    ) -> Result<Box<dyn Data>> {
        if target.is::<dyn Shape>() {
            de.decode_as(node, Type::of::<Circle>())
        } else {
            Err(Error::Unsupported(alloc::format!("no builder for {target:?}")))
        }
    }
}

#[test]
fn abstract_members_use_instance_builder() {
    let text = r#"{"Shape":{"Radius":1.5}}"#;

    let codec = JsonCodec::new().with_instance_builder(ShapeBuilder);
    let canvas: Canvas = codec.from_str(text).unwrap().unwrap();
    assert_eq!(canvas.shape.downcast_ref::<Circle>(), Some(&Circle { radius: 1.5 }));
    assert_eq!(codec.to_string(&canvas).unwrap(), text);

    let err = JsonCodec::new().from_str::<Canvas>(text).unwrap_err();
    assert!(matches!(err, Error::Materialization { .. }), "{err}");
}

// -----------------------------------------------------------------------------
// Entry points

#[test]
fn empty_and_null_inputs() {
    let codec = JsonCodec::new();
    assert!(codec.from_str::<Employee>("").unwrap().is_none());
    assert!(codec.from_str::<Employee>(" \n\t").unwrap().is_none());
    assert!(codec.from_str::<Employee>("null").unwrap().is_none());
    assert!(matches!(codec.from_str::<Employee>("{"), Err(Error::Syntax(_))));

    assert_eq!(codec.to_string(&Value::Null).unwrap(), "");
    let mut out = Vec::new();
    codec.to_writer(&mut out, &Option::<u32>::None).unwrap();
    assert!(out.is_empty());
}

#[test]
fn writer_reader_and_runtime_types() {
    let codec = JsonCodec::new();
    let profile = UserProfile {
        user_id: 9,
        name: "Olive".into(),
    };

    let mut out = Vec::new();
    codec.to_writer(&mut out, &profile).unwrap();
    let back: UserProfile = codec.from_reader(out.as_slice()).unwrap().unwrap();
    assert_eq!(back, profile);

    let text = String::from_utf8(out).unwrap();
    let erased = codec
        .from_str_typed(&text, Type::of::<UserProfile>())
        .unwrap()
        .unwrap();
    assert_eq!(erased.downcast_ref::<UserProfile>(), Some(&profile));
}

#[test]
fn default_settings_are_caller_owned() {
    let mut codec = JsonCodec::new();
    let profile = UserProfile::default();

    assert_eq!(codec.to_string(&profile).unwrap(), r#"{"UserId":0,"Name":""}"#);

    codec.settings_mut().naming_convention = NamingConvention::Camel;
    codec.settings_mut().suppress_defaults = true;
    assert_eq!(codec.to_string(&profile).unwrap(), "{}");

    let explicit = Settings::default();
    assert_eq!(
        codec.to_string_with(&profile, &explicit).unwrap(),
        r#"{"UserId":0,"Name":""}"#,
    );
}

#[test]
fn open_maps_hold_contracts() {
    let codec = JsonCodec::new();

    let mut map = OpenMap::new();
    map.insert("owner".into(), Value::Typed(Box::new(UserProfile::default())));
    map.insert("tags".into(), Value::from(vec![Value::from("a")]));

    assert_eq!(
        codec.to_string(&Value::from(map)).unwrap(),
        r#"{"owner":{"UserId":0,"Name":""},"tags":["a"]}"#,
    );
}
