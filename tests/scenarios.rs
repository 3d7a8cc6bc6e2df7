#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;

use swagger_osi::{
    Definitions, Describe, Error, Field, Generator, LeafTable, NamedSchema, Record, Referenced, Schema,
    SchemaOptions, ShapeCatalog, Sum, TypeShape,
};

// ------------------------------- Fixtures --------------------------------- //

enum Tree {
    Leaf,
    Node { value: i128, left: Box<Tree>, right: Box<Tree> },
}

impl Describe for Tree {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        catalog.define::<Self>(|catalog| {
            let node = vec![
                Field::named("value", i128::describe(catalog)),
                Field::named("left", Box::<Tree>::describe(catalog)),
                Field::named("right", Box::<Tree>::describe(catalog)),
            ];
            Sum::named("Tree").nullary("Leaf").variant("Node", node).into()
        })
    }
}

struct Point {
    x: f64,
    y: Option<f64>,
}

impl Describe for Point {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        catalog.define::<Self>(|catalog| {
            Record::named("Point")
                .field("x", f64::describe(catalog))
                .field("y", Option::<f64>::describe(catalog))
                .into()
        })
    }
}

struct Segment {
    start: Point,
    end: Point,
}

impl Describe for Segment {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        catalog.define::<Self>(|catalog| {
            Record::named("Segment")
                .field("start", Point::describe(catalog))
                .field("end", Point::describe(catalog))
                .into()
        })
    }
}

struct Profile {
    name: String,
    email: Option<String>,
    age: u8,
    tags: Vec<String>,
    bio: Option<String>,
}

impl Describe for Profile {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        catalog.define::<Self>(|catalog| {
            Record::named("Profile")
                .field("name", String::describe(catalog))
                .field("email", Option::<String>::describe(catalog))
                .field("age", u8::describe(catalog))
                .field("tags", Vec::<String>::describe(catalog))
                .field("bio", Option::<String>::describe(catalog))
                .into()
        })
    }
}

enum Direction {
    North,
    East,
    South,
    West,
}

impl Describe for Direction {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        catalog.define::<Self>(|_| {
            Sum::named("Direction").nullary("North").nullary("East").nullary("South").nullary("West").into()
        })
    }
}

enum Shape {
    Empty,
    Circle(f64),
    Rect { w: f64, h: f64 },
}

impl Describe for Shape {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        catalog.define::<Self>(|catalog| {
            let circle = vec![Field::positional(f64::describe(catalog))];
            let rect = vec![Field::named("w", f64::describe(catalog)), Field::named("h", f64::describe(catalog))];
            Sum::named("Shape").nullary("Empty").variant("Circle", circle).variant("Rect", rect).into()
        })
    }
}

struct Event {
    at: DateTime<Utc>,
    day: NaiveDate,
}

impl Describe for Event {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        catalog.define::<Self>(|catalog| {
            Record::named("Event")
                .field("at", DateTime::<Utc>::describe(catalog))
                .field("day", NaiveDate::describe(catalog))
                .into()
        })
    }
}

mod geo {
    use super::*;

    pub struct Point;

    impl Describe for Point {
        fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
            catalog.define::<Self>(|catalog| Record::named("Point").field("lat", f64::describe(catalog)).into())
        }
    }
}

struct Map {
    home: Point,
    pin: geo::Point,
}

impl Describe for Map {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        catalog.define::<Self>(|catalog| {
            Record::named("Map")
                .field("home", Point::describe(catalog))
                .field("pin", geo::Point::describe(catalog))
                .into()
        })
    }
}

enum Color {
    Red,
    Blue,
}

impl Describe for Color {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        catalog.define::<Self>(|_| Sum::named("Color").nullary("Red").nullary("Blue").into())
    }
}

enum Light {
    NoLight,
    LightFreq(f64),
    LightColor(Color),
}

impl Describe for Light {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        catalog.define::<Self>(|catalog| {
            Sum::named("Light")
                .nullary("NoLight")
                .variant("LightFreq", vec![Field::positional(f64::describe(catalog))])
                .variant("LightColor", vec![Field::positional(Color::describe(catalog))])
                .into()
        })
    }
}

struct Room {
    light: Light,
    wall: Color,
}

impl Describe for Room {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        catalog.define::<Self>(|catalog| {
            Record::named("Room")
                .field("light", Light::describe(catalog))
                .field("wall", Color::describe(catalog))
                .into()
        })
    }
}

mod gfx {
    use super::*;

    /// Shares its schema name with `geo::Point` and contains one.
    pub struct Point {
        lat: f64,
        other: geo::Point,
    }

    impl Describe for Point {
        fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
            catalog.define::<Self>(|catalog| {
                Record::named("Point")
                    .field("lat", f64::describe(catalog))
                    .field("other", geo::Point::describe(catalog))
                    .into()
            })
        }
    }
}

struct Never;

impl Describe for Never {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        catalog.define::<Self>(|_| Sum::named("Never").into())
    }
}

struct Broken {
    profile: Profile,
    never: Never,
}

impl Describe for Broken {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        catalog.define::<Self>(|catalog| {
            Record::named("Broken")
                .field("profile", Profile::describe(catalog))
                .field("never", Never::describe(catalog))
                .into()
        })
    }
}

// ------------------------------- Helpers ---------------------------------- //

fn json_of<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap()
}

fn derive_ref<T: Describe>() -> (Definitions, Referenced) {
    let mut catalog = ShapeCatalog::new();
    let shape = catalog.describe::<T>();
    Generator::with_defaults(&catalog).to_schema_ref(&shape).unwrap()
}

fn derive_named<T: Describe>() -> (Definitions, NamedSchema) {
    let mut catalog = ShapeCatalog::new();
    let shape = catalog.describe::<T>();
    Generator::with_defaults(&catalog).to_named_schema(&shape).unwrap()
}

// ------------------------------- Tests ------------------------------------ //

#[test]
fn primitive_leaf_has_no_reference() {
    let (defs, reference) = derive_ref::<i32>();
    assert!(defs.is_empty());
    let schema = reference.as_inline().unwrap();
    assert!(schema.references().is_empty());
    assert_eq!(json_of(schema)["type"], json!("integer"));

    let (_, reference) = derive_ref::<bool>();
    assert_eq!(json_of(&reference), json!({ "type": "boolean" }));
}

#[test]
fn list_of_integer() {
    let (defs, reference) = derive_ref::<Vec<i128>>();
    assert!(defs.is_empty());
    assert_eq!(json_of(&reference), json!({ "type": "array", "items": { "type": "integer" } }));
}

#[test]
fn optional_field_is_left_out_of_required() {
    let (_, named) = derive_named::<Point>();
    assert_eq!(named.name.as_deref(), Some("Point"));
    assert_eq!(
        json_of(&named.schema),
        json!({
            "type": "object",
            "properties": {
                "x": { "type": "number", "format": "double" },
                "y": { "type": "number", "format": "double" }
            },
            "required": ["x"]
        })
    );
}

#[test]
fn required_set_matches_non_optional_fields() {
    let (_, named) = derive_named::<Profile>();
    let schema = named.schema;
    assert_eq!(json_of(&schema)["type"], json!("object"));
    assert_eq!(schema.properties.len(), 5);
    assert_eq!(schema.required, vec!["name", "age", "tags"]);
}

#[test]
fn shared_type_is_defined_once() {
    let (defs, reference) = derive_ref::<Segment>();
    assert_eq!(reference, Referenced::reference("Segment"));
    assert_eq!(defs.names().collect::<Vec<_>>(), vec!["Segment", "Point"]);

    let segment = defs.get("Segment").unwrap();
    assert_eq!(segment.properties["start"], Referenced::reference("Point"));
    assert_eq!(segment.properties["end"], segment.properties["start"]);
}

#[test]
fn all_nullary_sum_is_string_enum() {
    let (_, named) = derive_named::<Direction>();
    assert_eq!(
        json_of(&named.schema),
        json!({ "type": "string", "enum": ["North", "East", "South", "West"] })
    );
}

#[test]
fn mixed_sum_is_one_of_tagged_payloads() {
    let (defs, named) = derive_named::<Shape>();
    assert!(defs.is_empty());
    let double = json!({ "type": "number", "format": "double" });
    assert_eq!(
        json_of(&named.schema),
        json!({
            "type": "object",
            "properties": {
                "Empty": { "type": "array", "items": [] },
                "Circle": double,
                "Rect": { "type": "object", "properties": { "w": double, "h": double }, "required": ["w", "h"] }
            },
            "maxProperties": 1,
            "minProperties": 1
        })
    );
}

#[test]
fn recursive_tree_terminates_with_single_definition() {
    let (defs, reference) = derive_ref::<Tree>();
    assert_eq!(json_of(&reference), json!({ "$ref": "#/definitions/Tree" }));
    assert_eq!(defs.len(), 1);

    let tree = json_of(defs.get("Tree").unwrap());
    assert_eq!(tree["properties"]["Leaf"], json!({ "type": "array", "items": [] }));
    let node = &tree["properties"]["Node"];
    assert_eq!(node["properties"]["value"], json!({ "type": "integer" }));
    assert_eq!(node["properties"]["left"], json!({ "$ref": "#/definitions/Tree" }));
    assert_eq!(node["properties"]["right"], json!({ "$ref": "#/definitions/Tree" }));
    assert_eq!(defs.recursive().into_iter().collect::<Vec<_>>(), vec!["Tree"]);
}

#[test]
fn recursive_root_is_registered_through_its_own_reference() {
    let (defs, named) = derive_named::<Tree>();
    assert_eq!(named.name.as_deref(), Some("Tree"));
    assert_eq!(defs.get("Tree"), Some(&named.schema));
}

#[test]
fn time_leaves_are_named_definitions() {
    let (defs, _) = derive_ref::<Event>();
    let event = defs.get("Event").unwrap();
    assert_eq!(event.properties["at"], Referenced::reference("UTCTime"));
    assert_eq!(event.properties["day"], Referenced::reference("Date"));
    assert_eq!(json_of(defs.get("Date").unwrap())["example"], json!("2016-07-22"));
    assert_eq!(defs.owner("UTCTime"), Some("primitive:date_time_utc"));
}

#[test]
fn distinct_types_with_one_name_collide() {
    let mut catalog = ShapeCatalog::new();
    let shape = catalog.describe::<Map>();
    let generator = Generator::with_defaults(&catalog);

    let mut defs = Definitions::new();
    let err = generator.declare_schema_ref(&shape, &mut defs).unwrap_err();
    let Error::NameCollision { name, first, second } = err else { panic!("expected a collision") };
    assert_eq!(name, "Point");
    assert_ne!(first, second);
    assert!(defs.is_empty());
}

#[test]
fn failed_run_leaves_registry_untouched() {
    let mut catalog = ShapeCatalog::new();
    let segment = catalog.describe::<Segment>();
    let broken = catalog.describe::<Broken>();
    let generator = Generator::with_defaults(&catalog);

    let mut defs = Definitions::new();
    generator.declare_schema_ref(&segment, &mut defs).unwrap();
    let before = defs.clone();

    let err = generator.declare_schema_ref(&broken, &mut defs).unwrap_err();
    assert!(matches!(err, Error::EmptySum(ref owner) if owner == "Never"));
    assert_eq!(defs, before);
    assert_eq!(defs.names().collect::<Vec<_>>(), vec!["Segment", "Point"]);
}

#[test]
fn misconfiguration_fails_before_derivation() {
    let catalog = ShapeCatalog::new();
    let options = SchemaOptions { strip_field_prefix: Some(String::new()), ..SchemaOptions::default() };
    let leaves = LeafTable::builtin();
    assert!(matches!(Generator::new(&catalog, &leaves, options), Err(Error::Misconfigured(_))));

    let mut leaves = LeafTable::builtin();
    leaves.set(swagger_osi::Primitive::Uuid, NamedSchema::named("#uuid", Schema::string()));
    assert!(matches!(
        Generator::new(&catalog, &leaves, SchemaOptions::default()),
        Err(Error::InvalidName(_))
    ));
}

#[test]
fn root_order_does_not_change_registry() {
    let mut catalog = ShapeCatalog::new();
    let roots = [catalog.describe::<Segment>(), catalog.describe::<Tree>(), catalog.describe::<Event>()];
    let generator = Generator::with_defaults(&catalog);

    let mut forward = Definitions::new();
    for root in &roots {
        generator.declare_schema_ref(root, &mut forward).unwrap();
    }
    let mut backward = Definitions::new();
    for root in roots.iter().rev() {
        generator.declare_schema_ref(root, &mut backward).unwrap();
    }

    assert_eq!(forward, backward);
    assert_ne!(forward.names().collect::<Vec<_>>(), backward.names().collect::<Vec<_>>());
}

#[test]
fn inlining_terminates_on_recursion() {
    let mut catalog = ShapeCatalog::new();
    let segment = catalog.describe::<Segment>();
    let tree = catalog.describe::<Tree>();
    let generator = Generator::with_defaults(&catalog);

    let flat = generator.to_inlined_schema(&segment).unwrap();
    assert!(flat.references().is_empty());
    assert_eq!(json_of(&flat)["properties"]["start"]["required"], json!(["x"]));

    let (defs, body) = generator.to_schema(&tree).unwrap();
    let kept = defs.inline_non_recursive(body.clone());
    assert_eq!(kept.references().into_iter().collect::<Vec<_>>(), vec!["Tree"]);

    let unrolled = defs.inline_all(body);
    assert_eq!(unrolled.references().into_iter().collect::<Vec<_>>(), vec!["Tree"]);
    let node = &json_of(&unrolled)["properties"]["Node"];
    assert_eq!(node["properties"]["left"]["properties"]["Node"]["properties"]["left"], json!({ "$ref": "#/definitions/Tree" }));
}

#[test]
fn variant_payload_shares_the_field_definition() {
    let (defs, reference) = derive_ref::<Room>();
    assert_eq!(json_of(&reference), json!({ "$ref": "#/definitions/Room" }));
    assert_eq!(defs.names().collect::<Vec<_>>(), vec!["Room", "Light", "Color"]);

    let color = json!({ "$ref": "#/definitions/Color" });
    let room = json_of(defs.get("Room").unwrap());
    assert_eq!(room["properties"]["wall"], color);
    let light = json_of(defs.get("Light").unwrap());
    assert_eq!(
        light,
        json!({
            "type": "object",
            "properties": {
                "NoLight": { "type": "array", "items": [] },
                "LightFreq": { "type": "number", "format": "double" },
                "LightColor": color
            },
            "maxProperties": 1,
            "minProperties": 1
        })
    );
}

#[test]
fn root_name_collides_with_a_nested_namesake() {
    let mut catalog = ShapeCatalog::new();
    let shape = catalog.describe::<gfx::Point>();
    let generator = Generator::with_defaults(&catalog);

    let err = generator.to_named_schema(&shape).unwrap_err();
    assert!(matches!(err, Error::NameCollision { ref name, .. } if name == "Point"));

    let mut defs = Definitions::new();
    assert!(generator.declare_named_schema(&shape, &mut defs).is_err());
    assert!(defs.is_empty());
}

#[test]
fn tuples_are_fixed_arrays_of_references() {
    let (defs, named) = derive_named::<(bool, Point, [String; 2])>();
    assert_eq!(named.name, None);
    let string = json!({ "type": "string" });
    assert_eq!(
        json_of(&named.schema),
        json!({
            "type": "array",
            "items": [
                { "type": "boolean" },
                { "$ref": "#/definitions/Point" },
                { "type": "array", "items": [string, string], "minItems": 2, "maxItems": 2 }
            ],
            "minItems": 3,
            "maxItems": 3
        })
    );
    assert_eq!(defs.names().collect::<Vec<_>>(), vec!["Point"]);
}
