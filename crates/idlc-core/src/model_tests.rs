use indoc::indoc;

use crate::{BaseType, ConstValue, Enum, Field, Program, Requiredness, Struct, Type, TypeRef};

#[test]
fn program_from_json() {
    let json = indoc! {r#"
        {
          "name": "geometry",
          "namespaces": { "go": "acme.geometry" },
          "structs": [
            {
              "name": "Point",
              "fields": [
                { "id": 1, "name": "x", "type": { "base": "i32" }, "requiredness": "required" },
                { "id": 2, "name": "label", "type": { "base": "string" }, "requiredness": "optional",
                  "default": { "string": "origin" } },
                { "id": 3, "name": "tags", "type": { "list": { "base": "string" } } }
              ]
            }
          ],
          "services": [
            {
              "name": "Plotter",
              "functions": [
                { "name": "plot", "returns": "void", "oneway": true,
                  "args": [ { "id": 1, "name": "p", "type": { "struct": { "program": "geometry", "name": "Point" } } } ] }
              ]
            }
          ]
        }
    "#};

    let program = Program::from_json(json).unwrap();
    assert_eq!(program.name, "geometry");
    assert_eq!(program.namespace("go"), Some("acme.geometry"));

    let point = &program.structs[0];
    assert_eq!(point.fields[0].requiredness, Requiredness::Required);
    assert_eq!(point.fields[0].ty, Type::Base(BaseType::I32));
    assert_eq!(point.fields[1].default, Some(ConstValue::string("origin")));
    assert_eq!(point.fields[2].requiredness, Requiredness::Default);
    assert_eq!(point.fields[2].ty, Type::list(Type::string()));

    let plot = &program.services[0].functions[0];
    assert!(plot.oneway);
    assert!(plot.returns.is_void());
    assert_eq!(
        plot.args[0].ty,
        Type::Struct(TypeRef::new("geometry", "Point"))
    );
}

#[test]
fn const_map_literal_keeps_source_order() {
    let json = r#"{ "map": [ [ { "string": "b" }, { "integer": 2 } ], [ { "string": "a" }, { "integer": 1 } ] ] }"#;
    let value: ConstValue = serde_json::from_str(json).unwrap();

    let ConstValue::Map(entries) = value else {
        panic!("expected map literal");
    };
    let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str().unwrap()).collect();
    assert_eq!(keys, ["b", "a"]);
}

#[test]
fn enum_values_auto_increment() {
    let color = Enum::new("Color")
        .value("RED", None)
        .value("GREEN", None)
        .value("BLUE", Some(5))
        .value("CYAN", None);

    assert_eq!(
        color.resolved_values(),
        [("RED", 0), ("GREEN", 1), ("BLUE", 5), ("CYAN", 6)]
    );
}

#[test]
fn sorted_fields_by_id() {
    let s = Struct::new("Gappy")
        .field(Field::new(5, "e", Type::i32()))
        .field(Field::new(1, "a", Type::i32()))
        .field(Field::new(2, "b", Type::i32()));

    let ids: Vec<i16> = s.sorted_fields().iter().map(|f| f.id).collect();
    assert_eq!(ids, [1, 2, 5]);
    // Declaration order untouched
    assert_eq!(s.fields[0].name, "e");
}

#[test]
fn describe_types() {
    let ty = Type::map(Type::binary(), Type::list(Type::structure("shared", "Item")));
    assert_eq!(ty.describe(), "map<binary,list<shared.Item>>");
}
