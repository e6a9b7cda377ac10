use indoc::indoc;

use idlc_core::{Const, ConstValue, Field, Function, Program, Service, Struct, Type, Typedef};

use crate::test_utils::{file, generate_ok, geometry, go_block, snippet};
use crate::{Config, Error, Warning, generate_program};

#[test]
fn package_layout() {
    let package = generate_ok(&geometry());

    let names: Vec<&str> = package.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["ttypes.go", "constants.go", "finder.go"]);
    assert_eq!(package.package_name, "geometry");
    assert_eq!(package.dir, std::path::PathBuf::from("geometry"));
    assert!(package.warnings.is_empty());
}

#[test]
fn header_and_imports() {
    let package = generate_ok(&geometry());
    let src = file(&package, "ttypes.go");
    let header = &src[src.find("package").unwrap()..src.find("var GoUnusedProtection__").unwrap()];

    insta::assert_snapshot!(header.trim_end().replace('\t', "    "), @r#"
    package geometry

    import (
        "bytes"
        "fmt"
        "github.com/upfluence/thrift/lib/go/thrift"
        "acme/shared"
    )

    // (needed to ensure safety because of naive import list construction.)
    var _ = thrift.ZERO
    var _ = fmt.Printf
    var _ = bytes.Equal
    var _ = shared.GoUnusedProtection__
    "#);
    assert!(src.starts_with("// Autogenerated by idlc ("));
    assert!(src.contains("//\n// DO NOT EDIT UNLESS YOU ARE SURE THAT YOU KNOW WHAT YOU ARE DOING\n"));

    // Every file carries the same preamble.
    for f in &package.files {
        assert!(f.contents.contains("var _ = shared.GoUnusedProtection__"), "{}", f.name);
    }
}

#[test]
fn import_options() {
    let config = Config::new()
        .package_prefix("github.com/acme/idl/")
        .thrift_import("example.com/thrift");
    let package = generate_program(&geometry(), &config).unwrap();
    let src = file(&package, "ttypes.go");

    assert!(src.contains("\t\"example.com/thrift\"\n"));
    assert!(src.contains("\t\"github.com/acme/idl/acme/shared\"\n"));

    let mut p = geometry();
    p.includes[0].std_path = true;
    let package = generate_program(&p, &Config::new()).unwrap();
    assert!(
        file(&package, "ttypes.go")
            .contains("\t\"github.com/upfluence/thrift/lib/go/thrift/acme/shared\"\n")
    );
}

#[test]
fn package_override_renames_root_only() {
    let package = generate_program(&geometry(), &Config::new().package("geo")).unwrap();
    let src = file(&package, "finder.go");

    assert_eq!(package.package_name, "geo");
    assert_eq!(package.dir, std::path::PathBuf::from("geometry"));
    assert!(src.contains("package geo\n"));
    // Includes keep their own package names.
    assert!(src.contains("shared.BaseService"));
}

#[test]
fn typedefs_and_enums() {
    let src = file(&generate_ok(&geometry()), "ttypes.go").to_owned();

    assert!(src.contains(indoc! {"
        type Distance float64

        func DistancePtr(v Distance) *Distance { return &v }
    "}));
    insta::assert_snapshot!(snippet(&src, "func (p Color) String()"), @r#"
    func (p Color) String() string {
        switch p {
        case Color_RED:
            return "Color_RED"
        case Color_GREEN:
            return "Color_GREEN"
        case Color_BLUE:
            return "Color_BLUE"
        }
        return "<UNSET>"
    }
    "#);
    assert!(src.contains("\tColor_BLUE Color = 5\n"));
    assert!(go_block(&src, "func ColorFromString(")
        .contains("return Color(0), fmt.Errorf(\"not a valid Color string\")"));
    assert!(src.contains("func ColorPtr(v Color) *Color { return &v }"));
}

#[test]
fn struct_typedef_is_an_alias() {
    let mut p = geometry();
    for (name, ty) in [
        ("Location", Type::structure("geometry", "Point")),
        ("Tags", Type::list(Type::string())),
    ] {
        p.typedefs.push(Typedef {
            name: name.to_owned(),
            ty,
            forward: false,
            doc: None,
        });
    }
    let src = file(&generate_ok(&p), "ttypes.go").to_owned();

    assert!(src.contains("type Location = Point\n"));
    assert!(!src.contains("LocationPtr"));
    assert!(src.contains("type Tags []string\n"));
}

#[test]
fn constants() {
    let mut p = geometry();
    p.consts.push(Const {
        name: "MAX".to_owned(),
        ty: Type::i32(),
        value: ConstValue::Integer(10),
        doc: Some("Upper bound.".to_owned()),
    });
    p.consts.push(Const {
        name: "DEFAULT_COLOR".to_owned(),
        ty: Type::enumeration("geometry", "Color"),
        value: ConstValue::Integer(1),
        doc: None,
    });
    p.consts.push(Const {
        name: "PRIMES".to_owned(),
        ty: Type::list(Type::i32()),
        value: ConstValue::List(vec![
            ConstValue::Integer(2),
            ConstValue::Integer(3),
            ConstValue::Integer(5),
        ]),
        doc: None,
    });
    p.consts.push(Const {
        name: "MAGIC".to_owned(),
        ty: Type::binary(),
        value: ConstValue::string("magic"),
        doc: None,
    });
    p.consts.push(Const {
        name: "ORIGIN".to_owned(),
        ty: Type::structure("geometry", "Point"),
        value: ConstValue::Map(vec![
            (ConstValue::string("x"), ConstValue::Integer(0)),
            (ConstValue::string("y"), ConstValue::Integer(0)),
        ]),
        doc: None,
    });
    let src = file(&generate_ok(&p), "constants.go").to_owned();

    assert!(src.contains("const Namespace = \"geometry\"\n"));
    assert!(src.contains("// Upper bound.\nconst MAX = 10\n"));
    assert!(src.contains("const DEFAULT_COLOR = 1\n"));
    assert!(src.contains("var PRIMES []int32\n"));
    assert!(src.contains("var MAGIC []byte\n"));
    assert!(src.contains("var ORIGIN *Point\n"));

    let init = go_block(&src, "func init()");
    let primes = init.find("\tPRIMES = []int32{2, 3, 5}\n").unwrap();
    let magic = init.find("\tMAGIC = []byte(\"magic\")\n").unwrap();
    let origin = init.find("\tORIGIN = &Point{X: 0, Y: 0}\n").unwrap();
    let first_registration = init.find("thrift.Register").unwrap();
    assert!(primes < magic && magic < origin && origin < first_registration);
}

#[test]
fn init_registers_in_discovery_order() {
    let src = file(&generate_ok(&geometry()), "constants.go").to_owned();

    insta::assert_snapshot!(snippet(&src, "func init()"), @r"
    func init() {
        thrift.RegisterStruct((*Point)(nil))
        thrift.RegisterStruct((*Profile)(nil))
        thrift.RegisterStruct((*Circle)(nil))
        thrift.RegisterStruct((*Square)(nil))
        thrift.RegisterStruct((*Shape)(nil))
        thrift.RegisterStruct((*Gappy)(nil))
        thrift.RegisterStruct((*Canvas)(nil))
        thrift.RegisterStruct((*NotFound)(nil))
        thrift.RegisterService(finderServiceDefinition)
        thrift.RegisterStruct((*FinderFindArgs)(nil))
        thrift.RegisterStruct((*FinderFindResult)(nil))
        thrift.RegisterStruct((*FinderPingArgs)(nil))
        thrift.RegisterStruct((*FinderCountArgs)(nil))
        thrift.RegisterStruct((*FinderCountResult)(nil))
    }
    ");
}

#[test]
fn oneway_returning_value_warns() {
    let mut p = Program::new("events");
    p.services.push(
        Service::new("Sink").function(Function::new("push", Type::i32()).oneway()),
    );
    let package = generate_ok(&p);

    assert_eq!(
        package.warnings,
        [Warning::OnewayReturnsValue {
            service: "Sink".to_owned(),
            function: "push".to_owned(),
        }]
    );
    // Still generated as a oneway call.
    assert!(file(&package, "sink.go").contains("return p.client.CallUnary(ctx, \"push\", &args)"));

    let json = serde_json::to_value(&package).unwrap();
    insta::assert_snapshot!(json["warnings"][0], @r#""oneway method Sink.push should return void""#);
}

#[test]
fn oneway_with_exceptions_fails() {
    let mut p = geometry();
    p.services.push(
        Service::new("Broken").function(
            Function::new("fire", Type::Void)
                .oneway()
                .throws(Field::new(1, "nf", Type::structure("geometry", "NotFound"))),
        ),
    );
    let err = generate_program(&p, &Config::new()).unwrap_err();

    assert!(!err.is_internal());
    insta::assert_snapshot!(err.to_string(), @"oneway method Broken.fire can't throw exceptions");
}

#[test]
fn duplicate_field_ids_fail() {
    let mut p = Program::new("dup");
    p.structs.push(
        Struct::new("Twice")
            .field(Field::new(1, "a", Type::i32()))
            .field(Field::new(1, "b", Type::i32())),
    );
    let err = generate_program(&p, &Config::new()).unwrap_err();

    assert!(matches!(err, Error::DuplicateFieldId { id: 1, .. }));
    insta::assert_snapshot!(err.to_string(), @"duplicate field id 1 in Twice");
}

#[test]
fn undeclared_field_type_fails() {
    let mut p = Program::new("orphan");
    p.structs.push(
        Struct::new("Holder").field(Field::new(1, "inner", Type::structure("orphan", "Missing"))),
    );
    let err = generate_program(&p, &Config::new()).unwrap_err();

    assert!(matches!(err, Error::Resolve(_)));
    insta::assert_snapshot!(err.to_string(), @"unknown struct `orphan.Missing`");
}

#[test]
fn empty_program() {
    let package = generate_ok(&Program::new("Empty"));

    let names: Vec<&str> = package.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["ttypes.go", "constants.go"]);
    assert_eq!(package.package_name, "empty");
    let constants = file(&package, "constants.go");
    assert!(constants.contains("const Namespace = \"Empty\"\n"));
    assert!(constants.ends_with("func init() {\n}\n"));
}
