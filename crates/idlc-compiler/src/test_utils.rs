//! Test fixtures and helpers.

use idlc_core::{
    ConstValue, Enum, Field, Function, Program, Service, Struct, Type, TypeRef, Typedef,
};

use crate::{Config, GeneratedPackage, generate_program};

/// Included program: one struct, one base service.
pub fn shared() -> Program {
    let mut shared = Program::new("shared").with_namespace("go", "acme.shared");
    shared.structs.push(
        Struct::new("SharedItem")
            .field(Field::new(1, "key", Type::i32()).required())
            .field(Field::new(2, "value", Type::string())),
    );
    shared.services.push(
        Service::new("BaseService").function(
            Function::new("get_item", Type::structure("shared", "SharedItem"))
                .arg(Field::new(1, "key", Type::i32())),
        ),
    );
    shared
}

/// Program covering the usual shapes: required/optional fields, unions,
/// gaps, enums, typedefs, exceptions and a service extending an include.
pub fn geometry() -> Program {
    let mut p = Program::new("geometry").with_namespace("*", "geometry");
    p.includes.push(shared());

    p.typedefs.push(Typedef {
        name: "Distance".to_owned(),
        ty: Type::double(),
        forward: false,
        doc: None,
    });

    p.enums.push(
        Enum::new("Color")
            .value("RED", Some(0))
            .value("GREEN", Some(1))
            .value("BLUE", Some(5)),
    );

    p.structs.push(
        Struct::new("Point")
            .field(Field::new(1, "x", Type::i32()).required())
            .field(Field::new(2, "y", Type::i32()).required()),
    );
    p.structs.push(
        Struct::new("Profile").field(Field::new(1, "nickname", Type::string()).optional()),
    );
    p.structs.push(
        Struct::new("Circle").field(Field::new(1, "radius", Type::typedef("geometry", "Distance"))),
    );
    p.structs
        .push(Struct::new("Square").field(Field::new(1, "side", Type::double())));
    p.structs.push(
        Struct::new("Shape")
            .union()
            .field(Field::new(1, "c", Type::structure("geometry", "Circle")).optional())
            .field(Field::new(2, "s", Type::structure("geometry", "Square")).optional()),
    );
    p.structs.push(
        Struct::new("Gappy")
            .field(Field::new(1, "a", Type::i32()))
            .field(Field::new(2, "b", Type::string()))
            .field(Field::new(5, "e", Type::list(Type::i64()))),
    );
    p.structs.push(
        Struct::new("Canvas")
            .field(
                Field::new(1, "name", Type::string())
                    .with_default(ConstValue::string("untitled")),
            )
            .field(
                Field::new(2, "color", Type::enumeration("geometry", "Color"))
                    .optional()
                    .with_default(ConstValue::Integer(5)),
            )
            .field(
                Field::new(3, "points", Type::list(Type::structure("geometry", "Point")))
                    .optional(),
            )
            .field(
                Field::new(
                    4,
                    "labels",
                    Type::map(Type::binary(), Type::set(Type::string())),
                )
                .optional(),
            )
            .field(Field::new(5, "thumbnail", Type::binary()).optional())
            .field(Field::new(6, "owner", Type::structure("shared", "SharedItem"))),
    );
    p.structs.push(
        Struct::new("NotFound")
            .exception()
            .field(Field::new(1, "message", Type::string())),
    );

    p.services.push(
        Service::new("Finder")
            .extends(TypeRef::new("shared", "BaseService"))
            .function(
                Function::new("find", Type::structure("geometry", "Point"))
                    .arg(Field::new(1, "name", Type::string()))
                    .throws(Field::new(1, "not_found", Type::structure("geometry", "NotFound"))),
            )
            .function(Function::new("ping", Type::Void).oneway())
            .function(
                Function::new("count", Type::i32())
                    .arg(Field::new(1, "type", Type::enumeration("geometry", "Color"))),
            ),
    );
    p
}

pub fn generate_ok(program: &Program) -> GeneratedPackage {
    generate_program(program, &Config::new()).expect("generation should succeed")
}

/// Contents of a generated file by name.
pub fn file<'p>(package: &'p GeneratedPackage, name: &str) -> &'p str {
    package
        .file(name)
        .unwrap_or_else(|| panic!("missing generated file {name}"))
}

/// The `func ... {` block starting with `header`, up to its closing brace.
pub fn go_block<'s>(source: &'s str, header: &str) -> &'s str {
    let start = source
        .find(header)
        .unwrap_or_else(|| panic!("missing `{header}` in:\n{source}"));
    let rest = &source[start..];
    let end = rest.find("\n}\n").map_or(rest.len(), |i| i + 2);
    &rest[..end]
}

/// [`go_block`] with tabs widened to four spaces, for inline snapshots.
pub fn snippet(source: &str, header: &str) -> String {
    go_block(source, header).replace('\t', "    ")
}
