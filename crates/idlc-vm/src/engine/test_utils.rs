//! Fixture schema for runtime tests.

use idlc_compiler::lower::{FunctionPlan, StructPlan};
use idlc_compiler::{LoweredSchema, lower_schema};
use idlc_core::{
    ConstValue, Enum, Field, Function, ModelIndex, Program, Service, Struct, Type, TypeRef,
};

use super::codec::Codec;
use super::value::{StructValue, Value};

fn base() -> Program {
    let mut p = Program::new("base");
    p.services.push(
        Service::new("Health").function(Function::new("status", Type::string())),
    );
    p
}

pub fn program() -> Program {
    let mut p = Program::new("geo");
    p.includes.push(base());

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
    p.structs
        .push(Struct::new("Circle").field(Field::new(1, "radius", Type::double())));
    p.structs
        .push(Struct::new("Square").field(Field::new(1, "side", Type::double())));
    p.structs.push(
        Struct::new("Shape")
            .union()
            .field(Field::new(1, "c", Type::structure("geo", "Circle")).optional())
            .field(Field::new(2, "s", Type::structure("geo", "Square")).optional()),
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
                Field::new(2, "color", Type::enumeration("geo", "Color"))
                    .optional()
                    .with_default(ConstValue::Integer(5)),
            )
            .field(Field::new(3, "points", Type::list(Type::structure("geo", "Point"))).optional())
            .field(
                Field::new(4, "labels", Type::map(Type::binary(), Type::set(Type::string())))
                    .optional(),
            )
            .field(Field::new(5, "thumbnail", Type::binary()).optional())
            .field(Field::new(6, "origin", Type::structure("geo", "Point")).required()),
    );
    p.structs.push(
        Struct::new("NotFound")
            .exception()
            .field(Field::new(1, "message", Type::string())),
    );
    p.structs.push(
        Struct::new("Unrelated")
            .exception()
            .field(Field::new(1, "code", Type::i32())),
    );

    p.services.push(
        Service::new("Finder")
            .extends(TypeRef::new("base", "Health"))
            .function(
                Function::new("find", Type::structure("geo", "Point"))
                    .arg(Field::new(1, "name", Type::string()))
                    .throws(Field::new(1, "not_found", Type::structure("geo", "NotFound"))),
            )
            .function(
                Function::new("forget", Type::Void).arg(Field::new(1, "name", Type::string())),
            )
            .function(Function::new("ping", Type::Void).oneway()),
    );
    p
}

pub fn schema() -> LoweredSchema {
    let program = program();
    let index = ModelIndex::new(&program);
    lower_schema(&index).expect("fixture lowers")
}

pub fn geo(name: &str) -> TypeRef {
    TypeRef::new("geo", name)
}

pub fn finder() -> TypeRef {
    geo("Finder")
}

pub fn plan<'s>(schema: &'s LoweredSchema, name: &str) -> &'s StructPlan {
    schema.structure(&geo(name)).expect("fixture struct")
}

pub fn function<'s>(schema: &'s LoweredSchema, name: &str) -> &'s FunctionPlan {
    schema
        .service(&finder())
        .and_then(|s| s.function(name))
        .expect("fixture function")
}

pub fn point(codec: &Codec<'_>, x: i32, y: i32) -> StructValue {
    codec
        .instantiate(&geo("Point"))
        .expect("point")
        .with("x", Value::I32(x))
        .with("y", Value::I32(y))
}
