use crate::{ModelIndex, Program, ResolveError, Service, Struct, Type, TypeRef, Typedef, WireType};

fn typedef(name: &str, ty: Type, forward: bool) -> Typedef {
    Typedef {
        name: name.to_owned(),
        ty,
        forward,
        doc: None,
    }
}

fn shared() -> Program {
    let mut shared = Program::new("shared");
    shared.structs.push(Struct::new("Item"));
    shared
        .typedefs
        .push(typedef("ItemId", Type::i64(), false));
    shared.services.push(Service::new("Base"));
    shared
}

fn root() -> Program {
    let mut root = Program::new("app");
    root.includes.push(shared());
    root.typedefs
        .push(typedef("Id", Type::typedef("shared", "ItemId"), false));
    root.typedefs
        .push(typedef("Node", Type::structure("shared", "Item"), true));
    root.typedefs
        .push(typedef("NodeAlias", Type::typedef("app", "Node"), false));
    root.services
        .push(Service::new("Api").extends(TypeRef::new("shared", "Base")));
    root
}

#[test]
fn resolves_across_includes() {
    let program = root();
    let index = ModelIndex::new(&program);

    let names: Vec<_> = index.programs().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["app", "shared"]);

    let item = index.structure(&TypeRef::new("shared", "Item")).unwrap();
    assert_eq!(item.name, "Item");
}

#[test]
fn true_type_follows_chain() {
    let program = root();
    let index = ModelIndex::new(&program);

    let id = Type::typedef("app", "Id");
    assert_eq!(index.true_type(&id).unwrap(), &Type::i64());
    assert_eq!(WireType::of(index.true_type(&id).unwrap()), Some(WireType::I64));

    let plain = Type::list(Type::i32());
    assert_eq!(index.true_type(&plain).unwrap(), &plain);
}

#[test]
fn forward_typedef_detected_through_alias() {
    let program = root();
    let index = ModelIndex::new(&program);

    assert!(index.is_forward(&Type::typedef("app", "NodeAlias")).unwrap());
    assert!(!index.is_forward(&Type::typedef("app", "Id")).unwrap());
    assert!(!index.is_forward(&Type::i32()).unwrap());
}

#[test]
fn typedef_cycle_is_an_error() {
    let mut program = Program::new("loop");
    program
        .typedefs
        .push(typedef("A", Type::typedef("loop", "B"), false));
    program
        .typedefs
        .push(typedef("B", Type::typedef("loop", "A"), false));
    let index = ModelIndex::new(&program);

    let err = index.true_type(&Type::typedef("loop", "A")).unwrap_err();
    assert!(matches!(err, ResolveError::TypedefCycle(_)));
}

#[test]
fn unknown_reference() {
    let program = root();
    let index = ModelIndex::new(&program);

    let err = index
        .structure(&TypeRef::new("shared", "Missing"))
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"unknown struct `shared.Missing`");

    let err = index.program("nowhere").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"unknown program `nowhere`");
}

#[test]
fn service_ancestors() {
    let program = root();
    let index = ModelIndex::new(&program);

    let api = &program.services[0];
    let chain = index.ancestors(api).unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].name, "Base");
}
