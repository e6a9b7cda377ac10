use idlc_core::{Enum, Field, Function, ModelIndex, Program, Requiredness, Service, Struct, Type};

use super::{Lowerer, Presence, RefMode, StructPlan, lower_schema};
use crate::test_utils::geometry;
use crate::{Error, Warning};

fn plan(program: &Program, name: &str) -> StructPlan {
    let index = ModelIndex::new(program);
    let lowerer = Lowerer::new(&index, program);
    let s = program
        .structs
        .iter()
        .find(|s| s.name == name)
        .expect("fixture struct");
    lowerer.plan_struct(s).unwrap()
}

#[test]
fn gaps_between_ids() {
    let gappy = plan(&geometry(), "Gappy");
    assert_eq!(gappy.gaps.len(), 1);
    let gap = gappy.gaps[0];
    assert_eq!((gap.first, gap.last), (3, 4));
    assert_eq!(gappy.gap_before(2), Some(&gap));
    assert_eq!(gap.to_string(), "unused fields # 3 to 4");

    let point = plan(&geometry(), "Point");
    assert!(point.gaps.is_empty());
}

#[test]
fn single_gap_and_leading_gap() {
    let mut p = geometry();
    p.structs.push(
        Struct::new("Sparse")
            .field(Field::new(3, "c", Type::i32()))
            .field(Field::new(-1, "neg", Type::i32()))
            .field(Field::new(5, "e", Type::i32())),
    );
    let sparse = plan(&p, "Sparse");

    let rendered: Vec<String> = sparse.gaps.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, ["unused fields # 1 to 2", "unused field # 4"]);
    assert_eq!(sparse.gaps[0].before, 0);
    assert_eq!(sparse.gaps[1].before, 2);

    let ids: Vec<i16> = sparse.sorted().map(|f| f.id).collect();
    assert_eq!(ids, [-1, 3, 5]);
    assert_eq!(sparse.field("neg").unwrap().method_suffix(), "_1");
    assert_eq!(sparse.field("e").unwrap().method_suffix(), "5");
}

#[test]
fn presence_per_field() {
    let canvas = plan(&geometry(), "Canvas");
    let presence = |name: &str| canvas.field(name).unwrap().presence;

    assert_eq!(presence("name"), Presence::Always);
    assert_eq!(presence("color"), Presence::NotDefault);
    assert_eq!(presence("points"), Presence::NotNil);
    assert_eq!(presence("labels"), Presence::NotNil);
    assert_eq!(presence("thumbnail"), Presence::NotNil);
    assert_eq!(presence("owner"), Presence::NotNil);

    let owner = canvas.field("owner").unwrap();
    assert!(owner.is_guarded());
    assert!(!canvas.field("name").unwrap().has_isset());
    assert_eq!(canvas.field("color").unwrap().repr.mode, RefMode::Value);
    assert_eq!(canvas.field("color").unwrap().go_name, "Color");

    let profile = plan(&geometry(), "Profile");
    let nickname = profile.field("nickname").unwrap();
    assert_eq!(nickname.presence, Presence::NotNil);
    assert_eq!(nickname.repr.declared_go_type(), "*string");
}

#[test]
fn required_fields_always_written() {
    let point = plan(&geometry(), "Point");
    assert_eq!(point.required().count(), 2);
    assert!(point.fields.iter().all(|f| !f.is_guarded()));
    assert_eq!(point.settable().count(), 0);
}

#[test]
fn union_view_leaves_model_untouched() {
    let mut p = geometry();
    p.structs.push(
        Struct::new("Either")
            .union()
            .field(Field::new(1, "left", Type::i32()).required())
            .field(Field::new(2, "right", Type::string())),
    );
    let either = plan(&p, "Either");

    assert!(either.is_union);
    assert!(either.fields.iter().all(|f| f.is_optional()));
    assert_eq!(either.settable().count(), 2);
    assert_eq!(either.field("left").unwrap().repr.mode, RefMode::Reference);

    let model = p.structs.iter().find(|s| s.name == "Either").unwrap();
    assert_eq!(model.fields[0].requiredness, Requiredness::Required);
    assert_eq!(model.fields[1].requiredness, Requiredness::Default);
}

#[test]
fn duplicate_ids_rejected() {
    let mut p = geometry();
    let s = Struct::new("Twice")
        .field(Field::new(1, "a", Type::i32()))
        .field(Field::new(1, "b", Type::i32()));
    p.structs.push(s.clone());

    let index = ModelIndex::new(&p);
    let err = Lowerer::new(&index, &p).plan_struct(&s).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"duplicate field id 1 in Twice");
}

#[test]
fn enum_display_round_trip() {
    let p = geometry();
    let index = ModelIndex::new(&p);
    let color = Lowerer::new(&index, &p).plan_enum(&p.enums[0]);

    assert_eq!(color.to_display(5), "Color_BLUE");
    assert_eq!(color.to_display(3), "<UNSET>");
    assert_eq!(color.from_display("Color_GREEN"), Ok(1));

    let err = color.from_display("BLUE").unwrap_err();
    assert_eq!(err.to_string(), "not a valid Color string");
}

#[test]
fn enum_duplicate_values_render_first() {
    let mut p = geometry();
    p.enums.push(
        Enum::new("Level")
            .value("LOW", Some(1))
            .value("MINIMUM", Some(1))
            .value("HIGH", None),
    );
    let index = ModelIndex::new(&p);
    let level = Lowerer::new(&index, &p).plan_enum(&p.enums[1]);

    assert_eq!(level.to_display(1), "Level_LOW");
    assert_eq!(level.from_display("Level_MINIMUM"), Ok(1));
    assert_eq!(level.from_display("Level_HIGH"), Ok(2));
    let distinct: Vec<&str> = level.distinct().map(|e| e.name.as_str()).collect();
    assert_eq!(distinct, ["LOW", "HIGH"]);
}

#[test]
fn service_helper_structs() {
    let p = geometry();
    let index = ModelIndex::new(&p);
    let schema = lower_schema(&index).unwrap();
    let finder = schema
        .service(&p.type_ref("Finder"))
        .expect("Finder planned");

    let find = finder.function("find").unwrap();
    assert_eq!(find.args.go_name, "FinderFindArgs");
    assert!(find.args.fields[0].is_required());

    let result = find.result.as_ref().unwrap();
    assert_eq!(result.go_name, "FinderFindResult");
    let ids: Vec<i16> = result.sorted().map(|f| f.id).collect();
    assert_eq!(ids, [0, 1]);
    assert_eq!(find.success().unwrap().repr.go_type, "Point");
    let exceptions: Vec<&str> = find.exceptions().map(|f| f.go_name.as_str()).collect();
    assert_eq!(exceptions, ["NotFound"]);

    let ping = finder.function("ping").unwrap();
    assert!(ping.oneway);
    assert!(ping.result.is_none());
    assert!(ping.success().is_none());

    // Included programs are planned too.
    assert!(schema.service(&idlc_core::TypeRef::new("shared", "BaseService")).is_some());
    assert!(schema.warnings.is_empty());
}

#[test]
fn oneway_rules() {
    let p = geometry();
    let index = ModelIndex::new(&p);
    let lowerer = Lowerer::new(&index, &p);
    let mut warnings = Vec::new();

    let throwing = Service::new("Bad").function(
        Function::new("fire", Type::Void)
            .oneway()
            .throws(Field::new(1, "nf", Type::structure("geometry", "NotFound"))),
    );
    let err = lowerer.plan_service(&throwing, &mut warnings).unwrap_err();
    assert_eq!(
        err,
        Error::OnewayWithExceptions {
            service: "Bad".to_owned(),
            function: "fire".to_owned(),
        }
    );

    let returning = Service::new("Odd").function(Function::new("fire", Type::i32()).oneway());
    let plan = lowerer.plan_service(&returning, &mut warnings).unwrap();
    assert_eq!(
        warnings,
        [Warning::OnewayReturnsValue {
            service: "Odd".to_owned(),
            function: "fire".to_owned(),
        }]
    );
    assert_eq!(warnings[0].to_string(), "oneway method Odd.fire should return void");
    assert!(plan.functions[0].returns.is_none());
}
