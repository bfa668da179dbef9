use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use serde::Serialize;
use serde_json::json;
use vc_polymorph::json;
use vc_polymorph::{
    FamilyMeta, FamilyRegistry, Polymorph, PolymorphError, Polymorphic, ResolutionCache,
    TypeHandle, collect, impl_auto_register, impl_polymorphic,
};

// -----------------------------------------------------------------------------
// Families

struct Shape;

#[derive(Serialize)]
struct Circle {
    radius: u32,
}

#[derive(Serialize)]
struct Square {
    side: u32,
}

impl_polymorphic!(Shape => [
    literal(Circle, "shapeType", "circle"),
    literal(Square, "shapeType", "square"),
]);

struct Animal;
struct Dog;
struct Cat;
struct Lion;
struct Tiger;

impl_polymorphic!(Animal => [
    literal(Dog, "kind", "dog"),
    nested_type_name(Cat, "kind", "Cat"),
]);

impl_polymorphic!(Cat => [
    literal(Lion, "species", "lion"),
    literal(Tiger, "species", "tiger"),
]);

// A subtype carrying its parent's declaration instead of a family of its own.
struct Vehicle;
struct Car;
struct SportsCar;

impl_polymorphic!(Vehicle => [nested_literal(Car, "vehicle", "car")]);
impl_polymorphic!(Car as Vehicle => [literal(SportsCar, "vehicle", "sports")]);

struct Event;
struct Click;

impl_polymorphic!(Event => [literal(Click, "event", "click")]);
impl_auto_register!(Event);

fn document(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn polymorph() -> Polymorph {
    let polymorph = Polymorph::new();
    polymorph.register::<Shape>();
    polymorph.register::<Animal>();
    polymorph.register::<Vehicle>();
    polymorph
}

// -----------------------------------------------------------------------------
// Tests

#[test]
fn shape_scenario() {
    let polymorph = polymorph();

    let circle = json!({ "shapeType": "circle", "radius": 5 });
    assert!(polymorph.resolve::<Shape, _>(&circle).is::<Circle>());

    let mut square = json!({ "side": 2 });
    polymorph.write::<Shape, Square, _>(&mut square);
    assert_eq!(square, json!({ "shapeType": "square", "side": 2 }));

    let triangle = json!({ "shapeType": "triangle" });
    assert!(polymorph.resolve::<Shape, _>(&triangle).is::<Shape>());
}

#[test]
fn unregistered_base_passes_through() {
    struct Plain;

    let polymorph = polymorph();
    let plain = TypeHandle::of::<Plain>();

    for doc in [
        document(&[]),
        document(&[("shapeType", "circle")]),
        document(&[("kind", "dog")]),
    ] {
        assert_eq!(polymorph.resolve_concrete_type(plain, &doc), plain);
    }
    assert!(!polymorph.is_cached(plain));

    let mut doc = document(&[]);
    polymorph.write_discriminator(&mut doc, plain, TypeHandle::of::<Circle>());
    assert!(doc.is_empty());
}

#[test]
fn written_discriminator_resolves_back() {
    let polymorph = polymorph();
    let cases = [
        (TypeHandle::of::<Shape>(), TypeHandle::of::<Circle>()),
        (TypeHandle::of::<Shape>(), TypeHandle::of::<Square>()),
        (TypeHandle::of::<Animal>(), TypeHandle::of::<Dog>()),
        (TypeHandle::of::<Animal>(), TypeHandle::of::<Cat>()),
        (TypeHandle::of::<Animal>(), TypeHandle::of::<Lion>()),
        (TypeHandle::of::<Vehicle>(), TypeHandle::of::<Car>()),
        (TypeHandle::of::<Car>(), TypeHandle::of::<SportsCar>()),
    ];

    for (base, concrete) in cases {
        let mut doc = document(&[]);
        polymorph.write_discriminator(&mut doc, base, concrete);

        let tag = polymorph.tag_for(base, concrete).unwrap();
        assert_eq!(doc.get(tag.property()).map(String::as_str), Some(tag.literal()));
        assert_eq!(polymorph.resolve_concrete_type(base, &doc), concrete);
    }
}

#[test]
fn repeated_access_is_stable() {
    let polymorph = polymorph();

    let first = polymorph.cache_of::<Animal>(false);
    let second = polymorph.cache_of::<Animal>(false);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);

    let forced = polymorph.cache_of::<Animal>(true);
    assert!(!Arc::ptr_eq(&first, &forced));
    assert_eq!(*first, *forced);
}

#[test]
fn forced_rebuild_sees_new_metadata() {
    struct Wolf;

    let polymorph = polymorph();
    let animal = TypeHandle::of::<Animal>();
    let wolf = document(&[("kind", "wolf")]);

    assert!(polymorph.resolve::<Animal, _>(&wolf).is::<Animal>());

    polymorph.families_mut().insert(
        animal,
        Animal::family_meta().literal::<Wolf>("kind", "wolf"),
    );
    // Published caches are kept until asked otherwise.
    assert!(polymorph.resolve::<Animal, _>(&wolf).is::<Animal>());

    let forced = polymorph.cache_for(animal, true);
    assert_eq!(forced.lookup("kind", "wolf"), Some(TypeHandle::of::<Wolf>()));
    assert!(polymorph.resolve::<Animal, _>(&wolf).is::<Wolf>());

    polymorph.invalidate(animal);
    assert!(!polymorph.is_cached(animal));
    assert_eq!(*polymorph.cache_for(animal, false), *forced);
}

#[test]
fn nested_family_resolves_from_outer_base() {
    let polymorph = polymorph();
    let families = polymorph.families();

    let rules = collect(&families, TypeHandle::of::<Animal>());
    let targets: Vec<_> = rules.iter().map(|rule| rule.target()).collect();
    assert_eq!(
        targets,
        [
            TypeHandle::of::<Dog>(),
            TypeHandle::of::<Cat>(),
            TypeHandle::of::<Lion>(),
            TypeHandle::of::<Tiger>(),
        ]
    );
    drop(families);

    let tiger = document(&[("species", "tiger")]);
    assert!(polymorph.resolve::<Animal, _>(&tiger).is::<Tiger>());
    assert!(polymorph.resolve::<Cat, _>(&tiger).is::<Tiger>());

    let cat = document(&[("kind", "Cat")]);
    assert!(polymorph.resolve::<Animal, _>(&cat).is::<Cat>());
    // `Cat`'s own family does not know its parent's discriminator.
    assert!(polymorph.resolve::<Cat, _>(&cat).is::<Cat>());
}

#[test]
fn redeclared_family_is_not_descended() {
    let polymorph = polymorph();

    // `Car` re-declares `Vehicle`'s family, so it is not descended into.
    let rules = collect(&polymorph.families(), TypeHandle::of::<Vehicle>());
    assert_eq!(rules.len(), 1);
    assert!(rules[0].target().is::<Car>());

    let rules = collect(&polymorph.families(), TypeHandle::of::<Car>());
    assert_eq!(rules.len(), 1);
    assert!(rules[0].target().is::<SportsCar>());

    let sports = document(&[("vehicle", "sports")]);
    assert!(polymorph.resolve::<Vehicle, _>(&sports).is::<Vehicle>());
    assert!(polymorph.resolve::<Car, _>(&sports).is::<SportsCar>());
}

#[test]
fn self_referencing_family_terminates() {
    struct Node;
    struct Branch;

    let mut families = FamilyRegistry::new();
    families.insert(
        TypeHandle::of::<Node>(),
        FamilyMeta::new::<Node>().literal::<Branch>("node", "branch"),
    );
    families.insert(
        TypeHandle::of::<Branch>(),
        FamilyMeta::new::<Branch>()
            .literal::<Node>("node", "node")
            .literal::<Branch>("node", "branch"),
    );

    let rules = collect(&families, TypeHandle::of::<Node>());
    assert_eq!(rules.len(), 3);

    let cache = ResolutionCache::build(&families, TypeHandle::of::<Node>());
    assert_eq!(cache.len(), 2);
    assert!(cache.conflicts().is_empty());
}

#[test]
fn conflicts_are_reported_on_validate() {
    struct Fish;
    struct Shark;
    struct Salmon;

    let polymorph = Polymorph::new();
    let fish = TypeHandle::of::<Fish>();
    polymorph.set_family(
        fish,
        FamilyMeta::new::<Fish>()
            .literal::<Shark>("kind", "big")
            .literal::<Salmon>("kind", "big"),
    );

    assert!(polymorph.resolve::<Fish, _>(&document(&[("kind", "big")])).is::<Salmon>());
    let err = polymorph.validate(fish).unwrap_err();
    assert!(matches!(err, PolymorphError::Conflict { ref literal, .. } if literal == "big"));
    assert!(err.to_string().contains("big"));

    assert!(polymorph.validate(TypeHandle::of::<Shape>()).is_ok());
}

#[test]
fn concurrent_access_agrees() {
    let polymorph = Arc::new(polymorph());
    let expected = ResolutionCache::build(&polymorph.families(), TypeHandle::of::<Animal>());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let polymorph = Arc::clone(&polymorph);
            thread::spawn(move || {
                for round in 0..50 {
                    match (i + round) % 3 {
                        0 => drop(polymorph.cache_of::<Animal>(true)),
                        1 => polymorph.invalidate_type::<Animal>(),
                        _ => {}
                    }
                    let doc = document(&[("species", "lion")]);
                    assert!(polymorph.resolve::<Animal, _>(&doc).is::<Lion>());
                }
                polymorph.cache_of::<Animal>(false)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(*handle.join().unwrap(), expected);
    }
}

#[test]
fn json_bridge() {
    let polymorph = polymorph();

    let value = json::to_document::<Shape, _>(&polymorph, &Square { side: 4 }).unwrap();
    assert_eq!(value, json!({ "shapeType": "square", "side": 4 }));
    assert!(json::resolve_value::<Shape>(&polymorph, &value).is::<Square>());

    // Not registered in the family: serialized untagged.
    let value = json::to_document::<Animal, _>(&polymorph, &Circle { radius: 1 }).unwrap();
    assert_eq!(value, json!({ "radius": 1 }));

    // Untagged scalars are fine.
    let value = json::to_document::<Shape, _>(&polymorph, &NotAnObject(3)).unwrap();
    assert_eq!(value, json!(3));
}

struct NotAnObjectFamily;

#[derive(Serialize)]
struct NotAnObject(u32);

impl_polymorphic!(NotAnObjectFamily => [literal(NotAnObject, "kind", "scalar")]);

#[test]
fn scalar_tagging_fails() {
    let polymorph = Polymorph::new();
    polymorph.register::<NotAnObjectFamily>();

    let err = json::to_document::<NotAnObjectFamily, _>(&polymorph, &NotAnObject(3)).unwrap_err();
    assert!(matches!(err, PolymorphError::NotAnObject(ty) if ty.is::<NotAnObject>()));
}

#[test]
fn auto_registration() {
    let mut families = FamilyRegistry::new();
    if families.auto_register() {
        assert!(families.contains(TypeHandle::of::<Event>()));
        assert!(Polymorph::global().participates(TypeHandle::of::<Event>()));

        let click = document(&[("event", "click")]);
        assert!(Polymorph::global().resolve::<Event, _>(&click).is::<Click>());
    }
}
