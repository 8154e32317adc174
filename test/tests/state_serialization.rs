use simcore_shared::{
    Fixed, MessageUpdate, ParamNode, SerdeErr, StateError, StateSerializer, StdSerializer,
    FIRST_LOCAL_ENTITY,
};
use simcore_test::{component_x, Test1A, Test2A, TestManager, TestPosition};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn put_u32(bytes: &mut Vec<u8>, value: u32) {
    bytes.extend_from_slice(&value.to_le_bytes());
}

fn put_i32(bytes: &mut Vec<u8>, value: i32) {
    bytes.extend_from_slice(&value.to_le_bytes());
}

fn put_str(bytes: &mut Vec<u8>, value: &str) {
    put_u32(bytes, value.len() as u32);
    bytes.extend_from_slice(value.as_bytes());
}

/// Entities 10 (`Test1A`, `Test2A`) and 20 (`Test1A` with x = 1234).
fn two_entity_manager() -> TestManager {
    let test = TestManager::new();
    test.manager.set_rng_seed(42);
    test.add_entity_with(10, &[("Test1A", None), ("Test2A", None)]);
    test.add_entity_with(20, &[("Test1A", Some(1234))]);
    test
}

#[test]
fn state_stream_layout() {
    init();
    let test = two_entity_manager();

    let bytes = test.manager.serialize_state().unwrap();

    let mut expected = Vec::new();
    put_str(&mut expected, "42");
    put_u32(&mut expected, 2); // next entity id
    put_u32(&mut expected, 0); // system component types
    put_u32(&mut expected, 2); // component types
    put_str(&mut expected, "Test1A");
    put_u32(&mut expected, 2);
    put_u32(&mut expected, 10);
    put_i32(&mut expected, 11000);
    put_u32(&mut expected, 20);
    put_i32(&mut expected, 1234);
    put_str(&mut expected, "Test2A");
    put_u32(&mut expected, 1);
    put_u32(&mut expected, 10);
    put_i32(&mut expected, 21000);
    assert_eq!(bytes, expected);

    let entity_10_record = [0x0a, 0x00, 0x00, 0x00, 0xf8, 0x2a, 0x00, 0x00];
    assert!(bytes
        .windows(entity_10_record.len())
        .any(|window| window == entity_10_record));
}

#[test]
fn restored_state_matches_the_original() {
    init();
    let source = two_entity_manager();
    source
        .manager
        .broadcast_message(&MessageUpdate::new(Fixed::from_int(1)));
    let bytes = source.manager.serialize_state().unwrap();

    let target = TestManager::new();
    target.add_entity_with(99, &[("Test2A", None)]);
    target.manager.deserialize_state(&bytes).unwrap();

    assert!(!target.manager.entity_exists(99));
    assert_eq!(target.manager.serialize_state().unwrap(), bytes);
    assert_eq!(
        target.manager.compute_state_hash(false).unwrap(),
        source.manager.compute_state_hash(false).unwrap()
    );
    assert_eq!(
        target.manager.dump_debug_state(false).unwrap(),
        source.manager.dump_debug_state(false).unwrap()
    );

    let test1 = target.manager.lookup_interface_id("Test1").unwrap();
    assert_eq!(component_x!(target.manager, 10, test1, Test1A), Some(11010));
    assert_eq!(component_x!(target.manager, 20, test1, Test1A), Some(1244));
    assert_eq!(target.manager.next_entity_id(), 2);
    assert!(target.manager.system_entity().is_some());
    assert_eq!(
        target.manager.with_rng(|rng| rng.u32(..)),
        source.manager.with_rng(|rng| rng.u32(..))
    );
}

#[test]
fn local_entities_do_not_affect_synchronized_state() {
    init();
    let test = two_entity_manager();
    let bytes = test.manager.serialize_state().unwrap();
    let hash = test.manager.compute_state_hash(false).unwrap();

    test.add_template(
        "local",
        ParamNode::new()
            .with_child("Test1A", ParamNode::new())
            .with_child("Position", ParamNode::new()),
    );
    let local = test.manager.add_local_entity("local").unwrap();
    assert_eq!(local, FIRST_LOCAL_ENTITY);
    test.manager
        .broadcast_message(&MessageUpdate::new(Fixed::from_int(1)));
    test.manager
        .broadcast_message(&MessageUpdate::new(Fixed::from_int(1)));

    // Only the local entity's components changed.
    let clean = two_entity_manager();
    clean
        .manager
        .broadcast_message(&MessageUpdate::new(Fixed::from_int(1)));
    clean
        .manager
        .broadcast_message(&MessageUpdate::new(Fixed::from_int(1)));
    assert_eq!(
        test.manager.serialize_state().unwrap(),
        clean.manager.serialize_state().unwrap()
    );
    assert_eq!(
        test.manager.compute_state_hash(false).unwrap(),
        clean.manager.compute_state_hash(false).unwrap()
    );
    assert_ne!(test.manager.compute_state_hash(false).unwrap(), hash);
    assert_ne!(test.manager.serialize_state().unwrap(), bytes);

    // The dump still shows it.
    let dump = test.manager.dump_debug_state(false).unwrap();
    assert!(dump.contains(&format!("- id: {}\n  type: local\n", local)));
}

#[test]
fn hash_tracks_component_state() {
    init();
    let a = two_entity_manager();
    let b = two_entity_manager();
    assert_eq!(
        a.manager.compute_state_hash(false).unwrap(),
        b.manager.compute_state_hash(false).unwrap()
    );

    a.manager
        .broadcast_message(&MessageUpdate::new(Fixed::from_int(1)));
    assert_ne!(
        a.manager.compute_state_hash(false).unwrap(),
        b.manager.compute_state_hash(false).unwrap()
    );

    b.manager.set_rng_seed(43);
    b.manager
        .broadcast_message(&MessageUpdate::new(Fixed::from_int(1)));
    assert_ne!(
        a.manager.compute_state_hash(false).unwrap(),
        b.manager.compute_state_hash(false).unwrap()
    );
}

#[test]
fn quick_hash_only_covers_configured_types() {
    init();
    let a = TestManager::new();
    let b = TestManager::new();
    a.add_entity_with(10, &[("Position", Some(5)), ("Test1A", Some(1))]);
    b.add_entity_with(10, &[("Position", Some(5)), ("Test1A", Some(2))]);

    assert_eq!(
        a.manager.compute_state_hash(true).unwrap(),
        b.manager.compute_state_hash(true).unwrap()
    );
    assert_ne!(
        a.manager.compute_state_hash(false).unwrap(),
        b.manager.compute_state_hash(false).unwrap()
    );

    let position = a.manager.lookup_interface_id("Position").unwrap();
    a.manager
        .query_interface(10, position)
        .and_then(|component| component.with_mut::<TestPosition, _>(|position| position.z = 9))
        .unwrap();
    assert_ne!(
        a.manager.compute_state_hash(true).unwrap(),
        b.manager.compute_state_hash(true).unwrap()
    );

    a.manager.set_quick_hash_component_types(["Test2A"]);
    b.manager.set_quick_hash_component_types(["Test2A"]);
    assert_eq!(
        a.manager.compute_state_hash(true).unwrap(),
        b.manager.compute_state_hash(true).unwrap()
    );
}

#[test]
fn debug_dump_lists_entities_and_fields() {
    init();
    let test = TestManager::new();
    test.manager.set_rng_seed(42);
    test.add_entity_with(10, &[("Test1A", None), ("Test2A", None)]);
    test.add_template(
        "marker",
        ParamNode::new().with_child(
            "Position",
            ParamNode::new()
                .with_child("x", ParamNode::leaf("3"))
                .with_child("z", ParamNode::leaf("-4")),
        ),
    );
    test.manager.add_local_entity("marker").unwrap();

    let expected = "\
rng: \"42\"
entities:
- id: 10
  Test1A:
    x: 11000
  Test2A:
    x: 21000

- id: 536870912
  type: local
  Position:
    x: 3
    z: -4

";
    assert_eq!(test.manager.dump_debug_state(false).unwrap(), expected);
}

#[test]
fn serialization_requires_flushed_destructions() {
    init();
    let test = two_entity_manager();
    test.manager.destroy_components_soon(20);

    assert_eq!(
        test.manager.serialize_state().unwrap_err(),
        StateError::PendingDestructions { count: 1 }
    );

    test.manager.flush_destroyed_components();
    let bytes = test.manager.serialize_state().unwrap();
    let restored = TestManager::new();
    restored.manager.deserialize_state(&bytes).unwrap();
    assert!(restored.manager.entity_exists(10));
    assert!(!restored.manager.entity_exists(20));
}

fn stream_header(serializer: &mut StdSerializer, rng: &str) {
    serializer.string_ascii("rng", rng, 0, 32);
    serializer.number_u32_unbounded("next entity id", 2);
    serializer.number_u32_unbounded("num system component types", 0);
}

#[test]
fn unknown_component_names_are_rejected() {
    init();
    let mut serializer = StdSerializer::new();
    stream_header(&mut serializer, "0");
    serializer.number_u32_unbounded("num component types", 1);
    serializer.string_ascii("name", "Nonexistent", 0, 255);
    serializer.number_u32_unbounded("num entities", 0);

    let test = TestManager::new();
    assert_eq!(
        test.manager
            .deserialize_state(&serializer.into_bytes())
            .unwrap_err(),
        StateError::UnknownComponentType {
            name: "Nonexistent".to_string()
        }
    );
}

#[test]
fn malformed_streams_are_rejected() {
    init();
    let test = TestManager::new();

    let mut serializer = StdSerializer::new();
    stream_header(&mut serializer, "not a number");
    serializer.number_u32_unbounded("num component types", 0);
    assert!(matches!(
        test.manager.deserialize_state(&serializer.into_bytes()),
        Err(StateError::InvalidRngState { .. })
    ));

    let mut bytes = two_entity_manager().manager.serialize_state().unwrap();
    bytes.push(0);
    assert_eq!(
        test.manager.deserialize_state(&bytes).unwrap_err(),
        StateError::Serde(SerdeErr::TrailingBytes { remaining: 1 })
    );

    bytes.truncate(bytes.len() - 3);
    assert!(matches!(
        test.manager.deserialize_state(&bytes),
        Err(StateError::Serde(SerdeErr::UnexpectedEnd { .. }))
    ));
}

#[test]
fn restored_components_answer_queries() {
    init();
    let bytes = two_entity_manager().manager.serialize_state().unwrap();
    let test = TestManager::new();
    test.manager.deserialize_state(&bytes).unwrap();

    let test2 = test.manager.lookup_interface_id("Test2").unwrap();
    assert_eq!(component_x!(test.manager, 10, test2, Test2A), Some(21000));
    let entities: Vec<_> = test
        .manager
        .get_entities_with_interface(test2)
        .into_iter()
        .map(|(entity, _)| entity)
        .collect();
    assert_eq!(entities, vec![10]);
}
