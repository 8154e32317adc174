use std::{cell::RefCell, rc::Rc};

use simcore_shared::{
    ComponentKey, Fixed, MessageInterpolate, MessageTurnStart, MessageUpdate, ParamNode,
    ScriptValue, ScriptedMessage, MT_INTERPOLATE,
};
use simcore_test::{take_deliveries, Delivery, TestClass, TestDynamic, TestManager, PING};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
    take_deliveries();
}

fn delivery(entity: u32, component: &'static str, message: &str, global: bool) -> Delivery {
    Delivery {
        entity,
        component,
        message: message.to_string(),
        global,
    }
}

fn ping(test: &TestManager) -> ScriptedMessage {
    let ping = test.manager.lookup_message_type_id(PING).unwrap();
    ScriptedMessage::new(ping, PING, ScriptValue::Null)
}

#[test]
fn broadcast_reaches_local_and_global_subscribers() {
    init();
    let test = TestManager::new();
    test.add_entity_with(10, &[("Test1A", None)]);
    test.add_entity_with(20, &[("Test2A", None)]);
    test.add_entity_with(30, &[("Test1A", None)]);
    take_deliveries();

    test.manager.broadcast_message(&ping(&test));

    assert_eq!(
        take_deliveries(),
        vec![
            delivery(10, "Test1A", PING, false),
            delivery(30, "Test1A", PING, false),
            delivery(20, "Test2A", PING, true),
        ]
    );
}

#[test]
fn posted_message_skips_other_entities_local_subscribers() {
    init();
    let test = TestManager::new();
    test.add_entity_with(10, &[("Test1A", None)]);
    test.add_entity_with(20, &[("Test2A", None)]);
    test.add_entity_with(30, &[("Test1A", None)]);
    take_deliveries();

    test.manager.post_message(30, &ping(&test));

    assert_eq!(
        take_deliveries(),
        vec![
            delivery(30, "Test1A", PING, false),
            delivery(20, "Test2A", PING, true),
        ]
    );

    let test1 = test.manager.lookup_interface_id("Test1").unwrap();
    assert_eq!(simcore_test::component_x!(test.manager, 10, test1, simcore_test::Test1A), Some(11000));
    assert_eq!(simcore_test::component_x!(test.manager, 30, test1, simcore_test::Test1A), Some(11100));
}

#[test]
fn local_subscribers_run_in_component_type_order() {
    init();
    let test = TestManager::new();
    // Test2A has the higher type id, so Test1A hears first whatever the
    // order the template lists them in.
    test.add_entity_with(10, &[("Test2A", None), ("Test1A", None)]);
    take_deliveries();

    test.manager.post_message(10, &MessageTurnStart);

    assert_eq!(
        take_deliveries(),
        vec![
            delivery(10, "Test1A", "TurnStart", false),
            delivery(10, "Test2A", "TurnStart", false),
        ]
    );
}

#[test]
fn create_is_posted_after_construction() {
    init();
    let test = TestManager::new();
    let runtime = test.runtime.clone();
    let created = Rc::new(RefCell::new(Vec::new()));
    let log = created.clone();
    let class = runtime.define_class(TestClass::new().method("OnCreate", move |call| {
        log.borrow_mut().push(call.entity());
        Ok(ScriptValue::Undefined)
    }));
    let interface = test.manager.lookup_interface_id("UnknownScript").unwrap();
    test.manager
        .register_script_component_type(interface, "Creator", class)
        .unwrap();

    test.add_entity_with(44, &[("Creator", None)]);

    assert_eq!(*created.borrow(), vec![44]);
}

#[test]
fn script_global_handlers_ignore_local_entities() {
    init();
    let test = TestManager::new();
    let heard = Rc::new(RefCell::new(Vec::new()));
    let log = heard.clone();
    let class = test
        .runtime
        .define_class(TestClass::new().method("OnGlobalPing", move |call| {
            log.borrow_mut().push(call.entity());
            Ok(ScriptValue::Undefined)
        }));
    let interface = test.manager.lookup_interface_id("UnknownScript").unwrap();
    test.manager
        .register_script_component_type(interface, "Listener", class)
        .unwrap();

    test.add_template(
        "listener",
        ParamNode::new()
            .with_child("Listener", ParamNode::new())
            .with_child("Test2A", ParamNode::new()),
    );
    let replicated = test.manager.add_entity_auto("listener").unwrap();
    let local = test.manager.add_local_entity("listener").unwrap();
    take_deliveries();

    test.manager.broadcast_message(&ping(&test));
    assert_eq!(*heard.borrow(), vec![replicated]);
    // Native global handlers still see both.
    assert_eq!(
        take_deliveries(),
        vec![
            delivery(replicated, "Test2A", PING, true),
            delivery(local, "Test2A", PING, true),
        ]
    );

    heard.borrow_mut().clear();
    test.manager.post_message(local, &ping(&test));
    assert!(heard.borrow().is_empty());
    assert_eq!(take_deliveries().len(), 2);

    // Only the target decides: a message about a replicated entity reaches
    // every global script instance.
    test.manager.post_message(replicated, &ping(&test));
    assert_eq!(*heard.borrow(), vec![replicated, local]);
}

#[test]
fn dynamic_subscriptions_apply_from_the_next_delivery() {
    init();
    let test = TestManager::new();
    let manager = &test.manager;
    test.add_template(
        "leader",
        ParamNode::new().with_child(
            "TestDynamic",
            ParamNode::new().with_child("peer", ParamNode::leaf("20")),
        ),
    );
    test.add_template(
        "follower",
        ParamNode::new().with_child("TestDynamic", ParamNode::new()),
    );
    manager.add_entity("leader", 10).unwrap();
    manager.add_entity("follower", 20).unwrap();
    let dynamic = manager.lookup_component_type_id("TestDynamic").unwrap();
    let interface = manager.lookup_interface_id("TestDynamic").unwrap();
    let received = |entity| {
        manager
            .query_interface(entity, interface)
            .and_then(|component| component.with::<TestDynamic, _>(|component| component.received))
    };

    let interpolate = MessageInterpolate {
        delta_sim_time: 0.1,
        offset: 0.5,
        delta_real_time: 0.016,
    };

    // No static subscribers.
    manager.broadcast_message(&interpolate);
    assert_eq!(received(10), Some(0));

    manager.dynamic_subscription_nonsync(MT_INTERPOLATE, ComponentKey::new(10, dynamic), true);
    take_deliveries();
    manager.broadcast_message(&interpolate);
    // Entity 10 subscribed its peer while the message was being delivered.
    assert_eq!(received(10), Some(1));
    assert_eq!(received(20), Some(0));

    manager.broadcast_message(&interpolate);
    assert_eq!(received(10), Some(2));
    assert_eq!(received(20), Some(1));

    manager.dynamic_subscription_nonsync(MT_INTERPOLATE, ComponentKey::new(10, dynamic), false);
    manager.broadcast_message(&interpolate);
    assert_eq!(received(10), Some(2));
    assert_eq!(received(20), Some(2));

    let log = take_deliveries();
    assert!(log.iter().all(|delivery| delivery.message == "Interpolate" && !delivery.global));
}

#[test]
fn dynamic_subscribers_are_dropped_with_their_entity() {
    init();
    let test = TestManager::new();
    let manager = &test.manager;
    test.add_template(
        "dynamic",
        ParamNode::new().with_child("TestDynamic", ParamNode::new()),
    );
    manager.add_entity("dynamic", 10).unwrap();
    let dynamic = manager.lookup_component_type_id("TestDynamic").unwrap();
    manager.dynamic_subscription_nonsync(MT_INTERPOLATE, ComponentKey::new(10, dynamic), true);

    manager.destroy_components_soon(10);
    manager.flush_destroyed_components();
    manager.add_entity("dynamic", 10).unwrap();
    take_deliveries();

    manager.broadcast_message(&MessageInterpolate {
        delta_sim_time: 0.0,
        offset: 0.0,
        delta_real_time: 0.0,
    });
    assert!(take_deliveries().is_empty());
}

#[test]
fn script_handler_receives_messages_it_posts_to_itself() {
    init();
    let test = TestManager::new();
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();
    let ping_type = test.manager.lookup_message_type_id(PING).unwrap();
    let class = test.runtime.define_class(TestClass::new().method("OnPing", move |call| {
        *counter.borrow_mut() += 1;
        if *counter.borrow() < 3 {
            let echo = ScriptedMessage::new(ping_type, PING, ScriptValue::Null);
            call.manager.post_message(call.entity(), &echo);
        }
        Ok(ScriptValue::Undefined)
    }));
    let interface = test.manager.lookup_interface_id("UnknownScript").unwrap();
    test.manager
        .register_script_component_type(interface, "Echo", class)
        .unwrap();
    test.add_entity_with(10, &[("Echo", None)]);
    test.add_entity_with(20, &[("Test2A", None)]);
    take_deliveries();

    test.manager.post_message(10, &ping(&test));

    assert_eq!(*calls.borrow(), 3);
    assert_eq!(
        take_deliveries(),
        vec![
            delivery(20, "Test2A", PING, true),
            delivery(20, "Test2A", PING, true),
            delivery(20, "Test2A", PING, true),
        ]
    );
}

#[test]
fn script_handler_receives_its_own_broadcast() {
    init();
    let test = TestManager::new();
    let pings = Rc::new(RefCell::new(0));
    let counter = pings.clone();
    let ping_type = test.manager.lookup_message_type_id(PING).unwrap();
    let class = test.runtime.define_class(
        TestClass::new()
            .method("OnUpdate", move |call| {
                let notice = ScriptedMessage::new(ping_type, PING, ScriptValue::Null);
                call.manager.post_message(call.entity(), &notice);
                Ok(ScriptValue::Undefined)
            })
            .method("OnPing", move |_| {
                *counter.borrow_mut() += 1;
                Ok(ScriptValue::Undefined)
            }),
    );
    let interface = test.manager.lookup_interface_id("UnknownScript").unwrap();
    test.manager
        .register_script_component_type(interface, "Notifier", class)
        .unwrap();
    test.add_entity_with(10, &[("Notifier", None)]);
    test.add_entity_with(20, &[("Notifier", None)]);

    test.manager
        .broadcast_message(&MessageUpdate::new(Fixed::from_int(1)));

    assert_eq!(*pings.borrow(), 2);
}
