use simcore_shared::ScriptValue;
use simcore_test::{TestClass, TestManager};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn schema_defines_every_component_type() {
    init();
    let test = TestManager::new();
    let schema = test.manager.generate_schema();

    assert!(schema.starts_with("<grammar"));
    assert!(schema.ends_with("</grammar>"));
    for (_, name) in test.manager.get_all_component_types() {
        assert!(
            schema.contains(&format!("<define name='component.{}'>", name)),
            "missing {}",
            name
        );
        assert!(schema.contains(&format!("<optional><ref name='component.{}'/></optional>", name)));
    }
    assert!(schema.contains(
        "<define name='component.Test1A'><element name='Test1A'><interleave>\
<optional><element name='x'><data type='integer'/></element></optional>\
</interleave></element></define>"
    ));
    assert!(schema.contains(
        "<define name='interface.Test1'><choice>\
<ref name='component.Test1A'/><ref name='component.Test1B'/><ref name='component.Test1Scripted'/>\
</choice></define>"
    ));
}

#[test]
fn script_types_take_their_schema_from_the_prototype() {
    init();
    let test = TestManager::new();
    let plain = test.runtime.define_class(TestClass::new());
    let described = test.runtime.define_class(
        TestClass::new().property("Schema", ScriptValue::String("<text/>".to_string())),
    );
    let test2 = test.manager.lookup_interface_id("Test2").unwrap();
    test.manager
        .register_script_component_type(test2, "Plain", plain)
        .unwrap();
    test.manager
        .register_script_component_type(test2, "Described", described)
        .unwrap();

    let schema = test.manager.generate_schema();
    assert!(schema.contains("<element name='Plain'><interleave><empty/></interleave></element>"));
    assert!(schema.contains("<element name='Described'><interleave><text/></interleave></element>"));
}

#[test]
fn schema_does_not_depend_on_registration_order() {
    init();
    let a = TestManager::new();
    let b = TestManager::new();
    let test2 = a.manager.lookup_interface_id("Test2").unwrap();
    for (test, names) in [(&a, ["Alpha", "Beta"]), (&b, ["Beta", "Alpha"])] {
        for name in names {
            let class = test.runtime.define_class(TestClass::new());
            test.manager
                .register_script_component_type(test2, name, class)
                .unwrap();
        }
    }

    assert_ne!(
        a.manager.lookup_component_type_id("Alpha"),
        b.manager.lookup_component_type_id("Alpha")
    );
    assert_eq!(a.manager.generate_schema(), b.manager.generate_schema());
}
