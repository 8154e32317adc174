pub mod test_components;
pub mod test_replica_factory;
pub mod test_template_manager;
pub mod test_vfs;

pub use scratch_dir::ScratchDir;
pub use test_components::{
    record_hook, take_deliveries, test_catalog, Delivery, Test1A, Test1B, Test2A, TestComponentsPlugin,
    TestDynamic, TestHidden, TestLink, TestLossy, TestPosition, PING,
};
pub use test_manager::TestManager;
pub use test_replica_factory::TestReplicaFactory;
pub use test_script_runtime::{
    registry_error, ScriptCall, ScriptFunction, ScriptSource, TestClass, TestScriptRuntime,
};
pub use test_scripts::{counter_class, counter_value, define_counter_sources, script_property};
pub use test_template_manager::TestTemplateManager;
pub use test_vfs::TestVfs;

/// Reads the `x` field of a native test component.
#[macro_export]
macro_rules! component_x {
    ($manager:expr, $entity:expr, $interface:expr, $ty:ty) => {
        $manager
            .query_interface($entity, $interface)
            .and_then(|component| component.with::<$ty, _>(|component| component.x))
    };
}
