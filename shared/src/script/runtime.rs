use crate::{world::ComponentManager, ScriptError, ScriptValue};

/// Handle to a script object owned by a [`ScriptRuntime`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptObject(pub u64);

/// Handle to a script constructor (a class registered by a script).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptConstructor(pub u64);

/// The embedded scripting engine, seen from the component manager.
///
/// Every method takes `&self`: scripts call back into the manager (register
/// types, post messages, create entities) while one of these calls is still
/// running, so implementations must not hold internal borrows across calls
/// into script code. Calls that may run script code receive the manager so
/// the script can reach it.
pub trait ScriptRuntime {
    /// Evaluates a script file. The script typically registers interfaces,
    /// message types and component types through `manager`.
    fn load_script(
        &self,
        manager: &ComponentManager,
        path: &str,
        source: &str,
    ) -> Result<(), ScriptError>;

    fn has_function(&self, name: &str) -> bool;

    fn call_function(
        &self,
        manager: &ComponentManager,
        name: &str,
        args: &[ScriptValue],
    ) -> Result<ScriptValue, ScriptError>;

    /// Runs `constructor` and returns the new, rooted object.
    fn construct(
        &self,
        manager: &ComponentManager,
        constructor: ScriptConstructor,
    ) -> Result<ScriptObject, ScriptError>;

    /// Whether `object` has a callable `method`, own or inherited.
    fn has_method(&self, object: ScriptObject, method: &str) -> bool;

    fn call_method(
        &self,
        manager: &ComponentManager,
        object: ScriptObject,
        method: &str,
        args: &[ScriptValue],
    ) -> Result<ScriptValue, ScriptError>;

    /// Reads a data property, own or inherited.
    fn get_property(&self, object: ScriptObject, name: &str) -> Option<ScriptValue>;

    fn set_property(&self, object: ScriptObject, name: &str, value: ScriptValue);

    /// Own enumerable data properties, sorted by name.
    fn property_names(&self, object: ScriptObject) -> Vec<String>;

    /// Names of the methods defined on the constructor's prototype.
    fn prototype_method_names(
        &self,
        constructor: ScriptConstructor,
    ) -> Result<Vec<String>, ScriptError>;

    fn prototype_property(&self, constructor: ScriptConstructor, name: &str)
        -> Option<ScriptValue>;

    /// Swaps the prototype of a live object, used when a component type is
    /// hot-reloaded.
    fn set_prototype(&self, object: ScriptObject, constructor: ScriptConstructor);

    /// Unroots an object; the handle must not be used afterwards.
    fn release_object(&self, object: ScriptObject);

    fn set_global(&self, name: &str, value: ScriptValue);

    /// Copies a value produced by another runtime into this one.
    fn clone_value_from(&self, value: &ScriptValue) -> ScriptValue {
        value.clone()
    }

    fn incremental_gc(&self) {}

    fn shrinking_gc(&self) {}
}
