use std::{collections::BTreeMap, rc::Rc};

use log::error;
use simcore_serde::{SerdeErr, StateDeserializer, StateSerializer};

use crate::{
    script::{deserialize_script_value, serialize_script_value},
    Component, ComponentContext, Message, ParamNode, ScriptObject, ScriptRuntime, ScriptValue,
};

// Set by the manager on every instance; rebuilt on load, so never serialized.
const ENTITY_PROPERTY: &str = "entity";
const TEMPLATE_PROPERTY: &str = "template";

/// Native adapter hosting a script implementation of an interface.
///
/// Methods are looked up by name on every call, so a hot-reloaded prototype
/// takes effect immediately.
pub struct ScriptedComponent {
    runtime: Rc<dyn ScriptRuntime>,
    object: Option<ScriptObject>,
}

/// [`AllocFn`](crate::AllocFn) for script wrapper types.
pub fn alloc_scripted_component(
    runtime: &Rc<dyn ScriptRuntime>,
    object: Option<ScriptObject>,
) -> Box<dyn Component> {
    Box::new(ScriptedComponent::new(runtime.clone(), object))
}

impl ScriptedComponent {
    pub fn new(runtime: Rc<dyn ScriptRuntime>, object: Option<ScriptObject>) -> Self {
        Self { runtime, object }
    }

    fn call_if_present(&self, ctx: &ComponentContext, method: &str, args: &[ScriptValue]) {
        let Some(object) = self.object else {
            return;
        };
        if !self.runtime.has_method(object, method) {
            return;
        }
        if let Err(err) = self
            .runtime
            .call_method(ctx.manager(), object, method, args)
        {
            error!(
                "Script call to {} failed on entity {}: {}",
                method,
                ctx.entity(),
                err
            );
        }
    }

    fn set_identity(&self, object: ScriptObject, ctx: &ComponentContext, param: &ParamNode) {
        self.runtime.set_property(
            object,
            ENTITY_PROPERTY,
            ScriptValue::Int(ctx.entity() as i32),
        );
        self.runtime
            .set_property(object, TEMPLATE_PROPERTY, param.to_script_value());
    }

    fn has_null_serialize(&self, object: ScriptObject) -> bool {
        matches!(
            self.runtime.get_property(object, "Serialize"),
            Some(ScriptValue::Null)
        )
    }

    fn state_value(&self, ctx: &ComponentContext, object: ScriptObject) -> ScriptValue {
        if self.runtime.has_method(object, "Serialize") {
            return match self
                .runtime
                .call_method(ctx.manager(), object, "Serialize", &[])
            {
                Ok(value) => value,
                Err(err) => {
                    error!("Script Serialize call failed on entity {}: {}", ctx.entity(), err);
                    ScriptValue::Undefined
                }
            };
        }
        let mut properties = BTreeMap::new();
        for name in self.runtime.property_names(object) {
            if name == ENTITY_PROPERTY || name == TEMPLATE_PROPERTY {
                continue;
            }
            if let Some(value) = self.runtime.get_property(object, &name) {
                properties.insert(name, value);
            }
        }
        ScriptValue::Object(properties)
    }
}

impl Component for ScriptedComponent {
    fn init(&mut self, ctx: &ComponentContext, param: &ParamNode) {
        let Some(object) = self.object else {
            return;
        };
        self.set_identity(object, ctx, param);
        self.call_if_present(ctx, "Init", &[]);
    }

    fn deinit(&mut self, ctx: &ComponentContext) {
        self.call_if_present(ctx, "Deinit", &[]);
    }

    fn handle_message(&mut self, ctx: &ComponentContext, message: &dyn Message, global: bool) {
        if let Some(handler) = self.script_handler() {
            handler.handle_message(ctx, message, global);
        }
    }

    fn serialize(&self, ctx: &ComponentContext, serializer: &mut dyn StateSerializer) {
        let Some(object) = self.object else {
            return;
        };
        if !self.runtime.has_method(object, "Serialize") && self.has_null_serialize(object) {
            return;
        }
        let value = self.state_value(ctx, object);
        serialize_script_value("object", &value, serializer);
    }

    fn deserialize(
        &mut self,
        ctx: &ComponentContext,
        param: &ParamNode,
        deserializer: &mut dyn StateDeserializer,
    ) -> Result<(), SerdeErr> {
        let Some(object) = self.object else {
            return Ok(());
        };
        self.set_identity(object, ctx, param);

        let has_custom_deserialize = self.runtime.has_method(object, "Deserialize");
        if !self.runtime.has_method(object, "Serialize") && self.has_null_serialize(object) {
            // Nothing was written; give the script a chance to rebuild itself.
            if has_custom_deserialize {
                self.call_if_present(ctx, "Deserialize", &[ScriptValue::Undefined]);
            }
            return Ok(());
        }

        let value = deserialize_script_value("object", deserializer)?;
        if has_custom_deserialize {
            self.call_if_present(ctx, "Deserialize", &[value]);
        } else if let ScriptValue::Object(properties) = value {
            for (name, value) in properties {
                self.runtime.set_property(object, &name, value);
            }
        }
        Ok(())
    }

    fn script_object(&self) -> Option<ScriptObject> {
        self.object
    }

    fn script_handler(&self) -> Option<ScriptHandler> {
        self.object.map(|object| ScriptHandler {
            runtime: self.runtime.clone(),
            object,
        })
    }
}

/// Runs message handlers on a script object without borrowing the component
/// that owns it, so a handler can receive messages it posts itself.
#[derive(Clone)]
pub struct ScriptHandler {
    runtime: Rc<dyn ScriptRuntime>,
    object: ScriptObject,
}

impl ScriptHandler {
    pub fn handle_message(&self, ctx: &ComponentContext, message: &dyn Message, global: bool) {
        let method = if global {
            message.global_handler_name()
        } else {
            message.handler_name()
        };
        let args = [message.to_script_value()];
        if let Err(err) = self
            .runtime
            .call_method(ctx.manager(), self.object, &method, &args)
        {
            error!(
                "Script message handler {} failed on entity {}: {}",
                method,
                ctx.entity(),
                err
            );
        }
    }
}

impl Drop for ScriptedComponent {
    fn drop(&mut self) {
        if let Some(object) = self.object.take() {
            self.runtime.release_object(object);
        }
    }
}
