use crate::{types::MessageTypeId, AsAny, ScriptValue};

/// A message delivered to components.
///
/// Scripts see a message through its handler names (`On<Name>` for local
/// delivery, `OnGlobal<Name>` for global delivery) and its script value.
pub trait Message: AsAny {
    fn message_type(&self) -> MessageTypeId;

    fn name(&self) -> &str;

    fn handler_name(&self) -> String {
        format!("On{}", self.name())
    }

    fn global_handler_name(&self) -> String {
        format!("OnGlobal{}", self.name())
    }

    fn to_script_value(&self) -> ScriptValue;
}

impl dyn Message {
    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.as_any().downcast_ref::<M>()
    }
}
