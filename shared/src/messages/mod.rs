mod builtin;
mod dynamic_subscription;
mod message;
mod message_kinds;
mod subscriptions;

pub use builtin::{
    MessageCreate, MessageDestroy, MessageInterpolate, MessageRenderSubmit, MessageTurnStart,
    MessageUpdate, MessageUpdateFinal, MessageUpdateMotionFormation, MessageUpdateMotionUnit,
    ScriptedMessage, MT_CREATE, MT_DESTROY, MT_INTERPOLATE, MT_RENDER_SUBMIT, MT_TURN_START,
    MT_UPDATE, MT_UPDATE_FINAL, MT_UPDATE_MOTION_FORMATION, MT_UPDATE_MOTION_UNIT,
    NATIVE_MESSAGE_TYPES,
};
pub use dynamic_subscription::{DynamicSubscription, DynamicSubscriptionTable};
pub use message::Message;
pub use message_kinds::MessageKinds;
pub use subscriptions::MessageSubscriptions;
