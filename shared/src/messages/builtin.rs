use std::collections::BTreeMap;

use crate::{
    types::{EntityId, Fixed, MessageTypeId},
    Message, ScriptValue,
};

pub const MT_TURN_START: MessageTypeId = 1;
pub const MT_UPDATE: MessageTypeId = 2;
pub const MT_UPDATE_MOTION_FORMATION: MessageTypeId = 3;
pub const MT_UPDATE_MOTION_UNIT: MessageTypeId = 4;
pub const MT_UPDATE_FINAL: MessageTypeId = 5;
pub const MT_CREATE: MessageTypeId = 6;
pub const MT_DESTROY: MessageTypeId = 7;
pub const MT_INTERPOLATE: MessageTypeId = 8;
pub const MT_RENDER_SUBMIT: MessageTypeId = 9;

/// Message types every manager knows, in id order. Script-registered types
/// are numbered after these.
pub const NATIVE_MESSAGE_TYPES: [(MessageTypeId, &str); 9] = [
    (MT_TURN_START, "TurnStart"),
    (MT_UPDATE, "Update"),
    (MT_UPDATE_MOTION_FORMATION, "Update_MotionFormation"),
    (MT_UPDATE_MOTION_UNIT, "Update_MotionUnit"),
    (MT_UPDATE_FINAL, "Update_Final"),
    (MT_CREATE, "Create"),
    (MT_DESTROY, "Destroy"),
    (MT_INTERPOLATE, "Interpolate"),
    (MT_RENDER_SUBMIT, "RenderSubmit"),
];

fn object<const N: usize>(fields: [(&str, ScriptValue); N]) -> ScriptValue {
    ScriptValue::Object(
        fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn fixed_value(value: Fixed) -> ScriptValue {
    ScriptValue::Number(value.to_f64())
}

/// Broadcast at the start of every turn.
#[derive(Clone, Debug, Default)]
pub struct MessageTurnStart;

impl Message for MessageTurnStart {
    fn message_type(&self) -> MessageTypeId {
        MT_TURN_START
    }

    fn name(&self) -> &str {
        "TurnStart"
    }

    fn to_script_value(&self) -> ScriptValue {
        object([])
    }
}

macro_rules! turn_length_message {
    ($(#[$meta:meta])* $ty:ident, $id:expr, $name:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $ty {
            pub turn_length: Fixed,
        }

        impl $ty {
            pub fn new(turn_length: Fixed) -> Self {
                Self { turn_length }
            }
        }

        impl Message for $ty {
            fn message_type(&self) -> MessageTypeId {
                $id
            }

            fn name(&self) -> &str {
                $name
            }

            fn to_script_value(&self) -> ScriptValue {
                object([("turnLength", fixed_value(self.turn_length))])
            }
        }
    };
}

turn_length_message!(
    /// The main per-turn update.
    MessageUpdate,
    MT_UPDATE,
    "Update"
);
turn_length_message!(MessageUpdateMotionFormation, MT_UPDATE_MOTION_FORMATION, "Update_MotionFormation");
turn_length_message!(MessageUpdateMotionUnit, MT_UPDATE_MOTION_UNIT, "Update_MotionUnit");
turn_length_message!(
    /// Last update of a turn, before destroyed entities are flushed.
    MessageUpdateFinal,
    MT_UPDATE_FINAL,
    "Update_Final"
);

/// Posted to an entity once all of its template components are initialized.
#[derive(Clone, Debug)]
pub struct MessageCreate {
    pub entity: EntityId,
}

impl Message for MessageCreate {
    fn message_type(&self) -> MessageTypeId {
        MT_CREATE
    }

    fn name(&self) -> &str {
        "Create"
    }

    fn to_script_value(&self) -> ScriptValue {
        object([("entity", ScriptValue::Int(self.entity as i32))])
    }
}

/// Posted to an entity just before its components are destroyed.
#[derive(Clone, Debug)]
pub struct MessageDestroy {
    pub entity: EntityId,
}

impl Message for MessageDestroy {
    fn message_type(&self) -> MessageTypeId {
        MT_DESTROY
    }

    fn name(&self) -> &str {
        "Destroy"
    }

    fn to_script_value(&self) -> ScriptValue {
        object([("entity", ScriptValue::Int(self.entity as i32))])
    }
}

/// Per-frame interpolation between turns. Not part of the synchronized
/// state.
#[derive(Clone, Debug)]
pub struct MessageInterpolate {
    pub delta_sim_time: f32,
    pub offset: f32,
    pub delta_real_time: f32,
}

impl Message for MessageInterpolate {
    fn message_type(&self) -> MessageTypeId {
        MT_INTERPOLATE
    }

    fn name(&self) -> &str {
        "Interpolate"
    }

    fn to_script_value(&self) -> ScriptValue {
        object([
            ("deltaSimTime", ScriptValue::Number(f64::from(self.delta_sim_time))),
            ("offset", ScriptValue::Number(f64::from(self.offset))),
            ("deltaRealTime", ScriptValue::Number(f64::from(self.delta_real_time))),
        ])
    }
}

#[derive(Clone, Debug, Default)]
pub struct MessageRenderSubmit;

impl Message for MessageRenderSubmit {
    fn message_type(&self) -> MessageTypeId {
        MT_RENDER_SUBMIT
    }

    fn name(&self) -> &str {
        "RenderSubmit"
    }

    fn to_script_value(&self) -> ScriptValue {
        object([])
    }
}

/// A message of a script-registered type, carrying script data.
#[derive(Clone, Debug)]
pub struct ScriptedMessage {
    message_type: MessageTypeId,
    name: String,
    data: ScriptValue,
}

impl ScriptedMessage {
    pub fn new(message_type: MessageTypeId, name: impl Into<String>, data: ScriptValue) -> Self {
        Self {
            message_type,
            name: name.into(),
            data,
        }
    }

    pub fn data(&self) -> &ScriptValue {
        &self.data
    }
}

impl Message for ScriptedMessage {
    fn message_type(&self) -> MessageTypeId {
        self.message_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_script_value(&self) -> ScriptValue {
        self.data.clone()
    }
}
