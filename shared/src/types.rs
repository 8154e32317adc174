use std::{
    fmt,
    ops::{Add, Sub},
};

pub type EntityId = u32;
pub type InterfaceId = u32;
pub type ComponentTypeId = u32;
pub type MessageTypeId = u32;

pub const INVALID_ENTITY: EntityId = 0;
pub const SYSTEM_ENTITY: EntityId = 1;
/// Entities at or above this id (bit 29 set) are local: they never take part
/// in serialization, hashing or cross-replica comparison.
pub const FIRST_LOCAL_ENTITY: EntityId = 0x2000_0000;

pub const INVALID_INTERFACE: InterfaceId = 0;
pub const INVALID_COMPONENT_TYPE: ComponentTypeId = 0;
pub const INVALID_MESSAGE_TYPE: MessageTypeId = 0;

pub fn is_local_entity(entity: EntityId) -> bool {
    entity & FIRST_LOCAL_ENTITY != 0
}

/// Identifies one component instance: the entity it is attached to and its
/// concrete component type. Ordered by entity first, then type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey {
    pub entity: EntityId,
    pub component_type: ComponentTypeId,
}

impl ComponentKey {
    pub fn new(entity: EntityId, component_type: ComponentTypeId) -> Self {
        Self {
            entity,
            component_type,
        }
    }
}

/// Signed 16.16 fixed-point number, the deterministic arithmetic type of the
/// simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fixed(i32);

impl Fixed {
    pub const FRACTIONAL_BITS: u32 = 16;
    pub const ZERO: Fixed = Fixed(0);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn from_int(value: i32) -> Self {
        Self(value << Self::FRACTIONAL_BITS)
    }

    /// Milliseconds to seconds, truncating toward zero like a fixed division.
    pub fn from_millis(millis: u32) -> Self {
        let raw = (i64::from(millis) << Self::FRACTIONAL_BITS) / 1000;
        Self(raw as i32)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub fn to_int_round_to_zero(self) -> i32 {
        if self.0 >= 0 {
            self.0 >> Self::FRACTIONAL_BITS
        } else {
            -((-self.0) >> Self::FRACTIONAL_BITS)
        }
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / f64::from(1u32 << Self::FRACTIONAL_BITS)
    }
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_sub(rhs.0))
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", simcore_serde::Number::Fixed(self.0))
    }
}
