use std::{cell::RefCell, rc::Rc};

use simcore_shared::{
    alloc_scripted_component, CatalogPlugin, Component, ComponentContext, ComponentManager,
    EntityId, Message, NativeCatalog, NativeComponentType, ParamNode, RegistryError, ScriptObject,
    ScriptRuntime, SerdeErr, StateDeserializer, StateSerializer, MT_DESTROY, MT_INTERPOLATE,
    MT_TURN_START, MT_UPDATE, MT_UPDATE_FINAL,
};

/// Custom message type registered by the test catalog.
pub const PING: &str = "Ping";

/// One message delivery observed by a test component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub entity: EntityId,
    pub component: &'static str,
    pub message: String,
    pub global: bool,
}

thread_local! {
    static DELIVERIES: RefCell<Vec<Delivery>> = const { RefCell::new(Vec::new()) };
}

fn record(ctx: &ComponentContext, component: &'static str, message: &dyn Message, global: bool) {
    let delivery = Delivery {
        entity: ctx.entity(),
        component,
        message: message.name().to_string(),
        global,
    };
    DELIVERIES.with(|deliveries| deliveries.borrow_mut().push(delivery));
}

/// Records a call into a non-component hook (pathfinder, AI) in the same
/// log as message deliveries.
pub fn record_hook(hook: &'static str, event: &str) {
    let delivery = Delivery {
        entity: 0,
        component: hook,
        message: event.to_string(),
        global: false,
    };
    DELIVERIES.with(|deliveries| deliveries.borrow_mut().push(delivery));
}

/// Deliveries recorded on this thread since the previous call.
pub fn take_deliveries() -> Vec<Delivery> {
    DELIVERIES.with(|deliveries| std::mem::take(&mut *deliveries.borrow_mut()))
}

fn init_x(param: &ParamNode, default: i32) -> i32 {
    param.child("x").and_then(ParamNode::to_i32).unwrap_or(default)
}

fn ping_id(manager: &ComponentManager) -> Result<u32, RegistryError> {
    manager
        .lookup_message_type_id(PING)
        .ok_or(RegistryError::UnknownMessageType { message_type: 0 })
}

// Test1A

/// Implements `Test1`. Counts turns and pings.
pub struct Test1A {
    pub x: i32,
}

impl Test1A {
    fn alloc(_: &Rc<dyn ScriptRuntime>, _: Option<ScriptObject>) -> Box<dyn Component> {
        Box::new(Self { x: 0 })
    }

    fn class_init(manager: &ComponentManager) -> Result<(), RegistryError> {
        manager.subscribe_to_message_type(MT_TURN_START)?;
        manager.subscribe_to_message_type(MT_UPDATE)?;
        manager.subscribe_to_message_type(ping_id(manager)?)
    }
}

impl Component for Test1A {
    fn init(&mut self, _ctx: &ComponentContext, param: &ParamNode) {
        self.x = init_x(param, 11000);
    }

    fn handle_message(&mut self, ctx: &ComponentContext, message: &dyn Message, global: bool) {
        record(ctx, "Test1A", message, global);
        match message.message_type() {
            MT_TURN_START => self.x += 1,
            MT_UPDATE => self.x += 10,
            _ if message.name() == PING => self.x += 100,
            _ => {}
        }
    }

    fn serialize(&self, _ctx: &ComponentContext, serializer: &mut dyn StateSerializer) {
        serializer.number_i32_unbounded("x", self.x);
    }

    fn deserialize(
        &mut self,
        _ctx: &ComponentContext,
        _param: &ParamNode,
        deserializer: &mut dyn StateDeserializer,
    ) -> Result<(), SerdeErr> {
        self.x = deserializer.number_i32_unbounded("x")?;
        Ok(())
    }
}

// Test1B

/// Alternative implementation of `Test1`.
pub struct Test1B {
    pub x: i32,
}

impl Test1B {
    fn alloc(_: &Rc<dyn ScriptRuntime>, _: Option<ScriptObject>) -> Box<dyn Component> {
        Box::new(Self { x: 0 })
    }

    fn class_init(manager: &ComponentManager) -> Result<(), RegistryError> {
        manager.subscribe_to_message_type(MT_UPDATE)
    }
}

impl Component for Test1B {
    fn init(&mut self, _ctx: &ComponentContext, param: &ParamNode) {
        self.x = init_x(param, 12000);
    }

    fn handle_message(&mut self, ctx: &ComponentContext, message: &dyn Message, global: bool) {
        record(ctx, "Test1B", message, global);
        if message.message_type() == MT_UPDATE {
            self.x += 20;
        }
    }

    fn serialize(&self, _ctx: &ComponentContext, serializer: &mut dyn StateSerializer) {
        serializer.number_i32_unbounded("x", self.x);
    }

    fn deserialize(
        &mut self,
        _ctx: &ComponentContext,
        _param: &ParamNode,
        deserializer: &mut dyn StateDeserializer,
    ) -> Result<(), SerdeErr> {
        self.x = deserializer.number_i32_unbounded("x")?;
        Ok(())
    }
}

// Test2A

/// Implements `Test2`. Listens to pings sent to any entity.
pub struct Test2A {
    pub x: i32,
}

impl Test2A {
    fn alloc(_: &Rc<dyn ScriptRuntime>, _: Option<ScriptObject>) -> Box<dyn Component> {
        Box::new(Self { x: 0 })
    }

    fn class_init(manager: &ComponentManager) -> Result<(), RegistryError> {
        manager.subscribe_to_message_type(MT_TURN_START)?;
        manager.subscribe_to_message_type(MT_UPDATE_FINAL)?;
        manager.subscribe_globally_to_message_type(ping_id(manager)?)
    }
}

impl Component for Test2A {
    fn init(&mut self, _ctx: &ComponentContext, param: &ParamNode) {
        self.x = init_x(param, 21000);
    }

    fn handle_message(&mut self, ctx: &ComponentContext, message: &dyn Message, global: bool) {
        record(ctx, "Test2A", message, global);
        match message.message_type() {
            MT_TURN_START => self.x += 50,
            MT_UPDATE_FINAL => self.x += 500,
            _ => {}
        }
    }

    fn serialize(&self, _ctx: &ComponentContext, serializer: &mut dyn StateSerializer) {
        serializer.number_i32_unbounded("x", self.x);
    }

    fn deserialize(
        &mut self,
        _ctx: &ComponentContext,
        _param: &ParamNode,
        deserializer: &mut dyn StateDeserializer,
    ) -> Result<(), SerdeErr> {
        self.x = deserializer.number_i32_unbounded("x")?;
        Ok(())
    }
}

// Position

/// Named like the type the quick hash looks at by default.
pub struct TestPosition {
    pub x: i32,
    pub z: i32,
}

impl TestPosition {
    fn alloc(_: &Rc<dyn ScriptRuntime>, _: Option<ScriptObject>) -> Box<dyn Component> {
        Box::new(Self { x: 0, z: 0 })
    }
}

impl Component for TestPosition {
    fn init(&mut self, _ctx: &ComponentContext, param: &ParamNode) {
        self.x = init_x(param, 0);
        self.z = param.child("z").and_then(ParamNode::to_i32).unwrap_or_default();
    }

    fn serialize(&self, _ctx: &ComponentContext, serializer: &mut dyn StateSerializer) {
        serializer.number_i32_unbounded("x", self.x);
        serializer.number_i32_unbounded("z", self.z);
    }

    fn deserialize(
        &mut self,
        _ctx: &ComponentContext,
        _param: &ParamNode,
        deserializer: &mut dyn StateDeserializer,
    ) -> Result<(), SerdeErr> {
        self.x = deserializer.number_i32_unbounded("x")?;
        self.z = deserializer.number_i32_unbounded("z")?;
        Ok(())
    }
}

// TestLink

/// Destroys its `target` entity when its own entity is destroyed.
pub struct TestLink {
    pub target: EntityId,
}

impl TestLink {
    fn alloc(_: &Rc<dyn ScriptRuntime>, _: Option<ScriptObject>) -> Box<dyn Component> {
        Box::new(Self { target: 0 })
    }

    fn class_init(manager: &ComponentManager) -> Result<(), RegistryError> {
        manager.subscribe_to_message_type(MT_DESTROY)
    }
}

impl Component for TestLink {
    fn init(&mut self, _ctx: &ComponentContext, param: &ParamNode) {
        self.target = param
            .child("target")
            .and_then(ParamNode::to_i32)
            .unwrap_or_default() as EntityId;
    }

    fn handle_message(&mut self, ctx: &ComponentContext, message: &dyn Message, global: bool) {
        record(ctx, "TestLink", message, global);
        if message.message_type() == MT_DESTROY && self.target != 0 {
            ctx.manager().destroy_components_soon(self.target);
        }
    }

    fn serialize(&self, _ctx: &ComponentContext, serializer: &mut dyn StateSerializer) {
        serializer.number_u32_unbounded("target", self.target);
    }

    fn deserialize(
        &mut self,
        _ctx: &ComponentContext,
        _param: &ParamNode,
        deserializer: &mut dyn StateDeserializer,
    ) -> Result<(), SerdeErr> {
        self.target = deserializer.number_u32_unbounded("target")?;
        Ok(())
    }
}

// TestDynamic

/// Receives `Interpolate` only through runtime subscriptions. On delivery
/// it subscribes its `peer` entity's `TestDynamic`.
pub struct TestDynamic {
    pub peer: EntityId,
    pub received: u32,
}

impl TestDynamic {
    fn alloc(_: &Rc<dyn ScriptRuntime>, _: Option<ScriptObject>) -> Box<dyn Component> {
        Box::new(Self {
            peer: 0,
            received: 0,
        })
    }
}

impl Component for TestDynamic {
    fn init(&mut self, _ctx: &ComponentContext, param: &ParamNode) {
        self.peer = param
            .child("peer")
            .and_then(ParamNode::to_i32)
            .unwrap_or_default() as EntityId;
    }

    fn handle_message(&mut self, ctx: &ComponentContext, message: &dyn Message, global: bool) {
        record(ctx, "TestDynamic", message, global);
        if message.message_type() != MT_INTERPOLATE {
            return;
        }
        self.received += 1;
        if self.peer != 0 {
            let peer = simcore_shared::ComponentKey::new(self.peer, ctx.component_type());
            ctx.manager()
                .dynamic_subscription_nonsync(MT_INTERPOLATE, peer, true);
        }
    }

    fn serialize(&self, _ctx: &ComponentContext, serializer: &mut dyn StateSerializer) {
        serializer.number_u32_unbounded("peer", self.peer);
    }

    fn deserialize(
        &mut self,
        _ctx: &ComponentContext,
        _param: &ParamNode,
        deserializer: &mut dyn StateDeserializer,
    ) -> Result<(), SerdeErr> {
        self.peer = deserializer.number_u32_unbounded("peer")?;
        Ok(())
    }
}

// TestHidden

/// Keeps a counter outside its serialized state, so turns replayed from a
/// deserialized copy diverge.
pub struct TestHidden {
    pub x: i32,
    hidden: i32,
}

impl TestHidden {
    fn alloc(_: &Rc<dyn ScriptRuntime>, _: Option<ScriptObject>) -> Box<dyn Component> {
        Box::new(Self { x: 0, hidden: 0 })
    }

    fn class_init(manager: &ComponentManager) -> Result<(), RegistryError> {
        manager.subscribe_to_message_type(MT_UPDATE)
    }
}

impl Component for TestHidden {
    fn init(&mut self, _ctx: &ComponentContext, param: &ParamNode) {
        self.x = init_x(param, 0);
    }

    fn handle_message(&mut self, _ctx: &ComponentContext, message: &dyn Message, _global: bool) {
        if message.message_type() == MT_UPDATE {
            self.hidden += 1;
            self.x += self.hidden;
        }
    }

    fn serialize(&self, _ctx: &ComponentContext, serializer: &mut dyn StateSerializer) {
        serializer.number_i32_unbounded("x", self.x);
    }

    fn deserialize(
        &mut self,
        _ctx: &ComponentContext,
        _param: &ParamNode,
        deserializer: &mut dyn StateDeserializer,
    ) -> Result<(), SerdeErr> {
        self.x = deserializer.number_i32_unbounded("x")?;
        Ok(())
    }
}

// TestLossy

/// Does not read back what it wrote.
pub struct TestLossy {
    pub x: i32,
}

impl TestLossy {
    fn alloc(_: &Rc<dyn ScriptRuntime>, _: Option<ScriptObject>) -> Box<dyn Component> {
        Box::new(Self { x: 0 })
    }
}

impl Component for TestLossy {
    fn init(&mut self, _ctx: &ComponentContext, param: &ParamNode) {
        self.x = init_x(param, 0);
    }

    fn serialize(&self, _ctx: &ComponentContext, serializer: &mut dyn StateSerializer) {
        serializer.number_i32_unbounded("x", self.x);
    }

    fn deserialize(
        &mut self,
        _ctx: &ComponentContext,
        _param: &ParamNode,
        deserializer: &mut dyn StateDeserializer,
    ) -> Result<(), SerdeErr> {
        self.x = deserializer.number_i32_unbounded("x")? + 1;
        Ok(())
    }
}

/// Interfaces, the `Ping` message type, the native test components and a
/// script wrapper for `Test1`, `Test2` and script-only interfaces.
pub struct TestComponentsPlugin;

impl CatalogPlugin for TestComponentsPlugin {
    fn build(&self, catalog: &mut NativeCatalog) {
        catalog
            .add_interface("Test1")
            .add_interface("Test2")
            .add_interface("Position")
            .add_interface("TestLink")
            .add_interface("TestDynamic")
            .add_interface("TestHidden")
            .add_interface("TestLossy")
            .add_interface("UnknownScript")
            .add_message_type(PING)
            .add_component_type(
                NativeComponentType::native("Test1A", "Test1", Test1A::alloc)
                    .with_class_init(Test1A::class_init)
                    .with_schema("<optional><element name='x'><data type='integer'/></element></optional>"),
            )
            .add_component_type(
                NativeComponentType::native("Test1B", "Test1", Test1B::alloc)
                    .with_class_init(Test1B::class_init),
            )
            .add_component_type(
                NativeComponentType::native("Test2A", "Test2", Test2A::alloc)
                    .with_class_init(Test2A::class_init),
            )
            .add_component_type(NativeComponentType::native(
                "Position",
                "Position",
                TestPosition::alloc,
            ))
            .add_component_type(
                NativeComponentType::native("TestLink", "TestLink", TestLink::alloc)
                    .with_class_init(TestLink::class_init),
            )
            .add_component_type(NativeComponentType::native(
                "TestDynamic",
                "TestDynamic",
                TestDynamic::alloc,
            ))
            .add_component_type(
                NativeComponentType::native("TestHidden", "TestHidden", TestHidden::alloc)
                    .with_class_init(TestHidden::class_init),
            )
            .add_component_type(NativeComponentType::native(
                "TestLossy",
                "TestLossy",
                TestLossy::alloc,
            ))
            .add_component_type(NativeComponentType::script_wrapper(
                "Test1Scripted",
                "Test1",
                alloc_scripted_component,
            ))
            .add_component_type(NativeComponentType::script_wrapper(
                "Test2Scripted",
                "Test2",
                alloc_scripted_component,
            ))
            .add_component_type(NativeComponentType::script_wrapper(
                "UnknownScript",
                "UnknownScript",
                alloc_scripted_component,
            ));
    }
}

pub fn test_catalog() -> NativeCatalog {
    NativeCatalog::builder()
        .add_plugin(TestComponentsPlugin)
        .build()
}
