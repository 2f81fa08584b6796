use tracing::{debug, info};

use super::input::InputAction;
use crate::town::{InteractionEvent, Session, Size, Teammate, TickReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Neighborhood,
    Preview,
}

impl SceneKey {
    pub fn other(self) -> Self {
        match self {
            SceneKey::Neighborhood => SceneKey::Preview,
            SceneKey::Preview => SceneKey::Neighborhood,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
}

/// Input delivered at a tick boundary, in the order the window produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(InputAction),
    Released(InputAction),
    /// Focus moved away or the window was hidden; every held key is dropped.
    FocusLost,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    quit_requested: bool,
    switch_scene_pressed: bool,
    events: Vec<InputEvent>,
    zoom_delta_steps: i32,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        switch_scene_pressed: bool,
        events: Vec<InputEvent>,
        zoom_delta_steps: i32,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            switch_scene_pressed,
            events,
            zoom_delta_steps,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn switch_scene_pressed(&self) -> bool {
        self.switch_scene_pressed
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn with_event(mut self, event: InputEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_switch_scene_pressed(mut self, switch_scene_pressed: bool) -> Self {
        self.switch_scene_pressed = switch_scene_pressed;
        self
    }

    pub fn with_zoom_delta_steps(mut self, zoom_delta_steps: i32) -> Self {
        self.zoom_delta_steps = zoom_delta_steps;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn zoom_delta_steps(&self) -> i32 {
        self.zoom_delta_steps
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn viewport(&self) -> Size {
        Size::new(self.window_width as f32, self.window_height as f32)
    }
}

/// State a mounted scene exposes to the runtime and renderer.
#[derive(Debug, Default)]
pub struct SceneWorld {
    session: Option<Session>,
    roster: Vec<Teammate>,
    last_report: Option<TickReport>,
}

impl SceneWorld {
    pub fn mount(&mut self, session: Session, roster: Vec<Teammate>) {
        self.session = Some(session);
        self.roster = roster;
        self.last_report = None;
    }

    pub fn unmount(&mut self) {
        self.session = None;
        self.roster.clear();
        self.last_report = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn roster(&self) -> &[Teammate] {
        &self.roster
    }

    pub fn last_report(&self) -> Option<&TickReport> {
        self.last_report.as_ref()
    }

    /// Feeds the snapshot's key transitions and wheel zoom into the session.
    /// Returns the interaction events in press order.
    pub fn apply_input(&mut self, input: &InputSnapshot) -> Vec<InteractionEvent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        let mut emitted = Vec::new();
        for event in input.events() {
            match *event {
                InputEvent::Pressed(action) => {
                    if let Some(interaction) = session.key_down(action, &self.roster) {
                        emitted.push(interaction);
                    }
                }
                InputEvent::Released(action) => session.key_up(action),
                InputEvent::FocusLost => {
                    session.clear_held_keys();
                    debug!("held_keys_cleared_on_focus_loss");
                }
            }
        }
        session.apply_zoom_steps(input.zoom_delta_steps());
        emitted
    }

    pub fn tick(&mut self, viewport: Size) -> Option<&TickReport> {
        let session = self.session.as_mut()?;
        let report = session.tick(&self.roster, viewport);
        self.last_report = Some(report);
        self.last_report.as_ref()
    }

    /// Input then one tick against the snapshot's window size.
    pub fn advance(&mut self, input: &InputSnapshot) -> Vec<InteractionEvent> {
        let emitted = self.apply_input(input);
        self.tick(input.viewport());
        emitted
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(&mut self, input: &InputSnapshot, world: &mut SceneWorld) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.is_loaded = true;
    }

    fn unload(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload(&mut self.world);
        self.world.unmount();
        self.is_loaded = false;
    }
}

/// Two views, one active. Leaving a view unloads it, so nothing it owned
/// survives the switch.
pub(crate) struct SceneMachine {
    neighborhood: SceneRuntime,
    preview: SceneRuntime,
    active_scene: SceneKey,
}

impl SceneMachine {
    pub(crate) fn new(
        neighborhood: Box<dyn Scene>,
        preview: Box<dyn Scene>,
        active_scene: SceneKey,
    ) -> Self {
        Self {
            neighborhood: SceneRuntime {
                scene: neighborhood,
                world: SceneWorld::default(),
                is_loaded: false,
            },
            preview: SceneRuntime {
                scene: preview,
                world: SceneWorld::default(),
                is_loaded: false,
            },
            active_scene,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn load_active(&mut self) {
        self.active_runtime_mut().load();
    }

    pub(crate) fn update_active(&mut self, input: &InputSnapshot) -> SceneCommand {
        let runtime = self.active_runtime_mut();
        runtime.scene.update(input, &mut runtime.world)
    }

    pub(crate) fn active_world(&self) -> &SceneWorld {
        &self.active_runtime_ref().world
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        let runtime = self.active_runtime_ref();
        runtime.scene.debug_title(&runtime.world)
    }

    pub(crate) fn switch_to(&mut self, next_scene: SceneKey) -> bool {
        if self.active_scene == next_scene {
            return false;
        }

        let previous = self.active_scene;
        self.active_runtime_mut().unload();
        info!(scene = ?previous, "scene_unloaded");
        self.active_scene = next_scene;
        self.active_runtime_mut().load();
        info!(scene = ?next_scene, "scene_loaded");
        true
    }

    pub(crate) fn shutdown_all(&mut self) {
        self.neighborhood.unload();
        self.preview.unload();
    }

    fn active_runtime_mut(&mut self) -> &mut SceneRuntime {
        match self.active_scene {
            SceneKey::Neighborhood => &mut self.neighborhood,
            SceneKey::Preview => &mut self.preview,
        }
    }

    fn active_runtime_ref(&self) -> &SceneRuntime {
        match self.active_scene {
            SceneKey::Neighborhood => &self.neighborhood,
            SceneKey::Preview => &self.preview,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::town::{EngineConfig, TeammateId, Vec2, WorldTable};

    fn roster() -> Vec<Teammate> {
        vec![Teammate {
            id: TeammateId("me".to_string()),
            name: "Me".to_string(),
            house_position: Vec2::new(100.0, 100.0),
            is_player: true,
        }]
    }

    fn mounted_world() -> SceneWorld {
        let mut session = Session::new(
            EngineConfig::default(),
            WorldTable::new(Size::new(1000.0, 1000.0), Vec::new()),
        );
        let roster = roster();
        session.spawn_from_roster(&roster);
        let mut world = SceneWorld::default();
        world.mount(session, roster);
        world
    }

    #[derive(Default)]
    struct Lifecycle {
        loads: usize,
        unloads: usize,
    }

    struct TestScene {
        lifecycle: Rc<RefCell<Lifecycle>>,
    }

    impl Scene for TestScene {
        fn load(&mut self, world: &mut SceneWorld) {
            self.lifecycle.borrow_mut().loads += 1;
            let roster = roster();
            let mut session = Session::new(
                EngineConfig::default(),
                WorldTable::new(Size::new(1000.0, 1000.0), Vec::new()),
            );
            session.spawn_from_roster(&roster);
            world.mount(session, roster);
        }

        fn update(&mut self, input: &InputSnapshot, world: &mut SceneWorld) -> SceneCommand {
            world.advance(input);
            SceneCommand::None
        }

        fn unload(&mut self, _world: &mut SceneWorld) {
            self.lifecycle.borrow_mut().unloads += 1;
        }
    }

    fn machine() -> (SceneMachine, Rc<RefCell<Lifecycle>>, Rc<RefCell<Lifecycle>>) {
        let first = Rc::new(RefCell::new(Lifecycle::default()));
        let second = Rc::new(RefCell::new(Lifecycle::default()));
        let machine = SceneMachine::new(
            Box::new(TestScene {
                lifecycle: Rc::clone(&first),
            }),
            Box::new(TestScene {
                lifecycle: Rc::clone(&second),
            }),
            SceneKey::Neighborhood,
        );
        (machine, first, second)
    }

    #[test]
    fn key_transitions_apply_in_event_order() {
        let mut world = mounted_world();
        let input = InputSnapshot::empty()
            .with_event(InputEvent::Pressed(InputAction::MoveRight))
            .with_event(InputEvent::Released(InputAction::MoveRight))
            .with_event(InputEvent::Pressed(InputAction::MoveDown))
            .with_window_size((800, 600));
        world.advance(&input);

        let report = world.last_report().expect("report");
        assert_eq!(report.actor_position, Some(Vec2::new(132.0, 184.0)));
    }

    #[test]
    fn focus_loss_clears_keys_held_before_it() {
        let mut world = mounted_world();
        let input = InputSnapshot::empty()
            .with_event(InputEvent::Pressed(InputAction::MoveDown))
            .with_event(InputEvent::FocusLost);
        world.advance(&input);

        let report = world.last_report().expect("report");
        assert_eq!(report.actor_position, Some(Vec2::new(132.0, 180.0)));
        assert!(!report.is_moving);
    }

    #[test]
    fn interact_press_returns_event() {
        let mut world = mounted_world();
        let input = InputSnapshot::empty().with_event(InputEvent::Pressed(InputAction::Interact));
        assert_eq!(world.advance(&input), vec![InteractionEvent::OpenOwnBoard]);
    }

    #[test]
    fn wheel_steps_change_zoom() {
        let mut world = mounted_world();
        world.apply_input(&InputSnapshot::empty().with_zoom_delta_steps(3));
        let zoom = world.session().expect("session").camera().zoom();
        assert!((zoom - 1.3).abs() < 1e-5);
    }

    #[test]
    fn unmounted_world_ignores_input_and_ticks() {
        let mut world = SceneWorld::default();
        let input = InputSnapshot::empty().with_event(InputEvent::Pressed(InputAction::Interact));
        assert!(world.advance(&input).is_empty());
        assert!(world.last_report().is_none());
    }

    #[test]
    fn switching_unloads_previous_scene_and_discards_its_session() {
        let (mut machine, first, second) = machine();
        machine.load_active();
        machine.update_active(
            &InputSnapshot::empty().with_event(InputEvent::Pressed(InputAction::MoveDown)),
        );
        assert!(machine.active_world().last_report().is_some());

        assert!(machine.switch_to(SceneKey::Preview));
        assert_eq!(first.borrow().unloads, 1);
        assert_eq!(second.borrow().loads, 1);
        assert_eq!(machine.active_scene(), SceneKey::Preview);

        assert!(machine.switch_to(SceneKey::Neighborhood));
        assert_eq!(first.borrow().loads, 2);
        let world = machine.active_world();
        assert!(world.last_report().is_none());
        assert!(!world.session().expect("session").keys_held().any_down());
    }

    #[test]
    fn switching_to_active_scene_is_noop() {
        let (mut machine, first, _) = machine();
        machine.load_active();
        assert!(!machine.switch_to(SceneKey::Neighborhood));
        assert_eq!(first.borrow().loads, 1);
        assert_eq!(first.borrow().unloads, 0);
    }

    #[test]
    fn shutdown_unloads_only_loaded_scenes() {
        let (mut machine, first, second) = machine();
        machine.load_active();
        machine.shutdown_all();
        assert_eq!(first.borrow().unloads, 1);
        assert_eq!(second.borrow().unloads, 0);
        assert!(!machine.active_world().is_mounted());
    }

    #[test]
    fn scene_key_other_flips() {
        assert_eq!(SceneKey::Neighborhood.other(), SceneKey::Preview);
        assert_eq!(SceneKey::Preview.other(), SceneKey::Neighborhood);
    }
}
