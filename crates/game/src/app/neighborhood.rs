use town_engine::{
    EngineConfig, InputSnapshot, InteractionEvent, NeighborhoodLayout, Scene, SceneCommand,
    SceneKey, SceneWorld, Session,
};
use tracing::info;

/// View adapter: hands its layout and tuning to a fresh session on load and
/// forwards interaction events to the board/panel UI, which lives outside
/// this binary and is represented here by log events.
pub(crate) struct NeighborhoodScene {
    name: &'static str,
    key: SceneKey,
    layout: NeighborhoodLayout,
    config: EngineConfig,
    last_event: Option<InteractionEvent>,
}

impl NeighborhoodScene {
    pub(crate) fn new(
        name: &'static str,
        key: SceneKey,
        layout: NeighborhoodLayout,
        config: EngineConfig,
    ) -> Self {
        Self {
            name,
            key,
            layout,
            config,
            last_event: None,
        }
    }

    fn dispatch(&mut self, event: InteractionEvent) {
        match &event {
            InteractionEvent::OpenOwnBoard => {
                info!(scene = self.name, "open_own_board");
            }
            InteractionEvent::ViewTeammateBoard(teammate) => {
                info!(scene = self.name, teammate = %teammate, "view_teammate_board");
            }
            InteractionEvent::OpenTownHallPanel => {
                info!(scene = self.name, "open_town_hall_panel");
            }
            InteractionEvent::InspectObject(object) => {
                info!(scene = self.name, object = %object, "inspect_object");
            }
        }
        self.last_event = Some(event);
    }
}

impl Scene for NeighborhoodScene {
    fn load(&mut self, world: &mut SceneWorld) {
        let mut session = Session::new(self.config.clone(), self.layout.world.clone());
        session.spawn_from_roster(&self.layout.roster);
        world.mount(session, self.layout.roster.clone());
        self.last_event = None;
        info!(
            scene = self.name,
            objects = self.layout.world.len(),
            teammates = self.layout.roster.len(),
            "scene_loaded"
        );
    }

    fn update(&mut self, input: &InputSnapshot, world: &mut SceneWorld) -> SceneCommand {
        if input.switch_scene_pressed() {
            return SceneCommand::SwitchTo(self.key.other());
        }

        for event in world.advance(input) {
            self.dispatch(event);
        }
        SceneCommand::None
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.last_event = None;
        info!(scene = self.name, "scene_unloaded");
    }

    fn debug_title(&self, world: &SceneWorld) -> Option<String> {
        let report = world.last_report()?;
        let mut title = format!("Team Town [{}]", self.name);
        if let Some(position) = report.actor_position {
            title.push_str(&format!(" | ({:.0}, {:.0})", position.x, position.y));
        }
        title.push_str(&format!(" | zoom {:.1}x", report.camera.zoom));
        if report.prompt.visible {
            title.push_str(&format!(" | {}", report.prompt.message));
        }
        if let Some(event) = &self.last_event {
            title.push_str(&format!(" | last: {}", describe_event(event)));
        }
        Some(title)
    }
}

fn describe_event(event: &InteractionEvent) -> String {
    match event {
        InteractionEvent::OpenOwnBoard => "own board".to_string(),
        InteractionEvent::ViewTeammateBoard(teammate) => format!("board of {teammate}"),
        InteractionEvent::OpenTownHallPanel => "town hall".to_string(),
        InteractionEvent::InspectObject(object) => format!("inspect {object}"),
    }
}
