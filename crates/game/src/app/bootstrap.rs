use std::path::Path;

use thiserror::Error;
use town_engine::{
    load_layout, report_spawn_blocked, resolve_app_paths, EngineConfig, LayoutError, LoopConfig,
    Scene, SceneKey, StartupError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::neighborhood::NeighborhoodScene;
use super::tuning::{load_tuning, TuningError};

const NEIGHBORHOOD_LAYOUT_FILE: &str = "neighborhood.xml";
const PREVIEW_LAYOUT_FILE: &str = "preview.xml";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) neighborhood: Box<dyn Scene>,
    pub(crate) preview: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Tuning(#[from] TuningError),
    #[error("failed to load layout: {0}")]
    Layout(#[from] LayoutError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Team Town Startup ===");

    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        assets_dir = %app_paths.assets_dir.display(),
        "startup"
    );

    let engine_config = load_tuning(&app_paths.assets_dir)?;
    let (neighborhood, preview) = build_scene_pair(&app_paths.assets_dir, &engine_config)?;

    Ok(AppWiring {
        config: LoopConfig::default(),
        neighborhood,
        preview,
    })
}

fn build_scene_pair(
    assets_dir: &Path,
    engine_config: &EngineConfig,
) -> Result<(Box<dyn Scene>, Box<dyn Scene>), LayoutError> {
    let neighborhood_path = assets_dir.join(NEIGHBORHOOD_LAYOUT_FILE);
    let preview_path = assets_dir.join(PREVIEW_LAYOUT_FILE);
    let neighborhood_layout = load_layout(&neighborhood_path)?;
    let preview_layout = load_layout(&preview_path)?;
    let actor_size = engine_config.actor_size();
    report_spawn_blocked(&neighborhood_path, &neighborhood_layout, actor_size);
    report_spawn_blocked(&preview_path, &preview_layout, actor_size);

    let neighborhood = NeighborhoodScene::new(
        "neighborhood",
        SceneKey::Neighborhood,
        neighborhood_layout,
        engine_config.clone(),
    );
    let preview = NeighborhoodScene::new(
        "preview",
        SceneKey::Preview,
        preview_layout,
        engine_config.clone(),
    );
    Ok((Box::new(neighborhood), Box::new(preview)))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
