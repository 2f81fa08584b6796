mod layout;

pub use layout::{
    load_layout, parse_layout, report_spawn_blocked, LayoutError, LayoutErrorCode,
    NeighborhoodLayout, SourceLocation, SpawnBlocker,
};
