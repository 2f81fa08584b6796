mod bootstrap;
mod loop_runner;
mod neighborhood;
mod tuning;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;
