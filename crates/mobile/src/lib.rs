pub mod logging;
pub mod state;

uniffi::setup_scaffolding!();
