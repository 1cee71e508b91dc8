pub mod environment;
pub mod launch;
pub mod physical_config;
pub mod propulsion;
