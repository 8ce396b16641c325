pub mod supervisor;
pub mod ipc;
pub mod config;
pub mod python_env;
pub mod process_monitor;
pub mod utils;
