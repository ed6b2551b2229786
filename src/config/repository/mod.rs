//! Table-level access for the configuration database

pub mod local_storage;
pub mod settings;
