//! file formats the hosting tool reads and writes
pub mod properties;
pub mod yaml;
