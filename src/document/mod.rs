pub mod model;
pub mod preset;
