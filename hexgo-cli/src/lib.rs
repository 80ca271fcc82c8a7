//! HEXGO CLI - interactive front end for the HEXGO engine

pub mod play;
pub mod render;
