//! Ripple Pond - an interactive GPU water surface.
//!
//! A heightfield is advanced by a damped wave equation in a compute shader,
//! disturbed by pointer presses, and drawn as a lit water mesh.

pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod gpu;
pub mod headless;
pub mod simulation;
