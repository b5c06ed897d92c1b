//! # Particle Simulation Pipeline
//!
//! Runs an experiment as three cooperating roles over a shared frame store:
//! a compiler that integrates frames, a renderer that emits them in order and
//! paces the compiler, and a discarder that frees frames once emitted.

mod compiler;
mod discarder;
pub mod error;
pub mod flow;
pub mod params;
mod renderer;
pub mod simulation;
pub mod sink;
pub mod state;
pub mod store;

pub use compiler::CompileReport;
pub use error::*;
pub use flow::*;
pub use params::*;
pub use renderer::RenderReport;
pub use simulation::*;
pub use sink::*;
pub use state::*;
pub use store::*;
