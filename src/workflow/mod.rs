//! Wizard steps as library operations. Each takes its stores and a backend
//! explicitly; the binary is a thin adapter over these.

pub mod assembler;
pub mod chapters;
pub mod outline;
pub mod planner;
pub mod progress;
pub mod research;
pub mod templates;
