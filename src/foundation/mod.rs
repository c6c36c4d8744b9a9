pub mod cancel;
pub mod core;
pub mod error;
pub mod process;
pub mod rng;
