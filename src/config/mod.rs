// src/config/mod.rs

pub mod parameters;
pub mod scenario;

pub use parameters::NumericalParameters;
pub use parameters::OutputParameters;
pub use parameters::SdofSolverSettings;
pub use scenario::CouplingSettings;
pub use scenario::Excitation;
pub use scenario::OscillatorInstance;
pub use scenario::Scenario;
