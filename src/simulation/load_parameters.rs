// src/simulation/load_parameters.rs

use serde_yaml::from_reader;
use std::error::Error;
use std::fs::File;

use crate::config::{scenario::Scenario, SdofSolverSettings};

/// SDOFソルバ設定の読み込み
pub fn load_sdof_solver_settings(path: &str) -> Result<SdofSolverSettings, Box<dyn Error>> {
    let file = File::open(path)?;
    let settings: SdofSolverSettings = from_reader(file)?;
    Ok(settings)
}

/// シナリオの読み込み
pub fn load_scenario(path: &str) -> Result<Scenario, Box<dyn Error>> {
    let file = File::open(path)?;
    let scenario: Scenario = from_reader(file)?;
    Ok(scenario)
}
