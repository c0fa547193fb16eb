// src/config/scenario.rs

use serde::Deserialize;

/// 連成シナリオ（config/scenario.yaml）
#[derive(Debug, Deserialize, Clone)]
pub struct Scenario {
    pub time_step: f64, // 時間刻み（s）
    pub end_time: f64,  // 終了時刻（s）
    pub oscillators: Vec<OscillatorInstance>,
    pub base_excitation: Excitation, // 最下段の根点変位の加振
    pub load_excitation: Excitation, // 最下段への外力の加振
    pub coupling: CouplingSettings,
}

/// 1自由度振動子の諸元
///
/// oscillators の並び順が連成チェインの積み上げ順になる。
/// 先頭の振動子の根点が基礎、以降は直下の振動子の質点に載る。
#[derive(Debug, Deserialize, Clone)]
pub struct OscillatorInstance {
    pub id: String,
    pub mass: f64,                 // 質量（kg）
    pub stiffness: f64,            // 剛性（N/m）
    pub damping_coefficient: f64,  // 減衰係数（N·s/m）
    pub initial_displacement: f64, // 初期変位（m）
    pub initial_velocity: f64,     // 初期速度（m/s）
}

/// 調和加振 u(t) = amplitude * sin(omega * t)
#[derive(Debug, Deserialize, Clone)]
pub struct Excitation {
    pub amplitude: f64, // 振幅
    pub omega: f64,     // 角振動数（rad/s）
}

/// 連成反復の設定
#[derive(Debug, Deserialize, Clone)]
pub struct CouplingSettings {
    pub max_iterations: usize,  // Gauss-Seidel 反復の上限回数
    pub tolerance: f64,         // 変位増分の収束判定値（絶対値）
    pub relaxation_factor: f64, // 根点変位に掛ける緩和係数（0.0 < ω <= 1.0）
}
