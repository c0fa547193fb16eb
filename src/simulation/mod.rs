// src/simulation/mod.rs

pub mod csv;
pub mod framework;
pub mod load_parameters;

use crate::models::SdofSolver;

/// 連成シミュレーションの全体状態を表す構造体
pub struct SimulationState {
    pub solvers: Vec<SdofSolver>, // チェイン順（先頭が基礎側）のソルバ列
    pub time: f64,                // 現在時刻（s）
}

/// 1連成ステップの記録（CSV出力用）
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub time: f64,
    pub iterations: usize, // 収束までの Gauss-Seidel 反復回数
    pub oscillators: Vec<OscillatorRecord>,
}

/// 振動子1体分のステップ記録
#[derive(Debug, Clone)]
pub struct OscillatorRecord {
    pub id: String,
    pub displacement: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub reaction: f64,
}
