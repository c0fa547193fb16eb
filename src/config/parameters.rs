// src/config/parameters.rs

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct NumericalParameters {
    pub beta: f64, // Newmark β パラメータ
    pub gamma: f64, // Newmark γ パラメータ
    pub buffer_size: usize, // 解ステップ履歴の保持段数（1以上）
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputParameters {
    pub write_output_file: bool, // ソルバごとの時刻歴ファイルを書くか
    pub file_prefix: String,     // 出力ファイル名の接頭辞
}

/// SDOFソルバの数値設定（config/sdof_parameters.yaml）
#[derive(Debug, Deserialize, Clone)]
pub struct SdofSolverSettings {
    pub numerical: NumericalParameters,
    pub output: OutputParameters,
}
