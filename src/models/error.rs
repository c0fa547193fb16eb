// src/models/error.rs

use crate::math::error::MathError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("設定が不正です: {0}")]
    Configuration(String),
    #[error("呼び出し順序が不正です: {0}")]
    State(String),
    #[error("未知の連成変数名です: {0}")]
    UnknownVariable(String),
    #[error("履歴インデックス {index} が保持段数 {buffer_size} を超えています。")]
    OutOfRange { index: usize, buffer_size: usize },
    #[error(transparent)]
    Math(#[from] MathError),
    #[error("出力ファイルの操作に失敗しました: {0}")]
    Io(#[from] std::io::Error),
}
