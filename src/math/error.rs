// src/math/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MathError {
    #[error("有効剛性がゼロに近すぎます。")]
    SingularEffectiveStiffness,
    #[error("時間積分の結果が有限値ではありません。")]
    NonFiniteResult,
    // 他の数値計算エラーを追加可能
}
