// src/math/relaxation.rs

/// 定数緩和（constant under-relaxation）
///
/// 連成反復で交換値をそのまま渡すと発散しやすいため、
/// 前回反復値と新しい候補値を係数 factor で混合する。
///
/// # 引数
/// - `previous`: 前回反復での交換値
/// - `candidate`: 今回反復で得られた候補値
/// - `factor`: 緩和係数（0.0 < factor <= 1.0、1.0 で緩和なし）
///
/// # 戻り値
/// - 緩和後の交換値
pub fn relax(previous: f64, candidate: f64, factor: f64) -> f64 {
    factor * candidate + (1.0 - factor) * previous
}
