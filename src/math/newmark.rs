// src/math/newmark.rs

use crate::math::error::MathError;

/// Newmark-β 法のスキームパラメータ
///
/// 変位・速度の更新式:
///
/// ```text
/// x_{n+1} = x_n + dt*v_n + (dt^2/2)*[(1-2β)*a_n + 2β*a_{n+1}]
/// v_{n+1} = v_n + dt*[(1-γ)*a_n + γ*a_{n+1}]
/// ```
///
/// 2β >= γ >= 1/2 のとき無条件安定。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewmarkScheme {
    pub beta: f64,
    pub gamma: f64,
}

impl NewmarkScheme {
    /// 平均加速度法（γ = 1/2, β = 1/4、無条件安定・2次精度）
    ///
    /// 線形系では台形則と一致し、非減衰・無負荷の自由振動で
    /// 離散力学的エネルギーを厳密に保存する。
    pub fn average_acceleration() -> Self {
        NewmarkScheme {
            beta: 0.25,
            gamma: 0.5,
        }
    }

    /// 無条件安定領域 2β >= γ >= 1/2 に入っているか
    pub fn is_unconditionally_stable(&self) -> bool {
        self.gamma >= 0.5 && 2.0 * self.beta >= self.gamma
    }
}

/// 時間刻みから一度だけ導出される積分係数
///
/// 毎ステップ再計算する必要はないため、初期化時に導出して保持する。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewmarkCoefficients {
    pub a0: f64, // 1 / (β dt^2)
    pub a1: f64, // γ / (β dt)
    pub a2: f64, // 1 / (β dt)
    pub a3: f64, // 1 / (2β) - 1
    pub a4: f64, // γ/β - 1
    pub a5: f64, // (dt/2) * (γ/β - 2)
    pub a6: f64, // dt * (1 - γ)
    pub a7: f64, // γ dt
}

impl NewmarkCoefficients {
    /// スキームと時間刻みから係数を導出する
    ///
    /// # 引数
    /// - `scheme`: Newmark-β 法のパラメータ
    /// - `dt`: 時間刻み（s）
    ///
    /// # 戻り値
    /// - 導出済みの積分係数
    pub fn derive(scheme: &NewmarkScheme, dt: f64) -> Self {
        let beta = scheme.beta;
        let gamma = scheme.gamma;
        NewmarkCoefficients {
            a0: 1.0 / (beta * dt * dt),
            a1: gamma / (beta * dt),
            a2: 1.0 / (beta * dt),
            a3: 1.0 / (2.0 * beta) - 1.0,
            a4: gamma / beta - 1.0,
            a5: (dt / 2.0) * (gamma / beta - 2.0),
            a6: dt * (1.0 - gamma),
            a7: gamma * dt,
        }
    }
}

/// 1自由度系 m*a + c*v + k*x = f の1ステップ解
///
/// 前ステップの確定状態 (x_prev, v_prev, a_prev) と外力 f から、
/// Newmark-β 法の a-form 漸化式で次ステップの状態を求める。
///
/// # 引数
/// - `coeffs`: 導出済みの積分係数
/// - `mass`, `damping`, `stiffness`: 系の定数（m, c, k）
/// - `x_prev`, `v_prev`, `a_prev`: 前ステップの変位・速度・加速度
/// - `force`: 現ステップの外力 f（根点変位の寄与を含む合計値）
///
/// # 戻り値
/// - 次ステップの (変位, 速度, 加速度)
pub fn solve_step(
    coeffs: &NewmarkCoefficients,
    mass: f64,
    damping: f64,
    stiffness: f64,
    x_prev: f64,
    v_prev: f64,
    a_prev: f64,
    force: f64,
) -> Result<(f64, f64, f64), MathError> {
    // 有効剛性 k_eff = k + a0*m + a1*c
    let k_eff = stiffness + coeffs.a0 * mass + coeffs.a1 * damping;
    if k_eff.abs() < f64::EPSILON {
        return Err(MathError::SingularEffectiveStiffness);
    }

    // 有効荷重
    let f_eff = force
        + mass * (coeffs.a0 * x_prev + coeffs.a2 * v_prev + coeffs.a3 * a_prev)
        + damping * (coeffs.a1 * x_prev + coeffs.a4 * v_prev + coeffs.a5 * a_prev);

    let x_next = f_eff / k_eff;
    let a_next = coeffs.a0 * (x_next - x_prev) - coeffs.a2 * v_prev - coeffs.a3 * a_prev;
    let v_next = v_prev + coeffs.a6 * a_prev + coeffs.a7 * a_next;

    if !x_next.is_finite() || !v_next.is_finite() || !a_next.is_finite() {
        return Err(MathError::NonFiniteResult);
    }

    Ok((x_next, v_next, a_next))
}
