// src/models/sdof.rs

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::config::{OscillatorInstance, SdofSolverSettings};
use crate::math::{solve_step, NewmarkCoefficients, NewmarkScheme};
use crate::models::error::SolverError;
use crate::models::variables::{CouplingVariable, SolutionStepBuffer};

/// 1自由度系 m*a + c*v + k*(x - u_root) = F の物理定数
///
/// 初期化後は不変。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SdofParameters {
    pub mass: f64,                // 質量（kg）
    pub stiffness: f64,           // 剛性（N/m）
    pub damping_coefficient: f64, // 減衰係数（N·s/m）
    pub time_step: f64,           // 時間刻み（s）
}

/// 振動子の物理状態
///
/// `*_prev` は直近に確定したステップの値で、`advance_in_time` でのみ
/// 上書きされる。`solve_solution_step` は現ステップの値だけを書き換える。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SdofState {
    pub displacement: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub displacement_prev: f64,
    pub velocity_prev: f64,
    pub acceleration_prev: f64,
}

impl SdofState {
    fn at_rest() -> Self {
        SdofState {
            displacement: 0.0,
            velocity: 0.0,
            acceleration: 0.0,
            displacement_prev: 0.0,
            velocity_prev: 0.0,
            acceleration_prev: 0.0,
        }
    }

    /// 現ステップの値を確定済み履歴として引き継ぐ
    fn commit(&mut self) {
        self.displacement_prev = self.displacement;
        self.velocity_prev = self.velocity;
        self.acceleration_prev = self.acceleration;
    }
}

/// 1自由度の減衰調和振動子ソルバ
///
/// 外部の連成ドライバから
/// `advance_in_time` → `set_solution_step_value` → `solve_solution_step`
/// → `get_solution_step_value` → `output_solution_step`
/// の順に1ステップずつ駆動される。根点変位と外力を受け取り、
/// 変位と反力を返す。
pub struct SdofSolver {
    id: String,
    params: SdofParameters,
    initial_displacement: f64,
    initial_velocity: f64,
    scheme: NewmarkScheme,
    buffer_size: usize,
    write_output_file: bool,
    file_prefix: String,
    coeffs: Option<NewmarkCoefficients>,
    state: SdofState,
    data: SolutionStepBuffer,
    time: f64,
    initialized: bool,
    stepping: bool,
    output: Option<BufWriter<File>>,
}

impl SdofSolver {
    /// シナリオの振動子定義と数値設定からソルバを組み立てる
    ///
    /// 検証と積分係数の導出は `initialize` で行う。
    pub fn new(
        instance: &OscillatorInstance,
        settings: &SdofSolverSettings,
        time_step: f64,
    ) -> Self {
        SdofSolver {
            id: instance.id.clone(),
            params: SdofParameters {
                mass: instance.mass,
                stiffness: instance.stiffness,
                damping_coefficient: instance.damping_coefficient,
                time_step,
            },
            initial_displacement: instance.initial_displacement,
            initial_velocity: instance.initial_velocity,
            scheme: NewmarkScheme {
                beta: settings.numerical.beta,
                gamma: settings.numerical.gamma,
            },
            buffer_size: settings.numerical.buffer_size,
            write_output_file: settings.output.write_output_file,
            file_prefix: settings.output.file_prefix.clone(),
            coeffs: None,
            state: SdofState::at_rest(),
            data: SolutionStepBuffer::new(0),
            time: 0.0,
            initialized: false,
            stepping: false,
            output: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn state(&self) -> &SdofState {
        &self.state
    }

    /// 定数の検証と初期状態の確立
    ///
    /// 物理定数・時間刻み・スキーム・保持段数を検証し、
    /// 積分係数を導出して初期状態（初期加速度は動的平衡から）を設定する。
    pub fn initialize(&mut self) -> Result<(), SolverError> {
        let p = &self.params;
        if !(p.mass.is_finite() && p.mass > 0.0) {
            return Err(SolverError::Configuration(format!(
                "質量は正の有限値でなければなりません: {}",
                p.mass
            )));
        }
        if !(p.stiffness.is_finite() && p.stiffness > 0.0) {
            return Err(SolverError::Configuration(format!(
                "剛性は正の有限値でなければなりません: {}",
                p.stiffness
            )));
        }
        if !(p.damping_coefficient.is_finite() && p.damping_coefficient >= 0.0) {
            return Err(SolverError::Configuration(format!(
                "減衰係数は非負の有限値でなければなりません: {}",
                p.damping_coefficient
            )));
        }
        if !(p.time_step.is_finite() && p.time_step > 0.0) {
            return Err(SolverError::Configuration(format!(
                "時間刻みは正の有限値でなければなりません: {}",
                p.time_step
            )));
        }
        if self.scheme.beta <= 0.0 || !self.scheme.is_unconditionally_stable() {
            return Err(SolverError::Configuration(format!(
                "Newmarkパラメータが無条件安定領域 2β >= γ >= 1/2 の外です: β = {}, γ = {}",
                self.scheme.beta, self.scheme.gamma
            )));
        }
        if self.buffer_size < 1 {
            return Err(SolverError::Configuration(
                "保持段数は1以上でなければなりません".to_string(),
            ));
        }

        self.coeffs = Some(NewmarkCoefficients::derive(&self.scheme, p.time_step));
        self.data = SolutionStepBuffer::new(self.buffer_size);

        // 初期状態。初期加速度は運動方程式を初期時刻で満たすように決める。
        let x0 = self.initial_displacement;
        let v0 = self.initial_velocity;
        let u0 = self.data.get(CouplingVariable::RootPointDisplacement, 0)?;
        let f0 = self.data.get(CouplingVariable::Load, 0)?;
        let a0 = (f0 + p.stiffness * (u0 - x0) - p.damping_coefficient * v0) / p.mass;

        self.state = SdofState {
            displacement: x0,
            velocity: v0,
            acceleration: a0,
            displacement_prev: x0,
            velocity_prev: v0,
            acceleration_prev: a0,
        };
        self.data.set(CouplingVariable::Displacement, x0, 0)?;
        self.data
            .set(CouplingVariable::Reaction, p.stiffness * (x0 - u0), 0)?;

        if self.write_output_file {
            let path = format!("{}_{}.dat", self.file_prefix, self.id);
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            writeln!(writer, "# time displacement velocity acceleration reaction")?;
            self.output = Some(writer);
        }

        self.time = 0.0;
        self.initialized = true;
        self.stepping = false;
        Ok(())
    }

    /// ステップの確定と時刻の前進
    ///
    /// 前ステップの状態を履歴として確定し、時刻を1刻み進めて返す。
    /// 連成1ステップにつき、`solve_solution_step` の前に一度だけ呼ぶ。
    pub fn advance_in_time(&mut self, current_time: f64) -> Result<f64, SolverError> {
        if !self.initialized {
            return Err(SolverError::State(
                "advance_in_time の前に initialize を呼ぶ必要があります".to_string(),
            ));
        }
        self.state.commit();
        self.data.advance();
        self.time = current_time + self.params.time_step;
        self.stepping = true;
        Ok(self.time)
    }

    /// 連成変数値の格納
    pub fn set_solution_step_value(
        &mut self,
        variable: CouplingVariable,
        value: f64,
        step_index: usize,
    ) -> Result<(), SolverError> {
        if !self.initialized {
            return Err(SolverError::State(
                "set_solution_step_value の前に initialize を呼ぶ必要があります".to_string(),
            ));
        }
        self.data.set(variable, value, step_index)
    }

    /// 連成変数値の取得
    pub fn get_solution_step_value(
        &self,
        variable: CouplingVariable,
        step_index: usize,
    ) -> Result<f64, SolverError> {
        if !self.initialized {
            return Err(SolverError::State(
                "get_solution_step_value の前に initialize を呼ぶ必要があります".to_string(),
            ));
        }
        self.data.get(variable, step_index)
    }

    /// 現ステップの解の計算
    ///
    /// 確定済みの前ステップ状態と現ステップの連成入力
    /// （根点変位・外力）から新しい変位・速度・加速度を求め、
    /// 反力 R = k*(x - u_root) をバッファへ書き戻す。
    /// `*_prev` には触れないため、同一ステップ内で入力を入れ替えて
    /// 繰り返し呼んでも同じ基準状態から再計算される。
    pub fn solve_solution_step(&mut self) -> Result<(), SolverError> {
        if !self.initialized {
            return Err(SolverError::State(
                "solve_solution_step の前に initialize を呼ぶ必要があります".to_string(),
            ));
        }
        if !self.stepping {
            return Err(SolverError::State(
                "solve_solution_step の前に advance_in_time を呼ぶ必要があります".to_string(),
            ));
        }
        let coeffs = self.coeffs.ok_or_else(|| {
            SolverError::State("積分係数が導出されていません".to_string())
        })?;

        let u_root = self.data.get(CouplingVariable::RootPointDisplacement, 0)?;
        let load = self.data.get(CouplingVariable::Load, 0)?;
        let p = &self.params;

        // m*a + c*v + k*x = F + k*u_root（根点変位はばねを介して作用する）
        let force = load + p.stiffness * u_root;
        let (x, v, a) = solve_step(
            &coeffs,
            p.mass,
            p.damping_coefficient,
            p.stiffness,
            self.state.displacement_prev,
            self.state.velocity_prev,
            self.state.acceleration_prev,
            force,
        )?;

        self.state.displacement = x;
        self.state.velocity = v;
        self.state.acceleration = a;

        self.data.set(CouplingVariable::Displacement, x, 0)?;
        self.data.set(
            CouplingVariable::Reaction,
            p.stiffness * (x - u_root),
            0,
        )?;
        Ok(())
    }

    /// 現ステップの状態を時刻歴ファイルへ追記する
    ///
    /// 数値状態には一切影響しない。出力が無効なら何もしない。
    pub fn output_solution_step(&mut self) -> Result<(), SolverError> {
        if !self.initialized {
            return Err(SolverError::State(
                "output_solution_step の前に initialize を呼ぶ必要があります".to_string(),
            ));
        }
        let reaction = self.data.get(CouplingVariable::Reaction, 0)?;
        if let Some(writer) = &mut self.output {
            writeln!(
                writer,
                "{:.6e} {:.6e} {:.6e} {:.6e} {:.6e}",
                self.time,
                self.state.displacement,
                self.state.velocity,
                self.state.acceleration,
                reaction
            )?;
        }
        Ok(())
    }
}
