// src/models/variables.rs

use std::collections::VecDeque;
use std::str::FromStr;

use crate::models::error::SolverError;

/// 連成で交換するスカラー変数の識別子
///
/// 外部との交換境界では名前（`FromStr`）で対応づけ、
/// 内部では文字列ではなくこの列挙型でアクセスする。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouplingVariable {
    RootPointDisplacement,
    Load,
    Displacement,
    Reaction,
}

impl CouplingVariable {
    /// 交換プロトコル上の変数名
    pub fn name(&self) -> &'static str {
        match self {
            CouplingVariable::RootPointDisplacement => "ROOT_POINT_DISPLACEMENT",
            CouplingVariable::Load => "LOAD",
            CouplingVariable::Displacement => "DISPLACEMENT",
            CouplingVariable::Reaction => "REACTION",
        }
    }
}

impl FromStr for CouplingVariable {
    type Err = SolverError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "ROOT_POINT_DISPLACEMENT" => Ok(CouplingVariable::RootPointDisplacement),
            "LOAD" => Ok(CouplingVariable::Load),
            "DISPLACEMENT" => Ok(CouplingVariable::Displacement),
            "REACTION" => Ok(CouplingVariable::Reaction),
            _ => Err(SolverError::UnknownVariable(name.to_string())),
        }
    }
}

/// 1ステップ分の連成変数値
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepValues {
    pub root_point_displacement: f64,
    pub load: f64,
    pub displacement: f64,
    pub reaction: f64,
}

impl StepValues {
    fn get(&self, variable: CouplingVariable) -> f64 {
        match variable {
            CouplingVariable::RootPointDisplacement => self.root_point_displacement,
            CouplingVariable::Load => self.load,
            CouplingVariable::Displacement => self.displacement,
            CouplingVariable::Reaction => self.reaction,
        }
    }

    fn set(&mut self, variable: CouplingVariable, value: f64) {
        match variable {
            CouplingVariable::RootPointDisplacement => self.root_point_displacement = value,
            CouplingVariable::Load => self.load = value,
            CouplingVariable::Displacement => self.displacement = value,
            CouplingVariable::Reaction => self.reaction = value,
        }
    }
}

/// 解ステップ履歴バッファ
///
/// 先頭（インデックス0）が現ステップ、以降が過去の確定ステップ。
/// `advance` で現スロットを複製して新しい現ステップを作り、
/// 保持段数を超えた最古のスロットを捨てる。
#[derive(Debug, Clone)]
pub struct SolutionStepBuffer {
    steps: VecDeque<StepValues>,
}

impl SolutionStepBuffer {
    /// 保持段数分のゼロ初期化されたスロットを持つバッファを作る
    pub fn new(buffer_size: usize) -> Self {
        let mut steps = VecDeque::with_capacity(buffer_size);
        for _ in 0..buffer_size {
            steps.push_back(StepValues::default());
        }
        SolutionStepBuffer { steps }
    }

    /// 保持段数
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// ステップの確定: 現スロットを複製して新しい現ステップとする
    pub fn advance(&mut self) {
        if let Some(front) = self.steps.front().copied() {
            self.steps.push_front(front);
            self.steps.pop_back();
        }
    }

    /// 変数値の取得
    ///
    /// # 引数
    /// - `variable`: 連成変数
    /// - `step_index`: 0 = 現ステップ、n = nステップ前
    pub fn get(&self, variable: CouplingVariable, step_index: usize) -> Result<f64, SolverError> {
        match self.steps.get(step_index) {
            Some(values) => Ok(values.get(variable)),
            None => Err(SolverError::OutOfRange {
                index: step_index,
                buffer_size: self.steps.len(),
            }),
        }
    }

    /// 変数値の格納
    pub fn set(
        &mut self,
        variable: CouplingVariable,
        value: f64,
        step_index: usize,
    ) -> Result<(), SolverError> {
        let buffer_size = self.steps.len();
        match self.steps.get_mut(step_index) {
            Some(values) => {
                values.set(variable, value);
                Ok(())
            }
            None => Err(SolverError::OutOfRange {
                index: step_index,
                buffer_size,
            }),
        }
    }
}
