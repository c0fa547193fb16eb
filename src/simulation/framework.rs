// src/simulation/framework.rs

use std::error::Error;

use thiserror::Error as ThisError;

use crate::config::{Excitation, Scenario, SdofSolverSettings};
use crate::math::relax;
use crate::models::{CouplingVariable, SdofSolver, SolverError};
use crate::simulation::{OscillatorRecord, SimulationState, StepRecord};

#[derive(ThisError, Debug)]
pub enum CouplingError {
    #[error("連成反復が収束しませんでした: {iterations} 回反復, 残差 = {residual}")]
    NotConverged { iterations: usize, residual: f64 },
}

/// 調和加振の評価 u(t) = amplitude * sin(omega * t)
pub fn harmonic_excitation(excitation: &Excitation, time: f64) -> f64 {
    excitation.amplitude * (excitation.omega * time).sin()
}

/// 連成システムの初期化
///
/// シナリオの振動子列からソルバのチェインを組み立てて初期化する。
/// 連成設定の検証もここで行う。
pub fn initialize_simulation_state(
    scenario: &Scenario,
    settings: &SdofSolverSettings,
) -> Result<SimulationState, Box<dyn Error>> {
    if scenario.oscillators.is_empty() {
        return Err(SolverError::Configuration(
            "シナリオに振動子が定義されていません".to_string(),
        )
        .into());
    }
    let coupling = &scenario.coupling;
    if coupling.max_iterations < 1 {
        return Err(SolverError::Configuration(
            "連成反復の上限回数は1以上でなければなりません".to_string(),
        )
        .into());
    }
    if !(coupling.tolerance.is_finite() && coupling.tolerance > 0.0) {
        return Err(SolverError::Configuration(format!(
            "収束判定値は正の有限値でなければなりません: {}",
            coupling.tolerance
        ))
        .into());
    }
    if !(coupling.relaxation_factor > 0.0 && coupling.relaxation_factor <= 1.0) {
        return Err(SolverError::Configuration(format!(
            "緩和係数は (0.0, 1.0] の範囲でなければなりません: {}",
            coupling.relaxation_factor
        ))
        .into());
    }

    // 振動子チェインの初期化
    let mut solvers: Vec<SdofSolver> = scenario
        .oscillators
        .iter()
        .map(|instance| SdofSolver::new(instance, settings, scenario.time_step))
        .collect();
    for solver in &mut solvers {
        solver.initialize()?;
    }

    Ok(SimulationState { solvers, time: 0.0 })
}

/// 連成1ステップの実行
///
/// 全ソルバの時刻を進めたあと、Gauss-Seidel 反復で交換値を往復させる。
/// 根点変位は下の振動子の変位（最下段は基礎加振）、荷重は上の振動子の
/// 反力。交換される根点変位には緩和を掛け、変位増分の最大値が
/// 収束判定値を下回ったら確定する。収束しなければ CouplingError を返す。
pub fn execute_coupling_step(
    state: &mut SimulationState,
    scenario: &Scenario,
) -> Result<StepRecord, Box<dyn Error>> {
    let current_time = state.time;
    let mut new_time = current_time;
    for solver in &mut state.solvers {
        new_time = solver.advance_in_time(current_time)?;
    }
    state.time = new_time;

    let base = harmonic_excitation(&scenario.base_excitation, new_time);
    let external_load = harmonic_excitation(&scenario.load_excitation, new_time);
    let coupling = &scenario.coupling;
    let n = state.solvers.len();

    // 反復の初期値は前ステップの確定値（advance が現スロットへ複製済み）
    let mut previous_roots = Vec::with_capacity(n);
    let mut previous_displacements = Vec::with_capacity(n);
    for solver in &state.solvers {
        previous_roots
            .push(solver.get_solution_step_value(CouplingVariable::RootPointDisplacement, 0)?);
        previous_displacements
            .push(solver.get_solution_step_value(CouplingVariable::Displacement, 0)?);
    }

    let mut iterations = 0;
    let mut residual = f64::INFINITY;
    let mut converged = false;
    while iterations < coupling.max_iterations {
        iterations += 1;

        // 基礎側から順に1スイープ
        for i in 0..n {
            let root = if i == 0 {
                base
            } else {
                let candidate =
                    state.solvers[i - 1].get_solution_step_value(CouplingVariable::Displacement, 0)?;
                relax(previous_roots[i], candidate, coupling.relaxation_factor)
            };
            previous_roots[i] = root;

            // 直上の振動子が根点へ及ぼす反力を荷重として受ける
            let feedback = if i + 1 < n {
                state.solvers[i + 1].get_solution_step_value(CouplingVariable::Reaction, 0)?
            } else {
                0.0
            };
            let load = if i == 0 {
                external_load + feedback
            } else {
                feedback
            };

            let solver = &mut state.solvers[i];
            solver.set_solution_step_value(CouplingVariable::RootPointDisplacement, root, 0)?;
            solver.set_solution_step_value(CouplingVariable::Load, load, 0)?;
            solver.solve_solution_step()?;
        }

        // 収束判定: 変位増分の最大値
        residual = 0.0;
        for (i, solver) in state.solvers.iter().enumerate() {
            let x = solver.get_solution_step_value(CouplingVariable::Displacement, 0)?;
            residual = residual.max((x - previous_displacements[i]).abs());
            previous_displacements[i] = x;
        }
        if residual < coupling.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(CouplingError::NotConverged {
            iterations,
            residual,
        }
        .into());
    }

    // 確定したステップの出力
    for solver in &mut state.solvers {
        solver.output_solution_step()?;
    }

    let mut oscillators = Vec::with_capacity(n);
    for solver in &state.solvers {
        let s = solver.state();
        oscillators.push(OscillatorRecord {
            id: solver.id().to_string(),
            displacement: s.displacement,
            velocity: s.velocity,
            acceleration: s.acceleration,
            reaction: solver.get_solution_step_value(CouplingVariable::Reaction, 0)?,
        });
    }

    Ok(StepRecord {
        time: state.time,
        iterations,
        oscillators,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        CouplingSettings, NumericalParameters, OscillatorInstance, OutputParameters,
    };

    fn test_settings() -> SdofSolverSettings {
        SdofSolverSettings {
            numerical: NumericalParameters {
                beta: 0.25,
                gamma: 0.5,
                buffer_size: 2,
            },
            output: OutputParameters {
                write_output_file: false,
                file_prefix: "output/sdof".to_string(),
            },
        }
    }

    fn make_oscillator(id: &str, mass: f64, stiffness: f64, x0: f64) -> OscillatorInstance {
        OscillatorInstance {
            id: id.to_string(),
            mass,
            stiffness,
            damping_coefficient: 0.0,
            initial_displacement: x0,
            initial_velocity: 0.0,
        }
    }

    fn make_scenario(oscillators: Vec<OscillatorInstance>, time_step: f64) -> Scenario {
        Scenario {
            time_step,
            end_time: 1.0,
            oscillators,
            base_excitation: Excitation {
                amplitude: 0.0,
                omega: 0.0,
            },
            load_excitation: Excitation {
                amplitude: 0.0,
                omega: 0.0,
            },
            coupling: CouplingSettings {
                max_iterations: 100,
                tolerance: 1e-12,
                relaxation_factor: 1.0,
            },
        }
    }

    /// 調和加振の評価
    #[test]
    fn test_harmonic_excitation_evaluation() {
        let excitation = Excitation {
            amplitude: 2.0,
            omega: std::f64::consts::FRAC_PI_2,
        };
        assert!(harmonic_excitation(&excitation, 0.0).abs() < 1e-12);
        assert!((harmonic_excitation(&excitation, 1.0) - 2.0).abs() < 1e-12);
    }

    /// 不正な連成設定は初期化時に拒否される
    #[test]
    fn test_invalid_coupling_settings_are_rejected() {
        let settings = test_settings();

        let mut scenario = make_scenario(vec![make_oscillator("a", 1.0, 4.0, 0.0)], 0.1);
        scenario.coupling.relaxation_factor = 0.0;
        assert!(initialize_simulation_state(&scenario, &settings).is_err());

        let mut scenario = make_scenario(vec![make_oscillator("a", 1.0, 4.0, 0.0)], 0.1);
        scenario.coupling.max_iterations = 0;
        assert!(initialize_simulation_state(&scenario, &settings).is_err());

        let mut scenario = make_scenario(vec![make_oscillator("a", 1.0, 4.0, 0.0)], 0.1);
        scenario.coupling.tolerance = -1.0;
        assert!(initialize_simulation_state(&scenario, &settings).is_err());

        let scenario = make_scenario(vec![], 0.1);
        assert!(initialize_simulation_state(&scenario, &settings).is_err());
    }

    /// 単一振動子のチェインは素のソルバ駆動と同じ解になる
    #[test]
    fn test_single_oscillator_step_matches_direct_solver() {
        let settings = test_settings();
        let scenario = make_scenario(vec![make_oscillator("only", 1.0, 4.0, 1.0)], 0.1);

        let mut state = initialize_simulation_state(&scenario, &settings).unwrap();
        let record = execute_coupling_step(&mut state, &scenario).unwrap();

        let mut direct = SdofSolver::new(&scenario.oscillators[0], &settings, 0.1);
        direct.initialize().unwrap();
        direct.advance_in_time(0.0).unwrap();
        direct.solve_solution_step().unwrap();

        assert_eq!(record.oscillators.len(), 1);
        assert_eq!(record.oscillators[0].displacement, direct.state().displacement);
        assert_eq!(record.oscillators[0].velocity, direct.state().velocity);
        // 入力が変わらない2回目のスイープで残差ゼロとなり収束する
        assert_eq!(record.iterations, 2);
    }

    /// 2振動子チェインの交換値が収束時に整合する
    #[test]
    fn test_two_oscillator_chain_exchange_is_consistent() {
        let settings = test_settings();
        let scenario = make_scenario(
            vec![
                make_oscillator("bottom", 1.0, 50.0, 0.1),
                make_oscillator("top", 0.01, 1.0, 0.0),
            ],
            0.02,
        );

        let mut state = initialize_simulation_state(&scenario, &settings).unwrap();
        let record = execute_coupling_step(&mut state, &scenario).unwrap();
        assert!(record.iterations < scenario.coupling.max_iterations);

        // 上段の根点変位は下段の変位に一致（緩和係数1.0・収束後）
        let bottom_x = state.solvers[0]
            .get_solution_step_value(CouplingVariable::Displacement, 0)
            .unwrap();
        let top_root = state.solvers[1]
            .get_solution_step_value(CouplingVariable::RootPointDisplacement, 0)
            .unwrap();
        assert_eq!(top_root, bottom_x);

        // 下段が受ける荷重は上段の反力と（収束判定の範囲で）一致
        let bottom_load = state.solvers[0]
            .get_solution_step_value(CouplingVariable::Load, 0)
            .unwrap();
        let top_reaction = state.solvers[1]
            .get_solution_step_value(CouplingVariable::Reaction, 0)
            .unwrap();
        assert!((bottom_load - top_reaction).abs() < 1e-8);
    }

    /// 界面での仕事が両側で一致する
    ///
    /// 下段側は（受けた荷重, 自身の変位）、上段側は（反力, 根点変位）で
    /// Σ F*Δu を台形則で積算し、両者が一致することを確認する。
    #[test]
    fn test_interface_work_matches_between_partners() {
        let settings = test_settings();
        let scenario = make_scenario(
            vec![
                make_oscillator("bottom", 1.0, 50.0, 0.05),
                make_oscillator("top", 0.01, 1.0, 0.0),
            ],
            0.02,
        );

        let mut state = initialize_simulation_state(&scenario, &settings).unwrap();

        let mut work_bottom = 0.0;
        let mut work_top = 0.0;
        let mut load_prev = 0.0;
        let mut x_prev = 0.05;
        let mut reaction_prev = 0.0;
        let mut root_prev = 0.0;
        for _ in 0..100 {
            execute_coupling_step(&mut state, &scenario).unwrap();

            let load = state.solvers[0]
                .get_solution_step_value(CouplingVariable::Load, 0)
                .unwrap();
            let x = state.solvers[0]
                .get_solution_step_value(CouplingVariable::Displacement, 0)
                .unwrap();
            let reaction = state.solvers[1]
                .get_solution_step_value(CouplingVariable::Reaction, 0)
                .unwrap();
            let root = state.solvers[1]
                .get_solution_step_value(CouplingVariable::RootPointDisplacement, 0)
                .unwrap();

            work_bottom += 0.5 * (load_prev + load) * (x - x_prev);
            work_top += 0.5 * (reaction_prev + reaction) * (root - root_prev);

            load_prev = load;
            x_prev = x;
            reaction_prev = reaction;
            root_prev = root;
        }

        assert!(
            (work_bottom - work_top).abs() < 1e-9 * work_bottom.abs().max(1.0),
            "界面仕事が一致しません: bottom = {}, top = {}",
            work_bottom,
            work_top
        );
    }

    /// 反復上限までに収束しなければ NotConverged が報告される
    #[test]
    fn test_non_convergence_is_reported() {
        let settings = test_settings();
        let mut scenario = make_scenario(
            vec![
                make_oscillator("bottom", 1.0, 10.0, 0.5),
                make_oscillator("top", 2.0, 100.0, 0.0),
            ],
            0.1,
        );
        scenario.coupling.max_iterations = 1;
        scenario.coupling.tolerance = 1e-15;

        let mut state = initialize_simulation_state(&scenario, &settings).unwrap();
        let err = execute_coupling_step(&mut state, &scenario).unwrap_err();
        let coupling = err
            .downcast_ref::<CouplingError>()
            .expect("CouplingError が返るはず");
        assert!(matches!(coupling, CouplingError::NotConverged { .. }));
    }
}
