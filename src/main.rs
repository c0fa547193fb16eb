// src/main.rs

use std::error::Error;
use std::io::Write;

use simulation::csv::*;
use simulation::framework::*;
use simulation::load_parameters::*;

mod config;
mod math;
mod models;
mod simulation;

fn main() -> Result<(), Box<dyn Error>> {
    // 設定とシナリオの読み込み
    let settings = load_sdof_solver_settings("config/sdof_parameters.yaml")?;
    let scenario = load_scenario("config/scenario.yaml")?;

    // 出力先の確保（ソルバの時刻歴ファイルもここに書く）
    std::fs::create_dir_all("output")?;

    // 連成システムの初期化
    let mut state = initialize_simulation_state(&scenario, &settings)?;

    // CSV出力の設定
    let mut writer: Box<dyn Write> = setup_csv_output("output/coupling_results.csv", &state)?;

    // 連成ステップ数
    let cycles = (scenario.end_time / scenario.time_step).round() as usize;

    // シミュレーションのメインループ
    for _cycle in 0..cycles {
        // 連成ステップの実行（時刻の前進・Gauss-Seidel 反復・出力）
        let record = execute_coupling_step(&mut state, &scenario)?;

        // CSV行の作成と書き込み
        let row = create_csv_row(&record);
        writer.write_all(row.as_bytes())?;
    }

    println!("Simulation finished. Results saved to output/coupling_results.csv");
    Ok(())
}
