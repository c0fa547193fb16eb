// src/simulation/csv.rs

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;

use crate::simulation::{SimulationState, StepRecord};

/// CSV出力の設定とヘッダーの書き込み
pub fn setup_csv_output(
    path: &str,
    state: &SimulationState,
) -> Result<Box<dyn Write>, Box<dyn Error>> {
    let output_file = File::create(path)?;
    let mut writer = BufWriter::new(output_file);
    write_csv_header(&mut writer, state)?;
    Ok(Box::new(writer))
}

/// CSVヘッダーの書き込み
pub fn write_csv_header<W: Write>(
    writer: &mut W,
    state: &SimulationState,
) -> Result<(), std::io::Error> {
    let mut header = String::from("time(s),");

    // 振動子ごとのヘッダー
    for solver in &state.solvers {
        header.push_str(&format!(
            "{0}_displacement(m),{0}_velocity(m/s),{0}_acceleration(m/s2),{0}_reaction(N),",
            solver.id()
        ));
    }

    header.push_str("coupling_iterations");
    header.push('\n');
    writer.write_all(header.as_bytes())?;
    Ok(())
}

/// CSV行の作成
pub fn create_csv_row(record: &StepRecord) -> String {
    let mut row = format!("{},", record.time);

    // 振動子ごとの状態
    for oscillator in &record.oscillators {
        row.push_str(&format!(
            "{},{},{},{},",
            oscillator.displacement,
            oscillator.velocity,
            oscillator.acceleration,
            oscillator.reaction
        ));
    }

    row.push_str(&format!("{}", record.iterations));
    row.push('\n');
    row
}
