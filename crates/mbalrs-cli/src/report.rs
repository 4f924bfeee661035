use crate::csv_parse::SkippedRow;

use mbalrs_core::{FormulationVariant, MaterialBalanceResult, MeasurementSeries};

use std::io::Write;

const HEAD_ROWS: usize = 5;

fn table_header(formulation: FormulationVariant) -> Vec<&'static str> {
    let mut header = vec!["index", "p", "Np", "Gp", "F", "Eo", "Eg"];
    if formulation == FormulationVariant::Extended {
        header.extend(["dP", "Efw"]);
    }
    header.extend(["Rp", "x", "y", "y_fit", "residual", "in_fit"]);
    header
}

/// Describes the constrained line reported in place of the fitted one when
/// there is no gas cap. With G = 0 the simple form loses its intercept and the
/// extended form loses its slope.
fn no_gas_cap_note(result: &MaterialBalanceResult) -> Option<String> {
    if result.fit.gas_cap_present {
        return None;
    }
    let shape = match result.formulation {
        FormulationVariant::Simple => "y = N x through the origin (intercept G = 0)",
        FormulationVariant::Extended => "flat line y = N (slope N m = 0)",
    };
    Some(format!(
        "No gas cap: unconstrained fit gave m < 0 (line {}), reporting {shape}",
        result.unconstrained
    ))
}

/// Admissible rows with their derived values, fitted line and residuals.
pub fn write_table<W: Write>(result: &MaterialBalanceResult, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table_header(result.formulation))?;

    for ((row, y_fit), residual) in
        result.admissible_rows.iter().zip(&result.predictions).zip(&result.residuals)
    {
        let d = &row.derived;
        let mut record = vec![
            row.index.to_string(),
            row.raw.p.to_string(),
            row.raw.np.to_string(),
            row.raw.gp.to_string(),
            d.f.to_string(),
            d.eo.to_string(),
            d.eg.to_string(),
        ];
        if result.formulation == FormulationVariant::Extended {
            record.push(d.dp.map(|v| v.to_string()).unwrap_or_default());
            record.push(d.efw.map(|v| v.to_string()).unwrap_or_default());
        }
        record.extend([
            d.rp.to_string(),
            d.x.to_string(),
            d.y.to_string(),
            y_fit.to_string(),
            residual.to_string(),
            result.in_fit(row.index).to_string(),
        ]);
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(result: &MaterialBalanceResult, writer: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, result)
}

pub fn print_summary(
    name: &str,
    result: &MaterialBalanceResult,
    series: &MeasurementSeries,
    skipped: &[SkippedRow],
) {
    let fit = &result.fit;
    println!("== {name}");
    println!("Formulation: {}, fit window: {}", result.formulation, result.window);
    println!("Oil in Place (N):      {:.2}", fit.n);
    println!("Gas in Place (G):      {:.2}", fit.g);
    println!("Gas Cap Ratio (m):     {:.4}", fit.m);
    println!("Goodness of Fit (R2):  {:.4}", fit.r_squared);
    if let Some(note) = no_gas_cap_note(result) {
        println!("{note}");
    }
    println!("Straight-line fit: {}", fit.line());
    println!(
        "Rows: {} admissible, {} used in fit, {} rejected, {} unreadable",
        result.admissible_rows.len(),
        fit.fit_points.len(),
        result.rejected_rows.len(),
        skipped.len()
    );
    for rejected in &result.rejected_rows {
        let reasons: Vec<String> = rejected.reasons.iter().map(ToString::to_string).collect();
        println!("  row {} rejected: {}", rejected.row.index, reasons.join("; "));
    }
    for s in skipped {
        println!("  line {} skipped: {}", s.line, s.reason);
    }

    println!("Input production data (first {HEAD_ROWS} rows):");
    println!("{:>10} {:>12} {:>14} {:>8} {:>10} {:>8}", "p", "Np", "Gp", "Bo", "Bg", "Rs");
    for row in series.rows().iter().take(HEAD_ROWS) {
        println!(
            "{:>10.1} {:>12.2} {:>14.1} {:>8.4} {:>10.6} {:>8.1}",
            row.p, row.np, row.gp, row.bo, row.bg, row.rs
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbalrs_core::{run_analysis, AnalysisConfig, InitialParameters, MeasurementRow};

    fn result() -> MaterialBalanceResult {
        let series: MeasurementSeries = vec![
            MeasurementRow::new(3000., 0., 0., 1.2, 0.005, 500.),
            MeasurementRow::new(2800., 1., 1_687., 1.19, 0.0054, 490.),
            MeasurementRow::new(2600., 2., 3_295., 1.18, 0.0059, 478.),
            MeasurementRow::new(2400., 3., 5_191., 1.165, 0.0065, 465.),
        ]
        .into();
        let params = InitialParameters::new(1.2, 0.005, 500.0).unwrap();
        run_analysis(&params, &series, &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn table_has_one_line_per_admissible_row() {
        let result = result();
        let mut out = Vec::new();
        write_table(&result, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "index,p,Np,Gp,F,Eo,Eg,Rp,x,y,y_fit,residual,in_fit");
        assert_eq!(lines.len(), 1 + result.admissible_rows.len());
        assert!(lines[1].starts_with("1,2800"));
        assert!(lines[1].ends_with(",true"));
    }

    #[test]
    fn extended_table_has_efw_columns() {
        let header = table_header(FormulationVariant::Extended);
        assert!(header.contains(&"Efw"));
        assert!(header.contains(&"dP"));
        assert!(!table_header(FormulationVariant::Simple).contains(&"Efw"));
    }

    #[test]
    fn no_gas_cap_note_names_the_reported_line() {
        let mut result = result();
        result.fit.gas_cap_present = true;
        assert_eq!(no_gas_cap_note(&result), None);

        result.fit.gas_cap_present = false;
        result.formulation = FormulationVariant::Simple;
        let note = no_gas_cap_note(&result).unwrap();
        assert!(note.contains("y = N x through the origin"), "{note}");

        result.formulation = FormulationVariant::Extended;
        let note = no_gas_cap_note(&result).unwrap();
        assert!(note.contains("flat line y = N"), "{note}");
    }

    #[test]
    fn json_contains_fit() {
        let mut out = Vec::new();
        write_json(&result(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(value["fit"]["n"].is_number());
        assert_eq!(value["formulation"], "simple");
        assert_eq!(value["window"], "all");
    }
}
