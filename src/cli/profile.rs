use super::ui;
use crate::core::format::{NOT_AVAILABLE, format_number, format_percentage};
use crate::core::profile::{DataProfile, DatasetApi};
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::path::Path;

impl DataProfile {
    pub fn display_as_table(&self) -> String {
        let overview = &self.overview;

        let mut summary = ui::new_styled_table();
        summary.set_header(vec![
            ui::header_cell("Rows"),
            ui::header_cell("Columns"),
            ui::header_cell("Missing Values"),
            ui::header_cell("Duplicate Rows"),
        ]);
        summary.add_row(vec![
            ui::value_cell(overview.rows.to_string()),
            ui::value_cell(overview.columns.to_string()),
            ui::value_cell(overview.missing_values.to_string()),
            ui::value_cell(overview.duplicate_rows.to_string()),
        ]);

        let mut columns = ui::new_styled_table();
        columns.set_header(vec![
            ui::header_cell("Column"),
            ui::header_cell("Type"),
            ui::header_cell("Missing (%)"),
            ui::header_cell("Unique"),
            ui::header_cell("Mean"),
            ui::header_cell("Min"),
            ui::header_cell("Max"),
            ui::header_cell("Top Value"),
        ]);
        for (name, column) in &self.columns {
            // Numeric columns are summarised by mean/min/max instead
            let top_value = column
                .stats
                .top_value
                .as_ref()
                .filter(|_| !column.is_numeric())
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            columns.add_row(vec![
                Cell::new(name),
                Cell::new(&column.kind),
                ui::value_cell(format_percentage(self.missing_ratio(name))),
                ui::value_cell(column.unique.to_string()),
                ui::value_cell(format_number(column.stats.mean, 2)),
                ui::value_cell(format_number(column.stats.min, 2)),
                ui::value_cell(format_number(column.stats.max, 2)),
                ui::value_cell(top_value),
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Data Profile", ui::StyleType::Title)
        );
        output.push_str(&summary.to_string());
        output.push_str("\n\n");
        output.push_str(&columns.to_string());

        let pairs = self.highly_correlated();
        if !pairs.is_empty() {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text("Highly correlated", ui::StyleType::TotalLabel)
            ));
            for pair in pairs {
                output.push_str(&format!(
                    "\n  {} ~ {}: {}",
                    pair.variable1,
                    pair.variable2,
                    format_number(Some(pair.correlation), 2)
                ));
            }
        }
        output
    }
}

pub async fn run(api: &dyn DatasetApi, path: &Path) -> Result<()> {
    let pb = ui::new_spinner("Uploading dataset...");
    let upload = api.upload_dataset(path).await;
    pb.finish_and_clear();
    let upload = upload.with_context(|| format!("Upload failed for {}", path.display()))?;

    println!(
        "{} {}\n",
        ui::style_text("Columns:", ui::StyleType::TotalLabel),
        upload.columns.join(", ")
    );
    println!("{}", upload.profile.display_as_table());
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::core::profile::DataProfile;

    #[test]
    fn test_display_profile() {
        let json = r#"{
            "overview": {"rows": 4, "columns": 2, "missing_values": 1, "duplicate_rows": 0},
            "columns": {
                "points": {"type": "float64", "missing": 1, "unique": 3,
                           "stats": {"mean": 21.5, "min": 10, "max": 33, "top_value": 777}},
                "team": {"type": "object", "missing": 0, "unique": 2,
                         "stats": {"top_value": "BOS", "freq": 3}}
            },
            "correlation": {"highly_correlated": [
                {"variable1": "points", "variable2": "minutes", "correlation": 0.91}
            ]}
        }"#;
        let profile: DataProfile = serde_json::from_str(json).unwrap();

        let output = profile.display_as_table();
        assert!(output.contains("points"));
        assert!(output.contains("25.00%"));
        assert!(output.contains("21.50"));
        assert!(output.contains("BOS"));
        assert!(!output.contains("777"));
        assert!(output.contains("points ~ minutes: 0.91"));
    }
}
