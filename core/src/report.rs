use std::{fmt::Write, fs, path::Path};

use anyhow::{anyhow, Context, Result};

use crate::visualization::Chart;

pub const REPORT_FILE: &str = "report.md";

const REPORT_HEADER: &str = r"# Benchmark Charts

<!-- Regions between SECTION markers are regenerated on every run; notes written
     outside them are kept. -->
";

#[derive(Clone, Debug)]
pub struct ReportSection {
    id: String,
    content: String,
}

impl ReportSection {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }

    /// Image link plus a table of every plotted point.
    pub fn for_chart(chart: &Chart) -> Self {
        let mut output = String::new();
        let _ = writeln!(
            &mut output,
            "![{stem}]({stem}.png)\n",
            stem = chart.file_stem
        );

        if chart.series.iter().all(|s| s.points.is_empty()) {
            let _ = writeln!(&mut output, "No data points were selected for this chart.");
            return Self::new(chart.file_stem.clone(), output);
        }

        let _ = writeln!(
            &mut output,
            "| Series | {} | {} | Samples |",
            chart.x_label, chart.y_label
        );
        let _ = writeln!(&mut output, "| --- | --- | --- | --- |");
        for series in &chart.series {
            for ((x, y), samples) in series.points.iter().zip(&series.samples) {
                let _ = writeln!(
                    &mut output,
                    "| {} | {} | {:.4} | {} |",
                    series.label, x, y, samples
                );
            }
        }

        Self::new(chart.file_stem.clone(), output)
    }

    fn start_marker(&self) -> String {
        format!("<!-- SECTION:{} start -->", self.id)
    }

    fn end_marker(&self) -> String {
        format!("<!-- SECTION:{} end -->", self.id)
    }

    fn placeholder(&self) -> String {
        format!("\n## {}\n\n{}\n{}\n", self.id, self.start_marker(), self.end_marker())
    }
}

/// Template with an empty, titled section for each chart stem.
pub fn report_template<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    let mut template = REPORT_HEADER.to_string();
    for id in ids {
        template.push_str(&ReportSection::new(id, "").placeholder());
    }
    template
}

pub fn ensure_report_file(path: &Path, template: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    if !path.exists() {
        fs::write(path, template)
            .with_context(|| format!("failed to write report template to {}", path.display()))?;
    }

    Ok(())
}

pub fn update_sections(path: &Path, sections: &[ReportSection]) -> Result<()> {
    let mut content = fs::read_to_string(path)
        .with_context(|| format!("failed to read report at {}", path.display()))?;

    for section in sections {
        if !content.contains(&section.start_marker()) {
            content.push_str(&section.placeholder());
        }
        content = replace_section(&content, section)?;
    }

    fs::write(path, content)
        .with_context(|| format!("failed to write updated report to {}", path.display()))?;
    Ok(())
}

fn replace_section(content: &str, section: &ReportSection) -> Result<String> {
    let start_marker = section.start_marker();
    let end_marker = section.end_marker();

    let start_idx = content
        .find(&start_marker)
        .ok_or_else(|| anyhow!("missing start marker: {}", start_marker))?;
    let after_start = start_idx + start_marker.len();
    let end_relative = content[after_start..]
        .find(&end_marker)
        .ok_or_else(|| anyhow!("missing end marker: {}", end_marker))?;
    let end_idx = after_start + end_relative;

    let mut updated = String::with_capacity(content.len() + section.content.len());
    updated.push_str(&content[..after_start]);
    updated.push('\n');

    let trimmed = section.content.trim_matches('\n');
    if !trimmed.is_empty() {
        updated.push_str(trimmed);
        updated.push('\n');
    }

    updated.push_str(&content[end_idx..]);
    Ok(updated)
}
