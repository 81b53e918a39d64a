use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::charts::{catalog, ChartSpec};
use crate::context::ResultsContext;
use crate::metrics::PerformancePolicy;
use crate::report::{
    ensure_report_file, report_template, update_sections, ReportSection, REPORT_FILE,
};
use crate::visualization::{Chart, Renderer};

/// The catalog, optionally narrowed to the named charts.
pub fn select_charts(only: &[String]) -> Result<Vec<ChartSpec>> {
    let charts = catalog();
    if only.is_empty() {
        return Ok(charts);
    }

    for name in only {
        if !charts.iter().any(|chart| chart.name == name.as_str()) {
            let known: Vec<_> = charts.iter().map(|chart| chart.name).collect();
            bail!("unknown chart {:?}; known charts: {}", name, known.join(", "));
        }
    }

    Ok(charts
        .into_iter()
        .filter(|chart| only.iter().any(|name| name.as_str() == chart.name))
        .collect())
}

pub fn build_charts(
    context: &ResultsContext,
    specs: &[ChartSpec],
    policy: PerformancePolicy,
) -> Result<Vec<Chart>> {
    specs
        .iter()
        .map(|spec| spec.build(context, policy))
        .collect()
}

pub fn render_charts(renderer: &mut Renderer, charts: &[Chart]) -> Result<Vec<PathBuf>> {
    charts.iter().map(|chart| renderer.render(chart)).collect()
}

/// Refresh `<plots_dir>/report.md` with one section per chart.
pub fn write_report(plots_dir: &Path, charts: &[Chart]) -> Result<PathBuf> {
    let path = plots_dir.join(REPORT_FILE);
    let template = report_template(catalog().iter().map(|chart| chart.name));
    ensure_report_file(&path, &template)?;

    let sections: Vec<ReportSection> = charts.iter().map(ReportSection::for_chart).collect();
    update_sections(&path, &sections)
        .with_context(|| format!("failed to update report {}", path.display()))?;

    info!(path = %path.display(), sections = sections.len(), "updated report");
    Ok(path)
}
