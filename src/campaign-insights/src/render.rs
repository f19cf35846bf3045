//! Plain-text rendering of the dashboard views.

use campaign_core::config::AppConfig;
use campaign_core::types::PerformanceRecord;
use campaign_reporting::{AggregateRow, DashboardView};
use campaign_store::{CellValue, QueryTable};
use std::fmt::{self, Write};

/// `$1,234,567` style, whole dollars.
pub fn money(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

pub fn section(title: &str) -> String {
    format!("\n{title}\n{}\n", "-".repeat(title.chars().count()))
}

pub fn dashboard(view: &DashboardView, config: &AppConfig) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_summary(&mut out, view, config)?;
    write_trend(&mut out, &view.daily_trend)?;

    out.push_str(&section("Channel Performance"));
    write_metric_rows(&mut out, &view.channel_performance)?;

    out.push_str(&section("Campaign Efficiency"));
    write_metric_rows(&mut out, &view.campaign_efficiency)?;

    write_rankings(&mut out, view)?;
    write_simulator(&mut out, view)?;
    Ok(out)
}

/// The budget allocator section on its own, for slider changes.
pub fn simulator(view: &DashboardView) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_simulator(&mut out, view)?;
    Ok(out)
}

fn write_summary(out: &mut String, view: &DashboardView, config: &AppConfig) -> fmt::Result {
    let s = &view.summary;
    out.push_str(&section("Executive Summary"));
    writeln!(out, "Total Spend      {:>14}", money(s.total_spend))?;
    writeln!(out, "Total Revenue    {:>14}", money(s.total_revenue))?;
    writeln!(
        out,
        "Blended ROAS     {:>13.2}x  ({:+.2} vs target {:.2})",
        s.roas, s.roas_vs_target, config.reporting.roas_target
    )?;
    writeln!(
        out,
        "CPA              {:>14}  ({:+.2} vs target {:.2})",
        format!("${:.2}", s.cpa),
        s.cpa_vs_target,
        config.reporting.cpa_target
    )
}

fn write_trend(out: &mut String, rows: &[AggregateRow]) -> fmt::Result {
    out.push_str(&section("Daily Revenue Trend"));
    writeln!(out, "{:<12} {:>12} {:>12}", "date", "spend", "revenue")?;
    for row in rows {
        writeln!(
            out,
            "{:<12} {:>12} {:>12}",
            row.key.label(),
            money(row.spend),
            money(row.revenue)
        )?;
    }
    Ok(())
}

fn write_rankings(out: &mut String, view: &DashboardView) -> fmt::Result {
    out.push_str(&section("Top ROAS Campaigns"));
    for row in &view.top_roas_campaigns {
        writeln!(out, "{:<46} {:>8.2}x", row.key.label(), row.roas)?;
    }

    out.push_str(&section("Highest CPA (Needs Optimization)"));
    for row in &view.highest_cpa_campaigns {
        writeln!(out, "{:<46} {:>9}", row.key.label(), format!("${:.2}", row.cpa))?;
    }
    Ok(())
}

fn write_simulator(out: &mut String, view: &DashboardView) -> fmt::Result {
    let sim = &view.simulation;
    out.push_str(&section("Budget Allocator (Simulator)"));
    for (channel, revenue) in &sim.projection.per_channel_revenue {
        writeln!(out, "{:<16} {:>14}", channel.as_str(), money(*revenue))?;
    }
    writeln!(
        out,
        "Projected Monthly Revenue {} ({} vs Baseline)",
        money(sim.projection.total_revenue),
        money(sim.delta_vs_baseline)
    )?;
    writeln!(
        out,
        "Revenue Goal Progress ({}): {:.0}%",
        money(sim.revenue_goal),
        sim.goal_progress * 100.0
    )?;
    if let Some(shift) = &view.recommendation {
        writeln!(
            out,
            "Recommendation: shift budget from {} ({:.2}x) to {} ({:.2}x).",
            shift.from, shift.from_roas, shift.to, shift.to_roas
        )?;
    }
    Ok(())
}

fn write_metric_rows(out: &mut String, rows: &[AggregateRow]) -> fmt::Result {
    writeln!(
        out,
        "{:<46} {:>12} {:>12} {:>8} {:>9}",
        "group", "spend", "revenue", "ROAS", "CPA"
    )?;
    for row in rows {
        writeln!(
            out,
            "{:<46} {:>12} {:>12} {:>7.2}x {:>9}",
            row.key.label(),
            money(row.spend),
            money(row.revenue),
            row.roas,
            format!("${:.2}", row.cpa)
        )?;
    }
    Ok(())
}

/// Raw records in table column order, for the data browser.
pub fn records_table<'a>(records: impl IntoIterator<Item = &'a PerformanceRecord>) -> QueryTable {
    let columns = [
        "date",
        "campaign_id",
        "campaign_name",
        "channel",
        "impressions",
        "clicks",
        "spend",
        "conversions",
        "revenue",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    let count = |n: u64| CellValue::Integer(i64::try_from(n).unwrap_or(i64::MAX));
    let rows = records
        .into_iter()
        .map(|r| {
            vec![
                CellValue::Text(r.date.to_string()),
                CellValue::Text(r.campaign_id.clone()),
                CellValue::Text(r.campaign_name.clone()),
                CellValue::Text(r.channel.to_string()),
                count(r.impressions),
                count(r.clicks),
                CellValue::Real(r.spend),
                count(r.conversions),
                CellValue::Real(r.revenue),
            ]
        })
        .collect();
    QueryTable { columns, rows }
}

/// Columns padded to their widest cell.
pub fn query_table(table: &QueryTable) -> Result<String, fmt::Error> {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, &w)| format!("{name:<w$}"))
        .collect();
    writeln!(out, "{}", header.join(" | "))?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", rule.join("-+-"))?;
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect();
        writeln!(out, "{}", line.join(" | "))?;
    }
    Ok(out)
}
