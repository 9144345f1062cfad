//! Writing a solved schedule out for the student.
//!
//! The summary row is rendered directly under the selection, with blank
//! descriptive columns.
use crate::pipeline::MatchOutcome;
use crate::result::Schedule;
use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use std::fmt::Write as _;
use std::path::Path;

pub const HEADER: [&str; 9] = [
    "SectionID",
    "Course Name",
    "Instructor",
    "Days",
    "Time",
    "Term",
    "Price",
    "Credits",
    "Weighted Utility",
];

/// Save the schedule as a one-sheet workbook.
pub fn write_xlsx(schedule: &Schedule, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Schedule")?;

    for (col, title) in HEADER.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    let mut row = 1u32;
    for selected in &schedule.selected {
        let s = &selected.section;
        sheet.write_string(row, 0, &s.section_id)?;
        sheet.write_string(row, 1, &s.course_name)?;
        sheet.write_string(row, 2, &s.instructor)?;
        sheet.write_string(row, 3, s.days.to_string())?;
        sheet.write_string(row, 4, &s.time_slot)?;
        sheet.write_string(row, 5, s.term.as_str())?;
        sheet.write_number(row, 6, s.price)?;
        sheet.write_number(row, 7, s.credits)?;
        sheet.write_number(row, 8, selected.weighted_utility)?;
        row += 1;
    }

    let totals = schedule.totals();
    sheet.write_string_with_format(row, 0, &schedule.summary.section_id, &bold)?;
    sheet.write_number_with_format(row, 6, totals.price, &bold)?;
    sheet.write_number_with_format(row, 7, totals.credits, &bold)?;
    sheet.write_number_with_format(row, 8, totals.weighted_utility, &bold)?;

    workbook
        .save(path)
        .with_context(|| format!("saving schedule to {}", path.display()))?;
    Ok(())
}

pub fn to_json(outcome: &MatchOutcome) -> Result<String> {
    serde_json::to_string_pretty(outcome).context("serialising schedule")
}

/// Plain-text table for the terminal.
pub fn render_table(schedule: &Schedule) -> String {
    let mut rows: Vec<[String; 9]> = schedule
        .selected
        .iter()
        .map(|sel| {
            let s = &sel.section;
            [
                s.section_id.clone(),
                s.course_name.clone(),
                s.instructor.clone(),
                s.days.to_string(),
                s.time_slot.clone(),
                s.term.to_string(),
                format!("{:.2}", s.price),
                format!("{:.2}", s.credits),
                format!("{:.2}", sel.weighted_utility),
            ]
        })
        .collect();
    let totals = schedule.totals();
    rows.push([
        schedule.summary.section_id.clone(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        format!("{:.2}", totals.price),
        format!("{:.2}", totals.credits),
        format!("{:.2}", totals.weighted_utility),
    ]);

    let mut widths: Vec<usize> = HEADER.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_line(&mut out, HEADER.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &rows {
        write_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

/// Numeric columns (price onwards) are right-aligned.
fn write_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let parts: Vec<String> = cells
        .zip(widths)
        .enumerate()
        .map(|(i, (c, &w))| if i >= 6 { format!("{c:>w$}") } else { format!("{c:<w$}") })
        .collect();
    let _ = writeln!(out, "{}", parts.join("  ").trim_end());
}
