//! Text rendering for reports and donor lists.

use crate::record::Donor;
use crate::workflow::Report;

const HEADERS: [&str; 6] = ["#", "Name", "Phone", "BloodGroup", "Age", "City"];

/// Format a workflow report for the terminal.
#[must_use]
pub fn report_line(report: &Report) -> String {
    match report {
        Report::Success(msg) | Report::Info(msg) => msg.clone(),
        Report::Warning(msg) => format!("warning: {msg}"),
    }
}

/// One line per donor, numbered from zero.
#[must_use]
pub fn donor_lines(donors: &[Donor]) -> String {
    donors
        .iter()
        .enumerate()
        .map(|(index, donor)| {
            let [_, name, phone, group, age, city] = donor_cells(index, donor);
            format!("{index}: {name}, {phone}, {group}, age {age}, {city}\n")
        })
        .collect()
}

/// An aligned table of donors, rows numbered from zero.
#[must_use]
pub fn donor_table(donors: &[Donor]) -> String {
    let rows: Vec<[String; 6]> = donors
        .iter()
        .enumerate()
        .map(|(index, donor)| donor_cells(index, donor))
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(rule.join("  ").trim_end());
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn donor_cells(index: usize, donor: &Donor) -> [String; 6] {
    [
        index.to_string(),
        donor.name.clone(),
        donor.phone.clone(),
        donor.blood_group.to_string(),
        donor.age.to_string(),
        donor.city.clone().unwrap_or_default(),
    ]
}

fn push_row(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BloodGroup;

    fn sample() -> Vec<Donor> {
        vec![
            Donor {
                name: "Asha".to_string(),
                phone: "+911234".to_string(),
                blood_group: BloodGroup::OPositive,
                age: 30,
                city: Some("Pune".to_string()),
            },
            Donor {
                name: "Jo".to_string(),
                phone: "+15550001".to_string(),
                blood_group: BloodGroup::AbNegative,
                age: 41,
                city: None,
            },
        ]
    }

    #[test]
    fn test_report_line() {
        assert_eq!(report_line(&Report::Success("done".to_string())), "done");
        assert_eq!(
            report_line(&Report::Warning("Please complete all fields".to_string())),
            "warning: Please complete all fields"
        );
    }

    #[test]
    fn test_donor_lines_numbered_from_zero() {
        let text = donor_lines(&sample());
        assert_eq!(
            text,
            "0: Asha, +911234, O+, age 30, Pune\n1: Jo, +15550001, AB-, age 41, \n"
        );
    }

    #[test]
    fn test_donor_table() {
        let text = donor_table(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "#  Name  Phone      BloodGroup  Age  City");
        assert_eq!(lines[1], "-  ----  ---------  ----------  ---  ----");
        assert_eq!(lines[2], "0  Asha  +911234    O+          30   Pune");
        assert_eq!(lines[3], "1  Jo    +15550001  AB-         41");
    }

    #[test]
    fn test_donor_table_empty() {
        let text = donor_table(&[]);
        assert_eq!(text.lines().count(), 2);
    }
}
