use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use jobly::{Company, Job};
use serde_json::to_string_pretty;

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| Cell::new(n).add_attribute(Attribute::Bold).fg(Color::Cyan))
        .collect()
}

fn new_table(columns: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(columns));
    table
}

fn or_null<T: ToString>(v: Option<T>) -> Cell {
    match v {
        Some(v) => Cell::new(v.to_string()),
        None => Cell::new("(null)").fg(Color::DarkGrey),
    }
}

pub fn companies_table(companies: &[Company]) -> Table {
    let mut table = new_table(&["Handle", "Name", "Employees", "Logo URL"]);
    for c in companies {
        table.add_row(vec![
            Cell::new(&c.handle).fg(Color::Yellow),
            Cell::new(&c.name),
            or_null(c.num_employees),
            or_null(c.logo_url.as_deref()),
        ]);
    }
    table
}

pub fn jobs_table(jobs: &[Job]) -> Table {
    let mut table = new_table(&["ID", "Title", "Salary", "Equity", "Company"]);
    for j in jobs {
        table.add_row(vec![
            Cell::new(j.id.to_string()).fg(Color::Yellow),
            Cell::new(&j.title),
            or_null(j.salary),
            or_null(j.equity),
            Cell::new(&j.company_handle),
        ]);
    }
    table
}

pub fn json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobs_table_marks_nulls() {
        let jobs = vec![Job {
            id: 3,
            title: "Dev".to_string(),
            salary: None,
            equity: None,
            company_handle: "acme".to_string(),
        }];
        let out = jobs_table(&jobs).to_string();
        assert!(out.contains("Dev"));
        assert!(out.contains("(null)"));
        assert!(out.contains("acme"));
    }
}
