use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use mcc_model::{ColumnCompleteness, ColumnMissing, CompletenessReport, RequiredField};
use mcc_report::render_record_summary;

use mcc_cli::pipeline::CheckOutcome;

pub fn print_check_summary(outcome: &CheckOutcome) {
    let report = &outcome.report;
    println!(
        "Assessing completeness for metadata file '{}' ({})",
        outcome.dataset, outcome.level
    );
    if report.mapping.is_empty() {
        println!("All required fields are missing for {}.", outcome.level);
    } else {
        println!("{}", mapping_table(report));
    }

    if report.missing_headers.is_empty() {
        println!("No missing headers. All required fields are present.");
    } else {
        println!("Missing Headers: {}", report.missing_headers.join(", "));
    }
    if report.unexpected_headers.is_empty() {
        println!("No unexpected headers. All dataset fields are required.");
    } else {
        println!("Unexpected Headers: {}", report.unexpected_headers.join(", "));
    }
    println!("Completeness Score: {:.2}", report.completeness_score);

    let records = &outcome.records;
    println!();
    println!("{}", render_record_summary(records));
    if !records.missing_columns.is_empty() {
        println!();
        println!("Columns with missing values:");
        println!("{}", missing_columns_table(&records.missing_columns));
    }
    if let Some(required) = &records.required_column_completeness {
        println!();
        println!("Required field completeness:");
        println!("{}", completeness_table(required));
    }

    for path in &outcome.charts {
        println!("Chart: {}", path.display());
    }
    if let Some(path) = &outcome.json {
        println!("JSON report: {}", path.display());
    }
}

pub fn print_fields(fields: &[RequiredField]) {
    println!("{}", fields_table(fields));
}

fn fields_table(fields: &[RequiredField]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Aliases"),
        header_cell("Accepted Names"),
    ]);
    apply_table_style(&mut table);
    for field in fields {
        let aliases = if field.aliases().is_empty() {
            dim_cell("-")
        } else {
            Cell::new(field.aliases().join(", "))
        };
        table.add_row(vec![
            Cell::new(field.name())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            aliases,
            dim_cell(field.match_candidates().join(", ")),
        ]);
    }
    table
}

fn mapping_table(report: &CompletenessReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Required Header"),
        header_cell("Matched Dataset Header"),
        header_cell("Method"),
        header_cell("Score"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for entry in &report.mapping {
        let score = match entry.score {
            Some(score) => Cell::new(format!("{score:.2}")),
            None => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(&entry.field),
            Cell::new(&entry.header),
            dim_cell(entry.kind),
            score,
        ]);
    }
    table
}

fn missing_columns_table(columns: &[ColumnMissing]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Missing Count"),
        header_cell("Missing (%)"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for column in columns {
        table.add_row(vec![
            Cell::new(&column.column),
            Cell::new(column.missing_count).fg(Color::Red),
            Cell::new(format!("{:.2}", column.missing_percentage)),
        ]);
    }
    table
}

fn completeness_table(columns: &[ColumnCompleteness]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Available (%)"),
        header_cell("Missing (%)"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for column in columns {
        let field = if column.header_present {
            Cell::new(&column.column)
        } else {
            Cell::new(format!("{} (header missing)", column.column)).fg(Color::Red)
        };
        table.add_row(vec![
            field,
            Cell::new(format!("{:.1}", column.available_percentage)),
            Cell::new(format!("{:.1}", column.missing_percentage)),
        ]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
