//! Inspect a beer workbook: sheet names, which known columns the header row carries, and how
//! the first rows parse.
//! Usage: cargo run --bin inspect_beer_xlsx -- path/to/beer_data.xlsx [rows]

use std::path::Path;

use calamine::Reader;

use beerlist::data::parse::{parse_number, StockStatus};
use beerlist::data::record::COLUMNS;
use beerlist::data::xlsx_source::cell_str;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("Usage: inspect_beer_xlsx <path-to.xlsx> [rows]")?;
    let take = std::env::args()
        .nth(2)
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(10);
    let path = Path::new(&path);
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    let mut wb = calamine::open_workbook_auto(path)?;
    let names = wb.sheet_names();
    println!("Sheets ({}): {}", names.len(), names.join(", "));
    let sheet_name = names.first().ok_or("No sheets")?.clone();
    println!("\nUsing sheet: {sheet_name}");

    let range = wb.worksheet_range(&sheet_name)?;
    let (height, width) = range.get_size();
    println!("Size: {height} rows x {width} cols");

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|r| r.iter().map(|c| cell_str(c).trim().to_string()).collect())
        .unwrap_or_default();
    let missing: Vec<&str> = COLUMNS
        .iter()
        .copied()
        .filter(|c| !headers.iter().any(|h| h == c))
        .collect();
    let unknown: Vec<&str> = headers
        .iter()
        .map(String::as_str)
        .filter(|h| !h.is_empty() && !COLUMNS.contains(h))
        .collect();
    println!("Missing columns: {}", if missing.is_empty() { "-".to_string() } else { missing.join(", ") });
    println!("Extra columns:   {}", if unknown.is_empty() { "-".to_string() } else { unknown.join(", ") });

    let col = |name: &str| headers.iter().position(|h| h == name);
    let (id_col, stock_col, price_col, abv_col) = (col("id"), col("in_stock"), col("price"), col("abv"));

    println!("\nFirst {take} data rows (id | stock | abv | price):");
    for (i, row) in rows.take(take).enumerate() {
        let cell = |idx: Option<usize>| {
            idx.and_then(|j| row.get(j))
                .map(cell_str)
                .unwrap_or_default()
        };
        let stock = cell(stock_col);
        println!(
            "  {}: {} | {} ({}) | {:?} | {:?}",
            i + 2,
            cell(id_col),
            stock,
            StockStatus::classify(&stock).as_str(),
            parse_number(&cell(abv_col)),
            parse_number(&cell(price_col)),
        );
    }
    Ok(())
}
