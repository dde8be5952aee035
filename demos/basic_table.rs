/// Basic Record Table Example
///
/// This example demonstrates:
/// - Creating a table with a column list
/// - Adding, updating, and deleting records
/// - Reading values back

use casetable::{ColumnValue, RecordTable, Row};

fn record(date: &str, province: &str, cases: i64) -> Row {
    let mut row = Row::new();
    row.insert("date".to_string(), ColumnValue::from(date));
    row.insert("province".to_string(), ColumnValue::from(province));
    row.insert("cases".to_string(), ColumnValue::Int64(cases));
    row
}

fn main() {
    println!("=== CaseTable Basic Table Example ===\n");

    // 1. Create a table
    println!("1. Creating table...");
    let columns = vec!["date".to_string(), "province".to_string(), "cases".to_string()];
    let mut cases = RecordTable::new(columns);
    println!("   Table created with columns {:?}\n", cases.columns());

    // 2. Add records
    println!("2. Adding records...");
    cases.add(record("2020-03-01", "Hanoi", 12));
    cases.add(record("2020-03-01", "Da Nang", 3));
    cases.add(record("2020-03-02", "Hue", 1));

    // Missing keys become Null; unknown keys are dropped.
    let mut partial = Row::new();
    partial.insert("province".to_string(), ColumnValue::from("Can Tho"));
    partial.insert("deaths".to_string(), ColumnValue::Int64(0));
    cases.add(partial);
    println!("   Added {} records\n", cases.row_count());

    // 3. Read data
    println!("3. Reading data...");
    for (i, row) in cases.all_rows().iter().enumerate() {
        println!(
            "   Row {}: {} {} (cases: {})",
            i,
            row["date"],
            row["province"],
            if row["cases"].is_null() { "N/A".to_string() } else { row["cases"].to_string() }
        );
    }
    println!();

    // 4. Update a record
    println!("4. Updating row 3...");
    let mut change = Row::new();
    change.insert("cases".to_string(), ColumnValue::Int64(5));
    cases.update(3, change).unwrap();
    println!("   Row 3 cases: {}\n", cases.value(3, "cases").unwrap());

    // 5. Invalid updates are rejected and change nothing
    println!("5. Updating row 10...");
    match cases.update(10, Row::new()) {
        Ok(()) => println!("   Unexpected success"),
        Err(e) => println!("   Rejected: {}\n", e),
    }

    // 6. Delete records
    println!("6. Deleting rows 0 and 2...");
    let removed = cases.delete_many(&[0, 2]).unwrap();
    println!("   Removed {} rows, {} left", removed, cases.row_count());
    println!("   Mean cases: {:?}\n", cases.mean("cases").unwrap());

    println!("=== Example Complete ===");
}
