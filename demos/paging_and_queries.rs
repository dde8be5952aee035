/// Paging, Search and Sort Example
///
/// This example demonstrates:
/// - Slicing a table into pages
/// - Case-insensitive keyword search
/// - Type-aware sorting with missing values last
/// - Driving all three through a Session

use casetable::{ColumnValue, Page, PagingView, QueryEngine, RecordTable, Row, Session, SessionConfig, SortOrder};

const PROVINCES: [&str; 4] = ["Hanoi", "Ho Chi Minh", "Da Nang", "Hue"];

fn print_page(page: &Page) {
    println!("   Page {}/{}:", page.number(), page.total_pages());
    for row in page.rows() {
        println!("     {} {:<12} {}", row["date"], row["province"], row["cases"]);
    }
}

fn main() {
    println!("=== CaseTable Paging and Queries Example ===\n");

    let columns = vec!["date".to_string(), "province".to_string(), "cases".to_string()];
    let mut table = RecordTable::new(columns);
    for i in 0..23 {
        let mut row = Row::new();
        row.insert("date".to_string(), ColumnValue::from(format!("2020-03-{:02}", i + 1)));
        row.insert("province".to_string(), ColumnValue::from(PROVINCES[i % PROVINCES.len()]));
        let cases = if i % 7 == 3 { ColumnValue::Null } else { ColumnValue::Int64((i * 13 % 40) as i64) };
        row.insert("cases".to_string(), cases);
        table.add(row);
    }

    // 1. Stateless paging
    println!("1. Paging 23 rows, 10 per page...");
    println!("   Total pages: {}", PagingView::total_pages(&table, 10).unwrap());
    print_page(&PagingView::page(&table, 3, 10).unwrap());
    println!("   Page 99 clamps to {}\n", PagingView::page(&table, 99, 10).unwrap().number());

    // 2. Search
    println!("2. Searching province for 'HO'...");
    let found = QueryEngine::search(&table, &["province"], "HO").unwrap();
    println!("   {} matches\n", found.row_count());

    // 3. Sort
    println!("3. Sorting by cases, descending...");
    let sorted = QueryEngine::sort(&table, "cases", SortOrder::Descending).unwrap();
    print_page(&PagingView::page(&sorted, 1, 5).unwrap());
    println!("   Last rows hold the missing counts:");
    print_page(&PagingView::page(&sorted, 5, 5).unwrap());
    println!();

    // 4. Session
    println!("4. Same steps through a session...");
    let mut session = Session::new(SessionConfig::default().with_page_size(5)).unwrap();
    session.open(table);
    session.next_page().unwrap();
    let page = session.search("province", "hue").unwrap();
    print_page(&page);

    session.clear_search().unwrap();
    match session.goto_page(9) {
        Ok(_) => println!("   Unexpected success"),
        Err(e) => println!("   goto_page(9): {}", e),
    }
    let removed = session.delete_on_page(&[0, 1]).unwrap();
    println!("   Deleted {} rows, {} records left\n", removed, session.total_records());

    println!("=== Example Complete ===");
}
