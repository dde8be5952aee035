/// Data Cleaning Example
///
/// This example demonstrates:
/// - Loading messy case records from CSV
/// - Inspecting data-quality issues
/// - Running the cleaning pipeline with selected passes

use casetable::io::{read_csv, to_json};
use casetable::{CleaningConfig, CleaningPipeline};

const MESSY: &str = "\
date,country,cases
2020-03-01,Vietnam,10
2020-03-01,vietnam ,10
2020/03/02,Laos,
yesterday,Thailand,7
,CAMBODIA,3
";

fn main() {
    println!("=== CaseTable Cleaning Example ===\n");

    let table = read_csv(MESSY.as_bytes()).unwrap();

    // 1. Inspect
    println!("1. Inspecting...");
    let report = CleaningPipeline::default().inspect(Some(&table)).unwrap();
    println!("{}\n", report);

    // 2. Clean with only some passes
    println!("2. Case standardisation only...");
    let config = CleaningConfig::none().with_case_standardization(true);
    let (partial, _) = CleaningPipeline::new(config).clean(Some(&table)).unwrap();
    println!("   Rows: {}, missing cells: {}\n", partial.row_count(), partial.missing_count());

    // 3. Full pipeline
    println!("3. Full pipeline...");
    let (cleaned, report) = CleaningPipeline::default().clean(Some(&table)).unwrap();
    println!("{}\n", report);
    println!("{}\n", to_json(&cleaned).unwrap());

    // 4. Nothing loaded
    println!("4. Cleaning without a table...");
    if let Err(e) = CleaningPipeline::default().clean(None) {
        println!("   {}\n", e);
    }

    println!("=== Example Complete ===");
}
