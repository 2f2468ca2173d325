// End-to-end allocation: load diagram on disk -> allocation -> exports -> offer.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use energy_desk::app::pipeline::run_allocation;
use energy_desk::data::{generate_profile, write_profile_csv};
use energy_desk::domain::{AllocConfig, Product, SampleConfig};
use energy_desk::io::export::write_allocation;
use energy_desk::io::offer::{Offer, write_offer};
use energy_desk::io::table::read_file;
use tempfile::TempDir;

fn alloc_config(input: PathBuf, out: &TempDir) -> AllocConfig {
    AllocConfig {
        input,
        client: Some("Pivovar Hradec".to_string()),
        valid_until: NaiveDate::from_ymd_opt(2025, 12, 31),
        offer: true,
        output_dir: out.path().join("outputs"),
        exports: vec![],
        plot: false,
        plot_width: 80,
        plot_height: 20,
    }
}

fn write_sample(dir: &TempDir, seed: u64) -> PathBuf {
    let path = dir.path().join("profile.csv");
    let series = generate_profile(&SampleConfig {
        output: path.clone(),
        seed,
        year: 2025,
        base_mwh: 2.0,
    })
    .unwrap();
    write_profile_csv(&path, &series).unwrap();
    path
}

#[test]
fn generated_profile_is_conserved_and_complete() {
    energy_desk::logging::init_test();
    let dir = TempDir::new().unwrap();
    let input = write_sample(&dir, 11);

    let run = run_allocation(&alloc_config(input, &dir)).unwrap();

    assert_eq!(run.load.series.len(), 8760);
    assert!(run.load.row_errors.is_empty());
    assert_eq!(run.table.rows.len(), 18);

    let total = run.load.series.total_mwh();
    assert!((run.table.total_mwh() - total).abs() < 1e-6 * total);

    // A 2 MWh/h profile with ±35 % daily swing clears the CAL threshold.
    assert!(run.allocation.cal >= 1000.0);
    assert!(run.table.volume(Product::Spot).unwrap() > 0.0);
    assert!(run.table.rows.iter().all(|r| r.volume_mwh >= 0.0));
}

#[test]
fn rerun_gives_identical_allocation() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(&dir, 5);
    let config = alloc_config(input, &dir);

    let a = run_allocation(&config).unwrap();
    let b = run_allocation(&config).unwrap();
    assert_eq!(a.allocation, b.allocation);
    assert_eq!(a.table, b.table);
}

#[test]
fn flat_year_goes_entirely_to_cal() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("flat.csv");
    let start = NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut text = String::from("date,MWh\n");
    for h in 0..8760 {
        let ts = start + chrono::Duration::hours(h);
        text.push_str(&format!("{},1.0\n", ts.format("%Y-%m-%d %H:%M")));
    }
    fs::write(&input, text).unwrap();

    let run = run_allocation(&alloc_config(input, &dir)).unwrap();
    assert!((run.table.volume(Product::Cal).unwrap() - 8760.0).abs() < 1e-9);
    assert_eq!(run.table.forward_mwh(), run.table.volume(Product::Cal).unwrap());
    assert_eq!(run.table.volume(Product::Spot), Some(0.0));
}

#[test]
fn exports_and_offer_are_written() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(&dir, 9);
    let config = alloc_config(input, &dir);
    let run = run_allocation(&config).unwrap();

    let csv_path = dir.path().join("allocation.csv");
    let json_path = dir.path().join("allocation.json");
    let xlsx_path = dir.path().join("allocation.xlsx");
    write_allocation(&csv_path, &run.table).unwrap();
    write_allocation(&json_path, &run.table).unwrap();
    write_allocation(&xlsx_path, &run.table).unwrap();

    let csv_text = fs::read_to_string(&csv_path).unwrap();
    let labels: Vec<&str> = csv_text
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap())
        .collect();
    let expected: Vec<&str> = Product::ALL.iter().map(|p| p.label()).collect();
    assert_eq!(labels, expected);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 18);

    let workbook = read_file(&xlsx_path).unwrap();
    assert_eq!(workbook.headers, vec!["product", "volume_mwh"]);
    assert_eq!(workbook.len(), 18);
    for (i, row) in run.table.rows.iter().enumerate() {
        assert_eq!(workbook.cell(i, 0), row.product.label());
        let volume: f64 = workbook.cell(i, 1).parse().unwrap();
        assert!((volume - row.volume_mwh).abs() < 1e-9 * row.volume_mwh.max(1.0));
    }

    let offer = Offer {
        client: config.client.as_deref().unwrap(),
        generated: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        valid_until: config.valid_until,
        table: &run.table,
    };
    let path = write_offer(&config.output_dir, &offer).unwrap();
    assert_eq!(path.file_name().unwrap(), "Pivovar_Hradec_nabidka.md");
    let text = fs::read_to_string(path).unwrap();
    assert!(text.contains("Platnost nabídky do: 31.12.2025"));
    assert!(text.contains("| M12 |"));
}

#[test]
fn unsupported_input_fails_with_source_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("load.pdf");
    fs::write(&input, "not a table").unwrap();

    let err = run_allocation(&alloc_config(input, &dir)).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
