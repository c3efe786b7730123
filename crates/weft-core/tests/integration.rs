//! Integration tests for the import_rows() pipeline.
//!
//! Uses a MockRegistry in place of a product backend, so these tests run
//! without any network service.

use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use weft_core::calc::outcome::{ConfidenceLevel, Scope};
use weft_core::error::WeftError;
use weft_core::extraction::{DelimitedReader, RowReader};
use weft_core::model::{CellValue, Material, RawRow};
use weft_core::parsing::parse_raw_rows_json;
use weft_core::sku::{ExistingSkuCheck, SkuRegistry};
use weft_core::template::{example_rows, header_row, Locale};
use weft_core::{import_rows, ImportOptions};

struct MockRegistry {
    skus: Result<Vec<String>, String>,
    calls: AtomicUsize,
}

impl MockRegistry {
    fn with(skus: &[&str]) -> Self {
        MockRegistry {
            skus: Ok(skus.iter().map(|s| s.to_string()).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(reason: &str) -> Self {
        MockRegistry {
            skus: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl SkuRegistry for MockRegistry {
    fn existing_skus(&self) -> Result<Vec<String>, WeftError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.skus.clone().map_err(WeftError::SkuRegistry)
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

fn raw(pairs: &[(&str, &str)]) -> RawRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), CellValue::from(*v)))
        .collect()
}

fn scenario_a() -> RawRow {
    raw(&[
        ("sku", "TS-001"),
        ("productName", "Basic tee"),
        ("productType", "tshirt"),
        ("quantity", "10"),
        ("weightPerUnit", "200"),
        ("primaryMaterial", "cotton"),
        ("primaryMaterialPercentage", "100"),
        ("materialSource", "domestic"),
        ("processes", "cutting"),
        ("energySource", "grid"),
        ("marketType", "export"),
        ("exportCountry", "eu"),
        ("transportMode", "sea"),
    ])
}

// ---------------------------------------------------------------------------
// Scenario A end to end
// ---------------------------------------------------------------------------
#[test]
fn scenario_a_through_the_pipeline() {
    let report = import_rows(&[scenario_a()], &ImportOptions::default());

    assert!(report.validation.is_valid);
    let calculated = &report.calculated[0];
    assert_eq!(calculated.breakdown.materials_co2, dec!(1.28));
    assert_eq!(calculated.breakdown.manufacturing_co2, dec!(0.06));
    assert_eq!(calculated.breakdown.transport_co2, dec!(0.032));
    assert_eq!(calculated.calculated_co2, dec!(1.372));
    assert_eq!(calculated.scope, Scope::Scope1To3);
    assert_eq!(calculated.confidence_level, ConfidenceLevel::High);

    assert_eq!(report.stats.total_quantity, 10);
    assert_eq!(report.stats.total_co2, dec!(13.72));
    assert!(report.existing_skus.is_none());
}

// ---------------------------------------------------------------------------
// Implausible magnitudes are rejected before calculation
// ---------------------------------------------------------------------------
#[test]
fn implausible_row_is_rejected_without_panicking() {
    let mut huge = scenario_a();
    huge.insert("weightPerUnit".into(), CellValue::from("1000000000000"));
    huge.insert(
        "primaryMaterialPercentage".into(),
        CellValue::from("1000000000000000000000"),
    );
    let report = import_rows(&[huge, scenario_a()], &ImportOptions::default());

    assert_eq!(report.validation.error_count, 1);
    assert_eq!(report.validation.invalid_rows[0].row, 2);
    assert_eq!(report.calculated.len(), 1);
    assert_eq!(report.stats.total_co2, dec!(13.72));
}

// ---------------------------------------------------------------------------
// Vietnamese CSV with messy headers and values
// ---------------------------------------------------------------------------
#[test]
fn vietnamese_csv_import() {
    let csv = "\u{feff}Mã SKU *,Tên sản phẩm,LOAI_SAN_PHAM,SL,Khối lượng (g),Chất liệu,Tỷ lệ chất liệu chính,Xuất xứ nguyên liệu,Công đoạn,Năng lượng,Thị trường,Nước xuất khẩu,Vận chuyển,Ghi chú\n\
AT-01,Áo thun trơn,Áo thun,1000,\"180,5\",Bông,100,Trong nước,Dệt kim; Cắt may | Nhuộm,Điện lưới,Xuất khẩu,Nhật Bản,Đường biển,\n\
QJ-02,Quần jean,quan jean,500,650,sợi tre lạ,100,nhap khau,dệt,than,noi dia,,xe tải,gấp\n\
AT-01,Áo thun trơn (size L),Áo thun,200,0,Bông,100,Trong nước,Cắt may,Điện lưới,Xuất khẩu,Nhật Bản,Đường biển,\n";

    let rows = DelimitedReader::default().read_rows(csv.as_bytes()).unwrap();
    assert_eq!(rows.len(), 3);

    let report = import_rows(&rows, &ImportOptions::default());
    let v = &report.validation;

    assert_eq!(v.total_rows, 3);
    assert_eq!(v.valid_count, 2);
    assert_eq!(v.error_count, 1);
    assert_eq!(v.invalid_rows[0].row, 4);
    assert_eq!(v.invalid_rows[0].errors[0].field, "weightPerUnit");

    // The unrecognised fibre is accepted and priced with the default factor.
    let jeans = &v.valid_rows[1];
    assert_eq!(jeans.primary_material, Material::Other("soi_tre_la".into()));
    assert!(v
        .warnings
        .iter()
        .any(|w| w.row == 3 && w.field == "primaryMaterial"));

    // Row 4 is invalid, so AT-01 is not a batch duplicate.
    assert!(!v.warnings.iter().any(|w| w.field == "sku"));

    assert_eq!(report.calculated.len(), 2);
    assert_eq!(report.stats.total_quantity, 1500);
}

// ---------------------------------------------------------------------------
// Template headers map back to canonical keys in both locales
// ---------------------------------------------------------------------------
#[test]
fn template_round_trip() {
    for locale in [Locale::En, Locale::Vi] {
        let headers = header_row(locale);
        let rows: Vec<RawRow> = example_rows()
            .into_iter()
            .map(|values| {
                headers
                    .iter()
                    .cloned()
                    .zip(values.into_iter().map(CellValue::Text))
                    .collect()
            })
            .collect();

        let report = import_rows(&rows, &ImportOptions::default());
        assert_eq!(report.validation.valid_count, 2, "locale {locale:?}");
        assert_eq!(report.validation.warning_count, 0, "locale {locale:?}");
        assert_eq!(report.validation.valid_rows[1].accessories, vec!["zipper", "buttons"]);
    }
}

// ---------------------------------------------------------------------------
// Registry collaborator
// ---------------------------------------------------------------------------
#[test]
fn existing_skus_are_flagged() {
    let registry = MockRegistry::with(&["ts-001"]);
    let options = ImportOptions {
        sku_registry: Some(&registry),
        ..ImportOptions::default()
    };
    let report = import_rows(&[scenario_a()], &options);

    assert_eq!(registry.calls.load(Ordering::SeqCst), 1);
    match report.existing_skus {
        Some(ExistingSkuCheck::Checked { ref warnings }) => {
            assert_eq!(warnings.len(), 1);
            assert_eq!(warnings[0].row, 2);
        }
        ref other => panic!("expected a completed check, got {other:?}"),
    }
    assert_eq!(report.all_warnings().len(), 1);
}

#[test]
fn registry_failure_does_not_block_import() {
    let registry = MockRegistry::failing("timeout");
    let options = ImportOptions {
        sku_registry: Some(&registry),
        ..ImportOptions::default()
    };
    let report = import_rows(&[scenario_a()], &options);

    assert_eq!(report.calculated.len(), 1);
    assert!(matches!(
        report.existing_skus,
        Some(ExistingSkuCheck::Unavailable { ref reason }) if reason.contains("timeout")
    ));
}

// ---------------------------------------------------------------------------
// Batch invariants
// ---------------------------------------------------------------------------
#[test]
fn every_row_lands_exactly_once() {
    let mut missing_name = scenario_a();
    missing_name.remove("productName");
    let mut duplicate = scenario_a();
    duplicate.insert("quantity".into(), CellValue::Number(5.0));

    let rows = vec![scenario_a(), missing_name, RawRow::new(), duplicate];
    let report = import_rows(&rows, &ImportOptions::default());
    let v = &report.validation;

    assert_eq!(v.valid_count + v.error_count, v.total_rows);
    assert_eq!(v.valid_count, 2);
    let invalid: Vec<usize> = v.invalid_rows.iter().map(|r| r.row).collect();
    assert_eq!(invalid, vec![3, 4]);

    let dupes: Vec<usize> = v
        .warnings
        .iter()
        .filter(|w| w.field == "sku")
        .map(|w| w.row)
        .collect();
    assert_eq!(dupes, vec![2, 5]);
}

#[test]
fn calculation_is_deterministic() {
    let first = import_rows(&[scenario_a()], &ImportOptions::default());
    let second = import_rows(&[scenario_a()], &ImportOptions::default());
    assert_eq!(first.calculated, second.calculated);
    assert_eq!(first.stats, second.stats);
}

// ---------------------------------------------------------------------------
// JSON row input
// ---------------------------------------------------------------------------
#[test]
fn json_rows_feed_the_pipeline() {
    let json = r#"[
        {
            "SKU": "BG-7", "Product name": "Tote", "Product type": "túi",
            "Quantity": 40, "Weight per unit (g)": 350.0,
            "Primary material": "hemp", "Primary material percentage (%)": 100,
            "Material source": "imported", "Production processes": "weaving, printing",
            "Energy source": "solar", "Market type": "domestic", "Transport mode": "road",
            "Export country": null
        }
    ]"#;
    let rows = parse_raw_rows_json(json).unwrap();
    let report = import_rows(&rows, &ImportOptions::default());
    assert!(report.validation.is_valid);
    assert_eq!(report.calculated[0].row.quantity, 40);
    assert_eq!(report.calculated[0].confidence_level, ConfidenceLevel::High);

    assert!(matches!(
        parse_raw_rows_json(r#""not rows""#),
        Err(WeftError::InvalidShape(_))
    ));
}
