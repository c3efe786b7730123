//! Bulk-import template schema.
//!
//! The column list here is the single source for the spreadsheet contract:
//! header labels in both locales, required flags, enumerated value domains
//! and example rows. The header dictionary in `parsing::header` is derived
//! from it, so every generated header maps back to its canonical key.

use crate::model::Field;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Vi,
}

impl Locale {
    pub fn from_str_loose(s: &str) -> Option<Locale> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Locale::En),
            "vi" | "vn" | "vietnamese" | "tiếng việt" => Some(Locale::Vi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateColumn {
    pub field: Field,
    pub label_en: &'static str,
    pub label_vi: &'static str,
    pub required: bool,
    /// Canonical codes accepted in this column; empty for free-form columns.
    pub allowed: &'static [&'static str],
    pub description: &'static str,
}

impl TemplateColumn {
    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.label_en,
            Locale::Vi => self.label_vi,
        }
    }

    /// Header cell text; required columns carry a trailing ` *`.
    pub fn header(&self, locale: Locale) -> String {
        if self.required {
            format!("{} *", self.label(locale))
        } else {
            self.label(locale).to_string()
        }
    }
}

pub const PRODUCT_TYPE_CODES: &[&str] = &[
    "tshirt",
    "pants",
    "dress",
    "jacket",
    "shoes",
    "bag",
    "accessories",
    "other",
];
pub const MATERIAL_CODES: &[&str] = &[
    "cotton",
    "organic_cotton",
    "recycled_polyester",
    "polyester",
    "nylon",
    "wool",
    "silk",
    "linen",
    "bamboo",
    "hemp",
    "blend",
];
pub const MATERIAL_SOURCE_CODES: &[&str] = &["domestic", "imported", "unknown"];
pub const PROCESS_CODES: &[&str] = &[
    "knitting",
    "weaving",
    "cutting_sewing",
    "dyeing",
    "printing",
    "finishing",
];
pub const ENERGY_SOURCE_CODES: &[&str] = &["grid", "solar", "coal", "mixed"];
pub const MARKET_TYPE_CODES: &[&str] = &["domestic", "export"];
pub const EXPORT_COUNTRY_CODES: &[&str] = &["eu", "us", "jp", "kr", "other"];
pub const TRANSPORT_MODE_CODES: &[&str] = &["road", "sea", "air", "rail", "multimodal"];

pub const COLUMNS: &[TemplateColumn] = &[
    TemplateColumn {
        field: Field::Sku,
        label_en: "SKU",
        label_vi: "Mã SKU",
        required: true,
        allowed: &[],
        description: "Unique product code",
    },
    TemplateColumn {
        field: Field::ProductName,
        label_en: "Product name",
        label_vi: "Tên sản phẩm",
        required: true,
        allowed: &[],
        description: "Display name of the product",
    },
    TemplateColumn {
        field: Field::ProductType,
        label_en: "Product type",
        label_vi: "Loại sản phẩm",
        required: true,
        allowed: PRODUCT_TYPE_CODES,
        description: "Garment category",
    },
    TemplateColumn {
        field: Field::Quantity,
        label_en: "Quantity",
        label_vi: "Số lượng",
        required: true,
        allowed: &[],
        description: "Units in the batch, positive whole number",
    },
    TemplateColumn {
        field: Field::WeightPerUnit,
        label_en: "Weight per unit (g)",
        label_vi: "Khối lượng mỗi sản phẩm (g)",
        required: true,
        allowed: &[],
        description: "Finished product weight in grams",
    },
    TemplateColumn {
        field: Field::PrimaryMaterial,
        label_en: "Primary material",
        label_vi: "Nguyên liệu chính",
        required: true,
        allowed: MATERIAL_CODES,
        description: "Main fabric fibre",
    },
    TemplateColumn {
        field: Field::PrimaryMaterialPercentage,
        label_en: "Primary material percentage (%)",
        label_vi: "Tỷ lệ nguyên liệu chính (%)",
        required: true,
        allowed: &[],
        description: "Share of the main fibre, 0-100",
    },
    TemplateColumn {
        field: Field::SecondaryMaterial,
        label_en: "Secondary material",
        label_vi: "Nguyên liệu phụ",
        required: false,
        allowed: MATERIAL_CODES,
        description: "Second fibre, if any",
    },
    TemplateColumn {
        field: Field::SecondaryMaterialPercentage,
        label_en: "Secondary material percentage (%)",
        label_vi: "Tỷ lệ nguyên liệu phụ (%)",
        required: false,
        allowed: &[],
        description: "Share of the second fibre, 0-100",
    },
    TemplateColumn {
        field: Field::Accessories,
        label_en: "Accessories",
        label_vi: "Phụ liệu",
        required: false,
        allowed: &[],
        description: "Free text, separate items with , ; or |",
    },
    TemplateColumn {
        field: Field::MaterialSource,
        label_en: "Material source",
        label_vi: "Nguồn nguyên liệu",
        required: true,
        allowed: MATERIAL_SOURCE_CODES,
        description: "Where the fabric comes from",
    },
    TemplateColumn {
        field: Field::Processes,
        label_en: "Production processes",
        label_vi: "Quy trình sản xuất",
        required: true,
        allowed: PROCESS_CODES,
        description: "One or more processes, separated by , ; or |",
    },
    TemplateColumn {
        field: Field::EnergySource,
        label_en: "Energy source",
        label_vi: "Nguồn năng lượng",
        required: true,
        allowed: ENERGY_SOURCE_CODES,
        description: "Main energy used by the factory",
    },
    TemplateColumn {
        field: Field::MarketType,
        label_en: "Market type",
        label_vi: "Thị trường",
        required: true,
        allowed: MARKET_TYPE_CODES,
        description: "Domestic sale or export",
    },
    TemplateColumn {
        field: Field::ExportCountry,
        label_en: "Export country",
        label_vi: "Quốc gia xuất khẩu",
        required: false,
        allowed: EXPORT_COUNTRY_CODES,
        description: "Required when market type is export",
    },
    TemplateColumn {
        field: Field::TransportMode,
        label_en: "Transport mode",
        label_vi: "Phương thức vận chuyển",
        required: true,
        allowed: TRANSPORT_MODE_CODES,
        description: "Main freight mode to the market",
    },
];

const EXAMPLE_ROWS: [[&str; 16]; 2] = [
    [
        "TS-001",
        "Basic cotton tee",
        "tshirt",
        "500",
        "200",
        "cotton",
        "100",
        "",
        "",
        "labels; buttons",
        "domestic",
        "knitting, cutting_sewing, dyeing",
        "grid",
        "export",
        "eu",
        "sea",
    ],
    [
        "PT-002",
        "Chino pants",
        "pants",
        "300",
        "450",
        "cotton",
        "65",
        "polyester",
        "35",
        "zipper | buttons",
        "imported",
        "weaving, cutting_sewing, finishing",
        "mixed",
        "domestic",
        "",
        "road",
    ],
];

pub fn column(field: Field) -> Option<&'static TemplateColumn> {
    COLUMNS.iter().find(|c| c.field == field)
}

pub fn required_fields() -> impl Iterator<Item = Field> {
    COLUMNS.iter().filter(|c| c.required).map(|c| c.field)
}

/// Header row of the import sheet, in schema order.
pub fn header_row(locale: Locale) -> Vec<String> {
    COLUMNS.iter().map(|c| c.header(locale)).collect()
}

/// Example data rows aligned with `header_row`.
pub fn example_rows() -> Vec<Vec<String>> {
    EXAMPLE_ROWS
        .iter()
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .collect()
}

/// Rows of the enumerated-values reference sheet: key, label, required,
/// accepted codes, description.
pub fn reference_rows(locale: Locale) -> Vec<Vec<String>> {
    COLUMNS
        .iter()
        .map(|c| {
            vec![
                c.field.code().to_string(),
                c.label(locale).to_string(),
                if c.required { "yes" } else { "no" }.to_string(),
                c.allowed.join(", "),
                c.description.to_string(),
            ]
        })
        .collect()
}
