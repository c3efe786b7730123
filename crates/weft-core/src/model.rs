use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single spreadsheet cell as handed over by a file parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    #[default]
    Blank,
}

impl CellValue {
    /// Blank cells and whitespace-only text count as missing. `0` does not.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Blank => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Trimmed textual form of the cell, or `None` when blank.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Blank => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(f) => Some(f.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Number(f)
    }
}

/// A raw row keyed by whatever header text the spreadsheet used.
pub type RawRow = BTreeMap<String, CellValue>;

macro_rules! code_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(&self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn from_code(code: &str) -> Option<$name> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.code())
            }
        }
    };
}

code_enum!(
    /// Canonical column keys of the bulk-import template, in schema order.
    Field {
        Sku => "sku",
        ProductName => "productName",
        ProductType => "productType",
        Quantity => "quantity",
        WeightPerUnit => "weightPerUnit",
        PrimaryMaterial => "primaryMaterial",
        PrimaryMaterialPercentage => "primaryMaterialPercentage",
        SecondaryMaterial => "secondaryMaterial",
        SecondaryMaterialPercentage => "secondaryMaterialPercentage",
        Accessories => "accessories",
        MaterialSource => "materialSource",
        Processes => "processes",
        EnergySource => "energySource",
        MarketType => "marketType",
        ExportCountry => "exportCountry",
        TransportMode => "transportMode",
    }
);

code_enum!(ProductType {
    Tshirt => "tshirt",
    Pants => "pants",
    Dress => "dress",
    Jacket => "jacket",
    Shoes => "shoes",
    Bag => "bag",
    Accessories => "accessories",
    Other => "other",
});

code_enum!(MaterialSource {
    Domestic => "domestic",
    Imported => "imported",
    Unknown => "unknown",
});

code_enum!(EnergySource {
    Grid => "grid",
    Solar => "solar",
    Coal => "coal",
    Mixed => "mixed",
});

code_enum!(MarketType {
    Domestic => "domestic",
    Export => "export",
});

code_enum!(ExportCountry {
    Eu => "eu",
    Us => "us",
    Jp => "jp",
    Kr => "kr",
    Other => "other",
});

code_enum!(TransportMode {
    Road => "road",
    Sea => "sea",
    Air => "air",
    Rail => "rail",
    Multimodal => "multimodal",
});

/// Material family. Unrecognised materials keep a slug of the original text
/// so they reach the calculation with a generic factor instead of being lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Material {
    Cotton,
    OrganicCotton,
    RecycledPolyester,
    Polyester,
    Nylon,
    Wool,
    Silk,
    Linen,
    Bamboo,
    Hemp,
    Blend,
    Other(String),
}

impl Material {
    pub const KNOWN_CODES: &'static [&'static str] = &[
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

    pub fn code(&self) -> &str {
        match self {
            Material::Cotton => "cotton",
            Material::OrganicCotton => "organic_cotton",
            Material::RecycledPolyester => "recycled_polyester",
            Material::Polyester => "polyester",
            Material::Nylon => "nylon",
            Material::Wool => "wool",
            Material::Silk => "silk",
            Material::Linen => "linen",
            Material::Bamboo => "bamboo",
            Material::Hemp => "hemp",
            Material::Blend => "blend",
            Material::Other(slug) => slug,
        }
    }

    pub fn from_code(code: &str) -> Material {
        match code {
            "cotton" => Material::Cotton,
            "organic_cotton" => Material::OrganicCotton,
            "recycled_polyester" => Material::RecycledPolyester,
            "polyester" => Material::Polyester,
            "nylon" => Material::Nylon,
            "wool" => Material::Wool,
            "silk" => Material::Silk,
            "linen" => Material::Linen,
            "bamboo" => Material::Bamboo,
            "hemp" => Material::Hemp,
            "blend" => Material::Blend,
            other => Material::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Material::Other(_))
    }
}

impl From<String> for Material {
    fn from(s: String) -> Self {
        Material::from_code(&s)
    }
}

impl From<Material> for String {
    fn from(m: Material) -> Self {
        m.code().to_string()
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Production process. Unmapped processes keep a slug of the original text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Process {
    Knitting,
    Weaving,
    CuttingSewing,
    Dyeing,
    Printing,
    Finishing,
    Other(String),
}

impl Process {
    pub const KNOWN_CODES: &'static [&'static str] = &[
        "knitting",
        "weaving",
        "cutting_sewing",
        "dyeing",
        "printing",
        "finishing",
    ];

    pub fn code(&self) -> &str {
        match self {
            Process::Knitting => "knitting",
            Process::Weaving => "weaving",
            Process::CuttingSewing => "cutting_sewing",
            Process::Dyeing => "dyeing",
            Process::Printing => "printing",
            Process::Finishing => "finishing",
            Process::Other(slug) => slug,
        }
    }

    pub fn from_code(code: &str) -> Process {
        match code {
            "knitting" => Process::Knitting,
            "weaving" => Process::Weaving,
            "cutting_sewing" => Process::CuttingSewing,
            "dyeing" => Process::Dyeing,
            "printing" => Process::Printing,
            "finishing" => Process::Finishing,
            other => Process::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Process::Other(_))
    }
}

impl From<String> for Process {
    fn from(s: String) -> Self {
        Process::from_code(&s)
    }
}

impl From<Process> for String {
    fn from(p: Process) -> Self {
        p.code().to_string()
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validated bulk-import row, keyed by canonical fields.
///
/// `energy_source` and `transport_mode` stay optional so the calculation
/// engine can score incomplete rows; the validator guarantees both are set
/// for rows it accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkProductRow {
    /// 1-based spreadsheet row this product came from.
    #[serde(default)]
    pub source_row: usize,
    pub sku: String,
    pub product_name: String,
    pub product_type: ProductType,
    pub quantity: u32,
    /// Grams per unit.
    pub weight_per_unit: Decimal,
    pub primary_material: Material,
    pub primary_material_percentage: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_material: Option<Material>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_material_percentage: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessories: Vec<String>,
    pub material_source: MaterialSource,
    #[serde(default)]
    pub processes: Vec<Process>,
    #[serde(default)]
    pub energy_source: Option<EnergySource>,
    pub market_type: MarketType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_country: Option<ExportCountry>,
    #[serde(default)]
    pub transport_mode: Option<TransportMode>,
}
