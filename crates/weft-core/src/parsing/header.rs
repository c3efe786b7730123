use crate::model::Field;
use crate::parsing::normalize::Dictionary;
use crate::template::{Locale, COLUMNS};
use std::sync::LazyLock;

/// Header dictionary: canonical keys, both template locales, then the alias
/// table. Earlier entries win when two spellings normalize to the same key.
pub static HEADERS: LazyLock<Dictionary> = LazyLock::new(|| {
    let mut dictionary = Dictionary::from_aliases("header", &[]);

    for column in COLUMNS {
        let code = column.field.code();
        dictionary.insert(code, code);
        for locale in [Locale::En, Locale::Vi] {
            dictionary.insert(column.label(locale), code);
            dictionary.insert(&column.header(locale), code);
        }
    }

    for &(spelling, code) in HEADER_ALIASES {
        dictionary.insert(spelling, code);
    }

    dictionary
});

/// Resolve a spreadsheet header to its canonical field.
pub fn map_header(raw: &str) -> Option<Field> {
    HEADERS.get(raw).and_then(Field::from_code)
}

const HEADER_ALIASES: &[(&str, &str)] = &[
    ("mã sản phẩm", "sku"),
    ("mã sp", "sku"),
    ("mã hàng", "sku"),
    ("product code", "sku"),
    ("item code", "sku"),
    ("style no", "sku"),
    ("tên sản phẩm", "productName"),
    ("tên hàng", "productName"),
    ("tên", "productName"),
    ("name", "productName"),
    ("product", "productName"),
    ("loại", "productType"),
    ("danh mục", "productType"),
    ("type", "productType"),
    ("category", "productType"),
    ("số lượng", "quantity"),
    ("sl", "quantity"),
    ("qty", "quantity"),
    ("units", "quantity"),
    ("khối lượng", "weightPerUnit"),
    ("trọng lượng", "weightPerUnit"),
    ("khối lượng (g)", "weightPerUnit"),
    ("weight", "weightPerUnit"),
    ("weight (g)", "weightPerUnit"),
    ("unit weight", "weightPerUnit"),
    ("weight per unit (gram)", "weightPerUnit"),
    ("chất liệu chính", "primaryMaterial"),
    ("chất liệu", "primaryMaterial"),
    ("material", "primaryMaterial"),
    ("main material", "primaryMaterial"),
    ("tỷ lệ chất liệu chính", "primaryMaterialPercentage"),
    ("main material percentage", "primaryMaterialPercentage"),
    ("primary material pct", "primaryMaterialPercentage"),
    ("chất liệu phụ", "secondaryMaterial"),
    ("material 2", "secondaryMaterial"),
    ("tỷ lệ chất liệu phụ", "secondaryMaterialPercentage"),
    ("secondary material pct", "secondaryMaterialPercentage"),
    ("phụ kiện", "accessories"),
    ("trims", "accessories"),
    ("xuất xứ nguyên liệu", "materialSource"),
    ("material origin", "materialSource"),
    ("source", "materialSource"),
    ("quy trình", "processes"),
    ("công đoạn", "processes"),
    ("process", "processes"),
    ("production process", "processes"),
    ("năng lượng", "energySource"),
    ("energy", "energySource"),
    ("power source", "energySource"),
    ("loại thị trường", "marketType"),
    ("market", "marketType"),
    ("nước xuất khẩu", "exportCountry"),
    ("thị trường xuất khẩu", "exportCountry"),
    ("export market", "exportCountry"),
    ("destination", "exportCountry"),
    ("country", "exportCountry"),
    ("vận chuyển", "transportMode"),
    ("transport", "transportMode"),
    ("shipping mode", "transportMode"),
    ("logistics", "transportMode"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::header_row;

    #[test]
    fn test_canonical_keys_resolve() {
        for field in Field::ALL {
            assert_eq!(map_header(field.code()), Some(*field));
        }
    }

    #[test]
    fn test_template_headers_round_trip() {
        for locale in [Locale::En, Locale::Vi] {
            let mapped: Vec<Option<Field>> =
                header_row(locale).iter().map(|h| map_header(h)).collect();
            let expected: Vec<Option<Field>> = Field::ALL.iter().copied().map(Some).collect();
            assert_eq!(mapped, expected);
        }
    }

    #[test]
    fn test_aliases_and_spelling_variants() {
        assert_eq!(map_header("Thị trường"), Some(Field::MarketType));
        assert_eq!(map_header("THI_TRUONG"), Some(Field::MarketType));
        assert_eq!(map_header("qty"), Some(Field::Quantity));
        assert_eq!(map_header("Weight (g)"), Some(Field::WeightPerUnit));
        assert_eq!(map_header("weight_per_unit"), Some(Field::WeightPerUnit));
        assert_eq!(map_header("Mã hàng"), Some(Field::Sku));
    }

    #[test]
    fn test_percentage_headers_do_not_collide_with_material() {
        assert_eq!(
            map_header("Tỷ lệ nguyên liệu chính (%)"),
            Some(Field::PrimaryMaterialPercentage)
        );
        assert_eq!(map_header("Nguyên liệu chính"), Some(Field::PrimaryMaterial));
    }

    #[test]
    fn test_unknown_header() {
        assert_eq!(map_header("Ghi chú"), None);
        assert_eq!(map_header(""), None);
    }
}
