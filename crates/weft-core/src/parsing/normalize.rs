use std::collections::HashMap;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Turn a raw header or cell value into a lookup key.
///
/// Steps:
/// 1. Trim and lowercase
/// 2. NFD-decompose and drop combining marks ("Thị" -> "thi")
/// 3. Fold the Vietnamese stroked d, which has no decomposition
/// 4. Drop everything outside `[a-z0-9]`
///
/// "Thị trường", "thi truong" and "THITRUONG" all become `thitruong`.
pub fn normalize_key(raw: &str) -> String {
    fold_diacritics(raw.trim())
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Build a readable snake_case code from free text that no dictionary knows,
/// e.g. "Sợi tre lạ" -> `soi_tre_la`.
pub fn slugify(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    for c in fold_diacritics(raw.trim()) {
        if c.is_ascii_alphanumeric() {
            normalized.push(c);
        } else {
            normalized.push('_');
        }
    }

    // Collapse multiple underscores and trim
    let mut result = String::with_capacity(normalized.len());
    let mut prev_underscore = true; // start true to skip leading underscores
    for c in normalized.chars() {
        if c == '_' {
            if !prev_underscore {
                result.push('_');
            }
            prev_underscore = true;
        } else {
            result.push(c);
            prev_underscore = false;
        }
    }
    if result.ends_with('_') {
        result.pop();
    }

    result
}

fn fold_diacritics(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars()
        .flat_map(char::to_lowercase)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == 'đ' { 'd' } else { c })
}

/// Lookup table from normalization key to canonical code.
#[derive(Debug, Clone)]
pub struct Dictionary {
    name: &'static str,
    entries: HashMap<String, &'static str>,
}

impl Dictionary {
    /// Build a dictionary from `(spelling, code)` pairs. Every spelling is
    /// normalized on insert, and each canonical code also maps to itself.
    pub fn from_aliases(name: &'static str, aliases: &[(&str, &'static str)]) -> Dictionary {
        let mut entries = HashMap::new();
        for &(_, code) in aliases {
            entries.insert(normalize_key(code), code);
        }
        for &(spelling, code) in aliases {
            entries.entry(normalize_key(spelling)).or_insert(code);
        }
        Dictionary { name, entries }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up a raw value. Empty keys never match.
    pub fn get(&self, raw: &str) -> Option<&'static str> {
        let key = normalize_key(raw);
        if key.is_empty() {
            return None;
        }
        self.entries.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, spelling: &str, code: &'static str) {
        let key = normalize_key(spelling);
        if !key.is_empty() {
            self.entries.entry(key).or_insert(code);
        }
    }
}

/// Normalize `raw` and return the dictionary hit, or `default` when nothing
/// matches. Garbled input never fails; it degrades to the default.
pub fn map_value(raw: &str, dictionary: &Dictionary, default: &'static str) -> &'static str {
    dictionary.get(raw).unwrap_or(default)
}

pub static PRODUCT_TYPES: LazyLock<Dictionary> = LazyLock::new(|| {
    Dictionary::from_aliases(
        "productType",
        &[
            ("t-shirt", "tshirt"),
            ("t shirt", "tshirt"),
            ("tee", "tshirt"),
            ("polo", "tshirt"),
            ("áo thun", "tshirt"),
            ("áo phông", "tshirt"),
            ("áo polo", "tshirt"),
            ("pants", "pants"),
            ("trousers", "pants"),
            ("jeans", "pants"),
            ("shorts", "pants"),
            ("quần", "pants"),
            ("quần dài", "pants"),
            ("quần jean", "pants"),
            ("quần short", "pants"),
            ("dress", "dress"),
            ("skirt", "dress"),
            ("váy", "dress"),
            ("đầm", "dress"),
            ("váy đầm", "dress"),
            ("chân váy", "dress"),
            ("jacket", "jacket"),
            ("coat", "jacket"),
            ("hoodie", "jacket"),
            ("blazer", "jacket"),
            ("áo khoác", "jacket"),
            ("shoes", "shoes"),
            ("sneaker", "shoes"),
            ("sneakers", "shoes"),
            ("footwear", "shoes"),
            ("sandal", "shoes"),
            ("giày", "shoes"),
            ("giày dép", "shoes"),
            ("dép", "shoes"),
            ("bag", "bag"),
            ("backpack", "bag"),
            ("handbag", "bag"),
            ("tote", "bag"),
            ("túi", "bag"),
            ("túi xách", "bag"),
            ("balo", "bag"),
            ("ba lô", "bag"),
            ("accessories", "accessories"),
            ("accessory", "accessories"),
            ("hat", "accessories"),
            ("cap", "accessories"),
            ("scarf", "accessories"),
            ("belt", "accessories"),
            ("phụ kiện", "accessories"),
            ("mũ", "accessories"),
            ("nón", "accessories"),
            ("khăn", "accessories"),
            ("thắt lưng", "accessories"),
            ("other", "other"),
            ("others", "other"),
            ("khác", "other"),
        ],
    )
});

pub static MATERIALS: LazyLock<Dictionary> = LazyLock::new(|| {
    Dictionary::from_aliases(
        "material",
        &[
            ("cotton", "cotton"),
            ("coton", "cotton"),
            ("cotton 100%", "cotton"),
            ("bông", "cotton"),
            ("bông vải", "cotton"),
            ("sợi bông", "cotton"),
            ("vải cotton", "cotton"),
            ("organic cotton", "organic_cotton"),
            ("cotton organic", "organic_cotton"),
            ("cotton hữu cơ", "organic_cotton"),
            ("bông hữu cơ", "organic_cotton"),
            ("recycled polyester", "recycled_polyester"),
            ("rpet", "recycled_polyester"),
            ("polyester tái chế", "recycled_polyester"),
            ("poly tái chế", "recycled_polyester"),
            ("polyester", "polyester"),
            ("poly", "polyester"),
            ("pes", "polyester"),
            ("sợi polyester", "polyester"),
            ("vải polyester", "polyester"),
            ("nylon", "nylon"),
            ("polyamide", "nylon"),
            ("ni lông", "nylon"),
            ("nilon", "nylon"),
            ("wool", "wool"),
            ("merino", "wool"),
            ("len", "wool"),
            ("lông cừu", "wool"),
            ("len lông cừu", "wool"),
            ("silk", "silk"),
            ("lụa", "silk"),
            ("tơ tằm", "silk"),
            ("linen", "linen"),
            ("flax", "linen"),
            ("lanh", "linen"),
            ("vải lanh", "linen"),
            ("bamboo", "bamboo"),
            ("bamboo viscose", "bamboo"),
            ("tre", "bamboo"),
            ("sợi tre", "bamboo"),
            ("vải tre", "bamboo"),
            ("hemp", "hemp"),
            ("gai dầu", "hemp"),
            ("sợi gai", "hemp"),
            ("blend", "blend"),
            ("mixed", "blend"),
            ("poly cotton", "blend"),
            ("cvc", "blend"),
            ("tc", "blend"),
            ("vải pha", "blend"),
            ("cotton pha", "blend"),
            ("hỗn hợp", "blend"),
        ],
    )
});

pub static MATERIAL_SOURCES: LazyLock<Dictionary> = LazyLock::new(|| {
    Dictionary::from_aliases(
        "materialSource",
        &[
            ("domestic", "domestic"),
            ("local", "domestic"),
            ("vietnam", "domestic"),
            ("việt nam", "domestic"),
            ("vn", "domestic"),
            ("trong nước", "domestic"),
            ("nội địa", "domestic"),
            ("imported", "imported"),
            ("import", "imported"),
            ("foreign", "imported"),
            ("nhập khẩu", "imported"),
            ("nước ngoài", "imported"),
            ("unknown", "unknown"),
            ("n/a", "unknown"),
            ("không rõ", "unknown"),
            ("chưa rõ", "unknown"),
            ("không biết", "unknown"),
        ],
    )
});

pub static PROCESSES: LazyLock<Dictionary> = LazyLock::new(|| {
    Dictionary::from_aliases(
        "processes",
        &[
            ("knitting", "knitting"),
            ("knit", "knitting"),
            ("knitted", "knitting"),
            ("dệt kim", "knitting"),
            ("đan", "knitting"),
            ("weaving", "weaving"),
            ("weave", "weaving"),
            ("woven", "weaving"),
            ("dệt", "weaving"),
            ("dệt thoi", "weaving"),
            ("cutting_sewing", "cutting_sewing"),
            ("cutting", "cutting_sewing"),
            ("sewing", "cutting_sewing"),
            ("cut and sew", "cutting_sewing"),
            ("cut & sew", "cutting_sewing"),
            ("cmt", "cutting_sewing"),
            ("cắt may", "cutting_sewing"),
            ("cắt", "cutting_sewing"),
            ("may", "cutting_sewing"),
            ("dyeing", "dyeing"),
            ("dye", "dyeing"),
            ("dyed", "dyeing"),
            ("nhuộm", "dyeing"),
            ("printing", "printing"),
            ("print", "printing"),
            ("screen printing", "printing"),
            ("in", "printing"),
            ("in ấn", "printing"),
            ("in lụa", "printing"),
            ("finishing", "finishing"),
            ("finish", "finishing"),
            ("wash", "finishing"),
            ("hoàn thiện", "finishing"),
            ("hoàn tất", "finishing"),
            ("giặt", "finishing"),
        ],
    )
});

pub static ENERGY_SOURCES: LazyLock<Dictionary> = LazyLock::new(|| {
    Dictionary::from_aliases(
        "energySource",
        &[
            ("grid", "grid"),
            ("grid electricity", "grid"),
            ("electricity", "grid"),
            ("evn", "grid"),
            ("điện", "grid"),
            ("điện lưới", "grid"),
            ("lưới điện", "grid"),
            ("solar", "solar"),
            ("solar power", "solar"),
            ("pv", "solar"),
            ("điện mặt trời", "solar"),
            ("năng lượng mặt trời", "solar"),
            ("coal", "coal"),
            ("coal boiler", "coal"),
            ("than", "coal"),
            ("than đá", "coal"),
            ("lò hơi than", "coal"),
            ("mixed", "mixed"),
            ("mix", "mixed"),
            ("grid + solar", "mixed"),
            ("hỗn hợp", "mixed"),
            ("kết hợp", "mixed"),
        ],
    )
});

pub static MARKET_TYPES: LazyLock<Dictionary> = LazyLock::new(|| {
    Dictionary::from_aliases(
        "marketType",
        &[
            ("domestic", "domestic"),
            ("local", "domestic"),
            ("vietnam", "domestic"),
            ("vn", "domestic"),
            ("nội địa", "domestic"),
            ("trong nước", "domestic"),
            ("export", "export"),
            ("international", "export"),
            ("overseas", "export"),
            ("xuất khẩu", "export"),
            ("xk", "export"),
            ("quốc tế", "export"),
        ],
    )
});

pub static EXPORT_COUNTRIES: LazyLock<Dictionary> = LazyLock::new(|| {
    Dictionary::from_aliases(
        "exportCountry",
        &[
            ("eu", "eu"),
            ("europe", "eu"),
            ("european union", "eu"),
            ("châu âu", "eu"),
            ("liên minh châu âu", "eu"),
            ("germany", "eu"),
            ("đức", "eu"),
            ("france", "eu"),
            ("pháp", "eu"),
            ("italy", "eu"),
            ("netherlands", "eu"),
            ("hà lan", "eu"),
            ("spain", "eu"),
            ("tây ban nha", "eu"),
            ("us", "us"),
            ("usa", "us"),
            ("united states", "us"),
            ("america", "us"),
            ("mỹ", "us"),
            ("hoa kỳ", "us"),
            ("jp", "jp"),
            ("japan", "jp"),
            ("nhật", "jp"),
            ("nhật bản", "jp"),
            ("kr", "kr"),
            ("korea", "kr"),
            ("south korea", "kr"),
            ("hàn quốc", "kr"),
            ("other", "other"),
            ("others", "other"),
            ("khác", "other"),
        ],
    )
});

pub static TRANSPORT_MODES: LazyLock<Dictionary> = LazyLock::new(|| {
    Dictionary::from_aliases(
        "transportMode",
        &[
            ("road", "road"),
            ("truck", "road"),
            ("trucking", "road"),
            ("đường bộ", "road"),
            ("xe tải", "road"),
            ("sea", "sea"),
            ("sea freight", "sea"),
            ("ocean", "sea"),
            ("ship", "sea"),
            ("shipping", "sea"),
            ("đường biển", "sea"),
            ("tàu biển", "sea"),
            ("air", "air"),
            ("air freight", "air"),
            ("flight", "air"),
            ("hàng không", "air"),
            ("đường hàng không", "air"),
            ("máy bay", "air"),
            ("rail", "rail"),
            ("railway", "rail"),
            ("train", "rail"),
            ("đường sắt", "rail"),
            ("tàu hỏa", "rail"),
            ("multimodal", "multimodal"),
            ("multi modal", "multimodal"),
            ("intermodal", "multimodal"),
            ("combined", "multimodal"),
            ("đa phương thức", "multimodal"),
        ],
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_diacritics_and_separators() {
        assert_eq!(normalize_key("Thị trường"), "thitruong");
        assert_eq!(normalize_key("thi truong"), "thitruong");
        assert_eq!(normalize_key("THITRUONG"), "thitruong");
        assert_eq!(normalize_key("  weight_per-unit (g) "), "weightperunitg");
    }

    #[test]
    fn test_normalize_folds_stroked_d() {
        assert_eq!(normalize_key("Đường biển"), "duongbien");
        assert_eq!(normalize_key("đầm"), "dam");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("  -- "), "");
    }

    #[test]
    fn test_slugify_unknown_text() {
        assert_eq!(slugify("Sợi tre lạ"), "soi_tre_la");
        assert_eq!(slugify("  Embroidery / hand-made "), "embroidery_hand_made");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_map_value_hits_and_defaults() {
        assert_eq!(map_value("Áo thun", &PRODUCT_TYPES, "other"), "tshirt");
        assert_eq!(map_value("something odd", &PRODUCT_TYPES, "other"), "other");
        assert_eq!(map_value("", &MATERIAL_SOURCES, "unknown"), "unknown");
        assert_eq!(map_value("Nhập khẩu", &MATERIAL_SOURCES, "unknown"), "imported");
    }

    #[test]
    fn test_canonical_codes_map_to_themselves() {
        assert_eq!(MATERIALS.get("organic_cotton"), Some("organic_cotton"));
        assert_eq!(MATERIALS.get("Organic Cotton"), Some("organic_cotton"));
        assert_eq!(PROCESSES.get("cutting_sewing"), Some("cutting_sewing"));
        assert_eq!(TRANSPORT_MODES.get("MULTIMODAL"), Some("multimodal"));
    }

    #[test]
    fn test_vietnamese_spellings_with_and_without_marks() {
        assert_eq!(TRANSPORT_MODES.get("đường biển"), Some("sea"));
        assert_eq!(TRANSPORT_MODES.get("duong bien"), Some("sea"));
        assert_eq!(EXPORT_COUNTRIES.get("Nhật Bản"), Some("jp"));
        assert_eq!(EXPORT_COUNTRIES.get("nhat ban"), Some("jp"));
        assert_eq!(ENERGY_SOURCES.get("Điện mặt trời"), Some("solar"));
    }

    #[test]
    fn test_unrecognised_material_misses() {
        assert_eq!(MATERIALS.get("sợi tre lạ"), None);
    }
}
