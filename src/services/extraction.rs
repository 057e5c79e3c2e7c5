//! Structured field extraction from Thai business documents.
//!
//! Works on OCR Markdown after post-processing. Every list is deduplicated
//! and returned in the order values first appear in the text. Digit classes
//! are ASCII-only: run `normalize_numbers` first to pick up Thai digits.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{ExtractedFields, TaxId};

/// Thai legal-form prefixes; group 1 is the name after the prefix.
static COMPANY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"บริษัท[^\S\n]+([^\n|]+)").unwrap(),
        Regex::new(r"หจก\.[^\S\n]*([^\n|]+)").unwrap(),
        Regex::new(r"ห้างหุ้นส่วนจำกัด[^\S\n]+([^\n|]+)").unwrap(),
        Regex::new(r"ห้างหุ้นส่วนสามัญ[^\S\n]+([^\n|]+)").unwrap(),
    ]
});

/// English company names, used only when no Thai name is present.
static ENGLISH_COMPANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][A-Za-z0-9&.,'()\- ]*?(?:Co\.,?\s*Ltd\.?|Company Limited|Public Company Limited|Limited Partnership)").unwrap()
});

/// Tax ID after a label: 13 digits, optionally grouped with dashes or spaces.
/// The number may sit on the line after the label.
static TAX_ID_LABELLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:เลขประจำตัวผู้เสียภาษี(?:อากร)?|เลขที่ผู้เสียภาษี|tax\s*id(?:\s*no\.?)?|tax\s+identification\s+(?:no\.?|number))[^0-9\n]{0,30}\n?[^0-9\n]{0,10}([0-9](?:[- ]?[0-9]){12})",
    )
    .unwrap()
});

/// Tax ID in the printed Thai grouping `X-XXXX-XXXXX-XX-X`, label or not.
static TAX_ID_GROUPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]-[0-9]{4}-[0-9]{5}-[0-9]{2}-[0-9])").unwrap());

/// Dashed landline (0X-XXX-XXXX) and mobile (0XX-XXX-XXXX) numbers.
static PHONE_DASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(0[0-9]{1,2}-[0-9]{3}-[0-9]{4})").unwrap());

/// Undashed numbers directly after a phone label. `โทร` also prefixes
/// `โทรสาร` (fax), so fax numbers are filtered out with `FAX`.
static PHONE_LABELLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:โทรศัพท์|โทร\.?|tel\.?|phone|mobile|มือถือ)[^0-9\n]{0,10}(0[0-9]{8,9})")
        .unwrap()
});

/// Fax numbers, dashed or not.
static FAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:โทรสาร|fax)[^0-9\n]{0,10}(0[0-9]{1,2}-?[0-9]{3}-?[0-9]{3,4})").unwrap()
});

static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]{2})?|[0-9]+\.[0-9]{2})").unwrap()
});

const THAI_MONTHS: &str = r"มกราคม|กุมภาพันธ์|มีนาคม|เมษายน|พฤษภาคม|มิถุนายน|กรกฎาคม|สิงหาคม|กันยายน|ตุลาคม|พฤศจิกายน|ธันวาคม|ม\.ค\.|ก\.พ\.|มี\.ค\.|เม\.ย\.|พ\.ค\.|มิ\.ย\.|ก\.ค\.|ส\.ค\.|ก\.ย\.|ต\.ค\.|พ\.ย\.|ธ\.ค\.";

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"([0-9]{1,2}/[0-9]{1,2}/[0-9]{4})").unwrap(),
        Regex::new(r"([0-9]{1,2}-[0-9]{1,2}-[0-9]{4})").unwrap(),
        Regex::new(&format!(
            r"([0-9]{{1,2}}[^\S\n]*(?:{})[^\S\n]*(?:พ\.ศ\.[^\S\n]*)?[0-9]{{4}})",
            THAI_MONTHS
        ))
        .unwrap(),
    ]
});

/// A short house number (`12`, `99/9`) followed, on the same line, by a
/// Thai address marker.
static ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([0-9]{1,5}(?:/[0-9]{1,5})?[^0-9/\n|][^\n|]*?(?:กรุงเทพ|ถนน|ถ\.|แขวง[^\n|]*เขต|ตำบล|อำเภอ|จังหวัด)[^\n|]*)",
    )
    .unwrap()
});

/// Labels of other fields; an address never follows one on the same line.
static FIELD_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:tel|phone|mobile|fax|tax\s*id)\b|เลขประจำตัวผู้เสียภาษี|เลขที่ผู้เสียภาษี|โทร|มือถือ")
        .unwrap()
});

/// Extract all known fields from document text.
pub fn extract_fields(text: &str) -> ExtractedFields {
    ExtractedFields {
        company_name: extract_company_name(text),
        tax_ids: extract_tax_ids(text),
        phone_numbers: extract_phone_numbers(text),
        amounts: extract_amounts(text),
        dates: extract_dates(text),
        addresses: extract_addresses(text),
    }
}

/// First company name in the text, Thai legal forms preferred.
///
/// Thai names are returned without their legal-form prefix
/// (`บริษัท`, `หจก.`, ...); English names are returned whole.
pub fn extract_company_name(text: &str) -> Option<String> {
    let thai = COMPANY_PATTERNS
        .iter()
        .filter_map(|re| re.captures(text))
        .filter_map(|caps| Some((caps.get(0)?.start(), caps.get(1)?)))
        .min_by_key(|(start, _)| *start)
        .map(|(_, name)| strip_markdown(name.as_str()));

    thai.filter(|name| !name.is_empty()).or_else(|| {
        ENGLISH_COMPANY
            .find(text)
            .map(|m| strip_markdown(m.as_str()))
            .filter(|name| !name.is_empty())
    })
}

/// Tax IDs as bare 13-digit strings with checksum flags.
pub fn extract_tax_ids(text: &str) -> Vec<TaxId> {
    let mut found = bounded_captures(&TAX_ID_LABELLED, text, |_| true);
    found.extend(bounded_captures(&TAX_ID_GROUPED, text, |_| true));

    let digits: Vec<(usize, String)> = found
        .into_iter()
        .map(|(pos, raw)| {
            (
                pos,
                raw.chars().filter(char::is_ascii_digit).collect::<String>(),
            )
        })
        .filter(|(_, d)| d.len() == 13)
        .collect();

    ordered_unique(digits)
        .into_iter()
        .map(|number| TaxId {
            checksum_valid: is_valid_tax_id(&number),
            number,
        })
        .collect()
}

/// Thai tax ID checksum: weights 13..2 over the first twelve digits, mod 11.
pub fn is_valid_tax_id(number: &str) -> bool {
    let digits: Vec<u32> = number.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 13 || number.chars().count() != 13 {
        return false;
    }
    let sum: u32 = digits[..12]
        .iter()
        .enumerate()
        .map(|(i, d)| d * (13 - i as u32))
        .sum();
    (11 - sum % 11) % 10 == digits[12]
}

pub fn extract_phone_numbers(text: &str) -> Vec<String> {
    let fax: Vec<usize> = bounded_captures(&FAX, text, |_| true)
        .into_iter()
        .map(|(pos, _)| pos)
        .collect();

    let mut found = bounded_captures(&PHONE_DASHED, text, |_| true);
    found.extend(bounded_captures(&PHONE_LABELLED, text, |_| true));
    found.retain(|(pos, _)| !fax.contains(pos));
    ordered_unique(found)
}

/// Monetary amounts: grouped thousands or two-decimal numbers.
pub fn extract_amounts(text: &str) -> Vec<String> {
    ordered_unique(bounded_captures(&AMOUNT, text, |prev| {
        prev != Some(',') && prev != Some('.')
    }))
}

pub fn extract_dates(text: &str) -> Vec<String> {
    let found = DATE_PATTERNS
        .iter()
        .flat_map(|re| bounded_captures(re, text, |_| true))
        .collect();
    ordered_unique(found)
}

pub fn extract_addresses(text: &str) -> Vec<String> {
    let found = bounded_captures(&ADDRESS, text, |_| true)
        .into_iter()
        .filter(|(pos, _)| {
            let line_start = text[..*pos].rfind('\n').map_or(0, |i| i + 1);
            !FIELD_LABEL.is_match(&text[line_start..*pos])
        })
        .map(|(pos, s)| (pos, strip_markdown(&s)))
        .filter(|(_, s)| !s.is_empty())
        .collect();
    ordered_unique(found)
}

/// Labelled fields for display, omitting empty ones.
pub fn display_fields(fields: &ExtractedFields) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();

    if let Some(name) = &fields.company_name {
        out.push(("ชื่อบริษัท", name.clone()));
    }
    if !fields.tax_ids.is_empty() {
        let ids: Vec<&str> = fields.tax_ids.iter().map(|t| t.number.as_str()).collect();
        out.push(("เลขประจำตัวผู้เสียภาษี", ids.join(", ")));
    }
    if !fields.phone_numbers.is_empty() {
        out.push(("หมายเลขโทรศัพท์", fields.phone_numbers.join(", ")));
    }
    if !fields.amounts.is_empty() {
        let first: Vec<&str> = fields.amounts.iter().take(5).map(String::as_str).collect();
        out.push(("จำนวนเงิน", first.join(", ")));
    }
    if !fields.dates.is_empty() {
        out.push(("วันที่", fields.dates.join(", ")));
    }
    if !fields.addresses.is_empty() {
        out.push(("ที่อยู่", fields.addresses.join("\n")));
    }

    out
}

/// Captures of group 1 whose neighbours are not ASCII digits.
///
/// `accept_prev` gets the character before the capture for extra checks.
fn bounded_captures(
    re: &Regex,
    text: &str,
    accept_prev: impl Fn(Option<char>) -> bool,
) -> Vec<(usize, String)> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter(|m| {
            let prev = text[..m.start()].chars().next_back();
            let next = text[m.end()..].chars().next();
            !prev.is_some_and(|c| c.is_ascii_digit())
                && !next.is_some_and(|c| c.is_ascii_digit())
                && accept_prev(prev)
        })
        .map(|m| (m.start(), m.as_str().trim().to_string()))
        .collect()
}

/// Sort by position and drop repeated values, keeping the first.
fn ordered_unique(mut found: Vec<(usize, String)>) -> Vec<String> {
    found.sort_by_key(|(pos, _)| *pos);
    let mut out: Vec<String> = Vec::new();
    for (_, value) in found {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

/// Trim whitespace and Markdown emphasis/heading markers.
fn strip_markdown(s: &str) -> String {
    s.trim()
        .trim_matches(|c: char| c == '*' || c == '_' || c == '#' || c == '`' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVOICE: &str = "# ใบกำกับภาษี / ใบเสร็จรับเงิน\n\
        **บริษัท อินโนเวท เทค จำกัด**\n\
        101 อาคารทรู ดิจิทัล พาร์ค ชั้น 7 ถ.สุขุมวิท แขวงบางจาก เขตพระโขนง กรุงเทพฯ 10260\n\
        โทร: 02-123-4567 มือถือ 0812345678\n\
        เลขประจำตัวผู้เสียภาษี: 0105556012341\n\
        \n\
        ลูกค้า: หจก. สยามการพิมพ์\n\
        เลขประจำตัวผู้เสียภาษี 3-1010-01234-56-5\n\
        โทร. 089-876-5432\n\
        วันที่ 15/03/2024\n\
        | รายการ | จำนวน | ราคา |\n\
        | พัฒนาเว็บไซต์ | 1 | 75,000.00 |\n\
        | ค่าเช่า Cloud Server | 3 | 7500.00 |\n\
        รวมทั้งสิ้น 88,275.00 บาท\n\
        ชำระภายใน 30 วัน\n";

    #[test]
    fn test_company_name_first_thai_form() {
        assert_eq!(
            extract_company_name(INVOICE).as_deref(),
            Some("อินโนเวท เทค จำกัด")
        );
    }

    #[test]
    fn test_company_name_drops_legal_prefix() {
        assert_eq!(
            extract_company_name("บริษัท อินโนเวท เทค จำกัด").as_deref(),
            Some("อินโนเวท เทค จำกัด")
        );
        assert_eq!(extract_company_name("บริษัท **"), None);
    }

    #[test]
    fn test_company_name_partnership() {
        assert_eq!(
            extract_company_name("ผู้ขาย\nหจก.สยามการพิมพ์ | สาขา 1").as_deref(),
            Some("สยามการพิมพ์")
        );
        assert_eq!(
            extract_company_name("ห้างหุ้นส่วนจำกัด รุ่งเรืองค้าไม้\n").as_deref(),
            Some("รุ่งเรืองค้าไม้")
        );
    }

    #[test]
    fn test_company_name_english_fallback() {
        assert_eq!(
            extract_company_name("Invoice\nGlobal Logistics Solutions Co., Ltd.\n").as_deref(),
            Some("Global Logistics Solutions Co., Ltd.")
        );
        assert_eq!(extract_company_name("ไม่มีชื่อ"), None);
    }

    #[test]
    fn test_tax_ids_labelled_and_grouped() {
        let ids = extract_tax_ids(INVOICE);
        assert_eq!(
            ids,
            vec![
                TaxId {
                    number: "0105556012341".to_string(),
                    checksum_valid: true
                },
                TaxId {
                    number: "3101001234565".to_string(),
                    checksum_valid: true
                },
            ]
        );
    }

    #[test]
    fn test_tax_id_on_line_after_label() {
        let ids = extract_tax_ids("เลขประจำตัวผู้เสียภาษี:\n0105556012341");
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].number, "0105556012341");
        assert!(ids[0].checksum_valid);

        assert!(extract_tax_ids("เลขประจำตัวผู้เสียภาษี\n\n0105556012341").is_empty());
        assert!(extract_tax_ids("เลขประจำตัวผู้เสียภาษี\n0812345678\n123").is_empty());
    }

    #[test]
    fn test_tax_id_rejects_longer_runs() {
        assert!(extract_tax_ids("เลขประจำตัวผู้เสียภาษี 01055560123410").is_empty());
        assert!(extract_tax_ids("เลขประจำตัวผู้เสียภาษี 010555601234").is_empty());
    }

    #[test]
    fn test_tax_id_english_label_and_invalid_checksum() {
        let ids = extract_tax_ids("Tax ID No. 0105556012345\nTAX ID: 0105556012345");
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].number, "0105556012345");
        assert!(!ids[0].checksum_valid);
    }

    #[test]
    fn test_checksum() {
        assert!(is_valid_tax_id("0107536000013"));
        assert!(!is_valid_tax_id("0107536000014"));
        assert!(!is_valid_tax_id("01075360000"));
        assert!(!is_valid_tax_id("0-107536000013"));
    }

    #[test]
    fn test_phone_numbers_ordered_unique() {
        let phones = extract_phone_numbers(INVOICE);
        assert_eq!(phones, vec!["02-123-4567", "0812345678", "089-876-5432"]);

        let repeated = extract_phone_numbers("Tel 02-987-6543, 02-987-6543,081-234-5678");
        assert_eq!(repeated, vec!["02-987-6543", "081-234-5678"]);
    }

    #[test]
    fn test_phone_skips_fax_numbers() {
        assert!(extract_phone_numbers("โทรสาร 021234567").is_empty());
        assert_eq!(
            extract_phone_numbers("โทร 02-123-4567 โทรสาร 02-123-4568\nFax: 021234569"),
            vec!["02-123-4567"]
        );
    }

    #[test]
    fn test_phone_ignores_embedded_digits() {
        assert!(extract_phone_numbers("ref 1081-234-56789").is_empty());
    }

    #[test]
    fn test_amounts() {
        let amounts = extract_amounts(INVOICE);
        assert_eq!(amounts, vec!["75,000.00", "7500.00", "88,275.00"]);
        assert!(extract_amounts("จำนวน 3 ชิ้น ปี 2024").is_empty());
    }

    #[test]
    fn test_dates() {
        assert_eq!(extract_dates(INVOICE), vec!["15/03/2024"]);
        assert_eq!(
            extract_dates("ออกเมื่อ 5 มิ.ย. 2567 และ 1-12-2023 ครบกำหนด 12 มกราคม พ.ศ. 2568"),
            vec!["5 มิ.ย. 2567", "1-12-2023", "12 มกราคม พ.ศ. 2568"]
        );
        assert!(extract_dates("โทร 02-123-4567").is_empty());
    }

    #[test]
    fn test_addresses() {
        let addresses = extract_addresses(INVOICE);
        assert_eq!(
            addresses,
            vec!["101 อาคารทรู ดิจิทัล พาร์ค ชั้น 7 ถ.สุขุมวิท แขวงบางจาก เขตพระโขนง กรุงเทพฯ 10260"]
        );
        assert_eq!(
            extract_addresses("ที่อยู่ 99/9 หมู่ 2 ตำบลบางพูด อำเภอปากเกร็ด"),
            vec!["99/9 หมู่ 2 ตำบลบางพูด อำเภอปากเกร็ด"]
        );
    }

    #[test]
    fn test_addresses_skip_other_field_lines() {
        assert!(
            extract_addresses("เลขประจำตัวผู้เสียภาษี 0105556012341 สำนักงานใหญ่ กรุงเทพฯ")
                .is_empty()
        );
        assert!(extract_addresses("โทร 02-123-4567 กรุงเทพฯ").is_empty());
        assert!(extract_addresses("เลขที่เอกสาร 2024001234 ถนนพระราม 4").is_empty());
    }

    #[test]
    fn test_display_fields_labels() {
        let fields = extract_fields(INVOICE);
        let display = display_fields(&fields);
        let labels: Vec<&str> = display.iter().map(|(l, _)| *l).collect();
        assert_eq!(
            labels,
            vec![
                "ชื่อบริษัท",
                "เลขประจำตัวผู้เสียภาษี",
                "หมายเลขโทรศัพท์",
                "จำนวนเงิน",
                "วันที่",
                "ที่อยู่"
            ]
        );
        assert_eq!(display[1].1, "0105556012341, 3101001234565");
    }

    #[test]
    fn test_display_limits_amounts_to_five() {
        let fields = ExtractedFields {
            amounts: (1..=7).map(|i| format!("{}.00", i)).collect(),
            ..Default::default()
        };
        let display = display_fields(&fields);
        assert_eq!(display, vec![("จำนวนเงิน", "1.00, 2.00, 3.00, 4.00, 5.00".to_string())]);
    }

    #[test]
    fn test_empty_text() {
        assert!(extract_fields("").is_empty());
        assert!(display_fields(&ExtractedFields::default()).is_empty());
    }
}
