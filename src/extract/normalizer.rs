//! Detail-page normalizer
//!
//! Converts one fetched detail page into zero, one, or many [`SpecRecord`]s:
//! non-phone product lines are filtered out entirely, spec table rows are
//! mapped onto the record fields, and a page listing several model numbers
//! fans out into one record per number.

use crate::extract::SpecRecord;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

/// Selector for the page title
const TITLE_SELECTOR: &str = "h1.specs-phone-name-title";

/// Selector for the announcement-year spec cell
const YEAR_SELECTOR: &str = r#"td.nfo[data-spec="year"]"#;

/// Selector for the availability-status spec cell
const STATUS_SELECTOR: &str = r#"td.nfo[data-spec="status"]"#;

/// Selector for the model-numbers spec cell
const MODELS_SELECTOR: &str = r#"td.nfo[data-spec="models"]"#;

/// Title keywords marking non-phone product lines, matched case-insensitively
const EXCLUDED_KEYWORDS: [&str; 4] = ["watch", "pad", "band", "tablet"];

/// Normalizes a detail page into spec records
///
/// # Arguments
///
/// * `html` - The fully rendered detail-page HTML
/// * `manufacturer` - The manufacturer this page belongs to
///
/// # Returns
///
/// Zero records when the page is a non-phone product line, one record when
/// the page lists no model numbers, or one record per model number otherwise.
pub fn normalize(html: &str, manufacturer: &str) -> Vec<SpecRecord> {
    let document = Html::parse_document(html);

    let title = select_text(&document, TITLE_SELECTOR).unwrap_or_else(|| "N/A".to_string());

    let lowered = title.to_lowercase();
    if EXCLUDED_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        tracing::info!("Skipping non-phone model: {}", title);
        return Vec::new();
    }

    let model_name = title
        .strip_prefix(&format!("{manufacturer} "))
        .unwrap_or(&title)
        .to_string();

    let mut template = SpecRecord::template(manufacturer, model_name);

    if let Some(raw) = extract_release_date(&document) {
        template.release_date = format_release_date(&raw);
    }

    apply_spec_rows(&document, &mut template);

    let records = match select_text(&document, MODELS_SELECTOR) {
        Some(models) => clean_text(&models)
            .split(',')
            .map(|token| {
                let mut record = template.clone();
                record.model_no = token.trim().to_string();
                record
            })
            .collect(),
        None => vec![template],
    };

    tracing::debug!("Normalized {} record(s) from page", records.len());
    records
}

/// Walks every (label, value) cell pair across all spec tables
///
/// Only three labels are meaningful; everything else on the page is ignored.
fn apply_spec_rows(document: &Html, template: &mut SpecRecord) {
    let (Ok(table_selector), Ok(row_selector), Ok(cell_selector)) = (
        Selector::parse("table"),
        Selector::parse("tr"),
        Selector::parse("td"),
    ) else {
        return;
    };

    for table in document.select(&table_selector) {
        for row in table.select(&row_selector) {
            let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
            if cells.len() < 2 {
                continue;
            }

            let label = element_text(&cells[0]);
            let value = element_text(&cells[1]);

            match label.as_str() {
                "OS" => parse_os_value(&value, template),
                "Chipset" => template.cpu = value,
                "GPU" => template.gpu = value,
                _ => {}
            }
        }
    }
}

/// Applies the compound OS-field parsing rule
///
/// A value carrying "upgradable to" splits into a released part and an
/// upgrade part; otherwise the whole value is treated as the released part.
/// The second upgrade segment, when present, names the OEM skin that ships
/// with the upgrade, which is why it lands in the released OEMOS field.
fn parse_os_value(value: &str, record: &mut SpecRecord) {
    if let Some((released_info, upgrade_info)) = value.split_once("upgradable to") {
        let released: Vec<&str> = released_info.split(',').collect();
        let upgrade: Vec<&str> = upgrade_info.split(',').collect();

        record.aosp_released = released[0].trim().to_string();
        record.oemos_released = upgrade
            .get(1)
            .map(|part| part.trim().to_string())
            .unwrap_or_default();
        record.aosp_latest = upgrade[0].trim().to_string();
        record.oemos_latest = String::new();
    } else {
        let parts: Vec<&str> = value.split(',').collect();

        record.aosp_released = parts[0].trim().to_string();
        record.oemos_released = parts
            .get(1)
            .map(|part| part.trim().to_string())
            .unwrap_or_default();
        record.aosp_latest = String::new();
        record.oemos_latest = String::new();
    }
}

/// Extracts the raw release-date text from the page
///
/// Prefers the announcement-year cell when it carries the "Released" marker,
/// then falls back to the availability-status cell. Returns None when
/// neither cell is present.
fn extract_release_date(document: &Html) -> Option<String> {
    let year = select_text(document, YEAR_SELECTOR);
    let status = select_text(document, STATUS_SELECTOR);

    if let Some(text) = year.filter(|text| text.contains("Released")) {
        Some(text.replace("Released ", "").trim().to_string())
    } else {
        status.map(|text| text.replace("Available. Released ", "").trim().to_string())
    }
}

/// Reformats a long-form release date to DD/MM/YYYY
///
/// The source writes dates as "2021, September 14". Text that does not
/// match that shape is passed through unchanged; a malformed date is not
/// worth losing the rest of the record over.
fn format_release_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y, %B %d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(e) => {
            tracing::warn!("Date format error for {:?}: {}", raw, e);
            raw.to_string()
        }
    }
}

/// Strips everything outside printable ASCII and trims the result
///
/// Model-number cells occasionally carry zero-width and non-breaking
/// characters that would otherwise leak into the output.
fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| (' '..='~').contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Selects the first element matching `selector` and returns its trimmed text
fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element_text(&element))
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
