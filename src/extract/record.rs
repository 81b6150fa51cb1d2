use serde::Serialize;

/// One structured output row derived from a detail page
///
/// Field declaration order is the CSV column order; the rename attributes
/// carry the exact header names expected downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecRecord {
    #[serde(rename = "Manufacturer")]
    pub manufacturer: String,

    #[serde(rename = "Model Name")]
    pub model_name: String,

    #[serde(rename = "Model No")]
    pub model_no: String,

    #[serde(rename = "Device release date")]
    pub release_date: String,

    #[serde(rename = "Model EOL Date")]
    pub eol_date: String,

    #[serde(rename = "AOSP version code (released)")]
    pub aosp_released: String,

    #[serde(rename = "AOSP version code (latest)")]
    pub aosp_latest: String,

    #[serde(rename = "OEMOS version code (released)")]
    pub oemos_released: String,

    #[serde(rename = "OEMOS version code (latest)")]
    pub oemos_latest: String,

    #[serde(rename = "Latest Security Update Dt")]
    pub latest_security_update: String,

    #[serde(rename = "LatestSecUpdateReleasedDt")]
    pub latest_security_update_released: String,

    #[serde(rename = "CPU Make & Model")]
    pub cpu: String,

    #[serde(rename = "GPU Make & Model")]
    pub gpu: String,

    #[serde(rename = "NCCS Approved")]
    pub nccs_approved: String,

    #[serde(rename = "Google Certified")]
    pub google_certified: String,
}

impl SpecRecord {
    /// Builds the per-page template record
    ///
    /// Every field defaults to the empty string except the two flag fields,
    /// which carry a fixed "True" annotation rather than anything read from
    /// the page.
    pub fn template(manufacturer: &str, model_name: String) -> Self {
        Self {
            manufacturer: manufacturer.to_string(),
            model_name,
            model_no: String::new(),
            release_date: String::new(),
            eol_date: String::new(),
            aosp_released: String::new(),
            aosp_latest: String::new(),
            oemos_released: String::new(),
            oemos_latest: String::new(),
            latest_security_update: String::new(),
            latest_security_update_released: String::new(),
            cpu: String::new(),
            gpu: String::new(),
            nccs_approved: "True".to_string(),
            google_certified: "True".to_string(),
        }
    }
}
