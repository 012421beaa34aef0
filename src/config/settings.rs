use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub company: CompanyInfo,
    pub billing: BillingSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CompanyInfo {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BillingSettings {
    pub currency: String,
    pub currency_symbol: String,
    /// Secondary currency for the outstanding-total line in `list`;
    /// omit to skip the conversion entirely.
    #[serde(default)]
    pub fx_currency: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ExportSettings {
    pub output_dir: String,
}
