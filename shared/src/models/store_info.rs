//! Store Info Model

use serde::{Deserialize, Serialize};

/// Store information (singleton, printed on receipts and kept in backups)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub tax_number: String,
    #[serde(default)]
    pub description: String,
}

impl Default for StoreInfo {
    fn default() -> Self {
        Self {
            name: "محل الإكسسوارات والإلكترونيات".to_string(),
            name_en: "Electronics & Accessories Store".to_string(),
            address: "الجزائر العاصمة، الجزائر".to_string(),
            phone: "+213 XXX XXX XXX".to_string(),
            email: "info@store.dz".to_string(),
            tax_number: String::new(),
            description: "متخصصون في بيع إكسسوارات الهواتف والإلكترونيات".to_string(),
        }
    }
}
