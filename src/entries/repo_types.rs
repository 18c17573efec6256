use sqlx::FromRow;
use time::PrimitiveDateTime;

/// Company label stamped on every entry.
pub const COMPANY_NAME: &str = "Sharanu";
/// Product label stamped on every entry.
pub const PRODUCT_LABEL: &str = "SF AdBlue";

/// One production batch record. Text columns are nullable because the form
/// fields are optional; legacy rows may also lack the numeric columns.
#[derive(Debug, Clone, FromRow)]
pub struct ProductionEntry {
    pub id: i64,
    pub user_id: i64,
    pub company_name: Option<String>,
    pub authorised_person: Option<String>,
    pub employee_id: Option<String>,
    pub final_batch_number: Option<String>,
    pub sf_batch_number: Option<String>, // product label
    pub batch_quantity: Option<String>,
    pub urea_percentage: Option<f64>,
    pub density: Option<f64>,
    pub photo_path: Option<String>, // filename inside the upload dir
    pub created_at: PrimitiveDateTime, // IST wall clock
}

/// Validated row ready for insertion.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: i64,
    pub authorised_person: Option<String>,
    pub employee_id: Option<String>,
    pub final_batch_number: Option<String>,
    pub batch_quantity: Option<String>,
    pub urea_percentage: f64,
    pub density: f64,
    pub photo_path: Option<String>,
    pub created_at: PrimitiveDateTime,
}
