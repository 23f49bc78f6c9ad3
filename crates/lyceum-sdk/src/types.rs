//! Type definitions for the Lyceum SDK
//!
//! Request and response bodies of the CRM REST API. Field names follow the
//! backend's camelCase JSON.

use serde::{Deserialize, Deserializer, Serialize};

/// Pagination metadata returned with every paginated list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u32,
}

/// `{ items, meta }` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    pub fn has_next_page(&self) -> bool {
        self.meta.page < self.meta.pages
    }
}

/// Common filters for people lists (students, teachers, managers)
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }
}

// ===== People =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Body for creating a student, teacher or manager account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: lyceum_common::PhoneNumber,
    pub password: lyceum_common::Password,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_share: Option<f64>,
}

impl CreatePersonRequest {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: lyceum_common::PhoneNumber,
        password: lyceum_common::Password,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone,
            password,
            start_date: None,
            photo_url: None,
            monthly_salary: None,
            percent_share: None,
        }
    }
}

/// Partial update of a person; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<lyceum_common::PhoneNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<lyceum_common::Password>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_share: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub full_name: String,
    pub phone: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub monthly_salary: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub percent_share: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manager {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub monthly_salary: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ===== Groups & rooms =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DaysPattern {
    Odd,
    Even,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    pub days_pattern: DaysPattern,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub monthly_fee: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub deactivated_at: Option<String>,
    #[serde(default)]
    pub deactivate_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Create or partially update a group
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_pattern: Option<DaysPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

// ===== Enrollments =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentStatus {
    Active,
    Paused,
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentStudent {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentGroup {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub status: EnrollmentStatus,
    pub join_date: String,
    #[serde(default)]
    pub leave_date: Option<String>,
    #[serde(default)]
    pub student: Option<EnrollmentStudent>,
    #[serde(default)]
    pub group: Option<EnrollmentGroup>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollmentRequest {
    pub student_id: String,
    pub group_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnrollmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EnrollmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentQuery {
    pub student_id: Option<String>,
    pub group_id: Option<String>,
    pub status: Option<EnrollmentStatus>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// ===== Finance =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceOverview {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub method: Option<String>,
    pub total_income: f64,
    pub total_expense: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalBalance {
    pub total_charges: f64,
    pub total_income: f64,
    pub total_expense: f64,
    pub net_cash: f64,
    pub total_debt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtorGroup {
    pub group_id: String,
    pub name: String,
    pub debt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debtor {
    pub student_id: String,
    pub full_name: String,
    pub phone: String,
    pub total_debt: f64,
    #[serde(default)]
    pub groups: Vec<DebtorGroup>,
}

fn default_true() -> bool {
    true
}

/// Amounts arrive as numbers or as decimal strings depending on the column type
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
