use super::item_path;
use crate::client::LyceumClient;
use crate::error::Result;
use crate::types::{CreatePersonRequest, ListQuery, Paginated, Student, UpdatePersonRequest};

const STUDENTS: &str = "/students";

impl LyceumClient {
    // ===== Students =====

    pub async fn list_students(&self, query: &ListQuery) -> Result<Paginated<Student>> {
        self.get_with_query(STUDENTS, query).await
    }

    pub async fn get_student(&self, id: &str) -> Result<Student> {
        self.get(&item_path(STUDENTS, id)).await
    }

    pub async fn create_student(&self, request: &CreatePersonRequest) -> Result<Student> {
        self.post(STUDENTS, request).await
    }

    pub async fn update_student(&self, id: &str, request: &UpdatePersonRequest) -> Result<Student> {
        self.patch(&item_path(STUDENTS, id), request).await
    }

    /// Soft delete; the record stays restorable
    pub async fn archive_student(&self, id: &str) -> Result<serde_json::Value> {
        self.delete(&item_path(STUDENTS, id)).await
    }

    pub async fn restore_student(&self, id: &str) -> Result<serde_json::Value> {
        self.patch_empty(&format!("{}/restore", item_path(STUDENTS, id)))
            .await
    }
}
