use super::item_path;
use crate::client::LyceumClient;
use crate::error::Result;
use crate::types::{
    CreatePersonRequest, Group, ListQuery, Paginated, Teacher, UpdatePersonRequest,
};

const TEACHERS: &str = "/teachers";

impl LyceumClient {
    // ===== Teachers =====

    pub async fn list_teachers(&self, query: &ListQuery) -> Result<Paginated<Teacher>> {
        self.get_with_query(TEACHERS, query).await
    }

    pub async fn get_teacher(&self, id: &str) -> Result<Teacher> {
        self.get(&item_path(TEACHERS, id)).await
    }

    pub async fn create_teacher(&self, request: &CreatePersonRequest) -> Result<Teacher> {
        self.post(TEACHERS, request).await
    }

    pub async fn update_teacher(&self, id: &str, request: &UpdatePersonRequest) -> Result<Teacher> {
        self.patch(&item_path(TEACHERS, id), request).await
    }

    /// Archive a teacher; `None` when the backend answers without a body
    pub async fn archive_teacher(&self, id: &str) -> Result<Option<Teacher>> {
        self.delete(&item_path(TEACHERS, id)).await
    }

    pub async fn restore_teacher(&self, id: &str) -> Result<Option<Teacher>> {
        self.patch_empty(&format!("{}/restore", item_path(TEACHERS, id)))
            .await
    }

    /// Groups taught by the signed-in teacher
    pub async fn my_groups(&self) -> Result<Vec<Group>> {
        self.get("/teachers/my-groups").await
    }
}
