use super::item_path;
use crate::client::LyceumClient;
use crate::error::Result;
use crate::types::{CreatePersonRequest, ListQuery, Manager, Paginated, UpdatePersonRequest};

const MANAGERS: &str = "/managers";

impl LyceumClient {
    // ===== Managers =====

    pub async fn list_managers(&self, query: &ListQuery) -> Result<Paginated<Manager>> {
        self.get_with_query(MANAGERS, query).await
    }

    pub async fn get_manager(&self, id: &str) -> Result<Manager> {
        self.get(&item_path(MANAGERS, id)).await
    }

    pub async fn create_manager(&self, request: &CreatePersonRequest) -> Result<Manager> {
        self.post(MANAGERS, request).await
    }

    pub async fn update_manager(&self, id: &str, request: &UpdatePersonRequest) -> Result<Manager> {
        self.patch(&item_path(MANAGERS, id), request).await
    }

    pub async fn archive_manager(&self, id: &str) -> Result<serde_json::Value> {
        self.delete(&item_path(MANAGERS, id)).await
    }

    pub async fn restore_manager(&self, id: &str) -> Result<serde_json::Value> {
        self.patch_empty(&format!("{}/restore", item_path(MANAGERS, id)))
            .await
    }

    /// Permanent removal, not restorable
    pub async fn hard_delete_manager(&self, id: &str) -> Result<serde_json::Value> {
        self.delete(&format!("{}/hard", item_path(MANAGERS, id)))
            .await
    }
}
