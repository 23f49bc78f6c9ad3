use super::item_path;
use crate::client::LyceumClient;
use crate::error::Result;
use crate::types::{Group, GroupQuery, GroupRequest, Paginated};
use serde::Serialize;

const GROUPS: &str = "/groups";

#[derive(Serialize)]
struct DeactivateQuery<'a> {
    reason: Option<&'a str>,
}

impl LyceumClient {
    // ===== Groups =====

    pub async fn list_groups(&self, query: &GroupQuery) -> Result<Paginated<Group>> {
        self.get_with_query(GROUPS, query).await
    }

    pub async fn create_group(&self, request: &GroupRequest) -> Result<Group> {
        self.post(GROUPS, request).await
    }

    pub async fn update_group(&self, id: &str, request: &GroupRequest) -> Result<Group> {
        self.patch(&item_path(GROUPS, id), request).await
    }

    /// Deactivate a group, optionally recording why
    pub async fn deactivate_group(&self, id: &str, reason: Option<&str>) -> Result<Group> {
        self.delete_with_query(&item_path(GROUPS, id), &DeactivateQuery { reason })
            .await
    }
}
