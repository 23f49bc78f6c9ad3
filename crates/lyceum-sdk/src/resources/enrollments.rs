use super::item_path;
use crate::client::LyceumClient;
use crate::error::Result;
use crate::types::{
    CreateEnrollmentRequest, Enrollment, EnrollmentQuery, Paginated, UpdateEnrollmentRequest,
};

const ENROLLMENTS: &str = "/enrollments";

impl LyceumClient {
    // ===== Enrollments =====

    pub async fn list_enrollments(&self, query: &EnrollmentQuery) -> Result<Paginated<Enrollment>> {
        self.get_with_query(ENROLLMENTS, query).await
    }

    pub async fn get_enrollment(&self, id: &str) -> Result<Enrollment> {
        self.get(&item_path(ENROLLMENTS, id)).await
    }

    pub async fn create_enrollment(&self, request: &CreateEnrollmentRequest) -> Result<Enrollment> {
        self.post(ENROLLMENTS, request).await
    }

    /// Change status (pause, leave) and leave date
    pub async fn update_enrollment(
        &self,
        id: &str,
        request: &UpdateEnrollmentRequest,
    ) -> Result<Enrollment> {
        self.patch(&item_path(ENROLLMENTS, id), request).await
    }

    pub async fn delete_enrollment(&self, id: &str) -> Result<()> {
        let _: serde_json::Value = self.delete(&item_path(ENROLLMENTS, id)).await?;
        Ok(())
    }
}
