use super::item_path;
use crate::client::LyceumClient;
use crate::error::Result;
use crate::types::{Room, RoomRequest};

const ROOMS: &str = "/rooms";

impl LyceumClient {
    // ===== Rooms =====

    pub async fn list_rooms(&self) -> Result<Vec<Room>> {
        self.get(ROOMS).await
    }

    pub async fn create_room(&self, request: &RoomRequest) -> Result<Room> {
        self.post(ROOMS, request).await
    }

    /// Full replacement (PUT)
    pub async fn update_room(&self, id: &str, request: &RoomRequest) -> Result<Room> {
        self.put(&item_path(ROOMS, id), request).await
    }

    pub async fn delete_room(&self, id: &str) -> Result<serde_json::Value> {
        self.delete(&item_path(ROOMS, id)).await
    }
}
