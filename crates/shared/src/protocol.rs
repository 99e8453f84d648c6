use serde::{Deserialize, Serialize};

use crate::domain::MatterStatus;

/// Body of `PUT /api/matters/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMatterStatusRequest {
    pub status: MatterStatus,
}

/// Body of `POST /api/matters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMatterRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MatterStatus>,
}

pub fn matters_route() -> &'static str {
    "/api/matters"
}

pub fn matter_status_route(matter_id: i64) -> String {
    format!("/api/matters/{matter_id}/status")
}
