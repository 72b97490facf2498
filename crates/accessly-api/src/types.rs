// Wire types for the Access developer API.
//
// Every payload arrives wrapped in the `{code, msg, data}` envelope;
// `code` is "SUCCESS" even when `data` is empty, and HTTP 200 with a
// non-success code still means the operation failed.

use serde::Deserialize;

/// Response envelope wrapping every Access developer API payload.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

/// Envelope `code` value signalling success.
pub const CODE_SUCCESS: &str = "SUCCESS";

/// One door as reported by `GET /doors`.
#[derive(Debug, Clone, Deserialize)]
pub struct DoorResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub floor_id: Option<String>,
    #[serde(rename = "type", default)]
    pub door_type: Option<String>,
    /// Whether the door is wired to an Access hub. Position status is
    /// only meaningful when this is set.
    #[serde(default)]
    pub is_bind_hub: bool,
    /// Lock relay status: "lock", "unlock", or a transitional value.
    pub door_lock_relay_status: String,
    /// Door position sensor: "open" or "close", when wired.
    #[serde(default)]
    pub door_position_status: Option<String>,
}
