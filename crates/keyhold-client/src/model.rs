//! Wire model types for the Consul-compatible session and KV APIs

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Session as returned by `GET /v1/session/info/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Node", default)]
    pub node: String,
    #[serde(rename = "LockDelay", default)]
    pub lock_delay: u64,
    #[serde(rename = "Behavior", default)]
    pub behavior: String,
    #[serde(rename = "TTL", default)]
    pub ttl: String,
    #[serde(rename = "CreateIndex", default)]
    pub create_index: u64,
    #[serde(rename = "ModifyIndex", default)]
    pub modify_index: u64,
}

/// Body for `PUT /v1/session/create`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionCreateRequest {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "LockDelay", skip_serializing_if = "Option::is_none")]
    pub lock_delay: Option<String>,
    #[serde(rename = "Behavior", skip_serializing_if = "Option::is_none")]
    pub behavior: Option<String>,
    #[serde(rename = "TTL", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

/// Response from `PUT /v1/session/create`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreateResponse {
    #[serde(rename = "ID")]
    pub id: String,
}

/// KV entry as returned by `GET /v1/kv/{key}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvPair {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "CreateIndex", default)]
    pub create_index: u64,
    #[serde(rename = "ModifyIndex", default)]
    pub modify_index: u64,
    #[serde(rename = "LockIndex", default)]
    pub lock_index: u64,
    #[serde(rename = "Flags", default)]
    pub flags: u64,
    /// Base64-encoded value
    #[serde(rename = "Value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Session currently holding the key, if any
    #[serde(rename = "Session", skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

impl KvPair {
    /// Decode the base64 value into bytes, if present and valid.
    pub fn decoded_value(&self) -> Option<Vec<u8>> {
        let encoded = self.value.as_deref()?;
        base64::engine::general_purpose::STANDARD.decode(encoded).ok()
    }
}
