//! Wire types of the VOE API: the response envelope, returned records and
//! request parameter structs.
//!
//! Field names follow the remote API. Parameter structs serialize to the
//! objects checked by [`validation`](super::validation); `None` fields are
//! omitted from the query string.

use serde::{Deserialize, Serialize};

/// Uniform wrapper around every enveloped response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Server clock at response time.
    #[serde(default)]
    pub server_time: String,
    /// Short status message.
    #[serde(default)]
    pub msg: String,
    /// Human-readable status message.
    #[serde(default)]
    pub message: String,
    /// Status code reported inside the body.
    #[serde(default)]
    pub status: u16,
    /// Whether the server considers the call successful.
    pub success: bool,
    /// Payload; absent for calls that return nothing.
    pub result: Option<T>,
}

/// Account details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub email: String,
    pub balance: String,
    pub storage_used: u64,
    pub storage_left: u64,
    pub premium_until: String,
    pub partner_until: String,
}

/// Statistics for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: String,
    pub views: u64,
    pub views_adb: u64,
    pub views_vpn_proxy: u64,
    pub views_paid: u64,
    pub views_tor: u64,
    pub uploads: u64,
    pub downloads: u64,
    pub profit_total: f64,
    pub views_total: u64,
}

/// Result of a direct file upload (not enveloped).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileUploadResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub file: Option<UploadedFile>,
}

/// File record returned by a direct upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: u64,
    pub file_code: String,
    pub file_title: String,
    pub encoding_necessary: bool,
}

/// Result of queuing a remote (URL) upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteUploadResponse {
    pub file_code: String,
    #[serde(rename = "queueID")]
    pub queue_id: u64,
}

/// Progress of a queued remote upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteUploadStatus {
    pub id: u64,
    pub folder_id: u64,
    pub file_code: String,
    pub url: String,
    pub status: i64,
    pub status_note: String,
    pub created_at: String,
    pub started_at: Option<String>,
    pub updated_at: String,
    pub total_size: u64,
    pub loaded_size: u64,
    pub speed: f64,
    pub estimated_duration: f64,
    pub percent: f64,
    pub additional_headers: Option<String>,
}

/// File record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub status: i64,
    #[serde(rename = "fileCode")]
    pub file_code: String,
    pub name: String,
    pub title: String,
    pub length: u64,
    pub file_size: u64,
}

/// Folder record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderInfo {
    pub fld_id: u64,
    pub name: String,
}

/// Contents of one folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderListing {
    #[serde(default)]
    pub folders: Vec<FolderInfo>,
    #[serde(default)]
    pub files: Vec<FileInfo>,
}

/// Result of creating a folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatedFolder {
    pub fld_id: u64,
}

/// A generated premium key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PremiumKey {
    pub key: String,
    pub days: u32,
}

/// Page selection shared by listing calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

/// Value of the `created` filter: a date string or a unix timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedFilter {
    Date(String),
    Timestamp(i64),
}

/// Filters for [`VoeClient::file_list`](super::VoeClient::file_list).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileListParams {
    #[serde(flatten)]
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fld_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<CreatedFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<bool>,
}

/// Filters for the deleted-files and DMCA listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmcaListParams {
    #[serde(flatten)]
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
}

/// Parameters for premium key generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumKeyParams {
    pub days: u32,
    pub amount: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_envelope_without_result_decodes() {
        let envelope: ApiResponse<Vec<FileInfo>> = serde_json::from_value(json!({
            "server_time": "2024-05-01 10:00:00",
            "msg": "OK",
            "message": "OK",
            "status": 200,
            "success": true
        }))
        .unwrap();
        assert!(envelope.success);
        assert!(envelope.result.is_none());
    }

    #[test]
    fn test_file_info_uses_camel_case_code() {
        let info: FileInfo = serde_json::from_value(json!({
            "status": 200,
            "fileCode": "abc123",
            "name": "clip.mp4",
            "title": "clip",
            "length": 93,
            "file_size": 1024
        }))
        .unwrap();
        assert_eq!(info.file_code, "abc123");
    }

    #[test]
    fn test_remote_upload_response_queue_id() {
        let response: RemoteUploadResponse =
            serde_json::from_value(json!({"file_code": "x1", "queueID": 17})).unwrap();
        assert_eq!(response.queue_id, 17);
    }

    #[test]
    fn test_file_list_params_flatten_and_skip_none() {
        let params = FileListParams {
            pagination: Pagination {
                page: Some(2),
                per_page: None,
            },
            created: Some(CreatedFilter::Timestamp(1_700_000_000)),
            preview: Some(true),
            ..FileListParams::default()
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"page": 2, "created": 1_700_000_000, "preview": true})
        );
    }
}
