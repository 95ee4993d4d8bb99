//! The VOE API client.
//!
//! [`VoeClient`] exposes one async method per catalog operation. Each method
//! only marshals parameters into an [`Operation`]; validation, rate limiting,
//! retries and error classification all happen in the shared
//! [`RequestPipeline`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use super::config::ClientConfig;
use super::endpoints::Endpoint;
use super::error::{ApiError, Violation};
use super::pipeline::RequestPipeline;
use super::rate_limiter::RateLimiter;
use super::transport::{HttpTransport, Operation, Transport, Upload};
use super::types::{
    AccountInfo, CreatedFolder, DailyStats, DmcaListParams, FileInfo, FileListParams,
    FileUploadResponse, FolderListing, PremiumKey, PremiumKeyParams, RemoteUploadResponse,
    RemoteUploadStatus,
};
use super::validation::{
    DELETE_CODES, DMCA_LIST, FILE_CLONE, FILE_CODES, FILE_LIST, FILE_RENAME, FILE_SET_FOLDER,
    FOLDER_CREATE, FOLDER_LIST, FOLDER_RENAME, PREMIUM_KEY, REMOTE_UPLOAD,
};

/// Client for the VOE file-hosting API.
///
/// Cloning is cheap; clones share the configuration and the rate limiter.
///
/// # Example
///
/// ```no_run
/// use voe_core::api::{ClientConfig, VoeClient};
///
/// # async fn example() -> Result<(), voe_core::api::ApiError> {
/// let config = ClientConfig::builder("my-api-key").build()?;
/// let client = VoeClient::new(config)?;
///
/// let account = client.account_info().await?;
/// println!("{} has {} bytes left", account.email, account.storage_left);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VoeClient {
    pipeline: RequestPipeline,
    config: Arc<ClientConfig>,
}

impl VoeClient {
    /// Creates a client that talks HTTP to the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns a [`Network`](super::ErrorKind::Network) error when the HTTP
    /// client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client over a custom transport.
    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.rate_limit()));
        let pipeline = RequestPipeline::new(transport, limiter, config.retry_policy());
        Self {
            pipeline,
            config: Arc::new(config),
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the request pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    // ==================== Account ====================

    /// Fetches account details.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the final attempt.
    #[instrument(skip(self))]
    pub async fn account_info(&self) -> Result<AccountInfo, ApiError> {
        self.pipeline.execute(Endpoint::AccountInfo.operation()).await
    }

    /// Fetches per-day account statistics, keyed by date.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the final attempt.
    #[instrument(skip(self))]
    pub async fn account_stats(&self) -> Result<BTreeMap<String, DailyStats>, ApiError> {
        self.pipeline.execute(Endpoint::AccountStats.operation()).await
    }

    // ==================== Uploads ====================

    /// Returns the URL of the server that accepts the next direct upload.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the final attempt.
    #[instrument(skip(self))]
    pub async fn upload_server(&self) -> Result<String, ApiError> {
        self.pipeline.execute(Endpoint::UploadServer.operation()).await
    }

    /// Uploads a file: asks for an upload server, then posts the bytes to it.
    ///
    /// The upload response is returned as-is; it is not wrapped in the
    /// standard envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`Response`](super::ErrorKind::Response) error when no
    /// upload server is offered, otherwise the classified error of either
    /// request.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<FileUploadResponse, ApiError> {
        let server = self.upload_server().await?;
        if server.is_empty() {
            return Err(ApiError::invalid_response("no upload server offered"));
        }

        let upload = Upload {
            file_name: file_name.to_string(),
            bytes,
        };
        let response: FileUploadResponse = self
            .pipeline
            .execute_raw(Operation::post(server).with_upload(upload))
            .await?;

        if let Some(file) = &response.file {
            info!(file_code = %file.file_code, "upload complete");
        }
        Ok(response)
    }

    /// Queues a remote upload of `url`, optionally into a folder.
    ///
    /// # Errors
    ///
    /// Returns a [`Validation`](super::ErrorKind::Validation) error for a
    /// malformed URL, otherwise the classified error of the final attempt.
    #[instrument(skip(self))]
    pub async fn add_remote_upload(
        &self,
        url: &str,
        folder_id: Option<u64>,
    ) -> Result<RemoteUploadResponse, ApiError> {
        let operation = Endpoint::UploadUrl
            .operation()
            .with_params(&REMOTE_UPLOAD, json!({"url": url, "folder_id": folder_id}));
        self.pipeline.execute(operation).await
    }

    /// Lists queued remote uploads.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the final attempt.
    #[instrument(skip(self))]
    pub async fn remote_upload_list(&self) -> Result<Vec<RemoteUploadStatus>, ApiError> {
        self.pipeline.execute(Endpoint::UploadUrlList.operation()).await
    }

    // ==================== Files ====================

    /// Clones a file, optionally into a folder, and returns the copy.
    ///
    /// # Errors
    ///
    /// Returns a [`NotFound`](super::ErrorKind::NotFound) error when the
    /// server returns no file, a validation error for an empty code, or the
    /// classified error of the final attempt.
    #[instrument(skip(self))]
    pub async fn clone_file(
        &self,
        file_code: &str,
        folder_id: Option<u64>,
    ) -> Result<FileInfo, ApiError> {
        let operation = Endpoint::FileClone
            .operation()
            .with_params(&FILE_CLONE, json!({"file_code": file_code, "fld_id": folder_id}));
        self.pipeline
            .execute_optional(operation)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("file {file_code}")))
    }

    /// Fetches details of one or more files.
    ///
    /// # Errors
    ///
    /// Returns a [`Validation`](super::ErrorKind::Validation) error when
    /// `file_codes` is empty or holds an empty code, otherwise the classified
    /// error of the final attempt.
    #[instrument(skip(self, file_codes), fields(count = file_codes.len()))]
    pub async fn file_info<S: AsRef<str>>(
        &self,
        file_codes: &[S],
    ) -> Result<Vec<FileInfo>, ApiError> {
        let operation = Endpoint::FileInfo
            .operation()
            .with_params(&FILE_CODES, json!({"file_code": codes(file_codes)}));
        self.pipeline.execute(operation).await
    }

    /// Lists files matching `params`.
    ///
    /// # Errors
    ///
    /// Returns a [`Validation`](super::ErrorKind::Validation) error for
    /// out-of-range filters, otherwise the classified error of the final
    /// attempt.
    #[instrument(skip(self))]
    pub async fn file_list(&self, params: &FileListParams) -> Result<Vec<FileInfo>, ApiError> {
        let operation = Endpoint::FileList
            .operation()
            .with_params(&FILE_LIST, to_params(params)?);
        self.pipeline.execute(operation).await
    }

    /// Sets a file's title.
    ///
    /// # Errors
    ///
    /// Returns the validation error or the classified error of the final
    /// attempt.
    #[instrument(skip(self))]
    pub async fn rename_file(&self, file_code: &str, title: &str) -> Result<(), ApiError> {
        let operation = Endpoint::FileRename
            .operation()
            .with_params(&FILE_RENAME, json!({"file_code": file_code, "title": title}));
        self.pipeline.execute_optional::<Value>(operation).await?;
        Ok(())
    }

    /// Moves a file into a folder (`0` is the root).
    ///
    /// # Errors
    ///
    /// Returns the validation error or the classified error of the final
    /// attempt.
    #[instrument(skip(self))]
    pub async fn move_file_to_folder(
        &self,
        file_code: &str,
        folder_id: u64,
    ) -> Result<(), ApiError> {
        let operation = Endpoint::FileSetFolder.operation().with_params(
            &FILE_SET_FOLDER,
            json!({"file_code": file_code, "fld_id": folder_id}),
        );
        self.pipeline.execute_optional::<Value>(operation).await?;
        Ok(())
    }

    /// Deletes one or more files.
    ///
    /// # Errors
    ///
    /// Returns a [`Validation`](super::ErrorKind::Validation) error when
    /// `file_codes` is empty or holds an empty code, otherwise the classified
    /// error of the final attempt.
    #[instrument(skip(self, file_codes), fields(count = file_codes.len()))]
    pub async fn delete_files<S: AsRef<str>>(&self, file_codes: &[S]) -> Result<(), ApiError> {
        let operation = Endpoint::FileDelete
            .operation()
            .with_params(&DELETE_CODES, json!({"del_code": codes(file_codes)}));
        self.pipeline.execute_optional::<Value>(operation).await?;
        Ok(())
    }

    // ==================== Folders ====================

    /// Lists the subfolders and files of a folder, or of the root.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the final attempt.
    #[instrument(skip(self))]
    pub async fn folder_list(&self, folder_id: Option<u64>) -> Result<FolderListing, ApiError> {
        let operation = Endpoint::FolderList
            .operation()
            .with_params(&FOLDER_LIST, json!({"fld_id": folder_id}));
        self.pipeline.execute(operation).await
    }

    /// Creates a folder and returns its id.
    ///
    /// # Errors
    ///
    /// Returns a [`Response`](super::ErrorKind::Response) error when the
    /// server does not report the new folder id, otherwise the validation
    /// error or the classified error of the final attempt.
    #[instrument(skip(self))]
    pub async fn create_folder(&self, name: &str, parent_id: Option<u64>) -> Result<u64, ApiError> {
        let operation = Endpoint::FolderCreate
            .operation()
            .with_params(&FOLDER_CREATE, json!({"name": name, "parent_id": parent_id}));
        let created: CreatedFolder = self
            .pipeline
            .execute_optional(operation)
            .await?
            .ok_or_else(|| ApiError::invalid_response("missing folder id"))?;
        info!(fld_id = created.fld_id, "folder created");
        Ok(created.fld_id)
    }

    /// Renames a folder.
    ///
    /// # Errors
    ///
    /// Returns the validation error or the classified error of the final
    /// attempt.
    #[instrument(skip(self))]
    pub async fn rename_folder(&self, folder_id: u64, name: &str) -> Result<(), ApiError> {
        let operation = Endpoint::FolderRename
            .operation()
            .with_params(&FOLDER_RENAME, json!({"fld_id": folder_id, "name": name}));
        self.pipeline.execute_optional::<Value>(operation).await?;
        Ok(())
    }

    // ==================== History ====================

    /// Lists recently deleted files.
    ///
    /// # Errors
    ///
    /// Returns the validation error or the classified error of the final
    /// attempt.
    #[instrument(skip(self))]
    pub async fn deleted_files(&self, params: &DmcaListParams) -> Result<Vec<FileInfo>, ApiError> {
        let operation = Endpoint::FilesDeleted
            .operation()
            .with_params(&DMCA_LIST, to_params(params)?);
        self.pipeline.execute(operation).await
    }

    /// Lists files affected by DMCA notices.
    ///
    /// # Errors
    ///
    /// Returns the validation error or the classified error of the final
    /// attempt.
    #[instrument(skip(self))]
    pub async fn dmca_list(&self, params: &DmcaListParams) -> Result<Vec<FileInfo>, ApiError> {
        let operation = Endpoint::DmcaList
            .operation()
            .with_params(&DMCA_LIST, to_params(params)?);
        self.pipeline.execute(operation).await
    }

    // ==================== Settings & reseller ====================

    /// Returns the current adblock-resistant domain.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the final attempt.
    #[instrument(skip(self))]
    pub async fn current_domain(&self) -> Result<String, ApiError> {
        self.pipeline.execute(Endpoint::SettingsDomain.operation()).await
    }

    /// Generates premium keys for resale.
    ///
    /// # Errors
    ///
    /// Returns a [`Validation`](super::ErrorKind::Validation) error when
    /// `days` or `amount` is zero, otherwise the classified error of the
    /// final attempt.
    #[instrument(skip(self))]
    pub async fn generate_premium_keys(
        &self,
        params: PremiumKeyParams,
    ) -> Result<Vec<PremiumKey>, ApiError> {
        let operation = Endpoint::PremiumGenerate
            .operation()
            .with_params(&PREMIUM_KEY, to_params(&params)?);
        self.pipeline.execute(operation).await
    }
}

fn codes<S: AsRef<str>>(file_codes: &[S]) -> Vec<&str> {
    file_codes.iter().map(AsRef::as_ref).collect()
}

/// Serializes a parameter struct into the object the validator checks.
fn to_params<P: Serialize>(params: &P) -> Result<Value, ApiError> {
    serde_json::to_value(params)
        .map_err(|e| ApiError::validation(vec![Violation::new("params", e.to_string())]))
}
