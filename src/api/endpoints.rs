//! Catalog of remote API endpoints.

use std::fmt;

use super::transport::{Method, Operation};

/// A named VOE API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AccountInfo,
    AccountStats,
    UploadServer,
    UploadUrl,
    UploadUrlList,
    FileClone,
    FileInfo,
    FileList,
    FileRename,
    FileSetFolder,
    FileDelete,
    FolderList,
    FolderCreate,
    FolderRename,
    FilesDeleted,
    DmcaList,
    SettingsDomain,
    PremiumGenerate,
}

impl Endpoint {
    /// Every endpoint, in catalog order.
    pub const ALL: [Self; 18] = [
        Self::AccountInfo,
        Self::AccountStats,
        Self::UploadServer,
        Self::UploadUrl,
        Self::UploadUrlList,
        Self::FileClone,
        Self::FileInfo,
        Self::FileList,
        Self::FileRename,
        Self::FileSetFolder,
        Self::FileDelete,
        Self::FolderList,
        Self::FolderCreate,
        Self::FolderRename,
        Self::FilesDeleted,
        Self::DmcaList,
        Self::SettingsDomain,
        Self::PremiumGenerate,
    ];

    /// Path relative to the API base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::AccountInfo => "/account/info",
            Self::AccountStats => "/account/stats",
            Self::UploadServer => "/upload/server",
            Self::UploadUrl => "/upload/url",
            Self::UploadUrlList => "/upload/url/list",
            Self::FileClone => "/file/clone",
            Self::FileInfo => "/file/info",
            Self::FileList => "/file/list",
            Self::FileRename => "/file/rename",
            Self::FileSetFolder => "/file/set_folder",
            Self::FileDelete => "/file/delete",
            Self::FolderList => "/folder/list",
            Self::FolderCreate => "/folder/create",
            Self::FolderRename => "/folder/rename",
            Self::FilesDeleted => "/files/deleted",
            Self::DmcaList => "/dmca/list",
            Self::SettingsDomain => "/settings/domain",
            Self::PremiumGenerate => "/reseller/premium/generate",
        }
    }

    /// HTTP method the endpoint expects.
    #[must_use]
    pub const fn method(self) -> Method {
        match self {
            Self::UploadUrl => Method::Post,
            _ => Method::Get,
        }
    }

    /// Starts an operation against this endpoint.
    #[must_use]
    pub fn operation(self) -> Operation {
        match self.method() {
            Method::Get => Operation::get(self.path()),
            Method::Post => Operation::post(self.path()),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
