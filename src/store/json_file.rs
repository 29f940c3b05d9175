// src/store/json_file.rs
// =============================================================================
// A LinkStore backed by a single JSON file.
//
// The file is the source of truth, not this process. Other processes (a
// `link add` next to a running `watch`) may change it at any time, so:
// - every read loads the file again
// - every change loads the file, applies itself to what it found, and
//   replaces the file in one rename
// A failed change leaves the file as it was.
//
// Rust concepts:
// - tokio::fs: file I/O that doesn't block the runtime
// - Mutex: one writer at a time inside this process
// =============================================================================

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use super::{LinkStore, StoreData, StoreError};
use crate::link::{Company, CompanyEdit, CompanyId, Link, LinkEdit, LinkId, NewLink, StatusUpdate};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonFileStore {
    // Opens the store at `path`; a missing file is an empty store
    //
    // The file is read once here so a corrupt store fails fast.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = JsonFileStore {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        };

        let data = store.load().await?;
        debug!(
            path = %store.path.display(),
            companies = data.companies.len(),
            links = data.links.len(),
            "Store opened"
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Reads the current file contents
    async fn load(&self) -> Result<StoreData, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(StoreData::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Store file not found, treating it as empty");
                Ok(StoreData::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn read<T>(&self, view: impl FnOnce(&StoreData) -> T) -> Result<T, StoreError> {
        let _guard = self.lock.lock().await;
        let data = self.load().await?;
        Ok(view(&data))
    }

    // Runs `change` against the file as it is now, then swaps the new
    // contents in. Nothing is written when `change` fails.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut StoreData) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.lock.lock().await;
        let mut data = self.load().await?;
        let value = change(&mut data)?;

        let bytes = serde_json::to_vec_pretty(&data)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Readers see either the old file or the new one, never half of it
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        Ok(value)
    }

    // Sibling of the store file, so the rename stays on one filesystem
    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl LinkStore for JsonFileStore {
    async fn list_links(&self, user_id: &str) -> Result<Vec<Link>, StoreError> {
        self.read(|data| data.links_of(user_id)).await
    }

    async fn update_link_status(&self, link_id: LinkId, update: StatusUpdate) -> Result<Link, StoreError> {
        self.mutate(|data| data.update_status(link_id, update)).await
    }

    async fn list_companies(&self, user_id: &str) -> Result<Vec<Company>, StoreError> {
        self.read(|data| data.companies_of(user_id)).await
    }

    async fn create_company(
        &self,
        user_id: &str,
        name: &str,
        description: Option<String>,
    ) -> Result<Company, StoreError> {
        self.mutate(|data| Ok(data.add_company(user_id, name, description))).await
    }

    async fn create_link(&self, new: NewLink) -> Result<Link, StoreError> {
        self.mutate(|data| data.add_link(new)).await
    }

    async fn delete_link(&self, user_id: &str, link_id: LinkId) -> Result<(), StoreError> {
        self.mutate(|data| data.remove_link(user_id, link_id)).await
    }

    async fn update_link(&self, user_id: &str, link_id: LinkId, edit: LinkEdit) -> Result<Link, StoreError> {
        self.mutate(|data| data.edit_link(user_id, link_id, edit)).await
    }

    async fn update_company(
        &self,
        user_id: &str,
        company_id: CompanyId,
        edit: CompanyEdit,
    ) -> Result<Company, StoreError> {
        self.mutate(|data| data.edit_company(user_id, company_id, edit)).await
    }

    async fn delete_company(&self, user_id: &str, company_id: CompanyId) -> Result<usize, StoreError> {
        self.mutate(|data| data.remove_company(user_id, company_id)).await
    }
}
