// src/store/mod.rs
// =============================================================================
// Persistence for companies and links.
//
// The monitor only needs three things from storage:
// - list_links: every link a user owns, in creation order
// - update_link_status: write one link's status fields
// - list_companies: for the dashboard numbers
//
// The remaining methods are the plain data-entry side used by the CLI:
// create / edit / delete for companies and links. Deleting a company
// deletes its links with it.
//
// Implementations:
// - memory: everything in a RwLock'd Vec (tests, embedding)
// - json_file: the same, saved to a JSON file after each change
// =============================================================================

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::link::{
    validate_url, Company, CompanyEdit, CompanyId, Link, LinkEdit, LinkId, NewLink, StatusUpdate, UrlError,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("link {0} not found")]
    LinkNotFound(LinkId),
    #[error("company {0} not found")]
    CompanyNotFound(CompanyId),
    #[error(transparent)]
    InvalidUrl(#[from] UrlError),
}

#[async_trait]
pub trait LinkStore: Send + Sync + 'static {
    async fn list_links(&self, user_id: &str) -> Result<Vec<Link>, StoreError>;

    async fn update_link_status(&self, link_id: LinkId, update: StatusUpdate) -> Result<Link, StoreError>;

    async fn list_companies(&self, user_id: &str) -> Result<Vec<Company>, StoreError>;

    async fn create_company(
        &self,
        user_id: &str,
        name: &str,
        description: Option<String>,
    ) -> Result<Company, StoreError>;

    async fn create_link(&self, new: NewLink) -> Result<Link, StoreError>;

    async fn delete_link(&self, user_id: &str, link_id: LinkId) -> Result<(), StoreError>;

    // Changes name / url / description / company; the status fields stay
    async fn update_link(&self, user_id: &str, link_id: LinkId, edit: LinkEdit) -> Result<Link, StoreError>;

    async fn update_company(
        &self,
        user_id: &str,
        company_id: CompanyId,
        edit: CompanyEdit,
    ) -> Result<Company, StoreError>;

    // Removes the company and every link under it; returns how many links went
    async fn delete_company(&self, user_id: &str, company_id: CompanyId) -> Result<usize, StoreError>;

    async fn list_links_by_company(&self, user_id: &str, company_id: CompanyId) -> Result<Vec<Link>, StoreError> {
        let mut links = self.list_links(user_id).await?;
        links.retain(|l| l.company_id == company_id);
        Ok(links)
    }

    async fn find_link(&self, user_id: &str, link_id: LinkId) -> Result<Link, StoreError> {
        self.list_links(user_id)
            .await?
            .into_iter()
            .find(|l| l.id == link_id)
            .ok_or(StoreError::LinkNotFound(link_id))
    }
}

// The whole store as one serializable document
//
// Both backends keep one of these behind a lock; all the rules live here
// so they can't drift apart.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl StoreData {
    fn links_of(&self, user_id: &str) -> Vec<Link> {
        self.links.iter().filter(|l| l.user_id == user_id).cloned().collect()
    }

    fn companies_of(&self, user_id: &str) -> Vec<Company> {
        self.companies.iter().filter(|c| c.user_id == user_id).cloned().collect()
    }

    fn update_status(&mut self, link_id: LinkId, update: StatusUpdate) -> Result<Link, StoreError> {
        let link = self
            .links
            .iter_mut()
            .find(|l| l.id == link_id)
            .ok_or(StoreError::LinkNotFound(link_id))?;
        link.apply_status(update);
        Ok(link.clone())
    }

    fn add_company(&mut self, user_id: &str, name: &str, description: Option<String>) -> Company {
        let company = Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description,
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        self.companies.push(company.clone());
        company
    }

    fn require_company(&self, user_id: &str, company_id: CompanyId) -> Result<(), StoreError> {
        if self.companies.iter().any(|c| c.id == company_id && c.user_id == user_id) {
            Ok(())
        } else {
            Err(StoreError::CompanyNotFound(company_id))
        }
    }

    fn add_link(&mut self, new: NewLink) -> Result<Link, StoreError> {
        let url = validate_url(&new.url)?;
        self.require_company(&new.user_id, new.company_id)?;

        let link = Link::from_new(new, url);
        self.links.push(link.clone());
        Ok(link)
    }

    fn remove_link(&mut self, user_id: &str, link_id: LinkId) -> Result<(), StoreError> {
        let position = self
            .links
            .iter()
            .position(|l| l.id == link_id && l.user_id == user_id)
            .ok_or(StoreError::LinkNotFound(link_id))?;
        self.links.remove(position);
        Ok(())
    }

    fn edit_link(&mut self, user_id: &str, link_id: LinkId, edit: LinkEdit) -> Result<Link, StoreError> {
        let url = edit.url.as_deref().map(validate_url).transpose()?;
        if let Some(company_id) = edit.company_id {
            self.require_company(user_id, company_id)?;
        }

        let link = self
            .links
            .iter_mut()
            .find(|l| l.id == link_id && l.user_id == user_id)
            .ok_or(StoreError::LinkNotFound(link_id))?;
        link.apply_edit(edit, url);
        Ok(link.clone())
    }

    fn edit_company(&mut self, user_id: &str, company_id: CompanyId, edit: CompanyEdit) -> Result<Company, StoreError> {
        let company = self
            .companies
            .iter_mut()
            .find(|c| c.id == company_id && c.user_id == user_id)
            .ok_or(StoreError::CompanyNotFound(company_id))?;
        company.apply_edit(edit);
        Ok(company.clone())
    }

    fn remove_company(&mut self, user_id: &str, company_id: CompanyId) -> Result<usize, StoreError> {
        self.require_company(user_id, company_id)?;
        self.companies.retain(|c| c.id != company_id);

        let before = self.links.len();
        self.links.retain(|l| l.company_id != company_id);
        Ok(before - self.links.len())
    }
}
