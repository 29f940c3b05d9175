// src/store/memory.rs
// In-memory LinkStore. Nothing survives the process.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{LinkStore, StoreData, StoreError};
use crate::link::{Company, CompanyEdit, CompanyId, Link, LinkEdit, LinkId, NewLink, StatusUpdate};

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: StoreData) -> Self {
        MemoryStore {
            data: RwLock::new(data),
        }
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn list_links(&self, user_id: &str) -> Result<Vec<Link>, StoreError> {
        Ok(self.data.read().await.links_of(user_id))
    }

    async fn update_link_status(&self, link_id: LinkId, update: StatusUpdate) -> Result<Link, StoreError> {
        self.data.write().await.update_status(link_id, update)
    }

    async fn list_companies(&self, user_id: &str) -> Result<Vec<Company>, StoreError> {
        Ok(self.data.read().await.companies_of(user_id))
    }

    async fn create_company(
        &self,
        user_id: &str,
        name: &str,
        description: Option<String>,
    ) -> Result<Company, StoreError> {
        Ok(self.data.write().await.add_company(user_id, name, description))
    }

    async fn create_link(&self, new: NewLink) -> Result<Link, StoreError> {
        self.data.write().await.add_link(new)
    }

    async fn delete_link(&self, user_id: &str, link_id: LinkId) -> Result<(), StoreError> {
        self.data.write().await.remove_link(user_id, link_id)
    }

    async fn update_link(&self, user_id: &str, link_id: LinkId, edit: LinkEdit) -> Result<Link, StoreError> {
        self.data.write().await.edit_link(user_id, link_id, edit)
    }

    async fn update_company(
        &self,
        user_id: &str,
        company_id: CompanyId,
        edit: CompanyEdit,
    ) -> Result<Company, StoreError> {
        self.data.write().await.edit_company(user_id, company_id, edit)
    }

    async fn delete_company(&self, user_id: &str, company_id: CompanyId) -> Result<usize, StoreError> {
        self.data.write().await.remove_company(user_id, company_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkStatus;
    use chrono::Utc;

    async fn store_with_company() -> (MemoryStore, Company) {
        let store = MemoryStore::new();
        let company = store.create_company("alice", "Acme", None).await.unwrap();
        (store, company)
    }

    fn new_link(company: &Company, name: &str, url: &str) -> NewLink {
        NewLink {
            user_id: company.user_id.clone(),
            company_id: company.id,
            name: name.to_string(),
            url: url.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_links_are_listed_per_user_in_creation_order() {
        let (store, company) = store_with_company().await;
        let other = store.create_company("bob", "Other", None).await.unwrap();

        store.create_link(new_link(&company, "first", "https://a.example.com")).await.unwrap();
        store.create_link(new_link(&other, "bobs", "https://b.example.com")).await.unwrap();
        store.create_link(new_link(&company, "second", "c.example.com")).await.unwrap();

        let names: Vec<_> = store
            .list_links("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(store.list_companies("bob").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_link_requires_own_company_and_valid_url() {
        let (store, company) = store_with_company().await;
        let bobs = store.create_company("bob", "Bob Co", None).await.unwrap();

        let mut foreign = new_link(&bobs, "x", "https://x.example.com");
        foreign.user_id = "alice".to_string();
        assert!(matches!(
            store.create_link(foreign).await,
            Err(StoreError::CompanyNotFound(_))
        ));
        assert!(matches!(
            store.create_link(new_link(&company, "x", "mailto://someone")).await,
            Err(StoreError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (store, company) = store_with_company().await;
        let link = store.create_link(new_link(&company, "a", "https://a.example.com")).await.unwrap();

        let updated = store
            .update_link_status(
                link.id,
                StatusUpdate {
                    status: LinkStatus::Online,
                    response_time: Some(42),
                    last_checked: Utc::now(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, LinkStatus::Online);
        assert_eq!(updated.response_time, Some(42));

        assert!(matches!(
            store.delete_link("bob", link.id).await,
            Err(StoreError::LinkNotFound(_))
        ));
        store.delete_link("alice", link.id).await.unwrap();
        assert!(store.list_links("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_link_revalidates_and_keeps_status() {
        let (store, company) = store_with_company().await;
        let other = store.create_company("alice", "Other", None).await.unwrap();
        let link = store.create_link(new_link(&company, "a", "https://a.example.com")).await.unwrap();
        store
            .update_link_status(
                link.id,
                StatusUpdate {
                    status: LinkStatus::Offline,
                    response_time: Some(700),
                    last_checked: Utc::now(),
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            store
                .update_link(
                    "alice",
                    link.id,
                    LinkEdit {
                        url: Some("ftp://files.example.com".into()),
                        ..Default::default()
                    },
                )
                .await,
            Err(StoreError::InvalidUrl(_))
        ));

        let edited = store
            .update_link(
                "alice",
                link.id,
                LinkEdit {
                    name: Some("renamed".into()),
                    url: Some("b.example.com/health".into()),
                    company_id: Some(other.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.name, "renamed");
        assert_eq!(edited.url, "http://b.example.com/health");
        assert_eq!(edited.company_id, other.id);
        assert_eq!(edited.status, LinkStatus::Offline);
        assert_eq!(edited.response_time, Some(700));

        assert!(matches!(
            store.update_link("bob", link.id, LinkEdit::default()).await,
            Err(StoreError::LinkNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_links_by_company() {
        let (store, company) = store_with_company().await;
        let other = store.create_company("alice", "Other", None).await.unwrap();
        store.create_link(new_link(&company, "a", "https://a.example.com")).await.unwrap();
        store.create_link(new_link(&other, "b", "https://b.example.com")).await.unwrap();
        store.create_link(new_link(&company, "c", "https://c.example.com")).await.unwrap();

        let names: Vec<_> = store
            .list_links_by_company("alice", company.id)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(store.list_links_by_company("bob", company.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_company_edit_and_cascading_delete() {
        let (store, company) = store_with_company().await;
        let other = store.create_company("alice", "Other", None).await.unwrap();
        store.create_link(new_link(&company, "a", "https://a.example.com")).await.unwrap();
        store.create_link(new_link(&company, "b", "https://b.example.com")).await.unwrap();
        let kept = store.create_link(new_link(&other, "c", "https://c.example.com")).await.unwrap();

        let renamed = store
            .update_company(
                "alice",
                company.id,
                CompanyEdit {
                    name: Some("Acme Corp".into()),
                    description: Some("customers".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Acme Corp");
        assert_eq!(renamed.description.as_deref(), Some("customers"));

        assert!(matches!(
            store.delete_company("bob", company.id).await,
            Err(StoreError::CompanyNotFound(_))
        ));
        assert_eq!(store.delete_company("alice", company.id).await.unwrap(), 2);

        let remaining = store.list_links("alice").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);
        assert_eq!(store.list_companies("alice").await.unwrap().len(), 1);
    }
}
