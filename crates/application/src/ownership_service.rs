use std::sync::Arc;

use vitrine_core::{AppError, AppResult, Principal, StoreId};

use crate::StoreRepository;

/// Returns the principal or an `Unauthorized` error when the request carried none.
pub fn require_principal(principal: Option<&Principal>) -> AppResult<&Principal> {
    principal.ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))
}

/// Answers whether a principal owns a store.
///
/// Authorization is ownership-only: there are no roles and no shared access.
/// Every call performs a fresh primary-key lookup.
#[derive(Clone)]
pub struct OwnershipService {
    stores: Arc<dyn StoreRepository>,
}

impl OwnershipService {
    /// Creates a new ownership service from a store repository.
    #[must_use]
    pub fn new(stores: Arc<dyn StoreRepository>) -> Self {
        Self { stores }
    }

    /// Returns whether the principal owns the store; a missing store is not owned.
    pub async fn is_owner(&self, principal: &Principal, store_id: StoreId) -> AppResult<bool> {
        Ok(self
            .stores
            .find_store(store_id)
            .await?
            .map(|store| store.is_owned_by(principal.subject()))
            .unwrap_or(false))
    }

    /// Ensures the principal owns the store.
    pub async fn require_owner(&self, principal: &Principal, store_id: StoreId) -> AppResult<()> {
        if self.is_owner(principal, store_id).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{}' does not own store '{store_id}'",
            principal.subject()
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Mutex;
    use vitrine_core::{AppError, AppResult, NonEmptyString, Principal, StoreId};
    use vitrine_domain::Store;

    use super::{OwnershipService, require_principal};
    use crate::{StoreDeleteOutcome, StoreRepository};

    #[derive(Default)]
    struct FakeStoreRepository {
        stores: Mutex<HashMap<StoreId, Store>>,
        lookups: Mutex<usize>,
    }

    #[async_trait]
    impl StoreRepository for FakeStoreRepository {
        async fn find_store(&self, store_id: StoreId) -> AppResult<Option<Store>> {
            *self.lookups.lock().await += 1;
            Ok(self.stores.lock().await.get(&store_id).cloned())
        }

        async fn list_stores_for_owner(&self, _owner_subject: &str) -> AppResult<Vec<Store>> {
            Ok(Vec::new())
        }

        async fn create_store(
            &self,
            owner_subject: &str,
            name: NonEmptyString,
        ) -> AppResult<Store> {
            let now = Utc::now();
            let store = Store::new(StoreId::new(), name, owner_subject, now, now)?;
            self.stores.lock().await.insert(store.id(), store.clone());
            Ok(store)
        }

        async fn rename_store(&self, store_id: StoreId, _name: NonEmptyString) -> AppResult<Store> {
            Err(AppError::NotFound(store_id.to_string()))
        }

        async fn delete_empty_store(&self, _store_id: StoreId) -> AppResult<StoreDeleteOutcome> {
            Ok(StoreDeleteOutcome::NotFound)
        }
    }

    fn principal(subject: &str) -> Principal {
        Principal::new(subject).unwrap_or_else(|_| unreachable!())
    }

    fn name(value: &str) -> NonEmptyString {
        NonEmptyString::new(value).unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn owner_is_recognized_and_others_are_not() {
        let repository = Arc::new(FakeStoreRepository::default());
        let store = repository
            .create_store("alice", name("Main"))
            .await
            .unwrap_or_else(|_| unreachable!());
        let service = OwnershipService::new(repository);

        assert!(matches!(
            service.is_owner(&principal("alice"), store.id()).await,
            Ok(true)
        ));
        assert!(matches!(
            service.is_owner(&principal("mallory"), store.id()).await,
            Ok(false)
        ));
    }

    #[tokio::test]
    async fn missing_store_is_not_owned() {
        let service = OwnershipService::new(Arc::new(FakeStoreRepository::default()));
        let result = service.is_owner(&principal("alice"), StoreId::new()).await;
        assert!(matches!(result, Ok(false)));
    }

    #[tokio::test]
    async fn require_owner_is_forbidden_for_non_owner() {
        let repository = Arc::new(FakeStoreRepository::default());
        let store = repository
            .create_store("alice", name("Main"))
            .await
            .unwrap_or_else(|_| unreachable!());
        let service = OwnershipService::new(repository);

        let result = service.require_owner(&principal("mallory"), store.id()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn every_check_performs_a_fresh_lookup() {
        let repository = Arc::new(FakeStoreRepository::default());
        let store = repository
            .create_store("alice", name("Main"))
            .await
            .unwrap_or_else(|_| unreachable!());
        let service = OwnershipService::new(repository.clone());

        for _ in 0..3 {
            assert!(
                service
                    .require_owner(&principal("alice"), store.id())
                    .await
                    .is_ok()
            );
        }
        assert_eq!(*repository.lookups.lock().await, 3);
    }

    #[test]
    fn missing_principal_is_unauthorized() {
        assert!(matches!(
            require_principal(None),
            Err(AppError::Unauthorized(_))
        ));
    }
}
