//! In-memory user and token repositories.

use async_trait::async_trait;
use pagination::PageRequest;

use super::{InMemoryStore, StoreState, StoredUser, page_of};
use crate::domain::ports::{
    AuthTokenRepository, AuthTokenRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AuthToken, EmailAddress, NewUser, User, UserChanges, UserCredentials, UserId, Username,
};

fn ensure_unique(
    state: &StoreState,
    except: Option<i64>,
    username: Option<&Username>,
    email: Option<&EmailAddress>,
) -> Result<(), UserPersistenceError> {
    let others = state
        .users
        .values()
        .filter(|stored| Some(stored.user.id.get()) != except);
    for stored in others {
        if username.is_some_and(|name| name == &stored.user.username) {
            return Err(UserPersistenceError::duplicate("username"));
        }
        if email.is_some_and(|email| {
            email.as_ref().to_lowercase() == stored.user.email.as_ref().to_lowercase()
        }) {
            return Err(UserPersistenceError::duplicate("email"));
        }
    }
    Ok(())
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let now = self.now();
        let mut state = self.state.write().await;
        ensure_unique(&state, None, Some(&user.username), Some(&user.email))?;
        state.last_user_id += 1;
        let created = User {
            id: UserId::new(state.last_user_id),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone_number: user.phone_number.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: now,
            last_modified_at: now,
        };
        state.users.insert(
            created.id.get(),
            StoredUser {
                user: created.clone(),
                password_hash: user.password_hash.clone(),
            },
        );
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.state.read().await.user(id.get()).cloned())
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|stored| stored.user.username.as_ref() == username)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let now = self.now();
        let mut state = self.state.write().await;
        if !state.users.contains_key(&id.get()) {
            return Ok(None);
        }
        ensure_unique(
            &state,
            Some(id.get()),
            changes.username.as_ref(),
            changes.email.as_ref(),
        )?;
        let Some(stored) = state.users.get_mut(&id.get()) else {
            return Ok(None);
        };
        let user = &mut stored.user;
        if let Some(username) = &changes.username {
            user.username = username.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(first_name) = &changes.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(phone_number) = &changes.phone_number {
            user.phone_number = phone_number.clone();
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }
        if let Some(hash) = &changes.password_hash {
            stored.password_hash = hash.clone();
        }
        stored.user.last_modified_at = now;
        Ok(Some(stored.user.clone()))
    }

    async fn count(&self) -> Result<usize, UserPersistenceError> {
        Ok(self.state.read().await.users.len())
    }

    async fn list(&self, page: &PageRequest) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.state.read().await;
        Ok(page_of(
            state.users.values().map(|stored| stored.user.clone()),
            page,
        ))
    }
}

#[async_trait]
impl AuthTokenRepository for InMemoryStore {
    async fn issue(
        &self,
        user_id: UserId,
        candidate: &AuthToken,
    ) -> Result<AuthToken, AuthTokenRepositoryError> {
        let mut state = self.state.write().await;
        let existing = state
            .tokens
            .iter()
            .find(|(_, owner)| **owner == user_id.get())
            .map(|(key, _)| key.clone());
        if let Some(key) = existing {
            return AuthToken::parse(&key)
                .map_err(|err| AuthTokenRepositoryError::query(err.to_string()));
        }
        state
            .tokens
            .insert(candidate.as_str().to_owned(), user_id.get());
        Ok(candidate.clone())
    }

    async fn find_user(&self, token: &AuthToken) -> Result<Option<User>, AuthTokenRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .tokens
            .get(token.as_str())
            .and_then(|owner| state.user(*owner))
            .cloned())
    }

    async fn revoke(&self, token: &AuthToken) -> Result<bool, AuthTokenRepositoryError> {
        Ok(self
            .state
            .write()
            .await
            .tokens
            .remove(token.as_str())
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use mockable::DefaultClock;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{PasswordHash, PersonName, PhoneNumber, Role};

    #[fixture]
    fn store() -> InMemoryStore {
        InMemoryStore::new(Arc::new(DefaultClock))
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: Username::new(username).expect("valid"),
            email: EmailAddress::new(email).expect("valid"),
            first_name: PersonName::default(),
            last_name: PersonName::default(),
            phone_number: PhoneNumber::default(),
            role: Role::Regular,
            is_active: true,
            password_hash: PasswordHash::new("digest"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn assigns_sequential_ids(store: InMemoryStore) {
        let first = store.create(&new_user("a", "a@example.com")).await.expect("a");
        let second = store.create(&new_user("b", "b@example.com")).await.expect("b");
        assert_eq!(first.id, UserId::new(1));
        assert_eq!(second.id, UserId::new(2));
    }

    #[rstest]
    #[case("a", "other@example.com", "username")]
    #[case("other", "A@Example.com", "email")]
    #[tokio::test]
    async fn rejects_duplicates(
        store: InMemoryStore,
        #[case] username: &str,
        #[case] email: &str,
        #[case] field: &str,
    ) {
        store.create(&new_user("a", "a@example.com")).await.expect("a");
        let err = store
            .create(&new_user(username, email))
            .await
            .expect_err("duplicate");
        assert_eq!(err, UserPersistenceError::duplicate(field));
    }

    #[rstest]
    #[tokio::test]
    async fn update_may_keep_its_own_email(store: InMemoryStore) {
        let user = store.create(&new_user("a", "a@example.com")).await.expect("a");
        let changes = UserChanges {
            email: Some(EmailAddress::new("A@example.com").expect("valid")),
            ..UserChanges::default()
        };
        let updated = store
            .update(user.id, &changes)
            .await
            .expect("no conflict with itself")
            .expect("exists");
        assert_eq!(updated.email.as_ref(), "A@example.com");
    }

    #[rstest]
    #[tokio::test]
    async fn tokens_are_reused_until_revoked(store: InMemoryStore) {
        let user = store.create(&new_user("a", "a@example.com")).await.expect("a");
        let first = store
            .issue(user.id, &AuthToken::generate())
            .await
            .expect("issued");
        let again = store
            .issue(user.id, &AuthToken::generate())
            .await
            .expect("reissued");
        assert_eq!(first, again);
        assert_eq!(
            store.find_user(&first).await.expect("lookup").map(|u| u.id),
            Some(user.id)
        );

        assert!(store.revoke(&first).await.expect("revoke"));
        assert!(!store.revoke(&first).await.expect("second revoke"));
        assert_eq!(store.find_user(&first).await.expect("lookup"), None);
    }
}
