use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use validator::Validate;

use bloodconnect_auth::verify_local_token;
use bloodconnect_config::LocalAuthConfig;
use bloodconnect_models::{
    AddUserRequest, BackendUserRecord, Credential, Email, Role, UpdateUserProfile, UpsertOutcome,
    UserFilterParams, UserStatus,
};

use super::{BackendError, UserBackend};
use crate::guard::check_role_hierarchy;

/// In-process user store keyed by email.
///
/// Callers are identified by local bearer tokens verified with the shared
/// [`LocalAuthConfig`]. The `*_as` methods take an already-authenticated
/// caller and apply the access rules: self-or-admin for a user's own record,
/// admin for listing and for role/status changes.
#[derive(Debug)]
pub struct MemoryUserBackend {
    auth: LocalAuthConfig,
    users: RwLock<HashMap<Email, BackendUserRecord>>,
}

impl MemoryUserBackend {
    pub fn new(auth: LocalAuthConfig) -> Self {
        Self {
            auth,
            users: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Email of the caller holding `credential`.
    pub fn authenticate(&self, credential: &Credential) -> Result<Email, BackendError> {
        if credential.is_empty() {
            return Err(BackendError::Unauthorized);
        }
        let claims = verify_local_token(credential.as_str(), &self.auth).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            BackendError::Unauthorized
        })?;
        Email::new(claims.email).map_err(|_| BackendError::Unauthorized)
    }

    pub async fn upsert(&self, request: &AddUserRequest) -> UpsertOutcome {
        let mut users = self.users.write().await;
        let now = Utc::now();

        if let Some(existing) = users.get_mut(&request.email) {
            if !request.name.is_empty() {
                existing.name = request.name.clone();
            }
            if let Some(photo) = &request.photo_url {
                existing.photo_url = Some(photo.clone());
            }
            existing.updated_at = now;
            tracing::debug!(user.email = %request.email, "Refreshed existing user");
            return UpsertOutcome::Updated { updated: true };
        }

        let id = uuid::Uuid::new_v4().simple().to_string();
        users.insert(
            request.email.clone(),
            BackendUserRecord {
                id: id.clone(),
                email: request.email.clone(),
                name: request.name.clone(),
                role: request.role,
                status: request.status.unwrap_or_default(),
                photo_url: request.photo_url.clone(),
                phone_number: None,
                blood_group: None,
                district: None,
                upazila: None,
                created_at: now,
                updated_at: now,
            },
        );
        tracing::info!(user.email = %request.email, role = %request.role, "Inserted user");
        UpsertOutcome::Inserted { inserted_id: id }
    }

    pub async fn find_by_email(&self, email: &Email) -> Option<BackendUserRecord> {
        self.users.read().await.get(email).cloned()
    }

    /// Sets the role of the record for `email` without an access check.
    /// Used for seeding and bootstrapping the first admin.
    pub async fn set_role_by_email(&self, email: &Email, role: Role) -> Option<BackendUserRecord> {
        let mut users = self.users.write().await;
        let record = users.get_mut(email)?;
        record.role = role;
        record.updated_at = Utc::now();
        Some(record.clone())
    }

    pub async fn role_as(&self, caller: &Email) -> Result<Role, BackendError> {
        self.find_by_email(caller)
            .await
            .map(|record| record.role)
            .ok_or_else(|| BackendError::NotFound(format!("no user record for {caller}")))
    }

    pub async fn get_user_as(
        &self,
        caller: &Email,
        email: &Email,
    ) -> Result<BackendUserRecord, BackendError> {
        self.require_self_or_admin(caller, email).await?;
        self.find_by_email(email)
            .await
            .ok_or_else(|| BackendError::NotFound(format!("user {email}")))
    }

    pub async fn update_profile_as(
        &self,
        caller: &Email,
        email: &Email,
        update: &UpdateUserProfile,
    ) -> Result<BackendUserRecord, BackendError> {
        update
            .validate()
            .map_err(|e| BackendError::Validation(e.to_string()))?;
        self.require_self_or_admin(caller, email).await?;

        let mut users = self.users.write().await;
        let record = users
            .get_mut(email)
            .ok_or_else(|| BackendError::NotFound(format!("user {email}")))?;
        record.apply_profile(update);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    pub async fn list_users_as(
        &self,
        caller: &Email,
        filter: &UserFilterParams,
    ) -> Result<Vec<BackendUserRecord>, BackendError> {
        self.require_admin(caller).await?;

        let users = self.users.read().await;
        let mut records: Vec<BackendUserRecord> = users
            .values()
            .filter(|u| filter.status.is_none_or(|status| u.status == status))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.email.cmp(&b.email)));
        Ok(records)
    }

    pub async fn update_role_as(
        &self,
        caller: &Email,
        id: &str,
        role: Role,
    ) -> Result<BackendUserRecord, BackendError> {
        self.require_admin(caller).await?;
        self.modify_by_id(id, |record| record.role = role).await
    }

    pub async fn update_status_as(
        &self,
        caller: &Email,
        id: &str,
        status: UserStatus,
    ) -> Result<BackendUserRecord, BackendError> {
        self.require_admin(caller).await?;
        self.modify_by_id(id, |record| record.status = status).await
    }

    async fn modify_by_id<F>(&self, id: &str, change: F) -> Result<BackendUserRecord, BackendError>
    where
        F: FnOnce(&mut BackendUserRecord),
    {
        let mut users = self.users.write().await;
        let record = users
            .values_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("user id {id}")))?;
        change(record);
        record.updated_at = Utc::now();
        tracing::info!(
            user.email = %record.email,
            role = %record.role,
            status = %record.status,
            "Updated user"
        );
        Ok(record.clone())
    }

    async fn require_admin(&self, caller: &Email) -> Result<(), BackendError> {
        let Some(record) = self.find_by_email(caller).await else {
            return Err(BackendError::Forbidden(
                "administrator privileges required".to_string(),
            ));
        };
        check_role_hierarchy(&record.role, &Role::Admin)
            .map_err(|denied| BackendError::Forbidden(denied.to_string()))
    }

    async fn require_self_or_admin(
        &self,
        caller: &Email,
        email: &Email,
    ) -> Result<(), BackendError> {
        if caller == email {
            return Ok(());
        }
        self.require_admin(caller).await
    }
}

#[async_trait]
impl UserBackend for MemoryUserBackend {
    async fn upsert_user(&self, request: &AddUserRequest) -> Result<UpsertOutcome, BackendError> {
        Ok(self.upsert(request).await)
    }

    async fn fetch_role(&self, credential: &Credential) -> Result<Role, BackendError> {
        let caller = self.authenticate(credential)?;
        self.role_as(&caller).await
    }

    async fn get_user(
        &self,
        credential: &Credential,
        email: &Email,
    ) -> Result<BackendUserRecord, BackendError> {
        let caller = self.authenticate(credential)?;
        self.get_user_as(&caller, email).await
    }

    async fn update_profile(
        &self,
        credential: &Credential,
        email: &Email,
        update: &UpdateUserProfile,
    ) -> Result<BackendUserRecord, BackendError> {
        let caller = self.authenticate(credential)?;
        self.update_profile_as(&caller, email, update).await
    }

    async fn list_users(
        &self,
        credential: &Credential,
        filter: &UserFilterParams,
    ) -> Result<Vec<BackendUserRecord>, BackendError> {
        let caller = self.authenticate(credential)?;
        self.list_users_as(&caller, filter).await
    }

    async fn update_role(
        &self,
        credential: &Credential,
        id: &str,
        role: Role,
    ) -> Result<BackendUserRecord, BackendError> {
        let caller = self.authenticate(credential)?;
        self.update_role_as(&caller, id, role).await
    }

    async fn update_status(
        &self,
        credential: &Credential,
        id: &str,
        status: UserStatus,
    ) -> Result<BackendUserRecord, BackendError> {
        let caller = self.authenticate(credential)?;
        self.update_status_as(&caller, id, status).await
    }
}
