use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::instrument;

use bloodconnect_config::BackendConfig;
use bloodconnect_models::{
    AddUserRequest, BackendUserRecord, Credential, Email, Role, RoleResponse, UpdateRoleRequest,
    UpdateStatusRequest, UpdateUserProfile, UpsertOutcome, UserFilterParams, UserStatus,
};

use super::{BackendError, UserBackend};

/// Client for the backend REST API.
///
/// Two clients mirror the two API hosts: the public one (no credential, used
/// for `/add-user`) and the secure one, which attaches
/// `Authorization: Bearer <credential>` whenever a credential is present.
#[derive(Debug, Clone)]
pub struct HttpUserBackend {
    public: Client,
    secure: Client,
    config: BackendConfig,
}

impl HttpUserBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let timeout = config.request_timeout;
        let build = || Client::builder().timeout(timeout).build();
        let public = build()?;
        let secure = build()?;
        Ok(Self {
            public,
            secure,
            config,
        })
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}{}", self.config.public_base_url.trim_end_matches('/'), path)
    }

    fn secure_url(&self, path: &str) -> String {
        format!("{}{}", self.config.secure_base_url.trim_end_matches('/'), path)
    }

    /// `{secure}/users/{email}` with the email percent-encoded as one segment.
    fn user_url(&self, email: &Email) -> Result<Url, BackendError> {
        let base = &self.config.secure_base_url;
        let mut url =
            Url::parse(base).map_err(|e| BackendError::InvalidUrl(format!("{base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(base.clone()))?
            .pop_if_empty()
            .push("users")
            .push(email.as_str());
        Ok(url)
    }

    fn authorized(builder: RequestBuilder, credential: &Credential) -> RequestBuilder {
        if credential.is_empty() {
            builder
        } else {
            builder.header(AUTHORIZATION, credential.bearer())
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or(text);
    Err(BackendError::from_status(status, message))
}

#[async_trait]
impl UserBackend for HttpUserBackend {
    #[instrument(skip(self, request), fields(user.email = %request.email))]
    async fn upsert_user(&self, request: &AddUserRequest) -> Result<UpsertOutcome, BackendError> {
        let response = self
            .public
            .post(self.public_url("/add-user"))
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    #[instrument(skip_all)]
    async fn fetch_role(&self, credential: &Credential) -> Result<Role, BackendError> {
        let builder = self.secure.get(self.secure_url("/get-user-role"));
        let response = Self::authorized(builder, credential).send().await?;
        let body: RoleResponse = read_json(response).await?;
        Ok(Role::from_backend(&body.role))
    }

    #[instrument(skip(self, credential))]
    async fn get_user(
        &self,
        credential: &Credential,
        email: &Email,
    ) -> Result<BackendUserRecord, BackendError> {
        let builder = self.secure.get(self.user_url(email)?);
        let response = Self::authorized(builder, credential).send().await?;
        read_json(response).await
    }

    #[instrument(skip(self, credential, update))]
    async fn update_profile(
        &self,
        credential: &Credential,
        email: &Email,
        update: &UpdateUserProfile,
    ) -> Result<BackendUserRecord, BackendError> {
        let builder = self.secure.patch(self.user_url(email)?).json(update);
        let response = Self::authorized(builder, credential).send().await?;
        read_json(response).await
    }

    #[instrument(skip(self, credential))]
    async fn list_users(
        &self,
        credential: &Credential,
        filter: &UserFilterParams,
    ) -> Result<Vec<BackendUserRecord>, BackendError> {
        let status = filter.status.map(|s| s.as_str()).unwrap_or("all");
        let builder = self
            .secure
            .get(self.secure_url("/get-users"))
            .query(&[("status", status)]);
        let response = Self::authorized(builder, credential).send().await?;
        read_json(response).await
    }

    #[instrument(skip(self, credential))]
    async fn update_role(
        &self,
        credential: &Credential,
        id: &str,
        role: Role,
    ) -> Result<BackendUserRecord, BackendError> {
        let builder = self
            .secure
            .patch(self.secure_url(&format!("/update-users/role/{id}")))
            .json(&UpdateRoleRequest { role });
        let response = Self::authorized(builder, credential).send().await?;
        read_json(response).await
    }

    #[instrument(skip(self, credential))]
    async fn update_status(
        &self,
        credential: &Credential,
        id: &str,
        status: UserStatus,
    ) -> Result<BackendUserRecord, BackendError> {
        let builder = self
            .secure
            .patch(self.secure_url(&format!("/update-users/status/{id}")))
            .json(&UpdateStatusRequest { status });
        let response = Self::authorized(builder, credential).send().await?;
        read_json(response).await
    }
}
