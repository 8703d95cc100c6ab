use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::{JwtAuth, Paginated, UploadedFile};
use std::sync::Arc;
use storage::{SharedStorage, delete_quietly, folders};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{
    Address, AddressInput, AdminUpdateUser, AuthResponse, LoginRequest, RegisterRequest,
    SessionUser, UpdateAddress, UpdateProfile, User, UserFilter, UserQuery, UserResponse,
    normalize_email,
};
use crate::repository::UserRepository;

/// Service layer for User business logic
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    storage: SharedStorage,
    jwt: JwtAuth,
    secure_cookies: bool,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            storage: Arc::clone(&self.storage),
            jwt: self.jwt.clone(),
            secure_cookies: self.secure_cookies,
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, storage: SharedStorage, jwt: JwtAuth) -> Self {
        Self {
            repository: Arc::new(repository),
            storage,
            jwt,
            secure_cookies: false,
        }
    }

    /// Mark session cookies `Secure` (production)
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    pub fn token_ttl_seconds(&self) -> i64 {
        self.jwt.ttl_seconds()
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterRequest) -> UserResult<AuthResponse> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let email = normalize_email(&input.email);
        if self.repository.get_by_email(&email).await?.is_some() {
            return Err(UserError::DuplicateEmail);
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .repository
            .create(User::new(input.name, &email, password_hash))
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.session(&user)
    }

    /// Unknown email, wrong password and inactive accounts all fail the same way
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginRequest) -> UserResult<AuthResponse> {
        let user = self
            .repository
            .get_by_email(&normalize_email(&input.email))
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !user.is_active || !verify_password(&input.password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "Rejected login");
            return Err(UserError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.session(&user)
    }

    fn session(&self, user: &User) -> UserResult<AuthResponse> {
        let token = self
            .jwt
            .issue(&user.actor())
            .map_err(|e| UserError::Token(e.to_string()))?;

        Ok(AuthResponse {
            token,
            user: SessionUser::from(user),
        })
    }

    async fn load(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> UserResult<UserResponse> {
        Ok(self.load(id).await?.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> UserResult<UserResponse> {
        let mut user = self.load(id).await?;
        user.apply_profile(input);

        let user = self.repository.update(user).await?;
        Ok(user.into())
    }

    /// Replace the profile picture, deleting the previous object
    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn upload_profile_image(&self, id: Uuid, file: UploadedFile) -> UserResult<UserResponse> {
        let mut user = self.load(id).await?;

        let url = self
            .storage
            .upload(
                folders::PROFILES,
                &file.file_name,
                &file.content_type,
                file.bytes.to_vec(),
            )
            .await?;
        let previous = user.profile_image.replace(url.clone());
        user.updated_at = chrono::Utc::now();

        let user = match self.repository.update(user).await {
            Ok(user) => user,
            Err(e) => {
                delete_quietly(self.storage.as_ref(), [url]).await;
                return Err(e);
            }
        };
        delete_quietly(self.storage.as_ref(), previous).await;

        Ok(user.into())
    }

    pub async fn addresses(&self, id: Uuid) -> UserResult<Vec<Address>> {
        Ok(self.load(id).await?.addresses)
    }

    #[instrument(skip(self, input))]
    pub async fn add_address(&self, id: Uuid, input: AddressInput) -> UserResult<Vec<Address>> {
        let mut user = self.load(id).await?;
        user.add_address(input);
        Ok(self.repository.update(user).await?.addresses)
    }

    #[instrument(skip(self, input))]
    pub async fn update_address(
        &self,
        id: Uuid,
        address_id: Uuid,
        input: UpdateAddress,
    ) -> UserResult<Vec<Address>> {
        let mut user = self.load(id).await?;
        user.update_address(address_id, input)?;
        Ok(self.repository.update(user).await?.addresses)
    }

    #[instrument(skip(self))]
    pub async fn delete_address(&self, id: Uuid, address_id: Uuid) -> UserResult<Vec<Address>> {
        let mut user = self.load(id).await?;
        user.remove_address(address_id)?;
        Ok(self.repository.update(user).await?.addresses)
    }

    #[instrument(skip(self))]
    pub async fn set_default_address(&self, id: Uuid, address_id: Uuid) -> UserResult<Vec<Address>> {
        let mut user = self.load(id).await?;
        user.set_default_address(address_id)?;
        Ok(self.repository.update(user).await?.addresses)
    }

    pub async fn wishlist(&self, id: Uuid) -> UserResult<Vec<Uuid>> {
        Ok(self.load(id).await?.wishlist)
    }

    #[instrument(skip(self))]
    pub async fn add_to_wishlist(&self, id: Uuid, product_id: Uuid) -> UserResult<Vec<Uuid>> {
        let mut user = self.load(id).await?;
        if !user.add_to_wishlist(product_id) {
            return Ok(user.wishlist);
        }
        Ok(self.repository.update(user).await?.wishlist)
    }

    #[instrument(skip(self))]
    pub async fn remove_from_wishlist(&self, id: Uuid, product_id: Uuid) -> UserResult<Vec<Uuid>> {
        let mut user = self.load(id).await?;
        if !user.remove_from_wishlist(product_id) {
            return Ok(user.wishlist);
        }
        Ok(self.repository.update(user).await?.wishlist)
    }

    #[instrument(skip(self, filter))]
    pub async fn list(&self, filter: UserFilter) -> UserResult<Paginated<UserResponse>> {
        let query = UserQuery::from(filter);
        let page = query.page;

        let (users, total) = self.repository.list(query).await?;
        Ok(Paginated::new(users, total, page).map(UserResponse::from))
    }

    #[instrument(skip(self, input))]
    pub async fn admin_update(&self, id: Uuid, input: AdminUpdateUser) -> UserResult<UserResponse> {
        let mut user = self.load(id).await?;
        user.apply_admin_update(input);

        let user = self.repository.update(user).await?;
        tracing::info!(user_id = %id, role = %user.role, active = user.is_active, "User updated by admin");
        Ok(user.into())
    }

    /// Delete a user and their profile image
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> UserResult<()> {
        let user = self.load(id).await?;

        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound);
        }

        delete_quietly(self.storage.as_ref(), user.profile_image).await;
        Ok(())
    }
}

// Password helpers

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
