use uuid::Uuid;
use validator::Validate;

use crate::auth::{authority::Role, PasswordHasher};
use crate::error::AppError;
use crate::models::{
    Message, Page, UpdatePassword, User, UserCreate, UserPublic, UserRegister, UserUpdate,
    UserUpdateMe, UsersPublic,
};
use crate::store::Session;

fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}

/// Account management over one unit of work. Every write commits before
/// returning; a failed operation leaves nothing behind.
pub struct UserDirectory<'a> {
    session: &'a mut dyn Session,
    hasher: &'a PasswordHasher,
}

impl<'a> UserDirectory<'a> {
    pub fn new(session: &'a mut dyn Session, hasher: &'a PasswordHasher) -> Self {
        Self { session, hasher }
    }

    /// Unknown email and wrong password give the same `None`.
    pub async fn authenticate(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let user = self
            .session
            .find_user_by_email(&normalize_email(email))
            .await?;
        let Some(user) = user else {
            return Ok(None);
        };
        if self.hasher.verify_on_pool(password, &user.hashed_password).await {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub async fn list(&mut self, page: Page) -> Result<UsersPublic, AppError> {
        let count = self.session.count_users().await?;
        let users = self.session.select_users(page).await?;
        Ok(UsersPublic {
            data: users.into_iter().map(UserPublic::from).collect(),
            count,
        })
    }

    pub async fn get_by_id(&mut self, id: Uuid) -> Result<User, AppError> {
        self.session
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".into()))
    }

    pub async fn create(&mut self, data: UserCreate) -> Result<User, AppError> {
        let email = normalize_email(&data.email);
        self.ensure_email_free(&email, None).await?;

        if data.password.is_empty() {
            return Err(AppError::BadRequest("Password is required.".into()));
        }

        let hashed_password = self.hasher.hash_on_pool(&data.password).await?;
        let user = self
            .session
            .insert_user(&User::new(email, hashed_password, &data))
            .await?;
        self.session.commit().await?;

        log::info!("created user {} (superuser: {})", user.id, user.is_superuser);
        Ok(user)
    }

    /// Public signup. Refuses a taken email with a 400 before delegating to `create`.
    pub async fn register(&mut self, data: UserRegister) -> Result<User, AppError> {
        let email = normalize_email(&data.email);
        if self.session.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::BadRequest(
                "The user with this email already exists in the system".into(),
            ));
        }
        self.create(data.into()).await
    }

    pub async fn update_by_id(&mut self, id: Uuid, patch: UserUpdate) -> Result<User, AppError> {
        let user = self.get_by_id(id).await?;
        self.apply_patch(user, patch).await
    }

    pub async fn update_self(&mut self, user: &User, patch: UserUpdateMe) -> Result<User, AppError> {
        let user = self.get_by_id(user.id).await?;
        self.apply_patch(user, patch.into()).await
    }

    pub async fn change_own_password(
        &mut self,
        user: &User,
        body: UpdatePassword,
    ) -> Result<Message, AppError> {
        let mut user = self.get_by_id(user.id).await?;

        if !self
            .hasher
            .verify_on_pool(&body.current_password, &user.hashed_password)
            .await
        {
            return Err(AppError::BadRequest("Incorrect password".into()));
        }
        if body.new_password == body.current_password {
            return Err(AppError::BadRequest(
                "New password cannot be the same as the current one".into(),
            ));
        }

        user.hashed_password = self.hasher.hash_on_pool(&body.new_password).await?;
        self.session.update_user(&user).await?;
        self.session.commit().await?;

        Ok(Message::new("Password updated successfully"))
    }

    pub async fn delete_self(&mut self, user: &User) -> Result<Message, AppError> {
        if user.role() == Role::Admin {
            return Err(AppError::Forbidden(
                "Super users are not allowed to delete themselves".into(),
            ));
        }
        self.remove(user.id).await
    }

    /// Admin path. Unlike `delete_self` it does not protect superusers.
    pub async fn delete_by_id(&mut self, id: Uuid) -> Result<Message, AppError> {
        let user = self.get_by_id(id).await?;
        self.remove(user.id).await
    }

    /// Creates a superuser with these credentials unless the email is already
    /// registered. An existing account is returned untouched.
    pub async fn ensure_superuser(&mut self, email: &str, password: &str) -> Result<User, AppError> {
        let data = UserCreate {
            email: email.to_string(),
            password: password.to_string(),
            is_active: true,
            is_superuser: true,
            full_name: None,
        };
        data.validate()?;

        if let Some(existing) = self.session.find_user_by_email(&normalize_email(email)).await? {
            return Ok(existing);
        }
        self.create(data).await
    }

    async fn remove(&mut self, id: Uuid) -> Result<Message, AppError> {
        self.session.delete_user(id).await?;
        self.session.commit().await?;
        log::info!("deleted user {} and the tasks it owned", id);
        Ok(Message::new("User deleted successfully"))
    }

    async fn apply_patch(&mut self, mut user: User, patch: UserUpdate) -> Result<User, AppError> {
        if let Some(email) = patch.email {
            let email = normalize_email(&email);
            if email != user.email {
                self.ensure_email_free(&email, Some(user.id)).await?;
                user.email = email;
            }
        }
        if let Some(password) = patch.password {
            if password.is_empty() {
                return Err(AppError::BadRequest("Password is required.".into()));
            }
            user.hashed_password = self.hasher.hash_on_pool(&password).await?;
        }
        if let Some(is_active) = patch.is_active {
            user.is_active = is_active;
        }
        if let Some(is_superuser) = patch.is_superuser {
            user.is_superuser = is_superuser;
        }
        if let Some(full_name) = patch.full_name {
            user.full_name = full_name;
        }

        let user = self.session.update_user(&user).await?;
        self.session.commit().await?;
        Ok(user)
    }

    async fn ensure_email_free(&mut self, email: &str, owner: Option<Uuid>) -> Result<(), AppError> {
        match self.session.find_user_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(AppError::email_taken())
            }
            _ => Ok(()),
        }
    }
}
