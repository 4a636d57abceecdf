//! Database operations for administrator accounts.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::administrateur::{self, ActiveModel, Entity as Administrateur};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Insert a new administrator with an already hashed password.
    pub async fn insert_administrateur(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        nom: Option<&str>,
    ) -> AppResult<administrateur::Model> {
        if self.find_administrateur_by_username(username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "L'identifiant {} est déjà utilisé",
                username
            )));
        }

        let model = ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            nom: Set(nom.map(str::to_string)),
            actif: Set(true),
            last_login_at: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert administrator: {}", e)))
    }

    pub async fn find_administrateur_by_username(
        &self,
        username: &str,
    ) -> AppResult<Option<administrateur::Model>> {
        Administrateur::find()
            .filter(administrateur::Column::Username.eq(username))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get administrator: {}", e)))
    }

    pub async fn get_administrateur(&self, id: i32) -> AppResult<Option<administrateur::Model>> {
        Administrateur::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get administrator: {}", e)))
    }

    pub async fn list_administrateurs(&self) -> AppResult<Vec<administrateur::Model>> {
        Administrateur::find()
            .order_by_asc(administrateur::Column::Username)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list administrators: {}", e)))
    }

    /// Email addresses of active administrators.
    pub async fn active_admin_emails(&self) -> AppResult<Vec<String>> {
        let admins = Administrateur::find()
            .filter(administrateur::Column::Actif.eq(true))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list administrators: {}", e)))?;
        Ok(admins
            .into_iter()
            .map(|a| a.email)
            .filter(|e| !e.trim().is_empty())
            .collect())
    }

    pub async fn touch_last_login(&self, id: i32) -> AppResult<()> {
        let model = ActiveModel {
            id: Set(id),
            last_login_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        model
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update last login: {}", e)))?;
        Ok(())
    }

    pub async fn set_administrateur_actif(&self, username: &str, actif: bool) -> AppResult<bool> {
        let Some(existing) = self.find_administrateur_by_username(username).await? else {
            return Ok(false);
        };
        let mut active: ActiveModel = existing.into();
        active.actif = Set(actif);
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update administrator: {}", e)))?;
        Ok(true)
    }

    pub async fn set_administrateur_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> AppResult<bool> {
        let Some(existing) = self.find_administrateur_by_username(username).await? else {
            return Ok(false);
        };
        let mut active: ActiveModel = existing.into();
        active.password_hash = Set(password_hash.to_string());
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update administrator: {}", e)))?;
        Ok(true)
    }
}
