//! Typed key/value parameter store.

use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::de::DeserializeOwned;

use crate::entity::parametre::{self, Entity as Parametre};
use crate::error::{AppError, AppResult};
use crate::models::{ParamType, ParametreGroup, parse_bool};

use super::DbPool;

impl DbPool {
    pub async fn get_parametre(&self, cle: &str) -> AppResult<Option<parametre::Model>> {
        Parametre::find()
            .filter(parametre::Column::Cle.eq(cle))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get parameter: {}", e)))
    }

    /// Raw value; blank values read as absent.
    pub async fn get_parametre_string(&self, cle: &str) -> AppResult<Option<String>> {
        Ok(self
            .get_parametre(cle)
            .await?
            .and_then(|p| p.valeur)
            .filter(|v| !v.trim().is_empty()))
    }

    pub async fn get_parametre_i64(&self, cle: &str, default: i64) -> AppResult<i64> {
        Ok(self
            .get_parametre_string(cle)
            .await?
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default))
    }

    pub async fn get_parametre_bool(&self, cle: &str, default: bool) -> AppResult<bool> {
        Ok(self
            .get_parametre_string(cle)
            .await?
            .and_then(|v| parse_bool(v.trim()))
            .unwrap_or(default))
    }

    /// JSON value decoded into `T`; undecodable values fall back to `None`
    /// with a warning.
    pub async fn get_parametre_json<T: DeserializeOwned>(&self, cle: &str) -> AppResult<Option<T>> {
        let Some(raw) = self.get_parametre_string(cle).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("Parameter {} holds invalid JSON: {}", cle, e);
                Ok(None)
            }
        }
    }

    /// Insert or update a parameter. An existing row keeps its declared
    /// type; `valeur` is validated against it and stored normalized.
    pub async fn set_parametre(
        &self,
        cle: &str,
        valeur: Option<&str>,
        type_hint: ParamType,
    ) -> AppResult<parametre::Model> {
        if cle.trim().is_empty() {
            return Err(AppError::InvalidInput("Clé de paramètre vide".into()));
        }
        let existing = self.get_parametre(cle).await?;
        let param_type = existing
            .as_ref()
            .and_then(|p| ParamType::parse(&p.type_valeur))
            .unwrap_or(type_hint);
        let normalized = match valeur {
            Some(v) if !(v.trim().is_empty() && param_type != ParamType::String) => {
                Some(param_type.normalize(v)?)
            }
            _ => None,
        };

        let now = Utc::now();
        match existing {
            Some(model) => {
                let mut active: parametre::ActiveModel = model.into();
                active.valeur = Set(normalized);
                active.updated_at = Set(now);
                active.update(self.connection()).await
            }
            None => {
                parametre::ActiveModel {
                    cle: Set(cle.to_string()),
                    valeur: Set(normalized),
                    type_valeur: Set(param_type.as_str().to_string()),
                    groupe: Set("general".to_string()),
                    description: Set(None),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(self.connection())
                .await
            }
        }
        .map_err(|e| AppError::Database(format!("Failed to save parameter: {}", e)))
    }

    /// Update an existing parameter only.
    pub async fn update_parametre(
        &self,
        cle: &str,
        valeur: Option<&str>,
    ) -> AppResult<parametre::Model> {
        let existing = self
            .get_parametre(cle)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Paramètre {}", cle)))?;
        let param_type = ParamType::parse(&existing.type_valeur).unwrap_or(ParamType::String);
        self.set_parametre(cle, valeur, param_type).await
    }

    pub async fn list_parametres_grouped(&self) -> AppResult<Vec<ParametreGroup>> {
        let rows = Parametre::find()
            .order_by_asc(parametre::Column::Groupe)
            .order_by_asc(parametre::Column::Cle)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list parameters: {}", e)))?;

        let mut groups: BTreeMap<String, Vec<parametre::Model>> = BTreeMap::new();
        for row in rows {
            groups.entry(row.groupe.clone()).or_default().push(row);
        }
        Ok(groups
            .into_iter()
            .map(|(groupe, parametres)| ParametreGroup { groupe, parametres })
            .collect())
    }
}

