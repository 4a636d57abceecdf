//! Database operations for the inventory catalog and checklists.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entity::etat_lieux::EtatLieuxStatut;
use crate::entity::inventaire::{self, Entity as Inventaire};
use crate::entity::inventaire_categorie::{self, Entity as Categorie};
use crate::entity::inventaire_equipement::{self, Entity as Equipement};
use crate::entity::inventaire_sous_categorie::{self, Entity as SousCategorie};
use crate::error::{AppError, AppResult};
use crate::models::{
    CategorieInput, CategorieView, CreateInventaireRequest, CreateSousCategorieRequest,
    DefaultEquipement, DeleteCategorieOutcome, EquipementInput, EtatEquipement, InventaireRow,
    UpdateInventaireRequest, UpdateSousCategorieRequest, non_blank,
};

use super::{DbPool, generate_reference, ordering};

impl DbPool {
    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    pub async fn list_categories(&self) -> AppResult<Vec<inventaire_categorie::Model>> {
        Categorie::find()
            .order_by_asc(inventaire_categorie::Column::Ordre)
            .order_by_asc(inventaire_categorie::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list categories: {}", e)))
    }

    /// Categories with their subcategories and active equipment counts.
    pub async fn list_categories_with_details(&self) -> AppResult<Vec<CategorieView>> {
        let categories = self.list_categories().await?;
        let sous_categories = SousCategorie::find()
            .order_by_asc(inventaire_sous_categorie::Column::Ordre)
            .order_by_asc(inventaire_sous_categorie::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list subcategories: {}", e)))?;

        let mut views = Vec::with_capacity(categories.len());
        for categorie in categories {
            let nb_equipements = self.count_category_equipements(categorie.id).await?;
            let sous: Vec<_> = sous_categories
                .iter()
                .filter(|s| s.categorie_id == categorie.id)
                .cloned()
                .collect();
            views.push(CategorieView {
                categorie,
                sous_categories: sous,
                nb_equipements,
            });
        }
        Ok(views)
    }

    pub async fn require_categorie(&self, id: i32) -> AppResult<inventaire_categorie::Model> {
        Categorie::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get category: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Catégorie {}", id)))
    }

    pub async fn insert_categorie(
        &self,
        input: &CategorieInput,
    ) -> AppResult<inventaire_categorie::Model> {
        input.validate()?;
        let ordre = Categorie::find()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count categories: {}", e)))?;

        inventaire_categorie::ActiveModel {
            nom: Set(input.nom.trim().to_string()),
            icone: Set(non_blank(&input.icone)),
            ordre: Set(ordre as i32),
            actif: Set(input.actif.unwrap_or(true)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert category: {}", e)))
    }

    pub async fn update_categorie(
        &self,
        id: i32,
        input: &CategorieInput,
    ) -> AppResult<inventaire_categorie::Model> {
        input.validate()?;
        let existing = self.require_categorie(id).await?;
        let actif = input.actif.unwrap_or(existing.actif);

        let mut active: inventaire_categorie::ActiveModel = existing.into();
        active.nom = Set(input.nom.trim().to_string());
        active.icone = Set(non_blank(&input.icone));
        active.actif = Set(actif);
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update category: {}", e)))
    }

    pub async fn reorder_categories(&self, ids: &[i32]) -> AppResult<()> {
        let positions = ordering(ids)?;
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;
        for (id, ordre) in positions {
            Categorie::update_many()
                .filter(inventaire_categorie::Column::Id.eq(id))
                .col_expr(inventaire_categorie::Column::Ordre, Expr::value(ordre))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to reorder categories: {}", e)))?;
        }
        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit reorder: {}", e)))
    }

    async fn count_category_equipements(&self, categorie_id: i32) -> AppResult<u64> {
        Equipement::find()
            .filter(inventaire_equipement::Column::CategorieId.eq(categorie_id))
            .filter(inventaire_equipement::Column::DeletedAt.is_null())
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count equipment: {}", e)))
    }

    /// Delete a category. A category that still holds subcategories or
    /// equipment is only deleted when `confirmed`; the delete then removes
    /// the subcategories and equipment with it.
    pub async fn delete_categorie(
        &self,
        id: i32,
        confirmed: bool,
    ) -> AppResult<DeleteCategorieOutcome> {
        self.require_categorie(id).await?;

        let nb_equipements = self.count_category_equipements(id).await?;
        let nb_sous_categories = SousCategorie::find()
            .filter(inventaire_sous_categorie::Column::CategorieId.eq(id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count subcategories: {}", e)))?;

        if (nb_equipements > 0 || nb_sous_categories > 0) && !confirmed {
            return Ok(DeleteCategorieOutcome {
                deleted: false,
                needs_confirmation: true,
                nb_sous_categories,
                nb_equipements,
            });
        }

        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;
        Equipement::delete_many()
            .filter(inventaire_equipement::Column::CategorieId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete equipment: {}", e)))?;
        SousCategorie::delete_many()
            .filter(inventaire_sous_categorie::Column::CategorieId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete subcategories: {}", e)))?;
        Categorie::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete category: {}", e)))?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit delete: {}", e)))?;

        Ok(DeleteCategorieOutcome {
            deleted: true,
            needs_confirmation: false,
            nb_sous_categories,
            nb_equipements,
        })
    }

    // ------------------------------------------------------------------
    // Subcategories
    // ------------------------------------------------------------------

    pub async fn insert_sous_categorie(
        &self,
        request: &CreateSousCategorieRequest,
    ) -> AppResult<inventaire_sous_categorie::Model> {
        if request.nom.trim().is_empty() {
            return Err(AppError::InvalidInput("Le nom est obligatoire".into()));
        }
        self.require_categorie(request.categorie_id).await?;
        let ordre = SousCategorie::find()
            .filter(inventaire_sous_categorie::Column::CategorieId.eq(request.categorie_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count subcategories: {}", e)))?;

        inventaire_sous_categorie::ActiveModel {
            categorie_id: Set(request.categorie_id),
            nom: Set(request.nom.trim().to_string()),
            ordre: Set(ordre as i32),
            actif: Set(true),
            ..Default::default()
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert subcategory: {}", e)))
    }

    async fn require_sous_categorie(&self, id: i32) -> AppResult<inventaire_sous_categorie::Model> {
        SousCategorie::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get subcategory: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Sous-catégorie {}", id)))
    }

    pub async fn update_sous_categorie(
        &self,
        id: i32,
        request: &UpdateSousCategorieRequest,
    ) -> AppResult<inventaire_sous_categorie::Model> {
        if request.nom.trim().is_empty() {
            return Err(AppError::InvalidInput("Le nom est obligatoire".into()));
        }
        let existing = self.require_sous_categorie(id).await?;
        let actif = request.actif.unwrap_or(existing.actif);
        let mut active: inventaire_sous_categorie::ActiveModel = existing.into();
        active.nom = Set(request.nom.trim().to_string());
        active.actif = Set(actif);
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update subcategory: {}", e)))
    }

    /// Delete a subcategory; its equipment stays in the parent category.
    pub async fn delete_sous_categorie(&self, id: i32) -> AppResult<()> {
        self.require_sous_categorie(id).await?;
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;
        Equipement::update_many()
            .filter(inventaire_equipement::Column::SousCategorieId.eq(id))
            .col_expr(
                inventaire_equipement::Column::SousCategorieId,
                Expr::value(Option::<i32>::None),
            )
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to detach equipment: {}", e)))?;
        SousCategorie::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete subcategory: {}", e)))?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit delete: {}", e)))
    }

    pub async fn reorder_sous_categories(&self, categorie_id: i32, ids: &[i32]) -> AppResult<()> {
        let positions = ordering(ids)?;
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;
        for (id, ordre) in positions {
            SousCategorie::update_many()
                .filter(inventaire_sous_categorie::Column::Id.eq(id))
                .filter(inventaire_sous_categorie::Column::CategorieId.eq(categorie_id))
                .col_expr(inventaire_sous_categorie::Column::Ordre, Expr::value(ordre))
                .exec(&txn)
                .await
                .map_err(|e| {
                    AppError::Database(format!("Failed to reorder subcategories: {}", e))
                })?;
        }
        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit reorder: {}", e)))
    }

    // ------------------------------------------------------------------
    // Equipment
    // ------------------------------------------------------------------

    /// Active equipment of a logement in display order.
    pub async fn list_equipements(
        &self,
        logement_id: i32,
    ) -> AppResult<Vec<inventaire_equipement::Model>> {
        Equipement::find()
            .filter(inventaire_equipement::Column::LogementId.eq(logement_id))
            .filter(inventaire_equipement::Column::DeletedAt.is_null())
            .order_by_asc(inventaire_equipement::Column::Ordre)
            .order_by_asc(inventaire_equipement::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list equipment: {}", e)))
    }

    /// Count of every equipment row ever created for a logement, soft-deleted
    /// ones included.
    pub async fn count_equipements_including_deleted(&self, logement_id: i32) -> AppResult<u64> {
        Equipement::find()
            .filter(inventaire_equipement::Column::LogementId.eq(logement_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count equipment: {}", e)))
    }

    /// Create the default equipment list for a logement. Category names are
    /// matched case-insensitively; unknown names leave the item uncategorized.
    pub async fn populate_default_equipements(
        &self,
        logement_id: i32,
        defaults: &[DefaultEquipement],
    ) -> AppResult<u64> {
        let categories: HashMap<String, i32> = self
            .list_categories()
            .await?
            .into_iter()
            .map(|c| (c.nom.to_lowercase(), c.id))
            .collect();

        let now = Utc::now();
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;
        for (ordre, item) in defaults.iter().enumerate() {
            inventaire_equipement::ActiveModel {
                logement_id: Set(logement_id),
                categorie_id: Set(categories.get(&item.categorie.to_lowercase()).copied()),
                sous_categorie_id: Set(None),
                nom: Set(item.nom.clone()),
                description: Set(None),
                quantite: Set(item.quantite.max(0)),
                valeur_estimee: Set(None),
                ordre: Set(ordre as i32),
                deleted_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert equipment: {}", e)))?;
        }
        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit equipment: {}", e)))?;

        Ok(defaults.len() as u64)
    }

    async fn check_equipement_links(&self, input: &EquipementInput) -> AppResult<()> {
        if let Some(categorie_id) = input.categorie_id {
            self.require_categorie(categorie_id).await?;
        }
        if let Some(sous_categorie_id) = input.sous_categorie_id {
            let sous = self.require_sous_categorie(sous_categorie_id).await?;
            if input.categorie_id.is_some_and(|c| c != sous.categorie_id) {
                return Err(AppError::InvalidInput(
                    "La sous-catégorie n'appartient pas à la catégorie choisie".into(),
                ));
            }
        }
        Ok(())
    }

    pub async fn insert_equipement(
        &self,
        logement_id: i32,
        input: &EquipementInput,
    ) -> AppResult<inventaire_equipement::Model> {
        input.validate()?;
        self.require_logement(logement_id).await?;
        self.check_equipement_links(input).await?;
        let ordre = self.count_equipements_including_deleted(logement_id).await?;
        let now = Utc::now();

        inventaire_equipement::ActiveModel {
            logement_id: Set(logement_id),
            categorie_id: Set(input.categorie_id),
            sous_categorie_id: Set(input.sous_categorie_id),
            nom: Set(input.nom.trim().to_string()),
            description: Set(non_blank(&input.description)),
            quantite: Set(input.quantite.unwrap_or(1)),
            valeur_estimee: Set(input.valeur_estimee),
            ordre: Set(ordre as i32),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert equipment: {}", e)))
    }

    async fn require_equipement(&self, id: i32) -> AppResult<inventaire_equipement::Model> {
        Equipement::find_by_id(id)
            .filter(inventaire_equipement::Column::DeletedAt.is_null())
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get equipment: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Équipement {}", id)))
    }

    pub async fn update_equipement(
        &self,
        id: i32,
        input: &EquipementInput,
    ) -> AppResult<inventaire_equipement::Model> {
        input.validate()?;
        self.check_equipement_links(input).await?;
        let existing = self.require_equipement(id).await?;
        let quantite = input.quantite.unwrap_or(existing.quantite);

        let mut active: inventaire_equipement::ActiveModel = existing.into();
        active.categorie_id = Set(input.categorie_id);
        active.sous_categorie_id = Set(input.sous_categorie_id);
        active.nom = Set(input.nom.trim().to_string());
        active.description = Set(non_blank(&input.description));
        active.quantite = Set(quantite);
        active.valeur_estimee = Set(input.valeur_estimee);
        active.updated_at = Set(Utc::now());
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update equipment: {}", e)))
    }

    pub async fn reorder_equipements(&self, logement_id: i32, ids: &[i32]) -> AppResult<()> {
        let positions = ordering(ids)?;
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;
        for (id, ordre) in positions {
            Equipement::update_many()
                .filter(inventaire_equipement::Column::Id.eq(id))
                .filter(inventaire_equipement::Column::LogementId.eq(logement_id))
                .col_expr(inventaire_equipement::Column::Ordre, Expr::value(ordre))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to reorder equipment: {}", e)))?;
        }
        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit reorder: {}", e)))
    }

    /// Soft delete: the row keeps existing with `deleted_at` set.
    pub async fn soft_delete_equipement(&self, id: i32) -> AppResult<()> {
        let existing = self.require_equipement(id).await?;
        let now = Utc::now();
        let mut active: inventaire_equipement::ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete equipment: {}", e)))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Checklists
    // ------------------------------------------------------------------

    /// Snapshot the current equipment list into a new checklist.
    pub async fn insert_inventaire(
        &self,
        request: &CreateInventaireRequest,
    ) -> AppResult<inventaire::Model> {
        self.require_logement(request.logement_id).await?;
        if let Some(contrat_id) = request.contrat_id {
            let contrat = self.require_contrat(contrat_id).await?;
            if contrat.logement_id != request.logement_id {
                return Err(AppError::InvalidInput(
                    "Le contrat ne porte pas sur ce logement".into(),
                ));
            }
        }

        let categories: HashMap<i32, String> = self
            .list_categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c.nom))
            .collect();
        let rows: Vec<InventaireRow> = self
            .list_equipements(request.logement_id)
            .await?
            .into_iter()
            .map(|e| InventaireRow {
                equipement_id: Some(e.id),
                nom: e.nom,
                categorie: e.categorie_id.and_then(|id| categories.get(&id).cloned()),
                quantite_attendue: e.quantite,
                quantite_presente: e.quantite,
                etat: EtatEquipement::default(),
                commentaire: String::new(),
            })
            .collect();
        let data = serde_json::to_string(&rows)
            .map_err(|e| AppError::Database(format!("Failed to encode inventaire: {}", e)))?;

        let now = Utc::now();
        inventaire::ActiveModel {
            logement_id: Set(request.logement_id),
            contrat_id: Set(request.contrat_id),
            type_inventaire: Set(request.type_inventaire),
            reference_unique: Set(generate_reference("INV")),
            date_inventaire: Set(request.date_inventaire.unwrap_or_else(|| now.date_naive())),
            equipements_data: Set(data),
            observations_generales: Set(None),
            statut: Set(EtatLieuxStatut::Brouillon),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert inventaire: {}", e)))
    }

    pub async fn list_inventaires(&self, logement_id: i32) -> AppResult<Vec<inventaire::Model>> {
        Inventaire::find()
            .filter(inventaire::Column::LogementId.eq(logement_id))
            .order_by_desc(inventaire::Column::CreatedAt)
            .order_by_desc(inventaire::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list inventaires: {}", e)))
    }

    pub async fn require_inventaire(&self, id: i32) -> AppResult<inventaire::Model> {
        Inventaire::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get inventaire: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Inventaire {}", id)))
    }

    pub async fn update_inventaire(
        &self,
        id: i32,
        request: &UpdateInventaireRequest,
    ) -> AppResult<inventaire::Model> {
        request.validate()?;
        let existing = self.require_inventaire(id).await?;
        if existing.statut == EtatLieuxStatut::Finalise {
            return Err(AppError::Conflict(
                "Cet inventaire est finalisé et ne peut plus être modifié".into(),
            ));
        }
        let data = serde_json::to_string(&request.rows)
            .map_err(|e| AppError::Database(format!("Failed to encode inventaire: {}", e)))?;

        let mut active: inventaire::ActiveModel = existing.into();
        active.equipements_data = Set(data);
        active.observations_generales = Set(non_blank(&request.observations_generales));
        active.updated_at = Set(Utc::now());
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update inventaire: {}", e)))
    }

    pub async fn finalize_inventaire(&self, id: i32) -> AppResult<inventaire::Model> {
        let existing = self.require_inventaire(id).await?;
        if existing.statut == EtatLieuxStatut::Finalise {
            return Err(AppError::Conflict("Cet inventaire est déjà finalisé".into()));
        }
        let mut active: inventaire::ActiveModel = existing.into();
        active.statut = Set(EtatLieuxStatut::Finalise);
        active.updated_at = Set(Utc::now());
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to finalize inventaire: {}", e)))
    }
}
