//! Migration: default parameters, email templates, cron jobs and inventory
//! categories.
//!
//! Seeds go through the entities so timestamps are encoded the same way the
//! application writes them on every backend.

use chrono::Utc;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use sea_orm_migration::prelude::*;

use crate::entity::{cron_job, email_template, inventaire_categorie, inventaire_sous_categorie, parametre};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// `(cle, valeur, type, groupe, description)`
const PARAMETRES: &[(&str, Option<&str>, &str, &str, &str)] = &[
    ("societe_nom", Some("Gestion Locative"), "string", "general", "Nom affiché dans les documents et emails"),
    ("email_admin", None, "string", "email", "Adresse recevant les notifications administrateur"),
    ("contrat_validite_heures", Some("48"), "integer", "contrats", "Durée de validité d'un lien de signature"),
    ("bail_template_html", None, "string", "contrats", "Modèle HTML du bail (variables {{...}})"),
    ("loyer_jour_echeance", Some("5"), "integer", "loyers", "Jour du mois à partir duquel un loyer est en retard"),
    ("rappel_loyers_actif", Some("true"), "boolean", "loyers", "Envoi du récapitulatif mensuel aux administrateurs"),
    ("backup_actif", Some("false"), "boolean", "sauvegardes", "Sauvegarde automatique activée"),
    ("backup_frequence", Some("daily"), "string", "sauvegardes", "daily, weekly ou monthly"),
    ("backup_heure", Some("2"), "integer", "sauvegardes", "Heure d'exécution (0-23)"),
    ("backup_retention_jours", Some("30"), "integer", "sauvegardes", "Durée de conservation des sauvegardes"),
    (
        "inventaire_equipements_defaut",
        Some(
            r#"[{"categorie":"Cuisine","nom":"Réfrigérateur","quantite":1},{"categorie":"Cuisine","nom":"Plaques de cuisson","quantite":1},{"categorie":"Cuisine","nom":"Four micro-ondes","quantite":1},{"categorie":"Cuisine","nom":"Assiettes","quantite":4},{"categorie":"Cuisine","nom":"Couverts (set)","quantite":4},{"categorie":"Chambre / Séjour","nom":"Lit","quantite":1},{"categorie":"Chambre / Séjour","nom":"Table","quantite":1},{"categorie":"Chambre / Séjour","nom":"Chaises","quantite":2},{"categorie":"Salle d'eau","nom":"Miroir","quantite":1}]"#,
        ),
        "json",
        "inventaire",
        "Équipements créés à la première ouverture d'un inventaire vide",
    ),
];

/// `(identifiant, nom, sujet, corps_html)`
const EMAIL_TEMPLATES: &[(&str, &str, &str, &str)] = &[
    (
        "contrat_valide_client",
        "Contrat validé (locataire)",
        "Votre bail {{reference}} est validé",
        "<p>Bonjour {{prenom}} {{nom}},</p><p>Votre contrat de location <strong>{{reference}}</strong> pour le logement situé {{adresse}} a été validé.</p><p>Date de prise d'effet : {{date_prise_effet}}</p><p>Cordialement,<br>{{societe}}</p>",
    ),
    (
        "contrat_valide_admin",
        "Contrat validé (administrateur)",
        "[Admin] Bail {{reference}} validé",
        "<p>Le contrat <strong>{{reference}}</strong> ({{adresse}}) a été validé par {{admin}} le {{date_validation}}.</p><p>Locataires : {{locataires}}</p><p>Notes : {{notes}}</p>",
    ),
    (
        "contrat_annule_client",
        "Contrat annulé (locataire)",
        "Annulation de votre bail {{reference}}",
        "<p>Bonjour {{prenom}} {{nom}},</p><p>Le contrat <strong>{{reference}}</strong> pour le logement situé {{adresse}} a été annulé.</p><p>Motif : {{motif}}</p><p>Cordialement,<br>{{societe}}</p>",
    ),
    (
        "contrat_annule_admin",
        "Contrat annulé (administrateur)",
        "[Admin] Bail {{reference}} annulé",
        "<p>Le contrat <strong>{{reference}}</strong> ({{adresse}}) a été annulé par {{admin}}.</p><p>Motif : {{motif}}</p>",
    ),
    (
        "etat_lieux_finalise",
        "État des lieux finalisé",
        "État des lieux {{type}} - {{adresse}}",
        "<p>Bonjour {{prenom}} {{nom}},</p><p>L'état des lieux {{type}} du logement situé {{adresse}} (référence {{reference}}) a été finalisé le {{date}}.</p><p>Cordialement,<br>{{societe}}</p>",
    ),
    (
        "bilan_logement_envoye",
        "Bilan du logement",
        "Bilan du logement - {{adresse}}",
        "<p>Bonjour {{prenom}} {{nom}},</p><p>Voici le bilan établi lors de l'état des lieux de sortie du logement situé {{adresse}} :</p>{{bilan_html}}<p>{{commentaire}}</p><p>Cordialement,<br>{{societe}}</p>",
    ),
    (
        "rappel_loyer_impaye",
        "Rappel de loyer impayé",
        "Rappel : loyer de {{periode}} impayé",
        "<p>Bonjour {{prenom}} {{nom}},</p><p>Sauf erreur de notre part, le loyer de <strong>{{periode}}</strong> d'un montant de {{montant}} pour le logement situé {{adresse}} n'a pas été reçu.</p><p>Merci de régulariser la situation dans les meilleurs délais.</p><p>Cordialement,<br>{{societe}}</p>",
    ),
    (
        "rappel_loyers_admin",
        "Récapitulatif mensuel des loyers",
        "[Admin] Loyers de {{periode}} : {{nb_impayes}} impayé(s), {{nb_attente}} en attente",
        "<p>Récapitulatif des loyers pour {{periode}} :</p>{{tableau_html}}<p>Payés : {{nb_payes}} / En attente : {{nb_attente}} / Impayés : {{nb_impayes}}</p>",
    ),
];

/// `(nom, commande, description, frequence, cron_expression, actif)`
const CRON_JOBS: &[(&str, &str, &str, &str, &str, bool)] = &[
    (
        "rappel_loyers",
        "rappel-loyers",
        "Récapitulatif des loyers envoyé aux administrateurs",
        "monthly",
        "0 9 1 * *",
        true,
    ),
    (
        "backup",
        "backup-cron",
        "Sauvegarde automatique et nettoyage des anciennes archives",
        "daily",
        "0 2 * * *",
        false,
    ),
];

/// `(nom, icone, sous-catégories)`
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    ("Cuisine", "bi-cup-hot", &["Électroménager", "Vaisselle", "Ustensiles"]),
    ("Chambre / Séjour", "bi-house", &["Mobilier", "Literie", "Luminaires"]),
    ("Salle d'eau", "bi-droplet", &["Sanitaires", "Accessoires"]),
    ("Divers", "bi-box", &[]),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let now = Utc::now();

        parametre::Entity::insert_many(PARAMETRES.iter().map(
            |(cle, valeur, type_valeur, groupe, description)| parametre::ActiveModel {
                cle: Set(String::from(*cle)),
                valeur: Set(valeur.map(String::from)),
                type_valeur: Set(String::from(*type_valeur)),
                groupe: Set(String::from(*groupe)),
                description: Set(Some(String::from(*description))),
                updated_at: Set(now),
                ..Default::default()
            },
        ))
        .exec(db)
        .await?;

        email_template::Entity::insert_many(EMAIL_TEMPLATES.iter().map(
            |(identifiant, nom, sujet, corps_html)| email_template::ActiveModel {
                identifiant: Set(String::from(*identifiant)),
                nom: Set(String::from(*nom)),
                sujet: Set(String::from(*sujet)),
                corps_html: Set(String::from(*corps_html)),
                actif: Set(true),
                updated_at: Set(now),
                ..Default::default()
            },
        ))
        .exec(db)
        .await?;

        cron_job::Entity::insert_many(CRON_JOBS.iter().map(
            |(nom, commande, description, frequence, expression, actif)| cron_job::ActiveModel {
                nom: Set(String::from(*nom)),
                commande: Set(String::from(*commande)),
                description: Set(Some(String::from(*description))),
                frequence: Set(String::from(*frequence)),
                cron_expression: Set(String::from(*expression)),
                actif: Set(*actif),
                created_at: Set(now),
                ..Default::default()
            },
        ))
        .exec(db)
        .await?;

        for (ordre, (nom, icone, sous_categories)) in CATEGORIES.iter().enumerate() {
            let categorie = inventaire_categorie::Entity::insert(inventaire_categorie::ActiveModel {
                nom: Set(String::from(*nom)),
                icone: Set(Some(String::from(*icone))),
                ordre: Set(ordre as i32),
                actif: Set(true),
                created_at: Set(now),
                ..Default::default()
            })
            .exec(db)
            .await?;

            for (sous_ordre, sous_nom) in sous_categories.iter().enumerate() {
                inventaire_sous_categorie::Entity::insert(inventaire_sous_categorie::ActiveModel {
                    categorie_id: Set(categorie.last_insert_id),
                    nom: Set(String::from(*sous_nom)),
                    ordre: Set(sous_ordre as i32),
                    actif: Set(true),
                    ..Default::default()
                })
                .exec(db)
                .await?;
            }
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        inventaire_sous_categorie::Entity::delete_many().exec(db).await?;
        inventaire_categorie::Entity::delete_many().exec(db).await?;
        cron_job::Entity::delete_many()
            .filter(cron_job::Column::Nom.is_in(CRON_JOBS.iter().map(|job| job.0)))
            .exec(db)
            .await?;
        email_template::Entity::delete_many()
            .filter(email_template::Column::Identifiant.is_in(EMAIL_TEMPLATES.iter().map(|t| t.0)))
            .exec(db)
            .await?;
        parametre::Entity::delete_many()
            .filter(parametre::Column::Cle.is_in(PARAMETRES.iter().map(|p| p.0)))
            .exec(db)
            .await?;

        Ok(())
    }
}
