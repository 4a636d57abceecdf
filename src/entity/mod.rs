//! SeaORM entity definitions.

pub mod admin_session;
pub mod administrateur;
pub mod candidature;
pub mod candidature_document;
pub mod contrat;
pub mod cron_job;
pub mod email_template;
pub mod etat_lieux;
pub mod etat_lieux_locataire;
pub mod etat_lieux_photo;
pub mod inventaire;
pub mod inventaire_categorie;
pub mod inventaire_equipement;
pub mod inventaire_sous_categorie;
pub mod locataire;
pub mod log;
pub mod logement;
pub mod loyer_tracking;
pub mod parametre;
pub mod sauvegarde;
