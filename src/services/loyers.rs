//! Rent reminders: the per-tenant reminder on an unpaid month and the
//! monthly summary sent to administrators (shared with `rappel-loyers`).

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use super::documents::format_euros;
use super::mailer::EmailService;
use super::notify::{self, Outcome};
use super::template::{self, escape_html};
use crate::config::Config;
use crate::db::DbPool;
use crate::db::cron_jobs::{RAPPEL_LOYERS_JOB, RunStatus};
use crate::entity::logement;
use crate::entity::loyer_tracking::{self, StatutPaiement};
use crate::error::{AppError, AppResult};
use crate::models::{NoticeLevel, periode_libelle, validate_periode};

/// Summary of one administrator broadcast.
#[derive(Debug, Clone, Serialize)]
pub struct RappelReport {
    pub periode: String,
    pub nb_payes: usize,
    pub nb_attente: usize,
    pub nb_impayes: usize,
    pub destinataires: usize,
    pub envoyes: usize,
}

#[derive(Debug, Clone)]
pub struct LoyerService {
    db: DbPool,
    email: EmailService,
    admin_email: String,
}

impl LoyerService {
    pub fn new(config: &Config, db: DbPool, email: EmailService) -> Self {
        Self {
            db,
            email,
            admin_email: config.admin_email.clone(),
        }
    }

    /// Email every tenant of the active lease about an unpaid month, then
    /// count the reminder.
    pub async fn remind_tenant(
        &self,
        logement_id: i32,
        mois: i32,
        annee: i32,
    ) -> AppResult<Outcome<loyer_tracking::Model>> {
        validate_periode(mois, annee)?;
        let loyer = self
            .db
            .get_loyer(logement_id, mois, annee)
            .await?
            .filter(|l| l.statut_paiement == StatutPaiement::Impaye)
            .ok_or_else(|| {
                AppError::InvalidInput("Un rappel ne concerne qu'un loyer impayé".into())
            })?;
        let logement = self.db.require_logement(logement_id).await?;
        let contrat = self
            .db
            .active_contrat_for_logement(logement_id)
            .await?
            .ok_or_else(|| {
                AppError::InvalidInput("Aucun contrat actif pour ce logement".into())
            })?;
        let locataires: Vec<_> = self
            .db
            .list_locataires(contrat.id)
            .await?
            .into_iter()
            .filter(|l| l.email.as_deref().is_some_and(|e| !e.trim().is_empty()))
            .collect();
        if locataires.is_empty() {
            return Err(AppError::InvalidInput(
                "Aucun locataire de ce contrat n'a d'adresse email".into(),
            ));
        }

        let societe = self
            .db
            .get_parametre_string("societe_nom")
            .await?
            .unwrap_or_default();
        let base = template::vars([
            ("periode", periode_libelle(mois, annee)),
            ("montant", format_euros(loyer.montant_attendu)),
            ("adresse", logement.adresse.clone()),
            ("societe", societe),
        ]);

        let mut outcome = Outcome::new(loyer);
        let mut delivered = 0;
        for locataire in &locataires {
            let to = locataire.email.as_deref().unwrap_or_default();
            let mut vars = base.clone();
            vars.insert("prenom".into(), locataire.prenom.clone());
            vars.insert("nom".into(), locataire.nom.clone());
            if notify::deliver(&self.email, &mut outcome, "rappel_loyer_impaye", to, &vars).await {
                delivered += 1;
            }
        }
        if delivered == 0 {
            return Err(AppError::Email("Aucun rappel n'a pu être envoyé".into()));
        }

        outcome.value = self.db.record_loyer_rappel(logement_id, mois, annee).await?;
        info!(logement = %logement.reference, mois, annee, delivered, "Rent reminder sent");
        outcome.push(
            NoticeLevel::Success,
            format!("Rappel envoyé à {} locataire(s)", delivered),
        );
        Ok(outcome)
    }

    /// Send the month summary for `today` to the administrators and record
    /// the run on the `rappel_loyers` job.
    pub async fn broadcast(&self, today: NaiveDate) -> AppResult<Outcome<RappelReport>> {
        let (mois, annee) = (today.month() as i32, today.year());
        let statuts = self.db.loyer_statuts_for_period(mois, annee).await?;
        let count = |s: StatutPaiement| statuts.iter().filter(|(_, st)| *st == s).count();

        let mut report = RappelReport {
            periode: periode_libelle(mois, annee),
            nb_payes: count(StatutPaiement::Paye),
            nb_attente: count(StatutPaiement::Attente),
            nb_impayes: count(StatutPaiement::Impaye),
            destinataires: 0,
            envoyes: 0,
        };

        let recipients = self.recipients().await?;
        report.destinataires = recipients.len();
        if recipients.is_empty() {
            warn!("No administrator address for the rent summary");
            self.db
                .record_cron_run(RAPPEL_LOYERS_JOB, RunStatus::Error, "Aucun destinataire")
                .await?;
            return Err(AppError::InvalidInput(
                "Aucune adresse administrateur pour le récapitulatif".into(),
            ));
        }

        let vars = template::vars([
            ("periode", report.periode.clone()),
            ("tableau_html", summary_table(&statuts)),
            ("nb_payes", report.nb_payes.to_string()),
            ("nb_attente", report.nb_attente.to_string()),
            ("nb_impayes", report.nb_impayes.to_string()),
        ]);

        let mut outcome = Outcome::new(report);
        for to in &recipients {
            if notify::deliver(&self.email, &mut outcome, "rappel_loyers_admin", to, &vars).await {
                outcome.value.envoyes += 1;
            }
        }

        let log = format!(
            "{}: {} payé(s), {} en attente, {} impayé(s); {}/{} email(s) envoyé(s)",
            outcome.value.periode,
            outcome.value.nb_payes,
            outcome.value.nb_attente,
            outcome.value.nb_impayes,
            outcome.value.envoyes,
            outcome.value.destinataires
        );
        let status = if outcome.value.envoyes > 0 {
            RunStatus::Success
        } else {
            RunStatus::Error
        };
        self.db
            .record_cron_run(RAPPEL_LOYERS_JOB, status, &log)
            .await?;
        info!("Rent summary: {}", log);

        if outcome.value.envoyes > 0 {
            outcome.push(NoticeLevel::Success, "Récapitulatif envoyé aux administrateurs");
        }
        Ok(outcome)
    }

    async fn recipients(&self) -> AppResult<Vec<String>> {
        let mut recipients = self.db.active_admin_emails().await?;
        if let Some(address) = notify::admin_address(&self.db, &self.admin_email).await? {
            recipients.push(address);
        }
        let mut seen = std::collections::HashSet::new();
        recipients.retain(|r| seen.insert(r.trim().to_lowercase()));
        Ok(recipients)
    }
}

/// One row per rented logement with its status for the month.
pub fn summary_table(statuts: &[(logement::Model, StatutPaiement)]) -> String {
    let mut html = String::from(
        "<table border=\"1\" cellpadding=\"4\" cellspacing=\"0\"><thead><tr>\
         <th>Logement</th><th>Adresse</th><th>Montant</th><th>Statut</th>\
         </tr></thead><tbody>",
    );
    for (logement, statut) in statuts {
        let libelle = match statut {
            StatutPaiement::Paye => "Payé",
            StatutPaiement::Attente => "En attente",
            StatutPaiement::Impaye => "Impayé",
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&logement.reference),
            escape_html(&logement.adresse),
            format_euros(logement.loyer + logement.charges),
            libelle
        ));
    }
    html.push_str("</tbody></table>");
    html
}
