//! Lease document generation.
//!
//! The lease is rendered from the `bail_template_html` parameter (or the
//! built-in template) into a standalone HTML document under
//! `uploads/contrats/`.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use super::{paths, uploads};
use super::template::{self, TemplateVars, escape_html};
use crate::db::DbPool;
use crate::entity::{contrat, locataire, logement};
use crate::error::{AppError, AppResult};

const DEFAULT_BAIL_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="fr">
<head><meta charset="utf-8"><title>Bail {{reference}}</title></head>
<body>
<h1>Contrat de location meublée</h1>
<p>Référence : {{reference}}</p>
<h2>Bailleur</h2>
<p>{{societe}}</p>
<h2>Locataire(s)</h2>
<p>{{locataires}}</p>
<h2>Logement</h2>
<p>{{adresse}} {{appartement}}<br>Type : {{type_logement}}, surface : {{surface}} m²</p>
<h2>Conditions financières</h2>
<p>Loyer : {{loyer}}<br>Charges : {{charges}}<br>Total mensuel : {{loyer_total}}<br>Dépôt de garantie : {{depot_garantie}}</p>
<p>Prise d'effet : {{date_prise_effet}}</p>
<h2>Signatures</h2>
{{signatures_html}}
<p>Signé le {{date_signature}}, validé le {{date_validation}}.</p>
</body>
</html>
"#;

/// "1 234,50 €"
pub fn format_euros(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let (units, cents) = (cents.abs() / 100, cents.abs() % 100);
    let digits = units.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('\u{a0}');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 && (units > 0 || cents > 0) { "-" } else { "" };
    format!("{}{},{:02} €", sign, grouped, cents)
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

pub fn format_datetime(date: Option<DateTime<Utc>>) -> String {
    format_date(date.map(|d| d.date_naive()))
}

/// Full names of the tenants, "Prénom Nom et Prénom Nom".
pub fn locataires_label(locataires: &[locataire::Model]) -> String {
    locataires
        .iter()
        .map(|l| format!("{} {}", l.prenom, l.nom))
        .collect::<Vec<_>>()
        .join(" et ")
}

/// Variables shared by lease documents and lease emails.
pub fn lease_vars(
    contrat: &contrat::Model,
    logement: &logement::Model,
    locataires: &[locataire::Model],
    societe: &str,
) -> TemplateVars {
    template::vars([
        ("reference", contrat.reference_unique.clone()),
        ("adresse", logement.adresse.clone()),
        ("appartement", logement.appartement.clone().unwrap_or_default()),
        ("type_logement", logement.type_logement.clone().unwrap_or_default()),
        (
            "surface",
            logement.surface.map(|s| s.to_string()).unwrap_or_default(),
        ),
        ("loyer", format_euros(logement.loyer)),
        ("charges", format_euros(logement.charges)),
        ("loyer_total", format_euros(logement.loyer + logement.charges)),
        ("depot_garantie", format_euros(logement.depot_garantie)),
        ("date_prise_effet", format_date(contrat.date_prise_effet)),
        ("date_signature", format_datetime(contrat.date_signature)),
        ("date_validation", format_datetime(contrat.date_validation)),
        ("locataires", locataires_label(locataires)),
        ("societe", societe.to_string()),
    ])
}

/// Signature blocks; a stored path is only embedded when it resolves inside
/// the uploads directory.
fn signatures_html(uploads_dir: &Path, locataires: &[locataire::Model]) -> String {
    locataires
        .iter()
        .map(|l| {
            let name = escape_html(&format!("{} {}", l.prenom, l.nom));
            let image = l
                .signature_data
                .as_deref()
                .filter(|p| paths::is_within(uploads_dir, p))
                .map(|p| format!(r#"<img src="/uploads/{}" alt="Signature" height="80">"#, escape_html(p)))
                .unwrap_or_else(|| "<em>Non signé</em>".to_string());
            let mention = l
                .mention_lu_approuve
                .as_deref()
                .map(escape_html)
                .unwrap_or_default();
            format!("<div class=\"signature\"><p>{}</p><p>{}</p>{}</div>", name, mention, image)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render and write the lease of `contrat_id`; records and returns the path
/// relative to the uploads directory.
pub async fn generate_lease(db: &DbPool, uploads_dir: &Path, contrat_id: i32) -> AppResult<String> {
    let contrat = db.require_contrat(contrat_id).await?;
    let logement = db.require_logement(contrat.logement_id).await?;
    let locataires = db.list_locataires(contrat.id).await?;
    let societe = db
        .get_parametre_string("societe_nom")
        .await?
        .unwrap_or_default();
    let template_html = db.get_parametre_string("bail_template_html").await?;

    let mut vars = lease_vars(&contrat, &logement, &locataires, &societe);
    vars.insert(
        "signatures_html".to_string(),
        signatures_html(uploads_dir, &locataires),
    );
    let html = template::render(
        template_html.as_deref().unwrap_or(DEFAULT_BAIL_TEMPLATE),
        &vars,
    );

    let relative = format!(
        "contrats/bail_{}.html",
        uploads::sanitize_filename(&contrat.reference_unique)
    );
    let target = paths::resolve_within(uploads_dir, &relative)?;
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::FileSystem(format!("Failed to create directory: {}", e)))?;
    }
    tokio::fs::write(&target, html)
        .await
        .map_err(|e| AppError::FileSystem(format!("Failed to write lease: {}", e)))?;

    db.set_fichier_bail(contrat.id, &relative).await?;
    info!(contrat = %contrat.reference_unique, "Lease document generated at {}", relative);
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_euros() {
        assert_eq!(format_euros(540.0), "540,00 €");
        assert_eq!(format_euros(1234.5), "1\u{a0}234,50 €");
        assert_eq!(format_euros(0.0), "0,00 €");
        assert_eq!(format_euros(-12.3), "-12,30 €");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1);
        assert_eq!(format_date(date), "01/03/2026");
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn test_signature_outside_uploads_is_not_rendered() {
        let dir = tempfile::tempdir().unwrap();
        let locataire = locataire::Model {
            id: 1,
            contrat_id: 1,
            ordre: 1,
            nom: "Durand".into(),
            prenom: "Léa".into(),
            date_naissance: None,
            email: None,
            telephone: None,
            signature_data: Some("../../etc/passwd".into()),
            signature_timestamp: None,
            signature_ip: None,
            mention_lu_approuve: Some("Lu et approuvé".into()),
        };
        let html = signatures_html(dir.path(), &[locataire]);
        assert!(!html.contains("<img"));
        assert!(html.contains("Non signé"));
    }
}
