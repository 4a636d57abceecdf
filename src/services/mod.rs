//! Business services: file handling, documents, email and the multi-step
//! workflows the HTTP handlers and cron binaries share.

pub mod backup;
pub mod contrats;
pub mod documents;
pub mod etats_lieux;
pub mod loyers;
pub mod mailer;
pub mod notify;
pub mod paths;
pub mod signatures;
pub mod template;
pub mod uploads;

pub use backup::BackupService;
pub use contrats::ContratService;
pub use etats_lieux::EtatLieuxService;
pub use loyers::{LoyerService, RappelReport};
pub use mailer::{
    EmailService, LogMailer, Mailer, OutgoingEmail, RecordingMailer, SmtpMailer,
    mailer_from_config,
};
pub use notify::Outcome;
