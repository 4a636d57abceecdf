//! Backup request and schedule DTOs.

use serde::{Deserialize, Serialize};

use crate::entity::sauvegarde::SauvegardeType;
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct CreateSauvegardeRequest {
    #[serde(rename = "type")]
    pub type_sauvegarde: SauvegardeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequence {
    Daily,
    Weekly,
    Monthly,
}

impl Frequence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// Crontab expression running at `heure`:00 (Sundays for weekly, the 1st
    /// for monthly).
    pub fn cron_expression(&self, heure: u8) -> String {
        match self {
            Self::Daily => format!("0 {} * * *", heure),
            Self::Weekly => format!("0 {} * * 0", heure),
            Self::Monthly => format!("0 {} 1 * *", heure),
        }
    }
}

/// Automatic backup schedule consumed by `backup-cron`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSchedule {
    pub actif: bool,
    pub frequence: Frequence,
    pub heure: u8,
    pub retention_jours: u32,
}

impl Default for BackupSchedule {
    fn default() -> Self {
        Self {
            actif: false,
            frequence: Frequence::Daily,
            heure: 2,
            retention_jours: 30,
        }
    }
}

impl BackupSchedule {
    pub fn validate(&self) -> AppResult<()> {
        if self.heure > 23 {
            return Err(AppError::InvalidInput("L'heure doit être comprise entre 0 et 23".into()));
        }
        if !(1..=365).contains(&self.retention_jours) {
            return Err(AppError::InvalidInput(
                "La rétention doit être comprise entre 1 et 365 jours".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_bounds() {
        let mut schedule = BackupSchedule::default();
        assert!(schedule.validate().is_ok());
        schedule.heure = 24;
        assert!(schedule.validate().is_err());
        schedule.heure = 3;
        schedule.retention_jours = 0;
        assert!(schedule.validate().is_err());
        schedule.retention_jours = 366;
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_cron_expression() {
        assert_eq!(Frequence::Weekly.cron_expression(4), "0 4 * * 0");
        assert_eq!(Frequence::Monthly.cron_expression(23), "0 23 1 * *");
    }
}
