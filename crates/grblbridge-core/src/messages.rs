//! User-facing status texts
//!
//! Every status message the bridge reports to a presentation layer is looked
//! up here, so the operator sees it in the configured language.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported display languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// German
    De,
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "de" | "german" | "deutsch" => Ok(Self::De),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}

/// Keys of the message catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Title,
    WaitingConnection,
    Connected,
    ConnectionLost,
    Error,
    ReceivingProgram,
    ProgramReceived,
    BackupCreated,
    NoProgramFile,
    BackupError,
    Quitting,
}

/// Message lookup for one language
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog {
    language: Language,
}

impl Catalog {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Look up the text for `key`
    pub fn text(&self, key: MessageKey) -> &'static str {
        match self.language {
            Language::En => english(key),
            Language::De => german(key),
        }
    }
}

fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::Title => "LightBurn to LinuxCNC Bridge (l2l)",
        MessageKey::WaitingConnection => "Waiting for connection",
        MessageKey::Connected => "Connected to",
        MessageKey::ConnectionLost => "Connection lost",
        MessageKey::Error => "Error:",
        MessageKey::ReceivingProgram => "Receiving program...",
        MessageKey::ProgramReceived => "Program received",
        MessageKey::BackupCreated => "Backup created:",
        MessageKey::NoProgramFile => "No program file available",
        MessageKey::BackupError => "Error creating backup file:",
        MessageKey::Quitting => "Quitting program...",
    }
}

fn german(key: MessageKey) -> &'static str {
    match key {
        MessageKey::Title => "LightBurn zu LinuxCNC Bridge (l2l)",
        MessageKey::WaitingConnection => "Warte auf Verbindung",
        MessageKey::Connected => "Verbunden mit",
        MessageKey::ConnectionLost => "Verbindung getrennt",
        MessageKey::Error => "Fehler:",
        MessageKey::ReceivingProgram => "Empfange Programm...",
        MessageKey::ProgramReceived => "Programm empfangen",
        MessageKey::BackupCreated => "Backup erstellt:",
        MessageKey::NoProgramFile => "Keine Programmdatei vorhanden",
        MessageKey::BackupError => "Fehler beim Erstellen der Backup-Datei:",
        MessageKey::Quitting => "Beende Programm...",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!("en".parse::<Language>(), Ok(Language::En));
        assert_eq!(" DE ".parse::<Language>(), Ok(Language::De));
        assert_eq!("deutsch".parse::<Language>(), Ok(Language::De));
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_catalog_lookup() {
        let en = Catalog::new(Language::En);
        let de = Catalog::new(Language::De);

        assert_eq!(en.text(MessageKey::ConnectionLost), "Connection lost");
        assert_eq!(de.text(MessageKey::ConnectionLost), "Verbindung getrennt");
        assert_eq!(de.text(MessageKey::ReceivingProgram), "Empfange Programm...");
        assert_eq!(Catalog::default().language(), Language::En);
    }
}
