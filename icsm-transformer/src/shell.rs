//! Interface de présentation (dialogue, barre de messages)

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::engine::DatasetKind;

/// Niveau d'un message utilisateur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Critical,
}

/// Rappels de l'application vers la couche de présentation
pub trait Shell {
    /// Panneau d'état (texte HTML léger: `<br>`, `<b>`)
    fn set_status_text(&mut self, text: &str);

    /// Liste des destinations proposées
    fn set_candidate_list(&mut self, names: &[String]);

    /// Notification ponctuelle
    fn show_message(&mut self, severity: Severity, text: &str);

    /// Ajoute le résultat comme couche d'affichage
    fn add_layer(&mut self, path: &Path, kind: DatasetKind);
}

/// Convertit le texte d'état HTML en texte brut
pub fn html_to_text(html: &str) -> String {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();

    let br = BREAK.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
    let tag = TAG.get_or_init(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid regex"));

    let text = br.replace_all(html, "\n");
    tag.replace_all(&text, "").into_owned()
}

/// Shell console pour la CLI
#[derive(Debug, Default)]
pub struct ConsoleShell {
    /// Derniers candidats affichés
    pub candidates: Vec<String>,
}

impl Shell for ConsoleShell {
    fn set_status_text(&mut self, text: &str) {
        println!("{}", html_to_text(text));
    }

    fn set_candidate_list(&mut self, names: &[String]) {
        self.candidates = names.to_vec();
        if names.is_empty() {
            return;
        }
        println!("Available destinations:");
        for (i, name) in names.iter().enumerate() {
            println!("  [{}] {}", i, name);
        }
    }

    fn show_message(&mut self, severity: Severity, text: &str) {
        match severity {
            Severity::Info | Severity::Success => println!("{:?}: {}", severity, text),
            Severity::Warning | Severity::Critical => eprintln!("{:?}: {}", severity, text),
        }
    }

    fn add_layer(&mut self, path: &Path, kind: DatasetKind) {
        println!("Result layer ({}): {}", kind, path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text() {
        assert_eq!(
            html_to_text("Source CRS is A<br>Destination CRS is B<br><br><b>WARNING!</b> x"),
            "Source CRS is A\nDestination CRS is B\n\nWARNING! x"
        );
        assert_eq!(html_to_text("a<BR/>b"), "a\nb");
        assert_eq!(html_to_text("1 < 2"), "1 < 2");
    }

    #[test]
    fn test_console_keeps_candidates() {
        let mut shell = ConsoleShell::default();
        shell.set_candidate_list(&["GDA94 / MGA [EPSG:28350]".to_string()]);
        assert_eq!(shell.candidates.len(), 1);
    }
}
