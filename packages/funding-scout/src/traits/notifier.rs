//! Notification trait for run reports.

use async_trait::async_trait;

use crate::error::Result;

/// Sends a plain-text message to a recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `body` under `subject`.
    ///
    /// Returns a human-readable outcome (provider message id, say). Missing
    /// configuration is an error, never a silent success.
    async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<String>;
}

/// Subject and body of the end-of-run report.
///
/// The body opens with the merge counts and the added names, followed by the
/// agents' final answer as it came out of the pipeline.
pub fn run_report(
    added: usize,
    duplicates: usize,
    missing_identity: usize,
    names: &[String],
    answer: &str,
) -> (String, String) {
    let subject = format!("Film funding scout: {} new opportunit{}", added, if added == 1 { "y" } else { "ies" });

    let mut body = format!(
        "New opportunities added: {}\nAlready known: {}\nSkipped (no name or link): {}\n",
        added, duplicates, missing_identity
    );
    if !names.is_empty() {
        body.push('\n');
        for name in names {
            body.push_str(&format!("- {}\n", name));
        }
    }

    let answer = answer.trim();
    if !answer.is_empty() {
        body.push_str("\nAgent report:\n");
        body.push_str(answer);
        body.push('\n');
    }

    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_report() {
        let names = ["Aide CNC".to_string(), "Eurimages".to_string()];
        let (subject, body) = run_report(2, 1, 0, &names, "");
        assert_eq!(subject, "Film funding scout: 2 new opportunities");
        assert!(body.contains("Already known: 1"));
        assert!(body.ends_with("- Aide CNC\n- Eurimages\n"));

        let (subject, _) = run_report(1, 0, 0, &[], "");
        assert!(subject.ends_with("1 new opportunity"));
    }

    #[test]
    fn test_run_report_carries_answer_after_counts() {
        let answer = "Nom: Aide CNC\nLien: https://cnc.fr/aide\n";
        let (_, body) = run_report(1, 0, 0, &["Aide CNC".to_string()], answer);

        let counts = body.find("New opportunities added: 1").unwrap();
        let report = body.find("Agent report:\nNom: Aide CNC\nLien: https://cnc.fr/aide").unwrap();
        assert!(counts < report);
        assert!(body.ends_with("https://cnc.fr/aide\n"));
    }
}
