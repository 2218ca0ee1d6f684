//! LLM prompts for the three-stage research pipeline.
//!
//! The research prompt is derived from the sheet's header row so the agents
//! answer with exactly the fields the sheet holds. Templates use `{name}`
//! placeholders filled with `str::replace`.

use crate::normalize::truncate_chars;
use crate::types::config::SheetLayout;
use crate::types::record::{HeaderRow, Record};

/// System prompt of the research stage.
pub const RESEARCH_AGENT: &str = "Tu es un chercheur d'aides au documentaire, expert en financement \
culturel pour documentaires internationaux. Ton objectif : identifier et extraire des aides \
financières pertinentes pour un documentaire en postproduction, tourné en Thaïlande et coproduit \
avec la France.";

/// System prompt of the cleaning stage.
pub const CLEANING_AGENT: &str = "Tu es un spécialiste de la normalisation de données pour des bases \
structurées. Tu nettoies et uniformises les informations collectées en respectant exactement les \
colonnes demandées.";

/// System prompt of the verification stage.
pub const ANALYSIS_AGENT: &str = "Tu es un consultant expert en montage de dossiers de financement pour \
films internationaux. Tu vérifies la pertinence des liens et enrichis chaque aide avec des \
commentaires stratégiques.";

/// Generate stage: research instructions over the collected pages.
pub const GENERATE_PROMPT: &str = r#"{research}

IMPORTANT : Pour chaque aide trouvée, extrais TOUTES les informations demandées.
Si une information n'est pas disponible, indique "Non spécifié" mais inclus quand même le champ.
{exclusions}
Contenu à analyser :
{documents}

Résultat attendu : une liste structurée d'aides avec EXACTEMENT ces champs : {fields}"#;

/// Clean stage: strip formatting and enforce the field list.
pub const CLEAN_PROMPT: &str = r#"Prends les résultats et nettoie-les :
- Supprime tous les caractères de formatage markdown
- Assure-toi que chaque aide a TOUS les champs suivants : {fields}
- Standardise les formats (dates, emails, liens)
- Garde un format cohérent pour chaque entrée

Résultat attendu : une liste propre avec ces champs exacts : {fields}

Résultats à traiter :
{previous}"#;

/// Verify stage: check links and enrich.
pub const VERIFY_PROMPT: &str = r#"Vérifie et enrichis chaque aide :
- Vérifie que les liens sont pertinents (pas de pages d'accueil génériques)
- Ajoute des commentaires stratégiques sur l'adéquation avec le projet
- Complète les informations manquantes si possible
- Structure finale avec TOUS ces champs : {fields}

Écris chaque champ sur sa propre ligne sous la forme "Champ: valeur" et sépare les aides par une ligne vide.

Résultats à vérifier :
{previous}"#;

/// Research instructions plus the field list the parser should expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchPrompt {
    pub text: String,
    pub expected_headers: Vec<String>,
}

/// Build the research prompt from the sheet's current headers.
///
/// Automatic columns are left out. With no headers the layout's default
/// fields are asked for.
pub fn build_research_prompt(headers: &HeaderRow, layout: &SheetLayout) -> ResearchPrompt {
    let fields: Vec<String> = if headers.is_empty() {
        layout.default_fields()
    } else {
        headers
            .iter()
            .filter(|h| !h.is_empty() && !layout.is_auto_column(h))
            .map(str::to_string)
            .collect()
    };

    let mut text = String::from("Extrais les informations suivantes pour chaque aide :\n");
    for field in &fields {
        text.push_str(&format!("- {}\n", field));
    }
    text.push_str(&format!(
        "\nFormate chaque aide avec EXACTEMENT ces champs : {}",
        fields.join(", ")
    ));
    text.push_str(
        "\nSi tu ne trouves pas d'information pour un champ, laisse-le vide mais inclus quand même le champ.",
    );

    ResearchPrompt {
        text,
        expected_headers: fields,
    }
}

/// "Ignore these" list built from the names of already-known opportunities.
///
/// Empty when no record carries a name.
pub fn exclusion_text(records: &[Record]) -> String {
    let names: Vec<&str> = records
        .iter()
        .filter_map(|r| r.lookup("Nom").or_else(|| r.lookup("Name")))
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();

    if names.is_empty() {
        return String::new();
    }

    let mut text = String::from("\nIgnore les aides déjà listées avec les noms suivants :\n");
    for name in names {
        text.push_str(&format!("- {}\n", name));
    }
    text
}

/// Format the generate stage prompt, capping the documents at `max_chars`.
pub fn format_generate_prompt(
    research: &ResearchPrompt,
    exclusions: &str,
    documents: &str,
    max_chars: usize,
) -> String {
    GENERATE_PROMPT
        .replace("{research}", &research.text)
        .replace("{exclusions}", exclusions)
        .replace("{fields}", &research.expected_headers.join(", "))
        .replace("{documents}", truncate_chars(documents, max_chars))
}

/// Format the clean stage prompt over the previous stage's output.
pub fn format_clean_prompt(fields: &[String], previous: &str) -> String {
    CLEAN_PROMPT
        .replace("{fields}", &fields.join(", "))
        .replace("{previous}", previous)
}

/// Format the verify stage prompt over the previous stage's output.
pub fn format_verify_prompt(fields: &[String], previous: &str) -> String {
    VERIFY_PROMPT
        .replace("{fields}", &fields.join(", "))
        .replace("{previous}", previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_skips_auto_columns() {
        let headers = HeaderRow::new(&["Nom", "Lien", "Date Ajout", "ID", ""]);
        let prompt = build_research_prompt(&headers, &SheetLayout::french());

        assert_eq!(prompt.expected_headers, vec!["Nom", "Lien"]);
        assert!(prompt.text.contains("- Nom\n- Lien\n"));
        assert!(!prompt.text.contains("Date Ajout"));
        assert!(prompt.text.contains("laisse-le vide mais inclus quand même le champ"));
    }

    #[test]
    fn test_prompt_defaults_without_headers() {
        let layout = SheetLayout::french();
        let prompt = build_research_prompt(&HeaderRow::default(), &layout);

        assert_eq!(prompt.expected_headers, layout.default_fields());
        assert!(prompt.text.contains("- Organisme\n"));
    }

    #[test]
    fn test_exclusion_text() {
        let records = vec![
            Record::new().with("nom", "Aide CNC"),
            Record::new().with("Lien", "https://x"),
            Record::new().with("NAME", "Eurimages"),
        ];
        let text = exclusion_text(&records);

        assert!(text.contains("- Aide CNC\n"));
        assert!(text.contains("- Eurimages\n"));
        assert_eq!(exclusion_text(&[]), "");
    }

    #[test]
    fn test_generate_prompt_truncates_documents() {
        let research = build_research_prompt(&HeaderRow::new(&["Nom"]), &SheetLayout::french());
        let prompt = format_generate_prompt(&research, "", "abcdef", 3);

        assert!(prompt.contains("abc"));
        assert!(!prompt.contains("abcd"));
        assert!(prompt.ends_with("EXACTEMENT ces champs : Nom"));
    }

    #[test]
    fn test_stage_prompts_carry_previous_output() {
        let fields = vec!["Nom".to_string(), "Lien".to_string()];
        let clean = format_clean_prompt(&fields, "Nom: A");
        let verify = format_verify_prompt(&fields, "Nom: B");

        assert!(clean.ends_with("Nom: A"));
        assert!(clean.contains("Nom, Lien"));
        assert!(verify.ends_with("Nom: B"));
    }
}
