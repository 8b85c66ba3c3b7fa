//! Decoding of the model's triage judgment and rendering into ordered HTML
//! fragments.
//!
//! Everything here is pure: the same judgment always yields the same
//! fragment sequence. Missing or invalid urgency normalizes to medium;
//! a judgment with no usable fields at all renders a minimal apology.

use serde::Deserialize;
use serde_json::Value;

use crate::models::{ClientAction, TriageResult, Urgency};

/// Shown when extraction produced nothing usable.
pub const APOLOGY_HTML: &str = "<p><strong>Lo siento, tuve un problema procesando tu consulta. Por favor, intenta de nuevo.</strong></p>";

/// Shown when the gibberish classifier rejected the input.
pub const GIBBERISH_HTML: &str = "<p><strong>Lo siento, no logré entender tu mensaje. ¿Podrías escribirlo de nuevo o explicarlo con otras palabras?</strong></p>";

/// Safe defaults when the model omits the clinical lists.
pub const DEFAULT_SPECIALTY: &str = "Medicina General";
pub const DEFAULT_RECOMMENDATION: &str = "Consulta con un profesional de la salud";

/// Cap on recommendations in a triage result.
const MAX_RECOMMENDATIONS: usize = 3;
/// Cap on specialties in a triage result.
const MAX_SPECIALTIES: usize = 2;

/// The model's judgment as it appears on the wire: Spanish keys per the
/// prompt contract, every field optional since the three response modes
/// populate different subsets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelJudgment {
    pub urgencia: Option<String>,
    pub explicacion_urgencia: Option<String>,
    pub mensaje_principal: Option<String>,
    pub recomendaciones: Option<Vec<String>>,
    pub especialidades: Option<Vec<String>>,
    pub accion: Option<String>,
}

/// Decode a recovered JSON value into a judgment, tolerating missing fields.
/// A value with unusable field types degrades to the empty judgment, which
/// renders as the apology fragment.
pub fn decode_judgment(value: Value) -> ModelJudgment {
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "judgment had unexpected field types; using empty judgment");
        ModelJudgment::default()
    })
}

/// Ordered display fragments for a judgment.
pub fn render_fragments(judgment: &ModelJudgment) -> Vec<String> {
    let mut fragments = Vec::new();

    if let Some(msg) = &judgment.mensaje_principal {
        fragments.push(format!("<p>{msg}</p>"));
    }

    if let (Some(urgencia), Some(explicacion)) =
        (&judgment.urgencia, &judgment.explicacion_urgencia)
    {
        fragments.push(format!(
            "<p><strong>Nivel de urgencia: {}</strong> - {}</p>",
            urgencia.to_uppercase(),
            explicacion
        ));
    }

    if let Some(recs) = judgment
        .recomendaciones
        .as_ref()
        .filter(|r| !r.is_empty())
    {
        let items: String = recs
            .iter()
            .take(MAX_RECOMMENDATIONS)
            .map(|r| format!("<li>{r}</li>"))
            .collect();
        fragments.push(format!(
            "<p><strong>Acciones recomendadas:</strong></p><ul>{items}</ul>"
        ));
    }

    if let Some(specs) = judgment
        .especialidades
        .as_ref()
        .filter(|s| !s.is_empty())
    {
        let joined = specs
            .iter()
            .take(MAX_SPECIALTIES)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        fragments.push(format!(
            "<p><strong>Especialidades médicas:</strong> {joined}</p>"
        ));
    }

    if fragments.is_empty() {
        fragments.push(APOLOGY_HTML.to_string());
    }

    fragments
}

/// Map a decoded judgment onto the caller-facing result, enforcing the list
/// caps and the medium-urgency default.
pub fn to_result(judgment: &ModelJudgment) -> TriageResult {
    let content = render_fragments(judgment).concat();
    let action = judgment.accion.as_deref().and_then(ClientAction::parse);

    // Action-only mode carries no clinical fields at all.
    if action.is_some() {
        return TriageResult {
            content,
            urgency: None,
            recommendations: Vec::new(),
            specialties: Vec::new(),
            action,
        };
    }

    let urgency = judgment
        .urgencia
        .as_deref()
        .and_then(Urgency::parse)
        .unwrap_or(Urgency::Medio);

    let recommendations = capped(
        judgment.recomendaciones.clone(),
        DEFAULT_RECOMMENDATION,
        MAX_RECOMMENDATIONS,
    );
    let specialties = capped(
        judgment.especialidades.clone(),
        DEFAULT_SPECIALTY,
        MAX_SPECIALTIES,
    );

    TriageResult {
        content,
        urgency: Some(urgency),
        recommendations,
        specialties,
        action: None,
    }
}

/// Typed default used when extraction failed entirely.
pub fn failure_result() -> TriageResult {
    TriageResult {
        content: APOLOGY_HTML.to_string(),
        urgency: Some(Urgency::Medio),
        recommendations: vec![DEFAULT_RECOMMENDATION.to_string()],
        specialties: vec![DEFAULT_SPECIALTY.to_string()],
        action: None,
    }
}

/// Result for input the classifier rejected: apology only, no clinical fields.
pub fn gibberish_result() -> TriageResult {
    TriageResult {
        content: GIBBERISH_HTML.to_string(),
        urgency: None,
        recommendations: Vec::new(),
        specialties: Vec::new(),
        action: None,
    }
}

fn capped(list: Option<Vec<String>>, default: &str, limit: usize) -> Vec<String> {
    let mut items = list.unwrap_or_else(|| vec![default.to_string()]);
    items.truncate(limit);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_judgment() -> ModelJudgment {
        decode_judgment(json!({
            "urgencia": "ALTO",
            "explicacion_urgencia": "sangrado abundante",
            "mensaje_principal": "Busca atención de inmediato.",
            "recomendaciones": ["Llama a emergencias", "No te muevas"],
            "especialidades": ["Traumatología"]
        }))
    }

    #[test]
    fn fragments_follow_the_display_order() {
        let fragments = render_fragments(&full_judgment());
        assert_eq!(fragments.len(), 4);
        assert!(fragments[0].starts_with("<p>Busca atención"));
        assert!(fragments[1].contains("Nivel de urgencia: ALTO"));
        assert!(fragments[1].contains("sangrado abundante"));
        assert!(fragments[2].contains("<li>Llama a emergencias</li>"));
        assert!(fragments[3].contains("Especialidades médicas:</strong> Traumatología"));
    }

    #[test]
    fn urgency_fragment_needs_both_fields() {
        let judgment = decode_judgment(json!({"urgencia": "ALTO"}));
        let fragments = render_fragments(&judgment);
        assert!(!fragments.iter().any(|f| f.contains("Nivel de urgencia")));
    }

    #[test]
    fn rendering_is_idempotent() {
        let judgment = full_judgment();
        assert_eq!(render_fragments(&judgment), render_fragments(&judgment));
    }

    #[test]
    fn empty_judgment_renders_apology() {
        let fragments = render_fragments(&ModelJudgment::default());
        assert_eq!(fragments, vec![APOLOGY_HTML.to_string()]);
    }

    #[test]
    fn caps_are_enforced_on_results() {
        let judgment = decode_judgment(json!({
            "urgencia": "BAJO",
            "recomendaciones": ["a", "b", "c", "d", "e"],
            "especialidades": ["x", "y", "z"]
        }));
        let result = to_result(&judgment);
        assert_eq!(result.recommendations.len(), 3);
        assert_eq!(result.specialties.len(), 2);
    }

    #[test]
    fn invalid_urgency_defaults_to_medium() {
        let judgment = decode_judgment(json!({"urgencia": "URGENTISIMO"}));
        assert_eq!(to_result(&judgment).urgency, Some(Urgency::Medio));

        let missing = decode_judgment(json!({"mensaje_principal": "hola"}));
        assert_eq!(to_result(&missing).urgency, Some(Urgency::Medio));
    }

    #[test]
    fn missing_lists_get_safe_defaults() {
        let judgment = decode_judgment(json!({"urgencia": "MEDIO"}));
        let result = to_result(&judgment);
        assert_eq!(result.recommendations, vec![DEFAULT_RECOMMENDATION]);
        assert_eq!(result.specialties, vec![DEFAULT_SPECIALTY]);
    }

    #[test]
    fn action_mode_has_no_clinical_fields() {
        let judgment = decode_judgment(json!({
            "mensaje_principal": "Aquí tienes farmacias cercanas.",
            "accion": "mostrar_farmacias"
        }));
        let result = to_result(&judgment);
        assert_eq!(result.action, Some(ClientAction::ShowPharmacies));
        assert_eq!(result.urgency, None);
        assert!(result.recommendations.is_empty());
        assert!(result.specialties.is_empty());
        assert!(result.content.contains("farmacias cercanas"));
    }

    #[test]
    fn mistyped_fields_degrade_to_empty_judgment() {
        let judgment = decode_judgment(json!({"recomendaciones": "no soy una lista"}));
        assert!(judgment.recomendaciones.is_none());
        assert!(judgment.mensaje_principal.is_none());
    }
}
