//! Open-facility recommendation: model choice with a deterministic
//! distance/rating fallback.
//!
//! The model sees the conversation transcript plus one structured line per
//! open place and must answer with `{"recommendedPlaceIds": [...],
//! "message": "..."}`. Anything short of usable ids falls back to the
//! nearest open places, so the caller always gets a ranking.

use std::cmp::Ordering;

use serde::Deserialize;

use super::extract::{extract_json, ExpectedShape};
use super::prompt::serialize_history;
use super::TriageError;
use crate::llm::{GenerationParams, LlmError, TextGenerate};
use crate::models::{ChatMessage, Place, RecommendationResult};

/// Cap on returned facilities.
const MAX_RECOMMENDED: usize = 3;

/// Returned without any model call when nothing is open.
pub const NO_OPEN_CENTERS_MSG: &str = "No hay centros abiertos en la zona.";

/// Fixed message for the deterministic fallback ranking.
pub const FALLBACK_MSG: &str = "No se pudo obtener una recomendación inteligente, pero estos centros abiertos están disponibles cerca tuyo.";

const RECOMMENDATION_INSTRUCTIONS: &str = r#"Eres un asistente médico virtual.
1. Analiza el siguiente historial de chat entre un usuario y un asistente, identificando síntomas, contexto y nivel de urgencia.
2. Revisa el listado de centros médicos cercanos, cada uno con: id, nombre, especialidades, si está abierto, distancia, tipo y rating.
3. Elige hasta 3 lugares del listado que sean los más adecuados para la situación del usuario, priorizando:
- Centros abiertos.
- Centros con especialidades relevantes para los síntomas detectados.
- Centros de mayor complejidad si la urgencia es alta.
- Centros más cercanos y con mejor rating.
- Analiza también el NOMBRE de cada centro. Si el nombre indica una especialidad que no es relevante para la emergencia (por ejemplo, "cardiovascular" para un trauma craneal, "oftalmológico" para un infarto, "pediatría" para un adulto, etc.), descártalo salvo que no haya otras opciones.
- Prioriza hospitales generales, de alta complejidad o con servicios de urgencias generales cuando la situación lo requiera.
- Si solo hay centros de especialidad no relevante, adviértelo en el mensaje.
4. Si no hay lugares apropiados abiertos, explica el motivo y sugiere cambiar de ubicación o llamar a emergencias si es necesario.
5. Devuelve solo el siguiente JSON (sin texto adicional):
{"recommendedPlaceIds": ["id1", "id2", "id3"], "message": "Texto de advertencia o recomendación para el usuario"}"#;

/// The model's reply shape for a recommendation request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationReply {
    #[serde(default)]
    recommended_place_ids: Vec<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Rank open facilities for the situation described in the history.
pub fn recommend_medical_centers<C: TextGenerate>(
    client: &C,
    places: &[Place],
    history: &[ChatMessage],
) -> Result<RecommendationResult, TriageError> {
    let open: Vec<&Place> = places.iter().filter(|p| p.is_open()).collect();
    if open.is_empty() {
        return Ok(RecommendationResult {
            recommended: Vec::new(),
            message: NO_OPEN_CENTERS_MSG.to_string(),
        });
    }

    let prompt = build_recommendation_prompt(&open, history);

    let reply = match client.generate(&prompt, &GenerationParams::CLASSIFY) {
        Ok(raw) => decode_reply(&raw),
        // A missing credential is a configuration fault, not a reason to
        // pretend the model declined.
        Err(LlmError::MissingApiKey) => return Err(TriageError::MissingApiKey),
        Err(e) => {
            tracing::warn!(error = %e, "recommendation model call failed; using distance fallback");
            RecommendationReply::default()
        }
    };

    // Membership test against the open list, preserving its order rather
    // than the order of the returned ids.
    let mut recommended: Vec<Place> = open
        .iter()
        .filter(|p| {
            reply
                .recommended_place_ids
                .iter()
                .any(|id| id == p.canonical_id())
        })
        .map(|p| (*p).clone())
        .collect();

    let mut message = reply.message.unwrap_or_default();
    if recommended.is_empty() {
        recommended = fallback_ranking(&open);
        if message.is_empty() {
            message = FALLBACK_MSG.to_string();
        }
    }

    Ok(RecommendationResult {
        recommended,
        message,
    })
}

fn decode_reply(raw: &str) -> RecommendationReply {
    match extract_json(raw, ExpectedShape::Object) {
        Ok(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "recommendation reply had unexpected shape");
            RecommendationReply::default()
        }),
        Err(e) => {
            tracing::warn!(error = %e, "could not recover recommendation JSON");
            RecommendationReply::default()
        }
    }
}

/// Deterministic fallback: nearest open places first; rating breaks ties and
/// stands in when distances are missing. The sort is stable, so places
/// without comparable keys keep their relative order.
fn fallback_ranking(open: &[&Place]) -> Vec<Place> {
    let mut ranked: Vec<&Place> = open.to_vec();
    ranked.sort_by(|a, b| match (a.distance_value(), b.distance_value()) {
        (Some(da), Some(db)) if da != db => da.partial_cmp(&db).unwrap_or(Ordering::Equal),
        _ => b
            .rating
            .unwrap_or(0.0)
            .partial_cmp(&a.rating.unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
    });
    ranked
        .into_iter()
        .take(MAX_RECOMMENDED)
        .cloned()
        .collect()
}

fn build_recommendation_prompt(open: &[&Place], history: &[ChatMessage]) -> String {
    let chat_text = serialize_history(history);
    let places_text = open
        .iter()
        .map(|p| {
            format!(
                "ID: {}, Nombre: {}, Especialidades: {}, Distancia: {}, Tipo: {}, Rating: {}",
                p.canonical_id(),
                p.name,
                p.specialties.join(", "),
                p.distance_value().map(fmt_num).unwrap_or_default(),
                p.kind_label(),
                p.rating.map(fmt_num).unwrap_or_default(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{RECOMMENDATION_INSTRUCTIONS}\n\nHistorial de chat:\n{chat_text}\n\nLugares abiertos:\n{places_text}"
    )
}

fn fmt_num(n: f64) -> String {
    n.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockTextClient;
    use crate::models::OpeningHours;

    fn open_place(id: &str, name: &str, distance_meters: Option<f64>) -> Place {
        Place {
            id: id.to_string(),
            name: name.to_string(),
            open: Some(true),
            distance_meters,
            ..Default::default()
        }
    }

    #[test]
    fn no_open_places_short_circuits_without_model_call() {
        let closed = vec![
            Place {
                id: "a".into(),
                name: "Hospital Central".into(),
                ..Default::default()
            },
            Place {
                id: "b".into(),
                name: "Clínica Norte".into(),
                open: Some(false),
                ..Default::default()
            },
        ];
        let client = MockTextClient::new(r#"{"recommendedPlaceIds": ["a"]}"#);
        let result = recommend_medical_centers(&client, &closed, &[]).unwrap();
        assert!(result.recommended.is_empty());
        assert_eq!(result.message, NO_OPEN_CENTERS_MSG);
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn nested_opening_hours_flag_counts_as_open() {
        let places = vec![Place {
            id: "a".into(),
            name: "Hospital Central".into(),
            opening_hours: Some(OpeningHours { open_now: true }),
            ..Default::default()
        }];
        let client =
            MockTextClient::new(r#"{"recommendedPlaceIds": ["a"], "message": "ve ahora"}"#);
        let result = recommend_medical_centers(&client, &places, &[]).unwrap();
        assert_eq!(result.recommended.len(), 1);
        assert_eq!(result.message, "ve ahora");
    }

    #[test]
    fn mapped_ids_preserve_open_list_order() {
        let places = vec![
            open_place("a", "Hospital A", None),
            open_place("b", "Hospital B", None),
            open_place("c", "Hospital C", None),
        ];
        // Model answers in reverse order; the open-list order wins.
        let client = MockTextClient::new(r#"{"recommendedPlaceIds": ["c", "a"]}"#);
        let result = recommend_medical_centers(&client, &places, &[]).unwrap();
        let ids: Vec<&str> = result.recommended.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn failing_model_falls_back_to_distance_order() {
        let places = vec![
            open_place("A", "Hospital A", Some(500.0)),
            open_place("B", "Hospital B", Some(200.0)),
            open_place("C", "Hospital C", Some(800.0)),
        ];
        let client = MockTextClient::failing();
        let result = recommend_medical_centers(&client, &places, &[]).unwrap();
        let ids: Vec<&str> = result.recommended.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
        assert_eq!(result.message, FALLBACK_MSG);
    }

    #[test]
    fn unparseable_reply_falls_back() {
        let places = vec![
            open_place("a", "Hospital A", Some(900.0)),
            open_place("b", "Hospital B", Some(100.0)),
        ];
        let client = MockTextClient::new("lo siento, no puedo elegir");
        let result = recommend_medical_centers(&client, &places, &[]).unwrap();
        let ids: Vec<&str> = result.recommended.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(!result.message.is_empty());
    }

    #[test]
    fn fallback_caps_at_three_and_breaks_ties_by_rating() {
        let mut places = vec![
            open_place("a", "Hospital A", Some(300.0)),
            open_place("b", "Hospital B", Some(300.0)),
            open_place("c", "Hospital C", Some(100.0)),
            open_place("d", "Hospital D", Some(700.0)),
        ];
        places[0].rating = Some(3.5);
        places[1].rating = Some(4.8);
        let client = MockTextClient::failing();
        let result = recommend_medical_centers(&client, &places, &[]).unwrap();
        let ids: Vec<&str> = result.recommended.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn model_message_survives_even_when_ids_are_useless() {
        let places = vec![open_place("a", "Hospital A", Some(100.0))];
        let client = MockTextClient::new(
            r#"{"recommendedPlaceIds": ["desconocido"], "message": "Solo hay centros de especialidad no relevante."}"#,
        );
        let result = recommend_medical_centers(&client, &places, &[]).unwrap();
        // Fallback list, but the model's warning is kept.
        assert_eq!(result.recommended.len(), 1);
        assert_eq!(
            result.message,
            "Solo hay centros de especialidad no relevante."
        );
    }

    #[test]
    fn missing_credential_propagates() {
        let places = vec![open_place("a", "Hospital A", None)];
        let client = MockTextClient::unconfigured();
        let err = recommend_medical_centers(&client, &places, &[]).unwrap_err();
        assert!(matches!(err, TriageError::MissingApiKey));
    }

    #[test]
    fn prompt_lists_history_and_open_places() {
        let places = vec![open_place("a", "Hospital Central", Some(250.0))];
        let history = vec![ChatMessage::user("me corté la mano")];
        let open: Vec<&Place> = places.iter().collect();
        let prompt = build_recommendation_prompt(&open, &history);
        assert!(prompt.contains("Usuario: me corté la mano"));
        assert!(prompt.contains("ID: a, Nombre: Hospital Central"));
        assert!(prompt.contains("recommendedPlaceIds"));
    }
}
