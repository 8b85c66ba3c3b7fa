//! Two-stage facility filter: model classification of candidate places,
//! then a deterministic denylist safety net with a recall guard.
//!
//! The model sees only {id, name} pairs and must answer with a JSON array of
//! accepted ids. An unusable answer fails open: the truncated candidate list
//! comes back unchanged rather than silently emptying the result set.

use serde::Serialize;
use serde_json::Value;

use super::extract::{extract_json, ExpectedShape};
use super::TriageError;
use crate::config::TriageTables;
use crate::llm::{GenerationParams, TextGenerate};
use crate::models::Place;

/// Cost bound for the classification prompt.
const MAX_CANDIDATES: usize = 20;

/// Minimum share of candidates the denylist must leave standing before its
/// narrowing is discarded (recall over precision).
const MIN_KEEP_RATIO: f64 = 0.1;

#[derive(Serialize)]
struct IdName<'a> {
    id: &'a str,
    name: &'a str,
}

/// Keep only genuine medical facilities. The result is always a subset of
/// the first [`MAX_CANDIDATES`] input places, order preserved.
pub fn filter_medical_centers<C: TextGenerate>(
    client: &C,
    tables: &TriageTables,
    places: &[Place],
) -> Result<Vec<Place>, TriageError> {
    let limited = &places[..places.len().min(MAX_CANDIDATES)];

    let prompt = build_filter_prompt(limited);
    let raw = client.generate(&prompt, &GenerationParams::CLASSIFY)?;

    let ids = accepted_ids(&raw);
    if ids.is_empty() {
        tracing::warn!("facility classification unusable; keeping candidate list as-is");
        return Ok(limited.to_vec());
    }

    let accepted: Vec<Place> = limited
        .iter()
        .filter(|p| ids.iter().any(|id| id == p.canonical_id()))
        .cloned()
        .collect();

    let safe: Vec<Place> = accepted
        .iter()
        .filter(|p| !name_matches_denylist(tables, &p.name))
        .cloned()
        .collect();

    let min_keep = (limited.len() as f64 * MIN_KEEP_RATIO).max(1.0);
    if (safe.len() as f64) < min_keep {
        tracing::debug!(
            accepted = accepted.len(),
            after_denylist = safe.len(),
            "denylist over-triggered; keeping model-accepted set"
        );
        return Ok(accepted);
    }

    Ok(safe)
}

/// Ids the model accepted, or empty when the reply was not a usable array.
fn accepted_ids(raw: &str) -> Vec<String> {
    match extract_json(raw, ExpectedShape::Array) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Ok(_) => Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "could not recover id array from model reply");
            Vec::new()
        }
    }
}

fn name_matches_denylist(tables: &TriageTables, name: &str) -> bool {
    let lower = name.to_lowercase();
    tables
        .non_medical_keywords
        .iter()
        .any(|keyword| lower.contains(keyword.as_str()))
}

fn build_filter_prompt(places: &[Place]) -> String {
    let names: Vec<IdName> = places
        .iter()
        .map(|p| IdName {
            id: p.canonical_id(),
            name: &p.name,
        })
        .collect();
    let listing = serde_json::to_string_pretty(&names).unwrap_or_default();

    format!(
        r#"Analiza esta lista de lugares y responde SOLO con un array JSON de los IDs de los que sean EXCLUSIVAMENTE centros médicos, hospitales, clínicas, consultorios o farmacias reales.

REGLAS ESTRICTAS:
- INCLUIR solo: hospitales, clínicas, centros médicos, consultorios médicos, farmacias, laboratorios médicos
- EXCLUIR: talleres, gomerías, comercios, bancos, escuelas, iglesias, oficinas, estaciones de servicio, cualquier lugar no médico
- Si el nombre contiene palabras como "taller", "moto", "auto", "gomería", "comercio", "banco", "escuela", "iglesia", etc., NO incluirlo
- Si tienes dudas sobre si es médico o no, NO incluirlo

IMPORTANTE: Responde SOLO con el array JSON, sin ningún texto adicional ni bloques de código.

Lista de lugares:
{listing}
"#
    )
}
