//! Service facade consumed by the routing layer.
//!
//! Holds the gateway client and the heuristic tables; nothing else. Every
//! request is handled independently with at most one blocking model call,
//! and the credential is read once when the service is built.

use crate::config::{GeminiConfig, TriageTables};
use crate::llm::{GeminiClient, GenerationParams, TextGenerate};
use crate::models::{ChatMessage, Place, RecommendationResult, TriageRequest, TriageResult};
use crate::pipeline::{classify, extract, filter, format, prompt, recommend, TriageError};

pub struct TriageService<C = GeminiClient> {
    client: C,
    tables: TriageTables,
}

impl TriageService<GeminiClient> {
    /// Production service: credential from the environment, default tables.
    pub fn from_env() -> Self {
        Self::with_client(GeminiClient::from_env(), TriageTables::default())
    }

    pub fn new(config: &GeminiConfig, tables: TriageTables) -> Self {
        Self::with_client(GeminiClient::new(config), tables)
    }
}

impl<C: TextGenerate> TriageService<C> {
    /// Inject any gateway implementation (tests use `MockTextClient`).
    pub fn with_client(client: C, tables: TriageTables) -> Self {
        Self { client, tables }
    }

    /// Analyze a symptom description and produce a triage judgment.
    ///
    /// Gibberish input is answered locally without a model call. Extraction
    /// trouble never surfaces: an unrecoverable reply degrades to the
    /// medium-urgency default result.
    pub fn analyze_symptoms(&self, request: &TriageRequest) -> Result<TriageResult, TriageError> {
        if request.symptoms.trim().is_empty() {
            return Err(TriageError::Validation("symptoms text is required".into()));
        }

        if classify::is_gibberish(&self.tables, &request.symptoms) {
            tracing::debug!("input classified as gibberish; skipping model call");
            return Ok(format::gibberish_result());
        }

        let prompt_text = prompt::build_medical_prompt(
            &request.symptoms,
            request.location.as_ref(),
            &request.history,
        );
        let raw = self.client.generate(&prompt_text, &GenerationParams::TRIAGE)?;

        let result = match extract::extract_json(&raw, extract::ExpectedShape::Object) {
            Ok(value) => format::to_result(&format::decode_judgment(value)),
            Err(e) => {
                tracing::warn!(error = %e, "triage judgment unrecoverable; using default result");
                format::failure_result()
            }
        };
        Ok(result)
    }

    /// Probe the model endpoint. Never fails: any problem reports `false`.
    pub fn test_connectivity(&self) -> bool {
        match self.client.generate("Test message", &GenerationParams::PROBE) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "connectivity probe failed");
                false
            }
        }
    }

    /// Keep only genuine medical facilities from a candidate list.
    pub fn filter_medical_centers(&self, places: &[Place]) -> Result<Vec<Place>, TriageError> {
        if places.is_empty() {
            return Err(TriageError::Validation(
                "a non-empty places list is required".into(),
            ));
        }
        filter::filter_medical_centers(&self.client, &self.tables, places)
    }

    /// Rank open facilities for the situation described in the history.
    pub fn recommend_medical_centers(
        &self,
        places: &[Place],
        history: &[ChatMessage],
    ) -> Result<RecommendationResult, TriageError> {
        if places.is_empty() {
            return Err(TriageError::Validation(
                "a non-empty places list is required".into(),
            ));
        }
        recommend::recommend_medical_centers(&self.client, places, history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockTextClient;
    use crate::models::{ClientAction, Urgency};

    fn service(client: MockTextClient) -> TriageService<MockTextClient> {
        init_tracing();
        TriageService::with_client(client, TriageTables::default())
    }

    /// Route pipeline warnings through the test writer (RUST_LOG to see them).
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn empty_symptoms_are_rejected_before_any_call() {
        let svc = service(MockTextClient::new("{}"));
        let err = svc
            .analyze_symptoms(&TriageRequest::new("   "))
            .unwrap_err();
        assert!(matches!(err, TriageError::Validation(_)));
    }

    #[test]
    fn gibberish_is_answered_without_a_model_call() {
        let svc = service(MockTextClient::new("{}"));
        let result = svc
            .analyze_symptoms(&TriageRequest::new("xjkqwzbnmplrtsfghqwrtzxcvbnmqwzx"))
            .unwrap();
        assert!(result.content.contains("no logré entender"));
        assert_eq!(result.urgency, None);
        // The mock was never reached.
        let TriageService { client, .. } = svc;
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn full_triage_path_decodes_a_fenced_reply() {
        let reply = "```json\n{\"urgencia\": \"ALTO\", \"explicacion_urgencia\": \"dificultad para respirar\", \"mensaje_principal\": \"Busca ayuda ya.\", \"recomendaciones\": [\"Llama a emergencias\"], \"especialidades\": [\"Neumonología\"]}\n```";
        let svc = service(MockTextClient::new(reply));
        let result = svc
            .analyze_symptoms(&TriageRequest::new("no puedo respirar bien desde hace una hora"))
            .unwrap();
        assert_eq!(result.urgency, Some(Urgency::Alto));
        assert_eq!(result.recommendations, vec!["Llama a emergencias"]);
        assert_eq!(result.specialties, vec!["Neumonología"]);
        assert!(result.content.contains("Nivel de urgencia: ALTO"));
    }

    #[test]
    fn pharmacy_reply_maps_to_action() {
        let reply = r#"{"mensaje_principal": "Aquí tienes un acceso directo.", "accion": "mostrar_farmacias"}"#;
        let svc = service(MockTextClient::new(reply));
        let result = svc
            .analyze_symptoms(&TriageRequest::new("dime farmacias cercanas abiertas por favor"))
            .unwrap();
        assert_eq!(result.action, Some(ClientAction::ShowPharmacies));
        assert_eq!(result.urgency, None);
    }

    #[test]
    fn unrecoverable_reply_degrades_to_default_result() {
        let svc = service(MockTextClient::new("lo siento, hubo un problema"));
        let result = svc
            .analyze_symptoms(&TriageRequest::new("tengo fiebre y dolor de garganta"))
            .unwrap();
        assert_eq!(result.urgency, Some(Urgency::Medio));
        assert!(result.content.contains("tuve un problema"));
    }

    #[test]
    fn upstream_failure_propagates_from_analyze() {
        let svc = service(MockTextClient::failing());
        let err = svc
            .analyze_symptoms(&TriageRequest::new("tengo fiebre y dolor de garganta"))
            .unwrap_err();
        assert!(matches!(err, TriageError::Upstream { .. }));
    }

    #[test]
    fn connectivity_probe_reports_boolean() {
        assert!(service(MockTextClient::new("ok")).test_connectivity());
        assert!(!service(MockTextClient::failing()).test_connectivity());
        assert!(!service(MockTextClient::unconfigured()).test_connectivity());
    }

    #[test]
    fn empty_places_are_rejected() {
        let svc = service(MockTextClient::new("[]"));
        assert!(matches!(
            svc.filter_medical_centers(&[]).unwrap_err(),
            TriageError::Validation(_)
        ));
        assert!(matches!(
            svc.recommend_medical_centers(&[], &[]).unwrap_err(),
            TriageError::Validation(_)
        ));
    }
}
