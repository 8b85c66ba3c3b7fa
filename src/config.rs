//! Configuration: Gemini connection settings and the tunable heuristic
//! tables used by the classification and filtering stages.
//!
//! The heuristics are language- and domain-specific word lists (tuned for
//! Spanish), kept as data rather than inline constants so deployments can
//! adjust them without touching the algorithms.

use std::env;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini REST endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for every call site.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Bound on a single blocking round trip.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the Gemini gateway.
///
/// The credential is read once at construction and never re-read from the
/// environment afterwards.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    /// Read the API key from the environment; everything else defaults.
    pub fn from_env() -> Self {
        Self {
            api_key: env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

/// Heuristic word tables for the gibberish classifier and the facility
/// denylist. Defaults match Spanish orthography and the keyword lists the
/// assistant ships with.
#[derive(Debug, Clone)]
pub struct TriageTables {
    /// Exact-match greetings that are never treated as gibberish.
    pub greeting_whitelist: Vec<String>,
    /// Vowel characters, including accented Spanish forms.
    pub vowels: Vec<char>,
    /// Name substrings that disqualify a place from being a medical facility.
    pub non_medical_keywords: Vec<String>,
}

impl Default for TriageTables {
    fn default() -> Self {
        Self {
            greeting_whitelist: owned(&[
                "hola",
                "hola xana",
                "buenas",
                "buenos días",
                "buenas tardes",
                "buenas noches",
                "saludos",
                "hey",
            ]),
            vowels: vec!['a', 'e', 'i', 'o', 'u', 'á', 'é', 'í', 'ó', 'ú'],
            non_medical_keywords: owned(&[
                "taller",
                "moto",
                "auto",
                "vehículo",
                "vehiculo",
                "gomería",
                "gomeria",
                "lubricentro",
                "garage",
                "comercio",
                "banco",
                "escuela",
                "colegio",
                "universidad",
                "iglesia",
                "templo",
                "oficina",
                "estación",
                "estacion",
                "servicio técnico",
                "servicio tecnico",
                "electrónica",
                "electronica",
                "computadora",
                "pc",
                "informática",
                "informatica",
                "repuesto",
                "accesorio",
                "accesorios",
            ]),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
