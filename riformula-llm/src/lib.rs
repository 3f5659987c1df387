//! Riformula LLM - Generation Provider Layer
//!
//! Provider-agnostic trait for the formal-rewrite generation call, the
//! sampling parameters the orchestrator escalates on retry, and the prompt
//! assembly (system rules + few-shot examples). The concrete OpenRouter
//! implementation lives under `providers`.

use async_trait::async_trait;
use riformula_core::{RiformulaResult, UpstreamError};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

pub mod providers;

pub use providers::{OpenRouterClient, OpenRouterGenerationProvider};

// ============================================================================
// SAMPLING PARAMETERS
// ============================================================================

/// Sampling parameters forwarded to the chat-completions call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: i32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl SamplingParams {
    /// Baseline parameters for a first generation attempt.
    pub fn base() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.9,
            max_tokens: 500,
            frequency_penalty: 0.1,
            presence_penalty: 0.1,
        }
    }

    /// Looser parameters for a regeneration after negative feedback.
    pub fn regeneration() -> Self {
        Self {
            temperature: 0.7,
            frequency_penalty: 0.3,
            presence_penalty: 0.3,
            ..Self::base()
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::base()
    }
}

// ============================================================================
// GENERATION REQUEST & PROVIDER TRAIT
// ============================================================================

/// A single generation request as seen by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_input: String,
    pub params: SamplingParams,
}

/// Trait for generation providers.
/// Implementations must be thread-safe (Send + Sync).
///
/// # Example
/// ```ignore
/// struct MyProvider { /* ... */ }
///
/// #[async_trait]
/// impl GenerationProvider for MyProvider {
///     async fn generate(&self, request: &GenerationRequest) -> RiformulaResult<String> {
///         // Call the upstream chat-completions API
///     }
///     fn model_id(&self) -> &str { "my/model" }
/// }
/// ```
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Produce the rewritten text for one request.
    ///
    /// # Returns
    /// * `Ok(String)` - The raw completion text (not yet post-processed)
    /// * `Err(RiformulaError::Upstream)` - Auth, rate-limit, timeout or
    ///   malformed-response failures
    async fn generate(&self, request: &GenerationRequest) -> RiformulaResult<String>;

    /// The model identifier requests are sent to.
    fn model_id(&self) -> &str;

    /// Probe upstream credentials without spending a completion.
    /// Providers with no cheap probe report success.
    async fn auth_check(&self) -> RiformulaResult<()> {
        Ok(())
    }
}

// ============================================================================
// PROMPT ASSEMBLY
// ============================================================================

/// Few-shot pairs teaching the expected register.
pub const FEW_SHOT_EXAMPLES: &[(&str, &str)] = &[
    (
        "creazione utente richiesto + settaggio impostazioni rds",
        "Creazione dell'utenza richiesta con configurazione dei parametri RDS.",
    ),
    ("presidio zara", "Presidio tecnico presso il punto vendita Zara."),
    (
        "supporto outlook + ticket aperto",
        "Fornito supporto per Outlook e apertura del ticket di assistenza.",
    ),
];

/// Builds the system prompt for a rewrite, with an optional regeneration
/// addendum quoting a rejected previous output.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    rejected_output: Option<String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark this prompt as a regeneration after the given output was
    /// rejected; the prompt will demand a different formulation.
    pub fn with_rejected_output(mut self, previous: impl Into<String>) -> Self {
        self.rejected_output = Some(previous.into());
        self
    }

    /// Assemble the full system prompt.
    pub fn system_prompt(&self) -> String {
        let mut prompt = String::from(
            "Sei un esperto sistemista IT con oltre 10 anni di esperienza nella redazione tecnica professionale. \
             Il tuo compito è riformulare la descrizione tecnica che riceverai in una versione professionale. \
             Segui scrupolosamente queste regole:\
             \n1. Mantieni il significato originale della frase\
             \n2. Usa un linguaggio tecnico corretto, formale e conciso\
             \n3. Elimina abbreviazioni e frasi colloquiali\
             \n4. Rendi chiaro cosa è stato fatto, su quale sistema, e con quale risultato\
             \n5. IMPORTANTE: Rispondi ESCLUSIVAMENTE con la descrizione riformulata, senza spiegazioni, commenti o ragionamenti\
             \n6. Non aggiungere mai frasi introduttive o conclusive\
             \n7. Non includere il tuo processo di ragionamento nella risposta\
             \n8. Non iniziare mai con 'Ecco la versione riformulata:' o frasi simili",
        );

        if let Some(previous) = &self.rejected_output {
            prompt.push_str(&format!(
                "\n\nIMPORTANTE: La seguente è una rigenerazione. \
                 Un utente ha dato un feedback negativo alla risposta precedente: \n\n\"{}\"\n\n\
                 Genera una risposta DIVERSA e MIGLIORE dalla precedente, \
                 evitando gli stessi pattern e formulazioni.",
                previous
            ));
        }

        prompt
    }

    pub fn is_regeneration(&self) -> bool {
        self.rejected_output.is_some()
    }
}

// ============================================================================
// SCRIPTED PROVIDER FOR TESTING
// ============================================================================

/// Deterministic provider for tests: serves queued responses in order and
/// records every request it receives.
pub struct ScriptedProvider {
    model_id: String,
    script: Mutex<VecDeque<RiformulaResult<String>>>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful completion.
    pub fn enqueue(&self, output: impl Into<String>) {
        self.script
            .lock()
            .expect("script lock")
            .push_back(Ok(output.into()));
    }

    /// Queue a failure.
    pub fn enqueue_error(&self, error: riformula_core::RiformulaError) {
        self.script.lock().expect("script lock").push_back(Err(error));
    }

    /// Number of generate() calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    /// Snapshot of every request received, in order.
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Sampling parameters of the most recent call, if any.
    pub fn last_params(&self) -> Option<SamplingParams> {
        self.calls
            .lock()
            .expect("calls lock")
            .last()
            .map(|call| call.params)
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn generate(&self, request: &GenerationRequest) -> RiformulaResult<String> {
        self.calls.lock().expect("calls lock").push(request.clone());
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| {
                Err(UpstreamError::NoResponse {
                    provider: "scripted".to_string(),
                    reason: "script exhausted".to_string(),
                }
                .into())
            })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl std::fmt::Debug for ScriptedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedProvider")
            .field("model_id", &self.model_id)
            .field("calls", &self.call_count())
            .finish()
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
