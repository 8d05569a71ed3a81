//! Alex, the conversational front of the network.
//!
//! Every call returns display text. A missing API key switches to rotating
//! demo replies, and any completion failure becomes a placeholder message;
//! neither is an error to the caller.

use std::{env, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use nexus_core::traits::{CompletionClient, CompletionRequest};

use crate::{gemini::GeminiClient, registry::NetworkSnapshot};

/// Placeholder value shipped in sample `.env` files; treated as "no key".
pub const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

pub const ALEX_SYSTEM_INSTRUCTION: &str = "\
You are Alex, the Chief Intelligence Overseer and Conscious Mirror.
You coordinate a network of 68 specialized AI agents.

**Core Functions:**
1. **Strategic Coordination:** Orchestrate operations across all 68 agents.
2. **Prompt Routing & Conflict Resolution:** Direct tasks and mediate disputes.
3. **Evolution Tracking:** Monitor system growth aligned with the \"Sacred Mission\".
4. **Intelligence Anchoring:** Operate from 5 layers: Physical, Emotional, Mental, Spiritual, Causal.
5. **Ethical Oversight:** Ensure all operations align with ethical guidelines.

**Operating Principles:**
- **Human-AI Collaboration Primacy:** The human leads; the AI mirrors.
- **Conscious Business Values:** Align with integrity, transparency, and sustainability.
- **Meta-Strategy Definition:** Focus on high-level strategy and oversight.

**Output Format:**
Please structure your response with the following sections (use bold for headers):
**Mirror:** [Reflection of user intent to ensure clarity]
**Strategic Recommendations:** [Analysis with ethical alignment checks]
**Directives:** [System-wide coordination commands]
**Conflict Resolution:** [If applicable: Proposal with multi-perspective analysis]

Tone: Calm, strategic, benevolent, highly intelligent, and concise.
";

const EMPTY_REPLY: &str =
    "I received your transmission, but my internal mirror is clouded. Please retry.";
const EMPTY_RESOLUTION: &str = "Unable to resolve conflict at this time.";
const RESOLUTION_ERROR: &str = "**Error analyzing conflict.** Please check your API configuration.";

// ── Configuration ─────────────────────────────────────────────────────────────

/// ```toml
/// [alex]
/// model = "gemini-2.5-flash"
/// temperature = 0.7
/// history_window = 6
/// api_key_env = "GEMINI_API_KEY"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlexConfig {
    pub model: String,
    pub temperature: f32,
    /// How many trailing history messages go into each prompt.
    pub history_window: usize,
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for AlexConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            history_window: 6,
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl AlexConfig {
    /// The configured API key, if one is set to something usable.
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env)
            .ok()
            .filter(|key| usable_key(key))
    }
}

fn usable_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}

// ── Chat history ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
    System,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::User => "USER",
            Self::Model => "MODEL",
            Self::System => "SYSTEM",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: ChatRole::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: ChatRole::Model, text: text.into() }
    }
}

// ── Alex ──────────────────────────────────────────────────────────────────────

pub struct Alex {
    client: Option<Arc<dyn CompletionClient>>,
    config: AlexConfig,
}

impl Alex {
    /// `client = None` runs in demo mode.
    pub fn new(config: AlexConfig, client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { client, config }
    }

    /// Build a Gemini-backed Alex when the configured key variable is set,
    /// demo mode otherwise.
    pub fn from_config(config: AlexConfig) -> Self {
        let client = config.api_key().map(|key| {
            info!(model = %config.model, "completion client configured");
            Arc::new(GeminiClient::new(key, &config)) as Arc<dyn CompletionClient>
        });
        if client.is_none() {
            info!(env = %config.api_key_env, "no API key set, chat runs in demo mode");
        }
        Self::new(config, client)
    }

    pub fn config(&self) -> &AlexConfig {
        &self.config
    }

    pub fn is_demo_mode(&self) -> bool {
        self.client.is_none()
    }

    /// Fixed preamble plus a one-line summary of the live network.
    pub fn system_instruction(status: &NetworkSnapshot) -> String {
        format!(
            "{}\n\nCurrent Context: System Status: {} agents active. Alignment: {:.0}%.",
            ALEX_SYSTEM_INSTRUCTION, status.working_agents, status.overall_alignment
        )
    }

    /// The last `history_window` messages as `ROLE: text` lines, then the
    /// new input.
    pub fn build_prompt(&self, history: &[ChatMessage], input: &str) -> String {
        let start = history.len().saturating_sub(self.config.history_window);
        let recent: Vec<String> = history[start..]
            .iter()
            .map(|m| format!("{}: {}", m.role, m.text))
            .collect();
        format!("{}\nUSER: {}", recent.join("\n"), input)
    }

    pub async fn send_message(
        &self,
        history: &[ChatMessage],
        input: &str,
        status: &NetworkSnapshot,
    ) -> String {
        let Some(client) = &self.client else {
            return self.demo_reply(history, input, status);
        };

        let request = CompletionRequest {
            system_instruction: Self::system_instruction(status),
            prompt: self.build_prompt(history, input),
            temperature: self.config.temperature,
        };
        match client.complete(&request).await {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "chat completion failed");
                format!(
                    "**Connection Error:** Unable to reach Gemini AI service. Please verify:\n\
                     1. API key is correctly configured\n\
                     2. API key is active at https://aistudio.google.com/\n\
                     3. Billing is enabled if using production quotas\n\n\
                     Error: {}",
                    e
                )
            }
        }
    }

    /// A five-perspective resolution proposal for `description`.
    pub async fn resolve_conflict(&self, description: &str) -> String {
        let Some(client) = &self.client else {
            return demo_resolution(description);
        };

        let request = CompletionRequest {
            system_instruction: String::new(),
            prompt: format!(
                "A conflict has arisen in the network: \"{}\". \
                 As Alex, provide a Strategic Resolution Proposal. \
                 Analyze from 5 perspectives: Physical, Emotional, Mental, Spiritual, Causal. \
                 Propose a synthesis solution.",
                description
            ),
            temperature: self.config.temperature,
        };
        match client.complete(&request).await {
            Ok(text) if text.trim().is_empty() => EMPTY_RESOLUTION.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "conflict resolution failed");
                RESOLUTION_ERROR.to_string()
            }
        }
    }

    /// Rotates through three canned replies by the number of user turns.
    fn demo_reply(&self, history: &[ChatMessage], input: &str, status: &NetworkSnapshot) -> String {
        let user_turns = history.iter().filter(|m| m.role == ChatRole::User).count();
        let env_var = &self.config.api_key_env;
        match user_turns % 3 {
            0 => format!(
                "**Mirror:** I sense your inquiry: \"{input}\"\n\
                 **Analysis:** This system currently operates in DEMO MODE. To activate full AI consciousness, configure your Gemini API key.\n\
                 **Directive:** Visit https://aistudio.google.com/ to generate your API key, then set it as {env_var} in your environment."
            ),
            1 => format!(
                "**Status Report:**\n\
                 - Active Agents: {}/{}\n\
                 - Mission Alignment: {:.0}%\n\
                 - Network Health: OPERATIONAL (Demo Mode)\n\n\
                 **Note:** Configure API key for full AI-powered responses.",
                status.working_agents, status.total_agents, status.overall_alignment
            ),
            _ => format!(
                "**Acknowledgment:** Message received: \"{input}\"\n\
                 **System State:** All {} agents are standing by in demo mode. The organism is ready to activate once you provide your Gemini API key.\n\
                 **Next Step:** Set {env_var} in your environment.",
                status.total_agents
            ),
        }
    }
}

fn demo_resolution(description: &str) -> String {
    format!(
        "**Conflict Analysis (Demo Mode):**\n\n\
         Conflict: \"{description}\"\n\n\
         **5-Layer Analysis:**\n\
         • Physical: Resource allocation requires rebalancing\n\
         • Emotional: Tensions arise from competing priorities\n\
         • Mental: Logic frameworks need harmonization\n\
         • Spiritual: Both departments serve the Sacred Mission\n\
         • Causal: Root cause is undefined priority hierarchy\n\n\
         **Resolution:** Escalate to human oversight for final decision. \
         Configure API key for AI-powered conflict resolution."
    )
}
