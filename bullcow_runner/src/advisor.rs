//! A remote advisor that asks a chat model for the next guess.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use bullcow_rs::{
    advisor::Advisor,
    strategy::{Code, History, Move},
    AdvisorError, BullcowError,
};

/// Asks an OpenAI-compatible chat completion endpoint for advice.
///
/// The advisor sends the whole transcript of scored guesses and expects a
/// JSON object holding the next guess and a line of digit-free banter.
/// Anything else comes back as an [`AdvisorError`], which
/// [`Assisted`](bullcow_rs::advisor::Assisted) covers with its fallback
/// strategy.
pub struct ChatAdvisor {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct Advice {
    guess: String,
    banter: String,
}

impl ChatAdvisor {
    /// Builds an advisor from the environment.
    ///
    /// Reads `BULLCOW_API_KEY` (or `OPENAI_API_KEY`) for the credential,
    /// with `BULLCOW_API_URL` and `BULLCOW_MODEL` overriding the endpoint
    /// and model.
    pub fn from_env() -> Result<Self, AdvisorError> {
        let api_key = std::env::var("BULLCOW_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| {
                AdvisorError::Unavailable(
                    "no BULLCOW_API_KEY or OPENAI_API_KEY in the environment".into(),
                )
            })?;

        let endpoint = std::env::var("BULLCOW_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".into());
        let model = std::env::var("BULLCOW_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AdvisorError::Transport(Box::new(e)))?;

        Ok(ChatAdvisor {
            client,
            endpoint,
            model,
            api_key,
        })
    }

    fn prompt(history: &History) -> String {
        let mut prompt = String::from(
            "You are playing Bulls and Cows against a human. \
             The secret is three distinct decimal digits.\n",
        );

        if history.is_empty() {
            prompt.push_str(
                "This is your first guess, so open with any three distinct digits and say hello.\n",
            );
        } else {
            prompt.push_str("Here is how your guesses have been answered so far:\n");
            for (i, turn) in history.turns().iter().enumerate() {
                prompt.push_str(&format!("Guess {}: {}\n", i + 1, turn));
            }
        }

        prompt.push_str(
            "Reply with JSON of the form {\"guess\": \"...\", \"banter\": \"...\"}. \
             The guess must be three distinct digits that fit every answer above. \
             The banter is one short competitive sentence and must not mention any digit.\n",
        );

        prompt
    }

    fn parse_reply(body: &str) -> Result<Move, AdvisorError> {
        let completion: Completion =
            serde_json::from_str(body).map_err(|e| AdvisorError::Malformed(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| AdvisorError::Malformed("the reply has no choices".into()))?;

        // Some models wrap the JSON in a markdown fence.
        let content = content.trim();
        let content = content
            .strip_prefix("```json")
            .or_else(|| content.strip_prefix("```"))
            .and_then(|inner| inner.strip_suffix("```"))
            .unwrap_or(content)
            .trim();

        let advice: Advice =
            serde_json::from_str(content).map_err(|e| AdvisorError::Malformed(e.to_string()))?;

        let code = match Code::from_str(&advice.guess) {
            Ok(code) => code,
            Err(BullcowError::Code { kind }) => return Err(AdvisorError::IllegalCode(kind)),
            Err(e) => return Err(AdvisorError::Malformed(e.to_string())),
        };

        Ok(Move::new(code, advice.banter))
    }
}

impl Advisor for ChatAdvisor {
    fn advise(&self, history: &History) -> Result<Move, AdvisorError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": Self::prompt(history) }
            ],
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| AdvisorError::Transport(Box::new(e)))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| AdvisorError::Transport(Box::new(e)))?;

        if !status.is_success() {
            return Err(AdvisorError::Malformed(format!(
                "the endpoint answered {}: {}",
                status, text
            )));
        }

        Self::parse_reply(&text)
    }
}

// The credential stays out of debug output.
impl fmt::Debug for ChatAdvisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatAdvisor")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
