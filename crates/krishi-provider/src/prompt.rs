/// Default assistant persona.
pub const DEFAULT_ASSISTANT_NAME: &str = "Krishi Mitra";

/// Default region named in the prompt.
pub const DEFAULT_REGION: &str = "Kerala, India";

/// The fixed instructional prompt placed before every user question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorPrompt {
    assistant_name: String,
    region: String,
}

impl Default for AdvisorPrompt {
    fn default() -> Self {
        Self::new(DEFAULT_ASSISTANT_NAME, DEFAULT_REGION)
    }
}

impl AdvisorPrompt {
    pub fn new(assistant_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Render the full prompt. `question` is appended as-is.
    pub fn render(&self, question: &str) -> String {
        format!(
            "You are {name}, an AI assistant helping farmers in {region}.\n\
             Provide helpful, practical agricultural advice. \
             Keep responses simple and easy to understand.\n\
             \n\
             User question: {question}",
            name = self.assistant_name,
            region = self.region,
        )
    }
}
