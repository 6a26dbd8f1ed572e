//! Multi-turn chat session kept client-side; every turn resends the history.

use super::{ChatService, Content, GeminiError, GenerateRequest, Part};

#[derive(Debug, Clone)]
pub struct ChatSession {
    model: String,
    system_instruction: Option<String>,
    history: Vec<Content>,
}

impl ChatSession {
    pub fn start(model: impl Into<String>, system_instruction: Option<String>, history: Vec<Content>) -> Self {
        Self { model: model.into(), system_instruction, history }
    }

    #[cfg(test)]
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    fn request(&self) -> GenerateRequest {
        GenerateRequest {
            system_instruction: self
                .system_instruction
                .as_ref()
                .map(|s| Content { role: None, parts: vec![Part::text(s.clone())] }),
            contents: self.history.clone(),
        }
    }

    /// Send one user message and return the model's reply.
    ///
    /// On failure the pending user turn is dropped so the session can be retried.
    pub async fn send_message<S>(&mut self, service: &S, text: &str) -> Result<String, GeminiError>
    where
        S: ChatService + ?Sized,
    {
        self.history.push(Content::user(vec![Part::text(text)]));
        match service.generate(&self.model, &self.request()).await {
            Ok(reply) => {
                self.history.push(Content::model(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }
}
