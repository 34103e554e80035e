use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::llm::{ClassifierError, LlmClient};

/// Replays canned replies in order and records every prompt it was sent.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, ClassifierError>>>,
    prompts: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedClient {
    pub fn replying<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Result<S, ClassifierError>>,
        S: Into<String>,
    {
        let replies = replies.into_iter().map(|reply| reply.map(Into::into)).collect();
        Arc::new(Self { replies: Mutex::new(replies), prompts: Mutex::new(Vec::new()) })
    }

    pub fn prompts(&self) -> Vec<(String, Option<String>)> {
        self.prompts.lock().map(|prompts| prompts.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, prompt: &str, context: Option<&str>) -> Result<String, ClassifierError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push((prompt.to_string(), context.map(str::to_string)));
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or(Err(ClassifierError::Disabled))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
