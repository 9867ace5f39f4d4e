use async_trait::async_trait;
use serde_json::json;
use std::fmt;

use bp_core::{Result, TextModel};

use crate::extract::extract_first_json;
use crate::generator::read_body;

/// Offline model producing well-formed answers for both generation stages.
/// Useful for demos and for running the pipeline without a credential.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }

    fn draft(keyword: &str) -> String {
        let title = format!("A Practical Guide to {}", keyword);
        let paragraphs = [
            format!("{} shows up everywhere once you start looking for it.", keyword),
            format!("Start small: pick one part of {} and practise it every day.", keyword),
            format!("Track what works, drop what does not, and revisit {} every month.", keyword),
        ];
        let content = format!(
            "<h1>{}</h1><h2>Why it matters</h2><p>{}</p><h2>Getting started</h2><p>{}</p><h3>Keep going</h3><p>{}</p>",
            title, paragraphs[0], paragraphs[1], paragraphs[2]
        );
        json!({
            "primaryKeyword": format!("{} for beginners", keyword),
            "trendingKeywords": [format!("{} trends", keyword)],
            "longTailKeywords": [format!("how to get started with {}", keyword)],
            "questionKeywords": [format!("what is {}", keyword)],
            "title": title,
            "excerpt": format!("A short, practical introduction to {} with steps you can use today.", keyword),
            "content": content,
            "cleanText": format!("{}. {}", title, paragraphs.join(" ")),
        })
        .to_string()
    }

    fn refine(prompt: &str) -> String {
        // The embedded draft is the first object of the prompt.
        match extract_first_json(prompt).map(|value| read_body(&value)) {
            Some(body) => json!({
                "title": body.title,
                "excerpt": body.excerpt,
                "content": body.content,
                "cleanText": body.clean_text,
            })
            .to_string(),
            None => String::new(),
        }
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

fn keyword_in(prompt: &str) -> Option<&str> {
    let rest = prompt.split("User keyword: \"").nth(1)?;
    rest.split('"').next()
}

#[async_trait]
impl TextModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(match keyword_in(prompt) {
            Some(keyword) => Self::draft(keyword),
            None => Self::refine(prompt),
        })
    }
}
