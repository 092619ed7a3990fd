//! crates/podcast_core/src/prompt.rs
//!
//! Builds the broadcast prompt sent to the completion model.

use crate::domain::Article;

/// The fixed persona for the completion model.
pub const NEWS_ANCHOR_PERSONA: &str = "You are a professional news anchor with years of experience in broadcast journalism. Create engaging, clear, and professional news scripts.";

/// Longest story body, in characters, copied into the prompt.
pub const MAX_STORY_CHARS: usize = 4000;

const NO_CONTENT: &str = "No content available";

/// Formats the ordered articles into the user prompt.
///
/// The output depends only on the input: stories keep their order and are
/// numbered from 1.
pub fn build_news_prompt(articles: &[Article]) -> String {
    let mut stories = String::new();
    for (i, article) in articles.iter().enumerate() {
        let body = article.body().map(truncate_chars).unwrap_or(NO_CONTENT);
        stories.push_str(&format!(
            "\nStory {}: {}\nSource: {}\nContent: {}\n---\n",
            i + 1,
            article.title,
            article.source(),
            body
        ));
    }

    format!(
        "You are a professional news anchor creating a 2-3 minute broadcast script.

Create a politically neutral, natural and engaging news broadcast from these {count} top stories:
{stories}
Requirements:
- Start with a warm greeting and introduction (Your company: Neutral Network)
- This is a monologue, so never need to label who is saying what (i.e. no need to say Anchor: text, just say text)
- No settings or exposition (no need to say intro music, outro music, etc.)
- Present each story in a conversational, professional tone
- Use smooth transitions between stories
- Keep it concise but informative
- End with a brief closing statement

The complete script",
        count = articles.len(),
    )
}

fn truncate_chars(text: &str) -> &str {
    match text.char_indices().nth(MAX_STORY_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
