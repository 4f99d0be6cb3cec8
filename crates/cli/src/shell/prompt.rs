use nu_ansi_term::Color;
use reedline::{Prompt, PromptEditMode, PromptHistorySearch};
use std::borrow::Cow;

pub struct DefaultPrompt {
    module: String,
    prefix: Option<String>,
}

impl DefaultPrompt {
    pub fn new(module: String, prefix: Option<String>) -> Self {
        Self { module, prefix }
    }
}

impl Prompt for DefaultPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        let name = Color::LightBlue.bold().paint("keyscope");
        let module = Color::Green.paint(&self.module);
        let path = match &self.prefix {
            Some(prefix) if prefix.len() > 30 => shorten_key(prefix),
            Some(prefix) => prefix.clone(),
            None => "/".to_string(),
        };
        Cow::Owned(format!("{} {} {} > ", name, module, Color::Yellow.paint(path)))
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(".. ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("(search) ")
    }
}

/// Abbreviates all but the last two segments: `s.d.hikari.pool-name`.
fn shorten_key(key: &str) -> String {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() <= 2 {
        return key.to_string();
    }
    let keep = parts.len() - 2;
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if i < keep {
                part.chars().next().map(String::from).unwrap_or_default()
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
