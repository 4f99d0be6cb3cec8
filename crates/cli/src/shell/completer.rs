use super::context::ShellContext;
use reedline::{Completer, Span, Suggestion};

/// Commands whose arguments are configuration keys.
const KEY_COMMANDS: &[&str] = &["lookup", "complete", "values", "check", "cd"];

/// Limit to keep the completion menu usable
const MAX_SUGGESTIONS: usize = 50;

pub struct KeyscopeCompleter {
    pub commands: Vec<String>,
    pub context: ShellContext,
}

impl KeyscopeCompleter {
    pub fn new(commands: Vec<String>, context: ShellContext) -> Self {
        Self { commands, context }
    }

    fn suggestion(value: String, description: Option<String>, span: Span) -> Suggestion {
        Suggestion {
            value,
            description,
            style: None,
            extra: None,
            span,
            append_whitespace: false,
            match_indices: None,
        }
    }

    /// Completes the key `word`, keeping the spelling the user typed for
    /// everything up to its last complete segment.
    fn complete_key(&self, word: &str, span: Span) -> Vec<Suggestion> {
        let full = self.context.resolve_key(word);
        let (parent, query) = if word.is_empty() || word.ends_with('.') || word == "/" {
            (full.trim_end_matches('.').to_string(), String::new())
        } else {
            match full.rsplit_once('.') {
                Some((parent, query)) => (parent.to_string(), query.to_string()),
                None => (String::new(), full.clone()),
            }
        };
        let typed_head = match word.rfind('.') {
            Some(i) => &word[..=i],
            None if word.starts_with('/') => "/",
            None => "",
        };

        self.context
            .module()
            .suggest_keys(&parent, &query)
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|s| {
                Self::suggestion(
                    format!("{}{}", typed_head, s.insert_text()),
                    s.description().map(str::to_string),
                    span,
                )
            })
            .collect()
    }

    fn complete_value(&self, property: &str, word: &str, span: Span) -> Vec<Suggestion> {
        let name = self.context.resolve_key(property);
        self.context
            .module()
            .suggest_values(&name, word)
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|v| Self::suggestion(v.value, v.one_line_description, span))
            .collect()
    }
}

impl Completer for KeyscopeCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let line = &line[..pos.min(line.len())];
        let trimmed = line.trim_start();

        // 1. Command completion (at start of line)
        if !trimmed.contains(' ') {
            return self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(trimmed))
                .map(|cmd| Suggestion {
                    append_whitespace: true,
                    ..Self::suggestion(
                        cmd.clone(),
                        None,
                        Span {
                            start: pos - trimmed.len(),
                            end: pos,
                        },
                    )
                })
                .collect();
        }

        // 2. Argument completion
        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        let cmd = parts[0];
        if !KEY_COMMANDS.contains(&cmd) {
            return Vec::new();
        }
        let last_word = if line.ends_with(' ') {
            ""
        } else {
            parts.last().copied().unwrap_or("")
        };
        let span = Span {
            start: pos - last_word.len(),
            end: pos,
        };
        let arg_index = if line.ends_with(' ') {
            parts.len()
        } else {
            parts.len() - 1
        };

        match (cmd, arg_index) {
            ("values", 2) => self.complete_value(parts[1], last_word, span),
            ("values" | "lookup" | "cd" | "complete", 1) | ("check", _) => {
                self.complete_key(last_word, span)
            }
            _ => Vec::new(),
        }
    }
}
