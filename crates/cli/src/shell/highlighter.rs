use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

pub struct KeyscopeHighlighter {
    commands: Vec<String>,
}

impl KeyscopeHighlighter {
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }
}

impl Highlighter for KeyscopeHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();
        let mut first_word = true;

        for word in line.split_inclusive(char::is_whitespace) {
            let trimmed = word.trim();
            let style = if trimmed.is_empty() {
                Style::new()
            } else if first_word {
                first_word = false;
                if self.commands.iter().any(|c| c == trimmed) {
                    Style::new().fg(Color::LightGreen).bold()
                } else {
                    Style::new().fg(Color::Red)
                }
            } else if trimmed.starts_with('-') {
                Style::new().fg(Color::Cyan)
            } else if trimmed.contains('.') || trimmed.starts_with('/') {
                // Looks like a key
                Style::new().fg(Color::Yellow)
            } else {
                Style::new()
            };
            styled_text.push((style, word.to_string()));
        }

        styled_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_cover_line() {
        let highlighter = KeyscopeHighlighter::new(vec!["lookup".to_string()]);
        let line = "lookup  server.port --json";
        let styled = highlighter.highlight(line, line.len());
        let text: String = styled.buffer.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(text, line);
        assert_eq!(styled.buffer[0].0, Style::new().fg(Color::LightGreen).bold());
    }
}
