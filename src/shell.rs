//! Line-level shell helpers: tokenising, prompt rendering, the history
//! cursor, autocomplete and decoding raw terminal input.

/// Split a raw line into command name and arguments. No quoting.
pub fn tokenize(line: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = line.split_whitespace();
    let name = parts.next()?;
    Some((name, parts.collect()))
}

/// `cwd` with the home directory shown as `~`.
pub fn display_dir(cwd: &str, home: &str) -> String {
    if cwd == home {
        "~".to_string()
    } else if let Some(rest) = cwd
        .strip_prefix(home)
        .and_then(|r| r.strip_prefix('/'))
        .filter(|_| home != "/")
    {
        format!("~/{}", rest)
    } else {
        cwd.to_string()
    }
}

pub fn prompt(user: &str, host: &str, cwd: &str, home: &str) -> String {
    format!(
        "\x1b[32m{}@{}\x1b[0m:\x1b[34m{}\x1b[0m$ ",
        user,
        host,
        display_dir(cwd, home)
    )
}

/// Executed lines plus the Up/Down cursor. The cursor lives in
/// `[0, len]`; `len` means the input line is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: &str) {
        self.entries.push(line.to_string());
        self.cursor = self.entries.len();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Step back. `None` means the input stays as it is.
    pub fn up(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Step forward; walking past the newest entry yields an empty line.
    pub fn down(&mut self) -> Option<&str> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(
            self.entries
                .get(self.cursor)
                .map(String::as_str)
                .unwrap_or(""),
        )
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = self.entries.len();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<'a> {
    None,
    Single(&'a str),
    Many(Vec<&'a str>),
}

pub fn autocomplete<'a>(partial: &str, names: &[&'a str]) -> Completion<'a> {
    let mut matches: Vec<&'a str> = names
        .iter()
        .copied()
        .filter(|n| n.starts_with(partial))
        .collect();
    match matches.len() {
        0 => Completion::None,
        1 => Completion::Single(matches.remove(0)),
        _ => Completion::Many(matches),
    }
}

/// One chunk of input as delivered by the terminal widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    Enter,
    Backspace,
    Tab,
    Up,
    Down,
    Interrupt,
    Text(&'a str),
    Ignored,
}

pub fn decode(data: &str) -> Key<'_> {
    match data {
        "\r" | "\n" | "\r\n" => Key::Enter,
        "\x7f" | "\x08" => Key::Backspace,
        "\t" => Key::Tab,
        "\x1b[A" | "\x1bOA" => Key::Up,
        "\x1b[B" | "\x1bOB" => Key::Down,
        "\x03" => Key::Interrupt,
        _ if data.starts_with('\x1b') => Key::Ignored,
        _ if data.chars().all(|c| !c.is_control()) => Key::Text(data),
        _ => Key::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("   "), None);
        assert_eq!(
            tokenize("  kubectl  get pods "),
            Some(("kubectl", vec!["get", "pods"]))
        );
    }

    #[test]
    fn test_display_dir() {
        assert_eq!(display_dir("/home/user", "/home/user"), "~");
        assert_eq!(display_dir("/home/user/a", "/home/user"), "~/a");
        assert_eq!(display_dir("/home/username", "/home/user"), "/home/username");
        assert_eq!(display_dir("/etc", "/"), "/etc");
        assert_eq!(
            prompt("user", "devops", "/home", "/home/user"),
            "\x1b[32muser@devops\x1b[0m:\x1b[34m/home\x1b[0m$ "
        );
    }

    #[test]
    fn test_history_empty_up_is_noop() {
        let mut h = History::new();
        assert_eq!(h.up(), None);
        assert_eq!(h.down(), None);
        assert_eq!(h.cursor(), 0);
    }

    #[test]
    fn test_history_cursor_clamps() {
        let mut h = History::new();
        h.push("ls");
        h.push("pwd");
        assert_eq!(h.up(), Some("pwd"));
        assert_eq!(h.up(), Some("ls"));
        assert_eq!(h.up(), None);
        assert_eq!(h.cursor(), 0);
        assert_eq!(h.down(), Some("pwd"));
        assert_eq!(h.down(), Some(""));
        assert_eq!(h.down(), None);
        assert_eq!(h.cursor(), 2);
    }

    #[test]
    fn test_autocomplete() {
        let names = ["cat", "cd", "clear", "ls"];
        assert_eq!(autocomplete("x", &names), Completion::None);
        assert_eq!(autocomplete("l", &names), Completion::Single("ls"));
        assert_eq!(autocomplete("c", &names), Completion::Many(vec!["cat", "cd", "clear"]));
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("\r"), Key::Enter);
        assert_eq!(decode("\x1b[A"), Key::Up);
        assert_eq!(decode("\x1b[C"), Key::Ignored);
        assert_eq!(decode("ls -la"), Key::Text("ls -la"));
        assert_eq!(decode("\x7f"), Key::Backspace);
    }
}
