use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

/// Discrete, edge-triggered input delivered to the trainer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// Ascent impulse for the human bird.
    Ascend,
    TogglePause,
    Quit,
}

impl InputEvent {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "ascend" | "flap" => Some(Self::Ascend),
            "pause" => Some(Self::TogglePause),
            "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

pub trait InputSource {
    /// Events that arrived up to and including session tick `tick`.
    fn poll(&mut self, tick: u64) -> Vec<InputEvent>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self, _tick: u64) -> Vec<InputEvent> {
        Vec::new()
    }
}

/// Replays events at fixed session ticks.
///
/// Script lines are `<tick> <ascend|flap|pause|quit>`; `#` starts a comment.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    events: Vec<(u64, InputEvent)>,
    next: usize,
}

impl ScriptedInput {
    pub fn new(mut events: Vec<(u64, InputEvent)>) -> Self {
        events.sort_by_key(|(tick, _)| *tick);
        Self { events, next: 0 }
    }

    pub fn parse(script: &str) -> Result<Self> {
        let mut events = Vec::new();
        for (idx, raw) in script.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let (Some(tick), Some(keyword), None) = (tokens.next(), tokens.next(), tokens.next())
            else {
                return Err(anyhow!(
                    "line {line_no}: expected `<tick> <event>`, got `{line}`"
                ));
            };
            let tick = tick
                .parse::<u64>()
                .with_context(|| format!("line {line_no}: invalid tick `{tick}`"))?;
            let event = InputEvent::from_keyword(&keyword.to_ascii_lowercase())
                .ok_or_else(|| anyhow!("line {line_no}: unknown event `{keyword}`"))?;
            events.push((tick, event));
        }
        Ok(Self::new(events))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed reading input script {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("malformed input script {}", path.display()))
    }

    pub fn remaining(&self) -> usize {
        self.events.len() - self.next
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, tick: u64) -> Vec<InputEvent> {
        let start = self.next;
        while self
            .events
            .get(self.next)
            .is_some_and(|(at, _)| *at <= tick)
        {
            self.next += 1;
        }
        self.events[start..self.next]
            .iter()
            .map(|(_, event)| *event)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_events_comments_and_aliases() {
        let script = "\
# warm up
10 flap
3 pause   # out of order is fine
10 ASCEND

40 quit
";
        let mut input = ScriptedInput::parse(script).expect("valid script");
        assert_eq!(input.remaining(), 4);
        assert!(input.poll(2).is_empty());
        assert_eq!(input.poll(3), vec![InputEvent::TogglePause]);
        assert_eq!(
            input.poll(10),
            vec![InputEvent::Ascend, InputEvent::Ascend]
        );
        assert_eq!(input.poll(100), vec![InputEvent::Quit]);
        assert!(input.poll(101).is_empty());
    }

    #[test]
    fn late_poll_delivers_everything_due() {
        let mut input = ScriptedInput::new(vec![
            (5, InputEvent::Ascend),
            (1, InputEvent::TogglePause),
        ]);
        assert_eq!(
            input.poll(9),
            vec![InputEvent::TogglePause, InputEvent::Ascend]
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        let err = ScriptedInput::parse("5 jump").unwrap_err();
        assert!(err.to_string().contains("unknown event"));
        assert!(ScriptedInput::parse("soon quit").is_err());
        assert!(ScriptedInput::parse("5").is_err());
        assert!(ScriptedInput::parse("5 quit now").is_err());
    }

    #[test]
    fn reads_script_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "7 quit").expect("write script");
        let mut input = ScriptedInput::from_file(file.path()).expect("readable script");
        assert_eq!(input.poll(7), vec![InputEvent::Quit]);

        let missing = file.path().with_extension("missing");
        assert!(ScriptedInput::from_file(&missing).is_err());
    }
}
