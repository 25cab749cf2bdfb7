//! Post-death taunts
//!
//! A remote text generator may be asked for a line after each death. Whatever
//! comes back (or doesn't) is funneled through `resolve`, which always yields
//! something printable. `TauntBoard` tags each request with the death it
//! belongs to so a slow answer never overwrites a newer death's taunt.

use rand::Rng;

use crate::sim::DeathCause;

/// Longest taunt shown on the death screen, in characters
pub const MAX_TAUNT_CHARS: usize = 120;

/// Local lines used whenever the generator is unavailable
pub const FALLBACK_TAUNTS: &[&str] = &[
    "Did you really think it would be that easy?",
    "The floor was lying. So was I.",
    "Trust nothing. Especially goals.",
    "Have you tried not dying?",
    "That one was on purpose. Yours, not mine.",
    "Gravity: 1, You: 0.",
    "I'd say try again, but you will anyway.",
    "Bold strategy.",
];

/// What the generator is told about the death
#[derive(Debug, Clone, PartialEq)]
pub struct TauntContext {
    pub level_name: String,
    pub deaths: u32,
    pub cause: DeathCause,
}

impl TauntContext {
    /// Prompt text for the remote generator
    pub fn prompt(&self) -> String {
        format!(
            "The player just died in the platformer level \"{}\". Cause: {}. Deaths on this level: {}. \
             Reply with one short, playful taunt (under 15 words).",
            self.level_name,
            self.cause.message(),
            self.deaths
        )
    }
}

pub fn fallback_taunt(rng: &mut impl Rng) -> &'static str {
    FALLBACK_TAUNTS[rng.random_range(0..FALLBACK_TAUNTS.len())]
}

/// Turn a generator response into display text
///
/// Missing, blank or whitespace-only responses fall back to a local line.
/// Never fails.
pub fn resolve(response: Option<&str>, rng: &mut impl Rng) -> String {
    match response.map(clean).filter(|s| !s.is_empty()) {
        Some(text) => text,
        None => fallback_taunt(rng).to_string(),
    }
}

fn clean(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace());
    let mut text: String = trimmed
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_TAUNT_CHARS)
        .collect();
    if trimmed.chars().count() > MAX_TAUNT_CHARS {
        text.pop();
        text.push('…');
    }
    text
}

/// The taunt currently on screen
#[derive(Debug, Clone, Default)]
pub struct TauntBoard {
    serial: u64,
    text: Option<String>,
}

impl TauntBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new death: clear the board and hand out a ticket for its taunt
    pub fn begin(&mut self) -> u64 {
        self.serial += 1;
        self.text = None;
        self.serial
    }

    /// Post the taunt for ticket `serial`. Stale tickets are ignored.
    pub fn deliver(&mut self, serial: u64, text: String) -> bool {
        if serial != self.serial {
            log::debug!("Discarding stale taunt #{serial} (current #{})", self.serial);
            return false;
        }
        self.text = Some(text);
        true
    }

    /// Leaving the death screen invalidates any pending taunt
    pub fn dismiss(&mut self) {
        self.serial += 1;
        self.text = None;
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(11)
    }

    #[test]
    fn test_missing_response_falls_back() {
        let mut rng = rng();
        for response in [None, Some(""), Some("   \n\t "), Some("\"\"")] {
            let text = resolve(response, &mut rng);
            assert!(FALLBACK_TAUNTS.contains(&text.as_str()), "{response:?} -> {text}");
        }
    }

    #[test]
    fn test_response_is_cleaned() {
        let mut rng = rng();
        assert_eq!(
            resolve(Some("  \"Nice   jump.\n Not.\"  "), &mut rng),
            "Nice jump. Not."
        );
    }

    #[test]
    fn test_long_response_is_truncated() {
        let mut rng = rng();
        let long = "ha ".repeat(200);
        let text = resolve(Some(&long), &mut rng);
        assert_eq!(text.chars().count(), MAX_TAUNT_CHARS);
        assert!(text.ends_with('…'));
    }

    #[test]
    fn test_prompt_mentions_context() {
        let ctx = TauntContext {
            level_name: "The Decoy".into(),
            deaths: 4,
            cause: DeathCause::Trap,
        };
        let prompt = ctx.prompt();
        assert!(prompt.contains("The Decoy"));
        assert!(prompt.contains("It was a trap!"));
        assert!(prompt.contains('4'));
    }

    #[test]
    fn test_stale_taunt_is_discarded() {
        let mut board = TauntBoard::new();
        let first = board.begin();
        let second = board.begin();

        assert!(board.deliver(second, "fresh".into()));
        assert!(!board.deliver(first, "late".into()));
        assert_eq!(board.text(), Some("fresh"));
    }

    #[test]
    fn test_dismiss_blocks_pending() {
        let mut board = TauntBoard::new();
        let ticket = board.begin();
        board.dismiss();
        assert!(!board.deliver(ticket, "too late".into()));
        assert_eq!(board.text(), None);
    }
}
