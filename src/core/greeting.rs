//! Greeting phrases for `/hello`.

use rand::seq::IndexedRandom;

/// Greetings in a handful of languages.
pub const GREETINGS: &[&str] = &[
    "こんにちは！",
    "Hello!",
    "Bonjour!",
    "Guten Tag!",
    "Hola✋",
    "Ciao👋",
    "Γειά σας!",
    "Здравствуйте:)",
    "你好~",
    "안녕하세요",
];

/// Picks a greeting at random.
#[must_use]
pub fn random_greeting() -> &'static str {
    GREETINGS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or("Hello!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_greeting_comes_from_list() {
        for _ in 0..50 {
            assert!(GREETINGS.contains(&random_greeting()));
        }
    }
}
