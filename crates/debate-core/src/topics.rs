//! Built-in topics used when the topic generator is unavailable.

pub const FALLBACK_TOPICS: &[&str] = &[
  "What's the best excuse for being late to work?",
  "If animals could talk, which would be the rudest?",
  "What's the worst pizza topping combination?",
  "If you could only eat one food for the rest of your life, what would it be?",
  "What's the most useless superpower you can think of?",
  "If you were a villain, what would be your evil catchphrase?",
  "What's the worst song to play at a wedding?",
  "If your pet could text you, what would their first message be?",
  "What's the most overrated kitchen appliance?",
  "Is cereal a soup? Defend your position.",
  "What's the worst name for a restaurant?",
  "What's the best snack at midnight?",
];

/// Case- and whitespace-insensitive comparison against earlier topics.
pub fn is_duplicate(topic: &str, previous: &[String]) -> bool {
  let wanted = topic.trim();
  previous.iter().any(|p| p.trim().eq_ignore_ascii_case(wanted))
}

/// The first built-in topic not used before.
pub fn fallback_topic(previous: &[String]) -> Option<&'static str> {
  FALLBACK_TOPICS
    .iter()
    .copied()
    .find(|t| !is_duplicate(t, previous))
}
