//! Customer name roster.

use rand::Rng;

/// The fixed roster of customer names. Repeat visits by the same name map
/// onto the same patron record.
pub static ROSTER: &[&str] = &[
    // Nobility and court
    "Sir Roland",
    "Lady Elara",
    "Baron Ashford",
    "Duke Silverhand",
    "Princess Celestia",
    "Knight Valor",
    // Adventurers
    "Grimm the Bold",
    "Captain Ironbeard",
    "Throg the Mighty",
    "Ranger Swift",
    "Wanderer Kestrel",
    // Practitioners of the arts
    "Mystic Maven",
    "Sage Willowbrook",
    "Enchantress Luna",
    "Alchemist Zara",
    "Merchant Goldwyn",
];

/// Pick a name uniformly from the roster.
pub fn random_name(rng: &mut impl Rng) -> &'static str {
    ROSTER[rng.gen_range(0..ROSTER.len())]
}
