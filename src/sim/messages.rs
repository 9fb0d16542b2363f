//! Flavor messages surfaced through the step snapshot

use rand::Rng;

use super::state::PowerUpKind;

const GAME_OVER_LINES: [&str; 5] = [
    "Le serpent s'est mordu le code.",
    "Flux interrompu : collision fatale.",
    "Packet dropped. Relance le tunnel.",
    "Debug time! Le serpent a trouvé un mur logique.",
    "L'IA t'observe... et rit un peu.",
];

/// Pick one of the fixed game-over phrases
pub fn game_over_line<R: Rng>(rng: &mut R) -> &'static str {
    GAME_OVER_LINES[rng.random_range(0..GAME_OVER_LINES.len())]
}

/// Activation line for a collected power-up
pub fn power_up_line(kind: PowerUpKind) -> &'static str {
    match kind {
        PowerUpKind::Slowmo => "Slow-mo quantique activé.",
        PowerUpKind::Speed => "Boost neural téléchargé.",
        PowerUpKind::Magnet => "Champ magnétique calibré.",
        PowerUpKind::Ghost => "Ghost mode : aucun log ne te trahira.",
    }
}

pub const PICKUP_EXPIRED: &str = "Power-up volatilisé.";
pub const TOXIC_DODGED: &str = "ToX dodge.";
pub const TOXIC_DODGE_BONUS: &str = "Combo bonus : toxique esquivé.";
pub const FRUIT_EXPIRED: &str = "Paquet périmé, nouveau spawn.";
pub const GOLDEN_EATEN: &str = "Packet doré avalé !";
pub const FRUIT_EATEN: &str = "Flux synchronisé.";

/// True if a message is one of the terminal phrases
pub fn is_game_over_line(message: &str) -> bool {
    GAME_OVER_LINES.contains(&message)
}
