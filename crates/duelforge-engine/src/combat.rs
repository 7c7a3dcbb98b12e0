//! Combat resolver: a pure function from two committed value sets to a
//! round outcome.
//!
//! `diceOne` is the attack die, `diceTwo` the defense die. Each attack is
//! compared against the opponent's defense from the same pre-round
//! snapshot — both directions land simultaneously, so neither damage
//! calculation sees an HP or die value already modified this round.

use duelforge_protocol::PlayerValues;

/// The result of resolving one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Player one's HP after the round.
    pub hp_one: i32,
    /// Player two's HP after the round.
    pub hp_two: i32,
    /// `true` when either HP dropped to 0 or below — the match is over.
    pub ended: bool,
    /// `true` only when BOTH HPs dropped to 0 or below in this round.
    pub tie: bool,
}

/// Resolves one round of combat from two players' committed values.
///
/// Damage: if attack exceeds defense, the defender loses the positive
/// difference; otherwise nothing. A missing die counts as 0, so an
/// absent attack never lands and an absent defense blocks nothing.
///
/// The special slots are carried and broadcast but contribute no damage
/// yet — an open extension point, deliberately left unresolved.
///
/// No side effects: callers apply the returned HPs themselves.
pub fn resolve(one: &PlayerValues, two: &PlayerValues) -> RoundOutcome {
    let hp_one = one.hp - damage(two, one);
    let hp_two = two.hp - damage(one, two);

    let one_down = hp_one <= 0;
    let two_down = hp_two <= 0;

    RoundOutcome {
        hp_one,
        hp_two,
        ended: one_down || two_down,
        tie: one_down && two_down,
    }
}

/// Damage dealt by `attacker` to `defender` this round.
fn damage(attacker: &PlayerValues, defender: &PlayerValues) -> i32 {
    let attack = attacker.dice_one.unwrap_or(0);
    let defense = defender.dice_two.unwrap_or(0);
    (attack - defense).max(0)
}
