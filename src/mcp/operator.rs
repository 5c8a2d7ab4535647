//! Operator session
//!
//! The interactive side of an operation: multi-selection, confirmation,
//! user-visible notices and the host's default interaction surface.

/// Choice that stands for every other entry in a selection
pub const ALL_CHOICE: &str = "ALL";

/// Interactive session an operation reports to
pub trait Operator {
    /// Let the operator pick any number of `choices`
    fn select(&mut self, title: &str, choices: &[String]) -> Vec<String>;

    /// Yes/no question
    fn confirm(&mut self, question: &str) -> bool;

    /// User-visible message
    fn notify(&mut self, message: &str);

    /// Hand text to the default interaction surface (the chat input)
    fn deliver(&mut self, text: &str);
}

/// Ask the operator to narrow `candidates`, offering an extra "ALL" choice
///
/// Picking "ALL" selects every candidate. Unknown picks are ignored and
/// candidate order is preserved.
pub fn select_with_all(
    operator: &mut dyn Operator,
    title: &str,
    candidates: &[String],
) -> Vec<String> {
    let mut choices = candidates.to_vec();
    choices.push(ALL_CHOICE.to_string());

    let picked = operator.select(title, &choices);
    if picked.iter().any(|choice| choice == ALL_CHOICE) {
        return candidates.to_vec();
    }

    candidates
        .iter()
        .filter(|candidate| picked.contains(candidate))
        .cloned()
        .collect()
}
