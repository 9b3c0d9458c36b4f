//! Structural check on the final answer shape.

/// Check that the answer decomposes into at least five bullet items.
///
/// A bullet is any line whose trimmed form starts with a digit, `-`, or `•`.
/// Content is not inspected; this only gates the reformat round.
pub fn validate(answer: &str) -> bool {
    let bullets = answer
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            trimmed
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '•')
        })
        .count();

    bullets >= 5
}
