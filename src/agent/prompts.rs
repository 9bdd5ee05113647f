/// Request text for swapping an ingredient. A blank proposal asks the
/// agent to choose.
pub fn compose_substitution(ingredient_name: &str, proposed: &str) -> String {
    let proposed = proposed.trim();
    if proposed.is_empty() {
        format!("Suggest a substitute for {ingredient_name}.")
    } else {
        format!("Substitute {ingredient_name} with {proposed}.")
    }
}

pub fn compose_scale(servings: u32) -> String {
    format!("Scale the recipe to {servings} servings.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_proposal_asks_for_suggestion() {
        assert_eq!(
            compose_substitution("Tomatoes", ""),
            "Suggest a substitute for Tomatoes."
        );
        assert_eq!(
            compose_substitution("Tomatoes", "   "),
            "Suggest a substitute for Tomatoes."
        );
    }

    #[test]
    fn test_proposal_is_trimmed() {
        assert_eq!(
            compose_substitution("Tomatoes", "  roasted peppers  "),
            "Substitute Tomatoes with roasted peppers."
        );
    }

    #[test]
    fn test_scale_request() {
        assert_eq!(compose_scale(6), "Scale the recipe to 6 servings.");
    }
}
