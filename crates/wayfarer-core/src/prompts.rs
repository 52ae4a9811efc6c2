//! Persona and prompt text sent to the oracle.

pub const ORACLE_GREETING: &str =
    "Greetings, Traveler. I am the Nexus Guardian. Accessing memory banks... How may I assist you?";

pub const ORACLE_PERSONA: &str = "You are the AI Guardian of a Cyberpunk/RPG Portfolio. \
Speak in a mix of technical jargon and mystical RPG metaphors. You are helpful but slightly \
cryptic. Keep answers concise (under 50 words).";

pub fn skill_scan_prompt(skill: &str) -> String {
    format!(
        "Describe the technical skill \"{}\" as if it were a magical ability, weapon, or item \
in a fantasy RPG. Be creative but accurate to what it does. Max 1 sentence.",
        skill
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_scan_prompt_quotes_skill() {
        let prompt = skill_scan_prompt("Docker");
        assert!(prompt.starts_with("Describe the technical skill \"Docker\" as if"));
        assert!(prompt.ends_with("Max 1 sentence."));
    }
}
