//! Fixed instructions attached to the image for each vision feature.
//!
//! The instructions are constants: they are not user-editable and not
//! templated.  Text extraction has no instruction because it never reaches the
//! model.

/// Real-time scene understanding.
pub const SCENE_UNDERSTANDING: &str = "You are a real-time scene interpreter for visually impaired users. \
Your task is to analyze and describe images vividly, empathetically, and without technical jargon. \
Focus on delivering concise, actionable information that enhances understanding and safety.";

/// Object and obstacle detection.
pub const OBJECT_DETECTION: &str = "You are a visual accessibility specialist analyzing images to help \
visually impaired individuals navigate safely. Your goal is to provide detailed yet concise descriptions \
of visible objects and obstacles, prioritizing safety and situational awareness.";

/// Personalized assistance.
pub const PERSONAL_ASSISTANCE: &str = "As an assistive technology specialist, your role is to provide \
personalized, context-specific support for visually impaired users. Deliver clear, actionable \
descriptions to empower users with confidence and enhance accessibility.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_are_distinct_and_non_empty() {
        let all = [SCENE_UNDERSTANDING, OBJECT_DETECTION, PERSONAL_ASSISTANCE];
        for (i, a) in all.iter().enumerate() {
            assert!(!a.trim().is_empty());
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn line_continuations_leave_single_spaces() {
        for instruction in [SCENE_UNDERSTANDING, OBJECT_DETECTION, PERSONAL_ASSISTANCE] {
            assert!(!instruction.contains("  "), "{instruction}");
            assert!(!instruction.contains('\n'));
        }
    }
}
