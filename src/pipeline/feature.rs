//! The four user-facing features and how each is routed.

use crate::vision::prompt;

/// A user-selectable feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Feature {
    #[default]
    SceneUnderstanding,
    TextExtraction,
    ObjectDetection,
    PersonalAssistance,
}

/// Which collaborator produces a feature's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Hosted model with the given fixed instruction.
    Vision(&'static str),
    /// Local OCR engine.
    Ocr,
}

impl Feature {
    /// Radio-list order.
    pub const ALL: [Feature; 4] = [
        Feature::SceneUnderstanding,
        Feature::TextExtraction,
        Feature::ObjectDetection,
        Feature::PersonalAssistance,
    ];

    pub fn route(self) -> Route {
        match self {
            Feature::SceneUnderstanding => Route::Vision(prompt::SCENE_UNDERSTANDING),
            Feature::TextExtraction => Route::Ocr,
            Feature::ObjectDetection => Route::Vision(prompt::OBJECT_DETECTION),
            Feature::PersonalAssistance => Route::Vision(prompt::PERSONAL_ASSISTANCE),
        }
    }

    /// Entry in the feature selector.
    pub fn label(self) -> &'static str {
        match self {
            Feature::SceneUnderstanding => "Real-Time Scene Understanding",
            Feature::TextExtraction => "Text-to-Speech Conversion",
            Feature::ObjectDetection => "Object Detection",
            Feature::PersonalAssistance => "Personalized Assistance",
        }
    }

    /// Caption of the action button.
    pub fn button_label(self) -> &'static str {
        match self {
            Feature::SceneUnderstanding => "Run Scene Understanding",
            Feature::TextExtraction => "Convert Text-to-Speech",
            Feature::ObjectDetection => "Run Object Detection",
            Feature::PersonalAssistance => "Run Personalized Assistance",
        }
    }

    /// Prefix of the inline error, as in `"Object detection failed: ..."`.
    pub fn failure_label(self) -> &'static str {
        match self {
            Feature::SceneUnderstanding => "Scene understanding",
            Feature::TextExtraction => "Text extraction",
            Feature::ObjectDetection => "Object detection",
            Feature::PersonalAssistance => "Personalized assistance",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_scene_understanding() {
        assert_eq!(Feature::default(), Feature::SceneUnderstanding);
        assert_eq!(Feature::ALL[0], Feature::default());
    }

    #[test]
    fn only_text_extraction_uses_ocr() {
        let ocr: Vec<Feature> = Feature::ALL
            .into_iter()
            .filter(|f| f.route() == Route::Ocr)
            .collect();
        assert_eq!(ocr, vec![Feature::TextExtraction]);
    }

    #[test]
    fn vision_features_have_distinct_instructions() {
        let mut seen = Vec::new();
        for f in Feature::ALL {
            if let Route::Vision(instruction) = f.route() {
                assert!(!instruction.is_empty());
                assert!(!seen.contains(&instruction), "{f} reuses an instruction");
                seen.push(instruction);
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn scene_understanding_routes_to_scene_instruction() {
        assert_eq!(
            Feature::SceneUnderstanding.route(),
            Route::Vision(prompt::SCENE_UNDERSTANDING)
        );
    }

    #[test]
    fn labels_match_selector_entries() {
        let labels: Vec<&str> = Feature::ALL.iter().map(|f| f.label()).collect();
        assert_eq!(
            labels,
            [
                "Real-Time Scene Understanding",
                "Text-to-Speech Conversion",
                "Object Detection",
                "Personalized Assistance",
            ]
        );
        assert_eq!(Feature::ObjectDetection.to_string(), "Object Detection");
    }
}
