//! Generation request parameters.

use serde::{Deserialize, Serialize};

/// Default aspect ratio for generated cards.
pub const DEFAULT_ASPECT_RATIO: &str = "3:4";

/// Default output resolution.
pub const DEFAULT_RESOLUTION: &str = "1K";

/// Default output image format.
pub const DEFAULT_OUTPUT_FORMAT: &str = "png";

/// Parameters for one image generation.
///
/// Immutable once submitted: the controller clones it into the record at
/// submission time and never mutates it afterwards. `prompt` must be the
/// fully built prompt text; prompt construction is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Display title for the generated card.
    pub title: String,
    /// Topic the card illustrates.
    pub topic: String,
    /// Full prompt text sent to the model.
    pub prompt: String,
    /// Aspect ratio, e.g. "3:4".
    pub aspect_ratio: String,
    /// Resolution, e.g. "1K".
    pub resolution: String,
    /// Output format, e.g. "png".
    pub output_format: String,
}

impl GenerationRequest {
    /// Creates a request with default image parameters.
    pub fn new(title: impl Into<String>, topic: impl Into<String>) -> Self {
        let title = title.into();
        let topic = topic.into();
        Self {
            prompt: format!("An educational illustration of {} titled \"{}\"", topic, title),
            title,
            topic,
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
            resolution: DEFAULT_RESOLUTION.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
        }
    }

    /// Replaces the generated default prompt with an explicit one.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Overrides the aspect ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = aspect_ratio.into();
        self
    }

    /// Overrides the resolution.
    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = resolution.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = GenerationRequest::new("Supermarket", "supermarket");
        assert_eq!(request.title, "Supermarket");
        assert_eq!(request.topic, "supermarket");
        assert_eq!(request.aspect_ratio, "3:4");
        assert_eq!(request.resolution, "1K");
        assert_eq!(request.output_format, "png");
        assert!(request.prompt.contains("supermarket"));
    }

    #[test]
    fn test_request_builder_overrides() {
        let request = GenerationRequest::new("Farm", "farm animals")
            .with_prompt("a watercolor farm scene")
            .with_aspect_ratio("16:9")
            .with_resolution("2K");
        assert_eq!(request.prompt, "a watercolor farm scene");
        assert_eq!(request.aspect_ratio, "16:9");
        assert_eq!(request.resolution, "2K");
    }
}
