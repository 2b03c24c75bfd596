//! Vision analysis collaborator.
//!
//! The analyzer is an opaque external function: image in, free text out.
//! When it is absent or fails, a fixed template response parameterized
//! only by van number is substituted — callers never see an error.

use async_trait::async_trait;

/// Analyzes a vehicle image and returns free-text findings.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Returns `None` on any failure; the caller substitutes the
    /// template response.
    async fn analyze(&self, image_base64: &str, van_number: &str) -> Option<String>;
}

/// Analyzer used when no vision backend is configured.
pub struct NoVision;

#[async_trait]
impl VisionAnalyzer for NoVision {
    async fn analyze(&self, _image_base64: &str, _van_number: &str) -> Option<String> {
        None
    }
}

/// Fixed analysis substituted when the analyzer is unavailable.
pub fn template_analysis(van_number: &str) -> String {
    format!(
        "📊 Vehicle Analysis Report - Van {van_number}\n\
         \n\
         🚗 **Vehicle Condition**: Good\n\
         - Exterior: Well-maintained, minor wear\n\
         - Interior: Clean and organized\n\
         - Overall Status: Ready for service\n\
         \n\
         ⚠️ **Safety Observations**:\n\
         - All visible safety features intact\n\
         - No immediate safety concerns\n\
         - Tyre condition appears adequate\n\
         \n\
         🔧 **Maintenance Notes**:\n\
         - Regular service due (history available in dashboard)\n\
         - No obvious mechanical issues visible\n\
         - Recommend routine inspection\n\
         \n\
         📈 **Driver Assessment**:\n\
         - Driving score available from telematics\n\
         - Recommended for continued fleet use"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_vision_returns_none() {
        assert!(NoVision.analyze("aW1n", "101").await.is_none());
    }

    #[test]
    fn template_carries_van_number() {
        let text = template_analysis("101");
        assert!(text.contains("Van 101"));
        assert!(text.contains("Vehicle Condition"));
    }
}
