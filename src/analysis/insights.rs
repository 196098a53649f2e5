//! Four-point health insights from basic vitals.

use serde::{Deserialize, Serialize};

use super::normalize::{lenient_number, validate_model_id};
use super::service::AnalysisRequest;

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthInsightsRequest {
    #[serde(default = "default_model")]
    pub model_type: String,
    #[serde(deserialize_with = "lenient_number")]
    pub age: f64,
    pub gender: String,
    #[serde(deserialize_with = "lenient_number")]
    pub height: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub weight: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub bmi: f64,
    pub bmi_category: String,
    #[serde(deserialize_with = "lenient_number")]
    pub blood_glucose: f64,
}

impl AnalysisRequest for HealthInsightsRequest {
    const SCOPE: &'static str = "health-insights";
    const GENERATED_MESSAGE: &'static str = "Health insights generated successfully";
    const CACHED_MESSAGE: &'static str = "Health insights retrieved from cache";

    fn model(&self) -> &str {
        &self.model_type
    }

    fn validate(&self) -> Result<(), String> {
        validate_model_id(&self.model_type)
    }

    fn prompt(&self) -> String {
        format!(
            r#"You are a medical AI analyst. Analyze the following patient health data and provide 4 key health insights.

Patient Data:
- Age: {age}
- Gender: {gender}
- Height: {height} cm
- Weight: {weight} kg
- BMI: {bmi} ({bmi_category})
- Blood Glucose: {blood_glucose} mg/dL

Provide 4 insights in a JSON array. Each insight should have:
- title: Short title (e.g., "BMI Status", "Glucose Levels")
- content: A concise explanation (1-2 sentences)
- type: One of ["normal", "warning", "critical", "positive"] based on medical standards.

Example:
[
    {{ "title": "Healthy BMI", "content": "Your BMI is within the healthy range.", "type": "positive" }},
    {{ "title": "Elevated Glucose", "content": "Your blood glucose is slightly high.", "type": "warning" }}
]

Return ONLY the JSON array."#,
            age = self.age,
            gender = self.gender,
            height = self.height,
            weight = self.weight,
            bmi = self.bmi,
            bmi_category = self.bmi_category,
            blood_glucose = self.blood_glucose,
        )
    }
}
