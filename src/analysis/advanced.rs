//! Seven-category lifestyle and medical-history analysis.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::normalize::{
    NONE_REPORTED, lenient_bool, lenient_number, none_reported, text_length, validate_model_id,
};
use super::service::AnalysisRequest;

fn default_model() -> String {
    "gemini-1.5-pro".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedHealthRequest {
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

    #[serde(deserialize_with = "lenient_number")]
    pub sleep_hours: f64,
    pub sleep_quality: String,
    #[serde(deserialize_with = "lenient_number")]
    pub exercise_hours: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub stress_level: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub water_intake: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub caffeine: f64,
    pub diet: String,

    #[serde(deserialize_with = "lenient_bool")]
    pub regular_meals: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub late_night_snacking: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub high_sugar: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub fast_food: bool,

    pub smoking: String,
    pub alcohol_consumption: String,

    #[serde(default = "none_reported")]
    pub medical_conditions: String,
    #[serde(default = "none_reported")]
    pub medications: String,
    #[serde(default = "none_reported")]
    pub family_history: String,
}

/// A history field counts when it is not the default and says something.
fn is_meaningful(field: &str) -> bool {
    field != NONE_REPORTED && text_length(field) > 5
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

impl AdvancedHealthRequest {
    pub fn has_medical_history(&self) -> bool {
        is_meaningful(&self.medical_conditions)
    }

    pub fn has_medications(&self) -> bool {
        is_meaningful(&self.medications)
    }

    pub fn has_family_history(&self) -> bool {
        is_meaningful(&self.family_history)
    }
}

impl AnalysisRequest for AdvancedHealthRequest {
    const SCOPE: &'static str = "advanced-health-analysis";
    const GENERATED_MESSAGE: &'static str = "Health analysis completed successfully";
    const CACHED_MESSAGE: &'static str = "Health analysis retrieved from cache";

    fn model(&self) -> &str {
        &self.model_type
    }

    fn validate(&self) -> Result<(), String> {
        validate_model_id(&self.model_type)
    }

    fn prompt(&self) -> String {
        let mut prompt = String::from(
            "You are a health advisor AI. Please analyze the following health data and provide \
             detailed analysis in these categories: sleep, exercise, stress, nutrition, hydration, \
             lifestyle, and overall health.\n\
             Format your response in a JSON array of objects with these fields:\n\
             - category: \"sleep\", \"exercise\", \"stress\", \"nutrition\", \"hydration\", \"lifestyle\", or \"overall\"\n\
             - title: A title for this analysis section\n\
             - analysis: A paragraph analyzing this aspect of health\n\
             - recommendation: A specific, actionable recommendation\n\
             - score: A health score (0-100) for this category\n\n",
        );

        // Writing into a String cannot fail.
        let _ = write!(
            prompt,
            "Patient health data:\n\
             - Age: {}\n\
             - Gender: {}\n\
             - Height: {} cm\n\
             - Weight: {} kg\n\
             - BMI: {} (Category: {})\n\
             - Blood Glucose: {} mg/dL\n\
             - Sleep Hours: {} hours per day\n\
             - Sleep Quality: {}\n\
             - Exercise: {} hours per week\n\
             - Stress Level: {}/10\n\
             - Water Intake: {} liters per day\n\
             - Caffeine Intake: {} cups per day\n\
             - Diet Type: {}\n\
             - Food Habits:\n\
             \x20   * Regular meals: {}\n\
             \x20   * Late night snacking: {}\n\
             \x20   * Frequent fast food: {}\n\
             \x20   * High sugar consumption: {}\n\
             - Smoking Status: {}\n\
             - Alcohol Consumption: {}\n\
             - Medical Conditions: {}\n\
             - Medications: {}\n\
             - Family History: {}\n\n",
            self.age,
            self.gender,
            self.height,
            self.weight,
            self.bmi,
            self.bmi_category,
            self.blood_glucose,
            self.sleep_hours,
            self.sleep_quality,
            self.exercise_hours,
            self.stress_level,
            self.water_intake,
            self.caffeine,
            self.diet,
            yes_no(self.regular_meals),
            yes_no(self.late_night_snacking),
            yes_no(self.fast_food),
            yes_no(self.high_sugar),
            self.smoking,
            self.alcohol_consumption,
            self.medical_conditions,
            self.medications,
            self.family_history,
        );

        let history = self.has_medical_history();
        let medications = self.has_medications();
        let family = self.has_family_history();

        if history || medications || family {
            prompt.push_str(
                "IMPORTANT: The patient has provided medical history information. In your analysis \
                 and recommendations, specifically address how their medical conditions, \
                 medications, and/or family history impact their health in EACH relevant category, \
                 not just the lifestyle category. Include specific advice tailored to their \
                 medical situation.\n\n",
            );
        }

        prompt.push_str(
            "Provide thorough but concise analysis for each category.\n\n\
             For the \"nutrition\" category, include a detailed assessment of the diet type and food habits.\n\n\
             For the \"lifestyle\" category, provide specific insights about caffeine intake, smoking \
             status, alcohol consumption, and medical history.\n",
        );
        if history {
            prompt.push_str(
                "Pay special attention to how the reported medical conditions might affect health \
                 outcomes. Provide specific recommendations that consider these conditions.\n",
            );
        }
        if medications {
            prompt.push_str(
                "Consider how the mentioned medications might impact other health factors and \
                 provide appropriate guidance.\n",
            );
        }
        if family {
            prompt.push_str("Factor in family history when assessing risk and making recommendations.\n");
        }

        prompt.push_str(
            "\nFor the \"overall\" category, provide a comprehensive summary that includes insights \
             from all other categories, and specifically mentions the impact of their medical \
             history, medications, and family health background if provided.\n\n\
             For the scores:\n\
             - Use 80-100 for excellent habits\n\
             - Use 60-79 for good but improvable habits\n\
             - Use 40-59 for habits that need moderate improvement\n\
             - Use 0-39 for habits that need significant improvement\n\n\
             Return ONLY a valid JSON array with exactly 7 objects, one for each category.",
        );

        prompt
    }
}
