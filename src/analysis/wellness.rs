//! Mood and mental-wellness journal analysis.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::normalize::text_length;
use super::service::AnalysisRequest;

pub const WELLNESS_MODEL: &str = "gemini-flash-lite-latest";

const MIN_ENTRY_CHARS: usize = 10;

const WELLNESS_COMPANION: &str = "\
You are \"Health Connect Wellness Companion\". Your role is to analyze mood and mental wellness journal entries.

Your analysis should:
1. **Sentiment Analysis:** Identify the overall emotional tone (positive, negative, neutral, mixed).
2. **Emotion Detection:** Identify specific emotions expressed (joy, sadness, anxiety, stress, frustration, gratitude, etc.).
3. **Stress Triggers:** Highlight potential stressors mentioned (work, relationships, health, finances, etc.).
4. **Patterns:** If the user has made multiple entries, note any recurring themes or changes in mood over time.
5. **Coping Strategies:** Based on the analysis, suggest personalized coping strategies, mindfulness exercises, or positive affirmations.

Format your response in markdown with clear sections:
- **Sentiment Summary**
- **Emotions Detected**
- **Potential Stressors**
- **Recommended Coping Strategies**

Be empathetic, supportive, and non-judgmental. Encourage the user to seek professional help if they express severe distress or suicidal thoughts.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessRequest {
    pub entry: String,
    #[serde(default)]
    pub date: Option<String>,
}

impl AnalysisRequest for WellnessRequest {
    const SCOPE: &'static str = "wellness";
    const GENERATED_MESSAGE: &'static str = "Wellness entry analyzed successfully";
    const CACHED_MESSAGE: &'static str = "Wellness analysis retrieved from cache";

    fn model(&self) -> &str {
        WELLNESS_MODEL
    }

    fn system_instruction(&self) -> Option<&'static str> {
        Some(WELLNESS_COMPANION)
    }

    fn validate(&self) -> Result<(), String> {
        if text_length(&self.entry) < MIN_ENTRY_CHARS {
            return Err(format!(
                "Journal entry must be at least {MIN_ENTRY_CHARS} characters"
            ));
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        match &self.date {
            Some(date) => format!("Date: {date}\n\nJournal Entry:\n{}", self.entry),
            None => format!("Journal Entry:\n{}", self.entry),
        }
    }

    fn shape(&self, text: String) -> Value {
        let now = Utc::now();
        let date = self
            .date
            .clone()
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));
        json!({
            "analysis": text,
            "date": date,
            "timestamp": now.timestamp_millis(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(entry: &str, date: Option<&str>) -> WellnessRequest {
        WellnessRequest {
            entry: entry.to_string(),
            date: date.map(str::to_string),
        }
    }

    #[test]
    fn short_entries_fail_validation() {
        assert!(request("too short", None).validate().is_err());
        assert!(request("long enough", None).validate().is_ok());
        assert!(request("😔😔😔😔😔", None).validate().is_ok());
        assert!(request("😔😔😔😔", None).validate().is_err());
    }

    #[test]
    fn prompt_includes_date_when_given() {
        assert_eq!(
            request("Felt calm today.", Some("2025-03-01")).prompt(),
            "Date: 2025-03-01\n\nJournal Entry:\nFelt calm today."
        );
        assert_eq!(
            request("Felt calm today.", None).prompt(),
            "Journal Entry:\nFelt calm today."
        );
    }

    #[test]
    fn shape_keeps_given_date() {
        let data = request("Felt calm today.", Some("2025-03-01")).shape("ok".into());
        assert_eq!(data["analysis"], "ok");
        assert_eq!(data["date"], "2025-03-01");
        assert!(data["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn shape_fills_missing_date() {
        let data = request("Felt calm today.", None).shape("ok".into());
        let date = data["date"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(date).is_ok());
    }

    #[test]
    fn fixed_model_and_instruction() {
        let req = request("Felt calm today.", None);
        assert_eq!(req.model(), WELLNESS_MODEL);
        assert!(req.system_instruction().unwrap().contains("Wellness Companion"));
    }
}
