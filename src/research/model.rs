use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::research::{AwarenessStage, DiaryPhase};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(default)]
    pub age_range: String,
    #[serde(default)]
    pub occupation: String,
    #[serde(default)]
    pub income: String,
    #[serde(default)]
    pub life_stage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Psychographics {
    #[serde(default)]
    pub situation: String,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub desires: Vec<String>,
    #[serde(default)]
    pub language: Vec<String>,
    #[serde(default)]
    pub emotions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuyerPsychology {
    #[serde(default)]
    pub awareness_level: String,
    #[serde(default)]
    pub decision_triggers: Vec<String>,
    #[serde(default)]
    pub objections: Vec<String>,
    #[serde(default)]
    pub key_insights: Vec<String>,
}

/// A customer avatar as returned by the backend.
///
/// The generator produces far more detail than the export uses (empathy maps,
/// purchasing habits, ...). Those sections are kept verbatim in `extra` so a
/// saved session round-trips without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    pub stage: AwarenessStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographics: Option<Demographics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psychographics: Option<Psychographics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_psychology: Option<BuyerPsychology>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntries {
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub during: String,
    #[serde(default)]
    pub after: String,
}

impl DiaryEntries {
    pub fn get(&self, phase: DiaryPhase) -> &str {
        match phase {
            DiaryPhase::Before => &self.before,
            DiaryPhase::During => &self.during,
            DiaryPhase::After => &self.after,
        }
    }

    pub fn set(&mut self, phase: DiaryPhase, entry: String) {
        match phase {
            DiaryPhase::Before => self.before = entry,
            DiaryPhase::During => self.during = entry,
            DiaryPhase::After => self.after = entry,
        }
    }

    pub fn is_empty(&self) -> bool {
        DiaryPhase::ALL.iter().all(|p| self.get(*p).trim().is_empty())
    }
}

/// One entry inside a marketing section: plain copy, or a record such as
/// `{subject, preview, body}` for an email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetItem {
    Text(String),
    Record(BTreeMap<String, serde_json::Value>),
    Other(serde_json::Value),
}

impl AssetItem {
    /// First non-empty string among `keys`.
    pub fn field(&self, keys: &[&str]) -> Option<&str> {
        let Self::Record(fields) = self else {
            return None;
        };
        keys.iter()
            .filter_map(|k| fields.get(*k).and_then(|v| v.as_str()))
            .find(|s| !s.trim().is_empty())
    }
}

/// The model is free to answer a section with a flat list, a map of named
/// groups, or a single block of prose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetSection {
    Text(String),
    Items(Vec<AssetItem>),
    Groups(BTreeMap<String, AssetSection>),
    Other(serde_json::Value),
}

impl AssetSection {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Items(items) => items.is_empty(),
            Self::Groups(groups) => groups.values().all(AssetSection::is_empty),
            Self::Other(value) => value.is_null(),
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            Self::Text(text) if text.trim().is_empty() => 0,
            Self::Text(_) | Self::Other(_) => 1,
            Self::Items(items) => items.len(),
            Self::Groups(groups) => groups.values().map(AssetSection::item_count).sum(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketingAssets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headlines: Option<AssetSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_sequences: Option<AssetSection>,
    #[serde(default, alias = "social_posts", skip_serializing_if = "Option::is_none")]
    pub social_media: Option<AssetSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_copy: Option<AssetSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_scripts: Option<AssetSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_pillars: Option<AssetSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_assets: Option<AssetSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_campaign: Option<AssetSection>,
    /// Sections outside the list above (lead magnets, webinar outline, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, AssetSection>,
}

impl MarketingAssets {
    /// Named sections in export order, skipping absent ones.
    pub fn sections(&self) -> Vec<(&str, &AssetSection)> {
        let known = [
            ("headlines", &self.headlines),
            ("email_sequences", &self.email_sequences),
            ("social_media", &self.social_media),
            ("ad_copy", &self.ad_copy),
            ("video_scripts", &self.video_scripts),
            ("content_pillars", &self.content_pillars),
            ("conversion_assets", &self.conversion_assets),
            ("launch_campaign", &self.launch_campaign),
        ];
        known
            .into_iter()
            .filter_map(|(name, section)| section.as_ref().map(|s| (name, s)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v)))
            .filter(|(_, s)| !s.is_empty())
            .collect()
    }

    pub fn total_items(&self) -> usize {
        self.sections().iter().map(|(_, s)| s.item_count()).sum()
    }
}

/// Everything the audience research flow has produced so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchSession {
    /// Questionnaire answers keyed by question id.
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(default)]
    pub avatars: BTreeMap<AwarenessStage, Avatar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diary: Option<DiaryEntries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_page_spec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_assets: Option<MarketingAssets>,
}

impl ResearchSession {
    pub fn problem_aware(&self) -> Option<&Avatar> {
        self.avatars.get(&AwarenessStage::ProblemAware)
    }

    pub fn answer(&self, id: &str) -> Option<&str> {
        self.answers
            .get(id)
            .map(String::as_str)
            .filter(|a| !a.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_keeps_unknown_sections() -> anyhow::Result<()> {
        let raw = r#"{
            "name": "David Chen",
            "tagline": "Drowning in billable hours",
            "stage": "problem_aware",
            "demographics": {"age_range": "38-45", "occupation": "Attorney"},
            "empathy_map": {"thinks": "There has to be a better way"}
        }"#;
        let avatar: Avatar = serde_json::from_str(raw)?;
        assert_eq!(avatar.stage, AwarenessStage::ProblemAware);
        assert_eq!(
            avatar.demographics.as_ref().map(|d| d.occupation.as_str()),
            Some("Attorney")
        );
        assert!(avatar.extra.contains_key("empathy_map"));

        let back = serde_json::to_value(&avatar)?;
        assert_eq!(back["empathy_map"]["thinks"], "There has to be a better way");
        Ok(())
    }

    #[test]
    fn marketing_accepts_grouped_and_flat_sections() -> anyhow::Result<()> {
        let raw = r#"{
            "headlines": {"curiosity": ["a", "b"], "benefit_driven": ["c"]},
            "email_sequences": {"welcome_sequence": [{"subject": "Hi", "body": "Welcome"}]},
            "social_posts": [{"platform": "x", "content": "post"}],
            "webinar_outline": "Intro, demo, offer"
        }"#;
        let assets: MarketingAssets = serde_json::from_str(raw)?;
        assert!(matches!(assets.headlines, Some(AssetSection::Groups(_))));
        assert!(assets.social_media.is_some());
        assert!(assets.extra.contains_key("webinar_outline"));
        assert_eq!(assets.total_items(), 3 + 1 + 1 + 1);
        Ok(())
    }

    #[test]
    fn record_field_falls_back() -> anyhow::Result<()> {
        let item: AssetItem =
            serde_json::from_value(serde_json::json!({"title": "Subject line", "content": "x"}))?;
        assert_eq!(item.field(&["subject", "title"]), Some("Subject line"));
        assert_eq!(item.field(&["missing"]), None);
        Ok(())
    }

    #[test]
    fn session_keys_avatars_by_stage_name() -> anyhow::Result<()> {
        let raw = r#"{"avatars": {"problem_aware": {"name": "Dana", "stage": "problem_aware"}}}"#;
        let session: ResearchSession = serde_json::from_str(raw)?;
        assert_eq!(session.problem_aware().map(|a| a.name.as_str()), Some("Dana"));
        let back = serde_json::to_value(&session)?;
        assert_eq!(back["avatars"]["problem_aware"]["name"], "Dana");
        Ok(())
    }

    #[test]
    fn diary_is_empty_until_an_entry_lands() {
        let mut diary = DiaryEntries::default();
        assert!(diary.is_empty());
        diary.set(DiaryPhase::During, "Day one".to_owned());
        assert!(!diary.is_empty());
        assert_eq!(diary.get(DiaryPhase::During), "Day one");
    }
}
