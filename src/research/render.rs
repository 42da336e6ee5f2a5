//! Markdown renderings of research results, one document per export.

use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::catalog::research::{AwarenessStage, DiaryPhase};
use crate::research::model::{AssetItem, AssetSection, Avatar, DiaryEntries, MarketingAssets, ResearchSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ResearchDocument {
    Avatars,
    Diary,
    Brand,
    LandingPage,
    Marketing,
    All,
}

impl ResearchDocument {
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Avatars => "customer-avatars-5-stages",
            Self::Diary => "customer-journey-diary",
            Self::Brand => "brand-identity-system",
            Self::LandingPage => "landing-page-spec",
            Self::Marketing => "marketing-assets-kit",
            Self::All => "complete-audience-marketing-package",
        }
    }

    /// `None` when the session has nothing for this document yet.
    pub fn render(self, session: &ResearchSession, generated: NaiveDate) -> Option<String> {
        match self {
            Self::Avatars => (!session.avatars.is_empty()).then(|| avatars(session)),
            Self::Diary => session.diary.as_ref().map(diary),
            Self::Brand => session.brand_identity.as_deref().map(brand_identity),
            Self::LandingPage => session.landing_page_spec.as_deref().map(landing_page),
            Self::Marketing => session.marketing_assets.as_ref().map(marketing),
            Self::All => {
                let has_any = !session.avatars.is_empty()
                    || session.diary.is_some()
                    || session.brand_identity.is_some()
                    || session.landing_page_spec.is_some()
                    || session.marketing_assets.is_some();
                has_any.then(|| package(session, generated))
            }
        }
    }
}

const EXPORT_ORDER: [(AwarenessStage, &str, Option<&str>); 5] = [
    (AwarenessStage::ProblemAware, "⭐", Some("PRIMARY AUDIENCE")),
    (AwarenessStage::SolutionAware, "🤔", None),
    (AwarenessStage::ProductAware, "🧐", None),
    (AwarenessStage::MostAware, "💡", None),
    (AwarenessStage::Unaware, "😴", None),
];

pub fn avatars(session: &ResearchSession) -> String {
    let mut md = String::from("# Customer Avatars - 5 Stages of Market Awareness\n\n");
    md.push_str("*Based on Eugene Schwartz's Breakthrough Advertising*\n\n");
    for (stage, emoji, note) in EXPORT_ORDER {
        if let Some(avatar) = session.avatars.get(&stage) {
            avatar_section(&mut md, avatar, emoji, note);
        }
    }
    md
}

fn avatar_section(md: &mut String, avatar: &Avatar, emoji: &str, note: Option<&str>) {
    let stage = avatar.stage.as_str().replace('_', " ").to_uppercase();
    let _ = write!(md, "\n## {emoji} {} - {stage}\n\n", avatar.name);
    if let Some(note) = note {
        let _ = write!(md, "**{note}**\n\n");
    }
    let _ = write!(md, "> {}\n\n", avatar.tagline);

    if let Some(d) = &avatar.demographics {
        md.push_str("### Demographics\n");
        let _ = writeln!(md, "- **Age:** {}", d.age_range);
        let _ = writeln!(md, "- **Occupation:** {}", d.occupation);
        let _ = writeln!(md, "- **Income:** {}", d.income);
        let _ = write!(md, "- **Life Stage:** {}\n\n", d.life_stage);
    }

    if let Some(p) = &avatar.psychographics {
        let _ = write!(md, "### Current Situation\n\n{}\n\n", p.situation);
        bullet_block(md, "Pain Points", &p.pain_points);
        bullet_block(md, "Desires", &p.desires);
    }

    if let Some(b) = &avatar.buyer_psychology {
        md.push_str("### Buyer Psychology\n\n");
        let _ = write!(md, "**Awareness Level:** {}\n\n", b.awareness_level);
        bullet_block(md, "Key Insights", &b.key_insights);
    }

    md.push_str("---\n");
}

fn bullet_block(md: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(md, "**{label}:**");
    for item in items {
        let _ = writeln!(md, "- {item}");
    }
    md.push('\n');
}

pub fn diary(entries: &DiaryEntries) -> String {
    let mut md = String::from("# Customer Journey Diary\n\n");
    md.push_str("*First-person emotional journey of your Problem Aware customer*\n\n---\n\n");
    let emoji = |phase: DiaryPhase| match phase {
        DiaryPhase::Before => "😔",
        DiaryPhase::During => "🌱",
        DiaryPhase::After => "✨",
    };
    for (idx, phase) in DiaryPhase::ALL.into_iter().enumerate() {
        if idx > 0 {
            md.push_str("---\n\n");
        }
        let _ = write!(
            md,
            "## {} {}\n\n{}\n\n",
            emoji(phase),
            phase.heading(),
            entries.get(phase)
        );
    }
    md
}

pub fn brand_identity(markdown: &str) -> String {
    format!(
        "# Brand Identity System\n\n*Optimized for your Problem Aware audience*\n\n---\n\n{markdown}"
    )
}

pub fn landing_page(markdown: &str) -> String {
    format!(
        "# Landing Page Specification\n\n*Complete PRD for building a high-converting landing page*\n\n---\n\n{markdown}"
    )
}

/// How the entries of one marketing section are laid out.
struct ItemLayout {
    label: &'static str,
    /// Appended to the item heading (`Post 2 - LinkedIn`).
    heading_keys: &'static [&'static str],
    meta: &'static [(&'static str, &'static [&'static str])],
    body_keys: &'static [&'static str],
    trailer: &'static [(&'static str, &'static [&'static str])],
}

const EMAIL: ItemLayout = ItemLayout {
    label: "Email",
    heading_keys: &[],
    meta: &[("Subject", &["subject", "title"])],
    body_keys: &["body", "content"],
    trailer: &[],
};

const SOCIAL: ItemLayout = ItemLayout {
    label: "Post",
    heading_keys: &["platform"],
    meta: &[("Type", &["type"])],
    body_keys: &["content", "text"],
    trailer: &[("Hashtags", &["hashtags"])],
};

const AD: ItemLayout = ItemLayout {
    label: "Ad",
    heading_keys: &["platform"],
    meta: &[("Format", &["format"]), ("Headline", &["headline"])],
    body_keys: &["body", "content"],
    trailer: &[("CTA", &["cta"])],
};

const VIDEO: ItemLayout = ItemLayout {
    label: "Video",
    heading_keys: &[],
    meta: &[("Type", &["type"]), ("Title", &["title"])],
    body_keys: &["script", "content"],
    trailer: &[],
};

const PILLAR: ItemLayout = ItemLayout {
    label: "Pillar",
    heading_keys: &["name", "title"],
    meta: &[],
    body_keys: &["description"],
    trailer: &[],
};

pub fn marketing(assets: &MarketingAssets) -> String {
    let mut md = String::from("# Marketing Assets Kit\n\n");
    md.push_str("*Ready-to-use marketing assets for your Problem Aware audience*\n\n---\n\n");

    for (name, section) in assets.sections() {
        let _ = write!(md, "## {}\n\n", section_title(name));
        match name {
            "headlines" => numbered_section(&mut md, section),
            "email_sequences" => laid_out_section(&mut md, section, &EMAIL),
            "social_media" => laid_out_section(&mut md, section, &SOCIAL),
            "ad_copy" => laid_out_section(&mut md, section, &AD),
            "video_scripts" => laid_out_section(&mut md, section, &VIDEO),
            "content_pillars" => laid_out_section(&mut md, section, &PILLAR),
            _ => generic_section(&mut md, section),
        }
        md.push_str("---\n\n");
    }
    md
}

fn section_title(name: &str) -> String {
    match name {
        "headlines" => "Headlines".to_owned(),
        "email_sequences" => "Email Sequences".to_owned(),
        "social_media" => "Social Media Posts".to_owned(),
        "ad_copy" => "Ad Copy".to_owned(),
        "video_scripts" => "Video Scripts".to_owned(),
        "content_pillars" => "Content Pillars & Ideas".to_owned(),
        "conversion_assets" => "Conversion Assets".to_owned(),
        "launch_campaign" => "Launch Campaign".to_owned(),
        other => title_case(other),
    }
}

fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn group_heading(key: &str) -> String {
    key.replace('_', " ").to_uppercase()
}

fn numbered_section(md: &mut String, section: &AssetSection) {
    match section {
        AssetSection::Groups(groups) => {
            for (key, group) in groups {
                let _ = write!(md, "### {}\n\n", group_heading(key));
                numbered_section(md, group);
            }
        }
        AssetSection::Items(items) => {
            for (idx, item) in items.iter().enumerate() {
                let _ = writeln!(md, "{}. {}", idx + 1, inline_text(item));
            }
            md.push('\n');
        }
        other => generic_section(md, other),
    }
}

fn laid_out_section(md: &mut String, section: &AssetSection, layout: &ItemLayout) {
    match section {
        AssetSection::Groups(groups) => {
            for (key, group) in groups {
                let _ = write!(md, "### {}\n\n", group_heading(key));
                laid_out_section(md, group, layout);
            }
        }
        AssetSection::Items(items) => {
            for (idx, item) in items.iter().enumerate() {
                laid_out_item(md, idx + 1, item, layout);
            }
        }
        other => generic_section(md, other),
    }
}

fn laid_out_item(md: &mut String, number: usize, item: &AssetItem, layout: &ItemLayout) {
    let suffix = item.field(layout.heading_keys);
    match suffix {
        Some(s) if layout.label == "Pillar" => {
            let _ = write!(md, "**{} {number}: {s}**\n\n", layout.label);
        }
        Some(s) => {
            let _ = write!(md, "**{} {number} - {s}**\n\n", layout.label);
        }
        None => {
            let _ = write!(md, "**{} {number}**\n\n", layout.label);
        }
    }

    if let AssetItem::Text(text) = item {
        let _ = write!(md, "{text}\n\n");
        return;
    }
    for (label, keys) in layout.meta {
        if let Some(value) = item.field(keys) {
            let _ = write!(md, "**{label}:** {value}\n\n");
        }
    }
    if let Some(preview) = item.field(&["preview"]) {
        let _ = write!(md, "*{preview}*\n\n");
    }
    if let Some(body) = item.field(layout.body_keys) {
        let _ = write!(md, "{body}\n\n");
    }
    if let AssetItem::Record(fields) = item
        && let Some(serde_json::Value::Array(ideas)) = fields.get("ideas")
    {
        md.push_str("**Content Ideas:**\n\n");
        for idea in ideas.iter().filter_map(|i| i.as_str()) {
            let _ = writeln!(md, "- {idea}");
        }
        md.push('\n');
    }
    for (label, keys) in layout.trailer {
        if let Some(value) = item.field(keys) {
            let _ = write!(md, "**{label}:** {value}\n\n");
        }
    }
}

fn generic_section(md: &mut String, section: &AssetSection) {
    match section {
        AssetSection::Text(text) => {
            let _ = write!(md, "{text}\n\n");
        }
        AssetSection::Items(items) => {
            for item in items {
                match item {
                    AssetItem::Record(fields) => {
                        for (key, value) in fields {
                            let _ = write!(md, "**{}:** {}\n\n", title_case(key), value_text(value));
                        }
                    }
                    other => {
                        let _ = writeln!(md, "- {}", inline_text(other));
                    }
                }
            }
            md.push('\n');
        }
        AssetSection::Groups(groups) => {
            for (key, group) in groups {
                let _ = write!(md, "### {}\n\n", group_heading(key));
                generic_section(md, group);
            }
        }
        AssetSection::Other(value) => {
            let _ = write!(md, "{}\n\n", value_text(value));
        }
    }
}

fn inline_text(item: &AssetItem) -> String {
    match item {
        AssetItem::Text(text) => text.clone(),
        AssetItem::Record(_) => item
            .field(&["headline", "title", "text", "content", "name"])
            .map(str::to_owned)
            .unwrap_or_default(),
        AssetItem::Other(value) => value_text(value),
    }
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

pub fn package(session: &ResearchSession, generated: NaiveDate) -> String {
    let mut md = String::from("# Complete Audience Research & Marketing Package\n\n");
    md.push_str("*Generated with LiquidBooks Audience Research*\n\n");
    let _ = write!(md, "**Generated:** {}\n\n---\n\n", generated.format("%Y-%m-%d"));

    md.push_str("# Table of Contents\n\n");
    md.push_str("1. [Customer Avatars (All 5 Awareness Stages)](#customer-avatars)\n");
    md.push_str("2. [Customer Journey Diary](#customer-journey-diary)\n");
    md.push_str("3. [Brand Identity System](#brand-identity-system)\n");
    md.push_str("4. [Landing Page Specification](#landing-page-spec)\n");
    md.push_str("5. [Marketing Assets Kit](#marketing-assets-kit)\n\n---\n\n");

    let parts = [
        ("customer-avatars", (!session.avatars.is_empty()).then(|| avatars(session))),
        ("customer-journey-diary", session.diary.as_ref().map(diary)),
        ("brand-identity-system", session.brand_identity.as_deref().map(brand_identity)),
        ("landing-page-spec", session.landing_page_spec.as_deref().map(landing_page)),
        ("marketing-assets-kit", session.marketing_assets.as_ref().map(marketing)),
    ];
    for (anchor, body) in parts {
        let _ = write!(
            md,
            "<a name=\"{anchor}\"></a>\n\n{}\n\n---\n\n",
            body.unwrap_or_default()
        );
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::model::{Demographics, Psychographics};

    fn avatar(stage: AwarenessStage, name: &str) -> Avatar {
        Avatar {
            name: name.to_owned(),
            tagline: "Stuck".to_owned(),
            stage,
            demographics: Some(Demographics {
                age_range: "30-40".to_owned(),
                occupation: "Founder".to_owned(),
                ..Demographics::default()
            }),
            psychographics: Some(Psychographics {
                situation: "Overwhelmed".to_owned(),
                pain_points: vec!["No time".to_owned()],
                ..Psychographics::default()
            }),
            buyer_psychology: None,
            extra: Default::default(),
        }
    }

    #[test]
    fn avatars_list_problem_aware_first() {
        let mut session = ResearchSession::default();
        session
            .avatars
            .insert(AwarenessStage::Unaware, avatar(AwarenessStage::Unaware, "Uma"));
        session.avatars.insert(
            AwarenessStage::ProblemAware,
            avatar(AwarenessStage::ProblemAware, "Pat"),
        );
        let md = avatars(&session);
        assert!(md.starts_with("# Customer Avatars - 5 Stages of Market Awareness"));
        let pat = md.find("## ⭐ Pat - PROBLEM AWARE").unwrap_or(usize::MAX);
        let uma = md.find("## 😴 Uma - UNAWARE").unwrap_or(0);
        assert!(pat < uma);
        assert!(md.contains("**PRIMARY AUDIENCE**"));
        assert!(md.contains("**Pain Points:**\n- No time\n"));
    }

    #[test]
    fn diary_has_three_phases() {
        let entries = DiaryEntries {
            before: "B".to_owned(),
            during: "D".to_owned(),
            after: "A".to_owned(),
        };
        let md = diary(&entries);
        assert!(md.contains("## 😔 Before: Struggling with the Problem\n\nB"));
        assert!(md.contains("## ✨ After: Life After Transformation\n\nA"));
    }

    #[test]
    fn marketing_renders_grouped_headlines_and_emails() -> anyhow::Result<()> {
        let assets: MarketingAssets = serde_json::from_value(serde_json::json!({
            "headlines": {"curiosity": ["Why agencies fail", "The 30-day switch"]},
            "email_sequences": {
                "welcome_sequence": [{"subject": "Welcome", "preview": "Start here", "body": "Hello"}]
            },
            "lead_magnets": ["Checklist"]
        }))?;
        let md = marketing(&assets);
        assert!(md.contains("## Headlines\n\n### CURIOSITY\n\n1. Why agencies fail\n2. The 30-day switch"));
        assert!(md.contains("### WELCOME SEQUENCE"));
        assert!(md.contains("**Subject:** Welcome"));
        assert!(md.contains("*Start here*"));
        assert!(md.contains("## Lead Magnets\n\n- Checklist"));
        Ok(())
    }

    #[test]
    fn empty_session_renders_nothing() {
        let session = ResearchSession::default();
        let day = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap_or_default();
        assert!(ResearchDocument::All.render(&session, day).is_none());
        assert!(ResearchDocument::Brand.render(&session, day).is_none());
    }

    #[test]
    fn package_carries_date_and_sections() {
        let session = ResearchSession {
            brand_identity: Some("## Voice\n\nWarm".to_owned()),
            ..ResearchSession::default()
        };
        let day = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap_or_default();
        let md = ResearchDocument::All.render(&session, day).unwrap_or_default();
        assert!(md.contains("**Generated:** 2026-01-02"));
        assert!(md.contains("<a name=\"brand-identity-system\"></a>\n\n# Brand Identity System"));
    }
}
