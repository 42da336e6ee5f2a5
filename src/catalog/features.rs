use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    Content,
    Code,
    Math,
    Design,
    Visual,
    Interactive,
    Myst,
}

impl FeatureCategory {
    pub const ALL: [FeatureCategory; 7] = [
        Self::Content,
        Self::Code,
        Self::Math,
        Self::Design,
        Self::Visual,
        Self::Interactive,
        Self::Myst,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Code => "code",
            Self::Math => "math",
            Self::Design => "design",
            Self::Visual => "visual",
            Self::Interactive => "interactive",
            Self::Myst => "myst",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Content => "Content & Structure",
            Self::Code => "Code & Execution",
            Self::Math => "Mathematics",
            Self::Design => "Design Components",
            Self::Visual => "Visual Elements",
            Self::Interactive => "Interactive",
            Self::Myst => "MyST Extensions",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    pub id: &'static str,
    pub name: &'static str,
    pub category: FeatureCategory,
    pub description: &'static str,
    /// Initial state in the selector; user choices never mutate the catalog.
    pub enabled_by_default: bool,
}

pub const FEATURES: &[Feature] = &[
    Feature {
        id: "admonitions",
        name: "Admonitions",
        category: FeatureCategory::Content,
        description: "Notes, warnings, tips, and other callout boxes",
        enabled_by_default: true,
    },
    Feature {
        id: "dropdowns",
        name: "Dropdowns",
        category: FeatureCategory::Content,
        description: "Collapsible content sections",
        enabled_by_default: false,
    },
    Feature {
        id: "admonition_dropdowns",
        name: "Dropdown Admonitions",
        category: FeatureCategory::Content,
        description: "Admonitions with collapsible content",
        enabled_by_default: false,
    },
    Feature {
        id: "definition_lists",
        name: "Definition Lists",
        category: FeatureCategory::Content,
        description: "Term and definition pairs",
        enabled_by_default: false,
    },
    Feature {
        id: "blockquotes",
        name: "Blockquotes",
        category: FeatureCategory::Content,
        description: "Standard markdown blockquotes",
        enabled_by_default: true,
    },
    Feature {
        id: "epigraphs",
        name: "Epigraphs",
        category: FeatureCategory::Content,
        description: "Styled quotations with attribution",
        enabled_by_default: false,
    },
    Feature {
        id: "glossary",
        name: "Glossary",
        category: FeatureCategory::Content,
        description: "Define terms in a glossary",
        enabled_by_default: false,
    },
    Feature {
        id: "footnotes",
        name: "Footnotes",
        category: FeatureCategory::Content,
        description: "Reference-style footnotes",
        enabled_by_default: true,
    },
    Feature {
        id: "sidebar",
        name: "Sidebar Content",
        category: FeatureCategory::Content,
        description: "Content in page margins",
        enabled_by_default: false,
    },
    Feature {
        id: "margin_notes",
        name: "Margin Notes",
        category: FeatureCategory::Content,
        description: "Notes displayed in page margins",
        enabled_by_default: false,
    },
    Feature {
        id: "code_blocks",
        name: "Code Blocks",
        category: FeatureCategory::Code,
        description: "Syntax-highlighted code blocks",
        enabled_by_default: true,
    },
    Feature {
        id: "code_execution",
        name: "Executable Code Cells",
        category: FeatureCategory::Code,
        description: "Execute code and display outputs",
        enabled_by_default: false,
    },
    Feature {
        id: "code_cell_tags",
        name: "Code Cell Tags",
        category: FeatureCategory::Code,
        description: "Tags for hiding/showing code cells (hide-input, hide-output, remove-cell, etc.)",
        enabled_by_default: false,
    },
    Feature {
        id: "output_gluing",
        name: "Output Gluing",
        category: FeatureCategory::Code,
        description: "Store and reuse code outputs throughout the book",
        enabled_by_default: false,
    },
    Feature {
        id: "thebe",
        name: "Thebe (Live Code)",
        category: FeatureCategory::Code,
        description: "Interactive code execution in the browser",
        enabled_by_default: false,
    },
    Feature {
        id: "binder_buttons",
        name: "Binder/Colab Buttons",
        category: FeatureCategory::Code,
        description: "Launch interactive notebooks",
        enabled_by_default: false,
    },
    Feature {
        id: "scroll_output",
        name: "Scrollable Output",
        category: FeatureCategory::Code,
        description: "Make long code outputs scrollable",
        enabled_by_default: false,
    },
    Feature {
        id: "line_numbers",
        name: "Code Line Numbers",
        category: FeatureCategory::Code,
        description: "Display line numbers in code blocks",
        enabled_by_default: false,
    },
    Feature {
        id: "math_equations",
        name: "Math Equations",
        category: FeatureCategory::Math,
        description: "LaTeX-style mathematical equations",
        enabled_by_default: true,
    },
    Feature {
        id: "amsmath",
        name: "AMS Math",
        category: FeatureCategory::Math,
        description: "Advanced math environments (align, gather, etc.)",
        enabled_by_default: false,
    },
    Feature {
        id: "math_labels",
        name: "Equation Labels",
        category: FeatureCategory::Math,
        description: "Label and reference equations",
        enabled_by_default: false,
    },
    Feature {
        id: "theorems",
        name: "Theorems",
        category: FeatureCategory::Math,
        description: "Theorem environments",
        enabled_by_default: false,
    },
    Feature {
        id: "proofs",
        name: "Proofs",
        category: FeatureCategory::Math,
        description: "Mathematical proof environments",
        enabled_by_default: false,
    },
    Feature {
        id: "algorithms",
        name: "Algorithms",
        category: FeatureCategory::Math,
        description: "Algorithm pseudocode environments",
        enabled_by_default: false,
    },
    Feature {
        id: "lemmas",
        name: "Lemmas",
        category: FeatureCategory::Math,
        description: "Lemma environments",
        enabled_by_default: false,
    },
    Feature {
        id: "corollaries",
        name: "Corollaries",
        category: FeatureCategory::Math,
        description: "Corollary environments",
        enabled_by_default: false,
    },
    Feature {
        id: "definitions",
        name: "Mathematical Definitions",
        category: FeatureCategory::Math,
        description: "Definition environments",
        enabled_by_default: false,
    },
    Feature {
        id: "grids",
        name: "Grids",
        category: FeatureCategory::Design,
        description: "Grid-based layouts for content",
        enabled_by_default: false,
    },
    Feature {
        id: "cards",
        name: "Cards",
        category: FeatureCategory::Design,
        description: "Card-style content blocks",
        enabled_by_default: false,
    },
    Feature {
        id: "tabs",
        name: "Tabs",
        category: FeatureCategory::Design,
        description: "Tabbed content sections",
        enabled_by_default: false,
    },
    Feature {
        id: "badges",
        name: "Badges",
        category: FeatureCategory::Design,
        description: "Inline badges for labels",
        enabled_by_default: false,
    },
    Feature {
        id: "buttons",
        name: "Buttons",
        category: FeatureCategory::Design,
        description: "Clickable button elements",
        enabled_by_default: false,
    },
    Feature {
        id: "icons",
        name: "Icons",
        category: FeatureCategory::Design,
        description: "Octicon and FontAwesome icons",
        enabled_by_default: false,
    },
    Feature {
        id: "grid_cards",
        name: "Grid Cards",
        category: FeatureCategory::Design,
        description: "Cards arranged in responsive grids",
        enabled_by_default: false,
    },
    Feature {
        id: "custom_divs",
        name: "Custom Div Blocks",
        category: FeatureCategory::Design,
        description: "Custom HTML div containers with classes",
        enabled_by_default: false,
    },
    Feature {
        id: "figures",
        name: "Figures",
        category: FeatureCategory::Visual,
        description: "Images with captions and references",
        enabled_by_default: true,
    },
    Feature {
        id: "images",
        name: "Images",
        category: FeatureCategory::Visual,
        description: "Basic image insertion",
        enabled_by_default: true,
    },
    Feature {
        id: "html_images",
        name: "HTML Images",
        category: FeatureCategory::Visual,
        description: "Images using HTML img tags",
        enabled_by_default: false,
    },
    Feature {
        id: "mermaid_diagrams",
        name: "Mermaid Diagrams",
        category: FeatureCategory::Visual,
        description: "Flowcharts, sequence diagrams, and more",
        enabled_by_default: false,
    },
    Feature {
        id: "tables",
        name: "Tables",
        category: FeatureCategory::Visual,
        description: "Markdown and list-style tables",
        enabled_by_default: true,
    },
    Feature {
        id: "quizzes",
        name: "Quizzes",
        category: FeatureCategory::Interactive,
        description: "Interactive quiz questions",
        enabled_by_default: false,
    },
    Feature {
        id: "exercise",
        name: "Exercises",
        category: FeatureCategory::Interactive,
        description: "Interactive exercise blocks",
        enabled_by_default: false,
    },
    Feature {
        id: "interactive_plots",
        name: "Interactive Plots",
        category: FeatureCategory::Interactive,
        description: "Plotly, Bokeh, and other interactive visualizations",
        enabled_by_default: false,
    },
    Feature {
        id: "widgets",
        name: "Jupyter Widgets",
        category: FeatureCategory::Interactive,
        description: "Interactive ipywidgets",
        enabled_by_default: false,
    },
    Feature {
        id: "colon_fence",
        name: "Colon Fence (:::)",
        category: FeatureCategory::Myst,
        description: "Use ::: for directives instead of ```",
        enabled_by_default: false,
    },
    Feature {
        id: "substitutions",
        name: "Substitutions",
        category: FeatureCategory::Myst,
        description: "Define and reuse variables in markdown",
        enabled_by_default: false,
    },
    Feature {
        id: "smartquotes",
        name: "Smart Quotes",
        category: FeatureCategory::Myst,
        description: "Automatically convert quotes to smart quotes",
        enabled_by_default: false,
    },
    Feature {
        id: "linkify",
        name: "Linkify",
        category: FeatureCategory::Myst,
        description: "Auto-detect and convert URLs to links",
        enabled_by_default: true,
    },
    Feature {
        id: "replacements",
        name: "Text Replacements",
        category: FeatureCategory::Myst,
        description: "Automatic text replacements (e.g., (c) to ©)",
        enabled_by_default: false,
    },
    Feature {
        id: "tasklists",
        name: "Task Lists",
        category: FeatureCategory::Myst,
        description: "GitHub-style checkboxes [ ] and [x]",
        enabled_by_default: false,
    },
    Feature {
        id: "html_admonition",
        name: "HTML Admonitions",
        category: FeatureCategory::Myst,
        description: "Define admonitions using HTML div tags",
        enabled_by_default: false,
    },
    Feature {
        id: "attrs_inline",
        name: "Inline Attributes",
        category: FeatureCategory::Myst,
        description: "Add attributes to inline elements",
        enabled_by_default: false,
    },
    Feature {
        id: "attrs_block",
        name: "Block Attributes",
        category: FeatureCategory::Myst,
        description: "Add attributes to block elements",
        enabled_by_default: false,
    },
    Feature {
        id: "cross_references",
        name: "Cross-References",
        category: FeatureCategory::Content,
        description: "Reference sections, figures, and tables",
        enabled_by_default: true,
    },
    Feature {
        id: "target_headers",
        name: "Target Headers",
        category: FeatureCategory::Content,
        description: "Create custom reference targets",
        enabled_by_default: true,
    },
    Feature {
        id: "citations",
        name: "Citations & Bibliography",
        category: FeatureCategory::Content,
        description: "BibTeX-style citations",
        enabled_by_default: false,
    },
    Feature {
        id: "numbered_references",
        name: "Numbered References",
        category: FeatureCategory::Content,
        description: "Numbered cross-references to figures and tables",
        enabled_by_default: false,
    },
    Feature {
        id: "line_comments",
        name: "Line Comments",
        category: FeatureCategory::Content,
        description: "Comments with % that don't render",
        enabled_by_default: true,
    },
    Feature {
        id: "block_breaks",
        name: "Block Breaks",
        category: FeatureCategory::Content,
        description: "Break blocks with +++ syntax",
        enabled_by_default: false,
    },
    Feature {
        id: "html_blocks",
        name: "HTML Blocks",
        category: FeatureCategory::Content,
        description: "Raw HTML in markdown",
        enabled_by_default: false,
    },
    Feature {
        id: "reference_style_links",
        name: "Reference-Style Links",
        category: FeatureCategory::Content,
        description: "Define links separately from text",
        enabled_by_default: true,
    },
    Feature {
        id: "thematic_breaks",
        name: "Thematic Breaks",
        category: FeatureCategory::Content,
        description: "Horizontal rules with ---",
        enabled_by_default: true,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Minimal,
    Standard,
    Technical,
    Course,
    Research,
    Complete,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Self::Minimal,
        Self::Standard,
        Self::Technical,
        Self::Course,
        Self::Research,
        Self::Complete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Standard => "standard",
            Self::Technical => "technical",
            Self::Course => "course",
            Self::Research => "research",
            Self::Complete => "complete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Minimal => "Minimal",
            Self::Standard => "Standard",
            Self::Technical => "Technical Book",
            Self::Course => "Course/Tutorial",
            Self::Research => "Research Paper",
            Self::Complete => "All Features",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Minimal => "Basic markdown features only",
            Self::Standard => "Common features for most books",
            Self::Technical => "Features for technical documentation",
            Self::Course => "Interactive learning features",
            Self::Research => "Academic and research features",
            Self::Complete => "Enable everything",
        }
    }

    pub fn feature_ids(self) -> Vec<&'static str> {
        match self {
            Self::Minimal => MINIMAL.to_vec(),
            Self::Standard => STANDARD.to_vec(),
            Self::Technical => TECHNICAL.to_vec(),
            Self::Course => COURSE.to_vec(),
            Self::Research => RESEARCH.to_vec(),
            Self::Complete => FEATURES.iter().map(|f| f.id).collect(),
        }
    }
}

const MINIMAL: &[&str] = &[
    "admonitions",
    "blockquotes",
    "code_blocks",
    "figures",
    "images",
    "tables",
    "math_equations",
    "cross_references",
    "target_headers",
    "footnotes",
];

const STANDARD: &[&str] = &[
    "admonitions",
    "blockquotes",
    "code_blocks",
    "figures",
    "images",
    "tables",
    "math_equations",
    "cross_references",
    "target_headers",
    "footnotes",
    "dropdowns",
    "cards",
    "grids",
    "tabs",
    "code_cell_tags",
    "linkify",
];

const TECHNICAL: &[&str] = &[
    "admonitions",
    "code_blocks",
    "code_execution",
    "code_cell_tags",
    "output_gluing",
    "figures",
    "tables",
    "math_equations",
    "theorems",
    "proofs",
    "algorithms",
    "cross_references",
    "citations",
    "grids",
    "tabs",
    "mermaid_diagrams",
];

const COURSE: &[&str] = &[
    "admonitions",
    "dropdowns",
    "code_blocks",
    "code_execution",
    "quizzes",
    "exercise",
    "tabs",
    "cards",
    "grids",
    "figures",
    "thebe",
    "binder_buttons",
    "interactive_plots",
];

const RESEARCH: &[&str] = &[
    "admonitions",
    "figures",
    "tables",
    "math_equations",
    "amsmath",
    "theorems",
    "proofs",
    "lemmas",
    "corollaries",
    "definitions",
    "citations",
    "numbered_references",
    "cross_references",
    "footnotes",
    "code_blocks",
];

pub fn feature(id: &str) -> Option<&'static Feature> {
    FEATURES.iter().find(|f| f.id == id)
}

pub fn features_in(category: FeatureCategory) -> impl Iterator<Item = &'static Feature> {
    FEATURES.iter().filter(move |f| f.category == category)
}

pub fn default_feature_ids() -> Vec<&'static str> {
    FEATURES
        .iter()
        .filter(|f| f.enabled_by_default)
        .map(|f| f.id)
        .collect()
}

/// Case-insensitive match on name or description, optionally narrowed to one category.
pub fn search(query: &str, category: Option<FeatureCategory>) -> Vec<&'static Feature> {
    let query = query.trim().to_lowercase();
    FEATURES
        .iter()
        .filter(|f| category.is_none_or(|c| f.category == c))
        .filter(|f| {
            query.is_empty()
                || f.name.to_lowercase().contains(&query)
                || f.description.to_lowercase().contains(&query)
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
#[error("unknown feature: {0}")]
pub struct UnknownFeature(pub String);

/// A user's chosen feature set, kept apart from the immutable catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSelection {
    enabled: BTreeSet<&'static str>,
}

impl FeatureSelection {
    pub fn catalog_defaults() -> Self {
        Self {
            enabled: default_feature_ids().into_iter().collect(),
        }
    }

    /// Unknown ids are dropped; persisted selections may predate catalog changes.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let enabled = ids
            .into_iter()
            .filter_map(|id| feature(id.as_ref()).map(|f| f.id))
            .collect();
        Self { enabled }
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.contains(id)
    }

    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    pub fn toggle(&mut self, id: &str) -> Result<bool, UnknownFeature> {
        let feature = feature(id).ok_or_else(|| UnknownFeature(id.to_owned()))?;
        if self.enabled.remove(feature.id) {
            Ok(false)
        } else {
            self.enabled.insert(feature.id);
            Ok(true)
        }
    }

    pub fn set(&mut self, id: &str, on: bool) -> Result<(), UnknownFeature> {
        let feature = feature(id).ok_or_else(|| UnknownFeature(id.to_owned()))?;
        if on {
            self.enabled.insert(feature.id);
        } else {
            self.enabled.remove(feature.id);
        }
        Ok(())
    }

    /// Turns the whole category on when any member is off, otherwise turns it off.
    pub fn toggle_category(&mut self, category: FeatureCategory) {
        let all_on = features_in(category).all(|f| self.enabled.contains(f.id));
        for f in features_in(category) {
            if all_on {
                self.enabled.remove(f.id);
            } else {
                self.enabled.insert(f.id);
            }
        }
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        self.enabled = preset.feature_ids().into_iter().collect();
    }

    pub fn enable_all(&mut self) {
        self.apply_preset(Preset::Complete);
    }

    pub fn reset(&mut self) {
        *self = Self::catalog_defaults();
    }

    /// Enabled ids in catalog order.
    pub fn ids(&self) -> Vec<String> {
        FEATURES
            .iter()
            .filter(|f| self.enabled.contains(f.id))
            .map(|f| f.id.to_owned())
            .collect()
    }

    pub fn count_in(&self, category: FeatureCategory) -> (usize, usize) {
        let total = features_in(category).count();
        let on = features_in(category)
            .filter(|f| self.enabled.contains(f.id))
            .count();
        (on, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_ids_are_unique() {
        let ids: BTreeSet<_> = FEATURES.iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), FEATURES.len());
    }

    #[test]
    fn preset_ids_are_known_features() {
        for preset in Preset::ALL {
            for id in preset.feature_ids() {
                assert!(feature(id).is_some(), "{}: {id}", preset.as_str());
            }
        }
    }

    #[test]
    fn apply_preset_enables_exactly_the_preset() {
        for preset in Preset::ALL {
            let mut selection = FeatureSelection::catalog_defaults();
            selection.toggle("thebe").unwrap();
            selection.apply_preset(preset);

            let expected: BTreeSet<String> =
                preset.feature_ids().into_iter().map(str::to_owned).collect();
            let actual: BTreeSet<String> = selection.ids().into_iter().collect();
            assert_eq!(actual, expected, "{}", preset.as_str());
            for f in FEATURES {
                assert_eq!(selection.is_enabled(f.id), expected.contains(f.id));
            }

            let once = selection.clone();
            selection.apply_preset(preset);
            assert_eq!(selection, once);
        }
    }

    #[test]
    fn complete_preset_covers_catalog() {
        let mut selection = FeatureSelection::default();
        selection.enable_all();
        assert_eq!(selection.len(), FEATURES.len());
    }

    #[test]
    fn toggle_category_fills_then_clears() {
        let mut selection = FeatureSelection::default();
        selection.set("proofs", true).unwrap();

        selection.toggle_category(FeatureCategory::Math);
        assert_eq!(selection.count_in(FeatureCategory::Math), (9, 9));

        selection.toggle_category(FeatureCategory::Math);
        assert_eq!(selection.count_in(FeatureCategory::Math), (0, 9));
    }

    #[test]
    fn toggle_rejects_unknown_ids() {
        let mut selection = FeatureSelection::default();
        assert!(selection.toggle("blink_tag").is_err());
        assert!(selection.is_empty());
    }

    #[test]
    fn from_ids_drops_unknown_and_reports_catalog_order() {
        let selection = FeatureSelection::from_ids(["tables", "bogus", "admonitions"]);
        assert_eq!(selection.ids(), vec!["admonitions", "tables"]);
    }

    #[test]
    fn search_matches_description_case_insensitively() {
        let hits = search("FLOWCHARTS", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "mermaid_diagrams");
        let math: Vec<&str> = search("code", Some(FeatureCategory::Math))
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(math, vec!["algorithms"]);
        assert!(search("video", Some(FeatureCategory::Math)).is_empty());
    }
}
