use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookCategory {
    Technical,
    Nonfiction,
    Creative,
    Reference,
}

impl BookCategory {
    pub const ALL: [BookCategory; 4] = [
        Self::Technical,
        Self::Nonfiction,
        Self::Creative,
        Self::Reference,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Nonfiction => "nonfiction",
            Self::Creative => "creative",
            Self::Reference => "reference",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookType {
    pub id: &'static str,
    pub name: &'static str,
    pub category: BookCategory,
    pub description: &'static str,
    pub recommended_tones: &'static [&'static str],
    pub typical_chapter_range: (u32, u32),
    pub recommended_features: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogOption {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToneChoice {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub recommended: bool,
}

pub const BOOK_TYPES: &[BookType] = &[
    BookType {
        id: "programming_tutorial",
        name: "Programming Tutorial",
        category: BookCategory::Technical,
        description: "Step-by-step coding guide with executable examples",
        recommended_tones: &["conversational", "professional", "academic"],
        typical_chapter_range: (8, 15),
        recommended_features: &[
            "code_blocks",
            "interactive_plots",
            "quizzes",
            "tabs",
            "dropdowns",
            "admonitions",
            "cross_references",
        ],
    },
    BookType {
        id: "data_science",
        name: "Data Science & Analytics",
        category: BookCategory::Technical,
        description: "Statistical analysis and ML guides with visualizations",
        recommended_tones: &["academic", "professional"],
        typical_chapter_range: (10, 20),
        recommended_features: &[
            "code_blocks",
            "math_equations",
            "interactive_plots",
            "tables",
            "theorems",
            "admonitions",
            "figures",
        ],
    },
    BookType {
        id: "academic_course",
        name: "Academic Course",
        category: BookCategory::Technical,
        description: "Comprehensive educational course material",
        recommended_tones: &["academic", "professional"],
        typical_chapter_range: (12, 25),
        recommended_features: &[
            "code_blocks",
            "math_equations",
            "theorems",
            "quizzes",
            "citations",
            "cross_references",
            "admonitions",
        ],
    },
    BookType {
        id: "research_paper",
        name: "Research Paper",
        category: BookCategory::Technical,
        description: "Academic research with citations and proofs",
        recommended_tones: &["academic"],
        typical_chapter_range: (5, 10),
        recommended_features: &[
            "math_equations",
            "theorems",
            "citations",
            "figures",
            "tables",
            "cross_references",
        ],
    },
    BookType {
        id: "technical_documentation",
        name: "Technical Documentation",
        category: BookCategory::Technical,
        description: "API docs, developer guides, and technical references",
        recommended_tones: &["professional", "technical"],
        typical_chapter_range: (5, 15),
        recommended_features: &[
            "code_blocks",
            "tabs",
            "admonitions",
            "tables",
            "cross_references",
            "dropdowns",
        ],
    },
    BookType {
        id: "business_book",
        name: "Business Book",
        category: BookCategory::Nonfiction,
        description: "Business strategies, leadership, and management",
        recommended_tones: &["professional", "conversational", "inspirational"],
        typical_chapter_range: (10, 20),
        recommended_features: &["admonitions", "cards", "dropdowns", "figures", "quizzes"],
    },
    BookType {
        id: "how_to_guide",
        name: "How-To Guide",
        category: BookCategory::Nonfiction,
        description: "Practical guides and skill-building handbooks",
        recommended_tones: &["conversational", "professional"],
        typical_chapter_range: (8, 15),
        recommended_features: &["admonitions", "dropdowns", "figures", "quizzes", "tasklists"],
    },
    BookType {
        id: "history_biography",
        name: "History & Biography",
        category: BookCategory::Nonfiction,
        description: "Historical accounts and biographical narratives",
        recommended_tones: &["narrative", "academic", "journalistic"],
        typical_chapter_range: (10, 25),
        recommended_features: &["figures", "citations", "cross_references", "dropdowns"],
    },
    BookType {
        id: "science_medicine",
        name: "Science & Medicine",
        category: BookCategory::Nonfiction,
        description: "Scientific concepts and medical topics",
        recommended_tones: &["academic", "professional", "accessible"],
        typical_chapter_range: (8, 20),
        recommended_features: &[
            "figures",
            "math_equations",
            "citations",
            "admonitions",
            "tables",
        ],
    },
    BookType {
        id: "reference_guide",
        name: "Reference Guide",
        category: BookCategory::Reference,
        description: "Comprehensive reference material and lookup guides",
        recommended_tones: &["professional", "technical"],
        typical_chapter_range: (5, 30),
        recommended_features: &[
            "tables",
            "cross_references",
            "dropdowns",
            "tabs",
            "admonitions",
        ],
    },
    BookType {
        id: "fiction_novel",
        name: "Fiction Novel",
        category: BookCategory::Creative,
        description: "Creative fiction and storytelling",
        recommended_tones: &["narrative", "literary", "conversational"],
        typical_chapter_range: (10, 30),
        recommended_features: &["dropdowns", "admonitions"],
    },
    BookType {
        id: "essay_collection",
        name: "Essay Collection",
        category: BookCategory::Creative,
        description: "Collections of essays and thought pieces",
        recommended_tones: &["literary", "conversational", "academic"],
        typical_chapter_range: (5, 20),
        recommended_features: &["citations", "cross_references", "admonitions"],
    },
    BookType {
        id: "childrens_educational",
        name: "Children's Educational",
        category: BookCategory::Reference,
        description: "Educational content for children",
        recommended_tones: &["playful", "simple", "encouraging"],
        typical_chapter_range: (5, 15),
        recommended_features: &["figures", "admonitions", "quizzes", "cards", "tasklists"],
    },
    BookType {
        id: "white_paper",
        name: "White Paper",
        category: BookCategory::Reference,
        description: "Authoritative reports and technical briefs",
        recommended_tones: &["professional", "technical", "academic"],
        typical_chapter_range: (3, 8),
        recommended_features: &["figures", "tables", "citations", "math_equations"],
    },
    BookType {
        id: "cookbook_patterns",
        name: "Cookbook/Patterns",
        category: BookCategory::Reference,
        description: "Recipe-style solutions and design patterns",
        recommended_tones: &["professional", "conversational"],
        typical_chapter_range: (10, 30),
        recommended_features: &[
            "code_blocks",
            "tabs",
            "admonitions",
            "cross_references",
            "dropdowns",
        ],
    },
];

pub const TONES: &[CatalogOption] = &[
    CatalogOption { value: "conversational", label: "Conversational", description: "Friendly and approachable" },
    CatalogOption { value: "professional", label: "Professional", description: "Clear and business-like" },
    CatalogOption { value: "academic", label: "Academic", description: "Scholarly and formal" },
    CatalogOption { value: "technical", label: "Technical", description: "Precise and detailed" },
    CatalogOption { value: "narrative", label: "Narrative", description: "Story-driven" },
    CatalogOption { value: "inspirational", label: "Inspirational", description: "Motivating and uplifting" },
    CatalogOption { value: "playful", label: "Playful", description: "Fun and engaging" },
    CatalogOption { value: "simple", label: "Simple", description: "Easy to understand" },
    CatalogOption { value: "literary", label: "Literary", description: "Artistic and expressive" },
    CatalogOption { value: "journalistic", label: "Journalistic", description: "Factual and objective" },
    CatalogOption { value: "accessible", label: "Accessible", description: "Easy for general audiences" },
    CatalogOption { value: "encouraging", label: "Encouraging", description: "Supportive and positive" },
];

pub const AUDIENCES: &[CatalogOption] = &[
    CatalogOption { value: "beginner", label: "Beginner", description: "New to the topic" },
    CatalogOption { value: "intermediate", label: "Intermediate", description: "Some experience" },
    CatalogOption { value: "advanced", label: "Advanced", description: "Expert level" },
    CatalogOption { value: "general", label: "General Public", description: "No prior knowledge assumed" },
    CatalogOption { value: "professional", label: "Professionals", description: "Working in the field" },
    CatalogOption { value: "academic", label: "Academics/Students", description: "Educational setting" },
    CatalogOption { value: "children", label: "Children", description: "Age 8-12" },
    CatalogOption { value: "teens", label: "Teens", description: "Age 13-17" },
];

pub fn book_type(id: &str) -> Option<&'static BookType> {
    BOOK_TYPES.iter().find(|t| t.id == id)
}

pub fn book_types_in(category: BookCategory) -> impl Iterator<Item = &'static BookType> {
    BOOK_TYPES.iter().filter(move |t| t.category == category)
}

pub fn tone(value: &str) -> Option<&'static CatalogOption> {
    TONES.iter().find(|t| t.value == value)
}

pub fn audience(value: &str) -> Option<&'static CatalogOption> {
    AUDIENCES.iter().find(|a| a.value == value)
}

/// Every tone stays selectable; the book type only marks some as recommended.
pub fn tone_options_for(book_type_id: &str) -> Vec<ToneChoice> {
    let recommended = book_type(book_type_id)
        .map(|t| t.recommended_tones)
        .unwrap_or(&[]);

    TONES
        .iter()
        .map(|t| ToneChoice {
            value: t.value,
            label: t.label,
            description: t.description,
            recommended: recommended.contains(&t.value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_options_keep_every_tone_and_flag_recommended() {
        let options = tone_options_for("research_paper");
        assert_eq!(options.len(), TONES.len());
        let recommended: Vec<_> = options
            .iter()
            .filter(|o| o.recommended)
            .map(|o| o.value)
            .collect();
        assert_eq!(recommended, vec!["academic"]);
    }

    #[test]
    fn unknown_book_type_flags_nothing() {
        let options = tone_options_for("nope");
        assert_eq!(options.len(), 12);
        assert!(options.iter().all(|o| !o.recommended));
    }

    #[test]
    fn recommended_features_exist_in_feature_catalog() {
        for book_type in BOOK_TYPES {
            for id in book_type.recommended_features {
                assert!(
                    crate::catalog::features::feature(id).is_some(),
                    "{}: unknown feature {id}",
                    book_type.id
                );
            }
        }
    }

    #[test]
    fn category_filter_partitions_catalog() {
        let total: usize = [
            BookCategory::Technical,
            BookCategory::Nonfiction,
            BookCategory::Creative,
            BookCategory::Reference,
        ]
        .into_iter()
        .map(|c| book_types_in(c).count())
        .sum();
        assert_eq!(total, BOOK_TYPES.len());
        assert_eq!(book_types_in(BookCategory::Technical).count(), 5);
    }
}
