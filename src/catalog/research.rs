use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwarenessStage {
    Unaware,
    ProblemAware,
    SolutionAware,
    ProductAware,
    MostAware,
}

impl AwarenessStage {
    pub const ALL: [AwarenessStage; 5] = [
        Self::Unaware,
        Self::ProblemAware,
        Self::SolutionAware,
        Self::ProductAware,
        Self::MostAware,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unaware => "unaware",
            Self::ProblemAware => "problem_aware",
            Self::SolutionAware => "solution_aware",
            Self::ProductAware => "product_aware",
            Self::MostAware => "most_aware",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unaware => "Unaware",
            Self::ProblemAware => "Problem Aware",
            Self::SolutionAware => "Solution Aware",
            Self::ProductAware => "Product Aware",
            Self::MostAware => "Most Aware",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Unaware => "Doesn't know they have a problem",
            Self::ProblemAware => "Knows they have a problem but not the solution",
            Self::SolutionAware => "Knows solutions exist but not your specific product",
            Self::ProductAware => "Knows your product exists but hasn't purchased",
            Self::MostAware => "Knows your product and ready to buy",
        }
    }

    pub fn characteristics(self) -> &'static [&'static str] {
        match self {
            Self::Unaware => &[
                "Completely unaware of the problem",
                "Needs education before they can be sold",
                "Focus on symptoms and pain points",
                "Requires story-based, indirect approach",
            ],
            Self::ProblemAware => &[
                "Feels the pain but doesn't know solutions exist",
                "Actively experiencing frustration",
                "Searching for answers",
                "Most receptive to education",
                "PRIMARY AUDIENCE - Your main target market",
            ],
            Self::SolutionAware => &[
                "Researching different approaches",
                "Comparing options",
                "Skeptical but hopeful",
                "Needs proof and differentiation",
            ],
            Self::ProductAware => &[
                "Aware of your solution",
                "Considering purchase",
                "Evaluating value vs. price",
                "Needs push to convert",
            ],
            Self::MostAware => &[
                "Ready to purchase",
                "Just needs the right offer",
                "Price-sensitive",
                "Urgency-driven",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    Text,
    Textarea,
}

#[derive(Debug, Clone, Serialize)]
pub struct OfferQuestion {
    pub id: &'static str,
    /// Placeholder substituted into the avatar prompt.
    pub token: &'static str,
    pub question: &'static str,
    pub placeholder: &'static str,
    pub kind: AnswerKind,
    pub help: &'static str,
    pub required: bool,
}

pub const OFFER_QUESTIONS: &[OfferQuestion] = &[
    OfferQuestion {
        id: "offer",
        token: "[OFFER]",
        question: "What is your book/product about?",
        placeholder: "e.g., \"A comprehensive guide to mastering Python for data science\"",
        kind: AnswerKind::Textarea,
        help: "Describe what you're creating. Be specific about the topic and approach.",
        required: true,
    },
    OfferQuestion {
        id: "audience",
        token: "[audience]",
        question: "Who is the general audience?",
        placeholder: "e.g., \"working professionals\" or \"aspiring entrepreneurs\" or \"busy parents\"",
        kind: AnswerKind::Text,
        help: "Broad category - don't worry about being too specific yet. We'll discover the details!",
        required: true,
    },
    OfferQuestion {
        id: "problem",
        token: "[problem]",
        question: "What problem do they have?",
        placeholder: "e.g., \"struggling to transition into a data science career without a CS degree\"",
        kind: AnswerKind::Textarea,
        help: "What pain point or challenge does your offer solve? What keeps them up at night?",
        required: true,
    },
    OfferQuestion {
        id: "price_point",
        token: "[price point]",
        question: "What's the price point?",
        placeholder: "e.g., \"free\" or \"$19\" or \"$99\" or \"$500\" or \"$2,500\"",
        kind: AnswerKind::Text,
        help: "Rough price range or tier. This helps understand buyer psychology and commitment level.",
        required: true,
    },
    OfferQuestion {
        id: "target_market",
        token: "[target market]",
        question: "Who specifically is the target market?",
        placeholder: "e.g., \"mid-career professionals (30-45) looking to switch to tech with $75k+ income\"",
        kind: AnswerKind::Textarea,
        help: "Get more specific about WHO will buy this. Age range, job type, income level, life stage, etc.",
        required: true,
    },
    OfferQuestion {
        id: "benefit",
        token: "[benefit]",
        question: "What benefit does it provide?",
        placeholder: "e.g., \"land a $120k+ data science job within 6 months without a CS degree\"",
        kind: AnswerKind::Textarea,
        help: "What transformation or outcome will they achieve? Be specific and measurable.",
        required: true,
    },
];

pub fn question(id: &str) -> Option<&'static OfferQuestion> {
    OFFER_QUESTIONS.iter().find(|q| q.id == id)
}

pub const AVATAR_PROMPT_TEMPLATE: &str = r##"Research five customer avatars for an offer about [OFFER].

The avatars will be based off of the Stages of Market Awareness as taught by Eugene Schwartz in his legendary book, Breakthrough Advertising.

## Context
- General Audience: [audience]
- Problem They Face: [problem]
- Price Point: [price point]
- Target Market: [target market]
- Benefit/Outcome: [benefit]

## Your Task
Create FIVE detailed customer avatars, one for each awareness stage:

### 1. UNAWARE Stage
They don't know they have a problem. Create an avatar who is experiencing the symptoms of [problem] but hasn't connected the dots yet. They're living their life unaware that [benefit] is even possible.

**Avatar Profile:**
- Name & demographic snapshot
- Daily life & current situation
- Hidden pain points they don't recognize
- What would make them suddenly aware
- Language/phrases they use
- Dominant emotions (hidden)
- 2-3 key psychological insights

### 2. PROBLEM AWARE Stage ⭐ PRIMARY AUDIENCE ⭐
They know they have [problem] and are actively searching for solutions. This is your MAIN target market!

**Avatar Profile:**
- Name & demographic snapshot
- How they discovered they have this problem
- Current frustration level & pain intensity
- What they've tried so far (and why it failed)
- Language/phrases they use to describe the problem
- Dominant negative emotions driving them
- What keeps them awake at night
- Secret fears and desires
- 5-7 key psychological insights

### 3. SOLUTION AWARE Stage
They know solutions exist for [problem] but don't know about your specific [OFFER] yet. They're comparing different approaches.

**Avatar Profile:**
- Name & demographic snapshot
- Solutions they're researching
- Why they haven't chosen one yet (skepticism, confusion, overwhelm)
- Decision criteria they're using
- Language/phrases they use
- Dominant emotions (hope mixed with doubt)
- 3-4 key psychological insights

### 4. PRODUCT AWARE Stage
They know your [OFFER] exists and are considering it, but haven't purchased yet at [price point].

**Avatar Profile:**
- Name & demographic snapshot
- How they discovered your offer
- What's holding them back from buying
- Objections they have about [price point]
- What would push them over the edge
- Language/phrases they use
- Dominant emotions (interest mixed with hesitation)
- 2-3 key psychological insights

### 5. MOST AWARE Stage
They know your [OFFER] intimately, understand [benefit], and are ready to buy at [price point]. They just need the right trigger.

**Avatar Profile:**
- Name & demographic snapshot
- Why they're so informed about your offer
- What final trigger will make them buy NOW
- Price sensitivity
- Urgency drivers
- Language/phrases they use
- Dominant emotions (urgency, FOMO, excitement)
- 2-3 key psychological insights

## Output Format
Return a JSON object with this structure:
{
  "unaware": { /* avatar object */ },
  "problem_aware": { /* avatar object */ },
  "solution_aware": { /* avatar object */ },
  "product_aware": { /* avatar object */ },
  "most_aware": { /* avatar object */ }
}

Each avatar object should have:
{
  "stage": "stage_name",
  "name": "Avatar Name",
  "tagline": "One-line description",
  "demographics": {
    "age_range": "",
    "occupation": "",
    "income": "",
    "life_stage": ""
  },
  "psychographics": {
    "situation": "Current life situation paragraph",
    "pain_points": ["list", "of", "pains"],
    "desires": ["list", "of", "desires"],
    "language": ["phrases", "they", "use"],
    "emotions": ["dominant", "emotions"]
  },
  "buyer_psychology": {
    "awareness_level": "What they know and don't know",
    "decision_triggers": ["what", "would", "make", "them", "act"],
    "objections": ["barriers", "to", "purchase"],
    "key_insights": ["deep", "psychological", "insights"]
  }
}

Remember:
- Make avatars feel REAL with specific details
- Use emotional, visceral language
- Focus extra detail on the PROBLEM AWARE avatar (your primary audience)
- Connect everything back to [problem], [benefit], and [target market]
- Write like a master copywriter who deeply understands human psychology"##;

/// Substitutes every questionnaire token; unanswered questions become empty text.
pub fn build_avatar_prompt<F>(answer: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut prompt = AVATAR_PROMPT_TEMPLATE.to_owned();
    for q in OFFER_QUESTIONS {
        let value = answer(q.id).unwrap_or_default();
        prompt = prompt.replace(q.token, &value);
    }
    prompt
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiaryPhase {
    Before,
    During,
    After,
}

impl DiaryPhase {
    pub const ALL: [DiaryPhase; 3] = [Self::Before, Self::During, Self::After];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::During => "during",
            Self::After => "after",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Self::Before => "Before: Struggling with the Problem",
            Self::During => "During: Discovering & Implementing the Solution",
            Self::After => "After: Life After Transformation",
        }
    }

    /// Local rendering of the prompt the backend writes the entry from.
    pub fn prompt(self, avatar_profile: &str, product_context: &str) -> String {
        let template = match self {
            Self::Before => DIARY_BEFORE,
            Self::During => DIARY_DURING,
            Self::After => DIARY_AFTER,
        };
        template
            .replace("{AVATAR_PROFILE}", avatar_profile)
            .replace("{PRODUCT_CONTEXT}", product_context)
    }
}

const DIARY_BEFORE: &str = r##"You are a creative writer with deep insight into human psychology and emotion.

Write a DIARY ENTRY from the perspective of the Problem Aware customer avatar described below.

This is BEFORE they discovered the solution. They know they have the problem and are actively suffering from it.

**Requirements:**
- Write in first person ("I", "me", "my")
- Length: 400-600 words
- Focus on their DOMINANT NEGATIVE EMOTIONS
- Use visual, visceral, sensory language
- Make it raw, authentic, vulnerable
- Include specific details about their daily struggles
- Show their inner conflict and frustration
- Use the language and phrases they would actually use
- Make it feel like a REAL journal entry from a real person

**Tone:** Introspective, honest, emotionally vulnerable, frustrated, searching

Avatar Profile:
{AVATAR_PROFILE}

Product/Solution Context:
{PRODUCT_CONTEXT}

Write the diary entry now:"##;

const DIARY_DURING: &str = r##"You are a creative writer with deep insight into human psychology and emotion.

Write a DIARY ENTRY from the perspective of the Problem Aware customer avatar described below.

This is DURING their first experience with the solution. They're in the early stages of transformation.

**Requirements:**
- Write in first person ("I", "me", "my")
- Length: 400-600 words
- Capture mixed emotions: hope, skepticism, curiosity, nervousness, cautious optimism
- Use visual, visceral, sensory language
- Make it raw, authentic, vulnerable
- Show their initial reactions and observations
- Include moments of doubt AND moments of possibility
- Use the language and phrases they would actually use
- Make it feel like a REAL journal entry from a real person

**Tone:** Cautiously optimistic, observant, emotionally honest, vulnerable, hopeful

Avatar Profile:
{AVATAR_PROFILE}

Product/Solution Context:
{PRODUCT_CONTEXT}

Write the diary entry now:"##;

const DIARY_AFTER: &str = r##"You are a creative writer with deep insight into human psychology and emotion.

Write a DIARY ENTRY from the perspective of the Problem Aware customer avatar described below.

This is AFTER experiencing the transformation from the solution. They've achieved the benefit.

**Requirements:**
- Write in first person ("I", "me", "my")
- Length: 400-600 words
- Focus on their DOMINANT POSITIVE EMOTIONS and transformation
- Use visual, visceral, sensory language
- Make it raw, authentic, vulnerable
- Show specific ways their life has changed
- Include reflection on their "before" state
- Express amazement at the transformation
- Show gratitude and newfound confidence
- Use the language and phrases they would actually use
- Make it feel like a REAL journal entry from a real person

**Tone:** Grateful, amazed, relieved, empowered, celebratory, reflective

Avatar Profile:
{AVATAR_PROFILE}

Product/Solution Context:
{PRODUCT_CONTEXT}

Write the diary entry now:"##;

/// Sample questionnaire used by `research answer --sample`.
pub const SAMPLE_ANSWERS: &[(&str, &str)] = &[
    (
        "offer",
        "The Complete Guide to AI-Powered Marketing - A comprehensive book that teaches business owners how to leverage AI tools to automate their marketing, generate high-converting copy, and scale their business without hiring expensive agencies.",
    ),
    ("audience", "Small business owners and entrepreneurs"),
    (
        "problem",
        "Spending $5,000+/month on marketing agencies but not getting the results they want. They feel overwhelmed by marketing complexity and can't afford to keep hiring expensive experts.",
    ),
    ("price_point", "$97 one-time payment"),
    (
        "target_market",
        "Business owners aged 30-50 with revenue between $100k-$500k/year who are tech-savvy enough to use AI tools but don't have time to figure everything out themselves",
    ),
    (
        "benefit",
        "Create professional marketing campaigns themselves using AI - saving 70% on marketing costs while increasing leads by 200%. Go from agency-dependent to marketing-confident in 30 days.",
    ),
];
