use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::export::ExportFormat;
use crate::research::render::ResearchDocument;
use crate::store::settings::AiProvider;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Data directory (default: $LIQUIDBOOKS_HOME or ./.liquidbooks).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Backend base URL for this invocation only.
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Automatic retries for generation calls. Avatar generation defaults to 2.
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Delay between retries.
    #[arg(long, global = true, default_value_t = 2000)]
    pub retry_delay_ms: u64,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Provider, model, API keys and backend URL.
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
    /// Book types, tones, audiences, features, presets and templates.
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Ask the backend for a book outline.
    Plan {
        #[command(subcommand)]
        command: PlanCommand,
    },
    /// Review and edit the outline before it becomes a book.
    Outline {
        #[command(subcommand)]
        command: OutlineCommand,
    },
    /// Custom chapter templates.
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },
    /// Saved prompt templates.
    Prompts {
        #[command(subcommand)]
        command: PromptsCommand,
    },
    /// Generate, edit and complete chapters.
    Chapter {
        #[command(subcommand)]
        command: ChapterCommand,
    },
    /// The book being written.
    Book {
        #[command(subcommand)]
        command: BookCommand,
    },
    /// Enhance, build, deploy, download and preview.
    Publish {
        #[command(subcommand)]
        command: PublishCommand,
    },
    /// Audience research: avatars, diary, brand, landing page, marketing.
    Research {
        #[command(subcommand)]
        command: ResearchCommand,
    },
    /// Visual artifact prompts for the book.
    Artifacts {
        #[command(subcommand)]
        command: ArtifactsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    SetKey {
        provider: AiProvider,
        key: String,
    },
    SetProvider {
        provider: AiProvider,
    },
    SetModel {
        model: String,
    },
    SetBackendUrl {
        /// New base URL (http/https).
        url: Option<String>,

        /// Forget the saved URL and use the environment default.
        #[arg(long, conflicts_with = "url")]
        clear: bool,
    },
    SetDefaultFeatures(FeatureChoiceArgs),
    /// List models offered for a provider.
    Models {
        /// Defaults to the selected provider.
        #[arg(long)]
        provider: Option<AiProvider>,
    },
}

#[derive(Debug, Args)]
pub struct FeatureChoiceArgs {
    /// Feature ids (comma-separated).
    #[arg(value_delimiter = ',')]
    pub features: Vec<String>,

    /// Start from a preset (minimal, standard, technical, course, research, complete).
    #[arg(long)]
    pub preset: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    BookTypes {
        /// technical, nonfiction, creative or reference.
        #[arg(long)]
        category: Option<String>,
    },
    Tones {
        /// Flag the tones recommended for this book type.
        #[arg(long)]
        book_type: Option<String>,
    },
    Audiences,
    Features {
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive match on name or description.
        #[arg(long)]
        search: Option<String>,
    },
    Presets,
    Templates,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// What the book is about.
    #[arg(long)]
    pub topic: String,

    #[arg(long, default_value = "programming_tutorial")]
    pub book_type: String,

    /// Catalog tone, or `custom` together with --custom-tone.
    #[arg(long, default_value = "conversational")]
    pub tone: String,

    #[arg(long)]
    pub custom_tone: Option<String>,

    #[arg(long, default_value = "intermediate")]
    pub audience: String,

    /// Number of chapters (the backend decides when omitted).
    #[arg(long)]
    pub chapters: Option<u32>,

    #[arg(long)]
    pub pages_per_chapter: Option<u32>,

    /// Special requirements for the outline.
    #[arg(long)]
    pub requirements: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum PlanCommand {
    /// Show the prompts the backend would use.
    Preview(PlanArgs),
    /// Generate an outline and open it for review.
    Outline(PlanOutlineArgs),
}

#[derive(Debug, Args)]
pub struct PlanOutlineArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    #[command(flatten)]
    pub features: FeatureChoiceArgs,

    /// Replace the system prompt with the contents of this file.
    #[arg(long)]
    pub system_prompt_file: Option<PathBuf>,

    /// Replace the user prompt with the contents of this file.
    #[arg(long)]
    pub user_prompt_file: Option<PathBuf>,

    /// Replace an outline that is still under review.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Subcommand)]
pub enum OutlineCommand {
    Show,
    EditBook(OutlineBookArgs),
    EditChapter(OutlineChapterArgs),
    AddChapter,
    DeleteChapter {
        number: u32,
    },
    MoveChapter {
        number: u32,
        /// New one-based position.
        to: u32,
    },
    /// Toggle features, a whole category, or reset to the recommendations.
    Feature {
        ids: Vec<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        reset: bool,
    },
    Preset {
        name: String,
    },
    Template {
        id: String,
    },
    /// Turn the outline into the current book.
    Accept {
        /// Replace a book that is already loaded.
        #[arg(long)]
        force: bool,
    },
    Discard,
}

#[derive(Debug, Args)]
pub struct OutlineBookArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub audience: Option<String>,
    #[arg(long)]
    pub theme: Option<String>,
}

#[derive(Debug, Args)]
pub struct OutlineChapterArgs {
    pub number: u32,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Replaces all learning objectives (repeatable).
    #[arg(long = "objective")]
    pub objectives: Vec<String>,
    /// Replaces all suggested components (repeatable).
    #[arg(long = "component")]
    pub components: Vec<String>,
    #[arg(long)]
    pub connection_to_previous: Option<String>,
    #[arg(long)]
    pub connection_to_next: Option<String>,
    #[arg(long)]
    pub words: Option<u32>,
    #[arg(long)]
    pub pages: Option<u32>,
    #[arg(long)]
    pub template: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    List,
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// Structure item, in order (repeatable).
        #[arg(long = "section", required = true)]
        sections: Vec<String>,
        /// Markdown example skeleton.
        #[arg(long)]
        example_file: Option<PathBuf>,
    },
    /// Draft a template with the backend from a description.
    Generate {
        description: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum PromptsCommand {
    List,
    Show {
        id: String,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        system_prompt: String,
        /// May use {{topic}}, {{audience}}, {{chapter_title}}, {{learning_objectives}}.
        #[arg(long)]
        user_prompt: String,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        system_prompt: Option<String>,
        #[arg(long)]
        user_prompt: Option<String>,
    },
    Delete {
        id: String,
    },
    Duplicate {
        id: String,
    },
    /// Add the bundled starter prompts.
    Seed,
    /// Fill a prompt's placeholders.
    Render {
        id: String,
        #[arg(long, default_value = "")]
        topic: String,
        #[arg(long, default_value = "")]
        audience: String,
        #[arg(long, default_value = "")]
        chapter_title: String,
        #[arg(long = "objective")]
        objectives: Vec<String>,
    },
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Chapter id or one-based position.
    pub chapter: String,

    /// Extra guidance for this generation only.
    #[arg(long)]
    pub instructions: Option<String>,

    /// Target word count for this generation only.
    #[arg(long)]
    pub words: Option<u32>,
}

#[derive(Debug, Subcommand)]
pub enum ChapterCommand {
    List,
    Show {
        chapter: String,
    },
    Generate(GenerateArgs),
    /// Print the prompts a generation would use.
    Prompt(GenerateArgs),
    /// Replace content from a file (`-` reads stdin); the chapter becomes a draft.
    Edit {
        chapter: String,
        #[arg(long)]
        file: PathBuf,
    },
    Complete {
        chapter: String,
    },
    /// Toggle this chapter's features or apply a preset to it.
    Features {
        chapter: String,
        ids: Vec<String>,
        #[arg(long)]
        preset: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum BookCommand {
    Show,
    /// Start a blank book, or load one from JSON.
    Set {
        #[arg(long, required_unless_present = "from")]
        title: Option<String>,
        #[arg(long, required_unless_present = "from")]
        author: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, conflicts_with_all = ["title", "author", "description"])]
        from: Option<PathBuf>,
        #[arg(long)]
        force: bool,
    },
    Clear,
    Publishing(PublishingArgs),
    AddChapter {
        #[arg(long)]
        title: Option<String>,
    },
    DeleteChapter {
        chapter: String,
    },
    MoveChapter {
        chapter: String,
        /// New one-based position.
        to: usize,
    },
}

#[derive(Debug, Args)]
pub struct PublishingArgs {
    #[arg(long)]
    pub pen_name: Option<String>,
    #[arg(long)]
    pub hide_author_name: Option<bool>,
    #[arg(long)]
    pub edition: Option<String>,
    #[arg(long)]
    pub year: Option<i32>,
    #[arg(long)]
    pub publisher: Option<String>,
    #[arg(long)]
    pub isbn_epub: Option<String>,
    #[arg(long)]
    pub isbn_kindle: Option<String>,
    #[arg(long)]
    pub isbn_paperback: Option<String>,
    #[arg(long)]
    pub isbn_hardcover: Option<String>,
    #[arg(long)]
    pub isbn_pdf: Option<String>,
    /// `role=name` (repeatable).
    #[arg(long = "collaborator")]
    pub collaborators: Vec<String>,
    #[arg(long)]
    pub epigraph: Option<String>,
    #[arg(long)]
    pub foreword: Option<String>,
    #[arg(long)]
    pub dedication: Option<String>,
    #[arg(long)]
    pub preface: Option<String>,
    #[arg(long)]
    pub acknowledgements: Option<String>,
    #[arg(long)]
    pub about_the_author: Option<String>,
    #[arg(long)]
    pub also_by_the_author: Option<String>,
    #[arg(long)]
    pub all_rights_reserved: Option<bool>,
    #[arg(long)]
    pub fiction: Option<bool>,
    #[arg(long)]
    pub moral_rights: Option<bool>,
    #[arg(long)]
    pub external_content: Option<bool>,
    #[arg(long)]
    pub designations: Option<bool>,
    #[arg(long)]
    pub additional_clauses: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum PublishCommand {
    /// Ask for cross-references, transitions and glossary suggestions.
    Enhance,
    /// Build the book with the backend.
    Build {
        /// Download the archive right after the build.
        #[arg(long)]
        download: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Download the archive of an earlier build.
    Download {
        #[arg(long)]
        build_dir: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Build and deploy to GitHub Pages.
    Deploy {
        #[arg(long)]
        github_username: Option<String>,
        #[arg(long)]
        github_token: Option<String>,
        #[arg(long)]
        repo: Option<String>,
    },
    /// Serve a downloaded archive locally.
    Preview {
        archive: PathBuf,
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
    /// Zip the book's markdown sources.
    ExportSources {
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ResearchCommand {
    /// Answer a questionnaire item, or load the sample answers.
    Answer {
        #[arg(required_unless_present = "sample")]
        question: Option<String>,
        #[arg(required_unless_present = "sample")]
        value: Option<String>,
        #[arg(long, conflicts_with_all = ["question", "value"])]
        sample: bool,
    },
    Show,
    Avatar,
    Diary,
    Brand,
    LandingPage,
    Marketing,
    Export(ResearchExportArgs),
    /// Drop generated results. Answers are kept unless --all.
    Reset {
        #[arg(long)]
        all: bool,
    },
}

#[derive(Debug, Args)]
pub struct ResearchExportArgs {
    pub document: ResearchDocument,

    #[arg(long, value_enum, default_value_t = ExportFormat::Md)]
    pub format: ExportFormat,

    /// Defaults to `<document>-<date>.<ext>` in the current directory.
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long)]
    pub force: bool,

    /// Path to pandoc (PDF only).
    #[arg(long, default_value = crate::export::DEFAULT_PANDOC)]
    pub pandoc: String,

    /// PDF engine (tries weasyprint then tectonic when omitted).
    #[arg(long)]
    pub pdf_engine: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ArtifactsCommand {
    Generate,
    List {
        #[arg(long)]
        chapter: Option<u32>,
        /// image, video, diagram or interactive.
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Summary,
    Delete {
        id: String,
    },
    Clear,
}
