use crate::catalog::book_types::{self, AUDIENCES, BOOK_TYPES, BookCategory};
use crate::catalog::features::{self, FeatureCategory, Preset};
use crate::catalog::templates;
use crate::cli::CatalogCommand;
use crate::error::ValidationError;

pub fn run(command: CatalogCommand) -> anyhow::Result<()> {
    match command {
        CatalogCommand::BookTypes { category } => {
            let category = category
                .as_deref()
                .map(|c| {
                    BookCategory::parse(c).ok_or_else(|| ValidationError::UnknownCatalogValue {
                        kind: "book category",
                        value: c.to_owned(),
                    })
                })
                .transpose()?;
            for book_type in BOOK_TYPES
                .iter()
                .filter(|t| category.is_none_or(|c| t.category == c))
            {
                let (low, high) = book_type.typical_chapter_range;
                println!(
                    "{}\t{}\t[{}]\t{low}-{high} chapters\t{}",
                    book_type.id,
                    book_type.name,
                    book_type.category.as_str(),
                    book_type.description
                );
            }
        }
        CatalogCommand::Tones { book_type } => {
            if let Some(id) = &book_type
                && book_types::book_type(id).is_none()
            {
                return Err(ValidationError::UnknownCatalogValue {
                    kind: "book type",
                    value: id.clone(),
                }
                .into());
            }
            for tone in book_types::tone_options_for(book_type.as_deref().unwrap_or_default()) {
                let mark = if tone.recommended { "*" } else { " " };
                println!("{mark} {}\t{}\t{}", tone.value, tone.label, tone.description);
            }
        }
        CatalogCommand::Audiences => {
            for audience in AUDIENCES {
                println!("{}\t{}\t{}", audience.value, audience.label, audience.description);
            }
        }
        CatalogCommand::Features { category, search } => {
            let category = category
                .as_deref()
                .map(|c| {
                    FeatureCategory::parse(c).ok_or_else(|| ValidationError::UnknownCatalogValue {
                        kind: "feature category",
                        value: c.to_owned(),
                    })
                })
                .transpose()?;
            let found = features::search(search.as_deref().unwrap_or_default(), category);
            for feature in &found {
                let mark = if feature.enabled_by_default { "*" } else { " " };
                println!(
                    "{mark} {}\t[{}]\t{}\t{}",
                    feature.id,
                    feature.category.as_str(),
                    feature.name,
                    feature.description
                );
            }
            println!("{} feature(s)", found.len());
        }
        CatalogCommand::Presets => {
            for preset in Preset::ALL {
                println!(
                    "{}\t{}\t{} features\t{}",
                    preset.as_str(),
                    preset.name(),
                    preset.feature_ids().len(),
                    preset.description()
                );
            }
        }
        CatalogCommand::Templates => {
            for (group, list) in templates::grouped() {
                println!("{group}:");
                for template in list {
                    println!("  {}\t{}\t{}", template.id, template.name, template.description);
                }
            }
            let listed: Vec<String> = templates::grouped()
                .into_iter()
                .flat_map(|(_, list)| list.into_iter().map(|t| t.id))
                .collect();
            let rest: Vec<_> = templates::builtin_templates()
                .into_iter()
                .filter(|t| !listed.contains(&t.id))
                .collect();
            if !rest.is_empty() {
                println!("other:");
                for template in rest {
                    println!("  {}\t{}\t{}", template.id, template.name, template.description);
                }
            }
        }
    }
    Ok(())
}
