use clap::{Args, Subcommand};

use miclo_core::{Category, ProductDraft};

use super::{open_session, print_items, runtime, start_and_settle, CommandError, OutputFormat};
use crate::config::Config;

/// Browse and capture products
#[derive(Args)]
pub struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Subcommand)]
enum ProductSubcommand {
    /// Show one product
    Show {
        /// Product ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List products of a category (defaults to the preferred category)
    List {
        /// Category to list (mask, sanitizer)
        #[arg(long, short = 'C')]
        category: Option<Category>,

        /// List every product regardless of category
        #[arg(long, conflicts_with = "category")]
        all: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Capture a new product, or edit an existing one with --id
    Submit(SubmitArgs),
}

#[derive(Args)]
struct SubmitArgs {
    /// Existing product ID to update
    #[arg(long)]
    id: Option<String>,

    #[arg(long, short)]
    name: Option<String>,

    #[arg(long, short)]
    brand: Option<String>,

    #[arg(long)]
    price: Option<f64>,

    #[arg(long)]
    origin: Option<String>,

    #[arg(long)]
    remarks: Option<String>,

    /// Rating from 0 to 5
    #[arg(long, short)]
    rating: Option<u8>,

    /// Category (mask, sanitizer); defaults to the preferred category
    #[arg(long, short = 'C')]
    category: Option<Category>,

    /// Add a label (can be repeated)
    #[arg(long = "label", value_name = "LABEL")]
    labels: Vec<String>,

    /// Remove a label (can be repeated)
    #[arg(long = "remove-label", value_name = "LABEL")]
    remove_labels: Vec<String>,
}

impl ProductCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        let session = open_session(config)?;
        let rt = runtime()?;
        rt.block_on(start_and_settle(&session));
        let state = session.state();

        match &self.command {
            ProductSubcommand::Show { id, format } => {
                let item = state
                    .product(id)
                    .ok_or_else(|| CommandError::NotFound(id.clone()))?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&item)?),
                    OutputFormat::Text => {
                        print!("{}", item.product);
                        if item.favorite {
                            println!("Saved: yes");
                        }
                    }
                }
            }

            ProductSubcommand::List {
                category,
                all,
                format,
            } => {
                let category = if *all {
                    None
                } else {
                    category.or(state.preferences().selected_category())
                };
                let products = state.products().items();
                let favorites = miclo_core::favorite_ids(&state.favorites().items());
                let items = miclo_core::products_in_category(&products, &favorites, category);

                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
                    OutputFormat::Text => {
                        match category {
                            Some(category) => println!("Products in {}", category),
                            None => println!("All products"),
                        }
                        println!();
                        print_items(&items);
                    }
                }
            }

            ProductSubcommand::Submit(args) => {
                let default_category = state.preferences().selected_category();
                let mut draft = match &args.id {
                    Some(id) => {
                        let existing = state
                            .product(id)
                            .ok_or_else(|| CommandError::NotFound(id.clone()))?;
                        ProductDraft::from_product(&existing.product, default_category)
                    }
                    None => ProductDraft::new(default_category),
                };
                args.apply(&mut draft)?;

                let stored = rt
                    .block_on(session.submit_product(args.id.as_deref(), draft))
                    .ok_or(CommandError::SubmitFailed)?;

                println!("Saved product: {}", stored.id);
                println!();
                print!("{}", stored);
            }
        }

        Ok(())
    }
}

impl SubmitArgs {
    fn apply(&self, draft: &mut ProductDraft) -> Result<(), CommandError> {
        if let Some(name) = &self.name {
            draft.name = name.clone();
        }
        if let Some(brand) = &self.brand {
            draft.brand_name = brand.clone();
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(origin) = &self.origin {
            draft.origin = origin.clone();
        }
        if let Some(remarks) = &self.remarks {
            draft.remarks = remarks.clone();
        }
        if let Some(category) = self.category {
            draft.category = Some(category);
        }
        if let Some(rating) = self.rating {
            draft
                .set_rating(rating)
                .map_err(|e| CommandError::InvalidInput(e.to_string()))?;
        }
        for label in &self.remove_labels {
            draft.remove_label(label);
        }
        for label in &self.labels {
            draft.add_label(label);
        }

        draft
            .validate()
            .map_err(|e| CommandError::InvalidInput(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SubmitArgs {
        SubmitArgs {
            id: None,
            name: Some("N95".to_string()),
            brand: Some("3M".to_string()),
            price: Some(120.0),
            origin: None,
            remarks: None,
            rating: Some(4),
            category: None,
            labels: vec!["kids".to_string(), "Kids".to_string()],
            remove_labels: vec![],
        }
    }

    #[test]
    fn test_apply_fills_draft() {
        let mut draft = ProductDraft::new(Some(Category::Mask));
        args().apply(&mut draft).unwrap();

        assert_eq!(draft.name, "N95");
        assert_eq!(draft.brand_name, "3M");
        assert_eq!(draft.rating(), 4);
        assert_eq!(draft.labels(), ["kids"]);
        assert_eq!(draft.category, Some(Category::Mask));
    }

    #[test]
    fn test_apply_requires_category() {
        let mut draft = ProductDraft::new(None);
        let err = args().apply(&mut draft).unwrap_err();
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn test_apply_rejects_rating_out_of_range() {
        let mut draft = ProductDraft::new(Some(Category::Mask));
        let mut args = args();
        args.rating = Some(9);
        assert!(matches!(
            args.apply(&mut draft),
            Err(CommandError::InvalidInput(_))
        ));
    }
}
