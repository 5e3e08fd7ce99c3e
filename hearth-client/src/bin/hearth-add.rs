use anyhow::{Context, Result};
use clap::Parser;
use hearth::basic_models::{IngredientCreateDto, InstructionStepCreateDto, RecipeCreateDto};
use hearth_client::api::HearthClient;

/// Add a recipe to the recipe API
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Title of the recipe to add
    #[arg(required_unless_present = "list")]
    title: Option<String>,
    /// Preparation time in minutes
    #[arg(short, long, default_value_t = 0)]
    prep_minutes: i32,
    /// Free text instructions
    #[arg(short, long)]
    instructions: Option<String>,
    /// Ingredient as `name=quantity`, repeatable
    #[arg(long = "ingredient", value_parser = parse_ingredient)]
    ingredients: Vec<IngredientCreateDto>,
    /// Instruction step, repeatable; numbered in the order given
    #[arg(long = "step")]
    steps: Vec<String>,
    /// URL of the server to upload to
    #[arg(long, env = "HEARTH_RECIPE_API", default_value = "http://127.0.0.1:5000")]
    server: String,
    /// Dry run mode: print the recipe instead of uploading it
    #[arg(long)]
    dry: bool,
    /// List the recipes already on the server and exit
    #[arg(long, conflicts_with = "dry")]
    list: bool,
}

fn parse_ingredient(value: &str) -> Result<IngredientCreateDto, String> {
    let (name, quantity) = value
        .split_once('=')
        .ok_or_else(|| format!("expected name=quantity, got {:?}", value))?;
    Ok(IngredientCreateDto {
        name: name.trim().to_string(),
        quantity: quantity.trim().to_string(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let client = HearthClient::new(&args.server);

    if args.list {
        let recipes = client
            .list_recipes()
            .await
            .with_context(|| format!("Listing recipes on {}", args.server))?;
        for recipe in recipes {
            println!("{:>4}  {} ({} min)", recipe.id, recipe.title, recipe.prep_time_minutes);
        }
        return Ok(());
    }

    let recipe = RecipeCreateDto {
        title: args.title.context("A title is required")?,
        instructions: args.instructions,
        prep_time_minutes: args.prep_minutes,
        ingredients: args.ingredients,
        instruction_steps: args
            .steps
            .into_iter()
            .zip(1..)
            .map(|(step_description, order)| InstructionStepCreateDto {
                step_description,
                order,
            })
            .collect(),
    };

    if args.dry {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
        println!("Dry run mode enabled, skipping upload");
        return Ok(());
    }
    let created = client
        .create_recipe(&recipe)
        .await
        .with_context(|| format!("Uploading recipe to {}", args.server))?;
    tracing::info!("Recipe uploaded successfully");
    println!(
        "Created recipe {} ({} ingredients)",
        created.id,
        created.ingredients.len()
    );
    Ok(())
}
