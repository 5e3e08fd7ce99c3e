//! Storage for recipes and their children.
//!
//! Reads go straight to SQLite. Writes are staged in a [`ChangeSet`] and only reach the
//! database through [`RecipeRepository::save_changes`], which applies the whole set in one
//! transaction, so a service call can touch several related rows atomically.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection};

use super::models::{
    Ingredient, InstructionStep, NewIngredient, NewInstructionStep, NewRecipe, Recipe,
};
use crate::database::{collect_rows, Database};

/// Handle to a row staged for insertion; resolves to its id once saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingKey(usize);

/// The parent of a new child: either already stored, or staged in the same change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeRef {
    Existing(i64),
    Pending(PendingKey),
}

impl From<i64> for RecipeRef {
    fn from(recipe_id: i64) -> Self {
        RecipeRef::Existing(recipe_id)
    }
}

impl From<PendingKey> for RecipeRef {
    fn from(key: PendingKey) -> Self {
        RecipeRef::Pending(key)
    }
}

#[derive(Debug, Clone)]
enum Change {
    AddRecipe(NewRecipe),
    UpdateRecipe(Recipe),
    DeleteRecipe(i64),
    AddIngredient(RecipeRef, NewIngredient),
    UpdateIngredient(Ingredient),
    DeleteIngredient(i64),
    AddStep(RecipeRef, NewInstructionStep),
    UpdateStep(InstructionStep),
    DeleteStep(i64),
}

/// Mutations waiting to be committed, in the order they were staged.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    fn stage(&mut self, change: Change) -> PendingKey {
        self.changes.push(change);
        PendingKey(self.changes.len() - 1)
    }

    pub fn add_recipe(&mut self, recipe: NewRecipe) -> PendingKey {
        self.stage(Change::AddRecipe(recipe))
    }

    /// Overwrite the stored recipe's own columns with these values.
    pub fn update_recipe(&mut self, recipe: Recipe) {
        self.stage(Change::UpdateRecipe(recipe));
    }

    /// Delete a recipe. Its ingredients and steps go with it.
    pub fn delete_recipe(&mut self, recipe: &Recipe) {
        self.stage(Change::DeleteRecipe(recipe.recipe_id));
    }

    pub fn add_ingredient(
        &mut self,
        recipe: impl Into<RecipeRef>,
        ingredient: NewIngredient,
    ) -> PendingKey {
        self.stage(Change::AddIngredient(recipe.into(), ingredient))
    }

    pub fn update_ingredient(&mut self, ingredient: Ingredient) {
        self.stage(Change::UpdateIngredient(ingredient));
    }

    pub fn delete_ingredient(&mut self, ingredient: &Ingredient) {
        self.stage(Change::DeleteIngredient(ingredient.ingredient_id));
    }

    pub fn add_step(&mut self, recipe: impl Into<RecipeRef>, step: NewInstructionStep) -> PendingKey {
        self.stage(Change::AddStep(recipe.into(), step))
    }

    pub fn update_step(&mut self, step: InstructionStep) {
        self.stage(Change::UpdateStep(step));
    }

    pub fn delete_step(&mut self, step: &InstructionStep) {
        self.stage(Change::DeleteStep(step.step_id));
    }
}

/// What a committed change set did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    rows_affected: usize,
    inserted_ids: Vec<Option<i64>>,
}

impl SaveOutcome {
    /// True if at least one row was written.
    pub fn saved(&self) -> bool {
        self.rows_affected > 0
    }

    pub fn rows_affected(&self) -> usize {
        self.rows_affected
    }

    /// The id generated for a staged insert.
    pub fn inserted_id(&self, key: PendingKey) -> Option<i64> {
        self.inserted_ids.get(key.0).copied().flatten()
    }

    fn resolve(&self, recipe: RecipeRef) -> Result<i64> {
        match recipe {
            RecipeRef::Existing(recipe_id) => Ok(recipe_id),
            RecipeRef::Pending(key) => self
                .inserted_id(key)
                .ok_or_else(|| anyhow!("Staged child refers to a recipe that was not inserted")),
        }
    }
}

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn get_all_recipes(&self) -> Result<Vec<Recipe>>;

    /// The recipe with its ingredients loaded; the detail projection needs nothing more.
    async fn get_recipe_by_id(&self, recipe_id: i64) -> Result<Option<Recipe>>;

    /// The recipe with its ingredients loaded.
    async fn get_recipe_with_ingredients(&self, recipe_id: i64) -> Result<Option<Recipe>>;

    /// The recipe with its instruction steps loaded, in step order.
    async fn get_recipe_with_steps(&self, recipe_id: i64) -> Result<Option<Recipe>>;

    /// An ingredient, only if it belongs to the given recipe.
    async fn get_ingredient_for_recipe(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
    ) -> Result<Option<Ingredient>>;

    /// An instruction step, only if it belongs to the given recipe.
    async fn get_step_for_recipe(
        &self,
        recipe_id: i64,
        step_id: i64,
    ) -> Result<Option<InstructionStep>>;

    /// Commit every staged change in one transaction. Nothing is written if any change fails.
    async fn save_changes(&self, changes: ChangeSet) -> Result<SaveOutcome>;
}

#[derive(Clone)]
pub struct SqliteRecipeRepository {
    db: Database,
}

impl SqliteRecipeRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn recipe_by_id(conn: &Connection, recipe_id: i64) -> Result<Option<Recipe>> {
    Ok(collect_rows(
        conn,
        "SELECT * FROM Recipe WHERE recipe_id = ?",
        params![recipe_id],
    )?
    .pop())
}

fn ingredients_of(conn: &Connection, recipe_id: i64) -> Result<Vec<Ingredient>> {
    collect_rows(
        conn,
        "SELECT * FROM Ingredient WHERE recipe_id = ? ORDER BY ingredient_id",
        params![recipe_id],
    )
}

fn steps_of(conn: &Connection, recipe_id: i64) -> Result<Vec<InstructionStep>> {
    collect_rows(
        conn,
        "SELECT * FROM InstructionStep WHERE recipe_id = ? ORDER BY step_order",
        params![recipe_id],
    )
}

fn apply_changes(conn: &mut Connection, changes: ChangeSet) -> Result<SaveOutcome> {
    let tx = conn.transaction()?;
    let mut outcome = SaveOutcome {
        rows_affected: 0,
        inserted_ids: Vec::with_capacity(changes.len()),
    };
    for change in changes.changes {
        let (rows, inserted) = match change {
            Change::AddRecipe(recipe) => {
                let rows = tx.execute(
                    "INSERT INTO Recipe (title, instructions, prep_time_minutes) VALUES (?, ?, ?)",
                    params![recipe.title, recipe.instructions, recipe.prep_time_minutes],
                )?;
                (rows, Some(tx.last_insert_rowid()))
            }
            Change::UpdateRecipe(recipe) => {
                let rows = tx.execute(
                    "UPDATE Recipe SET title = ?, instructions = ?, prep_time_minutes = ?
                    WHERE recipe_id = ?",
                    params![
                        recipe.title,
                        recipe.instructions,
                        recipe.prep_time_minutes,
                        recipe.recipe_id
                    ],
                )?;
                (rows, None)
            }
            Change::DeleteRecipe(recipe_id) => {
                let rows =
                    tx.execute("DELETE FROM Recipe WHERE recipe_id = ?", params![recipe_id])?;
                (rows, None)
            }
            Change::AddIngredient(recipe, ingredient) => {
                let recipe_id = outcome.resolve(recipe)?;
                let rows = tx.execute(
                    "INSERT INTO Ingredient (recipe_id, name, quantity) VALUES (?, ?, ?)",
                    params![recipe_id, ingredient.name, ingredient.quantity],
                )?;
                (rows, Some(tx.last_insert_rowid()))
            }
            Change::UpdateIngredient(ingredient) => {
                let rows = tx.execute(
                    "UPDATE Ingredient SET name = ?, quantity = ?
                    WHERE ingredient_id = ? AND recipe_id = ?",
                    params![
                        ingredient.name,
                        ingredient.quantity,
                        ingredient.ingredient_id,
                        ingredient.recipe_id
                    ],
                )?;
                (rows, None)
            }
            Change::DeleteIngredient(ingredient_id) => {
                let rows = tx.execute(
                    "DELETE FROM Ingredient WHERE ingredient_id = ?",
                    params![ingredient_id],
                )?;
                (rows, None)
            }
            Change::AddStep(recipe, step) => {
                let recipe_id = outcome.resolve(recipe)?;
                let rows = tx.execute(
                    "INSERT INTO InstructionStep (recipe_id, step_description, step_order)
                    VALUES (?, ?, ?)",
                    params![recipe_id, step.step_description, step.order],
                )?;
                (rows, Some(tx.last_insert_rowid()))
            }
            Change::UpdateStep(step) => {
                let rows = tx.execute(
                    "UPDATE InstructionStep SET step_description = ?, step_order = ?
                    WHERE step_id = ? AND recipe_id = ?",
                    params![
                        step.step_description,
                        step.order,
                        step.step_id,
                        step.recipe_id
                    ],
                )?;
                (rows, None)
            }
            Change::DeleteStep(step_id) => {
                let rows = tx.execute(
                    "DELETE FROM InstructionStep WHERE step_id = ?",
                    params![step_id],
                )?;
                (rows, None)
            }
        };
        outcome.rows_affected += rows;
        outcome.inserted_ids.push(inserted);
    }
    // Dropping the transaction without committing rolls everything back
    tx.commit()?;
    Ok(outcome)
}

#[async_trait]
impl RecipeRepository for SqliteRecipeRepository {
    async fn get_all_recipes(&self) -> Result<Vec<Recipe>> {
        self.db
            .run(|conn| collect_rows(conn, "SELECT * FROM Recipe ORDER BY recipe_id", []))
            .await
    }

    async fn get_recipe_by_id(&self, recipe_id: i64) -> Result<Option<Recipe>> {
        self.get_recipe_with_ingredients(recipe_id).await
    }

    async fn get_recipe_with_ingredients(&self, recipe_id: i64) -> Result<Option<Recipe>> {
        self.db
            .run(move |conn| {
                let Some(mut recipe) = recipe_by_id(conn, recipe_id)? else {
                    return Ok(None);
                };
                recipe.ingredients = ingredients_of(conn, recipe_id)?;
                Ok(Some(recipe))
            })
            .await
    }

    async fn get_recipe_with_steps(&self, recipe_id: i64) -> Result<Option<Recipe>> {
        self.db
            .run(move |conn| {
                let Some(mut recipe) = recipe_by_id(conn, recipe_id)? else {
                    return Ok(None);
                };
                recipe.instruction_steps = steps_of(conn, recipe_id)?;
                Ok(Some(recipe))
            })
            .await
    }

    async fn get_ingredient_for_recipe(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
    ) -> Result<Option<Ingredient>> {
        self.db
            .run(move |conn| {
                Ok(collect_rows(
                    conn,
                    "SELECT * FROM Ingredient WHERE recipe_id = ? AND ingredient_id = ?",
                    params![recipe_id, ingredient_id],
                )?
                .pop())
            })
            .await
    }

    async fn get_step_for_recipe(
        &self,
        recipe_id: i64,
        step_id: i64,
    ) -> Result<Option<InstructionStep>> {
        self.db
            .run(move |conn| {
                Ok(collect_rows(
                    conn,
                    "SELECT * FROM InstructionStep WHERE recipe_id = ? AND step_id = ?",
                    params![recipe_id, step_id],
                )?
                .pop())
            })
            .await
    }

    async fn save_changes(&self, changes: ChangeSet) -> Result<SaveOutcome> {
        if changes.is_empty() {
            return Ok(SaveOutcome::default());
        }
        self.db.run(move |conn| apply_changes(conn, changes)).await
    }
}
