use crate::database::FromRow;

/// A recipe row, plus whichever children the query asked to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub recipe_id: i64,
    pub title: String,
    /// Free text instructions from before structured steps existed
    pub instructions: Option<String>,
    pub prep_time_minutes: i32,
    pub ingredients: Vec<Ingredient>,
    pub instruction_steps: Vec<InstructionStep>,
}

impl FromRow for Recipe {
    /// Create a new recipe from an sql row, provided by rusqlite, using named columns.
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            recipe_id: row.get("recipe_id")?,
            title: row.get("title")?,
            instructions: row.get("instructions")?,
            prep_time_minutes: row.get("prep_time_minutes")?,
            ingredients: vec![],
            instruction_steps: vec![],
        })
    }
}

/// Fields of a recipe that does not exist yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub title: String,
    pub instructions: Option<String>,
    pub prep_time_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub ingredient_id: i64,
    pub recipe_id: i64,
    pub name: String,
    pub quantity: String,
}

impl FromRow for Ingredient {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            ingredient_id: row.get("ingredient_id")?,
            recipe_id: row.get("recipe_id")?,
            name: row.get("name")?,
            quantity: row.get("quantity")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionStep {
    pub step_id: i64,
    pub recipe_id: i64,
    pub step_description: String,
    pub order: i32,
}

impl FromRow for InstructionStep {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            step_id: row.get("step_id")?,
            recipe_id: row.get("recipe_id")?,
            step_description: row.get("step_description")?,
            order: row.get("step_order")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInstructionStep {
    pub step_description: String,
    pub order: i32,
}
