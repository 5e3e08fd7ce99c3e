//! Conversions between the wire DTOs and the stored entities.

use hearth::basic_models::{
    IngredientCreateDto, IngredientDto, IngredientUpdateDto, InstructionStepCreateDto,
    InstructionStepDto, InstructionStepUpdateDto, RecipeCreateDto, RecipeDetailDto,
    RecipeSummaryDto, RecipeUpdateDto,
};

use super::models::{
    Ingredient, InstructionStep, NewIngredient, NewInstructionStep, NewRecipe, Recipe,
};

impl From<&Recipe> for RecipeSummaryDto {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.recipe_id,
            title: recipe.title.clone(),
            prep_time_minutes: recipe.prep_time_minutes,
        }
    }
}

impl From<Recipe> for RecipeDetailDto {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.recipe_id,
            title: recipe.title,
            instructions: recipe.instructions,
            prep_time_minutes: recipe.prep_time_minutes,
            ingredients: recipe.ingredients.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Ingredient> for IngredientDto {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.ingredient_id,
            name: ingredient.name,
            quantity: ingredient.quantity,
        }
    }
}

impl From<InstructionStep> for InstructionStepDto {
    fn from(step: InstructionStep) -> Self {
        Self {
            id: step.step_id,
            step_description: step.step_description,
            order: step.order,
        }
    }
}

impl From<&RecipeCreateDto> for NewRecipe {
    fn from(dto: &RecipeCreateDto) -> Self {
        Self {
            title: dto.title.clone(),
            instructions: dto.instructions.clone(),
            prep_time_minutes: dto.prep_time_minutes,
        }
    }
}

impl From<IngredientCreateDto> for NewIngredient {
    fn from(dto: IngredientCreateDto) -> Self {
        Self {
            name: dto.name,
            quantity: dto.quantity,
        }
    }
}

impl From<InstructionStepCreateDto> for NewInstructionStep {
    fn from(dto: InstructionStepCreateDto) -> Self {
        Self {
            step_description: dto.step_description,
            order: dto.order,
        }
    }
}

impl Recipe {
    /// Overwrite the editable columns. Children are left alone.
    pub fn apply_update(&mut self, dto: RecipeUpdateDto) {
        self.title = dto.title;
        self.instructions = dto.instructions;
        self.prep_time_minutes = dto.prep_time_minutes;
    }
}

impl Ingredient {
    pub fn apply_update(&mut self, dto: IngredientUpdateDto) {
        self.name = dto.name;
        self.quantity = dto.quantity;
    }
}

impl InstructionStep {
    pub fn apply_update(&mut self, dto: InstructionStepUpdateDto) {
        self.step_description = dto.step_description;
        self.order = dto.order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_carries_ingredients_but_not_steps() {
        let recipe = Recipe {
            recipe_id: 3,
            title: "Stew".into(),
            instructions: Some("Simmer".into()),
            prep_time_minutes: 90,
            ingredients: vec![Ingredient {
                ingredient_id: 7,
                recipe_id: 3,
                name: "Beef".into(),
                quantity: "500 g".into(),
            }],
            instruction_steps: vec![InstructionStep {
                step_id: 1,
                recipe_id: 3,
                step_description: "Brown the beef".into(),
                order: 1,
            }],
        };
        let summary = RecipeSummaryDto::from(&recipe);
        assert_eq!(summary.id, 3);
        let detail = RecipeDetailDto::from(recipe);
        assert_eq!(detail.instructions.as_deref(), Some("Simmer"));
        assert_eq!(
            detail.ingredients,
            vec![IngredientDto {
                id: 7,
                name: "Beef".into(),
                quantity: "500 g".into()
            }]
        );
    }

    #[test]
    fn update_keeps_identity() {
        let mut step = InstructionStep {
            step_id: 4,
            recipe_id: 2,
            step_description: "Stir".into(),
            order: 1,
        };
        step.apply_update(InstructionStepUpdateDto {
            step_description: "Whisk".into(),
            order: 3,
        });
        assert_eq!((step.step_id, step.recipe_id), (4, 2));
        assert_eq!((step.step_description.as_str(), step.order), ("Whisk", 3));
    }
}
