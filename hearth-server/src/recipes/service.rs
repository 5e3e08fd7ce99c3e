use std::sync::Arc;

use anyhow::anyhow;
use hearth::basic_models::{
    IngredientCreateDto, IngredientDto, IngredientUpdateDto, InstructionStepCreateDto,
    InstructionStepDto, InstructionStepUpdateDto, RecipeCreateDto, RecipeDetailDto,
    RecipeSummaryDto, RecipeUpdateDto,
};

use super::models::{Ingredient, InstructionStep, NewRecipe, Recipe};
use super::repository::{ChangeSet, RecipeRepository, SaveOutcome};
use crate::database::is_constraint_violation;
use crate::errors::WebError;

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("Not found")]
    NotFound,
    /// A commit failed or changed nothing
    #[error("Failed to save changes: {0:#}")]
    Persistence(anyhow::Error),
    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl From<ServiceError> for WebError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound => WebError::NotFound,
            ServiceError::Persistence(err) => WebError::Persistence(err),
            ServiceError::Storage(err) => WebError::Internal(err),
        }
    }
}

/// Recipe operations in terms of DTOs. Handlers never see entities.
#[derive(Clone)]
pub struct RecipeService {
    repository: Arc<dyn RecipeRepository>,
}

impl RecipeService {
    pub fn new(repository: Arc<dyn RecipeRepository>) -> Self {
        Self { repository }
    }

    async fn commit(&self, changes: ChangeSet) -> ServiceResult<SaveOutcome> {
        self.repository.save_changes(changes).await.map_err(|err| {
            if is_constraint_violation(&err) {
                tracing::warn!("Changes rejected by a constraint: {:#}", err);
            }
            ServiceError::Persistence(err)
        })
    }

    /// Like `commit`, but writing nothing is also a failure.
    async fn commit_expecting_rows(&self, changes: ChangeSet) -> ServiceResult<SaveOutcome> {
        let outcome = self.commit(changes).await?;
        if !outcome.saved() {
            return Err(ServiceError::Persistence(anyhow!("No rows were affected")));
        }
        Ok(outcome)
    }

    /// Commit an update of a row that was just read. Zero rows means it was deleted meanwhile.
    async fn commit_update(&self, changes: ChangeSet) -> ServiceResult<()> {
        if self.commit(changes).await?.saved() {
            Ok(())
        } else {
            tracing::info!("Row disappeared before its update was saved");
            Err(ServiceError::NotFound)
        }
    }

    async fn require_recipe(&self, recipe_id: i64) -> ServiceResult<Recipe> {
        self.repository
            .get_recipe_by_id(recipe_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn get_all_recipes(&self) -> ServiceResult<Vec<RecipeSummaryDto>> {
        let recipes = self.repository.get_all_recipes().await?;
        Ok(recipes.iter().map(RecipeSummaryDto::from).collect())
    }

    pub async fn get_recipe_by_id(&self, recipe_id: i64) -> ServiceResult<Option<RecipeDetailDto>> {
        Ok(self
            .repository
            .get_recipe_by_id(recipe_id)
            .await?
            .map(RecipeDetailDto::from))
    }

    /// Create a recipe together with any ingredients and steps it arrived with.
    pub async fn create_recipe(&self, dto: RecipeCreateDto) -> ServiceResult<RecipeDetailDto> {
        let mut changes = ChangeSet::new();
        let recipe_key = changes.add_recipe(NewRecipe::from(&dto));
        for ingredient in dto.ingredients {
            changes.add_ingredient(recipe_key, ingredient.into());
        }
        for step in dto.instruction_steps {
            changes.add_step(recipe_key, step.into());
        }
        let outcome = self.commit_expecting_rows(changes).await?;
        let recipe_id = outcome
            .inserted_id(recipe_key)
            .ok_or_else(|| ServiceError::Persistence(anyhow!("Recipe insert produced no id")))?;
        tracing::info!("Created recipe {}", recipe_id);

        self.repository
            .get_recipe_by_id(recipe_id)
            .await?
            .map(RecipeDetailDto::from)
            .ok_or_else(|| {
                ServiceError::Persistence(anyhow!("Recipe {} vanished after create", recipe_id))
            })
    }

    pub async fn update_recipe(&self, recipe_id: i64, dto: RecipeUpdateDto) -> ServiceResult<()> {
        let mut recipe = self.require_recipe(recipe_id).await?;
        recipe.apply_update(dto);
        let mut changes = ChangeSet::new();
        changes.update_recipe(recipe);
        self.commit_update(changes).await
    }

    /// Deleting a recipe that does not exist succeeds.
    pub async fn delete_recipe(&self, recipe_id: i64) -> ServiceResult<()> {
        let Some(recipe) = self.repository.get_recipe_by_id(recipe_id).await? else {
            tracing::debug!("Recipe {} already absent", recipe_id);
            return Ok(());
        };
        let mut changes = ChangeSet::new();
        changes.delete_recipe(&recipe);
        self.commit(changes).await?;
        tracing::info!("Deleted recipe {}", recipe_id);
        Ok(())
    }

    pub async fn get_ingredients_for_recipe(
        &self,
        recipe_id: i64,
    ) -> ServiceResult<Vec<IngredientDto>> {
        let recipe = self
            .repository
            .get_recipe_with_ingredients(recipe_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        Ok(recipe.ingredients.into_iter().map(Into::into).collect())
    }

    pub async fn get_ingredient_for_recipe(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
    ) -> ServiceResult<IngredientDto> {
        self.repository
            .get_ingredient_for_recipe(recipe_id, ingredient_id)
            .await?
            .map(IngredientDto::from)
            .ok_or(ServiceError::NotFound)
    }

    pub async fn add_ingredient_to_recipe(
        &self,
        recipe_id: i64,
        dto: IngredientCreateDto,
    ) -> ServiceResult<IngredientDto> {
        self.require_recipe(recipe_id).await?;
        let mut changes = ChangeSet::new();
        let key = changes.add_ingredient(recipe_id, dto.clone().into());
        let outcome = self.commit_expecting_rows(changes).await?;
        let ingredient_id = outcome
            .inserted_id(key)
            .ok_or_else(|| ServiceError::Persistence(anyhow!("Ingredient insert produced no id")))?;
        Ok(IngredientDto {
            id: ingredient_id,
            name: dto.name,
            quantity: dto.quantity,
        })
    }

    pub async fn update_ingredient(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
        dto: IngredientUpdateDto,
    ) -> ServiceResult<()> {
        let mut ingredient: Ingredient = self
            .repository
            .get_ingredient_for_recipe(recipe_id, ingredient_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        ingredient.apply_update(dto);
        let mut changes = ChangeSet::new();
        changes.update_ingredient(ingredient);
        self.commit_update(changes).await
    }

    /// Fails only when the recipe is missing. A missing ingredient is already deleted.
    pub async fn delete_ingredient(&self, recipe_id: i64, ingredient_id: i64) -> ServiceResult<()> {
        self.require_recipe(recipe_id).await?;
        let Some(ingredient) = self
            .repository
            .get_ingredient_for_recipe(recipe_id, ingredient_id)
            .await?
        else {
            return Ok(());
        };
        let mut changes = ChangeSet::new();
        changes.delete_ingredient(&ingredient);
        self.commit(changes).await?;
        Ok(())
    }

    /// Steps in their display order.
    pub async fn get_steps_for_recipe(
        &self,
        recipe_id: i64,
    ) -> ServiceResult<Vec<InstructionStepDto>> {
        let recipe = self
            .repository
            .get_recipe_with_steps(recipe_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        Ok(recipe.instruction_steps.into_iter().map(Into::into).collect())
    }

    pub async fn get_step_for_recipe(
        &self,
        recipe_id: i64,
        step_id: i64,
    ) -> ServiceResult<InstructionStepDto> {
        self.repository
            .get_step_for_recipe(recipe_id, step_id)
            .await?
            .map(InstructionStepDto::from)
            .ok_or(ServiceError::NotFound)
    }

    /// An order already used by another step of the recipe fails at commit.
    pub async fn add_step_to_recipe(
        &self,
        recipe_id: i64,
        dto: InstructionStepCreateDto,
    ) -> ServiceResult<InstructionStepDto> {
        self.require_recipe(recipe_id).await?;
        let mut changes = ChangeSet::new();
        let key = changes.add_step(recipe_id, dto.clone().into());
        let outcome = self.commit_expecting_rows(changes).await?;
        let step_id = outcome
            .inserted_id(key)
            .ok_or_else(|| ServiceError::Persistence(anyhow!("Step insert produced no id")))?;
        Ok(InstructionStepDto {
            id: step_id,
            step_description: dto.step_description,
            order: dto.order,
        })
    }

    pub async fn update_step(
        &self,
        recipe_id: i64,
        step_id: i64,
        dto: InstructionStepUpdateDto,
    ) -> ServiceResult<()> {
        let mut step: InstructionStep = self
            .repository
            .get_step_for_recipe(recipe_id, step_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        step.apply_update(dto);
        let mut changes = ChangeSet::new();
        changes.update_step(step);
        self.commit_update(changes).await
    }

    pub async fn delete_step(&self, recipe_id: i64, step_id: i64) -> ServiceResult<()> {
        self.require_recipe(recipe_id).await?;
        let Some(step) = self.repository.get_step_for_recipe(recipe_id, step_id).await? else {
            return Ok(());
        };
        let mut changes = ChangeSet::new();
        changes.delete_step(&step);
        self.commit(changes).await?;
        Ok(())
    }
}
