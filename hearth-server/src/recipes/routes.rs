use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use hearth::basic_models::{
    IngredientCreateDto, IngredientDto, IngredientUpdateDto, InstructionStepCreateDto,
    InstructionStepDto, InstructionStepUpdateDto, RecipeCreateDto, RecipeDetailDto,
    RecipeSummaryDto, RecipeUpdateDto,
};

use super::service::RecipeService;
use crate::errors::{WebError, WebResult};
use crate::validation::ValidatedJson;

/// All recipe endpoints under `/api/recipes`
pub fn router(service: RecipeService) -> Router {
    Router::new()
        .route("/api/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/api/recipes/:recipe_id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route(
            "/api/recipes/:recipe_id/ingredients",
            get(list_ingredients).post(add_ingredient),
        )
        .route(
            "/api/recipes/:recipe_id/ingredients/:ingredient_id",
            get(get_ingredient)
                .put(update_ingredient)
                .delete(delete_ingredient),
        )
        .route(
            "/api/recipes/:recipe_id/instructions",
            get(list_steps).post(add_step),
        )
        .route(
            "/api/recipes/:recipe_id/instructions/:step_id",
            get(get_step).put(update_step).delete(delete_step),
        )
        .with_state(service)
}

// A 201 pointing at the new resource
fn created<T: serde::Serialize>(location: String, body: T) -> impl IntoResponse {
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(body))
}

async fn list_recipes(State(service): State<RecipeService>) -> WebResult<Json<Vec<RecipeSummaryDto>>> {
    Ok(Json(service.get_all_recipes().await?))
}

async fn get_recipe(
    State(service): State<RecipeService>,
    Path(recipe_id): Path<i64>,
) -> WebResult<Json<RecipeDetailDto>> {
    let recipe = service
        .get_recipe_by_id(recipe_id)
        .await?
        .ok_or(WebError::NotFound)?;
    Ok(Json(recipe))
}

async fn create_recipe(
    State(service): State<RecipeService>,
    ValidatedJson(dto): ValidatedJson<RecipeCreateDto>,
) -> WebResult<impl IntoResponse> {
    let recipe = service.create_recipe(dto).await?;
    Ok(created(format!("/api/recipes/{}", recipe.id), recipe))
}

async fn update_recipe(
    State(service): State<RecipeService>,
    Path(recipe_id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<RecipeUpdateDto>,
) -> WebResult<StatusCode> {
    service.update_recipe(recipe_id, dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_recipe(
    State(service): State<RecipeService>,
    Path(recipe_id): Path<i64>,
) -> WebResult<StatusCode> {
    service.delete_recipe(recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_ingredients(
    State(service): State<RecipeService>,
    Path(recipe_id): Path<i64>,
) -> WebResult<Json<Vec<IngredientDto>>> {
    Ok(Json(service.get_ingredients_for_recipe(recipe_id).await?))
}

async fn get_ingredient(
    State(service): State<RecipeService>,
    Path((recipe_id, ingredient_id)): Path<(i64, i64)>,
) -> WebResult<Json<IngredientDto>> {
    Ok(Json(
        service
            .get_ingredient_for_recipe(recipe_id, ingredient_id)
            .await?,
    ))
}

async fn add_ingredient(
    State(service): State<RecipeService>,
    Path(recipe_id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<IngredientCreateDto>,
) -> WebResult<impl IntoResponse> {
    let ingredient = service.add_ingredient_to_recipe(recipe_id, dto).await?;
    Ok(created(
        format!("/api/recipes/{}/ingredients/{}", recipe_id, ingredient.id),
        ingredient,
    ))
}

async fn update_ingredient(
    State(service): State<RecipeService>,
    Path((recipe_id, ingredient_id)): Path<(i64, i64)>,
    ValidatedJson(dto): ValidatedJson<IngredientUpdateDto>,
) -> WebResult<StatusCode> {
    service
        .update_ingredient(recipe_id, ingredient_id, dto)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_ingredient(
    State(service): State<RecipeService>,
    Path((recipe_id, ingredient_id)): Path<(i64, i64)>,
) -> WebResult<StatusCode> {
    service.delete_ingredient(recipe_id, ingredient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_steps(
    State(service): State<RecipeService>,
    Path(recipe_id): Path<i64>,
) -> WebResult<Json<Vec<InstructionStepDto>>> {
    Ok(Json(service.get_steps_for_recipe(recipe_id).await?))
}

async fn get_step(
    State(service): State<RecipeService>,
    Path((recipe_id, step_id)): Path<(i64, i64)>,
) -> WebResult<Json<InstructionStepDto>> {
    Ok(Json(service.get_step_for_recipe(recipe_id, step_id).await?))
}

async fn add_step(
    State(service): State<RecipeService>,
    Path(recipe_id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<InstructionStepCreateDto>,
) -> WebResult<impl IntoResponse> {
    let step = service.add_step_to_recipe(recipe_id, dto).await?;
    Ok(created(
        format!("/api/recipes/{}/instructions/{}", recipe_id, step.id),
        step,
    ))
}

async fn update_step(
    State(service): State<RecipeService>,
    Path((recipe_id, step_id)): Path<(i64, i64)>,
    ValidatedJson(dto): ValidatedJson<InstructionStepUpdateDto>,
) -> WebResult<StatusCode> {
    service.update_step(recipe_id, step_id, dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_step(
    State(service): State<RecipeService>,
    Path((recipe_id, step_id)): Path<(i64, i64)>,
) -> WebResult<StatusCode> {
    service.delete_step(recipe_id, step_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
