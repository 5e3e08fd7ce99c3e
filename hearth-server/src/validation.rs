//! Field-level input validation for request bodies.
//!
//! Handlers take [`ValidatedJson<T>`] instead of `Json<T>`: the body is decoded, then
//! [`Validate::validate`] runs, and any problem becomes a 400 listing messages per field.

use std::collections::BTreeMap;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use hearth::basic_models::{
    IngredientCreateDto, IngredientUpdateDto, InstructionStepCreateDto, InstructionStepUpdateDto,
    LoginDto, RecipeCreateDto, RecipeUpdateDto, RegisterDto,
};
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::WebError;

lazy_static::lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid email regex");
}

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_PREP_TIME_MINUTES: i32 = 1440;
pub const STEP_ORDER_RANGE: std::ops::RangeInclusive<i32> = 1..=100;
pub const PASSWORD_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 6..=100;

/// Messages per offending field, serialized as `{"errors": {"title": ["..."]}}`
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut me = Self::default();
        me.add(field, message);
        me
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    fn require(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.add(field, format!("The {} field is required.", field));
            false
        } else {
            true
        }
    }

    fn max_length(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(
                field,
                format!("The {} field cannot exceed {} characters.", field, max),
            );
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = self.errors.keys().cloned().collect::<Vec<_>>();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

fn validate_recipe_fields(errors: &mut ValidationErrors, title: &str, prep_time_minutes: i32) {
    if errors.require("title", title) {
        errors.max_length("title", title, MAX_NAME_LENGTH);
    }
    if !(0..=MAX_PREP_TIME_MINUTES).contains(&prep_time_minutes) {
        errors.add(
            "prepTimeMinutes",
            format!(
                "The preparation time must be between 0 and {} minutes.",
                MAX_PREP_TIME_MINUTES
            ),
        );
    }
}

fn validate_ingredient_fields(errors: &mut ValidationErrors, prefix: &str, name: &str, quantity: &str) {
    let name_field = format!("{}name", prefix);
    if errors.require(&name_field, name) {
        errors.max_length(&name_field, name, MAX_NAME_LENGTH);
    }
    errors.require(&format!("{}quantity", prefix), quantity);
}

fn validate_step_fields(errors: &mut ValidationErrors, prefix: &str, description: &str, order: i32) {
    errors.require(&format!("{}stepDescription", prefix), description);
    if !STEP_ORDER_RANGE.contains(&order) {
        errors.add(
            &format!("{}order", prefix),
            format!(
                "The order must be between {} and {}.",
                STEP_ORDER_RANGE.start(),
                STEP_ORDER_RANGE.end()
            ),
        );
    }
}

impl Validate for RecipeCreateDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        validate_recipe_fields(&mut errors, &self.title, self.prep_time_minutes);
        for (i, ingredient) in self.ingredients.iter().enumerate() {
            validate_ingredient_fields(
                &mut errors,
                &format!("ingredients[{}].", i),
                &ingredient.name,
                &ingredient.quantity,
            );
        }
        for (i, step) in self.instruction_steps.iter().enumerate() {
            validate_step_fields(
                &mut errors,
                &format!("instructionSteps[{}].", i),
                &step.step_description,
                step.order,
            );
        }
        errors.into_result()
    }
}

impl Validate for RecipeUpdateDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        validate_recipe_fields(&mut errors, &self.title, self.prep_time_minutes);
        errors.into_result()
    }
}

impl Validate for IngredientCreateDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        validate_ingredient_fields(&mut errors, "", &self.name, &self.quantity);
        errors.into_result()
    }
}

impl Validate for IngredientUpdateDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        validate_ingredient_fields(&mut errors, "", &self.name, &self.quantity);
        errors.into_result()
    }
}

impl Validate for InstructionStepCreateDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        validate_step_fields(&mut errors, "", &self.step_description, self.order);
        errors.into_result()
    }
}

impl Validate for InstructionStepUpdateDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        validate_step_fields(&mut errors, "", &self.step_description, self.order);
        errors.into_result()
    }
}

impl Validate for RegisterDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if errors.require("email", &self.email) && !EMAIL.is_match(self.email.trim()) {
            errors.add("email", "The email field is not a valid e-mail address.");
        }
        if errors.require("password", &self.password)
            && !PASSWORD_LENGTH_RANGE.contains(&self.password.chars().count())
        {
            errors.add(
                "password",
                format!(
                    "The password must be between {} and {} characters long.",
                    PASSWORD_LENGTH_RANGE.start(),
                    PASSWORD_LENGTH_RANGE.end()
                ),
            );
        }
        errors.into_result()
    }
}

impl Validate for LoginDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.require("email", &self.email);
        errors.require("password", &self.password);
        errors.into_result()
    }
}

/// JSON body extractor that also runs [`Validate`].
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationErrors::single("body", rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}
