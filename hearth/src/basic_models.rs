use serde::{Deserialize, Serialize};

/// Recipe as listed by `GET /api/recipes`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummaryDto {
    pub id: i64,
    pub title: String,
    pub prep_time_minutes: i32,
}

/// Recipe as returned by `GET /api/recipes/{id}`, including its ingredients
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetailDto {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub prep_time_minutes: i32,
    #[serde(default)]
    pub ingredients: Vec<IngredientDto>,
}

// Missing fields deserialize to their defaults so that the server can report them
// as validation errors instead of rejecting the whole body.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeCreateDto {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub prep_time_minutes: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<IngredientCreateDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instruction_steps: Vec<InstructionStepCreateDto>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeUpdateDto {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub prep_time_minutes: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDto {
    pub id: i64,
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IngredientCreateDto {
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IngredientUpdateDto {
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstructionStepDto {
    pub id: i64,
    pub step_description: String,
    pub order: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct InstructionStepCreateDto {
    pub step_description: String,
    pub order: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct InstructionStepUpdateDto {
    pub step_description: String,
    pub order: i32,
}

#[derive(Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterDto {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginDto {
    pub email: String,
    pub password: String,
}

// Never print passwords, not even in debug logs.
impl std::fmt::Debug for RegisterDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterDto")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for LoginDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginDto")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub email: String,
}

/// Errors reported by the identity layer when a registration is refused
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterErrors {
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SecureProbeResponse {
    pub message: String,
    pub authenticated_user: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_omits_missing_instructions() {
        let detail = RecipeDetailDto {
            id: 1,
            title: "Soup".into(),
            instructions: None,
            prep_time_minutes: 20,
            ingredients: vec![],
        };
        assert_eq!(
            serde_json::to_string(&detail).unwrap(),
            r#"{"id":1,"title":"Soup","prepTimeMinutes":20,"ingredients":[]}"#
        );
    }

    #[test]
    fn create_dto_tolerates_missing_fields() {
        let dto: RecipeCreateDto = serde_json::from_str(r#"{"prepTimeMinutes": 5}"#).unwrap();
        assert_eq!(dto.title, "");
        assert_eq!(dto.prep_time_minutes, 5);
        assert!(dto.ingredients.is_empty());
    }

    #[test]
    fn step_dto_uses_camel_case() {
        let step: InstructionStepCreateDto =
            serde_json::from_str(r#"{"stepDescription": "Boil", "order": 2}"#).unwrap();
        assert_eq!(step.step_description, "Boil");
        assert_eq!(step.order, 2);
    }

    #[test]
    fn create_dto_debug_shows_every_field() {
        let dto = RecipeCreateDto {
            title: "Soup".into(),
            instructions: Some("Simmer gently".into()),
            prep_time_minutes: 20,
            ingredients: vec![IngredientCreateDto {
                name: "Leek".into(),
                quantity: "2".into(),
            }],
            instruction_steps: vec![],
        };
        let shown = format!("{:?}", dto);
        assert!(shown.contains("Simmer gently"));
        assert!(shown.contains("Leek"));
    }
}
