use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: Uuid,
    pub name: String,
    pub serving_size: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    #[serde(default)]
    pub vitamin_a_mcg: f64,
    #[serde(default)]
    pub vitamin_d_mcg: f64,
    #[serde(default)]
    pub vitamin_k_mcg: f64,
    #[serde(default)]
    pub vitamin_b1_mg: f64,
    #[serde(default)]
    pub vitamin_b6_mg: f64,
    #[serde(default)]
    pub vitamin_b12_mcg: f64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewFoodItem {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub serving_size: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    #[serde(default)]
    pub vitamin_a_mcg: f64,
    #[serde(default)]
    pub vitamin_d_mcg: f64,
    #[serde(default)]
    pub vitamin_k_mcg: f64,
    #[serde(default)]
    pub vitamin_b1_mg: f64,
    #[serde(default)]
    pub vitamin_b6_mg: f64,
    #[serde(default)]
    pub vitamin_b12_mcg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_item_id: Uuid,
    pub date: NaiveDate,
    pub meal_type: String,
    pub servings: f64,
    pub logged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewFoodLog {
    pub user_id: Uuid,
    pub food_item_id: Uuid,
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 50))]
    pub meal_type: String,
    #[validate(range(min = 0.1, max = 50.0))]
    pub servings: f64,
}

/// A food log row with its food item embedded, as PostgREST returns it
/// for `select=*,food_items(*)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLogEntry {
    #[serde(flatten)]
    pub log: FoodLog,
    pub food_items: Option<FoodItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub instructions: String,
    pub prep_time_minutes: Option<i32>,
    pub cooking_time_minutes: Option<i32>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub servings: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub food_item_id: Uuid,
    pub amount: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub week_start_date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub id: Uuid,
    pub meal_plan_id: Uuid,
    pub recipe_id: Uuid,
    pub day_of_week: i32,
    pub meal_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPlannedMeal {
    pub meal_plan_id: Uuid,
    pub recipe_id: Uuid,
    #[validate(range(min = 0, max = 6))]
    pub day_of_week: i32,
    #[validate(length(min = 1, max = 50))]
    pub meal_type: String,
}

/// A planned meal with its recipe embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedMealEntry {
    #[serde(flatten)]
    pub meal: PlannedMeal,
    pub recipes: Option<Recipe>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: Uuid,
    pub meal_plan_id: Uuid,
    pub split_into_runs: i32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub id: Uuid,
    pub shopping_list_id: Uuid,
    pub food_item_id: Uuid,
    pub amount: f64,
    pub unit: String,
    pub purchased: bool,
    pub shopping_run: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShoppingListWithItems {
    pub list: ShoppingList,
    pub items: Vec<ShoppingListItem>,
}
