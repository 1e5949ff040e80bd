use std::collections::HashMap;

use chrono::NaiveDate;
use log::info;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use super::models::{
    FoodItem, FoodLog, FoodLogEntry, MealPlan, NewFoodItem, NewFoodLog, NewPlannedMeal,
    PlannedMeal, PlannedMealEntry, Recipe, RecipeIngredient, ShoppingList, ShoppingListItem,
    ShoppingListWithItems,
};
use crate::nutrition::NutrientTotals;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Backend error: status {0}, body: {1}")]
    Backend(StatusCode, String),
    #[error("Row not found in {0}")]
    NotFound(&'static str),
}

/// Client for the hosted relational backend, speaking the PostgREST
/// dialect over its REST endpoint.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    base_url: String,
    service_key: String,
    client: Client,
}

impl SupabaseClient {
    pub fn new(base_url: String, service_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            client: Client::new(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    fn get(&self, table: &str) -> RequestBuilder {
        self.with_auth(self.client.get(self.table_url(table)))
    }

    fn post(&self, table: &str) -> RequestBuilder {
        self.with_auth(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
    }

    fn patch(&self, table: &str) -> RequestBuilder {
        self.with_auth(self.client.patch(self.table_url(table)))
    }

    fn delete(&self, table: &str) -> RequestBuilder {
        self.with_auth(self.client.delete(self.table_url(table)))
    }

    async fn check(response: Response) -> Result<Response, DatabaseError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(DatabaseError::Backend(status, body))
        }
    }

    pub async fn search_food_items(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<FoodItem>, DatabaseError> {
        let mut params = vec![
            ("select", "*".to_string()),
            ("order", "name.asc".to_string()),
            ("limit", limit.to_string()),
        ];
        if !query.is_empty() {
            params.push(("name", format!("ilike.*{}*", query)));
        }

        let response = self.get("food_items").query(&params).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn insert_food_item(&self, item: &NewFoodItem) -> Result<FoodItem, DatabaseError> {
        let response = self.post("food_items").json(item).send().await?;
        let rows: Vec<FoodItem> = Self::check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or(DatabaseError::NotFound("food_items"))
    }

    pub async fn insert_food_log(&self, entry: &NewFoodLog) -> Result<FoodLog, DatabaseError> {
        let response = self.post("food_logs").json(entry).send().await?;
        let rows: Vec<FoodLog> = Self::check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or(DatabaseError::NotFound("food_logs"))
    }

    pub async fn food_logs_for_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<FoodLogEntry>, DatabaseError> {
        let params = vec![
            ("select", "*,food_items(*)".to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("date", format!("eq.{}", date)),
            ("order", "logged_at.asc".to_string()),
        ];

        let response = self.get("food_logs").query(&params).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn delete_food_log(&self, id: Uuid) -> Result<(), DatabaseError> {
        let params = vec![("id", format!("eq.{}", id))];
        let response = self.delete("food_logs").query(&params).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Daily totals from the aggregate view. A day with no logs has no
    /// row; that reads back as all-zero totals.
    pub async fn daily_totals(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<NutrientTotals, DatabaseError> {
        let params = vec![
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("date", format!("eq.{}", date)),
        ];

        let response = self
            .get("daily_nutrient_totals")
            .query(&params)
            .send()
            .await?;
        let rows: Vec<NutrientTotals> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    pub async fn meal_plan_for_week(
        &self,
        user_id: Uuid,
        week_start: NaiveDate,
    ) -> Result<Option<MealPlan>, DatabaseError> {
        let params = vec![
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("week_start_date", format!("eq.{}", week_start)),
        ];

        let response = self.get("meal_plans").query(&params).send().await?;
        let rows: Vec<MealPlan> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    pub async fn create_meal_plan(
        &self,
        user_id: Uuid,
        week_start: NaiveDate,
    ) -> Result<MealPlan, DatabaseError> {
        let response = self
            .post("meal_plans")
            .json(&json!({ "user_id": user_id, "week_start_date": week_start }))
            .send()
            .await?;
        let rows: Vec<MealPlan> = Self::check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or(DatabaseError::NotFound("meal_plans"))
    }

    pub async fn planned_meals(
        &self,
        meal_plan_id: Uuid,
    ) -> Result<Vec<PlannedMealEntry>, DatabaseError> {
        let params = vec![
            ("select", "*,recipes(*)".to_string()),
            ("meal_plan_id", format!("eq.{}", meal_plan_id)),
            ("order", "day_of_week.asc".to_string()),
        ];

        let response = self.get("planned_meals").query(&params).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn upsert_planned_meal(
        &self,
        meal: &NewPlannedMeal,
    ) -> Result<PlannedMeal, DatabaseError> {
        let response = self
            .with_auth(self.client.post(self.table_url("planned_meals")))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(meal)
            .send()
            .await?;
        let rows: Vec<PlannedMeal> = Self::check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or(DatabaseError::NotFound("planned_meals"))
    }

    pub async fn delete_planned_meal(&self, id: Uuid) -> Result<(), DatabaseError> {
        let params = vec![("id", format!("eq.{}", id))];
        let response = self.delete("planned_meals").query(&params).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn list_recipes(&self, limit: u32) -> Result<Vec<Recipe>, DatabaseError> {
        let params = vec![
            ("select", "*".to_string()),
            ("order", "rating.desc.nullslast".to_string()),
            ("limit", limit.to_string()),
        ];

        let response = self.get("recipes").query(&params).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Builds a shopping list for a meal plan: every ingredient of every
    /// planned recipe, summed per food item and unit, split round-robin
    /// into shopping runs.
    pub async fn generate_shopping_list(
        &self,
        meal_plan_id: Uuid,
        split_into_runs: i32,
    ) -> Result<ShoppingListWithItems, DatabaseError> {
        let meals = self.planned_meals(meal_plan_id).await?;

        let mut recipe_counts: HashMap<Uuid, f64> = HashMap::new();
        for entry in &meals {
            *recipe_counts.entry(entry.meal.recipe_id).or_insert(0.0) += 1.0;
        }

        let ingredients = if recipe_counts.is_empty() {
            Vec::new()
        } else {
            let ids: Vec<String> = recipe_counts.keys().map(Uuid::to_string).collect();
            let params = vec![
                ("select", "*".to_string()),
                ("recipe_id", format!("in.({})", ids.join(","))),
            ];
            let response = self.get("recipe_ingredients").query(&params).send().await?;
            Self::check(response).await?.json().await?
        };

        let merged = merge_ingredients(&ingredients, &recipe_counts);

        let response = self
            .post("shopping_lists")
            .json(&json!({
                "meal_plan_id": meal_plan_id,
                "split_into_runs": split_into_runs.max(1),
            }))
            .send()
            .await?;
        let lists: Vec<ShoppingList> = Self::check(response).await?.json().await?;
        let list = lists
            .into_iter()
            .next()
            .ok_or(DatabaseError::NotFound("shopping_lists"))?;

        let items = if merged.is_empty() {
            Vec::new()
        } else {
            let runs = split_into_runs.max(1);
            let payload: Vec<serde_json::Value> = merged
                .iter()
                .enumerate()
                .map(|(i, (food_item_id, unit, amount))| {
                    json!({
                        "shopping_list_id": list.id,
                        "food_item_id": food_item_id,
                        "amount": amount,
                        "unit": unit,
                        "purchased": false,
                        "shopping_run": (i as i32 % runs) + 1,
                    })
                })
                .collect();

            let response = self
                .post("shopping_list_items")
                .json(&payload)
                .send()
                .await?;
            Self::check(response).await?.json().await?
        };

        info!(
            "Generated shopping list {} with {} items for meal plan {}",
            list.id,
            items.len(),
            meal_plan_id
        );

        Ok(ShoppingListWithItems { list, items })
    }

    pub async fn set_item_purchased(
        &self,
        item_id: Uuid,
        purchased: bool,
    ) -> Result<(), DatabaseError> {
        let params = vec![("id", format!("eq.{}", item_id))];
        let response = self
            .patch("shopping_list_items")
            .query(&params)
            .json(&json!({ "purchased": purchased }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// Flat-map of the planned-recipe ingredients: amounts weighted by how
/// often each recipe is planned, summed per (food item, unit), ordered by
/// food item id for a stable list.
fn merge_ingredients(
    ingredients: &[RecipeIngredient],
    recipe_counts: &HashMap<Uuid, f64>,
) -> Vec<(Uuid, String, f64)> {
    let mut sums: HashMap<(Uuid, String), f64> = HashMap::new();
    for ingredient in ingredients {
        let count = recipe_counts.get(&ingredient.recipe_id).copied().unwrap_or(1.0);
        *sums
            .entry((ingredient.food_item_id, ingredient.unit.clone()))
            .or_insert(0.0) += ingredient.amount * count;
    }

    let mut merged: Vec<(Uuid, String, f64)> = sums
        .into_iter()
        .map(|((food_item_id, unit), amount)| (food_item_id, unit, amount))
        .collect();
    merged.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(recipe: Uuid, food: Uuid, amount: f64, unit: &str) -> RecipeIngredient {
        RecipeIngredient {
            id: Uuid::new_v4(),
            recipe_id: recipe,
            food_item_id: food,
            amount,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn merge_sums_duplicate_food_items() {
        let recipe_a = Uuid::new_v4();
        let recipe_b = Uuid::new_v4();
        let spinach = Uuid::new_v4();
        let counts: HashMap<Uuid, f64> = [(recipe_a, 1.0), (recipe_b, 1.0)].into();

        let merged = merge_ingredients(
            &[
                ingredient(recipe_a, spinach, 100.0, "g"),
                ingredient(recipe_b, spinach, 50.0, "g"),
            ],
            &counts,
        );

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].0, spinach);
        assert_eq!(merged[0].2, 150.0);
    }

    #[test]
    fn merge_keeps_different_units_separate() {
        let recipe = Uuid::new_v4();
        let milk = Uuid::new_v4();
        let counts: HashMap<Uuid, f64> = [(recipe, 1.0)].into();

        let merged = merge_ingredients(
            &[
                ingredient(recipe, milk, 200.0, "ml"),
                ingredient(recipe, milk, 1.0, "cup"),
            ],
            &counts,
        );

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merge_weights_by_times_planned() {
        let recipe = Uuid::new_v4();
        let eggs = Uuid::new_v4();
        // Planned twice in the week.
        let counts: HashMap<Uuid, f64> = [(recipe, 2.0)].into();

        let merged = merge_ingredients(&[ingredient(recipe, eggs, 3.0, "piece")], &counts);

        assert_eq!(merged[0].2, 6.0);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        let merged = merge_ingredients(&[], &HashMap::new());
        assert!(merged.is_empty());
    }
}
