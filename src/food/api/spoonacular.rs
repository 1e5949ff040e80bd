use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RecipeSearchResponse {
    #[serde(default)]
    pub results: Vec<RecipeResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResult {
    pub id: i64,
    pub title: String,
    pub summary: Option<String>,
    pub preparation_minutes: Option<i32>,
    pub cooking_minutes: Option<i32>,
    pub spoonacular_score: Option<f64>,
    pub image: Option<String>,
    pub source_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IngredientSearchResponse {
    #[serde(default)]
    pub results: Vec<IngredientResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientResult {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SpoonacularClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl SpoonacularClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.spoonacular.com".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Recipes matching a free-text query, with nutrition data attached,
    /// best meta-score first.
    pub async fn search_recipes(
        &self,
        query: &str,
        number: u32,
    ) -> Result<Vec<RecipeResult>, String> {
        let url = format!("{}/recipes/complexSearch", self.base_url);

        let params = vec![
            ("apiKey", self.api_key.clone()),
            ("query", query.to_string()),
            ("number", number.to_string()),
            ("addRecipeNutrition", "true".to_string()),
            ("sort", "meta-score".to_string()),
            ("sortDirection", "desc".to_string()),
        ];

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "API request failed with status: {}",
                response.status()
            ));
        }

        let data: RecipeSearchResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))?;

        Ok(data.results)
    }

    /// Individual ingredients matching a free-text query.
    pub async fn search_ingredients(
        &self,
        query: &str,
        number: u32,
    ) -> Result<Vec<IngredientResult>, String> {
        let url = format!("{}/food/ingredients/search", self.base_url);

        let params = vec![
            ("apiKey", self.api_key.clone()),
            ("query", query.to_string()),
            ("number", number.to_string()),
            ("metaInformation", "true".to_string()),
        ];

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "API request failed with status: {}",
                response.status()
            ));
        }

        let data: IngredientSearchResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))?;

        Ok(data.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_response_parses_camel_case_fields() {
        let body = r#"{
            "results": [
                {
                    "id": 715562,
                    "title": "Kale and Quinoa Salad",
                    "summary": "A bright salad.",
                    "preparationMinutes": 10,
                    "cookingMinutes": 20,
                    "spoonacularScore": 86.0,
                    "image": "https://img.spoonacular.com/recipes/715562.jpg",
                    "sourceUrl": "https://example.com/kale-salad"
                }
            ],
            "offset": 0,
            "number": 3,
            "totalResults": 42
        }"#;

        let parsed: RecipeSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.results.len(), 1);
        let recipe = &parsed.results[0];
        assert_eq!(recipe.id, 715562);
        assert_eq!(recipe.title, "Kale and Quinoa Salad");
        assert_eq!(recipe.preparation_minutes, Some(10));
        assert_eq!(recipe.spoonacular_score, Some(86.0));
        assert_eq!(
            recipe.source_url.as_deref(),
            Some("https://example.com/kale-salad")
        );
    }

    #[test]
    fn recipe_response_tolerates_sparse_results() {
        let body = r#"{"results": [{"id": 1, "title": "Plain Rice"}]}"#;
        let parsed: RecipeSearchResponse = serde_json::from_str(body).unwrap();
        let recipe = &parsed.results[0];
        assert!(recipe.summary.is_none());
        assert!(recipe.preparation_minutes.is_none());
        assert!(recipe.spoonacular_score.is_none());
    }

    #[test]
    fn ingredient_response_parses_results() {
        let body = r#"{
            "results": [
                {"id": 11457, "name": "spinach", "image": "spinach.jpg"},
                {"id": 9040, "name": "banana", "image": null}
            ]
        }"#;

        let parsed: IngredientSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].name, "spinach");
        assert!(parsed.results[1].image.is_none());
    }

    #[test]
    fn missing_results_key_means_empty() {
        let parsed: RecipeSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }
}
