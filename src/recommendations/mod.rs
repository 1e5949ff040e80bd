use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{error, info};
use serde::Serialize;

use crate::food::api::spoonacular::{RecipeResult, SpoonacularClient};
use crate::nutrition::{find_deficiencies, Deficiency, NutrientTotals};

pub const RECIPES_PER_NUTRIENT: u32 = 3;
pub const FOODS_PER_NUTRIENT: u32 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct FoodSuggestion {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub prep_time_minutes: i32,
    pub cooking_time_minutes: i32,
    pub rating: Option<f64>,
    pub image: Option<String>,
    #[serde(rename = "sourceUrl")]
    pub source_url: Option<String>,
}

impl From<RecipeResult> for RecipeSummary {
    fn from(recipe: RecipeResult) -> Self {
        Self {
            id: recipe.id,
            name: recipe.title,
            description: recipe.summary,
            prep_time_minutes: recipe.preparation_minutes.unwrap_or(15),
            cooking_time_minutes: recipe.cooking_minutes.unwrap_or(30),
            // Spoonacular scores run 0-100, ratings are shown out of 5.
            rating: recipe.spoonacular_score.map(|score| score / 20.0),
            image: recipe.image,
            source_url: recipe.source_url,
        }
    }
}

/// Suggestions for closing one nutrient deficiency. Built per request,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub nutrient: String,
    pub current: f64,
    pub recommended: f64,
    pub deficiency: f64,
    pub foods: Vec<FoodSuggestion>,
    pub recipes: Vec<RecipeSummary>,
}

#[async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Suggestions for one deficient nutrient, or None when the search
    /// came back empty.
    async fn recommend(&self, deficiency: &Deficiency) -> Result<Option<Recommendation>>;
}

#[async_trait]
impl RecommendationSource for SpoonacularClient {
    async fn recommend(&self, deficiency: &Deficiency) -> Result<Option<Recommendation>> {
        let (recipes, foods) = futures::future::join(
            self.search_recipes(deficiency.search_term, RECIPES_PER_NUTRIENT),
            self.search_ingredients(deficiency.search_term, FOODS_PER_NUTRIENT),
        )
        .await;

        let recipes = recipes.map_err(|e| anyhow!("recipe search failed: {}", e))?;
        let foods = foods.map_err(|e| anyhow!("ingredient search failed: {}", e))?;

        if recipes.is_empty() && foods.is_empty() {
            return Ok(None);
        }

        Ok(Some(Recommendation {
            nutrient: deficiency.name.to_string(),
            current: deficiency.current,
            recommended: deficiency.target,
            deficiency: deficiency.deficiency,
            foods: foods
                .into_iter()
                .map(|food| FoodSuggestion { name: food.name })
                .collect(),
            recipes: recipes.into_iter().map(RecipeSummary::from).collect(),
        }))
    }
}

/// Checks every tracked nutrient in table order and collects whatever
/// per-nutrient suggestions succeed. A failed fetch is logged and that
/// nutrient skipped; the pass itself never fails.
pub async fn build_recommendations(
    totals: &NutrientTotals,
    source: &dyn RecommendationSource,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for deficiency in find_deficiencies(totals) {
        info!(
            "Finding recommendations for {} (current={}, recommended={}, deficiency={})",
            deficiency.name, deficiency.current, deficiency.target, deficiency.deficiency
        );

        match source.recommend(&deficiency).await {
            Ok(Some(recommendation)) => recommendations.push(recommendation),
            Ok(None) => info!("No results for {}", deficiency.name),
            Err(e) => error!("Error fetching {} recommendations: {}", deficiency.name, e),
        }
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that fails for the named nutrients and answers with a
    /// canned suggestion for every other one.
    struct StubSource {
        fail_for: Vec<&'static str>,
        empty_for: Vec<&'static str>,
    }

    impl StubSource {
        fn reliable() -> Self {
            Self {
                fail_for: Vec::new(),
                empty_for: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl RecommendationSource for StubSource {
        async fn recommend(&self, deficiency: &Deficiency) -> Result<Option<Recommendation>> {
            if self.fail_for.contains(&deficiency.name) {
                return Err(anyhow!("simulated search failure"));
            }
            if self.empty_for.contains(&deficiency.name) {
                return Ok(None);
            }
            Ok(Some(Recommendation {
                nutrient: deficiency.name.to_string(),
                current: deficiency.current,
                recommended: deficiency.target,
                deficiency: deficiency.deficiency,
                foods: vec![FoodSuggestion {
                    name: "spinach".to_string(),
                }],
                recipes: Vec::new(),
            }))
        }
    }

    fn totals_missing(names: &[&str]) -> NutrientTotals {
        let mut totals = NutrientTotals {
            total_vitamin_a: 900.0,
            total_vitamin_d: 20.0,
            total_vitamin_k: 120.0,
            total_vitamin_b1: 1.2,
            total_vitamin_b6: 1.7,
            total_vitamin_b12: 2.4,
            ..Default::default()
        };
        for name in names {
            match *name {
                "Vitamin A" => totals.total_vitamin_a = 0.0,
                "Vitamin D" => totals.total_vitamin_d = 0.0,
                "Vitamin K" => totals.total_vitamin_k = 0.0,
                "Vitamin B1" => totals.total_vitamin_b1 = 0.0,
                "Vitamin B6" => totals.total_vitamin_b6 = 0.0,
                "Vitamin B12" => totals.total_vitamin_b12 = 0.0,
                other => panic!("unknown nutrient {}", other),
            }
        }
        totals
    }

    #[tokio::test]
    async fn no_deficiencies_means_no_recommendations() {
        let source = StubSource::reliable();
        let recommendations = build_recommendations(&totals_missing(&[]), &source).await;
        assert!(recommendations.is_empty());
    }

    #[tokio::test]
    async fn only_the_deficient_nutrient_is_recommended() {
        let source = StubSource::reliable();
        let recommendations =
            build_recommendations(&totals_missing(&["Vitamin D"]), &source).await;
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].nutrient, "Vitamin D");
        assert_eq!(recommendations[0].deficiency, 20.0);
    }

    #[tokio::test]
    async fn one_failed_fetch_does_not_drop_the_others() {
        let source = StubSource {
            fail_for: vec!["Vitamin K"],
            empty_for: Vec::new(),
        };
        let recommendations =
            build_recommendations(&totals_missing(&["Vitamin D", "Vitamin K", "Vitamin B12"]), &source)
                .await;
        let nutrients: Vec<_> = recommendations.iter().map(|r| r.nutrient.as_str()).collect();
        assert_eq!(nutrients, vec!["Vitamin D", "Vitamin B12"]);
    }

    #[tokio::test]
    async fn empty_search_results_omit_the_nutrient() {
        let source = StubSource {
            fail_for: Vec::new(),
            empty_for: vec!["Vitamin D"],
        };
        let recommendations =
            build_recommendations(&totals_missing(&["Vitamin D", "Vitamin B1"]), &source).await;
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].nutrient, "Vitamin B1");
    }

    #[tokio::test]
    async fn all_fetches_failing_yields_empty_list() {
        let source = StubSource {
            fail_for: vec![
                "Vitamin A",
                "Vitamin D",
                "Vitamin K",
                "Vitamin B1",
                "Vitamin B6",
                "Vitamin B12",
            ],
            empty_for: Vec::new(),
        };
        let recommendations =
            build_recommendations(&NutrientTotals::default(), &source).await;
        assert!(recommendations.is_empty());
    }

    #[test]
    fn recipe_summary_fills_defaults_and_scales_rating() {
        let sparse = RecipeResult {
            id: 7,
            title: "Miso Soup".to_string(),
            summary: None,
            preparation_minutes: None,
            cooking_minutes: None,
            spoonacular_score: Some(90.0),
            image: None,
            source_url: None,
        };
        let summary = RecipeSummary::from(sparse);
        assert_eq!(summary.prep_time_minutes, 15);
        assert_eq!(summary.cooking_time_minutes, 30);
        assert_eq!(summary.rating, Some(4.5));
    }

    #[test]
    fn recipe_summary_serializes_source_url_in_camel_case() {
        let summary = RecipeSummary {
            id: 1,
            name: "Kale Salad".to_string(),
            description: None,
            prep_time_minutes: 10,
            cooking_time_minutes: 0,
            rating: None,
            image: None,
            source_url: Some("https://example.com".to_string()),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["sourceUrl"], "https://example.com");
        assert!(json.get("source_url").is_none());
    }
}
