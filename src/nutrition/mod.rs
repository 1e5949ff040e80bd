use serde::{Deserialize, Deserializer, Serialize};

/// Accumulated daily nutrient amounts, as produced by the
/// `daily_nutrient_totals` aggregate view. Missing or null fields count as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NutrientTotals {
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_calories: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_protein: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_carbs: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_fat: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_fiber: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_vitamin_a: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_vitamin_d: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_vitamin_k: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_vitamin_b1: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_vitamin_b6: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_vitamin_b12: f64,
}

fn zero_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// One tracked vitamin: its recommended daily amount and the free-text
/// query used to search for foods rich in it.
pub struct NutrientCheck {
    pub name: &'static str,
    pub target: f64,
    pub search_term: &'static str,
    pub current: fn(&NutrientTotals) -> f64,
}

pub const NUTRIENT_CHECKS: &[NutrientCheck] = &[
    NutrientCheck {
        name: "Vitamin A",
        target: 900.0,
        search_term: "vitamin a rich foods",
        current: |n| n.total_vitamin_a,
    },
    NutrientCheck {
        name: "Vitamin D",
        target: 20.0,
        search_term: "vitamin d rich foods",
        current: |n| n.total_vitamin_d,
    },
    NutrientCheck {
        name: "Vitamin K",
        target: 120.0,
        search_term: "vitamin k rich foods",
        current: |n| n.total_vitamin_k,
    },
    NutrientCheck {
        name: "Vitamin B1",
        target: 1.2,
        search_term: "thiamin rich foods",
        current: |n| n.total_vitamin_b1,
    },
    NutrientCheck {
        name: "Vitamin B6",
        target: 1.7,
        search_term: "vitamin b6 rich foods",
        current: |n| n.total_vitamin_b6,
    },
    NutrientCheck {
        name: "Vitamin B12",
        target: 2.4,
        search_term: "vitamin b12 rich foods",
        current: |n| n.total_vitamin_b12,
    },
];

/// Recommended daily intake values, in the same units as the database columns.
#[derive(Debug, Clone, Serialize)]
pub struct DailyTargets {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub vitamin_a_mcg: f64,
    pub vitamin_d_mcg: f64,
    pub vitamin_k_mcg: f64,
    pub vitamin_b1_mg: f64,
    pub vitamin_b6_mg: f64,
    pub vitamin_b12_mcg: f64,
}

pub const DAILY_RECOMMENDED: DailyTargets = DailyTargets {
    calories: 2000.0,
    protein_g: 50.0,
    carbs_g: 275.0,
    fat_g: 78.0,
    fiber_g: 28.0,
    vitamin_a_mcg: 900.0,
    vitamin_d_mcg: 20.0,
    vitamin_k_mcg: 120.0,
    vitamin_b1_mg: 1.2,
    vitamin_b6_mg: 1.7,
    vitamin_b12_mcg: 2.4,
};

/// A positive gap between a recommended daily target and the logged total.
#[derive(Debug, Clone)]
pub struct Deficiency {
    pub name: &'static str,
    pub current: f64,
    pub target: f64,
    pub deficiency: f64,
    pub search_term: &'static str,
}

/// One pass over the tracked vitamins. Only strictly positive gaps are
/// deficiencies; meeting the target exactly is not.
pub fn find_deficiencies(totals: &NutrientTotals) -> Vec<Deficiency> {
    NUTRIENT_CHECKS
        .iter()
        .filter_map(|check| {
            let current = (check.current)(totals);
            let gap = check.target - current;
            if gap > 0.0 {
                Some(Deficiency {
                    name: check.name,
                    current,
                    target: check.target,
                    deficiency: gap,
                    search_term: check.search_term,
                })
            } else {
                None
            }
        })
        .collect()
}
