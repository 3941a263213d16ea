use std::collections::BTreeMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use super::{now, required_text};
use crate::entities::{category, menu_product, prelude::*, product, stock_movement};
use crate::error::{ApiError, ApiResult};

/// Amount of one product leaving stock.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionLine {
    pub product_id: i32,
    pub quantity: f64,
}

#[derive(Debug, Clone)]
pub struct BedConsumption {
    pub user_id: i32,
    pub bed_menu_id: i32,
    pub lines: Vec<ConsumptionLine>,
}

/// Ingredient usage for `servings` servings of a menu, one line per product.
pub fn consumption_lines(ingredients: &[menu_product::Model], servings: i32) -> Vec<ConsumptionLine> {
    let mut per_product: BTreeMap<i32, f64> = BTreeMap::new();
    for line in ingredients {
        *per_product.entry(line.product_id).or_insert(0.0) += line.quantity * f64::from(servings);
    }
    per_product
        .into_iter()
        .map(|(product_id, quantity)| ConsumptionLine {
            product_id,
            quantity,
        })
        .collect()
}

/// Stock keeping for served menus. Implementations write through the caller's
/// transaction so a failed consumption leaves stock untouched.
#[async_trait::async_trait]
pub trait Inventory: Send + Sync {
    async fn record_bed_consumption(
        &self,
        txn: &DatabaseTransaction,
        consumption: &BedConsumption,
    ) -> ApiResult<Vec<stock_movement::Model>>;
}

/// Decrements `products.stock` and writes one ledger row per product.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProductInventory;

#[async_trait::async_trait]
impl Inventory for ProductInventory {
    async fn record_bed_consumption(
        &self,
        txn: &DatabaseTransaction,
        consumption: &BedConsumption,
    ) -> ApiResult<Vec<stock_movement::Model>> {
        if User::find_by_id(consumption.user_id).one(txn).await?.is_none() {
            return Err(ApiError::not_found(format!(
                "User {} not found",
                consumption.user_id
            )));
        }

        let created_at = now();
        let mut movements = Vec::with_capacity(consumption.lines.len());
        for line in &consumption.lines {
            let product = Product::find_by_id(line.product_id)
                .one(txn)
                .await?
                .ok_or_else(|| ApiError::not_found(format!("Product {} not found", line.product_id)))?;

            // Guarded decrement: never lets stock go below zero
            let res = Product::update_many()
                .col_expr(
                    product::Column::Stock,
                    Expr::col(product::Column::Stock).sub(line.quantity),
                )
                .col_expr(product::Column::UpdatedAt, Expr::value(created_at))
                .filter(product::Column::Id.eq(product.id))
                .filter(product::Column::Stock.gte(line.quantity))
                .exec(txn)
                .await?;
            if res.rows_affected == 0 {
                return Err(ApiError::bad_request(format!(
                    "Insufficient stock for {}: {} {} available, {} required",
                    product.name, product.stock, product.unit, line.quantity
                )));
            }

            let movement = stock_movement::ActiveModel {
                product_id: Set(product.id),
                user_id: Set(consumption.user_id),
                quantity: Set(-line.quantity),
                kind: Set(stock_movement::KIND_BED_CONSUMPTION.to_string()),
                bed_menu_id: Set(Some(consumption.bed_menu_id)),
                created_at: Set(created_at),
                ..Default::default()
            }
            .insert(txn)
            .await?;
            movements.push(movement);
        }

        tracing::debug!(
            bed_menu_id = consumption.bed_menu_id,
            lines = movements.len(),
            "recorded bed consumption"
        );
        Ok(movements)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub unit: String,
    pub stock: Option<f64>,
    pub category_id: Option<i32>,
}

pub async fn create_product<C: ConnectionTrait>(
    db: &C,
    req: CreateProductRequest,
) -> ApiResult<product::Model> {
    let name = required_text("name", &req.name)?;
    let unit = required_text("unit", &req.unit)?;
    let stock = req.stock.unwrap_or(0.0);
    if !stock.is_finite() || stock < 0.0 {
        return Err(ApiError::bad_request("stock must be a non-negative number"));
    }
    if let Some(category_id) = req.category_id {
        if Category::find_by_id(category_id).one(db).await?.is_none() {
            return Err(ApiError::not_found(format!("Category {category_id} not found")));
        }
    }

    let ts = now();
    let product = product::ActiveModel {
        name: Set(name),
        unit: Set(unit),
        stock: Set(stock),
        category_id: Set(req.category_id),
        created_at: Set(ts),
        updated_at: Set(ts),
        ..Default::default()
    };
    Ok(product.insert(db).await?)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: product::Model,
    pub category: Option<category::Model>,
}

pub async fn find_all_products<C: ConnectionTrait>(db: &C) -> ApiResult<Vec<ProductWithCategory>> {
    let rows = Product::find()
        .find_also_related(Category)
        .order_by_asc(product::Column::Name)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(product, category)| ProductWithCategory { product, category })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(id: i32, product_id: i32, quantity: f64) -> menu_product::Model {
        menu_product::Model {
            id,
            menu_id: 1,
            product_id,
            quantity,
        }
    }

    #[test]
    fn scales_ingredients_by_servings() {
        let lines = consumption_lines(&[ingredient(1, 7, 0.25), ingredient(2, 3, 2.0)], 3);
        assert_eq!(
            lines,
            vec![
                ConsumptionLine { product_id: 3, quantity: 6.0 },
                ConsumptionLine { product_id: 7, quantity: 0.75 },
            ]
        );
    }

    #[test]
    fn merges_repeated_products() {
        let lines = consumption_lines(&[ingredient(1, 5, 1.0), ingredient(2, 5, 0.5)], 2);
        assert_eq!(lines, vec![ConsumptionLine { product_id: 5, quantity: 3.0 }]);
    }

    #[test]
    fn menu_without_ingredients_consumes_nothing() {
        assert!(consumption_lines(&[], 4).is_empty());
    }
}
