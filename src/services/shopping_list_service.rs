use std::collections::BTreeMap;

use sqlx::FromRow;

use crate::{
    db::DbPool,
    error::AppResult,
    middleware::auth::AuthUser,
    models::ShoppingListItem,
};

pub const SHOPPING_LIST_BANNER: &str = "*** SHOPPING LIST ***";
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// One ingredient line of one recipe in the cart.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct CartIngredientRow {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Group by `(name, unit)` and sum amounts. Output is ordered by name, then unit.
pub fn aggregate(rows: impl IntoIterator<Item = CartIngredientRow>) -> Vec<ShoppingListItem> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for row in rows {
        *totals.entry((row.name, row.measurement_unit)).or_insert(0) += i64::from(row.amount);
    }
    totals
        .into_iter()
        .map(|((name, measurement_unit), total_amount)| ShoppingListItem {
            name,
            total_amount,
            measurement_unit,
        })
        .collect()
}

pub fn render(items: &[ShoppingListItem]) -> String {
    let mut content = format!("{SHOPPING_LIST_BANNER}\n\n");
    for item in items {
        content.push_str(&format!(
            "* {}: {} {}\n",
            item.name, item.total_amount, item.measurement_unit
        ));
    }
    content
}

pub async fn build_shopping_list(pool: &DbPool, user: &AuthUser) -> AppResult<Vec<ShoppingListItem>> {
    let rows = sqlx::query_as::<_, CartIngredientRow>(
        r#"
        SELECT i.name, i.measurement_unit, ri.amount
        FROM shopping_carts sc
        JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE sc.user_id = $1
        "#,
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    tracing::debug!(user_id = %user.user_id, lines = rows.len(), "aggregating shopping list");
    Ok(aggregate(rows))
}

pub async fn export_shopping_list(pool: &DbPool, user: &AuthUser) -> AppResult<String> {
    let items = build_shopping_list(pool, user).await?;
    Ok(render(&items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i32) -> CartIngredientRow {
        CartIngredientRow {
            name: name.into(),
            measurement_unit: unit.into(),
            amount,
        }
    }

    fn item(name: &str, total: i64, unit: &str) -> ShoppingListItem {
        ShoppingListItem {
            name: name.into(),
            total_amount: total,
            measurement_unit: unit.into(),
        }
    }

    #[test]
    fn sums_amounts_across_recipes() {
        // R1 = {flour: 200g, sugar: 50g}, R2 = {flour: 100g, egg: 2pcs}
        let rows = vec![
            line("flour", "g", 200),
            line("sugar", "g", 50),
            line("flour", "g", 100),
            line("egg", "pcs", 2),
        ];
        assert_eq!(
            aggregate(rows),
            vec![item("egg", 2, "pcs"), item("flour", 300, "g"), item("sugar", 50, "g")]
        );
    }

    #[test]
    fn empty_cart_gives_empty_list() {
        assert!(aggregate(Vec::new()).is_empty());
        assert_eq!(render(&[]), format!("{SHOPPING_LIST_BANNER}\n\n"));
    }

    #[test]
    fn same_name_different_unit_stays_separate() {
        let rows = vec![line("milk", "ml", 200), line("milk", "l", 1), line("milk", "ml", 50)];
        assert_eq!(aggregate(rows), vec![item("milk", 1, "l"), item("milk", 250, "ml")]);
    }

    #[test]
    fn order_does_not_depend_on_input_order() {
        let a = vec![line("b", "g", 1), line("a", "g", 1), line("c", "g", 1)];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(aggregate(a), aggregate(b));
    }

    #[test]
    fn renders_one_line_per_ingredient() {
        let text = render(&[item("flour", 300, "g"), item("egg", 2, "pcs")]);
        assert_eq!(
            text,
            "*** SHOPPING LIST ***\n\n* flour: 300 g\n* egg: 2 pcs\n"
        );
    }
}
