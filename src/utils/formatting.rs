use console::style;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::models::{cart::CartLedger, line_item::LineItem};

#[derive(Tabled)]
struct LineItemTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Qty")]
    quantity: u32,
    #[tabled(rename = "Line Total")]
    line_total: String,
}

pub fn format_price(amount: f64) -> String {
    format!("${:.2}", amount)
}

pub fn format_item_table(items: &[LineItem]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let rows: Vec<LineItemTableRow> = items
        .iter()
        .map(|item| LineItemTableRow {
            id: item.id.clone(),
            name: if item.name.chars().count() > 30 {
                format!("{}...", item.name.chars().take(27).collect::<String>())
            } else {
                item.name.clone()
            },
            category: if item.category.is_empty() {
                "-".to_string()
            } else {
                item.category.clone()
            },
            price: match item.discount_percent() {
                Some(percent) => format!("{} (-{}%)", format_price(item.price), percent),
                None => format_price(item.price),
            },
            quantity: item.quantity,
            line_total: format_price(item.line_total()),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Alignment::left());
    table.modify(Columns::new(3..), Alignment::right());

    table.to_string()
}

pub fn format_totals(ledger: &CartLedger) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}: {}\n", style("Items").bold(), ledger.item_count()));
    output.push_str(&format!(
        "{}: {}\n",
        style("Subtotal").bold(),
        format_price(ledger.subtotal())
    ));
    output.push_str(&format!("{}: {}\n", style("Tax").bold(), format_price(ledger.tax())));

    let shipping = if ledger.shipping() == 0.0 && !ledger.is_empty() {
        style("FREE".to_string()).green()
    } else {
        style(format_price(ledger.shipping())).yellow()
    };
    output.push_str(&format!("{}: {}\n", style("Shipping").bold(), shipping));

    let savings = ledger.total_savings();
    if savings > 0.0 {
        output.push_str(&format!(
            "{}: {}\n",
            style("You save").bold(),
            style(format_price(savings)).green()
        ));
    }

    output.push_str(&format!(
        "{}: {}\n",
        style("Total").bold(),
        style(format_price(ledger.total())).cyan().bold()
    ));

    let remaining = ledger.amount_until_free_shipping();
    if remaining > 0.0 && !ledger.is_empty() {
        output.push_str(&format!(
            "{}\n",
            style(format!("Add {} more for free shipping", format_price(remaining))).dim()
        ));
    }

    output
}

pub fn format_visibility(ledger: &CartLedger) -> String {
    let label = ledger.visibility().to_string();
    if ledger.is_open() {
        style(label).green().to_string()
    } else {
        style(label).dim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(27.589999999999996), "$27.59");
        assert_eq!(format_price(0.0), "$0.00");

        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("tee", "Tee", 10.0), 1);
        ledger.remove("tee");
        assert_eq!(format_price(ledger.subtotal()), "$0.00");
        assert!(format_totals(&ledger).contains("$0.00"));
        assert!(!format_totals(&ledger).contains("$-0.00"));
    }

    #[test]
    fn test_item_table_lists_rows() {
        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("tee", "Tee", 10.0).with_category("Apparel"), 2);

        let table = format_item_table(ledger.items());
        assert!(table.contains("tee"));
        assert!(table.contains("Apparel"));
        assert!(table.contains("$20.00"));
        assert!(format_item_table(&[]).is_empty());
    }
}
