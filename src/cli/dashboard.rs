use super::ui;
use crate::core::aggregate::DashboardStats;
use crate::core::rates::display_amount;
use crate::session::{DataSource, Session};
use anyhow::Result;
use chrono::Local;
use comfy_table::Cell;

impl DashboardStats {
    pub fn display_as_table(&self) -> String {
        let currency = &self.display_currency;
        let money = |amount: f64| display_amount(amount, currency);

        let mut overview = ui::new_styled_table();
        overview.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);
        overview.add_row(vec![
            Cell::new("Total spent (all time)"),
            ui::money_cell(&money(self.total_all_time), false),
        ]);
        overview.add_row(vec![
            Cell::new("Spent this month"),
            ui::money_cell(&money(self.total_this_month), false),
        ]);
        overview.add_row(vec![
            Cell::new("Monthly budget"),
            ui::money_cell(&money(self.monthly_budget), false),
        ]);
        overview.add_row(vec![
            Cell::new("Remaining budget"),
            ui::money_cell(&money(self.remaining_budget), self.remaining_budget < 0.0),
        ]);
        overview.add_row(vec![
            Cell::new("Savings goal"),
            ui::money_cell(&money(self.savings_goal), false),
        ]);
        overview.add_row(vec![
            Cell::new("Transactions this month"),
            ui::money_cell(&self.transaction_count_this_month.to_string(), false),
        ]);
        overview.add_row(vec![
            Cell::new("Average transaction"),
            ui::money_cell(&money(self.average_transaction), false),
        ]);

        let mut categories = ui::new_styled_table();
        categories.set_header(vec![
            ui::header_cell("Category"),
            ui::header_cell(&format!("Total ({currency})")),
        ]);
        for (label, total) in &self.category_totals {
            categories.add_row(vec![
                Cell::new(label),
                ui::money_cell(&money(*total), false),
            ]);
        }

        let mut trend = ui::new_styled_table();
        trend.set_header(
            self.daily_trend
                .iter()
                .map(|point| ui::header_cell(&point.weekday))
                .collect::<Vec<_>>(),
        );
        trend.add_row(
            self.daily_trend
                .iter()
                .map(|point| ui::money_cell(&money(point.total), false))
                .collect::<Vec<_>>(),
        );

        let mut output = format!(
            "{}\n\n{overview}",
            ui::style_text(&format!("Dashboard ({currency})"), ui::StyleType::Title)
        );
        if !self.category_totals.is_empty() {
            output.push_str(&format!(
                "\n\n{}\n{categories}",
                ui::style_text("Spending by category", ui::StyleType::TotalLabel)
            ));
        }
        output.push_str(&format!(
            "\n\n{}\n{trend}",
            ui::style_text("Last 7 days", ui::StyleType::TotalLabel)
        ));
        output
    }
}

/// Refreshes the session and prints the dashboard for today. A session
/// serving the local snapshot is flagged, never silently presented as
/// remote data.
pub async fn run(session: &mut Session) -> Result<()> {
    let source = session.refresh().await?;
    let stats = session.dashboard(Local::now().date_naive())?;

    if source == DataSource::LocalOnly {
        println!(
            "{}",
            ui::style_text(
                "Remote store unreachable: showing locally saved records",
                ui::StyleType::Warning
            )
        );
    }
    println!("{}", stats.display_as_table());
    Ok(())
}
